//! Status bar widget - shows stream settings, voices, pedal and audio stats

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use celesta::{
    dsp::Waveform,
    input::drag::percent,
    synth::sustain::SustainState,
    Instrument, ToneEngine,
};

/// Fixed facts about the output stream
pub struct StreamInfo {
    pub sample_rate: f32,
    pub channels: usize,
    pub waveform: Waveform,
}

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    /// Compute audio stats from a buffer
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

/// Render the status bar
pub fn render_status<E: ToneEngine>(
    frame: &mut Frame,
    area: Rect,
    stream: &StreamInfo,
    instrument: &Instrument<E>,
    audio_stats: &AudioStats,
) {
    let block = Block::default().title(" celesta ").borders(Borders::ALL);

    let (engine_symbol, engine_state) = if instrument.engine().is_suspended() {
        ("⏸", "Waiting for first note")
    } else {
        ("▶", "Live")
    };
    let pedal = match instrument.sustain() {
        SustainState::On => Span::styled("Sustain ON  ", Style::default().fg(Color::LightBlue)),
        SustainState::Off => Span::styled("Sustain off  ", Style::default().fg(Color::DarkGray)),
    };

    // Format sample rate nicely (e.g., 48000 -> "48kHz")
    let sample_rate_khz = stream.sample_rate / 1000.0;

    let line = Line::from(vec![
        Span::styled(
            format!(" {} {}  ", engine_symbol, engine_state),
            Style::default().fg(if instrument.engine().is_suspended() {
                Color::Yellow
            } else {
                Color::Green
            }),
        ),
        Span::styled(
            format!("Voices: {}  ", instrument.live_voices()),
            Style::default().fg(Color::Cyan),
        ),
        pedal,
        Span::styled(
            format!("Vol: {}%  ", percent(instrument.master_volume())),
            Style::default().fg(Color::LightYellow),
        ),
        Span::styled(
            format!(
                "{}  {:.1}kHz/{}ch  ",
                stream.waveform, sample_rate_khz, stream.channels
            ),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", audio_stats.peak, audio_stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}
