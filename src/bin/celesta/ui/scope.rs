//! Oscilloscope widget
//!
//! The trace starts at a rising zero crossing so a held chord stands still,
//! and turns yellow while the pedal is holding tones.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use celesta::synth::sustain::SustainState;

/// Smallest vertical range, so near-silence is not blown up into noise.
const MIN_RANGE: f32 = 0.05;

/// Instrument state shown alongside the trace.
pub struct ScopeView {
    pub sample_rate: f32,
    pub live_voices: usize,
    pub sustain: SustainState,
}

/// Index just after the first rising zero crossing in the first half of
/// `samples`, or 0 when there is none.
pub fn trigger_point(samples: &[f32]) -> usize {
    samples
        .windows(2)
        .take(samples.len() / 2)
        .position(|pair| pair[0] < 0.0 && pair[1] >= 0.0)
        .map_or(0, |i| i + 1)
}

pub fn render_scope(frame: &mut Frame, area: Rect, samples: &[f32], view: &ScopeView) {
    let start = trigger_point(samples);
    let end = (start + samples.len() / 2).min(samples.len());
    let shown = &samples[start..end];

    let ms_per_sample = 1_000.0 / view.sample_rate.max(1.0) as f64;
    let span_ms = shown.len() as f64 * ms_per_sample;
    let points: Vec<(f64, f64)> = shown
        .iter()
        .enumerate()
        .map(|(i, &s)| (i as f64 * ms_per_sample, s as f64))
        .collect();

    let range = shown
        .iter()
        .fold(MIN_RANGE, |acc, &s| acc.max(s.abs())) as f64;

    let (color, pedal) = match view.sustain {
        SustainState::On => (Color::Yellow, ", pedal"),
        SustainState::Off => (Color::Cyan, ""),
    };
    let plural = if view.live_voices == 1 { "" } else { "s" };
    let title = format!(" Scope: {} voice{plural}{pedal} ", view.live_voices);

    let trace = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points);

    let chart = Chart::new(vec![trace])
        .block(Block::default().title(title).borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .bounds([0.0, span_ms.max(ms_per_sample)])
                .labels(vec!["0".to_string(), format!("{span_ms:.0} ms")])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-range, range])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
