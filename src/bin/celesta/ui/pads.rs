//! Pad rows, sustain pedal and volume control

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph},
    Frame,
};

use celesta::{
    input::{drag::percent, Pad},
    synth::sustain::SustainState,
};

/// Render one row of pads, lighting up the ones currently held
pub fn render_pad_row(
    frame: &mut Frame,
    pads: &[(Pad, Rect)],
    title: &str,
    color: Color,
    is_down: &impl Fn(&Pad) -> bool,
) {
    for (i, (pad, area)) in pads.iter().enumerate() {
        let down = is_down(pad);
        let style = if down {
            Style::default()
                .fg(Color::Black)
                .bg(color)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        };

        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color));
        if i == 0 {
            block = block.title(title);
        }

        let key = if pad.key == ',' {
            "[,]".to_string()
        } else {
            format!("[{}]", pad.key.to_ascii_uppercase())
        };
        let text = vec![
            Line::from(Span::styled(pad.note_name(), style)),
            Line::from(Span::styled(key, Style::default().fg(Color::DarkGray))),
        ];

        let paragraph = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(style)
            .block(block);
        frame.render_widget(paragraph, *area);
    }
}

/// Sustain pedal: lit while held
pub fn render_moon(frame: &mut Frame, area: Rect, sustain: SustainState) {
    let (label, style) = match sustain {
        SustainState::On => (
            "☾ Sustain ON",
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
        ),
        SustainState::Off => ("☾ Sustain  (hold [Space] or click)", Style::default().fg(Color::LightBlue)),
    };

    let paragraph = Paragraph::new(label)
        .alignment(Alignment::Center)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title(" Moon "));
    frame.render_widget(paragraph, area);
}

/// Master volume: drag vertically to change
pub fn render_sun(frame: &mut Frame, area: Rect, level: f32) {
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" ☀ Volume (drag up/down) "))
        .gauge_style(Style::default().fg(Color::LightYellow).bg(Color::Black))
        .ratio(level.clamp(0.0, 1.0) as f64)
        .label(format!("{}%", percent(level)));
    frame.render_widget(gauge, area);
}
