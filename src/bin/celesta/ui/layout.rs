//! Screen layout shared by rendering and mouse hit-testing

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use celesta::input::{Keymap, Pad, PadKind};

/// What sits under the mouse pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hit {
    Pad(Pad),
    /// Sustain pedal
    Moon,
    /// Volume control
    Sun,
}

#[derive(Debug, Clone, Default)]
pub struct ScreenLayout {
    pub status: Rect,
    pub melody: Vec<(Pad, Rect)>,
    pub chord: Vec<(Pad, Rect)>,
    pub moon: Rect,
    pub sun: Rect,
    pub scope: Rect,
    pub spectrum: Rect,
    pub help: Rect,
}

impl ScreenLayout {
    pub fn compute(area: Rect, keymap: &Keymap) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Length(5), // Melody pads
                Constraint::Length(5), // Chord pads
                Constraint::Length(3), // Moon + sun
                Constraint::Min(6),    // Scope + spectrum
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        let controls = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(rows[3]);

        let analysis = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[4]);

        Self {
            status: rows[0],
            melody: pad_row(rows[1], keymap, PadKind::Melody),
            chord: pad_row(rows[2], keymap, PadKind::Chord),
            moon: controls[0],
            sun: controls[1],
            scope: analysis[0],
            spectrum: analysis[1],
            help: rows[5],
        }
    }

    pub fn hit(&self, column: u16, row: u16) -> Option<Hit> {
        let pad = self
            .melody
            .iter()
            .chain(&self.chord)
            .find(|(_, rect)| contains(*rect, column, row))
            .map(|(pad, _)| Hit::Pad(*pad));

        pad.or_else(|| {
            if contains(self.moon, column, row) {
                Some(Hit::Moon)
            } else if contains(self.sun, column, row) {
                Some(Hit::Sun)
            } else {
                None
            }
        })
    }
}

fn pad_row(area: Rect, keymap: &Keymap, kind: PadKind) -> Vec<(Pad, Rect)> {
    let pads: Vec<Pad> = keymap.row(kind).copied().collect();
    let count = pads.len().max(1) as u32;
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(pads.iter().map(|_| Constraint::Ratio(1, count)))
        .split(area);

    pads.into_iter().zip(cells.iter().copied()).collect()
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}
