/// Chord pads: C major pentatonic across two octaves, C4 to E5.
pub const CHORD_FREQS: [f32; 8] = [
    261.63, // C4
    293.66, // D4
    329.63, // E4
    392.0,  // G4
    440.0,  // A4
    523.25, // C5
    587.33, // D5
    659.25, // E5
];

/// Melody pads: the same pentatonic an octave up, C5 to D6.
pub const MELODY_FREQS: [f32; 7] = [
    523.25, // C5
    587.33, // D5
    659.25, // E5
    783.99, // G5
    880.0,  // A5
    1046.5, // C6
    1174.7, // D6
];

const CHORD_NOTES: [&str; 8] = ["C4", "D4", "E4", "G4", "A4", "C5", "D5", "E5"];
const MELODY_NOTES: [&str; 7] = ["C5", "D5", "E5", "G5", "A5", "C6", "D6"];

const MELODY_KEYS: [char; 7] = ['a', 's', 'd', 'f', 'j', 'k', 'l'];
const CHORD_KEYS: [char; 8] = ['z', 'x', 'c', 'v', 'b', 'n', 'm', ','];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadKind {
    Chord,
    Melody,
}

impl PadKind {
    pub fn scale(self) -> &'static [f32] {
        match self {
            PadKind::Chord => &CHORD_FREQS,
            PadKind::Melody => &MELODY_FREQS,
        }
    }

    fn note_names(self) -> &'static [&'static str] {
        match self {
            PadKind::Chord => &CHORD_NOTES,
            PadKind::Melody => &MELODY_NOTES,
        }
    }
}

/// Frequency of pad `index` in `kind`'s scale, `None` when out of range.
pub fn frequency(kind: PadKind, index: usize) -> Option<f32> {
    kind.scale().get(index).copied()
}

/// One playable pad and the key bound to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pad {
    pub kind: PadKind,
    pub index: usize,
    pub key: char,
}

impl Pad {
    pub fn frequency(&self) -> Option<f32> {
        frequency(self.kind, self.index)
    }

    pub fn note_name(&self) -> &'static str {
        self.kind.note_names().get(self.index).copied().unwrap_or("?")
    }
}

/// Computer-keyboard layout: melody on the home row, chords on the bottom row.
#[derive(Debug, Clone)]
pub struct Keymap {
    pads: Vec<Pad>,
}

impl Keymap {
    pub fn standard() -> Self {
        let melody = MELODY_KEYS.iter().enumerate().map(|(index, &key)| Pad {
            kind: PadKind::Melody,
            index,
            key,
        });
        let chord = CHORD_KEYS.iter().enumerate().map(|(index, &key)| Pad {
            kind: PadKind::Chord,
            index,
            key,
        });

        Self {
            pads: melody.chain(chord).collect(),
        }
    }

    pub fn lookup(&self, key: char) -> Option<&Pad> {
        let key = key.to_ascii_lowercase();
        self.pads.iter().find(|p| p.key == key)
    }

    /// Pads of one kind, in scale order.
    pub fn row(&self, kind: PadKind) -> impl Iterator<Item = &Pad> {
        self.pads.iter().filter(move |p| p.kind == kind)
    }

    pub fn pads(&self) -> &[Pad] {
        &self.pads
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_row_plays_melody() {
        let keymap = Keymap::standard();
        let pad = keymap.lookup('J').unwrap();
        assert_eq!(pad.kind, PadKind::Melody);
        assert_eq!(pad.frequency(), Some(880.0));
        assert_eq!(pad.note_name(), "A5");
    }

    #[test]
    fn comma_is_the_top_chord_pad() {
        let keymap = Keymap::standard();
        let pad = keymap.lookup(',').unwrap();
        assert_eq!(pad.kind, PadKind::Chord);
        assert_eq!(pad.frequency(), Some(659.25));
    }

    #[test]
    fn unmapped_keys_and_indices() {
        let keymap = Keymap::standard();
        assert!(keymap.lookup('q').is_none());
        assert_eq!(frequency(PadKind::Melody, 7), None);
        assert_eq!(keymap.row(PadKind::Chord).count(), 8);
        assert_eq!(keymap.row(PadKind::Melody).count(), 7);
    }
}
