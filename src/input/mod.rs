//! Input sources and how they map onto the instrument.
//!
//! Pointer and keyboard inputs live in disjoint namespaces: pointer 0 and
//! key `'a'` can both hold a voice at the same time.

pub mod drag;
pub mod keymap;

use std::fmt;

pub use drag::VolumeDrag;
pub use keymap::{Keymap, Pad, PadKind};

/// Correlates an input's start and end events with the voice it owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InputId {
    /// A touch or mouse pointer, by pointer id.
    Pointer(u64),
    /// A keyboard key, lowercased.
    Key(char),
}

impl InputId {
    pub fn key(c: char) -> Self {
        InputId::Key(c.to_ascii_lowercase())
    }
}

impl fmt::Display for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputId::Pointer(id) => write!(f, "pointer#{id}"),
            InputId::Key(c) => write!(f, "key '{c}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_case_insensitive() {
        assert_eq!(InputId::key('A'), InputId::key('a'));
    }

    #[test]
    fn pointer_and_key_namespaces_differ() {
        // '0' as a key is not pointer 0
        assert_ne!(InputId::Pointer(0), InputId::key('0'));
    }
}
