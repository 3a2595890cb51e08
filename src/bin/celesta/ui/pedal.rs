//! Who is holding the sustain pedal
//!
//! Space and the moon both hold the pedal. It stays down until every holder
//! has let go.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PedalSource {
    Key,
    Mouse,
}

#[derive(Debug, Default)]
pub struct PedalHold {
    key: bool,
    mouse: bool,
}

impl PedalHold {
    fn flag(&mut self, source: PedalSource) -> &mut bool {
        match source {
            PedalSource::Key => &mut self.key,
            PedalSource::Mouse => &mut self.mouse,
        }
    }

    pub fn press(&mut self, source: PedalSource) {
        *self.flag(source) = true;
    }

    /// Let go for `source`. Returns true when nothing holds the pedal any more.
    pub fn release(&mut self, source: PedalSource) -> bool {
        let was_held = std::mem::take(self.flag(source));
        was_held && !self.is_held()
    }

    pub fn is_held(&self) -> bool {
        self.key || self.mouse
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_release_keeps_pedal_while_space_is_down() {
        let mut hold = PedalHold::default();
        hold.press(PedalSource::Key);
        hold.press(PedalSource::Mouse);

        assert!(!hold.release(PedalSource::Mouse));
        assert!(hold.is_held());
        assert!(hold.release(PedalSource::Key));
        assert!(!hold.is_held());
    }

    #[test]
    fn release_without_press_does_nothing() {
        let mut hold = PedalHold::default();
        assert!(!hold.release(PedalSource::Mouse));

        hold.press(PedalSource::Key);
        assert!(!hold.release(PedalSource::Mouse));
        assert!(hold.is_held());
    }
}
