#[cfg(feature = "rtrb")]
use rtrb::Consumer;

/// Identifies one tone inside a [`ToneBank`](super::ToneBank).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToneId(pub u64);

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ToneCommand {
    Create { id: ToneId, frequency: f32 },
    Ramp { id: ToneId, target: f32, duration: f32 },
    Stop { id: ToneId, at: f64 },
    SetMaster { level: f32 },
}

pub trait CommandReceiver {
    fn pop(&mut self) -> Option<ToneCommand>;
}

#[cfg(feature = "rtrb")]
impl CommandReceiver for Consumer<ToneCommand> {
    fn pop(&mut self) -> Option<ToneCommand> {
        Consumer::pop(self).ok()
    }
}
