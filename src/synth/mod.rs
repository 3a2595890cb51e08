// Purpose: voice lifecycle, sustain pedal, input routing
// This layer sits above the tone engine and decides when tones start and stop

pub mod config;
pub mod instrument;
pub mod registry;
pub mod sustain;
pub mod voice;
