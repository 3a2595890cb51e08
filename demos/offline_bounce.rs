/// Plays a short phrase through the offline engine and reports levels.
use celesta::{
    engine::OfflineEngine,
    input::{Keymap, PadKind},
    InputId, Instrument, InstrumentConfig,
};

fn main() {
    println!("=== Offline Bounce ===\n");

    let config = InstrumentConfig::default();
    let engine = OfflineEngine::new(48_000.0, config.waveform);
    let mut piano = Instrument::new(engine, &config);
    let keymap = Keymap::standard();

    // Arpeggiate the chord row with the pedal down, then let it ring out
    piano.set_sustain(true);
    for pad in keymap.row(PadKind::Chord).step_by(2) {
        let input = InputId::key(pad.key);
        if let Some(freq) = pad.frequency() {
            piano.on_input_start(input, freq);
        }
        let peak = piano.engine_mut().advance(0.15);
        piano.on_input_end(input);
        piano.tick();
        println!(
            "  {} ({:>7.2} Hz)  peak {:.3}  voices {}",
            pad.note_name(),
            pad.frequency().unwrap_or_default(),
            peak,
            piano.live_voices()
        );
    }

    println!("\nLifting pedal");
    piano.set_sustain(false);

    for step in 0..4 {
        let peak = piano.engine_mut().advance(0.1);
        piano.tick();
        println!(
            "  +{}ms  peak {:.3}  voices {}",
            (step + 1) * 100,
            peak,
            piano.live_voices()
        );
    }
}
