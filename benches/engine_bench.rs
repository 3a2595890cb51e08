//! Benchmarks for the tone bank and the instrument control path.
//!
//! Run with: cargo bench
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline

use std::hint::black_box;

use celesta::{
    dsp::Waveform,
    engine::{OfflineEngine, ToneBank, ToneCommand, ToneId},
    input::keymap::{CHORD_FREQS, MELODY_FREQS},
    InputId, Instrument, InstrumentConfig,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

/// Common buffer sizes used in audio applications.
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

fn bank_with_tones(count: usize, waveform: Waveform) -> ToneBank {
    let mut bank = ToneBank::new(48_000.0, waveform);
    for (i, &frequency) in CHORD_FREQS.iter().chain(&MELODY_FREQS).cycle().take(count).enumerate() {
        let id = ToneId(i as u64);
        bank.apply(ToneCommand::Create { id, frequency });
        bank.apply(ToneCommand::Ramp {
            id,
            target: 1.0,
            duration: 0.03,
        });
    }
    bank
}

fn bench_tone_bank(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/tone_bank");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // One finger
        let mut single = bank_with_tones(1, Waveform::Sine);
        group.bench_with_input(BenchmarkId::new("1_sine", size), &size, |b, _| {
            b.iter(|| single.render_block(black_box(&mut buffer)))
        });

        // Both hands on every pad with the pedal down
        let mut full = bank_with_tones(15, Waveform::Sine);
        group.bench_with_input(BenchmarkId::new("15_sine", size), &size, |b, _| {
            b.iter(|| full.render_block(black_box(&mut buffer)))
        });

        let mut saws = bank_with_tones(15, Waveform::Saw);
        group.bench_with_input(BenchmarkId::new("15_saw", size), &size, |b, _| {
            b.iter(|| saws.render_block(black_box(&mut buffer)))
        });
    }

    group.finish();
}

fn bench_instrument_events(c: &mut Criterion) {
    let config = InstrumentConfig::default();

    c.bench_function("instrument/tap_with_pedal", |b| {
        let mut piano = Instrument::new(OfflineEngine::new(48_000.0, Waveform::Sine), &config);
        b.iter(|| {
            piano.set_sustain(true);
            for (i, &freq) in CHORD_FREQS.iter().enumerate() {
                let input = InputId::Pointer(i as u64);
                piano.on_input_start(input, black_box(freq));
                piano.on_input_end(input);
            }
            piano.set_sustain(false);
            piano.engine_mut().advance(0.4);
            piano.tick()
        })
    });
}

criterion_group!(benches, bench_tone_bank, bench_instrument_events);
criterion_main!(benches);
