//! Spectrum analyzer widget
//!
//! FFT of the scope buffer, sampled at log-spaced frequencies across the
//! range the pads play in (plus a few harmonics).

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Number of frequency points to display
const SPECTRUM_BINS: usize = 64;
const MIN_FREQ: f32 = 100.0;
const MAX_FREQ: f32 = 5_000.0;
const FLOOR_DB: f64 = -100.0;

pub struct SpectrumAnalyzer {
    /// Hann window coefficients
    window: Vec<f32>,
    /// (log10 frequency, FFT bin index) per display point
    points: Vec<(f64, usize)>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// Current spectrum: (log10 frequency, magnitude_db)
    spectrum: Vec<(f64, f64)>,
    sample_rate: f32,
}

impl SpectrumAnalyzer {
    /// `buffer_len` is the FFT size and must match the scope buffer.
    pub fn new(buffer_len: usize, sample_rate: f32) -> Self {
        let buffer_len = buffer_len.max(2);
        let fft = FftPlanner::new().plan_fft_forward(buffer_len);

        // Hann window - reduces spectral leakage
        let denom = (buffer_len - 1) as f32;
        let window = (0..buffer_len)
            .map(|i| 0.5 * (1.0 - (std::f32::consts::TAU * i as f32 / denom).cos()))
            .collect();

        let nyquist = (sample_rate / 2.0).max(MIN_FREQ + 1.0);
        let max_freq = MAX_FREQ.min(nyquist);
        let ratio = (max_freq / MIN_FREQ) as f64;
        let last_bin = buffer_len / 2 - 1;

        let points: Vec<(f64, usize)> = (0..SPECTRUM_BINS)
            .map(|i| {
                let t = i as f64 / (SPECTRUM_BINS - 1) as f64;
                let freq = MIN_FREQ as f64 * ratio.powf(t);
                let index = (freq * buffer_len as f64 / sample_rate as f64).round() as usize;
                (freq.log10(), index.min(last_bin))
            })
            .collect();

        let spectrum = points.iter().map(|&(x, _)| (x, FLOOR_DB)).collect();

        Self {
            window,
            points,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); buffer_len],
            spectrum,
            sample_rate,
        }
    }

    /// Recompute from `buffer`; ignored if its length is not the FFT size.
    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for ((slot, &sample), &w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        for ((_, magnitude_db), &(_, index)) in self.spectrum.iter_mut().zip(&self.points) {
            let bin = self.scratch[index];
            let power = (bin.re * bin.re + bin.im * bin.im).max(1e-12);
            *magnitude_db = (10.0 * (power as f64).log10()).max(FLOOR_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }

    /// Frequency (Hz) of the loudest display point, if anything is above the floor.
    pub fn dominant(&self) -> Option<f32> {
        self.spectrum
            .iter()
            .filter(|(_, db)| *db > FLOOR_DB + 20.0)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(x, _)| 10f64.powf(*x) as f32)
            .filter(|&f| f < self.sample_rate / 2.0)
    }
}

/// Render the spectrum with a log frequency axis
pub fn render_spectrum(frame: &mut Frame, area: Rect, analyzer: &SpectrumAnalyzer) {
    let title = match analyzer.dominant() {
        Some(freq) => format!(" Spectrum ~{freq:.0} Hz "),
        None => " Spectrum ".to_string(),
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    let spectrum = analyzer.data();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(spectrum);

    let max_db = spectrum.iter().map(|(_, db)| *db).fold(FLOOR_DB, f64::max);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([(MIN_FREQ as f64).log10(), (MAX_FREQ as f64).log10()])
                .labels(vec!["100", "500", "1k", "5k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, max_db.max(0.0) + 10.0])
                .labels(vec!["-100", "-50", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
