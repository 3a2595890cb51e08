//! TUI module for celesta
//!
//! Pads, pedal and volume are playable with the mouse and the keyboard. The
//! scope and spectrum show what the audio thread is producing.

mod layout;
mod pads;
mod pedal;
mod scope;
mod spectrum;
mod status;

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;
use tracing::debug;

use celesta::{
    input::{Keymap, Pad, VolumeDrag},
    InputId, Instrument, InstrumentConfig,
};

use super::audio::StreamEngine;

use layout::{Hit, ScreenLayout};
use pads::{render_moon, render_pad_row, render_sun};
use pedal::{PedalHold, PedalSource};
use scope::{render_scope, ScopeView};
use spectrum::{render_spectrum, SpectrumAnalyzer};
use status::{render_status, AudioStats, StreamInfo};

/// Audio visualization buffer size
const VIS_BUFFER_SIZE: usize = 1024;

/// Frame time for the event loop (~60fps)
const FRAME: Duration = Duration::from_millis(16);

/// The terminal mouse is the only pointer.
const MOUSE: InputId = InputId::Pointer(0);

/// A terminal row is about this many pixels of drag.
const ROW_PIXELS: f32 = 16.0;

/// Master volume step for the arrow keys.
const VOLUME_STEP: f32 = 0.05;

/// Something a key press is holding down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Held {
    Input(InputId),
    Pedal,
}

/// UI application state
pub struct UiApp {
    instrument: Instrument<StreamEngine>,
    keymap: Keymap,
    layout: ScreenLayout,
    /// Ring buffer receiver for audio samples
    scope_rx: Consumer<f32>,
    /// Audio sample buffer for visualization
    audio_buffer: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    stream: StreamInfo,
    volume_drag: VolumeDrag,
    /// Pad the mouse is currently holding down
    mouse_pad: Option<Pad>,
    /// Space and the moon can each hold the pedal
    pedal: PedalHold,
    /// Terminal reports key release events
    key_release: bool,
    /// Release deadlines for keys when release events are unavailable
    key_deadlines: HashMap<Held, Instant>,
    key_hold: Duration,
    /// Whether the app should quit
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        instrument: Instrument<StreamEngine>,
        scope_rx: Consumer<f32>,
        sample_rate: f32,
        channels: usize,
        config: &InstrumentConfig,
        key_release: bool,
    ) -> Self {
        Self {
            instrument,
            keymap: Keymap::standard(),
            layout: ScreenLayout::default(),
            scope_rx,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, sample_rate),
            stream: StreamInfo {
                sample_rate,
                channels,
                waveform: config.waveform,
            },
            volume_drag: VolumeDrag::new(config.drag_sensitivity * ROW_PIXELS),
            mouse_pad: None,
            pedal: PedalHold::default(),
            key_release,
            key_deadlines: HashMap::new(),
            key_hold: config.key_hold_duration(),
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.spectrum.update(&self.audio_buffer);

            terminal.draw(|frame| self.render(frame))?;

            // Wait up to one frame for input, then drain whatever queued up
            let mut timeout = FRAME;
            while event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    Event::FocusLost => self.release_everything(),
                    _ => {}
                }
                timeout = Duration::ZERO;
            }

            self.expire_held_keys(Instant::now());
            self.instrument.tick();
        }

        self.release_everything();
        Ok(())
    }

    /// Poll for new audio samples from ring buffer
    fn poll_audio(&mut self) {
        let mut new_samples = Vec::new();
        while let Ok(sample) = self.scope_rx.pop() {
            new_samples.push(sample);
        }

        if !new_samples.is_empty() {
            // Append new samples and keep only the last VIS_BUFFER_SIZE
            self.audio_buffer.extend(new_samples);
            if self.audio_buffer.len() > VIS_BUFFER_SIZE {
                let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
                self.audio_buffer.drain(0..excess);
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        // Auto-repeat never reaches the instrument
        if key.kind == KeyEventKind::Repeat {
            return;
        }
        let pressed = key.kind == KeyEventKind::Press;

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') if pressed => {
                self.should_quit = true;
            }
            KeyCode::Up if pressed => self.nudge_volume(VOLUME_STEP),
            KeyCode::Down if pressed => self.nudge_volume(-VOLUME_STEP),
            KeyCode::Char(' ') => {
                if pressed {
                    self.press_pedal(PedalSource::Key);
                    self.hold_until_timeout(Held::Pedal);
                } else {
                    self.release_pedal(PedalSource::Key);
                }
            }
            KeyCode::Char(c) => {
                let Some(pad) = self.keymap.lookup(c).copied() else {
                    return;
                };
                let input = InputId::key(pad.key);
                if pressed {
                    if let Some(freq) = pad.frequency() {
                        self.instrument.on_input_start(input, freq);
                    }
                    self.hold_until_timeout(Held::Input(input));
                } else {
                    self.instrument.on_input_end(input);
                }
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let hit = self.layout.hit(mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => match hit {
                Some(Hit::Pad(pad)) => {
                    if let Some(freq) = pad.frequency() {
                        if self.instrument.on_input_start(MOUSE, freq).is_some() {
                            self.mouse_pad = Some(pad);
                        }
                    }
                }
                Some(Hit::Moon) => self.press_pedal(PedalSource::Mouse),
                Some(Hit::Sun) => {
                    self.instrument.ensure_running();
                    let level = self.instrument.master_volume();
                    self.volume_drag.begin(mouse.row as f32, level);
                }
                None => {}
            },
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(level) = self.volume_drag.update(mouse.row as f32) {
                    self.instrument.set_master_volume(level);
                } else if let Some(pad) = self.mouse_pad {
                    // Dragging off a pad ends its tone
                    if hit != Some(Hit::Pad(pad)) {
                        self.release_mouse_pad();
                    }
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.release_mouse_pad();
                self.release_pedal(PedalSource::Mouse);
                self.volume_drag.end();
            }
            _ => {}
        }
    }

    fn press_pedal(&mut self, source: PedalSource) {
        self.pedal.press(source);
        self.instrument.set_sustain(true);
    }

    fn release_pedal(&mut self, source: PedalSource) {
        if self.pedal.release(source) {
            self.instrument.set_sustain(false);
        }
    }

    fn release_mouse_pad(&mut self) {
        if self.mouse_pad.take().is_some() {
            self.instrument.on_input_end(MOUSE);
        }
    }

    /// Without release events, a key counts as held until `key_hold` passes
    /// with no further press. Terminal auto-repeat keeps pushing it back.
    fn hold_until_timeout(&mut self, held: Held) {
        if !self.key_release {
            self.key_deadlines.insert(held, Instant::now() + self.key_hold);
        }
    }

    fn expire_held_keys(&mut self, now: Instant) {
        let expired: Vec<Held> = self
            .key_deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(&held, _)| held)
            .collect();

        for held in expired {
            self.key_deadlines.remove(&held);
            match held {
                Held::Input(input) => {
                    self.instrument.on_input_end(input);
                }
                Held::Pedal => self.release_pedal(PedalSource::Key),
            }
        }
    }

    /// Focus lost or quitting: no release event is coming for anything held.
    fn release_everything(&mut self) {
        let ended = self.instrument.end_all_inputs();
        self.instrument.set_sustain(false);
        self.mouse_pad = None;
        self.pedal.clear();
        self.key_deadlines.clear();
        self.volume_drag.end();
        debug!(ended, "released all inputs");
    }

    fn nudge_volume(&mut self, delta: f32) {
        self.instrument.ensure_running();
        let level = self.instrument.master_volume() + delta;
        self.instrument.set_master_volume(level);
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        self.layout = ScreenLayout::compute(frame.area(), &self.keymap);
        let layout = &self.layout;
        let instrument = &self.instrument;

        let stats = AudioStats::from_buffer(&self.audio_buffer);
        render_status(frame, layout.status, &self.stream, instrument, &stats);

        let is_down = |pad: &Pad| {
            self.mouse_pad == Some(*pad)
                || instrument.bound_voice(InputId::key(pad.key)).is_some()
        };
        render_pad_row(frame, &layout.melody, " Melody ", Color::Magenta, &is_down);
        render_pad_row(frame, &layout.chord, " Chords ", Color::Yellow, &is_down);

        render_moon(frame, layout.moon, instrument.sustain());
        render_sun(frame, layout.sun, instrument.master_volume());

        let view = ScopeView {
            sample_rate: self.stream.sample_rate,
            live_voices: instrument.live_voices(),
            sustain: instrument.sustain(),
        };
        render_scope(frame, layout.scope, &self.audio_buffer, &view);
        render_spectrum(frame, layout.spectrum, &self.spectrum);

        let help = Paragraph::new(
            " [A-L] Melody  [Z-,] Chords  [Space] Sustain  [↑↓ / drag sun] Volume  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, layout.help);
    }
}
