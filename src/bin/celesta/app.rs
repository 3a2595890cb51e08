//! Celesta - application builder and runner

use std::io::stdout;

use color_eyre::eyre::Result as EyreResult;
use crossterm::{
    event::{
        DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::supports_keyboard_enhancement,
};
use tracing::info;

use celesta::{Instrument, InstrumentConfig};

use super::{audio, ui::UiApp};

/// Main application
pub struct Celesta {
    config: InstrumentConfig,
}

impl Celesta {
    pub fn new(config: InstrumentConfig) -> Self {
        Self { config }
    }

    /// Run the application (takes over the terminal, plays audio)
    pub fn run(self) -> EyreResult<()> {
        let output = audio::open(&self.config)?;
        let instrument = Instrument::new(output.engine, &self.config);

        let mut terminal = ratatui::init();

        // Key release events need the kitty keyboard protocol; without it
        // held keys are released on a timer instead.
        let key_release = supports_keyboard_enhancement().unwrap_or(false);
        if key_release {
            execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        execute!(stdout(), EnableMouseCapture, EnableFocusChange)?;
        info!(key_release, "terminal ready");

        let mut app = UiApp::new(
            instrument,
            output.scope_rx,
            output.sample_rate,
            output.channels,
            &self.config,
            key_release,
        );
        let result = app.run(&mut terminal);

        if key_release {
            let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
        }
        let _ = execute!(stdout(), DisableMouseCapture, DisableFocusChange);
        ratatui::restore();

        result
    }
}
