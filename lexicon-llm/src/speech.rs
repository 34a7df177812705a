//! Best-effort pronunciation through a platform text-to-speech program.
//!
//! Nothing here ever fails the caller. When no engine is found, or the
//! engine cannot be started, a warning is logged and playback is skipped.

use std::path::Path;
use std::process::{Command, Stdio};

use lexicon_core::config::SpeechConfig;
use tracing::{debug, warn};

/// Programs probed on `PATH`, in order of preference.
const KNOWN_ENGINES: &[&str] = &["espeak-ng", "espeak", "say"];

/// Words per minute most engines use at rate 1.0.
const BASE_WPM: f32 = 175.0;

/// A text-to-speech engine and the voice settings to drive it with.
#[derive(Debug, Clone)]
pub struct Speaker {
    program: Option<String>,
    rate: f32,
    pitch: f32,
    volume: f32,
}

impl Speaker {
    /// Resolve the engine from configuration, probing `PATH` when no
    /// explicit command is set.
    #[must_use]
    pub fn from_config(config: &SpeechConfig) -> Self {
        let program = if config.enabled {
            config.command.clone().or_else(detect_engine)
        } else {
            None
        };
        debug!(program = ?program, "Speech engine resolved");
        Self {
            program,
            rate: config.rate,
            pitch: config.pitch,
            volume: config.volume,
        }
    }

    /// A speaker that never plays anything.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            program: None,
            rate: 0.8,
            pitch: 1.0,
            volume: 1.0,
        }
    }

    /// Whether an engine was found.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.program.is_some()
    }

    /// Engine program name, if any.
    #[must_use]
    pub fn program(&self) -> Option<&str> {
        self.program.as_deref()
    }

    /// Command-line arguments that speak `text` with this voice.
    #[must_use]
    pub fn arguments(&self, text: &str) -> Vec<String> {
        let program = self.program.as_deref().unwrap_or_default();
        let engine = Path::new(program)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(program);
        let wpm = scaled(BASE_WPM, self.rate, 80, 450);

        match engine {
            "espeak-ng" | "espeak" => vec![
                "-s".into(),
                wpm.to_string(),
                "-p".into(),
                scaled(50.0, self.pitch, 0, 99).to_string(),
                "-a".into(),
                scaled(100.0, self.volume, 0, 200).to_string(),
                text.to_string(),
            ],
            "say" => vec!["-r".into(), wpm.to_string(), text.to_string()],
            // Unknown engines just get the text.
            _ => vec![text.to_string()],
        }
    }

    /// Speak `text` without waiting for playback to finish.
    ///
    /// Returns whether playback was started.
    pub fn speak(&self, text: &str) -> bool {
        let Some(program) = self.program.as_deref() else {
            warn!(word = text, "Speech synthesis not supported");
            return false;
        };

        let spawned = Command::new(program)
            .args(self.arguments(text))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(mut child) => {
                // Reap the child off-thread so it never lingers as a zombie.
                std::thread::spawn(move || {
                    let _ = child.wait();
                });
                debug!(program, word = text, "Speech playback started");
                true
            }
            Err(e) => {
                warn!(program, error = %e, "Speech synthesis not supported");
                false
            }
        }
    }
}

/// First known engine present on `PATH`.
fn detect_engine() -> Option<String> {
    let paths = std::env::var_os("PATH")?;
    KNOWN_ENGINES
        .iter()
        .find(|engine| std::env::split_paths(&paths).any(|dir| dir.join(engine).is_file()))
        .map(|engine| (*engine).to_string())
}

/// `base * factor`, rounded and clamped into `[min, max]`.
fn scaled(base: f32, factor: f32, min: u32, max: u32) -> u32 {
    let value = (base * factor).round();
    if value.is_nan() || value <= min as f32 {
        min
    } else if value >= max as f32 {
        max
    } else {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let v = value as u32;
        v
    }
}
