//! Native key injection.
//!
//! The relay treats the backend as opaque: it is told to press or
//! release a native key code and may block while doing so. Calls are
//! made from the injection worker, never from the session task.

use std::process::Command as Process;
use std::sync::Mutex;

use anyhow::{bail, Context};
use pad_core::{KeyAction, KeyCode};
use tracing::info;

pub trait InputBackend: Send + Sync {
    fn press(&self, code: &KeyCode) -> anyhow::Result<()>;
    fn release(&self, code: &KeyCode) -> anyhow::Result<()>;

    fn apply(&self, action: KeyAction, code: &KeyCode) -> anyhow::Result<()> {
        match action {
            KeyAction::Press => self.press(code),
            KeyAction::Release => self.release(code),
        }
    }
}

/// Logs key events without touching any input device.
#[derive(Debug, Default)]
pub struct LogBackend;

impl InputBackend for LogBackend {
    fn press(&self, code: &KeyCode) -> anyhow::Result<()> {
        info!(key = %code, "press");
        Ok(())
    }

    fn release(&self, code: &KeyCode) -> anyhow::Result<()> {
        info!(key = %code, "release");
        Ok(())
    }
}

/// Runs an external program per key event:
/// `<program> [args...] press <code>` / `... release <code>`.
///
/// `PAD_KEY_COMMAND="keyctl --device 0"` is split on whitespace.
#[derive(Debug)]
pub struct CommandBackend {
    program: String,
    args: Vec<String>,
}

impl CommandBackend {
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(CommandBackend {
            program,
            args: parts.collect(),
        })
    }

    fn run(&self, verb: &str, code: &KeyCode) -> anyhow::Result<()> {
        let status = Process::new(&self.program)
            .args(&self.args)
            .arg(verb)
            .arg(code.as_str())
            .status()
            .with_context(|| format!("spawning {}", self.program))?;

        if !status.success() {
            bail!("{} {} {} exited with {}", self.program, verb, code, status);
        }
        Ok(())
    }
}

impl InputBackend for CommandBackend {
    fn press(&self, code: &KeyCode) -> anyhow::Result<()> {
        self.run("press", code)
    }

    fn release(&self, code: &KeyCode) -> anyhow::Result<()> {
        self.run("release", code)
    }
}

/// Remembers every call in order. Useful for dry runs and tests.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    events: Mutex<Vec<(KeyAction, KeyCode)>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        RecordingBackend::default()
    }

    pub fn events(&self) -> Vec<(KeyAction, KeyCode)> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    fn record(&self, action: KeyAction, code: &KeyCode) -> anyhow::Result<()> {
        let mut events = self
            .events
            .lock()
            .map_err(|_| anyhow::anyhow!("recording backend poisoned"))?;
        events.push((action, code.clone()));
        Ok(())
    }
}

impl InputBackend for RecordingBackend {
    fn press(&self, code: &KeyCode) -> anyhow::Result<()> {
        self.record(KeyAction::Press, code)
    }

    fn release(&self, code: &KeyCode) -> anyhow::Result<()> {
        self.record(KeyAction::Release, code)
    }
}
