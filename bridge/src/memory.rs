use std::sync::Mutex;

use crate::{Bridge, BridgeCommand};

/// An in-process bridge that records every command it receives.
///
/// Useful for headless hosts and tests: nothing reaches native code, and the
/// recorded commands can be inspected or drained afterwards.
#[derive(Debug, Default)]
pub struct MemoryBridge {
    commands: Mutex<Vec<BridgeCommand>>,
}

impl MemoryBridge {
    /// Create an empty bridge.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All commands received so far, oldest first.
    #[must_use]
    pub fn commands(&self) -> Vec<BridgeCommand> {
        self.commands
            .lock()
            .map(|commands| commands.clone())
            .unwrap_or_default()
    }

    /// The most recent command, if any.
    #[must_use]
    pub fn last(&self) -> Option<BridgeCommand> {
        self.commands
            .lock()
            .ok()
            .and_then(|commands| commands.last().cloned())
    }

    /// Number of commands received.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.lock().map(|c| c.len()).unwrap_or_default()
    }

    /// Whether no command has been received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove and return all recorded commands.
    pub fn take(&self) -> Vec<BridgeCommand> {
        self.commands
            .lock()
            .map(|mut commands| std::mem::take(&mut *commands))
            .unwrap_or_default()
    }
}

impl Bridge for MemoryBridge {
    fn exec(&self, command: BridgeCommand) {
        log::debug!("{}.{} {:?}", command.service, command.action, command.args);
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(command);
        }
    }
}
