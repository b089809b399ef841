use std::sync::mpsc::{self, Receiver};

use global_hotkey::hotkey::HotKey;
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};

use crate::error::{ClipwiseError, Result};

use super::combination::HotkeyCombination;
use super::Activation;

/// A registered OS-level hotkey. Unregistered on drop.
pub struct HotkeyRegistration {
    manager: GlobalHotKeyManager,
    hotkey: HotKey,
    combination: HotkeyCombination,
}

impl HotkeyRegistration {
    /// Claim the combination with the OS and start forwarding its presses.
    ///
    /// Must be called on the thread that runs the OS event loop: presses are
    /// delivered through the main run loop on macOS and through the calling
    /// thread's message queue on Windows.
    ///
    /// Fails if the combination is already taken; callers treat that as fatal.
    pub fn register(combination: &HotkeyCombination) -> Result<(Self, Receiver<Activation>)> {
        let register_error = |reason: String| ClipwiseError::Register {
            combination: combination.to_string(),
            reason,
        };

        let manager = GlobalHotKeyManager::new().map_err(|e| register_error(e.to_string()))?;
        let hotkey = combination.hotkey();
        manager
            .register(hotkey)
            .map_err(|e| register_error(e.to_string()))?;
        tracing::info!("registered global hotkey {}", combination);

        let (tx, rx) = mpsc::channel();
        let id = hotkey.id();
        std::thread::Builder::new()
            .name("clipwise-hotkey".into())
            .spawn(move || {
                let events = GlobalHotKeyEvent::receiver();
                while let Ok(event) = events.recv() {
                    if event.id() != id || !matches!(event.state(), HotKeyState::Pressed) {
                        continue;
                    }
                    if tx.send(Activation::now()).is_err() {
                        break;
                    }
                }
            })?;

        Ok((
            Self {
                manager,
                hotkey,
                combination: combination.clone(),
            },
            rx,
        ))
    }

    pub fn combination(&self) -> &HotkeyCombination {
        &self.combination
    }
}

impl Drop for HotkeyRegistration {
    fn drop(&mut self) {
        if let Err(e) = self.manager.unregister(self.hotkey) {
            tracing::warn!("failed to unregister hotkey {}: {}", self.combination, e);
        }
    }
}
