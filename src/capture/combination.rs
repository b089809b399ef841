use std::fmt;
use std::str::FromStr;

use global_hotkey::hotkey::{Code, HotKey, Modifiers};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ClipwiseError;

/// A global hotkey such as `Cmd+L` or `ctrl+shift+l`.
///
/// Parsing is global-hotkey's own grammar, with one extra rule: at least one
/// modifier is required. The string is kept as written (tokens trimmed) for
/// display and for the config file.
#[derive(Debug, Clone)]
pub struct HotkeyCombination {
    raw: String,
    hotkey: HotKey,
}

impl HotkeyCombination {
    /// The OS-level hotkey to register.
    pub fn hotkey(&self) -> HotKey {
        self.hotkey
    }

    /// The platform default: Cmd+L on macOS, Ctrl+Shift+L elsewhere.
    pub fn platform_default() -> Self {
        if cfg!(target_os = "macos") {
            Self {
                raw: "super+L".into(),
                hotkey: HotKey::new(Some(Modifiers::SUPER), Code::KeyL),
            }
        } else {
            Self {
                raw: "ctrl+shift+L".into(),
                hotkey: HotKey::new(Some(Modifiers::CONTROL | Modifiers::SHIFT), Code::KeyL),
            }
        }
    }
}

impl PartialEq for HotkeyCombination {
    fn eq(&self, other: &Self) -> bool {
        self.hotkey == other.hotkey
    }
}

impl Eq for HotkeyCombination {}

impl FromStr for HotkeyCombination {
    type Err = ClipwiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| ClipwiseError::InvalidHotkey {
            combination: s.to_string(),
            reason,
        };

        let tokens: Vec<&str> = s.split('+').map(str::trim).collect();
        if tokens.iter().any(|t| t.is_empty()) {
            return Err(invalid("empty key in combination".into()));
        }
        let raw = tokens.join("+");

        let hotkey: HotKey = raw.parse().map_err(|e| invalid(format!("{}", e)))?;
        if hotkey.mods.is_empty() {
            return Err(invalid("at least one modifier is required".into()));
        }
        Ok(Self { raw, hotkey })
    }
}

impl fmt::Display for HotkeyCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for HotkeyCombination {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HotkeyCombination {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
