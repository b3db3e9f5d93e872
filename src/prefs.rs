use std::path::PathBuf;
use std::sync::Mutex;

use log::warn;
use serde::{Deserialize, Serialize};

/// User preference flags, injected into the session instead of living in
/// browser-style global storage.
pub trait PreferencesStore: Send + Sync {
    fn voice_enabled(&self) -> bool;
    fn set_voice_enabled(&self, enabled: bool);
    fn music_enabled(&self) -> bool;
    fn set_music_enabled(&self, enabled: bool);
    fn tutorial_seen(&self) -> bool;
    fn set_tutorial_seen(&self);
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PrefsData {
    voice: bool,
    music: bool,
    tutorial_seen: bool,
}

impl Default for PrefsData {
    fn default() -> Self {
        // Music defaults on, voice off, matching first-run behavior.
        Self {
            voice: false,
            music: true,
            tutorial_seen: false,
        }
    }
}

/// In-memory preferences, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    data: Mutex<PrefsData>,
}

impl PreferencesStore for MemoryPreferences {
    fn voice_enabled(&self) -> bool {
        self.data.lock().unwrap().voice
    }

    fn set_voice_enabled(&self, enabled: bool) {
        self.data.lock().unwrap().voice = enabled;
    }

    fn music_enabled(&self) -> bool {
        self.data.lock().unwrap().music
    }

    fn set_music_enabled(&self, enabled: bool) {
        self.data.lock().unwrap().music = enabled;
    }

    fn tutorial_seen(&self) -> bool {
        self.data.lock().unwrap().tutorial_seen
    }

    fn set_tutorial_seen(&self) {
        self.data.lock().unwrap().tutorial_seen = true;
    }
}

/// JSON-file-backed preferences. Every setter persists immediately; load and
/// save failures degrade to defaults with a warning, never an error.
#[derive(Debug)]
pub struct JsonPreferences {
    path: PathBuf,
    data: Mutex<PrefsData>,
}

impl JsonPreferences {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("ignoring malformed preferences file {}: {e}", path.display());
                PrefsData::default()
            }),
            Err(_) => PrefsData::default(),
        };
        Self {
            path,
            data: Mutex::new(data),
        }
    }

    fn persist(&self, data: &PrefsData) {
        match serde_json::to_string_pretty(data) {
            Ok(raw) => {
                if let Err(e) = std::fs::write(&self.path, raw) {
                    warn!("failed to save preferences to {}: {e}", self.path.display());
                }
            }
            Err(e) => warn!("failed to serialize preferences: {e}"),
        }
    }

    fn update(&self, apply: impl FnOnce(&mut PrefsData)) {
        let mut data = self.data.lock().unwrap();
        apply(&mut data);
        self.persist(&data);
    }
}

impl PreferencesStore for JsonPreferences {
    fn voice_enabled(&self) -> bool {
        self.data.lock().unwrap().voice
    }

    fn set_voice_enabled(&self, enabled: bool) {
        self.update(|d| d.voice = enabled);
    }

    fn music_enabled(&self) -> bool {
        self.data.lock().unwrap().music
    }

    fn set_music_enabled(&self, enabled: bool) {
        self.update(|d| d.music = enabled);
    }

    fn tutorial_seen(&self) -> bool {
        self.data.lock().unwrap().tutorial_seen
    }

    fn set_tutorial_seen(&self) {
        self.update(|d| d.tutorial_seen = true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_first_run() {
        let prefs = MemoryPreferences::default();
        assert!(!prefs.voice_enabled());
        assert!(prefs.music_enabled());
        assert!(!prefs.tutorial_seen());
    }

    #[test]
    fn toggles_stick() {
        let prefs = MemoryPreferences::default();
        prefs.set_voice_enabled(true);
        prefs.set_music_enabled(false);
        prefs.set_tutorial_seen();
        assert!(prefs.voice_enabled());
        assert!(!prefs.music_enabled());
        assert!(prefs.tutorial_seen());
    }
}
