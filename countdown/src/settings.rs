use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::celebration::{DEFAULT_CELEBRATION_DURATION, DEFAULT_TITLE_PREFIX};
use crate::fireworks::FireworksConfig;

const MAX_CELEBRATION: Duration = Duration::from_secs(24 * 60 * 60);
const MAX_TITLE_PREFIX_CHARS: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CelebrationSettings {
    #[serde(rename = "duration_secs", with = "crate::serde_duration::secs")]
    pub duration: Duration,
    pub title_prefix: String,
}

impl Default for CelebrationSettings {
    fn default() -> Self {
        Self {
            duration: DEFAULT_CELEBRATION_DURATION,
            title_prefix: DEFAULT_TITLE_PREFIX.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioSettings {
    pub master_volume: f32,
    pub sfx_volume: f32,
    pub mute: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            sfx_volume: crate::sound::BURST_SFX_VOLUME,
            mute: false,
        }
    }
}

impl AudioSettings {
    pub fn clamp(mut self) -> Self {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self
    }

    pub fn effective_sfx_gain(self) -> f32 {
        if self.mute {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplaySettings {
    pub window_width: u32,
    pub window_height: u32,
    pub show_timezone_label: bool,
    /// Replaces the detected time zone name in the label.
    pub timezone_label: Option<String>,
    pub reduce_motion: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            show_timezone_label: true,
            timezone_label: None,
            reduce_motion: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountdownSettings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub celebration: CelebrationSettings,
    #[serde(default)]
    pub fireworks: FireworksConfig,
    #[serde(default)]
    pub audio: AudioSettings,
    #[serde(default)]
    pub display: DisplaySettings,
}

impl Default for CountdownSettings {
    fn default() -> Self {
        Self {
            version: default_version(),
            celebration: CelebrationSettings::default(),
            fireworks: FireworksConfig::default(),
            audio: AudioSettings::default(),
            display: DisplaySettings::default(),
        }
    }
}

impl CountdownSettings {
    pub fn sanitized(mut self) -> Self {
        self.version = default_version();
        self.celebration.duration = self
            .celebration
            .duration
            .clamp(Duration::from_secs(1), MAX_CELEBRATION);
        let prefix: String = self
            .celebration
            .title_prefix
            .trim()
            .chars()
            .take(MAX_TITLE_PREFIX_CHARS)
            .collect();
        self.celebration.title_prefix = if prefix.is_empty() {
            DEFAULT_TITLE_PREFIX.to_owned()
        } else {
            prefix
        };
        self.fireworks = self.fireworks.sanitized();
        self.audio = self.audio.clamp();
        self.display.window_width = self.display.window_width.clamp(320, 7680);
        self.display.window_height = self.display.window_height.clamp(240, 4320);
        self.display.timezone_label = self
            .display
            .timezone_label
            .take()
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty());
        self
    }
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os("COUNTDOWN_SETTINGS_PATH") {
            return Self::new(explicit);
        }

        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| {
                    let mut p = PathBuf::from(home);
                    p.push(".config");
                    p
                })
            })
            .unwrap_or_else(|| PathBuf::from("."));

        let mut path = base;
        path.push("new-year-countdown");
        path.push("settings.json");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing files silently yield defaults; unreadable or invalid ones are logged first.
    pub fn load(&self) -> CountdownSettings {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("no settings at {}, using defaults", self.path.display());
                return CountdownSettings::default();
            }
            Err(err) => {
                log::warn!("cannot read {}: {err}; using defaults", self.path.display());
                return CountdownSettings::default();
            }
        };
        match serde_json::from_slice::<CountdownSettings>(&bytes) {
            Ok(settings) => settings.sanitized(),
            Err(err) => {
                log::warn!("invalid settings in {}: {err}; using defaults", self.path.display());
                CountdownSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &CountdownSettings) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(settings)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, text)
    }
}
