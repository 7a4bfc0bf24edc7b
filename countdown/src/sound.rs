//! Explosion sound effects.
//!
//! Sound is best effort: any problem loading clips or opening the output device turns the bank
//! into a silent one after a single warning.

use std::fmt;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

/// Default explosion volume (0.0..=1.0).
pub const BURST_SFX_VOLUME: f32 = 0.4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundError {
    Read { path: PathBuf, message: String },
    Decode { path: PathBuf, message: String },
    NoOutputDevice(String),
}

impl fmt::Display for SoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundError::Read { path, message } => {
                write!(f, "cannot read {}: {message}", path.display())
            }
            SoundError::Decode { path, message } => {
                write!(f, "cannot decode {}: {message}", path.display())
            }
            SoundError::NoOutputDevice(message) => write!(f, "no audio output: {message}"),
        }
    }
}

impl std::error::Error for SoundError {}

/// An encoded clip kept in memory and decoded fresh for each playback.
#[derive(Debug, Clone)]
pub struct SoundClip {
    path: PathBuf,
    bytes: Arc<[u8]>,
}

impl SoundClip {
    /// Fails unless `bytes` is in a format the decoder recognizes.
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Result<Self, SoundError> {
        let path = path.into();
        let bytes: Arc<[u8]> = bytes.into();
        Decoder::new(Cursor::new(Arc::clone(&bytes))).map_err(|err| SoundError::Decode {
            path: path.clone(),
            message: err.to_string(),
        })?;
        Ok(Self { path, bytes })
    }

    pub fn load(path: &Path) -> Result<Self, SoundError> {
        let bytes = fs::read(path).map_err(|err| SoundError::Read {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Self::from_bytes(path, bytes)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Loads every path, keeping the clips that decode and the errors for the rest.
pub fn load_clips(paths: &[PathBuf]) -> (Vec<SoundClip>, Vec<SoundError>) {
    let mut clips = Vec::new();
    let mut errors = Vec::new();
    for path in paths {
        match SoundClip::load(path) {
            Ok(clip) => clips.push(clip),
            Err(err) => errors.push(err),
        }
    }
    (clips, errors)
}

struct Output {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

pub struct SoundBank {
    output: Option<Output>,
    clips: Vec<SoundClip>,
    volume: f32,
    rng: StdRng,
}

impl SoundBank {
    pub fn disabled() -> Self {
        Self {
            output: None,
            clips: Vec::new(),
            volume: 0.0,
            rng: StdRng::seed_from_u64(0),
        }
    }

    /// Opens the default output device and loads `paths`.
    ///
    /// A zero volume or an empty list disables sound quietly. A bad clip or a missing device
    /// disables it with one warning.
    pub fn open(paths: &[PathBuf], volume: f32, seed: u64) -> Self {
        if paths.is_empty() || volume <= 0.0 {
            log::debug!("explosion sounds off");
            return Self::disabled();
        }

        let (clips, errors) = load_clips(paths);
        if let Some(first) = errors.first() {
            log::warn!(
                "disabling sound: {first} ({} of {} clips failed)",
                errors.len(),
                paths.len()
            );
            return Self::disabled();
        }

        let output = match OutputStream::try_default() {
            Ok((stream, handle)) => Output {
                _stream: stream,
                handle,
            },
            Err(err) => {
                log::warn!("disabling sound: {}", SoundError::NoOutputDevice(err.to_string()));
                return Self::disabled();
            }
        };

        log::info!("loaded {} explosion sounds", clips.len());
        Self {
            output: Some(output),
            clips,
            volume: volume.clamp(0.0, 1.0),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.output.is_some() && !self.clips.is_empty()
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Plays one clip chosen at random. Returns `false` when nothing was played.
    pub fn play_random(&mut self) -> bool {
        let Some(output) = self.output.as_ref() else {
            return false;
        };
        if self.clips.is_empty() {
            return false;
        }
        let clip = &self.clips[self.rng.random_range(0..self.clips.len())];

        let Ok(sink) = Sink::try_new(&output.handle) else {
            return false;
        };
        sink.set_volume(self.volume);
        let Ok(source) = Decoder::new(Cursor::new(Arc::clone(&clip.bytes))) else {
            return false;
        };
        sink.append(source);
        sink.detach();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_bank_plays_nothing() {
        let mut bank = SoundBank::disabled();
        assert!(!bank.is_enabled());
        assert!(!bank.play_random());
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = SoundClip::from_bytes("bad.wav", b"definitely not a sound file".to_vec())
            .expect_err("garbage must not decode");
        assert!(matches!(err, SoundError::Decode { .. }));
    }

    #[test]
    fn empty_paths_disable_sound() {
        let bank = SoundBank::open(&[], 1.0, 0);
        assert!(!bank.is_enabled());
        assert_eq!(bank.clip_count(), 0);
    }
}
