//! rollcall-hw: camera access.
//!
//! The session controller owns exactly one [`Camera`] and holds it acquired
//! only while a session runs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::RgbImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),
    #[error("no camera device: {0}")]
    NoDevice(String),
    #[error("camera not acquired")]
    NotAcquired,
    #[error("failed to read frame {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode frame {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Exclusive video source.
pub trait Camera: Send {
    /// Open the device. Fails when access is denied or no device exists.
    fn acquire(&mut self) -> Result<(), CameraError>;

    /// Grab the current frame. `Ok(None)` means the stream has no frame yet.
    fn capture_frame(&mut self) -> Result<Option<RgbImage>, CameraError>;

    /// Close the device. Must be safe to call when not acquired.
    fn release(&mut self);

    fn is_acquired(&self) -> bool;
}

const FRAME_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Camera that replays still images from a directory, in file name order,
/// looping back to the first frame after the last.
pub struct FrameDirCamera {
    dir: PathBuf,
    frames: Vec<PathBuf>,
    cursor: usize,
    acquired: bool,
}

impl FrameDirCamera {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            frames: Vec::new(),
            cursor: 0,
            acquired: false,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of frames found on the last acquire.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| FRAME_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}

fn list_frames(dir: &Path) -> Result<Vec<PathBuf>, CameraError> {
    let entries = fs::read_dir(dir).map_err(|e| match e.kind() {
        io::ErrorKind::PermissionDenied => CameraError::PermissionDenied(dir.display().to_string()),
        io::ErrorKind::NotFound => CameraError::NoDevice(dir.display().to_string()),
        _ => CameraError::Io {
            path: dir.to_path_buf(),
            source: e,
        },
    })?;

    let mut frames = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| CameraError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && is_frame_file(&path) {
            frames.push(path);
        }
    }
    frames.sort();
    Ok(frames)
}

impl Camera for FrameDirCamera {
    fn acquire(&mut self) -> Result<(), CameraError> {
        let frames = list_frames(&self.dir)?;
        if frames.is_empty() {
            return Err(CameraError::NoDevice(format!(
                "{} contains no frames",
                self.dir.display()
            )));
        }

        tracing::info!(
            dir = %self.dir.display(),
            frames = frames.len(),
            "frame directory camera opened"
        );
        self.frames = frames;
        self.cursor = 0;
        self.acquired = true;
        Ok(())
    }

    fn capture_frame(&mut self) -> Result<Option<RgbImage>, CameraError> {
        if !self.acquired {
            return Err(CameraError::NotAcquired);
        }
        let Some(path) = self.frames.get(self.cursor) else {
            return Ok(None);
        };
        self.cursor = (self.cursor + 1) % self.frames.len();

        let img = image::open(path).map_err(|source| match source {
            image::ImageError::IoError(source) => CameraError::Io {
                path: path.clone(),
                source,
            },
            source => CameraError::Decode {
                path: path.clone(),
                source,
            },
        })?;
        tracing::trace!(frame = %path.display(), "frame captured");
        Ok(Some(img.to_rgb8()))
    }

    fn release(&mut self) {
        if self.acquired {
            tracing::info!(dir = %self.dir.display(), "frame directory camera released");
        }
        self.frames.clear();
        self.cursor = 0;
        self.acquired = false;
    }

    fn is_acquired(&self) -> bool {
        self.acquired
    }
}
