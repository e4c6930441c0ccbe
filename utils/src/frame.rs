use crate::capture::{CaptureDevice, CaptureSource};
use base64::Engine;
use std::path::{Path, PathBuf};

/// An image frame encoded as a `data:` URL (`data:image/jpeg;base64,...`).
pub type EncodedFrame = String;

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> EncodedFrame {
    format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// A directory of still images replayed in name order, one per capture.
#[derive(Debug, Clone)]
pub struct FrameDirectory {
    dir: PathBuf,
}

impl FrameDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl CaptureDevice<EncodedFrame> for FrameDirectory {
    fn open(&mut self) -> anyhow::Result<Box<dyn CaptureSource<EncodedFrame>>> {
        Ok(Box::new(FrameDirSource::scan(&self.dir)?))
    }
}

#[derive(Debug)]
pub struct FrameDirSource {
    frames: Vec<PathBuf>,
    next: usize,
}

impl FrameDirSource {
    pub fn scan(dir: &Path) -> anyhow::Result<Self> {
        let mut frames = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && mime_for_path(&path).is_some() {
                frames.push(path);
            }
        }
        frames.sort();
        tracing::debug!("found {} frames in {}", frames.len(), dir.display());
        Ok(Self { frames, next: 0 })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl CaptureSource<EncodedFrame> for FrameDirSource {
    fn capture(&mut self) -> Option<EncodedFrame> {
        let path = self.frames.get(self.next)?;
        self.next = (self.next + 1) % self.frames.len();
        let mime = mime_for_path(path)?;
        match std::fs::read(path) {
            Ok(bytes) => Some(encode_data_url(mime, &bytes)),
            Err(e) => {
                tracing::warn!("failed to read frame {}: {}", path.display(), e);
                None
            }
        }
    }
}
