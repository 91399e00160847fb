//! Frame sources for mood scans.
//!
//! A frame source stands in for the live camera: each capture yields one
//! still image encoded as a base64 data URL, ready to send to the
//! analysis endpoint.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// One captured still.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Where the frame came from (file name for directory sources).
    pub label: String,
    /// `data:image/<type>;base64,<payload>`
    pub data_url: String,
}

impl Frame {
    /// Encode raw image bytes as a data URL frame.
    pub fn from_bytes(label: impl Into<String>, mime: &str, bytes: &[u8]) -> Self {
        Self {
            label: label.into(),
            data_url: format!("data:{};base64,{}", mime, STANDARD.encode(bytes)),
        }
    }
}

/// Produces the current frame on demand.
pub trait FrameSource {
    fn capture(&mut self) -> Result<Frame>;
}

/// Configuration for discovering frame files.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Image file extensions to include (e.g., ["png", "jpg"])
    pub extensions: Vec<String>,
    /// Maximum image size in bytes
    pub max_file_size: u64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["png", "jpg", "jpeg"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_file_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

impl From<&crate::config::ScanSettings> for FrameConfig {
    fn from(config: &crate::config::ScanSettings) -> Self {
        Self {
            extensions: config.extensions.clone(),
            max_file_size: config.max_frame_size,
        }
    }
}

/// Frame file discovered on disk.
#[derive(Debug, Clone)]
pub struct FrameFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Replays image files from a directory (or a single file) in path order,
/// starting over once every file has been used.
pub struct DirectoryFrameSource {
    files: Vec<FrameFile>,
    next: usize,
}

impl DirectoryFrameSource {
    /// Discover frames under `root`. Fails when nothing usable is found.
    pub fn open(root: &Path, config: &FrameConfig) -> Result<Self> {
        let files = discover_frames(root, config)?;

        if files.is_empty() {
            anyhow::bail!("No image frames found in {}", root.display());
        }

        debug!("Loaded {} frame files from {}", files.len(), root.display());
        Ok(Self { files, next: 0 })
    }

    /// Files this source cycles through.
    pub fn files(&self) -> &[FrameFile] {
        &self.files
    }
}

impl FrameSource for DirectoryFrameSource {
    fn capture(&mut self) -> Result<Frame> {
        let file = &self.files[self.next % self.files.len()];
        self.next = (self.next + 1) % self.files.len();

        let bytes = fs::read(&file.path)
            .with_context(|| format!("Failed to read frame {}", file.path.display()))?;

        let label = file
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Frame::from_bytes(label, mime_for(&file.path), &bytes))
    }
}

/// List the image files a source rooted at `root` would replay.
pub fn discover_frames(root: &Path, config: &FrameConfig) -> Result<Vec<FrameFile>> {
    if !root.exists() {
        anyhow::bail!("Frame path does not exist: {}", root.display());
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Skipping unreadable frame entry: {}", e);
                continue;
            }
        };

        let path = entry.path();
        if !entry.file_type().is_file() || is_hidden(path) || !has_extension(path, config) {
            continue;
        }

        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        if size == 0 || size > config.max_file_size {
            debug!("Skipping {} ({} bytes)", path.display(), size);
            continue;
        }

        files.push(FrameFile {
            path: path.to_path_buf(),
            size,
        });
    }

    Ok(files)
}

fn has_extension(path: &Path, config: &FrameConfig) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    config.extensions.iter().any(|allowed| allowed.to_lowercase() == ext)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "image/png",
    }
}
