//! Frame sources for the live feed.
//!
//! A FrameSource stands in for a camera: it is polled for frames and may
//! offer an illumination aid. Implementations:
//! - DirectoryFrames: each image file in a directory is one frame, in file
//!   name order; optionally keeps watching the directory for new files
//! - FrameSequence: a fixed list of in-memory frames

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use walkdir::WalkDir;

pub enum FramePoll {
    Frame(DynamicImage),
    /// Nothing new yet, poll again later.
    Idle,
    /// The source is exhausted or no longer available.
    Closed,
}

pub trait FrameSource: Send {
    fn name(&self) -> &'static str;
    fn next_frame(&mut self) -> FramePoll;

    fn has_illumination(&self) -> bool {
        false
    }

    fn set_illumination(&mut self, _on: bool) {}
}

pub struct DirectoryFrames {
    dir: PathBuf,
    follow: bool,
    seen: HashSet<PathBuf>,
    pending: VecDeque<PathBuf>,
}

impl DirectoryFrames {
    pub fn new(dir: impl Into<PathBuf>, follow: bool) -> Self {
        DirectoryFrames {
            dir: dir.into(),
            follow,
            seen: HashSet::new(),
            pending: VecDeque::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Queues image files not seen before. Returns false if the directory is unreadable.
    fn refresh(&mut self) -> bool {
        if !self.dir.is_dir() {
            log::warn!("frame directory {} is not available", self.dir.display());
            return false;
        }

        let entries = WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| ImageFormat::from_path(p).is_ok());

        for path in entries {
            if self.seen.insert(path.clone()) {
                self.pending.push_back(path);
            }
        }

        true
    }
}

impl FrameSource for DirectoryFrames {
    fn name(&self) -> &'static str {
        "directory"
    }

    fn next_frame(&mut self) -> FramePoll {
        if self.pending.is_empty() && !self.refresh() {
            return FramePoll::Closed;
        }

        while let Some(path) = self.pending.pop_front() {
            match image::open(&path) {
                Ok(img) => {
                    log::debug!("frame {}", path.display());
                    return FramePoll::Frame(img);
                }
                // files still being written show up as unreadable, retry them later
                Err(e) if self.follow => {
                    log::debug!("frame {} not readable yet: {e}", path.display());
                    self.seen.remove(&path);
                    return FramePoll::Idle;
                }
                Err(e) => log::debug!("skipping frame {}: {e}", path.display()),
            }
        }

        if self.follow {
            FramePoll::Idle
        } else {
            FramePoll::Closed
        }
    }
}

/// In-memory frames, served once each in order.
#[derive(Default)]
pub struct FrameSequence {
    frames: VecDeque<DynamicImage>,
    illumination: Option<bool>,
}

impl FrameSequence {
    pub fn new(frames: impl IntoIterator<Item = DynamicImage>) -> Self {
        FrameSequence {
            frames: frames.into_iter().collect(),
            illumination: None,
        }
    }

    /// Same frames, with an illumination aid that starts switched off.
    pub fn with_illumination(mut self) -> Self {
        self.illumination = Some(false);
        self
    }

    pub fn illumination(&self) -> Option<bool> {
        self.illumination
    }
}

impl FrameSource for FrameSequence {
    fn name(&self) -> &'static str {
        "sequence"
    }

    fn next_frame(&mut self) -> FramePoll {
        match self.frames.pop_front() {
            Some(frame) => FramePoll::Frame(frame),
            None => FramePoll::Closed,
        }
    }

    fn has_illumination(&self) -> bool {
        self.illumination.is_some()
    }

    fn set_illumination(&mut self, on: bool) {
        if let Some(state) = self.illumination.as_mut() {
            *state = on;
        }
    }
}
