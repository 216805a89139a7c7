#![forbid(unsafe_code)]

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::text::Text;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Search,
    Insert,
    Visual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Copy,
    Move,
}

/// A deferred copy/move request. Owns deep copies of its paths so it stays
/// valid across directory reloads that recycle the pane's text slots.
#[derive(Debug, Clone)]
pub struct Operation {
    pub kind: OpKind,
    pub is_dir: bool,
    pub name: Text,
    pub source_dir: Text,
    pub dest_dir: Option<Text>,
}

/// Line range selected in Visual mode: `[start, end)` with the anchor fixed
/// at the line the mode was entered on.
#[derive(Debug, Clone, Copy)]
pub struct VisualRange {
    pub start: usize,
    pub end: usize,
    pub anchor: usize,
}

impl VisualRange {
    pub fn new(anchor: usize) -> Self {
        Self { start: anchor, end: anchor + 1, anchor }
    }

    pub fn contains(&self, line: usize) -> bool {
        self.start <= line && line < self.end
    }
}

#[derive(Debug, Error)]
pub enum FsError {
    #[error("list {}: {}", path.display(), source)]
    List { path: PathBuf, source: io::Error },
    #[error("create {}: {}", path.display(), source)]
    Create { path: PathBuf, source: io::Error },
    #[error("copy {} -> {}: {}", src.display(), dst.display(), source)]
    Copy { src: PathBuf, dst: PathBuf, source: io::Error },
    #[error("unlink {}: {}", path.display(), source)]
    Unlink { path: PathBuf, source: io::Error },
}

#[derive(Debug, Error)]
pub enum VexError {
    #[error("startup: {0}")]
    Startup(io::Error),
    #[error(transparent)]
    Fs(#[from] FsError),
}
