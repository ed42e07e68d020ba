//! Output storage
//!
//! Sessions write through an [`OutputStore`] so the filesystem can be swapped
//! for memory in tests. Files on disk are replaced atomically: the bytes go to
//! `<name>.tmp`, are synced, then renamed over the target, so an aborted run
//! never leaves a half-written file behind.

use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::event::Team;

/// Destination for recordings and analytics, addressed by relative path.
pub trait OutputStore {
    /// Create or replace the file at `relative`.
    fn write(&mut self, relative: &Path, bytes: &[u8]) -> io::Result<()>;

    /// Human-readable location of `relative`, for logging.
    fn display_path(&self, relative: &Path) -> PathBuf {
        relative.to_path_buf()
    }
}

/// Store rooted at a directory on disk.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl OutputStore for FsStore {
    fn write(&mut self, relative: &Path, bytes: &[u8]) -> io::Result<()> {
        write_atomic(&self.root.join(relative), bytes)
    }

    fn display_path(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }
}

/// Store that keeps every file in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, relative: impl AsRef<Path>) -> Option<&[u8]> {
        self.files.get(relative.as_ref()).map(Vec::as_slice)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl OutputStore for MemoryStore {
    fn write(&mut self, relative: &Path, bytes: &[u8]) -> io::Result<()> {
        self.files.insert(relative.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}

impl<S: OutputStore + ?Sized> OutputStore for &mut S {
    fn write(&mut self, relative: &Path, bytes: &[u8]) -> io::Result<()> {
        (**self).write(relative, bytes)
    }

    fn display_path(&self, relative: &Path) -> PathBuf {
        (**self).display_path(relative)
    }
}

/// Replace `path` with `bytes` via a synced temporary file and a rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = match path.file_name() {
        Some(name) => {
            let mut tmp_name = OsString::from(name);
            tmp_name.push(".tmp");
            path.with_file_name(tmp_name)
        }
        None => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "output path has no file name",
            ));
        }
    };

    let written = fs::File::create(&tmp_path).and_then(|mut f| {
        f.write_all(bytes)?;
        f.sync_all()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    #[cfg(windows)]
    {
        if path.exists() {
            // Windows rename fails if destination exists.
            fs::remove_file(path)?;
        }
    }

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    Ok(())
}

/// Serialize `value` as pretty JSON into the store.
pub fn write_json<T: Serialize + ?Sized>(
    store: &mut dyn OutputStore,
    relative: &Path,
    value: &T,
) -> io::Result<()> {
    let json = serde_json::to_vec_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    store.write(relative, &json)
}

/// Make a participant name safe to use as a single path component.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    match cleaned.trim() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

/// `round<N>/<t|ct>/<name>.rec`
pub fn recording_path(round: u32, team: Team, name: &str) -> Option<PathBuf> {
    let side = team.side_dir()?;
    Some(
        PathBuf::from(format!("round{round}"))
            .join(side)
            .join(format!("{}.rec", sanitize_file_name(name))),
    )
}
