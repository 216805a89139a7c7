#![forbid(unsafe_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::model::FsError;
use crate::text::Text;

pub fn join(dir: &Text, name: &Text) -> PathBuf {
    let mut path = dir.clone();
    path.push(b'/');
    path.concat(name);
    path.to_path_buf()
}

/// Enumerate a directory as (name, is_dir) pairs. Order is whatever the
/// filesystem hands back; the pane sorts after partitioning.
pub fn list_dir(dir: &Path) -> Result<Vec<(String, bool)>, FsError> {
    let read = fs::read_dir(dir).map_err(|source| FsError::List { path: dir.to_path_buf(), source })?;
    let mut entries = Vec::new();
    for item in read {
        let item = item.map_err(|source| FsError::List { path: dir.to_path_buf(), source })?;
        let is_dir = item.file_type().map(|t| t.is_dir()).unwrap_or(false);
        entries.push((item.file_name().to_string_lossy().into_owned(), is_dir));
    }
    debug!(dir = %dir.display(), count = entries.len(), "listed directory");
    Ok(entries)
}

/// Bulk-copy one file. The destination is created exclusively, so pasting
/// over an existing name fails instead of clobbering it.
pub fn copy_file(src: &Path, dst: &Path) -> Result<(), FsError> {
    let copy_err = |source| FsError::Copy { src: src.to_path_buf(), dst: dst.to_path_buf(), source };
    let mut input = fs::File::open(src).map_err(copy_err)?;
    let length = input.metadata().map_err(copy_err)?.len();
    let mut output = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dst)
        .map_err(copy_err)?;
    io::copy(&mut input, &mut output).map_err(copy_err)?;
    debug!(src = %src.display(), dst = %dst.display(), bytes = length, "copied file");
    Ok(())
}

pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<(), FsError> {
    let copy_err = |source| FsError::Copy { src: src.to_path_buf(), dst: dst.to_path_buf(), source };
    if !dst.exists() {
        fs::create_dir_all(dst).map_err(copy_err)?;
    }
    let read = fs::read_dir(src).map_err(copy_err)?;
    for entry in read {
        let entry = entry.map_err(copy_err)?;
        let path = entry.path();
        let target = dst.join(entry.file_name());
        if path.is_dir() {
            copy_dir_recursive(&path, &target)?;
        } else {
            copy_file(&path, &target)?;
        }
    }
    Ok(())
}

pub fn copy_entry(src: &Path, dst: &Path, is_dir: bool) -> Result<(), FsError> {
    if is_dir {
        copy_dir_recursive(src, dst)
    } else {
        copy_file(src, dst)
    }
}

pub fn create_exclusive(path: &Path) -> Result<(), FsError> {
    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map(drop)
        .map_err(|source| FsError::Create { path: path.to_path_buf(), source })?;
    debug!(path = %path.display(), "created file");
    Ok(())
}

pub fn unlink(path: &Path) -> Result<(), FsError> {
    fs::remove_file(path).map_err(|source| FsError::Unlink { path: path.to_path_buf(), source })?;
    debug!(path = %path.display(), "unlinked file");
    Ok(())
}

pub fn remove_entry(path: &Path, is_dir: bool) -> Result<(), FsError> {
    if is_dir {
        fs::remove_dir_all(path)
            .map_err(|source| FsError::Unlink { path: path.to_path_buf(), source })?;
        debug!(path = %path.display(), "removed directory");
        Ok(())
    } else {
        unlink(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn list_dir_reports_kind() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("file.txt"), b"x").unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();

        let mut entries = list_dir(tmp.path()).unwrap();
        entries.sort();
        assert_eq!(entries, vec![("file.txt".to_string(), false), ("sub".to_string(), true)]);
    }

    #[test]
    fn list_dir_missing_path_errors() {
        let tmp = TempDir::new().unwrap();
        let gone = tmp.path().join("missing");
        assert!(matches!(list_dir(&gone), Err(FsError::List { .. })));
    }

    #[test]
    fn copy_file_is_exclusive() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src.txt");
        let dst = tmp.path().join("dst.txt");
        fs::write(&src, b"payload").unwrap();

        copy_file(&src, &dst).unwrap();
        assert_eq!(fs::read(&dst).unwrap(), b"payload");

        // Second copy must refuse to overwrite.
        assert!(matches!(copy_file(&src, &dst), Err(FsError::Copy { .. })));
    }

    #[test]
    fn copy_dir_recursive_copies_tree() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("tree");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("top.txt"), b"t").unwrap();
        fs::write(src.join("nested/deep.txt"), b"d").unwrap();

        let dst = tmp.path().join("out");
        copy_dir_recursive(&src, &dst).unwrap();
        assert_eq!(fs::read(dst.join("top.txt")).unwrap(), b"t");
        assert_eq!(fs::read(dst.join("nested/deep.txt")).unwrap(), b"d");
    }

    #[test]
    fn create_exclusive_then_unlink() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("new.txt");
        create_exclusive(&path).unwrap();
        assert!(path.exists());
        assert!(matches!(create_exclusive(&path), Err(FsError::Create { .. })));
        unlink(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn join_builds_child_path() {
        let dir = Text::from("/home/user");
        let name = Text::from("notes.md");
        assert_eq!(join(&dir, &name), PathBuf::from("/home/user/notes.md"));
    }
}
