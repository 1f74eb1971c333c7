//! Filesystem access for the Waymark input and output files.
//!
//! Paths are UTF-8 (`camino`). Each file is reached through a `cap-std`
//! handle on its containing directory, opened with ambient authority.
#![forbid(unsafe_code)]

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};
use std::io;

/// Open an existing file for reading.
///
/// # Errors
/// Returns the underlying I/O error when the file cannot be opened.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Create or truncate a file for writing, creating missing parent
/// directories first.
///
/// # Errors
/// Returns the underlying I/O error when a directory or the file cannot be
/// created, including when `path` is an existing directory.
pub fn create_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    let (parent, name) = split_target(path)?;
    fs_utf8::Dir::create_ambient_dir_all(parent, ambient_authority())?;
    fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?.create(name)
}

/// Whether `path` names a regular file.
///
/// # Errors
/// Returns [`io::ErrorKind::NotFound`] when nothing exists at `path`.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (parent, name) = split_target(path)?;
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.metadata(name).map(|meta| meta.is_file())
}

/// Containing directory (`.` for bare names) and final component of `path`.
fn split_target(path: &Utf8Path) -> io::Result<(&Utf8Path, &str)> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{path} does not name a file"),
        )
    })?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    Ok((parent, name))
}
