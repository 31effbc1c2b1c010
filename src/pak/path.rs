#![forbid(unsafe_code)]

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use log::warn;
use walkdir::WalkDir;

use crate::pak::error::{PakError, PakResult};

/// Derive the resource name of `file_path` under `root`.
///
/// The name is the path relative to `root`, with the extension of the last segment
/// removed and the segments joined by `/`. Both paths are taken as given; callers
/// resolve them first.
pub fn derive_name(root: &Path, file_path: &Path) -> PakResult<String> {
    let rel = file_path
        .strip_prefix(root)
        .map_err(|_| PakError::Outside(file_path.display().to_string()))?;

    let stem = rel
        .file_stem()
        .ok_or_else(|| PakError::Invalid(format!("no file name: {}", file_path.display())))?;

    let mut out = String::new();
    if let Some(parent) = rel.parent() {
        for comp in parent.components() {
            match comp {
                Component::Normal(seg) => {
                    out.push_str(utf8(seg, file_path)?);
                    out.push('/');
                }
                Component::CurDir => {}
                _ => return Err(PakError::Outside(file_path.display().to_string())),
            }
        }
    }
    out.push_str(utf8(stem, file_path)?);

    Ok(out)
}

fn utf8<'a>(seg: &'a OsStr, file_path: &Path) -> PakResult<&'a str> {
    seg.to_str()
        .ok_or_else(|| PakError::Invalid(format!("path is not utf8: {}", file_path.display())))
}

/// Expand directory inputs into the regular files beneath them.
///
/// Files keep their place in the list; a directory is replaced by its files in
/// file-name order at every level. Symlinks under a directory are not followed
/// and are skipped with a warning.
pub fn expand_inputs(inputs: &[PathBuf]) -> PakResult<Vec<PathBuf>> {
    let mut files = Vec::with_capacity(inputs.len());
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }

        for ent in WalkDir::new(input).follow_links(false).sort_by_file_name() {
            let ent = ent.map_err(|e| {
                let msg = e.to_string();
                let io = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, msg));
                PakError::Io(io)
            })?;

            if ent.file_type().is_file() {
                files.push(ent.into_path());
            } else if ent.path_is_symlink() {
                warn!("skipping symlink {}", ent.path().display());
            }
        }
    }
    Ok(files)
}

/// Join a resource name onto `base`, refusing names that would land outside it.
pub fn resource_path(base: &Path, name: &str) -> PakResult<PathBuf> {
    let mut out = base.to_path_buf();
    for seg in name.split('/') {
        match Path::new(seg).components().next() {
            Some(Component::Normal(_)) if !seg.contains(std::path::MAIN_SEPARATOR) => out.push(seg),
            _ => return Err(PakError::Invalid(format!("unsafe resource name: {name}"))),
        }
    }
    Ok(out)
}
