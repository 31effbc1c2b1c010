#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::pak::build::build as build_impl;
use crate::pak::error::PakResult;
use crate::pak::path::resource_path;
use crate::pak::read::{check_layout, PakFile};

/// Totals reported by [`verify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub entries: usize,
    pub bytes: u64,
}

pub fn pack(root: &Path, output: &Path, inputs: &[PathBuf], quiet: bool) -> PakResult<()> {
    build_impl(root, output, inputs, quiet)?;
    Ok(())
}

fn content_hash(raw: &[u8]) -> String {
    blake3::hash(raw).to_hex().to_string()
}

pub fn list(pak: &Path, verbose: bool) -> PakResult<()> {
    let mut f = PakFile::open(pak)?;

    let entries = f.entries().to_vec();
    for e in &entries {
        if verbose {
            let raw = f.read_entry(e)?;
            println!(
                "{}  off={} len={} hash={}",
                e.name,
                e.offset,
                e.size,
                content_hash(&raw)
            );
        } else {
            println!("{}", e.name);
        }
    }
    Ok(())
}

/// Write resources to `output/<name>`. With a non-empty `filter`, only names
/// containing one of its substrings are written. Returns how many were written.
pub fn extract(pak: &Path, output: &Path, filter: &[String]) -> PakResult<usize> {
    let mut f = PakFile::open(pak)?;
    std::fs::create_dir_all(output)?;

    let entries = f.entries().to_vec();
    let mut written = 0;
    for e in &entries {
        if !filter.is_empty() && !filter.iter().any(|s| e.name.contains(s.as_str())) {
            continue;
        }

        let out_path = resource_path(output, &e.name)?;
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&out_path, f.read_entry(e)?)?;
        written += 1;
    }

    info!("extracted {written} of {} entries to {}", entries.len(), output.display());
    Ok(written)
}

pub fn verify(pak: &Path) -> PakResult<Summary> {
    let mut f = PakFile::open(pak)?;
    check_layout(f.entries(), f.blob_len())?;

    let entries = f.entries().to_vec();
    for e in &entries {
        let raw = f.read_entry(e)?;
        debug!("{} hash={}", e.name, content_hash(&raw));
    }

    let summary = Summary {
        entries: entries.len(),
        bytes: f.blob_len(),
    };
    println!("ok: {} entries, {} bytes", summary.entries, summary.bytes);
    Ok(summary)
}
