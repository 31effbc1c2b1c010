#![forbid(unsafe_code)]

use std::collections::hash_map::{Entry as Slot, HashMap};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::pak::error::{PakError, PakResult};
use crate::pak::format::{archive_len, Entry};
use crate::pak::io::write_table;
use crate::pak::path::{derive_name, expand_inputs};

/// Archive layout (all integers u64 little-endian, no header, no padding):
/// - [entry_count]
/// - entries, in input order...
///   - [name_len][name bytes UTF-8]
///   - [offset] (relative to the data blob)
///   - [size]
/// - data blob: every resource's bytes back to back, in table order
///
/// Offsets are a running sum of the sizes pushed so far, so entries can only be
/// appended in the order they should appear.
#[derive(Debug, Default)]
pub struct PakBuilder {
    entries: Vec<Entry>,
    sources: HashMap<String, PathBuf>,
    data: Vec<u8>,
}

impl PakBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Source file recorded for `name`, if it has been pushed.
    pub fn source_of(&self, name: &str) -> Option<&Path> {
        self.sources.get(name).map(PathBuf::as_path)
    }

    /// Append a resource. Fails with `DuplicateName` if `name` is already taken.
    pub fn push(&mut self, name: String, source: PathBuf, bytes: &[u8]) -> PakResult<&Entry> {
        match self.sources.entry(name.clone()) {
            Slot::Occupied(_) => return Err(PakError::DuplicateName(name)),
            Slot::Vacant(slot) => {
                slot.insert(source);
            }
        }

        let offset = self.data.len() as u64;
        self.data.extend_from_slice(bytes);
        self.entries.push(Entry {
            name,
            offset,
            size: bytes.len() as u64,
        });

        let last = self.entries.len() - 1;
        Ok(&self.entries[last])
    }

    pub fn archive_len(&self) -> u64 {
        archive_len(&self.entries)
    }

    pub fn write_to(&self, w: &mut dyn Write) -> PakResult<()> {
        write_table(w, &self.entries)?;
        w.write_all(&self.data)?;
        Ok(())
    }

    pub fn to_bytes(&self) -> PakResult<Vec<u8>> {
        let mut out = Vec::with_capacity(self.archive_len() as usize);
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Create `output` and write the archive into it.
    pub fn write_file(&self, output: &Path) -> PakResult<()> {
        let mut out = BufWriter::new(File::create(output)?);
        self.write_to(&mut out)?;
        out.flush()?;
        Ok(())
    }
}

/// Collect `inputs` into a builder, deriving every name relative to `root`.
///
/// Nothing is written here: every input exists and every name is unique once this
/// returns `Ok`. Unless `quiet`, each derived name is printed to stdout as it is processed.
pub fn collect(root: &Path, inputs: &[PathBuf], quiet: bool) -> PakResult<PakBuilder> {
    let stdout = std::io::stdout();
    collect_into(root, inputs, quiet, &mut stdout.lock())
}

/// Same as [`collect`], with the name lines going to `names` instead of stdout.
pub fn collect_into(
    root: &Path,
    inputs: &[PathBuf],
    quiet: bool,
    names: &mut dyn Write,
) -> PakResult<PakBuilder> {
    for input in inputs {
        if !input.exists() {
            return Err(PakError::MissingInput(input.clone()));
        }
    }

    let root = root
        .canonicalize()
        .map_err(|_| PakError::MissingInput(root.to_path_buf()))?;
    let files = expand_inputs(inputs)?;
    debug!("packing {} files under {}", files.len(), root.display());

    let mut builder = PakBuilder::new();
    for given in files {
        let file = given.canonicalize()?;
        let name = derive_name(&root, &file)?;

        if !quiet {
            writeln!(names, "{name}")?;
        }

        // Only the exact path listed again is forgiven; another spelling of it is not.
        if let Some(prev) = builder.source_of(&name) {
            if prev == given.as_path() {
                warn!("{} listed more than once, skipping", given.display());
                continue;
            }
            return Err(PakError::DuplicateName(name));
        }

        let bytes = std::fs::read(&file)?;
        let e = builder.push(name, given, &bytes)?;
        debug!("{} off={} len={}", e.name, e.offset, e.size);
    }

    Ok(builder)
}

/// Build the archive at `output` from `inputs`. The output is only touched after
/// every input has been read.
pub fn build(root: &Path, output: &Path, inputs: &[PathBuf], quiet: bool) -> PakResult<PakBuilder> {
    let builder = collect(root, inputs, quiet)?;
    builder.write_file(output)?;
    info!(
        "wrote {} entries ({} bytes) to {}",
        builder.entries().len(),
        builder.archive_len(),
        output.display()
    );
    Ok(builder)
}
