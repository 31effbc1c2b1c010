#![forbid(unsafe_code)]

use std::collections::hash_map::{Entry as Slot, HashMap};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use log::warn;

use crate::pak::error::{PakError, PakResult};
use crate::pak::format::Entry;
use crate::pak::io::{read_len, read_u64};

/// Upper bound on entries preallocated from an untrusted count field.
const MAX_PREALLOC: usize = 4096;

/// Parse the resource table from the start of an archive.
///
/// The reader is left positioned at the first byte of the data blob.
pub fn read_table(r: &mut dyn Read) -> PakResult<Vec<Entry>> {
    let count = read_len(r)?;
    let mut out: Vec<Entry> = Vec::with_capacity(count.min(MAX_PREALLOC));

    for _ in 0..count {
        let name_len = read_len(r)?;
        let mut name_bytes = Vec::new();
        (&mut *r).take(name_len as u64).read_to_end(&mut name_bytes)?;
        if name_bytes.len() != name_len {
            return Err(PakError::Invalid("truncated entry name".into()));
        }
        let name = String::from_utf8(name_bytes)
            .map_err(|_| PakError::Invalid("name is not utf8".into()))?;

        let offset = read_u64(r)?;
        let size = read_u64(r)?;
        out.push(Entry { name, offset, size });
    }

    Ok(out)
}

/// Map names to table positions. The first occurrence of a name wins.
fn index_entries(entries: &[Entry]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(entries.len());
    for (i, e) in entries.iter().enumerate() {
        match index.entry(e.name.clone()) {
            Slot::Occupied(_) => warn!("duplicate resource name in table: {}", e.name),
            Slot::Vacant(slot) => {
                slot.insert(i);
            }
        }
    }
    index
}

fn check_bounds(entries: &[Entry], blob_len: u64) -> PakResult<()> {
    for e in entries {
        match e.offset.checked_add(e.size) {
            Some(end) if end <= blob_len => {}
            _ => {
                return Err(PakError::Invalid(format!("payload outside file: {}", e.name)));
            }
        }
    }
    Ok(())
}

/// Check everything the builder guarantees about a table: unique names, offsets
/// packed from zero in table order, and a blob exactly as long as the sizes add up to.
pub fn check_layout(entries: &[Entry], blob_len: u64) -> PakResult<()> {
    check_bounds(entries, blob_len)?;

    let mut seen = HashSet::with_capacity(entries.len());
    let mut expected_offset = 0u64;
    for e in entries {
        if !seen.insert(e.name.as_str()) {
            return Err(PakError::Invalid(format!("duplicate name: {}", e.name)));
        }
        if e.offset != expected_offset {
            return Err(PakError::Invalid(format!(
                "offset {} of {} does not follow previous entry (expected {expected_offset})",
                e.offset, e.name
            )));
        }
        expected_offset = e.end();
    }

    if expected_offset != blob_len {
        return Err(PakError::Invalid(format!(
            "data blob is {blob_len} bytes, table accounts for {expected_offset}"
        )));
    }
    Ok(())
}

/// Zero-copy view over an archive already in memory.
#[derive(Debug)]
pub struct PakView<'a> {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
    blob: &'a [u8],
}

impl<'a> PakView<'a> {
    pub fn parse(bytes: &'a [u8]) -> PakResult<Self> {
        let mut cur = Cursor::new(bytes);
        let entries = read_table(&mut cur)?;
        let blob = &bytes[cur.position() as usize..];
        check_bounds(&entries, blob.len() as u64)?;

        let index = index_entries(&entries);
        Ok(Self { entries, index, blob })
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn blob(&self) -> &'a [u8] {
        self.blob
    }

    pub fn get(&self, name: &str) -> Option<&'a [u8]> {
        let e = &self.entries[*self.index.get(name)?];
        Some(self.slice(e))
    }

    /// Entries paired with their bytes, in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&Entry, &'a [u8])> + '_ {
        self.entries.iter().map(move |e| (e, self.slice(e)))
    }

    fn slice(&self, e: &Entry) -> &'a [u8] {
        // Bounds were checked in parse.
        let blob = self.blob;
        &blob[e.offset as usize..e.end() as usize]
    }
}

/// File-backed archive: the table is kept in memory, payloads are read on demand.
#[derive(Debug)]
pub struct PakFile {
    file: File,
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
    data_start: u64,
    blob_len: u64,
}

impl PakFile {
    pub fn open(path: &Path) -> PakResult<Self> {
        let mut r = BufReader::new(File::open(path)?);
        let entries = read_table(&mut r)?;
        let data_start = r.stream_position()?;
        let file = r.into_inner();

        let file_len = file.metadata()?.len();
        let blob_len = file_len
            .checked_sub(data_start)
            .ok_or_else(|| PakError::Invalid("file too small".into()))?;
        check_bounds(&entries, blob_len)?;

        let index = index_entries(&entries);
        Ok(Self {
            file,
            entries,
            index,
            data_start,
            blob_len,
        })
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn blob_len(&self) -> u64 {
        self.blob_len
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Read the resource called `name`.
    pub fn read(&mut self, name: &str) -> PakResult<Vec<u8>> {
        let i = *self
            .index
            .get(name)
            .ok_or_else(|| PakError::NotFound(name.to_string()))?;
        let e = self.entries[i].clone();
        self.read_entry(&e)
    }

    pub fn read_entry(&mut self, e: &Entry) -> PakResult<Vec<u8>> {
        self.file.seek(SeekFrom::Start(self.data_start + e.offset))?;
        let mut payload = vec![0u8; e.size as usize];
        self.file.read_exact(&mut payload)?;
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pak::build::PakBuilder;
    use crate::pak::io::write_table;
    use std::path::PathBuf;

    fn sample() -> PakBuilder {
        let mut b = PakBuilder::new();
        b.push("icon_bang".into(), PathBuf::from("icon_bang.png"), b"PNG-bang").unwrap();
        b.push("fonts/arial".into(), PathBuf::from("fonts/arial.ttf"), b"").unwrap();
        b.push("background".into(), PathBuf::from("background.jpg"), b"JPEG!!").unwrap();
        b
    }

    fn raw(entries: &[Entry], blob: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        write_table(&mut out, entries).unwrap();
        out.extend_from_slice(blob);
        out
    }

    #[test]
    fn view_reconstructs_every_resource() {
        let bytes = sample().to_bytes().unwrap();
        let view = PakView::parse(&bytes).unwrap();

        assert_eq!(view.get("icon_bang"), Some(&b"PNG-bang"[..]));
        assert_eq!(view.get("fonts/arial"), Some(&b""[..]));
        assert_eq!(view.get("background"), Some(&b"JPEG!!"[..]));
        assert_eq!(view.get("missing"), None);

        let names: Vec<_> = view.iter().map(|(e, _)| e.name.as_str()).collect();
        assert_eq!(names, ["icon_bang", "fonts/arial", "background"]);
        check_layout(view.entries(), view.blob().len() as u64).unwrap();
    }

    #[test]
    fn file_reader_seeks_into_blob() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("media.pak");
        sample().write_file(&path).unwrap();

        let mut pak = PakFile::open(&path).unwrap();
        assert_eq!(pak.entries().len(), 3);
        assert_eq!(pak.blob_len(), 14);
        assert_eq!(pak.read("background").unwrap(), b"JPEG!!");
        assert_eq!(pak.read("icon_bang").unwrap(), b"PNG-bang");
        assert!(pak.contains("fonts/arial"));
        assert!(matches!(pak.read("nope"), Err(PakError::NotFound(_))));
    }

    #[test]
    fn empty_archive_parses() {
        let bytes = 0u64.to_le_bytes();
        let view = PakView::parse(&bytes).unwrap();
        assert!(view.entries().is_empty());
        assert!(view.blob().is_empty());
    }

    #[test]
    fn truncated_table_is_rejected() {
        let bytes = sample().to_bytes().unwrap();
        assert!(PakView::parse(&bytes[..20]).is_err());
        assert!(PakView::parse(&bytes[..4]).is_err());
    }

    #[test]
    fn huge_name_length_does_not_allocate() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u64.to_le_bytes());
        bytes.extend_from_slice(&(u32::MAX as u64).to_le_bytes());
        bytes.extend_from_slice(b"abc");
        assert!(matches!(PakView::parse(&bytes), Err(PakError::Invalid(_))));
    }

    #[test]
    fn out_of_range_payload_is_rejected() {
        let entries = vec![Entry { name: "a".into(), offset: 2, size: 5 }];
        let bytes = raw(&entries, b"abcd");
        assert!(matches!(PakView::parse(&bytes), Err(PakError::Invalid(_))));

        let entries = vec![Entry { name: "a".into(), offset: u64::MAX, size: 2 }];
        let bytes = raw(&entries, b"abcd");
        assert!(matches!(PakView::parse(&bytes), Err(PakError::Invalid(_))));
    }

    #[test]
    fn first_duplicate_wins_on_lookup() {
        let entries = vec![
            Entry { name: "a".into(), offset: 0, size: 1 },
            Entry { name: "a".into(), offset: 1, size: 1 },
        ];
        let bytes = raw(&entries, b"12");
        let view = PakView::parse(&bytes).unwrap();
        assert_eq!(view.get("a"), Some(&b"1"[..]));
        assert!(check_layout(view.entries(), 2).is_err());
    }

    #[test]
    fn layout_check_catches_gaps_and_trailing_bytes() {
        let gap = vec![
            Entry { name: "a".into(), offset: 0, size: 1 },
            Entry { name: "b".into(), offset: 2, size: 1 },
        ];
        assert!(check_layout(&gap, 3).is_err());

        let packed = vec![
            Entry { name: "a".into(), offset: 0, size: 1 },
            Entry { name: "b".into(), offset: 1, size: 1 },
        ];
        check_layout(&packed, 2).unwrap();
        assert!(check_layout(&packed, 3).is_err());
    }
}
