#![forbid(unsafe_code)]

/// Width of every integer field in the archive (u64, little-endian).
pub const INT_LEN: u64 = 8;

/// Fixed per-entry overhead: name length, offset and size fields.
pub const ENTRY_FIXED_LEN: u64 = 3 * INT_LEN;

/// One row of the resource table.
///
/// `offset` is relative to the start of the data blob, not to the start of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub offset: u64,
    pub size: u64,
}

impl Entry {
    /// One past the last blob byte of this entry. Saturates for tables that were
    /// never bounds-checked.
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.size)
    }

    /// Bytes this entry occupies in the table.
    pub fn encoded_len(&self) -> u64 {
        ENTRY_FIXED_LEN + self.name.len() as u64
    }
}

/// Length of the serialized table, count field included.
pub fn table_len(entries: &[Entry]) -> u64 {
    INT_LEN + entries.iter().map(Entry::encoded_len).sum::<u64>()
}

/// Length of the whole archive: table followed by the data blob.
pub fn archive_len(entries: &[Entry]) -> u64 {
    table_len(entries) + entries.iter().map(|e| e.size).sum::<u64>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_archive_is_just_the_count() {
        assert_eq!(table_len(&[]), 8);
        assert_eq!(archive_len(&[]), 8);
    }

    #[test]
    fn archive_len_counts_names_fields_and_payload() {
        let entries = vec![
            Entry { name: "a".into(), offset: 0, size: 3 },
            Entry { name: "sub/b".into(), offset: 3, size: 10 },
        ];
        assert_eq!(table_len(&entries), 8 + (24 + 1) + (24 + 5));
        assert_eq!(archive_len(&entries), 8 + 25 + 29 + 13);
        assert_eq!(entries[1].end(), 13);
    }

    #[test]
    fn end_saturates_on_hostile_offsets() {
        let e = Entry { name: "x".into(), offset: u64::MAX, size: 2 };
        assert_eq!(e.end(), u64::MAX);
    }
}
