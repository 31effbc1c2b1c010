#![forbid(unsafe_code)]

use std::io::{Read, Write};

use crate::pak::error::{PakError, PakResult};
use crate::pak::format::Entry;

pub fn write_u64(w: &mut dyn Write, v: u64) -> PakResult<()> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

pub fn read_exact<const N: usize>(r: &mut dyn Read) -> PakResult<[u8; N]> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

pub fn read_u64(r: &mut dyn Read) -> PakResult<u64> {
    Ok(u64::from_le_bytes(read_exact::<8>(r)?))
}

/// Read a u64 length field and make sure it fits in memory on this host.
pub fn read_len(r: &mut dyn Read) -> PakResult<usize> {
    let v = read_u64(r)?;
    usize::try_from(v).map_err(|_| PakError::Invalid(format!("length {v} does not fit in memory")))
}

/// Serialize the resource table: count, then name/offset/size per entry.
pub fn write_table(w: &mut dyn Write, entries: &[Entry]) -> PakResult<()> {
    write_u64(w, entries.len() as u64)?;
    for e in entries {
        let name = e.name.as_bytes();
        write_u64(w, name.len() as u64)?;
        w.write_all(name)?;
        write_u64(w, e.offset)?;
        write_u64(w, e.size)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_bytes_are_little_endian_and_unpadded() {
        let entries = vec![Entry { name: "ab".into(), offset: 1, size: 0x0203 }];
        let mut buf = Vec::new();
        write_table(&mut buf, &entries).unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(&1u64.to_le_bytes());
        expected.extend_from_slice(&2u64.to_le_bytes());
        expected.extend_from_slice(b"ab");
        expected.extend_from_slice(&1u64.to_le_bytes());
        expected.extend_from_slice(&0x0203u64.to_le_bytes());
        assert_eq!(buf, expected);
    }

    #[test]
    fn truncated_u64_is_an_io_error() {
        let mut cur = std::io::Cursor::new(vec![1u8, 2, 3]);
        assert!(matches!(read_u64(&mut cur), Err(PakError::Io(_))));
    }
}
