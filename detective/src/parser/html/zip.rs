//! Minimal in-memory ZIP reader for embedded report archives.
//!
//! Supports single-disk Zip32 archives with stored or deflated entries,
//! which is what HTML reporters embed. Anything else (Zip64, encryption,
//! other compression methods) reads as a missing entry.

use std::io::Read;

use flate2::read::DeflateDecoder;

const SIG_EOCD: u32 = 0x0605_4b50;
const SIG_CDFH: u32 = 0x0201_4b50;
const SIG_LFH: u32 = 0x0403_4b50;

const EOCD_MIN_LEN: usize = 22;
const EOCD_SEARCH_MAX: usize = 66 * 1024; // 64 KiB comment + header margin
const CDFH_LEN: usize = 46;
const LFH_LEN: usize = 30;

const METHOD_STORED: u16 = 0;
const METHOD_DEFLATE: u16 = 8;

/// Upper bound on a single decompressed entry.
const MAX_ENTRY_SIZE: u64 = 256 * 1024 * 1024;

#[derive(Debug, Clone)]
struct ZipEntry {
    name: String,
    method: u16,
    flags: u16,
    compressed_size: usize,
    local_header_offset: usize,
}

/// Central directory of an archive held in memory.
#[derive(Debug)]
pub(crate) struct ZipArchive<'a> {
    data: &'a [u8],
    entries: Vec<ZipEntry>,
}

impl<'a> ZipArchive<'a> {
    /// Reads the central directory. Returns `None` for malformed archives.
    pub(crate) fn open(data: &'a [u8]) -> Option<Self> {
        if data.len() < EOCD_MIN_LEN {
            return None;
        }
        let window_start = data.len().saturating_sub(EOCD_SEARCH_MAX);
        let eocd = window_start + rfind_sig(&data[window_start..], SIG_EOCD)?;
        if eocd + EOCD_MIN_LEN > data.len() {
            return None;
        }

        let entries_total = le_u16(data, eocd + 10)? as usize;
        let cd_size = le_u32(data, eocd + 12)? as usize;
        let cd_off = le_u32(data, eocd + 16)? as usize;
        if cd_off.checked_add(cd_size)? > data.len() {
            return None;
        }

        let mut entries = Vec::with_capacity(entries_total);
        let mut cursor = cd_off;
        for _ in 0..entries_total {
            if le_u32(data, cursor)? != SIG_CDFH {
                return None;
            }
            let header = data.get(cursor..cursor + CDFH_LEN)?;
            let name_len = le_u16(header, 28)? as usize;
            let extra_len = le_u16(header, 30)? as usize;
            let comment_len = le_u16(header, 32)? as usize;
            let name_start = cursor + CDFH_LEN;
            let name = data.get(name_start..name_start + name_len)?;

            entries.push(ZipEntry {
                name: String::from_utf8_lossy(name).into_owned(),
                flags: le_u16(header, 8)?,
                method: le_u16(header, 10)?,
                compressed_size: le_u32(header, 20)? as usize,
                local_header_offset: le_u32(header, 42)? as usize,
            });
            cursor = name_start + name_len + extra_len + comment_len;
        }

        Some(Self { data, entries })
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    /// Decompresses the entry called `name`.
    pub(crate) fn read(&self, name: &str) -> Option<Vec<u8>> {
        let entry = self.entries.iter().find(|entry| entry.name == name)?;
        if entry.flags & 0x1 != 0 {
            return None;
        }

        let lfh = entry.local_header_offset;
        if le_u32(self.data, lfh)? != SIG_LFH {
            return None;
        }
        let name_len = le_u16(self.data, lfh + 26)? as usize;
        let extra_len = le_u16(self.data, lfh + 28)? as usize;
        let data_start = lfh + LFH_LEN + name_len + extra_len;
        let compressed = self
            .data
            .get(data_start..data_start.checked_add(entry.compressed_size)?)?;

        let mut out = Vec::new();
        match entry.method {
            METHOD_STORED => out.extend_from_slice(compressed),
            METHOD_DEFLATE => {
                DeflateDecoder::new(compressed)
                    .take(MAX_ENTRY_SIZE)
                    .read_to_end(&mut out)
                    .ok()?;
            }
            _ => return None,
        }
        Some(out)
    }
}

fn rfind_sig(hay: &[u8], sig: u32) -> Option<usize> {
    let needle = sig.to_le_bytes();
    hay.windows(4).rposition(|window| window == needle)
}

fn le_u16(b: &[u8], at: usize) -> Option<u16> {
    let bytes = b.get(at..at + 2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn le_u32(b: &[u8], at: usize) -> Option<u32> {
    let bytes = b.get(at..at + 4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Builds an archive in memory. Entries are deflated when `deflate` is set.
#[cfg(test)]
pub(crate) fn build_zip(entries: &[(&str, &[u8])], deflate: bool) -> Vec<u8> {
    use std::io::Write;

    use flate2::write::DeflateEncoder;
    use flate2::Compression;

    let mut out = Vec::new();
    let mut central = Vec::new();
    for (name, content) in entries {
        let (method, payload) = if deflate {
            let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(content).unwrap();
            (METHOD_DEFLATE, encoder.finish().unwrap())
        } else {
            (METHOD_STORED, content.to_vec())
        };
        let offset = out.len() as u32;

        out.extend_from_slice(&SIG_LFH.to_le_bytes());
        out.extend_from_slice(&[20, 0, 0, 0]);
        out.extend_from_slice(&method.to_le_bytes());
        out.extend_from_slice(&[0; 8]); // time, date, crc
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(&(content.len() as u32).to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(&payload);

        central.extend_from_slice(&SIG_CDFH.to_le_bytes());
        central.extend_from_slice(&[20, 0, 20, 0, 0, 0]);
        central.extend_from_slice(&method.to_le_bytes());
        central.extend_from_slice(&[0; 8]);
        central.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        central.extend_from_slice(&(content.len() as u32).to_le_bytes());
        central.extend_from_slice(&(name.len() as u16).to_le_bytes());
        central.extend_from_slice(&[0; 12]); // extra, comment, disk, attrs
        central.extend_from_slice(&offset.to_le_bytes());
        central.extend_from_slice(name.as_bytes());
    }

    let cd_off = out.len() as u32;
    out.extend_from_slice(&central);
    out.extend_from_slice(&SIG_EOCD.to_le_bytes());
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    out.extend_from_slice(&(central.len() as u32).to_le_bytes());
    out.extend_from_slice(&cd_off.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_stored_entries() {
        let data = build_zip(&[("report.json", b"{\"files\":[]}"), ("abc.json", b"{}")], false);
        let archive = ZipArchive::open(&data).unwrap();
        assert_eq!(archive.names().collect::<Vec<_>>(), vec!["report.json", "abc.json"]);
        assert_eq!(archive.read("report.json").unwrap(), b"{\"files\":[]}");
    }

    #[test]
    fn test_reads_deflated_entries() {
        let content = "x".repeat(10_000);
        let data = build_zip(&[("big.txt", content.as_bytes())], true);
        assert!(data.len() < 1_000);
        let archive = ZipArchive::open(&data).unwrap();
        assert_eq!(archive.read("big.txt").unwrap(), content.as_bytes());
    }

    #[test]
    fn test_missing_entry_and_garbage() {
        let data = build_zip(&[("a", b"1")], false);
        assert!(ZipArchive::open(&data).unwrap().read("b").is_none());
        assert!(ZipArchive::open(b"definitely not a zip archive").is_none());
        assert!(ZipArchive::open(&data[..data.len() - 4]).is_none());
    }
}
