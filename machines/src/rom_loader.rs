//! ROM set loading for the video boards.
//!
//! A board describes each of its ROM regions (color PROMs, graphics ROMs,
//! board tables) as a [`RomRegion`]: a named byte range assembled from one or
//! more files of a [`RomSet`]. Files are checked for size and, when a
//! checksum is declared, for CRC-32.

use std::collections::HashMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// CRC-32
// ---------------------------------------------------------------------------

/// Reflected CRC-32 (polynomial 0xEDB88320), as used by ZIP and ROM
/// databases.
const CRC32_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ 0xEDB8_8320
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
};

pub fn crc32(data: &[u8]) -> u32 {
    !data.iter().fold(!0u32, |crc, &byte| {
        (crc >> 8) ^ CRC32_TABLE[((crc ^ u32::from(byte)) & 0xFF) as usize]
    })
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RomLoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing ROM file: {0}")]
    MissingFile(String),

    #[error("ROM {file}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        file: String,
        expected: usize,
        actual: usize,
    },

    #[error("ROM {file}: CRC32 expected 0x{expected:08X}, got 0x{actual:08X}")]
    ChecksumMismatch {
        file: String,
        expected: u32,
        actual: u32,
    },
}

// ---------------------------------------------------------------------------
// RomSet
// ---------------------------------------------------------------------------

/// ROM files by name, as found in a ROM directory or archive.
#[derive(Debug, Default)]
pub struct RomSet {
    files: HashMap<String, Vec<u8>>,
}

impl RomSet {
    /// Every regular file directly inside `path`, keyed by file name.
    pub fn from_directory(path: &Path) -> Result<Self, RomLoadError> {
        let mut files = HashMap::new();
        for entry in std::fs::read_dir(path)? {
            let file_path = entry?.path();
            if !file_path.is_file() {
                continue;
            }
            if let Some(name) = file_path.file_name() {
                let data = std::fs::read(&file_path)?;
                files.insert(name.to_string_lossy().into_owned(), data);
            }
        }
        Ok(Self { files })
    }

    /// Owned (name, data) pairs, e.g. the entries of a ZIP archive.
    pub fn from_entries(entries: Vec<(String, Vec<u8>)>) -> Self {
        Self {
            files: entries.into_iter().collect(),
        }
    }

    /// Borrowed (name, data) pairs, mostly for tests.
    pub fn from_slices(entries: &[(&str, &[u8])]) -> Self {
        Self {
            files: entries
                .iter()
                .map(|(name, data)| ((*name).to_string(), data.to_vec()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }

    /// File data, which must be exactly `size` bytes.
    pub fn require_sized(&self, name: &str, size: usize) -> Result<&[u8], RomLoadError> {
        let data = self
            .get(name)
            .ok_or_else(|| RomLoadError::MissingFile(name.to_string()))?;
        if data.len() != size {
            return Err(RomLoadError::SizeMismatch {
                file: name.to_string(),
                expected: size,
                actual: data.len(),
            });
        }
        Ok(data)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Region descriptions
// ---------------------------------------------------------------------------

/// One file of a region: where it lands and how to validate it.
pub struct RomEntry {
    pub name: &'static str,
    pub size: usize,
    pub offset: usize,
    /// `None` accepts any contents.
    pub crc32: Option<u32>,
}

/// A named block of ROM data assembled from [`RomEntry`] files. Bytes no
/// entry covers stay 0.
pub struct RomRegion {
    /// Region tag used in diagnostics ("proms", "gfx1", ...).
    pub tag: &'static str,
    pub size: usize,
    pub entries: &'static [RomEntry],
}

impl RomRegion {
    /// Assemble the region, validating sizes and checksums.
    pub fn load(&self, rom_set: &RomSet) -> Result<Vec<u8>, RomLoadError> {
        self.assemble(rom_set, true)
    }

    /// Assemble the region, validating sizes only.
    pub fn load_skip_checksums(&self, rom_set: &RomSet) -> Result<Vec<u8>, RomLoadError> {
        self.assemble(rom_set, false)
    }

    /// [`load`](Self::load) into a fixed-size array; `N` must equal the
    /// region size.
    pub fn load_array<const N: usize>(&self, rom_set: &RomSet) -> Result<[u8; N], RomLoadError> {
        debug_assert_eq!(N, self.size, "region '{}' size mismatch", self.tag);
        let mut out = [0u8; N];
        out.copy_from_slice(&self.load(rom_set)?);
        Ok(out)
    }

    fn assemble(&self, rom_set: &RomSet, verify: bool) -> Result<Vec<u8>, RomLoadError> {
        let mut region = vec![0u8; self.size];

        for entry in self.entries {
            debug_assert!(
                entry.offset + entry.size <= self.size,
                "'{}' overruns region '{}'",
                entry.name,
                self.tag
            );

            let data = rom_set.require_sized(entry.name, entry.size)?;
            if verify && let Some(expected) = entry.crc32 {
                let actual = crc32(data);
                if actual != expected {
                    return Err(RomLoadError::ChecksumMismatch {
                        file: entry.name.to_string(),
                        expected,
                        actual,
                    });
                }
            }
            region[entry.offset..entry.offset + entry.size].copy_from_slice(data);
        }

        tracing::debug!(region = self.tag, bytes = self.size, "ROM region loaded");
        Ok(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SPLIT_PROMS: RomRegion = RomRegion {
        tag: "proms",
        size: 6,
        entries: &[
            RomEntry {
                name: "pal.bin",
                size: 2,
                offset: 0,
                crc32: None,
            },
            RomEntry {
                name: "lut.bin",
                size: 3,
                offset: 2,
                crc32: None,
            },
        ],
    };

    static CHECKED: RomRegion = RomRegion {
        tag: "gfx1",
        size: 9,
        entries: &[RomEntry {
            name: "digits.bin",
            size: 9,
            offset: 0,
            crc32: Some(0xCBF4_3926),
        }],
    };

    #[test]
    fn crc32_reference_vectors() {
        assert_eq!(crc32(b""), 0);
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
        assert_eq!(crc32(&[0x00]), 0xD202_EF8D);
    }

    #[test]
    fn region_is_assembled_with_zero_gap() {
        let set = RomSet::from_slices(&[("pal.bin", &[1, 2]), ("lut.bin", &[3, 4, 5])]);
        assert_eq!(SPLIT_PROMS.load(&set).unwrap(), vec![1, 2, 3, 4, 5, 0]);
        assert_eq!(SPLIT_PROMS.load_array::<6>(&set).unwrap(), [1, 2, 3, 4, 5, 0]);
    }

    #[test]
    fn missing_file_is_reported_by_name() {
        let set = RomSet::from_slices(&[("pal.bin", &[1, 2])]);
        match SPLIT_PROMS.load(&set) {
            Err(RomLoadError::MissingFile(name)) => assert_eq!(name, "lut.bin"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn wrong_size_is_rejected_even_without_checksums() {
        let set = RomSet::from_slices(&[("pal.bin", &[1, 2, 3]), ("lut.bin", &[3, 4, 5])]);
        assert!(matches!(
            SPLIT_PROMS.load_skip_checksums(&set),
            Err(RomLoadError::SizeMismatch {
                expected: 2,
                actual: 3,
                ..
            })
        ));
    }

    #[test]
    fn checksum_is_verified_unless_skipped() {
        let good = RomSet::from_slices(&[("digits.bin", b"123456789")]);
        assert!(CHECKED.load(&good).is_ok());

        let bad = RomSet::from_slices(&[("digits.bin", b"987654321")]);
        assert!(matches!(
            CHECKED.load(&bad),
            Err(RomLoadError::ChecksumMismatch { .. })
        ));
        assert_eq!(CHECKED.load_skip_checksums(&bad).unwrap(), b"987654321");
    }

    #[test]
    fn error_messages_name_the_file() {
        let err = RomLoadError::SizeMismatch {
            file: "wip-d11.bin".into(),
            expected: 4096,
            actual: 10,
        };
        assert_eq!(err.to_string(), "ROM wip-d11.bin: expected 4096 bytes, got 10");
    }

    #[test]
    fn directory_and_entries_constructors() {
        let dir = std::env::temp_dir().join("nichi_rom_loader_test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("pal.bin"), [0xAA, 0xBB]).unwrap();

        let set = RomSet::from_directory(&dir).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("pal.bin"), Some(&[0xAA, 0xBB][..]));
        std::fs::remove_dir_all(&dir).unwrap();

        let set = RomSet::from_entries(vec![("lut.bin".to_string(), vec![7; 3])]);
        assert_eq!(set.get("lut.bin"), Some(&[7, 7, 7][..]));
        assert!(!set.is_empty());
    }
}
