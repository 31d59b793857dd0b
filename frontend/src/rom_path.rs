//! ROM path resolution: a ZIP archive, a rompath directory holding
//! `<rom_name>.zip`, or a directory of loose ROM files.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use nichi_machines::rom_loader::{RomLoadError, RomSet};

fn invalid_zip(context: &str, err: zip::result::ZipError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, format!("{context}: {err}"))
}

/// Load every file reachable from `path` into a [`RomSet`].
///
/// A path ending in `.zip` is read as an archive. A directory is searched
/// for `<rom_name>.zip` first and otherwise read as loose files.
pub fn load_rom_set(rom_name: &str, path: &Path) -> Result<RomSet, RomLoadError> {
    if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
    {
        return load_from_zip(path);
    }

    if path.is_dir() {
        let zip_path = path.join(format!("{rom_name}.zip"));
        if zip_path.is_file() {
            return load_from_zip(&zip_path);
        }
        tracing::debug!(dir = %path.display(), "no {rom_name}.zip, reading loose files");
        return RomSet::from_directory(path);
    }

    Err(RomLoadError::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("ROM path not found: {}", path.display()),
    )))
}

fn load_from_zip(path: &Path) -> Result<RomSet, RomLoadError> {
    let reader = BufReader::new(File::open(path)?);
    let mut archive =
        zip::ZipArchive::new(reader).map_err(|e| invalid_zip("invalid ZIP", e))?;

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| invalid_zip("ZIP entry error", e))?;
        if entry.is_dir() {
            continue;
        }
        // Some archives nest files one directory deep.
        let name = entry
            .name()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut data)?;
        entries.push((name, data));
    }

    tracing::debug!(archive = %path.display(), files = entries.len(), "ROM archive read");
    Ok(RomSet::from_entries(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_zip(path: &Path, files: &[(&str, &[u8])]) {
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for (name, data) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn archive_path_is_read_directly() {
        let dir = scratch_dir("nichi_rompath_zip");
        let zip_path = dir.join("wiping.zip");
        write_zip(&zip_path, &[("wip-g13.bin", &[0xAA; 0x20])]);

        let set = load_rom_set("wiping", &zip_path).unwrap();
        assert_eq!(set.get("wip-g13.bin"), Some(&[0xAA; 0x20][..]));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn rompath_directory_prefers_named_archive() {
        let dir = scratch_dir("nichi_rompath_dir");
        write_zip(&dir.join("gomoku.zip"), &[("gomoku/rj_6.4r", &[0xBB; 8])]);
        std::fs::write(dir.join("stray.bin"), [0u8; 4]).unwrap();

        let set = load_rom_set("gomoku", &dir).unwrap();
        assert_eq!(set.get("rj_6.4r"), Some(&[0xBB; 8][..]));
        assert_eq!(set.get("stray.bin"), None);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn loose_files_are_the_fallback() {
        let dir = scratch_dir("nichi_rompath_loose");
        std::fs::write(dir.join("rj_prom.8n"), [0xCC; 4]).unwrap();

        let set = load_rom_set("gomoku", &dir).unwrap();
        assert_eq!(set.get("rj_prom.8n"), Some(&[0xCC; 4][..]));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_path_is_not_found() {
        let err = load_rom_set("wiping", Path::new("/nonexistent/nichi/roms")).unwrap_err();
        assert!(matches!(err, RomLoadError::Io(e) if e.kind() == std::io::ErrorKind::NotFound));
    }
}
