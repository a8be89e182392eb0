//! Archive download and extraction.
//!
//! ```no_run
//! use melset_dl::dl::download_and_extract;
//! use std::path::Path;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! download_and_extract(
//!     "https://www.openslr.org/resources/12/dev-clean.tar.gz",
//!     Path::new("./data"),
//! )?;
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tar::Archive;

/// Download `url` to `dest`, writing through a `.part` file first.
///
/// An interrupted transfer never leaves a truncated file at `dest`.
pub fn download(url: &str, dest: &Path) -> Result<u64> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(url, dest = ?dest.display(), "downloading archive");

    let mut response = reqwest::blocking::get(url)?.error_for_status()?;

    let part = dest.with_extension("part");
    let mut file = File::create(&part)?;
    let bytes = response.copy_to(&mut file)?;
    file.sync_all()?;
    drop(file);

    std::fs::rename(&part, dest)?;

    tracing::info!(bytes, dest = ?dest.display(), "download finished");

    Ok(bytes)
}

/// Unpack a `.tar.gz` archive into `dest`.
pub fn extract(archive: &Path, dest: &Path) -> Result<()> {
    tracing::info!(archive = ?archive.display(), dest = ?dest.display(), "extracting archive");

    let file = File::open(archive)?;
    let mut archive = Archive::new(GzDecoder::new(BufReader::new(file)));
    archive.unpack(dest)?;

    Ok(())
}

/// Download the archive at `url` into `root` unless already present, then extract it.
///
/// Returns the archive path.
pub fn download_and_extract(url: &str, root: &Path) -> Result<PathBuf> {
    let file_name = url.rsplit('/').next().unwrap_or(url);
    let archive = root.join(file_name);

    if archive.is_file() {
        tracing::debug!(archive = ?archive.display(), "archive already downloaded");
    } else {
        download(url, &archive)?;
    }

    extract(&archive, root)?;

    Ok(archive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;

    fn create_test_archive(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));

        for (name, content) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, content.as_bytes()).unwrap();
        }

        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn extracts_nested_entries() {
        let dir = std::env::temp_dir().join("melset_dl_extract");
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).unwrap();

        let archive = dir.join("tiny.tar.gz");
        create_test_archive(
            &archive,
            &[
                ("LibriSpeech/README.TXT", "readme"),
                ("LibriSpeech/tiny/1/2/1-2.trans.txt", "1-2-0000 HELLO\n"),
            ],
        );

        extract(&archive, &dir).unwrap();

        let transcript = std::fs::read_to_string(dir.join("LibriSpeech/tiny/1/2/1-2.trans.txt"));
        assert_eq!(transcript.unwrap(), "1-2-0000 HELLO\n");
        assert!(dir.join("LibriSpeech/README.TXT").is_file());

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn reuses_existing_archive() {
        let dir = std::env::temp_dir().join("melset_dl_reuse");
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).unwrap();

        create_test_archive(&dir.join("tiny.tar.gz"), &[("LibriSpeech/tiny/a.txt", "a")]);

        // unroutable URL: only reached if the cached archive were ignored
        let archive = download_and_extract("http://127.0.0.1:9/tiny.tar.gz", &dir).unwrap();

        assert_eq!(archive, dir.join("tiny.tar.gz"));
        assert!(dir.join("LibriSpeech/tiny/a.txt").is_file());

        std::fs::remove_dir_all(dir).ok();
    }
}
