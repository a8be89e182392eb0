//! LibriSpeech corpus: download, index and random access.
//!
//! Layout under `root`:
//!
//! ```text
//! LibriSpeech/<split>/<speaker>/<chapter>/<speaker>-<chapter>.trans.txt
//! LibriSpeech/<split>/<speaker>/<chapter>/<speaker>-<chapter>-<utterance>.flac
//! ```

use crate::dl::download_and_extract;
use crate::error::{Error, Result};
use melset_data::audio::load_audio;
use melset_data::traits::Corpus;
use melset_data::types::CorpusEntry;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Base URL of the OpenSLR LibriSpeech mirror
pub const BASE_URL: &str = "https://www.openslr.org/resources/12";

/// Directory the archives extract into
const FOLDER_IN_ARCHIVE: &str = "LibriSpeech";

/// Audio extensions tried for each utterance, in order
const AUDIO_EXTENSIONS: &[&str] = &["flac", "wav"];

/// LibriSpeech subset.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Split {
    DevClean,
    DevOther,
    #[default]
    TestClean,
    TestOther,
    #[value(name = "train-clean-100")]
    TrainClean100,
    #[value(name = "train-clean-360")]
    TrainClean360,
    #[value(name = "train-other-500")]
    TrainOther500,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::DevClean => "dev-clean",
            Split::DevOther => "dev-other",
            Split::TestClean => "test-clean",
            Split::TestOther => "test-other",
            Split::TrainClean100 => "train-clean-100",
            Split::TrainClean360 => "train-clean-360",
            Split::TrainOther500 => "train-other-500",
        }
    }

    /// Archive URL on OpenSLR.
    pub fn url(&self) -> String {
        format!("{BASE_URL}/{}.tar.gz", self.as_str())
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Indexed utterance; audio is decoded on access.
#[derive(Clone, Debug)]
pub struct Utterance {
    /// File id, e.g. `1089-134686-0000`
    pub id: String,
    pub speaker_id: u32,
    pub chapter_id: u32,
    pub utterance_id: u32,
    pub transcript: String,
    pub audio_path: PathBuf,
}

/// One LibriSpeech split on disk.
#[derive(Debug)]
pub struct LibriSpeech {
    path: PathBuf,
    utterances: Vec<Utterance>,
}

/// Download (if needed) and open a split under `root`.
///
/// The archive is fetched from OpenSLR and extracted when
/// `root/LibriSpeech/<split>` does not exist yet.
pub fn download_and_open(root: &Path, split: Split) -> Result<LibriSpeech> {
    let path = split_dir(root, split);

    if path.is_dir() {
        tracing::debug!(path = ?path.display(), "split already extracted");
    } else {
        download_and_extract(&split.url(), root)?;
    }

    LibriSpeech::open(root, split)
}

fn split_dir(root: &Path, split: Split) -> PathBuf {
    root.join(FOLDER_IN_ARCHIVE).join(split.as_str())
}

impl LibriSpeech {
    /// Index an extracted split under `root`.
    ///
    /// Utterances are ordered by file id.
    pub fn open(root: &Path, split: Split) -> Result<Self> {
        let path = split_dir(root, split);
        Self::open_dir(path)
    }

    /// Index a split directory directly.
    pub fn open_dir(path: PathBuf) -> Result<Self> {
        if !path.is_dir() {
            return Err(Error::MissingSplit { path });
        }

        let mut utterances = Vec::new();
        for transcript in transcript_files(&path)? {
            utterances.extend(parse_transcript(&transcript)?);
        }
        utterances.sort_by(|a, b| a.id.cmp(&b.id));

        tracing::info!(path = ?path.display(), utterances = utterances.len(), "indexed split");

        Ok(Self { path, utterances })
    }

    /// Split directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Indexed utterances in access order.
    pub fn utterances(&self) -> &[Utterance] {
        &self.utterances
    }
}

impl Corpus for LibriSpeech {
    fn len(&self) -> usize {
        self.utterances.len()
    }

    fn entry(&self, index: usize) -> melset_data::error::Result<CorpusEntry> {
        use melset_data::error::DatasetError;

        let utterance = self
            .utterances
            .get(index)
            .ok_or(DatasetError::IndexOutOfRange {
                index,
                len: self.utterances.len(),
            })?;

        let (waveform, sample_rate) = load_audio(&utterance.audio_path)?;

        Ok(CorpusEntry {
            waveform,
            sample_rate,
            transcript: utterance.transcript.clone(),
            speaker_id: utterance.speaker_id,
            chapter_id: utterance.chapter_id,
            utterance_id: utterance.utterance_id,
        })
    }
}

/// Collect `<speaker>/<chapter>/*.trans.txt` files.
fn transcript_files(split_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for speaker in sorted_dirs(split_dir)? {
        for chapter in sorted_dirs(&speaker)? {
            for entry in fs::read_dir(&chapter)? {
                let path = entry?.path();
                let is_transcript = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.ends_with(".trans.txt"));

                if is_transcript {
                    files.push(path);
                }
            }
        }
    }

    files.sort();
    Ok(files)
}

fn sorted_dirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Parse one chapter transcript, resolving each utterance's audio file.
fn parse_transcript(path: &Path) -> Result<Vec<Utterance>> {
    let chapter_dir = path.parent().unwrap_or(Path::new("."));
    let contents = fs::read_to_string(path)?;

    let mut utterances = Vec::new();
    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let malformed = || Error::MalformedTranscript {
            path: path.to_path_buf(),
            line: line_no + 1,
            content: line.to_string(),
        };

        let (id, transcript) = line.split_once(' ').ok_or_else(malformed)?;
        let (speaker_id, chapter_id, utterance_id) = parse_file_id(id).ok_or_else(malformed)?;

        let audio_path = AUDIO_EXTENSIONS
            .iter()
            .map(|ext| chapter_dir.join(format!("{id}.{ext}")))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| Error::MissingAudio {
                id: id.to_string(),
                dir: chapter_dir.to_path_buf(),
            })?;

        utterances.push(Utterance {
            id: id.to_string(),
            speaker_id,
            chapter_id,
            utterance_id,
            transcript: transcript.trim().to_string(),
            audio_path,
        });
    }

    Ok(utterances)
}

/// Split `1089-134686-0000` into speaker, chapter and utterance ids.
fn parse_file_id(id: &str) -> Option<(u32, u32, u32)> {
    let mut parts = id.split('-').map(str::parse::<u32>);
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(Ok(speaker)), Some(Ok(chapter)), Some(Ok(utterance)), None) => {
            Some((speaker, chapter, utterance))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};

    fn write_wav(path: &Path, samples: usize) {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for i in 0..samples {
            writer.write_sample((i % 100) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    /// Two speakers, listed out of order on disk.
    fn create_split(root: &Path) {
        let chapters = [
            ("2300", "131720", &["2300-131720-0001 SECOND", "2300-131720-0000 FIRST"][..]),
            ("1089", "134686", &["1089-134686-0000 HE HOPED THERE WOULD BE STEW"][..]),
        ];

        for (speaker, chapter, lines) in chapters {
            let dir = root.join("LibriSpeech/test-clean").join(speaker).join(chapter);
            fs::create_dir_all(&dir).unwrap();
            fs::write(
                dir.join(format!("{speaker}-{chapter}.trans.txt")),
                lines.join("\n") + "\n",
            )
            .unwrap();

            for line in lines {
                let id = line.split(' ').next().unwrap();
                write_wav(&dir.join(format!("{id}.wav")), 160);
            }
        }
    }

    fn temp_root(name: &str) -> PathBuf {
        let root = std::env::temp_dir().join(name);
        fs::remove_dir_all(&root).ok();
        fs::create_dir_all(&root).unwrap();
        root
    }

    #[test]
    fn indexes_in_file_id_order() {
        let root = temp_root("melset_librispeech_index");
        create_split(&root);

        let corpus = LibriSpeech::open(&root, Split::TestClean).unwrap();

        let ids: Vec<&str> = corpus.utterances().iter().map(|u| u.id.as_str()).collect();
        assert_eq!(
            ids,
            ["1089-134686-0000", "2300-131720-0000", "2300-131720-0001"]
        );
        assert_eq!(corpus.len(), 3);

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn reads_entry_audio_and_ids() {
        let root = temp_root("melset_librispeech_entry");
        create_split(&root);

        let corpus = LibriSpeech::open(&root, Split::TestClean).unwrap();
        let entry = corpus.entry(0).unwrap();

        assert_eq!(entry.sample_rate, 16000);
        assert_eq!(entry.waveform.dim(), (1, 160));
        assert_eq!(entry.transcript, "HE HOPED THERE WOULD BE STEW");
        assert_eq!(
            (entry.speaker_id, entry.chapter_id, entry.utterance_id),
            (1089, 134686, 0)
        );
        assert!(corpus.entry(3).is_err());

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn missing_split_is_an_error() {
        let root = temp_root("melset_librispeech_missing");

        let result = LibriSpeech::open(&root, Split::DevOther);

        assert!(matches!(result, Err(Error::MissingSplit { .. })));

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn rejects_malformed_line() {
        let root = temp_root("melset_librispeech_malformed");
        let dir = root.join("LibriSpeech/test-clean/1/2");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("1-2.trans.txt"), "1-2-0000 OK\nnot-an-id TEXT\n").unwrap();
        write_wav(&dir.join("1-2-0000.wav"), 16);

        let result = LibriSpeech::open(&root, Split::TestClean);

        assert!(matches!(
            result,
            Err(Error::MalformedTranscript { line: 2, .. })
        ));

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn missing_audio_is_an_error() {
        let root = temp_root("melset_librispeech_no_audio");
        let dir = root.join("LibriSpeech/test-clean/1/2");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("1-2.trans.txt"), "1-2-0000 OK\n").unwrap();

        let result = LibriSpeech::open(&root, Split::TestClean);

        assert!(matches!(result, Err(Error::MissingAudio { id, .. }) if id == "1-2-0000"));

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn parses_file_ids() {
        assert_eq!(parse_file_id("1089-134686-0000"), Some((1089, 134686, 0)));
        assert_eq!(parse_file_id("1089-134686"), None);
        assert_eq!(parse_file_id("1089-134686-0000-1"), None);
        assert_eq!(parse_file_id("a-b-c"), None);
    }

    #[test]
    fn split_urls() {
        assert_eq!(
            Split::TrainClean100.url(),
            "https://www.openslr.org/resources/12/train-clean-100.tar.gz"
        );
        assert_eq!(Split::default().to_string(), "test-clean");
    }
}
