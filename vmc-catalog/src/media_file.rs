//! Live metadata read from a media file's tags
//!
//! Tags are read once with `lofty` when the source is opened and answered
//! by catalog field name afterwards.

use crate::error::{CatalogError, Result};
use crate::source::MetadataSource;
use lofty::file::{AudioFile, FileType, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, Tag};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Tag snapshot of one media file
#[derive(Debug, Clone)]
pub struct MediaFileSource {
    path: PathBuf,
    values: HashMap<&'static str, String>,
}

fn media_type_name(file_type: &FileType) -> &'static str {
    match file_type {
        FileType::Mp4 => "MP4",
        FileType::Mpeg => "MP3",
        FileType::Flac => "FLAC",
        FileType::Opus => "Opus",
        FileType::Vorbis => "OGG Vorbis",
        FileType::Aac => "AAC",
        FileType::Aiff => "AIFF",
        FileType::Wav => "WAV",
        FileType::WavPack => "WavPack",
        _ => "Unknown",
    }
}

fn tag_values(tag: &Tag, values: &mut HashMap<&'static str, String>) {
    let mut put = |name: &'static str, value: Option<String>| {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            values.insert(name, v);
        }
    };
    let text = |key: ItemKey| tag.get_string(&key).map(str::to_string);

    put("Title", tag.title().map(|s| s.to_string()));
    put("Author", tag.artist().map(|s| s.to_string()));
    put(
        "Description",
        text(ItemKey::Description).or_else(|| tag.comment().map(|s| s.to_string())),
    );
    put("Genre", tag.genre().map(|s| s.to_string()));
    put("Year", tag.year().map(|y| y.to_string()));
    put("Date", text(ItemKey::RecordingDate));
    put("UserRating", text(ItemKey::Popularimeter));
    put("Language", text(ItemKey::Language));
    put("Director", text(ItemKey::Director));
    put("Writer", text(ItemKey::Writer));
    put("Copyright", text(ItemKey::CopyrightMessage));
}

impl MediaFileSource {
    /// Read the tags and properties of `path`
    pub fn open(path: &Path) -> Result<Self> {
        let size = std::fs::metadata(path)
            .map_err(|e| CatalogError::Source(format!("{}: {}", path.display(), e)))?
            .len();

        let tagged_file = Probe::open(path)
            .map_err(|e| CatalogError::Source(format!("{}: {}", path.display(), e)))?
            .read()
            .map_err(|e| CatalogError::Source(format!("Failed to read tags of {}: {}", path.display(), e)))?;

        let mut values = HashMap::new();
        if let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
            tag_values(tag, &mut values);
        } else {
            debug!(file = ?path, "No tags found in media file");
        }

        values.insert("Size", size.to_string());
        values.insert("MediaType", media_type_name(&tagged_file.file_type()).to_string());
        let duration_ms = tagged_file.properties().duration().as_millis();
        if duration_ms > 0 {
            values.insert("Duration", duration_ms.to_string());
        }

        debug!(file = ?path, fields = values.len(), "Read live metadata");
        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File stem, used as the key when the file carries no title tag
    pub fn fallback_title(&self) -> Option<String> {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
    }
}

impl MetadataSource for MediaFileSource {
    fn get_field(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lofty::config::WriteOptions;
    use lofty::tag::{TagExt, TagType};

    /// One second of 16-bit mono silence at 8 kHz
    fn write_silent_wav(path: &Path) {
        let sample_rate: u32 = 8000;
        let data_len: u32 = sample_rate * 2;
        let mut bytes = Vec::with_capacity(44 + data_len as usize);
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
        bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        bytes.resize(44 + data_len as usize, 0);
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_open_maps_tags_and_properties() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("alien.wav");
        write_silent_wav(&path);

        let mut tag = Tag::new(TagType::Id3v2);
        tag.set_title("Alien".to_string());
        tag.set_artist("Ridley Scott".to_string());
        tag.set_genre("Horror".to_string());
        tag.set_comment("In space no one can hear you scream".to_string());
        tag.insert_text(ItemKey::RecordingDate, "1979-05-25".to_string());
        tag.save_to_path(&path, WriteOptions::default()).unwrap();

        let source = MediaFileSource::open(&path).unwrap();
        assert_eq!(source.get_field("Title").as_deref(), Some("Alien"));
        assert_eq!(source.get_field("Author").as_deref(), Some("Ridley Scott"));
        assert_eq!(source.get_field("Genre").as_deref(), Some("Horror"));
        assert_eq!(
            source.get_field("Description").as_deref(),
            Some("In space no one can hear you scream")
        );
        assert_eq!(source.get_field("Date").as_deref(), Some("1979-05-25"));
        assert_eq!(source.get_field("Director"), None);

        let size = std::fs::metadata(&path).unwrap().len();
        assert_eq!(source.get_field("Size"), Some(size.to_string()));
        assert_eq!(source.get_field("MediaType").as_deref(), Some("WAV"));

        let duration: u128 = source.get_field("Duration").unwrap().parse().unwrap();
        assert!((990..=1010).contains(&duration), "duration {}", duration);
        assert_eq!(source.fallback_title().as_deref(), Some("alien"));
    }

    #[test]
    fn test_untagged_file_still_reports_properties() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("untagged.wav");
        write_silent_wav(&path);

        let source = MediaFileSource::open(&path).unwrap();
        assert_eq!(source.get_field("Title"), None);
        assert_eq!(source.get_field("MediaType").as_deref(), Some("WAV"));
        assert_eq!(source.get_field("Size").as_deref(), Some("16044"));
        assert_eq!(source.fallback_title().as_deref(), Some("untagged"));
    }

    #[test]
    fn test_open_missing_file_is_source_error() {
        let err = MediaFileSource::open(Path::new("/nonexistent/movie.mp4")).unwrap_err();
        assert!(matches!(err, CatalogError::Source(_)));
    }

    #[test]
    fn test_open_unrecognised_file_is_source_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "not a media file").unwrap();
        assert!(matches!(
            MediaFileSource::open(&path),
            Err(CatalogError::Source(_))
        ));
    }
}
