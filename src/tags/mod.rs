//! Read-only access to audio file tags.
//!
//! One [`AudioTags`] implementation exists per format family, selected by
//! file extension through [`open_audio_tags`]. The scanner consumes the
//! narrower [`TagReader`] seam and stores plain [`TagSnapshot`]s, so
//! tests can substitute stub readers without real audio files. Nothing
//! in this crate ever writes a tag.

use std::path::Path;

use thiserror::Error;

mod lofty_tags;
mod mp3;

pub use lofty_tags::LoftyTags;
pub use mp3::Mp3Tags;

/// Extensions the scanner treats as audio; everything else is skipped
/// without error.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["flac", "mp3", "ogg", "opus", "m4a", "wav"];

/// Check if a file is an audio file based on extension
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[derive(Debug, Error)]
pub enum TagError {
    #[error("unsupported audio extension: {0}")]
    UnsupportedExtension(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to read ID3 tags: {0}")]
    Id3(#[from] id3::Error),
    #[error("failed to read tags: {0}")]
    Lofty(#[from] lofty::error::LoftyError),
}

/// Uniform, read-only view over one file's tags, regardless of the
/// underlying tag format.
pub trait AudioTags {
    fn title(&self) -> Option<String>;
    fn album(&self) -> Option<String>;
    fn disc_number(&self) -> Option<u32>;
    fn total_discs(&self) -> Option<u32>;
    fn track_number(&self) -> Option<u32>;
    fn total_tracks(&self) -> Option<u32>;
    fn date(&self) -> Option<String>;
    fn catalog(&self) -> Option<String>;
    fn custom(&self, key: &str) -> Option<String>;
    /// Human-readable source/format summary, e.g. `CD-FLAC 16bit 44.1kHz`.
    fn audio_source(&self) -> Option<String>;
}

/// Plain-data capture of everything the scanner and the naming
/// materializer need from one file's tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSnapshot {
    pub title: Option<String>,
    pub album: Option<String>,
    pub disc_number: Option<u32>,
    pub total_discs: Option<u32>,
    pub track_number: Option<u32>,
    pub total_tracks: Option<u32>,
    pub date: Option<String>,
    pub year: Option<String>,
    pub catalog: Option<String>,
    pub barcode: Option<String>,
    pub audio_source: Option<String>,
}

impl TagSnapshot {
    pub fn capture(tags: &dyn AudioTags) -> Self {
        TagSnapshot {
            title: tags.title(),
            album: tags.album(),
            disc_number: tags.disc_number(),
            total_discs: tags.total_discs(),
            track_number: tags.track_number(),
            total_tracks: tags.total_tracks(),
            date: tags.date(),
            year: tags.custom("year").or_else(|| tags.custom("Year")),
            catalog: tags.catalog(),
            barcode: tags.custom("barcode").or_else(|| tags.custom("Barcode")),
            audio_source: tags.audio_source(),
        }
    }
}

/// Opens the right [`AudioTags`] implementation for a path, selected by
/// file extension.
pub fn open_audio_tags(path: &Path) -> Result<Box<dyn AudioTags>, TagError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "mp3" => Ok(Box::new(Mp3Tags::open(path)?)),
        "flac" | "ogg" | "opus" | "m4a" | "wav" => {
            Ok(Box::new(LoftyTags::open(path, &extension)?))
        }
        _ => Err(TagError::UnsupportedExtension(extension)),
    }
}

/// The seam the scanner consumes. Production code uses
/// [`SystemTagReader`]; tests substitute stubs.
pub trait TagReader {
    fn read(&self, path: &Path) -> Result<TagSnapshot, TagError>;
}

/// Reads snapshots from real files via [`open_audio_tags`].
#[derive(Debug, Default)]
pub struct SystemTagReader;

impl TagReader for SystemTagReader {
    fn read(&self, path: &Path) -> Result<TagSnapshot, TagError> {
        let tags = open_audio_tags(path)?;
        Ok(TagSnapshot::capture(tags.as_ref()))
    }
}

/// Deduces the `{format}` naming string from stream properties, the way
/// rippers label sources: 16-bit lossless is assumed to be a CD rip,
/// higher depths a web release, and extreme rates a vinyl transfer.
pub(crate) fn describe_audio_source(
    extension: &str,
    bit_depth: Option<u8>,
    sample_rate: Option<u32>,
    bitrate_kbps: Option<u32>,
) -> Option<String> {
    match extension {
        "flac" | "wav" => {
            let format = if extension == "flac" { "FLAC" } else { "WAV" };
            let bits = bit_depth?;
            let rate = sample_rate?;
            let mut source = if bits == 16 { "CD" } else { "WEB" };
            if rate >= 192_000 || bits > 24 {
                source = "VINYL";
            }
            Some(format!(
                "{}-{} {}bit {}kHz",
                source,
                format,
                bits,
                khz(rate)
            ))
        }
        "mp3" => Some(format!("CD-MP3 {}kbps", bitrate_kbps?)),
        "m4a" => Some(format!("WEB-AAC {}kbps", bitrate_kbps?)),
        "ogg" => Some(format!("WEB-OGG {}kbps", bitrate_kbps?)),
        "opus" => Some("YT-OPUS".to_string()),
        _ => None,
    }
}

fn khz(sample_rate: u32) -> String {
    if sample_rate % 1000 == 0 {
        format!("{}", sample_rate / 1000)
    } else {
        format!("{:.1}", sample_rate as f64 / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file(Path::new("track.flac")));
        assert!(is_audio_file(Path::new("track.mp3")));
        assert!(is_audio_file(Path::new("track.FLAC")));
        assert!(!is_audio_file(Path::new("cover.jpg")));
        assert!(!is_audio_file(Path::new("notes.txt")));
        assert!(!is_audio_file(Path::new("noextension")));
    }

    #[test]
    fn cd_rip_flac() {
        assert_eq!(
            describe_audio_source("flac", Some(16), Some(44_100), None).as_deref(),
            Some("CD-FLAC 16bit 44.1kHz")
        );
    }

    #[test]
    fn web_release_and_vinyl_transfer() {
        assert_eq!(
            describe_audio_source("flac", Some(24), Some(96_000), None).as_deref(),
            Some("WEB-FLAC 24bit 96kHz")
        );
        assert_eq!(
            describe_audio_source("flac", Some(24), Some(192_000), None).as_deref(),
            Some("VINYL-FLAC 24bit 192kHz")
        );
    }

    #[test]
    fn lossy_formats() {
        assert_eq!(
            describe_audio_source("mp3", None, None, Some(320)).as_deref(),
            Some("CD-MP3 320kbps")
        );
        assert_eq!(
            describe_audio_source("opus", None, None, None).as_deref(),
            Some("YT-OPUS")
        );
        assert_eq!(describe_audio_source("mp3", None, None, None), None);
    }

    #[test]
    fn open_rejects_unsupported_extensions() {
        assert!(matches!(
            open_audio_tags(Path::new("cover.jpg")),
            Err(TagError::UnsupportedExtension(ext)) if ext == "jpg"
        ));
    }
}
