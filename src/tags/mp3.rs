use std::path::Path;

use id3::TagLike;
use lofty::file::AudioFile;
use lofty::probe::read_from_path;

use super::{describe_audio_source, AudioTags, TagError};

/// ID3-backed tag access for MP3 files. Custom values live in TXXX
/// frames keyed by description; a file without an ID3 tag reads as
/// empty rather than failing.
pub struct Mp3Tags {
    tag: id3::Tag,
    bitrate_kbps: Option<u32>,
}

impl Mp3Tags {
    pub fn open(path: &Path) -> Result<Self, TagError> {
        let tag = match id3::Tag::read_from_path(path) {
            Ok(tag) => tag,
            Err(id3::Error {
                kind: id3::ErrorKind::NoTag,
                ..
            }) => id3::Tag::new(),
            Err(e) => return Err(e.into()),
        };
        // id3 does not expose stream properties; probe them separately
        let bitrate_kbps = read_from_path(path)
            .ok()
            .and_then(|tagged| tagged.properties().audio_bitrate());
        Ok(Mp3Tags { tag, bitrate_kbps })
    }

    fn extended_text(&self, key: &str) -> Option<String> {
        self.tag
            .extended_texts()
            .find(|frame| frame.description.eq_ignore_ascii_case(key))
            .map(|frame| frame.value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

impl AudioTags for Mp3Tags {
    fn title(&self) -> Option<String> {
        self.tag.title().map(str::to_string)
    }

    fn album(&self) -> Option<String> {
        self.tag.album().map(str::to_string)
    }

    fn disc_number(&self) -> Option<u32> {
        self.tag.disc()
    }

    fn total_discs(&self) -> Option<u32> {
        self.tag.total_discs()
    }

    fn track_number(&self) -> Option<u32> {
        self.tag.track()
    }

    fn total_tracks(&self) -> Option<u32> {
        self.tag.total_tracks()
    }

    fn date(&self) -> Option<String> {
        let timestamp = self.tag.date_recorded()?;
        let mut date = format!("{:04}", timestamp.year);
        if let Some(month) = timestamp.month {
            date.push_str(&format!("-{:02}", month));
            if let Some(day) = timestamp.day {
                date.push_str(&format!("-{:02}", day));
            }
        }
        Some(date)
    }

    fn catalog(&self) -> Option<String> {
        self.extended_text("CATALOGNUMBER")
            .or_else(|| self.extended_text("CATALOG"))
            .or_else(|| self.extended_text("LABELNO"))
    }

    fn custom(&self, key: &str) -> Option<String> {
        self.extended_text(key)
    }

    fn audio_source(&self) -> Option<String> {
        describe_audio_source("mp3", None, None, self.bitrate_kbps)
    }
}
