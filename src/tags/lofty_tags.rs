use std::path::Path;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::read_from_path;
use lofty::properties::FileProperties;
use lofty::tag::{ItemKey, Tag};

use super::{describe_audio_source, AudioTags, TagError};

/// Tag access for Vorbis-comment and MP4 style formats (flac, ogg, opus,
/// m4a, wav), read through lofty.
pub struct LoftyTags {
    extension: String,
    tag: Option<Tag>,
    properties: FileProperties,
}

impl LoftyTags {
    pub fn open(path: &Path, extension: &str) -> Result<Self, TagError> {
        let tagged = read_from_path(path)?;
        let tag = tagged
            .primary_tag()
            .or_else(|| tagged.first_tag())
            .cloned();
        let properties = tagged.properties().clone();
        Ok(LoftyTags {
            extension: extension.to_string(),
            tag,
            properties,
        })
    }

    fn get(&self, key: &ItemKey) -> Option<String> {
        self.tag
            .as_ref()?
            .get_string(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    // disc/track fields may carry `current/total` pairs
    fn get_number(&self, key: &ItemKey) -> Option<u32> {
        self.get(key)?.split('/').next()?.trim().parse().ok()
    }
}

impl AudioTags for LoftyTags {
    fn title(&self) -> Option<String> {
        self.get(&ItemKey::TrackTitle)
    }

    fn album(&self) -> Option<String> {
        self.get(&ItemKey::AlbumTitle)
    }

    fn disc_number(&self) -> Option<u32> {
        self.get_number(&ItemKey::DiscNumber)
    }

    fn total_discs(&self) -> Option<u32> {
        self.get_number(&ItemKey::DiscTotal)
    }

    fn track_number(&self) -> Option<u32> {
        self.get_number(&ItemKey::TrackNumber)
    }

    fn total_tracks(&self) -> Option<u32> {
        self.get_number(&ItemKey::TrackTotal)
    }

    fn date(&self) -> Option<String> {
        self.get(&ItemKey::RecordingDate)
            .or_else(|| self.get(&ItemKey::Year))
    }

    fn catalog(&self) -> Option<String> {
        self.get(&ItemKey::CatalogNumber)
            .or_else(|| self.custom("CATALOG"))
            .or_else(|| self.custom("LABELNO"))
    }

    // lofty folds well-known comment keys into dedicated item keys, so
    // look there before falling back to a raw key lookup
    fn custom(&self, key: &str) -> Option<String> {
        let mapped = match key.to_uppercase().as_str() {
            "YEAR" => self.get(&ItemKey::Year),
            "BARCODE" => self.get(&ItemKey::Barcode),
            "CATALOGNUMBER" => self.get(&ItemKey::CatalogNumber),
            _ => None,
        };
        mapped
            .or_else(|| self.get(&ItemKey::Unknown(key.to_string())))
            .or_else(|| self.get(&ItemKey::Unknown(key.to_uppercase())))
    }

    fn audio_source(&self) -> Option<String> {
        describe_audio_source(
            &self.extension,
            self.properties.bit_depth(),
            self.properties.sample_rate(),
            self.properties.audio_bitrate(),
        )
    }
}
