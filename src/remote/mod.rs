//! Canonical album metadata supplied by the remote provider, consumed
//! read-only by the aligner.
//!
//! The provider speaks JSON with string-keyed disc/track numbers and
//! localized name maps; [`RemoteAlbumData::from_json`] converts that
//! into numerically keyed models. The only mutable part is the
//! `matched_local` slot the aligner fills in.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::scan::LocalTrackData;

/// Localized names keyed by the provider's raw language keys
/// ("en", "ja", "Romaji", ...).
pub type LocalizedNames = BTreeMap<String, String>;

/// Preference order used when no explicit order is configured.
pub const DEFAULT_LANGUAGE_ORDER: &[&str] = &["english", "romaji", "japanese"];

// Provider key aliases grouped under the order names accepted by
// `best_name`.
const LANGUAGE_KEYS: &[(&str, &[&str])] = &[
    ("english", &["en", "English", "English (alternate)"]),
    ("romaji", &["ja-latn", "Romaji", "Romaji (alternate)"]),
    ("japanese", &["ja", "Japanese"]),
];

/// Picks the preferred name out of a localized name map, walking the
/// given order and each order entry's known provider keys, falling back
/// to any available name.
pub fn best_name<'a>(names: &'a LocalizedNames, language_order: &[&str]) -> Option<&'a str> {
    for language in language_order {
        if let Some(value) = names.get(*language) {
            return Some(value);
        }
        if let Some((_, keys)) = LANGUAGE_KEYS.iter().find(|(name, _)| name == language) {
            for key in keys.iter() {
                if let Some(value) = names.get(*key) {
                    return Some(value);
                }
            }
        }
    }
    names.values().next().map(String::as_str)
}

#[derive(Debug, Error)]
pub enum RemoteAlbumError {
    #[error("invalid remote album payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("non-numeric {kind} number `{value}` in remote album payload")]
    BadNumber { kind: &'static str, value: String },
}

/// One canonical track: its localized titles and, after alignment, the
/// local file it was matched to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteTrackData {
    pub names: LocalizedNames,
    pub matched_local: Option<LocalTrackData>,
}

impl RemoteTrackData {
    pub fn title(&self, language_order: &[&str]) -> Option<&str> {
        best_name(&self.names, language_order)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteDiscData {
    pub tracks: BTreeMap<u32, RemoteTrackData>,
}

/// The canonical track list for one album.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteAlbumData {
    pub names: LocalizedNames,
    pub catalog: Option<String>,
    pub release_date: Option<String>,
    pub discs: BTreeMap<u32, RemoteDiscData>,
}

#[derive(Debug, Deserialize)]
struct WireTrack {
    #[serde(default)]
    names: LocalizedNames,
}

#[derive(Debug, Deserialize)]
struct WireAlbum {
    #[serde(default)]
    names: LocalizedNames,
    #[serde(default)]
    catalog: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    discs: BTreeMap<String, BTreeMap<String, WireTrack>>,
}

impl RemoteAlbumData {
    /// Parses the provider payload. Disc and track keys must be numeric;
    /// a catalog of "N/A"/"NA" counts as absent.
    pub fn from_json(payload: &str) -> Result<Self, RemoteAlbumError> {
        let wire: WireAlbum = serde_json::from_str(payload)?;
        let mut discs = BTreeMap::new();
        for (disc_key, wire_tracks) in wire.discs {
            let disc_number = parse_number("disc", &disc_key)?;
            let mut disc = RemoteDiscData::default();
            for (track_key, wire_track) in wire_tracks {
                let track_number = parse_number("track", &track_key)?;
                disc.tracks.insert(
                    track_number,
                    RemoteTrackData {
                        names: wire_track.names,
                        matched_local: None,
                    },
                );
            }
            discs.insert(disc_number, disc);
        }
        Ok(RemoteAlbumData {
            names: wire.names,
            catalog: wire
                .catalog
                .filter(|catalog| catalog.as_str() != "N/A" && catalog.as_str() != "NA"),
            release_date: wire.release_date,
            discs,
        })
    }

    pub fn album_name(&self, language_order: &[&str]) -> Option<&str> {
        best_name(&self.names, language_order)
    }

    pub fn total_tracks(&self) -> usize {
        self.discs.values().map(|disc| disc.tracks.len()).sum()
    }

    pub fn get_track(&self, disc_number: u32, track_number: u32) -> Option<&RemoteTrackData> {
        self.discs.get(&disc_number)?.tracks.get(&track_number)
    }
}

fn parse_number(kind: &'static str, value: &str) -> Result<u32, RemoteAlbumError> {
    value.trim().parse().map_err(|_| RemoteAlbumError::BadNumber {
        kind,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "names": {"en": "Rewrite Original Soundtrack", "ja": "リライト"},
        "catalog": "KSLA-0087",
        "release_date": "2011-08-12",
        "discs": {
            "1": {
                "1": {"names": {"en": "Intro", "ja": "イントロ"}},
                "2": {"names": {"en": "Theme"}}
            },
            "2": {
                "1": {"names": {"Romaji": "Yume no Hate"}}
            }
        }
    }"#;

    #[test]
    fn parses_the_provider_payload() {
        let album = RemoteAlbumData::from_json(PAYLOAD).unwrap();
        assert_eq!(album.total_tracks(), 3);
        assert_eq!(album.catalog.as_deref(), Some("KSLA-0087"));
        assert_eq!(
            album.get_track(1, 2).unwrap().title(DEFAULT_LANGUAGE_ORDER),
            Some("Theme")
        );
        assert_eq!(
            album.get_track(2, 1).unwrap().title(DEFAULT_LANGUAGE_ORDER),
            Some("Yume no Hate")
        );
        assert!(album.get_track(3, 1).is_none());
    }

    #[test]
    fn rejects_non_numeric_keys() {
        let payload = r#"{"discs": {"one": {}}}"#;
        assert!(matches!(
            RemoteAlbumData::from_json(payload),
            Err(RemoteAlbumError::BadNumber { kind: "disc", .. })
        ));
    }

    #[test]
    fn placeholder_catalog_is_treated_as_absent() {
        let album = RemoteAlbumData::from_json(r#"{"catalog": "N/A"}"#).unwrap();
        assert_eq!(album.catalog, None);
    }

    #[test]
    fn best_name_follows_the_language_order() {
        let album = RemoteAlbumData::from_json(PAYLOAD).unwrap();
        assert_eq!(
            album.album_name(&["japanese", "english"]),
            Some("リライト")
        );
        assert_eq!(
            album.album_name(DEFAULT_LANGUAGE_ORDER),
            Some("Rewrite Original Soundtrack")
        );
    }

    #[test]
    fn best_name_falls_back_to_any_available_name() {
        let mut names = LocalizedNames::new();
        names.insert("fr".to_string(), "Réécrire".to_string());
        assert_eq!(best_name(&names, DEFAULT_LANGUAGE_ORDER), Some("Réécrire"));
        assert_eq!(best_name(&LocalizedNames::new(), DEFAULT_LANGUAGE_ORDER), None);
    }
}
