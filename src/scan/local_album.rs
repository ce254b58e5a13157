//! The data of files representing one audio album on a filesystem.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use crate::tags::TagSnapshot;

const LINE_SEPARATOR: &str = "============================================================";
const SUB_LINE_SEPARATOR: &str = "------------------------------------------------------------";

/// One audio file found during a scan. Identity is the file path; the
/// snapshot is read once at scan time and never refreshed.
#[derive(Debug, Clone)]
pub struct LocalTrackData {
    pub file_path: PathBuf,
    /// Folder nesting level relative to the album root (0 = directly
    /// inside, 1 = inside a disc folder).
    pub depth_in_parent_folder: usize,
    pub tag_snapshot: TagSnapshot,
}

impl PartialEq for LocalTrackData {
    fn eq(&self, other: &Self) -> bool {
        self.file_path == other.file_path
    }
}

impl Eq for LocalTrackData {}

impl Hash for LocalTrackData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.file_path.hash(state);
    }
}

impl LocalTrackData {
    pub fn file_name(&self) -> String {
        self.file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Tracks of one disc, keyed by track number. `folder_name` is the
/// literal disc-folder name when the disc's files live in their own
/// sub-folder (e.g. "Disc 1: The Rime of the Ancient Mariner").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalDiscData {
    pub tracks: BTreeMap<u32, LocalTrackData>,
    pub folder_name: Option<String>,
}

impl LocalDiscData {
    pub fn total_tracks(&self) -> usize {
        self.tracks.len()
    }
}

/// An audio album as found on disk: tracks with resolved disc (default 1)
/// and track numbers, plus the files whose track number could not be
/// determined from either name or tags. Those "unclean" files are kept
/// in discovery order for secondary matching, never dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalAlbumData {
    pub album_folder_path: PathBuf,
    pub discs: BTreeMap<u32, LocalDiscData>,
    pub unclean_tracks: Vec<LocalTrackData>,
}

impl LocalAlbumData {
    pub fn new(album_folder_path: impl Into<PathBuf>) -> Self {
        LocalAlbumData {
            album_folder_path: album_folder_path.into(),
            discs: BTreeMap::new(),
            unclean_tracks: Vec::new(),
        }
    }

    pub fn album_folder_name(&self) -> String {
        self.album_folder_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn total_discs(&self) -> usize {
        self.discs.len()
    }

    /// Sum of per-disc track counts; unclean tracks are not included.
    pub fn total_tracks_in_album(&self) -> usize {
        self.discs.values().map(|disc| disc.tracks.len()).sum()
    }

    pub fn get_track(&self, disc_number: u32, track_number: u32) -> Option<&LocalTrackData> {
        self.discs.get(&disc_number)?.tracks.get(&track_number)
    }

    /// Writes over an existing track at the same slot: the last scanned
    /// file for a (disc, track) pair wins.
    pub fn set_track(&mut self, disc_number: u32, track_number: u32, track: LocalTrackData) {
        self.discs
            .entry(disc_number)
            .or_default()
            .tracks
            .insert(track_number, track);
    }

    pub fn track_exists(&self, disc_number: u32, track_number: u32) -> bool {
        self.get_track(disc_number, track_number).is_some()
    }

    /// Every scanned track, unclean files first.
    pub fn all_tracks(&self) -> Vec<&LocalTrackData> {
        let mut tracks: Vec<&LocalTrackData> = self.unclean_tracks.iter().collect();
        tracks.extend(self.discs.values().flat_map(|disc| disc.tracks.values()));
        tracks
    }

    /// Any one audio file of the album, used to read album-level tags.
    pub fn sample_track(&self) -> Option<&LocalTrackData> {
        self.discs
            .values()
            .flat_map(|disc| disc.tracks.values())
            .next()
            .or_else(|| self.unclean_tracks.first())
    }

    pub fn is_empty(&self) -> bool {
        self.discs.values().all(|disc| disc.tracks.is_empty()) && self.unclean_tracks.is_empty()
    }
}

impl fmt::Display for LocalAlbumData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", LINE_SEPARATOR)?;
        writeln!(f, "album path: {}", self.album_folder_path.display())?;
        writeln!(f, "{}", LINE_SEPARATOR)?;
        for (disc_number, disc) in &self.discs {
            match &disc.folder_name {
                Some(folder_name) => writeln!(f, "Disc {}: {}", disc_number, folder_name)?,
                None => writeln!(f, "Disc {}:", disc_number)?,
            }
            writeln!(f, "{}", SUB_LINE_SEPARATOR)?;
            for (track_number, track) in &disc.tracks {
                writeln!(f, "Track {}: {}", track_number, track.file_path.display())?;
            }
            writeln!(f, "{}", SUB_LINE_SEPARATOR)?;
        }
        for track in &self.unclean_tracks {
            writeln!(f, "Unclean: {}", track.file_path.display())?;
        }
        write!(f, "{}", LINE_SEPARATOR)
    }
}
