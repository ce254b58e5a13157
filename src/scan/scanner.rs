//! Single-level album scanner.
//!
//! An album folder is either flat (audio files directly inside, one
//! implicit disc) or one level deep with disc sub-folders whose names
//! parse via [`extract_disc_info`]. Deeper nesting is deliberately not
//! modeled: a sub-folder that does not look like a disc is left alone.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::naming::parser::{extract_disc_info, extract_track_number};
use crate::tags::{is_audio_file, TagReader};

use super::{LocalAlbumData, LocalTrackData};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Scans one album folder into a [`LocalAlbumData`] model.
///
/// Lists immediate entries only. Audio files directly in `root` land on
/// disc 1; each direct sub-folder that parses as a disc contributes its
/// direct audio files to that disc, recording the literal folder name.
/// Track slots come from the file name, falling back to the tag
/// snapshot; files with neither go to `unclean_tracks` in discovery
/// order. Unsupported extensions are skipped without error, and a file
/// whose tags cannot be read is skipped with a warning.
pub fn scan_album(root: &Path, tags: &dyn TagReader) -> Result<LocalAlbumData, ScanError> {
    let mut album = LocalAlbumData::new(root);
    let mut subfolders = Vec::new();

    for path in sorted_entries(root)? {
        if path.is_dir() {
            subfolders.push(path);
        } else {
            collect_file(&mut album, &path, 1, 0, None, tags);
        }
    }

    for folder in subfolders {
        let folder_name = name_of(&folder);
        let Some(disc_number) = extract_disc_info(&folder_name).number else {
            debug!("sub-folder does not parse as a disc, not scanned: {:?}", folder);
            continue;
        };
        let entries = match sorted_entries(&folder) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("cannot list disc folder {:?}, skipping: {}", folder, e);
                continue;
            }
        };
        for path in entries {
            if path.is_file() {
                collect_file(&mut album, &path, disc_number, 1, Some(&folder_name), tags);
            }
        }
    }

    Ok(album)
}

/// Like [`scan_album`], but reports a folder with no audio at all as
/// `None` instead of an empty model.
pub fn scan_album_if_exists(
    root: &Path,
    tags: &dyn TagReader,
) -> Result<Option<LocalAlbumData>, ScanError> {
    let album = scan_album(root, tags)?;
    if album.is_empty() {
        Ok(None)
    } else {
        Ok(Some(album))
    }
}

fn collect_file(
    album: &mut LocalAlbumData,
    path: &Path,
    disc_number: u32,
    depth: usize,
    disc_folder_name: Option<&str>,
    tags: &dyn TagReader,
) {
    if !is_audio_file(path) {
        return;
    }
    let snapshot = match tags.read(path) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!("cannot read tags from {:?}, file skipped: {}", path, e);
            return;
        }
    };
    let track_number = extract_track_number(&name_of(path)).or(snapshot.track_number);
    let track = LocalTrackData {
        file_path: path.to_path_buf(),
        depth_in_parent_folder: depth,
        tag_snapshot: snapshot,
    };
    match track_number {
        Some(track_number) => {
            album.set_track(disc_number, track_number, track);
            if let (Some(folder_name), Some(disc)) =
                (disc_folder_name, album.discs.get_mut(&disc_number))
            {
                disc.folder_name = Some(folder_name.to_string());
            }
        }
        None => {
            debug!("no track number for {:?}, kept as unclean", path);
            album.unclean_tracks.push(track);
        }
    }
}

// Directory iteration order is platform-defined; sort by name so scans
// are reproducible and slot overwrites are deterministic.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect();
    entries.sort();
    Ok(entries)
}

fn name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
