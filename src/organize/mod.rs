//! Materializes resolved names back onto the filesystem.
//!
//! The scanner, aligner and template engine are pure; this module is
//! where renames actually happen. Plans are built first so callers can
//! inspect or reject them, then applied step by step. An existing
//! target is never overwritten: the step is logged and skipped.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use crate::naming::clean_name;
use crate::naming::parser::extract_disc_info;
use crate::naming::template::{TemplateBindings, TemplateError, TemplateResolver};
use crate::scan::LocalAlbumData;

#[derive(Debug, Error)]
pub enum OrganizeError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("no audio file found under {0}")]
    NoAudioFiles(PathBuf),
    #[error("no album name in tags of {0} and the template does not use the folder name")]
    MissingAlbumName(PathBuf),
}

/// A single pending rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameStep {
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenamePlan {
    pub steps: Vec<RenameStep>,
}

/// What happened when a plan was applied. Collisions and failures are
/// per-step outcomes, not errors: the remaining steps still run.
#[derive(Debug, Default)]
pub struct ApplyOutcome {
    pub renamed: Vec<RenameStep>,
    /// Steps skipped because the target already existed.
    pub collisions: Vec<RenameStep>,
    pub failed: Vec<(RenameStep, std::io::Error)>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TrackRenameOptions {
    /// Keep files where they are instead of moving them into disc
    /// folders.
    pub no_move: bool,
}

/// Derives the album folder's new name from a naming template and the
/// tags of one sample track. Returns `Ok(None)` when the cleaned result
/// equals the current name (the rename would be a no-op).
pub fn folder_rename_plan(
    album: &LocalAlbumData,
    template: &str,
) -> Result<Option<RenameStep>, OrganizeError> {
    TemplateResolver::validate(template)?;
    let sample = album
        .sample_track()
        .ok_or_else(|| OrganizeError::NoAudioFiles(album.album_folder_path.clone()))?;
    let snapshot = &sample.tag_snapshot;
    let folder_name = album.album_folder_name();
    if snapshot.album.is_none() && !template.to_lowercase().contains("foldername") {
        return Err(OrganizeError::MissingAlbumName(sample.file_path.clone()));
    }

    let date = snapshot
        .date
        .as_deref()
        .or(snapshot.year.as_deref())
        .and_then(fix_date)
        .map(|date| date.replace('-', "."));
    let bindings: TemplateBindings = HashMap::from([
        ("albumname".to_string(), snapshot.album.clone()),
        ("catalog".to_string(), snapshot.catalog.clone()),
        ("date".to_string(), date),
        ("foldername".to_string(), Some(folder_name.clone())),
        ("barcode".to_string(), snapshot.barcode.clone()),
        ("format".to_string(), snapshot.audio_source.clone()),
    ]);

    let new_name = clean_name(&TemplateResolver::new(bindings).evaluate(template)?);
    if new_name.is_empty() {
        warn!(
            "template {:?} resolved to an empty name for {:?}",
            template, album.album_folder_path
        );
        return Ok(None);
    }
    if new_name == folder_name {
        return Ok(None);
    }
    let parent = album
        .album_folder_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_default();
    Ok(Some(RenameStep {
        from: album.album_folder_path.clone(),
        to: parent.join(new_name),
    }))
}

/// Derives new names for every clean track: `NN - Title.ext`, or just
/// `Title.ext` when the album holds a single audio file. Multi-disc
/// albums get `Disc N`/`Disc N - <name>` folders unless `no_move` is
/// set; the disc name is recovered from the existing disc folder.
/// Tracks without a title tag are skipped with a warning.
pub fn track_rename_plan(album: &LocalAlbumData, options: TrackRenameOptions) -> RenamePlan {
    let total_discs = album.total_discs();
    let is_single = album.total_tracks_in_album() == 1 && album.unclean_tracks.is_empty();
    let mut steps = Vec::new();

    for (disc_number, disc) in &album.discs {
        let total_tracks = disc.total_tracks();
        let disc_folder = if total_discs > 1 && !options.no_move {
            let disc_name = disc
                .folder_name
                .as_deref()
                .and_then(|name| extract_disc_info(name).name);
            Some(match disc_name {
                Some(name) => format!("Disc {} - {}", disc_number, clean_name(&name)),
                None => format!("Disc {}", disc_number),
            })
        } else {
            None
        };

        for (track_number, track) in &disc.tracks {
            let Some(title) = track.tag_snapshot.title.as_deref() else {
                warn!("title not present in {:?}, skipped", track.file_path);
                continue;
            };
            let extension = track
                .file_path
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy()))
                .unwrap_or_default();
            let new_name = if is_single {
                format!("{}{}", clean_name(title), extension)
            } else {
                format!(
                    "{}{}",
                    clean_name(&format!(
                        "{} - {}",
                        proper_count(*track_number, total_tracks),
                        title
                    )),
                    extension
                )
            };
            let mut target = album.album_folder_path.clone();
            if let Some(folder) = &disc_folder {
                target.push(folder);
            }
            target.push(&new_name);
            if target != track.file_path {
                steps.push(RenameStep {
                    from: track.file_path.clone(),
                    to: target,
                });
            }
        }
    }

    RenamePlan { steps }
}

/// Applies a plan step by step, creating missing disc folders on the
/// way. An existing target is a collision: logged, skipped, never
/// overwritten.
pub fn apply_plan(plan: &RenamePlan) -> ApplyOutcome {
    let mut outcome = ApplyOutcome::default();
    for step in &plan.steps {
        if step.to.exists() {
            warn!("{:?} exists, cannot rename {:?}", step.to, step.from);
            outcome.collisions.push(step.clone());
            continue;
        }
        if let Some(parent) = step.to.parent() {
            if !parent.exists() {
                if let Err(e) = fs::create_dir_all(parent) {
                    warn!("cannot create {:?}: {}", parent, e);
                    outcome.failed.push((step.clone(), e));
                    continue;
                }
            }
        }
        match fs::rename(&step.from, &step.to) {
            Ok(()) => {
                info!("renamed: {:?} => {:?}", step.from, step.to);
                outcome.renamed.push(step.clone());
            }
            Err(e) => {
                warn!("cannot rename {:?}: {}", step.from, e);
                outcome.failed.push((step.clone(), e));
            }
        }
    }
    outcome
}

/// Combined outcome of organizing one album folder.
#[derive(Debug, Default)]
pub struct OrganizeOutcome {
    pub tracks: ApplyOutcome,
    pub folder: ApplyOutcome,
    /// Where the album folder ended up.
    pub album_path: PathBuf,
}

/// Organizes a folder holding exactly one album: renames its files into
/// place, then renames the folder itself from the naming template.
pub fn organize_album(
    album: &LocalAlbumData,
    template: &str,
    options: TrackRenameOptions,
) -> Result<OrganizeOutcome, OrganizeError> {
    // resolve the folder name first: a bad template or missing album
    // name must stop us before any rename happens
    let folder_step = folder_rename_plan(album, template)?;

    let tracks = apply_plan(&track_rename_plan(album, options));

    let mut album_path = album.album_folder_path.clone();
    let mut folder = ApplyOutcome::default();
    if let Some(step) = folder_step {
        let renamed_to = step.to.clone();
        folder = apply_plan(&RenamePlan { steps: vec![step] });
        if !folder.renamed.is_empty() {
            album_path = renamed_to;
        }
    }

    Ok(OrganizeOutcome {
        tracks,
        folder,
        album_path,
    })
}

/// Zero-pads a number to the width of the total count, at least two
/// digits (`7` of `12` → `07`, `7` of `120` → `007`).
pub fn proper_count(number: u32, total: usize) -> String {
    let width = total.to_string().len().max(2);
    format!("{:0width$}", number)
}

/// Normalizes a date to `YYYY[-MM[-DD]]` with zero-padded components.
/// Components the source omits are not invented.
pub fn fix_date(date: &str) -> Option<String> {
    let mut parts = date.trim().split(['-', '.', '/']).filter(|p| !p.is_empty());
    let year = parts.next()?;
    if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let mut fixed = year.to_string();
    for part in parts.take(2) {
        let value: u32 = part.trim().parse().ok()?;
        fixed.push_str(&format!("-{:02}", value));
    }
    Some(fixed)
}

/// Leading year of a date, when one can be recognized.
pub fn year_of(date: &str) -> Option<String> {
    fix_date(date).map(|fixed| fixed[..4].to_string())
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::scan::{LocalAlbumData, LocalTrackData};
    use crate::tags::TagSnapshot;

    fn track(album: &Path, name: &str, snapshot: TagSnapshot) -> LocalTrackData {
        LocalTrackData {
            file_path: album.join(name),
            depth_in_parent_folder: 0,
            tag_snapshot: snapshot,
        }
    }

    fn snapshot(title: &str) -> TagSnapshot {
        TagSnapshot {
            title: Some(title.to_string()),
            ..TagSnapshot::default()
        }
    }

    #[test]
    fn proper_count_pads_to_total_width() {
        assert_eq!(proper_count(7, 12), "07");
        assert_eq!(proper_count(7, 9), "07");
        assert_eq!(proper_count(7, 120), "007");
        assert_eq!(proper_count(101, 120), "101");
    }

    #[test]
    fn fix_date_pads_without_inventing_components() {
        assert_eq!(fix_date("2011-8-12").as_deref(), Some("2011-08-12"));
        assert_eq!(fix_date("2011.8").as_deref(), Some("2011-08"));
        assert_eq!(fix_date("2011").as_deref(), Some("2011"));
        assert_eq!(fix_date("August 2011"), None);
        assert_eq!(fix_date(""), None);
        assert_eq!(year_of("2011-08-12").as_deref(), Some("2011"));
    }

    #[test]
    fn folder_plan_follows_the_template() {
        let root = PathBuf::from("/music/rewrite ost");
        let mut album = LocalAlbumData::new(&root);
        let tags = TagSnapshot {
            title: Some("Intro".to_string()),
            album: Some("Rewrite OST".to_string()),
            catalog: Some("KSLA-0087".to_string()),
            date: Some("2011-8-12".to_string()),
            ..TagSnapshot::default()
        };
        album.set_track(1, 1, track(&root, "01 - Intro.flac", tags));

        let step = folder_rename_plan(&album, "{[{date}] }{albumname}{ [{catalog}]}")
            .unwrap()
            .unwrap();
        assert_eq!(step.from, root);
        assert_eq!(
            step.to,
            PathBuf::from("/music/[2011.08.12] Rewrite OST [KSLA-0087]")
        );
    }

    #[test]
    fn folder_plan_is_a_noop_when_the_name_already_matches() {
        let root = PathBuf::from("/music/Rewrite OST");
        let mut album = LocalAlbumData::new(&root);
        let tags = TagSnapshot {
            album: Some("Rewrite OST".to_string()),
            ..TagSnapshot::default()
        };
        album.set_track(1, 1, track(&root, "01 - Intro.flac", tags));

        assert_eq!(folder_rename_plan(&album, "{albumname}").unwrap(), None);
    }

    #[test]
    fn folder_plan_requires_an_album_name_or_foldername_template() {
        let root = PathBuf::from("/music/untitled");
        let mut album = LocalAlbumData::new(&root);
        album.set_track(1, 1, track(&root, "01 - Intro.flac", snapshot("Intro")));

        assert!(matches!(
            folder_rename_plan(&album, "{albumname}"),
            Err(OrganizeError::MissingAlbumName(_))
        ));
        let step = folder_rename_plan(&album, "{foldername} x").unwrap().unwrap();
        assert_eq!(step.to, PathBuf::from("/music/untitled x"));
    }

    #[test]
    fn track_plan_numbers_and_cleans_titles() {
        let root = PathBuf::from("/music/Album");
        let mut album = LocalAlbumData::new(&root);
        album.set_track(1, 1, track(&root, "1.flac", snapshot("Intro: Start?")));
        album.set_track(1, 2, track(&root, "2.flac", snapshot("Theme")));

        let plan = track_rename_plan(&album, TrackRenameOptions::default());
        let targets: Vec<&Path> = plan.steps.iter().map(|s| s.to.as_path()).collect();
        assert_eq!(
            targets,
            vec![
                Path::new("/music/Album/01 - Intro꞉ Startʔ.flac"),
                Path::new("/music/Album/02 - Theme.flac"),
            ]
        );
    }

    #[test]
    fn single_track_album_drops_the_number() {
        let root = PathBuf::from("/music/Single");
        let mut album = LocalAlbumData::new(&root);
        album.set_track(1, 1, track(&root, "01 only.flac", snapshot("Only Song")));

        let plan = track_rename_plan(&album, TrackRenameOptions::default());
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].to, PathBuf::from("/music/Single/Only Song.flac"));
    }

    #[test]
    fn multi_disc_tracks_move_into_disc_folders() {
        let root = PathBuf::from("/music/Box");
        let mut album = LocalAlbumData::new(&root);
        album.set_track(1, 1, track(&root, "Disc 1/01.flac", snapshot("One")));
        album.set_track(2, 1, track(&root, "CD2 - Live/01.flac", snapshot("Two")));
        album.discs.get_mut(&1).unwrap().folder_name = Some("Disc 1".to_string());
        album.discs.get_mut(&2).unwrap().folder_name = Some("CD2 - Live".to_string());

        let plan = track_rename_plan(&album, TrackRenameOptions::default());
        let targets: Vec<&Path> = plan.steps.iter().map(|s| s.to.as_path()).collect();
        assert_eq!(
            targets,
            vec![
                Path::new("/music/Box/Disc 1/01 - One.flac"),
                Path::new("/music/Box/Disc 2 - Live/01 - Two.flac"),
            ]
        );

        let plan = track_rename_plan(&album, TrackRenameOptions { no_move: true });
        assert_eq!(plan.steps[1].to, PathBuf::from("/music/Box/01 - Two.flac"));
    }

    #[test]
    fn untitled_tracks_are_left_out_of_the_plan() {
        let root = PathBuf::from("/music/Album");
        let mut album = LocalAlbumData::new(&root);
        album.set_track(1, 1, track(&root, "01.flac", TagSnapshot::default()));
        album.set_track(1, 2, track(&root, "02.flac", snapshot("Named")));

        let plan = track_rename_plan(&album, TrackRenameOptions::default());
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].from, root.join("02.flac"));
    }

    #[test]
    fn apply_renames_and_skips_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("a.flac"), b"x").unwrap();
        std::fs::write(root.join("b.flac"), b"x").unwrap();
        std::fs::write(root.join("taken.flac"), b"x").unwrap();

        let plan = RenamePlan {
            steps: vec![
                RenameStep {
                    from: root.join("a.flac"),
                    to: root.join("01 - A.flac"),
                },
                RenameStep {
                    from: root.join("b.flac"),
                    to: root.join("taken.flac"),
                },
            ],
        };
        let outcome = apply_plan(&plan);

        assert_eq!(outcome.renamed.len(), 1);
        assert_eq!(outcome.collisions.len(), 1);
        assert!(outcome.failed.is_empty());
        assert!(root.join("01 - A.flac").exists());
        assert!(root.join("b.flac").exists());
    }

    #[test]
    fn apply_creates_missing_disc_folders() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("01.flac"), b"x").unwrap();

        let plan = RenamePlan {
            steps: vec![RenameStep {
                from: root.join("01.flac"),
                to: root.join("Disc 1").join("01 - One.flac"),
            }],
        };
        let outcome = apply_plan(&plan);

        assert_eq!(outcome.renamed.len(), 1);
        assert!(root.join("Disc 1").join("01 - One.flac").exists());
    }
}
