//! Matches the remote canonical track list against a scanned local
//! album.
//!
//! Every (disc, track) key present on either side produces one report
//! row; blank fields mark the side the key was missing on. A gap is an
//! expected outcome routed to the caller through the report, never an
//! error.

use std::collections::BTreeSet;
use std::fmt;

use tracing::{debug, info};

use crate::remote::RemoteAlbumData;
use crate::scan::LocalAlbumData;

/// One row of the match report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub disc_number: Option<u32>,
    pub track_number: Option<u32>,
    pub remote_title: Option<String>,
    pub local_file_name: Option<String>,
}

impl ReportRow {
    fn is_complete(&self) -> bool {
        self.disc_number.is_some()
            && self.track_number.is_some()
            && self.remote_title.is_some()
            && self.local_file_name.is_some()
    }

    // Missing numbers sort after every real number, so unclean local
    // files end up at the bottom of the report, ordered by file name.
    fn sort_key(&self) -> (u32, u32, String) {
        (
            self.disc_number.unwrap_or(u32::MAX),
            self.track_number.unwrap_or(u32::MAX),
            self.local_file_name.clone().unwrap_or_default(),
        )
    }
}

/// Outcome of aligning one album: all rows, sorted for presentation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchReport {
    pub rows: Vec<ReportRow>,
}

impl MatchReport {
    /// True iff local and remote key sets were identical and every
    /// remote track is bound to a local file: no row has a blank field.
    pub fn is_perfect(&self) -> bool {
        self.rows.iter().all(ReportRow::is_complete)
    }

    pub fn unmatched_rows(&self) -> impl Iterator<Item = &ReportRow> {
        self.rows.iter().filter(|row| !row.is_complete())
    }
}

/// Aligns `local` against `remote`, binding each matched remote track's
/// `matched_local` slot in place and returning the full report.
pub fn align_album(
    remote: &mut RemoteAlbumData,
    local: &LocalAlbumData,
    language_order: &[&str],
) -> MatchReport {
    let mut unmatched_local: BTreeSet<(u32, u32)> = local
        .discs
        .iter()
        .flat_map(|(disc_number, disc)| {
            disc.tracks
                .keys()
                .map(move |track_number| (*disc_number, *track_number))
        })
        .collect();
    let mut rows = Vec::new();

    for (disc_number, disc) in remote.discs.iter_mut() {
        for (track_number, track) in disc.tracks.iter_mut() {
            let remote_title = track.title(language_order).map(str::to_string);
            match local.get_track(*disc_number, *track_number) {
                Some(found) => {
                    track.matched_local = Some(found.clone());
                    unmatched_local.remove(&(*disc_number, *track_number));
                    rows.push(ReportRow {
                        disc_number: Some(*disc_number),
                        track_number: Some(*track_number),
                        remote_title,
                        local_file_name: Some(found.file_name()),
                    });
                }
                None => {
                    debug!(
                        "no local file for remote track {}/{}",
                        disc_number, track_number
                    );
                    rows.push(ReportRow {
                        disc_number: Some(*disc_number),
                        track_number: Some(*track_number),
                        remote_title,
                        local_file_name: None,
                    });
                }
            }
        }
    }

    for (disc_number, track_number) in unmatched_local {
        if let Some(track) = local.get_track(disc_number, track_number) {
            rows.push(ReportRow {
                disc_number: Some(disc_number),
                track_number: Some(track_number),
                remote_title: None,
                local_file_name: Some(track.file_name()),
            });
        }
    }

    for track in &local.unclean_tracks {
        rows.push(ReportRow {
            disc_number: None,
            track_number: None,
            remote_title: None,
            local_file_name: Some(track.file_name()),
        });
    }

    rows.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    let report = MatchReport { rows };
    info!(
        "aligned {} remote track(s) against {} local file(s), perfect match: {}",
        remote.total_tracks(),
        local.total_tracks_in_album() + local.unclean_tracks.len(),
        report.is_perfect()
    );
    report
}

impl fmt::Display for MatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers = ["Disc", "Track", "Album Track", "File"];
        let cells: Vec<[String; 4]> = self
            .rows
            .iter()
            .map(|row| {
                [
                    row.disc_number.map(|n| n.to_string()).unwrap_or_default(),
                    row.track_number.map(|n| n.to_string()).unwrap_or_default(),
                    row.remote_title.clone().unwrap_or_default(),
                    row.local_file_name.clone().unwrap_or_default(),
                ]
            })
            .collect();
        let mut widths = headers.map(str::len);
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }
        fn write_row(
            f: &mut fmt::Formatter<'_>,
            widths: &[usize; 4],
            cells: [&str; 4],
        ) -> fmt::Result {
            writeln!(
                f,
                "| {:<w0$} | {:<w1$} | {:<w2$} | {:<w3$} |",
                cells[0],
                cells[1],
                cells[2],
                cells[3],
                w0 = widths[0],
                w1 = widths[1],
                w2 = widths[2],
                w3 = widths[3],
            )
        }
        write_row(f, &widths, headers)?;
        writeln!(
            f,
            "|{:-<w0$}|{:-<w1$}|{:-<w2$}|{:-<w3$}|",
            "",
            "",
            "",
            "",
            w0 = widths[0] + 2,
            w1 = widths[1] + 2,
            w2 = widths[2] + 2,
            w3 = widths[3] + 2,
        )?;
        for row in &cells {
            write_row(
                f,
                &widths,
                [
                    row[0].as_str(),
                    row[1].as_str(),
                    row[2].as_str(),
                    row[3].as_str(),
                ],
            )?;
        }
        Ok(())
    }
}
