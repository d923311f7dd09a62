//! Marker-based note bodies.
//!
//! A synced note body has two regions separated by [`SYNC_MARKER`] on a line
//! of its own:
//!
//! ```text
//! # <title>
//!
//! <remote body>
//!
//! ## Comments
//! ...
//!
//! <!-- notebridge: ... -->
//! <local region: free text, posted as a comment on the next sync>
//! ```
//!
//! Everything above the marker is rebuilt from the remote item on every
//! write. The local region is copied through untouched unless it was just
//! posted upstream.

use crate::provider::{Comment, RemoteItem};
use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

/// Line separating the synced region from the local region.
pub const SYNC_MARKER: &str =
    "<!-- notebridge: notes below this line are posted as a comment on the next sync -->";

const COMMENTS_HEADING: &str = "## Comments";
const NEW_COMMENTS_HEADING: &str = "## New comments";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MergeError {
    #[error("Sync marker not found in note body")]
    MarkerMissing,
}

/// A note body cut at the first marker line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitBody<'a> {
    /// Text before the marker line
    pub synced: &'a str,
    /// Text after the marker line, byte for byte
    pub local: &'a str,
}

/// Split `body` at the first line consisting of the marker.
pub fn split_body(body: &str) -> Result<SplitBody<'_>, MergeError> {
    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == SYNC_MARKER {
            return Ok(SplitBody {
                synced: body.get(..offset).unwrap_or_default(),
                local: body.get(offset + line.len()..).unwrap_or_default(),
            });
        }
        offset += line.len();
    }
    Err(MergeError::MarkerMissing)
}

/// Render the machine-owned region for `item`.
///
/// Comments created at or before `last_sync` go under "Comments", later ones
/// under "New comments". Without a `last_sync` every comment is historical.
#[must_use]
pub fn render_synced_region(item: &RemoteItem, last_sync: Option<DateTime<Utc>>) -> String {
    let mut blocks = vec![format!("# {}", item.title.trim())];

    let body = without_marker_lines(&item.body);
    let body = body.trim();
    if !body.is_empty() {
        blocks.push(body.to_string());
    }

    let (historical, new): (Vec<&Comment>, Vec<&Comment>) = item
        .comments
        .iter()
        .partition(|c| last_sync.is_none_or(|synced| c.created_at <= synced));
    for (heading, comments) in [(COMMENTS_HEADING, historical), (NEW_COMMENTS_HEADING, new)] {
        if !comments.is_empty() {
            blocks.push(heading.to_string());
            blocks.extend(comments.into_iter().map(render_comment));
        }
    }

    blocks.join("\n\n")
}

/// Full note body: synced region, marker, then `local_region` verbatim.
#[must_use]
pub fn build_body(item: &RemoteItem, last_sync: Option<DateTime<Utc>>, local_region: &str) -> String {
    format!(
        "{}\n\n{SYNC_MARKER}\n{local_region}",
        render_synced_region(item, last_sync)
    )
}

/// Text of a hand-written note suitable as the body of a new remote item:
/// the leading `# title` heading and any marker region are dropped.
#[must_use]
pub fn publishable_text(body: &str) -> &str {
    let text = split_body(body).map_or(body, |split| split.synced).trim();
    match text.split_once('\n') {
        Some((first, rest)) if first.starts_with("# ") => rest.trim(),
        None if text.starts_with("# ") => "",
        _ => text,
    }
}

fn render_comment(comment: &Comment) -> String {
    let mut lines = vec![format!(
        "> **{}** commented at {}",
        comment.author,
        comment
            .created_at
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    )];
    let body = comment.body.trim();
    if !body.is_empty() {
        lines.push(">".to_string());
        lines.extend(body.lines().map(|line| {
            let line = line.trim_end();
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {line}")
            }
        }));
    }
    lines.join("\n")
}

/// Remote text must never contain a line the splitter would take for the marker.
fn without_marker_lines(text: &str) -> String {
    if !text.contains(SYNC_MARKER) {
        return text.to_string();
    }
    text.lines()
        .filter(|line| line.trim_end() != SYNC_MARKER)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod tests;
