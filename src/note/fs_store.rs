//! Filesystem note store.
//!
//! Layout below the workspace root:
//!
//! ```text
//! <type>/<slug>.md            active notes
//! <type>/archive/<slug>.md    archived notes
//! ```
//!
//! Dot-directories (including `.notebridge/`) are never scanned.

use super::{
    ListFilter, LocalNote, NoteListing, NoteStore, NoteStoreError, RemoteLinkage, UnreadableNote,
    REMOTE_KEY,
};
use crate::common::{parse_document, render_document, Document};
use crate::utils::{atomic_write_stamped, now_iso};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_yaml::Value;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

const ARCHIVE_DIR: &str = "archive";
const NOTE_EXTENSION: &str = "md";
const ARTIFACT_KEY: &str = "artifact";

/// Note store over a workspace directory.
#[derive(Debug, Clone)]
pub struct FsNoteStore {
    root: PathBuf,
}

/// Where a note file sits: its type folder and whether it is archived.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Location {
    note_type: String,
    archived: bool,
}

impl FsNoteStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn locate(&self, path: &Path) -> Location {
        path.strip_prefix(&self.root)
            .ok()
            .and_then(location_from_relative)
            .unwrap_or_else(|| location_from_parents(path))
    }

    async fn load(&self, path: &Path, location: &Location) -> Result<(LocalNote, bool), NoteStoreError> {
        let content = fs::read_to_string(path).await?;
        let modified = fs::metadata(path).await?.modified()?;
        interpret(path, &content, location, modified)
    }

    /// First free `<slug>.md`, `<slug>-2.md`, ... in `dir`.
    fn unique_path(dir: &Path, title: &str) -> PathBuf {
        let slug = match slug::slugify(title) {
            s if s.is_empty() => "note".to_string(),
            s => s,
        };
        let mut candidate = dir.join(format!("{slug}.{NOTE_EXTENSION}"));
        let mut suffix = 2;
        while candidate.exists() {
            candidate = dir.join(format!("{slug}-{suffix}.{NOTE_EXTENSION}"));
            suffix += 1;
        }
        candidate
    }

    async fn write_document(
        path: &Path,
        document: &Document,
        linkage: &RemoteLinkage,
    ) -> Result<(), NoteStoreError> {
        let content = render_document(document).map_err(|source| NoteStoreError::Frontmatter {
            path: path.display().to_string(),
            source,
        })?;
        // The mtime carries the remote timestamp so an untouched note compares
        // equal to its item on the next pass.
        atomic_write_stamped(path, &content, Some(SystemTime::from(linkage.updated_at))).await?;
        Ok(())
    }
}

#[async_trait]
impl NoteStore for FsNoteStore {
    async fn list_notes(&self, filter: ListFilter) -> Result<NoteListing, NoteStoreError> {
        let root = self.root.clone();
        let files = tokio::task::spawn_blocking(move || note_files(&root))
            .await
            .map_err(io::Error::other)?;

        let mut listing = NoteListing::default();
        for (path, location) in files {
            if location.archived && !filter.include_archived {
                continue;
            }
            match self.load(&path, &location).await {
                Ok((_, true)) if !filter.include_artifacts => {
                    debug!("Skipping artifact {}", path.display());
                }
                Ok((note, _)) => listing.notes.push(note),
                Err(error) => {
                    let (provider, remote_id) = match fs::read_to_string(&path).await {
                        Ok(content) => recover_linkage_ids(&content),
                        Err(_) => (None, None),
                    };
                    listing.unreadable.push(UnreadableNote {
                        path,
                        provider,
                        remote_id,
                        error: error.to_string(),
                    });
                }
            }
        }
        Ok(listing)
    }

    async fn read_body(&self, path: &Path) -> Result<String, NoteStoreError> {
        let content = fs::read_to_string(path).await?;
        let document = parse_document(&content).map_err(|source| NoteStoreError::Frontmatter {
            path: path.display().to_string(),
            source,
        })?;
        Ok(document.body)
    }

    async fn read_note(&self, path: &Path) -> Result<LocalNote, NoteStoreError> {
        if !path.exists() {
            return Err(NoteStoreError::NotFound(path.display().to_string()));
        }
        let location = self.locate(path);
        let (note, _) = self.load(path, &location).await?;
        Ok(note)
    }

    async fn create_note_with_content(
        &self,
        note_type: &str,
        title: &str,
        linkage: &RemoteLinkage,
        body: &str,
    ) -> Result<LocalNote, NoteStoreError> {
        validate_note_type(note_type)?;
        let dir = self.root.join(note_type);
        fs::create_dir_all(&dir).await?;
        let path = Self::unique_path(&dir, title);

        let mut document = Document::new(serde_yaml::Mapping::new(), body);
        document.set("title", Value::String(title.to_string()));
        document.set("type", Value::String(note_type.to_string()));
        document.set("created", Value::String(now_iso()));
        document.set(REMOTE_KEY, linkage_value(&path, linkage)?);

        Self::write_document(&path, &document, linkage).await?;
        debug!("Created note {}", path.display());
        self.read_note(&path).await
    }

    async fn update_note_with_content(
        &self,
        path: &Path,
        linkage: &RemoteLinkage,
        body: &str,
    ) -> Result<(), NoteStoreError> {
        if !path.exists() {
            return Err(NoteStoreError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path).await?;
        let mut document = parse_document(&content).map_err(|source| {
            NoteStoreError::Frontmatter {
                path: path.display().to_string(),
                source,
            }
        })?;
        document.set(REMOTE_KEY, linkage_value(path, linkage)?);
        document.body = body.to_string();

        Self::write_document(path, &document, linkage).await
    }

    async fn mark_modified(&self, path: &Path) -> Result<(), NoteStoreError> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            std::fs::File::options()
                .write(true)
                .open(&path)?
                .set_modified(SystemTime::now())
        })
        .await
        .map_err(io::Error::other)??;
        Ok(())
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn note_files(root: &Path) -> Vec<(PathBuf, Location)> {
    WalkDir::new(root)
        .max_depth(3)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
        .filter_map(Result::ok)
        .filter(|e| {
            e.file_type().is_file()
                && e.path().extension().is_some_and(|ext| ext == NOTE_EXTENSION)
        })
        .filter_map(|e| {
            let location = e
                .path()
                .strip_prefix(root)
                .ok()
                .and_then(location_from_relative)?;
            Some((e.into_path(), location))
        })
        .collect()
}

fn location_from_relative(relative: &Path) -> Option<Location> {
    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    match parts.as_slice() {
        [note_type, _file] => Some(Location {
            note_type: (*note_type).to_string(),
            archived: false,
        }),
        [note_type, ARCHIVE_DIR, _file] => Some(Location {
            note_type: (*note_type).to_string(),
            archived: true,
        }),
        _ => None,
    }
}

fn location_from_parents(path: &Path) -> Location {
    let dir_name = |p: Option<&Path>| {
        p.and_then(Path::file_name)
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    };
    let parent = path.parent();
    let parent_name = dir_name(parent);
    if parent_name == ARCHIVE_DIR {
        Location {
            note_type: dir_name(parent.and_then(Path::parent)),
            archived: true,
        }
    } else {
        Location {
            note_type: parent_name,
            archived: false,
        }
    }
}

/// Build a [`LocalNote`] from file content; the flag is the artifact marker.
fn interpret(
    path: &Path,
    content: &str,
    location: &Location,
    modified: SystemTime,
) -> Result<(LocalNote, bool), NoteStoreError> {
    let display = path.display().to_string();
    let document = parse_document(content).map_err(|source| NoteStoreError::Frontmatter {
        path: display.clone(),
        source,
    })?;

    let linkage = match document.frontmatter.get(REMOTE_KEY) {
        None | Some(Value::Null) => None,
        Some(value) => Some(
            serde_yaml::from_value::<RemoteLinkage>(value.clone()).map_err(|e| {
                NoteStoreError::InvalidLinkage {
                    path: display.clone(),
                    message: e.to_string(),
                }
            })?,
        ),
    };

    let title = document.get_str("title").map_or_else(
        || {
            path.file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default()
        },
        str::to_string,
    );
    let note_type = document
        .get_str("type")
        .unwrap_or(&location.note_type)
        .to_string();

    let note = LocalNote {
        path: path.to_path_buf(),
        title,
        note_type,
        archived: location.archived,
        linkage,
        file_modified_at: DateTime::<Utc>::from(modified),
    };
    Ok((note, document.get_flag(ARTIFACT_KEY)))
}

/// Best-effort `(provider, id)` from a note whose linkage did not parse.
fn recover_linkage_ids(content: &str) -> (Option<String>, Option<String>) {
    let Ok(document) = parse_document(content) else {
        return (None, None);
    };
    let Some(Value::Mapping(remote)) = document.frontmatter.get(REMOTE_KEY) else {
        return (None, None);
    };
    let loose = |key: &str| match remote.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    (loose("provider"), loose("id"))
}

fn linkage_value(path: &Path, linkage: &RemoteLinkage) -> Result<Value, NoteStoreError> {
    serde_yaml::to_value(linkage).map_err(|e| NoteStoreError::InvalidLinkage {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn validate_note_type(note_type: &str) -> Result<(), NoteStoreError> {
    let valid = !note_type.is_empty()
        && !note_type.starts_with('.')
        && note_type != ARCHIVE_DIR
        && !note_type.contains(['/', '\\']);
    if valid {
        Ok(())
    } else {
        Err(NoteStoreError::InvalidType(note_type.to_string()))
    }
}

#[cfg(test)]
#[path = "fs_store_tests.rs"]
mod tests;
