//! Local staging of uploaded files
//!
//! An upload is streamed to disk before it is forwarded to the media host. The
//! resulting [`StagedFile`] owns the file on disk and removes it exactly once:
//! either through [`StagedFile::remove`] or, on any other exit path, when the
//! guard is dropped.

mod error;

use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use futures::{Stream, StreamExt};
use mime::Mime;
use rand::Rng;
use tokio::{
    fs::{self, File, OpenOptions},
    io::AsyncWriteExt,
};
use tracing::{debug, warn};

pub use error::{StagingError, StagingResult};

/// Number of characters of the original file name kept in the staged name
const PREFIX_CHARS: usize = 10;
/// Upper bound (exclusive) of the random part of the staged name
const RANDOM_SUFFIX_BOUND: u32 = 1_000_000_000;
/// Attempts at finding a free staged name before giving up
const MAX_NAME_ATTEMPTS: usize = 5;
/// Prefix used when nothing usable is left of the original name
const FALLBACK_PREFIX: &str = "upload";

/// Directory receiving uploads before they are forwarded
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    /// Creates a staging area rooted at `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory backing this staging area
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the staging directory if it does not exist yet
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the directory cannot be created
    pub async fn prepare(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await
    }

    /// Streams `chunks` into a freshly named file of the staging area
    ///
    /// The staged name is derived from `original_name` (see [`staged_file_name`]).
    /// If reading `chunks` or writing the file fails, the partially written file
    /// is removed before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns `StagingError` if the body cannot be read or the file cannot be
    /// written
    pub async fn stage<S, B, E>(
        &self,
        original_name: &str,
        content_type: Mime,
        chunks: S,
    ) -> StagingResult<StagedFile>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        StagingError: From<E>,
    {
        let (mut staged, mut file) = self.create(original_name, content_type).await?;

        futures::pin_mut!(chunks);
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            let bytes = chunk.as_ref();
            file.write_all(bytes).await?;
            staged.size += bytes.len() as u64;
        }
        file.flush().await?;
        drop(file);

        debug!(
            path = %staged.path.display(),
            bytes = staged.size,
            "Staged upload"
        );

        Ok(staged)
    }

    async fn create(
        &self,
        original_name: &str,
        content_type: Mime,
    ) -> StagingResult<(StagedFile, File)> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let file_name = staged_file_name(original_name);
            let path = self.dir.join(&file_name);

            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => {
                    let staged = StagedFile {
                        path,
                        file_name,
                        original_name: original_name.to_string(),
                        content_type,
                        size: 0,
                        removed: false,
                    };
                    return Ok((staged, file));
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    warn!(path = %path.display(), "Staged name already taken, drawing a new one");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(StagingError::NameExhausted(MAX_NAME_ATTEMPTS))
    }
}

/// Upload written to the staging area
///
/// Dropping the guard removes the file from disk.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    file_name: String,
    original_name: String,
    content_type: Mime,
    size: u64,
    removed: bool,
}

impl StagedFile {
    /// Location of the staged file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the staged file inside the staging directory
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// File name as sent by the client
    #[must_use]
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Content type declared by the client
    #[must_use]
    pub const fn content_type(&self) -> &Mime {
        &self.content_type
    }

    /// Number of bytes written
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Guard that owns no file on disk
    #[cfg(test)]
    pub(crate) fn without_path(original_name: &str, content_type: Mime) -> Self {
        Self {
            path: PathBuf::new(),
            file_name: String::new(),
            original_name: original_name.to_string(),
            content_type,
            size: 0,
            removed: false,
        }
    }

    /// Removes the staged file from disk
    pub async fn remove(mut self) {
        self.removed = true;

        match fs::remove_file(&self.path).await {
            Ok(()) => debug!(path = %self.path.display(), "Removed staged file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Staged file already gone");
            }
            Err(e) => warn!(path = %self.path.display(), "Failed to remove staged file: {e}"),
        }
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;

        // Drop cannot await: a single blocking unlink runs inline on the worker
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed staged file on drop"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), "Failed to remove staged file: {e}"),
        }
    }
}

/// Leading part of a staged name derived from the client's file name
///
/// Directory components are stripped, the first ten characters are kept and
/// anything outside `[A-Za-z0-9._-]` becomes `_`.
#[must_use]
pub fn name_prefix(original_name: &str) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);

    let prefix: String = base
        .chars()
        .take(PREFIX_CHARS)
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if prefix.is_empty() {
        FALLBACK_PREFIX.to_string()
    } else {
        prefix
    }
}

/// Staged name: `<prefix>-<unix millis>-<random below 1e9>`
#[must_use]
pub fn staged_file_name(original_name: &str) -> String {
    let random = rand::thread_rng().gen_range(0..RANDOM_SUFFIX_BOUND);
    format!(
        "{}-{}-{random}",
        name_prefix(original_name),
        Utc::now().timestamp_millis()
    )
}
