//! Document Store
//!
//! Flat directory of text and markdown files. Every operation runs to
//! completion against the filesystem; there is no caching and no locking,
//! so concurrent writers to the same name resolve last-writer-wins.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Extensions accepted when creating a document
pub const ALLOWED_EXTENSIONS: &[&str] = &["txt", "md"];

/// Extension appended to names created without one
pub const DEFAULT_EXTENSION: &str = "txt";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Invalid(String),
    #[error("{0} does not exist.")]
    NotFound(String),
    #[error("{0} already exists.")]
    AlreadyExists(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Markdown,
    Plain,
}

impl DocumentKind {
    pub fn from_name(name: &str) -> Self {
        match split_name(name).1 {
            Some(ext) if ext.eq_ignore_ascii_case("md") => DocumentKind::Markdown,
            _ => DocumentKind::Plain,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub content: Vec<u8>,
    pub kind: DocumentKind,
}

impl Document {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }

    /// Content-Type for serving the raw bytes
    pub fn content_type(&self) -> String {
        content_type_for(&self.name)
    }
}

/// Served for names whose type cannot be guessed
pub const PLAIN_TEXT: &str = "text/plain; charset=utf-8";

/// Guess a Content-Type from the extension; text types are labelled UTF-8
pub fn content_type_for(name: &str) -> String {
    match mime_guess::from_path(name).first() {
        Some(mime) if mime.type_() == mime_guess::mime::TEXT => {
            format!("{}; charset=utf-8", mime.essence_str())
        }
        Some(mime) => mime.essence_str().to_string(),
        None => PLAIN_TEXT.to_string(),
    }
}

/// Result of a delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Missing,
}

pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        info!("[DocumentStore] Serving documents from {:?}", root);
        Self { root }
    }

    /// Names of the regular files in the store, sorted
    pub async fn list(&self) -> StoreResult<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    pub async fn read(&self, name: &str) -> StoreResult<Document> {
        let path = self.existing_path(name).await?;
        let content = fs::read(&path).await?;

        Ok(Document {
            name: name.to_string(),
            content,
            kind: DocumentKind::from_name(name),
        })
    }

    /// Create an empty document, returning the name it was stored under
    pub async fn create(&self, proposed: &str) -> StoreResult<String> {
        let name = validate_new_name(proposed)?;
        let path = self.root.join(&name);

        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(_) => {
                info!("[DocumentStore] Created {}", name);
                Ok(name)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(StoreError::AlreadyExists(name)),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the full content of an existing document
    pub async fn save(&self, name: &str, content: &[u8]) -> StoreResult<()> {
        let path = self.existing_path(name).await?;
        fs::write(&path, content).await?;
        info!("[DocumentStore] Saved {} ({} bytes)", name, content.len());
        Ok(())
    }

    pub async fn delete(&self, name: &str) -> StoreResult<DeleteOutcome> {
        let path = match self.existing_path(name).await {
            Ok(path) => path,
            Err(StoreError::NotFound(_)) => return Ok(DeleteOutcome::Missing),
            Err(e) => return Err(e),
        };

        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("[DocumentStore] Deleted {}", name);
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(DeleteOutcome::Missing),
            Err(e) => Err(e.into()),
        }
    }

    /// Copy a document to the next free `stem(n).ext` name and return that name
    pub async fn duplicate(&self, name: &str) -> StoreResult<String> {
        let source = self.existing_path(name).await?;
        let content = fs::read(&source).await?;

        let (stem, ext) = split_name(name);
        let base = strip_counter(stem);

        let mut n = 0u64;
        loop {
            n += 1;
            let candidate = numbered_name(base, n, ext);
            let path = self.root.join(&candidate);

            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("[DocumentStore] {} taken, probing next", candidate);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            file.write_all(&content).await?;
            file.flush().await?;
            info!("[DocumentStore] Duplicated {} as {}", name, candidate);
            return Ok(candidate);
        }
    }

    /// Resolve `name` to a regular file inside the store
    async fn existing_path(&self, name: &str) -> StoreResult<PathBuf> {
        let path = self
            .resolve(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;

        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(StoreError::NotFound(name.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(name.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Only single, normal path components map into the store
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return None;
        }
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Some(self.root.join(name)),
            _ => None,
        }
    }
}

/// Split at the last dot into stem and optional extension
pub fn split_name(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (name, None),
    }
}

/// Check a proposed name and return the name it will be stored under
pub fn validate_new_name(proposed: &str) -> StoreResult<String> {
    let name = proposed.trim();

    if name.is_empty() {
        return Err(StoreError::Invalid("A name is required.".to_string()));
    }
    if name.contains(['/', '\\']) {
        return Err(StoreError::Invalid(
            "File names may not contain path separators.".to_string(),
        ));
    }
    if name.matches('.').count() > 1 {
        return Err(StoreError::Invalid(
            "File names may contain at most one '.'.".to_string(),
        ));
    }

    let (stem, ext) = split_name(name);
    if stem.is_empty() {
        return Err(StoreError::Invalid("A name is required.".to_string()));
    }

    match ext {
        None => Ok(format!("{}.{}", name, DEFAULT_EXTENSION)),
        Some(ext) if ALLOWED_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(ext)) => {
            Ok(name.to_string())
        }
        Some(ext) => Err(StoreError::Invalid(format!(
            "Unsupported file extension '.{}'. Use .txt or .md.",
            ext
        ))),
    }
}

/// Drop a trailing `(n)` counter, e.g. `notes(3)` -> `notes`
fn strip_counter(stem: &str) -> &str {
    let Some(inner) = stem.strip_suffix(')') else {
        return stem;
    };
    match inner.rfind('(') {
        Some(open) => {
            let digits = &inner[open + 1..];
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                &stem[..open]
            } else {
                stem
            }
        }
        None => stem,
    }
}

fn numbered_name(base: &str, n: u64, ext: Option<&str>) -> String {
    match ext {
        Some(ext) => format!("{}({}).{}", base, n, ext),
        None => format!("{}({})", base, n),
    }
}
