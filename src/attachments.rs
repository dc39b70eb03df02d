//! Pending image attachments
//!
//! The attachment store holds images the user selected but has not yet
//! submitted. Only image media types are accepted; anything else is
//! rejected at this boundary and never reaches the model gateway.

use crate::error::ScholiaError;
use base64::Engine;
use bytes::Bytes;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use ulid::Ulid;

/// Media type used when a file's type cannot be determined
const UNKNOWN_MIME_TYPE: &str = "application/octet-stream";

/// Identity of an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AttachmentId(Ulid);

impl AttachmentId {
    fn new() -> Self {
        Self(Ulid::new())
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AttachmentId {
    type Err = ScholiaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s.trim())
            .map(Self)
            .map_err(|e| {
                ScholiaError::InvalidRequest(format!("Invalid attachment id {}: {}", s, e))
            })
    }
}

/// A file as handed over by the presentation layer (picker or drag-and-drop)
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Display name of the file
    pub name: String,
    /// Declared media type
    pub mime_type: String,
    /// File contents
    pub bytes: Bytes,
}

impl IncomingFile {
    /// Creates a new incoming file
    ///
    /// # Examples
    ///
    /// ```
    /// use scholia::attachments::IncomingFile;
    ///
    /// let file = IncomingFile::new("street.png", "image/png", vec![0x89, b'P', b'N', b'G']);
    /// assert_eq!(file.bytes.len(), 4);
    /// ```
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk, declaring its media type from the extension
    /// or, failing that, from its magic bytes
    ///
    /// # Errors
    ///
    /// Returns `ScholiaError::Io` if the file cannot be read
    pub async fn from_path(path: &Path) -> Result<Self, ScholiaError> {
        let bytes = tokio::fs::read(path).await?;
        let mime_type = declared_mime_type(path, &bytes);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::new(name, mime_type, bytes))
    }
}

/// An accepted image attachment
///
/// The raw bytes are immutable; clones share the same buffer read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    id: AttachmentId,
    name: String,
    mime_type: String,
    size: usize,
    #[serde(skip)]
    raw_bytes: Bytes,
}

impl Attachment {
    /// Identity of this attachment
    pub fn id(&self) -> AttachmentId {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared media type
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Size of the raw payload in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    /// Raw payload
    pub fn raw_bytes(&self) -> &Bytes {
        &self.raw_bytes
    }
}

/// Returns true when a declared media type names an image
///
/// # Examples
///
/// ```
/// use scholia::attachments::is_image_mime_type;
///
/// assert!(is_image_mime_type("image/webp"));
/// assert!(is_image_mime_type("IMAGE/PNG"));
/// assert!(!is_image_mime_type("text/plain"));
/// ```
pub fn is_image_mime_type(mime_type: &str) -> bool {
    mime_type.trim().to_ascii_lowercase().starts_with("image/")
}

/// Determine the declared media type of a file on disk
///
/// The extension is consulted first, then the magic bytes.
fn declared_mime_type(path: &Path, bytes: &[u8]) -> String {
    image::ImageFormat::from_path(path)
        .or_else(|_| image::guess_format(bytes))
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| UNKNOWN_MIME_TYPE.to_string())
}

/// The set of attachments pending submission, in selection order
#[derive(Debug, Clone, Default)]
pub struct AttachmentStore {
    pending: Vec<Attachment>,
}

impl AttachmentStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts a file if its declared media type is an image
    ///
    /// # Errors
    ///
    /// Returns `ScholiaError::InvalidAttachmentKind` for non-image files;
    /// the store is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use scholia::attachments::{AttachmentStore, IncomingFile};
    ///
    /// let mut store = AttachmentStore::new();
    /// assert!(store.add(IncomingFile::new("a.png", "image/png", vec![1, 2])).is_ok());
    /// assert!(store.add(IncomingFile::new("a.txt", "text/plain", vec![1])).is_err());
    /// assert_eq!(store.len(), 1);
    /// ```
    pub fn add(&mut self, file: IncomingFile) -> Result<Attachment, ScholiaError> {
        if !is_image_mime_type(&file.mime_type) {
            tracing::warn!(
                "Rejected attachment {}: declared type {} is not an image",
                file.name,
                file.mime_type
            );
            return Err(ScholiaError::InvalidAttachmentKind(format!(
                "{} ({}) is not an image",
                file.name, file.mime_type
            )));
        }

        let attachment = Attachment {
            id: AttachmentId::new(),
            name: file.name,
            mime_type: file.mime_type.trim().to_ascii_lowercase(),
            size: file.bytes.len(),
            raw_bytes: file.bytes,
        };

        tracing::debug!(
            "Added attachment {} ({}, {} bytes)",
            attachment.id,
            attachment.mime_type,
            attachment.size
        );
        self.pending.push(attachment.clone());
        Ok(attachment)
    }

    /// Reads a file from disk and adds it
    ///
    /// # Errors
    ///
    /// Returns `ScholiaError::Io` if the file cannot be read and
    /// `ScholiaError::InvalidAttachmentKind` if it is not an image.
    pub async fn add_path(&mut self, path: &Path) -> Result<Attachment, ScholiaError> {
        let file = IncomingFile::from_path(path).await?;
        self.add(file)
    }

    /// Removes an attachment by identity
    ///
    /// Returns true if something was removed; absence is not an error.
    pub fn remove(&mut self, id: AttachmentId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|attachment| attachment.id != id);
        before != self.pending.len()
    }

    /// Encodes an attachment's raw bytes as standard base64
    ///
    /// # Examples
    ///
    /// ```
    /// use scholia::attachments::{AttachmentStore, IncomingFile};
    ///
    /// let mut store = AttachmentStore::new();
    /// let attachment = store.add(IncomingFile::new("a.png", "image/png", &b"hi"[..])).unwrap();
    /// assert_eq!(AttachmentStore::encode(&attachment), "aGk=");
    /// ```
    pub fn encode(attachment: &Attachment) -> String {
        base64::engine::general_purpose::STANDARD.encode(&attachment.raw_bytes)
    }

    /// Empties the pending set
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Pending attachments in selection order
    pub fn pending(&self) -> &[Attachment] {
        &self.pending
    }

    /// Number of pending attachments
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if nothing is pending
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_file, png_bytes, temp_dir};

    #[test]
    fn test_add_accepts_image() {
        let mut store = AttachmentStore::new();
        let attachment = store
            .add(IncomingFile::new("photo.jpg", "image/jpeg", vec![0xff, 0xd8, 0xff]))
            .unwrap();

        assert_eq!(attachment.name(), "photo.jpg");
        assert_eq!(attachment.mime_type(), "image/jpeg");
        assert_eq!(attachment.size(), 3);
        assert_eq!(store.pending(), &[attachment]);
    }

    #[test]
    fn test_add_rejects_non_image_without_state_change() {
        let mut store = AttachmentStore::new();
        store
            .add(IncomingFile::new("a.png", "image/png", vec![1]))
            .unwrap();

        let err = store
            .add(IncomingFile::new("essay.pdf", "application/pdf", vec![1, 2, 3]))
            .unwrap_err();

        assert!(matches!(err, ScholiaError::InvalidAttachmentKind(_)));
        assert_eq!(store.len(), 1);
        assert!(store.pending().iter().all(|a| a.name() != "essay.pdf"));
    }

    #[test]
    fn test_add_normalizes_mime_case() {
        let mut store = AttachmentStore::new();
        let attachment = store
            .add(IncomingFile::new("a.png", " IMAGE/PNG ", vec![1]))
            .unwrap();
        assert_eq!(attachment.mime_type(), "image/png");
    }

    #[test]
    fn test_ids_are_unique() {
        let mut store = AttachmentStore::new();
        let a = store.add(IncomingFile::new("a.png", "image/png", vec![1])).unwrap();
        let b = store.add(IncomingFile::new("b.png", "image/png", vec![2])).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_remove_by_identity() {
        let mut store = AttachmentStore::new();
        let a = store.add(IncomingFile::new("a.png", "image/png", vec![1])).unwrap();
        let b = store.add(IncomingFile::new("b.png", "image/png", vec![2])).unwrap();

        assert!(store.remove(a.id()));
        assert_eq!(store.pending(), &[b]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut store = AttachmentStore::new();
        store.add(IncomingFile::new("a.png", "image/png", vec![1])).unwrap();

        assert!(!store.remove(AttachmentId::new()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut store = AttachmentStore::new();
        store.add(IncomingFile::new("a.png", "image/png", vec![1])).unwrap();
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_encode_is_standard_base64() {
        let mut store = AttachmentStore::new();
        let attachment = store
            .add(IncomingFile::new("a.png", "image/png", vec![0xfb, 0xff]))
            .unwrap();
        assert_eq!(AttachmentStore::encode(&attachment), "+/8=");
        // Encoding leaves the store untouched
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_attachment_id_round_trips_through_display() {
        let id = AttachmentId::new();
        let parsed: AttachmentId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-an-id".parse::<AttachmentId>().is_err());
    }

    #[test]
    fn test_serialized_attachment_omits_bytes() {
        let mut store = AttachmentStore::new();
        let attachment = store
            .add(IncomingFile::new("a.png", "image/png", vec![1, 2, 3]))
            .unwrap();
        let json = serde_json::to_value(&attachment).unwrap();
        assert_eq!(json["size"], 3);
        assert!(json.get("raw_bytes").is_none());
    }

    #[tokio::test]
    async fn test_add_path_detects_png_by_extension() {
        let dir = temp_dir();
        let path = dir.path().join("chart.png");
        std::fs::write(&path, png_bytes()).unwrap();

        let mut store = AttachmentStore::new();
        let attachment = store.add_path(&path).await.unwrap();
        assert_eq!(attachment.name(), "chart.png");
        assert_eq!(attachment.mime_type(), "image/png");
    }

    #[tokio::test]
    async fn test_add_path_sniffs_magic_bytes_without_extension() {
        let dir = temp_dir();
        let path = dir.path().join("upload");
        std::fs::write(&path, png_bytes()).unwrap();

        let mut store = AttachmentStore::new();
        let attachment = store.add_path(&path).await.unwrap();
        assert_eq!(attachment.mime_type(), "image/png");
    }

    #[tokio::test]
    async fn test_add_path_rejects_text_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "notes.txt", "field notes");

        let mut store = AttachmentStore::new();
        let err = store.add_path(&path).await.unwrap_err();
        assert!(matches!(err, ScholiaError::InvalidAttachmentKind(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_add_path_missing_file_is_io_error() {
        let dir = temp_dir();
        let mut store = AttachmentStore::new();
        let err = store
            .add_path(&dir.path().join("missing.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, ScholiaError::Io(_)));
    }
}
