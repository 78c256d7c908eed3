use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::{debug, warn};

use cropguard_core::EncodeError;

use crate::data_uri::to_data_uri;
use crate::mime_detect::{detect_mime_type, is_image, sniff_mime_type};

/// Advisory upload size shown to users ("最大 10MB").
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Formats hint shown next to the upload affordance.
pub const SUPPORTED_FORMATS_HINT: &str = "支持 JPG, PNG";

/// Where an image came from. Every source goes through the same
/// validate-and-encode path.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Chosen with a file picker or passed on the command line.
    Picker(PathBuf),
    /// Dropped onto the upload zone (terminal paste or HTTP upload of a path).
    Dropped(PathBuf),
    /// Raw captured bytes with the type the capture device declared.
    Camera { bytes: Bytes, mime_type: Option<String> },
}

impl ImageSource {
    pub fn kind(&self) -> &'static str {
        match self {
            ImageSource::Picker(_) => "picker",
            ImageSource::Dropped(_) => "drop",
            ImageSource::Camera { .. } => "camera",
        }
    }
}

/// A validated image ready for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub data_uri: String,
    pub mime_type: String,
    pub byte_len: u64,
}

/// Size limit for uploads. Advisory unless `enforce` is set.
#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
    pub max_bytes: u64,
    pub enforce: bool,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            enforce: false,
        }
    }
}

/// Validates and encodes images into data URIs.
#[derive(Debug, Clone, Default)]
pub struct ImageEncoder {
    policy: UploadPolicy,
}

impl ImageEncoder {
    pub fn new(policy: UploadPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> UploadPolicy {
        self.policy
    }

    /// Validate and encode an image from any source.
    pub async fn encode(&self, source: ImageSource) -> Result<EncodedImage, EncodeError> {
        let kind = source.kind();
        match source {
            ImageSource::Picker(path) => self.encode_file(&path, kind).await,
            ImageSource::Dropped(pasted) => {
                self.encode_file(&normalize_dropped_path(&pasted), kind).await
            }
            ImageSource::Camera { bytes, mime_type } => {
                let mime = match mime_type.as_deref().map(str::trim) {
                    Some(declared) if !declared.is_empty() => declared.to_string(),
                    _ => sniff_mime_type(&bytes)
                        .unwrap_or("application/octet-stream")
                        .to_string(),
                };
                if !is_image(&mime) {
                    return Err(EncodeError::NotAnImage(mime));
                }
                debug!(source = kind, "Captured image");
                self.encode_bytes(&bytes, &mime)
            }
        }
    }

    async fn encode_file(&self, path: &Path, kind: &str) -> Result<EncodedImage, EncodeError> {
        let mime = detect_mime_type(path);
        if !is_image(mime) {
            return Err(EncodeError::NotAnImage(mime.to_string()));
        }
        let bytes = tokio::fs::read(path).await?;
        debug!(source = kind, path = %path.display(), "Read image");
        self.encode_bytes(&bytes, mime)
    }

    /// Encode bytes whose type has already been declared as an image.
    pub fn encode_bytes(&self, bytes: &[u8], mime_type: &str) -> Result<EncodedImage, EncodeError> {
        if !is_image(mime_type) {
            return Err(EncodeError::NotAnImage(mime_type.to_string()));
        }
        let size = bytes.len() as u64;
        if size > self.policy.max_bytes {
            if self.policy.enforce {
                return Err(EncodeError::TooLarge {
                    size,
                    limit: self.policy.max_bytes,
                });
            }
            warn!(size, limit = self.policy.max_bytes, "Image exceeds advisory size limit");
        }
        Ok(EncodedImage {
            data_uri: to_data_uri(mime_type, bytes),
            mime_type: mime_type.to_string(),
            byte_len: size,
        })
    }
}

/// Terminals deliver dropped files as pasted text: possibly quoted, possibly
/// percent-encoded `file://` URLs, possibly with backslash-escaped spaces.
pub fn normalize_dropped_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    let trimmed = raw.trim().trim_matches(|c| c == '\'' || c == '"');
    match trimmed.strip_prefix("file://") {
        Some(url_path) => match urlencoding::decode(url_path) {
            Ok(decoded) => PathBuf::from(decoded.into_owned()),
            Err(_) => PathBuf::from(url_path),
        },
        None => PathBuf::from(trimmed.replace("\\ ", " ")),
    }
}
