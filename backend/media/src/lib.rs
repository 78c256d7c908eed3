//! Image intake for CropGuard: validation, MIME detection, and data-URI
//! encoding for picker, drag-and-drop, and camera sources.

pub mod data_uri;
pub mod image;
pub mod mime_detect;

pub use data_uri::{mime_from_data_uri, strip_data_uri_prefix, to_data_uri};
pub use image::{
    normalize_dropped_path, EncodedImage, ImageEncoder, ImageSource, UploadPolicy,
    DEFAULT_MAX_UPLOAD_BYTES, SUPPORTED_FORMATS_HINT,
};
pub use mime_detect::{detect_mime_type, is_image, sniff_mime_type};
