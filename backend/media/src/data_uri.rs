//! `data:<mime>;base64,<payload>` helpers.

use base64::{engine::general_purpose::STANDARD, Engine};

/// Encode raw bytes as a base64 data URI.
pub fn to_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Return the raw base64 payload, dropping a `data:...;base64,` header if present.
pub fn strip_data_uri_prefix(input: &str) -> &str {
    match split_header(input) {
        Some((_, payload)) => payload,
        None => input,
    }
}

/// MIME type declared in a data URI header.
pub fn mime_from_data_uri(input: &str) -> Option<&str> {
    let (header, _) = split_header(input)?;
    let mime = header.trim_end_matches(";base64");
    let mime = mime.split(';').next().unwrap_or(mime);
    (!mime.is_empty()).then_some(mime)
}

fn split_header(input: &str) -> Option<(&str, &str)> {
    let rest = input.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    header.ends_with(";base64").then_some((header, payload))
}
