//! `data:` URL decoding.
//!
//! [RFC 2397](https://www.rfc-editor.org/rfc/rfc2397)
//!
//! Data URLs carry their payload inline, so they are the one kind of
//! non-file image source that can be resolved synchronously.

use base64::Engine;
use thiserror::Error;

/// Why a `data:` URL could not be decoded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataUrlError {
    /// The string does not start with `data:`.
    #[error("not a data URL")]
    NotADataUrl,
    /// No `,` separates the metadata from the payload.
    #[error("invalid data URL: missing comma")]
    MissingComma,
    /// The base64 payload is malformed.
    #[error("base64 decode error: {0}")]
    Base64(String),
    /// A `%XX` escape in a plain payload is malformed.
    #[error("invalid percent-encoding in data URL")]
    PercentEncoding,
}

/// A parsed `data:` URL that can be decoded into raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl<'a> {
    /// Media type and parameters, e.g. `image/png;base64`.
    metadata: &'a str,
    /// Everything after the first comma.
    payload: &'a str,
}

impl<'a> DataUrl<'a> {
    /// Split a raw `data:` URL into metadata and payload.
    ///
    /// # Errors
    ///
    /// Returns [`DataUrlError::NotADataUrl`] or [`DataUrlError::MissingComma`]
    /// when `raw` is not shaped like a data URL.
    pub fn parse(raw: &'a str) -> Result<Self, DataUrlError> {
        let rest = raw.strip_prefix("data:").ok_or(DataUrlError::NotADataUrl)?;
        let (metadata, payload) = rest.split_once(',').ok_or(DataUrlError::MissingComma)?;
        Ok(Self { metadata, payload })
    }

    /// The media type, without parameters (`image/png`).
    #[must_use]
    pub fn media_type(&self) -> &'a str {
        self.metadata.split(';').next().unwrap_or_default()
    }

    /// Whether the payload is base64-encoded.
    #[must_use]
    pub fn is_base64(&self) -> bool {
        self.metadata.ends_with(";base64")
    }

    /// Decode the payload into raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the base64 or percent-encoding is malformed.
    pub fn decode(&self) -> Result<Vec<u8>, DataUrlError> {
        if self.is_base64() {
            base64::engine::general_purpose::STANDARD
                .decode(self.payload.trim())
                .map_err(|e| DataUrlError::Base64(e.to_string()))
        } else {
            percent_decode(self.payload)
        }
    }
}

/// Decode `%XX` escapes; other bytes pass through unchanged.
fn percent_decode(input: &str) -> Result<Vec<u8>, DataUrlError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = input.get(i + 1..i + 3).ok_or(DataUrlError::PercentEncoding)?;
            let byte = u8::from_str_radix(hex, 16).map_err(|_| DataUrlError::PercentEncoding)?;
            out.push(byte);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

/// Decode a `data:` URL and return its payload as raw bytes.
///
/// # Errors
///
/// Returns an error if `url` is not a data URL or its payload is malformed.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, DataUrlError> {
    DataUrl::parse(url)?.decode()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_base64_data_url() {
        let bytes = decode_data_url("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");
        let url = DataUrl::parse("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(url.media_type(), "image/png");
    }

    #[test]
    fn test_decode_percent_encoded_data_url() {
        let bytes = decode_data_url("data:image/svg+xml,%3Csvg%3E").unwrap();
        assert_eq!(bytes, b"<svg>");
    }

    #[test]
    fn test_decode_data_url_errors() {
        assert_eq!(decode_data_url("image.png"), Err(DataUrlError::NotADataUrl));
        assert_eq!(decode_data_url("data:image/png"), Err(DataUrlError::MissingComma));
        assert_eq!(decode_data_url("data:,%G1"), Err(DataUrlError::PercentEncoding));
    }
}
