//! Image attachments and `data:` URL handling.
//!
//! Images are kept in two shapes: a `data:<mime>;base64,<payload>` URL stored
//! on the user's message, and the bare base64 payload plus MIME type that is
//! sent to the model.

use base64::Engine as _;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Largest file accepted for inline upload. Gemini rejects inline request
/// bodies over 20 MB, and base64 inflates by a third.
pub const MAX_IMAGE_BYTES: usize = 15 * 1024 * 1024;

#[derive(Debug)]
pub enum ImageError {
    Read { path: PathBuf, source: std::io::Error },
    TooLarge { size: usize },
    UnsupportedFormat,
    /// The string was not a `data:<mime>;base64,<payload>` URL.
    MalformedDataUrl(String),
    InvalidBase64(base64::DecodeError),
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::Read { path, source } => {
                write!(f, "Failed to read image {}: {}", path.display(), source)
            }
            ImageError::TooLarge { size } => write!(
                f,
                "Image is {size} bytes; the limit is {MAX_IMAGE_BYTES} bytes"
            ),
            ImageError::UnsupportedFormat => {
                write!(f, "Unsupported image format (expected PNG, JPEG, GIF, WebP or HEIC)")
            }
            ImageError::MalformedDataUrl(reason) => write!(f, "Malformed data URL: {reason}"),
            ImageError::InvalidBase64(err) => write!(f, "Invalid base64 image payload: {err}"),
        }
    }
}

impl std::error::Error for ImageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImageError::Read { source, .. } => Some(source),
            ImageError::InvalidBase64(err) => Some(err),
            _ => None,
        }
    }
}

/// An image ready to be inlined into a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub mime_type: String,
    /// Base64 payload without any `data:` prefix.
    pub data: String,
}

impl ImageAttachment {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ImageError> {
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageError::TooLarge { size: bytes.len() });
        }
        let mime_type = sniff_mime_type(bytes).ok_or(ImageError::UnsupportedFormat)?;
        Ok(Self {
            mime_type: mime_type.to_string(),
            data: base64::prelude::BASE64_STANDARD.encode(bytes),
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, ImageError> {
        let bytes = fs::read(path).map_err(|source| ImageError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }

    /// Split a `data:` URL into MIME type and payload.
    pub fn from_data_url(url: &str) -> Result<Self, ImageError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| ImageError::MalformedDataUrl("missing `data:` scheme".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| ImageError::MalformedDataUrl("missing `,` separator".into()))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| ImageError::MalformedDataUrl("payload is not base64".into()))?;
        if !mime_type.starts_with("image/") {
            return Err(ImageError::MalformedDataUrl(format!(
                "`{mime_type}` is not an image type"
            )));
        }

        let payload = payload.trim();
        base64::prelude::BASE64_STANDARD
            .decode(payload)
            .map_err(ImageError::InvalidBase64)?;

        Ok(Self {
            mime_type: mime_type.to_string(),
            data: payload.to_string(),
        })
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Size of the decoded image in bytes, computed from the payload length.
    pub fn decoded_len(&self) -> usize {
        let padding = self.data.bytes().rev().take_while(|b| *b == b'=').count();
        ((self.data.len() / 4) * 3).saturating_sub(padding.min(2))
    }
}

/// Detect an image MIME type from its leading bytes.
pub fn sniff_mime_type(bytes: &[u8]) -> Option<&'static str> {
    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";

    if bytes.starts_with(PNG) {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
        match &bytes[8..12] {
            b"heic" | b"heix" | b"hevc" | b"hevx" => Some("image/heic"),
            b"mif1" | b"msf1" => Some("image/heif"),
            _ => None,
        }
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn sniffs_common_formats() {
        assert_eq!(sniff_mime_type(PNG_HEADER), Some("image/png"));
        assert_eq!(sniff_mime_type(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(sniff_mime_type(b"GIF89a....."), Some("image/gif"));
        assert_eq!(sniff_mime_type(b"RIFF\0\0\0\0WEBPVP8 "), Some("image/webp"));
        assert_eq!(sniff_mime_type(b"\0\0\0\x18ftypheic"), Some("image/heic"));
        assert_eq!(sniff_mime_type(b"plain text"), None);
    }

    #[test]
    fn from_bytes_keeps_real_mime_type() {
        let attachment = ImageAttachment::from_bytes(PNG_HEADER).expect("png");
        assert_eq!(attachment.mime_type, "image/png");
        assert!(attachment.to_data_url().starts_with("data:image/png;base64,"));
        assert_eq!(attachment.decoded_len(), PNG_HEADER.len());
    }

    #[test]
    fn unknown_bytes_are_rejected() {
        assert!(matches!(
            ImageAttachment::from_bytes(b"not an image"),
            Err(ImageError::UnsupportedFormat)
        ));
    }

    #[test]
    fn data_url_round_trip_strips_prefix() {
        let original = ImageAttachment::from_bytes(&[0xFF, 0xD8, 0xFF, 0xDB, 0x00]).expect("jpeg");
        let url = original.to_data_url();
        let parsed = ImageAttachment::from_data_url(&url).expect("parse");

        assert_eq!(parsed, original);
        assert!(!parsed.data.starts_with("data:"));
    }

    #[test]
    fn malformed_data_urls_are_rejected() {
        for url in [
            "image/png;base64,AAAA",
            "data:image/png;base64",
            "data:image/png,AAAA",
            "data:text/plain;base64,AAAA",
        ] {
            assert!(
                matches!(
                    ImageAttachment::from_data_url(url),
                    Err(ImageError::MalformedDataUrl(_))
                ),
                "{url} should be rejected"
            );
        }

        assert!(matches!(
            ImageAttachment::from_data_url("data:image/png;base64,@@@"),
            Err(ImageError::InvalidBase64(_))
        ));
    }

    #[test]
    fn from_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"GIF87a\x01\x00\x01\x00").expect("write");

        let attachment = ImageAttachment::from_path(file.path()).expect("gif");
        assert_eq!(attachment.mime_type, "image/gif");
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ImageAttachment::from_path(Path::new("/definitely/not/here.png"))
            .expect_err("missing file");
        assert!(err.to_string().contains("/definitely/not/here.png"));
    }
}
