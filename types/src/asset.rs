//! Background asset types.

use std::fmt;

/// Image container recognised from leading magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
    Bmp,
}

impl AssetFormat {
    /// Identify the image container from the first bytes of a payload.
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";

        if bytes.starts_with(PNG) {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
            Some(Self::WebP)
        } else if bytes.starts_with(b"BM") && bytes.len() >= 14 {
            Some(Self::Bmp)
        } else {
            None
        }
    }

    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
            Self::Bmp => "image/bmp",
        }
    }
}

impl fmt::Display for AssetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// Successfully downloaded and recognised asset.
#[derive(Clone, PartialEq, Eq)]
pub struct FetchedAsset {
    /// URL the bytes were served from, after redirects.
    pub url: String,
    pub content_type: Option<String>,
    pub format: AssetFormat,
    pub bytes: Vec<u8>,
}

impl FetchedAsset {
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Payloads can be large; keep logs readable.
impl fmt::Debug for FetchedAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchedAsset")
            .field("url", &self.url)
            .field("content_type", &self.content_type)
            .field("format", &self.format)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Status of the background fetch owned by a splash session.
///
/// `Completed` and `Cancelled` are terminal. A failed download reports
/// `Cancelled`: the fetch gives up on itself and the session sees the same
/// "not successful" outcome either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchStatus {
    Running,
    Completed,
    Cancelled,
}

impl FetchStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a fetch ended without a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotSuccessful {
    /// The owner cancelled the fetch (transition fired or session destroyed).
    Cancelled,
    /// The download or decode failed.
    Failed { reason: String },
}

impl fmt::Display for NotSuccessful {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => f.write_str("cancelled"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AssetFormat, FetchStatus};

    #[test]
    fn sniff_recognises_common_containers() {
        assert_eq!(
            AssetFormat::sniff(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR"),
            Some(AssetFormat::Png)
        );
        assert_eq!(
            AssetFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]),
            Some(AssetFormat::Jpeg)
        );
        assert_eq!(AssetFormat::sniff(b"GIF89a\x01\x00"), Some(AssetFormat::Gif));
        assert_eq!(
            AssetFormat::sniff(b"RIFF\x24\x00\x00\x00WEBPVP8 "),
            Some(AssetFormat::WebP)
        );
        assert_eq!(
            AssetFormat::sniff(b"BM\x3a\x00\x00\x00\x00\x00\x00\x00\x36\x00\x00\x00"),
            Some(AssetFormat::Bmp)
        );
    }

    #[test]
    fn sniff_rejects_text_and_truncated_payloads() {
        assert_eq!(AssetFormat::sniff(b"<!DOCTYPE html>"), None);
        assert_eq!(AssetFormat::sniff(b""), None);
        assert_eq!(AssetFormat::sniff(b"\x89PN"), None);
        assert_eq!(AssetFormat::sniff(b"RIFF\x24\x00\x00\x00WAVE"), None);
        assert_eq!(AssetFormat::sniff(b"BM"), None);
    }

    #[test]
    fn only_running_is_non_terminal() {
        assert!(!FetchStatus::Running.is_terminal());
        assert!(FetchStatus::Completed.is_terminal());
        assert!(FetchStatus::Cancelled.is_terminal());
    }
}
