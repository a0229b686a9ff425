//! Validation of uploaded document images before they reach the oracle.
//!
//! Formats are detected from magic bytes, never from file names or declared
//! content types.

use crate::error::ImageError;

/// Largest upload forwarded to the oracle (inline request limit).
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Pdf,
}

impl ImageKind {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Pdf => "application/pdf",
        }
    }

    /// Detect the format from the leading bytes.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(Self::Png),
            [0x25, 0x50, 0x44, 0x46, ..] => Some(Self::Pdf),
            _ => None,
        }
    }
}

/// A document image whose format has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentImage {
    bytes: Vec<u8>,
    kind: ImageKind,
}

impl DocumentImage {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ImageError> {
        Self::with_limit(bytes, MAX_IMAGE_BYTES)
    }

    pub fn with_limit(bytes: Vec<u8>, limit: usize) -> Result<Self, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }
        if bytes.len() > limit {
            return Err(ImageError::TooLarge {
                size: bytes.len(),
                limit,
            });
        }
        let kind = ImageKind::detect(&bytes).ok_or(ImageError::UnsupportedFormat)?;
        Ok(Self { bytes, kind })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn kind(&self) -> ImageKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00];

    #[test]
    fn detects_supported_formats() {
        assert_eq!(ImageKind::detect(JPEG), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::detect(PNG), Some(ImageKind::Png));
        assert_eq!(ImageKind::detect(b"%PDF-1.4 ..."), Some(ImageKind::Pdf));
    }

    #[test]
    fn mime_types() {
        assert_eq!(ImageKind::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(ImageKind::Png.mime_type(), "image/png");
        assert_eq!(ImageKind::Pdf.mime_type(), "application/pdf");
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(DocumentImage::from_bytes(Vec::new()), Err(ImageError::Empty));
    }

    #[test]
    fn rejects_unknown_magic() {
        assert_eq!(
            DocumentImage::from_bytes(b"<!DOCTYPE html>".to_vec()),
            Err(ImageError::UnsupportedFormat)
        );
        // Truncated PNG signature.
        assert_eq!(
            DocumentImage::from_bytes(vec![0x89, 0x50, 0x4E]),
            Err(ImageError::UnsupportedFormat)
        );
    }

    #[test]
    fn rejects_oversized() {
        let err = DocumentImage::with_limit(JPEG.to_vec(), 4).unwrap_err();
        assert_eq!(err, ImageError::TooLarge { size: 6, limit: 4 });
    }

    #[test]
    fn keeps_bytes_and_kind() {
        let image = DocumentImage::from_bytes(JPEG.to_vec()).unwrap();
        assert_eq!(image.kind(), ImageKind::Jpeg);
        assert_eq!(image.bytes(), JPEG);
        assert_eq!(image.len(), JPEG.len());
    }
}
