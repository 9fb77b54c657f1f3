use crate::decode::run_candidates;
use crate::error::DecodeError;

/// Image format, detected from magic bytes or forced by the caller.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Bmp,
}

impl ImageFormat {
    /// Lowercase tag used in aggregated diagnostics ("png: ...").
    pub fn name(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
            ImageFormat::Bmp => "bmp",
        }
    }
}

/// Sniff the format from leading magic bytes. `None` means no signature
/// matched; decoding may still succeed through fallback trials.
pub fn detect_format(data: &[u8]) -> Option<ImageFormat> {
    if data.len() >= 8 && data[..8] == [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A] {
        return Some(ImageFormat::Png);
    }
    if data.len() >= 3 && data[..3] == [0xFF, 0xD8, 0xFF] {
        return Some(ImageFormat::Jpeg);
    }
    if data.len() >= 6 && (&data[..6] == b"GIF87a" || &data[..6] == b"GIF89a") {
        return Some(ImageFormat::Gif);
    }
    if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return Some(ImageFormat::Webp);
    }
    if data.len() >= 2 && &data[..2] == b"BM" {
        return Some(ImageFormat::Bmp);
    }
    None
}

/// Header-level facts about an image, no pixel data.
#[derive(Clone, Copy, Debug)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

impl ImageInfo {
    /// Probe with auto-detection: the sniffed format is tried first, then
    /// the remaining candidates in the fixed fallback order.
    pub fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        if data.is_empty() {
            return Err(DecodeError::BadArgument("empty input"));
        }
        run_candidates(data, |format| Self::from_bytes_as(data, format))
    }

    /// Probe as one specific format, no fallback.
    pub fn from_bytes_as(data: &[u8], format: ImageFormat) -> Result<Self, DecodeError> {
        if data.is_empty() {
            return Err(DecodeError::BadArgument("empty input"));
        }
        let codec = crate::codecs::codec_for(format);
        let header = codec.probe(data)?;
        Ok(ImageInfo {
            width: header.width,
            height: header.height,
            format: codec.format(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_png_signature() {
        let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        bytes.extend_from_slice(&[0u8; 16]);
        assert_eq!(detect_format(&bytes), Some(ImageFormat::Png));
    }

    #[test]
    fn detects_jpeg_soi() {
        assert_eq!(detect_format(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
    }

    #[test]
    fn detects_both_gif_versions() {
        assert_eq!(detect_format(b"GIF87a\x01\x00"), Some(ImageFormat::Gif));
        assert_eq!(detect_format(b"GIF89a\x01\x00"), Some(ImageFormat::Gif));
    }

    #[test]
    fn detects_webp_riff() {
        assert_eq!(detect_format(b"RIFF\x00\x00\x00\x00WEBPVP8 "), Some(ImageFormat::Webp));
    }

    #[test]
    fn detects_bmp() {
        assert_eq!(detect_format(b"BM\x00\x00\x00\x00"), Some(ImageFormat::Bmp));
    }

    #[test]
    fn short_or_unknown_input_is_none() {
        assert_eq!(detect_format(b""), None);
        assert_eq!(detect_format(b"GIF8"), None);
        assert_eq!(detect_format(b"RIFF\x00\x00\x00\x00WAVE"), None);
        assert_eq!(detect_format(b"not an image"), None);
    }
}
