//! One capability adapter per supported format. Each wraps its engine crate
//! and exposes the probe/frame/decode protocol from [`crate::codec`]; every
//! adapter writes premultiplied BGRA.

pub(crate) mod bmp;
pub(crate) mod gif;
pub(crate) mod jpeg;
pub(crate) mod png;
pub(crate) mod webp;

use crate::codec::FormatCodec;
use crate::info::ImageFormat;

/// Trial order when magic-byte sniffing is inconclusive or the sniffed
/// format fails. Fixed and stable; diagnostics depend on it.
pub(crate) const FALLBACK_ORDER: [ImageFormat; 5] = [
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::Webp,
    ImageFormat::Bmp,
];

pub(crate) fn codec_for(format: ImageFormat) -> &'static dyn FormatCodec {
    match format {
        ImageFormat::Png => &png::PngCodec,
        ImageFormat::Jpeg => &jpeg::JpegCodec,
        ImageFormat::Gif => &gif::GifCodec,
        ImageFormat::Webp => &webp::WebpCodec,
        ImageFormat::Bmp => &bmp::BmpCodec,
    }
}
