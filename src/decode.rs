use crate::animation::{self, Animation};
use crate::codec::{BlendMode, FrameDecoder, Header};
use crate::codecs;
use crate::error::DecodeError;
use crate::info::{ImageFormat, detect_format};
use crate::limits::Limits;
use crate::pixel::{self, PixelOrder};
use crate::surface::{self, Surface, SurfaceMut};

/// Hard ceiling on either dimension, independent of [`Limits`].
pub(crate) const MAX_DIMENSION: u32 = 16384;

/// Builder for decode operations over an in-memory image buffer.
///
/// One request decodes one input. The input bytes are borrowed; every output
/// is an owned value released by drop.
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    format: Option<ImageFormat>,
    order: PixelOrder,
    limits: Option<&'a Limits>,
    want_delays: bool,
}

impl<'a> DecodeRequest<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            format: None,
            order: PixelOrder::Bgra,
            limits: None,
            want_delays: true,
        }
    }

    /// Force one format, bypassing detection and fallback. Errors from a
    /// forced format are returned as-is, untagged.
    pub fn format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Output channel order. Defaults to [`PixelOrder::Bgra`], the native
    /// decode order.
    pub fn order(mut self, order: PixelOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Whether [`decode_frames`](Self::decode_frames) reports per-frame
    /// delays. Defaults to true.
    pub fn with_delays(mut self, want: bool) -> Self {
        self.want_delays = want;
        self
    }

    /// Auto-decode: detect the format (or use the forced one) and decode a
    /// still image.
    ///
    /// A GIF with more than one frame is not flattened to a still; it comes
    /// back as [`Decoded::Animated`] so the caller can redirect to
    /// [`decode_frames`](Self::decode_frames).
    pub fn decode(self) -> Result<Decoded, DecodeError> {
        if self.data.is_empty() {
            return Err(DecodeError::BadArgument("empty input"));
        }
        match self.format {
            Some(format) => attempt_auto(format, self.data, self.limits, self.order),
            None => run_candidates(self.data, |format| {
                attempt_auto(format, self.data, self.limits, self.order)
            }),
        }
    }

    /// Decode exactly one frame into a new tightly packed surface. Animated
    /// inputs yield their first frame.
    pub fn decode_first_frame(self) -> Result<Surface, DecodeError> {
        if self.data.is_empty() {
            return Err(DecodeError::BadArgument("empty input"));
        }
        match self.format {
            Some(format) => decode_single(format, self.data, self.limits, self.order),
            None => run_candidates(self.data, |format| {
                decode_single(format, self.data, self.limits, self.order)
            }),
        }
    }

    /// Decode exactly one frame into caller-supplied memory at a caller-given
    /// stride. Nothing is allocated for output; only transient scratch.
    ///
    /// The caller declares the dimensions it sized `dst` for; the decoded
    /// header must match them. Row padding beyond `width * 4` is never
    /// written. On error the contents of `dst` are unspecified.
    pub fn decode_into(
        self,
        dst: &mut [u8],
        width: u32,
        height: u32,
        stride: usize,
    ) -> Result<(), DecodeError> {
        if self.data.is_empty() {
            return Err(DecodeError::BadArgument("empty input"));
        }
        if width == 0 || height == 0 {
            return Err(DecodeError::BadArgument("zero destination dimensions"));
        }
        let row_bytes = (width as usize)
            .checked_mul(4)
            .ok_or(DecodeError::BadArgument("destination size overflows"))?;
        if stride < row_bytes {
            return Err(DecodeError::BadArgument("stride smaller than width * 4"));
        }
        let needed = stride
            .checked_mul(height as usize - 1)
            .and_then(|n| n.checked_add(row_bytes))
            .ok_or(DecodeError::BadArgument("destination size overflows"))?;
        if dst.len() < needed {
            return Err(DecodeError::BufferTooSmall {
                needed,
                actual: dst.len(),
            });
        }
        match self.format {
            Some(format) => decode_single_into(
                format, self.data, self.limits, self.order, dst, width, height, stride,
            ),
            None => run_candidates(self.data, |format| {
                decode_single_into(
                    format, self.data, self.limits, self.order, &mut *dst, width, height, stride,
                )
            }),
        }
    }

    /// Decode and flatten every frame of an animated GIF. See
    /// [`Animation`].
    ///
    /// Animation decoding is GIF-only; forcing any other format with
    /// [`format`](Self::format) is rejected.
    pub fn decode_frames(self) -> Result<Animation, DecodeError> {
        if self.format.is_some_and(|f| f != ImageFormat::Gif) {
            return Err(DecodeError::BadArgument("animation decoding is GIF-only"));
        }
        animation::decode_frames(self.data, self.order, self.limits, self.want_delays)
    }
}

/// Result of [`DecodeRequest::decode`].
#[derive(Debug)]
pub enum Decoded {
    /// A still image (or the only frame of a single-frame GIF).
    Still(Surface),
    /// The input is a multi-frame GIF; nothing was returned so the caller
    /// can redirect to [`DecodeRequest::decode_frames`].
    Animated {
        format: ImageFormat,
        width: u32,
        height: u32,
    },
}

pub(crate) fn check_dimensions(header: Header) -> Result<(), DecodeError> {
    if header.width == 0 || header.height == 0 {
        return Err(DecodeError::InvalidHeader("zero-sized image".into()));
    }
    if header.width > MAX_DIMENSION || header.height > MAX_DIMENSION {
        return Err(DecodeError::DimensionsTooLarge {
            width: header.width,
            height: header.height,
        });
    }
    Ok(())
}

/// Open a format's decoder and validate its header against the dimension
/// ceiling and the caller's limits.
pub(crate) fn open_checked<'a>(
    format: ImageFormat,
    data: &'a [u8],
    limits: Option<&Limits>,
) -> Result<(Box<dyn FrameDecoder + 'a>, Header), DecodeError> {
    let decoder = codecs::codec_for(format).open(data)?;
    let header = decoder.header();
    check_dimensions(header)?;
    if let Some(limits) = limits {
        limits.check(header.width, header.height)?;
    }
    Ok((decoder, header))
}

/// The tail of the single-frame protocol: first frame header, scratch
/// sizing, pixel decode with blend Replace. Scratch is freed on every exit
/// path by drop.
pub(crate) fn decode_one_frame(
    decoder: &mut dyn FrameDecoder,
    view: &mut SurfaceMut<'_>,
    limits: Option<&Limits>,
) -> Result<(), DecodeError> {
    // Still formats always report exactly one frame; only a frameless GIF
    // can end here.
    if decoder.next_frame_header()?.is_none() {
        return Err(DecodeError::NoFrames);
    }
    let scratch_len = decoder.required_scratch_len();
    if let Some(limits) = limits {
        limits.check_memory(scratch_len as u64)?;
    }
    let mut scratch = surface::alloc_bytes(scratch_len)?;
    decoder.decode_frame(view, BlendMode::Replace, &mut scratch)
}

fn decode_single(
    format: ImageFormat,
    data: &[u8],
    limits: Option<&Limits>,
    order: PixelOrder,
) -> Result<Surface, DecodeError> {
    let (mut decoder, header) = open_checked(format, data, limits)?;
    if let Some(limits) = limits {
        limits.check_memory(u64::from(header.width) * u64::from(header.height) * 4)?;
    }
    let mut out = Surface::new(header.width, header.height, PixelOrder::Bgra)?;
    {
        let mut view = out.view_mut();
        decode_one_frame(decoder.as_mut(), &mut view, limits)?;
    }
    out.convert_in_place(order);
    Ok(out)
}

#[allow(clippy::too_many_arguments)]
fn decode_single_into(
    format: ImageFormat,
    data: &[u8],
    limits: Option<&Limits>,
    order: PixelOrder,
    dst: &mut [u8],
    width: u32,
    height: u32,
    stride: usize,
) -> Result<(), DecodeError> {
    let (mut decoder, header) = open_checked(format, data, limits)?;
    if header.width != width || header.height != height {
        return Err(DecodeError::InvalidHeader(format!(
            "image is {}x{}, destination is {width}x{height}",
            header.width, header.height
        )));
    }
    {
        let mut view = SurfaceMut::new(dst, width, height, stride);
        decode_one_frame(decoder.as_mut(), &mut view, limits)?;
    }
    if order == PixelOrder::Rgba {
        pixel::swap_channels(dst, width, height, stride);
    }
    Ok(())
}

fn attempt_auto(
    format: ImageFormat,
    data: &[u8],
    limits: Option<&Limits>,
    order: PixelOrder,
) -> Result<Decoded, DecodeError> {
    let (mut decoder, header) = open_checked(format, data, limits)?;
    if let Some(limits) = limits {
        limits.check_memory(u64::from(header.width) * u64::from(header.height) * 4)?;
    }
    let mut out = Surface::new(header.width, header.height, PixelOrder::Bgra)?;
    {
        let mut view = out.view_mut();
        decode_one_frame(decoder.as_mut(), &mut view, limits)?;
    }
    // A second frame header after the first frame means animation: return
    // the redirect signal instead of a flattened still.
    if format == ImageFormat::Gif && decoder.next_frame_header()?.is_some() {
        return Ok(Decoded::Animated {
            format,
            width: header.width,
            height: header.height,
        });
    }
    out.convert_in_place(order);
    Ok(Decoded::Still(out))
}

/// Run `attempt` over the candidate formats: the magic-matched format first,
/// then the fixed fallback order. On total failure, aggregate the
/// per-format diagnostics into one error.
pub(crate) fn run_candidates<T>(
    data: &[u8],
    mut attempt: impl FnMut(ImageFormat) -> Result<T, DecodeError>,
) -> Result<T, DecodeError> {
    let mut candidates: Vec<ImageFormat> = Vec::with_capacity(codecs::FALLBACK_ORDER.len());
    if let Some(sniffed) = detect_format(data) {
        candidates.push(sniffed);
    }
    for format in codecs::FALLBACK_ORDER {
        if !candidates.contains(&format) {
            candidates.push(format);
        }
    }

    let mut failures: Vec<(ImageFormat, DecodeError)> = Vec::new();
    for format in candidates {
        match attempt(format) {
            Ok(value) => return Ok(value),
            Err(e) => failures.push((format, e)),
        }
    }
    Err(aggregate_failure(data, &failures))
}

/// Pick the most relevant diagnostic: the magic-matched format's, else
/// JPEG's, else PNG's, else the first recorded, else a generic message.
/// Messages are tagged with the format name they came from.
fn aggregate_failure(data: &[u8], failures: &[(ImageFormat, DecodeError)]) -> DecodeError {
    fn tagged(format: ImageFormat, e: &DecodeError) -> DecodeError {
        DecodeError::UnrecognizedFormat(format!("{}: {e}", format.name()))
    }

    if let Some(sniffed) = detect_format(data) {
        if let Some((format, e)) = failures.iter().find(|(f, _)| *f == sniffed) {
            return tagged(*format, e);
        }
    }
    for preferred in [ImageFormat::Jpeg, ImageFormat::Png] {
        if let Some((format, e)) = failures.iter().find(|(f, _)| *f == preferred) {
            return tagged(*format, e);
        }
    }
    if let Some((format, e)) = failures.first() {
        return tagged(*format, e);
    }
    DecodeError::UnrecognizedFormat("unsupported or corrupt image format".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(e: DecodeError) -> String {
        match e {
            DecodeError::UnrecognizedFormat(m) => m,
            other => panic!("expected UnrecognizedFormat, got {other:?}"),
        }
    }

    #[test]
    fn aggregate_prefers_magic_matched_format() {
        let mut png_sig = b"\x89PNG\r\n\x1a\n".to_vec();
        png_sig.extend_from_slice(&[0u8; 4]);
        let failures = vec![
            (ImageFormat::Png, DecodeError::InvalidHeader("broken ihdr".into())),
            (ImageFormat::Jpeg, DecodeError::InvalidHeader("no soi".into())),
        ];
        let m = msg(aggregate_failure(&png_sig, &failures));
        assert!(m.starts_with("png:"), "{m}");
        assert!(m.contains("broken ihdr"));
    }

    #[test]
    fn aggregate_prefers_jpeg_then_png_without_magic() {
        let failures = vec![
            (ImageFormat::Png, DecodeError::InvalidHeader("a".into())),
            (ImageFormat::Jpeg, DecodeError::InvalidHeader("b".into())),
            (ImageFormat::Gif, DecodeError::InvalidHeader("c".into())),
        ];
        assert!(msg(aggregate_failure(b"zzzz", &failures)).starts_with("jpeg:"));

        let failures = vec![
            (ImageFormat::Gif, DecodeError::InvalidHeader("c".into())),
            (ImageFormat::Png, DecodeError::InvalidHeader("a".into())),
        ];
        assert!(msg(aggregate_failure(b"zzzz", &failures)).starts_with("png:"));
    }

    #[test]
    fn aggregate_falls_back_to_first_then_generic() {
        let failures = vec![(ImageFormat::Bmp, DecodeError::InvalidHeader("x".into()))];
        assert!(msg(aggregate_failure(b"zzzz", &failures)).starts_with("bmp:"));

        let m = msg(aggregate_failure(b"zzzz", &[]));
        assert_eq!(m, "unsupported or corrupt image format");
    }
}
