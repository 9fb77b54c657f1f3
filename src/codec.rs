//! The capability boundary between the decode pipeline and the per-format
//! engines. The driver and compositor only ever see these four operations:
//! parse the header, yield frame headers, declare scratch needs, decode one
//! frame into a destination view.

use crate::error::DecodeError;
use crate::info::ImageFormat;
use crate::surface::SurfaceMut;

/// Frame durations are measured in flicks: 1/705 600 000 of a second,
/// 705 600 per millisecond. Integer-exact for every common frame rate.
pub(crate) const FLICKS_PER_MS: i64 = 705_600;

/// Image dimensions from a parsed container header.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Header {
    pub width: u32,
    pub height: u32,
}

/// How the canvas is modified after a frame is shown, before the next one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Disposal {
    None,
    RestoreBackground,
    RestorePrevious,
}

/// How a frame's pixels combine with existing canvas content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BlendMode {
    /// Write every pixel, including fully transparent ones.
    Replace,
    /// Premultiplied source-over onto what the canvas already holds.
    SourceOver,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Metadata for the frame about to be decoded.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FrameHeader {
    pub index: u32,
    pub duration_flicks: i64,
    pub disposal: Disposal,
    pub blend: BlendMode,
    /// Region this frame draws, relative to the canvas.
    pub bounds: Rect,
    /// Premultiplied BGRA fill color for frame 0 and RestoreBackground.
    pub background: [u8; 4],
}

impl FrameHeader {
    /// A whole-image single frame: what still formats report.
    pub(crate) fn still(width: u32, height: u32) -> Self {
        Self {
            index: 0,
            duration_flicks: 0,
            disposal: Disposal::None,
            blend: BlendMode::Replace,
            bounds: Rect {
                x: 0,
                y: 0,
                width,
                height,
            },
            background: [0; 4],
        }
    }
}

/// One entry per supported format; the dispatcher holds these in a fixed
/// candidate order.
pub(crate) trait FormatCodec: Sync {
    fn format(&self) -> ImageFormat;

    /// Parse the container header and return a frame decoder positioned
    /// before the first frame.
    fn open<'a>(&self, data: &'a [u8]) -> Result<Box<dyn FrameDecoder + 'a>, DecodeError>;

    /// Header-only probe: dimensions without touching pixel data.
    fn probe(&self, data: &[u8]) -> Result<Header, DecodeError> {
        Ok(self.open(data)?.header())
    }
}

/// An opened decode in progress over one input buffer.
pub(crate) trait FrameDecoder {
    fn header(&self) -> Header;

    /// Advance to the next frame's metadata without decoding its pixels.
    /// `Ok(None)` is clean end-of-data.
    fn next_frame_header(&mut self) -> Result<Option<FrameHeader>, DecodeError>;

    /// Scratch bytes the engine needs to decode the current frame. Valid
    /// after `next_frame_header` returned `Some`.
    fn required_scratch_len(&self) -> usize;

    /// Decode the current frame into `dst` with `blend`, using `scratch`
    /// (at least `required_scratch_len` bytes).
    fn decode_frame(
        &mut self,
        dst: &mut SurfaceMut<'_>,
        blend: BlendMode,
        scratch: &mut [u8],
    ) -> Result<(), DecodeError>;
}
