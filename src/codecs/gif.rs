//! GIF adapter. Unlike the still formats this one yields many frame headers,
//! each carrying the disposal, blend, bounds, and duration metadata the
//! animation compositor consumes. Pixels come out of the engine as
//! straight-alpha RGBA for the frame rectangle only; the blit into the
//! destination converts to premultiplied BGRA and applies the blend mode.

use std::io::Cursor;

use crate::codec::{BlendMode, Disposal, FLICKS_PER_MS, FormatCodec, FrameDecoder, FrameHeader, Header, Rect};
use crate::error::DecodeError;
use crate::info::ImageFormat;
use crate::pixel;
use crate::surface::SurfaceMut;

/// GIF delays are counted in 10 ms ticks.
const FLICKS_PER_DELAY_TICK: i64 = FLICKS_PER_MS * 10;

/// The canvas background. The GIF header's background-color index is
/// ignored, matching what every mainstream compositor renders.
const BACKGROUND: [u8; 4] = [0; 4];

pub(crate) struct GifCodec;

impl FormatCodec for GifCodec {
    fn format(&self) -> ImageFormat {
        ImageFormat::Gif
    }

    fn open<'a>(&self, data: &'a [u8]) -> Result<Box<dyn FrameDecoder + 'a>, DecodeError> {
        let mut options = gif::DecodeOptions::new();
        options.set_color_output(gif::ColorOutput::RGBA);
        // Rejects frame rectangles outside the canvas, which also bounds
        // the per-frame scratch requirement.
        options.check_frame_consistency(true);
        let decoder = options
            .read_info(Cursor::new(data))
            .map_err(|e| DecodeError::InvalidHeader(e.to_string()))?;
        let header = Header {
            width: u32::from(decoder.width()),
            height: u32::from(decoder.height()),
        };
        Ok(Box::new(GifFrames {
            decoder,
            header,
            pending: None,
            index: 0,
        }))
    }
}

struct GifFrames<'a> {
    decoder: gif::Decoder<Cursor<&'a [u8]>>,
    header: Header,
    /// Metadata of the frame announced by `next_frame_header` whose pixels
    /// have not been decoded yet.
    pending: Option<PendingFrame>,
    index: u32,
}

struct PendingFrame {
    bounds: Rect,
    scratch_len: usize,
}

impl FrameDecoder for GifFrames<'_> {
    fn header(&self) -> Header {
        self.header
    }

    fn next_frame_header(&mut self) -> Result<Option<FrameHeader>, DecodeError> {
        let (bounds, disposal, blend, delay) = match self.decoder.next_frame_info() {
            Ok(Some(frame)) => (
                Rect {
                    x: u32::from(frame.left),
                    y: u32::from(frame.top),
                    width: u32::from(frame.width),
                    height: u32::from(frame.height),
                },
                match frame.dispose {
                    gif::DisposalMethod::Background => Disposal::RestoreBackground,
                    gif::DisposalMethod::Previous => Disposal::RestorePrevious,
                    gif::DisposalMethod::Any | gif::DisposalMethod::Keep => Disposal::None,
                },
                // A frame without a transparent index overwrites its whole
                // rectangle; with one it composites over the canvas.
                if frame.transparent.is_some() {
                    BlendMode::SourceOver
                } else {
                    BlendMode::Replace
                },
                frame.delay,
            ),
            Ok(None) => {
                self.pending = None;
                return Ok(None);
            }
            Err(e) => return Err(DecodeError::InvalidFrameHeader(e.to_string())),
        };

        let frame_header = FrameHeader {
            index: self.index,
            duration_flicks: i64::from(delay) * FLICKS_PER_DELAY_TICK,
            disposal,
            blend,
            bounds,
            background: BACKGROUND,
        };
        self.pending = Some(PendingFrame {
            bounds,
            scratch_len: self.decoder.buffer_size(),
        });
        self.index += 1;
        Ok(Some(frame_header))
    }

    fn required_scratch_len(&self) -> usize {
        self.pending.as_ref().map_or(0, |p| p.scratch_len)
    }

    fn decode_frame(
        &mut self,
        dst: &mut SurfaceMut<'_>,
        blend: BlendMode,
        scratch: &mut [u8],
    ) -> Result<(), DecodeError> {
        let Some(pending) = self.pending.take() else {
            return Err(DecodeError::InvalidFrameHeader(
                "no frame header read before decode".into(),
            ));
        };
        if scratch.len() < pending.scratch_len {
            return Err(DecodeError::BufferTooSmall {
                needed: pending.scratch_len,
                actual: scratch.len(),
            });
        }
        self.decoder
            .read_into_buffer(&mut scratch[..pending.scratch_len])
            .map_err(|e| DecodeError::FrameDecodeFailed(e.to_string()))?;

        // Blit the frame rectangle, clipped to the destination.
        let bounds = pending.bounds;
        let copy_w = dst.width().saturating_sub(bounds.x).min(bounds.width);
        let copy_h = dst.height().saturating_sub(bounds.y).min(bounds.height);
        let src_stride = bounds.width as usize * 4;
        for fy in 0..copy_h {
            let src_row = &scratch[fy as usize * src_stride..][..copy_w as usize * 4];
            let dst_row = dst.row_mut(bounds.y + fy);
            let dst_span = &mut dst_row[bounds.x as usize * 4..][..copy_w as usize * 4];
            match blend {
                BlendMode::Replace => {
                    for (d, s) in dst_span.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
                        d.copy_from_slice(&pixel::bgra_premul_from_rgba([s[0], s[1], s[2], s[3]]));
                    }
                }
                BlendMode::SourceOver => {
                    for (d, s) in dst_span.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
                        pixel::source_over(d, pixel::bgra_premul_from_rgba([s[0], s[1], s[2], s[3]]));
                    }
                }
            }
        }
        Ok(())
    }
}
