use crate::codec::{Disposal, FLICKS_PER_MS};
use crate::decode;
use crate::error::DecodeError;
use crate::info::ImageFormat;
use crate::limits::Limits;
use crate::pixel::PixelOrder;
use crate::surface::{self, Surface};

/// A fully composited animation: one full-canvas snapshot per frame.
///
/// Every snapshot has the canvas dimensions regardless of the frame
/// rectangles in the file; disposal and blending have already been applied.
/// Frames can be displayed independently, in any order.
#[derive(Debug)]
pub struct Animation {
    frames: Vec<Surface>,
    delays_ms: Option<Vec<u32>>,
    pub width: u32,
    pub height: u32,
}

impl Animation {
    pub fn frames(&self) -> &[Surface] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Per-frame delays in whole milliseconds, parallel to
    /// [`frames`](Self::frames). `None` when the request disabled delay
    /// reporting.
    pub fn delays_ms(&self) -> Option<&[u32]> {
        self.delays_ms.as_deref()
    }

    pub fn into_parts(self) -> (Vec<Surface>, Option<Vec<u32>>) {
        (self.frames, self.delays_ms)
    }
}

/// Convert flicks (units of 1/705,600,000 s) to whole milliseconds,
/// truncating. Non-positive durations clamp to zero, oversized ones to
/// `u32::MAX`.
pub(crate) fn flicks_to_ms(flicks: i64) -> u32 {
    if flicks <= 0 {
        return 0;
    }
    let ms = flicks / FLICKS_PER_MS;
    if ms > i64::from(u32::MAX) {
        u32::MAX
    } else {
        ms as u32
    }
}

pub(crate) fn decode_frames(
    data: &[u8],
    order: PixelOrder,
    limits: Option<&Limits>,
    want_delays: bool,
) -> Result<Animation, DecodeError> {
    if data.is_empty() {
        return Err(DecodeError::BadArgument("empty input"));
    }

    // Pass 1: walk the frame headers without decoding pixels, so the
    // snapshot vector can be sized exactly and the total cost checked
    // before any pixel work.
    let (mut counter, header) = decode::open_checked(ImageFormat::Gif, data, limits)?;
    let mut count: usize = 0;
    while counter.next_frame_header()?.is_some() {
        count += 1;
        // Checked per frame so an over-limit stream stops the walk early.
        if let Some(limits) = limits {
            limits.check_frames(count as u64)?;
        }
    }
    drop(counter);
    if count == 0 {
        return Err(DecodeError::NoFrames);
    }
    if let Some(limits) = limits {
        let canvas_bytes = u64::from(header.width) * u64::from(header.height) * 4;
        // One snapshot per frame, plus the working canvas and the
        // restore-to-previous backup.
        limits.check_memory(canvas_bytes.saturating_mul(count as u64 + 2))?;
    }

    let mut frames: Vec<Surface> = Vec::new();
    frames
        .try_reserve_exact(count)
        .map_err(|_| DecodeError::OutOfMemory(count * size_of::<Surface>()))?;
    let mut delays: Vec<u32> = Vec::new();
    if want_delays {
        delays
            .try_reserve_exact(count)
            .map_err(|_| DecodeError::OutOfMemory(count * 4))?;
    }

    // Pass 2: decode and composite. The canvas accumulates frames in
    // native order; snapshots are taken before disposal runs.
    let (mut decoder, _) = decode::open_checked(ImageFormat::Gif, data, limits)?;
    let mut canvas = Surface::new(header.width, header.height, PixelOrder::Bgra)?;
    let mut backup = Surface::new(header.width, header.height, PixelOrder::Bgra)?;
    let mut scratch: Vec<u8> = Vec::new();

    while let Some(frame) = decoder.next_frame_header()? {
        if frame.index == 0 {
            canvas.view_mut().fill(frame.background);
        }
        if frame.disposal == Disposal::RestorePrevious {
            backup.as_bytes_mut().copy_from_slice(canvas.as_bytes());
        }

        let need = decoder.required_scratch_len();
        if let Some(limits) = limits {
            limits.check_memory(need as u64)?;
        }
        surface::ensure_len(&mut scratch, need)?;

        {
            let mut view = canvas.view_mut();
            decoder.decode_frame(&mut view, frame.blend, &mut scratch)?;
        }

        frames.push(canvas.try_clone()?);
        if want_delays {
            delays.push(flicks_to_ms(frame.duration_flicks));
        }

        match frame.disposal {
            Disposal::None => {}
            Disposal::RestoreBackground => {
                let b = frame.bounds;
                canvas
                    .view_mut()
                    .fill_rect(b.x, b.y, b.width, b.height, frame.background);
            }
            Disposal::RestorePrevious => std::mem::swap(&mut canvas, &mut backup),
        }
    }

    if order != PixelOrder::Bgra {
        for frame in &mut frames {
            frame.convert_in_place(order);
        }
    }

    Ok(Animation {
        frames,
        delays_ms: want_delays.then_some(delays),
        width: header.width,
        height: header.height,
    })
}

#[cfg(test)]
mod tests {
    use super::flicks_to_ms;
    use crate::codec::FLICKS_PER_MS;

    #[test]
    fn flicks_convert_to_whole_milliseconds() {
        assert_eq!(flicks_to_ms(0), 0);
        assert_eq!(flicks_to_ms(-5), 0);
        assert_eq!(flicks_to_ms(FLICKS_PER_MS), 1);
        assert_eq!(flicks_to_ms(FLICKS_PER_MS - 1), 0);
        assert_eq!(flicks_to_ms(FLICKS_PER_MS * 100), 100);
        assert_eq!(flicks_to_ms(i64::MAX), u32::MAX);
    }
}
