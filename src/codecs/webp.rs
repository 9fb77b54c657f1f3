use std::io::Cursor;

use image::ImageDecoder as _;

use crate::codec::{BlendMode, FormatCodec, FrameDecoder, FrameHeader, Header};
use crate::error::DecodeError;
use crate::info::ImageFormat;
use crate::pixel;
use crate::surface::SurfaceMut;

pub(crate) struct WebpCodec;

impl FormatCodec for WebpCodec {
    fn format(&self) -> ImageFormat {
        ImageFormat::Webp
    }

    fn open<'a>(&self, data: &'a [u8]) -> Result<Box<dyn FrameDecoder + 'a>, DecodeError> {
        let decoder = image::codecs::webp::WebPDecoder::new(Cursor::new(data))
            .map_err(|e| DecodeError::InvalidHeader(e.to_string()))?;
        let (width, height) = decoder.dimensions();
        let color = decoder.color_type();
        let scratch_len = usize::try_from(decoder.total_bytes())
            .map_err(|_| DecodeError::InvalidHeader("image too large for this platform".into()))?;
        Ok(Box::new(WebpFrames {
            decoder: Some(decoder),
            header: Header { width, height },
            color,
            scratch_len,
            done: false,
        }))
    }
}

struct WebpFrames<'a> {
    // Consumed by `read_image`; `None` once the single frame is decoded.
    decoder: Option<image::codecs::webp::WebPDecoder<Cursor<&'a [u8]>>>,
    header: Header,
    color: image::ColorType,
    scratch_len: usize,
    done: bool,
}

impl FrameDecoder for WebpFrames<'_> {
    fn header(&self) -> Header {
        self.header
    }

    fn next_frame_header(&mut self) -> Result<Option<FrameHeader>, DecodeError> {
        if self.done {
            return Ok(None);
        }
        self.done = true;
        Ok(Some(FrameHeader::still(self.header.width, self.header.height)))
    }

    fn required_scratch_len(&self) -> usize {
        self.scratch_len
    }

    fn decode_frame(
        &mut self,
        dst: &mut SurfaceMut<'_>,
        _blend: BlendMode,
        scratch: &mut [u8],
    ) -> Result<(), DecodeError> {
        let decoder = self
            .decoder
            .take()
            .ok_or_else(|| DecodeError::FrameDecodeFailed("frame already decoded".into()))?;
        if scratch.len() < self.scratch_len {
            return Err(DecodeError::BufferTooSmall {
                needed: self.scratch_len,
                actual: scratch.len(),
            });
        }
        decoder
            .read_image(&mut scratch[..self.scratch_len])
            .map_err(|e| DecodeError::FrameDecodeFailed(e.to_string()))?;
        convert_image_output(dst, &scratch[..self.scratch_len], self.header, self.color)
    }
}

/// Shared by the `image`-crate adapters: convert a packed decode result in
/// the engine's color type into premultiplied BGRA rows.
pub(crate) fn convert_image_output(
    dst: &mut SurfaceMut<'_>,
    data: &[u8],
    header: Header,
    color: image::ColorType,
) -> Result<(), DecodeError> {
    let width = header.width as usize;
    let (src_stride, convert): (usize, fn(&mut [u8], &[u8])) = match color {
        image::ColorType::Rgba8 => (width * 4, pixel::bgra_row_from_rgba),
        image::ColorType::Rgb8 => (width * 3, pixel::bgra_row_from_rgb),
        image::ColorType::L8 => (width, pixel::bgra_row_from_gray),
        image::ColorType::La8 => (width * 2, pixel::bgra_row_from_gray_alpha),
        other => {
            return Err(DecodeError::UnsupportedVariant(format!(
                "engine color type {other:?}"
            )));
        }
    };
    if data.len() < src_stride * header.height as usize {
        return Err(DecodeError::FrameDecodeFailed(
            "engine returned a short pixel buffer".into(),
        ));
    }
    for y in 0..header.height {
        let src_row = &data[y as usize * src_stride..][..src_stride];
        convert(dst.row_mut(y), src_row);
    }
    Ok(())
}
