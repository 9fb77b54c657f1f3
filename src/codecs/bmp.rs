use std::io::Cursor;

use image::ImageDecoder as _;

use crate::codec::{BlendMode, FormatCodec, FrameDecoder, FrameHeader, Header};
use crate::codecs::webp::convert_image_output;
use crate::error::DecodeError;
use crate::info::ImageFormat;
use crate::surface::SurfaceMut;

pub(crate) struct BmpCodec;

impl FormatCodec for BmpCodec {
    fn format(&self) -> ImageFormat {
        ImageFormat::Bmp
    }

    fn open<'a>(&self, data: &'a [u8]) -> Result<Box<dyn FrameDecoder + 'a>, DecodeError> {
        let decoder = image::codecs::bmp::BmpDecoder::new(Cursor::new(data))
            .map_err(|e| DecodeError::InvalidHeader(e.to_string()))?;
        let (width, height) = decoder.dimensions();
        let color = decoder.color_type();
        let scratch_len = usize::try_from(decoder.total_bytes())
            .map_err(|_| DecodeError::InvalidHeader("image too large for this platform".into()))?;
        Ok(Box::new(BmpFrames {
            decoder: Some(decoder),
            header: Header { width, height },
            color,
            scratch_len,
            done: false,
        }))
    }
}

struct BmpFrames<'a> {
    decoder: Option<image::codecs::bmp::BmpDecoder<Cursor<&'a [u8]>>>,
    header: Header,
    color: image::ColorType,
    scratch_len: usize,
    done: bool,
}

impl FrameDecoder for BmpFrames<'_> {
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
