use std::io::Cursor;

use crate::codec::{BlendMode, FormatCodec, FrameDecoder, FrameHeader, Header};
use crate::error::DecodeError;
use crate::info::ImageFormat;
use crate::pixel;
use crate::surface::SurfaceMut;

pub(crate) struct JpegCodec;

impl FormatCodec for JpegCodec {
    fn format(&self) -> ImageFormat {
        ImageFormat::Jpeg
    }

    fn open<'a>(&self, data: &'a [u8]) -> Result<Box<dyn FrameDecoder + 'a>, DecodeError> {
        let mut decoder = jpeg_decoder::Decoder::new(Cursor::new(data));
        decoder
            .read_info()
            .map_err(|e| DecodeError::InvalidHeader(e.to_string()))?;
        let info = decoder
            .info()
            .ok_or_else(|| DecodeError::InvalidHeader("missing JPEG info".into()))?;
        let header = Header {
            width: u32::from(info.width),
            height: u32::from(info.height),
        };
        Ok(Box::new(JpegFrames {
            decoder,
            header,
            pixel_format: info.pixel_format,
            done: false,
        }))
    }
}

struct JpegFrames<'a> {
    decoder: jpeg_decoder::Decoder<Cursor<&'a [u8]>>,
    header: Header,
    pixel_format: jpeg_decoder::PixelFormat,
    done: bool,
}

impl FrameDecoder for JpegFrames<'_> {
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

    // The engine allocates its own output; no caller-visible scratch.
    fn required_scratch_len(&self) -> usize {
        0
    }

    fn decode_frame(
        &mut self,
        dst: &mut SurfaceMut<'_>,
        _blend: BlendMode,
        _scratch: &mut [u8],
    ) -> Result<(), DecodeError> {
        let (src_stride, convert): (usize, fn(&mut [u8], &[u8])) = match self.pixel_format {
            jpeg_decoder::PixelFormat::RGB24 => {
                (self.header.width as usize * 3, pixel::bgra_row_from_rgb)
            }
            jpeg_decoder::PixelFormat::L8 => (self.header.width as usize, pixel::bgra_row_from_gray),
            other => {
                return Err(DecodeError::UnsupportedVariant(format!(
                    "JPEG pixel format {other:?}"
                )));
            }
        };

        let pixels = self
            .decoder
            .decode()
            .map_err(|e| DecodeError::FrameDecodeFailed(e.to_string()))?;
        if pixels.len() < src_stride * self.header.height as usize {
            return Err(DecodeError::FrameDecodeFailed(
                "engine returned a short pixel buffer".into(),
            ));
        }

        for y in 0..self.header.height {
            let src_row = &pixels[y as usize * src_stride..][..src_stride];
            convert(dst.row_mut(y), src_row);
        }
        Ok(())
    }
}
