use crate::codec::{BlendMode, FormatCodec, FrameDecoder, FrameHeader, Header};
use crate::error::DecodeError;
use crate::info::ImageFormat;
use crate::pixel;
use crate::surface::SurfaceMut;

pub(crate) struct PngCodec;

impl FormatCodec for PngCodec {
    fn format(&self) -> ImageFormat {
        ImageFormat::Png
    }

    fn open<'a>(&self, data: &'a [u8]) -> Result<Box<dyn FrameDecoder + 'a>, DecodeError> {
        let mut decoder = png::Decoder::new(data);
        // Expand palette/gray to RGB, add alpha from tRNS, strip 16-bit.
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
        let reader = decoder
            .read_info()
            .map_err(|e| DecodeError::InvalidHeader(e.to_string()))?;
        let info = reader.info();
        let header = Header {
            width: info.width,
            height: info.height,
        };
        Ok(Box::new(PngFrames {
            reader,
            header,
            done: false,
        }))
    }
}

struct PngFrames<'a> {
    reader: png::Reader<&'a [u8]>,
    header: Header,
    done: bool,
}

impl FrameDecoder for PngFrames<'_> {
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
        self.reader.output_buffer_size()
    }

    fn decode_frame(
        &mut self,
        dst: &mut SurfaceMut<'_>,
        _blend: BlendMode,
        scratch: &mut [u8],
    ) -> Result<(), DecodeError> {
        let info = self
            .reader
            .next_frame(scratch)
            .map_err(|e| DecodeError::FrameDecodeFailed(e.to_string()))?;
        let data = &scratch[..info.buffer_size()];
        let width = self.header.width as usize;

        let (src_stride, convert): (usize, fn(&mut [u8], &[u8])) = match info.color_type {
            png::ColorType::Rgba => (width * 4, pixel::bgra_row_from_rgba),
            png::ColorType::Rgb => (width * 3, pixel::bgra_row_from_rgb),
            png::ColorType::Grayscale => (width, pixel::bgra_row_from_gray),
            png::ColorType::GrayscaleAlpha => (width * 2, pixel::bgra_row_from_gray_alpha),
            // After EXPAND, Indexed should not appear, but keep a guard.
            png::ColorType::Indexed => {
                return Err(DecodeError::UnsupportedVariant(
                    "indexed PNG remained after expansion".into(),
                ));
            }
        };
        if data.len() < src_stride * self.header.height as usize {
            return Err(DecodeError::FrameDecodeFailed(
                "engine returned a short pixel buffer".into(),
            ));
        }

        for y in 0..self.header.height {
            let src_row = &data[y as usize * src_stride..][..src_stride];
            convert(dst.row_mut(y), src_row);
        }
        Ok(())
    }
}
