use crate::error::DecodeError;
use crate::pixel::{self, PixelOrder};

#[cfg(feature = "rgb")]
use rgb::AsPixels as _;

/// An owned, tightly packed 32-bit premultiplied pixel buffer.
///
/// The stride always equals `width * 4`; the byte length always equals
/// `width * height * 4`. Freeing is plain `drop`.
#[derive(Clone, Debug)]
pub struct Surface {
    data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub order: PixelOrder,
}

impl Surface {
    /// Allocate a zero-filled surface. Fails with `OutOfMemory` instead of
    /// aborting when the allocator refuses.
    pub(crate) fn new(width: u32, height: u32, order: PixelOrder) -> Result<Self, DecodeError> {
        let len = width as usize * height as usize * 4;
        let data = alloc_bytes(len)?;
        Ok(Self {
            data,
            width,
            height,
            order,
        })
    }

    /// Bytes between the start of consecutive rows. Always `width * 4`.
    pub fn stride(&self) -> usize {
        self.width as usize * 4
    }

    /// Access the pixel data.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Take ownership of the pixel bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// A copy of this surface in the requested channel order.
    ///
    /// Same order is a straight byte copy; otherwise the B and R bytes of
    /// every pixel are swapped. Alpha and premultiplication are unchanged.
    pub fn to_order(&self, order: PixelOrder) -> Result<Surface, DecodeError> {
        let mut out = Surface::new(self.width, self.height, order)?;
        if order == self.order {
            pixel::copy_rows(
                &mut out.data,
                self.stride(),
                &self.data,
                self.stride(),
                self.width,
                self.height,
            );
        } else {
            pixel::swizzle_rows(
                &mut out.data,
                self.stride(),
                &self.data,
                self.stride(),
                self.width,
                self.height,
            );
        }
        Ok(out)
    }

    /// Swap channel order in place when it differs from `order`.
    pub(crate) fn convert_in_place(&mut self, order: PixelOrder) {
        if self.order != order {
            let (width, height, stride) = (self.width, self.height, self.stride());
            pixel::swap_channels(&mut self.data, width, height, stride);
            self.order = order;
        }
    }

    /// Fallible clone, used for per-frame snapshots.
    pub(crate) fn try_clone(&self) -> Result<Surface, DecodeError> {
        let mut data = Vec::new();
        data.try_reserve_exact(self.data.len())
            .map_err(|_| DecodeError::OutOfMemory(self.data.len()))?;
        data.extend_from_slice(&self.data);
        Ok(Surface {
            data,
            width: self.width,
            height: self.height,
            order: self.order,
        })
    }

    pub(crate) fn view_mut(&mut self) -> SurfaceMut<'_> {
        let (width, height, stride) = (self.width, self.height, self.stride());
        SurfaceMut::new(&mut self.data, width, height, stride)
    }

    /// Reinterpret the pixel bytes as a typed pixel slice.
    ///
    /// Returns [`DecodeError::OrderMismatch`] if `P`'s channel order is not
    /// this surface's order.
    #[cfg(feature = "rgb")]
    pub fn as_pixels<P: crate::SurfacePixel>(&self) -> Result<&[P], DecodeError>
    where
        [u8]: rgb::AsPixels<P>,
    {
        if self.order != P::order() {
            return Err(DecodeError::OrderMismatch {
                expected: P::order(),
                actual: self.order,
            });
        }
        Ok(self.data.as_pixels())
    }

    /// Zero-copy view as an [`imgref::ImgRef`] of typed pixels.
    #[cfg(feature = "imgref")]
    pub fn as_imgref<P: crate::SurfacePixel>(&self) -> Result<imgref::ImgRef<'_, P>, DecodeError>
    where
        [u8]: rgb::AsPixels<P>,
    {
        let pixels: &[P] = self.as_pixels()?;
        Ok(imgref::ImgRef::new(
            pixels,
            self.width as usize,
            self.height as usize,
        ))
    }

    /// Convert to an [`imgref::ImgVec`] of typed pixels.
    #[cfg(feature = "imgref")]
    pub fn to_imgvec<P: crate::SurfacePixel>(&self) -> Result<imgref::ImgVec<P>, DecodeError>
    where
        [u8]: rgb::AsPixels<P>,
    {
        let pixels: &[P] = self.as_pixels()?;
        Ok(imgref::ImgVec::new(
            pixels.to_vec(),
            self.width as usize,
            self.height as usize,
        ))
    }
}

/// A mutable, stride-aware view over pixel bytes: the decode destination for
/// both driver-owned surfaces and caller-supplied buffers.
///
/// Invariants are validated (or upheld by construction) at the API boundary:
/// `stride >= width * 4` and `data.len() >= stride * (height - 1) + width * 4`.
pub(crate) struct SurfaceMut<'a> {
    data: &'a mut [u8],
    width: u32,
    height: u32,
    stride: usize,
}

impl<'a> SurfaceMut<'a> {
    pub(crate) fn new(data: &'a mut [u8], width: u32, height: u32, stride: usize) -> Self {
        debug_assert!(stride >= width as usize * 4);
        debug_assert!(
            height == 0 || data.len() >= stride * (height as usize - 1) + width as usize * 4
        );
        Self {
            data,
            width,
            height,
            stride,
        }
    }

    pub(crate) fn width(&self) -> u32 {
        self.width
    }

    pub(crate) fn height(&self) -> u32 {
        self.height
    }

    /// The `width * 4` pixel bytes of row `y`, excluding stride padding.
    pub(crate) fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let row_bytes = self.width as usize * 4;
        &mut self.data[y as usize * self.stride..][..row_bytes]
    }

    /// Set every pixel. Stride padding is left untouched.
    pub(crate) fn fill(&mut self, px: [u8; 4]) {
        for y in 0..self.height {
            for out in self.row_mut(y).chunks_exact_mut(4) {
                out.copy_from_slice(&px);
            }
        }
    }

    /// Set every pixel inside a rectangle, clipped to the surface.
    pub(crate) fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, px: [u8; 4]) {
        let w = self.width.saturating_sub(x).min(w);
        let h = self.height.saturating_sub(y).min(h);
        for row in y..y + h {
            let span = &mut self.row_mut(row)[x as usize * 4..][..w as usize * 4];
            for out in span.chunks_exact_mut(4) {
                out.copy_from_slice(&px);
            }
        }
    }
}

/// Fallible zero-filled byte buffer.
pub(crate) fn alloc_bytes(len: usize) -> Result<Vec<u8>, DecodeError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| DecodeError::OutOfMemory(len))?;
    buf.resize(len, 0);
    Ok(buf)
}

/// Grow `buf` to at least `len` bytes, zero-filling new space.
pub(crate) fn ensure_len(buf: &mut Vec<u8>, len: usize) -> Result<(), DecodeError> {
    if buf.len() < len {
        buf.try_reserve_exact(len - buf.len())
            .map_err(|_| DecodeError::OutOfMemory(len))?;
        buf.resize(len, 0);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rect_clips_to_surface() {
        let mut s = Surface::new(4, 3, PixelOrder::Bgra).unwrap();
        let mut view = s.view_mut();
        view.fill_rect(2, 1, 10, 10, [1, 2, 3, 4]);
        // (1, 0) untouched, (2, 1) and (3, 2) filled.
        assert_eq!(&s.as_bytes()[4..8], &[0, 0, 0, 0]);
        assert_eq!(&s.as_bytes()[(4 + 2) * 4..(4 + 3) * 4], &[1, 2, 3, 4]);
        assert_eq!(&s.as_bytes()[(8 + 3) * 4..(8 + 4) * 4], &[1, 2, 3, 4]);
    }

    #[test]
    fn fill_rect_out_of_bounds_is_a_no_op() {
        let mut s = Surface::new(2, 2, PixelOrder::Bgra).unwrap();
        s.view_mut().fill_rect(5, 5, 1, 1, [9, 9, 9, 9]);
        assert!(s.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn to_order_round_trip() {
        let mut s = Surface::new(2, 1, PixelOrder::Bgra).unwrap();
        s.as_bytes_mut().copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let rgba = s.to_order(PixelOrder::Rgba).unwrap();
        assert_eq!(rgba.as_bytes(), &[3, 2, 1, 4, 7, 6, 5, 8]);
        let back = rgba.to_order(PixelOrder::Bgra).unwrap();
        assert_eq!(back.as_bytes(), s.as_bytes());
    }

    #[test]
    fn to_order_same_order_is_plain_copy() {
        let mut s = Surface::new(1, 1, PixelOrder::Bgra).unwrap();
        s.as_bytes_mut().copy_from_slice(&[9, 8, 7, 6]);
        let copy = s.to_order(PixelOrder::Bgra).unwrap();
        assert_eq!(copy.as_bytes(), s.as_bytes());
    }
}
