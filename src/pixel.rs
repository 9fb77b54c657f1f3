//! Pixel arithmetic: premultiplication, source-over compositing, and the
//! BGRA↔RGBA channel swizzle. Everything here works on premultiplied 8-bit
//! channels packed 4 bytes per pixel.

/// Channel order of a 32-bit premultiplied surface.
///
/// These are the only two orders ever produced; color channels are always
/// premultiplied by alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelOrder {
    /// Bytes B, G, R, A. The native decode order.
    Bgra,
    /// Bytes R, G, B, A.
    Rgba,
}

/// Scale one color channel by alpha, rounding to nearest.
#[inline]
pub(crate) fn premultiply(color: u8, alpha: u8) -> u8 {
    ((u32::from(color) * u32::from(alpha) + 127) / 255) as u8
}

/// Straight-alpha RGBA pixel to premultiplied BGRA.
#[inline]
pub(crate) fn bgra_premul_from_rgba(px: [u8; 4]) -> [u8; 4] {
    let a = px[3];
    [
        premultiply(px[2], a),
        premultiply(px[1], a),
        premultiply(px[0], a),
        a,
    ]
}

/// Source-over compositing of one premultiplied pixel onto another.
///
/// `out = src + dst * (255 - src_alpha) / 255`, applied to every channel
/// including alpha. Exact for the 0/255 alphas GIF produces and correct for
/// intermediate values up to rounding.
#[inline]
pub(crate) fn source_over(dst: &mut [u8], src: [u8; 4]) {
    let inverse = 255 - u32::from(src[3]);
    for i in 0..4 {
        let blended = u32::from(src[i]) + (u32::from(dst[i]) * inverse + 127) / 255;
        dst[i] = blended.min(255) as u8;
    }
}

/// Swap the B and R bytes of every pixel in a packed row.
#[inline]
pub(crate) fn swap_channels_row(row: &mut [u8]) {
    for px in row.chunks_exact_mut(4) {
        px.swap(0, 2);
    }
}

/// In-place BGRA↔RGBA conversion of a stride-bound buffer. Padding bytes
/// between rows are left untouched.
pub(crate) fn swap_channels(data: &mut [u8], width: u32, height: u32, stride: usize) {
    let row_bytes = width as usize * 4;
    for y in 0..height as usize {
        swap_channels_row(&mut data[y * stride..][..row_bytes]);
    }
}

/// Row-by-row copy between buffers with independent strides, swapping B and R.
pub(crate) fn swizzle_rows(
    dst: &mut [u8],
    dst_stride: usize,
    src: &[u8],
    src_stride: usize,
    width: u32,
    height: u32,
) {
    let row_bytes = width as usize * 4;
    for y in 0..height as usize {
        let src_row = &src[y * src_stride..][..row_bytes];
        let dst_row = &mut dst[y * dst_stride..][..row_bytes];
        for (d, s) in dst_row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
            d[0] = s[2];
            d[1] = s[1];
            d[2] = s[0];
            d[3] = s[3];
        }
    }
}

/// Row-by-row copy between buffers with independent strides, order unchanged.
pub(crate) fn copy_rows(
    dst: &mut [u8],
    dst_stride: usize,
    src: &[u8],
    src_stride: usize,
    width: u32,
    height: u32,
) {
    let row_bytes = width as usize * 4;
    for y in 0..height as usize {
        dst[y * dst_stride..][..row_bytes].copy_from_slice(&src[y * src_stride..][..row_bytes]);
    }
}

// Row converters from engine output to premultiplied BGRA. Each takes one
// packed source row and the matching `width * 4` destination row.

pub(crate) fn bgra_row_from_rgba(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        d.copy_from_slice(&bgra_premul_from_rgba([s[0], s[1], s[2], s[3]]));
    }
}

pub(crate) fn bgra_row_from_rgb(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(3)) {
        d[0] = s[2];
        d[1] = s[1];
        d[2] = s[0];
        d[3] = 255;
    }
}

pub(crate) fn bgra_row_from_gray(dst: &mut [u8], src: &[u8]) {
    for (d, &g) in dst.chunks_exact_mut(4).zip(src.iter()) {
        d[0] = g;
        d[1] = g;
        d[2] = g;
        d[3] = 255;
    }
}

pub(crate) fn bgra_row_from_gray_alpha(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(2)) {
        let g = premultiply(s[0], s[1]);
        d[0] = g;
        d[1] = g;
        d[2] = g;
        d[3] = s[1];
    }
}

/// Pixel types that can view a [`crate::Surface`]'s bytes.
#[cfg(feature = "rgb")]
pub trait SurfacePixel: Copy {
    /// The channel order this pixel type expects.
    fn order() -> PixelOrder;
}

#[cfg(feature = "rgb")]
impl SurfacePixel for rgb::RGBA8 {
    fn order() -> PixelOrder {
        PixelOrder::Rgba
    }
}

#[cfg(feature = "rgb")]
impl SurfacePixel for rgb::alt::BGRA8 {
    fn order() -> PixelOrder {
        PixelOrder::Bgra
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premultiply_edges() {
        assert_eq!(premultiply(200, 255), 200);
        assert_eq!(premultiply(200, 0), 0);
        assert_eq!(premultiply(255, 128), 128);
        assert_eq!(premultiply(0, 77), 0);
    }

    #[test]
    fn source_over_opaque_src_replaces() {
        let mut dst = [10, 20, 30, 255];
        source_over(&mut dst, [1, 2, 3, 255]);
        assert_eq!(dst, [1, 2, 3, 255]);
    }

    #[test]
    fn source_over_transparent_src_keeps_dst() {
        let mut dst = [10, 20, 30, 255];
        source_over(&mut dst, [0, 0, 0, 0]);
        assert_eq!(dst, [10, 20, 30, 255]);
    }

    #[test]
    fn source_over_half_alpha() {
        // src premultiplied half-white over opaque black:
        // out = 128 + 0 * 127/255 = 128, alpha = 128 + 255*127/255 = 255
        let mut dst = [0, 0, 0, 255];
        source_over(&mut dst, [128, 128, 128, 128]);
        assert_eq!(dst, [128, 128, 128, 255]);
    }

    #[test]
    fn swizzle_round_trip_with_strides() {
        // 2x2 BGRA with an 11-byte source stride (3 bytes padding).
        let src = [
            1, 2, 3, 4, 5, 6, 7, 8, 0xEE, 0xEE, 0xEE, //
            9, 10, 11, 12, 13, 14, 15, 16, 0xEE, 0xEE, 0xEE,
        ];
        let mut rgba = [0u8; 16];
        swizzle_rows(&mut rgba, 8, &src, 11, 2, 2);
        assert_eq!(rgba[..4], [3, 2, 1, 4]);

        let mut back = [0u8; 16];
        swizzle_rows(&mut back, 8, &rgba, 8, 2, 2);
        assert_eq!(back[..8], src[..8]);
        assert_eq!(back[8..16], src[11..19]);
    }

    #[test]
    fn gray_alpha_row_premultiplies() {
        let mut dst = [0u8; 4];
        bgra_row_from_gray_alpha(&mut dst, &[255, 128]);
        assert_eq!(dst, [128, 128, 128, 128]);
    }
}
