//! # flatimg
//!
//! Decode JPEG, PNG, GIF, BMP and WebP images from memory into flat 32-bit
//! premultiplied-alpha surfaces.
//!
//! ## One Pixel Format
//!
//! Every decode produces 8-bit premultiplied BGRA (or RGBA on request),
//! whatever the source file stored. Callers handle one layout, not a matrix
//! of color types: grayscale, palette, 16-bit and alpha-less sources are all
//! converted during the decode.
//!
//! ## Supported Formats
//!
//! - **PNG** — 8/16-bit, all color types (palette and 16-bit expanded)
//! - **JPEG** — baseline and progressive, RGB and grayscale
//! - **GIF** — still and animated, with disposal/blend compositing
//! - **WebP** — lossy and lossless (first frame of animated files)
//! - **BMP** — the variants the `image` crate decodes
//!
//! ## Animated GIFs
//!
//! [`DecodeRequest::decode_frames`] flattens an animated GIF into one
//! full-canvas snapshot per frame, plus per-frame delays in milliseconds.
//! Auto-decoding a multi-frame GIF as a still is refused with
//! [`Decoded::Animated`], so animations are never silently truncated; use
//! [`DecodeRequest::decode_first_frame`] to take the first frame on purpose.
//!
//! ## Non-Goals
//!
//! - Encoding
//! - Color management (embedded ICC profiles are ignored)
//! - Streaming input; the complete encoded image must be in memory
//!
//! ## Usage
//!
//! ```no_run
//! use flatimg::{DecodeRequest, Decoded, ImageInfo};
//!
//! let data: &[u8] = &[]; // your encoded image bytes
//!
//! // Probe without decoding
//! let info = ImageInfo::from_bytes(data)?;
//! println!("{}x{} {:?}", info.width, info.height, info.format);
//!
//! // Auto-detect and decode
//! match DecodeRequest::new(data).decode()? {
//!     Decoded::Still(surface) => {
//!         println!("{} bytes of premultiplied BGRA", surface.as_bytes().len());
//!     }
//!     Decoded::Animated { width, height, .. } => {
//!         let animation = DecodeRequest::new(data).decode_frames()?;
//!         println!("{width}x{height}, {} frames", animation.frame_count());
//!     }
//! }
//! # Ok::<(), flatimg::DecodeError>(())
//! ```

#![forbid(unsafe_code)]

mod animation;
mod codec;
mod codecs;
mod decode;
mod error;
mod info;
mod limits;
mod pixel;
mod surface;

// Re-exports
pub use animation::Animation;
pub use decode::{DecodeRequest, Decoded};
pub use error::DecodeError;
pub use info::{ImageFormat, ImageInfo, detect_format};
pub use limits::Limits;
pub use pixel::PixelOrder;
pub use surface::Surface;

#[cfg(feature = "rgb")]
pub use pixel::SurfacePixel;
