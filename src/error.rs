use crate::pixel::PixelOrder;

/// Errors from image probing and decoding.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// Caller misuse detected before any codec work: empty input, zero
    /// destination dimensions, or a stride smaller than `width * 4`.
    #[error("bad argument: {0}")]
    BadArgument(&'static str),

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The container parsed but asks for an output this crate never
    /// produces (CMYK JPEG, unexpected engine color types).
    #[error("unsupported variant: {0}")]
    UnsupportedVariant(String),

    #[error("invalid frame header: {0}")]
    InvalidFrameHeader(String),

    #[error("frame decode failed: {0}")]
    FrameDecodeFailed(String),

    /// An animation stream ended before declaring a single frame.
    #[error("image contains no frames")]
    NoFrames,

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("allocation of {0} bytes failed")]
    OutOfMemory(usize),

    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    /// Typed pixel view requested with the wrong channel order.
    #[error("pixel order mismatch: expected {expected:?}, got {actual:?}")]
    OrderMismatch {
        expected: PixelOrder,
        actual: PixelOrder,
    },

    /// Auto-detection exhausted every candidate format. Carries the most
    /// relevant per-format diagnostic, tagged with the format name.
    #[error("{0}")]
    UnrecognizedFormat(String),
}
