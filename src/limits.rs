/// Resource limits for decode operations.
///
/// All fields default to `None` (no limit). Attach via
/// [`crate::DecodeRequest::with_limits`].
#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub max_width: Option<u64>,
    pub max_height: Option<u64>,
    /// Maximum pixel count (width * height).
    pub max_pixels: Option<u64>,
    /// Maximum bytes allocated for output, canvas, and scratch buffers.
    pub max_memory_bytes: Option<u64>,
    /// Maximum animation frame count.
    pub max_frames: Option<u64>,
}

impl Limits {
    /// Check dimensions against limits. Returns Ok(()) or LimitExceeded error.
    pub(crate) fn check(&self, width: u32, height: u32) -> Result<(), crate::DecodeError> {
        if let Some(max_w) = self.max_width {
            if u64::from(width) > max_w {
                return Err(crate::DecodeError::LimitExceeded(format!(
                    "width {width} exceeds limit {max_w}"
                )));
            }
        }
        if let Some(max_h) = self.max_height {
            if u64::from(height) > max_h {
                return Err(crate::DecodeError::LimitExceeded(format!(
                    "height {height} exceeds limit {max_h}"
                )));
            }
        }
        if let Some(max_px) = self.max_pixels {
            let pixels = u64::from(width) * u64::from(height);
            if pixels > max_px {
                return Err(crate::DecodeError::LimitExceeded(format!(
                    "pixel count {pixels} exceeds limit {max_px}"
                )));
            }
        }
        Ok(())
    }

    /// Check that an allocation size is within memory limits.
    pub(crate) fn check_memory(&self, bytes: u64) -> Result<(), crate::DecodeError> {
        if let Some(max_mem) = self.max_memory_bytes {
            if bytes > max_mem {
                return Err(crate::DecodeError::LimitExceeded(format!(
                    "allocation {bytes} bytes exceeds memory limit {max_mem}"
                )));
            }
        }
        Ok(())
    }

    /// Check an animation frame count.
    pub(crate) fn check_frames(&self, frames: u64) -> Result<(), crate::DecodeError> {
        if let Some(max_frames) = self.max_frames {
            if frames > max_frames {
                return Err(crate::DecodeError::LimitExceeded(format!(
                    "frame count {frames} exceeds limit {max_frames}"
                )));
            }
        }
        Ok(())
    }
}
