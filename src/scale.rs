use serde::{Deserialize, Serialize};

use crate::error::{AnnotateError, Result};

/// How an oversized image is reduced to fit the display box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ScalePolicy {
    /// Smallest integer divisor that fits.
    #[default]
    IntegerCeil,
    /// Smallest power-of-two divisor that fits.
    PowerOfTwo,
}

/// Display scale, always `1 / divisor` so the inverse mapping stays exact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scale {
    divisor: u32,
}

impl Scale {
    pub const ONE: Scale = Scale { divisor: 1 };

    pub fn from_divisor(divisor: u32) -> Result<Self> {
        if divisor == 0 {
            return Err(AnnotateError::InvalidInput("scale divisor must be positive".into()));
        }
        Ok(Self { divisor })
    }

    pub fn divisor(&self) -> u32 {
        self.divisor
    }

    pub fn factor(&self) -> f64 {
        1.0 / self.divisor as f64
    }

    /// Original-space length to display-space length (truncating).
    pub fn apply(&self, len: u32) -> u32 {
        len / self.divisor
    }

    /// Display-space length to original-space length.
    pub fn invert(&self, len: u32) -> u32 {
        len * self.divisor
    }
}

impl Default for Scale {
    fn default() -> Self {
        Scale::ONE
    }
}

/// Picks the display scale for an image of `width`x`height` shown inside a
/// `max_width`x`max_height` box, preserving aspect ratio.
pub fn compute(
    width: u32,
    height: u32,
    max_width: u32,
    max_height: u32,
    policy: ScalePolicy,
) -> Result<Scale> {
    if width == 0 || height == 0 || max_width == 0 || max_height == 0 {
        return Err(AnnotateError::InvalidInput(format!(
            "cannot scale {width}x{height} into {max_width}x{max_height}"
        )));
    }
    if width <= max_width && height <= max_height {
        return Ok(Scale::ONE);
    }

    let ratio = width.div_ceil(max_width).max(height.div_ceil(max_height));
    let divisor = match policy {
        ScalePolicy::IntegerCeil => ratio,
        ScalePolicy::PowerOfTwo => ratio.next_power_of_two(),
    };
    Scale::from_divisor(divisor)
}
