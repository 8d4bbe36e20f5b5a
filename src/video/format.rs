//! Frame geometry definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Frame resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Check if resolution is within what any encoder backend accepts
    pub fn is_valid(&self) -> bool {
        self.width >= 16 && self.width <= 15360 && self.height >= 16 && self.height <= 8640
    }

    /// Get total pixels
    pub fn pixels(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Size in bytes of an I420 frame at this resolution
    pub fn i420_size(&self) -> usize {
        let luma = self.pixels() as usize;
        let chroma_w = self.width.div_ceil(2) as usize;
        let chroma_h = self.height.div_ceil(2) as usize;
        luma + 2 * chroma_w * chroma_h
    }

    /// Common resolutions
    pub const VGA: Resolution = Resolution {
        width: 640,
        height: 480,
    };
    pub const HD720: Resolution = Resolution {
        width: 1280,
        height: 720,
    };
    pub const HD1080: Resolution = Resolution {
        width: 1920,
        height: 1080,
    };
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution::HD720
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl From<(u32, u32)> for Resolution {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}
