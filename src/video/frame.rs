//! Raw video frame handed to encoders

use bytes::Bytes;
use std::time::Instant;

use super::format::Resolution;

/// A raw I420 video frame with metadata
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Raw frame data (cheap to clone)
    data: Bytes,
    /// Frame resolution
    pub resolution: Resolution,
    /// RTP timestamp (90 kHz clock)
    pub rtp_timestamp: u32,
    /// Timestamp when frame was captured
    pub capture_ts: Instant,
}

impl VideoFrame {
    /// Create a new video frame
    pub fn new(data: Bytes, resolution: Resolution, rtp_timestamp: u32) -> Self {
        Self {
            data,
            resolution,
            rtp_timestamp,
            capture_ts: Instant::now(),
        }
    }

    /// Create a frame from a Vec<u8>
    pub fn from_vec(data: Vec<u8>, resolution: Resolution, rtp_timestamp: u32) -> Self {
        Self::new(Bytes::from(data), resolution, rtp_timestamp)
    }

    /// Create a black I420 frame sized for `resolution`
    pub fn black(resolution: Resolution, rtp_timestamp: u32) -> Self {
        let luma = resolution.pixels() as usize;
        let mut data = vec![0u8; resolution.i420_size()];
        // Neutral chroma
        data[luma..].fill(128);
        Self::from_vec(data, resolution, rtp_timestamp)
    }

    /// Get frame data as bytes slice
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get frame data as Bytes (cheap clone)
    pub fn data_bytes(&self) -> Bytes {
        self.data.clone()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
