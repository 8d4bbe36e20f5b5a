//! Encoder traits and common types
//!
//! [`VideoEncoder`] is the capability interface every backend-produced encoder
//! implements. [`EncoderBackend`] is what a backend exposes to the factory.

use bytes::Bytes;
use std::fmt;
use std::sync::Arc;

use super::codec::{CodecInfo, SdpVideoFormat, VideoCodecType};
use crate::error::Result;
use crate::video::format::Resolution;
use crate::video::frame::VideoFrame;

/// Numeric encoder status. Non-negative values are success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusCode(pub i32);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(0);
    pub const NO_OUTPUT: StatusCode = StatusCode(1);
    pub const ERROR: StatusCode = StatusCode(-1);
    pub const MEMORY: StatusCode = StatusCode(-3);
    pub const ERR_PARAMETER: StatusCode = StatusCode(-4);
    pub const UNINITIALIZED: StatusCode = StatusCode(-7);
    pub const FALLBACK_SOFTWARE: StatusCode = StatusCode(-13);
    pub const ENCODER_FAILURE: StatusCode = StatusCode(-16);

    /// True for any non-negative code
    pub fn is_ok(&self) -> bool {
        self.0 >= 0
    }

    pub fn is_err(&self) -> bool {
        !self.is_ok()
    }

    pub fn code(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            StatusCode::OK => "OK",
            StatusCode::NO_OUTPUT => "NO_OUTPUT",
            StatusCode::ERROR => "ERROR",
            StatusCode::MEMORY => "MEMORY",
            StatusCode::ERR_PARAMETER => "ERR_PARAMETER",
            StatusCode::UNINITIALIZED => "UNINITIALIZED",
            StatusCode::FALLBACK_SOFTWARE => "FALLBACK_SOFTWARE",
            StatusCode::ENCODER_FAILURE => "ENCODER_FAILURE",
            _ => return write!(f, "{}", self.0),
        };
        write!(f, "{} ({})", name, self.0)
    }
}

/// Codec settings passed to `init_encode`
#[derive(Debug, Clone, PartialEq)]
pub struct VideoCodecSettings {
    /// Codec family being configured
    pub codec_type: VideoCodecType,
    /// Target resolution
    pub resolution: Resolution,
    /// Initial bitrate in kbps
    pub start_bitrate_kbps: u32,
    /// Upper bitrate bound in kbps
    pub max_bitrate_kbps: u32,
    /// Maximum frame rate
    pub max_framerate: u32,
}

impl Default for VideoCodecSettings {
    fn default() -> Self {
        Self {
            codec_type: VideoCodecType::Vp8,
            resolution: Resolution::HD720,
            start_bitrate_kbps: 1000,
            max_bitrate_kbps: 4000,
            max_framerate: 30,
        }
    }
}

impl VideoCodecSettings {
    pub fn new(codec_type: VideoCodecType, resolution: Resolution) -> Self {
        Self {
            codec_type,
            resolution,
            ..Default::default()
        }
    }
}

/// Resource limits passed to `init_encode`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderSettings {
    pub number_of_cores: u32,
    pub max_payload_size: usize,
    /// Whether the remote side sends loss notifications
    pub loss_notification: bool,
}

impl EncoderSettings {
    pub fn new(number_of_cores: u32, max_payload_size: usize) -> Self {
        Self {
            number_of_cores,
            max_payload_size,
            loss_notification: false,
        }
    }
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self::new(1, 1200)
    }
}

/// Frame type hint / result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFrameType {
    Empty,
    Key,
    Delta,
}

/// Rate allocation pushed by the bandwidth estimator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateControlParameters {
    pub target_bitrate_bps: u32,
    pub framerate_fps: f64,
}

/// Loss notification from the remote decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LossNotification {
    pub timestamp_of_last_decodable: u32,
    pub timestamp_of_last_received: u32,
    pub dependencies_of_last_received_decodable: Option<bool>,
    pub last_received_decodable: Option<bool>,
}

/// Static description of an encoder implementation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncoderInfo {
    /// Implementation name reported by the encoder (may be empty)
    pub implementation_name: String,
    pub is_hardware_accelerated: bool,
    pub has_internal_source: bool,
}

/// Encoded output
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// Encoded data
    pub data: Bytes,
    pub frame_type: VideoFrameType,
    pub rtp_timestamp: u32,
    pub resolution: Resolution,
}

impl EncodedImage {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Receiver of encoded images
pub trait EncodedImageCallback: Send {
    fn on_encoded_image(&mut self, image: EncodedImage);
}

/// Hook the encoder may use to override FEC decisions
pub trait FecControllerOverride: Send + Sync {
    fn set_fec_allowed(&self, allowed: bool);
}

/// Video encoder capability interface
///
/// Encoders are driven by one media thread at a time, hence `&mut self`.
pub trait VideoEncoder: Send {
    /// Optional FEC override hook
    fn set_fec_controller_override(
        &mut self,
        _fec_controller_override: Option<Arc<dyn FecControllerOverride>>,
    ) {
    }

    /// Initialize (or reinitialize) the encoder
    fn init_encode(
        &mut self,
        codec_settings: &VideoCodecSettings,
        settings: &EncoderSettings,
    ) -> StatusCode;

    /// Legacy initialization overload
    fn init_encode_legacy(
        &mut self,
        codec_settings: &VideoCodecSettings,
        number_of_cores: u32,
        max_payload_size: usize,
    ) -> StatusCode {
        self.init_encode(
            codec_settings,
            &EncoderSettings::new(number_of_cores, max_payload_size),
        )
    }

    fn register_encode_complete_callback(
        &mut self,
        callback: Box<dyn EncodedImageCallback>,
    ) -> StatusCode;

    /// Free encoder resources; the encoder may be initialized again afterwards
    fn release(&mut self) -> StatusCode;

    /// Encode one frame, delivering output through the registered callback
    fn encode(&mut self, frame: &VideoFrame, frame_types: Option<&[VideoFrameType]>)
        -> StatusCode;

    fn set_rates(&mut self, parameters: &RateControlParameters);

    fn on_packet_loss_rate_update(&mut self, _packet_loss_rate: f32) {}

    fn on_rtt_update(&mut self, _rtt_ms: i64) {}

    fn on_loss_notification(&mut self, _loss_notification: &LossNotification) {}

    fn encoder_info(&self) -> EncoderInfo;
}

/// An encoder-producing backend (software or native)
///
/// Backends are immutable after construction, so a shared reference may be
/// used from several threads at once.
pub trait EncoderBackend: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Formats this backend can encode
    fn supported_formats(&self) -> Vec<SdpVideoFormat>;

    /// Describe the encoder that would be created for `format`
    fn query_video_encoder(&self, format: &SdpVideoFormat) -> CodecInfo;

    /// Create a new encoder for `format`
    fn create_video_encoder(&self, format: &SdpVideoFormat) -> Result<Box<dyn VideoEncoder>>;
}
