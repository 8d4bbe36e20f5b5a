//! Always-available software backend
//!
//! Wraps the internal software encoder set. The encoders here validate their
//! configuration, track keyframe cadence and hand frame payloads to the
//! registered callback; bitstream compression is out of scope for this crate.

use tracing::{debug, trace, warn};

use super::codec::{CodecInfo, SdpVideoFormat, VideoCodecType};
use super::traits::{
    EncodedImage, EncodedImageCallback, EncoderBackend, EncoderInfo, EncoderSettings,
    RateControlParameters, StatusCode, VideoCodecSettings, VideoEncoder, VideoFrameType,
};
use crate::error::{FactoryError, Result};
use crate::video::frame::VideoFrame;

const BACKEND_NAME: &str = "software";

/// Formats advertised by the internal encoder set
pub fn internal_formats() -> Vec<SdpVideoFormat> {
    vec![
        SdpVideoFormat::new("VP8"),
        SdpVideoFormat::new("VP9").param("profile-id", "0"),
        SdpVideoFormat::new("VP9").param("profile-id", "2"),
        SdpVideoFormat::new("H264")
            .param("level-asymmetry-allowed", "1")
            .param("packetization-mode", "1")
            .param("profile-level-id", "42e01f"),
        SdpVideoFormat::new("H264")
            .param("level-asymmetry-allowed", "1")
            .param("packetization-mode", "0")
            .param("profile-level-id", "42e01f"),
        SdpVideoFormat::new("AV1X"),
    ]
}

/// Software backend over the internal encoder set
#[derive(Debug, Clone)]
pub struct SoftwareBackend {
    formats: Vec<SdpVideoFormat>,
}

impl SoftwareBackend {
    pub fn new() -> Self {
        Self {
            formats: internal_formats(),
        }
    }

    /// Restrict or replace the advertised format list
    pub fn with_formats(formats: Vec<SdpVideoFormat>) -> Self {
        Self { formats }
    }
}

impl Default for SoftwareBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl EncoderBackend for SoftwareBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn supported_formats(&self) -> Vec<SdpVideoFormat> {
        self.formats.clone()
    }

    fn query_video_encoder(&self, _format: &SdpVideoFormat) -> CodecInfo {
        CodecInfo {
            has_internal_source: false,
            is_hardware_accelerated: false,
        }
    }

    fn create_video_encoder(&self, format: &SdpVideoFormat) -> Result<Box<dyn VideoEncoder>> {
        if !self.formats.iter().any(|f| f.is_same_family(format)) {
            return Err(FactoryError::creation(
                BACKEND_NAME,
                format!("no internal encoder for {}", format.name),
            ));
        }

        debug!("Creating software encoder for {}", format);
        Ok(Box::new(SoftwareEncoder::new(format.codec_type())))
    }
}

/// Software encoder from the internal set
pub struct SoftwareEncoder {
    codec_type: VideoCodecType,
    settings: Option<VideoCodecSettings>,
    callback: Option<Box<dyn EncodedImageCallback>>,
    rates: Option<RateControlParameters>,
    frames_since_keyframe: u32,
    keyframe_interval: u32,
    force_keyframe: bool,
}

impl SoftwareEncoder {
    pub fn new(codec_type: VideoCodecType) -> Self {
        Self {
            codec_type,
            settings: None,
            callback: None,
            rates: None,
            frames_since_keyframe: 0,
            keyframe_interval: 0,
            force_keyframe: true,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.settings.is_some()
    }
}

impl VideoEncoder for SoftwareEncoder {
    fn init_encode(
        &mut self,
        codec_settings: &VideoCodecSettings,
        settings: &EncoderSettings,
    ) -> StatusCode {
        if codec_settings.codec_type != self.codec_type {
            warn!(
                "Software {} encoder configured with {} settings",
                self.codec_type, codec_settings.codec_type
            );
            return StatusCode::ERR_PARAMETER;
        }
        if !codec_settings.resolution.is_valid()
            || codec_settings.max_framerate == 0
            || settings.number_of_cores == 0
        {
            return StatusCode::ERR_PARAMETER;
        }

        debug!(
            "Software {} encoder initialized: {} @ {}fps, {} kbps",
            self.codec_type,
            codec_settings.resolution,
            codec_settings.max_framerate,
            codec_settings.start_bitrate_kbps
        );

        // One keyframe per second
        self.keyframe_interval = codec_settings.max_framerate;
        self.frames_since_keyframe = 0;
        self.force_keyframe = true;
        self.settings = Some(codec_settings.clone());
        StatusCode::OK
    }

    fn register_encode_complete_callback(
        &mut self,
        callback: Box<dyn EncodedImageCallback>,
    ) -> StatusCode {
        self.callback = Some(callback);
        StatusCode::OK
    }

    fn release(&mut self) -> StatusCode {
        self.settings = None;
        self.rates = None;
        StatusCode::OK
    }

    fn encode(
        &mut self,
        frame: &VideoFrame,
        frame_types: Option<&[VideoFrameType]>,
    ) -> StatusCode {
        let Some(settings) = self.settings.as_ref() else {
            return StatusCode::UNINITIALIZED;
        };
        let Some(callback) = self.callback.as_mut() else {
            return StatusCode::UNINITIALIZED;
        };
        if frame.resolution != settings.resolution
            || frame.len() < settings.resolution.i420_size()
        {
            return StatusCode::ERR_PARAMETER;
        }

        let hints = frame_types.unwrap_or(&[]);
        if !hints.is_empty() && hints.iter().all(|t| *t == VideoFrameType::Empty) {
            return StatusCode::NO_OUTPUT;
        }
        // Zero target bitrate pauses the stream
        if matches!(self.rates, Some(r) if r.target_bitrate_bps == 0) {
            return StatusCode::NO_OUTPUT;
        }

        let key_frame = self.force_keyframe
            || hints.contains(&VideoFrameType::Key)
            || self.frames_since_keyframe >= self.keyframe_interval;
        if key_frame {
            self.frames_since_keyframe = 0;
            self.force_keyframe = false;
        }
        self.frames_since_keyframe += 1;

        let image = EncodedImage {
            data: frame.data_bytes(),
            frame_type: if key_frame {
                VideoFrameType::Key
            } else {
                VideoFrameType::Delta
            },
            rtp_timestamp: frame.rtp_timestamp,
            resolution: frame.resolution,
        };
        trace!(
            "Software {} frame ts={} key={} bytes={}",
            self.codec_type,
            image.rtp_timestamp,
            key_frame,
            image.len()
        );
        callback.on_encoded_image(image);
        StatusCode::OK
    }

    fn set_rates(&mut self, parameters: &RateControlParameters) {
        self.rates = Some(*parameters);
    }

    fn encoder_info(&self) -> EncoderInfo {
        EncoderInfo {
            implementation_name: format!("Software{}", self.codec_type.payload_name()),
            is_hardware_accelerated: false,
            has_internal_source: false,
        }
    }
}
