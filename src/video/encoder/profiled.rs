//! Profiling decorator for encoders
//!
//! [`ProfiledVideoEncoder`] owns the wrapped encoder and forwards every call to
//! it. Two calls add timing side effects:
//! - `encode` holds a scoped marker sample around the wrapped `encode`
//! - the first successful `init_encode` opens one named profiler thread context
//!
//! Status codes from the wrapped encoder are returned untouched.

use std::sync::Arc;
use tracing::debug;

use super::codec::VideoCodecType;
use super::traits::{
    EncodedImageCallback, EncoderInfo, EncoderSettings, FecControllerOverride, LossNotification,
    RateControlParameters, StatusCode, VideoCodecSettings, VideoEncoder, VideoFrameType,
};
use crate::profiling::{Marker, MarkerFlags, Profiler, ProfilerCategory, ScopedProfilerThread};
use crate::video::frame::VideoFrame;

/// Default name of the per-encode marker
pub const DEFAULT_ENCODE_MARKER: &str = "VideoEncoder.Encode";
/// Default profiler thread group
pub const DEFAULT_THREAD_GROUP: &str = "WebRTC";

const FALLBACK_IMPLEMENTATION_NAME: &str = "VideoEncoder";

/// Label for an encoder's profiler thread, e.g. `Encoder SoftwareVP8(VP8)`
pub fn thread_label(info: &EncoderInfo, codec_type: VideoCodecType) -> String {
    let name = if info.implementation_name.is_empty() {
        FALLBACK_IMPLEMENTATION_NAME
    } else {
        info.implementation_name.as_str()
    };
    format!("Encoder {}({})", name, codec_type.payload_name())
}

/// NoContext -> ContextOpen, once, on the first successful init
enum ThreadContextState {
    NoContext,
    ContextOpen(Box<dyn ScopedProfilerThread>),
}

/// Encoder wrapper that reports encode latency to a profiler
pub struct ProfiledVideoEncoder {
    // Dropped before the encoder
    thread_context: ThreadContextState,
    encoder: Box<dyn VideoEncoder>,
    profiler: Arc<dyn Profiler>,
    marker: Marker,
    thread_group: String,
}

impl ProfiledVideoEncoder {
    pub fn new(encoder: Box<dyn VideoEncoder>, profiler: Arc<dyn Profiler>) -> Self {
        Self::with_names(encoder, profiler, DEFAULT_ENCODE_MARKER, DEFAULT_THREAD_GROUP)
    }

    /// Wrap with custom marker and thread group names
    pub fn with_names(
        encoder: Box<dyn VideoEncoder>,
        profiler: Arc<dyn Profiler>,
        marker_name: &str,
        thread_group: &str,
    ) -> Self {
        let marker =
            profiler.create_marker(marker_name, ProfilerCategory::Other, MarkerFlags::DEFAULT);
        Self {
            thread_context: ThreadContextState::NoContext,
            encoder,
            profiler,
            marker,
            thread_group: thread_group.to_string(),
        }
    }

    /// Whether the profiler thread context has been opened
    pub fn has_thread_context(&self) -> bool {
        matches!(self.thread_context, ThreadContextState::ContextOpen(_))
    }

    /// Label of the open thread context, if any
    pub fn thread_context_label(&self) -> Option<&str> {
        match &self.thread_context {
            ThreadContextState::ContextOpen(ctx) => Some(ctx.label()),
            ThreadContextState::NoContext => None,
        }
    }

    fn after_init(&mut self, result: StatusCode, codec_settings: &VideoCodecSettings) {
        if result.is_err() || self.has_thread_context() {
            return;
        }

        let label = thread_label(&self.encoder.encoder_info(), codec_settings.codec_type);
        debug!("Opening profiler thread '{}' in group {}", label, self.thread_group);
        let ctx = self
            .profiler
            .create_scoped_profiler_thread(&self.thread_group, &label);
        self.thread_context = ThreadContextState::ContextOpen(ctx);
    }
}

impl VideoEncoder for ProfiledVideoEncoder {
    fn set_fec_controller_override(
        &mut self,
        fec_controller_override: Option<Arc<dyn FecControllerOverride>>,
    ) {
        self.encoder
            .set_fec_controller_override(fec_controller_override);
    }

    fn init_encode(
        &mut self,
        codec_settings: &VideoCodecSettings,
        settings: &EncoderSettings,
    ) -> StatusCode {
        let result = self.encoder.init_encode(codec_settings, settings);
        self.after_init(result, codec_settings);
        result
    }

    fn init_encode_legacy(
        &mut self,
        codec_settings: &VideoCodecSettings,
        number_of_cores: u32,
        max_payload_size: usize,
    ) -> StatusCode {
        let result =
            self.encoder
                .init_encode_legacy(codec_settings, number_of_cores, max_payload_size);
        self.after_init(result, codec_settings);
        result
    }

    fn register_encode_complete_callback(
        &mut self,
        callback: Box<dyn EncodedImageCallback>,
    ) -> StatusCode {
        self.encoder.register_encode_complete_callback(callback)
    }

    fn release(&mut self) -> StatusCode {
        self.encoder.release()
    }

    fn encode(
        &mut self,
        frame: &VideoFrame,
        frame_types: Option<&[VideoFrameType]>,
    ) -> StatusCode {
        let result;
        {
            let _sample = self.profiler.create_scoped_profiler(&self.marker);
            result = self.encoder.encode(frame, frame_types);
        }
        result
    }

    fn set_rates(&mut self, parameters: &RateControlParameters) {
        self.encoder.set_rates(parameters);
    }

    fn on_packet_loss_rate_update(&mut self, packet_loss_rate: f32) {
        self.encoder.on_packet_loss_rate_update(packet_loss_rate);
    }

    fn on_rtt_update(&mut self, rtt_ms: i64) {
        self.encoder.on_rtt_update(rtt_ms);
    }

    fn on_loss_notification(&mut self, loss_notification: &LossNotification) {
        self.encoder.on_loss_notification(loss_notification);
    }

    fn encoder_info(&self) -> EncoderInfo {
        self.encoder.encoder_info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::encoder::testing::{RecordingProfiler, ScriptedEncoder, ScriptedLog};
    use crate::video::format::Resolution;

    fn settings() -> VideoCodecSettings {
        VideoCodecSettings::new(VideoCodecType::H264, Resolution::HD720)
    }

    fn frame() -> VideoFrame {
        VideoFrame::black(Resolution::new(16, 16), 0)
    }

    fn run_sequence(encoder: &mut dyn VideoEncoder) -> Vec<StatusCode> {
        let mut codes = Vec::new();
        codes.push(encoder.encode(&frame(), None));
        codes.push(encoder.init_encode(&settings(), &EncoderSettings::default()));
        codes.push(encoder.init_encode_legacy(&settings(), 2, 1200));
        codes.push(encoder.encode(&frame(), Some(&[VideoFrameType::Key])));
        codes.push(encoder.encode(&frame(), None));
        codes.push(encoder.release());
        codes.push(encoder.encode(&frame(), None));
        codes
    }

    fn scripted() -> ScriptedEncoder {
        ScriptedEncoder::new("HwH264")
            .init_results(vec![StatusCode::MEMORY, StatusCode::OK])
            .encode_results(vec![
                StatusCode::UNINITIALIZED,
                StatusCode::OK,
                StatusCode::ENCODER_FAILURE,
                StatusCode(-42),
            ])
    }

    #[test]
    fn test_status_codes_are_transparent() {
        let mut plain = scripted();
        let expected = run_sequence(&mut plain);

        let profiler = Arc::new(RecordingProfiler::default());
        let mut decorated = ProfiledVideoEncoder::new(Box::new(scripted()), profiler);
        assert_eq!(run_sequence(&mut decorated), expected);
    }

    #[test]
    fn test_no_thread_context_without_init() {
        let profiler = Arc::new(RecordingProfiler::default());
        let mut encoder =
            ProfiledVideoEncoder::new(Box::new(ScriptedEncoder::new("x")), profiler.clone());
        encoder.encode(&frame(), None);

        assert!(!encoder.has_thread_context());
        assert_eq!(profiler.threads_opened(), 0);
        assert_eq!(profiler.markers_created(), 1);
    }

    #[test]
    fn test_no_thread_context_when_init_fails() {
        let profiler = Arc::new(RecordingProfiler::default());
        let inner = ScriptedEncoder::new("x")
            .init_results(vec![StatusCode::ERR_PARAMETER, StatusCode::MEMORY]);
        let mut encoder = ProfiledVideoEncoder::new(Box::new(inner), profiler.clone());

        assert_eq!(
            encoder.init_encode(&settings(), &EncoderSettings::default()),
            StatusCode::ERR_PARAMETER
        );
        assert_eq!(encoder.init_encode_legacy(&settings(), 1, 1200), StatusCode::MEMORY);
        assert!(!encoder.has_thread_context());
        assert_eq!(profiler.threads_opened(), 0);
    }

    #[test]
    fn test_thread_context_opened_exactly_once() {
        let profiler = Arc::new(RecordingProfiler::default());
        let inner = ScriptedEncoder::new("HwH264").init_results(vec![
            StatusCode::MEMORY,
            StatusCode::OK,
            StatusCode::OK,
            StatusCode::NO_OUTPUT,
        ]);
        let mut encoder = ProfiledVideoEncoder::new(Box::new(inner), profiler.clone());

        encoder.init_encode(&settings(), &EncoderSettings::default());
        assert_eq!(profiler.threads_opened(), 0);

        encoder.init_encode(&settings(), &EncoderSettings::default());
        encoder.init_encode_legacy(&settings(), 4, 1200);
        encoder.init_encode(&settings(), &EncoderSettings::default());

        assert!(encoder.has_thread_context());
        assert_eq!(profiler.threads_opened(), 1);
        assert_eq!(
            profiler.thread_labels(),
            vec![("WebRTC".to_string(), "Encoder HwH264(H264)".to_string())]
        );
        assert_eq!(encoder.thread_context_label(), Some("Encoder HwH264(H264)"));
    }

    #[test]
    fn test_thread_context_closed_with_encoder() {
        let profiler = Arc::new(RecordingProfiler::default());
        let mut encoder =
            ProfiledVideoEncoder::new(Box::new(ScriptedEncoder::new("x")), profiler.clone());
        encoder.init_encode(&settings(), &EncoderSettings::default());
        assert_eq!(profiler.open_threads(), 1);

        drop(encoder);
        assert_eq!(profiler.open_threads(), 0);
    }

    #[test]
    fn test_empty_implementation_name_falls_back() {
        let info = EncoderInfo::default();
        assert_eq!(
            thread_label(&info, VideoCodecType::Vp8),
            "Encoder VideoEncoder(VP8)"
        );
    }

    #[test]
    fn test_encode_sample_released_on_failure() {
        let profiler = Arc::new(RecordingProfiler::default());
        let inner = ScriptedEncoder::new("x").encode_results(vec![StatusCode::ENCODER_FAILURE]);
        let mut encoder = ProfiledVideoEncoder::new(Box::new(inner), profiler.clone());

        assert_eq!(encoder.encode(&frame(), None), StatusCode::ENCODER_FAILURE);
        assert_eq!(profiler.samples_started(), 1);
        assert_eq!(profiler.samples_open(), 0);
    }

    #[test]
    fn test_sample_held_only_during_inner_encode() {
        let profiler = Arc::new(RecordingProfiler::default());
        let log = ScriptedLog::default();
        let inner = ScriptedEncoder::new("x").observe_profiler(profiler.clone(), log.clone());
        let mut encoder = ProfiledVideoEncoder::new(Box::new(inner), profiler.clone());

        encoder.init_encode(&settings(), &EncoderSettings::default());
        encoder.encode(&frame(), None);
        encoder.set_rates(&RateControlParameters {
            target_bitrate_bps: 500_000,
            framerate_fps: 30.0,
        });

        assert_eq!(
            log.entries(),
            vec![
                "init_encode open=0".to_string(),
                "encode open=1".to_string(),
                "set_rates open=0".to_string(),
            ]
        );
    }

    #[test]
    fn test_forwards_remaining_calls() {
        let profiler = Arc::new(RecordingProfiler::default());
        let log = ScriptedLog::default();
        let inner = ScriptedEncoder::new("x").observe_profiler(profiler.clone(), log.clone());
        let mut encoder = ProfiledVideoEncoder::new(Box::new(inner), profiler);

        encoder.on_packet_loss_rate_update(0.25);
        encoder.on_rtt_update(80);
        encoder.on_loss_notification(&LossNotification {
            timestamp_of_last_decodable: 1,
            timestamp_of_last_received: 2,
            dependencies_of_last_received_decodable: None,
            last_received_decodable: Some(true),
        });
        encoder.set_fec_controller_override(None);
        assert_eq!(encoder.encoder_info().implementation_name, "x");

        assert_eq!(
            log.entries(),
            vec![
                "on_packet_loss_rate_update open=0".to_string(),
                "on_rtt_update open=0".to_string(),
                "on_loss_notification open=0".to_string(),
                "set_fec_controller_override open=0".to_string(),
            ]
        );
    }
}
