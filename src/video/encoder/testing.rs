//! Test doubles shared by the encoder module tests

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::codec::{CodecInfo, SdpVideoFormat};
use super::traits::{
    EncodedImageCallback, EncoderBackend, EncoderInfo, EncoderSettings, FecControllerOverride,
    LossNotification, RateControlParameters, StatusCode, VideoCodecSettings, VideoEncoder,
    VideoFrameType,
};
use crate::error::{FactoryError, Result};
use crate::profiling::{
    Marker, MarkerDesc, MarkerFlags, Profiler, ProfilerCategory, ScopedProfiler,
    ScopedProfilerThread,
};
use crate::video::frame::VideoFrame;

/// Address of the encoder object behind a box, for identity checks
pub fn encoder_addr(encoder: &dyn VideoEncoder) -> usize {
    encoder as *const _ as *const () as usize
}

#[derive(Default)]
struct RecordingState {
    markers_created: AtomicUsize,
    samples_started: AtomicUsize,
    samples_open: AtomicUsize,
    threads_opened: AtomicUsize,
    open_threads: AtomicUsize,
    thread_labels: Mutex<Vec<(String, String)>>,
}

/// Profiler that only counts what happens to it
#[derive(Default, Clone)]
pub struct RecordingProfiler {
    state: Arc<RecordingState>,
}

impl RecordingProfiler {
    pub fn markers_created(&self) -> usize {
        self.state.markers_created.load(Ordering::SeqCst)
    }

    pub fn samples_started(&self) -> usize {
        self.state.samples_started.load(Ordering::SeqCst)
    }

    pub fn samples_open(&self) -> usize {
        self.state.samples_open.load(Ordering::SeqCst)
    }

    pub fn threads_opened(&self) -> usize {
        self.state.threads_opened.load(Ordering::SeqCst)
    }

    pub fn open_threads(&self) -> usize {
        self.state.open_threads.load(Ordering::SeqCst)
    }

    pub fn thread_labels(&self) -> Vec<(String, String)> {
        self.state.thread_labels.lock().clone()
    }
}

struct RecordingSample {
    state: Arc<RecordingState>,
    marker: Marker,
}

impl ScopedProfiler for RecordingSample {
    fn marker(&self) -> &Marker {
        &self.marker
    }
}

impl Drop for RecordingSample {
    fn drop(&mut self) {
        self.state.samples_open.fetch_sub(1, Ordering::SeqCst);
    }
}

struct RecordingThread {
    state: Arc<RecordingState>,
    group_name: String,
    label: String,
}

impl ScopedProfilerThread for RecordingThread {
    fn group_name(&self) -> &str {
        &self.group_name
    }

    fn label(&self) -> &str {
        &self.label
    }
}

impl Drop for RecordingThread {
    fn drop(&mut self) {
        self.state.open_threads.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Profiler for RecordingProfiler {
    fn create_marker(
        &self,
        name: &str,
        category: ProfilerCategory,
        flags: MarkerFlags,
    ) -> Marker {
        let id = self.state.markers_created.fetch_add(1, Ordering::SeqCst) as u64;
        Marker::new(MarkerDesc {
            id,
            name: name.to_string(),
            category,
            flags,
        })
    }

    fn create_scoped_profiler(&self, marker: &Marker) -> Box<dyn ScopedProfiler> {
        self.state.samples_started.fetch_add(1, Ordering::SeqCst);
        self.state.samples_open.fetch_add(1, Ordering::SeqCst);
        Box::new(RecordingSample {
            state: self.state.clone(),
            marker: marker.clone(),
        })
    }

    fn create_scoped_profiler_thread(
        &self,
        group_name: &str,
        label: &str,
    ) -> Box<dyn ScopedProfilerThread> {
        self.state.threads_opened.fetch_add(1, Ordering::SeqCst);
        self.state.open_threads.fetch_add(1, Ordering::SeqCst);
        self.state
            .thread_labels
            .lock()
            .push((group_name.to_string(), label.to_string()));
        Box::new(RecordingThread {
            state: self.state.clone(),
            group_name: group_name.to_string(),
            label: label.to_string(),
        })
    }
}

/// Shared call log
#[derive(Default, Clone)]
pub struct ScriptedLog(Arc<Mutex<Vec<String>>>);

impl ScriptedLog {
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

/// Encoder returning pre-scripted status codes (OK once a script runs out)
pub struct ScriptedEncoder {
    name: String,
    init_results: VecDeque<StatusCode>,
    encode_results: VecDeque<StatusCode>,
    observer: Option<(Arc<RecordingProfiler>, ScriptedLog)>,
}

impl ScriptedEncoder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            init_results: VecDeque::new(),
            encode_results: VecDeque::new(),
            observer: None,
        }
    }

    pub fn init_results(mut self, results: Vec<StatusCode>) -> Self {
        self.init_results = results.into();
        self
    }

    pub fn encode_results(mut self, results: Vec<StatusCode>) -> Self {
        self.encode_results = results.into();
        self
    }

    /// Log each call together with the profiler's open sample count
    pub fn observe_profiler(mut self, profiler: Arc<RecordingProfiler>, log: ScriptedLog) -> Self {
        self.observer = Some((profiler, log));
        self
    }

    fn note(&self, op: &str) {
        if let Some((profiler, log)) = &self.observer {
            log.0
                .lock()
                .push(format!("{} open={}", op, profiler.samples_open()));
        }
    }
}

impl VideoEncoder for ScriptedEncoder {
    fn set_fec_controller_override(
        &mut self,
        _fec_controller_override: Option<Arc<dyn FecControllerOverride>>,
    ) {
        self.note("set_fec_controller_override");
    }

    fn init_encode(
        &mut self,
        _codec_settings: &VideoCodecSettings,
        _settings: &EncoderSettings,
    ) -> StatusCode {
        self.note("init_encode");
        self.init_results.pop_front().unwrap_or(StatusCode::OK)
    }

    fn register_encode_complete_callback(
        &mut self,
        _callback: Box<dyn EncodedImageCallback>,
    ) -> StatusCode {
        self.note("register_encode_complete_callback");
        StatusCode::OK
    }

    fn release(&mut self) -> StatusCode {
        self.note("release");
        StatusCode::OK
    }

    fn encode(
        &mut self,
        _frame: &VideoFrame,
        _frame_types: Option<&[VideoFrameType]>,
    ) -> StatusCode {
        self.note("encode");
        self.encode_results.pop_front().unwrap_or(StatusCode::OK)
    }

    fn set_rates(&mut self, _parameters: &RateControlParameters) {
        self.note("set_rates");
    }

    fn on_packet_loss_rate_update(&mut self, _packet_loss_rate: f32) {
        self.note("on_packet_loss_rate_update");
    }

    fn on_rtt_update(&mut self, _rtt_ms: i64) {
        self.note("on_rtt_update");
    }

    fn on_loss_notification(&mut self, _loss_notification: &LossNotification) {
        self.note("on_loss_notification");
    }

    fn encoder_info(&self) -> EncoderInfo {
        EncoderInfo {
            implementation_name: self.name.clone(),
            ..Default::default()
        }
    }
}

/// Backend producing scripted encoders and remembering what it created
pub struct StubBackend {
    name: String,
    formats: Vec<SdpVideoFormat>,
    info: CodecInfo,
    fail_create: bool,
    created: Arc<AtomicUsize>,
    last_created: Arc<Mutex<Option<usize>>>,
}

impl StubBackend {
    pub fn new(name: &str, formats: Vec<SdpVideoFormat>) -> Self {
        Self {
            name: name.to_string(),
            formats,
            info: CodecInfo::default(),
            fail_create: false,
            created: Arc::new(AtomicUsize::new(0)),
            last_created: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_info(mut self, info: CodecInfo) -> Self {
        self.info = info;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// Counter of encoders created, shared with the backend
    pub fn created_counter(&self) -> Arc<AtomicUsize> {
        self.created.clone()
    }

    /// Address of the most recently created encoder, shared with the backend
    pub fn last_created(&self) -> Arc<Mutex<Option<usize>>> {
        self.last_created.clone()
    }
}

impl EncoderBackend for StubBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_formats(&self) -> Vec<SdpVideoFormat> {
        self.formats.clone()
    }

    fn query_video_encoder(&self, _format: &SdpVideoFormat) -> CodecInfo {
        self.info
    }

    fn create_video_encoder(&self, format: &SdpVideoFormat) -> Result<Box<dyn VideoEncoder>> {
        if self.fail_create {
            return Err(FactoryError::creation(&self.name, format!("cannot open {}", format)));
        }
        let encoder: Box<dyn VideoEncoder> =
            Box::new(ScriptedEncoder::new(&format!("{}-{}", self.name, format.name)));
        self.created.fetch_add(1, Ordering::SeqCst);
        *self.last_created.lock() = Some(encoder_addr(encoder.as_ref()));
        Ok(encoder)
    }
}
