//! Video encoder factory - format negotiation and backend dispatch
//!
//! The factory merges the formats of its registered backends into one ordered
//! list, routes each create/query call to the backend owning the format
//! (native before software), and wraps created encoders with the profiling
//! decorator when a profiler is configured.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::codec::{CodecInfo, SdpVideoFormat};
use super::merge::merge_formats;
use super::probe::{CapabilityProber, PlatformContext};
use super::profiled::{ProfiledVideoEncoder, DEFAULT_ENCODE_MARKER, DEFAULT_THREAD_GROUP};
use super::registry::{BackendKind, BackendRegistry, EncoderPreference, NativeBackendBuilder};
use super::software::SoftwareBackend;
use super::traits::{EncoderBackend, VideoEncoder};
use crate::config::FactoryConfig;
use crate::error::{FactoryError, Result};
use crate::profiling::Profiler;

/// Encoder factory over a fixed backend registry
pub struct VideoEncoderFactory {
    registry: BackendRegistry,
    profiler: Option<Arc<dyn Profiler>>,
    encode_marker: String,
    thread_group: String,
}

impl VideoEncoderFactory {
    /// Create a factory over an already built registry
    pub fn new(registry: BackendRegistry, profiler: Option<Arc<dyn Profiler>>) -> Self {
        Self {
            registry,
            profiler,
            encode_marker: DEFAULT_ENCODE_MARKER.to_string(),
            thread_group: DEFAULT_THREAD_GROUP.to_string(),
        }
    }

    pub fn builder() -> VideoEncoderFactoryBuilder {
        VideoEncoderFactoryBuilder::default()
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Whether created encoders are wrapped with the profiling decorator
    pub fn is_profiling(&self) -> bool {
        self.profiler.is_some()
    }

    /// All formats any backend can encode, deduplicated, in default codec order
    ///
    /// Recomputed on every call; backends never change after construction.
    pub fn supported_formats(&self) -> Vec<SdpVideoFormat> {
        let software = self.registry.software().supported_formats();
        let native = self
            .registry
            .native()
            .map(|backend| backend.supported_formats())
            .unwrap_or_default();

        merge_formats([software.as_slice(), native.as_slice()])
    }

    /// Which backend would serve `format`, or None if it is not supported
    pub fn backend_for(&self, format: &SdpVideoFormat) -> Option<BackendKind> {
        if !format.is_codec_in_list(&self.supported_formats()) {
            return None;
        }
        Some(self.owner_of(format))
    }

    /// Describe the encoder that would be created for `format`
    pub fn query_video_encoder(&self, format: &SdpVideoFormat) -> Result<CodecInfo> {
        let (kind, backend) = self.route(format)?;
        let info = backend.query_video_encoder(format);
        debug!("Query {} -> {} backend: {:?}", format, kind, info);
        Ok(info)
    }

    /// Create an encoder for `format`
    ///
    /// `format` must come from [`supported_formats`](Self::supported_formats);
    /// anything else is rejected with `UnsupportedFormat` before any backend
    /// is touched.
    pub fn create_video_encoder(&self, format: &SdpVideoFormat) -> Result<Box<dyn VideoEncoder>> {
        let (kind, backend) = self.route(format)?;
        let encoder = backend.create_video_encoder(format)?;
        info!(
            "Created {} encoder for {} ({})",
            kind,
            format,
            encoder.encoder_info().implementation_name
        );

        match &self.profiler {
            None => Ok(encoder),
            Some(profiler) => Ok(Box::new(ProfiledVideoEncoder::with_names(
                encoder,
                profiler.clone(),
                &self.encode_marker,
                &self.thread_group,
            ))),
        }
    }

    fn owner_of(&self, format: &SdpVideoFormat) -> BackendKind {
        match self.registry.native() {
            Some(native) if format.is_codec_in_list(&native.supported_formats()) => {
                BackendKind::Native
            }
            _ => BackendKind::Software,
        }
    }

    fn route(&self, format: &SdpVideoFormat) -> Result<(BackendKind, &dyn EncoderBackend)> {
        if !format.is_codec_in_list(&self.supported_formats()) {
            error!(
                "Requested format {} was never advertised by this factory",
                format
            );
            return Err(FactoryError::UnsupportedFormat(format.to_string()));
        }

        let kind = self.owner_of(format);
        let backend = match kind {
            BackendKind::Native => self.registry.native(),
            BackendKind::Software => Some(self.registry.software()),
        }
        .ok_or_else(|| FactoryError::BackendUnavailable(kind.to_string()))?;
        Ok((kind, backend))
    }
}

impl fmt::Debug for VideoEncoderFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoEncoderFactory")
            .field("registry", &self.registry)
            .field("profiling", &self.is_profiling())
            .finish()
    }
}

/// Builder assembling the registry and instrumentation of a factory
pub struct VideoEncoderFactoryBuilder {
    platform: PlatformContext,
    prober: Option<Box<dyn CapabilityProber>>,
    software: Option<Box<dyn EncoderBackend>>,
    native: Option<Box<dyn NativeBackendBuilder>>,
    preference: EncoderPreference,
    profiler: Option<Arc<dyn Profiler>>,
    profiling_enabled: bool,
    encode_marker: String,
    thread_group: String,
}

impl Default for VideoEncoderFactoryBuilder {
    fn default() -> Self {
        Self {
            platform: PlatformContext::current(),
            prober: None,
            software: None,
            native: None,
            preference: EncoderPreference::default(),
            profiler: None,
            profiling_enabled: true,
            encode_marker: DEFAULT_ENCODE_MARKER.to_string(),
            thread_group: DEFAULT_THREAD_GROUP.to_string(),
        }
    }
}

impl VideoEncoderFactoryBuilder {
    /// Apply preference, platform facts and profiling settings from configuration
    pub fn config(mut self, config: &FactoryConfig) -> Self {
        self.platform = config.platform.to_context();
        self.preference = config.encoder.preference;
        self.profiling_enabled = config.profiling.enabled;
        self.encode_marker = config.profiling.encode_marker.clone();
        self.thread_group = config.profiling.thread_group.clone();
        self
    }

    pub fn platform(mut self, platform: PlatformContext) -> Self {
        self.platform = platform;
        self
    }

    /// Override the platform's default prober
    pub fn prober(mut self, prober: impl CapabilityProber + 'static) -> Self {
        self.prober = Some(Box::new(prober));
        self
    }

    /// Replace the built-in software backend
    pub fn software_backend(mut self, backend: impl EncoderBackend + 'static) -> Self {
        self.software = Some(Box::new(backend));
        self
    }

    /// Register the platform's native backend constructor
    pub fn native_backend(mut self, builder: impl NativeBackendBuilder + 'static) -> Self {
        self.native = Some(Box::new(builder));
        self
    }

    pub fn preference(mut self, preference: EncoderPreference) -> Self {
        self.preference = preference;
        self
    }

    pub fn profiler(mut self, profiler: Arc<dyn Profiler>) -> Self {
        self.profiler = Some(profiler);
        self
    }

    pub fn build(self) -> VideoEncoderFactory {
        let software = self
            .software
            .unwrap_or_else(|| Box::new(SoftwareBackend::new()));

        let registry = match self.preference {
            EncoderPreference::Software => BackendRegistry::software_only(software),
            EncoderPreference::Hardware => {
                let prober = self
                    .prober
                    .unwrap_or_else(|| self.platform.default_prober());
                BackendRegistry::build_with_software(
                    software,
                    prober.as_ref(),
                    &self.platform,
                    self.native.as_deref(),
                )
            }
        };

        let profiler = if self.profiling_enabled {
            self.profiler
        } else {
            None
        };

        VideoEncoderFactory {
            registry,
            profiler,
            encode_marker: self.encode_marker,
            thread_group: self.thread_group,
        }
    }
}
