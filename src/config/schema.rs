use serde::{Deserialize, Serialize};

use crate::video::encoder::probe::{PlatformContext, TargetPlatform};
use crate::video::encoder::profiled::{DEFAULT_ENCODE_MARKER, DEFAULT_THREAD_GROUP};
use crate::video::encoder::registry::EncoderPreference;

/// Main factory configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FactoryConfig {
    /// Backend selection settings
    pub encoder: EncoderConfig,
    /// Platform readiness signals
    pub platform: PlatformConfig,
    /// Encoder instrumentation settings
    pub profiling: ProfilingConfig,
}

/// Backend selection configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EncoderConfig {
    /// Hardware: build the native backend when the platform allows it.
    /// Software: internal encoders only.
    pub preference: EncoderPreference,
}

/// Platform readiness configuration
///
/// These are facts the embedding application knows at startup; they are
/// handed to the prober instead of being discovered from global state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlatformConfig {
    /// Platform override (None = compile-time platform)
    pub platform: Option<TargetPlatform>,
    /// Embedding runtime bridge is initialized
    pub runtime_bridge_ready: bool,
    /// Graphics device exposes a hardware encode context
    pub hardware_encode_context: bool,
    /// Vendor codec SDK is present
    pub codec_sdk_present: bool,
}

impl PlatformConfig {
    pub fn to_context(&self) -> PlatformContext {
        let platform = self.platform.unwrap_or_else(TargetPlatform::current);
        PlatformContext {
            runtime_bridge_ready: self.runtime_bridge_ready,
            hardware_encode_context: self.hardware_encode_context,
            codec_sdk_present: self.codec_sdk_present,
            ..PlatformContext::for_platform(platform)
        }
    }
}

/// Encoder instrumentation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProfilingConfig {
    /// Wrap created encoders with the profiling decorator
    pub enabled: bool,
    /// Group name for encoder profiler threads
    pub thread_group: String,
    /// Marker name for encode samples
    pub encode_marker: String,
}

impl Default for ProfilingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            thread_group: DEFAULT_THREAD_GROUP.to_string(),
            encode_marker: DEFAULT_ENCODE_MARKER.to_string(),
        }
    }
}
