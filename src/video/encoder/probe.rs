//! Capability probing for the optional native encoder backend
//!
//! A prober answers one question, once, before any backend exists: can a
//! hardware/native encoder backend be used right now? Which prober applies is
//! decided per platform by [`PlatformContext::default_prober`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Yes/no capability question asked at factory construction
pub trait CapabilityProber: Send + Sync {
    /// Must be side-effect free
    fn is_hardware_backend_available(&self) -> bool;
}

impl<F> CapabilityProber for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_hardware_backend_available(&self) -> bool {
        self()
    }
}

/// Fixed answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticProber(pub bool);

impl CapabilityProber for StaticProber {
    fn is_hardware_backend_available(&self) -> bool {
        self.0
    }
}

/// Native codecs live behind an embedding runtime's bridge (e.g. a managed VM);
/// they are usable once that bridge reports ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeBridgeProber {
    bridge_ready: bool,
}

impl RuntimeBridgeProber {
    pub fn new(bridge_ready: bool) -> Self {
        Self { bridge_ready }
    }
}

impl CapabilityProber for RuntimeBridgeProber {
    fn is_hardware_backend_available(&self) -> bool {
        self.bridge_ready
    }
}

/// Native codecs need a hardware encode context on the graphics device and
/// the vendor codec SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCapabilityProber {
    hardware_encode_context: bool,
    codec_sdk_present: bool,
}

impl DeviceCapabilityProber {
    pub fn new(hardware_encode_context: bool, codec_sdk_present: bool) -> Self {
        Self {
            hardware_encode_context,
            codec_sdk_present,
        }
    }
}

impl CapabilityProber for DeviceCapabilityProber {
    fn is_hardware_backend_available(&self) -> bool {
        self.hardware_encode_context && self.codec_sdk_present
    }
}

/// Platform family, which decides how native availability is probed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetPlatform {
    /// OS media framework, always present
    Apple,
    /// Native codecs reached through the runtime bridge
    Android,
    /// Desktop with a GPU encode SDK
    Desktop,
    /// No native backend exists
    Other,
}

impl TargetPlatform {
    /// Platform this binary was compiled for
    pub fn current() -> Self {
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            TargetPlatform::Apple
        } else if cfg!(target_os = "android") {
            TargetPlatform::Android
        } else if cfg!(any(target_os = "linux", target_os = "windows")) {
            TargetPlatform::Desktop
        } else {
            TargetPlatform::Other
        }
    }
}

impl fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetPlatform::Apple => write!(f, "apple"),
            TargetPlatform::Android => write!(f, "android"),
            TargetPlatform::Desktop => write!(f, "desktop"),
            TargetPlatform::Other => write!(f, "other"),
        }
    }
}

/// Platform facts handed to factory construction
///
/// Readiness signals are plain values supplied by the embedder, never read
/// from global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformContext {
    pub platform: TargetPlatform,
    pub runtime_bridge_ready: bool,
    pub hardware_encode_context: bool,
    pub codec_sdk_present: bool,
}

impl PlatformContext {
    /// Context for the compile-time platform with nothing ready
    pub fn current() -> Self {
        Self::for_platform(TargetPlatform::current())
    }

    pub fn for_platform(platform: TargetPlatform) -> Self {
        Self {
            platform,
            runtime_bridge_ready: false,
            hardware_encode_context: false,
            codec_sdk_present: false,
        }
    }

    /// The prober matching this platform
    pub fn default_prober(&self) -> Box<dyn CapabilityProber> {
        match self.platform {
            TargetPlatform::Apple => Box::new(StaticProber(true)),
            TargetPlatform::Android => {
                Box::new(RuntimeBridgeProber::new(self.runtime_bridge_ready))
            }
            TargetPlatform::Desktop => Box::new(DeviceCapabilityProber::new(
                self.hardware_encode_context,
                self.codec_sdk_present,
            )),
            TargetPlatform::Other => Box::new(StaticProber(false)),
        }
    }
}

impl Default for PlatformContext {
    fn default() -> Self {
        Self::current()
    }
}
