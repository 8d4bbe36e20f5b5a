//! Video encoder factory
//!
//! This module provides:
//! - The encoder capability interface and its value types
//! - Platform capability probing for the native backend
//! - A backend registry (one software backend, at most one native backend)
//! - Format merging with a default codec order
//! - The factory that routes create/query calls to the owning backend
//! - A profiling decorator for created encoders

pub mod codec;
pub mod factory;
pub mod merge;
pub mod probe;
pub mod profiled;
pub mod registry;
pub mod software;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

// Core traits and types
pub use traits::{
    EncodedImage, EncodedImageCallback, EncoderBackend, EncoderInfo, EncoderSettings,
    FecControllerOverride, LossNotification, RateControlParameters, StatusCode,
    VideoCodecSettings, VideoEncoder, VideoFrameType,
};

// Codec identity
pub use codec::{CodecInfo, SdpVideoFormat, VideoCodecType};

// Probing and registry
pub use probe::{
    CapabilityProber, DeviceCapabilityProber, PlatformContext, RuntimeBridgeProber,
    StaticProber, TargetPlatform,
};
pub use registry::{BackendKind, BackendRegistry, EncoderPreference, NativeBackendBuilder};

// Factory
pub use factory::{VideoEncoderFactory, VideoEncoderFactoryBuilder};
pub use merge::{merge_formats, sort_by_codec_priority, DEFAULT_CODEC_PRIORITY};
pub use profiled::ProfiledVideoEncoder;
pub use software::{SoftwareBackend, SoftwareEncoder};
