//! Codec format identity used for negotiation and backend dispatch
//!
//! An [`SdpVideoFormat`] is what the negotiation layer hands us: a codec name
//! plus its fmtp parameters. [`VideoCodecType`] is the coarse codec family the
//! encoders themselves are configured with.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Supported video codec families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoCodecType {
    /// VP8 - royalty-free, broadest browser support
    Vp8,
    /// VP9 - better compression than VP8
    Vp9,
    /// H.264/AVC - widely supported, commonly hardware accelerated
    H264,
    /// H.265/HEVC - best compression, limited browser support
    H265,
    /// AV1
    Av1,
    /// Anything the family table does not know about
    Generic,
}

impl VideoCodecType {
    /// Map an SDP codec name to its family
    pub fn from_name(name: &str) -> Self {
        match name {
            "VP8" => VideoCodecType::Vp8,
            "VP9" => VideoCodecType::Vp9,
            "H264" => VideoCodecType::H264,
            "H265" => VideoCodecType::H265,
            "AV1" | "AV1X" => VideoCodecType::Av1,
            _ => VideoCodecType::Generic,
        }
    }

    /// Short payload name, as used in SDP and profiler labels
    pub fn payload_name(&self) -> &'static str {
        match self {
            VideoCodecType::Vp8 => "VP8",
            VideoCodecType::Vp9 => "VP9",
            VideoCodecType::H264 => "H264",
            VideoCodecType::H265 => "H265",
            VideoCodecType::Av1 => "AV1",
            VideoCodecType::Generic => "Generic",
        }
    }

    /// Get the MIME type
    pub fn mime_type(&self) -> String {
        format!("video/{}", self.payload_name())
    }
}

impl fmt::Display for VideoCodecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.payload_name())
    }
}

/// A negotiable codec format: name plus fmtp parameters
///
/// Parameters live in a sorted map so two formats with the same parameters
/// compare equal no matter in which order the parameters were inserted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SdpVideoFormat {
    /// Codec name, compared case-sensitively (e.g. "VP8", "H264")
    pub name: String,
    /// Codec-specific parameters (e.g. H264 `profile-level-id`)
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl SdpVideoFormat {
    /// Create a format without parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Create a format with the given parameters
    pub fn with_parameters<K, V, I>(name: impl Into<String>, parameters: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            name: name.into(),
            parameters: parameters
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Builder-style parameter insertion
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Codec family of this format
    pub fn codec_type(&self) -> VideoCodecType {
        VideoCodecType::from_name(&self.name)
    }

    /// True if both formats belong to the same codec family (name match only)
    pub fn is_same_family(&self, other: &SdpVideoFormat) -> bool {
        self.name == other.name
    }

    /// True if this exact codec configuration (name and parameters) is in `formats`
    pub fn is_codec_in_list(&self, formats: &[SdpVideoFormat]) -> bool {
        formats.iter().any(|f| f == self)
    }
}

impl fmt::Display for SdpVideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for (key, value) in &self.parameters {
            write!(f, ";{}={}", key, value)?;
        }
        Ok(())
    }
}

/// Metadata returned from a format query
///
/// Produced by the owning backend and passed through untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecInfo {
    /// Encoder consumes frames from its own source rather than `encode()` input
    pub has_internal_source: bool,
    /// Encoding runs on dedicated hardware
    pub is_hardware_accelerated: bool,
}
