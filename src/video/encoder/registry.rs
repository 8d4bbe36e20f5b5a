//! Backend registry - the fixed set of encoder backends behind one factory
//!
//! This module provides:
//! - One always-present software backend
//! - At most one native backend, built only when the platform prober allows it
//! - Graceful degradation to software-only when native construction fails
//!
//! Membership is decided once at construction and never changes afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

use super::probe::{CapabilityProber, PlatformContext};
use super::software::SoftwareBackend;
use super::traits::EncoderBackend;
use crate::error::Result;

/// Which registered backend owns a format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Internal software encoders
    Software,
    /// Platform hardware/native encoders
    Native,
}

impl BackendKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            BackendKind::Software => "Software",
            BackendKind::Native => "Native",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Encoder backend preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderPreference {
    /// Use the native backend when the platform supports it
    #[default]
    Hardware,
    /// Never build the native backend
    Software,
}

impl EncoderPreference {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "hardware" | "hw" | "native" => Some(EncoderPreference::Hardware),
            "software" | "sw" | "cpu" => Some(EncoderPreference::Software),
            _ => None,
        }
    }
}

impl fmt::Display for EncoderPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncoderPreference::Hardware => write!(f, "hardware"),
            EncoderPreference::Software => write!(f, "software"),
        }
    }
}

/// Constructs the platform's native backend
///
/// Only invoked after the prober reported the hardware path as usable.
/// Failing here is not fatal: the registry continues software-only.
pub trait NativeBackendBuilder: Send + Sync {
    fn build(&self, ctx: &PlatformContext) -> Result<Box<dyn EncoderBackend>>;
}

impl<F> NativeBackendBuilder for F
where
    F: Fn(&PlatformContext) -> Result<Box<dyn EncoderBackend>> + Send + Sync,
{
    fn build(&self, ctx: &PlatformContext) -> Result<Box<dyn EncoderBackend>> {
        self(ctx)
    }
}

/// Immutable set of backends behind a factory
pub struct BackendRegistry {
    software: Box<dyn EncoderBackend>,
    native: Option<Box<dyn EncoderBackend>>,
}

impl BackendRegistry {
    /// Build with the built-in software backend
    pub fn build(
        prober: &dyn CapabilityProber,
        ctx: &PlatformContext,
        native_builder: Option<&dyn NativeBackendBuilder>,
    ) -> Self {
        Self::build_with_software(
            Box::new(SoftwareBackend::new()),
            prober,
            ctx,
            native_builder,
        )
    }

    /// Build with a caller-supplied software backend
    ///
    /// The prober is consulted at most once, and only if a native builder exists.
    pub fn build_with_software(
        software: Box<dyn EncoderBackend>,
        prober: &dyn CapabilityProber,
        ctx: &PlatformContext,
        native_builder: Option<&dyn NativeBackendBuilder>,
    ) -> Self {
        info!(
            "Building encoder backend registry (platform: {})",
            ctx.platform
        );

        let native = match native_builder {
            None => {
                info!("No native encoder backend on this platform, using software only");
                None
            }
            Some(_) if !prober.is_hardware_backend_available() => {
                info!("Native encoder backend not available, using software only");
                None
            }
            Some(builder) => match builder.build(ctx) {
                Ok(backend) => {
                    info!(
                        "Native encoder backend '{}' registered ({} formats)",
                        backend.name(),
                        backend.supported_formats().len()
                    );
                    Some(backend)
                }
                Err(e) => {
                    warn!(
                        "Native encoder backend construction failed, falling back to software: {}",
                        e
                    );
                    None
                }
            },
        };

        Self::from_parts(software, native)
    }

    /// Software-only registry; nothing is probed
    pub fn software_only(software: Box<dyn EncoderBackend>) -> Self {
        info!("Building software-only encoder backend registry");
        Self::from_parts(software, None)
    }

    fn from_parts(
        software: Box<dyn EncoderBackend>,
        native: Option<Box<dyn EncoderBackend>>,
    ) -> Self {
        debug!(
            "Registered software encoder backend '{}' ({} formats)",
            software.name(),
            software.supported_formats().len()
        );
        Self { software, native }
    }

    pub fn software(&self) -> &dyn EncoderBackend {
        self.software.as_ref()
    }

    pub fn native(&self) -> Option<&dyn EncoderBackend> {
        self.native.as_deref()
    }

    pub fn has_native_backend(&self) -> bool {
        self.native.is_some()
    }

    /// Look up a backend by kind
    pub fn backend(&self, kind: BackendKind) -> Option<&dyn EncoderBackend> {
        match kind {
            BackendKind::Software => Some(self.software()),
            BackendKind::Native => self.native(),
        }
    }

    /// Registered backends, software first
    pub fn backends(&self) -> Vec<(BackendKind, &dyn EncoderBackend)> {
        let mut result = vec![(BackendKind::Software, self.software())];
        if let Some(native) = self.native() {
            result.push((BackendKind::Native, native));
        }
        result
    }

    /// Names of registered backends, software first
    pub fn backend_names(&self) -> Vec<String> {
        self.backends()
            .into_iter()
            .map(|(_, b)| b.name().to_string())
            .collect()
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("software", &self.software.name())
            .field("native", &self.native.as_ref().map(|n| n.name().to_string()))
            .finish()
    }
}
