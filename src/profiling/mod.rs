//! Profiling service interface
//!
//! The factory treats profiling as an opaque marker/timer service:
//! - a [`Marker`] is a cheap, reusable identifier created once per encoder
//! - a [`ScopedProfiler`] measures one marker sample and ends on drop
//! - a [`ScopedProfilerThread`] names the calling media thread for as long as it lives
//!
//! [`TracingProfiler`] is the built-in implementation backed by `tracing`.

pub mod tracing_profiler;

use std::fmt;
use std::sync::Arc;

pub use tracing_profiler::{MarkerStats, TracingProfiler};

/// Marker category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProfilerCategory {
    Render,
    Network,
    Video,
    #[default]
    Other,
}

impl fmt::Display for ProfilerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfilerCategory::Render => write!(f, "Render"),
            ProfilerCategory::Network => write!(f, "Network"),
            ProfilerCategory::Video => write!(f, "Video"),
            ProfilerCategory::Other => write!(f, "Other"),
        }
    }
}

/// Marker flag bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MarkerFlags(pub u16);

impl MarkerFlags {
    pub const DEFAULT: MarkerFlags = MarkerFlags(0);
}

/// Marker descriptor
#[derive(Debug, PartialEq, Eq)]
pub struct MarkerDesc {
    pub id: u64,
    pub name: String,
    pub category: ProfilerCategory,
    pub flags: MarkerFlags,
}

/// Shared handle to a marker descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker(Arc<MarkerDesc>);

impl Marker {
    pub fn new(desc: MarkerDesc) -> Self {
        Self(Arc::new(desc))
    }

    pub fn id(&self) -> u64 {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn category(&self) -> ProfilerCategory {
        self.0.category
    }

    pub fn flags(&self) -> MarkerFlags {
        self.0.flags
    }
}

/// One in-flight marker sample; the sample ends when this is dropped
pub trait ScopedProfiler: Send {
    fn marker(&self) -> &Marker;
}

/// Named profiler thread context; unregisters when dropped
pub trait ScopedProfilerThread: Send {
    fn group_name(&self) -> &str;
    fn label(&self) -> &str;
}

/// Profiling service consumed by the encoder decorator
pub trait Profiler: Send + Sync {
    fn create_marker(&self, name: &str, category: ProfilerCategory, flags: MarkerFlags)
        -> Marker;

    fn create_scoped_profiler(&self, marker: &Marker) -> Box<dyn ScopedProfiler>;

    fn create_scoped_profiler_thread(
        &self,
        group_name: &str,
        label: &str,
    ) -> Box<dyn ScopedProfilerThread>;
}
