//! `tracing`-backed profiler
//!
//! Marker samples are emitted as trace events and folded into per-marker
//! latency stats; thread contexts are logged when opened and closed.
//!
//! Markers are interned by name and category: creating the same marker twice
//! returns the same id and both share one aggregate.

use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

use super::{
    Marker, MarkerDesc, MarkerFlags, Profiler, ProfilerCategory, ScopedProfiler,
    ScopedProfilerThread,
};

/// Aggregated samples for one marker
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerStats {
    pub name: String,
    pub count: u64,
    pub total: Duration,
    pub min: Duration,
    pub max: Duration,
}

impl MarkerStats {
    fn record(&mut self, elapsed: Duration) {
        if self.count == 0 || elapsed < self.min {
            self.min = elapsed;
        }
        if elapsed > self.max {
            self.max = elapsed;
        }
        self.count += 1;
        self.total += elapsed;
    }

    /// Mean sample duration
    pub fn avg(&self) -> Duration {
        if self.count == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos((self.total.as_nanos() / u128::from(self.count)) as u64)
        }
    }
}

#[derive(Default)]
struct MarkerRegistry {
    ids: HashMap<(String, ProfilerCategory), u64>,
    stats: HashMap<u64, MarkerStats>,
}

#[derive(Default)]
struct ProfilerState {
    threads_opened: AtomicU64,
    markers: Mutex<MarkerRegistry>,
    /// Open thread contexts keyed by opening sequence
    open_threads: Mutex<BTreeMap<u64, String>>,
}

/// Profiler that reports through `tracing`
#[derive(Clone, Default)]
pub struct TracingProfiler {
    state: Arc<ProfilerState>,
}

impl TracingProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stats snapshot for every marker that has at least one sample
    pub fn marker_stats(&self) -> Vec<MarkerStats> {
        let markers = self.state.markers.lock();
        let mut result: Vec<_> = markers
            .stats
            .values()
            .filter(|s| s.count > 0)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        result
    }

    /// Stats for one marker
    pub fn stats_for(&self, marker: &Marker) -> Option<MarkerStats> {
        self.state.markers.lock().stats.get(&marker.id()).cloned()
    }

    /// Number of distinct markers created
    pub fn marker_count(&self) -> usize {
        self.state.markers.lock().stats.len()
    }

    /// Number of thread contexts currently open
    pub fn active_threads(&self) -> usize {
        self.state.open_threads.lock().len()
    }

    /// Number of thread contexts ever opened
    pub fn threads_opened(&self) -> u64 {
        self.state.threads_opened.load(Ordering::Relaxed)
    }

    /// Labels of the open thread contexts, in opening order
    pub fn thread_labels(&self) -> Vec<String> {
        self.state.open_threads.lock().values().cloned().collect()
    }
}

impl Profiler for TracingProfiler {
    fn create_marker(
        &self,
        name: &str,
        category: ProfilerCategory,
        flags: MarkerFlags,
    ) -> Marker {
        let id = {
            let mut markers = self.state.markers.lock();
            let key = (name.to_string(), category);
            match markers.ids.get(&key).copied() {
                Some(id) => id,
                None => {
                    let id = markers.ids.len() as u64;
                    markers.ids.insert(key, id);
                    markers.stats.insert(
                        id,
                        MarkerStats {
                            name: name.to_string(),
                            ..Default::default()
                        },
                    );
                    debug!("Created profiler marker {} ({}, id={})", name, category, id);
                    id
                }
            }
        };

        Marker::new(MarkerDesc {
            id,
            name: name.to_string(),
            category,
            flags,
        })
    }

    fn create_scoped_profiler(&self, marker: &Marker) -> Box<dyn ScopedProfiler> {
        Box::new(TracingScope {
            state: self.state.clone(),
            marker: marker.clone(),
            start: Instant::now(),
        })
    }

    fn create_scoped_profiler_thread(
        &self,
        group_name: &str,
        label: &str,
    ) -> Box<dyn ScopedProfilerThread> {
        let seq = self.state.threads_opened.fetch_add(1, Ordering::Relaxed);
        self.state.open_threads.lock().insert(seq, label.to_string());
        info!(group = group_name, "Profiler thread opened: {}", label);

        Box::new(TracingThread {
            state: self.state.clone(),
            seq,
            group_name: group_name.to_string(),
            label: label.to_string(),
            opened: Instant::now(),
        })
    }
}

struct TracingScope {
    state: Arc<ProfilerState>,
    marker: Marker,
    start: Instant,
}

impl ScopedProfiler for TracingScope {
    fn marker(&self) -> &Marker {
        &self.marker
    }
}

impl Drop for TracingScope {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        if let Some(stats) = self.state.markers.lock().stats.get_mut(&self.marker.id()) {
            stats.record(elapsed);
        }
        trace!(
            marker = self.marker.name(),
            elapsed_us = elapsed.as_micros() as u64,
            "marker sample"
        );
    }
}

struct TracingThread {
    state: Arc<ProfilerState>,
    seq: u64,
    group_name: String,
    label: String,
    opened: Instant,
}

impl ScopedProfilerThread for TracingThread {
    fn group_name(&self) -> &str {
        &self.group_name
    }

    fn label(&self) -> &str {
        &self.label
    }
}

impl Drop for TracingThread {
    fn drop(&mut self) {
        self.state.open_threads.lock().remove(&self.seq);
        debug!(
            group = %self.group_name,
            "Profiler thread closed: {} (open for {:?})",
            self.label,
            self.opened.elapsed()
        );
    }
}
