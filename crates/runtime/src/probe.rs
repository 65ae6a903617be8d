//! One-time startup capability probe.
//!
//! Before the simulation goes Active the host acquires its graphics context
//! and times a batch of trivial clears. No context, or clears slower than
//! `probe_max_ms_per_clear` on average, means the effect starts Disabled.

use ripple_core::config::RippleConfig;
use tracing::{debug, warn};

/// Host hooks the probe needs.
pub trait CapabilityProbe {
    /// Tries to obtain the graphics context. `false` when unavailable.
    fn acquire(&mut self) -> bool;

    /// Performs one trivial clear and waits for it to finish.
    fn clear(&mut self);

    /// Monotonic clock in milliseconds.
    fn now_ms(&mut self) -> f64;
}

/// Result of [`run_probe`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeOutcome {
    Capable { ms_per_clear: f64 },
    Unavailable,
    TooSlow { ms_per_clear: f64 },
}

impl ProbeOutcome {
    pub fn is_capable(&self) -> bool {
        matches!(self, ProbeOutcome::Capable { .. })
    }
}

/// Acquires the context and benchmarks `probe_clear_count` clears.
pub fn run_probe(probe: &mut impl CapabilityProbe, config: &RippleConfig) -> ProbeOutcome {
    if !probe.acquire() {
        warn!("capability probe: no graphics context");
        return ProbeOutcome::Unavailable;
    }
    let count = config.probe_clear_count.max(1);
    let start = probe.now_ms();
    for _ in 0..count {
        probe.clear();
    }
    let elapsed = (probe.now_ms() - start).max(0.0);
    let ms_per_clear = elapsed / count as f64;
    if ms_per_clear > config.probe_max_ms_per_clear {
        warn!(
            ms_per_clear,
            budget = config.probe_max_ms_per_clear,
            "capability probe: clears over budget"
        );
        ProbeOutcome::TooSlow { ms_per_clear }
    } else {
        debug!(ms_per_clear, "capability probe: passed");
        ProbeOutcome::Capable { ms_per_clear }
    }
}

/// Probe backed by a fixed per-clear cost, for headless hosts and replays.
#[derive(Debug, Clone)]
pub struct SimulatedProbe {
    available: bool,
    ms_per_clear: f64,
    clock: f64,
    clears: usize,
}

impl SimulatedProbe {
    pub fn new(available: bool, ms_per_clear: f64) -> Self {
        Self {
            available,
            ms_per_clear,
            clock: 0.0,
            clears: 0,
        }
    }

    /// Number of clears performed so far.
    pub fn clears(&self) -> usize {
        self.clears
    }
}

impl CapabilityProbe for SimulatedProbe {
    fn acquire(&mut self) -> bool {
        self.available
    }

    fn clear(&mut self) {
        self.clears += 1;
        self.clock += self.ms_per_clear;
    }

    fn now_ms(&mut self) -> f64 {
        self.clock
    }
}
