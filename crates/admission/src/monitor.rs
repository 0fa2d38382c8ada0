use std::sync::atomic::{AtomicU64, Ordering};

/// Nominal full-speed tick rate of the host simulation.
pub const NOMINAL_TPS: f64 = 20.0;

/// Latest observed tick rate, shared between the sampling timer and the
/// policy.
///
/// A single overwrite slot with last-write-wins semantics: the f64 is
/// stored as its bit pattern in an `AtomicU64` so the timer thread can
/// replace it while attempts read it, with no lock and no failure mode.
/// Reads before the first sample return the nominal rate.
#[derive(Debug)]
pub struct TpsMonitor {
    rate_bits: AtomicU64,
}

impl TpsMonitor {
    pub fn new() -> Self {
        Self {
            rate_bits: AtomicU64::new(NOMINAL_TPS.to_bits()),
        }
    }

    /// Store the latest tick rate. Called on a fixed cadence by the
    /// embedding's timer.
    pub fn sample(&self, rate: f64) {
        self.rate_bits.store(rate.to_bits(), Ordering::Relaxed);
    }

    /// The last known tick rate.
    pub fn current(&self) -> f64 {
        f64::from_bits(self.rate_bits.load(Ordering::Relaxed))
    }
}

impl Default for TpsMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_nominal_before_first_sample() {
        let monitor = TpsMonitor::new();
        assert_eq!(monitor.current(), NOMINAL_TPS);
    }

    #[test]
    fn last_write_wins() {
        let monitor = TpsMonitor::new();
        monitor.sample(19.2);
        monitor.sample(14.7);
        assert_eq!(monitor.current(), 14.7);
    }

    #[test]
    fn shared_across_threads() {
        use std::sync::Arc;

        let monitor = Arc::new(TpsMonitor::new());
        let writer = Arc::clone(&monitor);
        let handle = std::thread::spawn(move || writer.sample(12.5));
        handle.join().unwrap();
        assert_eq!(monitor.current(), 12.5);
    }
}
