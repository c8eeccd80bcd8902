//! Prefetch controller
//!
//! Decides when to request more candidates and tracks whether the upstream
//! can still supply them. Does no I/O itself.

/// Low-water prefetch policy with single in-flight fetch
#[derive(Debug, Clone)]
pub struct PrefetchController {
    low_water_mark: usize,
    batch_size: u32,
    in_flight: bool,
    has_more: bool,
}

impl PrefetchController {
    #[inline]
    #[must_use]
    pub fn new(low_water_mark: usize, batch_size: u32) -> Self {
        Self {
            low_water_mark,
            batch_size,
            in_flight: false,
            has_more: true,
        }
    }

    /// Whether a fetch should start given the current queue depth
    #[inline]
    #[must_use]
    pub fn should_fetch(&self, remaining: usize) -> bool {
        remaining <= self.low_water_mark && self.has_more && !self.in_flight
    }

    /// Mark a fetch in flight if one is due; returns the batch size to request.
    pub fn begin(&mut self, remaining: usize) -> Option<u32> {
        if !self.should_fetch(remaining) {
            return None;
        }
        self.in_flight = true;
        Some(self.batch_size)
    }

    /// Start the initial fill regardless of depth.
    pub fn begin_initial(&mut self) -> Option<u32> {
        if self.in_flight || !self.has_more {
            return None;
        }
        self.in_flight = true;
        Some(self.batch_size)
    }

    /// Record a successful response. A short batch ends the upstream for good.
    pub fn complete_ok(&mut self, requested: u32, received: usize) {
        self.in_flight = false;
        if received < requested as usize {
            self.has_more = false;
        }
    }

    /// Record a transient failure; `has_more` is left alone so a later check retries.
    pub fn complete_err(&mut self) {
        self.in_flight = false;
    }

    /// Drop an in-flight fetch whose response will not be applied.
    pub fn abandon(&mut self) {
        self.in_flight = false;
    }

    #[inline]
    #[must_use]
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    #[inline]
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    #[inline]
    #[must_use]
    pub fn low_water_mark(&self) -> usize {
        self.low_water_mark
    }

    #[inline]
    #[must_use]
    pub fn batch_size(&self) -> u32 {
        self.batch_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triggers_at_low_water_mark() {
        let p = PrefetchController::new(2, 10);
        assert!(!p.should_fetch(3));
        assert!(p.should_fetch(2));
        assert!(p.should_fetch(0));
    }

    #[test]
    fn suppresses_duplicate_in_flight() {
        let mut p = PrefetchController::new(2, 10);
        assert_eq!(p.begin(2), Some(10));
        assert_eq!(p.begin(1), None);
        p.complete_ok(10, 10);
        assert_eq!(p.begin(1), Some(10));
    }

    #[test]
    fn short_batch_is_permanent() {
        let mut p = PrefetchController::new(2, 10);
        p.begin(0);
        p.complete_ok(10, 4);
        assert!(!p.has_more());
        assert_eq!(p.begin(0), None);
        assert_eq!(p.begin_initial(), None);
    }

    #[test]
    fn failure_keeps_has_more() {
        let mut p = PrefetchController::new(2, 10);
        p.begin(0);
        p.complete_err();
        assert!(p.has_more());
        assert!(!p.in_flight());
        assert!(p.should_fetch(0));
    }

    #[test]
    fn abandon_clears_in_flight_only() {
        let mut p = PrefetchController::new(2, 10);
        assert_eq!(p.begin(1), Some(10));
        p.abandon();
        assert!(!p.in_flight());
        assert!(p.has_more());
    }
}
