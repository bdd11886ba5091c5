/*!
 * Start Barrier
 *
 * One-shot rendezvous sized to the worker count. Every worker blocks in
 * `wait()` until the last expected worker arrives, then all are released
 * together.
 *
 * # Withdrawal
 *
 * When a launch aborts part way, the slots of threads that will never exist
 * are withdrawn so the workers already waiting are released instead of
 * blocking forever.
 */

use crate::core::{DemoError, DemoResult};
use parking_lot::{Condvar, Mutex};
use std::time::Instant;
use tracing::debug;

#[derive(Debug)]
struct BarrierState {
    capacity: usize,
    arrived: usize,
    last_arrival: Option<Instant>,
    released_at: Option<Instant>,
}

impl BarrierState {
    /// Release everyone if the arrival count now covers the capacity
    fn try_release(&mut self) -> bool {
        if self.released_at.is_none() && self.arrived >= self.capacity {
            self.released_at = Some(Instant::now());
            return true;
        }
        false
    }
}

/// What a worker learns when it leaves the barrier
#[derive(Debug, Clone, Copy)]
pub struct Rendezvous {
    /// The caller's arrival completed the rendezvous
    pub is_leader: bool,
    /// Arrivals counted at the moment of release
    pub arrivals: usize,
    /// Capacity at the moment of release (smaller than configured after a withdrawal)
    pub capacity: usize,
    pub released_at: Instant,
}

/// Single-use start barrier
#[derive(Debug)]
pub struct StartBarrier {
    state: Mutex<BarrierState>,
    released: Condvar,
}

impl StartBarrier {
    /// Create a barrier that releases once `capacity` workers have arrived
    pub fn new(capacity: usize) -> DemoResult<Self> {
        if capacity == 0 {
            return Err(DemoError::Resource {
                operation: "barrier init",
                detail: "capacity must be at least 1".to_string(),
            });
        }

        Ok(Self {
            state: Mutex::new(BarrierState {
                capacity,
                arrived: 0,
                last_arrival: None,
                released_at: None,
            }),
            released: Condvar::new(),
        })
    }

    /// Arrive and block until the rendezvous completes
    ///
    /// Arriving after release returns immediately; the barrier never re-arms.
    pub fn wait(&self) -> Rendezvous {
        let mut state = self.state.lock();

        let is_leader = if state.released_at.is_none() {
            state.arrived += 1;
            state.last_arrival = Some(Instant::now());
            let leader = state.try_release();
            if leader {
                debug!(arrivals = state.arrived, "Start barrier released");
                self.released.notify_all();
            }
            leader
        } else {
            false
        };

        while state.released_at.is_none() {
            self.released.wait(&mut state);
        }

        Rendezvous {
            is_leader,
            arrivals: state.arrived,
            capacity: state.capacity,
            released_at: state.released_at.unwrap_or_else(Instant::now),
        }
    }

    /// Give up `slots` arrivals that will never happen
    ///
    /// Returns `true` if this released the workers already waiting.
    pub fn withdraw(&self, slots: usize) -> bool {
        let mut state = self.state.lock();
        if state.released_at.is_some() {
            return false;
        }

        state.capacity = state.capacity.saturating_sub(slots);
        debug!(
            withdrawn = slots,
            capacity = state.capacity,
            arrived = state.arrived,
            "Start barrier capacity reduced"
        );

        let released = state.try_release();
        if released {
            self.released.notify_all();
        }
        released
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().capacity
    }

    pub fn arrivals(&self) -> usize {
        self.state.lock().arrived
    }

    pub fn is_released(&self) -> bool {
        self.state.lock().released_at.is_some()
    }

    pub fn released_at(&self) -> Option<Instant> {
        self.state.lock().released_at
    }

    /// Time of the most recent arrival
    pub fn last_arrival(&self) -> Option<Instant> {
        self.state.lock().last_arrival
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(StartBarrier::new(0).is_err());
    }

    #[test]
    fn test_single_worker_passes_through() {
        let barrier = StartBarrier::new(1).unwrap();
        let rendezvous = barrier.wait();
        assert!(rendezvous.is_leader);
        assert_eq!(rendezvous.arrivals, 1);
        assert!(barrier.is_released());
    }

    #[test]
    fn test_holds_until_last_arrival() {
        let barrier = Arc::new(StartBarrier::new(3).unwrap());

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || barrier.wait())
            })
            .collect();

        while barrier.arrivals() < 2 {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(!barrier.is_released());

        let last = barrier.wait();
        assert!(last.is_leader);

        for handle in handles {
            let rendezvous = handle.join().unwrap();
            assert!(!rendezvous.is_leader);
            assert_eq!(rendezvous.arrivals, 3);
            assert_eq!(rendezvous.released_at, last.released_at);
        }
    }

    #[test]
    fn test_withdraw_releases_waiters() {
        let barrier = Arc::new(StartBarrier::new(4).unwrap());

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || barrier.wait())
            })
            .collect();

        while barrier.arrivals() < 2 {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(barrier.withdraw(2));
        assert_eq!(barrier.capacity(), 2);

        for handle in handles {
            let rendezvous = handle.join().unwrap();
            assert_eq!(rendezvous.capacity, 2);
        }
    }

    #[test]
    fn test_withdraw_after_release_is_noop() {
        let barrier = StartBarrier::new(1).unwrap();
        barrier.wait();
        assert!(!barrier.withdraw(1));
        assert_eq!(barrier.capacity(), 1);
    }

    #[test]
    fn test_late_arrival_does_not_rearm() {
        let barrier = StartBarrier::new(1).unwrap();
        let first = barrier.wait();
        let late = barrier.wait();
        assert!(!late.is_leader);
        assert_eq!(late.arrivals, 1);
        assert_eq!(late.released_at, first.released_at);
    }
}
