/*!
 * Start Barrier Tests
 * Release atomicity and withdrawal under real thread contention
 */

use sched_demo::StartBarrier;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_no_thread_runs_before_all_arrive() {
    const THREADS: usize = 16;
    let barrier = Arc::new(StartBarrier::new(THREADS).unwrap());
    let arrived = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let barrier = Arc::clone(&barrier);
            let arrived = Arc::clone(&arrived);
            thread::spawn(move || {
                // Stagger arrivals so the early ones really wait
                thread::sleep(Duration::from_millis(2 * i as u64));
                arrived.fetch_add(1, Ordering::SeqCst);
                let rendezvous = barrier.wait();
                let seen = arrived.load(Ordering::SeqCst);
                (rendezvous, seen, Instant::now())
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let last_arrival = barrier.last_arrival().unwrap();
    let released_at = barrier.released_at().unwrap();
    assert!(released_at >= last_arrival);

    let leaders = results.iter().filter(|(r, _, _)| r.is_leader).count();
    assert_eq!(leaders, 1);

    for (rendezvous, seen, observed) in &results {
        assert_eq!(*seen, THREADS);
        assert_eq!(rendezvous.arrivals, THREADS);
        assert_eq!(rendezvous.released_at, released_at);
        assert!(*observed >= last_arrival);
    }

    let first = results.iter().map(|(_, _, t)| *t).min().unwrap();
    let last = results.iter().map(|(_, _, t)| *t).max().unwrap();
    assert!(last - first < Duration::from_millis(500));
}

#[test]
fn test_withdraw_everything_before_any_arrival() {
    let barrier = StartBarrier::new(3).unwrap();
    assert!(barrier.withdraw(3));
    assert!(barrier.is_released());
    assert_eq!(barrier.capacity(), 0);

    let start = Instant::now();
    barrier.wait();
    assert!(start.elapsed() < Duration::from_millis(100));
}

#[test]
fn test_partial_withdraw_keeps_waiting_for_remaining() {
    let barrier = Arc::new(StartBarrier::new(3).unwrap());
    assert!(!barrier.withdraw(1));

    let waiter = {
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || barrier.wait())
    };

    while barrier.arrivals() < 1 {
        thread::sleep(Duration::from_millis(5));
    }
    assert!(!barrier.is_released());

    let last = barrier.wait();
    assert!(last.is_leader);
    assert_eq!(waiter.join().unwrap().capacity, 2);
}
