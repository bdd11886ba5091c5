/*!
 * Barrier Module
 * Synchronized start for a fixed set of worker threads
 */

mod start;

pub use start::{Rendezvous, StartBarrier};
