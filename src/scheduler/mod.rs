/*!
 * Scheduler Module
 * Scheduling classes, priority bounds and per-thread spec resolution
 */

pub mod bounds;
pub mod resolver;
pub mod types;

// Re-export public API
pub use bounds::{FixedPriorityBounds, OsPriorityBounds, PriorityBounds};
pub use resolver::resolve_thread_specs;
pub use types::{PriorityRange, SchedPolicy, ThreadSpec};
