/*!
 * Core Module
 * Error taxonomy and shared constants
 */

pub mod errors;
pub mod limits;

// Re-export for convenience
pub use errors::{DemoError, DemoResult};
