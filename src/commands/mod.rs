//! Pipeline implementations.
//!
//! - [`audit`]: probe, snapshot, run, re-snapshot and classify

/// The prerequisite discovery pipeline.
pub mod audit;
