//! Metrics for mediahost.
//!
//! Only names and labels live here. Recording goes through the `metrics`
//! facade, so nothing is exported until the embedding application installs
//! a recorder (Prometheus or otherwise).
//!
//! ```rust,ignore
//! use mediahost_metrics::{counter, labels, media};
//!
//! counter!(media::UPLOADS_TOTAL, labels::FOLDER => "blog-images").increment(1);
//! ```

mod definitions;

pub use definitions::*;

// Re-export metrics macros for convenience
pub use metrics::{counter, histogram};
