//! Cascade DNS Application Layer
//!
//! Ports consumed by the resolution pipeline, the pure record logic it is
//! built on, and the pipeline itself.
pub mod ports;
pub mod services;
pub mod use_cases;
