//! Pure domain logic for the AquaAlert ingestion pipeline.
//!
//! Nothing in this crate performs I/O. The payload decoder, alert
//! classifier and water-level math are plain functions so they can be
//! tested in isolation and reused by the pipeline and the admin surface.

pub mod alert;
pub mod decoder;
pub mod device;
pub mod error;
pub mod level;
pub mod threshold_validation;
pub mod thresholds;
pub mod types;
