//! HTTP handlers for the device administration API.

pub mod device;
pub mod reading;
