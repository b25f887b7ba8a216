//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - For mutable entities, an update DTO (all `Option` fields) for patches

pub mod device;
pub mod reading;
