//! HTTP handlers for table listing and record CRUD.

pub mod explorer;
pub use explorer::*;
