//! Router construction.

mod explorer;
pub use explorer::explorer_routes;
