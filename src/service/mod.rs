//! CrudService: generic CRUD using the catalog, validator, safe SQL builder and row packer.

mod crud;
pub mod packer;
mod validation;
pub use crud::CrudService;
pub use packer::{pack_one, pack_rows, Row};
pub use validation::{FieldSet, Operation, PayloadValidator};
