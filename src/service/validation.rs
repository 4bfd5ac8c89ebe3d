//! Payload validation against catalog column descriptors.

use crate::catalog::{ColumnDescriptor, ColumnDescriptors};
use crate::error::AppError;
use serde_json::{Map, Value};

/// Write operation a payload is validated for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
}

/// Accepted (column, value) pairs in payload order. Names are known columns, never repeated.
pub type FieldSet = Vec<(String, Value)>;

pub struct PayloadValidator;

impl PayloadValidator {
    /// Filter and type-check `payload` in document order. Unknown keys are dropped; the first
    /// offending field stops validation.
    ///
    /// The primary key is rejected on create and silently dropped on update.
    pub fn validate(
        payload: &Map<String, Value>,
        columns: &ColumnDescriptors,
        primary_key: &str,
        operation: Operation,
    ) -> Result<FieldSet, AppError> {
        let mut fields = FieldSet::with_capacity(payload.len());
        for (key, value) in payload {
            let Some(descriptor) = columns.get(key) else {
                continue;
            };
            if key == primary_key {
                match operation {
                    Operation::Create => return Err(AppError::InvalidField(key.clone())),
                    Operation::Update => continue,
                }
            }
            if !accepts(descriptor, value) {
                return Err(AppError::InvalidField(key.clone()));
            }
            fields.push((key.clone(), value.clone()));
        }
        Ok(fields)
    }
}

fn accepts(descriptor: &ColumnDescriptor, value: &Value) -> bool {
    if value.is_null() {
        return descriptor.nullable;
    }
    descriptor.column_type.matches(value)
}
