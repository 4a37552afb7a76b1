//! Validation of a configuration object against a schema.

use crate::object::ConfigObject;
use crate::schema::ConfigSchema;
use thiserror::Error;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::MissingField(_) => 64,
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::MissingField(name) => name,
        }
    }
}

/// Proof that a configuration object satisfied a schema.
///
/// Only [`validate`] constructs one, so anything taking a
/// `&ValidatedConfig` can rely on every required field being present
/// and non-empty.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedConfig<'a> {
    config: &'a ConfigObject,
    schema: &'a ConfigSchema,
}

impl<'a> ValidatedConfig<'a> {
    pub fn config(&self) -> &'a ConfigObject {
        self.config
    }

    pub fn schema(&self) -> &'a ConfigSchema {
        self.schema
    }

    /// Value of a required field. `None` only for names outside the schema.
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.config.get(name)
    }
}

/// Check that every required field is present with a non-empty value.
///
/// Fields are checked in schema declaration order and the first failure
/// is reported. Keys the schema does not declare are ignored.
pub fn validate<'a>(
    config: &'a ConfigObject,
    schema: &'a ConfigSchema,
) -> ValidationResult<ValidatedConfig<'a>> {
    if let Some(name) = missing_fields(config, schema).into_iter().next() {
        tracing::debug!(field = name, "required field missing");
        return Err(ValidationError::MissingField(name.to_string()));
    }
    Ok(ValidatedConfig { config, schema })
}

/// Whether `config` would pass [`validate`].
pub fn is_valid(config: &ConfigObject, schema: &ConfigSchema) -> bool {
    missing_fields(config, schema).is_empty()
}

/// Every required field that is absent or empty, in declaration order.
pub fn missing_fields<'s>(config: &ConfigObject, schema: &'s ConfigSchema) -> Vec<&'s str> {
    schema
        .required_fields()
        .filter(|field| config.get(field.name()).map_or(true, str::is_empty))
        .map(|field| field.name())
        .collect()
}
