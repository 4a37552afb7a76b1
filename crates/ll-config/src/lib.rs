//! linkedin-launch configuration schema and validation.
//!
//! This crate provides:
//! - The static schema of the four LinkedIn credential fields
//! - The caller-supplied configuration object
//! - Validation of an object against a schema
//! - Resolution of where the object comes from (CLI → env → XDG → process env)

pub mod object;
pub mod resolve;
pub mod schema;
pub mod validate;

pub use object::{ConfigObject, ObjectError};
pub use resolve::{
    load_config_file, load_config_reader, resolve_config, ConfigSource, LoadError, ResolvedConfig,
    Resolver,
};
pub use schema::{get_schema, ConfigField, ConfigSchema, CredentialField, FieldType, SchemaError};
pub use validate::{
    is_valid, missing_fields, validate, ValidatedConfig, ValidationError, ValidationResult,
};

/// Version of the configuration schema exposed to hosts.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
