//! Schema registry for the launcher configuration.
//!
//! The schema is declared once and never mutated. The LinkedIn schema is
//! derived from [`CredentialField`], the closed table binding each
//! configuration key to the environment variable the server reads.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashSet;
use thiserror::Error;

/// Primitive type of a configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
}

impl FieldType {
    /// JSON Schema type name.
    pub fn json_type(&self) -> &'static str {
        match self {
            FieldType::String => "string",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.json_type())
    }
}

/// A single declared configuration field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigField {
    name: Cow<'static, str>,
    #[serde(rename = "type")]
    field_type: FieldType,
    required: bool,
    description: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    env_var: Option<Cow<'static, str>>,
}

impl ConfigField {
    /// A required string field.
    pub fn string(
        name: impl Into<Cow<'static, str>>,
        description: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::String,
            required: true,
            description: description.into(),
            env_var: None,
        }
    }

    /// Mark the field optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Bind the field to an environment variable of the launched process.
    pub fn with_env(mut self, env_var: impl Into<Cow<'static, str>>) -> Self {
        self.env_var = Some(env_var.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Environment variable this field is exported as, if any.
    pub fn env_var(&self) -> Option<&str> {
        self.env_var.as_deref()
    }
}

/// Errors raised while declaring a schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Field name must not be empty")]
    EmptyName,

    #[error("Duplicate field name: {0}")]
    DuplicateField(String),

    #[error("Environment variable {env_var} bound to both {first} and {second}")]
    DuplicateEnvVar {
        env_var: String,
        first: String,
        second: String,
    },
}

/// Ordered set of configuration fields, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigSchema {
    fields: Vec<ConfigField>,
}

impl ConfigSchema {
    /// Start declaring a schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// All fields in declaration order.
    pub fn fields(&self) -> &[ConfigField] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&ConfigField> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Required fields in declaration order.
    pub fn required_fields(&self) -> impl Iterator<Item = &ConfigField> {
        self.fields.iter().filter(|f| f.is_required())
    }

    /// Fields carrying an environment binding, with the variable name.
    pub fn env_bindings(&self) -> impl Iterator<Item = (&ConfigField, &str)> {
        self.fields
            .iter()
            .filter_map(|f| f.env_var().map(|var| (f, var)))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Render as a JSON Schema object, the shape MCP hosts publish as a
    /// server's `configSchema`.
    pub fn to_json_schema(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        for field in &self.fields {
            properties.insert(
                field.name().to_string(),
                serde_json::json!({
                    "type": field.field_type().json_type(),
                    "description": field.description(),
                }),
            );
        }

        let required: Vec<&str> = self.required_fields().map(|f| f.name()).collect();

        serde_json::json!({
            "type": "object",
            "required": required,
            "properties": properties,
        })
    }
}

/// Builder for [`ConfigSchema`]; rejects duplicate names and bindings.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<ConfigField>,
}

impl SchemaBuilder {
    pub fn field(mut self, field: ConfigField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn build(self) -> Result<ConfigSchema, SchemaError> {
        check_fields(&self.fields)?;
        Ok(ConfigSchema {
            fields: self.fields,
        })
    }
}

fn check_fields(fields: &[ConfigField]) -> Result<(), SchemaError> {
    let mut names = HashSet::new();
    let mut env_owner: Vec<(&str, &str)> = Vec::new();

    for field in fields {
        if field.name().is_empty() {
            return Err(SchemaError::EmptyName);
        }
        if !names.insert(field.name()) {
            return Err(SchemaError::DuplicateField(field.name().to_string()));
        }
        if let Some(var) = field.env_var() {
            if let Some((_, first)) = env_owner.iter().find(|(v, _)| *v == var) {
                return Err(SchemaError::DuplicateEnvVar {
                    env_var: var.to_string(),
                    first: first.to_string(),
                    second: field.name().to_string(),
                });
            }
            env_owner.push((var, field.name()));
        }
    }

    Ok(())
}

/// The LinkedIn OAuth credentials the launched server needs.
///
/// Every mapping below is an exhaustive match, so adding a credential
/// without its key, variable and description does not compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialField {
    ClientId,
    ClientSecret,
    AccessToken,
    RefreshToken,
}

impl CredentialField {
    /// All credentials in schema declaration order.
    pub const ALL: [CredentialField; 4] = [
        CredentialField::ClientId,
        CredentialField::ClientSecret,
        CredentialField::AccessToken,
        CredentialField::RefreshToken,
    ];

    /// Configuration key.
    pub fn key(&self) -> &'static str {
        match self {
            CredentialField::ClientId => "linkedinClientId",
            CredentialField::ClientSecret => "linkedinClientSecret",
            CredentialField::AccessToken => "linkedinAccessToken",
            CredentialField::RefreshToken => "linkedinRefreshToken",
        }
    }

    /// Environment variable the server reads the credential from.
    pub fn env_var(&self) -> &'static str {
        match self {
            CredentialField::ClientId => "LINKEDIN_CLIENT_ID",
            CredentialField::ClientSecret => "LINKEDIN_CLIENT_SECRET",
            CredentialField::AccessToken => "LINKEDIN_ACCESS_TOKEN",
            CredentialField::RefreshToken => "LINKEDIN_REFRESH_TOKEN",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CredentialField::ClientId => "OAuth client ID of your LinkedIn developer application",
            CredentialField::ClientSecret => {
                "OAuth client secret of your LinkedIn developer application"
            }
            CredentialField::AccessToken => "OAuth access token for the LinkedIn API",
            CredentialField::RefreshToken => {
                "OAuth refresh token used to obtain new LinkedIn access tokens"
            }
        }
    }

    /// Credential declared under a configuration key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    /// Credential exported under an environment variable.
    pub fn from_env_var(var: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.env_var() == var)
    }

    fn as_field(&self) -> ConfigField {
        ConfigField::string(self.key(), self.description()).with_env(self.env_var())
    }
}

static SCHEMA: Lazy<ConfigSchema> = Lazy::new(|| ConfigSchema {
    fields: CredentialField::ALL.iter().map(CredentialField::as_field).collect(),
});

/// The launcher's configuration schema.
pub fn get_schema() -> &'static ConfigSchema {
    &SCHEMA
}
