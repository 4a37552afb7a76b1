//! JSON Schema documents published by the `schema` command.

use crate::descriptor::LaunchDescriptor;
use ll_config::{get_schema, CONFIG_SCHEMA_VERSION};
use schemars::schema_for;
use serde_json::Value;

/// JSON Schema of the configuration object hosts must supply.
pub fn config_json_schema() -> Value {
    let mut schema = get_schema().to_json_schema();
    if let Value::Object(map) = &mut schema {
        map.insert(
            "$schema".to_string(),
            Value::String("https://json-schema.org/draft/2020-12/schema".to_string()),
        );
        map.insert(
            "title".to_string(),
            Value::String("LinkedIn MCP server configuration".to_string()),
        );
        map.insert(
            "version".to_string(),
            Value::String(CONFIG_SCHEMA_VERSION.to_string()),
        );
    }
    schema
}

/// JSON Schema of [`LaunchDescriptor`].
pub fn descriptor_json_schema() -> Value {
    serde_json::to_value(schema_for!(LaunchDescriptor)).unwrap_or(Value::Null)
}
