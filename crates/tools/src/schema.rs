//! Tagged argument schemas for tools.
//!
//! Every tool declares its arguments as a static [`ArgSpec`] table. The
//! dispatcher validates the raw argument object against the table before a
//! handler runs, so handlers only ever see well-typed bags. The same table
//! renders to a JSON Schema object for advertisement to clients.

use browserd_core::{Error, Result};
use serde_json::{json, Map, Value};

/// The closed set of argument types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArgKind {
    String,
    Number,
    Integer,
    Bool,
    /// A string restricted to a fixed set of values.
    Enum(&'static [&'static str]),
}

/// A default applied when an optional argument is absent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArgDefault {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(&'static str),
}

impl ArgDefault {
    fn to_value(self) -> Value {
        match self {
            ArgDefault::Bool(b) => Value::Bool(b),
            ArgDefault::Int(n) => json!(n),
            ArgDefault::Float(f) => json!(f),
            ArgDefault::Str(s) => Value::String(s.to_string()),
        }
    }
}

/// One argument in a tool schema.
#[derive(Debug, Clone, Copy)]
pub struct ArgSpec {
    pub name: &'static str,
    pub kind: ArgKind,
    pub required: bool,
    pub default: Option<ArgDefault>,
    pub description: &'static str,
}

impl ArgSpec {
    fn matches(&self, value: &Value) -> bool {
        match self.kind {
            ArgKind::String => value.is_string(),
            ArgKind::Number => value.is_number(),
            ArgKind::Integer => value.is_i64() || value.is_u64(),
            ArgKind::Bool => value.is_boolean(),
            ArgKind::Enum(options) => value
                .as_str()
                .map(|s| options.contains(&s))
                .unwrap_or(false),
        }
    }

    fn type_name(&self) -> &'static str {
        match self.kind {
            ArgKind::String | ArgKind::Enum(_) => "string",
            ArgKind::Number => "number",
            ArgKind::Integer => "integer",
            ArgKind::Bool => "boolean",
        }
    }
}

/// A validated argument bag. Presence and types of required and defaulted
/// arguments are guaranteed by [`validate`]; the accessors treat a violation
/// as an internal defect rather than user error.
#[derive(Debug, Clone, Default)]
pub struct ToolArgs(Map<String, Value>);

impl ToolArgs {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn str(&self, name: &str) -> Result<&str> {
        self.get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Internal(format!("argument '{name}' missing after validation")))
    }

    pub fn opt_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn bool_or(&self, name: &str, default: bool) -> bool {
        self.get(name).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn i64_or(&self, name: &str, default: i64) -> i64 {
        self.get(name).and_then(Value::as_i64).unwrap_or(default)
    }

    pub fn u64_or(&self, name: &str, default: u64) -> u64 {
        self.get(name).and_then(Value::as_u64).unwrap_or(default)
    }

    pub fn opt_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    pub fn opt_u64(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(Value::as_u64)
    }
}

/// Validate a raw argument object against a schema. Fails closed: unknown
/// keys, missing required arguments, and type mismatches are all rejected
/// before any handler runs. Explicit `null` counts as absent.
pub fn validate(specs: &[ArgSpec], raw: &Value) -> Result<ToolArgs> {
    let empty = Map::new();
    let object = match raw {
        Value::Null => &empty,
        Value::Object(map) => map,
        other => {
            return Err(Error::InvalidArguments(format!(
                "arguments must be an object, got {}",
                json_type_name(other)
            )))
        }
    };

    for key in object.keys() {
        if !specs.iter().any(|spec| spec.name == key) {
            return Err(Error::InvalidArguments(format!("unknown argument '{key}'")));
        }
    }

    let mut validated = Map::new();
    for spec in specs {
        match object.get(spec.name) {
            Some(Value::Null) | None => {
                if spec.required {
                    return Err(Error::InvalidArguments(format!(
                        "missing required argument '{}'",
                        spec.name
                    )));
                }
                if let Some(default) = spec.default {
                    validated.insert(spec.name.to_string(), default.to_value());
                }
            }
            Some(value) => {
                if !spec.matches(value) {
                    return Err(Error::InvalidArguments(format!(
                        "argument '{}' must be {}, got {}",
                        spec.name,
                        expected_description(spec),
                        json_type_name(value)
                    )));
                }
                validated.insert(spec.name.to_string(), value.clone());
            }
        }
    }
    Ok(ToolArgs(validated))
}

/// Render a schema table as a JSON Schema object for tool advertisement.
pub fn to_json_schema(specs: &[ArgSpec]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for spec in specs {
        let mut prop = Map::new();
        prop.insert("type".into(), json!(spec.type_name()));
        prop.insert("description".into(), json!(spec.description));
        if let ArgKind::Enum(options) = spec.kind {
            prop.insert("enum".into(), json!(options));
        }
        if let Some(default) = spec.default {
            prop.insert("default".into(), default.to_value());
        }
        properties.insert(spec.name.to_string(), Value::Object(prop));
        if spec.required {
            required.push(spec.name);
        }
    }
    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".into(), json!(required));
    }
    Value::Object(schema)
}

fn expected_description(spec: &ArgSpec) -> String {
    match spec.kind {
        ArgKind::Enum(options) => format!("one of {}", options.join(", ")),
        _ => format!("a {}", spec.type_name()),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPECS: &[ArgSpec] = &[
        ArgSpec {
            name: "selector",
            kind: ArgKind::String,
            required: true,
            default: None,
            description: "CSS selector",
        },
        ArgSpec {
            name: "clear",
            kind: ArgKind::Bool,
            required: false,
            default: Some(ArgDefault::Bool(true)),
            description: "Clear first",
        },
        ArgSpec {
            name: "direction",
            kind: ArgKind::Enum(&["up", "down"]),
            required: false,
            default: None,
            description: "Direction",
        },
    ];

    #[test]
    fn applies_defaults() {
        let args = validate(SPECS, &json!({"selector": "#btn"})).unwrap();
        assert_eq!(args.str("selector").unwrap(), "#btn");
        assert!(args.bool_or("clear", false));
    }

    #[test]
    fn rejects_missing_required() {
        let err = validate(SPECS, &json!({})).unwrap_err();
        assert!(err.to_string().contains("selector"));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = validate(SPECS, &json!({"selector": "#x", "bogus": 1})).unwrap_err();
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn rejects_wrong_types() {
        let err = validate(SPECS, &json!({"selector": 42})).unwrap_err();
        assert!(err.to_string().contains("must be a string"));
    }

    #[test]
    fn rejects_out_of_enum_values() {
        let err = validate(SPECS, &json!({"selector": "#x", "direction": "sideways"})).unwrap_err();
        assert!(err.to_string().contains("one of up, down"));
    }

    #[test]
    fn null_counts_as_absent() {
        let args = validate(SPECS, &json!({"selector": "#x", "direction": null})).unwrap();
        assert!(args.opt_str("direction").is_none());
        let err = validate(SPECS, &json!({"selector": null})).unwrap_err();
        assert!(matches!(err, Error::InvalidArguments(_)));
    }

    #[test]
    fn non_object_arguments_rejected() {
        let err = validate(SPECS, &json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("must be an object"));
    }

    #[test]
    fn renders_json_schema() {
        let schema = to_json_schema(SPECS);
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["selector"]["type"], "string");
        assert_eq!(schema["properties"]["clear"]["default"], json!(true));
        assert_eq!(schema["properties"]["direction"]["enum"], json!(["up", "down"]));
        assert_eq!(schema["required"], json!(["selector"]));
    }
}
