//! Filters available to every template.
//!
//! `native_type` maps a serialised type descriptor (or property) onto the
//! C++ type the generated code uses for it.

use std::collections::HashMap;

use serde_json::Value;
use stencil_core::domain::naming::{to_capital_case, to_screaming_snake_case, to_snake_case};

pub(super) fn register(tera: &mut tera::Tera) {
    tera.register_filter("snake_case", case_filter(to_snake_case));
    tera.register_filter("screaming_snake_case", case_filter(to_screaming_snake_case));
    tera.register_filter("capital_case", case_filter(to_capital_case));
    tera.register_filter("native_type", native_type);
}

fn case_filter(
    convert: fn(&str) -> String,
) -> impl Fn(&Value, &HashMap<String, Value>) -> tera::Result<Value> + Send + Sync {
    move |value, _| match value.as_str() {
        Some(s) => Ok(Value::String(convert(s))),
        None => Err(tera::Error::msg(format!("case filters expect a string, got {value}"))),
    }
}

/// `{{ descriptor | native_type }}`, or `native_type(optional=false)` to
/// ignore the `required` flag.
fn native_type(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let honour_optional = args.get("optional").and_then(Value::as_bool).unwrap_or(true);
    let base = describe(value)?;
    let required = value.get("required").and_then(Value::as_bool).unwrap_or(true);

    if honour_optional && !required {
        Ok(Value::String(format!("std::optional<{base}>")))
    } else {
        Ok(Value::String(base))
    }
}

fn describe(descriptor: &Value) -> tera::Result<String> {
    let Some(fields) = descriptor.as_object() else {
        return Err(tera::Error::msg(format!(
            "native_type expects a type descriptor, got {descriptor}"
        )));
    };

    if fields.get("is_variant").and_then(Value::as_bool).unwrap_or(false) {
        let variants = fields
            .get("variants")
            .and_then(Value::as_array)
            .map(|kinds| {
                kinds
                    .iter()
                    .filter_map(Value::as_str)
                    .map(primitive)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        return Ok(format!("std::variant<{}>", variants.join(", ")));
    }

    let text = |key: &str| fields.get(key).and_then(Value::as_str);
    let kind = text("kind").unwrap_or("null");
    let native = match kind {
        "enum" => text("enum_type").map_or_else(|| "std::string".to_string(), str::to_string),
        "object" => text("object_type").map_or_else(|| "json".to_string(), str::to_string),
        "array" => match fields.get("items") {
            Some(items) if !items.is_null() => format!("std::vector<{}>", describe(items)?),
            _ => "json".to_string(),
        },
        other => primitive(other).to_string(),
    };
    Ok(native)
}

fn primitive(kind: &str) -> &'static str {
    match kind {
        "string" => "std::string",
        "number" => "double",
        "integer" => "int",
        "boolean" => "bool",
        "null" => "std::nullptr_t",
        _ => "json",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn native(value: Value) -> String {
        native_type(&value, &HashMap::new())
            .unwrap()
            .as_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn primitives() {
        assert_eq!(native(json!({"kind": "integer", "required": true})), "int");
        assert_eq!(native(json!({"kind": "string", "required": true})), "std::string");
    }

    #[test]
    fn optional_properties_are_wrapped() {
        let value = json!({"kind": "number", "required": false});
        assert_eq!(native(value.clone()), "std::optional<double>");

        let args = HashMap::from([("optional".to_string(), Value::Bool(false))]);
        assert_eq!(native_type(&value, &args).unwrap(), json!("double"));
    }

    #[test]
    fn references_and_containers() {
        let value = json!({
            "kind": "array",
            "required": true,
            "items": {"kind": "object", "object_type": "types::power::Reading", "required": true}
        });
        assert_eq!(native(value), "std::vector<types::power::Reading>");
        assert_eq!(native(json!({"kind": "object", "required": true})), "json");
        assert_eq!(native(json!({"kind": "enum", "enum_type": "Phase"})), "Phase");
    }

    #[test]
    fn variants() {
        let value = json!({"kind": null, "is_variant": true, "variants": ["string", "integer"]});
        assert_eq!(native(value), "std::variant<std::string, int>");
    }

    #[test]
    fn non_descriptors_are_rejected() {
        assert!(native_type(&json!("text"), &HashMap::new()).is_err());
    }
}
