/* JSON rendering of decoded records */

use crate::reflect::Reflector;
use crate::value::{Record, Scalar, Value};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormatOptions {
    /* Print enumeration values as numbers even when the schema names them */
    #[serde(default, rename = "numericEnums")]
    pub numeric_enums: bool,
    /* Print text-capable byte lists as byte arrays instead of strings */
    #[serde(default, rename = "rawText")]
    pub raw_text: bool,
}

/// Plain JSON object for `record`. Inherited fields come first, in wire
/// order; padding and static values have no entry.
pub fn record_to_json(reflector: &Reflector, record: &Record, options: &FormatOptions) -> JsonValue {
    let mut object = Map::new();
    flatten_into(reflector, record, options, &mut object);
    JsonValue::Object(object)
}

fn flatten_into(reflector: &Reflector, record: &Record, options: &FormatOptions, object: &mut Map<String, JsonValue>) {
    if let Some(parent) = record.parent() {
        flatten_into(reflector, parent, options, object);
    }
    let plan = reflector.plan(&record.class).ok();
    for (name, value) in &record.fields {
        let is_text = plan
            .and_then(|p| p.field(name))
            .is_some_and(|field| field.text_capable);
        let rendered = if is_text && !options.raw_text {
            reflector
                .text(record, name)
                .map(JsonValue::String)
                .unwrap_or_else(|_| value_to_json(reflector, value, options))
        } else {
            value_to_json(reflector, value, options)
        };
        object.insert(name.clone(), rendered);
    }
}

pub fn value_to_json(reflector: &Reflector, value: &Value, options: &FormatOptions) -> JsonValue {
    match value {
        Value::Scalar(s) => scalar_to_json(s),
        Value::Enum { type_name, raw } => match reflector.enum_name(type_name, *raw) {
            Some(name) if !options.numeric_enums => JsonValue::String(name.to_string()),
            _ => scalar_to_json(raw),
        },
        Value::Bits { raw, .. } => scalar_to_json(raw),
        Value::Record(record) => record_to_json(reflector, record, options),
        Value::List(items) => JsonValue::Array(
            items
                .iter()
                .map(|item| value_to_json(reflector, item, options))
                .collect(),
        ),
    }
}

fn scalar_to_json(scalar: &Scalar) -> JsonValue {
    /* Non-finite floats have no JSON number and come out as null */
    match *scalar {
        Scalar::U8(v) => json!(v),
        Scalar::U16(v) => json!(v),
        Scalar::U32(v) => json!(v),
        Scalar::U64(v) => json!(v),
        Scalar::I8(v) => json!(v),
        Scalar::I16(v) => json!(v),
        Scalar::I32(v) => json!(v),
        Scalar::I64(v) => json!(v),
        Scalar::F32(v) => json!(v),
        Scalar::F64(v) => json!(v),
    }
}
