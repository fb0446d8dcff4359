use crate::literal::LiteralDef;
use serde::de::{Deserializer, Error as DeError};
use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct PrimitiveAttr {
    /// Abstract primitive code (`uint8`, `int32`, `float64`, ...).
    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ClassRefAttr {
    pub class: String,
}

/// Reference to an enum or packed-bitfield type together with its storage width.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct StorageTypeRef {
    #[serde(rename = "type")]
    pub type_name: String,
    pub storage: String,
    /// Numeric identifier used to look up a concrete alias name.
    #[serde(default, deserialize_with = "deserialize_uid")]
    pub uid: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub enum ElementDef {
    Primitive(String),
    ClassRef(String),
    Enum(StorageTypeRef),
    Bitfield(StorageTypeRef),
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct FixedListAttr {
    pub element: ElementDef,
    /// Literal element count. When absent, `counter` names the field that carries it.
    #[serde(default)]
    pub length: Option<u64>,
    #[serde(default)]
    pub counter: Option<String>,
    /// Byte arrays that may alternately hold a NUL-terminated string.
    #[serde(default)]
    pub could_be_string: bool,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct DynamicListAttr {
    pub element: ElementDef,
    pub counter: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct StaticValueAttr {
    #[serde(rename = "type")]
    pub type_name: String,
    pub value: LiteralDef,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "kebab-case")]
pub enum AttributeKind {
    Primitive(PrimitiveAttr),
    ClassRef(ClassRefAttr),
    FixedList(FixedListAttr),
    DynamicList(DynamicListAttr),
    Enum(StorageTypeRef),
    Bitfield(StorageTypeRef),
    StaticValue(StaticValueAttr),
    Pad16,
    Pad32,
    Pad64,
}

impl AttributeKind {
    /// Short name used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            AttributeKind::Primitive(_) => "primitive",
            AttributeKind::ClassRef(_) => "class-ref",
            AttributeKind::FixedList(_) => "fixed-list",
            AttributeKind::DynamicList(_) => "dynamic-list",
            AttributeKind::Enum(_) => "enum",
            AttributeKind::Bitfield(_) => "bitfield",
            AttributeKind::StaticValue(_) => "static-value",
            AttributeKind::Pad16 => "pad16",
            AttributeKind::Pad32 => "pad32",
            AttributeKind::Pad64 => "pad64",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct BitFieldDef {
    pub name: String,
    #[serde(deserialize_with = "deserialize_mask")]
    pub mask: u64,
    #[serde(default)]
    pub comment: Option<String>,
}

fn default_serialize() -> bool {
    true
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct AttributeDef {
    pub name: String,
    #[serde(with = "serde_yml::with::singleton_map_recursive")]
    pub kind: AttributeKind,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub default: Option<LiteralDef>,
    /// When false the field lives in memory but never touches the wire.
    #[serde(default = "default_serialize")]
    pub serialize: bool,
    #[serde(default)]
    pub bitfields: Vec<BitFieldDef>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct InitialValueDef {
    pub field: String,
    pub value: LiteralDef,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ClassDef {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
    #[serde(default)]
    pub initial_values: Vec<InitialValueDef>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// Marks the class as a trivial re-export of another class.
    #[serde(default)]
    pub alias_for: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct EnumValueDef {
    pub name: String,
    pub value: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct EnumDef {
    pub name: String,
    pub storage: String,
    #[serde(default)]
    pub values: Vec<EnumValueDef>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Unsigned(u64),
    Signed(i64),
    Text(String),
}

fn parse_mask_text(text: &str) -> Option<u64> {
    let trimmed = text.trim().replace('_', "");
    if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = trimmed.strip_prefix("0b").or_else(|| trimmed.strip_prefix("0B")) {
        u64::from_str_radix(bin, 2).ok()
    } else {
        trimmed.parse().ok()
    }
}

fn deserialize_mask<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::Deserialize;
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Unsigned(value) => Ok(value),
        NumberOrText::Signed(value) => u64::try_from(value)
            .map_err(|_| D::Error::custom(format!("bitfield mask {} is negative", value))),
        NumberOrText::Text(text) => parse_mask_text(&text)
            .ok_or_else(|| D::Error::custom(format!("invalid bitfield mask '{}'", text))),
    }
}

fn deserialize_uid<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::Deserialize;
    let value: Option<NumberOrText> = Option::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        NumberOrText::Unsigned(n) => n.to_string(),
        NumberOrText::Signed(n) => n.to_string(),
        NumberOrText::Text(s) => s,
    }))
}

pub(crate) fn uid_key_to_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::Deserialize;
    Ok(match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Unsigned(n) => n.to_string(),
        NumberOrText::Signed(n) => n.to_string(),
        NumberOrText::Text(s) => s,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_kinds_parse_from_singleton_maps() {
        let yaml = r#"
- name: pad
  kind: pad16
- name: count
  kind: { primitive: { type: uint16 } }
- name: items
  kind: { dynamic-list: { element: { primitive: uint8 }, counter: count } }
- name: kind
  kind: { enum: { type: EntityKind, storage: uint8, uid: 7 } }
"#;
        let attrs: Vec<AttributeDef> = serde_yml::from_str(yaml).expect("parse attributes");
        assert_eq!(attrs.len(), 4);
        assert_eq!(attrs[0].kind, AttributeKind::Pad16);
        assert!(attrs[0].serialize);
        match &attrs[2].kind {
            AttributeKind::DynamicList(list) => {
                assert_eq!(list.counter, "count");
                assert_eq!(list.element, ElementDef::Primitive("uint8".into()));
            }
            other => panic!("expected dynamic list, got {:?}", other),
        }
        match &attrs[3].kind {
            AttributeKind::Enum(storage) => assert_eq!(storage.uid.as_deref(), Some("7")),
            other => panic!("expected enum, got {:?}", other),
        }
    }

    #[test]
    fn bitfield_masks_accept_hex_and_binary_text() {
        let yaml = r#"
- { name: a, mask: "0x06" }
- { name: b, mask: "0b1000" }
- { name: c, mask: 16 }
"#;
        let bits: Vec<BitFieldDef> = serde_yml::from_str(yaml).expect("parse bitfields");
        assert_eq!(bits[0].mask, 0x06);
        assert_eq!(bits[1].mask, 0x08);
        assert_eq!(bits[2].mask, 16);
    }
}
