/* Reflection Runtime Tests
 *
 * Schemas are written inline, resolved through the normal pipeline and then
 * executed by the reflector without generating any code.
 */

use pdu_gen::config::GeneratorConfig;
use pdu_gen::schema::{CrossReferenceResolver, SchemaModel};
use pdu_reflect::{record_to_json, FormatOptions, Record, ReflectError, Reflector, Scalar, Value};
use pdu_types::{AliasTable, Endianness, SchemaFile};

const DIS_SCHEMA: &str = include_str!("../../pdu_gen/tests/fixtures/dis.yaml");

const HEADER_FOO: &str = r#"
classes:
  - name: Header
    attributes:
      - { name: pad, kind: pad16 }
  - name: Foo
    parent: Header
    attributes:
      - { name: count, kind: { primitive: { type: uint16 } } }
      - { name: items, kind: { dynamic-list: { element: { primitive: uint8 }, counter: count } } }
"#;

fn reflector_with(yaml: &str, adjust: impl FnOnce(&mut GeneratorConfig)) -> Reflector {
  let file: SchemaFile = serde_yml::from_str(yaml).expect("schema yaml parses");
  let model = SchemaModel::from_schema(&file).expect("schema is valid");
  let (schema, warnings) = CrossReferenceResolver::new(&AliasTable::new()).resolve(model);
  assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
  let mut config = GeneratorConfig::from_options(&file.options, schema.package());
  adjust(&mut config);
  Reflector::new(&schema, config).expect("reflector builds")
}

fn reflector(yaml: &str) -> Reflector {
  reflector_with(yaml, |_| {})
}

fn vector(reflector: &Reflector, x: f32, y: f32, z: f32) -> Value {
  let mut v = reflector.instantiate("Vector3").unwrap();
  v.set("x", x);
  v.set("y", y);
  v.set("z", z);
  Value::Record(v)
}

/* EntityState with every kind of field populated */
fn sample_entity(reflector: &Reflector) -> Record {
  let mut pdu = reflector.instantiate("EntityState").unwrap();
  pdu.set("timestamp", 0x0102_0304_0506_0708u64);
  pdu.set("location", vector(reflector, 1.5, -2.0, 3.25));
  reflector.set_bits(&mut pdu, "damage", 2).unwrap();
  reflector.set_bits(&mut pdu, "smoking", 1).unwrap();
  reflector.set_text(&mut pdu, "marking", "ALPHA").unwrap();
  pdu.set(
    "parts",
    Value::List(vec![vector(reflector, 1.0, 2.0, 3.0), vector(reflector, 4.0, 5.0, 6.0)]),
  );
  pdu
}

#[test]
fn test_header_and_foo_scenario() {
  let reflector = reflector(HEADER_FOO);

  let header = reflector.instantiate("Header").unwrap();
  assert_eq!(reflector.marshalled_size(&header).unwrap(), 2);
  assert_eq!(reflector.marshal(&header).unwrap(), vec![0, 0]);

  let mut foo = reflector.instantiate("Foo").unwrap();
  foo.set("count", 9u16);
  foo.set("items", Value::list([1u8, 2, 3]));

  let bytes = reflector.marshal(&foo).unwrap();
  assert_eq!(bytes, vec![0, 0, 0, 3, 1, 2, 3]);
  assert_eq!(reflector.marshalled_size(&foo).unwrap(), 7);

  let (decoded, consumed) = reflector.unmarshal("Foo", &bytes).unwrap();
  assert_eq!(consumed, 7);
  assert_eq!(decoded.get("items"), Some(&Value::list([1u8, 2, 3])));
  assert_eq!(decoded.get("count"), Some(&Value::from(3u16)));
}

#[test]
fn test_counter_drives_decoded_length() {
  let reflector = reflector(HEADER_FOO);
  let (decoded, consumed) = reflector.unmarshal("Foo", &[0xAA, 0xBB, 0, 2, 7, 8, 9]).unwrap();
  assert_eq!(consumed, 6);
  assert_eq!(decoded.get("items"), Some(&Value::list([7u8, 8])));

  let (empty, _) = reflector.unmarshal("Foo", &[0, 0, 0, 0]).unwrap();
  assert_eq!(empty.get("items"), Some(&Value::List(Vec::new())));
}

#[test]
fn test_constructor_applies_defaults_and_initial_values() {
  let reflector = reflector(DIS_SCHEMA);
  let pdu = reflector.instantiate("EntityState").unwrap();

  assert_eq!(pdu.class, "EntityState");
  assert_eq!(pdu.get("protocolVersion"), Some(&Value::from(7u8)));
  assert_eq!(
    pdu.get("pduType"),
    Some(&Value::Enum {
      type_name: "PduType".to_string(),
      raw: Scalar::U8(1),
    })
  );
  assert_eq!(pdu.get("marking").and_then(Value::as_list).map(<[Value]>::len), Some(12));
  assert_eq!(pdu.get("parts"), Some(&Value::List(Vec::new())));
  assert!(pdu.get("padding").is_none());
  assert!(pdu.get("VERSION").is_none());
}

#[test]
fn test_initial_values_can_be_disabled() {
  let reflector = reflector_with(DIS_SCHEMA, |c| c.emit_initial_values = false);
  let pdu = reflector.instantiate("EntityState").unwrap();
  assert_eq!(pdu.get("protocolVersion"), Some(&Value::from(0u8)));
  assert_eq!(pdu.get("pduType").and_then(Value::raw), Some(Scalar::U8(0)));
}

#[test]
fn test_round_trip_and_size_agreement() {
  let reflector = reflector(DIS_SCHEMA);
  let pdu = sample_entity(&reflector);

  let bytes = reflector.marshal(&pdu).unwrap();
  assert_eq!(bytes.len(), 65);
  assert_eq!(reflector.marshalled_size(&pdu).unwrap(), bytes.len());

  let (decoded, consumed) = reflector.unmarshal("EntityState", &bytes).unwrap();
  assert_eq!(consumed, bytes.len());
  assert!(reflector.equals(&pdu, &decoded).unwrap());
  assert_eq!(reflector.hash(&pdu).unwrap(), reflector.hash(&decoded).unwrap());
  assert_eq!(decoded.get("partCount"), Some(&Value::from(2u8)));
  assert_eq!(reflector.text(&decoded, "marking").unwrap(), "ALPHA");
  assert_eq!(reflector.get_bits(&decoded, "damage").unwrap(), 2);
}

#[test]
fn test_subclass_bytes_start_with_parent_view() {
  let reflector = reflector(DIS_SCHEMA);
  let pdu = sample_entity(&reflector);

  let full = reflector.marshal(&pdu).unwrap();
  let header = reflector.marshal(pdu.parent().unwrap()).unwrap();
  assert_eq!(header.len(), 12);
  assert!(full.starts_with(&header));
  assert_eq!(&header[..2], &[7, 1]);
  assert_eq!(&header[2..10], &[1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn test_padding_is_neutral() {
  let reflector = reflector(
    r#"
classes:
  - name: Padded
    attributes:
      - { name: a, kind: pad16 }
      - { name: b, kind: pad32 }
      - { name: value, kind: { primitive: { type: uint8 } } }
      - { name: c, kind: pad64 }
"#,
  );
  let record = reflector.instantiate("Padded").unwrap();
  assert_eq!(reflector.marshalled_size(&record).unwrap(), 15);
  assert_eq!(reflector.marshal(&record).unwrap(), vec![0; 15]);

  let mut noisy = vec![0xFF; 15];
  noisy[6] = 0;
  let (decoded, consumed) = reflector.unmarshal("Padded", &noisy).unwrap();
  assert_eq!(consumed, 15);
  assert!(reflector.equals(&record, &decoded).unwrap());
  assert_eq!(reflector.hash(&record).unwrap(), reflector.hash(&decoded).unwrap());
  assert_eq!(reflector.dump(&decoded).unwrap(), "value : 0\n");
}

#[test]
fn test_bitfield_setters_only_touch_their_mask() {
  let reflector = reflector(
    r#"
classes:
  - name: Flags
    attributes:
      - name: host
        kind: { primitive: { type: uint8 } }
        bitfields:
          - { name: low, mask: "0b0110" }
          - { name: high, mask: "0b1000" }
"#,
  );
  let mut record = reflector.instantiate("Flags").unwrap();

  reflector.set_bits(&mut record, "low", 0b11).unwrap();
  assert_eq!(record.get("host"), Some(&Value::from(0b0000_0110u8)));

  reflector.set_bits(&mut record, "high", 1).unwrap();
  assert_eq!(record.get("host"), Some(&Value::from(0b0000_1110u8)));

  /* excess high bits of the value are dropped */
  reflector.set_bits(&mut record, "high", 0b10).unwrap();
  assert_eq!(record.get("host"), Some(&Value::from(0b0000_0110u8)));
  assert_eq!(reflector.get_bits(&record, "low").unwrap(), 0b11);
  assert_eq!(reflector.get_bits(&record, "high").unwrap(), 0);

  let err = reflector.get_bits(&record, "missing").unwrap_err();
  assert!(matches!(err, ReflectError::UnknownBitfield { .. }));
}

#[test]
fn test_text_accessors_truncate_and_zero_fill() {
  let reflector = reflector(DIS_SCHEMA);
  let mut pdu = reflector.instantiate("EntityState").unwrap();

  reflector.set_text(&mut pdu, "marking", "A-VERY-LONG-CALLSIGN").unwrap();
  assert_eq!(reflector.text(&pdu, "marking").unwrap(), "A-VERY-LONG");

  reflector.set_text(&mut pdu, "marking", "B").unwrap();
  let marking = pdu.get("marking").and_then(Value::as_list).unwrap();
  assert_eq!(marking[0], Value::from(b'B'));
  assert!(marking[1..].iter().all(|b| *b == Value::from(0u8)));

  let err = reflector.text(&pdu, "partCount").unwrap_err();
  assert!(matches!(err, ReflectError::NotText { .. }));
}

#[test]
fn test_counter_overflow_is_an_error() {
  let reflector = reflector(
    r#"
classes:
  - name: Small
    attributes:
      - { name: n, kind: { primitive: { type: uint8 } } }
      - { name: items, kind: { dynamic-list: { element: { primitive: uint8 }, counter: n } } }
"#,
  );
  let mut record = reflector.instantiate("Small").unwrap();
  record.set("items", Value::list(vec![0u8; 256]));
  let err = reflector.marshal(&record).unwrap_err();
  assert!(matches!(err, ReflectError::CounterOverflow { count: 256, .. }));

  record.set("items", Value::list(vec![0u8; 255]));
  assert_eq!(reflector.marshal(&record).unwrap().len(), 256);
}

#[test]
fn test_shape_errors_are_reported() {
  let reflector = reflector(DIS_SCHEMA);
  let mut pdu = reflector.instantiate("EntityState").unwrap();

  pdu.set("marking", Value::list([1u8, 2]));
  let err = reflector.marshal(&pdu).unwrap_err();
  assert!(matches!(err, ReflectError::FixedLengthMismatch { expected: 12, found: 2, .. }));

  let mut pdu = reflector.instantiate("EntityState").unwrap();
  pdu.set("appearance", 1u8);
  let err = reflector.marshal(&pdu).unwrap_err();
  assert!(matches!(err, ReflectError::FieldShape { .. }));
  assert!(err.to_string().contains("EntityState.appearance"));
}

#[test]
fn test_decode_failures() {
  let reflector = reflector(DIS_SCHEMA);

  let err = reflector.unmarshal("EntityState", &[7, 1, 0, 0]).unwrap_err();
  assert!(matches!(err, ReflectError::Truncated { needed: 8, remaining: 2, .. }));

  let err = reflector.unmarshal("Header", &[0; 12]).unwrap_err();
  assert!(matches!(err, ReflectError::AbstractRoot { .. }));

  let err = reflector.unmarshal("Missing", &[]).unwrap_err();
  assert!(matches!(err, ReflectError::UnknownClass { .. }));

  /* a counter announcing more elements than the input holds */
  let mut bytes = reflector.marshal(&reflector.instantiate("EntityState").unwrap()).unwrap();
  let counter_at = bytes.len() - 1;
  bytes[counter_at] = 200;
  let err = reflector.unmarshal("EntityState", &bytes).unwrap_err();
  assert!(matches!(err, ReflectError::Truncated { .. }));
}

#[test]
fn test_class_element_count_is_bounded_by_input() {
  let reflector = reflector(
    r#"
classes:
  - name: Point
    attributes:
      - { name: x, kind: { primitive: { type: float32 } } }
      - { name: y, kind: { primitive: { type: float32 } } }
  - name: Path
    attributes:
      - { name: n, kind: { primitive: { type: uint32 } } }
      - { name: points, kind: { dynamic-list: { element: { class-ref: Point }, counter: n } } }
"#,
  );
  let err = reflector.unmarshal("Path", &[0xFF, 0xFF, 0xFF, 0xFF, 0, 0]).unwrap_err();
  match err {
    ReflectError::Truncated { field, needed, remaining, .. } => {
      assert_eq!(field, "points");
      assert_eq!(needed as u64, u32::MAX as u64 * 8);
      assert_eq!(remaining, 2);
    }
    other => panic!("expected truncation, got {:?}", other),
  }
}

#[test]
fn test_alias_follows_target() {
  let reflector = reflector(DIS_SCHEMA);
  let position = reflector.instantiate("Position").unwrap();
  assert_eq!(position.class, "Vector3");

  let (decoded, consumed) = reflector.unmarshal("Position", &[0x3F, 0x80, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap();
  assert_eq!(consumed, 12);
  assert_eq!(decoded.get("x"), Some(&Value::from(1.0f32)));
}

#[test]
fn test_little_endian_config() {
  let reflector = reflector_with(HEADER_FOO, |c| c.endianness = Endianness::Little);
  let mut foo = reflector.instantiate("Foo").unwrap();
  foo.set("items", Value::list([5u8]));
  assert_eq!(reflector.marshal(&foo).unwrap(), vec![0, 0, 1, 0, 5]);
}

#[test]
fn test_equality_ignores_counters_and_non_serialized_fields() {
  let reflector = reflector(
    r#"
classes:
  - name: Tracked
    attributes:
      - { name: id, kind: { primitive: { type: uint16 } } }
      - { name: scratch, kind: { primitive: { type: uint32 } }, serialize: false, default: 5 }
      - { name: n, kind: { primitive: { type: uint8 } } }
      - { name: items, kind: { dynamic-list: { element: { primitive: int16 }, counter: n } } }
"#,
  );
  let mut a = reflector.instantiate("Tracked").unwrap();
  a.set("items", Value::list([-1i16, 4]));
  let mut b = a.clone();
  b.set("scratch", 99u32);
  b.set("n", 42u8);
  assert!(reflector.equals(&a, &b).unwrap());
  assert_eq!(reflector.hash(&a).unwrap(), reflector.hash(&b).unwrap());

  b.set("id", 1u16);
  assert!(!reflector.equals(&a, &b).unwrap());

  let bytes = reflector.marshal(&a).unwrap();
  assert_eq!(bytes, vec![0, 0, 2, 0xFF, 0xFF, 0, 4]);
  let (decoded, _) = reflector.unmarshal("Tracked", &bytes).unwrap();
  assert_eq!(decoded.get("scratch"), Some(&Value::from(5u32)));
}

const FLOATS: &str = r#"
classes:
  - name: Reading
    attributes:
      - { name: x, kind: { primitive: { type: float64 } } }
      - { name: trace, kind: { fixed-list: { element: { primitive: float32 }, length: 2 } } }
"#;

#[test]
fn test_float_equality_agrees_with_hash() {
  let reflector = reflector(FLOATS);
  let mut positive = reflector.instantiate("Reading").unwrap();
  let mut negative = reflector.instantiate("Reading").unwrap();
  positive.set("x", 0.0f64);
  negative.set("x", -0.0f64);

  let equal = reflector.equals(&positive, &negative).unwrap();
  let same_hash = reflector.hash(&positive).unwrap() == reflector.hash(&negative).unwrap();
  assert!(!equal);
  assert_eq!(equal, same_hash);

  negative.set("x", 0.0f64);
  negative.set("trace", Value::list([-0.0f32, 0.0]));
  assert!(!reflector.equals(&positive, &negative).unwrap());
  assert_ne!(reflector.hash(&positive).unwrap(), reflector.hash(&negative).unwrap());
}

#[test]
fn test_nan_survives_round_trip() {
  let reflector = reflector(FLOATS);
  let mut reading = reflector.instantiate("Reading").unwrap();
  reading.set("x", f64::NAN);
  reading.set("trace", Value::list([f32::NAN, -0.0]));

  let bytes = reflector.marshal(&reading).unwrap();
  let (decoded, _) = reflector.unmarshal("Reading", &bytes).unwrap();
  assert!(reflector.equals(&reading, &decoded).unwrap());
  assert!(reflector.equals(&reading, &reading).unwrap());
  assert_eq!(reflector.hash(&reading).unwrap(), reflector.hash(&decoded).unwrap());
}

#[test]
fn test_dump_lists_fields_parent_first() {
  let reflector = reflector(DIS_SCHEMA);
  let pdu = sample_entity(&reflector);
  let dump = reflector.dump(&pdu).unwrap();

  assert!(dump.starts_with("protocolVersion : 7\npduType : ENTITY_STATE (1)\ntimestamp : 72623859790382856\n"));
  assert!(dump.contains("location :\n  x : 1.5\n  y : -2\n  z : 3.25\n"));
  assert!(dump.contains("appearance : 48\n"));
  assert!(dump.contains("marking : \"ALPHA\"\n"));
  assert!(dump.contains("parts[1] :\n  x : 4\n"));
  assert!(!dump.contains("padding"));
  assert!(!dump.contains("VERSION"));
}

#[test]
fn test_json_view_names_enums_and_text() {
  let reflector = reflector(DIS_SCHEMA);
  let pdu = sample_entity(&reflector);

  let json = record_to_json(&reflector, &pdu, &FormatOptions::default());
  assert_eq!(json["protocolVersion"], 7);
  assert_eq!(json["pduType"], "ENTITY_STATE");
  assert_eq!(json["marking"], "ALPHA");
  assert_eq!(json["location"]["x"], 1.5);
  assert_eq!(json["parts"].as_array().map(Vec::len), Some(2));

  let numeric = FormatOptions {
    numeric_enums: true,
    raw_text: true,
  };
  let json = record_to_json(&reflector, &pdu, &numeric);
  assert_eq!(json["pduType"], 1);
  assert_eq!(json["marking"][0], 65);
}
