/* Randomized codec properties over a schema that uses every primitive width,
 * inheritance, padding, counted lists and nested records. */

use pdu_gen::config::GeneratorConfig;
use pdu_gen::schema::{CrossReferenceResolver, SchemaModel};
use pdu_reflect::{Record, Reflector, Value};
use pdu_types::{AliasTable, Endianness, SchemaFile};
use proptest::prelude::*;

const MIXED_SCHEMA: &str = r#"
classes:
  - name: Base
    attributes:
      - { name: tag, kind: { primitive: { type: int8 } } }
      - { name: reserved, kind: pad32 }
  - name: Point
    attributes:
      - { name: px, kind: { primitive: { type: float32 } } }
      - { name: py, kind: { primitive: { type: float32 } } }
  - name: Mixed
    parent: Base
    attributes:
      - { name: a, kind: { primitive: { type: uint16 } } }
      - { name: b, kind: { primitive: { type: int32 } } }
      - { name: c, kind: { primitive: { type: uint64 } } }
      - { name: d, kind: { primitive: { type: int64 } } }
      - { name: e, kind: { primitive: { type: float64 } } }
      - { name: f, kind: { primitive: { type: float32 } } }
      - { name: n, kind: { primitive: { type: uint16 } } }
      - { name: samples, kind: { dynamic-list: { element: { primitive: int16 }, counter: n } } }
      - { name: label, kind: { fixed-list: { element: { primitive: uint8 }, length: 4 } } }
      - { name: np, kind: { primitive: { type: uint8 } } }
      - { name: parts, kind: { dynamic-list: { element: { class-ref: Point }, counter: np } } }
"#;

/* Offset of `n`: tag + reserved, then a..f */
const COUNTER_OFFSET: usize = 1 + 4 + 2 + 4 + 8 + 8 + 8 + 4;

#[derive(Debug, Clone)]
struct Sample {
  tag: i8,
  a: u16,
  b: i32,
  c: u64,
  d: i64,
  e: f64,
  f: f32,
  samples: Vec<i16>,
  label: [u8; 4],
  parts: Vec<(f32, f32)>,
}

fn arb_sample() -> impl Strategy<Value = Sample> {
  (
    any::<i8>(),
    any::<u16>(),
    any::<i32>(),
    any::<u64>(),
    any::<i64>(),
    -1.0e9f64..1.0e9,
    -1.0e6f32..1.0e6,
    prop::collection::vec(any::<i16>(), 0..16),
    any::<[u8; 4]>(),
    prop::collection::vec((-100.0f32..100.0, -100.0f32..100.0), 0..4),
  )
    .prop_map(|(tag, a, b, c, d, e, f, samples, label, parts)| Sample {
      tag,
      a,
      b,
      c,
      d,
      e,
      f,
      samples,
      label,
      parts,
    })
}

fn reflector(endianness: Endianness) -> Reflector {
  let file: SchemaFile = serde_yml::from_str(MIXED_SCHEMA).expect("schema yaml parses");
  let model = SchemaModel::from_schema(&file).expect("schema is valid");
  let (schema, _) = CrossReferenceResolver::new(&AliasTable::new()).resolve(model);
  let mut config = GeneratorConfig::from_options(&file.options, schema.package());
  config.endianness = endianness;
  Reflector::new(&schema, config).expect("reflector builds")
}

fn build(reflector: &Reflector, sample: &Sample) -> Record {
  let mut record = reflector.instantiate("Mixed").unwrap();
  record.set("tag", sample.tag);
  record.set("a", sample.a);
  record.set("b", sample.b);
  record.set("c", sample.c);
  record.set("d", sample.d);
  record.set("e", sample.e);
  record.set("f", sample.f);
  record.set("samples", Value::list(sample.samples.iter().copied()));
  record.set("label", Value::list(sample.label));
  let parts = sample
    .parts
    .iter()
    .map(|(x, y)| {
      let mut point = reflector.instantiate("Point").unwrap();
      point.set("px", *x);
      point.set("py", *y);
      Value::Record(point)
    })
    .collect();
  record.set("parts", Value::List(parts));
  record
}

fn order(little: bool) -> Endianness {
  if little { Endianness::Little } else { Endianness::Big }
}

proptest! {
  #[test]
  fn round_trip_preserves_structure(sample in arb_sample(), little in any::<bool>()) {
    let reflector = reflector(order(little));
    let record = build(&reflector, &sample);

    let bytes = reflector.marshal(&record).unwrap();
    let (decoded, consumed) = reflector.unmarshal("Mixed", &bytes).unwrap();

    prop_assert_eq!(consumed, bytes.len());
    prop_assert!(reflector.equals(&record, &decoded).unwrap());
    prop_assert_eq!(reflector.hash(&record).unwrap(), reflector.hash(&decoded).unwrap());
    prop_assert_eq!(reflector.marshal(&decoded).unwrap(), bytes);
  }

  #[test]
  fn size_matches_encoded_length(sample in arb_sample(), little in any::<bool>()) {
    let reflector = reflector(order(little));
    let record = build(&reflector, &sample);

    let expected = COUNTER_OFFSET + 2 + 2 * sample.samples.len() + 4 + 1 + 8 * sample.parts.len();
    prop_assert_eq!(reflector.marshalled_size(&record).unwrap(), expected);
    prop_assert_eq!(reflector.marshal(&record).unwrap().len(), expected);
  }

  #[test]
  fn subclass_encoding_extends_parent_view(sample in arb_sample()) {
    let reflector = reflector(Endianness::Big);
    let record = build(&reflector, &sample);

    let full = reflector.marshal(&record).unwrap();
    let parent = reflector.marshal(record.parent().unwrap()).unwrap();
    prop_assert_eq!(parent.len(), 5);
    prop_assert!(full.starts_with(&parent));
  }

  #[test]
  fn counter_is_written_from_live_length(sample in arb_sample(), stale in any::<u16>()) {
    let reflector = reflector(Endianness::Big);
    let mut record = build(&reflector, &sample);
    record.set("n", stale);

    let bytes = reflector.marshal(&record).unwrap();
    let written = u16::from_be_bytes([bytes[COUNTER_OFFSET], bytes[COUNTER_OFFSET + 1]]);
    prop_assert_eq!(written as usize, sample.samples.len());

    let (decoded, _) = reflector.unmarshal("Mixed", &bytes).unwrap();
    let samples = decoded.get("samples").and_then(Value::as_list).unwrap();
    prop_assert_eq!(samples.len(), sample.samples.len());
  }

  #[test]
  fn arbitrary_input_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..160)) {
    let reflector = reflector(Endianness::Big);
    if let Ok((decoded, consumed)) = reflector.unmarshal("Mixed", &bytes) {
      prop_assert!(consumed <= bytes.len());
      prop_assert_eq!(reflector.marshalled_size(&decoded).unwrap(), consumed);
    }
  }
}
