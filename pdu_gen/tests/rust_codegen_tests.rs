/* Rust Code Generation Tests
 *
 * These tests render a small DIS-style schema through the Rust backend and
 * check the emitted module text.
 */

use pdu_gen::codegen::{GeneratedFile, Language, generate};
use pdu_gen::config::GeneratorConfig;
use pdu_gen::schema::{CrossReferenceResolver, SchemaModel};
use pdu_types::{AliasTable, SchemaFile};
use std::fs;
use std::process::Command;

const DIS_SCHEMA: &str = include_str!("fixtures/dis.yaml");

/* Helper to run the pipeline up to the Rust backend */
fn render_with(yaml: &str, adjust: impl FnOnce(&mut GeneratorConfig)) -> Vec<GeneratedFile> {
  let file: SchemaFile = serde_yml::from_str(yaml).expect("schema yaml parses");
  let model = SchemaModel::from_schema(&file).expect("schema is valid");
  let (schema, warnings) = CrossReferenceResolver::new(&AliasTable::new()).resolve(model);
  assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
  let mut config = GeneratorConfig::from_options(&file.options, schema.package());
  adjust(&mut config);
  generate(&schema, &config, Language::Rust).expect("rust generation succeeds")
}

fn render(yaml: &str) -> String {
  let files = render_with(yaml, |_| {});
  assert_eq!(files.len(), 1);
  files[0].contents.clone()
}

#[test]
fn test_module_is_named_after_package() {
  let files = render_with(DIS_SCHEMA, |_| {});
  assert_eq!(files[0].path.to_str(), Some("v7.rs"));
  assert!(files[0].contents.starts_with("// Generated by pdu-gen from package `dis.v7`."));
}

#[test]
fn test_struct_embeds_parent_first() {
  let code = render(DIS_SCHEMA);
  assert!(code.contains("pub struct EntityState {\n  pub parent: Header,\n  pub location: Vector3,"));
  assert!(code.contains("  pub marking: [u8; 12],"));
  assert!(code.contains("  pub parts: Vec<Vector3>,"));
  assert!(code.contains("/// Abstract: only decoded as the parent view of a subclass."));
}

#[test]
fn test_enum_becomes_newtype_with_constants() {
  let code = render(DIS_SCHEMA);
  assert!(code.contains("pub struct PduType(pub u8);"));
  assert!(code.contains("  pub const ENTITY_STATE: PduType = PduType(1);"));
  assert!(code.contains("      Self::FIRE => Some(\"FIRE\"),"));
}

#[test]
fn test_constructor_applies_defaults_and_initial_values() {
  let code = render(DIS_SCHEMA);
  assert!(code.contains("    value.protocol_version = 7;"));
  assert!(code.contains("    value.parent.pdu_type = PduType::ENTITY_STATE;"));
  assert!(code.contains("      parent: Header::new(),"));
}

#[test]
fn test_initial_values_can_be_disabled() {
  let files = render_with(DIS_SCHEMA, |c| c.emit_initial_values = false);
  let code = &files[0].contents;
  assert!(!code.contains("value.parent.pdu_type ="));
  assert!(!code.contains("value.protocol_version = 7;"));
}

#[test]
fn test_marshal_writes_parent_then_live_count() {
  let code = render(DIS_SCHEMA);
  assert!(code.contains("    self.parent.marshal(w)?;"));
  assert!(code.contains("let part_count_count = u8::try_from(self.parts.len())"));
  assert!(code.contains("    w.put_u8(part_count_count);"));
  assert!(code.contains("    w.put_zeros(2);"));
  assert!(code.contains("    r.skip(2)?;"));
}

#[test]
fn test_counted_list_reads_counter_elements() {
  let code = render(DIS_SCHEMA);
  assert!(code.contains("    self.parts.clear();\n    for _ in 0..self.part_count {"));
  assert!(code.contains("      self.parts.push(Vector3::unmarshal_from_reader(r)?);"));
}

#[test]
fn test_static_values_are_constants_only() {
  let code = render(DIS_SCHEMA);
  assert!(code.contains("  pub const VERSION: u16 = 3;"));
  assert!(!code.contains("pub version:"));
  assert!(!code.contains("self.version"));
}

#[test]
fn test_hash_skips_linked_counter_and_padding() {
  let code = render(DIS_SCHEMA);
  assert!(code.contains("    acc = hash_combine(acc, self.parent.wire_hash());"));
  assert!(code.contains("    acc = hash_combine(acc, self.appearance as u64);"));
  assert!(!code.contains("self.part_count as u64"));
  assert!(!code.contains("self.padding"));
  assert!(code.contains("impl PartialEq for EntityState {"));
}

#[test]
fn test_equality_can_be_disabled() {
  let files = render_with(DIS_SCHEMA, |c| c.emit_equality = false);
  let code = &files[0].contents;
  assert!(!code.contains("impl PartialEq for EntityState"));
  assert!(!code.contains("fn wire_hash"));
}

#[test]
fn test_bitfield_accessors() {
  let code = render(DIS_SCHEMA);
  assert!(code.contains("  pub fn damage(&self) -> u32 {\n    (self.appearance & 0x18u32) >> 3\n  }"));
  assert!(code.contains("  pub fn set_smoking(&mut self, value: u32) {"));
  assert!(code.contains("self.appearance = (self.appearance & !0x20u32) | ((value << 5) & 0x20u32);"));
}

#[test]
fn test_text_accessors_for_string_capable_bytes() {
  let code = render(DIS_SCHEMA);
  assert!(code.contains("  pub fn marking_text(&self) -> String {"));
  assert!(code.contains("  pub fn set_marking_text(&mut self, text: &str) {"));
  assert!(code.contains("let _ = writeln!(out, \"{:indent$}marking : {:?}\", \"\", self.marking_text(), indent = indent);"));
}

#[test]
fn test_alias_is_type_alias() {
  let code = render(DIS_SCHEMA);
  assert!(code.contains("pub type Position = Vector3;"));
  assert!(!code.contains("impl Position"));
}

#[test]
fn test_byte_order_follows_config() {
  let big = render(DIS_SCHEMA);
  assert!(big.contains("to_be_bytes"));
  let little = render_with(DIS_SCHEMA, |c| c.endianness = pdu_types::Endianness::Little);
  assert!(little[0].contents.contains("to_le_bytes"));
  assert!(!little[0].contents.contains("to_be_bytes"));
}

#[test]
fn test_keyword_fields_are_escaped() {
  let code = render(
    r#"
classes:
  - name: Odd
    attributes:
      - { name: type, kind: { primitive: { type: uint8 } } }
      - { name: self, kind: { primitive: { type: uint8 } } }
"#,
  );
  assert!(code.contains("  pub r#type: u8,"));
  assert!(code.contains("  pub self_: u8,"));
}

#[test]
fn test_float_equality_compares_bit_patterns() {
  let code = render(FLOATS);
  assert!(code.contains("self.x.to_bits() == other.x.to_bits()"));
  assert!(code.contains(
    "self.trace.iter().zip(other.trace.iter()).all(|(a, b)| a.to_bits() == b.to_bits())"
  ));
  assert!(code.contains("    acc = hash_combine(acc, self.x.to_bits() as u64);"));
}

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

const FLOATS: &str = r#"
classes:
  - name: Reading
    attributes:
      - { name: x, kind: { primitive: { type: float64 } } }
      - { name: trace, kind: { fixed-list: { element: { primitive: float32 }, length: 2 } } }
"#;

/* Helper to build the generated module together with `main_body` using
   rustc and run the binary. Returns None when no compiler can be started. */
fn compile_and_run(rust_code: &str, main_body: &str) -> Option<Result<String, String>> {
  let dir = tempfile::tempdir().expect("scratch dir");
  fs::write(dir.path().join("pdu.rs"), rust_code).expect("write module");
  let main = format!("#[allow(dead_code, unused)]\nmod pdu;\nuse pdu::*;\n\nfn main() {{\n{}\n}}\n", main_body);
  fs::write(dir.path().join("main.rs"), main).expect("write main.rs");

  let rustc = std::env::var_os("RUSTC").unwrap_or_else(|| "rustc".into());
  let binary = dir.path().join("round_trip");
  let build = match Command::new(&rustc)
    .arg("--edition=2021")
    .arg("-o")
    .arg(&binary)
    .arg(dir.path().join("main.rs"))
    .output()
  {
    Ok(output) => output,
    Err(err) => {
      println!("WARNING: rustc could not be started ({}). Skipping generated code check.", err);
      return None;
    }
  };
  if !build.status.success() {
    return Some(Err(format!(
      "generated module does not compile:\n{}",
      String::from_utf8_lossy(&build.stderr)
    )));
  }

  let run = match Command::new(&binary).output() {
    Ok(output) => output,
    Err(err) => return Some(Err(format!("failed to run binary: {}", err))),
  };
  if !run.status.success() {
    return Some(Err(String::from_utf8_lossy(&run.stderr).into_owned()));
  }
  Some(Ok(String::from_utf8_lossy(&run.stdout).into_owned()))
}

fn expect_output(result: Option<Result<String, String>>, expected: &str) {
  match result {
    Some(Ok(stdout)) => assert_eq!(stdout.trim(), expected),
    Some(Err(err)) => panic!("{}", err),
    None => {}
  }
}

#[test]
fn test_generated_module_round_trips() {
  let code = render(DIS_SCHEMA);
  let body = r#"
    let mut pdu = EntityState::new();
    pdu.set_marking_text("ALPHA");
    pdu.set_damage(2);
    pdu.parts.push(Vector3 { x: 1.0, y: 2.0, z: 3.0 });
    let bytes = pdu.to_bytes().unwrap();
    assert_eq!(bytes.len(), pdu.marshalled_size());
    let back = EntityState::unmarshal(&bytes).unwrap();
    assert_eq!(back, pdu);
    assert_eq!(back.wire_hash(), pdu.wire_hash());
    assert_eq!(back.marking_text(), "ALPHA");
    assert_eq!(back.damage(), 2);
    assert_eq!(back.parent.pdu_type, PduType::ENTITY_STATE);
    assert_eq!(back.to_bytes().unwrap(), bytes);
    println!("{}", bytes.len());
"#;
  /* 1 + 1 + 8 + 2 header, 12 location, 4 appearance, 12 marking, 1 count, 12 part */
  expect_output(compile_and_run(&code, body), "53");
}

#[test]
fn test_generated_header_and_foo_scenario() {
  let code = render(HEADER_FOO);
  let body = r#"
    assert_eq!(Header::new().to_bytes().unwrap(), vec![0, 0]);
    let mut foo = Foo::new();
    foo.count = 9;
    foo.items = vec![1, 2, 3];
    let bytes = foo.to_bytes().unwrap();
    assert_eq!(bytes, vec![0, 0, 0, 3, 1, 2, 3]);
    assert_eq!(foo.marshalled_size(), bytes.len());
    let back = Foo::unmarshal(&bytes).unwrap();
    assert_eq!(back.count, 3);
    assert_eq!(back.items, vec![1, 2, 3]);
    assert_eq!(back, foo);
    assert!(Foo::unmarshal(&[0, 0, 0, 200, 1]).is_err());
    println!("{}", bytes.len());
"#;
  expect_output(compile_and_run(&code, body), "7");
}

#[test]
fn test_generated_float_equality_agrees_with_hash() {
  let code = render(FLOATS);
  let body = r#"
    let mut a = Reading::new();
    let mut b = Reading::new();
    b.x = -0.0;
    assert!(a != b);
    assert_ne!(a.wire_hash(), b.wire_hash());
    a.x = f64::NAN;
    a.trace = [f32::NAN, -0.0];
    let bytes = a.to_bytes().unwrap();
    let back = Reading::unmarshal(&bytes).unwrap();
    assert!(back == a);
    assert_eq!(back.wire_hash(), a.wire_hash());
    println!("{}", bytes.len());
"#;
  expect_output(compile_and_run(&code, body), "16");
}
