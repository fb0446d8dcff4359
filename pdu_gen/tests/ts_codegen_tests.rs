/* TypeScript Code Generation Tests */

use pdu_gen::codegen::{GeneratedFile, Language, generate};
use pdu_gen::config::GeneratorConfig;
use pdu_gen::schema::{CrossReferenceResolver, SchemaModel};
use pdu_types::{AliasTable, Endianness, SchemaFile};

const DIS_SCHEMA: &str = include_str!("fixtures/dis.yaml");

fn render_with(yaml: &str, adjust: impl FnOnce(&mut GeneratorConfig)) -> Vec<GeneratedFile> {
  let file: SchemaFile = serde_yml::from_str(yaml).expect("schema yaml parses");
  let model = SchemaModel::from_schema(&file).expect("schema is valid");
  let (schema, _) = CrossReferenceResolver::new(&AliasTable::new()).resolve(model);
  let mut config = GeneratorConfig::from_options(&file.options, schema.package());
  adjust(&mut config);
  generate(&schema, &config, Language::TypeScript).expect("typescript generation succeeds")
}

fn render(yaml: &str) -> String {
  let files = render_with(yaml, |_| {});
  assert_eq!(files.len(), 1);
  files[0].contents.clone()
}

#[test]
fn test_module_file_and_runtime() {
  let files = render_with(DIS_SCHEMA, |_| {});
  assert_eq!(files[0].path.to_str(), Some("v7.ts"));
  let code = &files[0].contents;
  assert!(code.contains("const LITTLE_ENDIAN = false;"));
  assert!(code.contains("export class OutputStream {"));
  assert!(code.contains("  readBigUint64(): bigint {"));
  assert!(code.contains("export function checkCount(count: number, max: number, field: string): number {"));
}

#[test]
fn test_little_endian_flag() {
  let files = render_with(DIS_SCHEMA, |c| c.endianness = Endianness::Little);
  assert!(files[0].contents.contains("const LITTLE_ENDIAN = true;"));
}

#[test]
fn test_class_hierarchy() {
  let code = render(DIS_SCHEMA);
  assert!(code.contains("export abstract class Header {"));
  assert!(code.contains("export class EntityState extends Header {"));
  let header = code.find("export abstract class Header").expect("Header class");
  let entity = code.find("export class EntityState").expect("EntityState class");
  assert!(header < entity, "base class must be emitted before subclasses");
}

#[test]
fn test_field_declarations() {
  let code = render(DIS_SCHEMA);
  assert!(code.contains("  timestamp: bigint = 0n;"));
  assert!(code.contains("  location: Vector3 = new Vector3();"));
  assert!(code.contains("  marking: number[] = new Array<number>(12).fill(0);"));
  assert!(code.contains("  parts: Vector3[] = [];"));
  assert!(code.contains("  pduType: PduType = 0;"));
  assert!(!code.contains("  padding:"));
}

#[test]
fn test_enum_const_object() {
  let code = render(DIS_SCHEMA);
  assert!(code.contains("export type PduType = number;"));
  assert!(code.contains("export const PduType = {\n  ENTITY_STATE: 1,\n  FIRE: 2,\n} as const;"));
}

#[test]
fn test_constructor_sets_initial_values() {
  let code = render(DIS_SCHEMA);
  assert!(code.contains("  constructor() {\n    super();\n    this.pduType = PduType.ENTITY_STATE;\n  }"));
  assert!(code.contains("  constructor() {\n    this.protocolVersion = 7;\n  }"));

  let without = render_with(DIS_SCHEMA, |c| c.emit_initial_values = false);
  assert!(!without[0].contents.contains("constructor() {\n    super();"));
}

#[test]
fn test_marshal_and_unmarshal() {
  let code = render(DIS_SCHEMA);
  assert!(code.contains("    super.marshal(out);"));
  assert!(code.contains("    out.writeUint8(checkCount(this.parts.length, 255, \"partCount\"));"));
  assert!(code.contains("    out.writeZeros(2);"));
  assert!(code.contains("    inp.skip(2);"));
  assert!(code.contains("    for (let i = 0; i < Number(this.partCount); i++) {\n      const item = new Vector3();"));
}

#[test]
fn test_to_bytes_only_on_root_classes() {
  let code = render(DIS_SCHEMA);
  assert_eq!(code.matches("  toBytes(): Uint8Array {").count(), 2, "Header and Vector3 are roots");
}

#[test]
fn test_static_constant() {
  let code = render(DIS_SCHEMA);
  assert!(code.contains("  static readonly VERSION: number = 3;"));
}

#[test]
fn test_hash_terms() {
  let code = render(DIS_SCHEMA);
  assert!(code.contains("    acc = hashCombine(acc, hashBigInt(this.timestamp));"));
  assert!(code.contains("    acc = hashCombine(acc, hashFloat(this.x));"));
  assert!(code.contains("    if (!Object.is(this.x, other.x)) return false;"));
  assert!(code.contains("scratch.setFloat64(0, Number.isNaN(value) ? NaN : value);"));
  assert!(code.contains("    acc = hashCombine(acc, super.hashCode());"));
  assert!(!code.contains("this.partCount | 0"));
}

#[test]
fn test_bitfield_and_text_accessors() {
  let code = render(DIS_SCHEMA);
  assert!(code.contains("  getDamage(): number {\n    return ((this.appearance & 0x18) >>> 3) >>> 0;"));
  assert!(code.contains("  setSmoking(value: number): void {"));
  assert!(code.contains("  getMarkingText(): string {"));
  assert!(code.contains("    encoded.slice(0, 11).forEach((b, i) => {"));
}

#[test]
fn test_alias_exports_type_and_value() {
  let code = render(DIS_SCHEMA);
  assert!(code.contains("export type Position = Vector3;\nexport const Position = Vector3;"));
}

#[test]
fn test_reserved_member_names_are_suffixed() {
  let code = render(
    r#"
classes:
  - name: Odd
    attributes:
      - { name: marshal, kind: { primitive: { type: uint8 } } }
"#,
  );
  assert!(code.contains("  marshal_: number = 0;"));
  assert!(code.contains("    out.writeUint8(this.marshal_);"));
}
