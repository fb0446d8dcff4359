/* C Code Generation Tests
 *
 * Header and source text produced by the C backend for the shared DIS
 * fixture.
 */

use pdu_gen::codegen::{GeneratedFile, Language, generate};
use pdu_gen::config::GeneratorConfig;
use pdu_gen::schema::{CrossReferenceResolver, SchemaModel};
use pdu_types::{AliasTable, Endianness, SchemaFile};
use std::fs;
use std::path::Path;
use std::process::Command;

const DIS_SCHEMA: &str = include_str!("fixtures/dis.yaml");

fn render_with(yaml: &str, adjust: impl FnOnce(&mut GeneratorConfig)) -> Vec<GeneratedFile> {
  let file: SchemaFile = serde_yml::from_str(yaml).expect("schema yaml parses");
  let model = SchemaModel::from_schema(&file).expect("schema is valid");
  let (schema, _) = CrossReferenceResolver::new(&AliasTable::new()).resolve(model);
  let mut config = GeneratorConfig::from_options(&file.options, schema.package());
  adjust(&mut config);
  generate(&schema, &config, Language::C).expect("c generation succeeds")
}

/* Returns (header, source) */
fn render(yaml: &str) -> (String, String) {
  let files = render_with(yaml, |_| {});
  assert_eq!(files.len(), 2);
  (files[0].contents.clone(), files[1].contents.clone())
}

#[test]
fn test_header_and_source_pair() {
  let files = render_with(DIS_SCHEMA, |_| {});
  assert_eq!(files[0].path, Path::new("v7.h"));
  assert_eq!(files[1].path, Path::new("v7.c"));
  assert!(files[0].contents.contains("#ifndef PDU_DIS_V7_H"));
  assert!(files[0].contents.trim_end().ends_with("#endif /* PDU_DIS_V7_H */"));
  assert!(files[1].contents.contains("#include \"v7.h\""));
}

#[test]
fn test_structs_follow_definition_order() {
  let (header, _) = render(DIS_SCHEMA);
  let vector = header.find("struct Vector3 {").expect("Vector3 struct");
  let entity = header.find("struct EntityState {").expect("EntityState struct");
  let base = header.find("struct Header {").expect("Header struct");
  assert!(vector < entity, "embedded class must be defined first");
  assert!(base < entity, "parent must be defined first");
  assert!(header.contains("typedef struct EntityState EntityState_t;"));
}

#[test]
fn test_struct_members() {
  let (header, _) = render(DIS_SCHEMA);
  assert!(header.contains("struct EntityState {\n  Header_t parent;\n  Vector3_t location;"));
  assert!(header.contains("  uint8_t marking[12];"));
  assert!(header.contains("  Vector3_t * parts;\n  size_t parts_len;"));
  assert!(header.contains("/* Abstract: only decoded as the parent view of a subclass */"));
}

#[test]
fn test_enum_typedef_and_constants() {
  let (header, source) = render(DIS_SCHEMA);
  assert!(header.contains("typedef uint8_t PduType_t;"));
  assert!(header.contains("#define PduType_ENTITY_STATE ((PduType_t)((uint8_t)1u))"));
  assert!(header.contains("char const * PduType_name( PduType_t value );"));
  assert!(source.contains("  if( value == PduType_FIRE ) return \"FIRE\";"));
}

#[test]
fn test_alias_maps_type_and_functions() {
  let (header, _) = render(DIS_SCHEMA);
  assert!(header.contains("typedef Vector3_t Position_t;"));
  assert!(header.contains("#define Position_marshal Vector3_marshal"));
  assert!(header.contains("#define Position_dump Vector3_dump"));
  assert!(!header.contains("void   Position_init"));
}

#[test]
fn test_init_applies_parent_then_initial_values() {
  let (_, source) = render(DIS_SCHEMA);
  assert!(source.contains("  Header_init( &self->parent );\n  Vector3_init( &self->location );"));
  assert!(source.contains("  self->parent.pduType = PduType_ENTITY_STATE;"));
  assert!(source.contains("  self->protocolVersion = ((uint8_t)7u);"));
}

#[test]
fn test_marshal_writes_live_count() {
  let (_, source) = render(DIS_SCHEMA);
  assert!(source.contains("  if( Header_marshal( &self->parent, w ) ) return -1;"));
  assert!(source.contains("  if( (uint64_t)self->parts_len > (uint64_t)UINT8_MAX ) return -1;"));
  assert!(source.contains("  if( pdu_put_u8( w, (uint8_t)self->parts_len ) ) return -1;"));
  assert!(source.contains("  if( pdu_put_zeros( w, 2 ) ) return -1;"));
}

#[test]
fn test_unmarshal_bounds_counted_list() {
  let (_, source) = render(DIS_SCHEMA);
  assert!(source.contains("  if( pdu_skip( r, 2 ) ) return -1;"));
  assert!(source.contains("      if( n > pdu_reader_remaining( r ) ) return -1;\n      self->parts = (Vector3_t *)calloc("));
  assert!(source.contains("      self->parts = (Vector3_t *)calloc( n, sizeof( Vector3_t ) );"));
  assert!(source.contains("        Vector3_init( &self->parts[i] );"));
}

#[test]
fn test_static_value_is_extern_constant() {
  let (header, source) = render(DIS_SCHEMA);
  assert!(header.contains("extern uint16_t const EntityState_VERSION;"));
  assert!(source.contains("uint16_t const EntityState_VERSION = ((uint16_t)3u);"));
}

#[test]
fn test_bitfield_accessors_use_wide_arithmetic() {
  let (header, source) = render(DIS_SCHEMA);
  assert!(header.contains("uint32_t EntityState_get_damage( EntityState_t const * self );"));
  assert!(source.contains("  return (uint32_t)( ( (uint64_t)(uint32_t)self->appearance & UINT64_C(0x18) ) >> 3 );"));
}

#[test]
fn test_text_accessors() {
  let (header, source) = render(DIS_SCHEMA);
  assert!(header.contains("size_t EntityState_get_marking_text( EntityState_t const * self, char * buf, size_t cap );"));
  assert!(header.contains("int    EntityState_set_marking_text( EntityState_t * self, char const * text );"));
  assert!(source.contains("  if( len > 11 ) len = 11;"));
}

#[test]
fn test_optional_functions_follow_config() {
  let files = render_with(DIS_SCHEMA, |c| {
    c.emit_equality = false;
    c.emit_dump = false;
    c.emit_bitfield_accessors = false;
  });
  let header = &files[0].contents;
  assert!(!header.contains("EntityState_equals"));
  assert!(!header.contains("EntityState_hash"));
  assert!(!header.contains("EntityState_dump"));
  assert!(!header.contains("EntityState_get_damage"));
  assert!(header.contains("EntityState_get_marking_text"));
}

#[test]
fn test_little_endian_runtime() {
  let (_, big) = render(DIS_SCHEMA);
  let little = render_with(DIS_SCHEMA, |c| c.endianness = Endianness::Little);
  assert_ne!(big, little[1].contents);
}

#[test]
fn test_empty_class_gets_placeholder_member() {
  let (header, source) = render(
    r#"
classes:
  - name: Empty
    attributes: []
"#,
  );
  assert!(header.contains("struct Empty {\n  uint8_t unused_;\n};"));
  assert!(source.contains("int Empty_marshal( Empty_t const * self, pdu_writer_t * w ) {\n  (void)self;\n  (void)w;"));
}

#[test]
fn test_keyword_fields_are_suffixed() {
  let (header, _) = render(
    r#"
classes:
  - name: Odd
    attributes:
      - { name: default, kind: { primitive: { type: int16 } } }
"#,
  );
  assert!(header.contains("  int16_t default_;"));
}

#[test]
fn test_float_equality_compares_bit_patterns() {
  let (_, source) = render(ROUND_TRIP_SCHEMA);
  assert!(source.contains("  if( pdu_f64_bits( a->x ) != pdu_f64_bits( b->x ) ) return 0;"));
  assert!(source.contains("    if( pdu_f32_bits( a->trace[i] ) != pdu_f32_bits( b->trace[i] ) ) return 0;"));
}

const ROUND_TRIP_SCHEMA: &str = r#"
package: wire
classes:
  - name: Header
    attributes:
      - { name: pad, kind: pad16 }
  - name: Foo
    parent: Header
    attributes:
      - { name: count, kind: { primitive: { type: uint16 } } }
      - { name: items, kind: { dynamic-list: { element: { primitive: uint8 }, counter: count } } }
  - name: Reading
    attributes:
      - { name: x, kind: { primitive: { type: float64 } } }
      - { name: trace, kind: { fixed-list: { element: { primitive: float32 }, length: 2 } } }
"#;

const ROUND_TRIP_MAIN: &str = r#"#include <assert.h>
#include <stdlib.h>
#include <string.h>
#include "wire.h"

int main( void ) {
  static uint8_t const expected[7] = { 0, 0, 0, 3, 1, 2, 3 };
  Foo_t foo;
  Foo_init( &foo );
  foo.count = 9;
  foo.items = (uint8_t *)malloc( 3 );
  memcpy( foo.items, expected + 4, 3 );
  foo.items_len = 3;

  pdu_writer_t w;
  pdu_writer_init_dynamic( &w );
  assert( Foo_marshal( &foo, &w ) == 0 );
  assert( w.len == 7 );
  assert( Foo_marshalled_size( &foo ) == w.len );
  assert( memcmp( w.buf, expected, 7 ) == 0 );

  Foo_t back;
  Foo_init( &back );
  pdu_reader_t r;
  pdu_reader_init( &r, w.buf, w.len );
  assert( Foo_unmarshal( &back, &r ) == 0 );
  assert( back.count == 3 && back.items_len == 3 );
  assert( Foo_equals( &foo, &back ) );
  assert( Foo_hash( &foo ) == Foo_hash( &back ) );

  Reading_t a, b;
  Reading_init( &a );
  Reading_init( &b );
  b.x = -0.0;
  assert( !Reading_equals( &a, &b ) );
  assert( Reading_hash( &a ) != Reading_hash( &b ) );

  printf( "%zu\n", w.len );
  Foo_free( &foo );
  Foo_free( &back );
  pdu_writer_free( &w );
  return 0;
}
"#;

#[test]
fn test_generated_source_round_trips() {
  let files = render_with(ROUND_TRIP_SCHEMA, |_| {});
  let dir = tempfile::tempdir().expect("scratch dir");
  for file in &files {
    fs::write(dir.path().join(&file.path), &file.contents).expect("write generated file");
  }
  fs::write(dir.path().join("main.c"), ROUND_TRIP_MAIN).expect("write main.c");

  let binary = dir.path().join("round_trip");
  let build = Command::new("gcc")
    .arg("-std=c11")
    .arg("-Wall")
    .arg("-o")
    .arg(&binary)
    .arg(dir.path().join("main.c"))
    .arg(dir.path().join("wire.c"))
    .output();
  let build = match build {
    Ok(output) => output,
    Err(_) => {
      println!("WARNING: C compiler (gcc) not found. Skipping generated code check.");
      return;
    }
  };
  assert!(
    build.status.success(),
    "generated C does not compile:\n{}",
    String::from_utf8_lossy(&build.stderr)
  );

  let run = Command::new(&binary).output().expect("run compiled binary");
  assert!(run.status.success(), "round trip failed:\n{}", String::from_utf8_lossy(&run.stderr));
  assert_eq!(String::from_utf8_lossy(&run.stdout).trim(), "7");
}
