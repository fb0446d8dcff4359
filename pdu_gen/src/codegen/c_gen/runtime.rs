/* Writer/reader runtime shared by every generated C translation unit */

use crate::config::GeneratorConfig;
use std::fmt::{self, Write};

const PRIMITIVES: &[(&str, &str, &str, usize)] = &[
  ("u8", "uint8_t", "uint8_t", 1),
  ("u16", "uint16_t", "uint16_t", 2),
  ("u32", "uint32_t", "uint32_t", 4),
  ("u64", "uint64_t", "uint64_t", 8),
  ("i8", "int8_t", "uint8_t", 1),
  ("i16", "int16_t", "uint16_t", 2),
  ("i32", "int32_t", "uint32_t", 4),
  ("i64", "int64_t", "uint64_t", 8),
  ("f32", "float", "uint32_t", 4),
  ("f64", "double", "uint64_t", 8),
];

pub fn emit_runtime_decls(out: &mut String) -> fmt::Result {
  out.push_str(RUNTIME_DECLS);
  writeln!(out)?;
  for (suffix, ty, _, _) in PRIMITIVES {
    writeln!(out, "int pdu_put_{}( pdu_writer_t * w, {} value );", suffix, ty)?;
    writeln!(out, "int pdu_get_{}( pdu_reader_t * r, {} * value );", suffix, ty)?;
  }
  writeln!(out)?;
  Ok(())
}

pub fn emit_runtime_defs(out: &mut String, config: &GeneratorConfig) -> fmt::Result {
  out.push_str(RUNTIME_DEFS);
  writeln!(out)?;

  /* Byte at index i of an n-byte value */
  let shift = |i: usize, n: usize| -> usize {
    if config.is_big_endian() { (n - 1 - i) * 8 } else { i * 8 }
  };

  for (suffix, ty, bits_ty, width) in PRIMITIVES {
    writeln!(out, "int pdu_put_{}( pdu_writer_t * w, {} value ) {{", suffix, ty)?;
    writeln!(out, "  {} bits;", bits_ty)?;
    writeln!(out, "  uint8_t * dst = pdu_writer_reserve( w, {} );", width)?;
    writeln!(out, "  if( !dst ) return -1;")?;
    writeln!(out, "  memcpy( &bits, &value, sizeof( bits ) );")?;
    for i in 0..*width {
      writeln!(out, "  dst[{}] = (uint8_t)( bits >> {} );", i, shift(i, *width))?;
    }
    writeln!(out, "  return 0;")?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    writeln!(out, "int pdu_get_{}( pdu_reader_t * r, {} * value ) {{", suffix, ty)?;
    writeln!(out, "  {} bits = 0;", bits_ty)?;
    writeln!(out, "  uint8_t const * src = pdu_reader_take( r, {} );", width)?;
    writeln!(out, "  if( !src ) return -1;")?;
    for i in 0..*width {
      writeln!(out, "  bits |= ({})( ({})src[{}] << {} );", bits_ty, bits_ty, i, shift(i, *width))?;
    }
    writeln!(out, "  memcpy( value, &bits, sizeof( bits ) );")?;
    writeln!(out, "  return 0;")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
  }
  Ok(())
}

const RUNTIME_DECLS: &str = r#"/* Growable output buffer. A writer built over caller storage with
   pdu_writer_init never reallocates and fails once full. */
typedef struct {
  uint8_t * buf;
  size_t    len;
  size_t    cap;
  int       owned;
} pdu_writer_t;

typedef struct {
  uint8_t const * buf;
  size_t          len;
  size_t          pos;
} pdu_reader_t;

void pdu_writer_init( pdu_writer_t * w, uint8_t * buf, size_t cap );
void pdu_writer_init_dynamic( pdu_writer_t * w );
void pdu_writer_free( pdu_writer_t * w );
int  pdu_put_zeros( pdu_writer_t * w, size_t count );

void   pdu_reader_init( pdu_reader_t * r, uint8_t const * buf, size_t len );
size_t pdu_reader_remaining( pdu_reader_t const * r );
int    pdu_skip( pdu_reader_t * r, size_t count );

uint64_t pdu_hash_combine( uint64_t acc, uint64_t value );
uint64_t pdu_f32_bits( float value );
uint64_t pdu_f64_bits( double value );
"#;

const RUNTIME_DEFS: &str = r#"void pdu_writer_init( pdu_writer_t * w, uint8_t * buf, size_t cap ) {
  w->buf   = buf;
  w->len   = 0;
  w->cap   = cap;
  w->owned = 0;
}

void pdu_writer_init_dynamic( pdu_writer_t * w ) {
  w->buf   = NULL;
  w->len   = 0;
  w->cap   = 0;
  w->owned = 1;
}

void pdu_writer_free( pdu_writer_t * w ) {
  if( w->owned ) free( w->buf );
  w->buf = NULL;
  w->len = 0;
  w->cap = 0;
}

static uint8_t * pdu_writer_reserve( pdu_writer_t * w, size_t count ) {
  if( w->cap - w->len < count ) {
    if( !w->owned ) return NULL;
    size_t cap = w->cap ? w->cap : 64;
    while( cap - w->len < count ) cap *= 2;
    uint8_t * grown = (uint8_t *)realloc( w->buf, cap );
    if( !grown ) return NULL;
    w->buf = grown;
    w->cap = cap;
  }
  uint8_t * dst = w->buf + w->len;
  w->len += count;
  return dst;
}

int pdu_put_zeros( pdu_writer_t * w, size_t count ) {
  uint8_t * dst = pdu_writer_reserve( w, count );
  if( !dst ) return -1;
  memset( dst, 0, count );
  return 0;
}

void pdu_reader_init( pdu_reader_t * r, uint8_t const * buf, size_t len ) {
  r->buf = buf;
  r->len = len;
  r->pos = 0;
}

size_t pdu_reader_remaining( pdu_reader_t const * r ) {
  return r->len - r->pos;
}

static uint8_t const * pdu_reader_take( pdu_reader_t * r, size_t count ) {
  if( pdu_reader_remaining( r ) < count ) return NULL;
  uint8_t const * src = r->buf + r->pos;
  r->pos += count;
  return src;
}

int pdu_skip( pdu_reader_t * r, size_t count ) {
  return pdu_reader_take( r, count ) ? 0 : -1;
}

uint64_t pdu_hash_combine( uint64_t acc, uint64_t value ) {
  return ( acc * 31u ) ^ value;
}

uint64_t pdu_f32_bits( float value ) {
  uint32_t bits;
  memcpy( &bits, &value, sizeof( bits ) );
  return bits;
}

uint64_t pdu_f64_bits( double value ) {
  uint64_t bits;
  memcpy( &bits, &value, sizeof( bits ) );
  return bits;
}
"#;
