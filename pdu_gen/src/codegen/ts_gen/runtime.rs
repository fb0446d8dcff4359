/* Stream runtime emitted at the top of every generated TypeScript module */

use super::helpers::dataview_suffix;
use crate::config::GeneratorConfig;
use crate::schema::PrimitiveType;
use std::fmt::{self, Write};

pub fn emit_runtime(out: &mut String, config: &GeneratorConfig) -> fmt::Result {
  writeln!(out, "const LITTLE_ENDIAN = {};", !config.is_big_endian())?;
  writeln!(out)?;
  out.push_str(RUNTIME_PRELUDE);
  writeln!(out)?;

  writeln!(out, "export class OutputStream {{")?;
  out.push_str(OUTPUT_BODY);
  for prim in PrimitiveType::ALL {
    let suffix = dataview_suffix(prim);
    writeln!(out)?;
    writeln!(out, "  write{}(value: {}): void {{", suffix, prim.ts_type())?;
    if prim.width() == 1 {
      writeln!(out, "    this.view.set{}(this.reserve(1), value);", suffix)?;
    } else {
      writeln!(out, "    this.view.set{}(this.reserve({}), value, LITTLE_ENDIAN);", suffix, prim.width())?;
    }
    writeln!(out, "  }}")?;
  }
  writeln!(out, "}}")?;
  writeln!(out)?;

  writeln!(out, "export class InputStream {{")?;
  out.push_str(INPUT_BODY);
  for prim in PrimitiveType::ALL {
    let suffix = dataview_suffix(prim);
    writeln!(out)?;
    writeln!(out, "  read{}(): {} {{", suffix, prim.ts_type())?;
    if prim.width() == 1 {
      writeln!(out, "    return this.view.get{}(this.take(1));", suffix)?;
    } else {
      writeln!(out, "    return this.view.get{}(this.take({}), LITTLE_ENDIAN);", suffix, prim.width())?;
    }
    writeln!(out, "  }}")?;
  }
  writeln!(out, "}}")?;
  writeln!(out)?;
  Ok(())
}

const RUNTIME_PRELUDE: &str = r#"export class WireError extends Error {
  constructor(message: string) {
    super(message);
    this.name = "WireError";
  }
}

/** Live list length, rejected when the counter field cannot hold it. */
export function checkCount(count: number, max: number, field: string): number {
  if (count > max) {
    throw new WireError(`counter '${field}' cannot hold ${count} elements`);
  }
  return count;
}

export function hashCombine(acc: number, value: number): number {
  return (Math.imul(acc, 31) ^ value) | 0;
}

export function hashBigInt(value: bigint): number {
  return Number(BigInt.asIntN(32, value ^ (value >> 32n)));
}

const scratch = new DataView(new ArrayBuffer(8));

export function hashFloat(value: number): number {
  scratch.setFloat64(0, Number.isNaN(value) ? NaN : value);
  return (scratch.getInt32(0) ^ scratch.getInt32(4)) | 0;
}
"#;

const OUTPUT_BODY: &str = r#"  private buffer: ArrayBuffer;
  private view: DataView;
  private offset = 0;

  constructor(capacity = 64) {
    this.buffer = new ArrayBuffer(Math.max(capacity, 1));
    this.view = new DataView(this.buffer);
  }

  private reserve(count: number): number {
    if (this.offset + count > this.buffer.byteLength) {
      let capacity = this.buffer.byteLength * 2;
      while (capacity < this.offset + count) {
        capacity *= 2;
      }
      const grown = new ArrayBuffer(capacity);
      new Uint8Array(grown).set(new Uint8Array(this.buffer, 0, this.offset));
      this.buffer = grown;
      this.view = new DataView(grown);
    }
    const at = this.offset;
    this.offset += count;
    return at;
  }

  get length(): number {
    return this.offset;
  }

  writeZeros(count: number): void {
    this.reserve(count);
  }

  toBytes(): Uint8Array {
    return new Uint8Array(this.buffer.slice(0, this.offset));
  }
"#;

const INPUT_BODY: &str = r#"  private view: DataView;
  private offset = 0;

  constructor(bytes: Uint8Array) {
    this.view = new DataView(bytes.buffer, bytes.byteOffset, bytes.byteLength);
  }

  get position(): number {
    return this.offset;
  }

  remaining(): number {
    return this.view.byteLength - this.offset;
  }

  private take(count: number): number {
    if (this.remaining() < count) {
      throw new WireError(`truncated input: needed ${count} bytes, ${this.remaining()} remaining`);
    }
    const at = this.offset;
    this.offset += count;
    return at;
  }

  skip(count: number): void {
    this.take(count);
  }
"#;
