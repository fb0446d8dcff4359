/* Byte-level reader and writer for the configured byte order */

use crate::value::Scalar;
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use pdu_gen::schema::PrimitiveType;
use pdu_types::Endianness;

/* Bytes needed versus bytes left when a read runs off the end */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortfall {
    pub needed: usize,
    pub remaining: usize,
}

pub struct WireWriter {
    buf: Vec<u8>,
    order: Endianness,
}

impl WireWriter {
    pub fn new(order: Endianness) -> Self {
        Self {
            buf: Vec::new(),
            order,
        }
    }

    pub fn put(&mut self, value: &Scalar) {
        let width = value.prim().width();
        let mut scratch = [0u8; 8];
        match self.order {
            Endianness::Big => encode::<BigEndian>(&mut scratch[..width], value),
            Endianness::Little => encode::<LittleEndian>(&mut scratch[..width], value),
        }
        self.buf.extend_from_slice(&scratch[..width]);
    }

    pub fn put_zeros(&mut self, count: usize) {
        self.buf.resize(self.buf.len() + count, 0);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

fn encode<B: ByteOrder>(out: &mut [u8], value: &Scalar) {
    match *value {
        Scalar::U8(v) => out[0] = v,
        Scalar::I8(v) => out[0] = v as u8,
        Scalar::U16(v) => B::write_u16(out, v),
        Scalar::I16(v) => B::write_i16(out, v),
        Scalar::U32(v) => B::write_u32(out, v),
        Scalar::I32(v) => B::write_i32(out, v),
        Scalar::U64(v) => B::write_u64(out, v),
        Scalar::I64(v) => B::write_i64(out, v),
        Scalar::F32(v) => B::write_f32(out, v),
        Scalar::F64(v) => B::write_f64(out, v),
    }
}

pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
    order: Endianness,
}

impl<'a> WireReader<'a> {
    pub fn new(data: &'a [u8], order: Endianness) -> Self {
        Self { data, pos: 0, order }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8], Shortfall> {
        if self.remaining() < count {
            return Err(Shortfall {
                needed: count,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }

    pub fn read(&mut self, prim: PrimitiveType) -> Result<Scalar, Shortfall> {
        let bytes = self.take(prim.width())?;
        Ok(match self.order {
            Endianness::Big => decode::<BigEndian>(bytes, prim),
            Endianness::Little => decode::<LittleEndian>(bytes, prim),
        })
    }

    pub fn skip(&mut self, count: usize) -> Result<(), Shortfall> {
        self.take(count).map(|_| ())
    }
}

fn decode<B: ByteOrder>(bytes: &[u8], prim: PrimitiveType) -> Scalar {
    match prim {
        PrimitiveType::Uint8 => Scalar::U8(bytes[0]),
        PrimitiveType::Int8 => Scalar::I8(bytes[0] as i8),
        PrimitiveType::Uint16 => Scalar::U16(B::read_u16(bytes)),
        PrimitiveType::Int16 => Scalar::I16(B::read_i16(bytes)),
        PrimitiveType::Uint32 => Scalar::U32(B::read_u32(bytes)),
        PrimitiveType::Int32 => Scalar::I32(B::read_i32(bytes)),
        PrimitiveType::Uint64 => Scalar::U64(B::read_u64(bytes)),
        PrimitiveType::Int64 => Scalar::I64(B::read_i64(bytes)),
        PrimitiveType::Float32 => Scalar::F32(B::read_f32(bytes)),
        PrimitiveType::Float64 => Scalar::F64(B::read_f64(bytes)),
    }
}
