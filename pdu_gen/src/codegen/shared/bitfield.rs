/* Bit-packed sub-field accessors */

use super::plan::BitfieldAccessor;
use crate::schema::{ClassDecl, FieldKind};

/// Position of the lowest set bit of `mask`.
pub fn shift_for(mask: u64) -> u32 {
    mask.trailing_zeros()
}

/// `(host & mask) >> shift`
pub fn extract(host: u64, mask: u64) -> u64 {
    (host & mask) >> shift_for(mask)
}

/// `(host & !mask) | ((value << shift) & mask)`. Bits outside `mask` are
/// left untouched and excess high bits of `value` are dropped.
pub fn insert(host: u64, mask: u64, value: u64) -> u64 {
    let shifted = value.checked_shl(shift_for(mask)).unwrap_or(0);
    (host & !mask) | (shifted & mask)
}

pub fn accessors(class: &ClassDecl) -> Vec<BitfieldAccessor> {
    let mut out = Vec::new();
    for attr in &class.attributes {
        let FieldKind::Primitive { prim } = &attr.kind else {
            continue;
        };
        for bitfield in &attr.bitfields {
            out.push(BitfieldAccessor {
                host: attr.name.clone(),
                host_prim: *prim,
                name: bitfield.name.clone(),
                mask: bitfield.mask,
                shift: bitfield.shift,
                width_bits: bitfield.width_bits(),
                comment: bitfield.comment.clone(),
            });
        }
    }
    out
}
