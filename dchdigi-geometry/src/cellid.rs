//! Cell identifier decoding.
//!
//! Cell identifiers pack several indices into one 64-bit word. The layout is
//! given by a descriptor string of comma-separated fields, each either
//! `name:width` (placed right after the previous field) or
//! `name:offset:width`. A negative width marks a signed (two's complement)
//! field.

use crate::{Error, Result};
use dchdigi_core::CellAddress;

/// Field layout of the drift chamber readout.
pub const DEFAULT_DCH_ENCODING: &str = "system:5,superlayer:5,layer:4,nphi:11,stereosign:-2";

/// Maps an opaque cell identifier to the wire hierarchy.
pub trait CellIdDecoder: Send + Sync {
    /// Decodes the (local layer, superlayer, phi cell) triple.
    ///
    /// # Errors
    /// Returns [`Error::InvalidCellId`] if a field is missing or negative.
    fn decode(&self, cell_id: u64) -> Result<CellAddress>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct BitField {
    name: String,
    offset: u32,
    width: u32,
    signed: bool,
}

impl BitField {
    #[inline]
    fn mask(&self) -> u64 {
        let bits = if self.width == 64 {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        };
        bits << self.offset
    }

    #[inline]
    #[allow(clippy::cast_possible_wrap)]
    fn value(&self, id: u64) -> i64 {
        let raw = (id & self.mask()) >> self.offset;
        if self.signed {
            // sign-extend from the field's top bit
            let shift = 64 - self.width;
            ((raw << shift) as i64) >> shift
        } else {
            raw as i64
        }
    }

    fn range(&self) -> (i64, i64) {
        match (self.signed, self.width) {
            (true, 64) => (i64::MIN, i64::MAX),
            (true, w) => (-(1i64 << (w - 1)), (1i64 << (w - 1)) - 1),
            (false, 64) => (0, i64::MAX),
            (false, w) => (0, (1i64 << w) - 1),
        }
    }

    #[allow(clippy::cast_sign_loss)]
    fn encode(&self, value: i64) -> Result<u64> {
        let (min, max) = self.range();
        if value < min || value > max {
            return Err(Error::InvalidCellId(format!(
                "value {value} does not fit field '{}' [{min}, {max}]",
                self.name
            )));
        }
        Ok(((value as u64) << self.offset) & self.mask())
    }
}

/// Decoder for bit-packed cell identifiers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitFieldCoder {
    fields: Vec<BitField>,
}

impl BitFieldCoder {
    /// Parses a field descriptor.
    ///
    /// # Errors
    /// Returns [`Error::InvalidCellId`] for malformed, duplicate or
    /// overlapping fields, or a layout wider than 64 bits.
    pub fn new(descriptor: &str) -> Result<Self> {
        let mut fields: Vec<BitField> = Vec::new();
        let mut next_offset = 0u32;

        for token in descriptor.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let parts: Vec<&str> = token.split(':').map(str::trim).collect();
            let parse = |s: &str| -> Result<i64> {
                s.parse::<i64>().map_err(|_| {
                    Error::InvalidCellId(format!("bad number '{s}' in field '{token}'"))
                })
            };
            let (name, offset, width) = match parts.as_slice() {
                [name, width] => (*name, i64::from(next_offset), parse(width)?),
                [name, offset, width] => (*name, parse(offset)?, parse(width)?),
                _ => {
                    return Err(Error::InvalidCellId(format!(
                        "field '{token}' is not name:width or name:offset:width"
                    )))
                }
            };

            let signed = width < 0;
            let width = width.unsigned_abs();
            if name.is_empty() || width == 0 || offset < 0 || offset as u64 + width > 64 {
                return Err(Error::InvalidCellId(format!(
                    "field '{token}' does not fit in 64 bits"
                )));
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let field = BitField {
                name: name.to_string(),
                offset: offset as u32,
                width: width as u32,
                signed,
            };

            if fields.iter().any(|f| f.name == field.name) {
                return Err(Error::InvalidCellId(format!("duplicate field '{name}'")));
            }
            if let Some(other) = fields.iter().find(|f| f.mask() & field.mask() != 0) {
                return Err(Error::InvalidCellId(format!(
                    "field '{name}' overlaps field '{}'",
                    other.name
                )));
            }

            next_offset = field.offset + field.width;
            fields.push(field);
        }

        if fields.is_empty() {
            return Err(Error::InvalidCellId("empty descriptor".to_string()));
        }
        Ok(Self { fields })
    }

    fn field(&self, name: &str) -> Result<&BitField> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| Error::InvalidCellId(format!("unknown field '{name}'")))
    }

    /// Reads one field.
    ///
    /// # Errors
    /// Returns [`Error::InvalidCellId`] if the field does not exist.
    pub fn get(&self, cell_id: u64, name: &str) -> Result<i64> {
        Ok(self.field(name)?.value(cell_id))
    }

    /// Returns `cell_id` with one field replaced.
    ///
    /// # Errors
    /// Returns [`Error::InvalidCellId`] if the field does not exist or the
    /// value does not fit.
    pub fn set(&self, cell_id: u64, name: &str, value: i64) -> Result<u64> {
        let field = self.field(name)?;
        Ok((cell_id & !field.mask()) | field.encode(value)?)
    }

    /// Field names in descriptor order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Canonical descriptor with explicit offsets.
    #[must_use]
    pub fn descriptor(&self) -> String {
        self.fields
            .iter()
            .map(|f| {
                let width = i64::from(f.width);
                let width = if f.signed { -width } else { width };
                format!("{}:{}:{}", f.name, f.offset, width)
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    fn get_index(&self, cell_id: u64, name: &str) -> Result<u32> {
        let value = self.get(cell_id, name)?;
        u32::try_from(value).map_err(|_| {
            Error::InvalidCellId(format!("field '{name}' of cell {cell_id:#x} is {value}"))
        })
    }
}

impl Default for BitFieldCoder {
    fn default() -> Self {
        Self {
            fields: vec![
                BitField {
                    name: "system".to_string(),
                    offset: 0,
                    width: 5,
                    signed: false,
                },
                BitField {
                    name: "superlayer".to_string(),
                    offset: 5,
                    width: 5,
                    signed: false,
                },
                BitField {
                    name: "layer".to_string(),
                    offset: 10,
                    width: 4,
                    signed: false,
                },
                BitField {
                    name: "nphi".to_string(),
                    offset: 14,
                    width: 11,
                    signed: false,
                },
                BitField {
                    name: "stereosign".to_string(),
                    offset: 25,
                    width: 2,
                    signed: true,
                },
            ],
        }
    }
}

impl CellIdDecoder for BitFieldCoder {
    fn decode(&self, cell_id: u64) -> Result<CellAddress> {
        Ok(CellAddress::new(
            self.get_index(cell_id, "layer")?,
            self.get_index(cell_id, "superlayer")?,
            self.get_index(cell_id, "nphi")?,
        ))
    }
}
