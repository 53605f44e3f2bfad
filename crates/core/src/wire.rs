//! Minimal protobuf wire reader for rendering unknown fields.
//!
//! Known fields are decoded by `prost-reflect`. This module only needs to
//! split raw bytes into `(number, wire type, payload)` records so the
//! printer can show what the schema did not describe.

use std::collections::{BTreeMap, HashSet};

use prost::Message as _;
use prost_reflect::{DynamicMessage, ReflectMessage};

/// Maximum group nesting accepted by [`UnknownFieldSet::parse`], and the
/// depth past which the printer stops expanding nested payloads.
pub(crate) const MAX_GROUP_DEPTH: usize = 100;

const WIRE_VARINT: u8 = 0;
const WIRE_FIXED64: u8 = 1;
const WIRE_LENGTH_DELIMITED: u8 = 2;
const WIRE_START_GROUP: u8 = 3;
const WIRE_END_GROUP: u8 = 4;
const WIRE_FIXED32: u8 = 5;

/// Malformed wire data.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// Input ended in the middle of a record.
    #[error("truncated wire data")]
    Truncated,
    /// A varint ran past ten bytes.
    #[error("malformed varint")]
    MalformedVarint,
    /// Field number zero or beyond the 29-bit limit.
    #[error("invalid field number {0}")]
    InvalidFieldNumber(u64),
    /// Wire types 6 and 7 are not defined.
    #[error("invalid wire type {0}")]
    InvalidWireType(u8),
    /// An end-group tag with no matching start, or with a different number.
    #[error("unexpected end-group tag for field {0}")]
    UnexpectedEndGroup(u32),
    /// A start-group tag never closed.
    #[error("unterminated group for field {0}")]
    UnterminatedGroup(u32),
    /// Group nesting too deep.
    #[error("groups nested too deep")]
    TooDeep,
}

/// All values recorded under one field number, split by wire type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownField {
    /// Varint values.
    pub varint: Vec<u64>,
    /// Fixed 32-bit values.
    pub fixed32: Vec<u32>,
    /// Fixed 64-bit values.
    pub fixed64: Vec<u64>,
    /// Length-delimited payloads.
    pub length_delimited: Vec<Vec<u8>>,
    /// Group contents.
    pub group: Vec<UnknownFieldSet>,
}

impl UnknownField {
    /// True when no value of any wire type is recorded.
    pub fn is_empty(&self) -> bool {
        self.varint.is_empty()
            && self.fixed32.is_empty()
            && self.fixed64.is_empty()
            && self.length_delimited.is_empty()
            && self.group.is_empty()
    }
}

/// Unknown fields grouped by field number, ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownFieldSet {
    fields: BTreeMap<u32, UnknownField>,
}

impl UnknownFieldSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode every record in `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self, WireError> {
        let mut reader = WireReader { buf: bytes, pos: 0 };
        reader.read_set(None, 0)
    }

    /// The fields of `message` that match neither a declared field nor an
    /// extension that is set on it.
    ///
    /// The message is re-encoded and scanned, so unknown fields retained by
    /// the decoder show up here in number order.
    pub fn of_message(message: &DynamicMessage) -> Self {
        let descriptor = message.descriptor();
        let known: HashSet<u32> = message
            .extensions()
            .map(|(extension, _)| extension.number())
            .collect();
        let bytes = message.encode_to_vec();
        let mut set = match Self::parse(&bytes) {
            Ok(set) => set,
            Err(err) => {
                log::debug!(
                    "re-encoded {} could not be scanned: {err}",
                    descriptor.full_name()
                );
                return Self::new();
            }
        };
        set.fields.retain(|number, _| {
            descriptor.get_field(*number).is_none() && !known.contains(number)
        });
        set
    }

    /// True when no unknown field is recorded.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of distinct field numbers.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Values recorded under `number`.
    pub fn get(&self, number: u32) -> Option<&UnknownField> {
        self.fields.get(&number)
    }

    /// Field numbers and their values, ascending.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &UnknownField)> {
        self.fields.iter().map(|(number, field)| (*number, field))
    }

    /// Mutable access to the values of `number`, creating an empty entry.
    pub fn field_mut(&mut self, number: u32) -> &mut UnknownField {
        self.fields.entry(number).or_default()
    }
}

struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl WireReader<'_> {
    fn read_set(&mut self, group: Option<u32>, depth: usize) -> Result<UnknownFieldSet, WireError> {
        let mut set = UnknownFieldSet::new();
        while self.pos < self.buf.len() {
            let tag = self.read_varint()?;
            let wire_type = (tag & 0x7) as u8;
            let raw_number = tag >> 3;
            let number = match u32::try_from(raw_number) {
                Ok(n) if (1..=0x1FFF_FFFF).contains(&n) => n,
                _ => return Err(WireError::InvalidFieldNumber(raw_number)),
            };
            match wire_type {
                WIRE_VARINT => {
                    let value = self.read_varint()?;
                    set.field_mut(number).varint.push(value);
                }
                WIRE_FIXED64 => {
                    let bytes = self.take(8)?;
                    let mut raw = [0u8; 8];
                    raw.copy_from_slice(bytes);
                    set.field_mut(number).fixed64.push(u64::from_le_bytes(raw));
                }
                WIRE_LENGTH_DELIMITED => {
                    let len = self.read_varint()?;
                    let len = usize::try_from(len).map_err(|_| WireError::Truncated)?;
                    let bytes = self.take(len)?.to_vec();
                    set.field_mut(number).length_delimited.push(bytes);
                }
                WIRE_START_GROUP => {
                    if depth >= MAX_GROUP_DEPTH {
                        return Err(WireError::TooDeep);
                    }
                    let nested = self.read_set(Some(number), depth + 1)?;
                    set.field_mut(number).group.push(nested);
                }
                WIRE_END_GROUP => {
                    return if group == Some(number) {
                        Ok(set)
                    } else {
                        Err(WireError::UnexpectedEndGroup(number))
                    };
                }
                WIRE_FIXED32 => {
                    let bytes = self.take(4)?;
                    let mut raw = [0u8; 4];
                    raw.copy_from_slice(bytes);
                    set.field_mut(number).fixed32.push(u32::from_le_bytes(raw));
                }
                other => return Err(WireError::InvalidWireType(other)),
            }
        }
        match group {
            Some(number) => Err(WireError::UnterminatedGroup(number)),
            None => Ok(set),
        }
    }

    fn read_varint(&mut self) -> Result<u64, WireError> {
        let mut value = 0u64;
        for shift in (0..70).step_by(7) {
            let Some(&byte) = self.buf.get(self.pos) else {
                return Err(WireError::Truncated);
            };
            self.pos += 1;
            if shift == 63 && byte > 1 {
                return Err(WireError::MalformedVarint);
            }
            value |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(WireError::MalformedVarint)
    }

    fn take(&mut self, len: usize) -> Result<&[u8], WireError> {
        let end = self.pos.checked_add(len).ok_or(WireError::Truncated)?;
        let bytes = self.buf.get(self.pos..end).ok_or(WireError::Truncated)?;
        self.pos = end;
        Ok(bytes)
    }
}
