//! Protocol Buffers text-format codec.
//!
//! Prints [`DynamicMessage`](prost_reflect::DynamicMessage) trees as the
//! human-readable text format and merges text back into them. Schemas come
//! from `prost-reflect` descriptors; this crate re-exports it as
//! [`prost_reflect`].
//!
//! The main entry points are [`Printer`] / [`print_to_string`] for output
//! and [`Parser`] / [`parse`] / [`merge`] for input. The building blocks
//! ([`escape`], [`numeric`], [`Tokenizer`], [`wire`]) are public as well.
//!
//! ```no_run
//! # fn demo(descriptor: txtpb_core::prost_reflect::MessageDescriptor) -> Result<(), txtpb_core::ParseError> {
//! let message = txtpb_core::parse("name: \"widget\" id: 7", descriptor)?;
//! let text = txtpb_core::short_debug_string(&message);
//! assert_eq!(text, "name: \"widget\" id: 7");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// Parse errors and source locations.
pub mod error;
/// Byte and text escaping for quoted literals.
pub mod escape;
/// Text format grammar: tokenizer, parser, printer, and location trees.
pub mod grammar;
/// Radix-aware, range-checked number parsing.
pub mod numeric;
/// Type and extension registries.
pub mod registry;
/// Wire-level reader for unknown fields.
pub mod wire;

pub use prost_reflect;

// ── Convenience re-exports ──────────────────────────────────────────────────
// Flat imports for the most common entry points. The full module paths
// remain available for less common types.

// Parser
pub use grammar::parser::{
    DEFAULT_RECURSION_LIMIT, Parser, ParserBuilder, SingularOverwritePolicy, merge, parse,
};

// Printer
pub use grammar::printer::{OutputMode, Printer, print_to_string, short_debug_string};

// Tokenizer
pub use grammar::tokenizer::Tokenizer;

// Location trees
pub use grammar::dump::to_pretty_json;
pub use grammar::location::ParseInfoTree;

// Errors
pub use error::{Location, ParseError, ParseErrorKind};
pub use escape::EscapeError;
pub use numeric::NumberFormatError;
pub use registry::{
    ExtensionRegistry, ExtensionRegistryBuilder, InvalidTypeUrl, TypeRegistry,
    TypeRegistryBuilder,
};
pub use wire::{UnknownField, UnknownFieldSet, WireError};
