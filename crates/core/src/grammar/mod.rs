/// JSON serialization helpers for location trees.
pub mod dump;
/// Closed view over declared fields and extensions.
mod field;
/// Source locations recorded while parsing.
pub mod location;
/// Text-format parser: merges text into a message.
pub mod parser;
/// Text-format printer: renders a message as text.
pub mod printer;
/// Text-format tokenizer with position tracking.
pub mod tokenizer;
