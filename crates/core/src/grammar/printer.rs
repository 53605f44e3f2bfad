//! Text-format printer: renders a `DynamicMessage` as text.
//!
//! Set fields print in declaration order, then extensions by field number,
//! then unknown wire-level fields. Message values nest in `{ ... }` with
//! two spaces of indentation per level in multi-line mode.

use prost_reflect::{
    DynamicMessage, FieldDescriptor, Kind, MessageDescriptor, ReflectMessage, Value,
};
use serde::{Deserialize, Serialize};

use super::field::{FieldRef, compare_map_keys, map_key_value};
use super::parser::ANY_FULL_NAME;
use crate::escape::{escape_bytes, escape_text, escape_text_preserving_utf8};
use crate::registry::{TypeRegistry, is_message_set_extension};
use crate::wire::{MAX_GROUP_DEPTH, UnknownField, UnknownFieldSet};

// ── Configuration ───────────────────────────────────────────────────────

/// Line layout of printed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputMode {
    /// One field per line, nested bodies indented by two spaces.
    #[default]
    MultiLine,
    /// Everything on one line, fields separated by single spaces.
    SingleLine,
}

/// Immutable, reusable printer configuration.
#[derive(Debug, Clone)]
pub struct Printer {
    escape_non_ascii: bool,
    type_registry: TypeRegistry,
}

impl Default for Printer {
    fn default() -> Self {
        Self {
            escape_non_ascii: true,
            type_registry: TypeRegistry::empty(),
        }
    }
}

// ── Public API ──────────────────────────────────────────────────────────

impl Printer {
    /// A printer that escapes non-ASCII text and expands no `Any`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether string fields escape non-ASCII characters as octal bytes.
    pub fn escaping_non_ascii(mut self, escape: bool) -> Self {
        self.escape_non_ascii = escape;
        self
    }

    /// Registry used to expand `Any` payloads.
    pub fn using_type_registry(mut self, registry: TypeRegistry) -> Self {
        self.type_registry = registry;
        self
    }

    /// Whether non-ASCII characters are escaped.
    pub fn escape_non_ascii(&self) -> bool {
        self.escape_non_ascii
    }

    /// The `Any` type registry.
    pub fn type_registry(&self) -> &TypeRegistry {
        &self.type_registry
    }

    /// Append the text form of `message` to `out`.
    pub fn print(&self, message: &DynamicMessage, mode: OutputMode, out: &mut String) {
        let mut generator = TextGenerator::new(out, mode);
        self.print_message(message, &mut generator);
    }

    /// The text form of `message`.
    pub fn print_to_string(&self, message: &DynamicMessage, mode: OutputMode) -> String {
        let mut out = String::new();
        self.print(message, mode, &mut out);
        out
    }

    /// The single-line text form of `message`.
    pub fn short_debug_string(&self, message: &DynamicMessage) -> String {
        self.print_to_string(message, OutputMode::SingleLine)
    }

    /// Multi-line text for one field and its value.
    ///
    /// `value` is a list or map for repeated fields.
    pub fn print_field_to_string(&self, field: &FieldDescriptor, value: &Value) -> String {
        let mut out = String::new();
        let mut generator = TextGenerator::new(&mut out, OutputMode::MultiLine);
        self.print_field(&FieldRef::Field(field.clone()), value, &mut generator);
        out
    }

    /// Text for raw unknown fields.
    pub fn print_unknown_fields(&self, fields: &UnknownFieldSet, mode: OutputMode) -> String {
        let mut out = String::new();
        let mut generator = TextGenerator::new(&mut out, mode);
        print_unknown_fields(fields, &mut generator, 0);
        out
    }

    // ── Messages ────────────────────────────────────────────────────────

    fn print_message(&self, message: &DynamicMessage, generator: &mut TextGenerator<'_>) {
        if message.descriptor().full_name() == ANY_FULL_NAME && self.print_any(message, generator) {
            return;
        }

        let descriptor = message.descriptor();
        let mut fields: Vec<FieldRef> = descriptor
            .fields()
            .filter(|field| message.has_field(field))
            .map(FieldRef::Field)
            .collect();
        let mut extensions: Vec<FieldRef> = message
            .extensions()
            .map(|(extension, _)| FieldRef::Extension(extension))
            .collect();
        extensions.sort_by_key(FieldRef::number);
        fields.extend(extensions);

        for field in &fields {
            let value = field.get(message);
            self.print_field(field, &value, generator);
        }
        print_unknown_fields(&UnknownFieldSet::of_message(message), generator, 0);
    }

    /// `[type_url] { ... }` when the payload resolves and decodes.
    fn print_any(&self, message: &DynamicMessage, generator: &mut TextGenerator<'_>) -> bool {
        let descriptor = message.descriptor();
        let (Some(url_field), Some(value_field)) = (descriptor.get_field(1), descriptor.get_field(2))
        else {
            return false;
        };
        let Value::String(type_url) = message.get_field(&url_field).into_owned() else {
            return false;
        };
        let Value::Bytes(payload) = message.get_field(&value_field).into_owned() else {
            return false;
        };
        if type_url.is_empty() {
            return false;
        }
        let content_type = match self.type_registry.descriptor_for_type_url(&type_url) {
            Ok(Some(content_type)) => content_type.clone(),
            Ok(None) => {
                log::debug!("Any type {type_url} is not registered; printing raw fields");
                return false;
            }
            Err(err) => {
                log::debug!("{err}; printing raw fields");
                return false;
            }
        };
        let content = match DynamicMessage::decode(content_type, payload) {
            Ok(content) => content,
            Err(err) => {
                log::debug!("Any payload of type {type_url} does not decode: {err}");
                return false;
            }
        };

        generator.print("[");
        generator.print(&type_url);
        generator.print("] {");
        generator.eol();
        generator.indent();
        self.print_message(&content, generator);
        generator.outdent();
        generator.print("}");
        generator.eol();
        true
    }

    // ── Fields ──────────────────────────────────────────────────────────

    fn print_field(&self, field: &FieldRef, value: &Value, generator: &mut TextGenerator<'_>) {
        match value {
            Value::Map(map) if field.is_map() => {
                let Kind::Message(entry_type) = field.kind() else {
                    return;
                };
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_by(|(a, _), (b, _)| compare_map_keys(a, b));
                for (key, value) in entries {
                    self.print_field_name(field, generator);
                    generator.print(" {");
                    generator.eol();
                    generator.indent();
                    self.print_map_entry(&entry_type, &map_key_value(key), value, generator);
                    generator.outdent();
                    generator.print("}");
                    generator.eol();
                }
            }
            Value::List(items) if field.is_list() => {
                for item in items {
                    self.print_single_field(field, item, generator);
                }
            }
            _ => self.print_single_field(field, value, generator),
        }
    }

    fn print_map_entry(
        &self,
        entry_type: &MessageDescriptor,
        key: &Value,
        value: &Value,
        generator: &mut TextGenerator<'_>,
    ) {
        let key_field = FieldRef::Field(entry_type.map_entry_key_field());
        let value_field = FieldRef::Field(entry_type.map_entry_value_field());
        self.print_single_field(&key_field, key, generator);
        self.print_single_field(&value_field, value, generator);
    }

    fn print_single_field(&self, field: &FieldRef, value: &Value, generator: &mut TextGenerator<'_>) {
        self.print_field_name(field, generator);
        let kind = field.kind();
        if matches!(kind, Kind::Message(_)) {
            generator.print(" {");
            generator.eol();
            generator.indent();
        } else {
            generator.print(": ");
        }
        self.print_field_value(&kind, value, generator);
        if matches!(kind, Kind::Message(_)) {
            generator.outdent();
            generator.print("}");
        }
        generator.eol();
    }

    fn print_field_name(&self, field: &FieldRef, generator: &mut TextGenerator<'_>) {
        match field {
            FieldRef::Extension(extension) => {
                generator.print("[");
                match extension.kind() {
                    Kind::Message(message) if is_message_set_extension(extension) => {
                        generator.print(message.full_name());
                    }
                    _ => generator.print(extension.full_name()),
                }
                generator.print("]");
            }
            FieldRef::Field(descriptor) => match descriptor.kind() {
                Kind::Message(group) if descriptor.is_group() => generator.print(group.name()),
                _ => generator.print(descriptor.name()),
            },
        }
    }

    fn print_field_value(&self, kind: &Kind, value: &Value, generator: &mut TextGenerator<'_>) {
        match value {
            Value::Bool(b) => generator.print(if *b { "true" } else { "false" }),
            Value::I32(n) => generator.print(&n.to_string()),
            Value::I64(n) => generator.print(&n.to_string()),
            Value::U32(n) => generator.print(&n.to_string()),
            Value::U64(n) => generator.print(&n.to_string()),
            Value::F32(n) => generator.print(&format_float(f64::from(*n), format!("{n:?}"))),
            Value::F64(n) => generator.print(&format_float(*n, format!("{n:?}"))),
            Value::String(s) => {
                let escaped = if self.escape_non_ascii {
                    escape_text(s)
                } else {
                    escape_text_preserving_utf8(s)
                };
                generator.print("\"");
                generator.print(&escaped);
                generator.print("\"");
            }
            Value::Bytes(bytes) => {
                generator.print("\"");
                generator.print(&escape_bytes(bytes));
                generator.print("\"");
            }
            Value::EnumNumber(number) => {
                let name = match kind {
                    Kind::Enum(enum_type) => enum_type.get_value(*number),
                    _ => None,
                };
                match name {
                    Some(value) => generator.print(value.name()),
                    None => generator.print(&number.to_string()),
                }
            }
            Value::Message(message) => self.print_message(message, generator),
            // Lists and maps only appear nested in a field and are
            // expanded by `print_field`.
            Value::List(_) | Value::Map(_) => {}
        }
    }
}

/// Multi-line text form of `message` with the default printer.
pub fn print_to_string(message: &DynamicMessage) -> String {
    Printer::default().print_to_string(message, OutputMode::MultiLine)
}

/// Single-line text form of `message` with the default printer.
pub fn short_debug_string(message: &DynamicMessage) -> String {
    Printer::default().short_debug_string(message)
}

// ── Unknown fields ──────────────────────────────────────────────────────

fn print_unknown_fields(fields: &UnknownFieldSet, generator: &mut TextGenerator<'_>, depth: usize) {
    for (number, field) in fields.iter() {
        print_unknown_field(number, field, generator, depth);
    }
}

fn print_unknown_field(
    number: u32,
    field: &UnknownField,
    generator: &mut TextGenerator<'_>,
    depth: usize,
) {
    let number = number.to_string();
    for value in &field.varint {
        print_unknown_scalar(&number, &value.to_string(), generator);
    }
    for value in &field.fixed32 {
        print_unknown_scalar(&number, &format!("0x{value:08x}"), generator);
    }
    for value in &field.fixed64 {
        print_unknown_scalar(&number, &format!("0x{value:016x}"), generator);
    }
    for bytes in &field.length_delimited {
        generator.print(&number);
        generator.print(": ");
        // Try the payload as an embedded message first. Past the nesting
        // limit it stays a string.
        let nested = if depth < MAX_GROUP_DEPTH {
            UnknownFieldSet::parse(bytes).ok()
        } else {
            None
        };
        match nested {
            Some(nested) => {
                generator.print("{");
                generator.eol();
                generator.indent();
                print_unknown_fields(&nested, generator, depth + 1);
                generator.outdent();
                generator.print("}");
            }
            None => {
                generator.print("\"");
                generator.print(&escape_bytes(bytes));
                generator.print("\"");
            }
        }
        generator.eol();
    }
    for group in &field.group {
        generator.print(&number);
        generator.print(" {");
        generator.eol();
        generator.indent();
        print_unknown_fields(group, generator, depth + 1);
        generator.outdent();
        generator.print("}");
        generator.eol();
    }
}

fn print_unknown_scalar(number: &str, value: &str, generator: &mut TextGenerator<'_>) {
    generator.print(number);
    generator.print(": ");
    generator.print(value);
    generator.eol();
}

/// Shortest round-trip form; non-finite values as `inf`, `-inf`, `nan`.
fn format_float(value: f64, debug: String) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value == f64::INFINITY {
        "inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        debug
    }
}

// ── Output sink ─────────────────────────────────────────────────────────

/// Writes tokens with indentation (multi-line) or single spaces (single-line).
struct TextGenerator<'o> {
    out: &'o mut String,
    indent: usize,
    at_start_of_line: bool,
    single_line: bool,
}

impl<'o> TextGenerator<'o> {
    fn new(out: &'o mut String, mode: OutputMode) -> Self {
        Self {
            out,
            indent: 0,
            at_start_of_line: false,
            single_line: mode == OutputMode::SingleLine,
        }
    }

    fn indent(&mut self) {
        self.indent += 2;
    }

    fn outdent(&mut self) {
        self.indent = self.indent.saturating_sub(2);
    }

    fn print(&mut self, text: &str) {
        if self.at_start_of_line {
            self.at_start_of_line = false;
            if self.single_line {
                self.out.push(' ');
            } else {
                self.out.extend(std::iter::repeat_n(' ', self.indent));
            }
        }
        self.out.push_str(text);
    }

    fn eol(&mut self) {
        if !self.single_line {
            self.out.push('\n');
        }
        self.at_start_of_line = true;
    }
}
