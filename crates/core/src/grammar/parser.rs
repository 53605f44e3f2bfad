//! Text-format parser: merges text into a `DynamicMessage`.
//!
//! Grammar (informal):
//!
//! ```text
//! message := field*
//! field   := (ident | '[' extname ']') ':'? value (';' | ',')?
//! value   := scalar | '{' field* '}' | '<' field* '>' | '[' value (',' value)* ']'
//! ```
//!
//! Syntax errors, bad literals and overwrite violations abort the parse
//! immediately. Unknown field and extension names are collected and
//! judged once at the end of a top-level merge, so a caller can choose to
//! tolerate them.

use prost::Message as _;
use prost_reflect::{
    DynamicMessage, EnumDescriptor, Kind, MessageDescriptor, ReflectMessage, Syntax, Value,
};
use serde::{Deserialize, Serialize};

use super::field::{FieldRef, map_key_of};
use super::location::ParseInfoTree;
use super::tokenizer::Tokenizer;
use crate::error::{Location, ParseError, ParseErrorKind};
use crate::registry::{ExtensionRegistry, TypeRegistry};

/// Full name of the well-known `Any` wrapper.
pub(crate) const ANY_FULL_NAME: &str = "google.protobuf.Any";

/// Default maximum message nesting depth.
pub const DEFAULT_RECURSION_LIMIT: usize = 100;

// ─── Configuration ──────────────────────────────────────────────────────────

/// What to do when a non-repeated field is assigned more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SingularOverwritePolicy {
    /// The last value wins; singular message values merge.
    #[default]
    Allow,
    /// Reassigning a set field, or a second member of a oneof, is an error.
    Forbid,
}

/// Immutable, reusable text-format parser configuration.
///
/// Build one with [`Parser::builder`]; [`Parser::default`] rejects unknown
/// names, allows overwrites and resolves no `Any` types or extensions.
#[derive(Debug, Clone)]
pub struct Parser {
    type_registry: TypeRegistry,
    extension_registry: ExtensionRegistry,
    allow_unknown_fields: bool,
    allow_unknown_enum_values: bool,
    allow_unknown_extensions: bool,
    singular_overwrite_policy: SingularOverwritePolicy,
    recursion_limit: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`Parser`].
#[derive(Debug, Clone)]
pub struct ParserBuilder {
    type_registry: TypeRegistry,
    extension_registry: ExtensionRegistry,
    allow_unknown_fields: bool,
    allow_unknown_enum_values: bool,
    allow_unknown_extensions: bool,
    singular_overwrite_policy: SingularOverwritePolicy,
    recursion_limit: usize,
}

impl Default for ParserBuilder {
    fn default() -> Self {
        Self {
            type_registry: TypeRegistry::empty(),
            extension_registry: ExtensionRegistry::empty(),
            allow_unknown_fields: false,
            allow_unknown_enum_values: false,
            allow_unknown_extensions: false,
            singular_overwrite_policy: SingularOverwritePolicy::default(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

impl ParserBuilder {
    /// Registry used to resolve `[type_url] { ... }` inside `Any`.
    pub fn type_registry(mut self, registry: TypeRegistry) -> Self {
        self.type_registry = registry;
        self
    }

    /// Registry used to resolve `[extension.name]`.
    pub fn extension_registry(mut self, registry: ExtensionRegistry) -> Self {
        self.extension_registry = registry;
        self
    }

    /// Skip unknown fields and extensions with a warning instead of failing.
    pub fn allow_unknown_fields(mut self, allow: bool) -> Self {
        self.allow_unknown_fields = allow;
        self
    }

    /// Drop unknown enum values with a warning instead of failing.
    pub fn allow_unknown_enum_values(mut self, allow: bool) -> Self {
        self.allow_unknown_enum_values = allow;
        self
    }

    /// Skip unknown extensions with a warning; unknown plain fields still
    /// fail.
    pub fn allow_unknown_extensions(mut self, allow: bool) -> Self {
        self.allow_unknown_extensions = allow;
        self
    }

    /// How repeated assignment to a singular field is handled.
    pub fn singular_overwrite_policy(mut self, policy: SingularOverwritePolicy) -> Self {
        self.singular_overwrite_policy = policy;
        self
    }

    /// Maximum message nesting depth.
    pub fn recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Finish building.
    pub fn build(self) -> Parser {
        Parser {
            type_registry: self.type_registry,
            extension_registry: self.extension_registry,
            allow_unknown_fields: self.allow_unknown_fields,
            allow_unknown_enum_values: self.allow_unknown_enum_values,
            allow_unknown_extensions: self.allow_unknown_extensions,
            singular_overwrite_policy: self.singular_overwrite_policy,
            recursion_limit: self.recursion_limit,
        }
    }
}

// ─── Public API ─────────────────────────────────────────────────────────────

impl Parser {
    /// Start configuring a parser.
    pub fn builder() -> ParserBuilder {
        ParserBuilder::default()
    }

    /// Merge `input` into `message`.
    ///
    /// Fields already set on `message` are kept unless the input assigns
    /// them again. On error, `message` may hold part of the input.
    pub fn merge(&self, input: &str, message: &mut DynamicMessage) -> Result<(), ParseError> {
        self.merge_into(input, message, None)
    }

    /// Like [`Parser::merge`], also returning where each field was assigned.
    pub fn merge_with_locations(
        &self,
        input: &str,
        message: &mut DynamicMessage,
    ) -> Result<ParseInfoTree, ParseError> {
        let mut tree = ParseInfoTree::new();
        self.merge_into(input, message, Some(&mut tree))?;
        Ok(tree)
    }

    /// Parse `input` into a fresh message of type `descriptor`.
    pub fn parse(
        &self,
        input: &str,
        descriptor: MessageDescriptor,
    ) -> Result<DynamicMessage, ParseError> {
        let mut message = DynamicMessage::new(descriptor);
        self.merge(input, &mut message)?;
        Ok(message)
    }

    /// The `Any` type registry.
    pub fn type_registry(&self) -> &TypeRegistry {
        &self.type_registry
    }

    /// The extension registry.
    pub fn extension_registry(&self) -> &ExtensionRegistry {
        &self.extension_registry
    }

    /// Whether unknown fields are tolerated.
    pub fn allows_unknown_fields(&self) -> bool {
        self.allow_unknown_fields
    }

    /// Whether unknown enum values are tolerated.
    pub fn allows_unknown_enum_values(&self) -> bool {
        self.allow_unknown_enum_values
    }

    /// Whether unknown extensions are tolerated.
    pub fn allows_unknown_extensions(&self) -> bool {
        self.allow_unknown_extensions
    }

    /// The singular overwrite policy.
    pub fn singular_overwrite_policy(&self) -> SingularOverwritePolicy {
        self.singular_overwrite_policy
    }

    /// Maximum message nesting depth.
    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }

    fn merge_into(
        &self,
        input: &str,
        message: &mut DynamicMessage,
        mut tree: Option<&mut ParseInfoTree>,
    ) -> Result<(), ParseError> {
        let mut merger = Merger {
            parser: self,
            tokenizer: Tokenizer::new(input),
            unknown_fields: Vec::new(),
        };
        while !merger.tokenizer.at_end() {
            merger.merge_field(message, tree.as_deref_mut(), self.recursion_limit)?;
        }
        merger.check_unknown_fields()
    }
}

/// Merge `input` into `message` with the default parser.
pub fn merge(input: &str, message: &mut DynamicMessage) -> Result<(), ParseError> {
    Parser::default().merge(input, message)
}

/// Parse `input` as a message of type `descriptor` with the default parser.
pub fn parse(input: &str, descriptor: MessageDescriptor) -> Result<DynamicMessage, ParseError> {
    Parser::default().parse(input, descriptor)
}

// ─── Unknown field bookkeeping ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnknownFieldKind {
    Field,
    Extension,
}

/// A name that did not resolve, kept until the end of the merge.
#[derive(Debug, Clone)]
pub(crate) struct UnknownFieldRecord {
    location: Location,
    kind: UnknownFieldKind,
    name: String,
    /// `line:column:\tType.name`, or `Type.[ext.name]` for extensions.
    message: String,
}

// ─── Merge engine ───────────────────────────────────────────────────────────

struct Merger<'p, 'a> {
    parser: &'p Parser,
    tokenizer: Tokenizer<'a>,
    unknown_fields: Vec<UnknownFieldRecord>,
}

impl Merger<'_, '_> {
    /// Parse one field assignment and merge it into `message`.
    fn merge_field(
        &mut self,
        message: &mut DynamicMessage,
        mut tree: Option<&mut ParseInfoTree>,
        depth_left: usize,
    ) -> Result<(), ParseError> {
        let descriptor = message.descriptor();
        let start = self.tokenizer.location();

        if descriptor.full_name() == ANY_FULL_NAME && self.tokenizer.try_consume("[") {
            if depth_left == 0 {
                return Err(self.too_deep());
            }
            self.merge_any_field(message, tree, depth_left - 1)?;
            self.consume_field_separator();
            return Ok(());
        }

        let field = if self.tokenizer.try_consume("[") {
            self.resolve_extension(&descriptor)?
        } else {
            self.resolve_field(&descriptor)?
        };

        let Some(field) = field else {
            self.skip_unknown_value(depth_left)?;
            self.consume_field_separator();
            return Ok(());
        };

        if matches!(field.kind(), Kind::Message(_)) {
            self.tokenizer.try_consume(":");
        } else {
            self.tokenizer.consume(":")?;
        }
        self.consume_field_values(message, &field, tree.as_deref_mut(), depth_left)?;
        if let Some(tree) = tree {
            tree.record(field.full_name(), start);
        }
        self.consume_field_separator();
        Ok(())
    }

    /// `[type_url] { ... }` inside an `Any`; the opening `[` is consumed.
    fn merge_any_field(
        &mut self,
        message: &mut DynamicMessage,
        mut tree: Option<&mut ParseInfoTree>,
        depth_left: usize,
    ) -> Result<(), ParseError> {
        let mut type_url = self.tokenizer.consume_identifier()?.to_string();
        while !self.tokenizer.try_consume("]") {
            if self.tokenizer.try_consume("/") {
                type_url.push('/');
            } else if self.tokenizer.try_consume(".") {
                type_url.push('.');
            } else {
                return Err(self
                    .tokenizer
                    .parse_error_previous_token("Expected a valid type URL."));
            }
            type_url.push_str(self.tokenizer.consume_identifier()?);
        }
        self.tokenizer.try_consume(":");
        let end = self.consume_message_start()?;

        let content_type = match self.parser.type_registry.descriptor_for_type_url(&type_url) {
            Ok(Some(descriptor)) => descriptor.clone(),
            Ok(None) => {
                return Err(self.tokenizer.parse_error(format!(
                    "Unable to parse Any of type: {type_url}. Please make sure that the \
                     TypeRegistry contains the descriptors for the given types."
                )));
            }
            Err(e) => {
                return Err(self
                    .tokenizer
                    .parse_error(format!("Invalid type URL. Found: {type_url}"))
                    .with_kind(ParseErrorKind::InvalidTypeUrl(e)));
            }
        };

        let mut content = DynamicMessage::new(content_type);
        while !self.tokenizer.try_consume(end) {
            if self.tokenizer.at_end() {
                return Err(self.tokenizer.parse_error(format!("Expected \"{end}\".")));
            }
            self.merge_field(&mut content, tree.as_deref_mut(), depth_left)?;
        }

        let descriptor = message.descriptor();
        let (Some(url_field), Some(value_field)) = (
            descriptor.get_field_by_name("type_url"),
            descriptor.get_field_by_name("value"),
        ) else {
            return Err(self
                .tokenizer
                .parse_error_previous_token("Any message is missing type_url or value."));
        };
        message.set_field(&url_field, Value::String(type_url));
        message.set_field(&value_field, Value::Bytes(content.encode_to_vec().into()));
        Ok(())
    }

    /// Extension name after `[`, through the closing `]`.
    fn resolve_extension(
        &mut self,
        descriptor: &MessageDescriptor,
    ) -> Result<Option<FieldRef>, ParseError> {
        let mut name = self.tokenizer.consume_identifier()?.to_string();
        while self.tokenizer.try_consume(".") {
            name.push('.');
            name.push_str(self.tokenizer.consume_identifier()?);
        }

        let resolved = match self.parser.extension_registry.find(&name).cloned() {
            None => {
                self.record_unknown(descriptor, UnknownFieldKind::Extension, name);
                None
            }
            Some(extension) => {
                if extension.containing_message() != *descriptor {
                    return Err(self.tokenizer.parse_error_previous_token(format!(
                        "Extension \"{name}\" does not extend message type \"{}\".",
                        descriptor.full_name()
                    )));
                }
                Some(FieldRef::Extension(extension))
            }
        };
        self.tokenizer.consume("]")?;
        Ok(resolved)
    }

    /// Plain field name. Groups must be written with their type name.
    fn resolve_field(
        &mut self,
        descriptor: &MessageDescriptor,
    ) -> Result<Option<FieldRef>, ParseError> {
        let name = self.tokenizer.consume_identifier()?;
        let field = descriptor.get_field_by_name(name).or_else(|| {
            descriptor
                .get_field_by_name(&name.to_ascii_lowercase())
                .filter(|f| f.is_group())
        });
        let field = field.filter(|f| {
            !f.is_group() || matches!(f.kind(), Kind::Message(group) if group.name() == name)
        });
        match field {
            Some(field) => Ok(Some(FieldRef::Field(field))),
            None => {
                self.record_unknown(descriptor, UnknownFieldKind::Field, name.to_string());
                Ok(None)
            }
        }
    }

    fn record_unknown(
        &mut self,
        descriptor: &MessageDescriptor,
        kind: UnknownFieldKind,
        name: String,
    ) {
        let location = self.tokenizer.previous_location();
        let message = match kind {
            UnknownFieldKind::Field => {
                format!("{location}:\t{}.{name}", descriptor.full_name())
            }
            UnknownFieldKind::Extension => {
                format!("{location}:\t{}.[{name}]", descriptor.full_name())
            }
        };
        self.unknown_fields.push(UnknownFieldRecord {
            location,
            kind,
            name,
            message,
        });
    }

    /// Either a bracketed list or a single value, then stored.
    fn consume_field_values(
        &mut self,
        message: &mut DynamicMessage,
        field: &FieldRef,
        mut tree: Option<&mut ParseInfoTree>,
        depth_left: usize,
    ) -> Result<(), ParseError> {
        if field.is_repeated() && self.tokenizer.try_consume("[") {
            if self.tokenizer.try_consume("]") {
                return Ok(());
            }
            loop {
                self.consume_field_value(message, field, tree.as_deref_mut(), depth_left)?;
                if self.tokenizer.try_consume("]") {
                    return Ok(());
                }
                self.tokenizer.consume(",")?;
            }
        }
        self.consume_field_value(message, field, tree, depth_left)
    }

    fn consume_field_value(
        &mut self,
        message: &mut DynamicMessage,
        field: &FieldRef,
        tree: Option<&mut ParseInfoTree>,
        depth_left: usize,
    ) -> Result<(), ParseError> {
        if self.parser.singular_overwrite_policy == SingularOverwritePolicy::Forbid
            && !field.is_repeated()
        {
            self.check_overwrite(message, field)?;
        }

        let value = match field.kind() {
            Kind::Message(descriptor) => {
                return self.consume_message_value(message, field, descriptor, tree, depth_left);
            }
            Kind::Enum(enum_type) => {
                let number = if self.tokenizer.looking_at_integer() {
                    let number = self.tokenizer.consume_i32()?;
                    if enum_type.get_value(number).is_none() && !is_open(&enum_type) {
                        return self.unknown_enum_value(format!(
                            "Enum type \"{}\" has no value with number {number}.",
                            enum_type.full_name()
                        ));
                    }
                    number
                } else {
                    let id = self.tokenizer.consume_identifier()?;
                    match enum_type.get_value_by_name(id) {
                        Some(value) => value.number(),
                        None => {
                            return self.unknown_enum_value(format!(
                                "Enum type \"{}\" has no value named \"{id}\".",
                                enum_type.full_name()
                            ));
                        }
                    }
                };
                Value::EnumNumber(number)
            }
            Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => Value::I32(self.tokenizer.consume_i32()?),
            Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => Value::I64(self.tokenizer.consume_i64()?),
            Kind::Uint32 | Kind::Fixed32 => Value::U32(self.tokenizer.consume_u32()?),
            Kind::Uint64 | Kind::Fixed64 => Value::U64(self.tokenizer.consume_u64()?),
            Kind::Float => Value::F32(self.tokenizer.consume_f32()?),
            Kind::Double => Value::F64(self.tokenizer.consume_f64()?),
            Kind::Bool => Value::Bool(self.tokenizer.consume_bool()?),
            Kind::String => Value::String(self.tokenizer.consume_string()?),
            Kind::Bytes => Value::Bytes(self.tokenizer.consume_byte_string()?.into()),
        };
        field.store(message, value);
        Ok(())
    }

    fn check_overwrite(&self, message: &DynamicMessage, field: &FieldRef) -> Result<(), ParseError> {
        if field.has(message) {
            return Err(self.tokenizer.parse_error_previous_token(format!(
                "Non-repeated field \"{}\" cannot be overwritten.",
                field.full_name()
            )));
        }
        if let Some(oneof) = field.containing_oneof()
            && let Some(other) = oneof.fields().find(|f| message.has_field(f))
        {
            return Err(self.tokenizer.parse_error_previous_token(format!(
                "Field \"{}\" is specified along with field \"{}\", another member of oneof \"{}\".",
                field.full_name(),
                other.full_name(),
                oneof.name()
            )));
        }
        Ok(())
    }

    /// `{ ... }` or `< ... >` for a message, group or map entry.
    fn consume_message_value(
        &mut self,
        message: &mut DynamicMessage,
        field: &FieldRef,
        descriptor: MessageDescriptor,
        tree: Option<&mut ParseInfoTree>,
        depth_left: usize,
    ) -> Result<(), ParseError> {
        let end = self.consume_message_start()?;
        if depth_left == 0 {
            return Err(self.too_deep());
        }

        // Singular messages merge into what is already there.
        let existing = if field.is_repeated() || !field.has(message) {
            None
        } else {
            match field.get(message).into_owned() {
                Value::Message(existing) => Some(existing),
                _ => None,
            }
        };
        let mut sub = existing.unwrap_or_else(|| DynamicMessage::new(descriptor));

        let mut subtree = tree.map(|t| t.push_nested(field.full_name()));
        while !self.tokenizer.try_consume(end) {
            if self.tokenizer.at_end() {
                return Err(self.tokenizer.parse_error(format!("Expected \"{end}\".")));
            }
            self.merge_field(&mut sub, subtree.as_deref_mut(), depth_left - 1)?;
        }

        if field.is_map() {
            insert_map_entry(message, field, &sub);
        } else {
            field.store(message, Value::Message(sub));
        }
        Ok(())
    }

    fn unknown_enum_value(&self, message: String) -> Result<(), ParseError> {
        if self.parser.allow_unknown_enum_values {
            log::warn!("{message}");
            Ok(())
        } else {
            Err(self.tokenizer.parse_error_previous_token(message))
        }
    }

    /// Opening `{` or `<`; returns the matching closer.
    fn consume_message_start(&mut self) -> Result<&'static str, ParseError> {
        if self.tokenizer.try_consume("<") {
            Ok(">")
        } else {
            self.tokenizer.consume("{")?;
            Ok("}")
        }
    }

    fn consume_field_separator(&mut self) {
        if !self.tokenizer.try_consume(";") {
            self.tokenizer.try_consume(",");
        }
    }

    fn too_deep(&self) -> ParseError {
        self.tokenizer
            .parse_error("Message is nested too deep")
            .with_kind(ParseErrorKind::TooDeep)
    }

    // ─── Skipping unknown values ────────────────────────────────────────────

    /// Guess the shape of an unknown field's value from the next tokens.
    ///
    /// A `:` not followed by `{`/`<` means a scalar (or a list of them);
    /// anything else must be a message body.
    fn skip_unknown_value(&mut self, depth_left: usize) -> Result<(), ParseError> {
        if self.tokenizer.try_consume(":")
            && !self.tokenizer.looking_at("{")
            && !self.tokenizer.looking_at("<")
        {
            if self.tokenizer.looking_at("[") {
                self.skip_short_repeated(true, depth_left)
            } else {
                self.skip_field_value()
            }
        } else if self.tokenizer.looking_at("[") {
            self.skip_short_repeated(false, depth_left)
        } else {
            self.skip_field_message(depth_left)
        }
    }

    fn skip_short_repeated(
        &mut self,
        scalar_allowed: bool,
        depth_left: usize,
    ) -> Result<(), ParseError> {
        self.tokenizer.consume("[")?;
        if self.tokenizer.try_consume("]") {
            return Ok(());
        }
        loop {
            if self.tokenizer.looking_at("{") || self.tokenizer.looking_at("<") {
                self.skip_field_message(depth_left)?;
            } else if scalar_allowed {
                self.skip_field_value()?;
            } else {
                return Err(self
                    .tokenizer
                    .parse_error("Invalid repeated scalar field: missing \":\" before \"[\"."));
            }
            if self.tokenizer.try_consume("]") {
                return Ok(());
            }
            self.tokenizer.consume(",")?;
        }
    }

    fn skip_field_message(&mut self, depth_left: usize) -> Result<(), ParseError> {
        let end = self.consume_message_start()?;
        if depth_left == 0 {
            return Err(self.too_deep());
        }
        while !self.tokenizer.looking_at(">") && !self.tokenizer.looking_at("}") {
            self.skip_field(depth_left - 1)?;
        }
        self.tokenizer.consume(end)
    }

    fn skip_field(&mut self, depth_left: usize) -> Result<(), ParseError> {
        if self.tokenizer.try_consume("[") {
            loop {
                self.tokenizer.consume_identifier()?;
                if !self.tokenizer.try_consume(".") && !self.tokenizer.try_consume("/") {
                    break;
                }
            }
            self.tokenizer.consume("]")?;
        } else {
            self.tokenizer.consume_identifier()?;
        }
        self.skip_unknown_value(depth_left)?;
        self.consume_field_separator();
        Ok(())
    }

    fn skip_field_value(&mut self) -> Result<(), ParseError> {
        let skipped = self.tokenizer.try_consume_byte_string().is_some()
            || self.tokenizer.try_consume_identifier().is_some()
            || self.tokenizer.try_consume_i64().is_some()
            || self.tokenizer.try_consume_u64().is_some()
            || self.tokenizer.try_consume_f64().is_some()
            || self.tokenizer.try_consume_f32().is_some();
        if skipped {
            Ok(())
        } else {
            Err(self.tokenizer.parse_error(format!(
                "Invalid field value: {}",
                self.tokenizer.current()
            )))
        }
    }

    // ─── Unknown field policy ───────────────────────────────────────────────

    fn check_unknown_fields(&self) -> Result<(), ParseError> {
        if self.unknown_fields.is_empty() {
            return Ok(());
        }
        let mut summary = String::from("Input contains unknown fields and/or extensions:");
        for record in &self.unknown_fields {
            summary.push('\n');
            summary.push_str(&record.message);
        }

        if self.parser.allow_unknown_fields {
            log::warn!("{summary}");
            return Ok(());
        }

        if self.parser.allow_unknown_extensions
            && self
                .unknown_fields
                .iter()
                .all(|record| record.kind == UnknownFieldKind::Extension)
        {
            log::warn!("{summary}");
            return Ok(());
        }

        let first = &self.unknown_fields[0];

        Err(ParseError::new(Some(first.location), summary).with_kind(
            ParseErrorKind::UnknownField {
                name: first.name.clone(),
            },
        ))
    }
}

/// Open (proto3) enums keep numbers that have no declared value.
fn is_open(enum_type: &EnumDescriptor) -> bool {
    enum_type.parent_file().syntax() == Syntax::Proto3
}

/// Insert a parsed map entry; a later entry with the same key replaces an
/// earlier one.
fn insert_map_entry(message: &mut DynamicMessage, field: &FieldRef, entry: &DynamicMessage) {
    let entry_type = entry.descriptor();
    let key = entry.get_field(&entry_type.map_entry_key_field());
    let Some(key) = map_key_of(&key) else {
        return;
    };
    let value = entry
        .get_field(&entry_type.map_entry_value_field())
        .into_owned();
    if let Value::Map(map) = field.get_mut(message) {
        map.insert(key, value);
    }
}
