//! Explicit, immutable lookup tables for `Any` type URLs and extensions.
//!
//! Both registries are built once and handed to a [`Parser`](crate::Parser)
//! or [`Printer`](crate::Printer). There is no process-wide registry.

use std::collections::HashMap;

use prost_reflect::{DescriptorPool, ExtensionDescriptor, Kind, MessageDescriptor};

/// A type URL that does not have the `<prefix>/<full.type.Name>` shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid type url found: {0}")]
pub struct InvalidTypeUrl(pub String);

/// Extract the full message name from a type URL.
///
/// Everything after the last `/` is the name; the prefix is not checked.
pub fn type_name_from_url(type_url: &str) -> Result<&str, InvalidTypeUrl> {
    match type_url.rsplit_once('/') {
        Some((_, name)) => Ok(name),
        None => Err(InvalidTypeUrl(type_url.to_string())),
    }
}

/// Message descriptors indexed by full name, used to resolve `Any` payloads.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, MessageDescriptor>,
}

impl TypeRegistry {
    /// A registry that resolves nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start building a registry.
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::default()
    }

    /// Look up a message type by full name.
    pub fn find(&self, full_name: &str) -> Option<&MessageDescriptor> {
        self.types.get(full_name)
    }

    /// Resolve a type URL to a descriptor.
    ///
    /// Returns `Ok(None)` when the URL is well formed but names an
    /// unregistered type.
    pub fn descriptor_for_type_url(
        &self,
        type_url: &str,
    ) -> Result<Option<&MessageDescriptor>, InvalidTypeUrl> {
        let name = type_name_from_url(type_url)?;
        Ok(self.find(name))
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Builder for [`TypeRegistry`].
#[derive(Debug, Default)]
pub struct TypeRegistryBuilder {
    types: HashMap<String, MessageDescriptor>,
}

impl TypeRegistryBuilder {
    /// Register one message type.
    pub fn add(mut self, descriptor: MessageDescriptor) -> Self {
        self.insert(descriptor);
        self
    }

    /// Register every message type in a pool.
    pub fn add_pool(mut self, pool: &DescriptorPool) -> Self {
        for descriptor in pool.all_messages() {
            self.insert(descriptor);
        }
        self
    }

    fn insert(&mut self, descriptor: MessageDescriptor) {
        let name = descriptor.full_name().to_string();
        if let Some(existing) = self.types.get(&name)
            && existing != &descriptor
        {
            log::warn!("type {name} registered twice with different descriptors; keeping the first");
            return;
        }
        self.types.insert(name, descriptor);
    }

    /// Finish building.
    pub fn build(self) -> TypeRegistry {
        TypeRegistry { types: self.types }
    }
}

/// Extension descriptors indexed by full name.
///
/// MessageSet-style extensions are additionally reachable by the full name
/// of their message type.
#[derive(Debug, Clone, Default)]
pub struct ExtensionRegistry {
    by_name: HashMap<String, ExtensionDescriptor>,
}

impl ExtensionRegistry {
    /// A registry with no extensions.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start building a registry.
    pub fn builder() -> ExtensionRegistryBuilder {
        ExtensionRegistryBuilder::default()
    }

    /// Look up an extension by full name (or MessageSet message type name).
    pub fn find(&self, full_name: &str) -> Option<&ExtensionDescriptor> {
        self.by_name.get(full_name)
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Builder for [`ExtensionRegistry`].
#[derive(Debug, Default)]
pub struct ExtensionRegistryBuilder {
    by_name: HashMap<String, ExtensionDescriptor>,
}

impl ExtensionRegistryBuilder {
    /// Register one extension.
    pub fn add(mut self, extension: ExtensionDescriptor) -> Self {
        self.insert(extension);
        self
    }

    /// Register every extension in a pool.
    pub fn add_pool(mut self, pool: &DescriptorPool) -> Self {
        for extension in pool.all_extensions() {
            self.insert(extension);
        }
        self
    }

    fn insert(&mut self, extension: ExtensionDescriptor) {
        if is_message_set_extension(&extension)
            && let Kind::Message(message) = extension.kind()
        {
            self.by_name
                .insert(message.full_name().to_string(), extension.clone());
        }
        self.by_name
            .insert(extension.full_name().to_string(), extension);
    }

    /// Finish building.
    pub fn build(self) -> ExtensionRegistry {
        ExtensionRegistry {
            by_name: self.by_name,
        }
    }
}

/// True for an optional message extension of a MessageSet container that
/// is declared inside its own message type.
pub(crate) fn is_message_set_extension(extension: &ExtensionDescriptor) -> bool {
    if extension.is_list() {
        return false;
    }
    let Kind::Message(message) = extension.kind() else {
        return false;
    };
    if !is_message_set(&extension.containing_message()) {
        return false;
    }
    extension.full_name() == format!("{}.{}", message.full_name(), extension.name())
}

fn is_message_set(message: &MessageDescriptor) -> bool {
    message
        .descriptor_proto()
        .options
        .as_ref()
        .is_some_and(|options| options.message_set_wire_format())
}
