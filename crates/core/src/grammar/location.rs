//! Source locations of parsed fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Location;

/// Where each field of a message was assigned in the input, with one
/// nested tree per message-typed value.
///
/// Keys are field full names (extension full names for extensions).
/// Locations and nested trees are kept in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseInfoTree {
    locations: BTreeMap<String, Vec<Location>>,
    subtrees: BTreeMap<String, Vec<ParseInfoTree>>,
}

impl ParseInfoTree {
    /// An empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// The `index`-th location of `field`.
    pub fn location(&self, field: &str, index: usize) -> Option<Location> {
        self.locations(field).get(index).copied()
    }

    /// Every location of `field`, in input order.
    pub fn locations(&self, field: &str) -> &[Location] {
        self.locations.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The tree of the `index`-th message value of `field`.
    pub fn nested_tree(&self, field: &str, index: usize) -> Option<&ParseInfoTree> {
        self.nested_trees(field).get(index)
    }

    /// Trees of every message value of `field`, in input order.
    pub fn nested_trees(&self, field: &str) -> &[ParseInfoTree] {
        self.subtrees.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Names of all fields with at least one recorded location.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.locations.keys().map(String::as_str)
    }

    /// True when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty() && self.subtrees.is_empty()
    }

    pub(crate) fn record(&mut self, field: &str, location: Location) {
        self.locations
            .entry(field.to_string())
            .or_default()
            .push(location);
    }

    pub(crate) fn push_nested(&mut self, field: &str) -> &mut ParseInfoTree {
        let trees = self.subtrees.entry(field.to_string()).or_default();
        trees.push(ParseInfoTree::new());
        let last = trees.len() - 1;
        &mut trees[last]
    }
}
