//! Kit definitions — the itemized supply sets the assistant may reference.
//!
//! The serialized shape matches the catalog JSON served to clients:
//! optional fields are omitted rather than written as `null`.

use serde::{Deserialize, Serialize};

/// A single line in a kit's contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitItem {
    /// Item name (required)
    pub item: String,

    /// How many of this item the kit holds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,

    /// Short note on what the item is for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl KitItem {
    pub fn new(item: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            quantity: None,
            description: None,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// An immutable kit definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitDefinition {
    /// Unique catalog key (e.g. "standard")
    pub id: String,
    pub name: String,
    pub description: String,
    pub use_case: String,

    /// Contents in catalog order
    #[serde(default)]
    pub contents: Vec<KitItem>,
}
