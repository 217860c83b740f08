//! Kit Catalog — the read-only registry of kit definitions.
//!
//! Built once at startup, either from the built-in kits or from a JSON file
//! in the same shape `/api/kits` serves, then shared behind an `Arc`.
//! Lookups never substitute a default: a missing id is reported as
//! [`CatalogError::NotFound`] and the caller decides what to do.

mod builtin;

use std::collections::HashSet;
use std::path::Path;

use solstis_core::KitDefinition;
use solstis_core::error::CatalogError;
use tracing::{debug, info};

/// An immutable, validated set of kits.
#[derive(Debug, Clone)]
pub struct KitCatalog {
    kits: Vec<KitDefinition>,
}

impl KitCatalog {
    /// The four kits the product ships with.
    pub fn builtin() -> Self {
        Self {
            kits: builtin::kits(),
        }
    }

    /// Build a catalog from explicit definitions.
    ///
    /// Rejects an empty list, duplicate ids, blank item names, and
    /// zero quantities.
    pub fn from_kits(kits: Vec<KitDefinition>) -> Result<Self, CatalogError> {
        if kits.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for kit in &kits {
            if !seen.insert(kit.id.as_str()) {
                return Err(CatalogError::DuplicateId(kit.id.clone()));
            }
            for entry in &kit.contents {
                if entry.item.trim().is_empty() {
                    return Err(CatalogError::InvalidItem {
                        kit_id: kit.id.clone(),
                        reason: "item name is empty".into(),
                    });
                }
                if entry.quantity == Some(0) {
                    return Err(CatalogError::InvalidItem {
                        kit_id: kit.id.clone(),
                        reason: format!("quantity of '{}' must be positive", entry.item),
                    });
                }
            }
        }

        Ok(Self { kits })
    }

    /// Load a replacement catalog from a JSON array of kit definitions.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let kits: Vec<KitDefinition> =
            serde_json::from_str(&content).map_err(|e| CatalogError::Parse {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let catalog = Self::from_kits(kits)?;
        info!(path = %path.display(), kits = catalog.len(), "Loaded kit catalog");
        Ok(catalog)
    }

    /// The kit file if one is configured, otherwise the built-in kits.
    pub fn load(kits_file: Option<&Path>) -> Result<Self, CatalogError> {
        match kits_file {
            Some(path) => Self::from_json_file(path),
            None => {
                debug!("Using built-in kit catalog");
                Ok(Self::builtin())
            }
        }
    }

    pub fn lookup(&self, kit_id: &str) -> Result<&KitDefinition, CatalogError> {
        self.kits
            .iter()
            .find(|k| k.id == kit_id)
            .ok_or_else(|| CatalogError::NotFound(kit_id.to_string()))
    }

    pub fn contains(&self, kit_id: &str) -> bool {
        self.lookup(kit_id).is_ok()
    }

    /// All kits in catalog order.
    pub fn list(&self) -> &[KitDefinition] {
        &self.kits
    }

    pub fn len(&self) -> usize {
        self.kits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kits.is_empty()
    }
}

impl Default for KitCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solstis_core::KitItem;

    fn kit(id: &str, contents: Vec<KitItem>) -> KitDefinition {
        KitDefinition {
            id: id.into(),
            name: format!("{id} kit"),
            description: "test".into(),
            use_case: "tests".into(),
            contents,
        }
    }

    #[test]
    fn builtin_has_four_kits_in_order() {
        let catalog = KitCatalog::builtin();
        let ids: Vec<&str> = catalog.list().iter().map(|k| k.id.as_str()).collect();
        assert_eq!(ids, ["standard", "college", "oc_standard", "oc_vehicle"]);
    }

    #[test]
    fn builtin_passes_validation() {
        let kits = KitCatalog::builtin().list().to_vec();
        assert!(KitCatalog::from_kits(kits).is_ok());
    }

    #[test]
    fn standard_kit_contents() {
        let catalog = KitCatalog::builtin();
        let standard = catalog.lookup("standard").unwrap();
        assert_eq!(standard.name, "Standard Kit");
        assert_eq!(standard.contents.len(), 18);
        assert_eq!(standard.contents[0].item, "Band-Aids");
        assert_eq!(standard.contents[1].item, r#"4" x 4" Gauze Pads"#);
        assert_eq!(standard.contents[1].quantity, Some(5));
    }

    #[test]
    fn lookup_unknown_is_not_found() {
        let catalog = KitCatalog::builtin();
        let err = catalog.lookup("spaceship").unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(id) if id == "spaceship"));
        assert!(!catalog.contains("spaceship"));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = KitCatalog::from_kits(vec![kit("a", vec![]), kit("a", vec![])]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(id) if id == "a"));
    }

    #[test]
    fn empty_catalog_rejected() {
        assert!(matches!(
            KitCatalog::from_kits(vec![]),
            Err(CatalogError::Empty)
        ));
    }

    #[test]
    fn zero_quantity_rejected() {
        let bad = kit("a", vec![KitItem::new("Pads").with_quantity(0)]);
        let err = KitCatalog::from_kits(vec![bad]).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidItem { .. }));
    }

    #[test]
    fn loads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kits.json");
        std::fs::write(
            &path,
            r#"[{"id":"hike","name":"Hiking Kit","description":"Trail kit.","use_case":"Day hikes.",
                "contents":[{"item":"Moleskin","quantity":4},{"item":"Whistle"}]}]"#,
        )
        .unwrap();

        let catalog = KitCatalog::load(Some(&path)).unwrap();
        assert_eq!(catalog.len(), 1);
        let hike = catalog.lookup("hike").unwrap();
        assert_eq!(hike.contents[0].quantity, Some(4));
        assert!(catalog.lookup("standard").is_err());
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = KitCatalog::from_json_file(Path::new("/nonexistent/kits.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Read { .. }));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kits.json");
        std::fs::write(&path, r#"{"id": "not an array"}"#).unwrap();
        let err = KitCatalog::from_json_file(&path).unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
    }
}
