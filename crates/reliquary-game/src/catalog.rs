//! Item catalog loaded from authored data
//!
//! Catalog files are TOML with one `[[item]]` table per artifact:
//!
//! ```toml
//! [[item]]
//! id = 1
//! display_name = "Bronze Astrolabe"
//! era = "Medieval"
//! puzzle_group = 3
//! prefab = "props/astrolabe"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::item::{Item, ItemHandle, ItemId};

/// Errors that can occur while building the catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog '{0}': {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("duplicate item id {0}")]
    DuplicateId(ItemId),

    #[error("unknown item {0}")]
    UnknownItem(ItemId),
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

/// Immutable lookup of every authored item
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: BTreeMap<ItemId, ItemHandle>,
}

impl ItemCatalog {
    /// Build a catalog from item records, rejecting duplicate ids
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for item in items {
            let id = item.id;
            if map.insert(id, ItemHandle::new(item)).is_some() {
                return Err(CatalogError::DuplicateId(id));
            }
        }
        Ok(Self { items: map })
    }

    /// Parse a catalog from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::from_items(file.items)
    }

    /// Load a catalog file from disk
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content =
            fs::read_to_string(path).map_err(|e| CatalogError::Io(path.to_path_buf(), e))?;
        let catalog = Self::from_toml_str(&content)?;
        info!("Loaded {} items from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    /// Look up an item by id
    pub fn get(&self, id: ItemId) -> Option<ItemHandle> {
        self.items.get(&id).cloned()
    }

    /// Look up an item that authored data refers to
    pub fn require(&self, id: ItemId) -> Result<ItemHandle, CatalogError> {
        self.get(id).ok_or(CatalogError::UnknownItem(id))
    }

    /// All items tagged with a puzzle group, in id order
    pub fn group(&self, puzzle_group: i32) -> Vec<ItemHandle> {
        self.items
            .values()
            .filter(|item| item.puzzle_group == puzzle_group)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate items in id order
    pub fn iter(&self) -> impl Iterator<Item = &ItemHandle> {
        self.items.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reliquary_core::Era;

    const CATALOG: &str = r#"
        [[item]]
        id = 1
        display_name = "Bronze Astrolabe"
        era = "Medieval"
        puzzle_group = 3
        prefab = "props/astrolabe"

        [[item]]
        id = 2
        display_name = "Iron Key"
        era = "Medieval"
        puzzle_group = 4
        prefab = "props/key"
        display_offset = { position = [0.0, 0.1, 0.0], scale = 0.5 }

        [[item]]
        id = 3
        display_name = "Clay Tablet"
        era = "Ancient"
        puzzle_group = 3
        prefab = "props/tablet"
    "#;

    #[test]
    fn test_parse_catalog() {
        let catalog = ItemCatalog::from_toml_str(CATALOG).unwrap();
        assert_eq!(catalog.len(), 3);

        let key = catalog.get(ItemId(2)).unwrap();
        assert_eq!(key.display_name, "Iron Key");
        assert_eq!(key.era, Era::Medieval);
        assert_eq!(key.display_offset.scale, 0.5);
        assert_eq!(key.display_offset.rotation_degrees, glam::Vec3::ZERO);
    }

    #[test]
    fn test_group_lookup() {
        let catalog = ItemCatalog::from_toml_str(CATALOG).unwrap();
        let ids: Vec<_> = catalog.group(3).iter().map(|i| i.id()).collect();
        assert_eq!(ids, vec![ItemId(1), ItemId(3)]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let doubled = format!("{CATALOG}\n[[item]]\nid = 1\ndisplay_name = \"Copy\"\nera = \"Future\"\npuzzle_group = 0\nprefab = \"x\"\n");
        assert!(matches!(
            ItemCatalog::from_toml_str(&doubled),
            Err(CatalogError::DuplicateId(ItemId(1)))
        ));
    }

    #[test]
    fn test_require_unknown() {
        let catalog = ItemCatalog::default();
        assert!(matches!(
            catalog.require(ItemId(42)),
            Err(CatalogError::UnknownItem(ItemId(42)))
        ));
    }

    #[test]
    fn test_malformed_catalog() {
        assert!(matches!(
            ItemCatalog::from_toml_str("[[item]]\nid = \"nope\""),
            Err(CatalogError::Parse(_))
        ));
    }
}
