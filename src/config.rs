//! Room configuration: surface outlines, initial view and the item catalog.
//!
//! Loaded from a JSON file passed with `--config`. Every field is optional;
//! the defaults describe the corner-view room with a small demo catalog.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::grid::{RoomLayout, Surface, SurfaceCorners, ViewState, MAX_DIVISIONS};
use crate::placement::CatalogItem;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    pub divisions: u32,
    pub surfaces: BTreeMap<Surface, SurfaceCorners>,
    pub view: ViewState,
    pub catalog: Vec<CatalogItem>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        let layout = RoomLayout::default();
        Self {
            divisions: layout.divisions,
            surfaces: layout.surfaces,
            view: ViewState::default(),
            catalog: demo_catalog(),
        }
    }
}

impl RoomConfig {
    /// Read, parse and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        debug!(
            path = %path.display(),
            divisions = config.divisions,
            catalog = config.catalog.len(),
            "room config loaded"
        );
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: RoomConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.divisions == 0 || self.divisions > MAX_DIVISIONS {
            return Err(ConfigError::InvalidDivisions(self.divisions));
        }

        for (surface, corners) in &self.surfaces {
            if let Some(bad) = corners
                .points()
                .into_iter()
                .find(|p| !(0.0..=1.0).contains(&p.x) || !(0.0..=1.0).contains(&p.y))
            {
                return Err(ConfigError::CornerOutOfRange {
                    surface: surface.to_string(),
                    x: bad.x,
                    y: bad.y,
                });
            }
        }

        let mut seen = HashSet::new();
        for item in &self.catalog {
            if !seen.insert(item.item_id.as_str()) {
                return Err(ConfigError::DuplicateCatalogItem(item.item_id.clone()));
            }
            let in_range = |len: u32| (1..=MAX_DIVISIONS).contains(&len);
            if !in_range(item.x_length) || !in_range(item.y_length) {
                return Err(ConfigError::EmptyCatalogItem {
                    item_id: item.item_id.clone(),
                    x_length: item.x_length,
                    y_length: item.y_length,
                });
            }
        }
        Ok(())
    }

    pub fn layout(&self) -> RoomLayout {
        RoomLayout {
            divisions: self.divisions,
            surfaces: self.surfaces.clone(),
        }
    }
}

fn catalog_item(item_id: &str, x_length: u32, y_length: u32, category: &str, allowed: Option<Surface>) -> CatalogItem {
    CatalogItem {
        item_id: item_id.to_string(),
        image_url: format!("items/{item_id}.png"),
        x_length,
        y_length,
        category: category.to_string(),
        allowed_surface: allowed,
    }
}

/// Catalog used when no config is given
pub fn demo_catalog() -> Vec<CatalogItem> {
    vec![
        catalog_item("sofa", 2, 3, "furniture", Some(Surface::Floor)),
        catalog_item("armchair", 2, 2, "furniture", Some(Surface::Floor)),
        catalog_item("rug", 3, 4, "decor", Some(Surface::Floor)),
        catalog_item("lamp", 1, 1, "lighting", Some(Surface::Floor)),
        catalog_item("plant", 1, 1, "decor", None),
        catalog_item("painting", 2, 3, "wall", Some(Surface::LeftWall)),
        catalog_item("clock", 1, 1, "wall", Some(Surface::RightWall)),
        catalog_item("shelf", 1, 3, "wall", Some(Surface::RightWall)),
        catalog_item("window", 3, 2, "wall", Some(Surface::LeftWall)),
    ]
}
