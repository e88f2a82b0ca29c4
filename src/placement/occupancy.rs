use std::collections::HashSet;

use crate::grid::CellId;

use super::PlacedItem;

/// Cells claimed by draft items, skipping the one being repositioned.
pub fn occupied_cells<'a>(
    items: impl IntoIterator<Item = &'a PlacedItem>,
    exclude: Option<&str>,
) -> HashSet<CellId> {
    items
        .into_iter()
        .filter(|item| exclude != Some(item.id.as_str()))
        .flat_map(|item| item.footprint_cell_ids.iter().copied())
        .collect()
}

/// Occupancy recomputed only when the draft version or the excluded item changes.
#[derive(Debug, Default)]
pub struct OccupancyCache {
    key: Option<(u64, Option<String>)>,
    cells: HashSet<CellId>,
}

impl OccupancyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the cache up to date; returns true when it was rebuilt
    pub fn refresh(&mut self, draft_version: u64, items: &[PlacedItem], exclude: Option<&str>) -> bool {
        let key = (draft_version, exclude.map(str::to_string));
        if self.key.as_ref() == Some(&key) {
            return false;
        }
        self.cells = occupied_cells(items, exclude);
        self.key = Some(key);
        true
    }

    pub fn cells(&self) -> &HashSet<CellId> {
        &self.cells
    }

    pub fn is_occupied(&self, cell: &CellId) -> bool {
        self.cells.contains(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Surface;
    use crate::placement::{footprint, Rotation};

    fn item(id: &str, row: u32, col: u32) -> PlacedItem {
        let anchor = CellId::new(Surface::Floor, row, col);
        PlacedItem {
            id: id.to_string(),
            item_id: "chair".to_string(),
            anchor_cell_id: anchor,
            footprint_cell_ids: footprint(&anchor, 1, 2),
            x_length: 1,
            y_length: 2,
            rotation: Rotation::Deg0,
            surface: Surface::Floor,
            offset_x: 0.0,
            offset_y: 0.0,
            image_url: String::new(),
        }
    }

    #[test]
    fn test_union_of_footprints() {
        let items = vec![item("a", 1, 1), item("b", 3, 3)];
        let cells = occupied_cells(&items, None);
        assert_eq!(cells.len(), 4);
        assert!(cells.contains(&CellId::new(Surface::Floor, 3, 4)));
    }

    #[test]
    fn test_excluded_item_does_not_count() {
        let items = vec![item("a", 1, 1), item("b", 3, 3)];
        let cells = occupied_cells(&items, Some("a"));
        assert_eq!(cells.len(), 2);
        assert!(!cells.contains(&CellId::new(Surface::Floor, 1, 1)));
    }

    #[test]
    fn test_cache_rebuilds_on_version_change() {
        let items = vec![item("a", 1, 1)];
        let mut cache = OccupancyCache::new();
        assert!(cache.refresh(1, &items, None));
        assert!(!cache.refresh(1, &items, None));
        assert!(cache.refresh(1, &items, Some("a")));
        assert!(cache.cells().is_empty());
        assert!(cache.refresh(2, &items, None));
        assert!(cache.is_occupied(&CellId::new(Surface::Floor, 1, 2)));
    }
}
