//! Terminal rendering of the room grid.
//!
//! Screen space for the engine is terminal columns by half-rows: one column
//! is one unit wide and one row is [`ROW_SCALE`] units tall, so the room keeps
//! roughly the proportions of the photo it was traced from.

use std::collections::{HashMap, HashSet};

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use roomplan::geometry::Point;
use roomplan::grid::{CellId, ImageSize, RoomGrid};
use roomplan::placement::nearest_cell;
use roomplan::state::PlacementStore;

use super::colors::{
    dim_color, item_color, lerp_color, surface_color, BACKGROUND, GHOST_COLORS, GRID_LINE,
};

/// Terminal cells are about twice as tall as they are wide
pub const ROW_SCALE: f32 = 2.0;

/// Center of a terminal cell in screen space
pub fn to_screen(col: u16, row: u16) -> Point {
    Point::new(col as f32 + 0.5, (row as f32 + 0.5) * ROW_SCALE)
}

/// Image size that fills `area`
pub fn image_size_for(area: Rect) -> ImageSize {
    ImageSize::new(area.width as f32, area.height as f32 * ROW_SCALE)
}

/// Where the image's top-left sits in screen space
pub fn container_offset_for(area: Rect) -> Point {
    Point::new(area.x as f32, area.y as f32 * ROW_SCALE)
}

/// Which grid cell each terminal cell of the room area shows.
///
/// Rebuilt only when the grid or the area changes.
#[derive(Debug, Clone, Default)]
pub struct CellMap {
    grid_version: u64,
    area: Rect,
    cells: Vec<Option<CellId>>,
}

impl CellMap {
    pub fn build(grid: &RoomGrid, grid_version: u64, area: Rect) -> Self {
        let mut cells = Vec::with_capacity(area.width as usize * area.height as usize);
        for row in area.top()..area.bottom() {
            for col in area.left()..area.right() {
                let p = to_screen(col, row);
                let cell = grid
                    .surface_at(&p)
                    .and_then(|surface| nearest_cell(grid, &p, Some(surface)))
                    .map(|cell| cell.id);
                cells.push(cell);
            }
        }
        Self {
            grid_version,
            area,
            cells,
        }
    }

    pub fn is_current(&self, grid_version: u64, area: Rect) -> bool {
        self.grid_version == grid_version && self.area == area && !self.cells.is_empty()
    }

    pub fn cell_at(&self, col: u16, row: u16) -> Option<CellId> {
        if !self.area.contains((col, row).into()) {
            return None;
        }
        let index = (row - self.area.y) as usize * self.area.width as usize + (col - self.area.x) as usize;
        self.cells.get(index).copied().flatten()
    }
}

/// Paints surfaces, placed items, the ghost and the staged placement.
pub struct RoomWidget<'a> {
    store: &'a PlacementStore,
    cells: &'a CellMap,
    show_grid_lines: bool,
    /// 0..1, drives the staged placement's glow
    pulse: f32,
}

impl<'a> RoomWidget<'a> {
    pub fn new(store: &'a PlacementStore, cells: &'a CellMap) -> Self {
        Self {
            store,
            cells,
            show_grid_lines: true,
            pulse: 1.0,
        }
    }

    pub fn grid_lines(mut self, show: bool) -> Self {
        self.show_grid_lines = show;
        self
    }

    pub fn pulse(mut self, pulse: f32) -> Self {
        self.pulse = pulse.clamp(0.0, 1.0);
        self
    }

    fn draw_grid_lines(&self, area: Rect, plain: &[bool], buf: &mut Buffer) {
        let Some(grid) = self.store.grid() else {
            return;
        };
        let style = Style::default().fg(GRID_LINE);
        for line in grid.surfaces().iter().flat_map(|surface| surface.lines.iter()) {
            let dx = line.to.x - line.from.x;
            let dy = (line.to.y - line.from.y) / ROW_SCALE;
            let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as u32;
            for step in 0..=steps {
                let p = line.from.lerp(&line.to, step as f32 / steps as f32);
                let col = p.x.floor();
                let row = (p.y / ROW_SCALE).floor();
                if col < area.left() as f32 || row < area.top() as f32 {
                    continue;
                }
                let (col, row) = (col as u16, row as u16);
                if col >= area.right() || row >= area.bottom() {
                    continue;
                }
                let index = (row - area.y) as usize * area.width as usize + (col - area.x) as usize;
                if plain.get(index).copied().unwrap_or(false) {
                    buf[(col, row)].set_char('·').set_style(style);
                }
            }
        }
    }
}

impl Widget for RoomWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        buf.set_style(area, Style::default().bg(BACKGROUND));

        let items = self.store.draft_items();
        let mut owner: HashMap<CellId, usize> = HashMap::new();
        for (index, item) in items.iter().enumerate() {
            for cell in &item.footprint_cell_ids {
                owner.insert(*cell, index);
            }
        }
        let ghost = self.store.ghost();
        let ghost_cells: HashSet<CellId> = ghost
            .map(|g| g.footprint_cell_ids.iter().copied().collect())
            .unwrap_or_default();
        let pending_cells: HashSet<CellId> = self
            .store
            .pending_placement()
            .map(|p| p.item.footprint_cell_ids.iter().copied().collect())
            .unwrap_or_default();
        let ghost_color = match ghost {
            Some(g) if g.is_valid => GHOST_COLORS.valid,
            _ => GHOST_COLORS.invalid,
        };

        let mut labeled: HashSet<CellId> = HashSet::new();
        let mut plain = vec![false; area.width as usize * area.height as usize];

        for row in area.top()..area.bottom() {
            for col in area.left()..area.right() {
                let Some(cell) = self.cells.cell_at(col, row) else {
                    continue;
                };
                let index = (row - area.y) as usize * area.width as usize + (col - area.x) as usize;
                let checker = (cell.row + cell.col) % 2 == 1;

                if pending_cells.contains(&cell) {
                    let glow = lerp_color(dim_color(GHOST_COLORS.pending, 0.6), GHOST_COLORS.pending, self.pulse);
                    buf[(col, row)].set_char('▓').set_style(Style::default().fg(glow).bg(dim_color(glow, 0.5)));
                } else if ghost_cells.contains(&cell) {
                    let shade = if checker { dim_color(ghost_color, 0.8) } else { ghost_color };
                    buf[(col, row)].set_char('▒').set_style(Style::default().fg(shade).bg(dim_color(shade, 0.4)));
                } else if let Some(&item_index) = owner.get(&cell) {
                    let color = item_color(item_index);
                    let bg = if checker { dim_color(color, 0.85) } else { color };
                    let item = &items[item_index];
                    let label = (item.anchor_cell_id == cell && labeled.insert(cell))
                        .then(|| item.item_id.chars().next())
                        .flatten()
                        .map(|c| c.to_ascii_uppercase())
                        .unwrap_or(' ');
                    buf[(col, row)].set_char(label).set_style(
                        Style::default()
                            .fg(BACKGROUND)
                            .bg(bg)
                            .add_modifier(Modifier::BOLD),
                    );
                } else {
                    buf[(col, row)]
                        .set_char(' ')
                        .set_style(Style::default().bg(surface_color(cell.surface, checker)));
                    plain[index] = true;
                }
            }
        }

        if self.show_grid_lines {
            self.draw_grid_lines(area, &plain, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomplan::grid::ViewState;
    use roomplan::placement::DragConstraints;

    fn store_for(area: Rect) -> PlacementStore {
        let mut store = PlacementStore::default();
        store.set_view(ViewState {
            container_offset: container_offset_for(area),
            ..ViewState::default()
        });
        store.set_image_size(image_size_for(area));
        store
    }

    #[test]
    fn test_screen_mapping_round_trip() {
        let area = Rect::new(2, 1, 120, 40);
        let store = store_for(area);
        let grid = store.grid().unwrap();
        let map = CellMap::build(grid, store.grid_version(), area);
        assert!(map.is_current(store.grid_version(), area));
        assert!(!map.is_current(store.grid_version() + 1, area));

        // The middle of the bottom half is floor
        let cell = map.cell_at(area.x + 60, area.y + 34).unwrap();
        assert_eq!(cell.surface, roomplan::grid::Surface::Floor);
        assert!(map.cell_at(0, 0).is_none());
    }

    #[test]
    fn test_render_marks_ghost() {
        let area = Rect::new(0, 0, 120, 40);
        let mut store = store_for(area);
        assert!(store.start_drag_from_inventory("lamp", DragConstraints::new(1, 1)));
        let anchor = store.ghost().unwrap().anchor_cell_id;

        let map = CellMap::build(store.grid().unwrap(), store.grid_version(), area);
        let mut buf = Buffer::empty(area);
        RoomWidget::new(&store, &map).render(area, &mut buf);

        let painted = (area.top()..area.bottom())
            .flat_map(|row| (area.left()..area.right()).map(move |col| (col, row)))
            .filter(|&(col, row)| map.cell_at(col, row) == Some(anchor))
            .any(|(col, row)| buf[(col, row)].symbol() == "▒");
        assert!(painted);
    }
}
