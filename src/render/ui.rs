use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

use roomplan::placement::{CatalogItem, SessionPhase};
use roomplan::state::PlacementStore;

use super::colors::GHOST_COLORS;

const BAR_BG: Color = Color::Rgb(25, 25, 35);
const LABEL: Color = Color::Rgb(100, 100, 120);
const VALUE: Color = Color::Rgb(180, 180, 200);
const ACCENT: Color = Color::Rgb(100, 200, 150);

/// Write `text` at (x, y) without crossing `right`; returns the next free column
fn put(buf: &mut Buffer, x: u16, y: u16, right: u16, text: &str, style: Style) -> u16 {
    if x >= right {
        return x;
    }
    let (end, _) = buf.set_stringn(x, y, text, (right - x) as usize, style);
    end
}

/// Status bar at the bottom of the screen
pub struct StatusBar<'a> {
    store: &'a PlacementStore,
    source: &'a str,
    fps: u32,
}

impl<'a> StatusBar<'a> {
    pub fn new(store: &'a PlacementStore) -> Self {
        Self {
            store,
            source: "",
            fps: 30,
        }
    }

    /// Where events come from ("demo", a file name, or empty)
    pub fn source(mut self, source: &'a str) -> Self {
        self.source = source;
        self
    }

    pub fn fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        buf.set_style(area, Style::default().bg(BAR_BG));
        let right = area.right().saturating_sub(1);
        let y = area.y;
        let label = Style::default().fg(LABEL);
        let value = Style::default().fg(VALUE);

        let mut x = area.x + 1;
        x = put(buf, x, y, right, "▦ ROOMPLAN", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)) + 2;

        let (phase_text, phase_color) = match self.store.phase() {
            SessionPhase::Idle => ("IDLE", LABEL),
            SessionPhase::Dragging => ("DRAGGING", VALUE),
            SessionPhase::Staged => ("STAGED", GHOST_COLORS.pending),
        };
        x = put(buf, x, y, right, phase_text, Style::default().fg(phase_color).add_modifier(Modifier::BOLD)) + 2;

        if let Some(session) = self.store.session() {
            let what = format!("{} ({}) {}°", session.item_id, session.placed_id, session.shape.rotation.degrees());
            x = put(buf, x, y, right, &what, value) + 2;
        }

        if let Some(ghost) = self.store.ghost() {
            let (text, color) = match ghost.rejection {
                None => (format!("✓ {}", ghost.anchor_cell_id), GHOST_COLORS.valid),
                Some(reason) => (format!("✗ {} {}", ghost.anchor_cell_id, reason), GHOST_COLORS.invalid),
            };
            x = put(buf, x, y, right, &text, Style::default().fg(color)) + 2;
        }

        let draft = format!("Items: {}", self.store.draft_items().len());
        x = put(buf, x, y, right, &draft, value) + 2;

        let zoom = format!("Zoom: {:.2}x", self.store.view().zoom);
        x = put(buf, x, y, right, &zoom, label) + 2;

        if !self.source.is_empty() {
            x = put(buf, x, y, right, &format!("[{}]", self.source), label) + 2;
        }
        let _ = put(buf, x, y, right, &format!("{}fps", self.fps), label);

        let help_text = "?:help";
        let help_x = area.right().saturating_sub(help_text.len() as u16 + 1);
        if help_x > area.x {
            put(buf, help_x, y, area.right(), help_text, label);
        }
    }
}

/// Catalog list; number keys pick from it
pub struct InventoryPanel<'a> {
    catalog: &'a [CatalogItem],
    active_item: Option<&'a str>,
}

impl<'a> InventoryPanel<'a> {
    pub fn new(catalog: &'a [CatalogItem]) -> Self {
        Self {
            catalog,
            active_item: None,
        }
    }

    pub fn active_item(mut self, item_id: Option<&'a str>) -> Self {
        self.active_item = item_id;
        self
    }
}

impl Widget for InventoryPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let right = area.right();
        put(buf, area.x, area.y, right, " Inventory ", Style::default().fg(ACCENT));

        let key_style = Style::default().fg(Color::Rgb(200, 200, 100)).add_modifier(Modifier::BOLD);
        for (slot, item) in self.catalog.iter().take(9).enumerate() {
            let y = area.y + 1 + slot as u16;
            if y >= area.bottom() {
                break;
            }
            let active = self.active_item == Some(item.item_id.as_str());
            let text_style = if active {
                Style::default().fg(GHOST_COLORS.valid).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(VALUE)
            };
            let x = put(buf, area.x + 1, y, right, &format!("{}", slot + 1), key_style) + 1;
            let surface = item
                .allowed_surface
                .map_or("any", |surface| surface.as_str());
            let line = format!("{} {}x{} {}", item.item_id, item.x_length, item.y_length, surface);
            put(buf, x, y, right, &line, text_style);
        }
    }
}

/// Help overlay widget
pub struct HelpOverlay;

impl Widget for HelpOverlay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Style::default().bg(Color::Rgb(20, 20, 30)));

        let controls = [
            ("1-9", "Pick an item from the inventory"),
            ("click", "Pick up a placed item"),
            ("drag", "Move the ghost"),
            ("release", "Stage the placement"),
            ("Enter", "Commit (stages first if needed)"),
            ("Esc", "Cancel the drag"),
            ("x, Del", "Delete the dragged item"),
            ("r", "Rotate a quarter turn"),
            ("←↑↓→", "Pan"),
            ("+/-", "Zoom in/out"),
            ("g", "Toggle grid lines"),
            ("?", "Toggle this help"),
            ("q", "Quit"),
        ];

        let box_width = 50u16.min(area.width);
        let box_height = (controls.len() as u16 + 5).min(area.height);
        if box_width < 20 || box_height < 5 {
            return;
        }
        let box_area = Rect::new(
            area.x + (area.width - box_width) / 2,
            area.y + (area.height - box_height) / 2,
            box_width,
            box_height,
        );
        buf.set_style(box_area, Style::default().bg(Color::Rgb(35, 35, 45)));

        let border = Style::default().fg(ACCENT);
        let (left, top) = (box_area.left(), box_area.top());
        let (last_col, last_row) = (box_area.right() - 1, box_area.bottom() - 1);
        for x in left..=last_col {
            buf[(x, top)].set_char('─').set_style(border);
            buf[(x, last_row)].set_char('─').set_style(border);
        }
        for y in top..=last_row {
            buf[(left, y)].set_char('│').set_style(border);
            buf[(last_col, y)].set_char('│').set_style(border);
        }
        buf[(left, top)].set_char('╭').set_style(border);
        buf[(last_col, top)].set_char('╮').set_style(border);
        buf[(left, last_row)].set_char('╰').set_style(border);
        buf[(last_col, last_row)].set_char('╯').set_style(border);

        let title = " ROOMPLAN Controls ";
        let title_x = left + box_width.saturating_sub(title.len() as u16) / 2;
        put(buf, title_x, top, last_col, title, border.add_modifier(Modifier::BOLD));

        let key_style = Style::default().fg(Color::Rgb(200, 200, 100)).add_modifier(Modifier::BOLD);
        let desc_style = Style::default().fg(VALUE);
        for (i, (key, desc)) in controls.iter().enumerate() {
            let y = top + 2 + i as u16;
            if y >= last_row - 1 {
                break;
            }
            put(buf, left + 3, y, last_col, key, key_style);
            put(buf, left + 14, y, last_col, desc, desc_style);
        }

        let footer = "Press any key to close";
        let footer_x = left + box_width.saturating_sub(footer.len() as u16) / 2;
        put(buf, footer_x, last_row - 1, last_col, footer, Style::default().fg(LABEL));
    }
}

/// Shown in place of the room while the grid cannot be built
pub struct EmptyStateWidget {
    message: &'static str,
    hint: &'static str,
}

impl EmptyStateWidget {
    pub fn waiting_for_room() -> Self {
        Self {
            message: "Room not measured yet",
            hint: "Enlarge the terminal to lay out the grid",
        }
    }
}

impl Widget for EmptyStateWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 2 {
            return;
        }
        let center_y = area.y + area.height / 2;
        for (offset, text, color) in [(0, self.message, VALUE), (1, self.hint, LABEL)] {
            let x = area.x + area.width.saturating_sub(text.chars().count() as u16) / 2;
            put(buf, x, center_y - 1 + offset, area.right(), text, Style::default().fg(color));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomplan::config::demo_catalog;

    fn row_text(buf: &Buffer, area: Rect, y: u16) -> String {
        (area.left()..area.right()).map(|x| buf[(x, y)].symbol()).collect()
    }

    #[test]
    fn test_status_bar_shows_phase() {
        let store = PlacementStore::default();
        let area = Rect::new(0, 0, 100, 1);
        let mut buf = Buffer::empty(area);
        StatusBar::new(&store).source("demo").render(area, &mut buf);
        let text = row_text(&buf, area, 0);
        assert!(text.contains("IDLE"));
        assert!(text.contains("[demo]"));
        assert!(text.contains("?:help"));
    }

    #[test]
    fn test_inventory_lists_numbered_items() {
        let catalog = demo_catalog();
        let area = Rect::new(0, 0, 30, 12);
        let mut buf = Buffer::empty(area);
        InventoryPanel::new(&catalog).active_item(Some("rug")).render(area, &mut buf);
        assert!(row_text(&buf, area, 1).contains("1 sofa 2x3 floor"));
        assert!(row_text(&buf, area, 5).contains("plant 1x1 any"));
    }

    #[test]
    fn test_help_overlay_fits_small_area() {
        let area = Rect::new(0, 0, 10, 4);
        let mut buf = Buffer::empty(area);
        HelpOverlay.render(area, &mut buf);
    }
}
