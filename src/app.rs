use std::io;
use std::path::PathBuf;
use std::sync::mpsc;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Widget},
    Terminal,
};
use tracing::{debug, info, warn};

use roomplan::config::RoomConfig;
use roomplan::event::{create_event_queue, dispatch, read_complete_events, EventReceiver, FileWatcher, RoomEvent};
use roomplan::placement::SessionPhase;
use roomplan::state::{PlacementStore, StoreEvent};

use crate::clock::{pulse, FrameClock};
use crate::input::{InputEvent, InputHandler};
use crate::render::room::ROW_SCALE;
use crate::render::{
    container_offset_for, image_size_for, to_screen, ActivityEntry, ActivityLog, ActivityLogWidget, CellMap,
    EmptyStateWidget, HelpOverlay, InventoryPanel, RoomWidget, StatusBar,
};

/// The terminal has one mouse
const MOUSE_POINTER: u64 = 0;

const SIDE_PANEL_WIDTH: u16 = 32;
const ZOOM_STEP: f32 = 1.1;
const ERROR_COLOR: Color = Color::Rgb(255, 80, 80);

/// Application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub file_path: Option<PathBuf>,
    pub demo_mode: bool,
    pub show_grid_lines: bool,
    pub room: RoomConfig,
}

/// Screen regions for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
struct ScreenLayout {
    room: Rect,
    room_inner: Rect,
    inventory: Rect,
    activity: Rect,
    status: Rect,
}

impl ScreenLayout {
    fn compute(area: Rect, catalog_len: usize) -> Self {
        let main_height = area.height.saturating_sub(1);
        let status = Rect::new(area.x, area.y + main_height, area.width, area.height.min(1));

        let side_width = SIDE_PANEL_WIDTH.min(area.width / 3);
        let room = Rect::new(area.x, area.y, area.width - side_width, main_height);
        let room_inner = Block::bordered().inner(room);

        let side_x = area.x + room.width;
        let inventory_height = (catalog_len.min(9) as u16 + 2).min(main_height);
        let inventory = Rect::new(side_x, area.y, side_width, inventory_height);
        let activity = Rect::new(
            side_x,
            area.y + inventory_height,
            side_width,
            main_height - inventory_height,
        );

        Self {
            room,
            room_inner,
            inventory,
            activity,
            status,
        }
    }
}

fn screen_area(terminal: &Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<Rect> {
    let size = terminal.size()?;
    Ok(Rect::new(0, 0, size.width, size.height))
}

/// Main application state
pub struct App {
    config: AppConfig,
    store: PlacementStore,
    /// Store notifications, collected by an observer
    store_events: mpsc::Receiver<StoreEvent>,
    cell_map: CellMap,
    frame_clock: FrameClock,
    input_handler: InputHandler,
    activity_log: ActivityLog,
    show_help: bool,
    show_grid_lines: bool,
    room_area: Option<Rect>,
    running: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let mut store = PlacementStore::new(config.room.layout());
        store.set_catalog(config.room.catalog.iter().cloned());
        store.set_view(config.room.view);

        let (tx, store_events) = mpsc::channel();
        store.subscribe(move |event: &StoreEvent, _: &PlacementStore| {
            let _ = tx.send(event.clone());
        });

        Self {
            show_grid_lines: config.show_grid_lines,
            config,
            store,
            store_events,
            cell_map: CellMap::default(),
            frame_clock: FrameClock::new(),
            input_handler: InputHandler::new(),
            activity_log: ActivityLog::new(100),
            show_help: false,
            room_area: None,
            running: true,
        }
    }

    /// Run the application
    pub async fn run(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal).await;

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
        terminal.show_cursor()?;

        result
    }

    async fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
        let (event_tx, mut event_rx) = create_event_queue();

        // The room must be measured before file events that hover by pointer
        let mut layout = self.layout_for(screen_area(terminal)?);
        self.sync_room_area(layout.room_inner);

        let _watcher = if self.config.demo_mode {
            tokio::spawn(crate::demo::generate_demo_events(
                event_tx.inner(),
                self.config.room.catalog.clone(),
                self.config.room.divisions,
            ));
            None
        } else if let Some(path) = self.config.file_path.clone() {
            // Replay first, then tail from where the replay stopped
            let watcher = match read_complete_events(&path) {
                Ok((events, offset)) => {
                    info!(count = events.len(), path = %path.display(), "replaying existing events");
                    for event in &events {
                        self.apply_event(event);
                    }
                    FileWatcher::starting_at(&path, event_tx.inner(), offset)
                }
                Err(e) => {
                    warn!(error = %e, "could not replay existing events");
                    if path.exists() {
                        self.activity_log.add("file".to_string(), e.to_string(), ERROR_COLOR);
                    }
                    FileWatcher::new(&path, event_tx.inner())
                }
            }
            .map_err(io::Error::other)?;
            Some(watcher)
        } else {
            None
        };

        while self.running {
            self.handle_input();
            self.process_incoming_events(&mut event_rx);
            self.drain_store_events();

            if self.frame_clock.should_render() {
                layout = self.layout_for(screen_area(terminal)?);
                self.sync_room_area(layout.room_inner);
                self.refresh_cell_map(layout.room_inner);

                terminal.draw(|frame| self.render(&layout, frame.buffer_mut()))?;
                self.frame_clock.frame_rendered();
            }

            tokio::time::sleep(self.frame_clock.time_until_next_frame()).await;
        }

        Ok(())
    }

    fn layout_for(&self, area: Rect) -> ScreenLayout {
        ScreenLayout::compute(area, self.config.room.catalog.len())
    }

    /// Keep the store's image size and container offset in step with the room pane
    fn sync_room_area(&mut self, inner: Rect) {
        if self.room_area == Some(inner) {
            return;
        }
        self.room_area = Some(inner);
        let mut view = *self.store.view();
        view.container_offset = container_offset_for(inner);
        self.store.set_view(view);
        self.store.set_image_size(image_size_for(inner));
        debug!(width = inner.width, height = inner.height, "room pane resized");
    }

    fn refresh_cell_map(&mut self, inner: Rect) {
        let Some(grid) = self.store.grid() else {
            return;
        };
        if !self.cell_map.is_current(self.store.grid_version(), inner) {
            self.cell_map = CellMap::build(grid, self.store.grid_version(), inner);
        }
    }

    fn apply_event(&mut self, event: &RoomEvent) {
        if let RoomEvent::Image { .. } = event {
            // The terminal decides the image size here
            debug!("ignoring image event in the editor");
            return;
        }
        if !dispatch(&mut self.store, event) {
            debug!(kind = event.kind(), "event had no effect");
        }
    }

    fn process_incoming_events(&mut self, rx: &mut EventReceiver) {
        while let Ok(event) = rx.try_recv() {
            self.apply_event(&event);
        }
    }

    /// Move store notifications into the activity log. A failed auto-placement
    /// aborts its drag.
    fn drain_store_events(&mut self) {
        while let Ok(event) = self.store_events.try_recv() {
            if let StoreEvent::PlacementFailed { .. } = event {
                self.store.cancel_drag();
            }
            if let Some(entry) = ActivityEntry::from_store_event(&event) {
                self.activity_log.push(entry);
            }
        }
    }

    fn handle_input(&mut self) {
        let timeout = std::time::Duration::from_millis(1);

        let Some(event) = self.input_handler.poll(timeout) else {
            return;
        };
        match event {
            InputEvent::Quit => self.running = false,

            InputEvent::ToggleHelp => {
                self.show_help = !self.show_help;
                self.input_handler.set_help_visible(self.show_help);
            }

            InputEvent::CloseHelp => {
                self.show_help = false;
                self.input_handler.set_help_visible(false);
            }

            InputEvent::PickItem(slot) => {
                if let Some(item) = self.config.room.catalog.get(slot) {
                    let item_id = item.item_id.clone();
                    self.store.start_drag_from_catalog(&item_id);
                }
            }

            InputEvent::Commit => {
                if self.store.phase() == SessionPhase::Dragging && !self.store.stage_placement() {
                    self.report_rejection();
                }
                self.store.commit_placement();
            }

            InputEvent::Cancel => {
                self.store.cancel_drag();
            }

            InputEvent::Delete => {
                self.store.delete_dragged_item();
            }

            InputEvent::Rotate => {
                self.store.rotate_dragged_item();
            }

            InputEvent::Pan { dx, dy } => {
                self.store.pan_by(dx as f32, dy as f32 * ROW_SCALE);
            }

            InputEvent::ZoomIn => self.store.zoom_by(ZOOM_STEP),

            InputEvent::ZoomOut => self.store.zoom_by(1.0 / ZOOM_STEP),

            InputEvent::ToggleGridLines => self.show_grid_lines = !self.show_grid_lines,

            InputEvent::MousePress { x, y } => {
                if !self.in_room(x, y) {
                    return;
                }
                if self.store.session().is_none() {
                    let hit = self
                        .cell_map
                        .cell_at(x, y)
                        .and_then(|cell| self.store.item_at(&cell))
                        .map(|item| item.id.clone());
                    if let Some(placed_id) = hit {
                        self.store.start_drag_from_placed(&placed_id);
                    }
                }
                self.store.pointer_down(MOUSE_POINTER, to_screen(x, y));
            }

            InputEvent::MouseDrag { x, y } => {
                if self.in_room(x, y) {
                    self.store.pointer_move(MOUSE_POINTER, to_screen(x, y));
                } else {
                    self.store.pointer_leave();
                }
            }

            InputEvent::MouseRelease { .. } => {
                if self.store.pointer_up(MOUSE_POINTER) && !self.store.stage_placement() {
                    self.report_rejection();
                }
            }

            // The next frame picks up the new size
            InputEvent::Resize { .. } => {}

            InputEvent::None => {}
        }
    }

    fn in_room(&self, x: u16, y: u16) -> bool {
        self.room_area.is_some_and(|area| area.contains((x, y).into()))
    }

    fn report_rejection(&mut self) {
        if let Some(ghost) = self.store.ghost() {
            if let Some(reason) = ghost.rejection {
                self.activity_log
                    .add(ghost.anchor_cell_id.to_string(), format!("can't place: {reason}"), ERROR_COLOR);
            }
        }
    }

    fn render(&self, layout: &ScreenLayout, buf: &mut Buffer) {
        Block::bordered()
            .title(" Room ")
            .border_style(Style::default().fg(Color::Rgb(60, 60, 75)))
            .render(layout.room, buf);

        if self.store.grid().is_some() {
            RoomWidget::new(&self.store, &self.cell_map)
                .grid_lines(self.show_grid_lines)
                .pulse(pulse(self.frame_clock.elapsed(), 1.5))
                .render(layout.room_inner, buf);
        } else {
            EmptyStateWidget::waiting_for_room().render(layout.room_inner, buf);
        }

        let active_item = self.store.session().map(|session| session.item_id.as_str());
        InventoryPanel::new(&self.config.room.catalog)
            .active_item(active_item)
            .render(layout.inventory, buf);
        ActivityLogWidget::new(&self.activity_log).render(layout.activity, buf);

        let source = if self.config.demo_mode {
            "demo".to_string()
        } else {
            self.config
                .file_path
                .as_ref()
                .and_then(|path| path.file_name())
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        StatusBar::new(&self.store)
            .source(&source)
            .fps(self.frame_clock.fps())
            .render(layout.status, buf);

        if self.show_help {
            let main = Rect::new(layout.room.x, layout.room.y, layout.status.width, layout.room.height);
            HelpOverlay.render(main, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_splits_screen() {
        let layout = ScreenLayout::compute(Rect::new(0, 0, 120, 40), 9);
        assert_eq!(layout.status, Rect::new(0, 39, 120, 1));
        assert_eq!(layout.room.width + layout.inventory.width, 120);
        assert_eq!(layout.inventory.height, 11);
        assert_eq!(layout.activity.y, 11);
        assert_eq!(layout.room_inner, Rect::new(1, 1, 86, 37));
    }

    #[test]
    fn test_layout_survives_tiny_terminal() {
        let layout = ScreenLayout::compute(Rect::new(0, 0, 2, 1), 9);
        assert_eq!(layout.room.height, 0);
        assert_eq!(layout.activity.height, 0);
    }

    #[test]
    fn test_app_measures_room_and_logs() {
        let mut app = App::new(AppConfig {
            show_grid_lines: true,
            ..AppConfig::default()
        });
        let layout = app.layout_for(Rect::new(0, 0, 120, 40));
        app.sync_room_area(layout.room_inner);
        app.refresh_cell_map(layout.room_inner);
        assert!(app.store.grid().is_some());

        app.apply_event(&RoomEvent::StartFromInventory {
            item_id: "lamp".to_string(),
            constraints: None,
        });
        app.apply_event(&RoomEvent::Stage);
        app.apply_event(&RoomEvent::Commit);
        app.drain_store_events();

        assert_eq!(app.store.draft_items().len(), 1);
        let messages: Vec<_> = app.activity_log.entries().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["dragging lamp", "staged", "committed"]);

        let mut buf = Buffer::empty(Rect::new(0, 0, 120, 40));
        app.render(&layout, &mut buf);
    }
}
