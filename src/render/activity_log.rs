//! Activity log panel: recent store notifications, newest at the bottom.
//!
//! Entries fade with age so the latest gesture stands out.

use std::collections::VecDeque;
use std::time::Instant;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use roomplan::placement::EndReason;
use roomplan::state::StoreEvent;

use super::colors::{dim_color, GHOST_COLORS};

#[derive(Debug, Clone)]
pub struct ActivityEntry {
    pub timestamp: Instant,
    /// Short tag shown in brackets, e.g. the placed id
    pub tag: String,
    pub message: String,
    pub color: Color,
}

impl ActivityEntry {
    pub fn new(tag: String, message: String, color: Color) -> Self {
        Self {
            timestamp: Instant::now(),
            tag,
            message,
            color,
        }
    }

    pub fn age_seconds(&self) -> f32 {
        self.timestamp.elapsed().as_secs_f32()
    }

    /// Log line for a store notification. Grid, draft and ghost churn is not logged.
    pub fn from_store_event(event: &StoreEvent) -> Option<Self> {
        let neutral = Color::Rgb(150, 150, 160);
        let (tag, message, color) = match event {
            StoreEvent::SessionStarted {
                item_id,
                placed_id,
                replacement,
            } => {
                let verb = if *replacement { "picked up" } else { "dragging" };
                (placed_id.clone(), format!("{verb} {item_id}"), neutral)
            }
            StoreEvent::Staged { placed_id } => (placed_id.clone(), "staged".to_string(), GHOST_COLORS.pending),
            StoreEvent::SessionEnded { placed_id, reason } => {
                let (text, color) = match reason {
                    EndReason::Committed => ("committed", GHOST_COLORS.valid),
                    EndReason::Cancelled => ("cancelled", neutral),
                    EndReason::Deleted => ("deleted", GHOST_COLORS.invalid),
                    EndReason::Previewed => ("previewed", neutral),
                };
                (placed_id.clone(), text.to_string(), color)
            }
            StoreEvent::PlacementFailed { item_id } => {
                (item_id.clone(), "no free spot".to_string(), GHOST_COLORS.invalid)
            }
            StoreEvent::GridChanged { .. } | StoreEvent::DraftChanged { .. } | StoreEvent::GhostChanged { .. } => {
                return None
            }
        };
        Some(Self::new(tag, message, color))
    }
}

/// Bounded list of recent entries
#[derive(Debug)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
    max_entries: usize,
}

impl ActivityLog {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_entries),
            max_entries,
        }
    }

    /// Add an entry, dropping the oldest when full
    pub fn push(&mut self, entry: ActivityEntry) {
        if self.entries.len() >= self.max_entries {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn add(&mut self, tag: String, message: String, color: Color) {
        self.push(ActivityEntry::new(tag, message, color));
    }

    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(50)
    }
}

pub struct ActivityLogWidget<'a> {
    log: &'a ActivityLog,
    /// Seconds until an entry is fully faded
    max_age: f32,
    title: Option<&'a str>,
}

impl<'a> ActivityLogWidget<'a> {
    pub fn new(log: &'a ActivityLog) -> Self {
        Self {
            log,
            max_age: 30.0,
            title: Some("Activity"),
        }
    }

    /// Start fading after 5 seconds, never below 30% brightness
    fn opacity_for_age(&self, age_seconds: f32) -> f32 {
        let fade_start = 5.0;
        if age_seconds < fade_start {
            1.0
        } else {
            let fade_progress = (age_seconds - fade_start) / (self.max_age - fade_start);
            (1.0 - fade_progress).clamp(0.3, 1.0)
        }
    }
}

impl Widget for ActivityLogWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let mut y = area.y;
        if let Some(title) = self.title {
            let title_style = Style::default().fg(Color::Rgb(100, 200, 150));
            buf.set_stringn(area.x, y, format!(" {title} "), area.width as usize, title_style);
            y += 1;
        }

        let available_height = area.bottom().saturating_sub(y) as usize;
        if available_height == 0 {
            return;
        }

        let skip = self.log.len().saturating_sub(available_height);
        for entry in self.log.entries().skip(skip) {
            let opacity = self.opacity_for_age(entry.age_seconds());
            let tag_style = Style::default().fg(dim_color(entry.color, opacity));
            let msg_style = Style::default().fg(dim_color(Color::Rgb(180, 180, 190), opacity));

            // "[tag] message", tag cut to 12 columns
            let tag: String = if entry.tag.chars().count() > 12 {
                entry.tag.chars().take(9).chain("...".chars()).collect()
            } else {
                entry.tag.clone()
            };
            let right = area.right();
            let mut x = area.x;
            x = buf.set_stringn(x, y, "[", (right - x) as usize, msg_style).0;
            x = buf.set_stringn(x, y, &tag, right.saturating_sub(x) as usize, tag_style).0;
            x = buf.set_stringn(x, y, "] ", right.saturating_sub(x) as usize, msg_style).0;
            buf.set_stringn(x, y, &entry.message, right.saturating_sub(x) as usize, msg_style);

            y += 1;
            if y >= area.bottom() {
                break;
            }
        }
    }
}
