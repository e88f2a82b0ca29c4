use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as tokio_mpsc;
use tracing::{debug, warn};

use crate::error::EventError;

use super::types::RoomEvent;

/// How often the file is re-read when no change notification arrives
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Tails a gesture file and forwards newly appended events to a channel
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    file_path: PathBuf,
}

impl FileWatcher {
    /// Start watching `path`. Only lines appended after this call are sent;
    /// use [`read_events`] for what is already there.
    pub fn new(
        path: impl AsRef<Path>,
        event_tx: tokio_mpsc::Sender<RoomEvent>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let file_path = path.as_ref();
        if !file_path.exists() {
            std::fs::write(file_path, "")?;
        }
        let offset = std::fs::metadata(file_path).map(|m| m.len()).unwrap_or(0);
        Self::starting_at(file_path, event_tx, offset)
    }

    /// Start watching `path` from byte `offset`, typically the end offset
    /// returned by [`read_complete_events`]. Every complete line from there
    /// on is sent exactly once.
    pub fn starting_at(
        path: impl AsRef<Path>,
        event_tx: tokio_mpsc::Sender<RoomEvent>,
        offset: u64,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let file_path = path.as_ref().to_path_buf();

        if !file_path.exists() {
            std::fs::write(&file_path, "")?;
        }

        let (tx, rx) = mpsc::channel();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                if let Ok(event) = res {
                    let _ = tx.send(event);
                }
            },
            Config::default(),
        )?;
        watcher.watch(&file_path, RecursiveMode::NonRecursive)?;
        debug!(path = %file_path.display(), offset, "watching gesture file");

        let watch_path = file_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut last_pos = offset;
            loop {
                match rx.recv_timeout(POLL_INTERVAL) {
                    Ok(_) | Err(mpsc::RecvTimeoutError::Timeout) => {}
                    Err(mpsc::RecvTimeoutError::Disconnected) => return,
                }
                let new_events = match read_new_lines(&watch_path, &mut last_pos) {
                    Ok(events) => events,
                    Err(e) => {
                        warn!(path = %watch_path.display(), error = %e, "gesture file unreadable");
                        continue;
                    }
                };
                for event in new_events {
                    if event_tx.blocking_send(event).is_err() {
                        return;
                    }
                }
            }
        });

        Ok(Self {
            _watcher: watcher,
            file_path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

/// Parse one line; blank lines are `None`
pub fn parse_line(line: &str) -> Option<serde_json::Result<RoomEvent>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(serde_json::from_str(line))
}

/// Read a whole gesture file. Any malformed line fails the read with its
/// 1-based line number.
pub fn read_events(path: impl AsRef<Path>) -> Result<Vec<RoomEvent>, EventError> {
    scan_events(path.as_ref(), true).map(|(events, _)| events)
}

/// Like [`read_events`], but stops before a last line with no newline yet and
/// returns the byte offset just past the final complete line. Hand that offset
/// to [`FileWatcher::starting_at`] so nothing is applied twice.
pub fn read_complete_events(path: impl AsRef<Path>) -> Result<(Vec<RoomEvent>, u64), EventError> {
    scan_events(path.as_ref(), false)
}

fn scan_events(path: &Path, include_partial: bool) -> Result<(Vec<RoomEvent>, u64), EventError> {
    let io_err = |source| EventError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = BufReader::new(File::open(path).map_err(io_err)?);

    let mut events = Vec::new();
    let mut offset = 0u64;
    let mut line = String::new();
    for number in 1.. {
        line.clear();
        let read = reader.read_line(&mut line).map_err(io_err)?;
        if read == 0 || (!include_partial && !line.ends_with('\n')) {
            break;
        }
        offset += read as u64;
        match parse_line(&line) {
            None => {}
            Some(Ok(event)) => events.push(event),
            Some(Err(source)) => return Err(EventError::Parse { line: number, source }),
        }
    }
    Ok((events, offset))
}

/// Read complete lines appended since `last_position`. A trailing line with
/// no newline yet is left for the next read.
fn read_new_lines(path: &Path, last_position: &mut u64) -> Result<Vec<RoomEvent>, std::io::Error> {
    let mut file = File::open(path)?;
    let current_size = file.metadata()?.len();

    // Truncated: start over
    if current_size < *last_position {
        *last_position = 0;
    }
    file.seek(SeekFrom::Start(*last_position))?;

    let mut reader = BufReader::new(file);
    let mut events = Vec::new();
    let mut line = String::new();
    loop {
        line.clear();
        let read = reader.read_line(&mut line)?;
        if read == 0 || !line.ends_with('\n') {
            break;
        }
        *last_position += read as u64;
        match parse_line(&line) {
            None => {}
            Some(Ok(event)) => events.push(event),
            Some(Err(e)) => warn!(error = %e, line = line.trim(), "skipping malformed event"),
        }
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_read_events_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"type": "image", "width": 800, "height": 600}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"type": "rotate"}}"#).unwrap();
        let events = read_events(file.path()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], RoomEvent::Rotate);
    }

    #[test]
    fn test_read_events_reports_line_number() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"type": "stage"}}"#).unwrap();
        writeln!(file, r#"{{"type": "teleport"}}"#).unwrap();
        let err = read_events(file.path()).unwrap_err();
        assert!(matches!(err, EventError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_complete_read_hands_off_partial_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let first = r#"{"type": "stage"}"#;
        write!(file, "{first}\n\n{}", r#"{"type": "com"#).unwrap();
        file.flush().unwrap();

        let (events, offset) = read_complete_events(file.path()).unwrap();
        assert_eq!(events, vec![RoomEvent::Stage]);
        assert_eq!(offset, first.len() as u64 + 2);

        // The tail picks up exactly where the replay stopped
        writeln!(file, r#"mit"}}"#).unwrap();
        file.flush().unwrap();
        let mut pos = offset;
        assert_eq!(read_new_lines(file.path(), &mut pos).unwrap(), vec![RoomEvent::Commit]);
        assert_eq!(read_new_lines(file.path(), &mut pos).unwrap(), Vec::<RoomEvent>::new());
    }

    #[test]
    fn test_tail_waits_for_complete_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}\n{}", r#"{"type": "stage"}"#, r#"{"type": "com"#).unwrap();
        file.flush().unwrap();

        let mut pos = 0;
        let events = read_new_lines(file.path(), &mut pos).unwrap();
        assert_eq!(events, vec![RoomEvent::Stage]);

        writeln!(file, r#"mit"}}"#).unwrap();
        file.flush().unwrap();
        let events = read_new_lines(file.path(), &mut pos).unwrap();
        assert_eq!(events, vec![RoomEvent::Commit]);
    }
}
