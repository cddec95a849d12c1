//! Event Logger
//!
//! Append-only JSONL log of interaction events.

use naming_events::InteractionEvent;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use super::OutputError;

/// Writes interaction events to a JSONL file
pub struct EventLogger {
    writer: Option<BufWriter<File>>,
    event_count: u64,
}

impl EventLogger {
    /// Create a new event logger writing to the specified path
    pub fn new(path: impl AsRef<Path>) -> Result<Self, OutputError> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            event_count: 0,
        })
    }

    /// Create a logger that only counts events
    pub fn null() -> Self {
        Self {
            writer: None,
            event_count: 0,
        }
    }

    /// Number of events logged so far
    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    pub fn log(&mut self, event: &InteractionEvent) -> Result<(), OutputError> {
        self.event_count += 1;
        if let Some(ref mut writer) = self.writer {
            writeln!(writer, "{}", event.to_jsonl()?)?;
        }
        Ok(())
    }

    pub fn log_batch(&mut self, events: &[InteractionEvent]) -> Result<(), OutputError> {
        for event in events {
            self.log(event)?;
        }
        Ok(())
    }

    /// Flush the buffer to disk
    pub fn flush(&mut self) -> Result<(), OutputError> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!("failed to flush event logger: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use naming_events::InteractionKind;
    use std::fs;

    #[test]
    fn test_null_logger_counts() {
        let mut logger = EventLogger::null();
        let event = InteractionEvent::new(1, InteractionKind::Consensus, 0, "majority");
        logger.log_batch(&[event.clone(), event]).unwrap();
        assert_eq!(logger.event_count(), 2);
    }

    #[test]
    fn test_events_written_one_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        {
            let mut logger = EventLogger::new(&path).unwrap();
            logger
                .log(&InteractionEvent::new(1, InteractionKind::WordInvented, 3, "baba"))
                .unwrap();
            logger
                .log(
                    &InteractionEvent::new(1, InteractionKind::WordLearned, 3, "baba")
                        .with_listeners(vec![5]),
                )
                .unwrap();
        }

        let content = fs::read_to_string(&path).unwrap();
        let events: Vec<InteractionEvent> = content
            .lines()
            .map(|line| InteractionEvent::from_jsonl(line).unwrap())
            .collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].listeners, vec![5]);
    }
}
