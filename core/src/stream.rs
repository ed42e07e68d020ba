//! Event stream loading
//!
//! Decoded replays arrive as JSON Lines: one [`StreamEvent`] object per line,
//! in tick order. Blank lines are skipped.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::event::StreamEvent;

/// Errors raised while reading an event stream. All of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("failed to read event stream: {0}")]
    Io(#[from] io::Error),

    #[error("malformed event on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Iterator over the events of a JSON Lines stream.
pub struct EventStream<R: BufRead> {
    lines: io::Lines<R>,
    line: usize,
}

impl EventStream<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, StreamError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> EventStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }

    /// Line number of the last event returned (1-based).
    pub fn line(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> Iterator for EventStream<R> {
    type Item = Result<StreamEvent, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            return Some(serde_json::from_str(trimmed).map_err(|source| StreamError::Json {
                line: self.line,
                source,
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;

    #[test]
    fn test_reads_events_and_skips_blank_lines() {
        let input = "{\"tick\":0,\"type\":\"match_start\",\"tick_rate\":64}\n\n  \n{\"tick\":5,\"type\":\"half_ended\"}\n";
        let events: Vec<StreamEvent> = EventStream::new(input.as_bytes())
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event, Event::MatchStart { tick_rate: 64.0 });
        assert_eq!(events[1].tick, 5);
        assert_eq!(events[1].event, Event::HalfEnded);
    }

    #[test]
    fn test_reports_line_of_malformed_event() {
        let input = "{\"tick\":0,\"type\":\"match_end\"}\n\n{\"tick\":1,\"type\":\"nope\"}\n";
        let mut stream = EventStream::new(input.as_bytes());
        assert!(stream.next().unwrap().is_ok());
        match stream.next().unwrap() {
            Err(StreamError::Json { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_open_missing_file() {
        let err = EventStream::open(Path::new("/definitely/not/here.jsonl")).err();
        assert!(matches!(err, Some(StreamError::Io(_))));
    }
}
