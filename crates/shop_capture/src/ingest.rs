use std::io::Read;

use crate::error::{LineRecord, LineRecordError};
use crate::reader::{BoundedLine, BoundedLineReader};

/// Turns a byte stream into numbered chat lines.
///
/// Blank lines are skipped and a trailing `\r` is removed. Lines that are
/// too long or not UTF-8 come back as errors so the host can log and move on.
pub struct LineIngestor<R: Read> {
    reader: BoundedLineReader<R>,
}

impl<R: Read> LineIngestor<R> {
    pub fn new(reader: R, max_line_bytes: usize) -> Self {
        Self {
            reader: BoundedLineReader::new(reader, max_line_bytes),
        }
    }

    fn record_error(line_number: usize, err: LineRecordError) -> LineRecord {
        LineRecord {
            line_number,
            outcome: Err(err),
        }
    }

    fn normalize_line(mut line: String) -> String {
        if line.ends_with('\r') {
            line.pop();
        }
        line
    }

    fn line_is_blank(line: &str) -> bool {
        line.chars().all(|ch| ch.is_whitespace())
    }
}

impl<R: Read> Iterator for LineIngestor<R> {
    type Item = LineRecord;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.reader.next()? {
                BoundedLine::IoError { line_number } => {
                    return Some(Self::record_error(line_number, LineRecordError::Io));
                }
                BoundedLine::LineTooLong {
                    line_number,
                    observed_bytes,
                    max_line_bytes,
                } => {
                    return Some(Self::record_error(
                        line_number,
                        LineRecordError::LineTooLong {
                            observed_bytes,
                            max_line_bytes,
                        },
                    ));
                }
                BoundedLine::Line { line_number, bytes } => {
                    let Ok(raw_line) = String::from_utf8(bytes) else {
                        return Some(Self::record_error(line_number, LineRecordError::InvalidUtf8));
                    };
                    let line = Self::normalize_line(raw_line);
                    if Self::line_is_blank(&line) {
                        continue;
                    }
                    return Some(LineRecord {
                        line_number,
                        outcome: Ok(line),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_numbered_lines_and_skips_blanks() {
        let data = b"Shop Information:\r\n\n   \nOwner: Bob\n";
        let records: Vec<_> = LineIngestor::new(std::io::Cursor::new(data), 64).collect();

        assert_eq!(
            records,
            vec![
                LineRecord {
                    line_number: 1,
                    outcome: Ok("Shop Information:".to_string()),
                },
                LineRecord {
                    line_number: 4,
                    outcome: Ok("Owner: Bob".to_string()),
                },
            ]
        );
    }

    #[test]
    fn reports_invalid_utf8_and_keeps_going() {
        let data = b"ok\n\xff\xfe\nafter\n";
        let records: Vec<_> = LineIngestor::new(std::io::Cursor::new(data), 64).collect();

        assert_eq!(records.len(), 3);
        assert_eq!(records[1].outcome, Err(LineRecordError::InvalidUtf8));
        assert_eq!(records[2].outcome.as_deref(), Ok("after"));
    }

    #[test]
    fn reports_oversized_lines() {
        let data = b"0123456789abcdef\nshort\n";
        let records: Vec<_> = LineIngestor::new(std::io::Cursor::new(data), 8).collect();

        assert!(matches!(
            records[0].outcome,
            Err(LineRecordError::LineTooLong {
                observed_bytes: 16,
                max_line_bytes: 8
            })
        ));
        assert_eq!(records[1].outcome.as_deref(), Ok("short"));
    }
}
