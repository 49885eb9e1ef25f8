use std::io::{BufRead, BufReader, ErrorKind, Read};

const CHUNK_SIZE_BYTES: usize = 8192;

#[derive(Debug, Eq, PartialEq)]
pub enum BoundedLine {
    Line {
        line_number: usize,
        bytes: Vec<u8>,
    },
    LineTooLong {
        line_number: usize,
        observed_bytes: usize,
        max_line_bytes: usize,
    },
    IoError {
        line_number: usize,
    },
}

/// Splits a byte stream on `\n` without ever buffering more than
/// `max_line_bytes` of a single line. Oversized lines are drained and
/// reported, and reading resumes on the next line.
pub struct BoundedLineReader<R: Read> {
    reader: BufReader<R>,
    max_line_bytes: usize,
    line_number: usize,
    done: bool,
}

impl<R: Read> BoundedLineReader<R> {
    pub fn new(reader: R, max_line_bytes: usize) -> Self {
        Self {
            reader: BufReader::with_capacity(CHUNK_SIZE_BYTES, reader),
            max_line_bytes,
            line_number: 0,
            done: false,
        }
    }

    fn next_line_number(&mut self) -> usize {
        self.line_number += 1;
        self.line_number
    }
}

impl<R: Read> Iterator for BoundedLineReader<R> {
    type Item = BoundedLine;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut line = Vec::new();
        let mut observed_bytes = 0usize;
        let mut started = false;

        loop {
            let available = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(_) => {
                    self.done = true;
                    self.line_number += 1;
                    return Some(BoundedLine::IoError {
                        line_number: self.line_number,
                    });
                }
            };

            if available.is_empty() {
                self.done = true;
                if !started {
                    return None;
                }
                break;
            }
            started = true;

            let (segment_len, consumed, complete) =
                match available.iter().position(|b| *b == b'\n') {
                    Some(idx) => (idx, idx + 1, true),
                    None => (available.len(), available.len(), false),
                };

            observed_bytes = observed_bytes.saturating_add(segment_len);
            if observed_bytes <= self.max_line_bytes {
                line.extend_from_slice(&available[..segment_len]);
            } else if !line.is_empty() {
                line = Vec::new();
            }
            self.reader.consume(consumed);

            if complete {
                break;
            }
        }

        let line_number = self.next_line_number();
        if observed_bytes > self.max_line_bytes {
            return Some(BoundedLine::LineTooLong {
                line_number,
                observed_bytes,
                max_line_bytes: self.max_line_bytes,
            });
        }
        Some(BoundedLine::Line {
            line_number,
            bytes: line,
        })
    }
}
