//! Purpose: Encode and decode the plain-text record layout.
//! Exports: `encode_record`, `RecordReader`.
//! Role: Single owner of the on-disk shape; the store never touches lines directly.
//! Invariants: One field per line, four lines per record, in `FIELD_NAMES` order.
//! Invariants: No escaping; callers validate fields before encoding.
use std::io::{self, BufRead, Write};

use crate::core::error::{Error, ErrorKind, io_error_kind};
use crate::core::record::{FIELD_NAMES, Record};

pub fn encode_record<W: Write>(record: &Record, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "{}", record.id)?;
    writeln!(writer, "{}", record.name)?;
    writeln!(writer, "{}", record.phone)?;
    writeln!(writer, "{}", record.address)
}

/// Lazily decodes records from a line-oriented reader.
///
/// Blank lines in front of an id are skipped, so files hand-edited with spacing
/// between records still load. A record cut off by end of input yields a
/// `Corrupt` error pointing at the line where it started, and iteration stops.
pub struct RecordReader<R> {
    reader: R,
    line_no: u64,
    buf: String,
    done: bool,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            buf: String::new(),
            done: false,
        }
    }

    fn next_line(&mut self) -> io::Result<Option<String>> {
        self.buf.clear();
        if self.reader.read_line(&mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        let line = self.buf.strip_suffix('\n').unwrap_or(&self.buf);
        let line = line.strip_suffix('\r').unwrap_or(line);
        Ok(Some(line.to_string()))
    }

    fn read_record(&mut self) -> Result<Option<Record>, Error> {
        let id = loop {
            match self
                .next_line()
                .map_err(|err| read_error(err, self.line_no + 1))?
            {
                None => return Ok(None),
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => break line.trim().to_string(),
            }
        };
        let start = self.line_no;

        let mut rest = [String::new(), String::new(), String::new()];
        for (slot, field) in rest.iter_mut().zip(&FIELD_NAMES[1..]) {
            let line = self
                .next_line()
                .map_err(|err| read_error(err, self.line_no + 1).with_id(id.as_str()))?;
            match line {
                Some(line) => *slot = line,
                None => {
                    return Err(Error::new(ErrorKind::Corrupt)
                        .with_message(format!("record is missing its {field} line"))
                        .with_id(id)
                        .with_line(start));
                }
            }
        }
        let [name, phone, address] = rest;
        Ok(Some(Record {
            id,
            name,
            phone: phone.trim().to_string(),
            address,
        }))
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<Record, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

// `read_line` reports bytes that are not UTF-8 as `InvalidData`.
fn read_error(err: io::Error, line: u64) -> Error {
    let kind = io_error_kind(&err);
    let base = if kind == ErrorKind::Corrupt {
        Error::new(kind)
            .with_message("record line is not valid UTF-8")
            .with_hint("Re-save the record file as UTF-8 text.")
    } else {
        Error::new(kind).with_message("failed to read record")
    };
    base.with_line(line).with_source(err)
}
