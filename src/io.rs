use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::constants::VIRTUAL_MEMORY_SIZE;
use crate::error::{Result, VmError};

/// Parse one trace record. `line` is 1-based and only used for errors.
pub fn parse_address(line: usize, text: &str) -> Result<u32> {
    let value: u64 = text.parse().map_err(|_| VmError::MalformedAddress {
        line,
        text: text.to_string(),
    })?;
    if value >= VIRTUAL_MEMORY_SIZE as u64 {
        return Err(VmError::AddressOutOfRange { line, value });
    }
    Ok(value as u32)
}

/// Lazy reader of logical addresses, one per line. Blank lines are skipped.
///
/// Lines are read as raw bytes, so a line that is not UTF-8 is reported as a
/// malformed record on its own line instead of an I/O failure.
pub struct AddressTrace<R> {
    reader: R,
    buf: Vec<u8>,
    line: usize,
}

impl<R: BufRead> AddressTrace<R> {
    pub fn new(reader: R) -> Self {
        AddressTrace {
            reader,
            buf: Vec::new(),
            line: 0,
        }
    }

    /// 1-based number of the last line read
    pub fn line(&self) -> usize {
        self.line
    }
}

impl AddressTrace<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|source| VmError::TraceOpen {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for AddressTrace<R> {
    type Item = Result<u32>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            self.line += 1;

            let text = match std::str::from_utf8(&self.buf) {
                Ok(text) => text.trim(),
                Err(_) => {
                    return Some(Err(VmError::MalformedAddress {
                        line: self.line,
                        text: String::from_utf8_lossy(&self.buf).trim().to_string(),
                    }));
                }
            };
            if text.is_empty() {
                continue;
            }
            return Some(parse_address(self.line, text));
        }
    }
}
