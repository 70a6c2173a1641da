pub(crate) mod header;

pub use header::{RasterHeader, MAX_WIDTH};

use crate::Error;
use itertools::Itertools;
use std::io::{self, BufRead, ErrorKind};
use tracing::{debug, enabled, instrument, trace, Level};

/// Streaming reader over the rows of a binary PBM (`P4`) image
///
/// Rows are returned bit-packed, most significant bit first, exactly as stored in the file:
/// bit 7 of the first byte is the leftmost pixel and a set bit means "deposit here". Only one
/// row is buffered; it is overwritten by every call to [`RasterReader::next_row`].
#[derive(Debug)]
pub struct RasterReader<R> {
    reader: R,
    header: RasterHeader,
    row: Vec<u8>,
    rows_read: usize,
}

impl<R: BufRead> RasterReader<R> {
    /// Parses the PBM header and prepares to read rows
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedHeader`] if the header is missing, not numeric, or the magic is
    /// anything but `P4`. I/O failures while reading the header are returned as [`Error::Io`].
    #[instrument(skip(reader), level = "debug")]
    pub fn new(mut reader: R) -> Result<Self, Error> {
        let header = header::read_header(&mut reader)?;
        debug!(
            "Raster width, height, stride: {:?}",
            (header.width, header.height, header.stride)
        );
        Ok(Self {
            reader,
            header,
            row: vec![0; header.stride],
            rows_read: 0,
        })
    }

    /// Returns the parsed header
    #[must_use]
    pub const fn header(&self) -> RasterHeader {
        self.header
    }

    /// Returns how many rows have been read so far
    #[must_use]
    pub const fn rows_read(&self) -> usize {
        self.rows_read
    }

    /// Reads the next row, or returns `None` once every row the header declares has been read
    ///
    /// # Errors
    ///
    /// Returns [`Error::TruncatedInput`] if the stream ends before `stride` bytes could be read.
    pub fn next_row(&mut self) -> Result<Option<&[u8]>, Error> {
        if self.rows_read == self.header.height {
            return Ok(None);
        }
        let filled = fill(&mut self.reader, &mut self.row)?;
        if filled < self.header.stride {
            return Err(Error::TruncatedInput {
                row: self.rows_read,
                expected: self.header.stride,
                actual: filled,
            });
        }
        if enabled!(Level::TRACE) {
            trace!(
                "Row {:>5}: {:02X}",
                self.rows_read,
                self.row.iter().format("")
            );
        }
        self.rows_read += 1;
        Ok(Some(&self.row))
    }
}

// Like `read_exact`, but reports how much was read before the stream ended
fn fill(r: &mut impl BufRead, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
