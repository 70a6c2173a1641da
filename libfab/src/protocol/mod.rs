#![allow(clippy::module_name_repetitions)]

/// Human-readable encoder
pub mod listing;
/// Base64 payload encoder
pub mod packed;

use std::io::{self, Write};

use crate::{toolmask::Band, HeadConfig};

/// Turns a closed band into fabricator commands
///
/// Implementations only write the body of a layer: one pass of the ink head per band. They never
/// fail on a well-formed [`Band`]; the only errors are those of the output writer. Blank bands
/// produce no output.
pub trait BandEncoder {
    /// Writes the commands for `band` to `out`
    ///
    /// # Errors
    ///
    /// Returns any error raised by `out`.
    fn encode_band<W: Write + ?Sized>(&mut self, band: &Band<'_>, out: &mut W) -> io::Result<()>;
}

/// Converts band and column numbers to head coordinates in mm
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Geometry {
    mm_per_row: f64,
    mm_per_column: f64,
}

#[allow(clippy::cast_precision_loss)]
impl Geometry {
    pub(crate) fn new(config: &HeadConfig) -> Self {
        Self {
            mm_per_row: config.mm_per_row(),
            mm_per_column: config.mm_per_column(),
        }
    }

    /// X position of the head for band `index`
    pub(crate) fn band_x(&self, index: usize) -> f64 {
        index as f64 * self.mm_per_row
    }

    /// Y position of the left edge of `column`
    pub(crate) fn column_y(&self, column: usize) -> f64 {
        column as f64 * self.mm_per_column
    }
}
