#![allow(clippy::module_name_repetitions)]

pub(crate) mod compact;

use compact::{compact, Runs};
use tracing::trace;

use crate::MAX_JETS;

/// Per-column firing masks of one band
///
/// Cell `c` holds one bit per jet: bit `k` is set when jet `k` must fire over column `c`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Toolmask {
    cells: Vec<u16>,
}

impl Toolmask {
    /// Creates an all-zero [`Toolmask`] for an image `width` pixels wide
    #[must_use]
    pub fn new(width: usize) -> Self {
        Self {
            cells: vec![0; width],
        }
    }

    /// Returns the number of columns
    #[must_use]
    pub fn width(&self) -> usize {
        self.cells.len()
    }

    /// Returns the firing mask of every column
    #[must_use]
    pub fn cells(&self) -> &[u16] {
        &self.cells
    }

    /// Returns `true` if no jet fires anywhere
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|&m| m == 0)
    }

    /// Zeroes every column
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// ORs one bit-packed raster row into the mask of jet `jet_index`
    ///
    /// `row_bits` is read most significant bit first; its length is the row stride. Padding
    /// bits past the toolmask width are ignored.
    pub fn accumulate(&mut self, row_bits: &[u8], jet_index: u8) {
        debug_assert!(jet_index < MAX_JETS);
        let jet = 1u16 << jet_index;
        for (byte_index, &byte) in row_bits.iter().enumerate() {
            if byte == 0 {
                continue;
            }
            for bit in 0..8 {
                let Some(cell) = self.cells.get_mut(byte_index * 8 + bit) else {
                    return;
                };
                if byte & (0x80 >> bit) != 0 {
                    *cell |= jet;
                }
            }
        }
    }
}

/// A closed band: `rows` consecutive raster rows reduced to one [`Toolmask`]
#[derive(Debug, Clone, Copy)]
pub struct Band<'a> {
    /// zero-based band number, which is also the head pass number
    pub index: usize,
    /// image-global index of the last row folded into this band
    pub last_row: usize,
    /// rows folded into this band; less than the jet count only for a trailing partial band
    pub rows: u8,
    /// firing masks of the band
    pub toolmask: &'a Toolmask,
}

impl<'a> Band<'a> {
    /// Returns `true` if no jet fires in this band
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.toolmask.is_blank()
    }

    /// Returns the runs of identical firing patterns, see [`compact`]
    #[must_use]
    pub fn runs(&self) -> Runs<'a> {
        compact(self.toolmask.cells())
    }
}

/// Folds raster rows into bands of `jets` rows
///
/// Row `i` of the image drives jet `i mod jets`. The accumulator owns a single [`Toolmask`]
/// that is reused for every band and zeroed when the next band starts.
#[derive(Debug)]
pub struct BandAccumulator {
    toolmask: Toolmask,
    jets: u8,
    rows_pushed: usize,
    open_rows: u8,
}

impl BandAccumulator {
    /// Creates a [`BandAccumulator`] for an image `width` pixels wide and a head with `jets` jets
    #[must_use]
    pub fn new(width: usize, jets: u8) -> Self {
        debug_assert!((1..=MAX_JETS).contains(&jets));
        Self {
            toolmask: Toolmask::new(width),
            jets,
            rows_pushed: 0,
            open_rows: 0,
        }
    }

    /// Returns how many rows have been pushed
    #[must_use]
    pub const fn rows_pushed(&self) -> usize {
        self.rows_pushed
    }

    /// Adds the next raster row, returning the band it completes, if any
    pub fn push_row(&mut self, row_bits: &[u8]) -> Option<Band<'_>> {
        if self.open_rows == 0 {
            self.toolmask.clear();
        }
        // jet index of image row `i` is `i mod jets`
        let jet = self.open_rows;
        self.toolmask.accumulate(row_bits, jet);
        self.rows_pushed += 1;
        self.open_rows += 1;
        if self.open_rows < self.jets {
            return None;
        }
        self.open_rows = 0;
        Some(self.closed_band(self.jets))
    }

    /// Closes a trailing partial band, if rows are pending
    ///
    /// Jets that never received a row stay idle for that band.
    pub fn finish(&mut self) -> Option<Band<'_>> {
        if self.open_rows == 0 {
            return None;
        }
        let rows = self.open_rows;
        self.open_rows = 0;
        trace!("Closing partial band of {rows} rows");
        Some(self.closed_band(rows))
    }

    fn closed_band(&self, rows: u8) -> Band<'_> {
        let last_row = self.rows_pushed - 1;
        Band {
            index: last_row / usize::from(self.jets),
            last_row,
            rows,
            toolmask: &self.toolmask,
        }
    }
}
