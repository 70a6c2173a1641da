use bon::bon;
use strum::{Display, EnumString, IntoStaticStr};

use crate::{Error, MAX_JETS};

/// Physical description of the print head
///
/// Both values differ between machines (and between revisions of the same machine), so there
/// are no defaults: callers always state the hardware they drive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct HeadConfig {
    jets: u8,
    mm_per_row: f64,
}

#[bon]
impl HeadConfig {
    /// Creates a validated [`HeadConfig`]
    ///
    /// * `jets` - number of simultaneously addressable nozzles, one raster row each
    /// * `mm_per_row` - distance in mm the head advances between two bands
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `jets` is outside `1..=16` or `mm_per_row` is not a
    /// positive, finite number.
    #[builder]
    pub fn new(jets: u8, mm_per_row: f64) -> Result<Self, Error> {
        if jets == 0 || jets > MAX_JETS {
            return Err(Error::InvalidConfig(format!(
                "jet count must be between 1 and {MAX_JETS}, got {jets}"
            )));
        }
        if !mm_per_row.is_finite() || mm_per_row <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "row pitch must be a positive distance in mm, got {mm_per_row}"
            )));
        }
        Ok(Self { jets, mm_per_row })
    }

    /// Returns the jet count `J`
    #[must_use]
    pub const fn jets(&self) -> u8 {
        self.jets
    }

    /// Returns the vertical pitch of one band, in mm
    #[must_use]
    pub const fn mm_per_row(&self) -> f64 {
        self.mm_per_row
    }

    /// Returns the width of one raster column, in mm
    ///
    /// Jets are spaced evenly over one band pitch, and columns use the same pitch so pixels stay
    /// square.
    #[must_use]
    pub fn mm_per_column(&self) -> f64 {
        self.mm_per_row / f64::from(self.jets)
    }

    /// Returns how many bytes one column's toolmask takes in the packed encoding
    #[must_use]
    pub const fn bytes_per_column(&self) -> usize {
        if self.jets <= 8 {
            1
        } else {
            2
        }
    }
}

/// Wire encodings of the firing commands
#[derive(Debug, Eq, PartialEq, Copy, Clone, EnumString, IntoStaticStr, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Encoding {
    /// Human-readable listing: one pattern select and one spray move per non-blank run
    Listing,
    /// Every column's toolmask packed into a base64 payload, one payload per band
    Packed,
}
