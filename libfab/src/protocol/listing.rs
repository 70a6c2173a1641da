use std::io::{self, Write};
use tracing::trace;

use super::{BandEncoder, Geometry};
use crate::{toolmask::Band, HeadConfig, Run};

/// Human-readable encoder: one pattern select and one spray move per run
///
/// ```text
/// T0
/// G0 X3.150 Y0.525 ; Line 23
/// T1 P1365 ; Pattern 555
/// G1 Y1.050 ; Spray pattern
/// ```
///
/// The head is parked at the first firing column with no tool selected, then each run selects
/// its pattern with `T1 P<mask>` and sprays up to the run's end with `G1`. Leading and trailing
/// idle columns are left out entirely. Idle columns between two firing runs are crossed with the
/// empty pattern `T1 P0`, since `T0` flushes the ink bar forward to the end of the line.
#[derive(Debug, Clone)]
pub struct Listing {
    geometry: Geometry,
}

impl Listing {
    /// Creates a [`Listing`] encoder for the given head
    #[must_use]
    pub fn new(config: &HeadConfig) -> Self {
        Self {
            geometry: Geometry::new(config),
        }
    }
}

impl Listing {
    fn spray<W: Write + ?Sized>(&self, run: &Run, out: &mut W) -> io::Result<()> {
        writeln!(out, "T1 P{} ; Pattern {:03X}", run.mask, run.mask)?;
        writeln!(
            out,
            "G1 Y{:.3} ; Spray pattern",
            self.geometry.column_y(run.end)
        )
    }
}

impl BandEncoder for Listing {
    fn encode_band<W: Write + ?Sized>(&mut self, band: &Band<'_>, out: &mut W) -> io::Result<()> {
        let mut positioned = false;
        let mut gap = None;
        for run in band.runs() {
            if run.is_idle() {
                if positioned {
                    gap = Some(run);
                }
                continue;
            }
            trace!("Band {} run {:?}", band.index, run);
            if positioned {
                if let Some(gap) = gap.take() {
                    self.spray(&gap, out)?;
                }
            } else {
                writeln!(out, "T0")?;
                writeln!(
                    out,
                    "G0 X{:.3} Y{:.3} ; Line {}",
                    self.geometry.band_x(band.index),
                    self.geometry.column_y(run.origin),
                    band.last_row
                )?;
                positioned = true;
            }
            self.spray(&run, out)?;
        }
        Ok(())
    }
}
