use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::io::{self, Write};
use tracing::trace;

use super::{BandEncoder, Geometry};
use crate::{toolmask::Band, Error, HeadConfig};

/// Directive carrying a packed firing payload
pub const PAYLOAD_DIRECTIVE: &str = "T1 D";

/// Packed encoder: every column's mask of a band in a single base64 payload
///
/// ```text
/// G0 X0.000 Y0.000 ; Line 11
/// T1 DBVUFVQVVBVU=
/// G1 Y1.050 ; Spray pattern
/// ```
///
/// Masks take one byte per column for heads of up to 8 jets and two bytes, most significant
/// first, above that. The payload has no way to skip columns, so idle columns are serialized
/// like any other and the spray move always spans the full image width.
#[derive(Debug, Clone)]
pub struct Packed {
    geometry: Geometry,
    bytes_per_column: usize,
    columns: Vec<u8>,
    payload: String,
}

impl Packed {
    /// Creates a [`Packed`] encoder for the given head
    #[must_use]
    pub fn new(config: &HeadConfig) -> Self {
        Self {
            geometry: Geometry::new(config),
            bytes_per_column: config.bytes_per_column(),
            columns: Vec::new(),
            payload: String::new(),
        }
    }
}

impl BandEncoder for Packed {
    fn encode_band<W: Write + ?Sized>(&mut self, band: &Band<'_>, out: &mut W) -> io::Result<()> {
        if band.is_blank() {
            return Ok(());
        }
        let width = band.toolmask.width();
        self.columns.clear();
        // no-op after the first band: the buffer keeps its capacity
        self.columns.reserve(width * self.bytes_per_column);
        for run in band.runs() {
            let bytes = run.mask.to_be_bytes();
            let bytes = &bytes[bytes.len() - self.bytes_per_column..];
            for _ in run.columns() {
                self.columns.extend_from_slice(bytes);
            }
        }
        debug_assert_eq!(self.columns.len(), width * self.bytes_per_column);

        self.payload.clear();
        STANDARD.encode_string(&self.columns, &mut self.payload);
        trace!(
            "Band {}: {} column bytes, {} payload chars",
            band.index,
            self.columns.len(),
            self.payload.len()
        );

        writeln!(
            out,
            "G0 X{:.3} Y{:.3} ; Line {}",
            self.geometry.band_x(band.index),
            self.geometry.column_y(0),
            band.last_row
        )?;
        writeln!(out, "{PAYLOAD_DIRECTIVE}{}", self.payload)?;
        writeln!(
            out,
            "G1 Y{:.3} ; Spray pattern",
            self.geometry.column_y(width)
        )
    }
}

/// Decodes a packed payload back into per-column masks
///
/// `payload` is the text after [`PAYLOAD_DIRECTIVE`].
///
/// # Errors
///
/// Returns [`Error::InvalidPayload`] if `payload` is not valid base64, or does not hold exactly
/// `width` columns for the given head.
pub fn unpack_payload(payload: &str, width: usize, config: &HeadConfig) -> Result<Vec<u16>, Error> {
    let bytes = STANDARD.decode(payload.trim_end())?;
    let bytes_per_column = config.bytes_per_column();
    if bytes.len() != width * bytes_per_column {
        return Err(Error::InvalidPayload(format!(
            "expected {} bytes for {width} columns, decoded {}",
            width * bytes_per_column,
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(bytes_per_column)
        .map(|column| {
            column
                .iter()
                .fold(0u16, |mask, &byte| (mask << 8) | u16::from(byte))
        })
        .collect())
}
