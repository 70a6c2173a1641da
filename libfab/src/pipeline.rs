use std::{
    fs::File,
    io::{BufRead, BufReader, Write},
    path::Path,
};
use tracing::{debug, info, instrument, warn};

use crate::{
    protocol::BandEncoder,
    raster::RasterReader,
    toolmask::{Band, BandAccumulator},
    Error, HeadConfig,
};

/// Summary of one encoded layer
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct LayerStats {
    /// image width in pixels
    pub width: usize,
    /// raster rows consumed
    pub rows: usize,
    /// bands closed, including blank ones
    pub bands: usize,
    /// bands skipped because no jet fires in them
    pub blank_bands: usize,
    /// rows folded into the last band
    pub last_band_rows: u8,
    /// firing runs across all non-blank bands, idle runs excluded
    pub firing_runs: usize,
}

impl LayerStats {
    fn record(&mut self, band: &Band<'_>) {
        self.bands += 1;
        self.last_band_rows = band.rows;
        if band.is_blank() {
            self.blank_bands += 1;
        } else {
            self.firing_runs += band.runs().filter(|run| !run.is_idle()).count();
        }
    }
}

/// Reads one PBM layer from `reader` and writes its command stream to `out`
///
/// Bands are written as soon as they close. If the image turns out to be truncated, every band
/// completed before the short row is flushed to `out` before the error is returned.
///
/// # Errors
///
/// - [`Error::MalformedHeader`] if the header is invalid; nothing is written in that case
/// - [`Error::TruncatedInput`] if a declared row is incomplete
/// - [`Error::Io`] if reading or writing fails
pub fn encode_layer<R, E, W>(
    reader: R,
    config: &HeadConfig,
    encoder: E,
    out: &mut W,
) -> Result<LayerStats, Error>
where
    R: BufRead,
    E: BandEncoder,
    W: Write + ?Sized,
{
    encode_raster(RasterReader::new(reader)?, config, encoder, out)
}

/// Writes the command stream of a raster whose header was already parsed, see [`encode_layer`]
///
/// # Errors
///
/// - [`Error::TruncatedInput`] if a declared row is incomplete
/// - [`Error::Io`] if reading or writing fails
#[instrument(skip_all, fields(jets = config.jets(), mm_per_row = config.mm_per_row()))]
pub fn encode_raster<R, E, W>(
    mut raster: RasterReader<R>,
    config: &HeadConfig,
    mut encoder: E,
    out: &mut W,
) -> Result<LayerStats, Error>
where
    R: BufRead,
    E: BandEncoder,
    W: Write + ?Sized,
{
    let header = raster.header();
    let mut accumulator = BandAccumulator::new(header.width, config.jets());
    let mut stats = LayerStats {
        width: header.width,
        ..LayerStats::default()
    };

    loop {
        let row = match raster.next_row() {
            Ok(Some(row)) => row,
            Ok(None) => break,
            Err(e) => {
                warn!("Stopping after {} complete bands: {e}", stats.bands);
                out.flush()?;
                return Err(e);
            }
        };
        if let Some(band) = accumulator.push_row(row) {
            stats.record(&band);
            encoder.encode_band(&band, out)?;
        }
    }
    if let Some(band) = accumulator.finish() {
        stats.record(&band);
        encoder.encode_band(&band, out)?;
    }
    out.flush()?;
    stats.rows = accumulator.rows_pushed();

    debug!("{stats:?}");
    info!(
        "Encoded {} rows into {} bands ({} blank, {} firing runs)",
        stats.rows, stats.bands, stats.blank_bands, stats.firing_runs
    );
    Ok(stats)
}

/// Tries to encode the PBM layer at the provided file path, see [`encode_layer`]
///
/// # Errors
///
/// This function will error if the file cannot be opened, or for any reason listed in
/// [`encode_layer`].
pub fn encode_file<P, E, W>(
    filename: P,
    config: &HeadConfig,
    encoder: E,
    out: &mut W,
) -> Result<LayerStats, Error>
where
    P: AsRef<Path>,
    E: BandEncoder,
    W: Write + ?Sized,
{
    let file = File::open(filename)?;
    encode_layer(BufReader::new(file), config, encoder, out)
}
