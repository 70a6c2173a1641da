use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use libfab::{
    encode_layer, encode_raster, Encoding, Error, HeadConfig, LayerStats, Listing, Packed,
    RasterReader,
};
use tracing::{debug, info, instrument};

/// Process exit status for a malformed PBM header
pub const EXIT_MALFORMED_HEADER: u8 = 2;
/// Process exit status for a truncated PBM image
pub const EXIT_TRUNCATED_INPUT: u8 = 3;
/// Process exit status for an unusable head configuration
pub const EXIT_INVALID_CONFIG: u8 = 4;
/// Process exit status for a command line that does not parse (`EX_USAGE`)
pub const EXIT_USAGE: u8 = 64;

fn open_input(input: Option<&Path>) -> Result<Box<dyn BufRead>> {
    Ok(match input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("open layer {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    })
}

fn open_output(output: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => {
            let file = File::options()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)
                .with_context(|| format!("create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

/// Encodes one PBM layer into the body of a fabricator command stream
///
/// Reads from stdin when `input` is `None` and writes to stdout when `output` is `None`. The
/// output file is only created once the PBM header has been read successfully.
#[instrument]
pub fn encode(
    input: Option<&Path>,
    output: Option<&Path>,
    config: &HeadConfig,
    encoding: Encoding,
) -> Result<LayerStats> {
    let raster = RasterReader::new(open_input(input)?).context("read layer header")?;
    let mut out = open_output(output)?;
    debug!("Encoding layer as {encoding}");

    let stats = match encoding {
        Encoding::Listing => encode_raster(raster, config, Listing::new(config), &mut out),
        Encoding::Packed => encode_raster(raster, config, Packed::new(config), &mut out),
    }
    .context("encode layer")?;
    if let Some(output) = output {
        info!("Wrote {} bands to {}", stats.bands, output.display());
    }
    Ok(stats)
}

/// Reads one PBM layer and describes how it splits into bands, without emitting commands
#[instrument]
pub fn inspect(input: Option<&Path>, config: &HeadConfig) -> Result<String> {
    let reader = open_input(input)?;
    let stats = encode_layer(reader, config, Listing::new(config), &mut io::sink())
        .context("inspect layer")?;
    Ok(format!(
        "width: {}\nrows: {}\nbands: {} ({} blank)\nlast band rows: {}\nfiring runs: {}\n",
        stats.width,
        stats.rows,
        stats.bands,
        stats.blank_bands,
        stats.last_band_rows,
        stats.firing_runs
    ))
}

/// Maps a failure to the process exit status describing it
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match err.chain().find_map(|e| e.downcast_ref::<Error>()) {
        Some(Error::MalformedHeader(_)) => EXIT_MALFORMED_HEADER,
        Some(Error::TruncatedInput { .. }) => EXIT_TRUNCATED_INPUT,
        Some(Error::InvalidConfig(_)) => EXIT_INVALID_CONFIG,
        _ => 1,
    }
}
