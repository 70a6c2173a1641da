//! # libfab
//!
//!
//! This library turns a bilevel raster of one print layer into the command stream understood by
//! powder/inkjet fabricators driven by a multi-jet ink bar (the `BrundleFab` family of machines).
//!
//! The print head carries `J` jets stacked along the X axis. One pass of the head along Y
//! therefore deposits `J` raster rows at once, which is why the image is consumed in *bands* of
//! `J` rows. For every column of a band, the set of jets that must fire is a `J`-bit *toolmask*;
//! neighbouring columns sharing a toolmask are merged into *runs*, and the runs are serialized as
//! firing-pattern directives and head moves.
//!
//! ### Pipeline
//!
//! 1. [`RasterReader`] parses a binary PBM (`P4`) header and yields bit-packed rows.
//! 2. [`BandAccumulator`] ORs each row into the toolmask of the current band.
//! 3. [`compact`] splits a closed band into [`Run`]s, eliding blank bands.
//! 4. A [`BandEncoder`] ([`Listing`] or [`Packed`]) writes the band's commands.
//!
//! Every stage is streaming: only one row buffer and one band toolmask are alive at a time.
//!
//! ### Usage
//!
//! ```rust
//! use libfab::{encode_layer, HeadConfig, Listing};
//!
//! fn main() -> Result<(), libfab::Error> {
//!     // 4x2 image: a single 2x2 square in the top-left corner
//!     let mut pbm = b"P4\n4 2\n".to_vec();
//!     pbm.extend_from_slice(&[0b1100_0000, 0b1100_0000]);
//!
//!     let config = HeadConfig::builder().jets(12).mm_per_row(3.15).build()?;
//!     let mut out = Vec::new();
//!     let stats = encode_layer(pbm.as_slice(), &config, Listing::new(&config), &mut out)?;
//!     assert_eq!(stats.bands, 1);
//!     assert!(String::from_utf8_lossy(&out).starts_with("T0\n"));
//!     Ok(())
//! }
//! ```
//!
//! The command stream only covers the body of a layer. Homing, powder spreading, drying passes
//! and layer drops are the job of the driver that interleaves this output with its own code.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]

mod config;
mod error;
mod pipeline;
/// Module containing the PBM raster reader
pub mod raster;
/// Module containing the command stream encoders
pub mod protocol;
/// Module containing band accumulation and run compaction
pub mod toolmask;

pub use config::{Encoding, HeadConfig};
pub use error::Error;
pub use pipeline::{encode_file, encode_layer, encode_raster, LayerStats};
pub use protocol::{listing::Listing, packed::Packed, BandEncoder};
pub use raster::{RasterHeader, RasterReader, MAX_WIDTH};
pub use toolmask::{
    compact::{compact, Run, Runs},
    Band, BandAccumulator, Toolmask,
};

/// Largest jet count a toolmask cell can address
pub const MAX_JETS: u8 = 16;
