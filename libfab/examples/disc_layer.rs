/// Demonstrates how to encode a PBM layer held in memory
/// with both wire encodings
///
///
use libfab::{encode_layer, HeadConfig, Listing, Packed};

// Builds a `size` x `size` PBM holding a filled disc
fn disc(size: usize) -> Vec<u8> {
    let stride = size.div_ceil(8);
    let mut pbm = format!("P4\n{size} {size}\n").into_bytes();
    let center = size / 2;
    let r2 = center * center;
    for y in 0..size {
        let mut row = vec![0u8; stride];
        for x in 0..size {
            if x.abs_diff(center).pow(2) + y.abs_diff(center).pow(2) < r2 {
                row[x / 8] |= 0x80 >> (x % 8);
            }
        }
        pbm.extend_from_slice(&row);
    }
    pbm
}

fn main() -> anyhow::Result<()> {
    let config = HeadConfig::builder().jets(12).mm_per_row(3.15).build()?;
    let layer = disc(48);

    let mut listing = Vec::new();
    let stats = encode_layer(layer.as_slice(), &config, Listing::new(&config), &mut listing)?;
    println!("; listing, {stats:?}");
    print!("{}", String::from_utf8(listing)?);

    let mut packed = Vec::new();
    encode_layer(layer.as_slice(), &config, Packed::new(&config), &mut packed)?;
    println!("; packed");
    print!("{}", String::from_utf8(packed)?);
    Ok(())
}
