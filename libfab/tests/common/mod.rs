#![allow(dead_code)]

use libfab::{encode_layer, BandEncoder, HeadConfig, LayerStats};

/// Builds a binary PBM from already packed rows
pub fn pbm(width: usize, rows: &[&[u8]]) -> Vec<u8> {
    let mut out = format!("P4\n{width} {}\n", rows.len()).into_bytes();
    for row in rows {
        out.extend_from_slice(row);
    }
    out
}

/// Builds a binary PBM by asking `pixel` for every pixel
pub fn pbm_from_fn(width: usize, height: usize, pixel: impl Fn(usize, usize) -> bool) -> Vec<u8> {
    let stride = width.div_ceil(8);
    let mut out = format!("P4\n{width} {height}\n").into_bytes();
    for y in 0..height {
        let mut row = vec![0u8; stride];
        for x in (0..width).filter(|&x| pixel(x, y)) {
            row[x / 8] |= 0x80 >> (x % 8);
        }
        out.extend_from_slice(&row);
    }
    out
}

/// Computes the toolmask of every band directly from the pixels
pub fn expected_toolmasks(
    width: usize,
    height: usize,
    jets: u8,
    pixel: impl Fn(usize, usize) -> bool,
) -> Vec<Vec<u16>> {
    let jets = usize::from(jets);
    (0..height.div_ceil(jets))
        .map(|band| {
            (0..width)
                .map(|x| {
                    (band * jets..height.min((band + 1) * jets))
                        .filter(|&y| pixel(x, y))
                        .fold(0u16, |mask, y| mask | 1 << (y % jets))
                })
                .collect()
        })
        .collect()
}

pub fn head(jets: u8, mm_per_row: f64) -> HeadConfig {
    HeadConfig::builder()
        .jets(jets)
        .mm_per_row(mm_per_row)
        .build()
        .expect("valid head")
}

/// Encodes `input` in memory, returning the command stream as text
pub fn encode_to_string(
    input: &[u8],
    config: &HeadConfig,
    encoder: impl BandEncoder,
) -> anyhow::Result<(String, LayerStats)> {
    let mut out = Vec::new();
    let stats = encode_layer(input, config, encoder, &mut out)?;
    Ok((String::from_utf8(out)?, stats))
}
