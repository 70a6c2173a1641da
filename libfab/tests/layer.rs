use std::{
    fs::File,
    io::{BufWriter, Write},
    str::FromStr,
};

mod common;
use common::{encode_to_string, head, pbm, pbm_from_fn};
use itertools::Itertools;
use libfab::{
    compact, encode_file, encode_layer, BandAccumulator, Encoding, Error, HeadConfig, Listing,
    Packed, RasterReader,
};
use mktemp::Temp;

#[test]
fn band_count_follows_height() -> anyhow::Result<()> {
    for jets in [1u8, 5, 12, 16] {
        for height in 0..=40usize {
            let config = head(jets, 3.15);
            let input = pbm_from_fn(3, height, |_, _| true);
            let (_, stats) = encode_to_string(&input, &config, Listing::new(&config))?;

            let jets = usize::from(jets);
            assert_eq!(stats.rows, height);
            assert_eq!(stats.bands, height.div_ceil(jets), "height {height}, jets {jets}");
            if height > 0 {
                let last = if height % jets == 0 { jets } else { height % jets };
                assert_eq!(usize::from(stats.last_band_rows), last);
            }
        }
    }
    Ok(())
}

#[test]
fn single_pixel_image() -> anyhow::Result<()> {
    let input = pbm(1, &[&[0x80][..]]);
    let mut raster = RasterReader::new(input.as_slice())?;
    let mut accumulator = BandAccumulator::new(1, 12);
    let row = raster.next_row()?.expect("one row");
    assert!(accumulator.push_row(row).is_none());
    assert!(raster.next_row()?.is_none());

    let band = accumulator.finish().expect("partial band");
    assert_eq!((band.index, band.rows), (0, 1));
    let runs = band.runs().collect_vec();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].columns(), 0..1);
    assert_eq!(runs[0].mask, 1);

    let config = head(12, 3.15);
    let (text, stats) = encode_to_string(&input, &config, Listing::new(&config))?;
    assert_eq!(stats.bands, 1);
    assert_eq!(stats.firing_runs, 1);
    assert_eq!(text.lines().filter(|l| l.starts_with("T1 P1 ")).count(), 1);
    Ok(())
}

#[test]
fn single_blank_pixel_emits_nothing() -> anyhow::Result<()> {
    let input = pbm(1, &[&[0x00][..]]);
    let config = head(12, 3.15);
    let (text, stats) = encode_to_string(&input, &config, Listing::new(&config))?;
    assert!(text.is_empty());
    assert_eq!((stats.bands, stats.blank_bands), (1, 1));
    Ok(())
}

#[test]
fn alternating_rows_fire_even_jets() -> anyhow::Result<()> {
    let rows: Vec<&[u8]> = (0..12)
        .map(|i| if i % 2 == 0 { &[0xF0][..] } else { &[0x00][..] })
        .collect();
    let input = pbm(4, &rows);

    let mut raster = RasterReader::new(input.as_slice())?;
    assert_eq!(raster.header().stride, 1);
    let mut accumulator = BandAccumulator::new(4, 12);
    let mut bands = 0;
    while let Some(row) = raster.next_row()? {
        if let Some(band) = accumulator.push_row(row) {
            bands += 1;
            assert_eq!(band.toolmask.cells(), &[0x555; 4]);
            let runs = band.runs().map(|r| (r.columns(), r.mask)).collect_vec();
            assert_eq!(runs, vec![(0..4, 0x555)]);
        }
    }
    assert!(accumulator.finish().is_none());
    assert_eq!(bands, 1);

    let config = head(12, 3.15);
    let (text, _) = encode_to_string(&input, &config, Listing::new(&config))?;
    assert_eq!(
        text,
        "T0\n\
         G0 X0.000 Y0.000 ; Line 11\n\
         T1 P1365 ; Pattern 555\n\
         G1 Y1.050 ; Spray pattern\n"
    );
    Ok(())
}

#[test]
fn runs_partition_every_band() -> anyhow::Result<()> {
    let (width, height, jets) = (37, 29, 6);
    let input = pbm_from_fn(width, height, |x, y| (x * 5 + y * 3) % 7 < 3 || x == width - 1);
    let mut raster = RasterReader::new(input.as_slice())?;
    let mut accumulator = BandAccumulator::new(width, jets);

    let check = |cells: &[u16]| {
        let runs = compact(cells).collect_vec();
        assert_eq!(runs.first().map(|r| r.origin), Some(0));
        assert_eq!(runs.last().map(|r| r.end), Some(width));
        for (a, b) in runs.iter().tuple_windows() {
            assert_eq!(a.end, b.origin);
            assert_ne!(a.mask, b.mask, "runs are maximal");
        }
        for run in &runs {
            assert!(cells[run.columns()].iter().all(|&m| m == run.mask));
        }
    };
    while let Some(row) = raster.next_row()? {
        if let Some(band) = accumulator.push_row(row) {
            check(band.toolmask.cells());
        }
    }
    if let Some(band) = accumulator.finish() {
        check(band.toolmask.cells());
    }
    Ok(())
}

#[test]
fn truncated_input_keeps_finished_bands() {
    // 16 pixels wide: 2 bytes per row, the fourth row stops after one byte
    let mut input = b"P4\n16 5\n".to_vec();
    input.extend_from_slice(&[0xFF, 0xFF, 0x00, 0x00, 0x80, 0x00, 0x01]);
    let config = head(2, 2.0);
    let mut out = BufWriter::new(Vec::new());

    let err = encode_layer(input.as_slice(), &config, Listing::new(&config), &mut out)
        .expect_err("image is truncated");
    assert!(matches!(
        err,
        Error::TruncatedInput {
            row: 3,
            expected: 2,
            actual: 1
        }
    ));
    // the first band was written through the buffer before failing
    let text = String::from_utf8(out.get_ref().clone()).unwrap();
    assert!(text.contains("; Line 1\n"));
    assert!(!text.contains("; Line 3\n"));
}

#[test]
fn malformed_header_writes_nothing() {
    let config = head(12, 3.15);
    for input in [
        &b"P1\n4 4\n0101"[..],
        &b"P5\n4 4\n255\n"[..],
        &b"P4\nfour 4\n"[..],
        &b"P4\n4\n"[..],
        &b"P4\n1000000000000000000 1\n\x00"[..],
        &b""[..],
    ] {
        let mut out = Vec::new();
        let err = encode_layer(input, &config, Packed::new(&config), &mut out).unwrap_err();
        assert!(matches!(err, Error::MalformedHeader(_)), "{err}");
        assert!(out.is_empty());
    }
}

#[test]
fn same_input_same_output() -> anyhow::Result<()> {
    let config = head(12, 3.15);
    let tmp_pbm = Temp::new_file()?;
    std::fs::write(
        &tmp_pbm.to_path_buf(),
        pbm_from_fn(100, 50, |x, y| (x / 9 + y / 4) % 3 == 0),
    )?;

    let mut digests = Vec::new();
    for _ in 0..2 {
        let tmp_out = Temp::new_file()?;
        let path = tmp_out.to_path_buf();
        let mut out = BufWriter::new(File::create(&path)?);
        encode_file(tmp_pbm.to_path_buf(), &config, Packed::new(&config), &mut out)?;
        out.flush()?;
        drop(out);
        digests.push(sha256::try_digest(path.as_path())?);
    }
    assert_eq!(digests[0], digests[1]);
    Ok(())
}

#[test]
fn head_config_rejects_impossible_heads() {
    for jets in [0u8, 17, 255] {
        let result = HeadConfig::builder().jets(jets).mm_per_row(3.15).build();
        assert!(matches!(result, Err(Error::InvalidConfig(_))), "{jets}");
    }
    for mm_per_row in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let result = HeadConfig::builder().jets(12).mm_per_row(mm_per_row).build();
        assert!(matches!(result, Err(Error::InvalidConfig(_))), "{mm_per_row}");
    }
    let config = head(16, 3.15);
    assert_eq!(config.bytes_per_column(), 2);
    assert_eq!(head(8, 3.15).bytes_per_column(), 1);
    assert!((head(12, 3.0).mm_per_column() - 0.25).abs() < f64::EPSILON);
}

#[test]
fn encoding_names() {
    assert_eq!(Encoding::from_str("listing").unwrap(), Encoding::Listing);
    assert_eq!(Encoding::from_str("Packed").unwrap(), Encoding::Packed);
    assert!(Encoding::from_str("hex").is_err());
    assert_eq!(Encoding::Packed.to_string(), "packed");
}
