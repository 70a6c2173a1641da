use nom::{
    bytes::complete::tag,
    character::complete::{digit1, multispace1},
    combinator::{all_consuming, map_res},
    IResult,
};
use std::io::BufRead;
use tracing::trace;

use crate::Error;

/// Magic number of binary (raw) PBM files
pub(crate) const MAGIC: &[u8; 2] = b"P4";
// Anything longer is not a PBM header, whatever it claims to be
const MAX_HEADER_LEN: usize = 1024;

/// Widest raster accepted, in pixels
///
/// Row and toolmask buffers are sized from the header, so wider claims are rejected before any
/// allocation.
pub const MAX_WIDTH: usize = 1 << 20;

/// Dimensions of a bilevel raster
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct RasterHeader {
    /// Image width in pixels
    pub width: usize,
    /// Image height in rows
    pub height: usize,
    /// Bytes per packed row: `ceil(width / 8)`
    pub stride: usize,
}

impl RasterHeader {
    /// Creates a [`RasterHeader`], computing the row stride
    #[must_use]
    pub const fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            stride: width.div_ceil(8),
        }
    }
}

fn next_byte(r: &mut impl BufRead) -> Result<Option<u8>, Error> {
    let buf = r.fill_buf()?;
    let Some(&b) = buf.first() else {
        return Ok(None);
    };
    r.consume(1);
    Ok(Some(b))
}

/// Reads the header section, up to and including the single whitespace byte that precedes the
/// pixel data.
///
/// Comments are dropped and every whitespace byte is normalized to a space, so the returned
/// text only holds the three fields.
pub(crate) fn read_header_text(r: &mut impl BufRead) -> Result<String, Error> {
    let mut magic = [0u8; 2];
    for slot in &mut magic {
        *slot = next_byte(r)?
            .ok_or_else(|| Error::MalformedHeader("stream ended before the magic number".into()))?;
    }
    if &magic != MAGIC {
        return Err(Error::MalformedHeader(format!(
            "expected magic P4, found {:?}",
            String::from_utf8_lossy(&magic)
        )));
    }

    let mut text = magic.to_vec();
    let mut fields = 0;
    let mut in_field = true;
    let mut in_comment = false;
    // a comment closing the height field runs up to the line break that terminates the header
    while fields < 3 || in_comment {
        if text.len() > MAX_HEADER_LEN {
            return Err(Error::MalformedHeader(format!(
                "header exceeds {MAX_HEADER_LEN} bytes"
            )));
        }
        let b = next_byte(r)?.ok_or_else(|| {
            Error::MalformedHeader(format!("stream ended after {fields} of 3 header fields"))
        })?;
        if in_comment {
            if b != b'\n' && b != b'\r' {
                continue;
            }
            in_comment = false;
        } else if b == b'#' {
            in_comment = true;
            if in_field {
                in_field = false;
                fields += 1;
            }
            continue;
        }

        if b.is_ascii_whitespace() {
            if in_field {
                in_field = false;
                fields += 1;
            }
            text.push(b' ');
        } else {
            in_field = true;
            text.push(b);
        }
    }
    String::from_utf8(text)
        .map_err(|_| Error::MalformedHeader("header is not ASCII text".into()))
}

fn dimension(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse::<usize>)(input)
}

fn header_fields(input: &str) -> IResult<&str, (usize, usize)> {
    let (input, _) = tag("P4")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, width) = dimension(input)?;
    let (input, _) = multispace1(input)?;
    let (input, height) = dimension(input)?;
    let (input, _) = multispace1(input)?;
    Ok((input, (width, height)))
}

/// Parses normalized header text into a [`RasterHeader`]
pub(crate) fn parse_header(text: &str) -> Result<RasterHeader, Error> {
    trace!("Header: {text:?}");
    let (_, (width, height)) = all_consuming(header_fields)(text).map_err(|e| {
        Error::MalformedHeader(format!(
            "width and height must be decimal integers in {:?} ({e})",
            text.trim_end()
        ))
    })?;
    if width == 0 {
        return Err(Error::MalformedHeader("image width is zero".into()));
    }
    if width > MAX_WIDTH {
        return Err(Error::MalformedHeader(format!(
            "image width {width} exceeds {MAX_WIDTH} pixels"
        )));
    }
    Ok(RasterHeader::new(width, height))
}

/// Reads and parses a PBM header, leaving `r` at the first pixel byte
pub(crate) fn read_header(r: &mut impl BufRead) -> Result<RasterHeader, Error> {
    let text = read_header_text(r)?;
    parse_header(&text)
}
