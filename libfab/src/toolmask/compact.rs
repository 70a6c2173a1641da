use std::{iter::FusedIterator, ops::Range};

/// A maximal range of columns sharing one firing mask
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Run {
    /// first column of the run
    pub origin: usize,
    /// one past the last column of the run
    pub end: usize,
    /// jets firing over every column of the run
    pub mask: u16,
}

impl Run {
    /// Returns the half-open column range `[origin, end)`
    #[must_use]
    pub const fn columns(&self) -> Range<usize> {
        self.origin..self.end
    }

    /// Returns `true` if no jet fires over this run
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.mask == 0
    }
}

/// Iterator over the [`Run`]s of a toolmask, see [`compact`]
#[derive(Debug, Clone)]
pub struct Runs<'a> {
    toolmask: &'a [u16],
    origin: usize,
}

impl Iterator for Runs<'_> {
    type Item = Run;

    fn next(&mut self) -> Option<Run> {
        let mask = *self.toolmask.get(self.origin)?;
        // the last run is closed by the right edge of the image
        let end = self.toolmask[self.origin..]
            .iter()
            .position(|&m| m != mask)
            .map_or(self.toolmask.len(), |len| self.origin + len);
        let run = Run {
            origin: self.origin,
            end,
            mask,
        };
        self.origin = end;
        Some(run)
    }
}

impl FusedIterator for Runs<'_> {}

/// Splits a band's toolmask into maximal runs of identical firing masks
///
/// The scan starts at column 0, so leading idle columns form a run of their own, and the runs
/// cover `[0, toolmask.len())` without gaps. A blank toolmask yields no runs at all: nothing fires
/// in that band, so nothing needs to be sent for it.
///
/// Idle runs are still yielded for non-blank bands; whether they reach the command stream is up
/// to the [`crate::BandEncoder`].
#[must_use]
pub fn compact(toolmask: &[u16]) -> Runs<'_> {
    let toolmask = if toolmask.iter().all(|&m| m == 0) {
        &toolmask[..0]
    } else {
        toolmask
    };
    Runs {
        toolmask,
        origin: 0,
    }
}
