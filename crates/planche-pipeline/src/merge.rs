//! Fixed-point merging of overlapping and nested contours.
//!
//! Edge detection routinely yields several contours for one panel: the
//! inner and outer border of a frame line, or a fragment nested inside a
//! larger detection. This stage collapses them by repeatedly folding any
//! contour whose box overlaps an already-placed one by more than
//! [`OVERLAP_RATIO`] of the smaller box's area, until a full pass makes
//! no merge.
//!
//! Termination: every merge removes one contour and a pass that merges
//! nothing ends the loop, so the contour count is monotonically
//! non-increasing and the iteration converges. O(n^2) per pass, which is
//! fine at the tens of contours a page produces.

use crate::contour::Contour;

/// Two boxes merge when their intersection exceeds this fraction of the
/// smaller box's area.
pub const OVERLAP_RATIO: f64 = 0.2;

/// Collapse overlapping/nested contours into single outer contours.
///
/// Postcondition: no pair of returned contours overlaps by more than
/// [`OVERLAP_RATIO`] of the smaller box's area.
#[must_use = "returns the merged contours"]
pub fn merge_overlapping(mut contours: Vec<Contour>) -> Vec<Contour> {
    loop {
        let before = contours.len();
        contours = merge_pass(contours);
        if contours.len() == before {
            return contours;
        }
    }
}

/// One merge pass: fold each contour into the first already-placed
/// contour it significantly overlaps, or append it unmerged.
fn merge_pass(contours: Vec<Contour>) -> Vec<Contour> {
    let mut placed: Vec<Contour> = Vec::with_capacity(contours.len());

    'next: for contour in contours {
        for existing in &mut placed {
            if existing.bounds().overlap_ratio(&contour.bounds()) > OVERLAP_RATIO {
                existing.absorb(contour);
                continue 'next;
            }
        }
        placed.push(contour);
    }

    placed
}
