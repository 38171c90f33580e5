//! Watertightness check over polygonal face loops.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

/// Index of an output point.
pub type PointId = usize;

/// Boundary of one polygonal face: an outer loop and zero or more holes.
///
/// Every loop, holes included, is wound counter-clockwise seen from outside
/// the shell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaceLoops {
    pub outer: Vec<PointId>,
    pub inner: Vec<Vec<PointId>>,
}

impl FaceLoops {
    /// Face without holes.
    #[must_use]
    pub fn polygon(outer: Vec<PointId>) -> Self {
        Self {
            outer,
            inner: Vec::new(),
        }
    }
}

/// Returns `true` if the faces form a closed, consistently oriented shell.
///
/// Every directed edge must be cancelled by the same edge walked the other
/// way. Hole loops are walked in reverse, which keeps the face interior on
/// the same side of every walked edge. An edge seen twice in the same direction means
/// two faces disagree on orientation, which fails immediately.
///
/// Known approximation: an edge shared by four (or any even number of)
/// faces with alternating directions cancels pairwise and is accepted.
#[must_use]
pub fn validate_closed_shell(faces: &[FaceLoops]) -> bool {
    if faces.len() < 4 {
        debug!(faces = faces.len(), "too few faces for a closed shell");
        return false;
    }
    let mut unmatched: HashMap<PointId, HashSet<PointId>> = HashMap::new();

    for (index, face) in faces.iter().enumerate() {
        let holes = face.inner.iter().map(|ring| ring.iter().rev().copied().collect::<Vec<_>>());
        for ring in std::iter::once(face.outer.clone()).chain(holes) {
            let n = ring.len();
            for i in 0..n {
                let (a, b) = (ring[i], ring[(i + 1) % n]);
                if a == b {
                    continue;
                }
                if unmatched.get_mut(&b).is_some_and(|out| out.remove(&a)) {
                    continue;
                }
                if !unmatched.entry(a).or_default().insert(b) {
                    trace!(face = index, a, b, "edge used twice in the same direction");
                    return false;
                }
            }
        }
    }

    let open = unmatched.values().map(HashSet::len).sum::<usize>();
    if open > 0 {
        debug!(open, "shell has unmatched edges");
    }
    open == 0
}
