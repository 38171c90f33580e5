use super::face::FaceId;

slotmap::new_key_type! {
    /// Key of a shell in the [`TopologyStore`](super::TopologyStore).
    pub struct ShellId;
    /// Key of a solid in the [`TopologyStore`](super::TopologyStore).
    pub struct SolidId;
}

/// Faces bounding one connected region.
///
/// `is_closed` records what the producing operation intended; exporters
/// still check closure themselves from edge uses.
#[derive(Debug, Clone)]
pub struct ShellData {
    pub faces: Vec<FaceId>,
    pub is_closed: bool,
}

impl ShellData {
    /// Shell meant to be watertight.
    #[must_use]
    pub fn closed(faces: Vec<FaceId>) -> Self {
        Self { faces, is_closed: true }
    }
}

/// A volume: one outer shell and any number of void shells.
#[derive(Debug, Clone)]
pub struct SolidData {
    pub outer_shell: ShellId,
    /// Voids. Solids with voids are never recognised as sweeps.
    pub inner_shells: Vec<ShellId>,
}

impl SolidData {
    /// Outer shell first, then voids.
    pub fn shells(&self) -> impl Iterator<Item = ShellId> + '_ {
        std::iter::once(self.outer_shell).chain(self.inner_shells.iter().copied())
    }
}
