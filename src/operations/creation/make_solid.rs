use crate::error::{Result, TopologyError};
use crate::topology::{ShellId, SolidData, SolidId, TopologyStore};

/// Creates a solid from an outer shell and optional void shells.
pub struct MakeSolid {
    outer_shell: ShellId,
    inner_shells: Vec<ShellId>,
}

impl MakeSolid {
    /// Creates a new `MakeSolid` operation.
    #[must_use]
    pub fn new(outer_shell: ShellId, inner_shells: Vec<ShellId>) -> Self {
        Self {
            outer_shell,
            inner_shells,
        }
    }

    /// Executes the operation, creating the solid in the topology store.
    ///
    /// # Errors
    ///
    /// Returns an error if a shell is missing or has no faces.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SolidId> {
        let solid = SolidData {
            outer_shell: self.outer_shell,
            inner_shells: self.inner_shells.clone(),
        };
        for shell in solid.shells() {
            if store.shell(shell)?.faces.is_empty() {
                return Err(TopologyError::InvalidTopology("shell has no faces".into()).into());
            }
        }
        Ok(store.add_solid(solid))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::ShellData;

    #[test]
    fn empty_shell_is_rejected() {
        let mut store = TopologyStore::new();
        let shell = store.add_shell(ShellData::closed(vec![]));
        assert!(MakeSolid::new(shell, vec![]).execute(&mut store).is_err());
    }
}
