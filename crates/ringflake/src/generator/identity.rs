use crate::error::Result;

/// The fixed identity packed into every ID an allocator issues.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Identity {
    pub datacenter_id: u64,
    pub worker_id: u64,
}

/// Source of an allocator's [`Identity`].
///
/// In a deployment this is normally backed by a coordination service that
/// hands each process a unique `(datacenter, worker)` pair. Range checks are
/// done by the allocator, so implementors only have to produce the values.
pub trait IdentityAssigner {
    /// Returns the identity this process should generate IDs under.
    ///
    /// # Errors
    ///
    /// Implementations return an error when no identity can be obtained.
    fn assign(&self) -> Result<Identity>;
}

/// An [`IdentityAssigner`] that always returns the same, preconfigured
/// identity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedIdentity(pub Identity);

impl FixedIdentity {
    pub const fn new(datacenter_id: u64, worker_id: u64) -> Self {
        Self(Identity {
            datacenter_id,
            worker_id,
        })
    }
}

impl IdentityAssigner for FixedIdentity {
    fn assign(&self) -> Result<Identity> {
        Ok(self.0)
    }
}
