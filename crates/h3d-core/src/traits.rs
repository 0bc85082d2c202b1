use crate::error::Result;

/// Validate the structural invariants of a value built from caller input.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}
