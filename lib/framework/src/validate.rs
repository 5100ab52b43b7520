use crate::exception::CoreRsResult;

/// Checked once at startup, before anything is sent over the network.
pub trait Validator {
    fn validate(&self) -> CoreRsResult<()>;
}
