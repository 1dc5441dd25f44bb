//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod estimate;
pub(crate) mod format;
pub(crate) mod qualities;
