//! Library side of the `nih-report` binary.

pub mod logging;
pub mod settings;
pub mod summary;
