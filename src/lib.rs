pub mod cli;
pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod orchestrator;
pub mod presenter;
pub mod sources;
#[doc(hidden)]
pub mod test_helpers;
