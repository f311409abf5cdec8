// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod palette;
pub mod runtime;
pub mod selection;
pub mod sequencer;
pub mod submission;
pub mod tasks;
pub mod timer;
pub mod ui;
