// Headless exam engine. The terminal front end in main.rs is a thin driver
// over `session::ExamSession`.
pub mod audio;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod round_generator;
pub mod runtime;
pub mod scoring;
pub mod selection;
pub mod session;
pub mod tuning;
pub mod util;
