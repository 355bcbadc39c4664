pub mod cli;
pub mod console_reporter;
pub mod fallback;
