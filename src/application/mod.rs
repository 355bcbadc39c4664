pub mod commands;
pub mod connection;
pub mod errors;
pub mod reporter;
pub mod use_cases;
