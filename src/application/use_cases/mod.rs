pub mod run_migration;
