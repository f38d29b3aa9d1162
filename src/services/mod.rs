pub mod config_loader;
pub mod coords;
pub mod map_library;
pub mod palette;
pub mod query_engine;
pub mod record_file;
pub mod staging_store;
pub mod team_archive;
pub mod workspace;
