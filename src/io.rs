/// CSV and JSON export of completed runs.
pub mod export;
