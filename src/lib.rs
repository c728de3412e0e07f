pub mod clock;
pub mod config;
pub mod console;
pub mod engine;
pub mod export;
pub mod flows;
pub mod limits;
pub mod model;
pub mod observability;
pub mod report;
pub mod validate;
pub mod wal;
