pub mod aggregate;
pub mod config;
pub mod enrich;
pub mod fetch;
pub mod geocode;
pub mod join;
pub mod output;
pub mod pipeline;
pub mod records;
