pub mod aggregator;
pub mod month;
pub mod month_store;
pub mod reader;
pub mod report;
pub mod transaction;
