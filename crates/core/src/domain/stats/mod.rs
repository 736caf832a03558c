pub mod aggregates;
pub mod period;
pub mod record_filter;
