pub mod calendar;
pub mod entry;
pub mod record;
pub mod record_type;
