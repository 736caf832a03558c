pub mod credentials;
pub mod goals;
pub mod records;
pub mod sheets;
pub mod stats;
pub mod widgets;
