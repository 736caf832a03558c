pub mod men_dashboard;
pub mod notice;
pub mod text_renderer;
pub mod women_dashboard;
