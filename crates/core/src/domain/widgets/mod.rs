pub mod element;
pub mod render_pass;
pub mod widget_id;
