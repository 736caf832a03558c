use crate::domain::widgets::render_pass::Scope;

/// Feedback of the previous action, shown under the page title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Warning(String),
    Info(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Success(text) | Notice::Warning(text) | Notice::Info(text) => text,
        }
    }

    pub fn show(&self, scope: &mut Scope<'_>) {
        match self {
            Notice::Success(text) => scope.success(text.clone()),
            Notice::Warning(text) => scope.warning(text.clone()),
            Notice::Info(text) => scope.info(text.clone()),
        }
    }
}
