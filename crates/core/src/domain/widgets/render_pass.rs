use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use super::element::{Element, ElementKind, InputValue};
use super::widget_id::{WidgetError, WidgetId};

/// One top-to-bottom render. Every control is created through a [`Scope`] with an
/// explicit key; its id is the scope path plus that key, so the same page always
/// yields the same ids and two controls only collide when a caller reuses a key
/// inside one scope, which is reported as [`WidgetError::DuplicateElementId`].
#[derive(Debug, Default)]
pub struct RenderPass {
    input: HashMap<WidgetId, InputValue>,
    ids: HashSet<WidgetId>,
    elements: Vec<Element>,
}

impl RenderPass {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pass that replays user input captured against the ids of a previous pass.
    pub fn with_input(input: HashMap<WidgetId, InputValue>) -> Self {
        RenderPass {
            input,
            ..Self::default()
        }
    }

    pub fn root(&mut self) -> Scope<'_> {
        Scope {
            pass: self,
            path: Vec::new(),
        }
    }

    pub fn finish(self) -> Page {
        Page {
            elements: self.elements,
        }
    }

    fn register(&mut self, id: WidgetId) -> Result<WidgetId, WidgetError> {
        if !self.ids.insert(id.clone()) {
            return Err(WidgetError::DuplicateElementId(id));
        }
        Ok(id)
    }
}

/// A keyed region of a render pass (a tab, a form, a statistics block).
pub struct Scope<'a> {
    pass: &'a mut RenderPass,
    path: Vec<String>,
}

impl<'a> Scope<'a> {
    pub fn path(&self) -> String {
        self.path.join("/")
    }

    fn id_for(&self, key: &str) -> Result<WidgetId, WidgetError> {
        let mut segments = self.path.clone();
        segments.push(key.to_owned());
        WidgetId::from_segments(&segments)
    }

    fn push(&mut self, id: Option<WidgetId>, kind: ElementKind) {
        let depth = self.path.len();
        self.pass.elements.push(Element { id, depth, kind });
    }

    fn control(&mut self, key: &str, kind: ElementKind) -> Result<Option<InputValue>, WidgetError> {
        let id = self.id_for(key)?;
        let id = self.pass.register(id)?;
        let input = self.pass.input.get(&id).cloned();
        self.push(Some(id), kind);
        Ok(input)
    }

    fn container(&mut self, key: &str, kind: ElementKind) -> Result<Scope<'_>, WidgetError> {
        let id = self.id_for(key)?;
        let id = self.pass.register(id)?;
        self.push(Some(id), kind);
        let mut path = self.path.clone();
        path.push(key.to_owned());
        Ok(Scope {
            pass: &mut *self.pass,
            path,
        })
    }

    /// A nested scope without a visible container.
    pub fn scope(&mut self, key: &str) -> Result<Scope<'_>, WidgetError> {
        self.id_for(key)?;
        let mut path = self.path.clone();
        path.push(key.to_owned());
        Ok(Scope {
            pass: &mut *self.pass,
            path,
        })
    }

    pub fn tab(&mut self, key: &str, label: &str) -> Result<Scope<'_>, WidgetError> {
        self.container(key, ElementKind::Tab { label: label.to_owned() })
    }

    pub fn expander(&mut self, key: &str, label: &str) -> Result<Scope<'_>, WidgetError> {
        self.container(key, ElementKind::Expander { label: label.to_owned() })
    }

    pub fn form(&mut self, key: &str, label: &str) -> Result<Scope<'_>, WidgetError> {
        self.container(key, ElementKind::Form { label: label.to_owned() })
    }

    pub fn title(&mut self, text: impl Into<String>) {
        self.push(None, ElementKind::Title(text.into()));
    }

    pub fn subheader(&mut self, text: impl Into<String>) {
        self.push(None, ElementKind::Subheader(text.into()));
    }

    pub fn caption(&mut self, text: impl Into<String>) {
        self.push(None, ElementKind::Caption(text.into()));
    }

    pub fn text(&mut self, text: impl Into<String>) {
        self.push(None, ElementKind::Text(text.into()));
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(None, ElementKind::Info(text.into()));
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(None, ElementKind::Success(text.into()));
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.push(None, ElementKind::Warning(text.into()));
    }

    pub fn metric(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.push(
            None,
            ElementKind::Metric {
                label: label.into(),
                value: value.into(),
            },
        );
    }

    pub fn progress(&mut self, ratio: f64, text: impl Into<String>) {
        self.push(
            None,
            ElementKind::Progress {
                ratio: ratio.clamp(0.0, 1.0),
                text: text.into(),
            },
        );
    }

    pub fn table(&mut self, columns: &[&str], rows: Vec<Vec<String>>) {
        self.push(
            None,
            ElementKind::Table {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                rows,
            },
        );
    }

    pub fn bar_chart(&mut self, title: impl Into<String>, labels: Vec<String>, values: Vec<i64>) {
        self.push(
            None,
            ElementKind::BarChart {
                title: title.into(),
                labels,
                values,
            },
        );
    }

    pub fn pie_chart(&mut self, labels: Vec<String>, values: Vec<i64>) {
        self.push(None, ElementKind::PieChart { labels, values });
    }

    pub fn text_input(&mut self, key: &str, label: &str, default: &str) -> Result<String, WidgetError> {
        // Typed input text may have been read as a number or a date.
        let value = match self.pass.input.get(&self.id_for(key)?) {
            Some(InputValue::Text(text)) => text.clone(),
            Some(InputValue::Number(number)) => number.to_string(),
            Some(InputValue::Date(date)) => date.to_string(),
            _ => default.to_owned(),
        };
        self.control(
            key,
            ElementKind::TextInput {
                label: label.to_owned(),
                value: value.clone(),
            },
        )?;
        Ok(value)
    }

    /// Values below `min` are raised to `min`.
    pub fn number_input(&mut self, key: &str, label: &str, default: i64, min: i64) -> Result<i64, WidgetError> {
        let value = match self.pass.input.get(&self.id_for(key)?) {
            Some(InputValue::Number(number)) => *number,
            _ => default,
        }
        .max(min);
        self.control(
            key,
            ElementKind::NumberInput {
                label: label.to_owned(),
                value,
            },
        )?;
        Ok(value)
    }

    pub fn date_input(&mut self, key: &str, label: &str, default: NaiveDate) -> Result<NaiveDate, WidgetError> {
        let value = match self.pass.input.get(&self.id_for(key)?) {
            Some(InputValue::Date(date)) => *date,
            _ => default,
        };
        self.control(
            key,
            ElementKind::DateInput {
                label: label.to_owned(),
                value,
            },
        )?;
        Ok(value)
    }

    /// Returns the selected index; out-of-range input falls back to `default`.
    pub fn select_box(
        &mut self,
        key: &str,
        label: &str,
        options: Vec<String>,
        default: usize,
    ) -> Result<usize, WidgetError> {
        let selected = match self.pass.input.get(&self.id_for(key)?) {
            Some(InputValue::Selected(index)) if *index < options.len() => *index,
            _ => default.min(options.len().saturating_sub(1)),
        };
        self.control(
            key,
            ElementKind::SelectBox {
                label: label.to_owned(),
                options,
                selected,
            },
        )?;
        Ok(selected)
    }

    pub fn button(&mut self, key: &str, label: &str) -> Result<bool, WidgetError> {
        let input = self.control(key, ElementKind::Button { label: label.to_owned() })?;
        Ok(matches!(input, Some(InputValue::Clicked)))
    }

    pub fn form_submit(&mut self, key: &str, label: &str) -> Result<bool, WidgetError> {
        let input = self.control(key, ElementKind::FormSubmit { label: label.to_owned() })?;
        Ok(matches!(input, Some(InputValue::Clicked)))
    }
}

/// The output of a finished render pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub elements: Vec<Element>,
}

impl Page {
    pub fn ids(&self) -> Vec<&WidgetId> {
        self.elements
            .iter()
            .filter_map(|element| element.id.as_ref())
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<&Element> {
        self.elements
            .iter()
            .find(|element| element.id.as_ref().is_some_and(|e| e.as_str() == id))
    }
}
