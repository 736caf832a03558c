use std::fmt::Write;

use crate::domain::widgets::element::{Element, ElementKind};
use crate::domain::widgets::render_pass::Page;

const PROGRESS_WIDTH: usize = 20;
const BAR_WIDTH: usize = 30;

/// Plain-text rendering of a page for terminals and logs.
#[derive(Debug, Clone, Copy)]
pub struct TextRenderer {
    pub show_ids: bool,
}

impl Default for TextRenderer {
    fn default() -> Self {
        TextRenderer { show_ids: true }
    }
}

impl TextRenderer {
    pub fn render(&self, page: &Page) -> String {
        let mut out = String::new();
        for element in &page.elements {
            self.render_element(&mut out, element);
        }
        out
    }

    fn id_suffix(&self, element: &Element) -> String {
        match (&element.id, self.show_ids) {
            (Some(id), true) => format!(" [{}]", id),
            _ => String::new(),
        }
    }

    fn render_element(&self, out: &mut String, element: &Element) {
        let indent = "  ".repeat(element.depth);
        let id = self.id_suffix(element);

        // Writing to a String cannot fail.
        let _ = match &element.kind {
            ElementKind::Tab { label } => writeln!(out, "{}== {} =={}", indent, label, id),
            ElementKind::Expander { label } => writeln!(out, "{}▸ {}{}", indent, label, id),
            ElementKind::Form { label } => writeln!(out, "{}┌ {}{}", indent, label, id),
            ElementKind::Title(text) => writeln!(out, "{}# {}", indent, text),
            ElementKind::Subheader(text) => writeln!(out, "{}## {}", indent, text),
            ElementKind::Caption(text) => writeln!(out, "{}({})", indent, text),
            ElementKind::Text(text) => writeln!(out, "{}{}", indent, text),
            ElementKind::Info(text) => writeln!(out, "{}ℹ {}", indent, text),
            ElementKind::Success(text) => writeln!(out, "{}✔ {}", indent, text),
            ElementKind::Warning(text) => writeln!(out, "{}⚠ {}", indent, text),
            ElementKind::Metric { label, value } => writeln!(out, "{}{}: {}", indent, label, value),
            ElementKind::Progress { ratio, text } => {
                let filled = (ratio * PROGRESS_WIDTH as f64).round() as usize;
                writeln!(
                    out,
                    "{}[{}{}] {}",
                    indent,
                    "#".repeat(filled),
                    "-".repeat(PROGRESS_WIDTH - filled.min(PROGRESS_WIDTH)),
                    text
                )
            }
            ElementKind::Table { columns, rows } => {
                self.render_table(out, &indent, columns, rows);
                Ok(())
            }
            ElementKind::BarChart {
                title,
                labels,
                values,
            } => {
                let max = values.iter().copied().max().unwrap_or(0).max(1);
                let _ = writeln!(out, "{}{}", indent, title);
                for (label, value) in labels.iter().zip(values) {
                    let bar = (*value.max(&0) as usize * BAR_WIDTH) / max as usize;
                    let _ = writeln!(out, "{}  {:<4} {} {}", indent, label, "█".repeat(bar), value);
                }
                Ok(())
            }
            ElementKind::PieChart { labels, values } => {
                let total: i64 = values.iter().sum();
                for (label, value) in labels.iter().zip(values) {
                    let share = if total > 0 {
                        *value as f64 * 100.0 / total as f64
                    } else {
                        0.0
                    };
                    let _ = writeln!(out, "{}{}: {} ({:.1}%)", indent, label, value, share);
                }
                Ok(())
            }
            ElementKind::TextInput { label, value } => {
                writeln!(out, "{}{}{} = \"{}\"", indent, label, id, value)
            }
            ElementKind::NumberInput { label, value } => {
                writeln!(out, "{}{}{} = {}", indent, label, id, value)
            }
            ElementKind::DateInput { label, value } => {
                writeln!(out, "{}{}{} = {}", indent, label, id, value)
            }
            ElementKind::SelectBox {
                label,
                options,
                selected,
            } => writeln!(
                out,
                "{}{}{} = {} ({})",
                indent,
                label,
                id,
                options.get(*selected).map(String::as_str).unwrap_or("-"),
                options.join(" / ")
            ),
            ElementKind::Button { label } | ElementKind::FormSubmit { label } => {
                writeln!(out, "{}<{}>{}", indent, label, id)
            }
        };
    }

    fn render_table(&self, out: &mut String, indent: &str, columns: &[String], rows: &[Vec<String>]) {
        let mut widths = columns.iter().map(|c| c.chars().count()).collect::<Vec<_>>();
        for row in rows {
            for (position, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(position) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }

        let line = |cells: &[String]| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| {
                    let pad = width.saturating_sub(cell.chars().count());
                    format!("{}{}", cell, " ".repeat(pad))
                })
                .collect::<Vec<_>>()
                .join(" | ")
        };

        let _ = writeln!(out, "{}{}", indent, line(columns).trim_end());
        let _ = writeln!(
            out,
            "{}{}",
            indent,
            widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-")
        );
        for row in rows {
            let _ = writeln!(out, "{}{}", indent, line(row).trim_end());
        }
    }
}
