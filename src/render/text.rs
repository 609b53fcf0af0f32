//! Plain-text rendering for terminal output.

use crate::render::{QuizView, SectionView};
use std::fmt::Write as _;

/// Render `view` as plain text, one blank line between items.
pub fn render_text(view: &QuizView) -> String {
    let mut out = String::new();

    for (i, section) in view.sections.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let title = section.title();
        let _ = writeln!(out, "{title}");
        let _ = writeln!(out, "{}", "=".repeat(title.chars().count()));

        match section {
            SectionView::MultipleChoice { items, .. } => {
                for item in items {
                    let _ = writeln!(out, "\n{}. {}", item.number, item.question);
                    for option in &item.options {
                        let _ = writeln!(out, "   {}) {}", option.letter, option.text);
                    }
                    let _ = writeln!(out, "   Correct Answer: {}", item.answer);
                }
            }
            SectionView::TrueFalse { items, .. } => {
                for item in items {
                    let _ = writeln!(out, "\n{}. {}  [{}]", item.number, item.question, item.badge);
                }
            }
        }
    }

    out
}
