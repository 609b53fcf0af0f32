//! Quiz Renderer: a pure mapping from [`Quiz`] to a read-only visual tree.
//!
//! The [`QuizView`] is what every output format consumes: [`html`] for a
//! browser page, [`text`] for the terminal and the PDF layout in
//! [`crate::export::layout`]. Numbering, option letters and badge labels
//! are decided once here so all formats agree.
//!
//! The MCQ answer is shown exactly as the model stated it. No attempt is
//! made to match it against the options.

pub mod html;
pub mod text;

use crate::quiz::Quiz;
use serde::Serialize;

pub const MCQ_SECTION_TITLE: &str = "Multiple Choice Questions";
pub const TRUE_FALSE_SECTION_TITLE: &str = "True or False Questions";

/// The rendered quiz. Empty sections are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizView {
    pub sections: Vec<SectionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionView {
    MultipleChoice { title: String, items: Vec<McqView> },
    TrueFalse { title: String, items: Vec<TrueFalseView> },
}

impl SectionView {
    pub fn title(&self) -> &str {
        match self {
            SectionView::MultipleChoice { title, .. } | SectionView::TrueFalse { title, .. } => {
                title
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct McqView {
    /// 1-based position within its section.
    pub number: usize,
    pub question: String,
    pub options: Vec<OptionView>,
    /// Verbatim from the model.
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    pub letter: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrueFalseView {
    pub number: usize,
    pub question: String,
    pub answer: bool,
    /// "True" or "False".
    pub badge: String,
}

impl QuizView {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Number of MCQ blocks (each with its lettered options).
    pub fn mcq_block_count(&self) -> usize {
        self.sections
            .iter()
            .map(|s| match s {
                SectionView::MultipleChoice { items, .. } => items.len(),
                SectionView::TrueFalse { .. } => 0,
            })
            .sum()
    }

    /// Number of true/false badges.
    pub fn badge_count(&self) -> usize {
        self.sections
            .iter()
            .map(|s| match s {
                SectionView::TrueFalse { items, .. } => items.len(),
                SectionView::MultipleChoice { .. } => 0,
            })
            .sum()
    }
}

/// Build the visual tree for a quiz.
pub fn render_quiz(quiz: &Quiz) -> QuizView {
    let mut sections = Vec::with_capacity(2);

    if !quiz.mcqs.is_empty() {
        let items = quiz
            .mcqs
            .iter()
            .enumerate()
            .map(|(i, mcq)| McqView {
                number: i + 1,
                question: mcq.question.clone(),
                options: mcq
                    .options
                    .iter()
                    .enumerate()
                    .map(|(j, text)| OptionView {
                        letter: option_letter(j),
                        text: text.clone(),
                    })
                    .collect(),
                answer: mcq.answer.clone(),
            })
            .collect();
        sections.push(SectionView::MultipleChoice {
            title: MCQ_SECTION_TITLE.to_string(),
            items,
        });
    }

    if !quiz.true_false.is_empty() {
        let items = quiz
            .true_false
            .iter()
            .enumerate()
            .map(|(i, tf)| TrueFalseView {
                number: i + 1,
                question: tf.question.clone(),
                answer: tf.answer,
                badge: if tf.answer { "True" } else { "False" }.to_string(),
            })
            .collect();
        sections.push(SectionView::TrueFalse {
            title: TRUE_FALSE_SECTION_TITLE.to_string(),
            items,
        });
    }

    QuizView { sections }
}

/// A, B, C, … by position; past Z, the 1-based position.
pub fn option_letter(index: usize) -> String {
    if index < 26 {
        char::from(b'A' + index as u8).to_string()
    } else {
        (index + 1).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{McqItem, TrueFalseItem};

    fn sample() -> Quiz {
        Quiz {
            mcqs: vec![McqItem {
                question: "Largest planet?".into(),
                options: vec!["Mars".into(), "Jupiter".into(), "Venus".into(), "Earth".into()],
                answer: "Jupiter".into(),
            }],
            true_false: vec![
                TrueFalseItem {
                    question: "The Sun is a star.".into(),
                    answer: true,
                },
                TrueFalseItem {
                    question: "Pluto is a gas giant.".into(),
                    answer: false,
                },
            ],
        }
    }

    #[test]
    fn letters_options_by_position() {
        let view = render_quiz(&sample());
        let SectionView::MultipleChoice { items, title } = &view.sections[0] else {
            panic!("first section should be MCQ");
        };
        assert_eq!(title, MCQ_SECTION_TITLE);
        let letters: Vec<_> = items[0].options.iter().map(|o| o.letter.as_str()).collect();
        assert_eq!(letters, ["A", "B", "C", "D"]);
        assert_eq!(items[0].options[1].text, "Jupiter");
        assert_eq!(items[0].answer, "Jupiter");
        assert_eq!(items[0].number, 1);
    }

    #[test]
    fn badges_follow_boolean() {
        let view = render_quiz(&sample());
        let SectionView::TrueFalse { items, .. } = &view.sections[1] else {
            panic!("second section should be true/false");
        };
        assert_eq!(items[0].badge, "True");
        assert_eq!(items[1].badge, "False");
        assert_eq!(items[1].number, 2);
        assert_eq!(view.badge_count(), 2);
        assert_eq!(view.mcq_block_count(), 1);
    }

    #[test]
    fn empty_sections_are_omitted() {
        let mut quiz = sample();
        quiz.mcqs.clear();
        let view = render_quiz(&quiz);
        assert_eq!(view.sections.len(), 1);
        assert_eq!(view.sections[0].title(), TRUE_FALSE_SECTION_TITLE);

        assert!(render_quiz(&Quiz::default()).is_empty());
    }

    #[test]
    fn answer_not_in_options_is_rendered_verbatim() {
        let quiz = Quiz {
            mcqs: vec![McqItem {
                question: "Q".into(),
                options: vec!["a".into(), "b".into()],
                answer: "something else".into(),
            }],
            true_false: vec![],
        };
        let view = render_quiz(&quiz);
        let SectionView::MultipleChoice { items, .. } = &view.sections[0] else {
            panic!("expected MCQ section");
        };
        assert_eq!(items[0].answer, "something else");
    }

    #[test]
    fn option_letters_past_z() {
        assert_eq!(option_letter(0), "A");
        assert_eq!(option_letter(25), "Z");
        assert_eq!(option_letter(26), "27");
    }

    #[test]
    fn view_serialises_with_section_kind() {
        let json = serde_json::to_value(render_quiz(&sample())).unwrap();
        assert_eq!(json["sections"][0]["kind"], "multiple_choice");
        assert_eq!(json["sections"][1]["kind"], "true_false");
    }
}
