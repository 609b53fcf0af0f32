//! Lay a [`QuizView`] out as draw operations on one tall region.
//!
//! Coordinates are in PDF points with the origin at the top-left corner of
//! the region and `y` growing downwards; [`crate::export::capture`] flips
//! them when drawing. Text `y` is the baseline.
//!
//! Glyph widths are estimated from average Helvetica advance widths, which is
//! close enough for line wrapping of prose. East Asian wide characters count
//! as a full em. Overlong words are hard-split, which is also how unspaced
//! CJK text wraps.

use crate::render::{McqView, QuizView, SectionView, TrueFalseView};

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const INK: Rgb = Rgb(31, 41, 55);
pub const ACCENT: Rgb = Rgb(79, 70, 229);
const PAGE_BG: Rgb = Rgb(255, 255, 255);
const SECTION_BG: Rgb = Rgb(248, 250, 252);
const HEADER_BG: Rgb = Rgb(241, 245, 249);
const BORDER: Rgb = Rgb(226, 232, 240);
const ANSWER_BG: Rgb = Rgb(240, 253, 244);
const ANSWER_INK: Rgb = Rgb(22, 101, 52);
const TRUE_BG: Rgb = Rgb(220, 252, 231);
const FALSE_BG: Rgb = Rgb(254, 226, 226);
const FALSE_INK: Rgb = Rgb(153, 27, 27);

const PADDING: f32 = 24.0;
const SECTION_GAP: f32 = 28.0;
const SECTION_TITLE_SIZE: f32 = 18.0;
const QUESTION_SIZE: f32 = 13.0;
const OPTION_SIZE: f32 = 11.0;
const BADGE_SIZE: f32 = 10.0;
const LINE_FACTOR: f32 = 1.35;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Rgb,
    },
    Text {
        x: f32,
        y: f32,
        text: String,
        size: f32,
        bold: bool,
        color: Rgb,
    },
}

/// The laid-out region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionLayout {
    pub width_pt: f32,
    pub height_pt: f32,
    pub ops: Vec<DrawOp>,
}

impl RegionLayout {
    pub fn text_runs(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            DrawOp::Rect { .. } => None,
        })
    }
    /// Distinct characters the built-in Helvetica cannot draw, in order of
    /// first appearance.
    pub fn non_win_ansi_chars(&self) -> Vec<char> {
        let mut found = Vec::new();
        for c in self.text_runs().flat_map(str::chars) {
            if !is_win_ansi(c) && !found.contains(&c) {
                found.push(c);
            }
        }
        found
    }
}

/// Whether `c` is in the WinAnsi (CP-1252) set used by the standard fonts.
pub fn is_win_ansi(c: char) -> bool {
    matches!(c,
        ' '..='~'
        | '\u{a0}'..='\u{ff}'
        | '€' | '‚' | 'ƒ' | '„' | '…' | '†' | '‡' | 'ˆ' | '‰' | 'Š' | '‹' | 'Œ' | 'Ž'
        | '‘' | '’' | '“' | '”' | '•' | '–' | '—' | '˜' | '™' | 'š' | '›' | 'œ' | 'ž' | 'Ÿ')
}

/// East Asian wide and full-width characters.
fn is_wide(c: char) -> bool {
    matches!(c,
        '\u{1100}'..='\u{115f}'
        | '\u{2e80}'..='\u{303e}'
        | '\u{3041}'..='\u{33ff}'
        | '\u{3400}'..='\u{4dbf}'
        | '\u{4e00}'..='\u{9fff}'
        | '\u{a000}'..='\u{a4cf}'
        | '\u{ac00}'..='\u{d7a3}'
        | '\u{f900}'..='\u{faff}'
        | '\u{fe30}'..='\u{fe4f}'
        | '\u{ff00}'..='\u{ff60}'
        | '\u{ffe0}'..='\u{ffe6}'
        | '\u{20000}'..='\u{3fffd}')
}

/// Lay `view` out on a region `width_pt` wide.
pub fn layout_quiz(view: &QuizView, width_pt: f32) -> RegionLayout {
    let mut cursor = Cursor {
        ops: vec![DrawOp::Rect {
            x: 0.0,
            y: 0.0,
            width: width_pt,
            height: 0.0,
            fill: PAGE_BG,
        }],
        y: PADDING,
    };
    let inner_x = PADDING;
    let inner_w = width_pt - 2.0 * PADDING;

    for (i, section) in view.sections.iter().enumerate() {
        if i > 0 {
            cursor.y += SECTION_GAP;
        }
        layout_section(&mut cursor, section, inner_x, inner_w);
    }

    let height_pt = (cursor.y + PADDING).max(2.0 * PADDING);
    if let Some(DrawOp::Rect { height, .. }) = cursor.ops.first_mut() {
        *height = height_pt;
    }

    RegionLayout {
        width_pt,
        height_pt,
        ops: cursor.ops,
    }
}

struct Cursor {
    ops: Vec<DrawOp>,
    y: f32,
}

impl Cursor {
    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, fill: Rgb) {
        self.ops.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            fill,
        });
    }

    /// Wrap `text` into `width` starting at the cursor, advancing past it.
    fn paragraph(&mut self, x: f32, width: f32, text: &str, size: f32, bold: bool, color: Rgb) {
        let line_h = size * LINE_FACTOR;
        for line in wrap_text(text, size, bold, width) {
            self.y += line_h;
            self.ops.push(DrawOp::Text {
                x,
                y: self.y - (line_h - size) / 2.0 - size * 0.2,
                text: line,
                size,
                bold,
                color,
            });
        }
    }

    fn text(&mut self, x: f32, baseline: f32, text: &str, size: f32, bold: bool, color: Rgb) {
        self.ops.push(DrawOp::Text {
            x,
            y: baseline,
            text: text.to_string(),
            size,
            bold,
            color,
        });
    }
}

fn layout_section(cursor: &mut Cursor, section: &SectionView, x: f32, width: f32) {
    let top = cursor.y;
    // Background first; its height is patched once the body is laid out.
    let bg_index = cursor.ops.len();
    cursor.rect(x, top, width, 0.0, SECTION_BG);

    let header_h = SECTION_TITLE_SIZE * LINE_FACTOR + 24.0;
    cursor.rect(x, top, width, header_h, HEADER_BG);
    cursor.rect(x, top + header_h - 1.0, width, 1.0, BORDER);
    cursor.text(
        x + 16.0,
        top + 12.0 + SECTION_TITLE_SIZE,
        section.title(),
        SECTION_TITLE_SIZE,
        true,
        INK,
    );
    cursor.y = top + header_h + 16.0;

    let body_x = x + 16.0;
    let body_w = width - 32.0;
    match section {
        SectionView::MultipleChoice { items, .. } => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    cursor.y += 14.0;
                }
                layout_mcq(cursor, item, body_x, body_w);
            }
        }
        SectionView::TrueFalse { items, .. } => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    cursor.rect(body_x, cursor.y + 6.0, body_w, 1.0, BORDER);
                    cursor.y += 13.0;
                }
                layout_true_false(cursor, item, body_x, body_w);
            }
        }
    }
    cursor.y += 16.0;

    if let Some(DrawOp::Rect { height, .. }) = cursor.ops.get_mut(bg_index) {
        *height = cursor.y - top;
    }
}

fn layout_mcq(cursor: &mut Cursor, item: &McqView, x: f32, width: f32) {
    let top = cursor.y;
    let card_index = cursor.ops.len();
    cursor.rect(x, top, width, 0.0, PAGE_BG);

    let inner_x = x + 14.0;
    let inner_w = width - 28.0;
    cursor.y += 10.0;
    cursor.paragraph(
        inner_x,
        inner_w,
        &format!("{}. {}", item.number, item.question),
        QUESTION_SIZE,
        true,
        INK,
    );
    cursor.y += 6.0;

    let letter_w = 18.0;
    for option in &item.options {
        let row_top = cursor.y;
        let row_index = cursor.ops.len();
        cursor.rect(inner_x, row_top, inner_w, 0.0, SECTION_BG);
        cursor.y += 4.0;
        let text_top = cursor.y;
        cursor.paragraph(
            inner_x + 8.0 + letter_w,
            inner_w - 16.0 - letter_w,
            &option.text,
            OPTION_SIZE,
            false,
            INK,
        );
        if cursor.y == text_top {
            // Empty option text still gets one line for its letter.
            cursor.y += OPTION_SIZE * LINE_FACTOR;
        }
        cursor.text(
            inner_x + 8.0,
            text_top + OPTION_SIZE * LINE_FACTOR - (OPTION_SIZE * LINE_FACTOR - OPTION_SIZE) / 2.0
                - OPTION_SIZE * 0.2,
            &option.letter,
            OPTION_SIZE,
            true,
            ACCENT,
        );
        cursor.y += 4.0;
        if let Some(DrawOp::Rect { height, .. }) = cursor.ops.get_mut(row_index) {
            *height = cursor.y - row_top;
        }
        cursor.y += 4.0;
    }

    cursor.y += 4.0;
    let answer_top = cursor.y;
    let answer_index = cursor.ops.len();
    cursor.rect(inner_x, answer_top, inner_w, 0.0, ANSWER_BG);
    cursor.y += 4.0;
    cursor.paragraph(
        inner_x + 8.0,
        inner_w - 16.0,
        &format!("Correct Answer: {}", item.answer),
        OPTION_SIZE,
        true,
        ANSWER_INK,
    );
    cursor.y += 4.0;
    if let Some(DrawOp::Rect { height, .. }) = cursor.ops.get_mut(answer_index) {
        *height = cursor.y - answer_top;
    }

    cursor.y += 10.0;
    if let Some(DrawOp::Rect { height, .. }) = cursor.ops.get_mut(card_index) {
        *height = cursor.y - top;
    }
}

fn layout_true_false(cursor: &mut Cursor, item: &TrueFalseView, x: f32, width: f32) {
    let (badge_bg, badge_ink) = if item.answer {
        (TRUE_BG, ANSWER_INK)
    } else {
        (FALSE_BG, FALSE_INK)
    };
    let badge_w = text_width(&item.badge, BADGE_SIZE, true) + 20.0;
    let badge_h = BADGE_SIZE * LINE_FACTOR + 6.0;

    let top = cursor.y;
    cursor.paragraph(
        x,
        width - badge_w - 16.0,
        &format!("{}. {}", item.number, item.question),
        QUESTION_SIZE - 1.0,
        false,
        INK,
    );
    cursor.y = cursor.y.max(top + badge_h);

    let badge_x = x + width - badge_w;
    cursor.rect(badge_x, top + 2.0, badge_w, badge_h, badge_bg);
    cursor.text(
        badge_x + 10.0,
        top + 2.0 + 3.0 + BADGE_SIZE,
        &item.badge,
        BADGE_SIZE,
        true,
        badge_ink,
    );
}

/// Estimated rendered width of `text` in points.
pub fn text_width(text: &str, size: f32, bold: bool) -> f32 {
    text.chars().map(|c| glyph_em(c, bold)).sum::<f32>() * size
}

fn glyph_em(c: char, bold: bool) -> f32 {
    let base = match c {
        ' ' => 0.278,
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' => 0.24,
        'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '-' => 0.34,
        'm' | 'w' | 'M' | 'W' => 0.85,
        'A'..='Z' => 0.68,
        '0'..='9' => 0.556,
        c if c.is_ascii() => 0.52,
        c if is_wide(c) => 1.0,
        _ => 0.6,
    };
    if bold {
        base * 1.07
    } else {
        base
    }
}

/// Greedy word wrap against the estimated width. Never returns an empty
/// vector for non-blank input.
pub fn wrap_text(text: &str, size: f32, bold: bool, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if text_width(&candidate, size, bold) <= max_width {
                line = candidate;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            // Hard-split words that do not fit on a line of their own.
            for c in word.chars() {
                line.push(c);
                if text_width(&line, size, bold) > max_width && line.chars().count() > 1 {
                    line.pop();
                    lines.push(std::mem::take(&mut line));
                    line.push(c);
                }
            }
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }

    lines
}
