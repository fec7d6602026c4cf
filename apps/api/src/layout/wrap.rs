//! Greedy word wrap.
//!
//! Paragraphs are split on `\n` (preview text is `white-space: pre-line`),
//! words are packed onto a line until the next one would cross `max_width`.
//! A single word wider than the line is broken between characters so long
//! URLs cannot push content outside the page.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WrappedLine {
    pub text: String,
    pub width: f32,
}

/// Wraps `text` to `max_width` using `measure` for run widths.
///
/// Returns no lines for blank input. Blank paragraphs between non-blank ones
/// keep an empty line so paragraph breaks stay visible.
pub fn wrap_text<F>(text: &str, max_width: f32, measure: F) -> Vec<WrappedLine>
where
    F: Fn(&str) -> f32,
{
    if text.trim().is_empty() {
        return Vec::new();
    }

    let space_w = measure(" ");
    let mut lines = Vec::new();

    for paragraph in text.trim().split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            lines.push(WrappedLine {
                text: String::new(),
                width: 0.0,
            });
            continue;
        }

        let mut current = String::new();
        let mut current_w = 0.0_f32;

        for word in words {
            let word_w = measure(word);

            if word_w > max_width {
                if !current.is_empty() {
                    lines.push(WrappedLine {
                        text: std::mem::take(&mut current),
                        width: current_w,
                    });
                }
                let mut pieces = break_word(word, max_width, &measure);
                let last = pieces.pop();
                lines.extend(pieces);
                match last {
                    Some(piece) => {
                        current_w = piece.width;
                        current = piece.text;
                    }
                    None => current_w = 0.0,
                }
                continue;
            }

            if current.is_empty() {
                current.push_str(word);
                current_w = word_w;
            } else if current_w + space_w + word_w > max_width {
                // Line is full: push it and start the next one with this word.
                lines.push(WrappedLine {
                    text: std::mem::replace(&mut current, word.to_string()),
                    width: current_w,
                });
                current_w = word_w;
            } else {
                current.push(' ');
                current.push_str(word);
                current_w += space_w + word_w;
            }
        }

        if !current.is_empty() {
            lines.push(WrappedLine {
                text: current,
                width: current_w,
            });
        }
    }

    lines
}

fn break_word<F>(word: &str, max_width: f32, measure: &F) -> Vec<WrappedLine>
where
    F: Fn(&str) -> f32,
{
    let mut pieces = Vec::new();
    let mut current = String::new();

    for c in word.chars() {
        let mut candidate = current.clone();
        candidate.push(c);
        if !current.is_empty() && measure(&candidate) > max_width {
            let width = measure(&current);
            pieces.push(WrappedLine {
                text: std::mem::take(&mut current),
                width,
            });
            current.push(c);
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        let width = measure(&current);
        pieces.push(WrappedLine {
            text: current,
            width,
        });
    }
    pieces
}
