//! Splits plain text extracted from an FAQ document into question/answer pairs.
//!
//! The document is read as a sequence of headings, each followed by the lines
//! of its answer. A heading is any line that is not a bullet point and is
//! either short or phrased as a question.

use crate::domain::knowledge::QaPair;

pub const DEFAULT_FOOTER_PREFIX: &str = "ambel.ca";
pub const DEFAULT_HEADING_MAX_CHARS: usize = 60;

const BULLET_MARKERS: &[char] = &['●', '○'];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentOptions {
    /// Lines starting with any of these prefixes (page footers) are dropped.
    pub footer_prefixes: Vec<String>,
    pub heading_max_chars: usize,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            footer_prefixes: vec![DEFAULT_FOOTER_PREFIX.to_string()],
            heading_max_chars: DEFAULT_HEADING_MAX_CHARS,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct QaSegmenter {
    options: SegmentOptions,
}

impl QaSegmenter {
    pub fn new(options: SegmentOptions) -> Self {
        Self { options }
    }

    pub fn segment(&self, text: &str) -> Vec<QaPair> {
        let mut pairs = Vec::new();
        let mut current_question: Option<&str> = None;
        let mut answer_lines: Vec<&str> = Vec::new();

        for line in text.lines().map(str::trim).filter(|line| self.is_content(line)) {
            if self.is_heading(line) {
                flush(&mut pairs, current_question, &mut answer_lines);
                current_question = Some(line);
            } else if current_question.is_some() {
                answer_lines.push(line);
            }
        }
        flush(&mut pairs, current_question, &mut answer_lines);

        pairs
    }

    fn is_content(&self, line: &str) -> bool {
        !line.is_empty()
            && !self.options.footer_prefixes.iter().any(|prefix| line.starts_with(prefix.as_str()))
    }

    fn is_heading(&self, line: &str) -> bool {
        let is_bullet = line.starts_with(BULLET_MARKERS);
        let looks_like_heading =
            line.chars().count() < self.options.heading_max_chars || line.ends_with('?');
        !is_bullet && looks_like_heading
    }
}

fn flush(pairs: &mut Vec<QaPair>, question: Option<&str>, answer_lines: &mut Vec<&str>) {
    if let Some(question) = question {
        if !answer_lines.is_empty() {
            pairs.push(QaPair::new(question, answer_lines.join(" ")));
        }
    }
    answer_lines.clear();
}
