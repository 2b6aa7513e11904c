//! Running per-chapter statistics.

use indexmap::IndexMap;
use unicode_normalization::UnicodeNormalization;

use crate::model::Rect;

/// Words shorter than this are not counted in the frequency map.
const MIN_COUNTED_WORD_CHARS: usize = 3;

/// Inclusive 1-based page range; `first == 0` means no page yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pages {
    pub first: usize,
    pub last: usize,
}

impl Pages {
    pub fn is_unset(&self) -> bool {
        self.first == 0
    }

    /// Number of pages in the range.
    ///
    /// An unset range counts as zero pages rather than `last - first + 1`,
    /// so an empty pseudo-chapter reports no pages.
    pub fn count(&self) -> usize {
        if self.is_unset() {
            0
        } else {
            self.last + 1 - self.first
        }
    }

    pub fn add(&mut self, page: usize) {
        if self.is_unset() {
            self.first = page;
            self.last = page;
        } else {
            self.last = self.last.max(page);
        }
    }
}

/// Character and word counts of a chapter's text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextInfo {
    pub total_char_count: usize,
    pub non_white_char_count: usize,
    pub total_word_count: usize,
    /// Lowercased words of three or more characters, in order of first use
    pub word_frequency: IndexMap<String, usize>,
}

impl TextInfo {
    pub fn update(&mut self, text: &str) {
        self.total_char_count += text.chars().count();

        let mut words = 0;
        for token in text.split_whitespace() {
            self.non_white_char_count += token.chars().count();

            let Some(word) = legible_word(token) else {
                continue;
            };
            words += 1;
            if word.chars().count() >= MIN_COUNTED_WORD_CHARS {
                *self.word_frequency.entry(word).or_insert(0) += 1;
            }
        }
        self.total_word_count += words;
    }
}

/// Lowercase a token and trim non-word characters from both ends.
fn legible_word(token: &str) -> Option<String> {
    let lower: String = token.to_lowercase().nfc().collect();
    let trimmed = lower.trim_matches(|c: char| !(c.is_alphanumeric() || c == '_'));
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// A picture attributed to a chapter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PictureInfo {
    pub bbox: Rect,
    /// 1-based page number
    pub page: usize,
}

/// Statistics of one chapter, or of the content before the first / after
/// the last chapter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChapterInfo {
    /// 1-based; 0 for the pseudo-chapters
    pub sequence: usize,
    pub title: Option<String>,
    pub pages: Pages,
    pub text: TextInfo,
    pub pictures: Vec<PictureInfo>,
}

impl ChapterInfo {
    pub fn new(sequence: usize, title: Option<String>) -> Self {
        Self {
            sequence,
            title,
            ..Default::default()
        }
    }

    pub fn add_text(&mut self, text: &str) {
        self.text.update(text);
    }

    pub fn add_picture(&mut self, bbox: Rect, page: usize) {
        self.pictures.push(PictureInfo { bbox, page });
    }

    pub fn add_page(&mut self, page: usize) {
        self.pages.add(page);
    }
}
