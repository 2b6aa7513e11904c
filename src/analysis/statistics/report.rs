//! Read-only statistics roll-up, serialized for the report.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::Rect;

use super::chapter::{ChapterInfo, PictureInfo, TextInfo};
use super::standard_pages::{
    area_cm2, chars_to_std_pages, image_area_std_pages, round2, std_pages_to_chars,
};

/// Length of the most-frequent-word rankings.
pub const MOST_FREQUENT_WORDS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagesReport {
    pub first: usize,
    pub last: usize,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextReport {
    pub total_char_count: usize,
    pub total_char_count_std_pages: f64,
    pub non_white_char_count: usize,
    pub non_white_char_count_std_pages: f64,
    pub total_word_count: usize,
}

impl From<&TextInfo> for TextReport {
    fn from(text: &TextInfo) -> Self {
        Self {
            total_char_count: text.total_char_count,
            total_char_count_std_pages: chars_to_std_pages(text.total_char_count),
            non_white_char_count: text.non_white_char_count,
            non_white_char_count_std_pages: chars_to_std_pages(text.non_white_char_count),
            total_word_count: text.total_word_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PictureReport {
    pub bbox: Rect,
    pub page: usize,
    /// Printed area in cm²
    pub area: f64,
    pub std_pages: f64,
    /// Characters equivalent to `std_pages`
    pub char_count: usize,
}

impl From<&PictureInfo> for PictureReport {
    fn from(picture: &PictureInfo) -> Self {
        let area = area_cm2(picture.bbox.width() as f64, picture.bbox.height() as f64);
        let std_pages = image_area_std_pages(area);
        Self {
            bbox: picture.bbox,
            page: picture.page,
            area: round2(area),
            std_pages,
            char_count: std_pages_to_chars(std_pages),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterReport {
    pub sequence: usize,
    pub title: Option<String>,
    pub pages: PagesReport,
    pub text_info: TextReport,
    pub pictures: Vec<PictureReport>,
    pub pictures_std_pages: f64,
    pub total_std_pages: f64,
}

impl From<&ChapterInfo> for ChapterReport {
    fn from(chapter: &ChapterInfo) -> Self {
        let text_info = TextReport::from(&chapter.text);
        let pictures: Vec<PictureReport> = chapter.pictures.iter().map(PictureReport::from).collect();
        let pictures_std_pages = round2(pictures.iter().map(|p| p.std_pages).sum());
        Self {
            sequence: chapter.sequence,
            title: chapter.title.clone(),
            pages: PagesReport {
                first: chapter.pages.first,
                last: chapter.pages.last,
                count: chapter.pages.count(),
            },
            total_std_pages: round2(text_info.total_char_count_std_pages + pictures_std_pages),
            text_info,
            pictures,
            pictures_std_pages,
        }
    }
}

/// Document-level statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStatistics {
    pub chapters: Vec<ChapterReport>,
    pub before_first_chapter_info: ChapterReport,
    pub after_last_chapter_info: ChapterReport,
    pub total_std_pages_from_text: f64,
    pub total_std_pages_from_pictures: f64,
    pub total_std_pages: f64,
    pub std_pages_picture_percentage: f64,
    pub std_pages_text_percentage: f64,
    pub most_frequent_words_from_chapters: Vec<(String, usize)>,
    pub most_frequent_words_total: Vec<(String, usize)>,
}

impl DocumentStatistics {
    /// Roll up chapter statistics.
    ///
    /// With `include_pseudo_chapters` the content before the first and after
    /// the last chapter counts towards the totals and the total word ranking.
    pub fn build(
        before: &ChapterInfo,
        chapters: &[ChapterInfo],
        after: &ChapterInfo,
        include_pseudo_chapters: bool,
    ) -> Self {
        let reports: Vec<ChapterReport> = chapters.iter().map(ChapterReport::from).collect();
        let before_report = ChapterReport::from(before);
        let after_report = ChapterReport::from(after);

        let mut counted: Vec<&ChapterReport> = reports.iter().collect();
        if include_pseudo_chapters {
            counted.push(&before_report);
            counted.push(&after_report);
        }

        let from_text = round2(counted.iter().map(|c| c.text_info.total_char_count_std_pages).sum());
        let from_pictures = round2(counted.iter().map(|c| c.pictures_std_pages).sum());
        let total = round2(counted.iter().map(|c| c.total_std_pages).sum());

        let mut all_sources: Vec<&ChapterInfo> = Vec::with_capacity(chapters.len() + 2);
        if include_pseudo_chapters {
            all_sources.push(before);
        }
        all_sources.extend(chapters.iter());
        if include_pseudo_chapters {
            all_sources.push(after);
        }

        Self {
            most_frequent_words_from_chapters: most_frequent_words(chapters.iter()),
            most_frequent_words_total: most_frequent_words(all_sources),
            chapters: reports,
            before_first_chapter_info: before_report,
            after_last_chapter_info: after_report,
            total_std_pages_from_text: from_text,
            total_std_pages_from_pictures: from_pictures,
            total_std_pages: total,
            std_pages_picture_percentage: percentage(from_pictures, total),
            std_pages_text_percentage: percentage(from_text, total),
        }
    }
}

/// `part / total` in percent, rounded; zero when the total is zero.
pub fn percentage(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        round2(part / total * 100.0)
    }
}

/// Merge word frequencies and rank them, most frequent first.
///
/// Ties keep the order in which words were first met.
pub fn most_frequent_words<'a, I>(chapters: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a ChapterInfo>,
{
    let mut merged: IndexMap<&str, usize> = IndexMap::new();
    for chapter in chapters {
        for (word, count) in &chapter.text.word_frequency {
            *merged.entry(word.as_str()).or_insert(0) += count;
        }
    }

    let mut ranked: Vec<(String, usize)> = merged
        .into_iter()
        .map(|(word, count)| (word.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(MOST_FREQUENT_WORDS);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(sequence: usize, text: &str) -> ChapterInfo {
        let mut info = ChapterInfo::new(sequence, Some(format!("Chapter {}", sequence)));
        info.add_text(text);
        info
    }

    #[test]
    fn test_chapter_report_totals() {
        let mut info = chapter(1, &"x".repeat(3600));
        info.add_page(3);
        info.add_page(5);
        // 10 cm × 18 cm
        info.add_picture(Rect::new(0.0, 0.0, 283.464_6, 510.236_2), 4);

        let report = ChapterReport::from(&info);
        assert_eq!(report.text_info.total_char_count_std_pages, 2.0);
        assert_eq!(report.pictures[0].std_pages, 1.0);
        assert_eq!(report.pictures[0].char_count, 1800);
        assert_eq!(report.pictures_std_pages, 1.0);
        assert_eq!(report.total_std_pages, 3.0);
        assert_eq!(report.pages.count, 3);
    }

    #[test]
    fn test_ranking_is_stable() {
        let a = chapter(1, "beta alpha alpha");
        let b = chapter(2, "gamma beta delta");
        let ranked = most_frequent_words([&a, &b]);
        assert_eq!(
            ranked,
            vec![
                ("beta".to_string(), 2),
                ("alpha".to_string(), 2),
                ("gamma".to_string(), 1),
                ("delta".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_ranking_is_truncated() {
        let text: Vec<String> = (0..80).map(|i| format!("word{:02}", i)).collect();
        let info = chapter(1, &text.join(" "));
        assert_eq!(most_frequent_words([&info]).len(), MOST_FREQUENT_WORDS);
    }

    #[test]
    fn test_pseudo_chapters_toggle() {
        let before = chapter(0, &"abstract ".repeat(200));
        let chapters = vec![chapter(1, &"results ".repeat(225))];
        let after = ChapterInfo::default();

        let with = DocumentStatistics::build(&before, &chapters, &after, true);
        let without = DocumentStatistics::build(&before, &chapters, &after, false);

        assert_eq!(without.total_std_pages_from_text, 1.0);
        assert_eq!(with.total_std_pages_from_text, 2.0);
        assert_eq!(with.most_frequent_words_total[0].0, "results");
        assert_eq!(with.most_frequent_words_total.len(), 2);
        assert_eq!(without.most_frequent_words_total.len(), 1);
        assert_eq!(with.most_frequent_words_from_chapters.len(), 1);
    }

    #[test]
    fn test_percentages() {
        assert_eq!(percentage(1.0, 0.0), 0.0);
        assert_eq!(percentage(1.0, 3.0), 33.33);

        let empty = DocumentStatistics::build(
            &ChapterInfo::default(),
            &[],
            &ChapterInfo::default(),
            true,
        );
        assert_eq!(empty.std_pages_text_percentage, 0.0);
        assert_eq!(empty.std_pages_picture_percentage, 0.0);
    }

    #[test]
    fn test_serialized_keys() {
        let stats = DocumentStatistics::build(
            &ChapterInfo::default(),
            &[chapter(1, "text")],
            &ChapterInfo::default(),
            true,
        );
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json["chapters"][0]["textInfo"]["totalCharCountStdPages"].is_number());
        assert!(json["chapters"][0]["picturesStdPages"].is_number());
        assert!(json["stdPagesTextPercentage"].is_number());
        assert!(json["mostFrequentWordsTotal"].is_array());
        assert_eq!(json["chapters"][0]["pages"]["count"], 0);
    }
}
