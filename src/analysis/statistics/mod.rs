//! Chapter statistics in standard pages.
//!
//! Content is attributed to chapters while the document is walked, then
//! rolled up into a serializable [`DocumentStatistics`] tree.

mod chapter;
mod collector;
mod report;
pub mod standard_pages;

pub use chapter::{ChapterInfo, Pages, PictureInfo, TextInfo};
pub use collector::{is_end_matter_heading, ChapterCollector};
pub use report::{
    most_frequent_words, percentage, ChapterReport, DocumentStatistics, PagesReport,
    PictureReport, TextReport, MOST_FREQUENT_WORDS,
};
