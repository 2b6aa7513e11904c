//! Check selection and configuration.

use serde::{Deserialize, Serialize};

/// Options for a document check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOptions {
    /// Content sticking out of the text column
    pub overflow: bool,

    /// Hyphen used where a dash belongs (" - ")
    pub dash: bool,

    /// Unresolved references ("??")
    pub bad_reference: bool,

    /// Images that almost, but not quite, fill the column
    pub image_width: bool,

    /// Headings of level three or deeper listed in the table of contents
    pub toc: bool,

    /// Missing space before an opening bracket
    pub bracket_spacing: bool,

    /// Headings without body text between them
    pub empty_section: bool,

    /// Treat included PDF pages as images instead of checking their text
    pub embedded_pdf_as_image: bool,

    /// Collect chapter statistics during the full pass
    pub collect_statistics: bool,

    pub statistics: StatisticsOptions,
}

impl CheckOptions {
    /// Create options with every check enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every check enabled.
    pub fn all() -> Self {
        Self::default()
    }

    /// No check enabled; combine with the `with_*` methods.
    pub fn none() -> Self {
        Self {
            overflow: false,
            dash: false,
            bad_reference: false,
            image_width: false,
            toc: false,
            bracket_spacing: false,
            empty_section: false,
            ..Self::default()
        }
    }

    pub fn with_overflow(mut self, enabled: bool) -> Self {
        self.overflow = enabled;
        self
    }

    pub fn with_dash(mut self, enabled: bool) -> Self {
        self.dash = enabled;
        self
    }

    pub fn with_bad_reference(mut self, enabled: bool) -> Self {
        self.bad_reference = enabled;
        self
    }

    pub fn with_image_width(mut self, enabled: bool) -> Self {
        self.image_width = enabled;
        self
    }

    pub fn with_toc(mut self, enabled: bool) -> Self {
        self.toc = enabled;
        self
    }

    pub fn with_bracket_spacing(mut self, enabled: bool) -> Self {
        self.bracket_spacing = enabled;
        self
    }

    pub fn with_empty_section(mut self, enabled: bool) -> Self {
        self.empty_section = enabled;
        self
    }

    /// Treat embedded PDF pages as images (default) or as page content.
    pub fn with_embedded_pdf_as_image(mut self, enabled: bool) -> Self {
        self.embedded_pdf_as_image = enabled;
        self
    }

    /// Enable chapter statistics.
    pub fn with_statistics(mut self, enabled: bool) -> Self {
        self.collect_statistics = enabled;
        self
    }

    /// Set statistics options (enables statistics).
    pub fn with_statistics_options(mut self, statistics: StatisticsOptions) -> Self {
        self.collect_statistics = true;
        self.statistics = statistics;
        self
    }

    /// True if at least one check is enabled.
    pub fn any_check(&self) -> bool {
        self.overflow
            || self.dash
            || self.bad_reference
            || self.image_width
            || self.toc
            || self.bracket_spacing
            || self.empty_section
    }

    /// The document margin is estimated.
    pub fn needs_margin(&self) -> bool {
        self.overflow || self.image_width || self.empty_section
    }

    /// The regular font is estimated.
    pub fn needs_font(&self) -> bool {
        self.empty_section || self.collect_statistics
    }
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            overflow: true,
            dash: true,
            bad_reference: true,
            image_width: true,
            toc: true,
            bracket_spacing: true,
            empty_section: true,
            embedded_pdf_as_image: true,
            collect_statistics: false,
            statistics: StatisticsOptions::default(),
        }
    }
}

/// Options for the chapter statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsOptions {
    /// Count content before the first and after the last chapter in the
    /// document totals and the total word ranking
    pub include_pseudo_chapters: bool,
}

impl StatisticsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pseudo_chapters(mut self, include: bool) -> Self {
        self.include_pseudo_chapters = include;
        self
    }
}

impl Default for StatisticsOptions {
    fn default() -> Self {
        Self {
            include_pseudo_chapters: true,
        }
    }
}
