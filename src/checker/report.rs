//! Check results.

use serde::{Deserialize, Serialize};

use crate::analysis::margin::Margin;
use crate::analysis::statistics::DocumentStatistics;
use crate::model::{FontSignature, Rect};
use crate::parser::{Annotation, Color, Popup};

/// Highlight colour of errors.
pub const HIGHLIGHT_RED: Color = Color(255, 128, 128);
/// Highlight colour of warnings.
pub const HIGHLIGHT_ORANGE: Color = Color(253, 182, 116);

const ERROR_TITLE: &str = "Chyba / Error";
const WARNING_TITLE: &str = "Varovani / Warning";

/// The check that produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckKind {
    Overflow,
    Dash,
    BadReference,
    ImageWidth,
    Toc,
    BracketSpacing,
    EmptySection,
}

impl CheckKind {
    /// Note shown in the pop-up of a highlight, if any.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            CheckKind::Overflow | CheckKind::ImageWidth => None,
            CheckKind::Dash => Some("Pouzijte pomlcku namisto spojovniku. / Use dash instead of hyphen."),
            CheckKind::BadReference => Some("Spatne uvedena reference. / Missing reference."),
            CheckKind::Toc => Some(
                "Nadpisy 3 a vetsi urovne nezobrazovat v obsahu. / Do not show headings level 3 or more in table of content",
            ),
            CheckKind::BracketSpacing => {
                Some("Chybi mezera pred levou zavorkou. / Missing space in between.")
            }
            CheckKind::EmptySection => {
                Some("Chybi text mezi nadpisy. / Missing text between sections.")
            }
        }
    }

    /// Warnings are highlighted in orange, errors in red.
    pub fn is_warning(&self) -> bool {
        matches!(self, CheckKind::BracketSpacing)
    }

    /// Highlight for one flagged rectangle; image widths are drawn with
    /// arrows instead.
    pub fn highlight(&self, rect: Rect) -> Option<Annotation> {
        if *self == CheckKind::ImageWidth {
            return None;
        }
        let (color, title) = if self.is_warning() {
            (HIGHLIGHT_ORANGE, WARNING_TITLE)
        } else {
            (HIGHLIGHT_RED, ERROR_TITLE)
        };
        Some(Annotation::Highlight {
            rects: vec![rect],
            color,
            popup: self.message().map(|text| Popup {
                title: title.to_string(),
                text: text.to_string(),
            }),
        })
    }
}

/// Rectangles flagged by one check on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub kind: CheckKind,
    /// 1-based page number
    pub page: usize,
    pub rects: Vec<Rect>,
}

/// Outcome of a document check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub page_count: usize,
    pub mistakes_found: bool,
    /// Margin estimation failed; overflow and image-width checks were skipped
    pub border_not_found: bool,
    pub margin: Option<Margin>,
    pub regular_font: Option<FontSignature>,
    pub findings: Vec<Finding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<DocumentStatistics>,
}

impl CheckReport {
    pub fn new(page_count: usize) -> Self {
        Self {
            page_count,
            mistakes_found: false,
            border_not_found: false,
            margin: None,
            regular_font: None,
            findings: Vec::new(),
            statistics: None,
        }
    }

    /// Findings of one kind, in page order.
    pub fn findings_of(&self, kind: CheckKind) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.kind == kind)
    }

    /// Number of flagged rectangles of one kind.
    pub fn count(&self, kind: CheckKind) -> usize {
        self.findings_of(kind).map(|f| f.rects.len()).sum()
    }
}
