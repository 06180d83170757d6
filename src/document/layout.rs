//! Plain-text page layout for proposal documents
//!
//! Word-wraps paragraphs to a fixed character width and groups the lines
//! into pages. Geometry defaults to A4 portrait with 11pt Helvetica.

use crate::narration::chunk_text;

/// Page geometry in PDF points (1pt = 1/72 inch)
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub title_size: f32,
    pub body_size: f32,
    pub line_height: f32,
    /// Wrap width in characters
    pub max_chars: usize,
    /// Body lines per page, below the running header
    pub lines_per_page: usize,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::a4()
    }
}

impl PageLayout {
    #[must_use]
    pub fn a4() -> Self {
        Self {
            page_width: 595.0,
            page_height: 842.0,
            margin: 56.0,
            title_size: 16.0,
            body_size: 11.0,
            line_height: 15.0,
            max_chars: 88,
            lines_per_page: 44,
        }
    }

    /// Baseline of the running title
    #[must_use]
    pub fn title_baseline(&self) -> f32 {
        self.page_height - self.margin - self.title_size
    }

    /// Baseline of body line `index` on a page
    #[must_use]
    pub fn body_baseline(&self, index: usize) -> f32 {
        self.title_baseline() - 2.5 * self.line_height - index as f32 * self.line_height
    }
}

/// Wrap `text` and split it into pages.
///
/// Paragraphs (separated by blank lines) are kept apart by one blank line.
/// Pages never start with a blank line. Always returns at least one page.
#[must_use]
pub fn paginate(text: &str, layout: &PageLayout) -> Vec<Vec<String>> {
    let lines_per_page = layout.lines_per_page.max(1);
    let mut lines: Vec<String> = Vec::new();

    for paragraph in paragraphs(text) {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.extend(chunk_text(&paragraph, layout.max_chars));
    }

    let mut pages: Vec<Vec<String>> = Vec::new();
    let mut page: Vec<String> = Vec::new();
    for line in lines {
        if page.len() == lines_per_page {
            pages.push(std::mem::take(&mut page));
        }
        if page.is_empty() && line.is_empty() {
            continue;
        }
        page.push(line);
    }
    if !page.is_empty() || pages.is_empty() {
        pages.push(page);
    }

    pages
}

fn paragraphs(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line.trim());
        }
    }
    if !current.is_empty() {
        out.push(current.join(" "));
    }

    out
}
