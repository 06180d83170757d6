//! pdfium-backed PDF extraction and writing
//!
//! Binds to a pdfium library next to the executable first, then to the
//! system library.

use std::path::Path;

use pdfium_render::prelude::*;
use tracing::debug;

use super::layout::{paginate, PageLayout};
use super::{PageTextExtractor, Proposal, ProposalWriter, RenderedPdf};
use crate::error::{PitchError, Result};

fn bind() -> Result<Pdfium> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| PitchError::Pdf(format!("pdfium library not found: {e}")))?;
    Ok(Pdfium::new(bindings))
}

fn pdf_err(context: &str) -> impl Fn(PdfiumError) -> PitchError + '_ {
    move |e| PitchError::Pdf(format!("{context}: {e}"))
}

/// Extracts per-page text with pdfium
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfiumExtractor;

impl PageTextExtractor for PdfiumExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>> {
        let pdfium = bind()?;
        let document = pdfium
            .load_pdf_from_file(path, None)
            .map_err(pdf_err("Failed to parse PDF"))?;

        let mut pages = Vec::new();
        for (idx, page) in document.pages().iter().enumerate() {
            let text = page
                .text()
                .map_err(pdf_err("Failed to extract text from page"))?
                .all();
            debug!("Page {}: {} chars", idx + 1, text.len());
            pages.push(text);
        }

        Ok(pages)
    }
}

/// Writes proposals as A4 Helvetica documents
#[derive(Debug, Default, Clone)]
pub struct PdfiumProposalWriter {
    layout: PageLayout,
}

impl PdfiumProposalWriter {
    #[must_use]
    pub fn new(layout: PageLayout) -> Self {
        Self { layout }
    }
}

impl ProposalWriter for PdfiumProposalWriter {
    fn render(&self, proposal: &Proposal) -> Result<RenderedPdf> {
        let pdfium = bind()?;
        let layout = &self.layout;
        let mut document = pdfium
            .create_new_pdf()
            .map_err(pdf_err("Failed to create PDF"))?;
        let font = document.fonts_mut().helvetica();

        let pages = paginate(&proposal.body, layout);
        let page_count = pages.len();
        let date_line = proposal.date_line();
        let size = PdfPagePaperSize::Custom(
            PdfPoints::new(layout.page_width),
            PdfPoints::new(layout.page_height),
        );

        for (page_no, lines) in pages.iter().enumerate() {
            let mut page = document
                .pages_mut()
                .create_page_at_end(size)
                .map_err(pdf_err("Failed to add page"))?;
            let objects = page.objects_mut();
            let left = PdfPoints::new(layout.margin);

            objects
                .create_text_object(
                    left,
                    PdfPoints::new(layout.title_baseline()),
                    &proposal.title,
                    font,
                    PdfPoints::new(layout.title_size),
                )
                .map_err(pdf_err("Failed to draw title"))?;

            let subtitle = if page_count > 1 {
                format!("{date_line}  |  Page {} of {page_count}", page_no + 1)
            } else {
                date_line.clone()
            };
            objects
                .create_text_object(
                    left,
                    PdfPoints::new(layout.title_baseline() - layout.line_height),
                    &subtitle,
                    font,
                    PdfPoints::new(layout.body_size - 2.0),
                )
                .map_err(pdf_err("Failed to draw date"))?;

            for (i, line) in lines.iter().enumerate().filter(|(_, l)| !l.is_empty()) {
                objects
                    .create_text_object(
                        left,
                        PdfPoints::new(layout.body_baseline(i)),
                        line,
                        font,
                        PdfPoints::new(layout.body_size),
                    )
                    .map_err(pdf_err("Failed to draw text"))?;
            }
        }

        let bytes = document
            .save_to_bytes()
            .map_err(pdf_err("Failed to serialize PDF"))?;

        Ok(RenderedPdf { bytes, page_count })
    }
}
