//! PDF documents: script extraction and proposal writing
//!
//! The traits here are always available so the pipeline can be exercised
//! without pdfium. The pdfium-backed implementations live behind the `pdf`
//! feature.

pub mod layout;
#[cfg(feature = "pdf")]
pub mod pdfium;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::error::Result;
use crate::narration::normalize_for_pdf;
use crate::scratch::ScratchFile;

pub use layout::{paginate, PageLayout};
#[cfg(feature = "pdf")]
pub use pdfium::{PdfiumExtractor, PdfiumProposalWriter};

/// Reads the text of each page of a PDF, in page order.
pub trait PageTextExtractor: Send + Sync {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>>;
}

/// Renders a [`Proposal`] to PDF bytes.
pub trait ProposalWriter: Send + Sync {
    fn render(&self, proposal: &Proposal) -> Result<RenderedPdf>;
}

/// Text content of a proposal document
#[derive(Debug, Clone)]
pub struct Proposal {
    pub title: String,
    pub body: String,
    pub date: NaiveDate,
}

impl Proposal {
    /// Proposal dated today, with text made safe for the standard fonts.
    #[must_use]
    pub fn new(title: &str, body: &str) -> Self {
        Self {
            title: normalize_for_pdf(title.trim()),
            body: normalize_for_pdf(body),
            date: chrono::Local::now().date_naive(),
        }
    }

    /// Date line printed under the title
    #[must_use]
    pub fn date_line(&self) -> String {
        self.date.format("%B %-d, %Y").to_string()
    }
}

/// Output of a [`ProposalWriter`]
#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// A proposal PDF held in a scratch file
#[derive(Debug)]
pub struct ProposalPdf {
    file: ScratchFile,
    pub page_count: usize,
}

impl ProposalPdf {
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub async fn bytes(&self) -> Result<Vec<u8>> {
        self.file.read().await
    }

    pub fn persist(self, dest: &Path) -> Result<PathBuf> {
        self.file.persist(dest)
    }
}

/// Render `proposal` and write it to a scratch file in `scratch_dir`.
pub async fn write_proposal(
    writer: &dyn ProposalWriter,
    proposal: &Proposal,
    scratch_dir: &Path,
) -> Result<ProposalPdf> {
    let rendered = writer.render(proposal)?;
    let file = ScratchFile::create(scratch_dir, ".pdf")?;
    file.write_all(&rendered.bytes).await?;

    info!(
        "Wrote {}-page proposal ({} bytes)",
        rendered.page_count,
        rendered.bytes.len()
    );

    Ok(ProposalPdf {
        file,
        page_count: rendered.page_count,
    })
}

/// Join extracted page texts, in page order, into one script.
///
/// Pages are concatenated as-is; blank pages contribute nothing.
#[must_use]
pub fn script_from_pages(pages: &[String]) -> String {
    pages.iter().map(String::as_str).collect()
}

/// Extract a script from the PDF at `path`.
pub fn extract_script(extractor: &dyn PageTextExtractor, path: &Path) -> Result<String> {
    let pages = extractor.extract_pages(path)?;
    info!("Extracted {} pages from {}", pages.len(), path.display());
    Ok(script_from_pages(&pages))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPages(Vec<String>);

    impl PageTextExtractor for FixedPages {
        fn extract_pages(&self, _path: &Path) -> Result<Vec<String>> {
            Ok(self.0.clone())
        }
    }

    struct StubWriter;

    impl ProposalWriter for StubWriter {
        fn render(&self, proposal: &Proposal) -> Result<RenderedPdf> {
            let pages = paginate(&proposal.body, &PageLayout::a4());
            Ok(RenderedPdf {
                bytes: format!("%PDF-1.7 {}", proposal.title).into_bytes(),
                page_count: pages.len(),
            })
        }
    }

    #[test]
    fn two_pages_concatenate_in_order() {
        let extractor = FixedPages(vec!["Intro to Acme. ".to_string(), "Pricing.".to_string()]);
        let script = extract_script(&extractor, Path::new("deck.pdf")).unwrap();
        assert_eq!(script, "Intro to Acme. Pricing.");
    }

    #[test]
    fn proposal_text_is_normalized() {
        let proposal = Proposal::new("  Acme \u{2014} Proposal ", "It\u{2019}s ready\u{2026}");
        assert_eq!(proposal.title, "Acme - Proposal");
        assert_eq!(proposal.body, "It's ready...");
    }

    #[test]
    fn date_line_format() {
        let proposal = Proposal {
            title: String::new(),
            body: String::new(),
            date: NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
        };
        assert_eq!(proposal.date_line(), "March 7, 2024");
    }

    #[tokio::test]
    async fn proposal_lands_in_scratch_file() {
        let dir = tempfile::tempdir().unwrap();
        let proposal = Proposal::new("Acme", "Body text");
        let pdf = write_proposal(&StubWriter, &proposal, dir.path()).await.unwrap();

        assert_eq!(pdf.page_count, 1);
        assert!(pdf.path().to_string_lossy().ends_with(".pdf"));
        assert!(pdf.bytes().await.unwrap().starts_with(b"%PDF"));
    }
}
