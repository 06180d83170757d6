use std::path::Path;

use anyhow::Result;

use pitchreel::AppConfig;

use crate::{BriefArgs, TextArgs};

#[cfg(feature = "pdf")]
pub async fn cmd_proposal(
    config: &AppConfig,
    source: &TextArgs,
    brief_args: &BriefArgs,
    output: &Path,
    email: Option<&str>,
) -> Result<()> {
    use anyhow::bail;
    use pitchreel::document::write_proposal;
    use pitchreel::pipeline::proposal_title;
    use pitchreel::{MailDraft, PdfiumProposalWriter, Proposal, TextGenerator};

    let brief = super::brief_from_args(brief_args);
    if let Some(to) = email {
        MailDraft::new(to, "", "")?;
    }

    let body = match super::read_text(source).await? {
        Some(text) if !text.trim().is_empty() => text,
        _ => {
            if brief.is_blank() {
                bail!("provide --text/--script-file or describe the product with --description");
            }
            let client = super::gemini_client(config)?;
            eprintln!("✍️  Generating proposal with {}", client.model());
            let prompt = super::prompt_builder(config, brief_args).proposal(&brief);
            client.generate(&prompt).await?
        }
    };

    let title = proposal_title(&brief);

    let writer = PdfiumProposalWriter::default();
    let pdf = write_proposal(&writer, &Proposal::new(&title, &body), &config.scratch_dir()).await?;
    let pages = pdf.page_count;
    let path = pdf.persist(output)?;

    eprintln!("✅ {} ({pages} pages)", path.display());

    if let Some(to) = email {
        let draft = MailDraft::for_proposal(to, &brief.product_name, &path)?;
        println!("{}", draft.to_url());
    }

    Ok(())
}

#[cfg(not(feature = "pdf"))]
pub async fn cmd_proposal(
    _config: &AppConfig,
    _source: &TextArgs,
    _brief_args: &BriefArgs,
    _output: &Path,
    _email: Option<&str>,
) -> Result<()> {
    anyhow::bail!("proposal writing requires building pitchreel with `--features pdf`")
}
