use std::path::Path;

use anyhow::{bail, Result};

use pitchreel::{AppConfig, TextGenerator};

use crate::BriefArgs;

pub async fn cmd_script(
    config: &AppConfig,
    args: &BriefArgs,
    proposal: bool,
    output: Option<&Path>,
) -> Result<()> {
    let brief = super::brief_from_args(args);
    if brief.is_blank() {
        bail!("describe the product with --description, --product, --feature ...");
    }

    let client = super::gemini_client(config)?;
    let prompts = super::prompt_builder(config, args);
    let prompt = if proposal {
        prompts.proposal(&brief)
    } else {
        prompts.demo_script(&brief)
    };

    let kind = if proposal { "proposal" } else { "script" };
    eprintln!("✍️  Generating {kind} with {}", client.model());
    let text = client.generate(&prompt).await?;

    match output {
        Some(path) => {
            tokio::fs::write(path, &text).await?;
            let words = text.split_whitespace().count();
            eprintln!("✅ Wrote {words} words to {}", path.display());
        }
        None => println!("{text}"),
    }

    Ok(())
}
