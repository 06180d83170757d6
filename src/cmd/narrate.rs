use std::path::Path;

use anyhow::{bail, Result};

use pitchreel::{AppConfig, Ffprobe, GoogleTranslateTts, NarrationSynthesizer};

use crate::TextArgs;

pub async fn cmd_narrate(
    config: &AppConfig,
    source: &TextArgs,
    lang: Option<&str>,
    output: &Path,
) -> Result<()> {
    let Some(script) = super::read_text(source).await? else {
        bail!("provide the script with --text or --script-file");
    };
    let language = super::language(config, lang)?;

    eprintln!("🗣️  Narrating {} words ({language})", script.split_whitespace().count());

    let speech = GoogleTranslateTts::new(&config.speech)?;
    let probe = Ffprobe::new(config.tools.ffprobe());
    let synthesizer = NarrationSynthesizer::new(&speech, &probe, config.scratch_dir());

    let audio = synthesizer.synthesize(&script, &language).await?;
    let duration = audio.duration;
    let bytes = audio.byte_len;
    let path = audio.persist(output)?;

    eprintln!("✅ {} ({:.1}s, {} KB)", path.display(), duration.as_secs_f64(), bytes / 1024);
    Ok(())
}
