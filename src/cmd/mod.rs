pub mod config;
pub mod demo;
pub mod narrate;
pub mod proposal;
pub mod script;
pub mod slideshow;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use pitchreel::{
    AppConfig, AssemblerConfig, GeminiClient, GeminiConfig, LanguageCode, PromptBuilder,
    Resolution, SalesBrief, VideoEncoding,
};

use crate::{BriefArgs, TextArgs, VideoArgs};

pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(p) => {
            if !p.exists() {
                bail!("config file not found: {}", p.display());
            }
            AppConfig::load_from(p).with_context(|| format!("loading {}", p.display()))
        }
        None => AppConfig::load().context("loading default config"),
    }
}

pub fn brief_from_args(args: &BriefArgs) -> SalesBrief {
    SalesBrief {
        product_name: args.product.clone().unwrap_or_default(),
        description: args.description.clone().unwrap_or_default(),
        audience: args.audience.clone().unwrap_or_default(),
        features: args.features.clone(),
        testimonials: args.testimonials.clone(),
        call_to_action: args.cta.clone().unwrap_or_default(),
    }
}

pub fn prompt_builder(config: &AppConfig, args: &BriefArgs) -> PromptBuilder {
    PromptBuilder::new(args.max_words.unwrap_or(config.generation.max_words))
}

pub fn gemini_client(config: &AppConfig) -> Result<GeminiClient> {
    let gemini = GeminiConfig::from_settings(&config.generation, config.api_key())?;
    Ok(GeminiClient::new(gemini)?)
}

/// Script text from `--text` or `--script-file`, if either was given.
pub async fn read_text(args: &TextArgs) -> Result<Option<String>> {
    if let Some(text) = &args.text {
        return Ok(Some(text.clone()));
    }
    if let Some(path) = &args.script_file {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading script {}", path.display()))?;
        return Ok(Some(text));
    }
    Ok(None)
}

pub fn language(config: &AppConfig, lang: Option<&str>) -> Result<LanguageCode> {
    Ok(lang.unwrap_or(&config.speech.language).parse::<LanguageCode>()?)
}

/// Assembler settings plus slide duration, config file overridden by flags.
pub fn assembler_config(config: &AppConfig, args: &VideoArgs) -> Result<(AssemblerConfig, f64)> {
    let resolution = match &args.resolution {
        Some(r) => r.parse::<Resolution>().map_err(anyhow::Error::msg)?,
        None => config.video.resolution(),
    };
    let encoding = match &args.encoding {
        Some(e) => e.parse::<VideoEncoding>().map_err(anyhow::Error::msg)?,
        None => config.video.encoding,
    };

    let assembler = AssemblerConfig {
        ffmpeg_path: config.tools.ffmpeg(),
        ..AssemblerConfig::default()
    }
    .with_resolution(resolution)
    .with_fps(args.fps.unwrap_or(config.video.fps))
    .with_encoding(encoding)
    .with_scratch_dir(config.scratch_dir());

    Ok((assembler, args.seconds.unwrap_or(config.video.slide_seconds)))
}

/// `{stem}.mp4` or `{stem}.mkv` depending on the encoding
pub fn default_output(stem: &str, encoding: VideoEncoding) -> PathBuf {
    PathBuf::from(format!("{stem}.{}", encoding.extension()))
}
