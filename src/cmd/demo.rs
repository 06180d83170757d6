use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

use pitchreel::{
    AppConfig, DemoOutputs, DemoPipeline, DemoRequest, Ffprobe, GoogleTranslateTts,
    ScriptInputs, SlideshowAssembler,
};

use crate::{BriefArgs, TextArgs, VideoArgs};

/// Per-run options that don't belong to a shared flag group
pub struct DemoOptions {
    pub images: Vec<PathBuf>,
    pub pdf: Option<PathBuf>,
    pub lang: Option<String>,
    pub output: Option<PathBuf>,
    pub audio_out: Option<PathBuf>,
    pub proposal: Option<PathBuf>,
    pub email: Option<String>,
    pub show_script: bool,
}

pub async fn cmd_demo(
    config: &AppConfig,
    source: &TextArgs,
    brief_args: &BriefArgs,
    video: &VideoArgs,
    opts: DemoOptions,
) -> Result<()> {
    let (assembler_config, seconds) = super::assembler_config(config, video)?;
    let output = opts
        .output
        .clone()
        .unwrap_or_else(|| super::default_output("demo", assembler_config.encoding));
    let language = super::language(config, opts.lang.as_deref())?;

    let script = ScriptInputs {
        manual: super::read_text(source).await?,
        pdf: opts.pdf.clone(),
        brief: super::brief_from_args(brief_args),
    };

    eprintln!("🎬 Demo: {} images x {seconds}s", opts.images.len());
    eprintln!("   Output: {}", output.display());
    eprintln!(
        "   {} @ {} fps, {}, narration: {language}",
        assembler_config.resolution, assembler_config.fps, assembler_config.encoding
    );

    let speech = GoogleTranslateTts::new(&config.speech)?;
    let probe = Ffprobe::new(config.tools.ffprobe());
    let generator = match super::gemini_client(config) {
        Ok(client) => Some(client),
        Err(e) => {
            debug!("Text generation unavailable: {e}");
            None
        }
    };
    #[cfg(feature = "pdf")]
    let (extractor, writer) = (
        pitchreel::PdfiumExtractor,
        pitchreel::PdfiumProposalWriter::default(),
    );

    let mut pipeline = DemoPipeline::new(
        &speech,
        &probe,
        SlideshowAssembler::new(assembler_config),
        config.scratch_dir(),
    )
    .with_prompts(super::prompt_builder(config, brief_args));
    if let Some(client) = &generator {
        pipeline = pipeline.with_generator(client);
    }
    #[cfg(feature = "pdf")]
    {
        pipeline = pipeline.with_extractor(&extractor).with_writer(&writer);
    }

    let mut request = DemoRequest::new(script, opts.images);
    request.slide_seconds = seconds;
    request.language = language;
    request.proposal = opts.proposal.is_some();
    request.email = opts.email;

    let start = std::time::Instant::now();
    let artifacts = pipeline.run(request).await?;

    if opts.show_script {
        println!("{}", artifacts.script);
    }

    let source = artifacts.script_source;
    let narration = artifacts.audio.duration;
    let frames = artifacts.video.frame_count;
    let request_id = artifacts.request_id;

    let saved = artifacts.persist(&DemoOutputs {
        video: output,
        audio: opts.audio_out,
        proposal: opts.proposal,
    })?;

    eprintln!("\n✅ Demo complete in {:.1}s ({request_id})", start.elapsed().as_secs_f64());
    eprintln!("   Script: {source:?}");
    eprintln!("   Narration: {:.1}s", narration.as_secs_f64());
    eprintln!("   Video: {} ({frames} frames)", saved.video.display());
    if let Some(audio) = &saved.audio {
        eprintln!("   Audio: {}", audio.display());
    }
    if let Some(pdf) = &saved.proposal {
        eprintln!("   Proposal: {}", pdf.display());
    }
    if let Some(link) = &saved.mailto {
        println!("{link}");
    }

    Ok(())
}
