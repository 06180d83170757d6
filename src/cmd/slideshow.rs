use std::path::{Path, PathBuf};

use anyhow::Result;

use pitchreel::{AppConfig, SlideshowAssembler};

use crate::VideoArgs;

pub async fn cmd_slideshow(
    config: &AppConfig,
    images: &[PathBuf],
    audio: Option<&Path>,
    video: &VideoArgs,
    output: Option<PathBuf>,
) -> Result<()> {
    let (assembler_config, seconds) = super::assembler_config(config, video)?;
    let output =
        output.unwrap_or_else(|| super::default_output("slideshow", assembler_config.encoding));

    eprintln!("🎞️  Slideshow: {} images x {seconds}s", images.len());
    eprintln!(
        "   {} @ {} fps, {}",
        assembler_config.resolution, assembler_config.fps, assembler_config.encoding
    );
    if let Some(a) = audio {
        eprintln!("   Audio: {}", a.display());
    }

    let assembler = SlideshowAssembler::new(assembler_config);
    let start = std::time::Instant::now();
    let asset = assembler.assemble(images, seconds, audio).await?;

    let frames = asset.frame_count;
    let duration = asset.nominal_duration;
    let has_audio = asset.has_audio;
    let path = asset.persist(&output)?;

    eprintln!("\n✅ Encoded in {:.1}s", start.elapsed().as_secs_f64());
    eprintln!("   Output: {}", path.display());
    eprintln!(
        "   {frames} frames, {:.1}s, audio: {}",
        duration.as_secs_f64(),
        if has_audio { "yes" } else { "no" }
    );

    Ok(())
}
