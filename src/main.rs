//! `pitchreel` CLI - narrated sales demo videos from the command line

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pitchreel")]
#[command(about = "Turn a sales brief, a script or a PDF plus a few images into a narrated demo video")]
#[command(version)]
struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ~/.config/pitchreel/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a narration script (or proposal text) from a brief and print it
    Script {
        #[command(flatten)]
        brief: BriefArgs,

        /// Generate proposal text instead of a narration script
        #[arg(long)]
        proposal: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Speak a script to an MP3 file
    Narrate {
        #[command(flatten)]
        source: TextArgs,

        /// Language code (e.g. en, fr, pt-BR)
        #[arg(short, long)]
        lang: Option<String>,

        /// Output MP3
        #[arg(short, long, default_value = "narration.mp3")]
        output: PathBuf,
    },

    /// Assemble images (and optional audio) into a video
    Slideshow {
        /// Images in display order
        images: Vec<PathBuf>,

        /// Audio track to attach (not trimmed or looped)
        #[arg(short, long)]
        audio: Option<PathBuf>,

        #[command(flatten)]
        video: VideoArgs,

        /// Output video (default: slideshow.mp4 / slideshow.mkv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Full pipeline: script -> narration -> slideshow (-> proposal + mailto)
    Demo {
        /// Images in display order
        images: Vec<PathBuf>,

        #[command(flatten)]
        source: TextArgs,

        /// PDF whose page text becomes the script
        #[arg(long)]
        pdf: Option<PathBuf>,

        #[command(flatten)]
        brief: BriefArgs,

        #[command(flatten)]
        video: VideoArgs,

        /// Language code (e.g. en, fr, pt-BR)
        #[arg(short, long)]
        lang: Option<String>,

        /// Output video (default: demo.mp4 / demo.mkv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also keep the narration MP3 here
        #[arg(long, value_name = "PATH")]
        audio_out: Option<PathBuf>,

        /// Write a proposal PDF here
        #[arg(long, value_name = "PATH")]
        proposal: Option<PathBuf>,

        /// Print a mailto: link to this address referencing the proposal
        #[arg(long, value_name = "ADDRESS", requires = "proposal")]
        email: Option<String>,

        /// Print the script that was narrated
        #[arg(long)]
        show_script: bool,
    },

    /// Write a proposal PDF from a brief or from supplied text
    Proposal {
        #[command(flatten)]
        source: TextArgs,

        #[command(flatten)]
        brief: BriefArgs,

        /// Output PDF
        #[arg(short, long, default_value = "proposal.pdf")]
        output: PathBuf,

        /// Print a mailto: link to this address referencing the PDF
        #[arg(long, value_name = "ADDRESS")]
        email: Option<String>,
    },

    /// Show the config file path and effective settings
    Config,
}

/// Structured product brief for generation
#[derive(Args, Debug, Default, Clone)]
struct BriefArgs {
    /// Product name
    #[arg(long)]
    product: Option<String>,

    /// Product description
    #[arg(short, long)]
    description: Option<String>,

    /// Target audience
    #[arg(long)]
    audience: Option<String>,

    /// Key feature (repeatable)
    #[arg(long = "feature", value_name = "TEXT")]
    features: Vec<String>,

    /// Customer testimonial (repeatable)
    #[arg(long = "testimonial", value_name = "TEXT")]
    testimonials: Vec<String>,

    /// Call to action
    #[arg(long)]
    cta: Option<String>,

    /// Word budget for generated text
    #[arg(long)]
    max_words: Option<usize>,
}

/// Script text supplied directly
#[derive(Args, Debug, Default, Clone)]
struct TextArgs {
    /// Script text
    #[arg(short, long, conflicts_with = "script_file")]
    text: Option<String>,

    /// Read the script from a file
    #[arg(long, value_name = "PATH")]
    script_file: Option<PathBuf>,
}

/// Video settings overriding the config file
#[derive(Args, Debug, Default, Clone)]
struct VideoArgs {
    /// Seconds each image is shown
    #[arg(short, long)]
    seconds: Option<f64>,

    /// Frame size: WxH, hd (1280x720) or nhd (640x360)
    #[arg(short, long)]
    resolution: Option<String>,

    /// Frames per second
    #[arg(long)]
    fps: Option<u32>,

    /// h264-aac (MP4) or lossless (FFV1 Matroska, no audio)
    #[arg(short, long)]
    encoding: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cmd::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Script {
            brief,
            proposal,
            output,
        } => {
            cmd::script::cmd_script(&config, &brief, proposal, output.as_deref()).await?;
        }
        Commands::Narrate {
            source,
            lang,
            output,
        } => {
            cmd::narrate::cmd_narrate(&config, &source, lang.as_deref(), &output).await?;
        }
        Commands::Slideshow {
            images,
            audio,
            video,
            output,
        } => {
            cmd::slideshow::cmd_slideshow(&config, &images, audio.as_deref(), &video, output)
                .await?;
        }
        Commands::Demo {
            images,
            source,
            pdf,
            brief,
            video,
            lang,
            output,
            audio_out,
            proposal,
            email,
            show_script,
        } => {
            let opts = cmd::demo::DemoOptions {
                images,
                pdf,
                lang,
                output,
                audio_out,
                proposal,
                email,
                show_script,
            };
            cmd::demo::cmd_demo(&config, &source, &brief, &video, opts).await?;
        }
        Commands::Proposal {
            source,
            brief,
            output,
            email,
        } => {
            cmd::proposal::cmd_proposal(&config, &source, &brief, &output, email.as_deref())
                .await?;
        }
        Commands::Config => {
            cmd::config::cmd_config(&config, cli.config.as_deref())?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "pitchreel=debug,info" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
