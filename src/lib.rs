//! `pitchreel` - Narrated sales demo videos
//!
//! # Features
//!
//! - **Script**: supplied text, PDF page text, or generated from a sales brief (Gemini)
//! - **Narration**: speech-safe sanitization + Google Translate TTS to MP3
//! - **Slideshow**: ordered images → H.264/AAC MP4 (or lossless FFV1) via ffmpeg
//! - **Proposal**: A4 PDF via pdfium (feature `pdf`) plus a `mailto:` link
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use pitchreel::{
//!     AppConfig, AssemblerConfig, DemoPipeline, DemoRequest, Ffprobe, GoogleTranslateTts,
//!     ScriptInputs, SlideshowAssembler,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load()?;
//!     let speech = GoogleTranslateTts::new(&config.speech)?;
//!     let probe = Ffprobe::default();
//!     let assembler = SlideshowAssembler::new(AssemblerConfig::default());
//!     let pipeline = DemoPipeline::new(&speech, &probe, assembler, config.scratch_dir());
//!
//!     let script = ScriptInputs {
//!         manual: Some("Meet Acme, the fastest way to ship demos.".into()),
//!         ..Default::default()
//!     };
//!     let request = DemoRequest::new(script, vec![PathBuf::from("slide1.png")]);
//!     let artifacts = pipeline.run(request).await?;
//!     artifacts.video.persist(std::path::Path::new("demo.mp4"))?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod generate;
pub mod mailto;
pub mod media;
pub mod narration;
pub mod pipeline;
pub mod scratch;
pub mod slideshow;

pub use config::AppConfig;
pub use document::{
    script_from_pages, PageLayout, PageTextExtractor, Proposal, ProposalPdf, ProposalWriter,
};
#[cfg(feature = "pdf")]
pub use document::{PdfiumExtractor, PdfiumProposalWriter};
pub use error::{PitchError, Result};
pub use generate::{GeminiClient, GeminiConfig, PromptBuilder, SalesBrief, TextGenerator};
pub use mailto::MailDraft;
pub use media::{Ffprobe, MediaInfo, MediaProbe};
pub use narration::{
    normalize_for_pdf, sanitize_for_speech, AudioAsset, GoogleTranslateTts, LanguageCode,
    NarrationSynthesizer, SpeechBackend,
};
pub use pipeline::{
    DemoArtifacts, DemoOutputs, DemoPipeline, DemoRequest, SavedDemo, ScriptInputs, ScriptSource,
};
pub use scratch::ScratchFile;
pub use slideshow::{
    AssemblerConfig, ImageAsset, Resolution, SlideshowAssembler, VideoAsset, VideoEncoding,
};

/// Version of pitchreel
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
