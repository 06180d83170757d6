//! Full demo pipeline: script -> narration -> slideshow -> proposal
//!
//! Stages run strictly in sequence. Each stage's output lives in a scratch
//! file owned by its asset, so a failure anywhere releases everything the
//! earlier stages produced.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::document::{self, PageTextExtractor, Proposal, ProposalPdf, ProposalWriter};
use crate::error::{PitchError, Result};
use crate::generate::{PromptBuilder, SalesBrief, TextGenerator};
use crate::mailto::MailDraft;
use crate::media::MediaProbe;
use crate::narration::{AudioAsset, LanguageCode, NarrationSynthesizer, SpeechBackend};
use crate::slideshow::{SlideshowAssembler, Timeline, VideoAsset};

/// Audio and video lengths further apart than this are reported
const DIVERGENCE_WARN: Duration = Duration::from_millis(500);

/// Where the narration script comes from, in order of precedence
#[derive(Debug, Clone, Default)]
pub struct ScriptInputs {
    /// Supplied text; wins when not blank
    pub manual: Option<String>,
    /// PDF whose page texts become the script
    pub pdf: Option<PathBuf>,
    /// Brief used to generate a script
    pub brief: SalesBrief,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptSource {
    Manual,
    Pdf,
    Generated,
}

/// One end-to-end request
#[derive(Debug, Clone)]
pub struct DemoRequest {
    pub script: ScriptInputs,
    pub images: Vec<PathBuf>,
    pub slide_seconds: f64,
    pub language: LanguageCode,
    /// Also write a proposal PDF
    pub proposal: bool,
    /// Build a mailto link to this address (needs `proposal`)
    pub email: Option<String>,
}

impl DemoRequest {
    #[must_use]
    pub fn new(script: ScriptInputs, images: Vec<PathBuf>) -> Self {
        Self {
            script,
            images,
            slide_seconds: 3.0,
            language: LanguageCode::default(),
            proposal: false,
            email: None,
        }
    }
}

/// Everything a successful request produced
#[derive(Debug)]
pub struct DemoArtifacts {
    pub request_id: Uuid,
    pub script: String,
    pub script_source: ScriptSource,
    pub audio: AudioAsset,
    pub video: VideoAsset,
    pub proposal: Option<ProposalPdf>,
    product: String,
    email: Option<String>,
}

/// Final locations chosen by the caller
#[derive(Debug, Clone, Default)]
pub struct DemoOutputs {
    pub video: PathBuf,
    /// Keep the narration MP3 here; dropped otherwise
    pub audio: Option<PathBuf>,
    /// Proposal destination; required when a proposal was written
    pub proposal: Option<PathBuf>,
}

/// Paths of persisted artifacts
#[derive(Debug, Clone)]
pub struct SavedDemo {
    pub video: PathBuf,
    pub audio: Option<PathBuf>,
    pub proposal: Option<PathBuf>,
    pub mailto: Option<String>,
}

impl DemoArtifacts {
    /// Hand every artifact to the caller. The mailto link references the
    /// persisted proposal path.
    ///
    /// Destinations are checked before anything moves. If a later move fails,
    /// files already persisted are removed again and the remaining scratch
    /// files are released.
    pub fn persist(self, outputs: &DemoOutputs) -> Result<SavedDemo> {
        let proposal_dest = match (&self.proposal, &outputs.proposal) {
            (Some(_), Some(dest)) => Some(dest.as_path()),
            (Some(_), None) => {
                return Err(PitchError::InvalidSettings(
                    "a proposal was written but no destination was given".to_string(),
                ))
            }
            (None, _) => None,
        };

        let mailto = match (&self.email, proposal_dest) {
            (Some(to), Some(dest)) => {
                Some(MailDraft::for_proposal(to, &self.product, dest)?.to_url())
            }
            _ => None,
        };

        let video = self.video.persist(&outputs.video)?;

        let audio = match &outputs.audio {
            Some(dest) => Some(self.audio.persist(dest).inspect_err(|_| discard(&[&video]))?),
            None => None,
        };

        let proposal = match (self.proposal, proposal_dest) {
            (Some(pdf), Some(dest)) => Some(pdf.persist(dest).inspect_err(|_| {
                discard(&[&video]);
                if let Some(audio) = &audio {
                    discard(&[audio]);
                }
            })?),
            _ => None,
        };

        Ok(SavedDemo {
            video,
            audio,
            proposal,
            mailto,
        })
    }
}

/// Remove files persisted before a failing hand-off.
fn discard(paths: &[&PathBuf]) {
    for path in paths {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("Could not remove {}: {}", path.display(), e);
        }
    }
}

/// Runs one request end-to-end with borrowed collaborators
pub struct DemoPipeline<'a> {
    speech: &'a dyn SpeechBackend,
    probe: &'a dyn MediaProbe,
    generator: Option<&'a dyn TextGenerator>,
    extractor: Option<&'a dyn PageTextExtractor>,
    writer: Option<&'a dyn ProposalWriter>,
    assembler: SlideshowAssembler,
    prompts: PromptBuilder,
    scratch_dir: PathBuf,
}

impl<'a> DemoPipeline<'a> {
    pub fn new(
        speech: &'a dyn SpeechBackend,
        probe: &'a dyn MediaProbe,
        assembler: SlideshowAssembler,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            speech,
            probe,
            generator: None,
            extractor: None,
            writer: None,
            assembler,
            prompts: PromptBuilder::default(),
            scratch_dir: scratch_dir.into(),
        }
    }

    #[must_use]
    pub fn with_generator(mut self, generator: &'a dyn TextGenerator) -> Self {
        self.generator = Some(generator);
        self
    }

    #[must_use]
    pub fn with_extractor(mut self, extractor: &'a dyn PageTextExtractor) -> Self {
        self.extractor = Some(extractor);
        self
    }

    #[must_use]
    pub fn with_writer(mut self, writer: &'a dyn ProposalWriter) -> Self {
        self.writer = Some(writer);
        self
    }

    #[must_use]
    pub fn with_prompts(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    pub async fn run(&self, request: DemoRequest) -> Result<DemoArtifacts> {
        let request_id = Uuid::new_v4();
        self.execute(request_id, request).await
    }

    #[instrument(skip_all, fields(request_id = %request_id))]
    async fn execute(&self, request_id: Uuid, request: DemoRequest) -> Result<DemoArtifacts> {
        let start = Instant::now();
        self.validate(&request)?;

        info!("Resolving script...");
        let (script, script_source) = self.resolve_script(&request.script).await?;
        info!("Script from {:?} ({} words)", script_source, script.split_whitespace().count());

        info!("Synthesizing narration...");
        let synthesizer = NarrationSynthesizer::new(self.speech, self.probe, &self.scratch_dir);
        let audio = synthesizer.synthesize(&script, &request.language).await?;

        info!("Assembling {} slides...", request.images.len());
        let video = self
            .assembler
            .assemble(&request.images, request.slide_seconds, Some(audio.path()))
            .await?;

        report_divergence(audio.duration, video.nominal_duration);

        let proposal = if request.proposal {
            info!("Writing proposal...");
            let body = self.proposal_body(&request.script.brief, &script).await?;
            Some(self.write_proposal(&request.script.brief, &body).await?)
        } else {
            None
        };

        info!("Pipeline completed in {:.2}s", start.elapsed().as_secs_f64());

        Ok(DemoArtifacts {
            request_id,
            script,
            script_source,
            audio,
            video,
            proposal,
            product: request.script.brief.product_name.clone(),
            email: request.email,
        })
    }

    /// Reject the request before any external call or file is made.
    fn validate(&self, request: &DemoRequest) -> Result<()> {
        if request.images.is_empty() {
            return Err(PitchError::NoImagesProvided);
        }
        Timeline::uniform(
            request.images.len(),
            request.slide_seconds,
            self.assembler.config().fps,
        )?;

        if request.proposal && self.writer.is_none() {
            return Err(PitchError::InvalidSettings(
                "proposal writing needs the `pdf` feature".to_string(),
            ));
        }
        if let Some(email) = &request.email {
            if !request.proposal {
                return Err(PitchError::InvalidSettings(
                    "an email link needs a proposal to reference".to_string(),
                ));
            }
            MailDraft::new(email, "", "")?;
        }
        if request.script.pdf.is_some() && self.extractor.is_none() && !has_manual(&request.script) {
            return Err(PitchError::InvalidSettings(
                "PDF extraction needs the `pdf` feature".to_string(),
            ));
        }

        Ok(())
    }

    /// Manual text, else PDF page text, else a script generated from the brief.
    pub async fn resolve_script(&self, inputs: &ScriptInputs) -> Result<(String, ScriptSource)> {
        if let Some(text) = inputs.manual.as_deref().filter(|t| !t.trim().is_empty()) {
            return Ok((text.trim().to_string(), ScriptSource::Manual));
        }

        if let Some(pdf) = &inputs.pdf {
            let extractor = self.extractor.ok_or_else(|| {
                PitchError::InvalidSettings("PDF extraction needs the `pdf` feature".to_string())
            })?;
            let text = document::extract_script(extractor, pdf)?;
            if !text.trim().is_empty() {
                return Ok((text, ScriptSource::Pdf));
            }
            warn!("{} has no extractable text, falling back to the brief", pdf.display());
        }

        if inputs.brief.is_blank() {
            return Err(PitchError::GenerationFailure(
                "no script source: supply text, a PDF or a product brief".to_string(),
            ));
        }

        let generator = self.generator.ok_or_else(|| {
            PitchError::GenerationFailure(format!(
                "no text generator configured (set {})",
                crate::config::API_KEY_ENV
            ))
        })?;
        let text = generator.generate(&self.prompts.demo_script(&inputs.brief)).await?;
        Ok((text, ScriptSource::Generated))
    }

    async fn proposal_body(&self, brief: &SalesBrief, script: &str) -> Result<String> {
        match self.generator {
            Some(generator) if !brief.is_blank() => {
                generator.generate(&self.prompts.proposal(brief)).await
            }
            _ => Ok(script.to_string()),
        }
    }

    async fn write_proposal(&self, brief: &SalesBrief, body: &str) -> Result<ProposalPdf> {
        let writer = self.writer.ok_or_else(|| {
            PitchError::InvalidSettings("proposal writing needs the `pdf` feature".to_string())
        })?;
        let title = proposal_title(brief);
        document::write_proposal(writer, &Proposal::new(&title, body), &self.scratch_dir).await
    }
}

fn has_manual(inputs: &ScriptInputs) -> bool {
    inputs.manual.as_deref().is_some_and(|t| !t.trim().is_empty())
}

/// Proposal heading: "<product> - Sales Proposal", or just "Sales Proposal".
#[must_use]
pub fn proposal_title(brief: &SalesBrief) -> String {
    let name = brief.product_name.trim();
    if name.is_empty() {
        "Sales Proposal".to_string()
    } else {
        format!("{name} - Sales Proposal")
    }
}

fn report_divergence(audio: Duration, video: Duration) {
    let gap = audio.abs_diff(video);
    if gap > DIVERGENCE_WARN {
        warn!(
            "Narration is {:.1}s but slides run {:.1}s; the tracks are not trimmed or looped",
            audio.as_secs_f64(),
            video.as_secs_f64()
        );
    }
}
