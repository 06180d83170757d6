//! Structured prompt rendering
//!
//! Prompts are built from an explicit [`SalesBrief`] rather than by string
//! accumulation. Blank fields are skipped entirely so the model never sees
//! empty headings.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// What the seller told us about the product
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalesBrief {
    pub product_name: String,
    pub description: String,
    pub audience: String,
    pub features: Vec<String>,
    pub testimonials: Vec<String>,
    pub call_to_action: String,
}

impl SalesBrief {
    /// Brief with only a free-text description
    #[must_use]
    pub fn from_description(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    /// True when no field carries any text
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.product_name.trim().is_empty()
            && self.description.trim().is_empty()
            && self.audience.trim().is_empty()
            && self.call_to_action.trim().is_empty()
            && self.features.iter().all(|f| f.trim().is_empty())
            && self.testimonials.iter().all(|t| t.trim().is_empty())
    }
}

/// Renders prompts for the text generator
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    max_words: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self { max_words: 150 }
    }
}

impl PromptBuilder {
    #[must_use]
    pub fn new(max_words: usize) -> Self {
        Self { max_words }
    }

    /// Prompt for a spoken demo narration.
    #[must_use]
    pub fn demo_script(&self, brief: &SalesBrief) -> String {
        let mut prompt = String::from(
            "Write the voice-over script for a short product demo video.\n\n",
        );
        render_brief(&mut prompt, brief);
        let _ = write!(
            prompt,
            "\nKeep it under {} words. Write plain spoken sentences only: \
             no headings, bullet points, stage directions or markdown.",
            self.max_words
        );
        prompt
    }

    /// Prompt for a written sales proposal.
    #[must_use]
    pub fn proposal(&self, brief: &SalesBrief) -> String {
        let mut prompt = String::from(
            "Write a concise sales proposal for the product below, addressed to a prospective customer.\n\n",
        );
        render_brief(&mut prompt, brief);
        let _ = write!(
            prompt,
            "\nStructure it as short paragraphs covering the problem, the solution, \
             key benefits and next steps. Keep it under {} words. Use plain text \
             without markdown.",
            self.max_words * 3
        );
        prompt
    }
}

fn render_brief(out: &mut String, brief: &SalesBrief) {
    field(out, "Product", &brief.product_name);
    field(out, "Description", &brief.description);
    field(out, "Target audience", &brief.audience);
    list(out, "Key features", &brief.features);
    list(out, "Customer testimonials", &brief.testimonials);
    field(out, "Call to action", &brief.call_to_action);
}

fn field(out: &mut String, label: &str, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        let _ = writeln!(out, "{label}: {value}");
    }
}

fn list(out: &mut String, label: &str, items: &[String]) {
    let items: Vec<&str> = items.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).collect();
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "{label}:");
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brief() -> SalesBrief {
        SalesBrief {
            product_name: "Acme Insights".to_string(),
            description: "Innovative AI software solution for businesses.".to_string(),
            audience: String::new(),
            features: vec!["Real-time dashboards".to_string(), "  ".to_string()],
            testimonials: Vec::new(),
            call_to_action: "Book a call".to_string(),
        }
    }

    #[test]
    fn empty_fields_are_omitted() {
        let prompt = PromptBuilder::default().demo_script(&brief());
        assert!(prompt.contains("Product: Acme Insights"));
        assert!(prompt.contains("- Real-time dashboards"));
        assert!(prompt.contains("Call to action: Book a call"));
        assert!(!prompt.contains("Target audience"));
        assert!(!prompt.contains("Customer testimonials"));
        assert!(!prompt.contains("- \n"));
    }

    #[test]
    fn word_limit_is_hinted() {
        let prompt = PromptBuilder::new(90).demo_script(&brief());
        assert!(prompt.contains("under 90 words"));

        let proposal = PromptBuilder::new(90).proposal(&brief());
        assert!(proposal.contains("under 270 words"));
        assert!(proposal.contains("sales proposal"));
    }

    #[test]
    fn blank_brief() {
        assert!(SalesBrief::default().is_blank());
        assert!(!SalesBrief::from_description("x").is_blank());
        let mut b = SalesBrief::default();
        b.features.push(" ".to_string());
        assert!(b.is_blank());
    }
}
