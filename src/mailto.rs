//! Pre-filled `mailto:` links
//!
//! Nothing is sent or attached: the link opens the user's mail client with
//! the proposal's local path mentioned in the body.

use std::path::Path;

use crate::error::{PitchError, Result};

/// Draft email to a prospect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailDraft {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl MailDraft {
    pub fn new(to: &str, subject: &str, body: &str) -> Result<Self> {
        let to = to.trim();
        let valid = !to.contains(char::is_whitespace)
            && to
                .split_once('@')
                .is_some_and(|(user, host)| !user.is_empty() && host.contains('.'));
        if !valid {
            return Err(PitchError::InvalidSettings(format!(
                "'{to}' is not an email address"
            )));
        }

        Ok(Self {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        })
    }

    /// Draft for sending a proposal found at `attachment`.
    pub fn for_proposal(to: &str, product: &str, attachment: &Path) -> Result<Self> {
        let product = if product.trim().is_empty() { "our product" } else { product.trim() };
        let subject = format!("Proposal: {product}");
        let body = format!(
            "Hello,\n\nPlease find our proposal for {product} attached.\n\
             (Attach the file saved at: {})\n\nBest regards",
            attachment.display()
        );
        Self::new(to, &subject, &body)
    }

    /// Render as a `mailto:` URL with a percent-encoded query.
    #[must_use]
    pub fn to_url(&self) -> String {
        format!(
            "mailto:{}?subject={}&body={}",
            urlencoding::encode(&self.to).replace("%40", "@"),
            urlencoding::encode(&self.subject),
            urlencoding::encode(&self.body.replace('\n', "\r\n"))
        )
    }
}
