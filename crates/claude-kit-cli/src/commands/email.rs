use anyhow::{Context, Result};
use serde_json::json;

use super::{with_default_temperature, with_spinner};
use crate::output::{print_markdown, Theme};
use claude_kit::prompt_template::{builtin_prompt, render_prompt};
use claude_kit::providers::base::CompletionOptions;
use claude_kit::ClaudeClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EmailKind {
    /// Cold outreach to a new contact
    Outreach,
    /// Follow-up after an earlier conversation
    FollowUp,
    /// Reply to a customer support ticket
    Support,
}

impl EmailKind {
    fn template_name(&self) -> &'static str {
        match self {
            EmailKind::Outreach => "outreach",
            EmailKind::FollowUp => "follow_up",
            EmailKind::Support => "support",
        }
    }

    fn temperature(&self) -> f32 {
        match self {
            EmailKind::Support => 0.6,
            _ => 0.7,
        }
    }

    fn sample_details(&self) -> &'static str {
        match self {
            EmailKind::Outreach => {
                "Purpose: propose a partnership for AI integration\n\
                 Value: our AI platform has helped 50+ companies reduce costs by 30%"
            }
            EmailKind::FollowUp => {
                "- Met Sarah at TechConf 2024\n\
                 - Discussed their need for better data analytics\n\
                 - She seemed interested but wanted to think about it\n\
                 - It's been 5 days since the conversation\n\
                 - I want to share a relevant case study and schedule a demo"
            }
            EmailKind::Support => {
                "Customer: John Smith\n\
                 Issue: Product stopped working after recent update\n\
                 Tone: Frustrated (mentioned in ticket: \"This is unacceptable\")\n\
                 Resolution: Engineering team identified the bug, fix deployed, offering 1 month credit"
            }
        }
    }
}

pub struct EmailRequest {
    pub kind: EmailKind,
    pub recipient: Option<String>,
    pub sender: Option<String>,
    pub details: Option<String>,
    pub max_words: usize,
}

impl EmailRequest {
    fn render(&self) -> Result<String> {
        let details = self
            .details
            .as_deref()
            .unwrap_or_else(|| self.kind.sample_details());
        Ok(render_prompt(
            "email/request.md",
            &json!({
                "kind": self.kind.template_name(),
                "recipient": self.recipient.clone().unwrap_or_default(),
                "sender": self.sender.clone().unwrap_or_default(),
                "details": details,
                "max_words": self.max_words,
            }),
        )?)
    }
}

pub async fn execute(
    client: &ClaudeClient,
    options: &CompletionOptions,
    request: &EmailRequest,
) -> Result<()> {
    let system = builtin_prompt(&format!("email/{}.md", request.kind.template_name()))?;
    let options = with_default_temperature(options, request.kind.temperature()).with_system(system);

    let email = with_spinner("drafting", client.chat(&request.render()?, &options))
        .await
        .context("Email request failed")?;
    print_markdown(&email, Theme::Dark)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outreach_request() -> Result<()> {
        let request = EmailRequest {
            kind: EmailKind::Outreach,
            recipient: Some("Sarah Johnson at TechCorp".to_string()),
            sender: Some("Alex Chen at Acme Solutions".to_string()),
            details: None,
            max_words: 150,
        };
        let rendered = request.render()?;
        assert!(rendered.starts_with("Write a cold outreach email with these details:"));
        assert!(rendered.contains("Recipient: Sarah Johnson at TechCorp"));
        assert!(rendered.contains("Purpose: propose a partnership"));
        assert!(rendered.ends_with("Keep it under 150 words."));
        Ok(())
    }

    #[test]
    fn test_support_request_without_names() -> Result<()> {
        let request = EmailRequest {
            kind: EmailKind::Support,
            recipient: None,
            sender: None,
            details: Some("Order #123 arrived damaged".to_string()),
            max_words: 200,
        };
        let rendered = request.render()?;
        assert!(rendered.starts_with("Write a customer support response email:"));
        assert!(!rendered.contains("Recipient:"));
        assert!(rendered.contains("Order #123 arrived damaged"));
        Ok(())
    }
}
