// src/mailer.rs

use crate::config::MailConfig;
use reqwest::blocking::Client;
use serde::Serialize;
use std::error::Error;
use std::fmt;
use tracing::{info, warn};

const BREVO_ENDPOINT: &str = "https://api.brevo.com/v3/smtp/email";

#[derive(Debug)]
pub enum MailerError {
    RequestFailed(String),
    ApiError(String),
}

impl fmt::Display for MailerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MailerError::RequestFailed(msg) => write!(f, "Request failed: {}", msg),
            MailerError::ApiError(msg) => write!(f, "API error: {}", msg),
        }
    }
}

impl Error for MailerError {}

#[derive(Serialize)]
struct BrevoSender<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
struct BrevoRecipient<'a> {
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoPayload<'a> {
    sender: BrevoSender<'a>,
    to: Vec<BrevoRecipient<'a>>,
    subject: &'a str,
    html_content: String,
}

pub struct BrevoMailer {
    api_key: String,
    sender_email: String,
    sender_name: String,
    client: Client,
}

impl BrevoMailer {
    pub fn new(api_key: String, sender_email: String, sender_name: String) -> Self {
        Self {
            api_key,
            sender_email,
            sender_name,
            client: Client::new(),
        }
    }

    fn send(&self, to: &str, subject: &str, html_content: String) -> Result<(), MailerError> {
        let payload = BrevoPayload {
            sender: BrevoSender {
                name: &self.sender_name,
                email: &self.sender_email,
            },
            to: vec![BrevoRecipient { email: to }],
            subject,
            html_content,
        };

        let resp = self
            .client
            .post(BREVO_ENDPOINT)
            .header("api-key", &self.api_key)
            .json(&payload)
            .send()
            .map_err(|e| MailerError::RequestFailed(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_else(|_| "(no body)".to_string());
            return Err(MailerError::ApiError(format!("{status}: {body}")));
        }
        Ok(())
    }
}

/// Outgoing mail. Without an API key the mail is only logged, which is what
/// local runs and tests use.
pub enum Mailer {
    Brevo(BrevoMailer),
    LogOnly,
}

impl Mailer {
    pub fn from_config(cfg: &MailConfig) -> Self {
        match &cfg.api_key {
            Some(key) => Mailer::Brevo(BrevoMailer::new(
                key.clone(),
                cfg.sender_email.clone(),
                cfg.sender_name.clone(),
            )),
            None => {
                warn!("BREVO_API_KEY not set; sign-in links will be logged instead of emailed");
                Mailer::LogOnly
            }
        }
    }

    pub fn send_sign_in_link(&self, to: &str, link: &str) -> Result<(), MailerError> {
        match self {
            Mailer::Brevo(brevo) => brevo.send(to, "Sign in to Laundry Finder", sign_in_html(link)),
            Mailer::LogOnly => {
                info!(to, link, "sign-in link");
                Ok(())
            }
        }
    }

    pub fn send_subscription_receipt(
        &self,
        to: &str,
        listing_name: &str,
        tier_label: &str,
        amount_cents: i64,
    ) -> Result<(), MailerError> {
        match self {
            Mailer::Brevo(brevo) => brevo.send(
                to,
                "Your Laundry Finder listing upgrade",
                receipt_html(listing_name, tier_label, amount_cents),
            ),
            Mailer::LogOnly => {
                info!(
                    to,
                    listing = listing_name,
                    tier = tier_label,
                    amount_cents,
                    "subscription receipt"
                );
                Ok(())
            }
        }
    }
}

fn sign_in_html(link: &str) -> String {
    format!(
        r#"
        <h1>Sign in to Laundry Finder</h1>
        <p>Use the link below to manage your laundromat listings. It expires in 15 minutes.</p>
        <p><a href="{link}">Sign in</a></p>
        <p>If you did not request this link, you can ignore this email.</p>
    "#
    )
}

fn receipt_html(listing_name: &str, tier_label: &str, amount_cents: i64) -> String {
    format!(
        r#"
        <h1>{listing_name} is now on the {tier_label} plan</h1>
        <p>Amount: ${}.{:02} for 30 days.</p>
    "#,
        amount_cents / 100,
        amount_cents % 100
    )
}
