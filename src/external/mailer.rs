use crate::config::EmailConfig;
use crate::error::{AppError, AppResult};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

/// Named notification templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailTemplate {
    DoctorApproved,
    DoctorRejected,
    WithdrawalCompleted,
}

impl EmailTemplate {
    pub fn name(self) -> &'static str {
        match self {
            EmailTemplate::DoctorApproved => "doctor_approved",
            EmailTemplate::DoctorRejected => "doctor_rejected",
            EmailTemplate::WithdrawalCompleted => "withdrawal_completed",
        }
    }

    /// Renders subject and HTML body. Missing fields render as empty strings.
    pub fn render(self, to: &str, data: &Value, config: &EmailConfig) -> RenderedEmail {
        let name = field(data, "name");
        let to_html = escape_html(to);
        let support = escape_html(&config.support_address);
        let app_url = escape_html(&config.app_url);
        let footer = format!(
            "<p>If you have any questions, contact us at {support}.</p>\
             <p>Best regards,<br>The {team} Team</p>\
             <hr><p style=\"font-size:12px;color:#888\">This email was sent to {to_html}</p>",
            team = escape_html(&config.from_name),
        );

        let (subject, body) = match self {
            EmailTemplate::DoctorApproved => (
                "Welcome aboard - your application has been approved".to_string(),
                format!(
                    "<h1>Congratulations, Dr. {name}!</h1>\
                     <p>Your application to join the platform has been approved.</p>\
                     <p>You can now sign in, complete your profile and start accepting \
                     appointments.</p>\
                     <p><a href=\"{app_url}\">Open the app</a></p>"
                ),
            ),
            EmailTemplate::DoctorRejected => (
                "Application update - additional information required".to_string(),
                format!(
                    "<h1>Application update required</h1>\
                     <p>Dear Dr. {name},</p>\
                     <p>After reviewing your application we need additional information \
                     before we can approve it. Please make sure your medical licence, \
                     qualifications and identification documents are complete and clearly \
                     legible, then resubmit from the app.</p>\
                     <p><a href=\"{app_url}\">Update your application</a></p>"
                ),
            ),
            EmailTemplate::WithdrawalCompleted => {
                let amount = field(data, "amount");
                let method = field(data, "payment_method");
                let reference = field(data, "reference");
                (
                    "Your withdrawal has been processed".to_string(),
                    format!(
                        "<h1>Withdrawal completed</h1>\
                         <p>Dear Dr. {name},</p>\
                         <p>Your withdrawal request #{reference} of <strong>MWK {amount}</strong> \
                         has been paid via {method}.</p>\
                         <p>The amount has been deducted from your wallet balance.</p>"
                    ),
                )
            }
        };

        RenderedEmail {
            subject,
            html: format!("<html><body>{body}{footer}</body></html>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

/// What happened to an email. Never an error for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// Logged for manual sending.
    Logged,
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: String,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

#[derive(Clone)]
pub struct Mailer {
    client: Client,
    config: EmailConfig,
}

impl Mailer {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub async fn send(&self, template: EmailTemplate, to: &str, data: &Value) -> SendOutcome {
        let email = template.render(to, data, &self.config);

        if self.config.api_url.is_empty() {
            self.log_for_manual_send(to, &email);
            return SendOutcome::Logged;
        }

        match self.deliver(to, &email).await {
            Ok(()) => {
                log::info!("Email {} sent to {}", template.name(), to);
                SendOutcome::Sent
            }
            Err(e) => {
                log::error!("Email {} to {} failed: {}", template.name(), to, e);
                self.log_for_manual_send(to, &email);
                SendOutcome::Logged
            }
        }
    }

    async fn deliver(&self, to: &str, email: &RenderedEmail) -> AppResult<()> {
        let request = SendEmailRequest {
            from: format!("{} <{}>", self.config.from_name, self.config.from_address),
            to,
            subject: &email.subject,
            html: &email.html,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(AppError::ExternalApiError(format!(
                "Email API returned {}: {}",
                status, error_text
            )))
        }
    }

    fn log_for_manual_send(&self, to: &str, email: &RenderedEmail) {
        log::warn!(
            "Email not delivered, send manually. to={} subject={:?} html={}",
            to,
            email.subject,
            email.html
        );
    }
}

fn field(data: &Value, key: &str) -> String {
    let raw = match data.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    escape_html(&raw)
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
