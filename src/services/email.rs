use log::error;
use serde_json::json;

use crate::config::AppConfig;

pub const RECOVER_PASSWORD_SUBJECT: &str = "Password recovery link";
pub const CONFIRM_REGISTRATION_SUBJECT: &str = "Registration confirmation";

pub fn password_recovery_request_body(config: &AppConfig, identifier: &str) -> String {
    format!(
        "Hi,<br><br>We've received a request to reset your password. \
         If you didn't make the request, just ignore this email. <br><br> \
         Otherwise, you can reset your password using this link: <br> \
         {}/{}/ <br><br>Thanks,<br>Block Producers Directory",
        config.recovery_link_base.trim_end_matches('/'),
        identifier
    )
}

pub fn password_recovery_body(new_password: &str) -> String {
    format!(
        "Hi,<br><br>Recently you have requested password recovery. \
         Your new password: <strong>{}</strong>. <br><br>Thanks,<br>Block Producers Directory",
        new_password
    )
}

pub fn email_confirm_body(config: &AppConfig, identifier: &str) -> String {
    format!(
        "Hi,<br><br>To confirm your registration, follow this link: <br> \
         {}/{}/ <br><br>Thanks,<br>Block Producers Directory",
        config.confirm_link_base.trim_end_matches('/'),
        identifier
    )
}

// Fire-and-forget; the domain mutation is already committed, a delivery
// failure must not surface to the request.
pub fn send_async(config: &AppConfig, email_to: String, subject: String, message: String) {
    let config = config.clone();
    actix_web::rt::spawn(async move {
        if let Err(err) = send(&config, &email_to, &subject, &message).await {
            error!("email send failed: {}", err);
        }
    });
}

async fn send(
    config: &AppConfig,
    email_to: &str,
    subject: &str,
    message: &str,
) -> Result<(), reqwest::Error> {
    if config.sendgrid_api_key.is_empty() {
        return Ok(());
    }

    let payload = json!({
        "personalizations": [{"to": [{"email": email_to}]}],
        "from": {"email": config.project_email_address},
        "subject": subject,
        "content": [{"type": "text/html", "value": message}],
    });

    let client = reqwest::Client::new();
    client
        .post("https://api.sendgrid.com/v3/mail/send")
        .bearer_auth(&config.sendgrid_api_key)
        .json(&payload)
        .send()
        .await?;
    Ok(())
}
