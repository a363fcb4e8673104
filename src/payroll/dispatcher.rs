use std::sync::Arc;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::{Value, json};

use super::store::{DocumentHandle, DocumentStore};
use crate::error::DispatchError;
use crate::model::employee::Employee;

/// Provider status meaning the message was queued for delivery.
pub const ACCEPTED: u16 = 202;

pub const ATTACHMENT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub attachment: Option<Attachment>,
}

/// Hands a message to an email provider and reports the provider's status.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// `Err` only when no status came back (connection, TLS, timeout...).
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<u16>;
}

/// SendGrid v3 `mail/send`.
pub struct SendGridTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl SendGridTransport {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

pub fn sendgrid_payload(message: &EmailMessage) -> Value {
    let mut payload = json!({
        "personalizations": [{ "to": [{ "email": message.to }] }],
        "from": { "email": message.from },
        "subject": message.subject,
        "content": [{ "type": "text/html", "value": message.html_body }],
    });

    if let Some(attachment) = &message.attachment {
        payload["attachments"] = json!([{
            "content": STANDARD.encode(&attachment.content),
            "filename": attachment.filename,
            "type": attachment.content_type,
            "disposition": "attachment",
        }]);
    }

    payload
}

#[async_trait]
impl EmailTransport for SendGridTransport {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<u16> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&sendgrid_payload(message))
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != ACCEPTED {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status, body = %body, "SendGrid rejected message");
        }
        Ok(status)
    }
}

pub fn subject_for(employee: &Employee) -> String {
    format!("Desprendible de pago para {}", employee.full_name())
}

fn greeting_for(employee: &Employee) -> String {
    format!(
        "Hola {},\n\nAdjunto encontrarás tu desprendible de pago.",
        employee.full_name()
    )
}

/// Emails stored payslips to employees. No retries.
pub struct Notifier {
    transport: Arc<dyn EmailTransport>,
    store: Arc<dyn DocumentStore>,
    sender: String,
}

impl Notifier {
    pub fn new(
        transport: Arc<dyn EmailTransport>,
        store: Arc<dyn DocumentStore>,
        sender: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            store,
            sender: sender.into(),
        }
    }

    pub async fn notify(
        &self,
        employee: &Employee,
        handle: &DocumentHandle,
    ) -> Result<(), DispatchError> {
        let failure = |status: Option<u16>, cause: String| DispatchError {
            recipient: employee.email.clone(),
            status,
            cause,
        };

        let content = self
            .store
            .read(handle)
            .await
            .map_err(|e| failure(None, e.to_string()))?;

        let message = EmailMessage {
            from: self.sender.clone(),
            to: employee.email.clone(),
            subject: subject_for(employee),
            html_body: greeting_for(employee),
            attachment: Some(Attachment {
                filename: handle.file_name().to_string(),
                content_type: ATTACHMENT_CONTENT_TYPE.to_string(),
                content,
            }),
        };

        match self.transport.send(&message).await {
            Ok(ACCEPTED) => {
                tracing::info!(recipient = %employee.email, "Payslip email sent");
                Ok(())
            }
            Ok(status) => Err(failure(
                Some(status),
                "provider did not accept the message".to_string(),
            )),
            Err(e) => Err(failure(None, e.to_string())),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::ScriptedTransport;
    use super::*;
    use crate::model::employee::fixtures::employee;
    use crate::payroll::store::FsDocumentStore;

    async fn stored(store: &FsDocumentStore) -> DocumentHandle {
        store
            .write("desprendible_Ana_Ruiz_1.txt", b"Total a Pagar: 2050")
            .await
            .unwrap()
    }

    #[actix_web::test]
    async fn sends_attachment_with_templated_subject() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FsDocumentStore::new(dir.path()));
        let handle = stored(&store).await;
        let transport = Arc::new(ScriptedTransport::default());
        let notifier = Notifier::new(transport.clone(), store, "nomina@empresa.co");

        notifier
            .notify(&employee(1, "Ana", "Ruiz"), &handle)
            .await
            .unwrap();

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        let message = &sent[0];
        assert_eq!(message.subject, "Desprendible de pago para Ana Ruiz");
        assert_eq!(message.from, "nomina@empresa.co");
        assert_eq!(message.to, "ana.ruiz@empresa.co");
        assert!(message.html_body.starts_with("Hola Ana Ruiz,"));
        let attachment = message.attachment.as_ref().unwrap();
        assert_eq!(attachment.filename, "desprendible_Ana_Ruiz_1.txt");
        assert_eq!(attachment.content_type, "application/octet-stream");
        assert_eq!(attachment.content, b"Total a Pagar: 2050");
    }

    #[actix_web::test]
    async fn non_accepted_status_is_a_dispatch_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FsDocumentStore::new(dir.path()));
        let handle = stored(&store).await;
        let transport = Arc::new(ScriptedTransport::with_script(vec![Ok(401)]));
        let notifier = Notifier::new(transport, store, "nomina@empresa.co");

        let err = notifier
            .notify(&employee(1, "Ana", "Ruiz"), &handle)
            .await
            .unwrap_err();
        assert_eq!(err.status, Some(401));
        assert_eq!(err.recipient, "ana.ruiz@empresa.co");
    }

    #[actix_web::test]
    async fn transport_failure_has_no_status() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FsDocumentStore::new(dir.path()));
        let handle = stored(&store).await;
        let transport = Arc::new(ScriptedTransport::with_script(vec![Err(anyhow::anyhow!(
            "connection reset"
        ))]));
        let notifier = Notifier::new(transport, store, "nomina@empresa.co");

        let err = notifier
            .notify(&employee(1, "Ana", "Ruiz"), &handle)
            .await
            .unwrap_err();
        assert_eq!(err.status, None);
        assert!(err.cause.contains("connection reset"));
    }

    #[test]
    fn sendgrid_payload_base64_encodes_attachment() {
        let message = EmailMessage {
            from: "nomina@empresa.co".to_string(),
            to: "ana@empresa.co".to_string(),
            subject: "Desprendible de pago para Ana Ruiz".to_string(),
            html_body: "Hola".to_string(),
            attachment: Some(Attachment {
                filename: "d.txt".to_string(),
                content_type: ATTACHMENT_CONTENT_TYPE.to_string(),
                content: b"hola".to_vec(),
            }),
        };

        let payload = sendgrid_payload(&message);
        assert_eq!(payload["personalizations"][0]["to"][0]["email"], "ana@empresa.co");
        assert_eq!(payload["from"]["email"], "nomina@empresa.co");
        assert_eq!(payload["attachments"][0]["content"], "aG9sYQ==");
        assert_eq!(payload["attachments"][0]["type"], "application/octet-stream");
        assert_eq!(payload["attachments"][0]["disposition"], "attachment");
    }

    #[test]
    fn sendgrid_payload_without_attachment_omits_key() {
        let message = EmailMessage {
            from: "a@b.co".to_string(),
            to: "c@d.co".to_string(),
            subject: "s".to_string(),
            html_body: "b".to_string(),
            attachment: None,
        };
        assert!(sendgrid_payload(&message).get("attachments").is_none());
    }
}
