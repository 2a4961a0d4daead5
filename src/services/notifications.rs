//! Notification dispatcher
//!
//! Invoked from inquiry submission and lifecycle transitions. Dispatch is
//! fire-and-forget: the spawned delivery task writes in-app notification
//! rows and optionally posts an out-of-band webhook notice; any failure is
//! logged with enough context to diagnose and never reaches the caller or
//! rolls back the transition. No automatic retries.

use anyhow::{Context, Result};
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use crate::config::Settings;
use crate::domain::notifications::NotificationEvent;

#[derive(Clone)]
pub struct Notifier {
    db: PgPool,
    http: reqwest::Client,
    webhook_url: Option<String>,
}

impl Notifier {
    pub fn new(db: PgPool, settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.notify_timeout_seconds))
            .build()
            .context("Failed to build notification HTTP client")?;

        Ok(Self {
            db,
            http,
            webhook_url: settings.notify_webhook_url.clone(),
        })
    }

    /// Fire a notification for a lifecycle event. Returns immediately; the
    /// delivery runs on its own task.
    pub fn dispatch(&self, event: NotificationEvent, inquiry_id: Uuid, owner_id: Uuid) {
        let notifier = self.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.deliver(event, inquiry_id, owner_id).await {
                tracing::error!(
                    event = %event,
                    inquiry_id = %inquiry_id,
                    owner_id = %owner_id,
                    error = ?e,
                    "Notification delivery failed"
                );
            }
        });
    }

    async fn deliver(
        &self,
        event: NotificationEvent,
        inquiry_id: Uuid,
        owner_id: Uuid,
    ) -> Result<()> {
        let recipients = self.recipients_for(event, owner_id).await?;
        let (title, message) = content_for(event);

        for recipient in &recipients {
            let id = Uuid::new_v4();
            sqlx::query(
                r#"
                INSERT INTO notifications (id, user_id, event, title, message, data)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(id)
            .bind(recipient)
            .bind(event.to_string())
            .bind(title)
            .bind(message)
            .bind(serde_json::json!({ "inquiry_id": inquiry_id }))
            .execute(&self.db)
            .await
            .with_context(|| format!("failed to store notification for {recipient}"))?;
        }

        if let Some(url) = &self.webhook_url {
            self.http
                .post(url)
                .json(&serde_json::json!({
                    "event": event.to_string(),
                    "inquiry_id": inquiry_id,
                    "recipients": recipients,
                    "title": title,
                    "message": message,
                }))
                .send()
                .await
                .context("webhook request failed")?
                .error_for_status()
                .context("webhook returned an error status")?;
        }

        tracing::info!(
            event = %event,
            inquiry_id = %inquiry_id,
            recipients = recipients.len(),
            "Notification dispatched"
        );

        Ok(())
    }

    /// Submission and cancellation go to the contractor side (admins);
    /// acceptance and completion go to the owning client.
    async fn recipients_for(
        &self,
        event: NotificationEvent,
        owner_id: Uuid,
    ) -> Result<Vec<Uuid>> {
        match event {
            NotificationEvent::InquirySubmitted | NotificationEvent::InquiryCancelled => {
                let admins: Vec<(Uuid,)> =
                    sqlx::query_as("SELECT id FROM users WHERE role = 'admin'")
                        .fetch_all(&self.db)
                        .await
                        .context("failed to look up contractor accounts")?;
                Ok(admins.into_iter().map(|(id,)| id).collect())
            }
            NotificationEvent::InquiryAccepted | NotificationEvent::InquiryCompleted => {
                Ok(vec![owner_id])
            }
        }
    }
}

fn content_for(event: NotificationEvent) -> (&'static str, &'static str) {
    match event {
        NotificationEvent::InquirySubmitted => (
            "New inquiry received",
            "A client submitted a new house-design inquiry.",
        ),
        NotificationEvent::InquiryAccepted => (
            "Your inquiry was accepted",
            "The contractor accepted your inquiry. You can now exchange messages.",
        ),
        NotificationEvent::InquiryCompleted => (
            "Your inquiry is complete",
            "The contractor marked your inquiry as completed.",
        ),
        NotificationEvent::InquiryCancelled => (
            "Inquiry cancelled",
            "A client cancelled their pending inquiry.",
        ),
    }
}
