//! `send_email` task and its delivery seam.

use super::SEND_EMAIL;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use task_worker::{Task, TaskContext, TaskError};
use tracing::{error, info};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmailMessage {
    pub recipient: String,
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

/// Trait for email delivery backends
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> eyre::Result<()>;

    /// Get transport name
    fn name(&self) -> &'static str;
}

/// Pretends to deliver after a fixed delay.
pub struct SimulatedTransport {
    delay: Duration,
}

impl SimulatedTransport {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl EmailTransport for SimulatedTransport {
    async fn send(&self, _message: &EmailMessage) -> eyre::Result<()> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}

/// Sends one email. Not retried: a delivery failure ends the task.
pub struct SendEmailTask {
    transport: Arc<dyn EmailTransport>,
}

impl SendEmailTask {
    pub fn new(transport: Arc<dyn EmailTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl Task for SendEmailTask {
    fn name(&self) -> &'static str {
        SEND_EMAIL
    }

    async fn run(&self, ctx: &TaskContext, payload: Value) -> Result<Value, TaskError> {
        let message: EmailMessage = serde_json::from_value(payload)?;
        info!(
            task_id = %ctx.task_id(),
            recipient = %message.recipient,
            transport = self.transport.name(),
            "Sending email"
        );

        self.transport.send(&message).await.map_err(|e| {
            error!(task_id = %ctx.task_id(), recipient = %message.recipient, error = %e, "Email delivery failed");
            TaskError::transient(e.to_string())
        })?;

        info!(task_id = %ctx.task_id(), recipient = %message.recipient, "Email sent");

        Ok(json!({
            "status": "sent",
            "recipient": message.recipient,
            "subject": message.subject,
        }))
    }
}
