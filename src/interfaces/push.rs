use crate::application::pipeline::TransactionPipeline;
use crate::domain::envelope::PushEnvelope;
use crate::infrastructure::local_bus::BusMessage;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Feeds messages from an intake topic into the pipeline, wrapping each one in
/// the same envelope a push subscription would POST to `/process`.
///
/// Every message gets its own run. Returns once the topic closes and all
/// in-flight runs have finished.
pub async fn run_push_subscription(
    mut messages: mpsc::Receiver<BusMessage>,
    pipeline: Arc<TransactionPipeline>,
) {
    let mut runs = JoinSet::new();
    loop {
        tokio::select! {
            message = messages.recv() => {
                let Some(message) = message else { break };
                let pipeline = pipeline.clone();
                runs.spawn(async move { deliver(&pipeline, message).await });
            }
            Some(finished) = runs.join_next(), if !runs.is_empty() => {
                if let Err(e) = finished {
                    tracing::error!(error = %e, "pipeline run did not complete");
                }
            }
        }
    }

    while runs.join_next().await.is_some() {}
}

async fn deliver(pipeline: &TransactionPipeline, message: BusMessage) {
    let envelope = PushEnvelope::wrap(message.id.as_str(), &message.data);
    let body = match serde_json::to_vec(&envelope) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(message_id = %message.id, error = %e, "failed to encode push envelope");
            return;
        }
    };

    if let Err(e) = pipeline.process(&body).await {
        if e.is_client_error() {
            tracing::warn!(message_id = %message.id, error = %e, "dropping undecodable message");
        } else {
            tracing::error!(message_id = %message.id, error = %e, "message processing failed");
        }
    }
}
