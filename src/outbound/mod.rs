// Bounded background delivery of external pushes (telemetry updates, alert
// messages). One dispatcher task pulls jobs off a bounded queue and runs each
// push in its own task, capped by a semaphore so sustained failures or a slow
// endpoint cannot pile up unbounded work. Submitting never blocks the caller:
// a full queue drops the job with a warning.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, warn};

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// One fire-and-forget external push. Failures are logged and never retried.
#[derive(Debug)]
pub enum OutboundJob {
    Get {
        url: String,
        label: &'static str,
    },
    PostJson {
        url: String,
        body: serde_json::Value,
        label: &'static str,
    },
}

impl OutboundJob {
    fn label(&self) -> &'static str {
        match self {
            OutboundJob::Get { label, .. } => label,
            OutboundJob::PostJson { label, .. } => label,
        }
    }
}

/// Handle to the delivery queue; cheap to clone.
#[derive(Clone)]
pub struct OutboundQueue {
    tx: mpsc::Sender<OutboundJob>,
}

impl OutboundQueue {
    /// Spawn the dispatcher with at most `max_in_flight` concurrent pushes
    /// and a queue of `queue_capacity` pending jobs.
    pub fn start(max_in_flight: usize, queue_capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<OutboundJob>(queue_capacity.max(1));
        let semaphore = Arc::new(Semaphore::new(max_in_flight.max(1)));

        tokio::spawn(async move {
            let client = reqwest::Client::new();

            while let Some(job) = rx.recv().await {
                let permit = match semaphore.clone().acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => break,
                };
                let client = client.clone();

                tokio::spawn(async move {
                    execute(&client, job).await;
                    drop(permit);
                });
            }
        });

        Self { tx }
    }

    /// Enqueue a job without blocking. A full or closed queue drops the job.
    pub fn submit(&self, job: OutboundJob) {
        if let Err(err) = self.tx.try_send(job) {
            let job = err.into_inner();
            warn!(label = job.label(), "Outbound queue full, dropping delivery");
        }
    }
}

async fn execute(client: &reqwest::Client, job: OutboundJob) {
    let label = job.label();

    let result = match job {
        OutboundJob::Get { url, .. } => client.get(&url).timeout(DELIVERY_TIMEOUT).send().await,
        OutboundJob::PostJson { url, body, .. } => {
            client
                .post(&url)
                .timeout(DELIVERY_TIMEOUT)
                .json(&body)
                .send()
                .await
        }
    };

    match result {
        Ok(response) if response.status().is_success() => {
            debug!(label = label, "Outbound delivery succeeded");
        }
        Ok(response) => {
            warn!(
                label = label,
                status = %response.status(),
                "Outbound delivery rejected"
            );
        }
        Err(e) => {
            warn!(label = label, error = %e, "Outbound delivery failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_labels() {
        let get = OutboundJob::Get {
            url: "http://example.invalid/".to_string(),
            label: "telemetry",
        };
        let post = OutboundJob::PostJson {
            url: "http://example.invalid/".to_string(),
            body: serde_json::json!({}),
            label: "alert",
        };
        assert_eq!(get.label(), "telemetry");
        assert_eq!(post.label(), "alert");
    }

    #[tokio::test]
    async fn test_submit_on_saturated_queue_does_not_block() {
        // Tiny queue, deliveries go to a closed port and fail fast; excess
        // submissions must drop instead of blocking the caller.
        let queue = OutboundQueue::start(1, 1);
        for _ in 0..100 {
            queue.submit(OutboundJob::Get {
                url: "http://127.0.0.1:9/".to_string(),
                label: "telemetry",
            });
        }
    }
}
