//! Anonymous telemetry from the CLI device to a running server.
//!
//! The workflow reports through the synchronous [`TelemetrySink`] seam, so
//! events are queued and sent afterwards with [`HttpTelemetry::flush`].
//! Delivery is at most once: send failures are logged and the events dropped.

use std::sync::Mutex;

use freeze_core::models::{FreezeEvent, NewFreezeIssue};
use freeze_core::workflow::TelemetrySink;

#[derive(Debug)]
enum Outgoing {
    Freeze(FreezeEvent),
    Issue(NewFreezeIssue),
}

pub struct HttpTelemetry {
    client: reqwest::Client,
    server: String,
    outbox: Mutex<Vec<Outgoing>>,
}

impl HttpTelemetry {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            server: server.into().trim_end_matches('/').to_string(),
            outbox: Mutex::new(Vec::new()),
        }
    }

    pub fn pending(&self) -> usize {
        self.outbox.lock().map(|outbox| outbox.len()).unwrap_or(0)
    }

    /// Sends everything queued so far. Returns how many were accepted.
    pub async fn flush(&self) -> usize {
        let queued = match self.outbox.lock() {
            Ok(mut outbox) => std::mem::take(&mut *outbox),
            Err(_) => return 0,
        };

        let mut delivered = 0;
        for item in queued {
            let request = match &item {
                Outgoing::Freeze(event) => self
                    .client
                    .post(format!("{}/api/freeze-events", self.server))
                    .json(event),
                Outgoing::Issue(issue) => self
                    .client
                    .post(format!("{}/api/freeze-issues", self.server))
                    .json(issue),
            };
            match request.send().await {
                Ok(response) if response.status().is_success() => delivered += 1,
                Ok(response) => {
                    tracing::debug!(status = %response.status(), ?item, "Telemetry rejected");
                }
                Err(e) => tracing::debug!(error = %e, ?item, "Telemetry not delivered"),
            }
        }
        delivered
    }

    fn enqueue(&self, item: Outgoing) {
        if let Ok(mut outbox) = self.outbox.lock() {
            outbox.push(item);
        }
    }
}

impl TelemetrySink for HttpTelemetry {
    fn freeze(&self, event: FreezeEvent) {
        self.enqueue(Outgoing::Freeze(event));
    }

    fn issue(&self, issue: NewFreezeIssue) {
        self.enqueue(Outgoing::Issue(issue));
    }
}

#[cfg(test)]
mod tests {
    use freeze_core::models::Bureau;

    use super::*;

    #[test]
    fn unreachable_server_drops_events() {
        let telemetry = HttpTelemetry::new("http://127.0.0.1:9/");
        telemetry.freeze(FreezeEvent {
            breach_code: None,
            bureau: Bureau::Equifax,
            session_id: "device".into(),
        });
        assert_eq!(telemetry.pending(), 1);

        assert_eq!(tokio_test::block_on(telemetry.flush()), 0);
        assert_eq!(telemetry.pending(), 0);
    }
}
