use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;

use crate::sinks::{SinkResult, SinkSet};
use crate::submission::record::Envelope;

/// Deliver one envelope to every sink concurrently and wait for all of them to settle.
///
/// Never fails: panics and (optional) deadline overruns are reported as failed
/// results. Results follow sink registration order.
pub async fn dispatch(
    envelope: Arc<Envelope>,
    sinks: &SinkSet,
    deadline: Option<Duration>,
) -> Vec<SinkResult> {
    let tasks: Vec<_> = sinks
        .iter()
        .map(|sink| {
            let sink = Arc::clone(sink);
            let envelope = Arc::clone(&envelope);
            tokio::spawn(async move {
                match deadline {
                    Some(limit) => tokio::time::timeout(limit, sink.send(&envelope))
                        .await
                        .unwrap_or_else(|_| {
                            SinkResult::failure(
                                sink.name(),
                                format!("timed out after {}ms dispatch deadline", limit.as_millis()),
                            )
                        }),
                    None => sink.send(&envelope).await,
                }
            })
        })
        .collect();

    join_all(tasks)
        .await
        .into_iter()
        .zip(sinks.iter())
        .map(|(joined, sink)| {
            joined.unwrap_or_else(|e| {
                tracing::error!(sink = sink.name(), "Sink task failed: {e}");
                SinkResult::failure(sink.name(), "sink task panicked")
            })
        })
        .collect()
}
