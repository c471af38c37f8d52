//! Event collection helpers

use modpack_dl::Event;
use std::time::Duration;
use tokio::sync::broadcast;

/// Receive events until `Finished` arrives (inclusive), failing after `timeout`
pub async fn collect_until_finished(
    events: &mut broadcast::Receiver<Event>,
    timeout: Duration,
) -> Vec<Event> {
    tokio::time::timeout(timeout, async {
        let mut seen = Vec::new();
        loop {
            match events.recv().await {
                Ok(event) => {
                    let done = matches!(event, Event::Finished { .. });
                    seen.push(event);
                    if done {
                        return seen;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    panic!("event receiver lagged by {n} events")
                }
                Err(broadcast::error::RecvError::Closed) => return seen,
            }
        }
    })
    .await
    .expect("timed out waiting for Finished")
}
