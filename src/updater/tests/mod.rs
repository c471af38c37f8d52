use super::test_helpers::*;
use super::*;
use crate::error::{Error, FailureKind};
use crate::types::{PipelineOutcome, Stage, UpdateRequest};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::broadcast;


fn request_for(target: &TempDir) -> UpdateRequest {
    UpdateRequest::new(SOURCE, VERSION, target.path())
}

/// Collect everything already sent on the channel
fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Wait until an event matching `pred` arrives
async fn wait_for(rx: &mut broadcast::Receiver<Event>, pred: impl Fn(&Event) -> bool) -> Event {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let event = rx.recv().await.unwrap();
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

fn log_of(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}
