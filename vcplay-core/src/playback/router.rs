use std::{collections::HashMap, sync::Arc};

use crossbeam::atomic::AtomicCell;
use log::{debug, info, warn};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{ChatId, EventReceiver, Notifier, StreamEvent};

use super::{AdvanceOutcome, PlaybackController};

/// Feeds backend lifecycle events into the [PlaybackController] and reports the outcome to the chat.
pub struct StreamEventRouter {
    controller: Arc<PlaybackController>,
    notifier: Arc<dyn Notifier>,
}

impl StreamEventRouter {
    pub fn new(controller: Arc<PlaybackController>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            controller,
            notifier,
        }
    }

    /// Handles a single event. Returns the notification that was sent, if any.
    ///
    /// Events for chats without a queue are ignored, since they routinely race with a stop.
    pub async fn handle(&self, event: StreamEvent) -> Option<String> {
        debug!("Received {:?}", event);

        match event {
            StreamEvent::Kicked { chat_id }
            | StreamEvent::CallClosed { chat_id }
            | StreamEvent::Left { chat_id } => {
                // The backend's state already diverged from ours, so ours is reset rather than reconciled.
                if self.controller.reset(chat_id).await {
                    info!("Call in chat {} ended by the backend ({:?})", chat_id, event);
                }

                None
            }
            StreamEvent::StreamEnded { chat_id } => {
                let outcome = self.controller.advance(chat_id).await;
                let message = describe_outcome(&outcome)?;

                self.notifier.notify(chat_id, &message).await;
                Some(message)
            }
        }
    }

    /// Handles events until the sending side of the channel is dropped, then waits for the pending ones.
    ///
    /// Each chat has its own lane, so its events are handled one at a time in the order they were received.
    /// Different chats don't wait on each other.
    pub async fn run(self: Arc<Self>, mut receiver: EventReceiver) {
        let mut lanes: HashMap<ChatId, Lane> = HashMap::new();

        while let Some(event) = receiver.recv().await {
            // A lane with nothing pending has finished every event it was given
            lanes.retain(|_, lane| lane.pending.load() > 0 && !lane.sender.is_closed());

            let lane = lanes
                .entry(event.chat_id())
                .or_insert_with(|| self.clone().spawn_lane());

            lane.pending.fetch_add(1);

            if let Err(err) = lane.sender.send(event) {
                lane.pending.fetch_sub(1);
                warn!("Dropped {:?}, its lane is gone", err.0);
            }
        }

        for (chat_id, lane) in lanes.drain() {
            drop(lane.sender);

            if let Err(err) = lane.task.await {
                warn!("Event lane of chat {} failed: {}", chat_id, err);
            }
        }

        info!("Stream event channel closed");
    }

    fn spawn_lane(self: Arc<Self>) -> Lane {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicCell::new(0usize));

        let task = tokio::spawn({
            let pending = pending.clone();

            async move {
                while let Some(event) = receiver.recv().await {
                    self.handle(event).await;
                    pending.fetch_sub(1);
                }
            }
        });

        Lane {
            sender,
            pending,
            task,
        }
    }
}

/// Feeds the events of a single chat to the router in order.
struct Lane {
    sender: mpsc::UnboundedSender<StreamEvent>,
    /// Events sent but not yet handled
    pending: Arc<AtomicCell<usize>>,
    task: JoinHandle<()>,
}

/// The message a chat receives after its track ended.
pub fn describe_outcome(outcome: &AdvanceOutcome) -> Option<String> {
    match outcome {
        AdvanceOutcome::NoQueue => None,
        AdvanceOutcome::QueueExhausted => {
            Some("Queue is empty, disconnected from the video chat.".to_string())
        }
        AdvanceOutcome::BackendError(_) => Some(
            "An error occurred. Cleared the queue and left the video chat.".to_string(),
        ),
        AdvanceOutcome::Advanced(item) => Some(format!(
            "Streaming next track\n\nName: {} | {}\nLink: {}",
            item.title, item.media_type, item.origin_link
        )),
    }
}
