use vcplay_core::{describe_outcome, AdvanceOutcome, PlaybackError, QueueItem, Requested};

pub const PLAY_USAGE: &str = "Usage: /play <song name or link>";
pub const VIDEO_PLAY_USAGE: &str = "Usage: /vplay [360|480|720] <video name or link>";
pub const VOLUME_USAGE: &str = "Usage: /volume <0-200>";
pub const NO_RESULTS: &str = "No results found for your query.";
pub const SUPER_USERS_ONLY: &str = "This command is only for super users.";

pub fn error(err: &PlaybackError) -> String {
    match err {
        PlaybackError::NothingStreaming => "Nothing is streaming.".to_string(),
        PlaybackError::PermissionDenied => {
            "You are not allowed to manage the video chat.".to_string()
        }
        err => format!("Error: {}", err),
    }
}

pub fn requested(requested: &Requested) -> String {
    match requested {
        Requested::Started(item) => format!(
            "Now streaming\n\nName: {} | {}\nLink: {}",
            item.title, item.media_type, item.origin_link
        ),
        Requested::Queued { position, item } => format!(
            "Added to queue at position {}\n\nName: {} | {}\nLink: {}",
            position, item.title, item.media_type, item.origin_link
        ),
    }
}

/// The reply to skipping the streaming item
pub fn skipped_current(outcome: &AdvanceOutcome) -> String {
    match outcome {
        AdvanceOutcome::Advanced(item) => format!(
            "Skipped to the next track\n\nName: {} | {}\nLink: {}",
            item.title, item.media_type, item.origin_link
        ),
        outcome => describe_outcome(outcome).unwrap_or_else(|| "Nothing is streaming.".to_string()),
    }
}

/// The reply to removing queued items by position. Positions refer to the queue before any removal.
pub fn removed(results: &[(usize, Result<QueueItem, PlaybackError>)]) -> String {
    let mut lines: Vec<_> = results
        .iter()
        .map(|(index, result)| match result {
            Ok(item) => format!("#{} - {}", index, item.title),
            Err(_) => format!("#{} - not in the queue", index),
        })
        .collect();

    if lines.is_empty() {
        return "Nothing was removed from the queue.".to_string();
    }

    // Processed highest first, listed in the order the user reads the queue
    lines.reverse();
    format!("Removed from queue:\n{}", lines.join("\n"))
}

pub fn stopped(was_streaming: bool) -> String {
    if was_streaming {
        "Disconnected from the video chat.".to_string()
    } else {
        "Nothing is streaming.".to_string()
    }
}

pub fn queue(items: &[QueueItem]) -> String {
    let Some((current, rest)) = items.split_first() else {
        return "Nothing is streaming.".to_string();
    };

    let mut text = format!(
        "Now streaming\n\nName: {} | {}\nLink: {}",
        current.title, current.media_type, current.origin_link
    );

    if !rest.is_empty() {
        text.push_str("\n\nQueue:");

        for (index, item) in rest.iter().enumerate() {
            text.push_str(&format!("\n#{} - {} | {}", index + 1, item.title, item.media_type));
        }
    }

    text
}
