use log::info;
use vcplay_core::{ChatId, MediaType, PlaybackError, QueueItem, UserId};

use crate::{util::truncate, Collab, InputError};

use super::{reply, Command, Invocation};

/// Titles longer than this are cut off
const MAX_TITLE_LENGTH: usize = 80;

/// The video heights that can be requested, in pixels
pub const VIDEO_QUALITIES: [u32; 3] = [360, 480, 720];
pub const DEFAULT_VIDEO_QUALITY: u32 = 720;

impl Collab {
    /// Runs a command that already passed authorization, returning the reply.
    pub(crate) async fn execute(
        &self,
        chat_id: ChatId,
        caller: UserId,
        command: Command,
        invocation: &Invocation,
    ) -> String {
        let args = invocation.args();

        match command {
            Command::Play => {
                if invocation.rest.is_empty() {
                    return reply::PLAY_USAGE.to_string();
                }

                self.play(chat_id, caller, &invocation.rest, MediaType::Audio, 0)
                    .await
            }
            Command::VideoPlay => {
                let (quality, query) = split_quality(&invocation.rest);

                if query.is_empty() {
                    return reply::VIDEO_PLAY_USAGE.to_string();
                }

                self.play(chat_id, caller, query, MediaType::Video, quality)
                    .await
            }
            Command::Skip => {
                if args.is_empty() {
                    return self.skip_current(chat_id).await;
                }

                let indices: Vec<usize> = args.iter().filter_map(|a| a.parse().ok()).collect();

                match self.controller.skip_many(chat_id, &indices).await {
                    Ok(results) => reply::removed(&results),
                    Err(err) => reply::error(&err),
                }
            }
            Command::Stop => reply::stopped(self.controller.stop(chat_id).await),
            Command::Pause => self.control(
                self.controller.pause(chat_id).await,
                "Track paused. Use /resume to continue.",
            ),
            Command::Resume => self.control(
                self.controller.resume(chat_id).await,
                "Track resumed. Use /pause to pause.",
            ),
            Command::Mute => self.control(
                self.controller.mute(chat_id).await,
                "Muted. Use /unmute to unmute.",
            ),
            Command::Unmute => self.control(
                self.controller.unmute(chat_id).await,
                "Unmuted. Use /mute to mute.",
            ),
            Command::Volume => {
                let Some(percent) = args.first().and_then(|a| a.parse::<i32>().ok()) else {
                    return reply::VOLUME_USAGE.to_string();
                };

                self.control(
                    self.controller.set_volume(chat_id, percent).await,
                    &format!("Volume set to {}%", percent),
                )
            }
            Command::Playlist => reply::queue(&self.controller.queue(chat_id)),
            Command::Reload => self.reload(chat_id, caller, &args).await,
        }
    }

    async fn play(
        &self,
        chat_id: ChatId,
        caller: UserId,
        query: &str,
        media_type: MediaType,
        quality: u32,
    ) -> String {
        let (title, link) = if crate::is_url(query) {
            (query.to_string(), query.to_string())
        } else {
            match self.search.search(query).await {
                Ok(result) => (truncate(&result.title, MAX_TITLE_LENGTH), result.url),
                Err(InputError::NotFound) => return reply::NO_RESULTS.to_string(),
                Err(err) => return format!("Error: {}", err),
            }
        };

        let mut item = QueueItem::new(title, link).requested_by(caller);

        if media_type == MediaType::Video {
            item = item.with_video(quality);
        }

        match self.controller.request(chat_id, item).await {
            Ok(requested) => reply::requested(&requested),
            Err(err) => reply::error(&err),
        }
    }

    async fn skip_current(&self, chat_id: ChatId) -> String {
        match self.controller.skip_at(chat_id, 0).await {
            Ok(skipped) => match skipped.advance {
                Some(outcome) => reply::skipped_current(&outcome),
                None => reply::stopped(true),
            },
            Err(PlaybackError::IndexOutOfRange { .. }) => {
                reply::error(&PlaybackError::NothingStreaming)
            }
            Err(err) => reply::error(&err),
        }
    }

    async fn reload(&self, chat_id: ChatId, caller: UserId, args: &[&str]) -> String {
        if args.first().is_some_and(|a| a.eq_ignore_ascii_case("all")) {
            if !self.gate.is_super_user(caller) {
                return reply::SUPER_USERS_ONLY.to_string();
            }

            self.gate.reset();
            info!("{} reset the admin cache of every chat", caller);

            return "Admin lists of every chat will be reloaded on next use.".to_string();
        }

        match self.gate.reload(chat_id).await {
            Ok(count) => format!(
                "Admin list reloaded, {} admins can manage the video chat.",
                count
            ),
            Err(err) => format!("Failed to reload admins: {}", err),
        }
    }

    fn control(&self, result: Result<(), PlaybackError>, success: &str) -> String {
        match result {
            Ok(()) => success.to_string(),
            Err(err) => reply::error(&err),
        }
    }
}

/// Splits a leading quality tier off the query. Without one, the default tier is used.
pub fn split_quality(rest: &str) -> (u32, &str) {
    let rest = rest.trim();
    let (first, query) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));

    match first.parse::<u32>() {
        Ok(quality) if VIDEO_QUALITIES.contains(&quality) => (quality, query.trim()),
        _ => (DEFAULT_VIDEO_QUALITY, rest),
    }
}
