use std::process::Stdio;

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use tokio::process::Command;
use vcplay_core::{MediaType, ResolveError, Resolver};

use crate::util::is_url;

use super::{InputError, Search, SearchResult};

const YT_UNAVAILABLE: &str = "Video unavailable. This video is not available";
const YT_NOT_FOUND: &str = "Video unavailable";
const YT_ID_ERROR: &str = "Incomplete YouTube ID";
const YT_UNSUPPORTED: &str = "Unsupported URL";

/// Resolves and searches media by shelling out to yt-dlp.
#[derive(Debug, Clone)]
pub struct YtDlpResolver {
    program: String,
}

#[derive(Debug, Deserialize)]
struct FlatEntry {
    id: Option<String>,
    title: Option<String>,
    url: Option<String>,
    webpage_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchPlaylist {
    #[serde(default)]
    entries: Vec<FlatEntry>,
}

impl YtDlpResolver {
    pub fn new() -> Self {
        Self::with_program("yt-dlp")
    }

    /// Uses a different executable, such as a wrapper script or an absolute path.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Runs yt-dlp and returns what it printed, classifying failures from its error output.
    async fn run(&self, args: &[&str]) -> Result<String, InputError> {
        debug!("Running {} {:?}", self.program, args);

        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // The caller may give up on us with a timeout
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| InputError::Other(format!("Failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let error_output = String::from_utf8_lossy(&output.stderr);
            return Err(classify_error(&error_output));
        }

        String::from_utf8(output.stdout).map_err(|e| InputError::ParseError(e.to_string()))
    }
}

impl Default for YtDlpResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Search for YtDlpResolver {
    async fn search(&self, query: &str) -> Result<SearchResult, InputError> {
        let query = query.trim();

        if query.is_empty() {
            return Err(InputError::Invalid("Empty search".to_string()));
        }

        let target = format!("ytsearch1:{}", query);
        let output = self
            .run(&[
                // Don't resolve stream urls for the results
                "--flat-playlist",
                "--skip-download",
                "-J",
                "--",
                &target,
            ])
            .await?;

        parse_search(&output)
    }
}

#[async_trait]
impl Resolver for YtDlpResolver {
    async fn resolve(
        &self,
        query: &str,
        media_type: MediaType,
        quality: u32,
    ) -> Result<String, ResolveError> {
        let target = if is_url(query) {
            query.trim().to_string()
        } else {
            format!("ytsearch1:{}", query.trim())
        };

        let selector = format_selector(media_type, quality);
        let output = self.run(&["-g", "-f", &selector, "--", &target]).await?;

        first_line(&output).ok_or(ResolveError::NotFound)
    }
}

/// The yt-dlp format selector for the media type. Video is capped at the quality, in pixels of height.
pub fn format_selector(media_type: MediaType, quality: u32) -> String {
    match media_type {
        MediaType::Audio => "bestaudio/best".to_string(),
        MediaType::Video => format!("best[height<={q}]/bestvideo[height<={q}]+bestaudio/best", q = quality),
    }
}

fn first_line(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(ToOwned::to_owned)
}

fn parse_search(output: &str) -> Result<SearchResult, InputError> {
    let playlist: SearchPlaylist =
        serde_json::from_str(output).map_err(|e| InputError::ParseError(e.to_string()))?;

    let entry = playlist
        .entries
        .into_iter()
        .next()
        .ok_or(InputError::NotFound)?;

    let url = entry
        .webpage_url
        .or(entry.url)
        .or_else(|| entry.id.map(|id| format!("https://www.youtube.com/watch?v={}", id)))
        .ok_or(InputError::NotFound)?;

    Ok(SearchResult {
        title: entry.title.unwrap_or_else(|| url.clone()),
        url,
    })
}

fn classify_error(error_output: &str) -> InputError {
    if error_output.contains(YT_UNAVAILABLE) {
        return InputError::Unavailable;
    }

    if error_output.contains(YT_NOT_FOUND) {
        return InputError::NotFound;
    }

    if error_output.contains(YT_ID_ERROR) {
        return InputError::Invalid("Invalid Video ID".to_string());
    }

    if error_output.contains(YT_UNSUPPORTED) {
        return InputError::Invalid("Unsupported link".to_string());
    }

    InputError::FetchError(error_output.trim().to_string())
}
