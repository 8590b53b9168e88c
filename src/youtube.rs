use anyhow::{Context, Result, anyhow};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::constants::constants;
use crate::paging::Group;
use crate::player::VideoDetails;
use crate::tags::Item;

/// A single video as shown in the result grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSummary {
  pub video_id: String,
  pub title: String,
  pub channel: Option<String>,
  /// Length in whole seconds; absent for live streams and some flat listings.
  pub duration_secs: Option<u64>,
}

/// Where the next page of a listing starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Continuation {
  /// yt-dlp source: a channel URL or a `ytsearchN:` query.
  pub source: String,
  /// 1-indexed playlist position of the next item.
  pub start: usize,
}

/// The yt-dlp print template used for flat listings (search and channels).
const LIST_FORMAT: &str = "%(title)s\t%(id)s\t%(channel)s\t%(duration)s";

/// Build the yt-dlp source for a free-text search.
pub fn search_source(query: &str) -> String {
  format!("ytsearch{}:{}", constants().search_pool, query.trim())
}

/// Detect whether user input refers to a YouTube channel.
/// Returns the canonical channel URL if detected, or None for a regular search.
pub fn detect_channel_url(input: &str) -> Option<String> {
  let trimmed = input.trim();

  // "/channel @handle" or "/channel https://..."
  let after_prefix = trimmed.strip_prefix("/channel").map(str::trim_start);
  let candidate = after_prefix.unwrap_or(trimmed);

  if candidate.starts_with('@') && !candidate.contains(' ') && candidate.len() > 1 {
    return Some(format!("https://www.youtube.com/{}/videos", candidate));
  }

  if (candidate.contains("youtube.com/@") || candidate.contains("youtube.com/channel/"))
    && (candidate.starts_with("http://") || candidate.starts_with("https://"))
  {
    let url = candidate.trim_end_matches('/');
    if url.ends_with("/videos") {
      return Some(url.to_string());
    }
    return Some(format!("{}/videos", url));
  }

  if after_prefix.is_some() && !candidate.is_empty() {
    return Some(format!("https://www.youtube.com/@{}/videos", candidate));
  }

  None
}

/// yt-dlp prints `NA` for missing fields.
fn field(parts: &[&str], idx: usize) -> Option<String> {
  parts.get(idx).map(|s| s.trim()).filter(|s| !s.is_empty() && *s != "NA").map(|s| s.to_string())
}

/// yt-dlp reports durations as float seconds (`212.0`) in flat listings.
fn parse_seconds(raw: &str) -> Option<u64> {
  raw.trim().parse::<f64>().ok().filter(|s| s.is_finite() && *s >= 0.0).map(|s| s.round() as u64)
}

/// Parse a `title\tid[\tchannel\tduration]` line.
fn parse_list_line(line: &str) -> Option<VideoSummary> {
  let parts: Vec<&str> = line.split('\t').collect();
  if parts.len() < 2 {
    return None;
  }
  let video_id = parts[1].trim().to_string();
  if video_id.is_empty() {
    return None;
  }
  Some(VideoSummary {
    video_id,
    title: parts[0].trim().to_string(),
    channel: field(&parts, 2),
    duration_secs: field(&parts, 3).and_then(|s| parse_seconds(&s)),
  })
}

fn parse_list_output(stdout: &str) -> Vec<VideoSummary> {
  stdout.lines().map(str::trim).filter(|l| !l.is_empty()).filter_map(parse_list_line).collect()
}

async fn run_ytdlp(args: &[&str], what: &str) -> Result<std::process::Output> {
  Command::new("yt-dlp")
    .args(args)
    .stdin(Stdio::null())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .output()
    .await
    .map_err(|e| {
      if e.kind() == std::io::ErrorKind::NotFound {
        anyhow!("yt-dlp not found. Install it with: brew install yt-dlp (macOS) or pip install yt-dlp")
      } else {
        anyhow!(e).context(format!("Failed to execute yt-dlp {}", what))
      }
    })
}

/// Fetch `count` entries of `source` starting at the 1-indexed `start`.
///
/// The group carries a continuation only when a full page came back.
pub async fn fetch_page(source: &str, start: usize, count: usize) -> Result<Group<Item>> {
  if count == 0 {
    return Ok(Group::new(Vec::new()));
  }
  let range = format!("{}:{}", start, start + count - 1);
  debug!(source, range = %range, "fetching page");

  let output = run_ytdlp(
    &[
      "--flat-playlist",
      "--print",
      LIST_FORMAT,
      "--playlist-items",
      &range,
      "--no-warnings",
      "--ignore-errors",
      "--",
      source,
    ],
    "listing",
  )
  .await?;

  if !output.status.success() {
    return Err(anyhow!("yt-dlp listing failed: {}", String::from_utf8_lossy(&output.stderr)));
  }

  let stdout = String::from_utf8(output.stdout).context("yt-dlp output non-UTF8")?;
  Ok(page_group(source, start, count, parse_list_output(&stdout)))
}

fn page_group(source: &str, start: usize, count: usize, entries: Vec<VideoSummary>) -> Group<Item> {
  let continuation =
    (entries.len() >= count).then(|| Continuation { source: source.to_string(), start: start + entries.len() });
  Group::new(entries.into_iter().map(Item::Video).collect()).with_continuation(continuation)
}

pub async fn get_video_info(video_id: &str) -> Result<VideoDetails> {
  let url = format!("https://youtube.com/watch?v={}", video_id);
  let output = run_ytdlp(
    &[
      "--print",
      "%(title)s",
      "--print",
      "%(uploader)s",
      "--print",
      "%(duration)s",
      "--print",
      "%(width)s",
      "--print",
      "%(height)s",
      "--no-warnings",
      "--",
      &url,
    ],
    "to get video info",
  )
  .await?;

  if !output.status.success() {
    return Ok(VideoDetails { url, title: video_id.to_string(), ..VideoDetails::default() });
  }

  let info = String::from_utf8(output.stdout).context("Failed to parse yt-dlp info output as UTF-8")?;
  parse_video_info(url, &info)
}

fn parse_video_info(url: String, info: &str) -> Result<VideoDetails> {
  let lines: Vec<&str> = info.lines().collect();
  let title = field(&lines, 0).ok_or_else(|| anyhow!("Missing title in yt-dlp output"))?;
  let number = |idx: usize| field(&lines, idx).and_then(|s| parse_seconds(&s));
  Ok(VideoDetails {
    url,
    title,
    uploader: field(&lines, 1),
    duration_secs: number(2),
    width: number(3).map(|w| w as u32),
    height: number(4).map(|h| h as u32),
  })
}

/// Format whole seconds as `H:MM:SS` or `M:SS`.
pub fn format_duration(secs: u64) -> String {
  let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
  if h > 0 { format!("{}:{:02}:{:02}", h, m, s) } else { format!("{}:{:02}", m, s) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_line_full() {
    let v = parse_list_line("Title\tabc123\tSome Channel\t212.0").unwrap();
    assert_eq!(v.video_id, "abc123");
    assert_eq!(v.title, "Title");
    assert_eq!(v.channel.as_deref(), Some("Some Channel"));
    assert_eq!(v.duration_secs, Some(212));
  }

  #[test]
  fn parse_line_na_fields() {
    let v = parse_list_line("Live now\tlive01\tNA\tNA").unwrap();
    assert_eq!(v.channel, None);
    assert_eq!(v.duration_secs, None);
  }

  #[test]
  fn parse_line_rejects_missing_id() {
    assert!(parse_list_line("only a title").is_none());
    assert!(parse_list_line("title\t  ").is_none());
  }

  #[test]
  fn parse_output_skips_blank_lines() {
    let out = "A\ta1\tC\t10\n\n  \nB\tb2\n";
    let entries = parse_list_output(out);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].video_id, "b2");
  }

  #[test]
  fn full_page_has_continuation() {
    let entries = parse_list_output("A\ta1\nB\tb2\n");
    let group = page_group("ytsearch100:cats", 21, 2, entries);
    assert_eq!(group.len(), 2);
    assert_eq!(group.continuation, Some(Continuation { source: "ytsearch100:cats".into(), start: 23 }));
  }

  #[test]
  fn short_page_ends_listing() {
    let entries = parse_list_output("A\ta1\n");
    let group = page_group("src", 1, 20, entries);
    assert_eq!(group.continuation, None);
  }

  #[test]
  fn video_info_parsing() {
    let info = "My Video\nUploader\n3725\n1920\n1080\n";
    let d = parse_video_info("u".into(), info).unwrap();
    assert_eq!(d.title, "My Video");
    assert_eq!(d.uploader.as_deref(), Some("Uploader"));
    assert_eq!(d.duration_secs, Some(3725));
    assert_eq!(d.width, Some(1920));
    assert_eq!(d.height, Some(1080));
  }

  #[test]
  fn video_info_requires_title() {
    assert!(parse_video_info("u".into(), "").is_err());
  }

  #[test]
  fn channel_detection() {
    assert_eq!(detect_channel_url("@TwoSetViolin").as_deref(), Some("https://www.youtube.com/@TwoSetViolin/videos"));
    assert_eq!(detect_channel_url("/channel lofi").as_deref(), Some("https://www.youtube.com/@lofi/videos"));
    assert_eq!(
      detect_channel_url("https://www.youtube.com/channel/UC123/").as_deref(),
      Some("https://www.youtube.com/channel/UC123/videos")
    );
    assert_eq!(detect_channel_url("cat videos"), None);
    assert_eq!(detect_channel_url("@"), None);
  }

  #[test]
  fn duration_formatting() {
    assert_eq!(format_duration(5), "0:05");
    assert_eq!(format_duration(212), "3:32");
    assert_eq!(format_duration(3725), "1:02:05");
  }
}
