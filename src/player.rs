use anyhow::{Context, Result, anyhow};
use std::process::Stdio;
use std::time::Duration;
use tokio::{
  io::BufReader as TokioBufReader,
  io::AsyncBufReadExt,
  process::{Child as TokioChild, Command},
  sync::mpsc,
  task::JoinHandle,
};
use tracing::{debug, info};

use crate::quirks::{DecoderQuirks, SurfaceRequest};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoDetails {
  pub url: String,
  pub title: String,
  pub uploader: Option<String>,
  pub duration_secs: Option<u64>,
  pub width: Option<u32>,
  pub height: Option<u32>,
}

/// Build the mpv command line for `details`.
///
/// With the surface clamp active the window is never smaller than the
/// clamped decoder surface.
pub fn mpv_args(details: &VideoDetails, quirks: DecoderQuirks, ipc_socket: &str) -> Vec<String> {
  let mut args = vec![
    "--force-window=immediate".to_string(),
    "--term-status-msg=${time-pos/full} / ${duration/full} ${pause}".to_string(),
    format!("--input-ipc-server={}", ipc_socket),
  ];
  if quirks.clamp_surface {
    let req = SurfaceRequest {
      width: details.width.unwrap_or(0),
      height: details.height.unwrap_or(0),
      max_input_size: 0,
    };
    let surface = quirks.apply(req);
    args.push(format!("--autofit-smaller={}x{}", surface.width, surface.height));
  }
  args.push(details.url.clone());
  args
}

/// Playback position parsed from one mpv status line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackStatus {
  pub position: Duration,
  pub duration: Duration,
  pub paused: bool,
}

impl PlaybackStatus {
  pub fn remaining(&self) -> Duration {
    self.duration.saturating_sub(self.position)
  }
}

/// `H:MM:SS.mmm`, `M:SS` or plain seconds.
fn parse_clock(s: &str) -> Option<Duration> {
  let mut secs = 0.0f64;
  for part in s.trim().split(':') {
    let v: f64 = part.parse().ok()?;
    if !v.is_finite() || v < 0.0 {
      return None;
    }
    secs = secs * 60.0 + v;
  }
  Some(Duration::from_secs_f64(secs))
}

/// Parse a `--term-status-msg` line: `<pos> / <duration> <pause>`.
pub fn parse_status_line(line: &str) -> Option<PlaybackStatus> {
  let (pos, rest) = line.split_once(" / ")?;
  let mut rest = rest.split_whitespace();
  let duration = parse_clock(rest.next()?)?;
  let paused = rest.next() == Some("yes");
  Some(PlaybackStatus { position: parse_clock(pos)?, duration, paused })
}

/// Playback screen backend: one mpv process at a time.
pub struct Player {
  pub(crate) current_process: Option<TokioChild>,
  pub current_details: Option<VideoDetails>,
  pub quirks: DecoderQuirks,
  monitor_handle: Option<JoinHandle<()>>,
  status_rx: Option<mpsc::Receiver<String>>,
  last_status: Option<String>,
  ipc_socket_path: Option<String>,
  fresh_status: Option<PlaybackStatus>,
  pub paused: bool,
  /// Player executable, `mpv` unless overridden.
  pub program: String,
}

impl Player {
  pub fn new(quirks: DecoderQuirks) -> Self {
    Self {
      current_process: None,
      current_details: None,
      quirks,
      monitor_handle: None,
      status_rx: None,
      last_status: None,
      ipc_socket_path: None,
      fresh_status: None,
      paused: false,
      program: "mpv".to_string(),
    }
  }

  pub fn is_playing(&self) -> bool {
    self.current_process.is_some()
  }

  /// Drain status lines and reap mpv if it exited on its own.
  /// Returns `true` when playback ended since the last check.
  pub fn check_status(&mut self) -> bool {
    if let Some(rx) = &mut self.status_rx {
      while let Ok(status) = rx.try_recv() {
        if let Some(parsed) = parse_status_line(&status) {
          self.fresh_status = Some(parsed);
        }
        self.last_status = Some(status);
      }
    }
    if let Some(child) = &mut self.current_process
      && let Ok(Some(status)) = child.try_wait()
    {
      info!(%status, "player: mpv exited");
      self.current_process = None;
      self.reset_session();
      return true;
    }
    false
  }

  pub fn last_status(&self) -> Option<&str> {
    self.last_status.as_deref()
  }

  /// Position reported since the previous call, if any.
  pub fn take_status(&mut self) -> Option<PlaybackStatus> {
    let status = self.fresh_status.take()?;
    self.paused = status.paused;
    Some(status)
  }

  pub async fn play(&mut self, details: VideoDetails) -> Result<()> {
    self.stop().await.context("Failed to stop previous playback")?;
    self.paused = false;

    let socket_path = std::env::temp_dir().join(format!("tvtube-mpv-{}.sock", std::process::id()));
    let socket_path_str = socket_path.to_str().context("Temp dir path is not valid UTF-8")?.to_string();
    // Remove stale socket if it exists from a previous crash.
    let _ = std::fs::remove_file(&socket_path);

    let args = mpv_args(&details, self.quirks, &socket_path_str);
    debug!(?args, "player: spawning mpv");

    let mut cmd = Command::new(&self.program);
    cmd.args(&args);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    // Send stderr to null: if piped but never drained, the pipe buffer
    // fills and mpv blocks.
    cmd.stderr(Stdio::null());

    let mut child = cmd.spawn().map_err(|e| {
      if e.kind() == std::io::ErrorKind::NotFound {
        anyhow!("{} not found. Install it with: brew install mpv (macOS) or apt install mpv (Linux)", self.program)
      } else {
        anyhow!(e).context("Failed to spawn mpv process")
      }
    })?;

    let stdout = child.stdout.take().context("Failed to get mpv stdout")?;
    let (tx, rx) = mpsc::channel::<String>(10);
    self.status_rx = Some(rx);

    let monitor_handle = tokio::spawn(async move {
      let reader = TokioBufReader::new(stdout);
      let mut lines = reader.lines();
      while let Ok(Some(line)) = lines.next_line().await {
        if tx.send(line).await.is_err() {
          break;
        }
      }
    });

    info!(title = %details.title, "player: playing");
    self.current_details = Some(details);
    self.current_process = Some(child);
    self.monitor_handle = Some(monitor_handle);
    self.ipc_socket_path = Some(socket_path_str);
    Ok(())
  }

  pub async fn toggle_pause(&mut self) -> Result<()> {
    let Some(ref socket_path) = self.ipc_socket_path else {
      return Ok(());
    };
    let stream = tokio::net::UnixStream::connect(socket_path).await.context("Failed to connect to mpv IPC socket")?;
    stream.writable().await.context("mpv IPC socket not writable")?;
    let cmd = b"{\"command\":[\"cycle\",\"pause\"]}\n";
    let written = stream.try_write(cmd).context("Failed to send pause command to mpv")?;
    if written < cmd.len() {
      return Err(anyhow!("Partial write to mpv IPC socket: wrote {} of {} bytes", written, cmd.len()));
    }
    self.paused = !self.paused;
    Ok(())
  }

  pub async fn stop(&mut self) -> Result<()> {
    if let Some(mut child) = self.current_process.take() {
      child.kill().await.context("Failed to kill mpv process")?;
      let _ = child.wait().await;
    }
    if let Some(handle) = self.monitor_handle.take() {
      handle.abort();
      let _ = handle.await;
    }
    self.reset_session();
    Ok(())
  }

  fn reset_session(&mut self) {
    if let Some(handle) = self.monitor_handle.take() {
      handle.abort();
    }
    self.status_rx = None;
    self.last_status = None;
    self.fresh_status = None;
    self.current_details = None;
    self.paused = false;
    if let Some(path) = self.ipc_socket_path.take() {
      let _ = std::fs::remove_file(&path);
    }
  }
}
