//! Driver for the official Ookla speedtest CLI.
//!
//! The executable does the measuring; this module finds it, runs it with JSON
//! output and turns the result into a [`Measurement`] for the log.

use std::process::Command;

use serde::{Deserialize, Deserializer};
use speedlog_core::Measurement;
use thiserror::Error;

/// Where to look for the executable, in order.
const CANDIDATES: &[&str] = &["speedtest", "/usr/bin/speedtest", "/usr/local/bin/speedtest"];

/// Marker in `--version` output that identifies the official client.
const OOKLA_MARKER: &str = "Ookla";

#[derive(Debug, Error)]
pub enum SpeedtestError {
    #[error("official Ookla speedtest CLI not found; install it from https://www.speedtest.net/apps/cli")]
    NotFound,

    #[error("failed to run {cmd}: {source}")]
    Spawn {
        cmd: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{cmd} exited with {status}: {stderr}")]
    Failed {
        cmd: String,
        status: String,
        stderr: String,
    },

    #[error("could not parse speedtest output: {0}")]
    Parse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// JSON shapes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RunOutput {
    download: Bandwidth,
    upload: Bandwidth,
    ping: Ping,
    #[serde(default)]
    server: ServerInfo,
    #[serde(default)]
    result: ResultInfo,
}

#[derive(Deserialize)]
struct Bandwidth {
    /// Bytes per second.
    bandwidth: f64,
}

#[derive(Deserialize)]
struct Ping {
    latency: f64,
}

#[derive(Deserialize, Default)]
struct ServerInfo {
    #[serde(default, deserialize_with = "opt_id")]
    id: Option<String>,
    name: Option<String>,
    location: Option<String>,
}

#[derive(Deserialize, Default)]
struct ResultInfo {
    url: Option<String>,
}

#[derive(Deserialize)]
struct ServerList {
    #[serde(default)]
    servers: Vec<ServerEntry>,
}

/// One entry of `speedtest -L`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerEntry {
    #[serde(deserialize_with = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub host: String,
}

/// Server ids arrive as numbers or strings depending on the client version.
fn id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match serde_json::Value::deserialize(d)? {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

fn opt_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<serde_json::Value>::deserialize(d)? {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// A finished run: the measurement to log and the result page, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub measurement: Measurement,
    pub result_url: Option<String>,
}

/// Bytes per second to megabits per second.
fn to_mbps(bytes_per_sec: f64) -> f64 {
    bytes_per_sec * 8.0 / 1_000_000.0
}

/// Parse the JSON printed by `speedtest -f json`.
pub fn parse_run_output(json: &str) -> Result<RunResult, SpeedtestError> {
    let out: RunOutput = serde_json::from_str(json)?;
    let server_name = format!(
        "{} ({})",
        out.server.name.as_deref().unwrap_or("Unknown"),
        out.server.location.as_deref().unwrap_or("")
    );
    Ok(RunResult {
        measurement: Measurement {
            download_mbps: to_mbps(out.download.bandwidth),
            upload_mbps: to_mbps(out.upload.bandwidth),
            ping_ms: out.ping.latency,
            server_id: out.server.id.unwrap_or_else(|| "N/A".to_string()),
            server_name,
        },
        result_url: out.result.url,
    })
}

/// Parse the JSON printed by `speedtest -L -f json`.
pub fn parse_server_list(json: &str) -> Result<Vec<ServerEntry>, SpeedtestError> {
    let list: ServerList = serde_json::from_str(json)?;
    Ok(list.servers)
}

/// Servers whose name, location or host contains `term`, ignoring case.
pub fn matching<'a>(servers: &'a [ServerEntry], term: &str) -> Vec<&'a ServerEntry> {
    let term = term.to_lowercase();
    servers
        .iter()
        .filter(|s| {
            s.name.to_lowercase().contains(&term)
                || s.location.to_lowercase().contains(&term)
                || s.host.to_lowercase().contains(&term)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Executable
// ---------------------------------------------------------------------------

/// Handle on a located official speedtest executable.
#[derive(Debug, Clone)]
pub struct Speedtest {
    cmd: String,
}

impl Speedtest {
    /// Find the official client among the usual locations.
    pub fn locate() -> Result<Self, SpeedtestError> {
        for cmd in CANDIDATES {
            match Command::new(cmd).arg("--version").output() {
                Ok(out) if String::from_utf8_lossy(&out.stdout).contains(OOKLA_MARKER) => {
                    log::debug!("using speedtest client at {cmd}");
                    return Ok(Self {
                        cmd: (*cmd).to_string(),
                    });
                }
                Ok(_) => log::debug!("{cmd} is not the official Ookla client"),
                Err(e) => log::debug!("{cmd}: {e}"),
            }
        }
        Err(SpeedtestError::NotFound)
    }

    pub fn command(&self) -> &str {
        &self.cmd
    }

    /// Run one measurement, optionally against a specific server.
    pub fn run(&self, server_id: Option<&str>) -> Result<RunResult, SpeedtestError> {
        let mut args = vec!["--accept-license", "--accept-gdpr", "-f", "json"];
        if let Some(id) = server_id {
            args.extend(["-s", id]);
        }
        let stdout = self.output(&args)?;
        parse_run_output(&stdout)
    }

    /// Servers the client knows about (usually the geographically closest).
    pub fn list_servers(&self) -> Result<Vec<ServerEntry>, SpeedtestError> {
        let stdout = self.output(&["-L", "-f", "json"])?;
        parse_server_list(&stdout)
    }

    /// Id of the first server matching `name`, if any.
    pub fn resolve_server_id(&self, name: &str) -> Result<Option<String>, SpeedtestError> {
        let servers = self.list_servers()?;
        Ok(matching(&servers, name).first().map(|s| s.id.clone()))
    }

    fn output(&self, args: &[&str]) -> Result<String, SpeedtestError> {
        log::debug!("running {} {}", self.cmd, args.join(" "));
        let out = Command::new(&self.cmd)
            .args(args)
            .output()
            .map_err(|source| SpeedtestError::Spawn {
                cmd: self.cmd.clone(),
                source,
            })?;
        if !out.status.success() {
            return Err(SpeedtestError::Failed {
                cmd: self.cmd.clone(),
                status: out.status.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }
}
