//! Session settings: defaults, overridden by the RON file, overridden by CLI flags.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use dataknow_core::{Language, Timings};
use dataknow_engine::{ServiceSettings, SimulationSettings};
use dataknow_logging::dk_info;
use serde::{Deserialize, Serialize};

use super::cli::Cli;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    #[default]
    En,
    Es,
}

impl From<LanguageCode> for Language {
    fn from(code: LanguageCode) -> Self {
        match code {
            LanguageCode::En => Language::En,
            LanguageCode::Es => Language::Es,
        }
    }
}

/// Contents of `dataknow.ron`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub endpoint: Option<String>,
    pub output_dir: PathBuf,
    pub language: LanguageCode,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub max_artifact_bytes: u64,
    pub timings: TimingsConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        let service = ServiceSettings::default();
        Self {
            endpoint: None,
            output_dir: PathBuf::from("output"),
            language: LanguageCode::En,
            connect_timeout_ms: millis(service.connect_timeout),
            request_timeout_ms: millis(service.request_timeout),
            max_artifact_bytes: service.max_artifact_bytes,
            timings: TimingsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingsConfig {
    pub tick_base_ms: u64,
    pub tick_increment_ms: u64,
    pub promotion_delay_ms: u64,
    pub notice_ttl_ms: u64,
    pub poll_interval_ms: u64,
    pub max_poll_attempts: u32,
    pub simulated_processing_ms: u64,
    pub simulated_generation_ms: u64,
}

impl Default for TimingsConfig {
    fn default() -> Self {
        let timings = Timings::default();
        let simulation = SimulationSettings::default();
        Self {
            tick_base_ms: millis(timings.tick_base),
            tick_increment_ms: millis(timings.tick_increment),
            promotion_delay_ms: millis(timings.promotion_delay),
            notice_ttl_ms: millis(timings.notice_ttl),
            poll_interval_ms: millis(timings.poll_interval),
            max_poll_attempts: timings.max_poll_attempts,
            simulated_processing_ms: millis(simulation.processing_delay),
            simulated_generation_ms: millis(simulation.generation_delay),
        }
    }
}

impl TimingsConfig {
    fn timings(&self) -> Timings {
        Timings {
            tick_base: Duration::from_millis(self.tick_base_ms),
            tick_increment: Duration::from_millis(self.tick_increment_ms),
            promotion_delay: Duration::from_millis(self.promotion_delay_ms),
            notice_ttl: Duration::from_millis(self.notice_ttl_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            max_poll_attempts: self.max_poll_attempts.max(1),
        }
    }

    fn simulation(&self) -> SimulationSettings {
        SimulationSettings {
            processing_delay: Duration::from_millis(self.simulated_processing_ms),
            generation_delay: Duration::from_millis(self.simulated_generation_ms),
        }
    }
}

/// Everything the session needs, after all overrides.
#[derive(Debug, Clone)]
pub struct Settings {
    /// `None` selects the simulated service.
    pub endpoint: Option<String>,
    pub service: ServiceSettings,
    pub simulation: SimulationSettings,
    pub output_dir: PathBuf,
    pub language: Language,
    pub timings: Timings,
    pub prompt: Option<String>,
}

impl Settings {
    pub fn resolve(file: FileConfig, cli: &Cli) -> Self {
        let endpoint = cli
            .endpoint
            .clone()
            .or(file.endpoint)
            .filter(|url| !url.trim().is_empty());
        let service = ServiceSettings {
            base_url: endpoint.clone().unwrap_or_default(),
            connect_timeout: Duration::from_millis(file.connect_timeout_ms),
            request_timeout: Duration::from_millis(file.request_timeout_ms),
            max_artifact_bytes: file.max_artifact_bytes,
        };
        Self {
            endpoint,
            service,
            simulation: file.timings.simulation(),
            output_dir: cli.output.clone().unwrap_or(file.output_dir),
            language: cli.language.unwrap_or(file.language).into(),
            timings: file.timings.timings(),
            prompt: cli.prompt.clone().filter(|prompt| !prompt.trim().is_empty()),
        }
    }
}

/// Reads the config file; a missing file yields the defaults.
pub fn load(path: &Path) -> anyhow::Result<FileConfig> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            dk_info!("No config file at {:?}, using defaults", path);
            return Ok(FileConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("reading config file {}", path.display()))
        }
    };
    parse(&content).with_context(|| format!("parsing config file {}", path.display()))
}

fn parse(content: &str) -> anyhow::Result<FileConfig> {
    Ok(ron::from_str(content)?)
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
