use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub services: ServicesConfig,

    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// Endpoints of the external render and suggestion services.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServicesConfig {
    /// Multipart endpoint receiving the source file and span form fields
    #[serde(default = "default_render_url")]
    pub render_url: String,

    /// JSON endpoint returning trim/speed suggestions
    #[serde(default = "default_suggest_url")]
    pub suggest_url: String,

    /// Request timeout in seconds (default: 120)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_render_url() -> String {
    "http://127.0.0.1:8000/export/from-file".to_string()
}

fn default_suggest_url() -> String {
    "http://127.0.0.1:8000/ai/suggest-cuts-from-sprites".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl ServicesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            render_url: default_render_url(),
            suggest_url: default_suggest_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PlaybackConfig {
    /// Frame ticks per second while playing
    #[serde(default = "default_frame_rate_hz")]
    pub frame_rate_hz: u32,

    /// Interval between simulated native position notifications
    #[serde(default = "default_notify_interval_ms")]
    pub notify_interval_ms: u64,
}

fn default_frame_rate_hz() -> u32 {
    60
}

fn default_notify_interval_ms() -> u64 {
    250
}

impl PlaybackConfig {
    pub fn notify_interval(&self) -> Duration {
        Duration::from_millis(self.notify_interval_ms)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            frame_rate_hz: default_frame_rate_hz(),
            notify_interval_ms: default_notify_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AnalysisConfig {
    /// Seconds between sampled sprite frames
    #[serde(default = "default_sprite_interval")]
    pub sprite_interval_sec: f64,

    /// Tiles per sprite sheet
    #[serde(default = "default_frames_per_sheet")]
    pub frames_per_sheet: u32,
}

fn default_sprite_interval() -> f64 {
    0.25
}

fn default_frames_per_sheet() -> u32 {
    100
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sprite_interval_sec: default_sprite_interval(),
            frames_per_sheet: default_frames_per_sheet(),
        }
    }
}
