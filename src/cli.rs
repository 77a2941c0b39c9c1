use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use trimline_common::time::{parse_range, parse_speed_range, parse_time};
use trimline_common::{SpeedRange, TimeRange};

#[derive(Parser)]
#[command(name = "trimline")]
#[command(author, version, about = "Trim and speed-range editing for video timelines")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// A timeline and the raw spans applied to it.
#[derive(Args, Debug, Clone)]
pub struct Timeline {
    /// Source duration (seconds, MM:SS or HH:MM:SS)
    #[arg(short, long, value_parser = parse_time)]
    pub duration: f64,

    /// Span to remove, as START-END (repeatable)
    #[arg(long = "trim", value_parser = parse_range)]
    pub trims: Vec<TimeRange>,

    /// Span to retime, as START-END@SPEED (repeatable)
    #[arg(long = "speed", value_parser = parse_speed_range)]
    pub speeds: Vec<SpeedRange>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the canonical form of the given spans
    Normalize {
        #[command(flatten)]
        timeline: Timeline,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the segments a render would produce
    Plan {
        #[command(flatten)]
        timeline: Timeline,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Play the timeline on a simulated media clock and print display positions
    Simulate {
        #[command(flatten)]
        timeline: Timeline,

        /// Seek here before playing
        #[arg(long, value_parser = parse_time, default_value = "0")]
        from: f64,

        /// Override the notification interval in milliseconds
        #[arg(long)]
        notify_ms: Option<u64>,
    },

    /// Ask the suggestion service for edits and print the resulting spans
    Suggest {
        /// What to cut or speed up
        #[arg(required = true)]
        prompt: String,

        /// Source duration (seconds, MM:SS or HH:MM:SS)
        #[arg(short, long, value_parser = parse_time)]
        duration: f64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send a source and its spans to the render service
    Export {
        /// Source media file
        #[arg(required = true)]
        source: PathBuf,

        #[command(flatten)]
        timeline: Timeline,

        /// Print the request fields without sending them
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        #[arg(value_name = "CONFIG")]
        file: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
