use clap::Parser;
use std::path::PathBuf;

/// Bounds for sim time units per real second, shared by the CLI and the speed keys.
pub const MIN_TIME_SCALE: f64 = 1.0 / 64.0;
pub const MAX_TIME_SCALE: f64 = 1024.0;

#[derive(Parser, Debug, Clone)]
#[command(name = "orbitscope")]
#[command(about = "Keplerian star systems rendered as ASCII in the terminal")]
pub struct Cli {
    /// Seed for universe generation
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of galaxies to generate
    #[arg(long, default_value_t = 1)]
    pub galaxies: usize,

    /// Star systems per galaxy
    #[arg(long, default_value_t = 3)]
    pub systems: usize,

    /// Frame width in cells (default: terminal width)
    #[arg(long)]
    pub width: Option<u16>,

    /// Frame height in cells (default: terminal height minus one)
    #[arg(long)]
    pub height: Option<u16>,

    /// Frame rate cap
    #[arg(long, default_value_t = 20)]
    pub fps: u32,

    /// Simulation time units per real second
    #[arg(long, default_value_t = 2.0)]
    pub time_scale: f64,

    /// Top speed of each system's drift in world units per sim time unit (0 = fixed systems)
    #[arg(long, default_value_t = 0.0)]
    pub drift: f64,

    /// Append log records to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, default_value = "info")]
    pub log_level: log::LevelFilter,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub seed: u64,
    pub galaxies: usize,
    pub systems_per_galaxy: usize,
    pub width: Option<u16>,
    pub height: Option<u16>,
    pub fps_cap: u32,
    pub time_scale: f64,
    pub drift: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 42,
            galaxies: 1,
            systems_per_galaxy: 3,
            width: None,
            height: None,
            fps_cap: 20,
            time_scale: 2.0,
            drift: 0.0,
        }
    }
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            seed: cli.seed,
            galaxies: cli.galaxies.max(1),
            systems_per_galaxy: cli.systems.max(1),
            width: cli.width.map(|w| w.max(1)),
            height: cli.height.map(|h| h.max(1)),
            fps_cap: cli.fps.clamp(5, 120),
            time_scale: if cli.time_scale.is_finite() {
                cli.time_scale.clamp(MIN_TIME_SCALE, MAX_TIME_SCALE)
            } else {
                2.0
            },
            drift: if cli.drift.is_finite() { cli.drift.max(0.0) } else { 0.0 },
        }
    }

    /// Each explicit dimension wins on its own; the rest comes from the terminal, minus one row
    /// so the last line never scrolls.
    pub fn frame_size_for(&self, cols: u16, rows: u16) -> (usize, usize) {
        let w = self.width.unwrap_or(cols).max(1);
        let h = self.height.unwrap_or(rows.saturating_sub(1)).max(1);
        (w as usize, h as usize)
    }
}
