use anyhow::Result;
use clap::Parser;
use orbitscope::config::{Cli, Settings};
use orbitscope::logger::FileLogger;

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(path) = &cli.log_file {
        FileLogger::init(path, cli.log_level)?;
    }
    let settings = Settings::from_cli(&cli);
    log::info!("starting with {:?}", settings);
    orbitscope::app::run(settings)
}
