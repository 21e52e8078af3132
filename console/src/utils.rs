use std::path::Path;

use clap::Args;
use console::style;

#[derive(Debug, Clone, Args)]
pub struct UtilsArgs {
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v info, -vv debug, -vvv trace)."
    )]
    verbose: u8,
}

impl UtilsArgs {
    pub fn setup(&self) -> anyhow::Result<()> {
        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        pretty_env_logger::formatted_builder()
            .filter_level(level)
            .try_init()?;
        Ok(())
    }
}

/// Pre-flight checks shared by the subcommands.
pub fn check_inputs(
    inputs: &[std::path::PathBuf],
    output_dir: &Path,
) -> anyhow::Result<()> {
    for input in inputs {
        if !input.exists() {
            anyhow::bail!(
                "input file {} not found",
                style(input.display()).red()
            );
        }
        if !input.is_file() {
            anyhow::bail!(
                "input path {} is not a file",
                style(input.display()).red()
            );
        }
    }
    if output_dir.exists() && !output_dir.is_dir() {
        anyhow::bail!(
            "output path {} is not a directory",
            style(output_dir.display()).red()
        );
    }
    if !output_dir.exists() {
        std::fs::create_dir_all(output_dir)?;
    }
    Ok(())
}
