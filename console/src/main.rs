mod convert;
mod coverage;
mod utils;

use clap::{
    Parser,
    Subcommand,
};
use convert::ConvertArgs;
use coverage::CoverageArgs;
use utils::UtilsArgs;
use wild::ArgsOs;

#[derive(Parser, Debug)]
#[command(
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None,)]
struct Cli {
    #[command(subcommand)]
    command: MainMenu,
}

#[derive(Subcommand, Debug)]
enum MainMenu {
    /// Convert caller output into methylKit or DSS tables
    Convert {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  ConvertArgs,
    },

    /// Plot cytosine counts per coverage cut-off to pick a threshold
    Coverage {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  CoverageArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let args: ArgsOs = wild::args_os();
    let cli = Cli::parse_from(args);

    match cli.command {
        MainMenu::Convert { utils, args } => {
            utils.setup()?;
            args.run()?;
        },
        MainMenu::Coverage { utils, args } => {
            utils.setup()?;
            args.run()?;
        },
    }
    Ok(())
}
