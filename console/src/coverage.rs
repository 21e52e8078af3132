use std::path::PathBuf;

use bscope::prelude::*;
use clap::Args;

use crate::utils::check_inputs;

#[derive(Debug, Clone, Args)]
pub struct CoverageArgs {
    #[arg(required = true, help = "Paths of the caller output files.")]
    inputs: Vec<PathBuf>,

    #[clap(short = 'f', long = "from", value_enum, default_value_t = ReportType::BsSnper)]
    from_type: ReportType,

    #[arg(
        short = 'n',
        long = "names",
        required = true,
        num_args = 1..,
        help = "Sample names, one per input, in input order."
    )]
    sample_names: Vec<String>,

    #[arg(short = 'e', long, required = true, help = "Experiment name.")]
    experiment: String,

    #[clap(short = 'c', long, value_enum, default_value_t = Context::CG)]
    context: Context,

    #[arg(
        short = 'o',
        long,
        required = true,
        help = "Directory for the generated plot."
    )]
    output_dir: PathBuf,

    #[clap(short = 'F', long = "from-compression", value_enum, default_value_t = Compression::None)]
    from_compression: Compression,

    #[arg(long, default_value_t = 1, help = "Lowest coverage cut-off.")]
    min: u32,

    #[arg(long, default_value_t = 20, help = "Highest coverage cut-off.")]
    max: u32,
}

impl CoverageArgs {
    pub fn run(&self) -> anyhow::Result<()> {
        check_inputs(&self.inputs, &self.output_dir)?;

        if self.min > self.max {
            anyhow::bail!(
                "coverage cut-off range is empty: {} > {}",
                self.min,
                self.max
            );
        }

        let session = Session::try_new(
            self.inputs.clone(),
            self.from_type,
            self.sample_names.clone(),
            self.experiment.clone(),
            self.context,
            self.from_compression,
        )?;

        session.coverage_plot(&self.output_dir, (self.min, self.max))?;
        Ok(())
    }
}
