use std::path::PathBuf;

use bscope::prelude::*;
use clap::Args;

use crate::utils::check_inputs;

#[derive(Debug, Clone, Args)]
pub struct ConvertArgs {
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

    #[clap(short = 't', long = "to", value_enum, default_value_t = OutputType::Dss)]
    to_type: OutputType,

    #[arg(
        short = 'm',
        long,
        default_value_t = 1,
        help = "Minimum read coverage a cytosine must reach to be kept."
    )]
    min_coverage: u32,

    #[arg(
        short = 'o',
        long,
        required = true,
        help = "Directory for the generated output files."
    )]
    output_dir: PathBuf,

    #[clap(short = 'C', long = "compression", value_enum, default_value_t = Compression::Gzip)]
    compression: Compression,

    #[clap(short = 'F', long = "from-compression", value_enum, default_value_t = Compression::None)]
    from_compression: Compression,

    #[clap(short = 'L', long = "level", required = false, default_value = None)]
    compression_level: Option<u32>,

    #[arg(
        long,
        default_value_t = false,
        help = "Write a header line into methylKit output."
    )]
    header: bool,

    #[arg(
        long,
        default_value_t = false,
        help = "Skip the visual methylation report."
    )]
    no_report: bool,
}

impl ConvertArgs {
    pub fn run(&self) -> anyhow::Result<()> {
        check_inputs(&self.inputs, &self.output_dir)?;

        let session = Session::try_new(
            self.inputs.clone(),
            self.from_type,
            self.sample_names.clone(),
            self.experiment.clone(),
            self.context,
            self.from_compression,
        )?;

        let options =
            ConvertOptions::new(self.to_type, self.output_dir.clone())
                .with_min_coverage(self.min_coverage)
                .with_compression(self.compression)
                .with_compression_level(self.compression_level)
                .with_header(self.header)
                .with_report(!self.no_report);

        session.convert(&options)?;
        Ok(())
    }
}
