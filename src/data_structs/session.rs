use std::path::{
    Path,
    PathBuf,
};

use log::info;
use polars::prelude::DataFrame;

use crate::convert::Conversion;
use crate::data_structs::enums::Context;
use crate::io::compression::Compression;
use crate::io::report::{
    load_samples,
    OutputType,
    ReportType,
    ReportWriter,
};
use crate::report::{
    render_coverage_plot,
    render_report,
    MethylationSummary,
};

/// Options of one conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    output_type: OutputType,
    output_dir: PathBuf,
    min_coverage: u32,
    compression: Compression,
    compression_level: Option<u32>,
    header: bool,
    report: bool,
}

impl ConvertOptions {
    pub fn new(
        output_type: OutputType,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            output_type,
            output_dir,
            min_coverage: 1,
            compression: Compression::Gzip,
            compression_level: None,
            header: false,
            report: true,
        }
    }

    pub fn with_min_coverage(
        mut self,
        min_coverage: u32,
    ) -> Self {
        self.min_coverage = min_coverage;
        self
    }

    pub fn with_compression(
        mut self,
        compression: Compression,
    ) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_compression_level(
        mut self,
        compression_level: Option<u32>,
    ) -> Self {
        self.compression_level = compression_level;
        self
    }

    /// Include a header line in methylKit output. DSS output always
    /// carries one.
    pub fn with_header(
        mut self,
        header: bool,
    ) -> Self {
        self.header = header;
        self
    }

    pub fn with_report(
        mut self,
        report: bool,
    ) -> Self {
        self.report = report;
        self
    }

    pub fn output_type(&self) -> OutputType {
        self.output_type
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn min_coverage(&self) -> u32 {
        self.min_coverage
    }
}

/// One loaded experiment: sample tables plus the metadata they share.
///
/// A session is built once from validated inputs and never mutated;
/// conversion and report operations borrow it.
pub struct Session {
    samples: Vec<(DataFrame, String)>,
    report_type: ReportType,
    context: Context,
    experiment: String,
}

impl Session {
    /// Loads all inputs and validates them against the declared metadata.
    pub fn try_new(
        paths: Vec<PathBuf>,
        report_type: ReportType,
        sample_names: Vec<String>,
        experiment: String,
        context: Context,
        input_compression: Compression,
    ) -> anyhow::Result<Self> {
        let samples = load_samples(
            &paths,
            report_type,
            &sample_names,
            context,
            input_compression,
        )?;

        Ok(Self {
            samples,
            report_type,
            context,
            experiment,
        })
    }

    pub fn samples(&self) -> &[(DataFrame, String)] {
        &self.samples
    }

    pub fn report_type(&self) -> ReportType {
        self.report_type
    }

    pub fn context(&self) -> Context {
        self.context
    }

    pub fn experiment(&self) -> &str {
        &self.experiment
    }

    /// Converts every sample, writes the converted tables and renders the
    /// methylation report unless it was disabled.
    ///
    /// Returns the converted tables in input order.
    pub fn convert(
        &self,
        options: &ConvertOptions,
    ) -> anyhow::Result<Vec<DataFrame>> {
        let conversion =
            Conversion::resolve(self.report_type, options.output_type)?;

        let mut converted_tables = Vec::with_capacity(self.samples.len());
        for (df, name) in &self.samples {
            let converted = conversion.convert_sample(
                df,
                self.context,
                options.min_coverage,
            )?;

            let mut writer = ReportWriter::try_new(
                &options.output_dir,
                name,
                options.output_type,
                self.context,
                options.min_coverage,
                options.compression,
                options.compression_level,
                options.header,
            )?;
            writer.write_converted(&converted)?;
            writer.finish()?;

            converted_tables.push((converted, name.clone()));
        }

        if options.report {
            info!(
                "The output {} cytosine files are all done, preparing the \
                 visual report",
                self.report_type
            );
            let summary = MethylationSummary::try_new(
                &converted_tables,
                options.output_type,
            )?;
            let path = options.output_dir.join(format!(
                "{}_{}_BS_report.png",
                self.experiment, self.context
            ));
            render_report(&summary, self.context, &path)?;
        }

        Ok(converted_tables
            .into_iter()
            .map(|(df, _)| df)
            .collect())
    }

    /// Renders the coverage-cutoff diagnostic, used to pick a minimum
    /// coverage before converting.
    pub fn coverage_plot(
        &self,
        output_dir: &Path,
        coverage_lims: (u32, u32),
    ) -> anyhow::Result<PathBuf> {
        let path = output_dir.join(format!(
            "{}_{}_Coverage_plot.png",
            self.experiment, self.context
        ));
        render_coverage_plot(
            &self.samples,
            self.report_type,
            coverage_lims,
            &path,
        )?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_options_defaults() {
        let options =
            ConvertOptions::new(OutputType::Dss, PathBuf::from("out"));
        assert_eq!(options.min_coverage(), 1);
        assert_eq!(options.output_type(), OutputType::Dss);
        assert_eq!(options.compression, Compression::Gzip);
        assert!(options.report);
        assert!(!options.header);
    }
}
