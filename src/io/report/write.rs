use std::fs::File;
use std::io::Write;
use std::path::{
    Path,
    PathBuf,
};

use anyhow::anyhow;
use log::{
    debug,
    info,
};
use polars::io::csv::write::{
    BatchedWriter as BatchedCsvWriter,
    CsvWriter,
};
use polars::prelude::*;

use crate::data_structs::enums::Context;
use crate::io::compression::Compression;
use crate::io::report::schema::OutputType;

/// File-name stem every converted table is written under:
/// `{sample}_{context}_(minCov{n})_{tag}_format_BScope_BS_conversion_output.tsv`
/// plus the compression suffix.
pub fn converted_file_name(
    sample_name: &str,
    output_type: OutputType,
    context: Context,
    min_coverage: u32,
    compression: Compression,
) -> String {
    format!(
        "{}_{}_(minCov{})_{}_format_BScope_BS_conversion_output.tsv{}",
        sample_name,
        context,
        min_coverage,
        output_type.tag(),
        compression.extension()
    )
}

/// Writes converted report tables as sorted, optionally compressed TSV.
pub struct ReportWriter {
    writer: BatchedCsvWriter<Box<dyn Write>>,
    path: PathBuf,
}

impl ReportWriter {
    /// Creates a writer for one converted sample inside `output_dir`.
    ///
    /// `header` only affects methylKit output; DSS files always carry one.
    #[allow(clippy::too_many_arguments)]
    pub fn try_new(
        output_dir: &Path,
        sample_name: &str,
        output_type: OutputType,
        context: Context,
        min_coverage: u32,
        compression: Compression,
        compression_level: Option<u32>,
        header: bool,
    ) -> anyhow::Result<Self> {
        let file_name = converted_file_name(
            sample_name,
            output_type,
            context,
            min_coverage,
            compression,
        );
        let path = output_dir.join(&file_name);
        debug!("Creating ReportWriter for {}", path.display());

        let sink = File::create(&path)?;
        // the zip codec needs the uncompressed member name
        let entry_name = file_name
            .strip_suffix(compression.extension())
            .unwrap_or(&file_name);
        let sink =
            compression.get_encoder(sink, compression_level.unwrap_or(1), entry_name)?;

        let writer = CsvWriter::new(sink)
            .include_header(output_type.requires_header() || header)
            .with_separator(b'\t')
            .batched(&output_type.schema())
            .map_err(|e| anyhow!("failed to create batched CSV writer: {}", e))?;

        Ok(Self { writer, path })
    }

    /// Destination path of this writer.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sorts a converted table by chromosome and position and writes it.
    pub fn write_converted(
        &mut self,
        df: &DataFrame,
    ) -> anyhow::Result<()> {
        let mut sorted = df.sort(
            ["chr", "pos"],
            SortMultipleOptions::default().with_order_descending(false),
        )?;
        sorted.rechunk_mut();

        self.writer
            .write_batch(&sorted)
            .map_err(|e| anyhow!("failed to write batch: {}", e))
    }

    pub fn finish(mut self) -> anyhow::Result<()> {
        self.writer.finish().map_err(|e| anyhow!(e))?;
        info!("The output is saved at {}", self.path.display());
        Ok(())
    }
}
