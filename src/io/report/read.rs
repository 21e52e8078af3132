use std::fs::File;
use std::path::{
    Path,
    PathBuf,
};

use anyhow::{
    bail,
    Context as _,
};
use log::{
    debug,
    info,
};
use polars::io::mmap::MmapBytesReader;
use polars::prelude::*;

use crate::data_structs::enums::Context;
use crate::io::compression::Compression;
use crate::io::report::schema::ReportType;

/// Opens a report file, transparently inflating it when an input codec is
/// given.
fn get_file_handle(
    path: &Path,
    compression: Compression,
) -> anyhow::Result<Box<dyn MmapBytesReader>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open input file {}", path.display()))?;
    compression.get_decoder(file)
}

/// Reads a single caller output file into a DataFrame with the format's
/// canonical column names and dtypes.
pub fn read_report(
    path: &Path,
    report_type: ReportType,
    compression: Compression,
) -> anyhow::Result<DataFrame> {
    debug!(
        "Reading {} report from {}",
        report_type,
        path.display()
    );
    let handle = get_file_handle(path, compression)?;
    let df = report_type
        .read_options()
        .into_reader_with_file_handle(handle)
        .finish()
        .with_context(|| {
            format!(
                "failed to parse {} as a {} report",
                path.display(),
                report_type
            )
        })?;

    debug!("Read DataFrame of shape {}x{}", df.height(), df.width());
    Ok(df)
}

/// Checks the context recorded in a BS-SNPer file against the declared one.
///
/// The file's context is read from its first data row; every row of a
/// BS-SNPer file carries the same context, so one probe suffices.
fn validate_context(
    df: &DataFrame,
    declared: Context,
    path: &Path,
) -> anyhow::Result<()> {
    let recorded = df.column("context")?.str()?;
    let detected = recorded
        .first_non_null()
        .and_then(|idx| recorded.get(idx));

    match detected {
        Some(found) if found == declared.to_string() => Ok(()),
        Some(found) => {
            bail!(
                "cytosine context declared for the session ({}) and detected \
                 in {} ({}) don't match",
                declared,
                path.display(),
                found
            )
        },
        None => {
            bail!(
                "no cytosine context recorded in {}",
                path.display()
            )
        },
    }
}

/// Derives the total coverage column Bismark coverage files lack.
fn derive_coverage(df: DataFrame) -> PolarsResult<DataFrame> {
    df.lazy()
        .with_column((col("count_m") + col("count_um")).alias("coverage"))
        .collect()
}

/// Loads every sample of a session, in input order.
///
/// For BS-SNPer input the declared context must equal the context recorded
/// in each file; for Bismark coverage input the coverage column is derived.
pub fn load_samples(
    paths: &[PathBuf],
    report_type: ReportType,
    sample_names: &[String],
    context: Context,
    compression: Compression,
) -> anyhow::Result<Vec<(DataFrame, String)>> {
    if paths.len() != sample_names.len() {
        bail!(
            "{} input path(s) given but {} sample name(s); they must match \
             one to one",
            paths.len(),
            sample_names.len()
        );
    }

    let mut samples = Vec::with_capacity(paths.len());
    for (path, name) in paths.iter().zip(sample_names.iter()) {
        let df = read_report(path, report_type, compression)?;

        let df = match report_type {
            ReportType::BsSnper => {
                validate_context(&df, context, path)?;
                df
            },
            ReportType::BismarkCov => derive_coverage(df)?,
        };

        info!(
            "Loaded sample '{}' from {} ({} sites)",
            name,
            path.display(),
            df.height()
        );
        samples.push((df, name.clone()));
    }

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const BSSNPER_CG: &str = "#CHROM\tPOS\tCONTEXT\tWatson-METH\tWatson-COVERAGE\tWatson-QUAL\tCrick-METH\tCrick-COVERAGE\tCrick-QUAL\n\
        chr1\t100\tCG\t4\t20\t30.0\t2\t10\t31.0\n\
        chr1\t250\tCG\t.\t.\t.\t5\t8\t28.5\n";

    const BISMARK_COV: &str = "chr1\t100\t101\t50.0\t5\t5\n\
        chr2\t300\t301\t25.0\t1\t3\n";

    fn write_temp(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.tsv");
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn bssnper_loading_and_validation() {
        let (_dir, path) = write_temp(BSSNPER_CG);
        let samples = load_samples(
            &[path.clone()],
            ReportType::BsSnper,
            &["s1".to_string()],
            Context::CG,
            Compression::None,
        )
        .unwrap();

        assert_eq!(samples.len(), 1);
        let (df, name) = &samples[0];
        assert_eq!(name, "s1");
        assert_eq!(df.height(), 2);
        // the dot markers become nulls
        assert_eq!(df.column("count_m_watson").unwrap().null_count(), 1);

        let err = load_samples(
            &[path],
            ReportType::BsSnper,
            &["s1".to_string()],
            Context::CHH,
            Compression::None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("don't match"));
    }

    #[test]
    fn bismark_coverage_derivation() {
        let (_dir, path) = write_temp(BISMARK_COV);
        let samples = load_samples(
            &[path],
            ReportType::BismarkCov,
            &["s1".to_string()],
            Context::CG,
            Compression::None,
        )
        .unwrap();

        let (df, _) = &samples[0];
        let coverage: Vec<u32> = df
            .column("coverage")
            .unwrap()
            .u32()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(coverage, vec![10, 4]);
    }

    #[test]
    fn path_name_mismatch_is_fatal() {
        let (_dir, path) = write_temp(BISMARK_COV);
        let err = load_samples(
            &[path],
            ReportType::BismarkCov,
            &["a".to_string(), "b".to_string()],
            Context::CG,
            Compression::None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("one to one"));
    }
}
