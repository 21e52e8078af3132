use std::fs::File;
use std::io::{
    Read,
    Write,
};
use std::path::PathBuf;

use assert_approx_eq::assert_approx_eq;
use bscope::prelude::*;

const BSSNPER_CG: &str = "#CHROM\tPOS\tCONTEXT\tWatson-METH\tWatson-COVERAGE\tWatson-QUAL\tCrick-METH\tCrick-COVERAGE\tCrick-QUAL\n\
    chr2\t50\tCG\t1\t5\t20.0\t0\t8\t22.0\n\
    chr1\t100\tCG\t4\t20\t30.0\t2\t10\t31.0\n\
    chr1\t250\tCG\t.\t.\t.\t5\t8\t28.5\n";

const BISMARK_COV: &str = "chr1\t100\t101\t50.0\t5\t5\n\
    chr2\t300\t301\t25.0\t1\t3\n";

fn write_input(
    dir: &tempfile::TempDir,
    name: &str,
    content: &str,
) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn bssnper_to_methylkit_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, "sample.tsv", BSSNPER_CG);

    let session = Session::try_new(
        vec![input],
        ReportType::BsSnper,
        vec!["s1".to_string()],
        "exp".to_string(),
        Context::CG,
        Compression::None,
    )
    .unwrap();

    let options = ConvertOptions::new(OutputType::MethylKit, dir.path().into())
        .with_min_coverage(10)
        .with_compression(Compression::None)
        .with_report(false);
    let converted = session.convert(&options).unwrap();
    assert_eq!(converted.len(), 1);

    let expected = dir.path().join(
        "s1_CG_(minCov10)_methylkit_format_BScope_BS_conversion_output.tsv",
    );
    let written = std::fs::read_to_string(&expected).unwrap();
    let rows: Vec<Vec<&str>> = written
        .lines()
        .map(|line| line.split('\t').collect())
        .collect();

    // only chr1:100 passes on both strands; output is sorted by position
    // and carries no header for methylKit
    assert_eq!(rows.len(), 2);

    let watson = &rows[0];
    assert_eq!(&watson[0..4], &["chr1", "100", "+", "CG"]);
    assert_eq!(watson[4].parse::<u32>().unwrap(), 4);
    assert_eq!(watson[5].parse::<u32>().unwrap(), 16);
    assert_eq!(watson[6].parse::<u32>().unwrap(), 20);
    assert_approx_eq!(watson[7].parse::<f64>().unwrap(), 20.0);
    assert_approx_eq!(watson[8].parse::<f64>().unwrap(), 30.0);

    let crick = &rows[1];
    // symmetric context shifts the Crick cytosine one base downstream
    assert_eq!(&crick[0..4], &["chr1", "101", "-", "CG"]);
    assert_eq!(crick[6].parse::<u32>().unwrap(), 10);
    assert_approx_eq!(crick[7].parse::<f64>().unwrap(), 20.0);
}

#[test]
fn bismark_to_dss_gzip_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, "sample.cov", BISMARK_COV);

    let session = Session::try_new(
        vec![input],
        ReportType::BismarkCov,
        vec!["s1".to_string()],
        "exp".to_string(),
        Context::CG,
        Compression::None,
    )
    .unwrap();

    let options = ConvertOptions::new(OutputType::Dss, dir.path().into())
        .with_min_coverage(10)
        .with_compression(Compression::Gzip)
        .with_report(false);
    session.convert(&options).unwrap();

    let expected = dir.path().join(
        "s1_CG_(minCov10)_DSS_format_BScope_BS_conversion_output.tsv.gz",
    );
    assert!(expected.exists());

    let mut decoded = String::new();
    flate2::read::GzDecoder::new(File::open(&expected).unwrap())
        .read_to_string(&mut decoded)
        .unwrap();

    let lines: Vec<&str> = decoded.lines().collect();
    // DSS output always carries a header; the chr2 site has coverage 4 and
    // falls below the cut-off
    assert_eq!(lines, vec!["chr\tpos\tN\tX", "chr1\t100\t10\t5"]);
}

#[test]
fn bismark_to_methylkit_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(&dir, "sample.cov", BISMARK_COV);

    let session = Session::try_new(
        vec![input],
        ReportType::BismarkCov,
        vec!["s1".to_string()],
        "exp".to_string(),
        Context::CG,
        Compression::None,
    )
    .unwrap();

    let options =
        ConvertOptions::new(OutputType::MethylKit, dir.path().into())
            .with_report(false);
    let err = session.convert(&options).unwrap_err();
    assert!(err.to_string().contains("already compatible"));

    // the unsupported pairing fails before any output file is written
    assert!(std::fs::read_dir(dir.path())
        .unwrap()
        .flatten()
        .all(|entry| entry.file_name() == "sample.cov"));
}

#[test]
fn gzipped_input_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.cov.gz");
    let mut encoder = flate2::write::GzEncoder::new(
        File::create(&path).unwrap(),
        flate2::Compression::default(),
    );
    encoder.write_all(BISMARK_COV.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let session = Session::try_new(
        vec![path],
        ReportType::BismarkCov,
        vec!["s1".to_string()],
        "exp".to_string(),
        Context::CG,
        Compression::Gzip,
    )
    .unwrap();

    assert_eq!(session.samples().len(), 1);
    assert_eq!(session.samples()[0].0.height(), 2);
}
