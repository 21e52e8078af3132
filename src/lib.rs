//! # bscope
//!
//! `bscope` converts bisulfite sequencing methylation caller output into the
//! input tables expected by the two common downstream analysis packages, and
//! renders a visual quality report for a whole experiment.
//!
//! Supported input formats are the BS-SNPer methylation output (per-strand
//! coverage, methylated counts and quality columns) and the Bismark
//! `.cov` coverage report. Supported output schemas are methylKit and DSS.
//! Conversion applies a minimum read coverage filter, drops sites without
//! methylation information and writes sorted, optionally compressed
//! tab-separated files with a deterministic naming scheme.
//!
//! ## Structure
//!
//! * [`data_structs`]: cytosine context and strand enums, and the [`Session`]
//!   value holding the loaded samples and experiment metadata.
//! * [`io`]: report format descriptors, the loader, the writer and the
//!   compression codecs.
//! * [`convert`]: the per-sample conversion strategies.
//! * [`report`]: the cross-sample methylation summary and the plotly report.
//! * [`utils`]: shared polars and statistics helpers.
//!
//! ## Usage
//!
//! ```no_run
//! use bscope::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let session = Session::try_new(
//!         vec!["wt_rep1.tsv".into(), "wt_rep2.tsv".into()],
//!         ReportType::BsSnper,
//!         vec!["wt_rep1".to_string(), "wt_rep2".to_string()],
//!         "wt".to_string(),
//!         Context::CG,
//!         Compression::None,
//!     )?;
//!
//!     let options = ConvertOptions::new(OutputType::Dss, "results/".into())
//!         .with_min_coverage(10)
//!         .with_compression(Compression::Gzip);
//!     session.convert(&options)?;
//!     Ok(())
//! }
//! ```
//!
//! [`Session`]: data_structs::session::Session

pub mod convert;
pub mod data_structs;
pub mod io;
pub mod prelude;
pub mod report;
pub mod utils;

#[allow(unused_imports)]
use prelude::*;
