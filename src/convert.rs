//! Per-sample conversion strategies.
//!
//! Every supported (input format, output schema) pair is one variant of
//! [`Conversion`], each transforming a loaded sample table into one output
//! table with a uniform signature. The pairing is resolved once per run, so
//! an unsupported combination fails before any file is touched.

use std::ops::Div;

use anyhow::bail;
use itertools::Itertools;
use log::debug;
use polars::prelude::*;

use crate::data_structs::enums::{
    Context,
    Strand,
};
use crate::io::report::{
    OutputType,
    ReportType,
};

/// A single "convert one sample" strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    BsSnperToMethylKit,
    BsSnperToDss,
    BismarkCovToDss,
}

impl Conversion {
    /// Resolves the strategy for an input format and a requested output
    /// schema.
    ///
    /// Requesting methylKit output for Bismark coverage input is refused:
    /// those files are already methylKit-compatible, and rewriting them here
    /// would only change their column layout relative to every converted
    /// methylKit file this tool produces.
    pub fn resolve(
        report_type: ReportType,
        output_type: OutputType,
    ) -> anyhow::Result<Self> {
        match (report_type, output_type) {
            (ReportType::BsSnper, OutputType::MethylKit) => {
                Ok(Conversion::BsSnperToMethylKit)
            },
            (ReportType::BsSnper, OutputType::Dss) => {
                Ok(Conversion::BsSnperToDss)
            },
            (ReportType::BismarkCov, OutputType::Dss) => {
                Ok(Conversion::BismarkCovToDss)
            },
            (ReportType::BismarkCov, OutputType::MethylKit) => {
                bail!(
                    "bismark coverage files are already compatible with \
                     methylKit, nothing to convert"
                )
            },
        }
    }

    /// Output schema this strategy produces.
    pub const fn output_type(&self) -> OutputType {
        match self {
            Conversion::BsSnperToMethylKit => OutputType::MethylKit,
            Conversion::BsSnperToDss | Conversion::BismarkCovToDss => {
                OutputType::Dss
            },
        }
    }

    /// Converts one loaded sample table.
    ///
    /// Rows below `min_coverage` and rows with missing methylation values
    /// are excluded; for BS-SNPer input both strands are emitted, the Crick
    /// position shifted one base downstream in the symmetric context.
    pub fn convert_sample(
        &self,
        df: &DataFrame,
        context: Context,
        min_coverage: u32,
    ) -> anyhow::Result<DataFrame> {
        debug!(
            "Converting sample with {:?}, min coverage {}",
            self, min_coverage
        );
        let output_type = self.output_type();

        let converted = match self {
            Conversion::BsSnperToMethylKit | Conversion::BsSnperToDss => {
                let watson = strand_exprs(
                    *self,
                    Strand::Watson,
                    col("position"),
                );
                // the complementary-strand cytosine of the symmetric context
                // sits one base downstream
                let crick_pos = if context.is_symmetric() {
                    col("position") + lit(1)
                } else {
                    col("position")
                };
                let crick = strand_exprs(*self, Strand::Crick, crick_pos);

                let frames = [watson, crick]
                    .into_iter()
                    .map(|exprs| {
                        df.clone()
                            .lazy()
                            .select(exprs)
                            .filter(
                                col(output_type.coverage_col())
                                    .gt_eq(lit(min_coverage)),
                            )
                            .drop_nulls(None)
                    })
                    .collect_vec();

                concat(frames, UnionArgs::default())?
            },
            Conversion::BismarkCovToDss => {
                df.clone()
                    .lazy()
                    .select([
                        col("chr"),
                        col("start").alias("pos"),
                        col("coverage").alias("N"),
                        col("count_m").alias("X"),
                    ])
                    .filter(col("N").gt_eq(lit(min_coverage)))
                    .drop_nulls(None)
            },
        };

        let result = converted
            .cast(output_type.hashmap(), true)
            .select(
                output_type
                    .col_names()
                    .iter()
                    .map(|s| col(*s))
                    .collect_vec(),
            )
            .collect()?;

        debug!(
            "Converted DataFrame shape: {}x{}",
            result.height(),
            result.width()
        );
        Ok(result)
    }
}

/// Source column names of one BS-SNPer strand.
struct StrandCols {
    count_m: &'static str,
    coverage: &'static str,
    quality: &'static str,
}

impl StrandCols {
    const fn of(strand: Strand) -> Self {
        match strand {
            Strand::Watson => StrandCols {
                count_m: "count_m_watson",
                coverage: "cov_watson",
                quality: "qual_watson",
            },
            Strand::Crick => StrandCols {
                count_m: "count_m_crick",
                coverage: "cov_crick",
                quality: "qual_crick",
            },
        }
    }
}

/// Projection of one BS-SNPer strand onto the requested output schema.
fn strand_exprs(
    conversion: Conversion,
    strand: Strand,
    position: Expr,
) -> Vec<Expr> {
    let cols = StrandCols::of(strand);
    let strand = lit(strand.to_string());
    match conversion.output_type() {
        OutputType::MethylKit => {
            vec![
                col("chr"),
                position.alias("pos"),
                strand.alias("strand"),
                col("context"),
                col(cols.count_m).alias("count-Meth(C)"),
                (col(cols.coverage) - col(cols.count_m))
                    .alias("count-unMeth(T)"),
                col(cols.coverage).alias("coverage"),
                (col(cols.count_m)
                    .cast(DataType::Float64)
                    .div(col(cols.coverage))
                    * lit(100.0))
                .alias("freq_Meth"),
                col(cols.quality).alias("quality"),
            ]
        },
        OutputType::Dss => {
            vec![
                col("chr"),
                position.alias("pos"),
                col(cols.coverage).alias("N"),
                col(cols.count_m).alias("X"),
            ]
        },
    }
}
