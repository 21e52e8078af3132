use std::fmt::Display;
use std::str::FromStr;

use polars::prelude::*;

use crate::utils::{
    hashmap_from_arrays,
    schema_from_arrays,
};

/// Supported methylation caller output formats.
///
/// Each format has its own column structure that needs to be handled
/// differently during import and transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "console", derive(clap::ValueEnum))]
pub enum ReportType {
    /// BS-SNPer methylation output with per-strand counts and qualities
    #[cfg_attr(feature = "console", value(name = "bssnper"))]
    BsSnper,
    /// Bismark coverage report with methylated/unmethylated counts
    #[cfg_attr(feature = "console", value(name = "bismarkcov"))]
    BismarkCov,
}

impl FromStr for ReportType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bssnper" => Ok(ReportType::BsSnper),
            "bismarkcov" => Ok(ReportType::BismarkCov),
            other => {
                Err(anyhow::anyhow!(
                    "input type '{}' not supported, only supported types are \
                     \"bssnper\" and \"bismarkcov\"",
                    other
                ))
            },
        }
    }
}

impl Display for ReportType {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        let str = match self {
            ReportType::BsSnper => "bssnper",
            ReportType::BismarkCov => "bismarkcov",
        };
        write!(f, "{}", str)
    }
}

impl ReportType {
    /// Returns column names for this report format.
    pub const fn col_names(&self) -> &[&'static str] {
        match self {
            Self::BsSnper => {
                &[
                    "chr",
                    "position",
                    "context",
                    "count_m_watson",
                    "cov_watson",
                    "qual_watson",
                    "count_m_crick",
                    "cov_crick",
                    "qual_crick",
                ]
            },
            Self::BismarkCov => {
                &["chr", "start", "end", "density", "count_m", "count_um"]
            },
        }
    }

    /// Returns data types for each column.
    ///
    /// The order corresponds to the order of `col_names()`.
    pub const fn col_types(&self) -> &[DataType] {
        match self {
            Self::BsSnper => {
                &[
                    DataType::String,  // chr
                    DataType::UInt64,  // position
                    DataType::String,  // context
                    DataType::UInt32,  // count_m_watson
                    DataType::UInt32,  // cov_watson
                    DataType::Float64, // qual_watson
                    DataType::UInt32,  // count_m_crick
                    DataType::UInt32,  // cov_crick
                    DataType::Float64, // qual_crick
                ]
            },
            Self::BismarkCov => {
                &[
                    DataType::String,  // chr
                    DataType::UInt64,  // start
                    DataType::UInt64,  // end
                    DataType::Float64, // density
                    DataType::UInt32,  // count_m
                    DataType::UInt32,  // count_um
                ]
            },
        }
    }

    /// Returns the name of the context column if the format records one.
    pub const fn context_col(&self) -> Option<&'static str> {
        match self {
            Self::BsSnper => Some("context"),
            Self::BismarkCov => None,
        }
    }

    /// Creates a Polars Schema for this report format.
    pub fn schema(&self) -> Schema {
        schema_from_arrays(self.col_names(), self.col_types())
    }

    /// Creates CSV read options configured for this report format.
    pub fn read_options(&self) -> CsvReadOptions {
        log::debug!("Configuring CSV read options for {:?} format", self);
        let mut read_options = CsvReadOptions::default()
            .with_has_header(false)
            .with_schema(Some(SchemaRef::from(self.schema())))
            .with_parse_options({
                CsvParseOptions::default()
                    .with_separator(b'\t')
                    .with_try_parse_dates(false)
                    // BS-SNPer marks missing values with a dot
                    .with_null_values(Some(NullValues::AllColumnsSingle(
                        PlSmallStr::from("."),
                    )))
            });

        // The BS-SNPer output starts with a "#CHROM ..." header line
        if let Self::BsSnper = self {
            read_options = read_options.with_skip_rows(1);
        };

        read_options
    }
}

/// Output table schemas for the downstream analysis tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "console", derive(clap::ValueEnum))]
pub enum OutputType {
    /// methylKit-compatible table with strand, context and quality columns
    #[cfg_attr(feature = "console", value(name = "methylkit"))]
    MethylKit,
    /// DSS-compatible table with total (N) and methylated (X) counts
    #[cfg_attr(feature = "console", value(name = "dss"))]
    Dss,
}

impl FromStr for OutputType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "methylkit" => Ok(OutputType::MethylKit),
            "dss" => Ok(OutputType::Dss),
            other => {
                Err(anyhow::anyhow!(
                    "unrecognized output type '{}', only accepted values are \
                     \"methylkit\" or \"DSS\"",
                    other
                ))
            },
        }
    }
}

impl Display for OutputType {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl OutputType {
    /// Tag embedded in output file names.
    pub const fn tag(&self) -> &'static str {
        match self {
            OutputType::MethylKit => "methylkit",
            OutputType::Dss => "DSS",
        }
    }

    /// Returns column names for this output schema.
    pub const fn col_names(&self) -> &[&'static str] {
        match self {
            Self::MethylKit => {
                &[
                    "chr",
                    "pos",
                    "strand",
                    "context",
                    "count-Meth(C)",
                    "count-unMeth(T)",
                    "coverage",
                    "freq_Meth",
                    "quality",
                ]
            },
            Self::Dss => &["chr", "pos", "N", "X"],
        }
    }

    /// Returns data types for each column.
    pub const fn col_types(&self) -> &[DataType] {
        match self {
            Self::MethylKit => {
                &[
                    DataType::String,  // chr
                    DataType::UInt64,  // pos
                    DataType::String,  // strand
                    DataType::String,  // context
                    DataType::UInt32,  // count-Meth(C)
                    DataType::UInt32,  // count-unMeth(T)
                    DataType::UInt32,  // coverage
                    DataType::Float64, // freq_Meth
                    DataType::Float64, // quality
                ]
            },
            Self::Dss => {
                &[
                    DataType::String, // chr
                    DataType::UInt64, // pos
                    DataType::UInt32, // N
                    DataType::UInt32, // X
                ]
            },
        }
    }

    /// Name of the total coverage column in this schema.
    pub const fn coverage_col(&self) -> &'static str {
        match self {
            Self::MethylKit => "coverage",
            Self::Dss => "N",
        }
    }

    /// Name of the methylated count column in this schema.
    pub const fn count_m_col(&self) -> &'static str {
        match self {
            Self::MethylKit => "count-Meth(C)",
            Self::Dss => "X",
        }
    }

    /// Whether the written file must carry a header line.
    ///
    /// DSS refuses input without one; methylKit headers are optional and
    /// controlled by the caller.
    pub const fn requires_header(&self) -> bool {
        matches!(self, Self::Dss)
    }

    /// Creates a Polars Schema for this output format.
    pub fn schema(&self) -> Schema {
        schema_from_arrays(self.col_names(), self.col_types())
    }

    /// Creates a HashMap mapping column names to their data types.
    pub fn hashmap(&self) -> PlHashMap<&str, DataType> {
        hashmap_from_arrays(self.col_names(), self.col_types())
    }
}
