//! Re-exports of the public surface.

pub use crate::convert::Conversion;
pub use crate::data_structs::enums::{
    Context,
    Strand,
};
pub use crate::data_structs::session::{
    ConvertOptions,
    Session,
};
pub use crate::io::compression::Compression;
pub use crate::io::report::{
    converted_file_name,
    load_samples,
    read_report,
    OutputType,
    ReportType,
    ReportWriter,
};
pub use crate::report::{
    coverage_cutoff_counts,
    render_coverage_plot,
    render_report,
    MethylationSummary,
    PcaAnalysis,
};
pub use crate::utils::pearson_r;
