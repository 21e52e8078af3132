//! Cross-sample methylation summary and the visual report.

mod render;
mod summary;

pub use render::{
    render_coverage_plot,
    render_report,
};
pub use summary::{
    coverage_cutoff_counts,
    MethylationSummary,
    PcaAnalysis,
};
