//! Reading and writing of methylation report tables.

mod read;
mod schema;
mod write;

pub use read::{
    load_samples,
    read_report,
};
pub use schema::{
    OutputType,
    ReportType,
};
pub use write::{
    converted_file_name,
    ReportWriter,
};
