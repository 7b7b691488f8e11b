pub mod report;
pub mod visit;

pub use report::{ReportFilter, ReportParams, ReportQuery, ReportRow, SortColumn, SortDirection};
pub use visit::{IpHistoryRow, VisitRecord};
