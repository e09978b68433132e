pub mod graph_json;
pub mod report;

pub use graph_json::GraphJsonFormatter;
pub use report::ReportFormatter;
