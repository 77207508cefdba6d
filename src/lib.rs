//! scalasense - base metrics and test-report ingestion for Scala projects

// Shared modules
pub mod cli_output;
pub mod config;
pub mod defaults;
pub mod discovery;
pub mod encoding;
pub mod measures;
pub mod sensor;

// Source analysis
pub mod analyzer;
pub mod base_metrics;
pub mod comments;
pub mod distribution;
pub mod lexer;
pub mod lines;
pub mod scala_metrics;

// Test reports
pub mod report_locator;
pub mod surefire;
pub mod test_results;

// Re-export main types and functions for easy access
pub use analyzer::{FileMetrics, ScalaAnalyzer, SourceAnalyzer};
pub use base_metrics::{analyse, merge_distributions, BaseMetricsSensor, BaseMetricsSummary};
pub use config::{Config, Settings};
pub use defaults::default_config_toml;
pub use discovery::{find_source_files, FileType, Language, SourceFile};
pub use distribution::MetricDistribution;
pub use encoding::{read_source, Encoding, SourceReadError};
pub use lines::{CodeLines, LineClassifier};
pub use measures::{
    Measure, MeasureError, MeasureSink, MeasureStore, MeasureValue, MetricKey, Scope,
};
pub use report_locator::{
    default_reports_dir, resolve_reports_dir, resolve_reports_dir_with, LexicalResolver,
    PathResolutionError, PathResolver,
};
pub use sensor::{Capability, ProjectContext, Schedule, ScheduleError, Sensor};
pub use surefire::{
    ReportParseError, ReportParser, SurefireParser, TestCounts, TestReport, TestStatus,
};
pub use test_results::{collect, AggregatedTestResult, SurefireSensor};
