//! Test-result aggregation over a report directory

use crate::base_metrics::publish;
use crate::discovery::Language;
use crate::measures::{Measure, MeasureSink, MetricKey, Scope};
use crate::report_locator::resolve_reports_dir;
use crate::sensor::{Capability, ProjectContext, Sensor};
use crate::surefire::{ReportParser, SurefireParser, TestCounts, TestReport};
use std::path::{Path, PathBuf};

/// Sum of every report that parsed, plus the files that did not
#[derive(Debug, Default)]
pub struct AggregatedTestResult {
    pub counts: TestCounts,
    pub reports: Vec<TestReport>,
    pub failed_files: Vec<PathBuf>,
}

impl AggregatedTestResult {
    fn add(&mut self, report: TestReport) {
        self.counts += report.counts();
        self.reports.push(report);
    }

    pub fn has_results(&self) -> bool {
        !self.reports.is_empty()
    }
}

/// Parse every report in `dir` and publish the summed counts once, as project
/// measures. A report that fails to parse is logged and contributes nothing.
/// A missing directory or one without reports publishes nothing.
pub fn collect(
    dir: &Path,
    parser: &dyn ReportParser,
    sink: &mut dyn MeasureSink,
) -> AggregatedTestResult {
    let mut result = AggregatedTestResult::default();
    if !dir.is_dir() {
        tracing::info!(
            "Reports directory {} not found, no test results to import",
            dir.display()
        );
        return result;
    }

    let files = match parser.report_files(dir) {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!("Unable to list reports in {}: {e}", dir.display());
            return result;
        }
    };
    if files.is_empty() {
        tracing::info!("No test reports in {}", dir.display());
        return result;
    }

    for file in files {
        match parser.parse(&file) {
            Ok(report) => result.add(report),
            Err(e) => {
                tracing::warn!("Skipping report {}: {e}", file.display());
                result.failed_files.push(file);
            }
        }
    }

    if result.has_results() {
        publish_counts(sink, &result.counts);
    }
    result
}

fn publish_counts(sink: &mut dyn MeasureSink, counts: &TestCounts) {
    let values = [
        (MetricKey::TestsRun, counts.tests as f64),
        (MetricKey::TestsFailed, counts.failures as f64),
        (MetricKey::TestsErrored, counts.errors as f64),
        (MetricKey::TestsSkipped, counts.skipped as f64),
        (MetricKey::TestsDuration, counts.duration.as_millis() as f64),
    ];
    for (metric, value) in values {
        publish(sink, Measure::count(Scope::Project, metric, value));
    }
}

/// Imports Surefire reports once coverage has been measured.
pub struct SurefireSensor;

impl Sensor for SurefireSensor {
    fn name(&self) -> &str {
        "surefire"
    }

    fn provides(&self) -> &[Capability] {
        &[Capability::TestResults]
    }

    fn depends_on(&self) -> &[Capability] {
        &[Capability::Coverage]
    }

    fn should_execute(&self, ctx: &ProjectContext) -> bool {
        ctx.has_language(Language::Scala)
    }

    fn analyse(&self, ctx: &ProjectContext, sink: &mut dyn MeasureSink) {
        let dir = resolve_reports_dir(&ctx.config.settings, &ctx.base_dir);
        tracing::info!("Parsing test reports in {}", dir.display());
        let result = collect(&dir, &SurefireParser, sink);
        tracing::info!(
            "Imported {} reports ({} unparseable): {} tests, {} failures",
            result.reports.len(),
            result.failed_files.len(),
            result.counts.tests,
            result.counts.failures
        );
    }
}
