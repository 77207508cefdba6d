//! Per-file base metrics and the project complexity distribution

use crate::analyzer::{FileMetrics, ScalaAnalyzer, SourceAnalyzer};
use crate::discovery::SourceFile;
use crate::distribution::MetricDistribution;
use crate::encoding::{read_source, Encoding};
use crate::measures::{Measure, MeasureSink, MetricKey, Scope};
use crate::sensor::{Capability, ProjectContext, Sensor};

/// What one pass over the eligible files produced
#[derive(Debug, Default)]
pub struct BaseMetricsSummary {
    pub files: usize,
    pub unreadable: usize,
    /// Merged distribution of every readable file, `None` when no file was read
    pub function_complexity: Option<MetricDistribution>,
}

/// Fold one file's distribution into the running project distribution.
pub fn merge_distributions(
    acc: Option<MetricDistribution>,
    next: MetricDistribution,
) -> Option<MetricDistribution> {
    Some(match acc {
        Some(acc) => acc.merged(&next),
        None => next,
    })
}

/// Measure every file and publish per-file measures, then the project-wide
/// complexity distribution. An unreadable file is logged and still counted.
pub fn analyse<'f>(
    files: impl IntoIterator<Item = &'f SourceFile>,
    encoding: Encoding,
    analyzer: &dyn SourceAnalyzer,
    sink: &mut dyn MeasureSink,
) -> BaseMetricsSummary {
    let mut summary = BaseMetricsSummary::default();

    for file in files {
        summary.files += 1;
        let scope = Scope::File(file.path.clone());
        publish(sink, Measure::count(scope.clone(), MetricKey::FileCount, 1));

        let source = match read_source(&file.path, encoding) {
            Ok(source) => source,
            Err(e) => {
                tracing::error!("Unable to analyse file {}: {e}", file.path.display());
                summary.unreadable += 1;
                continue;
            }
        };

        let metrics = analyzer.analyze(&source);
        tracing::debug!(
            "{}: {} lines, {} loc, complexity {}",
            file.path.display(),
            metrics.lines,
            metrics.lines_of_code,
            metrics.complexity
        );
        publish_file_metrics(sink, &scope, &metrics);
        summary.function_complexity =
            merge_distributions(summary.function_complexity.take(), metrics.function_complexity);
    }

    if let Some(dist) = &summary.function_complexity {
        let measure =
            Measure::distribution(Scope::Project, MetricKey::ComplexityDistribution, dist.clone());
        publish(sink, measure);
    }
    summary
}

fn publish_file_metrics(sink: &mut dyn MeasureSink, scope: &Scope, m: &FileMetrics) {
    let counts = [
        (MetricKey::TotalLines, m.lines),
        (MetricKey::LinesOfCode, m.lines_of_code),
        (MetricKey::CommentLines, m.comment_lines),
        (MetricKey::ClassCount, m.classes),
        (MetricKey::StatementCount, m.statements),
        (MetricKey::FunctionCount, m.functions),
        (MetricKey::ComplexityScore, m.complexity),
        (MetricKey::PublicApiCount, m.public_api),
        (MetricKey::UndocumentedPublicApiCount, m.undocumented_public_api),
    ];
    for (metric, value) in counts {
        publish(sink, Measure::count(scope.clone(), metric, value as f64));
    }
}

/// Save a measure; a rejected measure is logged and dropped.
pub(crate) fn publish(sink: &mut dyn MeasureSink, measure: Measure) {
    if let Err(e) = sink.save(measure) {
        tracing::warn!("{e}");
    }
}

/// Runs [`analyse`] over the project's eligible files.
pub struct BaseMetricsSensor;

impl Sensor for BaseMetricsSensor {
    fn name(&self) -> &str {
        "base-metrics"
    }

    fn provides(&self) -> &[Capability] {
        &[Capability::BaseMetrics]
    }

    fn analyse(&self, ctx: &ProjectContext, sink: &mut dyn MeasureSink) {
        let analyzer = ScalaAnalyzer::new(&ctx.config.function_limits);
        let summary = analyse(ctx.eligible_files(), ctx.config.encoding, &analyzer, sink);
        tracing::info!("Measured {} files ({} unreadable)", summary.files, summary.unreadable);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{FileType, Language};
    use crate::measures::MeasureStore;
    use std::fs;
    use tempfile::TempDir;

    fn scala(path: std::path::PathBuf) -> SourceFile {
        SourceFile::new(path, Language::Scala, FileType::Main)
    }

    #[test]
    fn test_merge_distributions_first_initializes() {
        let d = MetricDistribution::from_values(&[1, 2], [1]);
        assert_eq!(merge_distributions(None, d.clone()), Some(d.clone()));
        let merged = merge_distributions(Some(d.clone()), d).unwrap();
        assert_eq!(merged.count(1), 2);
    }

    #[test]
    fn test_unreadable_file_still_counted() {
        let tmp = TempDir::new().unwrap();
        let good = tmp.path().join("Good.scala");
        fs::write(&good, "object Good {\n  def f = 1\n}\n").unwrap();
        let files = vec![scala(good.clone()), scala(tmp.path().join("Missing.scala"))];

        let mut store = MeasureStore::new();
        let summary = analyse(&files, Encoding::Utf8, &ScalaAnalyzer::new(&[1, 2]), &mut store);

        assert_eq!(summary.files, 2);
        assert_eq!(summary.unreadable, 1);
        assert_eq!(store.sum_over_files(MetricKey::FileCount), 2.0);
        assert!(store.file_value(&tmp.path().join("Missing.scala"), MetricKey::LinesOfCode).is_none());
        assert_eq!(store.file_value(&good, MetricKey::LinesOfCode).and_then(|v| v.as_count()), Some(3.0));
        let project = store
            .project_value(MetricKey::ComplexityDistribution)
            .and_then(|v| v.as_distribution());
        assert_eq!(project.map(MetricDistribution::total), Some(1));
        assert!(
            store.file_value(&good, MetricKey::ComplexityDistribution).is_none(),
            "the distribution is a project measure only"
        );
    }

    #[test]
    fn test_no_readable_files_publishes_no_project_distribution() {
        let tmp = TempDir::new().unwrap();
        let files = vec![scala(tmp.path().join("Nope.scala"))];
        let mut store = MeasureStore::new();
        let summary = analyse(&files, Encoding::Utf8, &ScalaAnalyzer::new(&[1]), &mut store);
        assert!(summary.function_complexity.is_none());
        assert!(store.project_value(MetricKey::ComplexityDistribution).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_empty_file_set_publishes_nothing() {
        let mut store = MeasureStore::new();
        let summary = analyse(&Vec::<SourceFile>::new(), Encoding::Utf8, &ScalaAnalyzer::new(&[1]), &mut store);
        assert_eq!(summary.files, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_sensor_uses_eligible_files_only() {
        let tmp = TempDir::new().unwrap();
        let main = tmp.path().join("Main.scala");
        let spec = tmp.path().join("MainSpec.scala");
        fs::write(&main, "object Main").unwrap();
        fs::write(&spec, "class MainSpec").unwrap();
        let files = vec![scala(main.clone()), SourceFile::new(spec.clone(), Language::Scala, FileType::Test)];
        let ctx = ProjectContext::new(tmp.path(), files, crate::config::Config::default());

        let mut store = MeasureStore::new();
        BaseMetricsSensor.analyse(&ctx, &mut store);
        assert!(store.file_value(&main, MetricKey::ClassCount).is_some());
        assert!(store.file_value(&spec, MetricKey::FileCount).is_none());
    }
}
