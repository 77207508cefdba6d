//! Measures published by sensors
//!
//! A [`Measure`] binds a [`MetricKey`] to a value at a [`Scope`]: the whole
//! project or one file. Sensors hand measures to a [`MeasureSink`];
//! [`MeasureStore`] is the in-memory sink the CLI reports from.

use crate::distribution::MetricDistribution;
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricKey {
    FileCount,
    TotalLines,
    LinesOfCode,
    CommentLines,
    ClassCount,
    StatementCount,
    FunctionCount,
    ComplexityScore,
    ComplexityDistribution,
    PublicApiCount,
    UndocumentedPublicApiCount,
    TestsRun,
    TestsFailed,
    TestsErrored,
    TestsSkipped,
    /// Milliseconds
    TestsDuration,
}

impl MetricKey {
    pub const ALL: &'static [MetricKey] = &[
        Self::FileCount,
        Self::TotalLines,
        Self::LinesOfCode,
        Self::CommentLines,
        Self::ClassCount,
        Self::StatementCount,
        Self::FunctionCount,
        Self::ComplexityScore,
        Self::ComplexityDistribution,
        Self::PublicApiCount,
        Self::UndocumentedPublicApiCount,
        Self::TestsRun,
        Self::TestsFailed,
        Self::TestsErrored,
        Self::TestsSkipped,
        Self::TestsDuration,
    ];

    pub const fn key(&self) -> &'static str {
        match self {
            Self::FileCount => "file-count",
            Self::TotalLines => "total-lines",
            Self::LinesOfCode => "lines-of-code",
            Self::CommentLines => "comment-lines",
            Self::ClassCount => "class-count",
            Self::StatementCount => "statement-count",
            Self::FunctionCount => "function-count",
            Self::ComplexityScore => "complexity-score",
            Self::ComplexityDistribution => "complexity-distribution",
            Self::PublicApiCount => "public-api-count",
            Self::UndocumentedPublicApiCount => "undocumented-public-api-count",
            Self::TestsRun => "tests-run",
            Self::TestsFailed => "tests-failed",
            Self::TestsErrored => "tests-errored",
            Self::TestsSkipped => "tests-skipped",
            Self::TestsDuration => "tests-duration",
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase", tag = "scope", content = "path")]
pub enum Scope {
    Project,
    File(PathBuf),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project => f.write_str("<project>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MeasureValue {
    Count(f64),
    Distribution(MetricDistribution),
}

impl MeasureValue {
    pub fn as_count(&self) -> Option<f64> {
        match self {
            Self::Count(v) => Some(*v),
            Self::Distribution(_) => None,
        }
    }

    pub fn as_distribution(&self) -> Option<&MetricDistribution> {
        match self {
            Self::Distribution(d) => Some(d),
            Self::Count(_) => None,
        }
    }
}

impl fmt::Display for MeasureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(v) if v.fract() == 0.0 => write!(f, "{v:.0}"),
            Self::Count(v) => write!(f, "{v}"),
            Self::Distribution(d) => write!(f, "{d}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measure {
    #[serde(flatten)]
    pub scope: Scope,
    pub metric: MetricKey,
    pub value: MeasureValue,
}

impl Measure {
    pub fn count(scope: Scope, metric: MetricKey, value: impl Into<f64>) -> Self {
        Self { scope, metric, value: MeasureValue::Count(value.into()) }
    }

    pub fn distribution(scope: Scope, metric: MetricKey, value: MetricDistribution) -> Self {
        Self { scope, metric, value: MeasureValue::Distribution(value) }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum MeasureError {
    #[error("measure {metric} already saved for {scope}")]
    Duplicate { scope: Scope, metric: MetricKey },
}

/// Destination for measures. Each (scope, metric) pair may be saved once.
pub trait MeasureSink {
    fn save(&mut self, measure: Measure) -> Result<(), MeasureError>;
}

/// In-memory sink, kept in save order and indexed by (scope, metric).
#[derive(Debug, Default)]
pub struct MeasureStore {
    measures: Vec<Measure>,
    index: HashMap<(Scope, MetricKey), usize>,
}

impl MeasureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }

    pub fn len(&self) -> usize {
        self.measures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measures.is_empty()
    }

    pub fn get(&self, scope: &Scope, metric: MetricKey) -> Option<&MeasureValue> {
        let &i = self.index.get(&(scope.clone(), metric))?;
        Some(&self.measures[i].value)
    }

    pub fn project_value(&self, metric: MetricKey) -> Option<&MeasureValue> {
        self.get(&Scope::Project, metric)
    }

    pub fn file_value(&self, path: &Path, metric: MetricKey) -> Option<&MeasureValue> {
        self.get(&Scope::File(path.to_path_buf()), metric)
    }

    /// Sum of a count metric over every file-scoped measure.
    pub fn sum_over_files(&self, metric: MetricKey) -> f64 {
        self.measures
            .iter()
            .filter(|m| m.metric == metric && matches!(m.scope, Scope::File(_)))
            .filter_map(|m| m.value.as_count())
            .sum()
    }
}

impl MeasureSink for MeasureStore {
    fn save(&mut self, measure: Measure) -> Result<(), MeasureError> {
        match self.index.entry((measure.scope.clone(), measure.metric)) {
            Entry::Occupied(_) => {
                Err(MeasureError::Duplicate { scope: measure.scope, metric: measure.metric })
            }
            Entry::Vacant(slot) => {
                slot.insert(self.measures.len());
                self.measures.push(measure);
                Ok(())
            }
        }
    }
}
