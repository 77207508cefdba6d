//! Surefire / JUnit XML test reports
//!
//! A report file holds either one `<testsuite>` or a `<testsuites>` element
//! wrapping several. Suite attributes carry the counts; when one is missing it
//! is derived from the suite's `<testcase>` children.
//!
//! ```xml
//! <testsuite name="demo.CalcSpec" tests="2" failures="1" errors="0" skipped="0" time="0.12">
//!   <testcase name="adds" classname="demo.CalcSpec" time="0.05"/>
//!   <testcase name="divides" classname="demo.CalcSpec" time="0.07">
//!     <failure message="expected 2"/>
//!   </testcase>
//! </testsuite>
//! ```

use crate::defaults::reports::{REPORT_FILE_EXTENSION, REPORT_FILE_PREFIX};
use quick_xml::de::from_str;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use std::io;
use std::ops::AddAssign;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportParseError {
    #[error("could not read report: {0}")]
    Io(#[from] io::Error),
    #[error("malformed XML: {0}")]
    Xml(String),
    #[error("no root element")]
    Empty,
    #[error("unexpected root element <{0}>")]
    UnexpectedRoot(String),
    #[error("attribute {attribute}=\"{value}\" is not a valid number")]
    InvalidNumber { attribute: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestStatus {
    Passed,
    Failed,
    Errored,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub name: String,
    pub class_name: String,
    pub duration: Duration,
    pub status: TestStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestCounts {
    /// Every test in the suite, skipped ones included
    pub tests: u64,
    pub failures: u64,
    pub errors: u64,
    pub skipped: u64,
    pub duration: Duration,
}

/// Saturates instead of overflowing, so huge reports cannot abort the run.
impl AddAssign for TestCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.tests = self.tests.saturating_add(rhs.tests);
        self.failures = self.failures.saturating_add(rhs.failures);
        self.errors = self.errors.saturating_add(rhs.errors);
        self.skipped = self.skipped.saturating_add(rhs.skipped);
        self.duration = self.duration.saturating_add(rhs.duration);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSuite {
    pub name: String,
    pub counts: TestCounts,
    pub cases: Vec<TestCase>,
}

/// One parsed report file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestReport {
    pub path: PathBuf,
    pub suites: Vec<TestSuite>,
}

impl TestReport {
    pub fn counts(&self) -> TestCounts {
        let mut total = TestCounts::default();
        for suite in &self.suites {
            total += suite.counts;
        }
        total
    }
}

/// Finds and parses the report files of one report directory
pub trait ReportParser {
    /// Report files directly inside `dir`, in the order they should be read.
    fn report_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    fn parse(&self, path: &Path) -> Result<TestReport, ReportParseError>;
}

/// `TEST-*.xml` files, or every `*.xml` file when no file follows that naming.
#[derive(Debug, Clone, Copy, Default)]
pub struct SurefireParser;

impl ReportParser for SurefireParser {
    fn report_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut xml_files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {}: {e}", dir.display());
                    continue;
                }
            };
            // is_file follows symlinks
            if path.extension().is_some_and(|ext| ext == REPORT_FILE_EXTENSION) && path.is_file() {
                xml_files.push(path);
            }
        }
        let (mut named, mut others): (Vec<PathBuf>, Vec<PathBuf>) =
            xml_files.into_iter().partition(|p| {
                p.file_name()
                    .is_some_and(|n| n.to_string_lossy().starts_with(REPORT_FILE_PREFIX))
            });
        let files = if named.is_empty() {
            others.sort();
            others
        } else {
            named.sort();
            named
        };
        Ok(files)
    }

    fn parse(&self, path: &Path) -> Result<TestReport, ReportParseError> {
        let xml = std::fs::read_to_string(path)?;
        Ok(TestReport { path: path.to_path_buf(), suites: parse_suites(&xml)? })
    }
}

#[derive(Debug, Deserialize)]
struct SuitesXml {
    #[serde(rename = "testsuite", default)]
    suites: Vec<SuiteXml>,
}

#[derive(Debug, Deserialize)]
struct SuiteXml {
    #[serde(rename = "@name", default)]
    name: Option<String>,
    #[serde(rename = "@tests", default)]
    tests: Option<String>,
    #[serde(rename = "@failures", default)]
    failures: Option<String>,
    #[serde(rename = "@errors", default)]
    errors: Option<String>,
    #[serde(rename = "@skipped", default)]
    skipped: Option<String>,
    #[serde(rename = "@time", default)]
    time: Option<String>,
    #[serde(rename = "testcase", default)]
    cases: Vec<CaseXml>,
}

#[derive(Debug, Deserialize)]
struct CaseXml {
    #[serde(rename = "@name", default)]
    name: Option<String>,
    #[serde(rename = "@classname", default)]
    classname: Option<String>,
    #[serde(rename = "@time", default)]
    time: Option<String>,
    #[serde(default)]
    failure: Option<Outcome>,
    #[serde(default)]
    error: Option<Outcome>,
    #[serde(default)]
    skipped: Option<Outcome>,
}

#[derive(Debug, Deserialize)]
struct Outcome {
    #[serde(rename = "@message", default)]
    _message: Option<String>,
}

/// Parse the suites of one report document.
pub fn parse_suites(xml: &str) -> Result<Vec<TestSuite>, ReportParseError> {
    let raw = match root_element(xml)?.as_str() {
        "testsuite" => vec![from_str::<SuiteXml>(xml).map_err(xml_error)?],
        "testsuites" => from_str::<SuitesXml>(xml).map_err(xml_error)?.suites,
        other => return Err(ReportParseError::UnexpectedRoot(other.to_string())),
    };
    raw.into_iter().map(SuiteXml::into_suite).collect()
}

fn xml_error(e: quick_xml::de::DeError) -> ReportParseError {
    ReportParseError::Xml(e.to_string())
}

fn root_element(xml: &str) -> Result<String, ReportParseError> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => {
                return Ok(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            Ok(Event::Eof) => return Err(ReportParseError::Empty),
            Ok(_) => {}
            Err(e) => return Err(ReportParseError::Xml(e.to_string())),
        }
    }
}

impl SuiteXml {
    fn into_suite(self) -> Result<TestSuite, ReportParseError> {
        let cases = self
            .cases
            .into_iter()
            .map(CaseXml::into_case)
            .collect::<Result<Vec<_>, _>>()?;
        let with_status =
            |status: TestStatus| cases.iter().filter(|c| c.status == status).count() as u64;

        let counts = TestCounts {
            tests: parse_count("tests", self.tests.as_deref())?.unwrap_or(cases.len() as u64),
            failures: parse_count("failures", self.failures.as_deref())?
                .unwrap_or_else(|| with_status(TestStatus::Failed)),
            errors: parse_count("errors", self.errors.as_deref())?
                .unwrap_or_else(|| with_status(TestStatus::Errored)),
            skipped: parse_count("skipped", self.skipped.as_deref())?
                .unwrap_or_else(|| with_status(TestStatus::Skipped)),
            duration: parse_seconds("time", self.time.as_deref())?
                .unwrap_or_else(|| {
                    cases.iter().fold(Duration::ZERO, |acc, c| acc.saturating_add(c.duration))
                }),
        };
        Ok(TestSuite { name: self.name.unwrap_or_default(), counts, cases })
    }
}

impl CaseXml {
    fn into_case(self) -> Result<TestCase, ReportParseError> {
        let status = if self.error.is_some() {
            TestStatus::Errored
        } else if self.failure.is_some() {
            TestStatus::Failed
        } else if self.skipped.is_some() {
            TestStatus::Skipped
        } else {
            TestStatus::Passed
        };
        Ok(TestCase {
            name: self.name.unwrap_or_default(),
            class_name: self.classname.unwrap_or_default(),
            duration: parse_seconds("time", self.time.as_deref())?.unwrap_or_default(),
            status,
        })
    }
}

/// Surefire writes large numbers with `,` grouping, e.g. `1,234.5`.
fn normalize_number(value: &str) -> String {
    value.trim().replace(',', "")
}

fn parse_count(
    attribute: &'static str,
    value: Option<&str>,
) -> Result<Option<u64>, ReportParseError> {
    let Some(value) = value else { return Ok(None) };
    normalize_number(value)
        .parse::<u64>()
        .map(Some)
        .map_err(|_| ReportParseError::InvalidNumber { attribute, value: value.to_string() })
}

fn parse_seconds(
    attribute: &'static str,
    value: Option<&str>,
) -> Result<Option<Duration>, ReportParseError> {
    let Some(value) = value else { return Ok(None) };
    let invalid = || ReportParseError::InvalidNumber { attribute, value: value.to_string() };
    let secs = normalize_number(value).parse::<f64>().map_err(|_| invalid())?;
    Duration::try_from_secs_f64(secs).map(Some).map_err(|_| invalid())
}
