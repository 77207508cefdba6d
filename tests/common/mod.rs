#![allow(dead_code)]

use scalasense::{MeasureStore, MetricKey};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const MAIN_DIR: &str = "src/main/scala/demo";
pub const TEST_DIR: &str = "src/test/scala/demo";

pub fn fixture(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(relative)
}

/// A project with the two fixture sources under src/main and one spec under src/test.
pub fn scala_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let main = tmp.path().join(MAIN_DIR);
    let test = tmp.path().join(TEST_DIR);
    fs::create_dir_all(&main).unwrap();
    fs::create_dir_all(&test).unwrap();
    for name in ["Calculator.scala", "Shapes.scala"] {
        fs::copy(fixture(&format!("scala/{name}")), main.join(name)).unwrap();
    }
    fs::write(test.join("CalculatorSpec.scala"), "class CalculatorSpec {\n  def t = 1\n}\n").unwrap();
    tmp
}

/// Copy the fixture Surefire reports into `dir` (relative to the project), creating it.
pub fn add_reports(project: &Path, dir: &str) -> PathBuf {
    let reports = project.join(dir);
    fs::create_dir_all(&reports).unwrap();
    for name in ["TEST-demo.CalculatorSpec.xml", "TEST-demo.ShapesSpec.xml"] {
        fs::copy(fixture(&format!("surefire/{name}")), reports.join(name)).unwrap();
    }
    reports
}

pub fn project_count(store: &MeasureStore, metric: MetricKey) -> Option<f64> {
    store.project_value(metric).and_then(|v| v.as_count())
}

pub fn file_count(store: &MeasureStore, path: &Path, metric: MetricKey) -> Option<f64> {
    store.file_value(path, metric).and_then(|v| v.as_count())
}
