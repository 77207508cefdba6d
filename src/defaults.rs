//! Fixed conventions and default configuration values

pub mod reports {
    /// Setting key that overrides the test-report directory.
    pub const REPORTS_PATH_KEY: &str = "sonar.junit.reportsPath";
    /// Report directory relative to the project base dir when no override is set.
    pub const DEFAULT_REPORTS_DIR: &str = "target/surefire-reports";
    pub const REPORT_FILE_PREFIX: &str = "TEST-";
    pub const REPORT_FILE_EXTENSION: &str = "xml";
}

pub mod complexity {
    /// Lower bounds of the function-complexity distribution buckets.
    pub const FUNCTION_LIMITS: &[u32] = &[1, 2, 4, 6, 8, 10, 12];
}

pub mod sources {
    pub const ENCODING: &str = "UTF-8";
    /// Path components that mark a file as test code.
    pub const TEST_DIRS: &[&str] = &["test", "tests", "it"];
    pub const CONFIG_FILE_NAME: &str = ".scalasense";
}

pub fn default_config_toml() -> String {
    let test_dirs = sources::TEST_DIRS
        .iter()
        .map(|d| format!("\"{d}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let limits = complexity::FUNCTION_LIMITS
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        r#"[sources]
encoding = "{encoding}"
test_dirs = [{test_dirs}]

[complexity]
function_limits = [{limits}]

[settings]
# "{key}" = "{reports_dir}"
"#,
        encoding = sources::ENCODING,
        key = reports::REPORTS_PATH_KEY,
        reports_dir = reports::DEFAULT_REPORTS_DIR,
    )
}
