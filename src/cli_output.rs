//! CLI output formatting functions

use crate::measures::{Measure, Scope};
use std::path::Path;

/// Project measures first, then file measures, each group in save order.
/// File paths are shown relative to `root` when they lie under it.
pub fn report_order(measures: &[Measure], root: &Path) -> Vec<Measure> {
    let (project, files): (Vec<&Measure>, Vec<&Measure>) =
        measures.iter().partition(|m| m.scope == Scope::Project);
    project
        .into_iter()
        .chain(files)
        .map(|m| {
            let mut m = m.clone();
            if let Scope::File(path) = &m.scope
                && let Ok(relative) = path.strip_prefix(root)
            {
                m.scope = Scope::File(relative.to_path_buf());
            }
            m
        })
        .collect()
}

pub fn format_text(measures: &[Measure]) -> String {
    if measures.is_empty() {
        return "NO MEASURES\n".to_string();
    }
    let mut out = String::new();
    for m in measures {
        let line = match &m.scope {
            Scope::Project => format!("PROJECT {} {}\n", m.metric, m.value),
            Scope::File(path) => format!("FILE {} {} {}\n", path.display(), m.metric, m.value),
        };
        out.push_str(&line);
    }
    out
}

pub fn format_json(measures: &[Measure]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(measures)
}

pub fn print_no_files_message(root: &Path) {
    eprintln!("No Scala files in {}", root.display());
}
