//! File discovery and classification

use ignore::WalkBuilder;
use std::path::{Component, Path, PathBuf};

/// Languages recognized in a project tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Scala,
}

impl Language {
    /// Detect language from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension().and_then(|ext| if ext == "scala" { Some(Self::Scala) } else { None })
    }
}

/// Whether a file is production code or test code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Main,
    Test,
}

/// A discovered source file
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub language: Language,
    pub file_type: FileType,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, language: Language, file_type: FileType) -> Self {
        Self { path: path.into(), language, file_type }
    }

    /// Scala main code: the files the base-metrics pipeline measures.
    pub fn is_eligible(&self) -> bool {
        self.language == Language::Scala && self.file_type == FileType::Main
    }
}

/// Classify a path (relative to the project root) as main or test code.
pub fn classify(relative: &Path, test_dirs: &[String]) -> FileType {
    let in_test_dir = relative.parent().is_some_and(|dir| {
        dir.components().any(|c| match c {
            Component::Normal(name) => test_dirs.iter().any(|t| name == t.as_str()),
            _ => false,
        })
    });
    if in_test_dir { FileType::Test } else { FileType::Main }
}

/// Finds all Scala files under the given root directory, sorted by path.
/// Respects .gitignore rules automatically.
pub fn find_source_files(root: &Path, test_dirs: &[String]) -> Vec<SourceFile> {
    let mut files: Vec<SourceFile> = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .build()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .filter_map(|entry| {
            let path = entry.into_path();
            let language = Language::from_path(&path)?;
            let relative = path.strip_prefix(root).unwrap_or(&path);
            let file_type = classify(relative, test_dirs);
            Some(SourceFile { path, language, file_type })
        })
        .collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));
    files
}
