//! Locating the test-report directory

use crate::config::Settings;
use crate::defaults::reports::{DEFAULT_REPORTS_DIR, REPORTS_PATH_KEY};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathResolutionError {
    #[error("path is empty")]
    Empty,
    #[error("path contains a NUL byte")]
    NulByte,
    #[error("path escapes the file system root")]
    EscapesRoot,
}

/// Turns a configured path into a file system path relative to a base dir
pub trait PathResolver {
    fn relative_file(&self, base: &Path, path: &str) -> Result<PathBuf, PathResolutionError>;
}

/// Resolves without touching the file system: absolute paths are taken as is,
/// relative paths are joined to the base, and `.`/`..` are folded away.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalResolver;

impl PathResolver for LexicalResolver {
    fn relative_file(&self, base: &Path, path: &str) -> Result<PathBuf, PathResolutionError> {
        if path.trim().is_empty() {
            return Err(PathResolutionError::Empty);
        }
        if path.contains('\0') {
            return Err(PathResolutionError::NulByte);
        }
        let joined = base.join(path);
        let mut out = PathBuf::new();
        for component in joined.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => match out.components().next_back() {
                    Some(Component::Normal(_)) => {
                        out.pop();
                    }
                    Some(Component::RootDir | Component::Prefix(_)) => {
                        return Err(PathResolutionError::EscapesRoot);
                    }
                    _ => out.push(".."),
                },
                other => out.push(other),
            }
        }
        Ok(out)
    }
}

pub fn default_reports_dir(base: &Path) -> PathBuf {
    base.join(DEFAULT_REPORTS_DIR)
}

/// Report directory for a project: the configured path when it is set and
/// resolvable, the default convention otherwise. Existence is not checked.
pub fn resolve_reports_dir(settings: &Settings, base: &Path) -> PathBuf {
    resolve_reports_dir_with(&LexicalResolver, settings, base)
}

pub fn resolve_reports_dir_with(
    resolver: &dyn PathResolver,
    settings: &Settings,
    base: &Path,
) -> PathBuf {
    let configured = settings.get(REPORTS_PATH_KEY).map(str::trim).filter(|p| !p.is_empty());
    if let Some(path) = configured {
        match resolver.relative_file(base, path) {
            Ok(dir) => return dir,
            Err(e) => tracing::warn!(
                "Unable to resolve reports path '{path}' against {}: {e}; using default",
                base.display()
            ),
        }
    }
    default_reports_dir(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(value: &str) -> Settings {
        Settings::new().with(REPORTS_PATH_KEY, value)
    }

    #[test]
    fn test_default_when_unset_or_blank() {
        let base = Path::new("/work/proj");
        let expected = PathBuf::from("/work/proj/target/surefire-reports");
        assert_eq!(resolve_reports_dir(&Settings::new(), base), expected);
        assert_eq!(resolve_reports_dir(&settings(""), base), expected);
        assert_eq!(resolve_reports_dir(&settings("   "), base), expected);
    }

    #[test]
    fn test_configured_relative_path_wins() {
        let base = Path::new("/work/proj");
        assert_eq!(
            resolve_reports_dir(&settings("build/./test-results/../reports"), base),
            PathBuf::from("/work/proj/build/reports")
        );
    }

    #[test]
    fn test_configured_absolute_path_is_kept_even_if_missing() {
        let base = Path::new("/work/proj");
        assert_eq!(
            resolve_reports_dir(&settings("/no/such/dir"), base),
            PathBuf::from("/no/such/dir")
        );
    }

    #[test]
    fn test_unresolvable_falls_back_to_default() {
        let base = Path::new("/work");
        assert_eq!(
            resolve_reports_dir(&settings("../../../elsewhere"), base),
            PathBuf::from("/work/target/surefire-reports")
        );
        assert_eq!(
            resolve_reports_dir(&settings("bad\0path"), base),
            PathBuf::from("/work/target/surefire-reports")
        );
    }

    #[test]
    fn test_custom_resolver_errors_fall_back() {
        struct Failing;
        impl PathResolver for Failing {
            fn relative_file(&self, _: &Path, _: &str) -> Result<PathBuf, PathResolutionError> {
                Err(PathResolutionError::Empty)
            }
        }
        let base = Path::new("/p");
        assert_eq!(
            resolve_reports_dir_with(&Failing, &settings("reports"), base),
            default_reports_dir(base)
        );
    }

    #[test]
    fn test_lexical_resolver_relative_base() {
        let r = LexicalResolver;
        assert_eq!(r.relative_file(Path::new("proj"), "../out").unwrap(), PathBuf::from("out"));
        assert_eq!(r.relative_file(Path::new("."), "../out").unwrap(), PathBuf::from("../out"));
        assert_eq!(r.relative_file(Path::new("/"), ".."), Err(PathResolutionError::EscapesRoot));
    }
}
