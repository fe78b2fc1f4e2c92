//! Lexical path normalization, adapted from the `path-clean` crate
//! (<https://github.com/danreeves/path-clean>, MIT).

use std::path::Component;
use std::path::PathBuf;

use camino::Utf8Component;
use camino::Utf8Path;
use camino::Utf8PathBuf;

/// Remove `.` segments and fold `..` into its parent without touching the disk.
#[must_use]
pub fn clean_utf8_path(path: &Utf8Path) -> Utf8PathBuf {
    let mut out = Vec::new();

    for comp in path.as_std_path().components() {
        match comp {
            Component::CurDir => (),
            Component::ParentDir => match out.last() {
                Some(Component::RootDir) => (),
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                None | Some(Component::CurDir | Component::ParentDir | Component::Prefix(_)) => {
                    out.push(comp);
                }
            },
            comp => out.push(comp),
        }
    }

    if out.is_empty() {
        return Utf8PathBuf::from(".");
    }

    let cleaned: PathBuf = out.iter().collect();
    Utf8PathBuf::from_path_buf(cleaned).unwrap_or_else(|_| path.to_path_buf())
}

/// Express `path` relative to `root`, using `/` as the separator.
///
/// Paths outside `root` are returned cleaned but otherwise unchanged.
#[must_use]
pub fn relative_to(path: &Utf8Path, root: &Utf8Path) -> Utf8PathBuf {
    let path = clean_utf8_path(path);
    let root = clean_utf8_path(root);

    let relative = path
        .strip_prefix(&root)
        .ok()
        .filter(|rest| !rest.as_str().is_empty())
        .map_or_else(|| path.clone(), Utf8Path::to_path_buf);

    let mut joined = String::new();
    for comp in relative.components() {
        match comp {
            Utf8Component::RootDir => joined.push('/'),
            Utf8Component::Prefix(prefix) => joined.push_str(prefix.as_str()),
            other => {
                if !joined.is_empty() && !joined.ends_with('/') {
                    joined.push('/');
                }
                joined.push_str(other.as_str());
            }
        }
    }

    Utf8PathBuf::from(joined)
}
