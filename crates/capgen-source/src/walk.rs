use camino::Utf8Path;
use camino::Utf8PathBuf;
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;

/// Options controlling how [`walk_files`] traverses a project.
#[derive(Clone, Debug, Default)]
pub struct WalkOptions {
    /// Include hidden files and directories.
    pub hidden: bool,
    /// Gitignore-style globs of paths to leave out, relative to each walked root.
    pub exclude: Vec<String>,
    /// Disable `.gitignore` and friends.
    pub no_ignore: bool,
}

/// Collect every file under `paths` accepted by `predicate`.
///
/// Files named directly are taken as-is; directories are walked with the
/// `ignore` crate's standard filters. The result is canonicalized, sorted and
/// free of duplicates so that generation order is deterministic.
#[must_use]
pub fn walk_files(
    paths: &[Utf8PathBuf],
    predicate: impl Fn(&Utf8Path) -> bool,
    options: &WalkOptions,
) -> Vec<Utf8PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            if predicate(path) {
                files.push(dunce_utf8(path).unwrap_or_else(|_| path.clone()));
            }
            continue;
        }

        if !path.is_dir() {
            tracing::debug!(%path, "skipping missing path");
            continue;
        }

        let mut builder = WalkBuilder::new(path.as_std_path());
        builder
            .standard_filters(!options.no_ignore)
            .hidden(!options.hidden);

        if !options.exclude.is_empty() {
            let mut overrides = OverrideBuilder::new(path.as_std_path());
            for glob in &options.exclude {
                if let Err(err) = overrides.add(&format!("!{glob}")) {
                    tracing::warn!(glob, %err, "ignoring invalid exclude pattern");
                }
            }
            if let Ok(built) = overrides.build() {
                builder.overrides(built);
            }
        }

        for entry in builder.build().filter_map(Result::ok) {
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let Some(utf8) = Utf8Path::from_path(entry.path()) else {
                continue;
            };
            if predicate(utf8) {
                files.push(dunce_utf8(utf8).unwrap_or_else(|_| utf8.to_owned()));
            }
        }
    }

    files.sort();
    files.dedup();
    files
}

fn dunce_utf8(path: &Utf8Path) -> std::io::Result<Utf8PathBuf> {
    let canonical = dunce::canonicalize(path.as_std_path())?;
    Utf8PathBuf::from_path_buf(canonical)
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidData, "non-UTF-8 path"))
}
