use camino::Utf8Component;
use camino::Utf8Path;

/// Dotted module name for a file path relative to the project root.
///
/// `app/main.py` becomes `app.main`; `app/__init__.py` becomes `app` and is
/// reported as a package.
#[must_use]
pub fn module_name_for_path(path: &Utf8Path) -> (String, bool) {
    let mut parts: Vec<&str> = path
        .components()
        .filter_map(|component| match component {
            Utf8Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect();

    let Some(last) = parts.pop() else {
        return (String::new(), false);
    };

    let stem = last
        .strip_suffix(".py")
        .or_else(|| last.strip_suffix(".pyi"))
        .unwrap_or(last);

    let is_package = stem == "__init__";
    if !is_package {
        parts.push(stem);
    }

    (parts.join("."), is_package)
}

/// Resolve a relative `from` import against the importing module.
///
/// `level` is the number of leading dots. Returns `None` when the import
/// climbs above the top-level package.
#[must_use]
pub fn resolve_relative(
    current: &str,
    is_package: bool,
    level: u32,
    module: Option<&str>,
) -> Option<String> {
    if level == 0 {
        return module.map(str::to_string);
    }

    let mut base: Vec<&str> = if current.is_empty() {
        Vec::new()
    } else {
        current.split('.').collect()
    };
    if !is_package {
        base.pop()?;
    }
    for _ in 1..level {
        base.pop()?;
    }

    if let Some(module) = module {
        base.extend(module.split('.'));
    }

    Some(base.join("."))
}
