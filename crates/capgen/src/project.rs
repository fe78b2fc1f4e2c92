use std::fs;

use anyhow::Context;
use anyhow::Result;
use camino::Utf8Path;
use camino::Utf8PathBuf;
use capgen_conf::Settings;
use capgen_generator::naming::ARTIFACT_EXTENSION;
use capgen_python::Program;
use capgen_source::relative_to;
use capgen_source::walk_files;
use capgen_source::FileKind;
use capgen_source::SourceFile;
use capgen_source::WalkOptions;

/// A project root with its settings.
#[derive(Debug)]
pub struct Project {
    pub root: Utf8PathBuf,
    pub settings: Settings,
}

impl Project {
    /// Load settings for `root`, or for the current directory.
    pub fn load(root: Option<&Utf8Path>) -> Result<Self> {
        let root = match root {
            Some(root) => root.to_path_buf(),
            None => current_dir()?,
        };
        let root = dunce::canonicalize(&root)
            .with_context(|| format!("Project root '{root}' does not exist"))?;
        let root = Utf8PathBuf::from_path_buf(root)
            .map_err(|path| anyhow::anyhow!("Project root '{}' is not valid UTF-8", path.display()))?;

        let settings = Settings::new(root.as_std_path()).context("Failed to load settings")?;
        Ok(Self { root, settings })
    }

    /// Where artifacts go: `out` if given, else the configured output directory.
    pub fn output_dir(&self, out: Option<&Utf8Path>) -> Utf8PathBuf {
        let out = out.unwrap_or_else(|| Utf8Path::new(&self.settings.output_dir));
        if out.is_absolute() {
            out.to_path_buf()
        } else {
            self.root.join(out)
        }
    }

    /// Read and parse every Python file under `paths` (the whole project if
    /// empty). Paths are recorded relative to the project root.
    pub fn load_program(&self, paths: &[Utf8PathBuf]) -> Result<Program> {
        let roots: Vec<Utf8PathBuf> = if paths.is_empty() {
            vec![self.root.clone()]
        } else {
            paths
                .iter()
                .map(|p| if p.is_relative() { self.root.join(p) } else { p.clone() })
                .collect()
        };

        let options = WalkOptions {
            exclude: self.settings.exclude.clone(),
            ..WalkOptions::default()
        };

        let mut files = Vec::new();
        for path in walk_files(&roots, is_python_source, &options) {
            let source = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read '{path}'"))?;
            files.push(SourceFile::new(relative_to(&path, &self.root), source));
        }
        tracing::info!(files = files.len(), root = %self.root, "loaded project");

        Ok(Program::from_files(files))
    }
}

fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    Utf8PathBuf::from_path_buf(cwd)
        .map_err(|_| anyhow::anyhow!("Current directory is not valid UTF-8"))
}

/// Python modules, leaving out previously generated artifacts.
fn is_python_source(path: &Utf8Path) -> bool {
    FileKind::from_path(path) == FileKind::Python && !path.as_str().ends_with(ARTIFACT_EXTENSION)
}
