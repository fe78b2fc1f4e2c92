use std::fs;

use anyhow::Context;
use anyhow::Result;
use camino::Utf8Path;
use camino::Utf8PathBuf;
use capgen_generator::model::GeneratedArtifact;
use capgen_generator::naming::ARTIFACT_EXTENSION;
use capgen_generator::Generator;
use capgen_generator::GeneratorOptions;

use crate::args::Args;
use crate::commands::Command;
use crate::exit::Exit;
use crate::project::Project;
use crate::report::apply_config;
use crate::report::pick_renderer;
use crate::report::plural;

#[derive(Debug, clap::Parser)]
pub struct Generate {
    /// Files or directories to scan. Defaults to the project root.
    paths: Vec<Utf8PathBuf>,

    /// Project root holding the configuration. Defaults to the current directory.
    #[arg(long)]
    root: Option<Utf8PathBuf>,

    /// Directory to write artifacts to. Defaults to `output_dir` from the configuration.
    #[arg(long)]
    out: Option<Utf8PathBuf>,

    /// Delete previously generated artifacts that this run does not produce.
    #[arg(long)]
    clean: bool,

    /// List the artifacts that would be written without touching the disk.
    #[arg(long)]
    dry_run: bool,
}

impl Command for Generate {
    fn execute(&self, args: &Args) -> Result<Exit> {
        let project = Project::load(self.root.as_deref())?;
        let program = project.load_program(&self.paths)?;

        let generator = Generator::new(GeneratorOptions::from(&project.settings));
        let output = generator
            .generate(&program)
            .context("Failed to generate artifacts")?;

        let renderer = pick_renderer();
        let reported = apply_config(&output.diagnostics, &project.settings.diagnostics, &program);
        for diagnostic in &reported {
            eprintln!("{}\n", diagnostic.render(&renderer));
        }

        let out_dir = project.output_dir(self.out.as_deref());

        if self.dry_run {
            if !args.global.quiet {
                for artifact in &output.artifacts {
                    println!("{}", out_dir.join(&artifact.name));
                }
            }
        } else {
            let written = write_artifacts(&out_dir, &output.artifacts)?;
            tracing::info!(written, unchanged = output.artifacts.len() - written, "wrote artifacts");
            if self.clean {
                let removed = clean_stale(&out_dir, &output.artifacts)?;
                tracing::info!(removed, "removed stale artifacts");
            }
        }

        let errors = reported.iter().filter(|d| d.is_error()).count();
        let summary = format!(
            "Generated {} for {} in {out_dir}.",
            plural(output.artifacts.len(), "artifact"),
            plural(output.call_sites.len(), "call site"),
        );
        if errors > 0 {
            Ok(Exit::error().with_message(format!("{summary} Found {}.", plural(errors, "error"))))
        } else {
            Ok(Exit::success().with_message(summary))
        }
    }
}

/// Write every artifact whose file is missing or differs. Returns how many
/// files were written.
fn write_artifacts(out_dir: &Utf8Path, artifacts: &[GeneratedArtifact]) -> Result<usize> {
    if artifacts.is_empty() {
        return Ok(0);
    }
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory '{out_dir}'"))?;

    let mut written = 0;
    for artifact in artifacts {
        let path = out_dir.join(&artifact.name);
        if fs::read_to_string(&path).is_ok_and(|existing| existing == artifact.text) {
            continue;
        }
        fs::write(&path, &artifact.text).with_context(|| format!("Failed to write '{path}'"))?;
        tracing::debug!(%path, "wrote artifact");
        written += 1;
    }
    Ok(written)
}

/// Remove `*.g.py` files in `out_dir` that are not among `artifacts`.
fn clean_stale(out_dir: &Utf8Path, artifacts: &[GeneratedArtifact]) -> Result<usize> {
    if !out_dir.is_dir() {
        return Ok(0);
    }

    let mut removed = 0;
    let entries = out_dir
        .read_dir_utf8()
        .with_context(|| format!("Failed to read output directory '{out_dir}'"))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read output directory '{out_dir}'"))?;
        let name = entry.file_name();
        let stale = name.ends_with(ARTIFACT_EXTENSION)
            && entry.path().is_file()
            && !artifacts.iter().any(|artifact| artifact.name == name);
        if stale {
            fs::remove_file(entry.path())
                .with_context(|| format!("Failed to remove '{}'", entry.path()))?;
            tracing::debug!(path = %entry.path(), "removed stale artifact");
            removed += 1;
        }
    }
    Ok(removed)
}
