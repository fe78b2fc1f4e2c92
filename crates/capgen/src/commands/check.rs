use anyhow::Context;
use anyhow::Result;
use camino::Utf8PathBuf;
use capgen_generator::Generator;
use capgen_generator::GeneratorOptions;
use clap::ValueEnum;
use rustc_hash::FxHashSet;

use crate::args::Args;
use crate::commands::Command;
use crate::exit::Exit;
use crate::project::Project;
use crate::report::apply_config;
use crate::report::build_diagnostics_config;
use crate::report::pick_renderer;
use crate::report::plural;
use crate::report::Reported;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, clap::Parser)]
pub struct Check {
    /// Files or directories to check. Defaults to the project root.
    paths: Vec<Utf8PathBuf>,

    /// Project root holding the configuration. Defaults to the current directory.
    #[arg(long)]
    root: Option<Utf8PathBuf>,

    /// How to print diagnostics.
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,

    /// Select specific diagnostic codes to report as errors (e.g. C200).
    #[arg(long, value_delimiter = ',')]
    select: Vec<String>,

    /// Ignore specific diagnostic codes (e.g. C101,C200).
    #[arg(long, value_delimiter = ',')]
    ignore: Vec<String>,
}

impl Command for Check {
    fn execute(&self, args: &Args) -> Result<Exit> {
        let project = Project::load(self.root.as_deref())?;
        let program = project.load_program(&self.paths)?;

        let output = Generator::new(GeneratorOptions::from(&project.settings))
            .generate(&program)
            .context("Failed to run generation")?;

        let config =
            build_diagnostics_config(&project.settings.diagnostics, &self.select, &self.ignore);
        let reported = apply_config(&output.diagnostics, &config, &program);

        match self.format {
            OutputFormat::Text => print_text(&reported, args),
            OutputFormat::Json => print_json(&reported)?,
        }

        let errors: Vec<&Reported<'_>> = reported.iter().filter(|d| d.is_error()).collect();
        if errors.is_empty() {
            if self.format == OutputFormat::Json {
                return Ok(Exit::success());
            }
            let message = format!(
                "Checked {}: {} found.",
                plural(program.modules().len(), "module"),
                plural(output.call_sites.len(), "call site"),
            );
            return Ok(Exit::success().with_message(message));
        }

        let files: FxHashSet<_> = errors.iter().map(|d| d.diagnostic.path()).collect();
        Ok(Exit::error().with_message(format!(
            "Found {} in {}.",
            plural(errors.len(), "error"),
            plural(files.len(), "file"),
        )))
    }
}

fn print_text(reported: &[Reported<'_>], args: &Args) {
    let renderer = pick_renderer();
    for diagnostic in reported {
        if args.global.quiet && !diagnostic.is_error() {
            continue;
        }
        println!("{}\n", diagnostic.render(&renderer));
    }
}

fn print_json(reported: &[Reported<'_>]) -> Result<()> {
    let diagnostics: Vec<_> = reported.iter().map(|d| d.to_json()).collect();
    let json =
        serde_json::to_string_pretty(&diagnostics).context("Failed to serialize diagnostics")?;
    println!("{json}");
    Ok(())
}
