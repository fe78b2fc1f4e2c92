use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;

use crate::args::GlobalArgs;

/// Install a stderr subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the level follows the global flags:
/// `warn` by default, `info`/`debug`/`trace` for `-v`/`-vv`/`-vvv`, `error`
/// with `--quiet`.
pub fn init(global: &GlobalArgs) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level(global)));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(global.verbose > 1)
        .without_time()
        .with_filter(env_filter);

    if Registry::default().with(layer).try_init().is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

fn default_level(global: &GlobalArgs) -> &'static str {
    if global.quiet {
        return "error";
    }
    match global.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
