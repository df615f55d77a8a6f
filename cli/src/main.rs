use std::path::PathBuf;

use clap::Parser;
use cmdtree_cli::{OutputFormat, Shim};
use cmdtree_core::Value;
use cmdtree_engine::Cli;
use cmdtree_registry::CliConfig;
use tracing_subscriber::EnvFilter;

mod demo;

#[derive(Debug, Parser)]
#[command(name = "tree-demo")]
#[command(about = "Demo of a multi-root declarative command tree")]
#[command(disable_help_flag = true)]
struct Args {
    /// Output format for results and help.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Working directory handed to commands (default: current directory).
    #[arg(long)]
    cwd: Option<PathBuf>,
    /// Path to a YAML CLI config.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Command tokens, e.g. `greet alice --shout`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let code = match build_shim(&args) {
        Ok(shim) => {
            let argv = std::iter::once("tree-demo".to_string()).chain(args.tokens);
            shim.execute(argv)
        }
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    };

    std::process::exit(code);
}

fn build_shim(args: &Args) -> Result<Shim, String> {
    let config = match &args.config {
        Some(path) => CliConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))?,
        None => CliConfig::default(),
    };

    let format_name = format!("{:?}", args.format).to_lowercase();
    let cli = Cli::builder("tree-demo")
        .root(demo::core_root().map_err(|e| e.to_string())?)
        .root(demo::plugin_root().map_err(|e| e.to_string())?)
        .config(config)
        .context_hook(move |ctx| {
            ctx.extensions
                .insert("format".to_string(), Value::from(format_name.clone()));
        })
        .build()
        .map_err(|e| e.to_string())?;

    let cwd = match &args.cwd {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(|e| format!("Failed to read cwd: {e}"))?,
    };

    Ok(Shim::new(cli).with_format(args.format).with_cwd(cwd))
}
