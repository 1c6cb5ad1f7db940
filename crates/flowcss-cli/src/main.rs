use clap::{Parser, Subcommand};
use flowcss_codegen::{ConvertConfig, CONFIG_FILE};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flowcss")]
#[command(about = "flowcss: convert CSS into Webflow clipboard payloads")]
#[command(version)]
struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a stylesheet into a clipboard payload
    Build {
        /// Input .css file
        path: PathBuf,
        /// Write the payload here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Config file (defaults to ./flowcss.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the class index a stylesheet compiles to
    Index {
        /// Input .css file
        path: PathBuf,
    },

    /// Validate an existing payload .json file
    Check {
        /// Input payload file
        path: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Command::Build {
            path,
            output,
            config,
        } => cmd_build(path, output.as_deref(), config.as_deref()),
        Command::Index { path } => cmd_index(path),
        Command::Check { path } => cmd_check(path),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("Error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_source(path: &Path) -> Result<String, String> {
    if !path.exists() {
        return Err(format!("file not found: {}", path.display()));
    }
    std::fs::read_to_string(path).map_err(|e| format!("reading {}: {e}", path.display()))
}

/// An explicit path must load; the default file is optional.
fn resolve_config(explicit: Option<&Path>) -> Result<ConvertConfig, String> {
    match explicit {
        Some(path) => ConvertConfig::load(path).map_err(|e| e.to_string()),
        None if Path::new(CONFIG_FILE).exists() => {
            ConvertConfig::load(CONFIG_FILE).map_err(|e| e.to_string())
        }
        None => Ok(ConvertConfig::default()),
    }
}

fn cmd_build(path: &Path, output: Option<&Path>, config: Option<&Path>) -> Result<(), String> {
    let config = resolve_config(config)?;
    let css = read_source(path)?;
    tracing::debug!(path = %path.display(), bytes = css.len(), "building payload");
    let conversion = flowcss_codegen::convert(&css, &config).map_err(|e| e.to_string())?;

    for warning in &conversion.warnings {
        tracing::warn!(code = %warning.code, level = ?warning.level, "{}", warning.message);
    }
    if conversion.dropped_duplicate_styles > 0 {
        tracing::info!(count = conversion.dropped_duplicate_styles, "dropped duplicate styles");
    }
    if let Some(preflight) = &conversion.preflight {
        if !preflight.issues.is_empty() {
            tracing::warn!(can_proceed = preflight.can_proceed, "{}", preflight.summary);
        }
    }

    let Some(payload) = &conversion.payload else {
        return Err("payload blocked by validation".to_string());
    };
    let json = payload.to_json_pretty().map_err(|e| e.to_string())?;

    match output {
        Some(out) => {
            std::fs::write(out, &json).map_err(|e| format!("writing {}: {e}", out.display()))?;
            eprintln!(
                "Built: {} ({} styles)",
                out.display(),
                payload.styles().len()
            );
        }
        None => println!("{json}"),
    }

    if let Some(css) = &conversion.non_standard_media_css {
        eprintln!("Note: at-rules that need a custom code embed:\n{css}");
    }
    Ok(())
}

fn cmd_index(path: &Path) -> Result<(), String> {
    let css = read_source(path)?;
    let index = flowcss_parser::compile(&css, &ConvertConfig::default().compile_options());
    let json = serde_json::to_string_pretty(&index).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn cmd_check(path: &Path) -> Result<(), String> {
    let text = read_source(path)?;
    let payload: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| format!("parsing {}: {e}", path.display()))?;
    let result = flowcss_validator::validate(&payload);
    tracing::debug!(
        issues = result.issues.len(),
        can_proceed = result.can_proceed,
        "validated {}",
        path.display()
    );

    eprintln!("{}", result.summary);
    if !result.can_proceed {
        return Err(format!("{} cannot be pasted safely", path.display()));
    }
    eprintln!("OK: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // =========================================================================
    // Arguments
    // =========================================================================

    #[test]
    fn test_build_arguments() {
        let cli = Cli::try_parse_from(["flowcss", "build", "site.css", "-o", "out.json", "-v"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Build {
                path,
                output,
                config,
            } => {
                assert_eq!(path, PathBuf::from("site.css"));
                assert_eq!(output, Some(PathBuf::from("out.json")));
                assert_eq!(config, None);
            }
            _ => panic!("expected build"),
        }
    }

    #[test]
    fn test_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["flowcss"]).is_err());
    }

    // =========================================================================
    // Config and files
    // =========================================================================

    #[test]
    fn test_explicit_config_must_exist() {
        let missing = std::env::temp_dir().join("flowcss_cli_missing.toml");
        let err = resolve_config(Some(missing.as_path())).unwrap_err();
        assert!(err.contains("failed to read config"));
    }

    #[test]
    fn test_config_text() {
        let config = ConvertConfig::from_toml_str("validate = false\nforce_visible = false").unwrap();
        assert!(!config.validate);
        assert!(!config.force_visible);
        assert_eq!(config.max_grid_columns, 12);
    }

    #[test]
    fn test_check_round_trip() {
        let dir = std::env::temp_dir();
        let css_path = dir.join(format!("flowcss_cli_{}.css", std::process::id()));
        let json_path = dir.join(format!("flowcss_cli_{}.json", std::process::id()));
        std::fs::write(&css_path, ".a { color: red }").unwrap();

        cmd_build(&css_path, Some(json_path.as_path()), None).unwrap();
        let checked = cmd_check(&json_path);

        let _ = std::fs::remove_file(&css_path);
        let _ = std::fs::remove_file(&json_path);
        assert_eq!(checked, Ok(()));
    }

    #[test]
    fn test_missing_input() {
        let err = read_source(Path::new("definitely/not/here.css")).unwrap_err();
        assert!(err.starts_with("file not found"));
    }
}
