mod commands;
mod reader;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reader::read_yasql_file;

#[derive(Parser)]
#[command(
    name = "yasql",
    version,
    about = "YASQL schema compiler — generate MySQL DDL from YAML database descriptions"
)]
struct Cli {
    /// Enable debug logging on stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate SQL from a YASQL file
    Generate {
        /// Input YASQL file
        file: PathBuf,

        /// Spaces per indentation level (negative values fall back to 2)
        #[arg(long, allow_hyphen_values = true)]
        indent: Option<i64>,

        /// Write output to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse a YASQL file and output the schema model as JSON
    Parse {
        /// Input YASQL file
        file: PathBuf,

        /// Write output to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build every database listed in a build config
    Build {
        /// Build config file
        #[arg(default_value = commands::build::DEFAULT_CONFIG)]
        config: PathBuf,

        /// Output directory for the generated .sql files
        #[arg(long, default_value = "build")]
        output: PathBuf,

        /// Directory holding vendor packages
        #[arg(long, default_value = "vendor")]
        vendors: PathBuf,
    },

    /// Check YASQL files for errors
    Check {
        /// Input path (file or directory, defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            file,
            indent,
            output,
        } => match run_generate(&file, indent, output.as_deref()) {
            Ok(sql) => {
                // The SQL already ends with a newline.
                print!("{sql}");
            }
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        },
        Commands::Parse { file, output } => match run_parse(&file, output.as_deref()) {
            Ok(json) => {
                println!("{json}");
            }
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        },
        Commands::Build {
            config,
            output,
            vendors,
        } => match commands::build::run_build(&config, &output, &vendors) {
            Ok(log) => {
                println!("{log}");
            }
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        },
        Commands::Check { path } => match commands::check::run_check(&path) {
            Ok((output, error_count)) => {
                println!("{output}");
                if error_count > 0 {
                    process::exit(1);
                }
            }
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        },
    }
}

fn parse_file(input_path: &Path) -> Result<yasql_core::SchemaModel, String> {
    let file = read_yasql_file(input_path)?;
    yasql_core::parse(&file.content).map_err(|e| format!("{}: {e}", file.path))
}

fn write_output(out_path: &Path, content: &str) -> Result<String, String> {
    std::fs::write(out_path, content)
        .map_err(|e| format!("Failed to write {}: {e}", out_path.display()))?;
    Ok(format!("Written to {}\n", out_path.display()))
}

fn run_generate(
    input_path: &Path,
    indent: Option<i64>,
    output_file: Option<&Path>,
) -> Result<String, String> {
    let model = parse_file(input_path)?;
    let sql = yasql_core::generate(&model, indent);

    match output_file {
        Some(out_path) => write_output(out_path, &sql),
        None => Ok(sql),
    }
}

fn run_parse(input_path: &Path, output_file: Option<&Path>) -> Result<String, String> {
    let model = parse_file(input_path)?;
    let json = serde_json::to_string_pretty(&model)
        .map_err(|e| format!("JSON serialization error: {e}"))?;

    match output_file {
        Some(out_path) => write_output(out_path, &json).map(|msg| msg.trim_end().to_string()),
        None => Ok(json),
    }
}
