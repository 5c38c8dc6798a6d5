use cascading_config::logging::{self, LogFormat};
use cascading_config::{ConfigError, ConfigResult, Configuration};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    name = "cascfg",
    version,
    about = "Inspect and edit properties files with cascading environment overrides.",
    long_about = "Reads properties files the way the cascading_config library does: a process environment variable with the same name as a key overrides the file, and the file overrides any default given on the command line."
)]
struct Cli {
    /// Log filter (overridden by RUST_LOG)
    #[arg(long, global = true, env = "CASCFG_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve one key
    Get {
        file: PathBuf,
        key: String,
        /// Value used when neither the environment nor the file defines the key
        #[arg(long)]
        default: Option<String>,
        /// Normalize the value as a filesystem path
        #[arg(long)]
        path: bool,
    },
    /// Resolve one key and print its delimited elements, one per line
    Array {
        file: PathBuf,
        key: String,
        #[arg(short, long, default_value = ",")]
        delimiter: String,
    },
    /// Apply KEY=VALUE entries and write the file back
    Set {
        file: PathBuf,
        #[arg(required = true)]
        entries: Vec<String>,
        /// Comment line written at the top of the file
        #[arg(long)]
        comment: Option<String>,
    },
    /// Print the entries stored in a file
    Show {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Create a new file from KEY=VALUE entries and print its path
    Create {
        /// Target file; auto-named under the temporary root when omitted
        #[arg(long)]
        path: Option<PathBuf>,
        /// Root for auto-named files
        #[arg(long, env = "CASCFG_TEMP_ROOT")]
        temp_root: Option<PathBuf>,
        entries: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.log_format);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> ConfigResult<()> {
    match command {
        Command::Get {
            file,
            key,
            default,
            path,
        } => {
            let mut config = Configuration::new();
            config.load(&file)?;
            let value = match (default, path) {
                (Some(default), true) => config.get_path_or(&key, &default).display().to_string(),
                (None, true) => config.get_path(&key)?.display().to_string(),
                (Some(default), false) => config.get_or(&key, &default),
                (None, false) => config.get(&key)?,
            };
            println!("{value}");
        }
        Command::Array {
            file,
            key,
            delimiter,
        } => {
            let mut config = Configuration::new();
            config.load(&file)?;
            for item in config.get_array(&key, &delimiter)? {
                println!("{item}");
            }
        }
        Command::Set {
            file,
            entries,
            comment,
        } => {
            let mut config = Configuration::new();
            match config.load(&file) {
                Ok(_) | Err(ConfigError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
            let applied = config.set_all(&entries)?;
            config.save_to(&file, comment.as_deref())?;
            eprintln!("{applied} entries written to {}", file.display());
        }
        Command::Show { file, json } => {
            let mut config = Configuration::new();
            config.load(&file)?;
            if json {
                let text = serde_json::to_string_pretty(config.properties())
                    .map_err(io::Error::from)?;
                println!("{text}");
            } else {
                for (key, value) in config.properties().iter() {
                    println!("{key}={value}");
                }
            }
        }
        Command::Create {
            path,
            temp_root,
            entries,
        } => {
            let mut builder = Configuration::builder();
            if let Some(root) = temp_root {
                builder = builder.temp_root(root);
            }
            let mut config = builder.build();
            config.set_all(&entries)?;
            let created = match path {
                Some(path) => config.create_file_at(path)?,
                None => config.create_file()?,
            };
            println!("{}", created.display());
        }
    }
    Ok(())
}
