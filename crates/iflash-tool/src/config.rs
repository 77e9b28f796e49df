//! Command-line configuration.
//!
//! Every option can also come from an `IFLASH_*` environment variable.
//! Defaults follow the file names InsydeFlash update packages use, so
//! running `iflash extract` next to an `isflash.bin` writes `BIOSFILE.FD`,
//! `platforms.ini`, `EC.BIN`, `CERT.pem` and `drv_img.bin` into the current
//! directory.
//!
//! # Example
//!
//! ```no_run
//! use iflash_tool::Cli;
//!
//! let cli = Cli::from_args();
//! cli.command.validate().expect("Invalid configuration");
//! ```

use crate::error::ConfigError;
use clap::{Args, Parser, Subcommand, ValueEnum};
use iflash_formats::{ImageKind, TailPolicy};
use std::path::{Path, PathBuf};

/// Container file name used by InsydeFlash update packages
pub const DEFAULT_CONTAINER: &str = "isflash.bin";

/// Top-level command line
#[derive(Debug, Clone, Parser)]
#[command(
    name = "iflash",
    about = "Extract and re-inject sub-images of InsydeFlash firmware update containers",
    version
)]
pub struct Cli {
    /// Log level (overridden by RUST_LOG)
    #[arg(
        short,
        long,
        value_enum,
        global = true,
        env = "IFLASH_LOG_LEVEL",
        default_value = "info"
    )]
    pub log_level: LogLevel,

    /// Operation to perform
    #[command(subcommand)]
    pub command: Command,
}

/// Logging verbosity
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    /// Everything
    Trace,
    /// Offsets and sizes of every step
    Debug,
    /// One line per file written
    Info,
    /// Only problems
    Warn,
    /// Only failures
    Error,
}

impl LogLevel {
    /// Directive string for an env filter
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List the records found in a container
    List(ListArgs),
    /// Extract record payloads to files
    Extract(ExtractArgs),
    /// Replace a record payload in place
    Inject(InjectArgs),
}

/// Arguments for `list`
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Container image
    #[arg(env = "IFLASH_CONTAINER", default_value = DEFAULT_CONTAINER)]
    pub container: PathBuf,
}

/// Arguments for `extract`
#[derive(Debug, Clone, Args)]
pub struct ExtractArgs {
    /// Container image
    #[arg(env = "IFLASH_CONTAINER", default_value = DEFAULT_CONTAINER)]
    pub container: PathBuf,

    /// Record kinds to extract (bios, ini, ec, drv, cert); all when omitted
    #[arg(short, long = "kind")]
    pub kinds: Vec<ImageKind>,

    /// Directory for default-named output files
    #[arg(short = 'd', long, env = "IFLASH_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Output file, only valid together with a single --kind
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for `inject`
#[derive(Debug, Clone, Args)]
pub struct InjectArgs {
    /// Container image, modified in place
    #[arg(env = "IFLASH_CONTAINER", default_value = DEFAULT_CONTAINER)]
    pub container: PathBuf,

    /// Record kind to replace
    #[arg(short, long, default_value = "ini")]
    pub kind: ImageKind,

    /// Replacement payload; defaults to the kind's extracted file name
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Zero the reserved capacity past the new payload instead of leaving
    /// the old bytes in place
    #[arg(long)]
    pub zero_fill: bool,
}

impl Cli {
    /// Parse configuration from command-line arguments.
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }
}

impl Command {
    /// Validate configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The container file doesn't exist
    /// - The output directory doesn't exist
    /// - `--output` is given with zero or several kinds
    /// - The inject input file doesn't exist
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::List(args) => require_container(&args.container),
            Self::Extract(args) => {
                require_container(&args.container)?;
                if args.output.is_some() && args.kinds.len() != 1 {
                    return Err(ConfigError::OutputNeedsSingleKind(args.kinds.len()));
                }
                if args.output.is_none() && !args.output_dir.is_dir() {
                    return Err(ConfigError::OutputDirNotFound(args.output_dir.clone()));
                }
                Ok(())
            }
            Self::Inject(args) => {
                require_container(&args.container)?;
                let input = args.input_path();
                if !input.is_file() {
                    return Err(ConfigError::InputNotFound(input));
                }
                Ok(())
            }
        }
    }
}

fn require_container(path: &Path) -> Result<(), ConfigError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ConfigError::ContainerNotFound(path.to_path_buf()))
    }
}

impl ExtractArgs {
    /// Kinds to extract and whether each one was asked for explicitly
    pub fn selected_kinds(&self) -> (Vec<ImageKind>, bool) {
        if self.kinds.is_empty() {
            (ImageKind::ALL.to_vec(), false)
        } else {
            (self.kinds.clone(), true)
        }
    }

    /// Output file for `kind`
    pub fn output_path(&self, kind: ImageKind) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.output_dir.join(kind.default_file_name()))
    }
}

impl InjectArgs {
    /// Replacement payload file
    pub fn input_path(&self) -> PathBuf {
        self.input
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.kind.default_file_name()))
    }

    /// Tail handling requested on the command line
    pub const fn tail_policy(&self) -> TailPolicy {
        if self.zero_fill {
            TailPolicy::ZeroFill
        } else {
            TailPolicy::LeaveStale
        }
    }
}
