//! Subcommand handlers

use crate::config::{Command, ExtractArgs, InjectArgs, ListArgs};
use crate::container_file::{ContainerFile, Extracted, Injected};
use crate::error::{Result, ToolError};
use iflash_formats::{IflashError, ImageKind, Record};
use tracing::{debug, error, info, warn};

/// Number of leading payload bytes shown in debug output
const PREVIEW_LEN: usize = 16;

/// Run a validated command
pub fn run(command: &Command) -> Result<()> {
    command.validate()?;

    match command {
        Command::List(args) => {
            print!("{}", list(args)?);
            Ok(())
        }
        Command::Extract(args) => {
            let extracted = extract(args)?;
            info!("Extracted {} record(s)", extracted.len());
            Ok(())
        }
        Command::Inject(args) => {
            let injected = inject(args)?;
            info!(
                "File {} successfully injected back into {} ({} -> {} of {} bytes)",
                args.input_path().display(),
                args.container.display(),
                injected.previous_size,
                injected.new_size,
                injected.capacity
            );
            Ok(())
        }
    }
}

/// Render a table of the records present in the container
pub fn list(args: &ListArgs) -> Result<String> {
    let file = ContainerFile::open(&args.container)?;
    let container = file.container();

    let mut out = format!(
        "{:<18} {:>10} {:>10} {:>10}\n",
        "SIGNATURE", "OFFSET", "FULL_SIZE", "USED_SIZE"
    );

    for (kind, result) in container.records() {
        match result {
            Ok(record) => {
                out.push_str(&format_record(&record));
                out.push('\n');
                check_record(&file, kind, &record);
            }
            Err(e) => {
                warn!("{kind}: {e}");
                out.push_str(&format!("{:<18} {:>10}\n", kind.signature_str(), "invalid"));
            }
        }
    }

    Ok(out)
}

fn format_record(record: &Record) -> String {
    format!(
        "{:<18} {:>#10x} {:>10} {:>10}",
        record.kind.signature_str(),
        record.offset,
        record.header.full_size,
        record.header.used_size
    )
}

/// Log anything suspicious about a located record
fn check_record(file: &ContainerFile, kind: ImageKind, record: &Record) {
    let container = file.container();

    if let Err(e) = record.header.validate() {
        warn!("{kind} at {:#x} violates its capacity: {e}", record.offset);
    }

    let occurrences = container.occurrences(kind);
    if occurrences > 1 {
        warn!("{kind} signature occurs {occurrences} times; only the first is used");
    }

    match record.payload(&container) {
        Ok(payload) => {
            let preview = &payload[..payload.len().min(PREVIEW_LEN)];
            debug!("{kind} payload starts with {}", hex::encode(preview));
        }
        Err(e) => warn!("{kind}: {e}"),
    }
}

/// Extract the selected kinds to files
///
/// When no kinds are named, every known kind is attempted: absent ones are
/// skipped, and a kind that fails to extract does not stop the others. The
/// first such failure is returned once every kind has been tried. A kind
/// named explicitly must be present and extract cleanly.
pub fn extract(args: &ExtractArgs) -> Result<Vec<Extracted>> {
    let file = ContainerFile::open(&args.container)?;
    let (kinds, explicit) = args.selected_kinds();

    let mut extracted = Vec::with_capacity(kinds.len());
    let mut first_failure = None;
    for kind in kinds {
        match file.extract_to(kind, &args.output_path(kind)) {
            Ok(done) => extracted.push(done),
            Err(ToolError::Record {
                source: IflashError::NotFound(_),
                ..
            }) if !explicit => {
                warn!("Insyde image signature {kind} not found in input file, skipping");
            }
            Err(e) if explicit => {
                error!("Extraction of {kind} failed: {e}");
                return Err(e);
            }
            Err(e) => {
                error!("Extraction of {kind} failed, continuing with the remaining kinds: {e}");
                first_failure.get_or_insert(e);
            }
        }
    }

    match first_failure {
        Some(e) => Err(e),
        None => Ok(extracted),
    }
}

/// Inject the input file into its record
pub fn inject(args: &InjectArgs) -> Result<Injected> {
    info!(
        "Starting {} re-injection back into {}",
        args.input_path().display(),
        args.container.display()
    );

    let mut file = ContainerFile::open(&args.container)?;
    file.inject_from(args.kind, &args.input_path(), args.tail_policy())
}
