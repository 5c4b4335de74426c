//! Command implementations and dispatch logic.

use camino::{Utf8Path, Utf8PathBuf};
use peerdeps_core::error::{PeerError, PeerResult};
use peerdeps_core::utils::normalize_path;
use peerdeps_validate::Validator;
use tracing::info;

pub mod check;


use crate::{output::OutputHandler, Commands};
use check::{CheckArgs, CheckReport};

/// Shared context for all commands
pub struct CommandContext {
    pub cwd: Utf8PathBuf,
    pub output: OutputHandler,
    pub validator: Validator,
}

impl CommandContext {
    /// Create a context rooted at the process working directory
    pub fn new() -> PeerResult<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| PeerError::io("Failed to get current directory".to_string(), e))?;
        let cwd = Utf8PathBuf::from_path_buf(cwd).map_err(|path| {
            PeerError::io(
                format!("Current directory is not valid UTF-8: {}", path.display()),
                std::io::Error::from(std::io::ErrorKind::InvalidData),
            )
        })?;

        Ok(Self {
            cwd,
            output: OutputHandler::new(),
            validator: Validator::new(),
        })
    }

    /// Anchor a user-supplied path at the working directory
    pub fn resolve(&self, path: &str) -> Utf8PathBuf {
        normalize_path(&self.cwd.join(Utf8Path::new(path)))
    }
}

/// Dispatch a command to its handler
pub fn dispatch_command(command: Commands, ctx: &CommandContext) -> anyhow::Result<CheckReport> {
    match command {
        Commands::Check {
            roots,
            from,
            assume,
            no_cache,
            format,
        } => {
            info!("Checking peer dependencies of {} root(s)", roots.len().max(1));
            let args = CheckArgs {
                roots,
                from,
                assume,
                no_cache,
            };
            let report = check::execute(&args, ctx)?;
            check::print(&report, format, ctx)?;
            Ok(report)
        },
    }
}
