// ─── Destination Directory Checks ───
// Read/write/delete probes, retail-asset presence, and extraneous-archive
// detection, run once per directory per run.

use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{InstallerError, InstallerResult};
use crate::profile::InstallProfile;
use crate::prompt::UserPrompt;
use crate::task::ensure_active;

/// Progress of the validation state machine. Any state may terminate early
/// with a failure or a declined prompt, leaving the directory unrecorded for
/// the next attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DirectoryState {
    Unchecked,
    ReadChecked,
    WriteChecked,
    AssetChecked,
    ExtraFilesChecked,
    Validated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryOutcome {
    Validated,
    /// The user answered "no" to a continuation prompt. Not an error.
    Halted,
}

pub struct DirectoryValidator<'a> {
    profile: &'a InstallProfile,
    prompt: &'a dyn UserPrompt,
    state: DirectoryState,
}

impl<'a> DirectoryValidator<'a> {
    pub fn new(profile: &'a InstallProfile, prompt: &'a dyn UserPrompt) -> Self {
        Self {
            profile,
            prompt,
            state: DirectoryState::Unchecked,
        }
    }

    pub fn state(&self) -> DirectoryState {
        self.state
    }

    /// Run the checks against `dir`. Filesystem failures are fatal for this
    /// directory (the user recovers by choosing another one); declined
    /// prompts halt silently.
    pub async fn validate(
        &mut self,
        dir: &Path,
        token: &CancellationToken,
    ) -> InstallerResult<DirectoryOutcome> {
        info!("Checking for read access...");
        let file_names = match list_file_names(dir).await {
            Some(names) => names,
            None => {
                warn!("Could not list the contents of {:?}", dir);
                return Err(InstallerError::ReadAccess(dir.to_path_buf()));
            }
        };
        self.state = DirectoryState::ReadChecked;

        info!("Checking for write and delete access...");
        let probe_name = format!("installer_{}.tmp", Uuid::new_v4().simple());
        let probe = dir.join(&probe_name);
        if let Err(e) = tokio::fs::write(&probe, b"").await {
            warn!("Creating a probe file '{}' failed: {}", probe_name, e);
            return Err(InstallerError::WriteAccess(dir.to_path_buf()));
        }
        if let Err(e) = tokio::fs::remove_file(&probe).await {
            warn!("Deleting the probe file '{}' failed: {}", probe_name, e);
            return Err(InstallerError::DeleteAccess(dir.to_path_buf()));
        }
        self.state = DirectoryState::WriteChecked;

        if let Some(marker) = &self.profile.retail_marker {
            info!("Checking for the retail asset '{}'...", marker);
            let present = file_names.iter().any(|name| name.eq_ignore_ascii_case(marker));
            if !present {
                let message = "The destination directory does not appear to contain a retail \
                               installation of the base game. The base game is required to run \
                               anything this installer downloads.\n\nDo you want to continue \
                               anyway?";
                if !self.prompt.confirm(message).await {
                    return Ok(DirectoryOutcome::Halted);
                }
            }
        }
        self.state = DirectoryState::AssetChecked;

        if !self.profile.archive_extension.is_empty() {
            info!("Checking for extra package archives in the directory");
            let extension = self.profile.archive_extension.to_lowercase();
            let extras: Vec<&String> = file_names
                .iter()
                .filter(|name| {
                    let lower = name.to_lowercase();
                    lower.ends_with(&extension) && !self.profile.allowed_archives.contains(&lower)
                })
                .collect();

            if !extras.is_empty() {
                let mut message = String::from(
                    "The destination directory contains several extra package archives beyond \
                     the standard ones that should be there:\n\n",
                );
                for name in &extras {
                    message.push_str(name);
                    message.push('\n');
                }
                message.push_str(
                    "\nThese are likely to cause problems, and you are encouraged to move or \
                     delete them before running the game. Do you want to continue with the \
                     installation?",
                );
                if !self.prompt.confirm(&message).await {
                    return Ok(DirectoryOutcome::Halted);
                }
            }
        }
        self.state = DirectoryState::ExtraFilesChecked;

        ensure_active(token)?;
        self.state = DirectoryState::Validated;
        info!("Directory check passed for {:?}", dir);
        Ok(DirectoryOutcome::Validated)
    }
}

/// Plain files in `dir`, non-recursive. `None` when the listing itself fails.
async fn list_file_names(dir: &Path) -> Option<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir).await.ok()?;
    let mut names = Vec::new();
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                let is_file = entry
                    .file_type()
                    .await
                    .map(|kind| kind.is_file())
                    .unwrap_or(false);
                if is_file {
                    names.push(entry.file_name().to_string_lossy().into_owned());
                }
            }
            Ok(None) => break,
            Err(_) => return None,
        }
    }
    Some(names)
}
