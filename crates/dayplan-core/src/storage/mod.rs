mod config;
pub mod plan_db;

pub use config::Config;
pub use plan_db::PlanDb;

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, CoreError, Result};
use crate::optimizer::ProposalSlot;
use crate::schedule::PlanState;

/// Opaque get/set pair over the persisted tags and tasks.
pub trait PlanStore {
    fn load(&self) -> Result<PlanState>;

    /// Replace everything and return what was stored.
    fn save(&self, state: &PlanState) -> Result<PlanState>;
}

/// Returns `~/.config/dayplan[-dev]/` based on DAYPLAN_ENV.
///
/// Set DAYPLAN_ENV=dev to use the development data directory, or
/// DAYPLAN_DATA_DIR to use an explicit directory.
///
/// # Errors
/// Returns [`ConfigError::DataDir`] if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("DAYPLAN_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("DAYPLAN_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("dayplan-dev")
            } else {
                base_dir.join("dayplan")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Where the CLI keeps the pending proposal between invocations.
pub fn proposal_path() -> Result<PathBuf, ConfigError> {
    Ok(data_dir()?.join("proposal.json"))
}

/// Read a proposal slot; a missing file is an empty slot.
pub fn load_proposal_slot(path: &Path) -> Result<ProposalSlot> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ProposalSlot::default()),
        Err(e) => Err(CoreError::Io(e)),
    }
}

/// Write a proposal slot; an empty slot removes the file.
pub fn save_proposal_slot(path: &Path, slot: &ProposalSlot) -> Result<()> {
    if slot.pending().is_none() {
        return match std::fs::remove_file(path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(CoreError::Io(e)),
            _ => Ok(()),
        };
    }
    std::fs::write(path, serde_json::to_string_pretty(slot)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::test_support::{day, task};
    use crate::scheduler::fallback_optimize;

    #[test]
    fn proposal_file_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proposal.json");

        assert!(load_proposal_slot(&path).unwrap().pending().is_none());

        let mut slot = ProposalSlot::new();
        slot.stage(day(), fallback_optimize(&[task("a", "09:00", "10:00")]));
        save_proposal_slot(&path, &slot).unwrap();
        assert!(path.exists());
        assert_eq!(load_proposal_slot(&path).unwrap(), slot);

        slot.discard();
        save_proposal_slot(&path, &slot).unwrap();
        assert!(!path.exists());
        save_proposal_slot(&path, &slot).unwrap();
    }

    #[test]
    fn corrupt_proposal_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proposal.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(load_proposal_slot(&path), Err(CoreError::Json(_))));
    }
}
