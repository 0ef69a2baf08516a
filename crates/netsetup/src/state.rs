//! Session state file.
//!
//! The CLI stands in for the server side: interfaces, the primary selection
//! and the hardware list live in one JSON document between invocations.
//! Each invocation loads it through `set_data`, applies one command, drains
//! the deferred effects and writes it back.
//!
//! Members keep their pre-membership configuration under `suspended`, so a
//! Bond or Bridge removed in a later invocation still hands it back.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use netsetup_config::Config;
use netsetup_core::{DeviceRecord, InterfaceCollection, InterfaceData, create_device};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// On-disk layout of the state file.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StateFile {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub physical_interfaces: Vec<String>,
    #[serde(default)]
    pub primary: Option<String>,
    #[serde(default)]
    pub interfaces: IndexMap<String, DeviceRecord>,
    /// Configuration each current member had before it was absorbed.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub suspended: IndexMap<String, DeviceRecord>,
}

impl StateFile {
    /// Read `path`; a missing file is an empty state.
    pub fn read(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            debug!(path = %path.display(), "state file missing, starting empty");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn write(&self, path: &Path) -> Result<(), CliError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        fs::write(path, text)?;
        Ok(())
    }
}

/// One CLI invocation's editing session.
#[derive(Debug)]
pub struct Session {
    path: Option<PathBuf>,
    pub interfaces: InterfaceCollection,
}

impl Session {
    /// Load the state named by `--state`, `NETSETUP_STATE` or the config.
    ///
    /// The hardware list comes from `--physical`, else the state file, else
    /// the config file.
    pub fn open(global: &GlobalOpts, cfg: &Config) -> Result<Self, CliError> {
        let path = global
            .state
            .clone()
            .or_else(|| cfg.session.state_file.clone());
        let state = match &path {
            Some(path) => StateFile::read(path)?,
            None => StateFile::default(),
        };

        let mut session_config = netsetup_config::session_config(cfg);
        if let Some(names) = &global.physical {
            session_config.physical_interfaces.clone_from(names);
        } else if !state.physical_interfaces.is_empty() {
            session_config.physical_interfaces = state.physical_interfaces;
        }

        let mut interfaces = InterfaceCollection::new(session_config);
        interfaces.set_data(InterfaceData {
            primary: state.primary,
            interfaces: state.interfaces,
        })?;
        for (name, record) in state.suspended {
            if !interfaces.seed_cached_configuration(create_device(&record)?) {
                debug!(interface = %name, "dropping suspended configuration of a non-member");
            }
        }
        debug!(interfaces = interfaces.len(), "session loaded");

        Ok(Self { path, interfaces })
    }

    /// Drain pending effects and write the state back.
    pub fn save(&mut self) -> Result<PathBuf, CliError> {
        let path = self.path.clone().ok_or_else(|| CliError::NoStateFile {
            config_path: netsetup_config::config_path().display().to_string(),
        })?;

        let applied = self.interfaces.run_pending_effects();
        if applied > 0 {
            debug!(applied, "applied deferred effects");
        }

        let data = self.interfaces.to_data();
        let state = StateFile {
            physical_interfaces: self.interfaces.physical_interface_names().to_vec(),
            primary: data.primary,
            interfaces: data.interfaces,
            suspended: self
                .interfaces
                .cached_configurations()
                .map(|d| (d.name.clone(), d.to_object()))
                .collect(),
        };
        state.write(&path)?;
        debug!(path = %path.display(), "state saved");
        Ok(path)
    }

    /// Fail early for mutating commands when there is nowhere to save.
    pub fn require_state_file(&self) -> Result<(), CliError> {
        if self.path.is_some() {
            Ok(())
        } else {
            Err(CliError::NoStateFile {
                config_path: netsetup_config::config_path().display().to_string(),
            })
        }
    }
}
