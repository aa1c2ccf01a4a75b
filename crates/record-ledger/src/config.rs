//! Ledger configuration loaded via OrthoConfig.

use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::service::{LedgerOptions, OverwritePolicy, PointsPolicy};

const DEFAULT_LEDGER_FILE: &str = "record-ledger.json";

/// Configuration values for the `record-ledger` binary.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RECORD_LEDGER")]
pub struct LedgerSettings {
    /// Location of the file ledger.
    pub ledger_path: Option<PathBuf>,
    /// Reject negative points instead of applying them with their sign.
    #[ortho_config(default = false)]
    pub reject_negative_points: bool,
    /// Fail creates that target an occupied key instead of overwriting.
    #[ortho_config(default = false)]
    pub guard_existing: bool,
    /// Emit logs as JSON lines.
    #[ortho_config(default = false)]
    pub log_json: bool,
}

impl LedgerSettings {
    /// Return the configured ledger path, falling back to
    /// `record-ledger.json` in the working directory.
    #[must_use]
    pub fn ledger_path(&self) -> PathBuf {
        self.ledger_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LEDGER_FILE))
    }

    /// Service options selected by the settings.
    #[must_use]
    pub const fn options(&self) -> LedgerOptions {
        LedgerOptions {
            points: if self.reject_negative_points {
                PointsPolicy::Strict
            } else {
                PointsPolicy::Permissive
            },
            overwrite: if self.guard_existing {
                OverwritePolicy::Guard
            } else {
                OverwritePolicy::Overwrite
            },
        }
    }
}
