//! Session store for the most recent analysis and the drug result picked
//! from it.
//!
//! Values live in memory first and are mirrored to JSON files in the store
//! directory so a later invocation can pick them up. Unreadable files are
//! treated as absent.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::entities::report::{DrugReport, MultiDrugReport};
use crate::error::PharmaGuardError;
use crate::utils::cache::{pharmaguard_cache_dir, save_atomic};

const REPORT_FILE: &str = "pharmaguard_multi.json";
const SELECTED_FILE: &str = "pharmaguard_selected.json";

#[derive(Debug)]
pub struct AnalysisStore {
    dir: PathBuf,
    report: Option<MultiDrugReport>,
    selected: Option<DrugReport>,
}

impl Default for AnalysisStore {
    fn default() -> Self {
        Self::new(pharmaguard_cache_dir())
    }
}

impl AnalysisStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            report: None,
            selected: None,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn set_report(&mut self, report: MultiDrugReport) -> Result<(), PharmaGuardError> {
        let body = serde_json::to_string(&report)?;
        self.report = Some(report);
        save_atomic(&self.dir.join(REPORT_FILE), &body).await
    }

    pub async fn report(&mut self) -> Option<&MultiDrugReport> {
        if self.report.is_none() {
            self.report = load(&self.dir.join(REPORT_FILE)).await;
        }
        self.report.as_ref()
    }

    pub async fn set_selected(&mut self, result: DrugReport) -> Result<(), PharmaGuardError> {
        let body = serde_json::to_string(&result)?;
        self.selected = Some(result);
        save_atomic(&self.dir.join(SELECTED_FILE), &body).await
    }

    pub async fn selected(&mut self) -> Option<&DrugReport> {
        if self.selected.is_none() {
            self.selected = load(&self.dir.join(SELECTED_FILE)).await;
        }
        self.selected.as_ref()
    }

    pub async fn clear(&mut self) -> Result<(), PharmaGuardError> {
        self.report = None;
        self.selected = None;
        for name in [REPORT_FILE, SELECTED_FILE] {
            match tokio::fs::remove_file(self.dir.join(name)).await {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}

async fn load<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let body = match tokio::fs::read_to_string(path).await {
        Ok(body) => body,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no stored analysis");
            return None;
        }
        Err(err) => {
            warn!(path = %path.display(), "failed to read stored analysis: {err}");
            return None;
        }
    };
    match serde_json::from_str(&body) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(path = %path.display(), "ignoring corrupt stored analysis: {err}");
            None
        }
    }
}
