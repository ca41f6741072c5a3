//! Screenshot capture and housekeeping

use chrono::Local;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, error, warn};
use walkdir::WalkDir;

use crate::error::E2eResult;
use crate::page::Page;

const MAX_FILENAME_LEN: usize = 200;
const SECS_PER_DAY: u64 = 24 * 60 * 60;
const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Make a name safe to use as a file name.
///
/// Invalid characters become `_`, runs of `_` collapse to one, and names
/// longer than 200 characters keep their first 196 plus the extension.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if INVALID_CHARS.contains(&c) { '_' } else { c };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }

    if out.chars().count() > MAX_FILENAME_LEN {
        let (stem, ext) = match out.rfind('.') {
            Some(dot) if dot > 0 => out.split_at(dot),
            _ => (out.as_str(), ""),
        };
        let stem: String = stem.chars().take(MAX_FILENAME_LEN - 4).collect();
        out = format!("{}{}", stem, ext);
    }
    out
}

/// Takes screenshots into a directory, one subdirectory per test
#[derive(Debug, Clone)]
pub struct ScreenshotManager {
    dir: PathBuf,
}

impl ScreenshotManager {
    pub fn new(dir: impl Into<PathBuf>) -> E2eResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Capture the page. Returns `None` when the driver fails; the failure
    /// is logged and never propagated.
    pub async fn take_screenshot(
        &self,
        page: &dyn Page,
        name: &str,
        test_name: Option<&str>,
        full_page: bool,
    ) -> Option<PathBuf> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S_%3f");
        let filename = match test_name {
            Some(test) => sanitize_filename(&format!("{}_{}_{}.png", test, name, timestamp)),
            None => sanitize_filename(&format!("{}_{}.png", name, timestamp)),
        };

        let dir = match test_name {
            Some(test) => self.dir.join(sanitize_filename(test)),
            None => self.dir.clone(),
        };
        if let Err(e) = std::fs::create_dir_all(&dir) {
            error!("Failed to take screenshot: {}", e);
            return None;
        }

        let path = dir.join(filename);
        match page.screenshot(&path, full_page).await {
            Ok(()) => {
                debug!("Screenshot saved: {}", path.display());
                Some(path)
            }
            Err(e) => {
                error!("Failed to take screenshot: {}", e);
                None
            }
        }
    }

    /// Capture after a failure, naming the file after the first words of
    /// the error message
    pub async fn take_failure_screenshot(
        &self,
        page: &dyn Page,
        test_name: &str,
        message: &str,
    ) -> Option<PathBuf> {
        let words: Vec<&str> = message.split_whitespace().take(3).collect();
        let name = if words.is_empty() {
            "failure".to_string()
        } else {
            format!("failure_{}", words.join("_"))
        };

        let path = self.take_screenshot(page, &name, Some(test_name), true).await;
        if let Some(path) = &path {
            error!("Failure screenshot saved: {}", path.display());
        }
        path
    }

    pub async fn take_step_screenshot(
        &self,
        page: &dyn Page,
        step_name: &str,
        test_name: Option<&str>,
    ) -> Option<PathBuf> {
        self.take_screenshot(page, &format!("step_{}", step_name), test_name, true).await
    }

    /// Capture a `before_` shot now and hand back the matching `after_` shot
    pub async fn take_before_after<'a>(
        &'a self,
        page: &'a dyn Page,
        action_name: &str,
        test_name: Option<&str>,
    ) -> (Option<PathBuf>, AfterShot<'a>) {
        let before = self
            .take_screenshot(page, &format!("before_{}", action_name), test_name, true)
            .await;
        let after = AfterShot {
            manager: self,
            page,
            name: format!("after_{}", action_name),
            test_name: test_name.map(String::from),
        };
        (before, after)
    }

    /// Delete `.png` files under the directory last modified more than
    /// `days` days ago. Returns how many were removed.
    pub fn cleanup_older_than(&self, days: u64) -> usize {
        let cutoff = SystemTime::now()
            .checked_sub(Duration::from_secs(days.saturating_mul(SECS_PER_DAY)))
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let mut removed = 0;
        for entry in WalkDir::new(&self.dir).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().map_or(true, |e| e != "png") {
                continue;
            }

            let modified = entry.metadata().ok().and_then(|m| m.modified().ok());
            if modified.is_some_and(|m| m < cutoff) {
                match std::fs::remove_file(path) {
                    Ok(()) => {
                        debug!("Deleted old screenshot: {}", path.display());
                        removed += 1;
                    }
                    Err(e) => warn!("Error cleaning up {}: {}", path.display(), e),
                }
            }
        }
        removed
    }
}

/// The pending second half of [`ScreenshotManager::take_before_after`]
pub struct AfterShot<'a> {
    manager: &'a ScreenshotManager,
    page: &'a dyn Page,
    name: String,
    test_name: Option<String>,
}

impl AfterShot<'_> {
    pub async fn take(self) -> Option<PathBuf> {
        self.manager
            .take_screenshot(self.page, &self.name, self.test_name.as_deref(), true)
            .await
    }
}
