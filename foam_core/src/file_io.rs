//! # File I/O
//!
//! Estimate and settings persistence:
//! - **Atomic saves**: write to `.tmp`, fsync, rename over the target
//! - **File locking**: two people in the office cannot edit one quote at once
//! - **Version validation**: refuse files from a newer schema
//! - **Recompute on load**: cached totals in the file are never trusted
//!
//! ## File Format
//!
//! Estimates are `.sfe` files containing JSON. Lock files sit next to them
//! as `.sfe.lock` and record who holds the lock. Pricing settings are plain
//! JSON (`pricing.json` by convention).
//!
//! ## Example
//!
//! ```rust,no_run
//! use foam_core::config::PricingConfig;
//! use foam_core::estimate::Estimate;
//! use foam_core::file_io::{load_estimate, save_estimate, FileLock};
//! use std::path::Path;
//!
//! let estimate = Estimate::new("Jane Homeowner", "Attic", PricingConfig::default())?;
//! let path = Path::new("attic.sfe");
//!
//! let lock = FileLock::acquire(path, "office@foamco.example")?;
//! save_estimate(&estimate, path)?;
//! drop(lock);
//!
//! let reopened = load_estimate(path)?;
//! assert_eq!(reopened.totals(), estimate.totals());
//! # Ok::<(), foam_core::errors::CalcError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::PricingConfig;
use crate::errors::{CalcError, CalcResult};
use crate::estimate::{Estimate, SCHEMA_VERSION};

/// Locks older than this are treated as abandoned
const STALE_LOCK_HOURS: i64 = 24;

/// Metadata stored in `.sfe.lock` files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    /// Whoever created this lock is gone (same host, dead pid) or it is too old.
    fn is_stale(&self) -> bool {
        if Utc::now() - self.locked_at > chrono::Duration::hours(STALE_LOCK_HOURS) {
            return true;
        }
        match hostname() {
            Some(ours) if ours == self.machine => !process_alive(self.pid),
            _ => false,
        }
    }

    fn holder(&self) -> String {
        format!("{} ({})", self.user_id, self.machine)
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME").ok().or_else(|| std::env::var("HOST").ok())
    }
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{pid}")).exists()
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    // No cheap check; rely on the age cutoff
    true
}

/// Exclusive edit lock on an estimate file. Released on drop.
///
/// Holds an OS-level lock (fs2) on the `.lock` file and writes [`LockInfo`]
/// into it so other users can see who has the estimate open.
#[derive(Debug)]
pub struct FileLock {
    estimate_path: PathBuf,
    lock_path: PathBuf,
    _handle: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire the lock for `path`.
    ///
    /// Fails with [`CalcError::FileLocked`] when a live lock exists. Stale
    /// locks are taken over with a warning.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CalcResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        let existing = read_lock_info(&lock_path);
        if let Some(existing) = &existing {
            if !existing.is_stale() {
                return Err(locked_by(path, existing));
            }
        }

        // Never truncate before holding the OS lock: a failed attempt must not
        // erase the current holder's metadata.
        let mut handle = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| CalcError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        if handle.try_lock_exclusive().is_err() {
            return Err(match &existing {
                Some(existing) => locked_by(path, existing),
                None => CalcError::file_locked(path.display().to_string(), "another process", "unknown"),
            });
        }

        if let Some(existing) = &existing {
            warn!(path = %path.display(), holder = %existing.holder(), "taking over stale lock");
        }

        let body = serde_json::to_string_pretty(&info).map_err(CalcError::serialization)?;
        handle
            .set_len(0)
            .and_then(|_| handle.write_all(body.as_bytes()))
            .and_then(|_| handle.sync_all())
            .map_err(|e| CalcError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;

        debug!(path = %path.display(), user = %info.user_id, "lock acquired");

        Ok(FileLock {
            estimate_path: path.to_path_buf(),
            lock_path,
            _handle: handle,
            info,
        })
    }

    /// Current lock on `path`, if any. Does not acquire anything.
    ///
    /// Metadata past the stale cutoff still counts while its OS lock is held.
    pub fn check(path: &Path) -> Option<LockInfo> {
        let lock_path = lock_path_for(path);
        let info = read_lock_info(&lock_path)?;
        if !info.is_stale() || os_lock_held(&lock_path) {
            Some(info)
        } else {
            None
        }
    }

    pub fn estimate_path(&self) -> &Path {
        &self.estimate_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
        debug!(path = %self.estimate_path.display(), "lock released");
    }
}

fn locked_by(path: &Path, holder: &LockInfo) -> CalcError {
    CalcError::file_locked(path.display().to_string(), holder.holder(), holder.locked_at.to_rfc3339())
}

/// Whether some handle currently holds the OS lock on `lock_path`.
fn os_lock_held(lock_path: &Path) -> bool {
    match OpenOptions::new().read(true).write(true).open(lock_path) {
        // A successful try-lock is released when `handle` drops
        Ok(handle) => handle.try_lock_exclusive().is_err(),
        Err(_) => false,
    }
}

/// `job.sfe` -> `job.sfe.lock`
fn lock_path_for(path: &Path) -> PathBuf {
    let extension = path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    path.with_extension(extension)
}

/// `job.sfe` -> `job.sfe.tmp`
fn tmp_path_for(path: &Path) -> PathBuf {
    let extension = path
        .extension()
        .map(|e| format!("{}.tmp", e.to_string_lossy()))
        .unwrap_or_else(|| "tmp".to_string());
    path.with_extension(extension)
}

fn read_lock_info(lock_path: &Path) -> Option<LockInfo> {
    let contents = fs::read_to_string(lock_path).ok()?;
    serde_json::from_str(&contents).ok()
}

/// Serialize `value` and atomically replace `path` with it.
fn write_json_atomic<T: Serialize>(value: &T, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(CalcError::serialization)?;
    let tmp_path = tmp_path_for(path);

    let mut tmp = File::create(&tmp_path)
        .map_err(|e| CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp.write_all(json.as_bytes())
        .and_then(|_| tmp.sync_all())
        .map_err(|e| CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> CalcResult<T> {
    let contents = fs::read_to_string(path)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&contents)
        .map_err(|e| CalcError::serialization(format!("Invalid JSON in {}: {}", path.display(), e)))
}

/// Save an estimate with atomic write semantics.
pub fn save_estimate(estimate: &Estimate, path: &Path) -> CalcResult<()> {
    write_json_atomic(estimate, path)?;
    info!(
        path = %path.display(),
        assemblies = estimate.assembly_count(),
        grand_total = estimate.totals().job.grand_total,
        "estimate saved"
    );
    Ok(())
}

/// Load an estimate and recompute its totals from the stored inputs.
///
/// # Errors
///
/// * [`CalcError::FileError`] - I/O failure
/// * [`CalcError::SerializationError`] - not a valid estimate file
/// * [`CalcError::VersionMismatch`] - written by an incompatible schema
/// * [`CalcError::InvalidInput`] - stored pricing or assemblies no longer validate
pub fn load_estimate(path: &Path) -> CalcResult<Estimate> {
    let mut estimate: Estimate = read_json(path)?;
    validate_version(&estimate.meta.version)?;
    estimate.recalculate()?;
    info!(path = %path.display(), assemblies = estimate.assembly_count(), "estimate loaded");
    Ok(estimate)
}

/// Load an estimate plus the live lock on it, if another user holds one.
///
/// A `Some` lock means the caller should open the estimate read-only.
pub fn load_estimate_with_lock_check(path: &Path) -> CalcResult<(Estimate, Option<LockInfo>)> {
    let estimate = load_estimate(path)?;
    let lock = FileLock::check(path);
    if let Some(lock) = &lock {
        warn!(path = %path.display(), holder = %lock.holder(), "estimate is locked by another user");
    }
    Ok((estimate, lock))
}

/// Save business pricing settings. Invalid settings are refused.
pub fn save_pricing_config(config: &PricingConfig, path: &Path) -> CalcResult<()> {
    config.validate()?;
    write_json_atomic(config, path)?;
    info!(path = %path.display(), "pricing settings saved");
    Ok(())
}

/// Load and validate business pricing settings.
///
/// Missing fields take their defaults.
pub fn load_pricing_config(path: &Path) -> CalcResult<PricingConfig> {
    let config: PricingConfig = read_json(path)?;
    config.validate()?;
    debug!(path = %path.display(), "pricing settings loaded");
    Ok(config)
}

/// Major must match; within 0.x a newer minor is refused.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };
    let parse = |v: &str| -> Option<Vec<u32>> { v.split('.').map(|p| p.parse().ok()).collect() };

    let file = parse(file_version).filter(|p| !p.is_empty()).ok_or_else(mismatch)?;
    let current = parse(SCHEMA_VERSION).ok_or_else(mismatch)?;

    if file[0] != current[0] {
        return Err(mismatch());
    }
    if current[0] == 0 && file.get(1) > current.get(1) {
        return Err(mismatch());
    }
    Ok(())
}
