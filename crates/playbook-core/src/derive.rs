//! Derived value generator
//!
//! Values computed from configuration, the clock, randomness or fields
//! already set on the entity graph.

use chrono::Utc;
use playbook_model::CertificateTask;
use rand::Rng;

use crate::config::AssemblerConfig;
use crate::error::{PlaybookError, PlaybookResult};

const CN_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const CN_LABEL_LEN: usize = 16;

/// Source of the current time
pub trait Clock {
    /// Seconds since the Unix epoch
    fn unix_timestamp(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn unix_timestamp(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// Clock frozen at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    #[inline]
    fn unix_timestamp(&self) -> i64 {
        self.0
    }
}

/// Installation file reference
///
/// `pwd_expr + sep + temp_dir + sep + name`. The marker is left unresolved
/// for the automation engine; nothing touches the filesystem.
#[must_use]
pub fn file_path(config: &AssemblerConfig, name: &str) -> String {
    let sep = &config.path_separator;
    format!("{}{sep}{}{sep}{name}", config.pwd_expr, config.temp_dir)
}

/// Workload identifier: `prefix-<unix seconds>`
#[must_use]
pub fn workload_name(prefix: &str, clock: &impl Clock) -> String {
    format!("{prefix}-{}", clock.unix_timestamp())
}

/// Hostname-like common name unlikely to repeat within a run
#[must_use]
pub fn random_common_name(domain: &str) -> String {
    let mut rng = rand::thread_rng();
    let label: String = (0..CN_LABEL_LEN)
        .map(|_| CN_ALPHABET[rng.gen_range(0..CN_ALPHABET.len())] as char)
        .collect();
    format!("{label}.{domain}")
}

/// Set `request.nickname` to `prefix + commonName`
///
/// # Errors
/// Checked in order: [`PlaybookError::MissingRequest`],
/// [`PlaybookError::MissingSubject`], [`PlaybookError::MissingCommonName`]
/// (unset and empty are treated alike).
pub fn derive_nickname(task: &mut CertificateTask, prefix: &str) -> PlaybookResult<()> {
    let request = task
        .request
        .as_mut()
        .ok_or_else(|| PlaybookError::MissingRequest {
            task: task.name.clone(),
        })?;
    let subject = request
        .subject
        .as_ref()
        .ok_or_else(|| PlaybookError::MissingSubject {
            task: task.name.clone(),
        })?;
    let common_name = subject
        .common_name()
        .ok_or_else(|| PlaybookError::MissingCommonName {
            task: task.name.clone(),
        })?;

    request.nickname = Some(format!("{prefix}{common_name}"));
    Ok(())
}
