//! Playbook document root

use serde::{Deserialize, Serialize};

use crate::connection::ConnectionConfig;
use crate::task::CertificateTask;

/// `config` block of a playbook
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaybookConfig {
    /// Connection block; required before the document can be serialized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionConfig>,
}

/// Root of the entity graph
///
/// Exclusively owns every descendant entity. Created at scenario start,
/// mutated in place, serialized once, then dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybookDocument {
    /// Connection configuration
    #[serde(default)]
    pub config: PlaybookConfig,

    /// Tasks; `None` until the block is explicitly created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_tasks: Option<Vec<CertificateTask>>,
}

impl PlaybookDocument {
    /// Create empty document
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Connection block, if set
    #[inline]
    #[must_use]
    pub fn connection(&self) -> Option<&ConnectionConfig> {
        self.config.connection.as_ref()
    }

    /// Find task by name
    ///
    /// Names are not unique. The first task in insertion order wins and
    /// later tasks with the same name are shadowed.
    #[must_use]
    pub fn find_task(&self, name: &str) -> Option<&CertificateTask> {
        self.certificate_tasks
            .as_ref()?
            .iter()
            .find(|task| task.name == name)
    }

    /// Mutable variant of [`Self::find_task`], same first-match rule
    pub fn find_task_mut(&mut self, name: &str) -> Option<&mut CertificateTask> {
        self.certificate_tasks
            .as_mut()?
            .iter_mut()
            .find(|task| task.name == name)
    }

    /// Number of tasks (zero when the block is absent)
    #[inline]
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.certificate_tasks.as_ref().map_or(0, Vec::len)
    }
}
