//! Scenario instructions and runner
//!
//! A scenario is an ordered list of instructions applied to one document.
//! Steps run strictly in order and the first failure aborts the run.
//!
//! ```yaml
//! steps:
//!   - op: connection
//!     platform: VaaS
//!   - op: certificate_tasks
//!   - op: new_task
//!     name: t1
//!   - op: request
//!     task: t1
//!   - op: request_field
//!     task: t1
//!     key: timeout
//!     value: 30
//! ```
//!
//! Field values are read as their source text: `value: 30` is the text
//! `"30"`, `value: True` is `"True"` (and fails a Boolean field). A key that
//! does not belong to the step's `op` rejects the whole file.

use playbook_model::{Platform, PlaybookDocument};
use serde::Deserialize;
use serde_yaml::Value;

use crate::assembler::{Assembler, InstallFlags, InstallationSpec};
use crate::credentials::CredentialSource;
use crate::derive::{Clock, SystemClock};
use crate::error::{PlaybookError, PlaybookResult};

/// One scenario step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Build the connection block
    Connection { platform: String },
    /// Create the `certificateTasks` block
    CertificateTasks,
    /// Append a task
    NewTask { name: String },
    /// Attach an empty request
    Request { task: String },
    /// Assign a request scalar field
    RequestField {
        task: String,
        key: String,
        value: String,
    },
    /// Set the request zone from the platform default
    DefaultZone { task: String, platform: String },
    /// Attach a location
    Location {
        task: String,
        instance: String,
        workload_prefix: String,
        tls_address: String,
        replace: String,
    },
    /// Attach an empty subject
    Subject { task: String },
    /// Assign a subject scalar field
    SubjectField {
        task: String,
        key: String,
        value: String,
    },
    /// Generate the subject common name
    RandomCommonName { task: String },
    /// Derive the request nickname from the common name
    NicknameFromCommonName { task: String },
    /// Create the installations list
    Installations { task: String },
    /// Append a PEM installation
    PemInstallation {
        task: String,
        file: String,
        chain_file: String,
        key_file: String,
        flags: InstallFlags,
    },
    /// Append a JKS installation
    JksInstallation {
        task: String,
        file: String,
        jks_alias: String,
        jks_password: String,
        flags: InstallFlags,
    },
    /// Append a PKCS#12 installation
    Pkcs12Installation {
        task: String,
        file: String,
        flags: InstallFlags,
    },
    /// Set `setenvvars` from a comma-separated list
    Setenvvars { task: String, value: String },
    /// Set `renewBefore`
    RenewBefore { task: String, value: String },
}

impl Instruction {
    /// Snake-case operation name, as written in scenario files
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "connection",
            Self::CertificateTasks => "certificate_tasks",
            Self::NewTask { .. } => "new_task",
            Self::Request { .. } => "request",
            Self::RequestField { .. } => "request_field",
            Self::DefaultZone { .. } => "default_zone",
            Self::Location { .. } => "location",
            Self::Subject { .. } => "subject",
            Self::SubjectField { .. } => "subject_field",
            Self::RandomCommonName { .. } => "random_common_name",
            Self::NicknameFromCommonName { .. } => "nickname_from_common_name",
            Self::Installations { .. } => "installations",
            Self::PemInstallation { .. } => "pem_installation",
            Self::JksInstallation { .. } => "jks_installation",
            Self::Pkcs12Installation { .. } => "pkcs12_installation",
            Self::Setenvvars { .. } => "setenvvars",
            Self::RenewBefore { .. } => "renew_before",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Op {
    Connection,
    CertificateTasks,
    NewTask,
    Request,
    RequestField,
    DefaultZone,
    Location,
    Subject,
    SubjectField,
    RandomCommonName,
    NicknameFromCommonName,
    Installations,
    PemInstallation,
    JksInstallation,
    Pkcs12Installation,
    Setenvvars,
    RenewBefore,
}

/// A step as written in the file
///
/// Scalars land in `String` slots and keep their source text.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StepRecord {
    op: Op,
    name: Option<String>,
    task: Option<String>,
    platform: Option<String>,
    key: Option<String>,
    value: Option<String>,
    instance: Option<String>,
    workload_prefix: Option<String>,
    tls_address: Option<String>,
    replace: Option<String>,
    file: Option<String>,
    chain_file: Option<String>,
    key_file: Option<String>,
    jks_alias: Option<String>,
    jks_password: Option<String>,
    installation: Option<bool>,
    validation: Option<bool>,
    backup: Option<bool>,
}

fn required(slot: &mut Option<String>, field: &'static str) -> Result<String, String> {
    slot.take().ok_or_else(|| format!("missing field '{field}'"))
}

impl StepRecord {
    fn into_instruction(mut self) -> Result<Instruction, String> {
        let instruction = match self.op {
            Op::Connection => Instruction::Connection {
                platform: required(&mut self.platform, "platform")?,
            },
            Op::CertificateTasks => Instruction::CertificateTasks,
            Op::NewTask => Instruction::NewTask {
                name: required(&mut self.name, "name")?,
            },
            Op::Request => Instruction::Request {
                task: required(&mut self.task, "task")?,
            },
            Op::RequestField => Instruction::RequestField {
                task: required(&mut self.task, "task")?,
                key: required(&mut self.key, "key")?,
                value: required(&mut self.value, "value")?,
            },
            Op::DefaultZone => Instruction::DefaultZone {
                task: required(&mut self.task, "task")?,
                platform: required(&mut self.platform, "platform")?,
            },
            Op::Location => Instruction::Location {
                task: required(&mut self.task, "task")?,
                instance: required(&mut self.instance, "instance")?,
                workload_prefix: required(&mut self.workload_prefix, "workload_prefix")?,
                tls_address: required(&mut self.tls_address, "tls_address")?,
                replace: required(&mut self.replace, "replace")?,
            },
            Op::Subject => Instruction::Subject {
                task: required(&mut self.task, "task")?,
            },
            Op::SubjectField => Instruction::SubjectField {
                task: required(&mut self.task, "task")?,
                key: required(&mut self.key, "key")?,
                value: required(&mut self.value, "value")?,
            },
            Op::RandomCommonName => Instruction::RandomCommonName {
                task: required(&mut self.task, "task")?,
            },
            Op::NicknameFromCommonName => Instruction::NicknameFromCommonName {
                task: required(&mut self.task, "task")?,
            },
            Op::Installations => Instruction::Installations {
                task: required(&mut self.task, "task")?,
            },
            Op::PemInstallation => Instruction::PemInstallation {
                task: required(&mut self.task, "task")?,
                file: required(&mut self.file, "file")?,
                chain_file: required(&mut self.chain_file, "chain_file")?,
                key_file: required(&mut self.key_file, "key_file")?,
                flags: self.take_flags(),
            },
            Op::JksInstallation => Instruction::JksInstallation {
                task: required(&mut self.task, "task")?,
                file: required(&mut self.file, "file")?,
                jks_alias: required(&mut self.jks_alias, "jks_alias")?,
                jks_password: required(&mut self.jks_password, "jks_password")?,
                flags: self.take_flags(),
            },
            Op::Pkcs12Installation => Instruction::Pkcs12Installation {
                task: required(&mut self.task, "task")?,
                file: required(&mut self.file, "file")?,
                flags: self.take_flags(),
            },
            Op::Setenvvars => Instruction::Setenvvars {
                task: required(&mut self.task, "task")?,
                value: required(&mut self.value, "value")?,
            },
            Op::RenewBefore => Instruction::RenewBefore {
                task: required(&mut self.task, "task")?,
                value: required(&mut self.value, "value")?,
            },
        };

        match self.leftover() {
            Some(field) => Err(format!(
                "field '{field}' does not apply to {}",
                instruction.name()
            )),
            None => Ok(instruction),
        }
    }

    fn take_flags(&mut self) -> InstallFlags {
        InstallFlags {
            installation: self.installation.take().unwrap_or(false),
            validation: self.validation.take().unwrap_or(false),
            backup: self.backup.take().unwrap_or(false),
        }
    }

    /// First field still set after conversion
    fn leftover(&self) -> Option<&'static str> {
        [
            ("name", self.name.is_some()),
            ("task", self.task.is_some()),
            ("platform", self.platform.is_some()),
            ("key", self.key.is_some()),
            ("value", self.value.is_some()),
            ("instance", self.instance.is_some()),
            ("workload_prefix", self.workload_prefix.is_some()),
            ("tls_address", self.tls_address.is_some()),
            ("replace", self.replace.is_some()),
            ("file", self.file.is_some()),
            ("chain_file", self.chain_file.is_some()),
            ("key_file", self.key_file.is_some()),
            ("jks_alias", self.jks_alias.is_some()),
            ("jks_password", self.jks_password.is_some()),
            ("installation", self.installation.is_some()),
            ("validation", self.validation.is_some()),
            ("backup", self.backup.is_some()),
        ]
        .into_iter()
        .find_map(|(field, set)| set.then_some(field))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioFile {
    steps: Vec<StepRecord>,
}

/// Ordered list of instructions
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "ScenarioFile")]
pub struct Scenario {
    /// Steps in execution order
    pub steps: Vec<Instruction>,
}

impl TryFrom<ScenarioFile> for Scenario {
    type Error = String;

    fn try_from(file: ScenarioFile) -> Result<Self, Self::Error> {
        let steps = file
            .steps
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                record
                    .into_instruction()
                    .map_err(|e| format!("step {index}: {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { steps })
    }
}

impl Scenario {
    /// Create from steps
    #[inline]
    #[must_use]
    pub fn new(steps: Vec<Instruction>) -> Self {
        Self { steps }
    }

    /// Parse from YAML
    ///
    /// # Errors
    /// [`PlaybookError::InvalidScenario`] if the text is not a scenario,
    /// names a key its step does not take, or misses a required one
    pub fn from_yaml(yaml: &str) -> PlaybookResult<Self> {
        serde_yaml::from_str(yaml).map_err(|e| PlaybookError::InvalidScenario(e.to_string()))
    }
}

/// Per-scenario state: the document under construction plus values
/// recorded for later verification
#[derive(Debug, Clone, Default)]
pub struct ScenarioContext {
    document: PlaybookDocument,
    key_password: Option<String>,
}

impl ScenarioContext {
    /// Create empty context
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Document under construction
    #[inline]
    #[must_use]
    pub fn document(&self) -> &PlaybookDocument {
        &self.document
    }

    /// Mutable document
    #[inline]
    pub fn document_mut(&mut self) -> &mut PlaybookDocument {
        &mut self.document
    }

    /// Last `keyPassword` assigned to any request
    #[inline]
    #[must_use]
    pub fn key_password(&self) -> Option<&str> {
        self.key_password.as_deref()
    }

    /// Tear down, keeping the document
    #[inline]
    #[must_use]
    pub fn into_document(self) -> PlaybookDocument {
        self.document
    }
}

/// Applies scenarios against an assembler and a credential source
#[derive(Debug, Clone)]
pub struct ScenarioRunner<S, C = SystemClock> {
    assembler: Assembler<C>,
    credentials: S,
}

impl<S: CredentialSource, C: Clock> ScenarioRunner<S, C> {
    /// Create runner
    #[inline]
    #[must_use]
    pub fn new(assembler: Assembler<C>, credentials: S) -> Self {
        Self {
            assembler,
            credentials,
        }
    }

    /// Assembler in use
    #[inline]
    #[must_use]
    pub fn assembler(&self) -> &Assembler<C> {
        &self.assembler
    }

    /// Run every step on a fresh context
    ///
    /// # Errors
    /// [`PlaybookError::Scenario`] wrapping the first failing step
    pub fn run(&self, scenario: &Scenario) -> PlaybookResult<ScenarioContext> {
        let mut context = ScenarioContext::new();
        for (index, step) in scenario.steps.iter().enumerate() {
            tracing::debug!("Step {}: {}", index, step.name());
            self.apply(&mut context, step).map_err(|e| {
                tracing::error!("Step {} ({}) failed: {}", index, step.name(), e);
                PlaybookError::Scenario {
                    index,
                    source: Box::new(e),
                }
            })?;
        }
        tracing::info!(
            "Scenario finished: {} steps, {} tasks",
            scenario.steps.len(),
            context.document().task_count()
        );
        Ok(context)
    }

    /// Apply one instruction
    ///
    /// # Errors
    /// Whatever the underlying assembler operation returns
    pub fn apply(&self, context: &mut ScenarioContext, step: &Instruction) -> PlaybookResult<()> {
        let assembler = &self.assembler;
        let document = &mut context.document;

        match step {
            Instruction::Connection { platform } => {
                let platform: Platform = platform.parse()?;
                assembler.set_connection(document, platform, &self.credentials)
            }
            Instruction::CertificateTasks => {
                assembler.init_certificate_tasks(document);
                Ok(())
            }
            Instruction::NewTask { name } => assembler.new_task(document, name),
            Instruction::Request { task } => assembler.attach_request(document, task),
            Instruction::RequestField { task, key, value } => {
                assembler.assign_request_field(document, task, key, &Value::String(value.clone()))?;
                if key == "keyPassword" {
                    context.key_password = Some(value.clone());
                }
                Ok(())
            }
            Instruction::DefaultZone { task, platform } => {
                let platform: Platform = platform.parse()?;
                assembler.set_default_zone(document, task, platform, &self.credentials)
            }
            Instruction::Location {
                task,
                instance,
                workload_prefix,
                tls_address,
                replace,
            } => assembler.attach_location(
                document,
                task,
                instance,
                workload_prefix,
                tls_address,
                replace,
            ),
            Instruction::Subject { task } => assembler.attach_subject(document, task),
            Instruction::SubjectField { task, key, value } => {
                assembler.assign_subject_field(document, task, key, &Value::String(value.clone()))
            }
            Instruction::RandomCommonName { task } => {
                assembler.set_random_common_name(document, task)
            }
            Instruction::NicknameFromCommonName { task } => {
                assembler.derive_nickname(document, task)
            }
            Instruction::Installations { task } => {
                assembler.attach_installations_list(document, task)
            }
            Instruction::PemInstallation {
                task,
                file,
                chain_file,
                key_file,
                flags,
            } => assembler.attach_installation(
                document,
                task,
                InstallationSpec::Pem {
                    file: file.clone(),
                    chain_file: chain_file.clone(),
                    key_file: key_file.clone(),
                },
                *flags,
            ),
            Instruction::JksInstallation {
                task,
                file,
                jks_alias,
                jks_password,
                flags,
            } => assembler.attach_installation(
                document,
                task,
                InstallationSpec::Jks {
                    file: file.clone(),
                    jks_alias: jks_alias.clone(),
                    jks_password: jks_password.clone(),
                },
                *flags,
            ),
            Instruction::Pkcs12Installation {
                task,
                file,
                flags,
            } => assembler.attach_installation(
                document,
                task,
                InstallationSpec::Pkcs12 { file: file.clone() },
                *flags,
            ),
            Instruction::Setenvvars { task, value } => {
                assembler.set_setenvvars(document, task, value)
            }
            Instruction::RenewBefore { task, value } => {
                assembler.set_renew_before(document, task, value)
            }
        }
    }
}
