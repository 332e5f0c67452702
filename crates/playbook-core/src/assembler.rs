//! Entity assembler
//!
//! Creates and mutates the entity graph one instruction at a time. Every
//! operation takes the document by mutable reference; the assembler itself
//! only carries configuration and a clock.
//!
//! Operations that need an ancestor entity fail with
//! [`PlaybookError::MissingParent`] instead of creating it implicitly.

use playbook_model::{
    CertificateTask, Installation, InstallationFormat, Location, Platform, PlaybookDocument,
    Request, Subject,
};
use serde_yaml::Value;

use crate::config::AssemblerConfig;
use crate::connection::build_connection;
use crate::credentials::{zone_variable, CredentialSource};
use crate::derive::{self, Clock, SystemClock};
use crate::error::{PlaybookError, PlaybookResult};
use crate::registry::{parse_lenient_bool, split_list, EntityKind, REQUEST_FIELDS, SUBJECT_FIELDS};

/// Installation variant and its required inputs
///
/// File names are bare names; they are expanded with the path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallationSpec {
    /// Certificate, chain and key files
    Pem {
        file: String,
        chain_file: String,
        key_file: String,
    },
    /// Java keystore
    Jks {
        file: String,
        jks_alias: String,
        jks_password: String,
    },
    /// PKCS#12 archive
    Pkcs12 { file: String },
}

impl InstallationSpec {
    /// Format this spec produces
    #[inline]
    #[must_use]
    pub fn format(&self) -> InstallationFormat {
        match self {
            Self::Pem { .. } => InstallationFormat::Pem,
            Self::Jks { .. } => InstallationFormat::Jks,
            Self::Pkcs12 { .. } => InstallationFormat::Pkcs12,
        }
    }
}

/// Presence flags for the fixed optional installation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InstallFlags {
    /// Set `afterInstallAction`
    pub installation: bool,
    /// Set `installValidationAction`
    pub validation: bool,
    /// Set `backupFiles: true`
    pub backup: bool,
}

/// Entity assembler
#[derive(Debug, Clone, Default)]
pub struct Assembler<C = SystemClock> {
    config: AssemblerConfig,
    clock: C,
}

impl Assembler<SystemClock> {
    /// Create assembler on the wall clock
    #[inline]
    #[must_use]
    pub fn new(config: AssemblerConfig) -> Self {
        Self {
            config,
            clock: SystemClock,
        }
    }
}

impl<C: Clock> Assembler<C> {
    /// Create assembler with a specific clock
    #[inline]
    #[must_use]
    pub fn with_clock(config: AssemblerConfig, clock: C) -> Self {
        Self { config, clock }
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Build and set the connection block
    ///
    /// # Errors
    /// [`PlaybookError::MissingEnvironment`] if credentials are incomplete
    pub fn set_connection(
        &self,
        document: &mut PlaybookDocument,
        platform: Platform,
        source: &impl CredentialSource,
    ) -> PlaybookResult<()> {
        let connection = build_connection(&self.config, platform, source)?;
        if document.config.connection.is_some() {
            tracing::warn!("Replacing existing connection with {}", platform);
        }
        document.config.connection = Some(connection);
        Ok(())
    }

    /// Create the (empty) `certificateTasks` block, replacing any existing one
    pub fn init_certificate_tasks(&self, document: &mut PlaybookDocument) {
        document.certificate_tasks = Some(Vec::new());
    }

    /// Append a task
    ///
    /// Name collisions are not rejected; lookups resolve to the first task
    /// with a given name.
    ///
    /// # Errors
    /// [`PlaybookError::MissingParent`] if `certificateTasks` was not created
    pub fn new_task(&self, document: &mut PlaybookDocument, name: &str) -> PlaybookResult<()> {
        let tasks = document
            .certificate_tasks
            .as_mut()
            .ok_or_else(|| PlaybookError::missing_parent(name, "certificateTasks", "create task"))?;

        if tasks.iter().any(|task| task.name == name) {
            tracing::warn!("Task '{}' already exists; the new task will be shadowed", name);
        }
        tasks.push(CertificateTask::new(name));
        tracing::info!("Created task '{}'", name);
        Ok(())
    }

    /// Attach an empty request, replacing any prior one
    ///
    /// # Errors
    /// [`PlaybookError::MissingParent`] if the task does not exist
    pub fn attach_request(&self, document: &mut PlaybookDocument, task: &str) -> PlaybookResult<()> {
        task_mut(document, task, "attach request")?.request = Some(Request::default());
        tracing::debug!("Attached request to '{}'", task);
        Ok(())
    }

    /// Attach an empty subject to the task's request
    ///
    /// # Errors
    /// [`PlaybookError::MissingParent`] if the task or request is missing
    pub fn attach_subject(&self, document: &mut PlaybookDocument, task: &str) -> PlaybookResult<()> {
        request_mut(document, task, "attach subject")?.subject = Some(Subject::default());
        tracing::debug!("Attached subject to '{}'", task);
        Ok(())
    }

    /// Attach a location
    ///
    /// `workload` is `workload_prefix-<unix seconds>`. `replace` is parsed
    /// leniently: only the literal `"true"` is `true`, every other input is
    /// `false` and never an error.
    ///
    /// # Errors
    /// [`PlaybookError::MissingParent`] if the task or request is missing
    pub fn attach_location(
        &self,
        document: &mut PlaybookDocument,
        task: &str,
        instance: &str,
        workload_prefix: &str,
        tls_address: &str,
        replace: &str,
    ) -> PlaybookResult<()> {
        let request = request_mut(document, task, "attach location")?;
        let replace_flag = parse_lenient_bool(replace);
        if !replace_flag && replace != "false" {
            tracing::debug!("Location replace '{}' read as false", replace);
        }

        request.location = Some(Location {
            instance: instance.to_string(),
            workload: derive::workload_name(workload_prefix, &self.clock),
            tls_address: tls_address.to_string(),
            replace: replace_flag,
        });
        Ok(())
    }

    /// Assign a request-level scalar field
    ///
    /// # Errors
    /// [`PlaybookError::MissingParent`] without a request, otherwise any
    /// registry error
    pub fn assign_request_field(
        &self,
        document: &mut PlaybookDocument,
        task: &str,
        key: &str,
        raw: &Value,
    ) -> PlaybookResult<()> {
        let request = request_mut(document, task, "assign request field")?;
        REQUEST_FIELDS.assign(request, key, raw)
    }

    /// Assign a subject-level scalar field
    ///
    /// # Errors
    /// [`PlaybookError::MissingParent`] without a subject, otherwise any
    /// registry error
    pub fn assign_subject_field(
        &self,
        document: &mut PlaybookDocument,
        task: &str,
        key: &str,
        raw: &Value,
    ) -> PlaybookResult<()> {
        let subject = subject_mut(document, task, "assign subject field")?;
        SUBJECT_FIELDS.assign(subject, key, raw)
    }

    /// Assign a scalar field on the given entity kind
    ///
    /// # Errors
    /// See [`Self::assign_request_field`] and [`Self::assign_subject_field`]
    pub fn assign(
        &self,
        document: &mut PlaybookDocument,
        entity: EntityKind,
        task: &str,
        key: &str,
        raw: &Value,
    ) -> PlaybookResult<()> {
        match entity {
            EntityKind::Request => self.assign_request_field(document, task, key, raw),
            EntityKind::Subject => self.assign_subject_field(document, task, key, raw),
        }
    }

    /// Set `request.zone` from the platform's default zone variable
    ///
    /// # Errors
    /// [`PlaybookError::MissingParent`] without a request,
    /// [`PlaybookError::MissingEnvironment`] if the zone variable is absent
    pub fn set_default_zone(
        &self,
        document: &mut PlaybookDocument,
        task: &str,
        platform: Platform,
        source: &impl CredentialSource,
    ) -> PlaybookResult<()> {
        let request = request_mut(document, task, "set default zone")?;
        request.zone = Some(source.require(platform, zone_variable(platform))?);
        Ok(())
    }

    /// Set `subject.commonName` to a generated hostname
    ///
    /// # Errors
    /// [`PlaybookError::MissingParent`] without a subject
    pub fn set_random_common_name(
        &self,
        document: &mut PlaybookDocument,
        task: &str,
    ) -> PlaybookResult<()> {
        let subject = subject_mut(document, task, "set random common name")?;
        let common_name = derive::random_common_name(&self.config.random_cn_domain);
        tracing::debug!("Generated common name {} for '{}'", common_name, task);
        subject.common_name = Some(common_name);
        Ok(())
    }

    /// Set `request.nickname` from the subject's common name
    ///
    /// # Errors
    /// [`PlaybookError::MissingParent`] if the task does not exist, then
    /// the derivation errors of [`derive::derive_nickname`]
    pub fn derive_nickname(&self, document: &mut PlaybookDocument, task: &str) -> PlaybookResult<()> {
        let task = task_mut(document, task, "derive nickname")?;
        derive::derive_nickname(task, &self.config.nickname_prefix)
    }

    /// Create an empty installations list, replacing any prior one
    ///
    /// # Errors
    /// [`PlaybookError::MissingParent`] if the task does not exist
    pub fn attach_installations_list(
        &self,
        document: &mut PlaybookDocument,
        task: &str,
    ) -> PlaybookResult<()> {
        task_mut(document, task, "attach installations")?.installations = Some(Vec::new());
        Ok(())
    }

    /// Append an installation
    ///
    /// # Errors
    /// [`PlaybookError::MissingParent`] if the task or its installations
    /// list is missing
    pub fn attach_installation(
        &self,
        document: &mut PlaybookDocument,
        task: &str,
        spec: InstallationSpec,
        flags: InstallFlags,
    ) -> PlaybookResult<()> {
        let installations = task_mut(document, task, "attach installation")?
            .installations
            .as_mut()
            .ok_or_else(|| PlaybookError::missing_parent(task, "installations", "attach installation"))?;

        let installation = self.build_installation(spec, flags);
        tracing::debug!("Added {} installation to '{}'", installation.format, task);
        installations.push(installation);
        Ok(())
    }

    /// Set `setenvvars` from a comma-separated list
    ///
    /// # Errors
    /// [`PlaybookError::MissingParent`] if the task does not exist
    pub fn set_setenvvars(
        &self,
        document: &mut PlaybookDocument,
        task: &str,
        list: &str,
    ) -> PlaybookResult<()> {
        task_mut(document, task, "set setenvvars")?.setenvvars = Some(split_list(list));
        Ok(())
    }

    /// Set `renewBefore` verbatim
    ///
    /// # Errors
    /// [`PlaybookError::MissingParent`] if the task does not exist
    pub fn set_renew_before(
        &self,
        document: &mut PlaybookDocument,
        task: &str,
        value: &str,
    ) -> PlaybookResult<()> {
        task_mut(document, task, "set renewBefore")?.renew_before = Some(value.to_string());
        Ok(())
    }

    fn build_installation(&self, spec: InstallationSpec, flags: InstallFlags) -> Installation {
        let path = |name: &str| derive::file_path(&self.config, name);
        let format = spec.format();

        let mut installation = match spec {
            InstallationSpec::Pem {
                file,
                chain_file,
                key_file,
            } => Installation {
                chain_file: Some(path(&chain_file)),
                key_file: Some(path(&key_file)),
                ..Installation::new(format, path(&file))
            },
            InstallationSpec::Jks {
                file,
                jks_alias,
                jks_password,
            } => Installation {
                jks_alias: Some(jks_alias),
                jks_password: Some(jks_password),
                ..Installation::new(format, path(&file))
            },
            InstallationSpec::Pkcs12 { file } => Installation::new(format, path(&file)),
        };

        if flags.installation {
            installation.after_install_action = Some(self.config.after_install_action.clone());
        }
        if flags.validation {
            installation.install_validation_action =
                Some(self.config.install_validation_action.clone());
        }
        if flags.backup {
            installation.backup_files = Some(true);
        }
        installation
    }
}

fn task_mut<'d>(
    document: &'d mut PlaybookDocument,
    name: &str,
    operation: &'static str,
) -> PlaybookResult<&'d mut CertificateTask> {
    document
        .find_task_mut(name)
        .ok_or_else(|| PlaybookError::missing_parent(name, "task", operation))
}

fn request_mut<'d>(
    document: &'d mut PlaybookDocument,
    name: &str,
    operation: &'static str,
) -> PlaybookResult<&'d mut Request> {
    task_mut(document, name, operation)?
        .request
        .as_mut()
        .ok_or_else(|| PlaybookError::missing_parent(name, "request", operation))
}

fn subject_mut<'d>(
    document: &'d mut PlaybookDocument,
    name: &str,
    operation: &'static str,
) -> PlaybookResult<&'d mut Subject> {
    request_mut(document, name, operation)?
        .subject
        .as_mut()
        .ok_or_else(|| PlaybookError::missing_parent(name, "subject", operation))
}
