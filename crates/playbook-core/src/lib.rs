//! Playbook Core - typed, validated playbook assembly
//!
//! Turns a sequence of key/value instructions into a playbook document for
//! a certificate-lifecycle automation engine:
//! - Classifies and coerces scalar fields through closed registries
//! - Assembles the task / request / subject / location / installation graph
//! - Derives dependent values (nicknames, workloads, file paths)
//! - Builds the connection block from external credentials
//! - Flattens the graph into an ordered mapping for YAML emission
//!
//! # Example
//!
//! ```rust
//! use playbook_core::{Assembler, AssemblerConfig, StaticCredentialSource, ENV_CLOUD_APIKEY};
//! use playbook_model::{Platform, PlaybookDocument};
//!
//! # fn main() -> Result<(), playbook_core::PlaybookError> {
//! let assembler = Assembler::new(AssemblerConfig::new());
//! let credentials = StaticCredentialSource::new().with(ENV_CLOUD_APIKEY, "api-key");
//!
//! let mut document = PlaybookDocument::new();
//! assembler.set_connection(&mut document, Platform::Vaas, &credentials)?;
//! assembler.init_certificate_tasks(&mut document);
//! assembler.new_task(&mut document, "first")?;
//!
//! let yaml = playbook_core::to_yaml(&document)?;
//! assert!(yaml.contains("platform: vaas"));
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod assembler;
pub mod config;
pub mod connection;
pub mod credentials;
pub mod derive;
pub mod error;
pub mod registry;
pub mod scenario;
pub mod serialize;

// Re-exports for convenience
pub use assembler::{Assembler, InstallFlags, InstallationSpec};
pub use config::{
    AssemblerConfig, ENV_CLOUD_APIKEY, ENV_CLOUD_ZONE, ENV_TPP_ACCESS_TOKEN, ENV_TPP_TRUST_BUNDLE,
    ENV_TPP_URL, ENV_TPP_ZONE,
};
pub use connection::{build_connection, build_connection_named};
pub use credentials::{
    required_variables, validate_environment, CredentialSource, EnvCredentialSource,
    StaticCredentialSource,
};
pub use derive::{Clock, FixedClock, SystemClock};
pub use error::{PlaybookError, PlaybookResult};
pub use registry::{EntityKind, FieldKind, FieldRegistry, REQUEST_FIELDS, SUBJECT_FIELDS};
pub use scenario::{Instruction, Scenario, ScenarioContext, ScenarioRunner};
pub use serialize::{emit, stringify_keys, to_document, to_yaml};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building playbooks
    pub use crate::{
        Assembler, AssemblerConfig, CredentialSource, EntityKind, InstallFlags, InstallationSpec,
        PlaybookError, PlaybookResult, Scenario, ScenarioRunner,
    };
    pub use playbook_model::{Platform, PlaybookDocument};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use playbook_model::{Platform, PlaybookDocument};
    use serde_yaml::Value;

    #[test]
    fn tpp_flow_to_yaml() {
        let assembler = Assembler::with_clock(AssemblerConfig::new(), FixedClock(1_700_000_000));
        let credentials = StaticCredentialSource::new()
            .with(ENV_TPP_URL, "https://tpp.example.com")
            .with(ENV_TPP_TRUST_BUNDLE, "/opt/bundle.pem")
            .with(ENV_TPP_ACCESS_TOKEN, "token")
            .with(ENV_TPP_ZONE, "Open Source\\vcert");

        let mut document = PlaybookDocument::new();
        assembler
            .set_connection(&mut document, Platform::Tpp, &credentials)
            .unwrap();
        assembler.init_certificate_tasks(&mut document);
        assembler.new_task(&mut document, "t1").unwrap();
        assembler.attach_request(&mut document, "t1").unwrap();
        assembler
            .set_default_zone(&mut document, "t1", Platform::Tpp, &credentials)
            .unwrap();
        assembler.attach_subject(&mut document, "t1").unwrap();
        assembler
            .assign(
                &mut document,
                EntityKind::Subject,
                "t1",
                "commonName",
                &Value::String("a.example.com".to_string()),
            )
            .unwrap();
        assembler.derive_nickname(&mut document, "t1").unwrap();

        let value = to_document(&document).unwrap();
        let request = &value["certificateTasks"][0]["request"];
        assert_eq!(request["nickname"], Value::String("friendly.a.example.com".to_string()));
        assert_eq!(request["zone"], Value::String("Open Source\\vcert".to_string()));
        assert_eq!(
            value["config"]["connection"]["url"],
            Value::String("https://tpp.example.com".to_string())
        );
    }
}
