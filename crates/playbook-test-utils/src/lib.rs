//! Testing utilities for the playbook workspace
//!
//! Shared fixtures: credential sets, a frozen clock and prebuilt documents.

#![allow(missing_docs)]

use playbook_core::{
    Assembler, AssemblerConfig, FixedClock, ScenarioRunner, StaticCredentialSource,
    ENV_CLOUD_APIKEY, ENV_CLOUD_ZONE, ENV_TPP_ACCESS_TOKEN, ENV_TPP_TRUST_BUNDLE, ENV_TPP_URL,
    ENV_TPP_ZONE,
};
use playbook_model::PlaybookDocument;
use serde_yaml::Value;

pub const FIXED_TIMESTAMP: i64 = 1_700_000_000;
pub const TPP_URL: &str = "https://tpp.example.com/vedsdk";
pub const TPP_TRUST_BUNDLE: &str = "/opt/venafi/bundle.pem";
pub const TPP_ACCESS_TOKEN: &str = "tpp-access-token";
pub const TPP_ZONE: &str = "Open Source\\vcert";
pub const CLOUD_APIKEY: &str = "cloud-api-key";
pub const CLOUD_ZONE: &str = "vcert\\Default";

pub fn tpp_credentials() -> StaticCredentialSource {
    StaticCredentialSource::new()
        .with(ENV_TPP_URL, TPP_URL)
        .with(ENV_TPP_TRUST_BUNDLE, TPP_TRUST_BUNDLE)
        .with(ENV_TPP_ACCESS_TOKEN, TPP_ACCESS_TOKEN)
        .with(ENV_TPP_ZONE, TPP_ZONE)
}

pub fn vaas_credentials() -> StaticCredentialSource {
    StaticCredentialSource::new()
        .with(ENV_CLOUD_APIKEY, CLOUD_APIKEY)
        .with(ENV_CLOUD_ZONE, CLOUD_ZONE)
}

pub fn fixed_assembler() -> Assembler<FixedClock> {
    Assembler::with_clock(AssemblerConfig::new(), FixedClock(FIXED_TIMESTAMP))
}

pub fn fixed_runner(
    credentials: StaticCredentialSource,
) -> ScenarioRunner<StaticCredentialSource, FixedClock> {
    ScenarioRunner::new(fixed_assembler(), credentials)
}

/// Document with the tasks block created and one empty task per name
pub fn document_with_tasks(names: &[&str]) -> PlaybookDocument {
    let assembler = fixed_assembler();
    let mut document = PlaybookDocument::new();
    assembler.init_certificate_tasks(&mut document);
    for name in names {
        assembler.new_task(&mut document, name).unwrap();
    }
    document
}

/// Same as [`document_with_tasks`] with a request and subject on each task
pub fn document_with_subjects(names: &[&str]) -> PlaybookDocument {
    let assembler = fixed_assembler();
    let mut document = document_with_tasks(names);
    for name in names {
        assembler.attach_request(&mut document, name).unwrap();
        assembler.attach_subject(&mut document, name).unwrap();
    }
    document
}

pub fn text(s: &str) -> Value {
    Value::String(s.to_string())
}
