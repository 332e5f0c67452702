//! Playbook generator front end
//!
//! Loads an assembler configuration and a scenario file, runs the scenario
//! against a credential source and renders the resulting playbook.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use playbook_core::{
    to_document, Assembler, AssemblerConfig, CredentialSource, FieldKind, FieldRegistry,
    PlaybookError, Scenario, ScenarioRunner, REQUEST_FIELDS, SUBJECT_FIELDS,
};
use playbook_model::PlaybookDocument;

/// Exit status for input errors (bad keys, bad values, bad scenario files)
pub const EXIT_INPUT: i32 = 2;
/// Exit status for every other failure
pub const EXIT_FAILURE: i32 = 1;

/// Rendering of the assembled document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    /// Pick the format from the `--json` flag
    #[inline]
    #[must_use]
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Yaml
        }
    }
}

/// Inputs of one `assemble` run
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    pub scenario: PathBuf,
    pub config: Option<PathBuf>,
    pub format: OutputFormat,
}

/// Command line definition
#[must_use]
pub fn command() -> Command {
    Command::new("playbook-gen")
        .version(playbook_core::VERSION)
        .about("Assemble certificate-lifecycle playbooks from scenario files")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("assemble")
                .about("Run a scenario and emit the playbook")
                .arg(
                    Arg::new("scenario")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Scenario file (YAML list of steps)"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Write the playbook here instead of stdout"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .value_parser(value_parser!(PathBuf))
                        .help("Assembler configuration file (YAML)"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("vocabulary")
                .about("List the request and subject field vocabularies")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
}

/// Read the assembler configuration, or defaults when no path is given
///
/// # Errors
/// Unreadable file or invalid YAML
pub fn load_config(path: Option<&Path>) -> Result<AssemblerConfig> {
    let Some(path) = path else {
        return Ok(AssemblerConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = serde_yaml::from_str(&text)
        .with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Read and parse a scenario file
///
/// # Errors
/// Unreadable file or [`PlaybookError::InvalidScenario`]
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario {}", path.display()))?;
    let scenario = Scenario::from_yaml(&text)
        .with_context(|| format!("invalid scenario {}", path.display()))?;
    Ok(scenario)
}

/// Run the scenario and render the document
///
/// # Errors
/// Any load, assembly or rendering failure
pub fn assemble<S: CredentialSource>(options: &AssembleOptions, source: S) -> Result<String> {
    let config = load_config(options.config.as_deref())?;
    let scenario = load_scenario(&options.scenario)?;

    tracing::info!(
        "Running {} ({} steps)",
        options.scenario.display(),
        scenario.steps.len()
    );
    let runner = ScenarioRunner::new(Assembler::new(config), source);
    let context = runner
        .run(&scenario)
        .with_context(|| format!("scenario {} failed", options.scenario.display()))?;

    render(context.document(), options.format)
}

/// Render a document in the requested format
///
/// # Errors
/// [`PlaybookError::MissingConnection`] or an encoder failure
pub fn render(document: &PlaybookDocument, format: OutputFormat) -> Result<String> {
    let value = to_document(document)?;
    let text = match format {
        OutputFormat::Yaml => playbook_core::emit(&value)?,
        OutputFormat::Json => {
            let mut text = serde_json::to_string_pretty(&value)?;
            text.push('\n');
            text
        }
    };
    Ok(text)
}

/// Describe both field vocabularies
///
/// # Errors
/// JSON encoder failure
pub fn vocabulary(format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => {
            let mut text = String::new();
            describe_registry(&mut text, &*REQUEST_FIELDS);
            describe_registry(&mut text, &*SUBJECT_FIELDS);
            Ok(text)
        }
        OutputFormat::Json => {
            let report = serde_json::json!({
                "request": registry_json(&*REQUEST_FIELDS),
                "subject": registry_json(&*SUBJECT_FIELDS),
            });
            Ok(format!("{}\n", serde_json::to_string_pretty(&report)?))
        }
    }
}

fn describe_registry<E>(out: &mut String, registry: &FieldRegistry<E>) {
    for key in registry.keys() {
        let kind = registry.kind_of(key).map_or_else(String::new, |k| k.to_string());
        let emitted = match registry.wire_name(key) {
            Some(wire) if wire == key => String::new(),
            Some(wire) => format!(" (emitted as {wire})"),
            None => " (not emitted)".to_string(),
        };
        out.push_str(&format!("{}.{}: {}{}\n", registry.entity(), key, kind, emitted));
    }
}

fn registry_json<E>(registry: &FieldRegistry<E>) -> serde_json::Value {
    let fields: serde_json::Map<String, serde_json::Value> = registry
        .keys()
        .filter_map(|key| {
            registry
                .kind_of(key)
                .map(|kind: FieldKind| (key.to_string(), serde_json::Value::from(kind.to_string())))
        })
        .collect();
    serde_json::Value::Object(fields)
}

/// Exit status for a failed run
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> i32 {
    let input = err.chain().any(|cause| {
        cause.downcast_ref::<PlaybookError>().is_some_and(|e| {
            let root = e.root();
            root.is_input() || matches!(root, PlaybookError::InvalidScenario(_))
        })
    });
    if input {
        EXIT_INPUT
    } else {
        EXIT_FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn parses_assemble_arguments() {
        let matches = command()
            .try_get_matches_from(["playbook-gen", "assemble", "s.yaml", "-o", "out.yaml", "--json"])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "assemble");
        assert_eq!(args.get_one::<PathBuf>("scenario"), Some(&PathBuf::from("s.yaml")));
        assert_eq!(args.get_one::<PathBuf>("output"), Some(&PathBuf::from("out.yaml")));
        assert!(args.get_flag("json"));
    }

    #[test]
    fn default_config_without_path() {
        assert_eq!(load_config(None).unwrap(), AssemblerConfig::default());
    }

    #[test]
    fn vocabulary_lists_both_entities() {
        let text = vocabulary(OutputFormat::Yaml).unwrap();
        assert!(text.contains("request.timeout: Integer\n"));
        assert!(text.contains("request.dnsNames: ArrayOfString (emitted as sanDNS)\n"));
        assert!(text.contains("request.keyPassword: String (not emitted)\n"));
        assert!(text.contains("subject.commonName: String\n"));
        assert!(!text.contains("request.subject"));
    }

    #[test]
    fn vocabulary_json() {
        let text = vocabulary(OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["request"]["fetchPrivateKey"], "Boolean");
        assert_eq!(value["subject"]["orgUnits"], "ArrayOfString");
    }

    #[test]
    fn render_requires_connection() {
        let err = render(&PlaybookDocument::new(), OutputFormat::Yaml).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PlaybookError>(),
            Some(PlaybookError::MissingConnection)
        ));
        assert_eq!(exit_code(&err), EXIT_FAILURE);
    }
}
