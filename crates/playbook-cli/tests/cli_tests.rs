use std::fs;
use std::path::Path;

use playbook_cli::{assemble, exit_code, AssembleOptions, OutputFormat, EXIT_FAILURE, EXIT_INPUT};
use playbook_test_utils::{tpp_credentials, vaas_credentials, CLOUD_APIKEY, TPP_URL};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const VAAS_SCENARIO: &str = r#"
steps:
  - op: connection
    platform: vaas
  - op: certificate_tasks
  - op: new_task
    name: web
  - op: request
    task: web
  - op: default_zone
    task: web
    platform: vaas
  - op: installations
    task: web
  - op: jks_installation
    task: web
    file: keystore.jks
    jks_alias: venafi
    jks_password: changeit
    installation: true
"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn options(scenario: &Path, config: Option<&Path>, format: OutputFormat) -> AssembleOptions {
    AssembleOptions {
        scenario: scenario.to_path_buf(),
        config: config.map(Path::to_path_buf),
        format,
    }
}

#[test]
fn test_assemble_yaml_from_files() {
    let dir = TempDir::new().unwrap();
    let scenario = write(&dir, "scenario.yaml", VAAS_SCENARIO);

    let yaml = assemble(&options(&scenario, None, OutputFormat::Yaml), vaas_credentials()).unwrap();
    let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();

    assert_eq!(value["config"]["connection"]["credentials"]["accessToken"], CLOUD_APIKEY);
    let jks = &value["certificateTasks"][0]["installations"][0];
    assert_eq!(jks["format"], "JKS");
    assert_eq!(jks["file"], "{{- Env \"PWD\" }}/tmp/keystore.jks");
    assert_eq!(jks["jksAlias"], "venafi");
    assert_eq!(jks["jksPassword"], "changeit");
    assert_eq!(jks["afterInstallAction"], "echo SuccessInstall");
}

#[test]
fn test_config_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let scenario = write(&dir, "scenario.yaml", VAAS_SCENARIO);
    let config = write(
        &dir,
        "config.yaml",
        "client_id: my-client\ntemp_dir: out\nafter_install_action: systemctl reload nginx\n",
    );

    let yaml = assemble(
        &options(&scenario, Some(&config), OutputFormat::Yaml),
        vaas_credentials(),
    )
    .unwrap();
    let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();

    assert_eq!(value["config"]["connection"]["credentials"]["clientId"], "my-client");
    let jks = &value["certificateTasks"][0]["installations"][0];
    assert_eq!(jks["file"], "{{- Env \"PWD\" }}/out/keystore.jks");
    assert_eq!(jks["afterInstallAction"], "systemctl reload nginx");
}

#[test]
fn test_assemble_json() {
    let dir = TempDir::new().unwrap();
    let scenario = write(
        &dir,
        "scenario.yaml",
        "steps:\n  - op: connection\n    platform: tpp\n  - op: certificate_tasks\n",
    );

    let json = assemble(&options(&scenario, None, OutputFormat::Json), tpp_credentials()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["config"]["connection"]["platform"], "tpp");
    assert_eq!(value["config"]["connection"]["url"], TPP_URL);
    assert_eq!(value["certificateTasks"], serde_json::json!([]));
}

#[test]
fn test_unknown_field_is_input_error() {
    let dir = TempDir::new().unwrap();
    let scenario = write(
        &dir,
        "scenario.yaml",
        r#"
steps:
  - op: connection
    platform: vaas
  - op: certificate_tasks
  - op: new_task
    name: web
  - op: request
    task: web
  - op: request_field
    task: web
    key: colour
    value: blue
"#,
    );

    let err = assemble(&options(&scenario, None, OutputFormat::Yaml), vaas_credentials())
        .unwrap_err();
    assert_eq!(exit_code(&err), EXIT_INPUT);
    assert!(format!("{err:#}").contains("colour"));
}

#[test]
fn test_malformed_scenario_is_input_error() {
    let dir = TempDir::new().unwrap();
    let scenario = write(&dir, "scenario.yaml", "steps:\n  - op: launch\n");

    let err = assemble(&options(&scenario, None, OutputFormat::Yaml), vaas_credentials())
        .unwrap_err();
    assert_eq!(exit_code(&err), EXIT_INPUT);
}

#[test]
fn test_missing_environment_is_failure() {
    let dir = TempDir::new().unwrap();
    let scenario = write(&dir, "scenario.yaml", VAAS_SCENARIO);

    let err = assemble(&options(&scenario, None, OutputFormat::Yaml), tpp_credentials())
        .unwrap_err();
    assert_eq!(exit_code(&err), EXIT_FAILURE);
    assert!(format!("{err:#}").contains("CLOUD_APIKEY"));
}

#[test]
fn test_missing_scenario_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.yaml");

    let err = assemble(&options(&missing, None, OutputFormat::Yaml), vaas_credentials())
        .unwrap_err();
    assert_eq!(exit_code(&err), EXIT_FAILURE);
    assert!(err.to_string().contains("failed to read scenario"));
}
