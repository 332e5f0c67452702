use playbook_core::{
    to_document, EntityKind, InstallFlags, InstallationSpec, PlaybookError, StaticCredentialSource,
};
use playbook_model::{InstallationFormat, Platform, PlaybookDocument};
use playbook_test_utils::{
    document_with_subjects, document_with_tasks, fixed_assembler, text, tpp_credentials,
    vaas_credentials, CLOUD_ZONE, FIXED_TIMESTAMP, TPP_TRUST_BUNDLE, TPP_ZONE,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn test_default_zone_per_platform() {
    let assembler = fixed_assembler();
    let mut document = document_with_subjects(&["tpp", "vaas"]);

    assembler
        .set_default_zone(&mut document, "tpp", Platform::Tpp, &tpp_credentials())
        .unwrap();
    assembler
        .set_default_zone(&mut document, "vaas", Platform::Vaas, &vaas_credentials())
        .unwrap();

    let zone = |name: &str| {
        document
            .find_task(name)
            .and_then(|task| task.request.as_ref())
            .and_then(|request| request.zone.clone())
    };
    assert_eq!(zone("tpp").as_deref(), Some(TPP_ZONE));
    assert_eq!(zone("vaas").as_deref(), Some(CLOUD_ZONE));
}

#[test]
fn test_default_zone_missing_variable() {
    let assembler = fixed_assembler();
    let mut document = document_with_subjects(&["t1"]);

    let err = assembler
        .set_default_zone(&mut document, "t1", Platform::Vaas, &StaticCredentialSource::new())
        .unwrap_err();
    match err {
        PlaybookError::MissingEnvironment { platform, variables } => {
            assert_eq!(platform, Platform::Vaas);
            assert_eq!(variables, vec!["CLOUD_ZONE".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_location_replace_is_lenient() {
    let assembler = fixed_assembler();
    let mut document = document_with_subjects(&["t1"]);

    assembler
        .attach_location(&mut document, "t1", "inst", "wl", "host:443", "maybe")
        .unwrap();

    let location = document.find_task("t1").unwrap().request.as_ref().unwrap().location.clone().unwrap();
    assert!(!location.replace);
    assert_eq!(location.workload, format!("wl-{FIXED_TIMESTAMP}"));
}

#[test]
fn test_strict_boolean_rejects_what_location_accepts() {
    let assembler = fixed_assembler();
    let mut document = document_with_subjects(&["t1"]);

    let err = assembler
        .assign(&mut document, EntityKind::Request, "t1", "omitSans", &text("1"))
        .unwrap_err();
    assert!(matches!(err, PlaybookError::InvalidType { ref key, .. } if key == "omitSans"));

    assembler
        .attach_location(&mut document, "t1", "inst", "wl", "host:443", "1")
        .unwrap();
}

#[test]
fn test_nickname_requires_non_empty_common_name() {
    let assembler = fixed_assembler();
    let mut document = document_with_subjects(&["t1"]);

    let err = assembler.derive_nickname(&mut document, "t1").unwrap_err();
    assert!(matches!(err, PlaybookError::MissingCommonName { .. }));

    assembler
        .assign(&mut document, EntityKind::Subject, "t1", "commonName", &text(""))
        .unwrap();
    let err = assembler.derive_nickname(&mut document, "t1").unwrap_err();
    assert!(matches!(err, PlaybookError::MissingCommonName { .. }));
    assert!(err.is_precondition());
}

#[test]
fn test_nickname_follows_common_name() {
    let assembler = fixed_assembler();
    let mut document = document_with_subjects(&["t1"]);

    assembler.set_random_common_name(&mut document, "t1").unwrap();
    assembler.derive_nickname(&mut document, "t1").unwrap();

    let request = document.find_task("t1").unwrap().request.as_ref().unwrap();
    let common_name = request.subject.as_ref().unwrap().common_name().unwrap();
    assert!(common_name.ends_with(".vcert.example.com"));
    assert_eq!(request.nickname.clone().unwrap(), format!("friendly.{common_name}"));
}

#[test]
fn test_installation_order_and_paths() {
    let assembler = fixed_assembler();
    let mut document = document_with_tasks(&["t1"]);
    assembler.attach_installations_list(&mut document, "t1").unwrap();

    for spec in [
        InstallationSpec::Pkcs12 {
            file: "a.p12".to_string(),
        },
        InstallationSpec::Pem {
            file: "c.pem".to_string(),
            chain_file: "chain.pem".to_string(),
            key_file: "k.pem".to_string(),
        },
        InstallationSpec::Jks {
            file: "ks.jks".to_string(),
            jks_alias: "alias".to_string(),
            jks_password: "secret".to_string(),
        },
    ] {
        assembler
            .attach_installation(&mut document, "t1", spec, InstallFlags::default())
            .unwrap();
    }

    let installations = document.find_task("t1").unwrap().installations.clone().unwrap();
    let formats: Vec<InstallationFormat> = installations.iter().map(|i| i.format).collect();
    assert_eq!(
        formats,
        vec![InstallationFormat::Pkcs12, InstallationFormat::Pem, InstallationFormat::Jks]
    );
    assert_eq!(installations[1].file, "{{- Env \"PWD\" }}/tmp/c.pem");
    assert!(installations.iter().all(|i| i.after_install_action.is_none()));
}

#[test]
fn test_installation_requires_list() {
    let assembler = fixed_assembler();
    let mut document = document_with_tasks(&["t1"]);

    let err = assembler
        .attach_installation(
            &mut document,
            "t1",
            InstallationSpec::Pkcs12 {
                file: "a.p12".to_string(),
            },
            InstallFlags::default(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        PlaybookError::MissingParent { parent: "installations", .. }
    ));
}

#[test]
fn test_reattached_request_is_replaced() {
    let assembler = fixed_assembler();
    let mut document = document_with_subjects(&["t1"]);
    assembler
        .assign(&mut document, EntityKind::Request, "t1", "timeout", &text("30"))
        .unwrap();

    assembler.attach_request(&mut document, "t1").unwrap();

    let request = document.find_task("t1").unwrap().request.clone().unwrap();
    assert_eq!(request, playbook_model::Request::default());
}

#[test]
fn test_tpp_connection_serialized() {
    let assembler = fixed_assembler();
    let mut document = PlaybookDocument::new();
    assembler
        .set_connection(&mut document, Platform::Tpp, &tpp_credentials())
        .unwrap();

    let value = to_document(&document).unwrap();
    assert_eq!(value["config"]["connection"]["trustBundle"], TPP_TRUST_BUNDLE);
    assert_eq!(value["config"]["connection"]["credentials"]["clientId"], "vcert-sdk");
}

proptest! {
    #[test]
    fn prop_setenvvars_preserve_order(items in prop::collection::vec("[a-z]{1,8}", 1..10)) {
        let assembler = fixed_assembler();
        let mut document = document_with_tasks(&["t1"]);

        assembler.set_setenvvars(&mut document, "t1", &items.join(",")).unwrap();

        let stored = document.find_task("t1").unwrap().setenvvars.clone().unwrap();
        prop_assert_eq!(stored, items);
    }

    #[test]
    fn prop_replace_true_only_for_literal(raw in "[a-zA-Z]{0,6}") {
        let assembler = fixed_assembler();
        let mut document = document_with_subjects(&["t1"]);

        assembler.attach_location(&mut document, "t1", "i", "w", "h:1", &raw).unwrap();

        let location = document.find_task("t1").unwrap().request.as_ref().unwrap().location.clone().unwrap();
        prop_assert_eq!(location.replace, raw == "true");
    }
}
