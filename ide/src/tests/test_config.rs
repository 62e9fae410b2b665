use crate::{DEFAULT_COMPLETION_LIMIT, DEFAULT_MAX_DIAGNOSTICS, IdeConfig, IdeError};

#[test]
fn empty_config_is_default() {
    let config = IdeConfig::from_json("  ").unwrap();
    assert_eq!(config, IdeConfig::default());
    assert_eq!(config.max_diagnostics, DEFAULT_MAX_DIAGNOSTICS);
    assert_eq!(config.completion_limit, DEFAULT_COMPLETION_LIMIT);
    assert!(config.hover_doc_comments);
}

#[test]
fn missing_keys_keep_defaults() {
    let config = IdeConfig::from_json(r#"{ "completion_limit": 5 }"#).unwrap();
    assert_eq!(
        config,
        IdeConfig {
            completion_limit: 5,
            ..IdeConfig::default()
        }
    );

    let config = IdeConfig::from_json(r#"{ "hover_doc_comments": false }"#).unwrap();
    assert!(!config.hover_doc_comments);
    assert_eq!(config.max_diagnostics, DEFAULT_MAX_DIAGNOSTICS);
}

#[test]
fn unknown_keys_are_rejected() {
    let err = IdeConfig::from_json(r#"{ "max_diagnostic": 3 }"#).unwrap_err();
    match err {
        IdeError::InvalidConfig(message) => assert!(message.contains("unknown field"), "{message}"),
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
}

#[test]
fn malformed_values_are_rejected() {
    assert!(matches!(
        IdeConfig::from_json(r#"{ "max_diagnostics": "many" }"#),
        Err(IdeError::InvalidConfig(_))
    ));
    assert!(matches!(
        IdeConfig::from_json("{"),
        Err(IdeError::InvalidConfig(_))
    ));
}

#[test]
fn zero_limits_are_rejected() {
    assert_eq!(
        IdeConfig::from_json(r#"{ "max_diagnostics": 0 }"#),
        Err(IdeError::InvalidConfig(
            "max_diagnostics must be at least 1".into()
        ))
    );
    assert_eq!(
        IdeConfig::from_json(r#"{ "completion_limit": 0 }"#),
        Err(IdeError::InvalidConfig(
            "completion_limit must be at least 1".into()
        ))
    );
}
