//! Pipeline configuration loading.

use std::collections::HashMap;
use std::path::PathBuf;

use compositor::presets::{dust, true_color};
use compositor::Channel;
use pipeline::{resolve_recipes, ConfigError, PipelineConfig, RecipeEntry};

const MIXED_CONFIG: &str = r#"
parallel: false
output_dir: /tmp/composites
recipes:
  - true_color
  - preset: dust
  - name: ir_window
    description: "Clean IR window, cold is bright"
    red:   { source: [{ band: 13 }], clip: { lower: 180.0, upper: 320.0 }, invert: true }
    green: { source: [{ band: 13 }], clip: { lower: 180.0, upper: 320.0 }, invert: true }
    blue:  { source: [{ band: 13 }], clip: { lower: 180.0, upper: 320.0 }, invert: true }
"#;

#[test]
fn test_presets_and_inline_recipes() {
    let config = PipelineConfig::from_yaml(MIXED_CONFIG).unwrap();
    assert!(!config.parallel);
    assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/composites")));
    assert_eq!(config.recipes[0], RecipeEntry::Name("true_color".to_string()));
    assert_eq!(config.recipes[1], RecipeEntry::preset("dust"));

    let recipes = resolve_recipes(&config).unwrap();
    assert_eq!(recipes.len(), 3);
    assert_eq!(recipes[0], true_color());
    assert_eq!(recipes[1], dust());
    assert_eq!(recipes[2].name, "ir_window");
    assert!(recipes[2].layer(Channel::Green).invert);
    assert_eq!(recipes[2].required_bands(), vec![13]);
}

#[test]
fn test_empty_document_uses_defaults() {
    let config = PipelineConfig::from_yaml("{}").unwrap();
    assert_eq!(config, PipelineConfig::default());
    assert_eq!(resolve_recipes(&config).unwrap().len(), 4);
}

#[test]
fn test_unknown_preset_is_rejected() {
    let err = PipelineConfig::from_yaml("recipes: [true_color, natural_color]").unwrap_err();
    match err {
        ConfigError::UnknownPreset { name, known } => {
            assert_eq!(name, "natural_color");
            assert!(known.contains("airmass"));
        }
        other => panic!("expected UnknownPreset, got {:?}", other),
    }
}

#[test]
fn test_duplicate_names_are_rejected() {
    let err = PipelineConfig::from_yaml("recipes: [dust, { preset: DUST }]").unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateRecipe(name) if name == "dust"));
}

#[test]
fn test_malformed_yaml() {
    assert!(matches!(
        PipelineConfig::from_yaml("recipes: [dust"),
        Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
        PipelineConfig::from_yaml("parallel: sometimes"),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_variable_substitution() {
    std::env::remove_var("CONFIG_TESTS_UNSET_DIR");
    let config =
        PipelineConfig::from_yaml("output_dir: ${CONFIG_TESTS_UNSET_DIR:-./out}\nrecipes: [dust]")
            .unwrap();
    assert_eq!(config.output_dir, Some(PathBuf::from("./out")));
}

#[test]
fn test_overrides() {
    let env: HashMap<&str, &str> = [
        ("COMPOSER_OUTPUT_DIR", "/srv/rgb"),
        ("COMPOSER_PARALLEL", "false"),
    ]
    .into_iter()
    .collect();

    let config = PipelineConfig::default()
        .with_overrides_from(|name| env.get(name).map(|v| v.to_string()))
        .unwrap();
    assert_eq!(config.output_dir, Some(PathBuf::from("/srv/rgb")));
    assert!(!config.parallel);

    let untouched = PipelineConfig::default().with_overrides_from(|_| None).unwrap();
    assert_eq!(untouched, PipelineConfig::default());
}

#[test]
fn test_invalid_override() {
    let err = PipelineConfig::default()
        .with_overrides_from(|name| (name == "COMPOSER_PARALLEL").then(|| "perhaps".to_string()))
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { name, .. } if name == "COMPOSER_PARALLEL"));
}

#[test]
fn test_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recipes.yaml");
    std::fs::write(&path, MIXED_CONFIG).unwrap();

    let config = PipelineConfig::from_file(&path).unwrap();
    assert_eq!(config.recipes.len(), 3);

    let missing = PipelineConfig::from_file(dir.path().join("nope.yaml")).unwrap_err();
    assert!(matches!(missing, ConfigError::Io { .. }));
}
