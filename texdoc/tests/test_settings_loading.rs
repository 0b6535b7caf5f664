use std::path::{Path, PathBuf};
use texdoc::config::{ConfigError, Engine, InteractionMode, Settings};
use texdoc::prelude::*;
use texdoc::resources::FsProvisioner;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Test that the bundled settings fixture parses with every section set
#[test]
fn test_settings_fixture_loads() {
    let settings = Settings::load(fixture("settings.toml")).expect("fixture should be valid");

    assert_eq!(settings.directories.temp_dir.as_deref(), Some(Path::new("temp")));
    assert_eq!(settings.compilation.engine, Engine::Xelatex);
    assert_eq!(settings.compilation.compile_times, 3);
    assert_eq!(
        settings.compilation.interaction_mode,
        InteractionMode::Nonstopmode
    );
    assert_eq!(settings.compilation.extra_options, vec!["-file-line-error"]);
    assert_eq!(settings.compilation.timeout_secs, 120);
    assert_eq!(
        settings.encoding.fallback_encodings,
        vec!["utf-8", "shift_jis"]
    );
    assert!(settings.file_management.keep_tex);

    let removed = settings.file_management.extensions_to_remove();
    assert!(removed.contains(&".toc".to_string()));
    assert!(!removed.contains(&".tex".to_string()));
}

/// Test that settings survive a save and reload
#[test]
fn test_settings_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");

    let mut settings = Settings::default();
    settings.compilation.engine = Engine::Lualatex;
    settings.file_management.cleanup = false;
    settings.save(&path).unwrap();

    let reloaded = Settings::load(&path).unwrap();
    assert_eq!(reloaded, settings);
}

#[test]
fn test_missing_settings_file() {
    let result = Settings::load(fixture("does-not-exist.toml"));
    assert!(matches!(result, Err(ConfigError::IoError(_))));
}

/// Test that documents take their engine and pass count from the settings
#[test]
fn test_settings_feed_document_defaults() {
    let settings = Settings::load(fixture("settings.toml")).unwrap();
    let provisioner = FsProvisioner::from_settings(&settings);

    let doc = DocumentBuilder::with_settings("T", "A", "D", &settings, Box::new(provisioner))
        .build()
        .unwrap();

    assert_eq!(doc.engine(), Engine::Xelatex);
    assert_eq!(doc.passes(), 3);
}
