//! Tests for loading engine configuration from disk.

use flood_engine::EngineConfig;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"
seed = 99
final_turn = 4
player_names = ["Ann", "Bo", "Cy"]
check_invariants = false
"#,
    );
    let config = EngineConfig::from_file(file.path()).unwrap();
    assert_eq!(*config.seed(), Some(99));
    assert_eq!(*config.final_turn(), 4);
    assert_eq!(config.player_names()[2], "Cy");
    assert!(!*config.check_invariants());

    let game = config.new_game();
    assert_eq!(*game.final_turn(), 4);
    assert_eq!(game.names(), ["Ann", "Bo", "Cy"].map(String::from));
}

#[test]
fn test_missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = EngineConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(err.message.contains("Failed to read config file"));
}

#[test]
fn test_malformed_file_is_config_error() {
    let file = write_config("final_turn = \"soon\"");
    let err = EngineConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("Failed to parse config"));
}

#[test]
fn test_blank_player_name_rejected() {
    let file = write_config(r#"player_names = ["Ann", " ", "Cy"]"#);
    assert!(EngineConfig::from_file(file.path()).is_err());
}
