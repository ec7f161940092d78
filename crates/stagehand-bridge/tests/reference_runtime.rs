use stagehand_bridge::{BridgeError, ProgressPhase, Recorder, SessionBridge};
use stagehand_config::{Config, CONFIG_ENV};
use std::fs;
use tempfile::TempDir;

// One test per binary: the runtime reads its config location from the environment.
#[test]
fn test_reference_runtime_end_to_end() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        settings_dir: Some(dir.path().join("settings").display().to_string()),
        records_dir: Some(dir.path().join("save").display().to_string()),
        ..Config::default()
    };
    let config_path = dir.path().join("stagehand.toml");
    config.save_to(&config_path).unwrap();
    std::env::set_var(CONFIG_ENV, &config_path);

    let plugins = dir.path().join("plugins");
    fs::create_dir_all(&plugins).unwrap();
    fs::write(plugins.join("alpha.toml"), "version = \"1.0\"\n").unwrap();
    fs::write(plugins.join("beta.toml"), "version = \"2.0\"\n").unwrap();
    let profile = dir.path().join("game.toml");
    fs::write(
        &profile,
        "title = \"demo\"\nplugins = [\"alpha\", \"beta\"]\n",
    )
    .unwrap();

    let bridge = SessionBridge::new(stagehand_runtime::api(), "io.stagehand.e2e");
    let recorder = Recorder::new();
    let mut summary = None;
    let code = bridge
        .start(|session| {
            summary = Some(session.open_session(&profile, &recorder));
            5
        })
        .unwrap();

    assert_eq!(code, 5);
    assert_eq!(summary.unwrap().unwrap().plugins, vec!["alpha", "beta"]);
    assert_eq!(
        recorder.phases(),
        vec![
            ProgressPhase::LoadSettings,
            ProgressPhase::LoadProfile,
            ProgressPhase::CreateRuntime,
            ProgressPhase::LoadPlugin,
            ProgressPhase::LoadPlugin,
            ProgressPhase::LoadRecords,
            ProgressPhase::Loaded,
        ]
    );

    // A profile the runtime cannot read ends the operation early.
    let bridge = SessionBridge::new(stagehand_runtime::api(), "io.stagehand.e2e");
    let recorder = Recorder::new();
    let mut result = None;
    bridge
        .start(|session| {
            result = Some(session.open_session(dir.path().join("absent.toml"), &recorder));
            0
        })
        .unwrap();
    assert!(matches!(
        result.unwrap(),
        Err(BridgeError::Incomplete {
            last: Some(ProgressPhase::LoadProfile)
        })
    ));

    // An empty application id is refused by the runtime itself.
    let bridge = SessionBridge::new(stagehand_runtime::api(), "");
    let err = bridge.start(|_| 0).unwrap_err();
    assert!(matches!(
        err,
        BridgeError::Initialization {
            code: stagehand_runtime::STATUS_INVALID_APP_ID
        }
    ));

    std::env::remove_var(CONFIG_ENV);
}
