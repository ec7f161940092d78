use stagehand_config::{Config, CONFIG_ENV};
use tempfile::TempDir;

// Single test per binary: it mutates the process environment.
#[test]
fn test_env_override_and_pointer_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    std::env::set_var(CONFIG_ENV, &path);

    assert_eq!(Config::path().unwrap(), path);
    assert!(Config::load().unwrap().is_empty());

    let mut config = Config::default();
    config.set("app-id", "io.example.override".to_string()).unwrap();
    config.save().unwrap();
    assert!(path.exists());
    assert_eq!(Config::load().unwrap().app_id(), "io.example.override");

    std::env::set_var(CONFIG_ENV, "   ");
    assert_ne!(Config::path().unwrap(), path);
    std::env::remove_var(CONFIG_ENV);

    #[cfg(not(target_os = "windows"))]
    {
        let home = TempDir::new().unwrap();
        std::env::set_var("HOME", home.path());
        let default = home.path().join(".config").join("stagehand").join("stagehand.toml");
        assert_eq!(Config::path().unwrap(), default);

        let pointer = Config::set_pointer(&path).unwrap();
        assert!(pointer.starts_with(home.path()));
        assert_eq!(Config::path().unwrap(), path);
        assert_eq!(Config::load().unwrap().app_id(), "io.example.override");
    }
}
