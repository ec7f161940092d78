//! The exported entry points driven by a hand-written C-style host

use stagehand_abi::{Handle, LoadPluginPayload, StatusCode};
use stagehand_config::CONFIG_ENV;
use stagehand_runtime::{stagehand_open_session, stagehand_start, STATUS_INVALID_APP_ID};
use std::ffi::{c_int, c_void, CString};
use std::fs;
use std::ptr;
use std::sync::OnceLock;
use tempfile::TempDir;

type Event = (u32, Option<(String, usize, usize)>);

struct Host {
    profile: Option<CString>,
    init_calls: usize,
    events: Vec<Event>,
}

impl Host {
    fn new(profile: Option<CString>) -> Self {
        Self {
            profile,
            init_calls: 0,
            events: Vec::new(),
        }
    }
}

unsafe extern "C" fn on_status(status: StatusCode, payload: *const c_void, userdata: *mut c_void) {
    let plugin = if status == StatusCode::LOAD_PLUGIN {
        // SAFETY: the runtime passes a valid payload with every LoadPlugin.
        let raw = unsafe { &*payload.cast::<LoadPluginPayload>() };
        // SAFETY: `name` points to `name_len` bytes for this call.
        let name = unsafe { std::slice::from_raw_parts(raw.name.cast::<u8>(), raw.name_len) };
        Some((String::from_utf8_lossy(name).into_owned(), raw.index, raw.count))
    } else {
        None
    };
    // SAFETY: `userdata` is the test's `Host`; no other reference is live.
    let host = unsafe { &mut *userdata.cast::<Host>() };
    host.events.push((status.0, plugin));
}

unsafe extern "C" fn on_init(handle: Handle, userdata: *mut c_void) -> c_int {
    let profile = {
        // SAFETY: `userdata` is the test's `Host`; no other reference is live.
        let host = unsafe { &mut *userdata.cast::<Host>() };
        host.init_calls += 1;
        host.profile.as_ref().map_or(ptr::null(), |p| p.as_ptr())
    };
    // SAFETY: `handle` is live for this callback and `profile` is null or a C string.
    unsafe { stagehand_open_session(handle, profile, Some(on_status), userdata) };
    17
}

/// Points `stagehand_start` at a throwaway config for the whole test binary.
fn isolate_config() {
    static CONFIG_DIR: OnceLock<TempDir> = OnceLock::new();
    CONFIG_DIR.get_or_init(|| {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("stagehand.toml");
        fs::write(
            &config,
            format!(
                "settings-dir = {:?}\nrecords-dir = {:?}\n",
                dir.path().join("settings").display().to_string(),
                dir.path().join("save").display().to_string(),
            ),
        )
        .unwrap();
        std::env::set_var(CONFIG_ENV, &config);
        dir
    });
}

fn run(app_id: Option<&str>, host: &mut Host) -> c_int {
    isolate_config();
    let app_id = app_id.map(|id| CString::new(id).unwrap());
    let app_ptr = app_id.as_ref().map_or(ptr::null(), |id| id.as_ptr());
    // SAFETY: `app_ptr` is null or a C string, `on_init` expects a `Host`.
    unsafe { stagehand_start(app_ptr, Some(on_init), ptr::from_mut(host).cast()) }
}

fn write_profile(dir: &TempDir, plugins: &[&str]) -> CString {
    let plugin_dir = dir.path().join("plugins");
    fs::create_dir_all(&plugin_dir).unwrap();
    for name in plugins {
        fs::write(plugin_dir.join(format!("{name}.toml")), "version = \"1.0\"\n").unwrap();
    }
    let profile = dir.path().join("game.toml");
    fs::write(&profile, "title = \"ffi-test\"\n").unwrap();
    CString::new(profile.to_str().unwrap()).unwrap()
}

#[test]
fn test_null_app_id_is_rejected_without_callback() {
    let mut host = Host::new(None);
    assert_eq!(run(None, &mut host), STATUS_INVALID_APP_ID);
    assert_eq!(host.init_calls, 0);
}

#[test]
fn test_empty_app_id_is_rejected_without_callback() {
    let mut host = Host::new(None);
    assert_eq!(run(Some(""), &mut host), STATUS_INVALID_APP_ID);
    assert_eq!(host.init_calls, 0);
}

#[test]
fn test_missing_init_callback_returns_zero() {
    isolate_config();
    let app_id = CString::new("io.stagehand.ffi-test").unwrap();
    // SAFETY: valid C string, no callback.
    let status = unsafe { stagehand_start(app_id.as_ptr(), None, ptr::null_mut()) };
    assert_eq!(status, 0);
}

#[test]
fn test_open_reports_every_phase() {
    let dir = TempDir::new().unwrap();
    let mut host = Host::new(Some(write_profile(&dir, &["beta", "alpha"])));

    assert_eq!(run(Some("io.stagehand.ffi-test"), &mut host), 17);
    assert_eq!(host.init_calls, 1);
    assert_eq!(
        host.events,
        vec![
            (0, None),
            (1, None),
            (2, None),
            (3, Some(("alpha".to_string(), 0, 2))),
            (3, Some(("beta".to_string(), 1, 2))),
            (4, None),
            (5, None),
        ]
    );
}

#[test]
fn test_missing_profile_stops_early() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");
    let mut host = Host::new(Some(CString::new(missing.to_str().unwrap()).unwrap()));

    assert_eq!(run(Some("io.stagehand.ffi-test"), &mut host), 17);
    assert_eq!(host.events, vec![(0, None), (1, None)]);
}

#[test]
fn test_null_config_path_sends_nothing() {
    let mut host = Host::new(None);
    assert_eq!(run(Some("io.stagehand.ffi-test"), &mut host), 17);
    assert!(host.events.is_empty());
}
