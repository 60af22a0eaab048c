use std::sync::Mutex;

use tempfile::NamedTempFile;

use rehab_tracker::camera::CameraSettings;
use rehab_tracker::config::TrackerConfig;
use rehab_tracker::exercise::{Exercise, Side};
use rehab_tracker::snapshot::WriteStrategy;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "TRACKER_CONFIG",
        "TRACKER_DEVICE",
        "TRACKER_CAMERA_INDEX",
        "TRACKER_FPS_LIMIT",
        "TRACKER_EXERCISE",
        "TRACKER_SIDE",
        "TRACKER_OUTPUT_DIR",
        "TRACKER_PX_PER_CM",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn defaults_apply_without_file_or_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = TrackerConfig::load(None).expect("load config");

    assert_eq!(cfg.camera.device, "auto");
    assert_eq!(cfg.camera.preferred_index, 0);
    assert_eq!(cfg.camera.width, 1280);
    assert_eq!(cfg.camera.height, 720);
    assert_eq!(cfg.fps_limit, 30);

    // Camera defaults have a single home on CameraSettings.
    let base = CameraSettings::default();
    assert_eq!(cfg.camera.device, base.device);
    assert_eq!(cfg.camera.preferred_index, base.preferred_index);
    assert_eq!(cfg.camera.width, base.width);
    assert_eq!(cfg.camera.height, base.height);
    assert_eq!(cfg.exercise, Exercise::Arm);
    assert_eq!(cfg.side, Side::Right);
    assert_eq!(cfg.smoothing_window, 5);
    assert!((cfg.px_per_cm - 37.8).abs() < 1e-12);
    assert_eq!(cfg.output.latest_filename, "latest.json");
    assert_eq!(cfg.output.log_filename, "log.jsonl");

    clear_env();
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "camera": {
            "device": "stub://cam",
            "preferred_index": 1,
            "width": 640,
            "height": 480,
            "fps_limit": 15
        },
        "exercise": {
            "kind": "hand",
            "side": "left",
            "smoothing_window": 7
        },
        "calibration": {
            "px_per_cm": 40.0
        },
        "output": {
            "dir": "/tmp/tracker-out",
            "latest_filename": "current.json",
            "log_filename": "history.jsonl",
            "strategy": "atomic"
        }
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("TRACKER_CONFIG", file.path());
    std::env::set_var("TRACKER_SIDE", "right");
    std::env::set_var("TRACKER_CAMERA_INDEX", "3");

    let cfg = TrackerConfig::load(None).expect("load config");

    assert_eq!(cfg.camera.device, "stub://cam");
    assert_eq!(cfg.camera.preferred_index, 3);
    assert_eq!(cfg.camera.width, 640);
    assert_eq!(cfg.camera.height, 480);
    assert_eq!(cfg.fps_limit, 15);
    assert_eq!(cfg.exercise, Exercise::Hand);
    assert_eq!(cfg.side, Side::Right);
    assert_eq!(cfg.smoothing_window, 7);
    assert!((cfg.px_per_cm - 40.0).abs() < 1e-12);
    assert_eq!(cfg.output.dir, std::path::PathBuf::from("/tmp/tracker-out"));
    assert_eq!(cfg.output.latest_filename, "current.json");
    assert_eq!(cfg.output.strategy, WriteStrategy::AtomicRename);

    clear_env();
}

#[test]
fn explicit_path_wins_over_env_config() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut explicit = NamedTempFile::new().expect("temp config");
    std::io::Write::write_all(
        &mut explicit,
        br#"{"exercise": {"kind": "hand"}}"#,
    )
    .expect("write config");

    let mut via_env = NamedTempFile::new().expect("temp config");
    std::io::Write::write_all(&mut via_env, br#"{"exercise": {"kind": "arm"}}"#)
        .expect("write config");
    std::env::set_var("TRACKER_CONFIG", via_env.path());

    let cfg = TrackerConfig::load(Some(explicit.path())).expect("load config");
    assert_eq!(cfg.exercise, Exercise::Hand);

    clear_env();
}

#[test]
fn rejects_invalid_calibration() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    std::io::Write::write_all(&mut file, br#"{"calibration": {"px_per_cm": 0.0}}"#)
        .expect("write config");

    assert!(TrackerConfig::load(Some(file.path())).is_err());

    clear_env();
}

#[test]
fn rejects_unknown_exercise() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    std::io::Write::write_all(&mut file, br#"{"exercise": {"kind": "squat"}}"#)
        .expect("write config");

    assert!(TrackerConfig::load(Some(file.path())).is_err());

    clear_env();
}
