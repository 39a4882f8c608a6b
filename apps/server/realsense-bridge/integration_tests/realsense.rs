use realsense_bridge::commands::tracker::start_tracker;
use realsense_bridge::error::BridgeError;
use realsense_bridge::routes::build_router;
use realsense_bridge::state::AppState;

use models::ServerAddress;
use tracker_core::config::TrackerConfig;

use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::util::ServiceExt;
use uuid::Uuid;

// ============================================================================
// End-to-end tests: HTTP request -> launcher -> real child process -> status
// A /bin/sh script stands in for main_example.py
// ============================================================================

fn write_script(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir
        .path()
        .join(format!("main_example_{}.sh", Uuid::new_v4().simple()));
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    path
}

fn config_for(script: &Path) -> TrackerConfig {
    TrackerConfig {
        script_path: script.to_path_buf(),
        interpreter: String::from("/bin/sh"),
        startup_grace_ms: 200,
        stop_timeout_secs: 5,
        ..TrackerConfig::default()
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn start_request(address: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/start-realsense/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "server_address": address }).to_string()))
        .unwrap()
}

fn stop_request() -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/stop-realsense/")
        .body(Body::empty())
        .unwrap()
}

fn status_request() -> Request<Body> {
    Request::builder()
        .uri("/api/realsense-status/")
        .body(Body::empty())
        .unwrap()
}

async fn wait_until_idle(app: &Router) -> Value {
    for _ in 0..50 {
        let (_, body) = send(app, status_request()).await;
        if body["running"] == false {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("Tracker never reported as stopped");
}

/// **VALUE**: Exercises the whole start -> status -> duplicate start -> stop -> stop cycle.
///
/// **WHY THIS MATTERS**: This is exactly what the Web UI does. Each step depends on the
/// state left by the previous one, so a broken transition shows up here even when every
/// unit in isolation looks fine.
///
/// **BUG THIS CATCHES**: Would catch:
/// - a start reporting success without a running process
/// - a second start spawning a second camera consumer instead of returning 409
/// - a stop leaving the process alive or the state claiming it still runs
/// - the second stop being reported as an error
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_idle_bridge_when_started_and_stopped_then_full_lifecycle_is_reported() {
    // GIVEN: A bridge with a long-running stand-in script
    let dir = TempDir::new().unwrap();
    let args_file = dir.path().join("args.txt");
    let script = write_script(
        &dir,
        "printf '%s\\n' \"$@\" > \"$ARGS_FILE\"\necho tracking\nexec sleep 30",
    );
    let mut config = config_for(&script);
    config.env.insert(
        String::from("ARGS_FILE"),
        args_file.display().to_string(),
    );
    let state = AppState::new(config);
    let app = build_router(state.clone(), false);

    // WHEN: Starting
    let (status, body) = send(&app, start_request("192.168.1.100:8000")).await;

    // THEN: Success with function id "15" and the script got the right arguments
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "success");
    assert_eq!(body["function_id"], "15");
    assert_eq!(
        std::fs::read_to_string(&args_file).unwrap(),
        "--server\n192.168.1.100:8000\n--function\n15\n"
    );

    let (_, status_body) = send(&app, status_request()).await;
    assert_eq!(status_body["running"], true);
    let pid = status_body["tracker"]["pid"].as_u64().unwrap() as u32;
    assert_eq!(status_body["tracker"]["server_address"], "192.168.1.100:8000");
    assert_eq!(status_body["tracker"]["function_id"], "15");
    assert!(status_body["tracker"]["started_at"].as_str().is_some_and(|t| t.ends_with('Z')));

    // WHEN: Starting again
    let (status, body) = send(&app, start_request("192.168.1.100:8000")).await;

    // THEN: 409, same process still tracked
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains(&pid.to_string()));
    assert_eq!(state.current().await.map(|info| info.pid), Some(pid));

    // WHEN: Stopping
    let (status, body) = send(&app, stop_request()).await;

    // THEN: Stopped, process gone, status idle with a Stopped exit
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "status": "success", "message": "RealSense module stopped" })
    );
    assert!(!tracker_core::launcher::process::is_alive(pid));

    let status_body = wait_until_idle(&app).await;
    assert_eq!(status_body["last_exit"]["pid"], pid);
    assert_eq!(status_body["last_exit"]["reason"], "stopped");

    // WHEN: Stopping again
    let (status, body) = send(&app, stop_request()).await;

    // THEN: Still a success
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "RealSense module is not running");
}

/// **VALUE**: Verifies a crash after startup is picked up by the exit watcher.
///
/// **WHY THIS MATTERS**: The camera can be unplugged mid-session. The UI polls status and
/// must see "not running" with the exit code, and a new start must be allowed.
///
/// **BUG THIS CATCHES**: Would catch if the watcher is never spawned or never reports.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_running_tracker_when_it_crashes_then_status_reports_exit_and_restart_allowed() {
    // GIVEN: A script that survives the grace period, then fails
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir, "sleep 1\necho 'camera disconnected' >&2\nexit 2");
    let app = build_router(AppState::new(config_for(&script)), false);

    let (status, _) = send(&app, start_request("arm.local:9000")).await;
    assert_eq!(status, StatusCode::OK);

    // WHEN: Waiting for the crash
    let body = wait_until_idle(&app).await;

    // THEN: Exit recorded with its code and the stderr line
    assert_eq!(body["last_exit"]["reason"], "exited");
    assert_eq!(body["last_exit"]["code"], 2);
    assert!(
        body["recent_output"]
            .as_array()
            .unwrap()
            .iter()
            .any(|line| line["stream"] == "stderr" && line["line"] == "camera disconnected")
    );

    // AND: A new start is accepted
    let (status, _) = send(&app, start_request("arm.local:9000")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, stop_request()).await;
    assert_eq!(status, StatusCode::OK);
}

/// **VALUE**: Verifies a script that dies during startup is reported as a failure.
///
/// **WHY THIS MATTERS**: A missing Python package makes the script exit on import. The start
/// request must fail with that message instead of reporting success.
#[tokio::test]
async fn given_script_failing_on_import_when_started_then_internal_error_with_stderr() {
    let dir = TempDir::new().unwrap();
    let script = write_script(
        &dir,
        "echo \"ModuleNotFoundError: No module named 'pyrealsense2'\" >&2\nexit 1",
    );
    let state = AppState::new(TrackerConfig {
        startup_grace_ms: 5_000,
        ..config_for(&script)
    });
    let app = build_router(state.clone(), false);

    let (status, body) = send(&app, start_request("192.168.1.100:8000")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("pyrealsense2"));
    assert!(state.current().await.is_none());
}

/// **VALUE**: Verifies stop also ends script processes the bridge did not launch.
///
/// **WHY THIS MATTERS**: After a bridge restart the old tracker still holds the camera;
/// without the sweep the UI could never free it.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_orphaned_script_when_stop_requested_then_orphan_is_stopped() {
    // GIVEN: A script process started outside the bridge
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir, "while true; do sleep 1; done");
    let mut orphan = std::process::Command::new("/bin/sh")
        .arg(&script)
        .spawn()
        .unwrap();
    let app = build_router(AppState::new(config_for(&script)), false);

    // WHEN: Stopping
    let (status, body) = send(&app, stop_request()).await;

    // THEN: Reported and terminated
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("1 orphaned"));
    orphan.wait().unwrap();
}

/// **VALUE**: Verifies a line that is not valid UTF-8 neither kills the script nor stops
/// output capture.
///
/// **WHY THIS MATTERS**: Camera SDKs print Latin-1 or raw bytes. If the bridge stopped reading
/// at the first bad byte, the closed pipe would kill the tracker with SIGPIPE on its next write.
///
/// **BUG THIS CATCHES**: Would catch a line reader that gives up on invalid UTF-8.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_script_printing_invalid_utf8_when_running_then_stays_alive_and_output_kept() {
    // GIVEN: A script that prints a 0xFF byte, then plenty more output
    let dir = TempDir::new().unwrap();
    let script = write_script(
        &dir,
        "printf 'frame \\377\\n'\n\
         i=0; while [ $i -lt 200 ]; do echo \"line $i\"; i=$((i+1)); done\n\
         exec sleep 30",
    );
    let state = AppState::new(TrackerConfig {
        output_lines: 300,
        ..config_for(&script)
    });
    let app = build_router(state.clone(), false);

    // WHEN: Started and given time to write everything
    let (status, _) = send(&app, start_request("192.168.1.100:8000")).await;
    assert_eq!(status, StatusCode::OK);
    tokio::time::sleep(Duration::from_millis(800)).await;

    // THEN: Still running, with the bad line replaced and every later line captured
    let (_, body) = send(&app, status_request()).await;
    assert_eq!(body["running"], true, "{body}");
    let lines: Vec<String> = state
        .output()
        .snapshot()
        .into_iter()
        .map(|l| l.line)
        .collect();
    assert_eq!(lines.first().map(String::as_str), Some("frame \u{FFFD}"));
    assert_eq!(lines.last().map(String::as_str), Some("line 199"));
    assert_eq!(lines.len(), 201);

    let (status, _) = send(&app, stop_request()).await;
    assert_eq!(status, StatusCode::OK);
}

/// **VALUE**: Verifies two simultaneous starts launch exactly one script.
///
/// **WHY THIS MATTERS**: A double click in the Web UI sends two requests at once. Two
/// scripts would fight over the camera and one of them would be untracked.
///
/// **BUG THIS CATCHES**: Would catch the running check moving outside the lifecycle lock,
/// which lets both requests see "idle" before either records its launch.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn given_idle_bridge_when_two_starts_race_then_exactly_one_launches() {
    // GIVEN: An idle bridge
    let dir = TempDir::new().unwrap();
    let script = write_script(&dir, "exec sleep 30");
    let state = AppState::new(config_for(&script));
    let address = ServerAddress::parse("192.168.1.100:8000").unwrap();

    // WHEN: Two starts run concurrently
    let (first, second) = tokio::join!(
        start_tracker(&state, address.clone()),
        start_tracker(&state, address.clone())
    );

    // THEN: One launched, the other was told which PID is running
    let (launched, rejected) = match (first, second) {
        (Ok(info), Err(err)) | (Err(err), Ok(info)) => (info, err),
        (first, second) => panic!("Expected one success and one rejection: {first:?} {second:?}"),
    };
    match rejected {
        BridgeError::AlreadyRunning { pid, .. } => assert_eq!(pid, launched.pid),
        other => panic!("Expected AlreadyRunning, got {other:?}"),
    }
    assert_eq!(state.current().await.map(|info| info.pid), Some(launched.pid));

    let app = build_router(state, false);
    let (status, _) = send(&app, stop_request()).await;
    assert_eq!(status, StatusCode::OK);
}
