use crate::{ExitInfo, ServerAddress, TrackerInfoBuilder};

use std::time::{Duration, UNIX_EPOCH};

use uuid::Uuid;

/// **VALUE**: Verifies `started_at` and `finished_at` serialize as RFC 3339 strings.
///
/// **WHY THIS MATTERS**: The status endpoint is read by a browser. `new Date(...)` understands
/// RFC 3339 but not serde's default `{secs_since_epoch, nanos_since_epoch}` object.
///
/// **BUG THIS CATCHES**: Would catch a dropped `serialize_with` on either timestamp field.
#[test]
fn given_tracker_and_exit_info_when_serialized_then_timestamps_are_rfc3339() {
    // GIVEN: A run started and finished at fixed instants
    let started_at = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    let info = TrackerInfoBuilder::default()
        .with_pid(4242)
        .with_server_address(ServerAddress::parse("192.168.1.100:8000").unwrap())
        .with_command("python main_example.py --server 192.168.1.100:8000 --function 15")
        .with_started_at(started_at)
        .build()
        .unwrap();
    let mut exit = ExitInfo::exited(Uuid::new_v4(), 4242, Some(0), None);
    exit.finished_at = started_at + Duration::from_millis(90_250);

    // WHEN: Serializing
    let info_json = serde_json::to_value(&info).unwrap();
    let exit_json = serde_json::to_value(&exit).unwrap();

    // THEN: UTC strings with millisecond precision
    assert_eq!(info_json["started_at"], "2023-11-14T22:13:20.000Z");
    assert_eq!(exit_json["finished_at"], "2023-11-14T22:14:50.250Z");
}
