use crate::launcher::output::{OutputLog, OutputStream, decode_line, forward_lines};

/// **VALUE**: Verifies that the log keeps only the newest `capacity` lines.
///
/// **WHY THIS MATTERS**: The tracking script prints per-frame diagnostics. An unbounded
/// buffer would grow for as long as the camera runs.
///
/// **BUG THIS CATCHES**: Would catch an off-by-one in eviction or a missing bound.
#[test]
fn given_full_log_when_pushing_then_evicts_oldest() {
    // GIVEN: A log with room for three lines
    let log = OutputLog::new(3);

    // WHEN: Pushing five lines
    for i in 0..5 {
        log.push(OutputStream::Stdout, format!("frame {i}"));
    }

    // THEN: Only the last three remain, oldest first
    let lines: Vec<String> = log.snapshot().into_iter().map(|l| l.line).collect();
    assert_eq!(lines, vec!["frame 2", "frame 3", "frame 4"]);
    assert_eq!(log.len(), 3);
}

/// **VALUE**: Verifies stream filtering in `tail()`.
///
/// **WHY THIS MATTERS**: Startup failures are reported with the stderr tail only, so a
/// Python traceback is not drowned out by regular stdout chatter.
#[test]
fn given_mixed_streams_when_tailing_stderr_then_returns_only_stderr_in_order() {
    let log = OutputLog::new(10);
    log.push(OutputStream::Stdout, "Camera warming up");
    log.push(OutputStream::Stderr, "Traceback (most recent call last):");
    log.push(OutputStream::Stdout, "still here");
    log.push(OutputStream::Stderr, "ModuleNotFoundError: No module named 'pyrealsense2'");

    let tail = log.tail(Some(OutputStream::Stderr), 5);
    let last_any = log.tail(None, 1);

    assert_eq!(
        tail,
        vec![
            "Traceback (most recent call last):",
            "ModuleNotFoundError: No module named 'pyrealsense2'"
        ]
    );
    assert_eq!(last_any, vec!["ModuleNotFoundError: No module named 'pyrealsense2'"]);
}

/// **VALUE**: Clones share one buffer and `clear()` empties it.
///
/// **WHY THIS MATTERS**: Reader tasks hold clones. The launcher clears the shared buffer
/// on each launch so status never mixes lines from two runs.
#[test]
fn given_cloned_log_when_cleared_then_all_clones_see_empty_buffer() {
    let log = OutputLog::new(4);
    let reader_side = log.clone();
    reader_side.push(OutputStream::Stdout, "hello");

    assert_eq!(log.len(), 1);

    log.clear();

    assert!(reader_side.is_empty());
}

/// **VALUE**: A zero capacity is bumped to one instead of dropping every line.
#[test]
fn given_zero_capacity_when_created_then_keeps_one_line() {
    let log = OutputLog::new(0);
    log.push(OutputStream::Stdout, "a");
    log.push(OutputStream::Stdout, "b");

    assert_eq!(log.capacity(), 1);
    assert_eq!(log.tail(None, 10), vec!["b"]);
}

/// **VALUE**: Verifies that a line with invalid UTF-8 is kept (lossily) and reading continues.
///
/// **WHY THIS MATTERS**: Camera SDKs print Latin-1 or raw bytes. If the reader stopped at the
/// first bad byte it would close the pipe and the script's next write would die of SIGPIPE.
///
/// **BUG THIS CATCHES**: Would catch a return to `lines()`, which errors on invalid UTF-8.
#[tokio::test]
async fn given_invalid_utf8_when_forwarding_then_replaced_and_later_lines_kept() {
    // GIVEN: Output with a stray 0xFF byte followed by normal lines
    let raw: &'static [u8] = b"frame \xff\r\nface at 120,80\nlast line without newline";
    let log = OutputLog::new(10);

    // WHEN: Forwarding until EOF
    forward_lines(raw, OutputStream::Stdout, log.clone(), 4242)
        .await
        .unwrap();

    // THEN: All three lines captured, the bad byte replaced
    assert_eq!(
        log.tail(None, 10),
        vec![
            "frame \u{FFFD}",
            "face at 120,80",
            "last line without newline"
        ]
    );
}

/// **VALUE**: Verifies line terminator handling in `decode_line`.
#[test]
fn given_raw_lines_when_decoded_then_terminators_stripped() {
    assert_eq!(decode_line(b"ok\n"), "ok");
    assert_eq!(decode_line(b"ok\r\n"), "ok");
    assert_eq!(decode_line(b"ok"), "ok");
    assert_eq!(decode_line(b"\n"), "");
}
