use crate::{ModelError, ServerAddress};

/// **VALUE**: Verifies every documented address form is accepted and kept verbatim.
///
/// **WHY THIS MATTERS**: The address is passed to the tracking script unchanged. The Web UI
/// sends whatever the operator typed, which may be a bare IP, IP:port, or a full URL.
///
/// **BUG THIS CATCHES**: Would catch if validation starts normalizing the address (for
/// example adding a trailing slash), which would change the script's arguments.
#[test]
fn given_supported_address_forms_when_parsed_then_accepted_verbatim() {
    let cases = [
        "localhost",
        "192.168.1.100",
        "192.168.1.100:8000",
        "robot-arm.local:9000",
        "http://192.168.1.100:8000",
        "https://arm.example.com/api/track",
        "[::1]:8000",
    ];

    for case in cases {
        let parsed = ServerAddress::parse(case);
        assert!(parsed.is_ok(), "Should accept {case}: {parsed:?}");
        assert_eq!(parsed.unwrap().as_str(), case);
    }
}

/// **VALUE**: Verifies surrounding whitespace is trimmed.
#[test]
fn given_padded_address_when_parsed_then_trimmed() {
    let parsed = ServerAddress::parse("  10.0.0.5:8000\n").unwrap();

    assert_eq!(parsed.to_string(), "10.0.0.5:8000");
}

/// **VALUE**: Verifies malformed addresses are rejected with a validation error.
///
/// **WHY THIS MATTERS**: A bad address would otherwise only surface as a crash inside the
/// tracking script, long after the start endpoint reported success.
///
/// **BUG THIS CATCHES**: Would catch if any rejection rule is dropped. A leading `-` is
/// rejected because the script's argument parser would read `--server --help` as an option.
#[test]
fn given_invalid_addresses_when_parsed_then_rejected() {
    let cases = [
        "",
        "   ",
        "192.168.1.100 8000",
        "ftp://192.168.1.100:21",
        "http://",
        "192.168.1.100:99999",
        "192.168.1.100:port",
        "192.168.1.100:",
        "192.168.1.100/path",
        "host?query=1",
        "user@host",
        "--help",
        "-h",
        "--function",
        "-1.2.3.4",
    ];

    for case in cases {
        match ServerAddress::parse(case) {
            Err(ModelError::Validation { message, .. }) => {
                assert!(!message.is_empty(), "Should explain rejection of {case:?}");
            }
            Ok(parsed) => panic!("Should reject {case:?}, got {parsed:?}"),
        }
    }
}

/// **VALUE**: Verifies the empty-address message, which the API returns to the Web UI.
#[test]
fn given_empty_address_when_parsed_then_reports_empty() {
    let err = ServerAddress::parse("").unwrap_err();

    assert!(err.to_string().contains("Server address cannot be empty"));
}

/// **VALUE**: Verifies `FromStr` delegates to `parse`.
#[test]
fn given_address_string_when_using_from_str_then_matches_parse() {
    let via_from_str: ServerAddress = "10.0.0.5".parse().unwrap();

    assert_eq!(via_from_str, ServerAddress::parse("10.0.0.5").unwrap());
}
