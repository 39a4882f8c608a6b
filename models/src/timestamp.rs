use std::time::SystemTime;

use humantime::format_rfc3339_millis;
use serde::Serializer;

/// Serialize a `SystemTime` as an RFC 3339 UTC string, e.g. `2024-05-01T09:30:00.125Z`.
pub(crate) fn serialize_rfc3339<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&format_rfc3339_millis(*time))
}
