use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter, Result as FormatResult};

/// Capability selector passed to the tracking script as `--function <id>`.
///
/// Serialized as a decimal string because the Web UI compares it as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionId(pub u8);

impl FunctionId {
    /// Face recognition and tracking.
    pub const FACE_RECOGNITION: FunctionId = FunctionId(15);
}

impl Default for FunctionId {
    fn default() -> Self {
        Self::FACE_RECOGNITION
    }
}

impl Display for FunctionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        write!(f, "{}", self.0)
    }
}

impl Serialize for FunctionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
