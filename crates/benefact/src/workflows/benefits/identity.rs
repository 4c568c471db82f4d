use serde::{Deserialize, Serialize};

/// Identifier of the member a request or proposal belongs to. Opaque to
/// this crate; authentication happens upstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberId(pub String);

/// Identifier of the staff account that processed a submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaffId(pub String);
