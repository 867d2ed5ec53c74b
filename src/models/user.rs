use serde::{Deserialize, Serialize};

/// The signed-in user as supplied by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}
