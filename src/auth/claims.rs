use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload used for authentication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: Uuid,      // user ID
    pub is_admin: bool, // role at issue time
    pub iat: i64,       // issued at (unix timestamp)
    pub exp: i64,       // expires at (unix timestamp)
    pub iss: String,    // issuer
    pub aud: String,    // audience
}

/// Verified identity bound into the request by the authentication gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub is_admin: bool,
}

impl From<&Claims> for CurrentUser {
    fn from(c: &Claims) -> Self {
        Self {
            id: c.sub,
            is_admin: c.is_admin,
        }
    }
}
