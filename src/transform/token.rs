//! OAuth token response handling.

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};

use super::{BodyTransformer, TransformError};

/// The token endpoint response as relayed to clients.
///
/// Missing and `null` fields decode to their zero value and every field is
/// always serialized, in declaration order. Fields outside this record are not
/// carried through a decode/encode round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub access_token: String,
    #[serde(deserialize_with = "null_as_default")]
    pub refresh_token: String,
    #[serde(deserialize_with = "null_as_default")]
    pub token_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub expires_in: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub id_token: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Copies `access_token` into `id_token`, overwriting any existing value.
///
/// Used for clients that insist on an ID token from authorization servers
/// that only issue access tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessTokenToIdToken;

impl BodyTransformer for AccessTokenToIdToken {
    fn name(&self) -> &'static str {
        "access_token_to_id_token"
    }

    fn transform(&self, body: Bytes) -> Result<Bytes, TransformError> {
        // A bare `null` body decodes as an empty record.
        let mut token = serde_json::from_slice::<Option<TokenResponse>>(&body)?.unwrap_or_default();
        token.id_token = token.access_token.clone();
        Ok(Bytes::from(serde_json::to_vec(&token)?))
    }
}
