// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0
//! Opaque page tokens.
//!
//! A page token records the sort-key values of the last row a client has
//! seen. On the wire it is a fernet token (authenticated encryption, already
//! url-safe base64) over the JSON document
//! `{"e": "<RFC3339 expiry>", "c": [{"n": ..., "o": ..., "v": ...}, ...]}`.
//! Tokens expire one hour after encryption and are not meant to be persisted
//! by callers.

use base64::{Engine as _, engine::general_purpose::URL_SAFE};
use chrono::{DateTime, Duration, Utc};
use fernet::{Fernet, MultiFernet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::PaginationError;

/// Reserved key used when the caller supplies no keys. Tokens encrypted
/// under it are readable by anyone holding this crate; supply real keys for
/// anything beyond local development.
const FALLBACK_KEY: [u8; 32] = [0u8; 32];

/// How long an encrypted page token stays valid, in minutes.
const TOKEN_TTL_MINUTES: i64 = 60;

/// Sort direction of a keyset column.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum Order {
    /// Ascending sort; the page boundary is crossed with `>`.
    #[default]
    #[serde(rename = "ASC")]
    Ascending,
    /// Descending sort; the page boundary is crossed with `<`.
    #[serde(rename = "DESC")]
    Descending,
}

impl Order {
    /// Comparison operator selecting rows strictly past the boundary value.
    pub(crate) fn comparator(self) -> &'static str {
        match self {
            Self::Ascending => ">",
            Self::Descending => "<",
        }
    }

    /// `ORDER BY` direction keyword.
    pub(crate) fn keyword(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// One sort-key component of a page boundary: column name, direction and the
/// boundary value taken from the last seen row.
///
/// Within a token the column order is significant and must match the query's
/// `ORDER BY` sequence exactly; the first column is the primary sort key,
/// subsequent columns break ties.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name, unquoted. Quoting happens at SQL-building time.
    #[serde(rename = "n")]
    pub name: String,
    /// Sort direction. Tokens encoded without a direction default to
    /// ascending.
    #[serde(rename = "o", default)]
    pub order: Order,
    /// Boundary value of the last seen row.
    #[serde(rename = "v")]
    pub value: Value,
}

impl Column {
    pub fn new(name: impl Into<String>, order: Order, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            order,
            value: value.into(),
        }
    }
}

/// The boundary of the last seen row.
///
/// Column uniqueness is not validated here; it is the caller's obligation
/// that the trailing column is unique per row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageToken {
    columns: Vec<Column>,
}

/// Wire form of a token. The expiry only exists on the wire so that
/// `parse(encrypt(token)) == token` holds for the structural value.
#[derive(Serialize, Deserialize)]
struct Envelope {
    #[serde(rename = "e")]
    expires_at: DateTime<Utc>,
    #[serde(rename = "c")]
    columns: Vec<Column>,
}

impl PageToken {
    pub fn new(columns: impl IntoIterator<Item = Column>) -> Self {
        Self {
            columns: columns.into_iter().collect(),
        }
    }

    /// The boundary columns, in `ORDER BY` sequence.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// True for the "start of collection" token.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Serialize and authenticated-encrypt the token.
    ///
    /// The first key encrypts; older keys in `keys` only matter for
    /// decryption. With no keys at all the reserved fallback key is used,
    /// which provides no security.
    pub fn encrypt(&self, keys: &[[u8; 32]]) -> Result<String, PaginationError> {
        self.encrypt_at(keys, Utc::now())
    }

    fn encrypt_at(&self, keys: &[[u8; 32]], now: DateTime<Utc>) -> Result<String, PaginationError> {
        if keys.is_empty() {
            warn!("no page token encryption keys configured, falling back to the insecure built-in key");
        }
        let body = serde_json::to_vec(&Envelope {
            expires_at: now + Duration::minutes(TOKEN_TTL_MINUTES),
            columns: self.columns.clone(),
        })?;
        Ok(multi_fernet(keys).encrypt(&body))
    }

    /// Decrypt and decode a page token.
    ///
    /// Every key in `keys` is tried in order, then the fallback key, so
    /// tokens issued under an old key stay valid while a new key is rolled
    /// out. Expired tokens fail with [`PaginationError::PageTokenExpired`];
    /// they must not be treated as "start of collection" implicitly.
    pub fn parse(keys: &[[u8; 32]], raw: &str) -> Result<Self, PaginationError> {
        Self::parse_at(keys, raw, Utc::now())
    }

    fn parse_at(
        keys: &[[u8; 32]],
        raw: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, PaginationError> {
        let body = multi_fernet(keys).decrypt(raw)?;
        let envelope: Envelope = serde_json::from_slice(&body)?;
        if envelope.expires_at < now {
            return Err(PaginationError::PageTokenExpired);
        }
        Ok(Self {
            columns: envelope.columns,
        })
    }
}

/// Assemble the rotation chain: the caller's keys in order, then the
/// fallback key.
fn multi_fernet(keys: &[[u8; 32]]) -> MultiFernet {
    let fernets = keys
        .iter()
        .chain(std::iter::once(&FALLBACK_KEY))
        .filter_map(|key| Fernet::new(&URL_SAFE.encode(key)))
        .collect();
    MultiFernet::new(fernets)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use serde_json::{Value, json};

    use super::*;

    fn key(fill: u8) -> [u8; 32] {
        [fill; 32]
    }

    fn token() -> PageToken {
        PageToken::new([
            Column::new("id", Order::Ascending, "token"),
            Column::new("name", Order::Descending, "test"),
        ])
    }

    #[test]
    fn test_round_trip() {
        let keys = [key(1), key(2)];
        let encrypted = token().encrypt(&keys).unwrap();
        let parsed = PageToken::parse(&keys, &encrypted).unwrap();
        assert_eq!(token(), parsed);
    }

    #[test]
    fn test_round_trip_preserves_value_types() {
        let keys = [key(1)];
        let original = PageToken::new([
            Column::new("count", Order::Ascending, 42),
            Column::new("ratio", Order::Ascending, 0.5),
            Column::new("active", Order::Descending, true),
            Column::new("id", Order::Ascending, "row-1"),
        ]);
        let parsed = PageToken::parse(&keys, &original.encrypt(&keys).unwrap()).unwrap();
        assert_eq!(original, parsed);
        assert_eq!(Value::from(42), parsed.columns()[0].value);
        assert_eq!(Value::from(0.5), parsed.columns()[1].value);
        assert_eq!(Value::from(true), parsed.columns()[2].value);
        assert_eq!(Value::from("row-1"), parsed.columns()[3].value);
    }

    #[test]
    fn test_rotated_key() {
        let keys = [key(1), key(2)];
        // Encrypted under the older key only, decrypted with the full chain.
        let encrypted = token().encrypt(&keys[1..]).unwrap();
        let parsed = PageToken::parse(&keys, &encrypted).unwrap();
        assert_eq!(token(), parsed);
    }

    #[test]
    fn test_invalid_key() {
        let encrypted = token().encrypt(&[key(1), key(2)]).unwrap();
        match PageToken::parse(&[key(7)], &encrypted) {
            Err(PaginationError::Decrypt(_)) => {}
            other => panic!("expected decrypt error, got {other:?}"),
        }
    }

    #[test]
    fn test_fallback_key() {
        let encrypted = token().encrypt(&[]).unwrap();
        // No keys at all.
        assert_eq!(token(), PageToken::parse(&[], &encrypted).unwrap());
        // Real keys configured, none of them match, fallback still tried.
        assert_eq!(token(), PageToken::parse(&[key(1)], &encrypted).unwrap());
    }

    #[test]
    fn test_expiry() {
        let keys = [key(1)];
        let encoded_at = Utc::now() - Duration::hours(2);
        let encrypted = token().encrypt_at(&keys, encoded_at).unwrap();

        // Within the one hour window the token is still valid.
        let within = encoded_at + Duration::minutes(30);
        assert_eq!(
            token(),
            PageToken::parse_at(&keys, &encrypted, within).unwrap()
        );

        // Two hours after encoding it is not.
        match PageToken::parse(&keys, &encrypted) {
            Err(PaginationError::PageTokenExpired) => {}
            other => panic!("expected expired error, got {other:?}"),
        }
    }

    #[test]
    fn test_wire_format() {
        let keys = [key(1)];
        let encrypted = token().encrypt(&keys).unwrap();
        let body = multi_fernet(&keys).decrypt(&encrypted).unwrap();
        let document: Value = serde_json::from_slice(&body).unwrap();

        assert!(document["e"].is_string(), "expiry must be a RFC3339 string");
        assert_eq!(
            json!([
                {"n": "id", "o": "ASC", "v": "token"},
                {"n": "name", "o": "DESC", "v": "test"},
            ]),
            document["c"]
        );
    }

    #[test]
    fn test_missing_order_defaults_to_ascending() {
        let keys = [key(1)];
        let body = serde_json::to_vec(&json!({
            "e": Utc::now() + Duration::minutes(5),
            "c": [{"n": "id", "v": 7}],
        }))
        .unwrap();
        let raw = multi_fernet(&keys).encrypt(&body);

        let parsed = PageToken::parse(&keys, &raw).unwrap();
        assert_eq!(Order::Ascending, parsed.columns()[0].order);
    }

    #[test]
    fn test_unknown_order_is_a_decode_error() {
        let keys = [key(1)];
        let body = serde_json::to_vec(&json!({
            "e": Utc::now() + Duration::minutes(5),
            "c": [{"n": "id", "o": "SIDEWAYS", "v": 7}],
        }))
        .unwrap();
        let raw = multi_fernet(&keys).encrypt(&body);

        match PageToken::parse(&keys, &raw) {
            Err(PaginationError::Decode(_)) => {}
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_garbage_ciphertext() {
        match PageToken::parse(&[key(1)], "not-a-token") {
            Err(PaginationError::Decrypt(_)) => {}
            other => panic!("expected decrypt error, got {other:?}"),
        }
    }
}
