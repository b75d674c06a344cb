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
//! Pagination errors.

use thiserror::Error;

/// Pagination error.
///
/// Every variant maps to a 400-class response at the HTTP layer; all
/// operations are deterministic and local, so retrying never helps.
#[derive(Error, Debug)]
pub enum PaginationError {
    /// The page token body is not a valid token document.
    #[error("invalid page token")]
    Decode(#[from] serde_json::Error),

    /// None of the configured keys, including the fallback key,
    /// authenticated the page token. Treat the input as untrusted.
    #[error("could not decrypt page token")]
    Decrypt(#[from] fernet::DecryptionError),

    /// The rendered `Link` header is not a valid HTTP header value.
    #[error("link header is not a valid header value")]
    LinkHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// The page token has passed its expiry time. Callers should restart
    /// from the first page rather than report a generic bad request.
    #[error("page token expired")]
    PageTokenExpired,

    /// The `page_size` query parameter is not a valid integer.
    #[error("invalid page_size parameter: {source}")]
    PageSize {
        /// The source of the error.
        #[from]
        source: std::num::ParseIntError,
    },
}
