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

//! # Keyset pagination
//!
//! Offset pagination (`LIMIT x OFFSET y`) degrades on two fronts: the
//! database still has to walk and discard `y` rows for every page, and
//! concurrent inserts or deletes shift the offset window so that clients see
//! rows twice or not at all. Keyset pagination (also called seek pagination)
//! avoids both by remembering the sort-key values of the last row of a page
//! and asking for rows strictly past that boundary.
//!
//! This crate implements the complete lifecycle of that strategy for HTTP
//! list APIs:
//!
//! - [`PageToken`] — an ordered list of [`Column`] boundary values,
//!   serialized to JSON with a one-hour expiry and authenticated-encrypted
//!   (fernet) into an opaque string. Clients cannot read, forge or replay a
//!   stale boundary. Key rotation is supported: the first key encrypts, every
//!   key is tried on decryption.
//! - [`build_where_and_order`] — turns the boundary columns into a
//!   tuple-comparison `WHERE` predicate (OR-of-ANDs, for SQL dialects without
//!   native row-value comparison) and the matching `ORDER BY` list, with
//!   positional `?` placeholders and caller-supplied identifier quoting.
//! - [`Paginator`] — resolves the effective page size (default 100, capped
//!   at 500), trims the fetched `size() + 1` rows down to a page, and derives
//!   the next page's token from the last retained row via the
//!   [`PageBoundary`] trait.
//! - [`set_link_header`] / [`parse_link_header`] / [`parse_query_params`] —
//!   the HTTP surface: one RFC 5988 `Link` header carrying the `first` and
//!   `next` relations, and the `page_token` / `page_size` query parameters.
//!
//! The crate is pure and synchronous: no I/O, no shared state, nothing to
//! lock. Every operation works on request-scoped values and returns new
//! values, so concurrent use across request handlers is trivially safe.
//!
//! The last column of a token must be unique per row (typically the primary
//! key). Earlier columns may contain duplicates; the trailing unique column
//! is what guarantees that no row is skipped or repeated across pages.
//!
//! ```
//! use keyset_pagination::{
//!     Column, Order, PageBoundary, PageToken, Paginator, build_where_and_order,
//!     parse_query_params,
//! };
//!
//! struct Flow {
//!     id: i64,
//! }
//!
//! impl PageBoundary for Flow {
//!     fn page_token(&self) -> PageToken {
//!         PageToken::new([Column::new("id", Order::Ascending, self.id)])
//!     }
//! }
//!
//! # fn main() -> Result<(), keyset_pagination::PaginationError> {
//! let keys = [[0x17; 32]];
//!
//! // Decode the request's pagination query parameters.
//! let options = parse_query_params(&keys, [("page_size", "2")])?;
//! let paginator = Paginator::new(options);
//! assert_eq!(paginator.size(), 2);
//!
//! // Scope the database query to the current page.
//! let token = paginator.page_token();
//! let condition = build_where_and_order(token.columns(), |name| format!("\"{name}\""));
//! assert!(condition.where_clause.is_empty()); // first page, no boundary yet
//!
//! // Fetch size() + 1 rows, then trim to the page and derive the next token.
//! let rows = vec![Flow { id: 1 }, Flow { id: 2 }, Flow { id: 3 }];
//! let (page, next) = paginator.result(rows);
//! assert_eq!(page.len(), 2);
//! assert!(!next.is_last());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod header;
pub mod paginator;
pub mod sql;
pub mod token;

pub use error::PaginationError;
pub use header::{
    PageLinks, RequestParameters, parse_link_header, parse_query_params, set_link_header,
};
pub use paginator::{DEFAULT_MAX_SIZE, DEFAULT_SIZE, PageBoundary, Paginator, PaginatorOption};
pub use sql::{SqlCondition, build_where_and_order};
pub use token::{Column, Order, PageToken};
