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
//! The HTTP surface: `Link` response headers and the `page_token` /
//! `page_size` query parameters.

use http::HeaderMap;
use http::header::{self, HeaderValue};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::PaginationError;
use crate::paginator::{Paginator, PaginatorOption};
use crate::token::PageToken;

const PAGE_TOKEN_PARAM: &str = "page_token";
const PAGE_SIZE_PARAM: &str = "page_size";

/// Pagination query parameters, for embedding into request parameter
/// structs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestParameters {
    /// Items per page. Defaults to 100, capped at 500.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    /// Opaque page token pointing at the next page, taken from the `next`
    /// relation of the previous response's `Link` header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

/// Write the `Link` header advertising the `first` and, unless this is the
/// last page, `next` page URLs.
///
/// Exactly one header value is written, comma-joined per RFC 5988, never
/// multiple `Link` header lines. Each URL is `base` with its `page_token`
/// and `page_size` query parameters overwritten; all other query parameters
/// are preserved. `paginator` is the value returned by
/// [`Paginator::result`], so its token is the next page's boundary.
pub fn set_link_header(
    headers: &mut HeaderMap,
    keys: &[[u8; 32]],
    base: &Url,
    paginator: &Paginator,
) -> Result<(), PaginationError> {
    let size = paginator.size();

    let first = paginator.default_page_token().encrypt(keys)?;
    let mut relations = vec![format!(r#"<{}>; rel="first""#, page_url(base, &first, size))];

    if !paginator.is_last() {
        let next = paginator.page_token().encrypt(keys)?;
        relations.push(format!(r#"<{}>; rel="next""#, page_url(base, &next, size)));
    }

    headers.insert(header::LINK, HeaderValue::from_str(&relations.join(","))?);
    Ok(())
}

/// `base` with `page_token` and `page_size` set, everything else untouched.
fn page_url(base: &Url, token: &str, size: usize) -> Url {
    let retained: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(name, _)| name != PAGE_TOKEN_PARAM && name != PAGE_SIZE_PARAM)
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    let mut url = base.clone();
    let mut pairs = url.query_pairs_mut();
    pairs.clear();
    for (name, value) in &retained {
        pairs.append_pair(name, value);
    }
    pairs.append_pair(PAGE_SIZE_PARAM, &size.to_string());
    pairs.append_pair(PAGE_TOKEN_PARAM, token);
    drop(pairs);
    url
}

/// Raw page tokens advertised by a `Link` header.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageLinks {
    /// `page_token` of the `first` relation.
    pub first: Option<String>,
    /// `page_token` of the `next` relation; absent on the last page.
    pub next: Option<String>,
}

impl PageLinks {
    /// True iff the header carries no `next` relation.
    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }
}

/// Extract the `first` / `next` page tokens from a `Link` header value.
///
/// The counterpart of [`set_link_header`] for clients walking a listing.
/// Tokens are returned as found, still encrypted. Segments that are not of
/// the `<url>; rel="..."` shape are skipped.
pub fn parse_link_header(value: &str) -> PageLinks {
    let mut links = PageLinks::default();
    for segment in value.split(',') {
        let mut parts = segment.trim().split(';');
        let Some(target) = parts.next() else {
            continue;
        };
        let target = target.trim();
        if !(target.starts_with('<') && target.ends_with('>')) {
            continue;
        }
        let Ok(url) = Url::parse(&target[1..target.len() - 1]) else {
            continue;
        };
        let token = url
            .query_pairs()
            .find(|(name, _)| name == PAGE_TOKEN_PARAM)
            .map(|(_, value)| value.into_owned());

        for parameter in parts {
            let Some((name, relation)) = parameter.split_once('=') else {
                continue;
            };
            if name.trim() != "rel" {
                continue;
            }
            match relation.trim().trim_matches('"') {
                "first" => links.first = token.clone(),
                "next" => links.next = token.clone(),
                _ => {}
            }
        }
    }
    links
}

/// Decode `page_token` and `page_size` from request query parameters into
/// paginator options.
///
/// Works with any pair iterator, e.g. [`url::Url::query_pairs`]. Empty
/// values are treated as unset, not as errors; when a key repeats, the last
/// non-empty value wins. The token is decrypted here, so an expired or
/// tampered token fails the request instead of silently restarting the
/// listing from the first page.
pub fn parse_query_params<K, V>(
    keys: &[[u8; 32]],
    pairs: impl IntoIterator<Item = (K, V)>,
) -> Result<Vec<PaginatorOption>, PaginationError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut raw_token: Option<String> = None;
    let mut raw_size: Option<String> = None;
    for (name, value) in pairs {
        let value = value.as_ref();
        if value.is_empty() {
            continue;
        }
        match name.as_ref() {
            PAGE_TOKEN_PARAM => raw_token = Some(value.to_string()),
            PAGE_SIZE_PARAM => raw_size = Some(value.to_string()),
            _ => {}
        }
    }

    let mut options = Vec::with_capacity(2);
    if let Some(raw) = raw_token {
        options.push(PaginatorOption::Token(PageToken::parse(keys, &raw)?));
    }
    if let Some(raw) = raw_size {
        options.push(PaginatorOption::Size(raw.parse::<i64>()?));
    }
    Ok(options)
}
