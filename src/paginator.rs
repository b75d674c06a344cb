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
//! Page size and result-trim lifecycle.
//!
//! A [`Paginator`] is constructed once per request from parsed query
//! parameters plus caller defaults, consumed once to scope a query and once
//! to produce the next page's paginator. It is never mutated in place:
//! [`Paginator::result`] returns a fresh value.

use crate::token::PageToken;

/// Effective page size when neither an explicit nor a default size is set.
pub const DEFAULT_SIZE: usize = 100;

/// Upper bound on the effective page size unless overridden.
pub const DEFAULT_MAX_SIZE: usize = 500;

/// Row types that can mark a page boundary.
///
/// The returned token must carry the same columns, in the same order and
/// direction, as the query's `ORDER BY`, and its trailing column must be
/// unique per row (typically the primary key) so that pages never skip or
/// repeat rows.
pub trait PageBoundary {
    /// The page token pointing at this row.
    fn page_token(&self) -> PageToken;
}

/// A single piece of paginator state.
///
/// Options exist so pagination state can be threaded through API layers
/// that carry option lists rather than paginator values; see
/// [`Paginator::to_options`].
#[derive(Clone, Debug, PartialEq)]
pub enum PaginatorOption {
    /// The page token of the current request.
    Token(PageToken),
    /// Token standing in for "start of the collection" when no token is set.
    DefaultToken(PageToken),
    /// Requested page size. Zero and negative values mean "unset".
    Size(i64),
    /// Fallback page size when the request carries none.
    DefaultSize(usize),
    /// Hard upper bound on the effective page size.
    MaxSize(usize),
    /// Marks the paginator as pointing at the final page.
    IsLast(bool),
}

impl PaginatorOption {
    fn apply(self, paginator: &mut Paginator) {
        match self {
            Self::Token(token) => paginator.token = Some(token),
            Self::DefaultToken(token) => paginator.default_token = Some(token),
            Self::Size(size) => paginator.size = usize::try_from(size).unwrap_or(0),
            Self::DefaultSize(size) => paginator.default_size = size,
            Self::MaxSize(size) => paginator.max_size = size,
            Self::IsLast(is_last) => paginator.is_last = is_last,
        }
    }
}

/// Pagination state for one request.
#[derive(Clone, Debug, PartialEq)]
pub struct Paginator {
    token: Option<PageToken>,
    default_token: Option<PageToken>,
    size: usize,
    default_size: usize,
    max_size: usize,
    is_last: bool,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new([])
    }
}

impl Paginator {
    /// Construct a paginator by applying `options` in order on top of the
    /// defaults (size unset, default size 100, max size 500).
    pub fn new(options: impl IntoIterator<Item = PaginatorOption>) -> Self {
        let mut paginator = Self {
            token: None,
            default_token: None,
            size: 0,
            default_size: DEFAULT_SIZE,
            max_size: DEFAULT_MAX_SIZE,
            is_last: false,
        };
        for option in options {
            option.apply(&mut paginator);
        }
        paginator
    }

    /// The effective page size: the explicit size if set, the default size
    /// otherwise (falling back to [`DEFAULT_SIZE`]), clamped to the max
    /// size.
    ///
    /// Callers must fetch `size() + 1` rows: the surplus row only reveals
    /// whether a further page exists and is trimmed off by [`result`].
    ///
    /// [`result`]: Self::result
    pub fn size(&self) -> usize {
        let size = if self.size > 0 {
            self.size
        } else if self.default_size > 0 {
            self.default_size
        } else {
            DEFAULT_SIZE
        };
        size.min(self.max_size)
    }

    /// The page boundary to resume from: the request token if one was set,
    /// the default token otherwise.
    pub fn page_token(&self) -> PageToken {
        self.token
            .clone()
            .or_else(|| self.default_token.clone())
            .unwrap_or_default()
    }

    pub(crate) fn default_page_token(&self) -> PageToken {
        self.default_token.clone().unwrap_or_default()
    }

    /// True iff the last query returned no more than [`size()`](Self::size)
    /// rows.
    pub fn is_last(&self) -> bool {
        self.is_last
    }

    /// Trim `items` to the page size and derive the paginator for the next
    /// page.
    ///
    /// With more than `size()` items the surplus is dropped and the next
    /// token is taken from the last retained row. Otherwise everything is
    /// kept and the next paginator is marked last, carrying the default
    /// token forward (there is no next page, so the first-page token is
    /// repeated for symmetry).
    pub fn result<I: PageBoundary>(&self, mut items: Vec<I>) -> (Vec<I>, Self) {
        let size = self.size();
        let mut next = Self {
            token: None,
            default_token: self.default_token.clone(),
            size: self.size,
            default_size: self.default_size,
            max_size: self.max_size,
            is_last: true,
        };
        if items.len() > size {
            items.truncate(size);
            next.token = items.last().map(PageBoundary::page_token);
            next.is_last = false;
        }
        (items, next)
    }

    /// Decompose the paginator into the options that reconstruct it:
    /// `Paginator::new(p.to_options()) == p` for every paginator. Only
    /// non-default state is emitted.
    pub fn to_options(&self) -> Vec<PaginatorOption> {
        let mut options = Vec::with_capacity(6);
        if let Some(token) = &self.token {
            options.push(PaginatorOption::Token(token.clone()));
        }
        if let Some(token) = &self.default_token {
            options.push(PaginatorOption::DefaultToken(token.clone()));
        }
        if self.size > 0 {
            options.push(PaginatorOption::Size(self.size as i64));
        }
        if self.default_size != DEFAULT_SIZE {
            options.push(PaginatorOption::DefaultSize(self.default_size));
        }
        if self.max_size != DEFAULT_MAX_SIZE {
            options.push(PaginatorOption::MaxSize(self.max_size));
        }
        if self.is_last {
            options.push(PaginatorOption::IsLast(true));
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::token::{Column, Order};

    struct Item {
        id: i64,
    }

    impl PageBoundary for Item {
        fn page_token(&self) -> PageToken {
            PageToken::new([Column::new("id", Order::Ascending, self.id)])
        }
    }

    fn items(count: i64) -> Vec<Item> {
        (1..=count).map(|id| Item { id }).collect()
    }

    fn id_token(id: i64) -> PageToken {
        PageToken::new([Column::new("id", Order::Ascending, id)])
    }

    #[rstest]
    #[case::everything_unset(None, None, None, DEFAULT_SIZE)]
    #[case::explicit(Some(10), None, None, 10)]
    #[case::zero_is_unset(Some(0), None, None, DEFAULT_SIZE)]
    #[case::negative_is_unset(Some(-5), None, None, DEFAULT_SIZE)]
    #[case::default_size(None, Some(250), None, 250)]
    #[case::zero_default_falls_back(None, Some(0), None, DEFAULT_SIZE)]
    #[case::explicit_wins_over_default(Some(10), Some(250), None, 10)]
    #[case::clamped_to_max(Some(1000), None, None, DEFAULT_MAX_SIZE)]
    #[case::clamped_to_custom_max(Some(100), None, Some(50), 50)]
    #[case::default_clamped_to_max(None, Some(700), Some(600), 600)]
    fn test_size(
        #[case] size: Option<i64>,
        #[case] default_size: Option<usize>,
        #[case] max_size: Option<usize>,
        #[case] expected: usize,
    ) {
        let mut options = Vec::new();
        if let Some(size) = size {
            options.push(PaginatorOption::Size(size));
        }
        if let Some(size) = default_size {
            options.push(PaginatorOption::DefaultSize(size));
        }
        if let Some(size) = max_size {
            options.push(PaginatorOption::MaxSize(size));
        }
        assert_eq!(expected, Paginator::new(options).size());
    }

    #[test]
    fn test_page_token_precedence() {
        let paginator = Paginator::new([]);
        assert!(paginator.page_token().is_empty());

        let paginator = Paginator::new([PaginatorOption::DefaultToken(id_token(1))]);
        assert_eq!(id_token(1), paginator.page_token());

        let paginator = Paginator::new([
            PaginatorOption::DefaultToken(id_token(1)),
            PaginatorOption::Token(id_token(7)),
        ]);
        assert_eq!(id_token(7), paginator.page_token());
    }

    #[test]
    fn test_result_trims_overflow_row() {
        let paginator = Paginator::new([
            PaginatorOption::Size(10),
            PaginatorOption::DefaultToken(id_token(0)),
        ]);

        let (page, next) = paginator.result(items(11));
        assert_eq!(10, page.len());
        assert!(!next.is_last());
        // The next boundary is the last retained row, not the dropped one.
        assert_eq!(id_token(10), next.page_token());
        assert_eq!(10, next.size());
    }

    #[rstest]
    #[case::full_page(10)]
    #[case::partial_page(3)]
    #[case::empty_page(0)]
    fn test_result_keeps_final_page(#[case] count: i64) {
        let paginator = Paginator::new([
            PaginatorOption::Size(10),
            PaginatorOption::DefaultToken(id_token(0)),
        ]);

        let (page, next) = paginator.result(items(count));
        assert_eq!(count as usize, page.len());
        assert!(next.is_last());
        // No next page: the default token is carried forward.
        assert_eq!(id_token(0), next.page_token());
    }

    #[rstest]
    #[case::empty(Paginator::new([]))]
    #[case::token_only(Paginator::new([PaginatorOption::Token(id_token(3))]))]
    #[case::everything(Paginator::new([
        PaginatorOption::Token(id_token(3)),
        PaginatorOption::DefaultToken(id_token(0)),
        PaginatorOption::Size(25),
        PaginatorOption::DefaultSize(50),
        PaginatorOption::MaxSize(200),
        PaginatorOption::IsLast(true),
    ]))]
    #[case::negative_size_normalized(Paginator::new([PaginatorOption::Size(-3)]))]
    fn test_options_round_trip(#[case] paginator: Paginator) {
        assert_eq!(paginator, Paginator::new(paginator.to_options()));
    }

    #[test]
    fn test_result_round_trips_through_options() {
        let paginator = Paginator::new([PaginatorOption::Size(2)]);
        let (_, next) = paginator.result(items(5));
        assert_eq!(next, Paginator::new(next.to_options()));
    }
}
