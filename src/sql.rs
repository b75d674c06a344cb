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
//! Keyset `WHERE` / `ORDER BY` synthesis.
//!
//! For boundary columns `c0..cN-1` the seek predicate is the lexicographic
//! tuple comparison `(c0, c1, ..) > (v0, v1, ..)`, spelled out as
//! OR-of-ANDs because not every SQL dialect supports row-value comparison:
//!
//! ```sql
//! (c0 OP0 ?) OR (c0 = ? AND c1 OP1 ?) OR (c0 = ? AND c1 = ? AND c2 OP2 ?)
//! ```
//!
//! `OPi` is `>` for ascending and `<` for descending columns. Equality
//! prefix values repeat once per disjunct that needs them, so the argument
//! count is quadratic in the column count; boundaries are one to three
//! columns in practice, so this never matters.

use serde_json::Value;

use crate::token::Column;

/// SQL fragments scoping a query to the rows after a page boundary.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SqlCondition {
    /// Seek predicate with positional `?` placeholders. Wrap it in
    /// parentheses before combining it with further predicates, otherwise
    /// the outer `OR` changes their meaning.
    pub where_clause: String,
    /// Bound arguments, in placeholder order.
    pub args: Vec<Value>,
    /// Matching `ORDER BY` column list.
    pub order_by: String,
}

/// Build the seek predicate and ordering for the given boundary columns.
///
/// `quote` performs identifier quoting and is supplied by the caller so the
/// same builder serves every dialect (`"name"`, `` `name` ``,
/// `"table"."name"`, ...). Zero columns produce empty fragments; that is the
/// "no token yet" first page and callers must skip the `WHERE` part then.
///
/// The builder trusts the column list as-is. It is the caller's obligation
/// that the trailing column is unique per row and that the column sequence
/// matches the rest of the query.
pub fn build_where_and_order(
    columns: &[Column],
    quote: impl Fn(&str) -> String,
) -> SqlCondition {
    let mut condition = SqlCondition::default();
    let quoted: Vec<String> = columns.iter().map(|column| quote(&column.name)).collect();

    let mut disjuncts = Vec::with_capacity(columns.len());
    for (i, column) in columns.iter().enumerate() {
        let mut conjuncts = Vec::with_capacity(i + 1);
        for (prefix, prefix_column) in columns.iter().enumerate().take(i) {
            conjuncts.push(format!("{} = ?", quoted[prefix]));
            condition.args.push(prefix_column.value.clone());
        }
        conjuncts.push(format!("{} {} ?", quoted[i], column.order.comparator()));
        condition.args.push(column.value.clone());
        disjuncts.push(format!("({})", conjuncts.join(" AND ")));
    }

    condition.where_clause = disjuncts.join(" OR ");
    condition.order_by = columns
        .iter()
        .zip(&quoted)
        .map(|(column, name)| format!("{} {}", name, column.order.keyword()))
        .collect::<Vec<_>>()
        .join(", ");
    condition
}
