//! List view-model: search, filter and sort over a record list
//!
//! Every table on every screen is rendered from [`project`]. A list type
//! plugs in by implementing [`Record`]: which text is searchable, what its
//! filter looks like, and how each sortable column compares.
//!
//! The projection is pure. It never touches the source list and is
//! recomputed from scratch for every request.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Transaction;
use crate::types::{Status, TransactionKind};

/// Comparable value of one column of one record
///
/// Variant order matters: a record without a value for the column sorts
/// before every record that has one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Missing,
    Number(Decimal),
    Date(NaiveDate),
    Text(String),
}

impl SortKey {
    pub fn text(value: &str) -> Self {
        SortKey::Text(value.to_string())
    }

    pub fn optional_text(value: Option<&str>) -> Self {
        value.map(SortKey::text).unwrap_or(SortKey::Missing)
    }
}

/// A list element the view-model can project
pub trait Record: Clone {
    /// Column selector
    type Field: Copy + PartialEq + fmt::Debug;
    /// Exact-match restrictions; `Default` restricts nothing
    type Filter: Default + Clone + fmt::Debug;

    /// Texts the search box looks into
    fn haystack(&self) -> Vec<String>;

    /// Check the record against the filter
    fn passes(&self, filter: &Self::Filter) -> bool;

    /// Comparable value of a column
    fn sort_key(&self, field: Self::Field) -> SortKey;

    /// Case-insensitive substring match over the haystack; the term is used as typed
    fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.haystack()
            .iter()
            .any(|text| text.to_lowercase().contains(&needle))
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(format!("Invalid sort direction: {}", s)),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// Column plus direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F> SortSpec<F> {
    pub fn asc(field: F) -> Self {
        Self { field, direction: SortDirection::Asc }
    }

    pub fn desc(field: F) -> Self {
        Self { field, direction: SortDirection::Desc }
    }
}

impl<F: FromStr> SortSpec<F> {
    /// Build from `sort`/`dir` query values; an unknown field means unsorted
    /// and an unknown direction means ascending
    pub fn parse(field: Option<&str>, direction: Option<&str>) -> Option<Self> {
        let field = field?.parse::<F>().ok()?;
        let direction = direction
            .and_then(|d| d.parse::<SortDirection>().ok())
            .unwrap_or(SortDirection::Asc);
        Some(Self { field, direction })
    }
}

/// Next sort state after a click on a column header
///
/// Ascending, then descending, then unsorted on the same column. A click on
/// a different column starts over with ascending.
pub fn toggle_sort<F: PartialEq>(current: Option<SortSpec<F>>, clicked: F) -> Option<SortSpec<F>> {
    match current {
        Some(spec) if spec.field == clicked => match spec.direction {
            SortDirection::Asc => Some(SortSpec::desc(clicked)),
            SortDirection::Desc => None,
        },
        _ => Some(SortSpec::asc(clicked)),
    }
}

/// Everything that shapes one rendering of a list
pub struct ViewQuery<R: Record> {
    pub search: String,
    pub filter: R::Filter,
    pub sort: Option<SortSpec<R::Field>>,
}

impl<R: Record> Default for ViewQuery<R> {
    fn default() -> Self {
        Self {
            search: String::new(),
            filter: R::Filter::default(),
            sort: None,
        }
    }
}

impl<R: Record> Clone for ViewQuery<R> {
    fn clone(&self) -> Self {
        Self {
            search: self.search.clone(),
            filter: self.filter.clone(),
            sort: self.sort,
        }
    }
}

impl<R: Record> fmt::Debug for ViewQuery<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewQuery")
            .field("search", &self.search)
            .field("filter", &self.filter)
            .field("sort", &self.sort)
            .finish()
    }
}

impl<R: Record> ViewQuery<R> {
    pub fn with_search(mut self, search: &str) -> Self {
        self.search = search.to_string();
        self
    }

    pub fn with_filter(mut self, filter: R::Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_sort(mut self, sort: Option<SortSpec<R::Field>>) -> Self {
        self.sort = sort;
        self
    }

    /// Apply a header click to the current sort
    pub fn click(mut self, field: R::Field) -> Self {
        self.sort = toggle_sort(self.sort, field);
        self
    }
}

/// Derive the displayed rows: search AND filter, then an optional stable sort
pub fn project<R: Record>(records: &[R], query: &ViewQuery<R>) -> Vec<R> {
    let mut rows: Vec<R> = records
        .iter()
        .filter(|r| r.matches_search(&query.search))
        .filter(|r| r.passes(&query.filter))
        .cloned()
        .collect();

    if let Some(spec) = query.sort {
        rows.sort_by(|a, b| {
            let ordering = a.sort_key(spec.field).cmp(&b.sort_key(spec.field));
            match spec.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }

    rows
}

/// Parse a filter query value; "all", blank or unknown values restrict nothing
pub fn parse_filter<T: FromStr>(value: Option<&str>) -> Option<T> {
    match value.map(str::trim) {
        None | Some("") => None,
        Some(v) if v.eq_ignore_ascii_case("all") => None,
        Some(v) => v.parse::<T>().ok(),
    }
}

// ==================== Transactions ====================

/// Sortable transaction columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionField {
    Id,
    Kind,
    Amount,
    Status,
    Date,
    Holder,
    Counterparty,
}

impl TransactionField {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionField::Id => "id",
            TransactionField::Kind => "type",
            TransactionField::Amount => "amount",
            TransactionField::Status => "status",
            TransactionField::Date => "date",
            TransactionField::Holder => "user",
            TransactionField::Counterparty => "recipient",
        }
    }
}

impl FromStr for TransactionField {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "id" => Ok(TransactionField::Id),
            "type" | "kind" => Ok(TransactionField::Kind),
            "amount" => Ok(TransactionField::Amount),
            "status" => Ok(TransactionField::Status),
            "date" => Ok(TransactionField::Date),
            "user" | "holder" => Ok(TransactionField::Holder),
            "recipient" | "counterparty" => Ok(TransactionField::Counterparty),
            _ => Err(format!("Invalid sort field: {}", s)),
        }
    }
}

impl fmt::Display for TransactionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind and status restrictions of a transaction list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    pub status: Option<Status>,
}

impl TransactionFilter {
    /// Build from `kind`/`status` query values
    pub fn parse(kind: Option<&str>, status: Option<&str>) -> Self {
        Self {
            kind: parse_filter(kind),
            status: parse_filter(status),
        }
    }
}

impl Record for Transaction {
    type Field = TransactionField;
    type Filter = TransactionFilter;

    fn haystack(&self) -> Vec<String> {
        let mut texts = vec![self.id.clone(), self.amount_text()];
        texts.extend(self.counterparty.iter().cloned());
        texts.extend(self.holder.iter().cloned());
        texts
    }

    fn passes(&self, filter: &TransactionFilter) -> bool {
        filter.kind.map_or(true, |k| self.kind == k)
            && filter.status.map_or(true, |s| self.status == s)
    }

    fn sort_key(&self, field: TransactionField) -> SortKey {
        match field {
            TransactionField::Id => SortKey::text(&self.id),
            TransactionField::Kind => SortKey::text(self.kind.as_str()),
            TransactionField::Amount => SortKey::Number(self.amount),
            TransactionField::Status => SortKey::text(self.status.as_str()),
            TransactionField::Date => SortKey::Date(self.date),
            TransactionField::Holder => SortKey::optional_text(self.holder.as_deref()),
            TransactionField::Counterparty => SortKey::optional_text(self.counterparty.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample() -> Vec<Transaction> {
        vec![
            Transaction::new("1", TransactionKind::Deposit, dec!(1000), date("2024-01-15"))
                .with_status(Status::Completed)
                .with_holder("John Doe"),
            Transaction::new("2", TransactionKind::Withdrawal, dec!(500), date("2024-01-16"))
                .with_holder("Jane Smith"),
            Transaction::new("3", TransactionKind::Send, dec!(200), date("2024-01-17"))
                .with_status(Status::Completed)
                .with_holder("Alice Johnson")
                .with_counterparty("Bob Williams"),
        ]
    }

    fn ids(rows: &[Transaction]) -> Vec<&str> {
        rows.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_search_by_amount() {
        let records = sample();
        let query = ViewQuery::default().with_search("500");
        assert_eq!(ids(&project(&records, &query)), vec!["2"]);
    }

    #[test]
    fn test_kind_filter() {
        let records = sample();
        let query = ViewQuery::default().with_filter(TransactionFilter {
            kind: Some(TransactionKind::Send),
            status: None,
        });
        assert_eq!(ids(&project(&records, &query)), vec!["3"]);
    }

    #[test]
    fn test_sort_by_amount_ascending() {
        let records = sample();
        let query = ViewQuery::default().click(TransactionField::Amount);
        assert_eq!(ids(&project(&records, &query)), vec!["3", "2", "1"]);
    }

    #[test]
    fn test_search_is_case_insensitive_and_covers_names() {
        let records = sample();
        let query = ViewQuery::default().with_search("bob");
        assert_eq!(ids(&project(&records, &query)), vec!["3"]);
        let query = ViewQuery::default().with_search("JANE");
        assert_eq!(ids(&project(&records, &query)), vec!["2"]);
    }

    #[test]
    fn test_empty_search_matches_everything() {
        let records = sample();
        let query = ViewQuery::default().with_search("");
        assert_eq!(project(&records, &query).len(), 3);
    }

    #[test]
    fn test_search_keeps_surrounding_spaces() {
        let records = sample();
        let query = ViewQuery::default().with_search(" 500");
        assert!(project(&records, &query).is_empty());
        let query = ViewQuery::default().with_search("   ");
        assert!(project(&records, &query).is_empty());
        let query = ViewQuery::default().with_search(" doe");
        assert_eq!(ids(&project(&records, &query)), vec!["1"]);
    }

    #[test]
    fn test_numeric_search_without_match_is_empty() {
        let records = sample();
        let query = ViewQuery::default().with_search("999");
        assert!(project(&records, &query).is_empty());
    }

    #[test]
    fn test_search_and_filters_combine() {
        let records = sample();
        let query = ViewQuery::default()
            .with_search("o")
            .with_filter(TransactionFilter::parse(Some("all"), Some("completed")));
        // "John Doe" and "Alice Johnson"/"Bob Williams" both contain an o
        assert_eq!(ids(&project(&records, &query)), vec!["1", "3"]);
    }

    #[test]
    fn test_filter_then_all_equals_filter() {
        let records = sample();
        let filter = TransactionFilter::parse(None, Some("pending"));
        let once = project(&records, &ViewQuery::default().with_filter(filter));
        let again = project(&once, &ViewQuery::default().with_filter(TransactionFilter::parse(Some("all"), Some("all"))));
        assert_eq!(once, again);
    }

    #[test]
    fn test_tri_state_toggle_roundtrip() {
        let records = sample();
        let asc = ViewQuery::<Transaction>::default().click(TransactionField::Date);
        let desc = asc.clone().click(TransactionField::Date);
        let cleared = desc.clone().click(TransactionField::Date);

        let asc_ids = ids(&project(&records, &asc)).into_iter().map(String::from).collect::<Vec<_>>();
        let mut desc_ids = ids(&project(&records, &desc)).into_iter().map(String::from).collect::<Vec<_>>();
        desc_ids.reverse();
        assert_eq!(asc_ids, desc_ids);

        assert!(cleared.sort.is_none());
        assert_eq!(project(&records, &cleared), records);
    }

    #[test]
    fn test_click_other_column_starts_ascending() {
        let sort = toggle_sort(Some(SortSpec::desc(TransactionField::Amount)), TransactionField::Id);
        assert_eq!(sort, Some(SortSpec::asc(TransactionField::Id)));
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let records = sample();
        let query = ViewQuery::default().click(TransactionField::Status);
        // both completed records keep their input order
        assert_eq!(ids(&project(&records, &query)), vec!["1", "3", "2"]);
    }

    #[test]
    fn test_missing_values_sort_first() {
        let records = sample();
        let query = ViewQuery::default().click(TransactionField::Counterparty);
        assert_eq!(ids(&project(&records, &query)), vec!["1", "2", "3"]);
        let query = query.click(TransactionField::Counterparty);
        assert_eq!(ids(&project(&records, &query))[0], "3");
    }

    #[test]
    fn test_kind_sorts_by_label() {
        let records = sample();
        let query = ViewQuery::default().click(TransactionField::Kind);
        // deposit < send < withdrawal
        assert_eq!(ids(&project(&records, &query)), vec!["1", "3", "2"]);
    }

    #[test]
    fn test_projection_leaves_source_untouched() {
        let records = sample();
        let before = records.clone();
        let query = ViewQuery::default().click(TransactionField::Amount).click(TransactionField::Amount);
        let _ = project(&records, &query);
        assert_eq!(records, before);
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(parse_filter::<Status>(Some("all")), None);
        assert_eq!(parse_filter::<Status>(Some("")), None);
        assert_eq!(parse_filter::<Status>(Some("bogus")), None);
        assert_eq!(parse_filter::<Status>(Some("approved")), Some(Status::Completed));
    }

    #[test]
    fn test_sort_spec_parse() {
        let spec = SortSpec::<TransactionField>::parse(Some("amount"), Some("desc"));
        assert_eq!(spec, Some(SortSpec::desc(TransactionField::Amount)));
        let spec = SortSpec::<TransactionField>::parse(Some("recipient"), None);
        assert_eq!(spec, Some(SortSpec::asc(TransactionField::Counterparty)));
        assert_eq!(SortSpec::<TransactionField>::parse(Some("colour"), Some("asc")), None);
        assert_eq!(SortSpec::<TransactionField>::parse(None, Some("asc")), None);
    }
}
