/*!
 * Inventory filter engine
 *
 * Query parameters are parsed into typed predicates up front, then applied in a fixed
 * key order. Two strategies are available:
 *
 * - `Sequential` starts from one page of the unfiltered listing and narrows it one
 *   predicate at a time, intersecting by whole-record equality. Records outside the page
 *   window can never be returned.
 * - `Combined` runs a single conjunctive query over the whole table and paginates the
 *   matches.
 */

use crate::db::query_builder::{split_list, TextMatch};
use crate::db::Pagination;
use crate::entities::inventory;
use crate::errors::ServiceError;
use async_trait::async_trait;
use chrono::NaiveDate;
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// How a set of predicates is evaluated against the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterStrategy {
    #[default]
    Sequential,
    Combined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// A single typed condition on one inventory column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    FlavorIn(Vec<String>),
    /// Case-insensitive `LIKE`; `%` and `_` are wildcards
    FlavorLike(String),
    EmployeeIn(Vec<i32>),
    EmployeeEq(i32),
    StoreIn(Vec<i32>),
    StoreEq(i32),
    Quantity(Comparison, i32),
    Date(Comparison, NaiveDate),
    SeasonFlavor(bool),
}

/// Recognised query keys, declared in application order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FilterKey {
    Flavor,
    EmployeeId,
    StoreId,
    QuantityGte,
    QuantityLte,
    QuantityLt,
    QuantityGt,
    QuantityEq,
    Date,
    DateGte,
    DateLte,
    DateLt,
    DateGt,
    IsSeasonFlavor,
}

impl FilterKey {
    pub const ALL: [FilterKey; 14] = [
        FilterKey::Flavor,
        FilterKey::EmployeeId,
        FilterKey::StoreId,
        FilterKey::QuantityGte,
        FilterKey::QuantityLte,
        FilterKey::QuantityLt,
        FilterKey::QuantityGt,
        FilterKey::QuantityEq,
        FilterKey::Date,
        FilterKey::DateGte,
        FilterKey::DateLte,
        FilterKey::DateLt,
        FilterKey::DateGt,
        FilterKey::IsSeasonFlavor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKey::Flavor => "flavor",
            FilterKey::EmployeeId => "employee_id",
            FilterKey::StoreId => "store_id",
            FilterKey::QuantityGte => "quantity[gte]",
            FilterKey::QuantityLte => "quantity[lte]",
            FilterKey::QuantityLt => "quantity[lt]",
            FilterKey::QuantityGt => "quantity[gt]",
            FilterKey::QuantityEq => "quantity[eq]",
            FilterKey::Date => "date",
            FilterKey::DateGte => "date[gte]",
            FilterKey::DateLte => "date[lte]",
            FilterKey::DateLt => "date[lt]",
            FilterKey::DateGt => "date[gt]",
            FilterKey::IsSeasonFlavor => "is_season_flavor",
        }
    }

    pub fn parse(key: &str) -> Option<FilterKey> {
        FilterKey::ALL.into_iter().find(|k| k.as_str() == key)
    }

    fn predicate(self, raw: &str) -> Result<Option<Predicate>, ServiceError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        let predicate = match self {
            FilterKey::Flavor => match TextMatch::parse(raw) {
                None => return Ok(None),
                Some(TextMatch::Pattern(pattern)) => Predicate::FlavorLike(pattern),
                Some(TextMatch::OneOf(values)) => Predicate::FlavorIn(values),
            },
            FilterKey::EmployeeId => match self.parse_ids(raw)? {
                ids if ids.is_empty() => return Ok(None),
                ids if ids.len() == 1 => Predicate::EmployeeEq(ids[0]),
                ids => Predicate::EmployeeIn(ids),
            },
            FilterKey::StoreId => match self.parse_ids(raw)? {
                ids if ids.is_empty() => return Ok(None),
                ids if ids.len() == 1 => Predicate::StoreEq(ids[0]),
                ids => Predicate::StoreIn(ids),
            },
            FilterKey::QuantityGte => Predicate::Quantity(Comparison::Gte, self.parse_int(raw)?),
            FilterKey::QuantityLte => Predicate::Quantity(Comparison::Lte, self.parse_int(raw)?),
            FilterKey::QuantityLt => Predicate::Quantity(Comparison::Lt, self.parse_int(raw)?),
            FilterKey::QuantityGt => Predicate::Quantity(Comparison::Gt, self.parse_int(raw)?),
            FilterKey::QuantityEq => Predicate::Quantity(Comparison::Eq, self.parse_int(raw)?),
            FilterKey::Date => Predicate::Date(Comparison::Eq, self.parse_date(raw)?),
            FilterKey::DateGte => Predicate::Date(Comparison::Gte, self.parse_date(raw)?),
            FilterKey::DateLte => Predicate::Date(Comparison::Lte, self.parse_date(raw)?),
            FilterKey::DateLt => Predicate::Date(Comparison::Lt, self.parse_date(raw)?),
            FilterKey::DateGt => Predicate::Date(Comparison::Gt, self.parse_date(raw)?),
            FilterKey::IsSeasonFlavor => Predicate::SeasonFlavor(self.parse_bool(raw)?),
        };

        Ok(Some(predicate))
    }

    fn invalid(self, value: &str, expected: &str) -> ServiceError {
        ServiceError::ValidationError(format!(
            "invalid value '{}' for '{}': expected {}",
            value,
            self.as_str(),
            expected
        ))
    }

    fn parse_int(self, value: &str) -> Result<i32, ServiceError> {
        value
            .trim()
            .parse::<i32>()
            .map_err(|_| self.invalid(value, "an integer"))
    }

    fn parse_ids(self, raw: &str) -> Result<Vec<i32>, ServiceError> {
        split_list(raw)
            .iter()
            .map(|value| self.parse_int(value))
            .collect()
    }

    fn parse_date(self, value: &str) -> Result<NaiveDate, ServiceError> {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map_err(|_| self.invalid(value, "a date formatted YYYY-MM-DD"))
    }

    fn parse_bool(self, value: &str) -> Result<bool, ServiceError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(self.invalid(value, "true or false")),
        }
    }
}

/// Validated, ordered predicates for one inventory query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryFilter {
    predicates: Vec<Predicate>,
}

impl InventoryFilter {
    /// Parse raw query pairs. Unknown keys, pagination keys and blank values are skipped;
    /// every recognised key occurrence contributes its own predicate.
    pub fn from_query_pairs<'a, I>(pairs: I) -> Result<Self, ServiceError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut keyed = Vec::new();
        for (key, value) in pairs {
            let Some(filter_key) = FilterKey::parse(key.trim()) else {
                continue;
            };
            if let Some(predicate) = filter_key.predicate(value)? {
                keyed.push((filter_key, predicate));
            }
        }

        // stable: occurrence order survives within a key
        keyed.sort_by_key(|(key, _)| *key);

        Ok(Self {
            predicates: keyed.into_iter().map(|(_, predicate)| predicate).collect(),
        })
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

/// Keep the records of `step` that are equal, field for field, to a member of
/// `accumulator`, in `step` order.
pub fn intersect(accumulator: &[inventory::Model], step: Vec<inventory::Model>) -> Vec<inventory::Model> {
    let members: HashSet<&inventory::Model> = accumulator.iter().collect();
    step.into_iter()
        .filter(|record| members.contains(record))
        .collect()
}

/// The reads the engine needs from persistence
#[async_trait]
pub trait InventoryGateway: Send + Sync {
    async fn list_page(&self, pagination: Pagination) -> Result<Vec<inventory::Model>, ServiceError>;

    async fn filter_one_within(
        &self,
        predicate: &Predicate,
        ids: &[i32],
    ) -> Result<Vec<inventory::Model>, ServiceError>;

    async fn filter_page(
        &self,
        predicates: &[Predicate],
        pagination: Pagination,
    ) -> Result<Vec<inventory::Model>, ServiceError>;
}

/// Evaluate `filter` with the chosen strategy
pub async fn apply_filter<G>(
    gateway: &G,
    filter: &InventoryFilter,
    pagination: Pagination,
    strategy: FilterStrategy,
) -> Result<Vec<inventory::Model>, ServiceError>
where
    G: InventoryGateway + ?Sized,
{
    match strategy {
        FilterStrategy::Sequential => {
            counter!("frozono_inventory.filter", 1, "strategy" => "sequential");
            let mut accumulator = gateway.list_page(pagination).await?;

            for predicate in filter.predicates() {
                if accumulator.is_empty() {
                    break;
                }
                let ids: Vec<i32> = accumulator.iter().map(|record| record.id).collect();
                let step = gateway.filter_one_within(predicate, &ids).await?;
                accumulator = intersect(&accumulator, step);
                debug!(?predicate, remaining = accumulator.len(), "applied inventory filter");
            }

            Ok(accumulator)
        }
        FilterStrategy::Combined => {
            counter!("frozono_inventory.filter", 1, "strategy" => "combined");
            if filter.is_empty() {
                return gateway.list_page(pagination).await;
            }
            gateway.filter_page(filter.predicates(), pagination).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Mutex;

    fn record(id: i32, flavor: &str, quantity: i32, store_id: i32) -> inventory::Model {
        inventory::Model {
            id,
            store_id: Some(store_id),
            employee_id: Some(1),
            date: NaiveDate::from_ymd_opt(2023, 6, id as u32 % 28 + 1).unwrap(),
            flavor: flavor.to_string(),
            is_season_flavor: id % 2 == 0,
            quantity,
        }
    }

    fn matches(predicate: &Predicate, r: &inventory::Model) -> bool {
        fn cmp<T: PartialOrd>(op: Comparison, lhs: T, rhs: T) -> bool {
            match op {
                Comparison::Eq => lhs == rhs,
                Comparison::Gt => lhs > rhs,
                Comparison::Gte => lhs >= rhs,
                Comparison::Lt => lhs < rhs,
                Comparison::Lte => lhs <= rhs,
            }
        }
        match predicate {
            Predicate::FlavorIn(values) => values.contains(&r.flavor),
            Predicate::FlavorLike(pattern) => r.flavor.eq_ignore_ascii_case(pattern),
            Predicate::EmployeeIn(ids) => r.employee_id.is_some_and(|id| ids.contains(&id)),
            Predicate::EmployeeEq(id) => r.employee_id == Some(*id),
            Predicate::StoreIn(ids) => r.store_id.is_some_and(|id| ids.contains(&id)),
            Predicate::StoreEq(id) => r.store_id == Some(*id),
            Predicate::Quantity(op, value) => cmp(*op, r.quantity, *value),
            Predicate::Date(op, value) => cmp(*op, r.date, *value),
            Predicate::SeasonFlavor(value) => r.is_season_flavor == *value,
        }
    }

    /// Vec-backed gateway that records how many single-predicate reads it served
    struct FakeGateway {
        rows: Vec<inventory::Model>,
        step_reads: Mutex<usize>,
    }

    impl FakeGateway {
        fn new(rows: Vec<inventory::Model>) -> Self {
            Self {
                rows,
                step_reads: Mutex::new(0),
            }
        }

        fn page(rows: Vec<inventory::Model>, pagination: Pagination) -> Vec<inventory::Model> {
            rows.into_iter()
                .skip(pagination.offset() as usize)
                .take(pagination.per_page() as usize)
                .collect()
        }
    }

    #[async_trait]
    impl InventoryGateway for FakeGateway {
        async fn list_page(&self, pagination: Pagination) -> Result<Vec<inventory::Model>, ServiceError> {
            Ok(Self::page(self.rows.clone(), pagination))
        }

        async fn filter_one_within(
            &self,
            predicate: &Predicate,
            ids: &[i32],
        ) -> Result<Vec<inventory::Model>, ServiceError> {
            *self.step_reads.lock().unwrap() += 1;
            Ok(self
                .rows
                .iter()
                .filter(|r| ids.contains(&r.id) && matches(predicate, r))
                .cloned()
                .collect())
        }

        async fn filter_page(
            &self,
            predicates: &[Predicate],
            pagination: Pagination,
        ) -> Result<Vec<inventory::Model>, ServiceError> {
            let rows = self
                .rows
                .iter()
                .filter(|r| predicates.iter().all(|p| matches(p, r)))
                .cloned()
                .collect();
            Ok(Self::page(rows, pagination))
        }
    }

    fn sample_rows() -> Vec<inventory::Model> {
        vec![
            record(1, "Vanilla", 5, 1),
            record(2, "Chocolate", 10, 1),
            record(3, "Mint", 15, 2),
            record(4, "Vanilla", 20, 2),
            record(5, "Chocolate", 25, 3),
            record(6, "Vanilla", 30, 3),
        ]
    }

    fn parse(pairs: &[(&str, &str)]) -> Result<InventoryFilter, ServiceError> {
        InventoryFilter::from_query_pairs(pairs.iter().copied())
    }

    #[test]
    fn predicates_follow_fixed_key_order() {
        let filter = parse(&[
            ("is_season_flavor", "yes"),
            ("quantity[eq]", "5"),
            ("quantity[gte]", "1"),
            ("flavor", "Vanilla"),
        ])
        .unwrap();

        assert_eq!(
            filter.predicates(),
            &[
                Predicate::FlavorLike("Vanilla".into()),
                Predicate::Quantity(Comparison::Gte, 1),
                Predicate::Quantity(Comparison::Eq, 5),
                Predicate::SeasonFlavor(true),
            ]
        );
    }

    #[test]
    fn pagination_unknown_and_blank_keys_are_ignored() {
        let filter = parse(&[
            ("page", "2"),
            ("per_page", "10"),
            ("colour", "red"),
            ("flavor", ""),
            ("store_id", " , "),
        ])
        .unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn multiple_values_become_membership() {
        let filter = parse(&[("flavor", "Vanilla, Chocolate"), ("store_id", "1,2")]).unwrap();
        assert_eq!(
            filter.predicates(),
            &[
                Predicate::FlavorIn(vec!["Vanilla".into(), "Chocolate".into()]),
                Predicate::StoreIn(vec![1, 2]),
            ]
        );
    }

    #[test]
    fn repeated_keys_keep_every_occurrence() {
        let filter = parse(&[("quantity[eq]", "5"), ("quantity[eq]", "6")]).unwrap();
        assert_eq!(filter.predicates().len(), 2);
    }

    #[rstest]
    #[case("quantity[gt]", "ten")]
    #[case("quantity[eq]", "99999999999")]
    #[case("employee_id", "1,x")]
    #[case("date", "2023-13-01")]
    #[case("date[lt]", "06/01/2023")]
    #[case("is_season_flavor", "maybe")]
    fn malformed_values_are_rejected(#[case] key: &str, #[case] value: &str) {
        match parse(&[(key, value)]) {
            Err(ServiceError::ValidationError(message)) => assert!(message.contains(key)),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[rstest]
    #[case("true", true)]
    #[case("FALSE", false)]
    #[case("1", true)]
    #[case("no", false)]
    fn booleans_accept_common_spellings(#[case] raw: &str, #[case] expected: bool) {
        let filter = parse(&[("is_season_flavor", raw)]).unwrap();
        assert_eq!(filter.predicates(), &[Predicate::SeasonFlavor(expected)]);
    }

    #[test]
    fn intersect_is_structural_and_keeps_step_order() {
        let accumulator = vec![record(1, "Vanilla", 5, 1), record(2, "Mint", 7, 1)];
        let mut changed = record(1, "Vanilla", 5, 1);
        changed.quantity = 6;
        let step = vec![record(2, "Mint", 7, 1), changed, record(3, "Mint", 7, 1)];

        assert_eq!(intersect(&accumulator, step), vec![record(2, "Mint", 7, 1)]);
    }

    #[tokio::test]
    async fn no_filters_return_the_page() {
        let gateway = FakeGateway::new(sample_rows());
        let page = Pagination::new(1, 4, 500);
        let result = apply_filter(&gateway, &InventoryFilter::default(), page, FilterStrategy::Sequential)
            .await
            .unwrap();
        assert_eq!(result, sample_rows()[..4].to_vec());
    }

    #[tokio::test]
    async fn sequential_only_narrows_within_the_page() {
        let gateway = FakeGateway::new(sample_rows());
        let filter = parse(&[("flavor", "Vanilla")]).unwrap();
        let page = Pagination::new(1, 3, 500);

        let sequential = apply_filter(&gateway, &filter, page, FilterStrategy::Sequential)
            .await
            .unwrap();
        let ids: Vec<i32> = sequential.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1]);

        let combined = apply_filter(&gateway, &filter, page, FilterStrategy::Combined)
            .await
            .unwrap();
        let ids: Vec<i32> = combined.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 4, 6]);
    }

    #[tokio::test]
    async fn contradictory_filters_yield_nothing_and_stop_early() {
        let gateway = FakeGateway::new(sample_rows());
        let filter = parse(&[
            ("quantity[eq]", "5"),
            ("quantity[eq]", "6"),
            ("flavor", "Rocky Road"),
        ])
        .unwrap();

        let result = apply_filter(&gateway, &filter, Pagination::new(1, 50, 500), FilterStrategy::Sequential)
            .await
            .unwrap();

        assert!(result.is_empty());
        // flavor runs first and empties the accumulator; neither quantity read happens
        assert_eq!(*gateway.step_reads.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn filters_compose_as_conjunction() {
        let gateway = FakeGateway::new(sample_rows());
        let filter = parse(&[
            ("flavor", "Vanilla,Chocolate"),
            ("quantity[gte]", "10"),
            ("quantity[lt]", "30"),
        ])
        .unwrap();

        for strategy in [FilterStrategy::Sequential, FilterStrategy::Combined] {
            let result = apply_filter(&gateway, &filter, Pagination::new(1, 50, 500), strategy)
                .await
                .unwrap();
            let ids: Vec<i32> = result.iter().map(|r| r.id).collect();
            assert_eq!(ids, vec![2, 4, 5], "strategy {:?}", strategy);
        }
    }

    #[test]
    fn strategy_deserializes_from_lowercase() {
        let strategy: FilterStrategy = serde_json::from_str("\"combined\"").unwrap();
        assert_eq!(strategy, FilterStrategy::Combined);
        assert_eq!(FilterStrategy::default(), FilterStrategy::Sequential);
    }
}
