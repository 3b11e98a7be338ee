//! SQL filter builder
//!
//! Turns a `FilterCriteria` into a `FilterQuery`: one predicate clause per
//! active constraint, each with `?` placeholders, and the values to bind in
//! placeholder order. Clauses are produced by a fixed, ordered list of clause
//! builders so the same criteria always yield the same statement.
//!
//! Only quoted identifiers (the catalog's table name and the fixed schema
//! columns) are written into the statement text. Filter values never are.

use std::collections::BTreeSet;

use crate::data::schema::{Column, TableName};
use crate::data::types::SqlValue;
use crate::utils::sql::placeholders;

use super::types::{FilterCriteria, RangeFilter};

/// Collects SQL parameters during query building (maintains insertion order)
#[derive(Debug, Default)]
pub struct SqlParams {
    pub values: Vec<SqlValue>,
}

/// A parameterized select against one region table
#[derive(Debug, Clone, PartialEq)]
pub struct FilterQuery {
    table: TableName,
    clauses: Vec<String>,
    params: Vec<SqlValue>,
}

impl FilterQuery {
    /// Predicate clauses in declared filter order
    pub fn clauses(&self) -> &[String] {
        &self.clauses
    }

    /// Bound values, in placeholder order
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Full statement text
    pub fn sql(&self) -> String {
        let base = format!("SELECT DISTINCT * FROM {}", self.table.quoted());
        if self.clauses.is_empty() {
            base
        } else {
            format!("{} WHERE {}", base, self.clauses.join(" AND "))
        }
    }
}

/// Builds one predicate clause, or `None` when its filter is inactive
type ClauseBuilder = fn(&FilterCriteria, &mut SqlParams) -> Option<String>;

/// Clause builders in the order their clauses appear in the statement
const CLAUSE_BUILDERS: [ClauseBuilder; 6] = [
    bus_type_clause,
    route_name_clause,
    departure_time_clause,
    price_clause,
    star_rating_clause,
    seat_availability_clause,
];

/// Build the filtered select for `table`
pub fn build_filter_query(table: &TableName, criteria: &FilterCriteria) -> FilterQuery {
    let mut params = SqlParams::default();
    let clauses: Vec<String> = CLAUSE_BUILDERS
        .iter()
        .filter_map(|build| build(criteria, &mut params))
        .collect();

    tracing::debug!(table = %table, clauses = clauses.len(), "Built filter query");

    FilterQuery {
        table: table.clone(),
        clauses,
        params: params.values,
    }
}

pub fn bus_type_clause(criteria: &FilterCriteria, params: &mut SqlParams) -> Option<String> {
    in_list_clause(&Column::BusType.quoted(), &criteria.bus_types, params)
}

pub fn route_name_clause(criteria: &FilterCriteria, params: &mut SqlParams) -> Option<String> {
    in_list_clause(&Column::RouteName.quoted(), &criteria.route_names, params)
}

pub fn departure_time_clause(criteria: &FilterCriteria, params: &mut SqlParams) -> Option<String> {
    between_clause(
        &Column::DepartureTime.quoted(),
        criteria.departure_time.as_ref(),
        params,
        |t| SqlValue::Time(*t),
    )
}

pub fn price_clause(criteria: &FilterCriteria, params: &mut SqlParams) -> Option<String> {
    between_clause(
        &Column::Price.quoted(),
        criteria.price.as_ref(),
        params,
        |p| SqlValue::Real(*p),
    )
}

/// Star ratings are stored as text; compare them numerically
pub fn star_rating_clause(criteria: &FilterCriteria, params: &mut SqlParams) -> Option<String> {
    between_clause(
        &format!("CAST({} AS REAL)", Column::StarRating.quoted()),
        criteria.star_rating.as_ref(),
        params,
        |r| SqlValue::Real(*r),
    )
}

pub fn seat_availability_clause(
    criteria: &FilterCriteria,
    params: &mut SqlParams,
) -> Option<String> {
    between_clause(
        &Column::SeatAvailability.quoted(),
        criteria.seat_availability.as_ref(),
        params,
        |s| SqlValue::Integer(*s),
    )
}

/// `col IN (?, ...)` with one placeholder per value; empty set means no clause
fn in_list_clause(
    col: &str,
    values: &BTreeSet<String>,
    params: &mut SqlParams,
) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    params
        .values
        .extend(values.iter().cloned().map(SqlValue::Text));
    Some(format!("{} IN ({})", col, placeholders(values.len())))
}

/// `col BETWEEN ? AND ?` binding `(min, max)`
fn between_clause<T>(
    col: &str,
    range: Option<&RangeFilter<T>>,
    params: &mut SqlParams,
    to_value: impl Fn(&T) -> SqlValue,
) -> Option<String> {
    let range = range?;
    params.values.push(to_value(&range.min));
    params.values.push(to_value(&range.max));
    Some(format!("{} BETWEEN ? AND ?", col))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn table() -> TableName {
        TableName::from_catalog("Karnataka")
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn empty_criteria_is_unfiltered_base() {
        let query = build_filter_query(&table(), &FilterCriteria::default());

        assert_eq!(query.sql(), r#"SELECT DISTINCT * FROM "Karnataka""#);
        assert!(query.clauses().is_empty());
        assert!(query.params().is_empty());
        assert!(!query.sql().contains("WHERE"));
    }

    #[test]
    fn bus_types_one_placeholder_per_value() {
        let criteria = FilterCriteria {
            bus_types: set(&["A/C Sleeper (2+1)", "Volvo A/C Sleeper (2+1)", "VE A/C Sleeper (2+1)"]),
            ..Default::default()
        };
        let mut params = SqlParams::default();
        let sql = bus_type_clause(&criteria, &mut params).unwrap();

        assert_eq!(sql, r#""Bus_Type" IN (?, ?, ?)"#);
        let bound: BTreeSet<String> = params
            .values
            .iter()
            .map(|v| match v {
                SqlValue::Text(s) => s.clone(),
                other => panic!("unexpected param {:?}", other),
            })
            .collect();
        assert_eq!(bound, criteria.bus_types);
    }

    #[test]
    fn empty_sets_produce_no_clause() {
        let criteria = FilterCriteria::default();
        let mut params = SqlParams::default();
        assert_eq!(bus_type_clause(&criteria, &mut params), None);
        assert_eq!(route_name_clause(&criteria, &mut params), None);
        assert!(params.values.is_empty());
    }

    #[test]
    fn range_binds_min_then_max() {
        let criteria = FilterCriteria {
            price: Some(RangeFilter::new(250.0, 1000.0)),
            seat_availability: Some(RangeFilter::new(1, 60)),
            ..Default::default()
        };
        let mut params = SqlParams::default();

        let sql = price_clause(&criteria, &mut params).unwrap();
        assert_eq!(sql, r#""Price" BETWEEN ? AND ?"#);
        assert_eq!(params.values, vec![SqlValue::Real(250.0), SqlValue::Real(1000.0)]);

        let sql = seat_availability_clause(&criteria, &mut params).unwrap();
        assert_eq!(sql, r#""Seat_Availability" BETWEEN ? AND ?"#);
        assert_eq!(
            params.values[2..],
            [SqlValue::Integer(1), SqlValue::Integer(60)]
        );
    }

    #[test]
    fn departure_time_binds_times() {
        let from = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
        let to = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        let criteria = FilterCriteria {
            departure_time: Some(RangeFilter::new(from, to)),
            ..Default::default()
        };
        let mut params = SqlParams::default();
        let sql = departure_time_clause(&criteria, &mut params).unwrap();

        assert_eq!(sql, r#""Departure_Time" BETWEEN ? AND ?"#);
        assert_eq!(params.values, vec![SqlValue::Time(from), SqlValue::Time(to)]);
    }

    #[test]
    fn star_rating_is_cast_to_real() {
        let criteria = FilterCriteria {
            star_rating: Some(RangeFilter::new(4.0, 5.0)),
            ..Default::default()
        };
        let mut params = SqlParams::default();
        let sql = star_rating_clause(&criteria, &mut params).unwrap();

        assert_eq!(sql, r#"CAST("Star_Rating" AS REAL) BETWEEN ? AND ?"#);
        assert_eq!(params.values, vec![SqlValue::Real(4.0), SqlValue::Real(5.0)]);
    }

    #[test]
    fn all_filters_in_declared_order() {
        let criteria = FilterCriteria {
            bus_types: set(&["A/C Seater (2+2)"]),
            route_names: set(&["Kochi-Bangalore", "Trivandrum-Kochi"]),
            departure_time: Some(RangeFilter::new(
                NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(23, 59, 0).unwrap(),
            )),
            price: Some(RangeFilter::new(0.0, 3000.0)),
            star_rating: Some(RangeFilter::new(0.0, 5.0)),
            seat_availability: Some(RangeFilter::new(1, 60)),
        };
        let query = build_filter_query(&table(), &criteria);

        assert_eq!(
            query.clauses(),
            [
                r#""Bus_Type" IN (?)"#,
                r#""Route_Name" IN (?, ?)"#,
                r#""Departure_Time" BETWEEN ? AND ?"#,
                r#""Price" BETWEEN ? AND ?"#,
                r#"CAST("Star_Rating" AS REAL) BETWEEN ? AND ?"#,
                r#""Seat_Availability" BETWEEN ? AND ?"#,
            ]
        );
        assert_eq!(query.params().len(), 11);
        assert_eq!(query.sql().matches('?').count(), query.params().len());
        assert!(query.sql().starts_with(r#"SELECT DISTINCT * FROM "Karnataka" WHERE "Bus_Type""#));
    }

    #[test]
    fn empty_bus_types_with_routes_emits_only_route_clause() {
        let criteria = FilterCriteria {
            bus_types: BTreeSet::new(),
            route_names: set(&["Bangalore-Mysore"]),
            ..Default::default()
        };
        let query = build_filter_query(&table(), &criteria);

        assert_eq!(query.clauses(), [r#""Route_Name" IN (?)"#]);
        assert!(!query.sql().contains("Bus_Type"));
        assert_eq!(
            query.params(),
            [SqlValue::Text("Bangalore-Mysore".into())]
        );
    }

    #[test]
    fn values_are_never_interpolated() {
        let hostile = "x') OR 1=1; DROP TABLE \"Karnataka\"; --";
        let criteria = FilterCriteria {
            route_names: set(&[hostile]),
            ..Default::default()
        };
        let query = build_filter_query(&table(), &criteria);

        assert!(!query.sql().contains("DROP"));
        assert_eq!(query.params(), [SqlValue::Text(hostile.to_string())]);
    }

    #[test]
    fn build_is_deterministic() {
        let criteria = FilterCriteria {
            bus_types: set(&["b", "a", "c"]),
            price: Some(RangeFilter::new(1.0, 2.0)),
            ..Default::default()
        };
        let first = build_filter_query(&table(), &criteria);
        let second = build_filter_query(&table(), &criteria.clone());
        assert_eq!(first, second);
        assert_eq!(first.params()[0], SqlValue::Text("a".into()));
    }

    #[test]
    fn inverted_range_is_still_bound_in_order() {
        let criteria = FilterCriteria {
            price: Some(RangeFilter::new(900.0, 100.0)),
            ..Default::default()
        };
        let query = build_filter_query(&table(), &criteria);
        assert_eq!(query.params(), [SqlValue::Real(900.0), SqlValue::Real(100.0)]);
    }

    #[test]
    fn table_name_is_quoted() {
        let table = TableName::from_catalog("Andhra \"Pradesh\"");
        let query = build_filter_query(&table, &FilterCriteria::default());
        assert_eq!(query.sql(), r#"SELECT DISTINCT * FROM "Andhra ""Pradesh""""#);
    }

    // Statements executed against the in-memory fixture tables

    use crate::data::sqlite::fixtures::fixture_store;
    use crate::data::traits::TabularStore;
    use crate::data::types::{CellValue, ResultSet};

    async fn run(table: &str, criteria: &FilterCriteria) -> ResultSet {
        let store = fixture_store().await;
        let query = build_filter_query(&TableName::from_catalog(table), criteria);
        store.fetch_rows(&query.sql(), query.params()).await.unwrap()
    }

    fn cell<'a>(set: &'a ResultSet, row: usize, column: Column) -> &'a CellValue {
        &set.rows[row][set.column_index(column.as_str()).unwrap()]
    }

    /// Row-by-row evaluation of the same criteria, for comparison
    fn naive_matches(set: &ResultSet, row: &[CellValue], criteria: &FilterCriteria) -> bool {
        let get = |column: Column| &row[set.column_index(column.as_str()).unwrap()];
        let text = |column: Column| match get(column) {
            CellValue::Text(s) => Some(s.clone()),
            _ => None,
        };
        let real = |column: Column| match get(column) {
            CellValue::Real(r) => Some(*r),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Text(s) => s.parse::<f64>().ok(),
            _ => None,
        };

        let in_set = |values: &BTreeSet<String>, column: Column| {
            values.is_empty() || text(column).is_some_and(|v| values.contains(&v))
        };
        let departure_ok = criteria.departure_time.is_none_or(|r| {
            text(Column::DepartureTime)
                .and_then(|t| NaiveTime::parse_from_str(&t, "%H:%M:%S").ok())
                .is_some_and(|t| r.contains(&t))
        });
        let price_ok = criteria
            .price
            .is_none_or(|r| real(Column::Price).is_some_and(|p| r.contains(&p)));
        let rating_ok = criteria
            .star_rating
            .is_none_or(|r| real(Column::StarRating).is_some_and(|s| r.contains(&s)));
        let seats_ok = criteria.seat_availability.is_none_or(|r| match get(Column::SeatAvailability) {
            CellValue::Integer(i) => r.contains(i),
            _ => false,
        });

        in_set(&criteria.bus_types, Column::BusType)
            && in_set(&criteria.route_names, Column::RouteName)
            && departure_ok
            && price_ok
            && rating_ok
            && seats_ok
    }

    #[tokio::test]
    async fn karnataka_ac_sleeper_under_1000() {
        let criteria = FilterCriteria {
            bus_types: set(&["A/C Sleeper (2+1)", "Volvo A/C Sleeper (2+1)"]),
            price: Some(RangeFilter::new(0.0, 1000.0)),
            ..Default::default()
        };
        let query = build_filter_query(&table(), &criteria);
        assert_eq!(query.clauses().len(), 2);

        let result = run("Karnataka", &criteria).await;
        assert_eq!(result.len(), 1);
        assert_eq!(
            cell(&result, 0, Column::BusType),
            &CellValue::Text("A/C Sleeper (2+1)".into())
        );
    }

    #[tokio::test]
    async fn star_rating_compares_numerically() {
        // Compared as text, '10.0' would sort between '1' and '5'
        let criteria = FilterCriteria {
            star_rating: Some(RangeFilter::new(4.0, 5.0)),
            ..Default::default()
        };
        let result = run("Kerala", &criteria).await;

        let ratings: BTreeSet<String> = (0..result.len())
            .filter_map(|i| cell(&result, i, Column::StarRating).as_option_text())
            .collect();
        assert!(!ratings.contains("10.0"));
        assert!(!ratings.contains("3.8"));
        assert_eq!(ratings, set(&["4.0", "4.5", "4.9", "5.0"]));
    }

    #[tokio::test]
    async fn select_distinct_collapses_duplicate_rows() {
        let result = run("Kerala", &FilterCriteria::default()).await;
        assert_eq!(result.len(), 7);
    }

    #[tokio::test]
    async fn inverted_range_returns_no_rows() {
        let criteria = FilterCriteria {
            price: Some(RangeFilter::new(1000.0, 100.0)),
            ..Default::default()
        };
        assert!(run("Kerala", &criteria).await.is_empty());
    }

    #[tokio::test]
    async fn departure_window_is_inclusive() {
        let criteria = FilterCriteria {
            departure_time: Some(RangeFilter::new(
                NaiveTime::from_hms_opt(6, 30, 0).unwrap(),
                NaiveTime::from_hms_opt(13, 45, 0).unwrap(),
            )),
            ..Default::default()
        };
        let result = run("Kerala", &criteria).await;
        assert_eq!(result.len(), 3);
    }

    #[tokio::test]
    async fn matches_row_by_row_evaluation() {
        let store = fixture_store().await;
        let all = store
            .fetch_rows(r#"SELECT DISTINCT * FROM "Kerala""#, &[])
            .await
            .unwrap();

        let cases = vec![
            FilterCriteria::default(),
            FilterCriteria {
                route_names: set(&["Kochi-Bangalore", "Trivandrum-Kochi"]),
                ..Default::default()
            },
            FilterCriteria {
                bus_types: set(&["A/C Sleeper (2+1)", "NON A/C Sleeper (2+1)"]),
                seat_availability: Some(RangeFilter::new(1, 60)),
                ..Default::default()
            },
            FilterCriteria {
                price: Some(RangeFilter::new(500.0, 1450.0)),
                star_rating: Some(RangeFilter::new(3.0, 5.0)),
                departure_time: Some(RangeFilter::new(
                    NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
                    NaiveTime::from_hms_opt(23, 59, 0).unwrap(),
                )),
                ..Default::default()
            },
            FilterCriteria {
                route_names: set(&["Nowhere"]),
                ..Default::default()
            },
        ];

        for criteria in cases {
            let expected = all
                .rows
                .iter()
                .filter(|row| naive_matches(&all, row, &criteria))
                .count();
            let actual = run("Kerala", &criteria).await;
            assert_eq!(actual.len(), expected, "criteria: {:?}", criteria);
            for row in &actual.rows {
                assert!(naive_matches(&actual, row, &criteria));
            }
        }
    }
}
