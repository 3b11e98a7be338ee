//! Bus schedule table schema
//!
//! Every region is stored as its own table with the same filterable columns.
//! Table names are discovered at runtime, so `TableName` can only be minted by
//! the catalog from the store's own enumeration.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::utils::sql::quote_identifier;

/// A filterable column of a bus schedule table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Column {
    #[serde(rename = "Bus_Type")]
    BusType,
    #[serde(rename = "Route_Name")]
    RouteName,
    #[serde(rename = "Departure_Time")]
    DepartureTime,
    #[serde(rename = "Price")]
    Price,
    #[serde(rename = "Star_Rating")]
    StarRating,
    #[serde(rename = "Seat_Availability")]
    SeatAvailability,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::BusType,
        Column::RouteName,
        Column::DepartureTime,
        Column::Price,
        Column::StarRating,
        Column::SeatAvailability,
    ];

    /// Column name as stored in the table
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BusType => "Bus_Type",
            Self::RouteName => "Route_Name",
            Self::DepartureTime => "Departure_Time",
            Self::Price => "Price",
            Self::StarRating => "Star_Rating",
            Self::SeatAvailability => "Seat_Availability",
        }
    }

    /// Quoted identifier for statement text
    pub fn quoted(&self) -> String {
        quote_identifier(self.as_str())
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Column {
    type Err = String;

    /// Accepts the stored name (`Route_Name`) or its lowercase form (`route_name`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let valid: Vec<String> = Column::ALL
                    .iter()
                    .map(|c| c.as_str().to_lowercase())
                    .collect();
                format!(
                    "Invalid column '{}'. Valid options: {}",
                    s,
                    valid.join(", ")
                )
            })
    }
}

/// Name of a region table, as enumerated by the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TableName(String);

impl TableName {
    /// Only the catalog (and store implementations reporting their tables)
    /// may create table names.
    pub(crate) fn from_catalog(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Quoted identifier for statement text
    pub fn quoted(&self) -> String {
        quote_identifier(&self.0)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_parse_accepts_stored_and_lowercase_names() {
        assert_eq!("Route_Name".parse::<Column>(), Ok(Column::RouteName));
        assert_eq!("route_name".parse::<Column>(), Ok(Column::RouteName));
        assert_eq!("STAR_RATING".parse::<Column>(), Ok(Column::StarRating));
    }

    #[test]
    fn column_parse_rejects_unknown() {
        let err = "Bus_Name".parse::<Column>().unwrap_err();
        assert!(err.contains("Invalid column 'Bus_Name'"));
        assert!(err.contains("bus_type"));
    }

    #[test]
    fn column_quoted() {
        assert_eq!(Column::SeatAvailability.quoted(), "\"Seat_Availability\"");
    }

    #[test]
    fn column_serializes_as_stored_name() {
        let json = serde_json::to_string(&Column::DepartureTime).unwrap();
        assert_eq!(json, "\"Departure_Time\"");
    }

    #[test]
    fn table_name_quoting() {
        let table = TableName::from_catalog("Tamil Nadu");
        assert_eq!(table.quoted(), "\"Tamil Nadu\"");
        assert_eq!(table.to_string(), "Tamil Nadu");
        assert_eq!(serde_json::to_string(&table).unwrap(), "\"Tamil Nadu\"");
    }
}
