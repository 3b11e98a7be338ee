//! Filter criteria types
//!
//! A `FilterCriteria` is the sparse set of constraints for one search. Every
//! field is independently present or absent; an empty set or `None` range
//! means "do not filter on this column".

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Inclusive `[min, max]` range
///
/// `min <= max` is expected but not enforced; an inverted range simply
/// matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct RangeFilter<T> {
    pub min: T,
    pub max: T,
}

impl<T> RangeFilter<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: PartialOrd> RangeFilter<T> {
    /// True when `min > max`
    pub fn is_inverted(&self) -> bool {
        self.min > self.max
    }

    pub fn contains(&self, value: &T) -> bool {
        &self.min <= value && value <= &self.max
    }
}

impl<T: fmt::Display> fmt::Display for RangeFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.min, self.max)
    }
}

impl<T> FromStr for RangeFilter<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    type Err = String;

    /// Parse `min..max`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (min, max) = s
            .split_once("..")
            .ok_or_else(|| format!("Invalid range '{}'. Expected MIN..MAX", s))?;
        let min = min
            .trim()
            .parse::<T>()
            .map_err(|e| format!("Invalid range minimum '{}': {}", min.trim(), e))?;
        let max = max
            .trim()
            .parse::<T>()
            .map_err(|e| format!("Invalid range maximum '{}': {}", max.trim(), e))?;
        Ok(Self { min, max })
    }
}

/// Constraints for one search
///
/// `bus_types` holds raw `Bus_Type` values, already expanded from categories.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub bus_types: BTreeSet<String>,
    pub route_names: BTreeSet<String>,
    pub departure_time: Option<RangeFilter<NaiveTime>>,
    pub price: Option<RangeFilter<f64>>,
    pub star_rating: Option<RangeFilter<f64>>,
    pub seat_availability: Option<RangeFilter<i64>>,
}

impl FilterCriteria {
    /// Names of ranges whose minimum exceeds their maximum
    pub fn inverted_ranges(&self) -> Vec<&'static str> {
        let mut inverted = Vec::new();
        if self.departure_time.is_some_and(|r| r.is_inverted()) {
            inverted.push("departure_time");
        }
        if self.price.is_some_and(|r| r.is_inverted()) {
            inverted.push("price");
        }
        if self.star_rating.is_some_and(|r| r.is_inverted()) {
            inverted.push("star_rating");
        }
        if self.seat_availability.is_some_and(|r| r.is_inverted()) {
            inverted.push("seat_availability");
        }
        inverted
    }
}
