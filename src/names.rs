//! State code <-> census name resolution.
//!
//! The CDC case feed keys rows by short codes (`CA`, `TX`) while the census
//! population feed uses full names (`California`, `Texas`); `StateNameTable`
//! bridges the two. Lookups are exact and case-sensitive in both directions.
//!
//! The shipped table covers the 50 states, the District of Columbia, and the
//! five territories present in the census tables. Codes the CDC feed uses
//! beyond that (`NYC`, `FSM`, `RMI`, `PW`) intentionally resolve to nothing
//! and are dropped from aggregation.

use std::collections::HashMap;

/// `(code, census name)` pairs for the shipped table.
const US_CENSUS_STATES: [(&str, &str); 56] = [
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("DC", "District of Columbia"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
    ("AS", "American Samoa"),
    ("GU", "Guam"),
    ("MP", "Northern Mariana Islands"),
    ("PR", "Puerto Rico"),
    ("VI", "United States Virgin Islands"),
];

/// Two-way code/name lookup table.
#[derive(Debug, Clone)]
pub struct StateNameTable {
    by_code: HashMap<String, String>,
    by_name: HashMap<String, String>,
}

impl StateNameTable {
    /// The shipped US census table.
    pub fn us_census() -> Self {
        Self::from_pairs(US_CENSUS_STATES.iter().copied())
    }

    /// Build a table from arbitrary `(code, full name)` pairs.
    pub fn from_pairs<C, N>(pairs: impl IntoIterator<Item = (C, N)>) -> Self
    where
        C: Into<String>,
        N: Into<String>,
    {
        let mut by_code = HashMap::new();
        let mut by_name = HashMap::new();
        for (code, name) in pairs {
            let code = code.into();
            let name = name.into();
            by_name.insert(name.clone(), code.clone());
            by_code.insert(code, name);
        }
        Self { by_code, by_name }
    }

    /// Full census name for a feed code; `None` for unknown codes.
    pub fn full_name(&self, code: &str) -> Option<&str> {
        self.by_code.get(code).map(String::as_str)
    }

    /// Feed code for a full census name; `None` for unknown names.
    pub fn abbreviation(&self, full_name: &str) -> Option<&str> {
        self.by_name.get(full_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn us_census_resolves_states_both_ways() {
        let table = StateNameTable::us_census();
        assert_eq!(table.full_name("CA"), Some("California"));
        assert_eq!(table.full_name("DC"), Some("District of Columbia"));
        assert_eq!(table.abbreviation("California"), Some("CA"));
        assert_eq!(table.abbreviation("Guam"), Some("GU"));
        assert_eq!(table.len(), 56);
    }

    #[test]
    fn unknown_codes_resolve_to_none() {
        let table = StateNameTable::us_census();
        assert_eq!(table.full_name("NYC"), None);
        assert_eq!(table.full_name("FSM"), None);
        assert_eq!(table.full_name("ca"), None, "lookups are case-sensitive");
        assert_eq!(table.abbreviation("New York City"), None);
    }

    #[test]
    fn from_pairs_builds_custom_tables() {
        let table = StateNameTable::from_pairs([("XX", "Exland"), ("YY", "Whyland")]);
        assert_eq!(table.full_name("XX"), Some("Exland"));
        assert_eq!(table.abbreviation("Whyland"), Some("YY"));
        assert_eq!(table.full_name("CA"), None);
    }
}
