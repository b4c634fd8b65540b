//! Locations and location resolution.
//!
//! The parser never interprets location names itself. Every location token
//! goes through a [`LocationResolver`], which turns it into a
//! [`LocationRef`]: the token it came from plus one or more concrete
//! [`LocationCode`]s. A plain airport code resolves to itself; a region
//! alias such as `"ChinaEast"` can resolve to several airports.
//!
//! # Example
//!
//! ```rust
//! use fuzzy_itinerary::{AliasTable, LocationResolver};
//!
//! let mut aliases = AliasTable::new();
//! aliases.insert("ChinaEast/华东", ["SHA//Hongqiao", "PVG//Pudong"]);
//!
//! let east = aliases.resolve("华东").unwrap();
//! assert_eq!(east.codes().len(), 2);
//!
//! // Plain codes fall through to the code resolver.
//! let ams = aliases.resolve("ams").unwrap();
//! assert_eq!(ams.codes()[0].as_str(), "AMS");
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ItineraryError, ItineraryResult};

/// Length in characters of a location token in raw itinerary arguments.
pub const LOCATION_TOKEN_LEN: usize = 3;

/// An opaque identifier understood by the query collaborator
/// (an airport code, or a city name the remote source accepts).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct LocationCode(String);

impl LocationCode {
    /// Wraps a code string.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resolved location: the name it was resolved from and its codes.
///
/// Always holds at least one code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LocationRef {
    name: String,
    codes: Vec<LocationCode>,
}

impl LocationRef {
    /// A location that is exactly one code, named after that code.
    pub fn single(code: LocationCode) -> Self {
        Self {
            name: code.as_str().to_string(),
            codes: vec![code],
        }
    }

    /// A named location covering several codes.
    ///
    /// Fails with [`ItineraryError::UnknownLocation`] if `codes` is empty.
    pub fn group(name: impl Into<String>, codes: Vec<LocationCode>) -> ItineraryResult<Self> {
        let name = name.into();
        if codes.is_empty() {
            return Err(ItineraryError::UnknownLocation(name));
        }
        Ok(Self { name, codes })
    }

    /// The token or alias this location was resolved from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The concrete codes, in table order. Never empty.
    pub fn codes(&self) -> &[LocationCode] {
        &self.codes
    }
}

impl fmt::Display for LocationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Resolves a location token into a [`LocationRef`].
///
/// Implementations must be pure lookups; the parser may call them any
/// number of times for the same token.
pub trait LocationResolver {
    /// Resolves `token`, failing with [`ItineraryError::UnknownLocation`]
    /// when it is not known.
    fn resolve(&self, token: &str) -> ItineraryResult<LocationRef>;
}

impl<R: LocationResolver + ?Sized> LocationResolver for &R {
    fn resolve(&self, token: &str) -> ItineraryResult<LocationRef> {
        (**self).resolve(token)
    }
}

/// Accepts 3-letter airport codes and resolves each to itself, upper-cased.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeResolver;

impl LocationResolver for CodeResolver {
    fn resolve(&self, token: &str) -> ItineraryResult<LocationRef> {
        let token = token.trim();
        if token.len() == LOCATION_TOKEN_LEN && token.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(LocationRef::single(LocationCode::new(
                token.to_ascii_uppercase(),
            )))
        } else {
            Err(ItineraryError::UnknownLocation(token.to_string()))
        }
    }
}

// =============================================================================
// Alias table
// =============================================================================

#[derive(Debug, Clone)]
struct AliasEntry {
    codes: Vec<LocationCode>,
    notes: Vec<String>,
}

/// A table of locations addressable under several alias names.
///
/// Keys are given as one slash-separated string (`"SFO/San Francisco"`);
/// the first alias is the canonical name. Lookups trim and lower-case the
/// key. Values may carry a `//` comment after each code, which is kept as a
/// note and never sent to the collaborator.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: BTreeMap<String, AliasEntry>,
    aliases: BTreeMap<String, String>,
}

impl AliasTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a location under every alias in the slash-separated `keys`.
    ///
    /// Re-inserting an existing canonical name replaces its codes. An entry
    /// whose every alias is claimed by the new one is dropped.
    pub fn insert<I, S>(&mut self, keys: &str, codes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys = split_keys(keys);
        let Some(canonical) = keys.first().cloned() else {
            return;
        };

        let (codes, notes): (Vec<LocationCode>, Vec<String>) = codes
            .into_iter()
            .map(|value| split_comment(value.as_ref()))
            .unzip();
        let Self { entries, aliases } = self;
        entries.insert(canonical.clone(), AliasEntry { codes, notes });
        for key in keys {
            aliases.insert(key, canonical.clone());
        }
        entries.retain(|name, _| aliases.values().any(|target| target == name));
    }

    /// Looks up a location by any of its aliases.
    ///
    /// Returns `None` when the alias is unknown or maps to no codes.
    pub fn get(&self, alias: &str) -> Option<LocationRef> {
        let canonical = self.aliases.get(&normalize_key(alias))?;
        let entry = self.entries.get(canonical)?;
        LocationRef::group(canonical.clone(), entry.codes.clone()).ok()
    }

    /// Returns the `//` notes recorded for an alias, one per code.
    pub fn notes(&self, alias: &str) -> Option<&[String]> {
        let canonical = self.aliases.get(&normalize_key(alias))?;
        self.entries.get(canonical).map(|e| e.notes.as_slice())
    }

    /// Returns true if `alias` names an entry.
    pub fn contains(&self, alias: &str) -> bool {
        self.aliases.contains_key(&normalize_key(alias))
    }

    /// Removes the entry named by `alias` together with all of its aliases.
    ///
    /// Fails with [`ItineraryError::UnknownLocation`] if the alias is unknown.
    pub fn remove(&mut self, alias: &str) -> ItineraryResult<()> {
        let key = normalize_key(alias);
        let canonical = self
            .aliases
            .get(&key)
            .cloned()
            .ok_or(ItineraryError::UnknownLocation(key))?;
        self.aliases.retain(|_, target| *target != canonical);
        self.entries.remove(&canonical);
        Ok(())
    }

    /// Number of distinct locations (not aliases).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table holds no locations.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates canonical names with their aliases, in canonical-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Vec<&str>)> + '_ {
        self.entries.keys().map(move |canonical| {
            let aliases = self
                .aliases
                .iter()
                .filter(|(_, target)| *target == canonical)
                .map(|(alias, _)| alias.as_str())
                .collect();
            (canonical.as_str(), aliases)
        })
    }

    /// Loads a table from a JSON object of `"alias/alias": ["CODE//note", ...]`.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;
        let mut table = Self::new();
        for (keys, codes) in raw {
            table.insert(&keys, codes);
        }
        Ok(table)
    }
}

impl LocationResolver for AliasTable {
    fn resolve(&self, token: &str) -> ItineraryResult<LocationRef> {
        if self.contains(token) {
            return self
                .get(token)
                .ok_or_else(|| ItineraryError::UnknownLocation(token.trim().to_string()));
        }
        CodeResolver.resolve(token)
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

fn split_keys(keys: &str) -> Vec<String> {
    keys.split('/')
        .map(normalize_key)
        .filter(|k| !k.is_empty())
        .collect()
}

fn split_comment(value: &str) -> (LocationCode, String) {
    match value.split_once("//") {
        Some((code, note)) => (LocationCode::new(code.trim()), note.trim().to_string()),
        None => (LocationCode::new(value.trim()), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> AliasTable {
        let mut table = AliasTable::new();
        table.insert(
            "ChinaEast/华东",
            [
                "SHA//虹桥机场",
                "PVG//浦东机场",
                "nanjing//南京禄口",
                "hangzhou//萧山机场",
            ],
        );
        table.insert("SFO/San Francisco/旧金山", ["SFO"]);
        table.insert("CN/China/中国", Vec::<String>::new());
        table
    }

    mod code_resolver {
        use super::*;

        #[test]
        fn test_resolves_and_uppercases() {
            let loc = CodeResolver.resolve("ams").unwrap();
            assert_eq!(loc.name(), "AMS");
            assert_eq!(loc.codes(), &[LocationCode::new("AMS")]);
        }

        #[test]
        fn test_rejects_non_codes() {
            for token in ["AM", "AMST", "A1S", ""] {
                assert_eq!(
                    CodeResolver.resolve(token),
                    Err(ItineraryError::UnknownLocation(token.to_string()))
                );
            }
        }
    }

    mod alias_table {
        use super::*;

        #[test]
        fn test_lookup_by_any_alias_case_insensitive() {
            let table = sample_table();
            let by_name = table.get("chinaeast").unwrap();
            let by_alias = table.get(" 华东 ").unwrap();
            assert_eq!(by_name, by_alias);
            assert_eq!(by_name.name(), "chinaeast");
        }

        #[test]
        fn test_comments_are_stripped() {
            let table = sample_table();
            let east = table.get("华东").unwrap();
            let codes: Vec<&str> = east.codes().iter().map(LocationCode::as_str).collect();
            assert_eq!(codes, vec!["SHA", "PVG", "nanjing", "hangzhou"]);
            assert_eq!(table.notes("ChinaEast").unwrap()[0], "虹桥机场");
        }

        #[test]
        fn test_contains_and_len() {
            let table = sample_table();
            assert!(table.contains("San Francisco"));
            assert!(table.contains("旧金山"));
            assert!(!table.contains("XYZ"));
            assert_eq!(table.len(), 3);
        }

        #[test]
        fn test_reinsert_claiming_canonical_drops_old_entry() {
            let mut table = AliasTable::new();
            table.insert("Paris", ["CDG"]);
            table.insert("IleDeFrance/Paris", ["CDG", "ORY"]);

            assert_eq!(table.len(), 1);
            let paris = table.get("paris").unwrap();
            assert_eq!(paris.name(), "iledefrance");
            assert_eq!(paris.codes().len(), 2);

            let names: Vec<&str> = table.iter().map(|(name, _)| name).collect();
            assert_eq!(names, vec!["iledefrance"]);
        }

        #[test]
        fn test_reinsert_keeps_entry_with_remaining_aliases() {
            let mut table = AliasTable::new();
            table.insert("SanFrancisco/SFO/旧金山", ["SFO"]);
            table.insert("BayArea/SFO", ["SFO", "OAK"]);

            assert_eq!(table.len(), 2);
            assert_eq!(table.get("旧金山").unwrap().name(), "sanfrancisco");
            assert_eq!(table.get("sfo").unwrap().name(), "bayarea");
        }

        #[test]
        fn test_remove_drops_every_alias() {
            let mut table = sample_table();
            table.remove("san francisco").unwrap();
            assert!(!table.contains("SFO"));
            assert!(!table.contains("旧金山"));
            assert_eq!(table.len(), 2);
            assert!(table.remove("SFO").is_err());
        }

        #[test]
        fn test_iter_lists_aliases() {
            let table = sample_table();
            let (canonical, aliases) = table.iter().find(|(c, _)| *c == "sfo").unwrap();
            assert_eq!(canonical, "sfo");
            assert_eq!(aliases.len(), 3);
        }

        #[test]
        fn test_entry_without_codes_is_unknown() {
            let table = sample_table();
            assert!(table.get("China").is_none());
            assert_eq!(
                table.resolve("China"),
                Err(ItineraryError::UnknownLocation("China".to_string()))
            );
        }

        #[test]
        fn test_resolver_falls_back_to_codes() {
            let table = sample_table();
            assert_eq!(table.resolve("AMS").unwrap().codes()[0].as_str(), "AMS");
            assert!(matches!(
                table.resolve("Atlantis"),
                Err(ItineraryError::UnknownLocation(_))
            ));
        }

        #[cfg(feature = "serde")]
        #[test]
        fn test_from_json() {
            let table =
                AliasTable::from_json(r#"{"LAX/Los Angeles": ["LAX//main"], "JFK/New York": ["JFK"]}"#)
                    .unwrap();
            assert_eq!(table.len(), 2);
            assert_eq!(table.get("los angeles").unwrap().codes()[0].as_str(), "LAX");
        }
    }
}
