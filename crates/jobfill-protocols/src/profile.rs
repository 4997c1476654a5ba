//! Applicant profile data model.
//!
//! A [`Profile`] is an immutable, ordered mapping from semantic field keys
//! (`firstName`, `email`, `yearsExperience`, ...) to scalar values. Array
//! values mark a key as repeatable: each element can fill one field.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Key of the composed full name.
const FULL_NAME_KEY: &str = "fullName";
const FIRST_NAME_KEY: &str = "firstName";
const LAST_NAME_KEY: &str = "lastName";

/// A single profile value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Interpret the value as a checkbox target.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            Scalar::Number(n) => Some(*n != 0.0),
            Scalar::Text(t) => match t.trim().to_lowercase().as_str() {
                "yes" | "y" | "true" | "1" | "on" => Some(true),
                "no" | "n" | "false" | "0" | "off" => Some(false),
                _ => None,
            },
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Scalar::Text(_))
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(t) => f.write_str(t),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(n as f64)
    }
}

/// Value stored under a profile key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileValue {
    One(Scalar),
    /// Repeatable value; elements are handed out in document order.
    Many(Vec<Scalar>),
}

impl ProfileValue {
    /// Build a repeatable value.
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Scalar>,
    {
        ProfileValue::Many(items.into_iter().map(Into::into).collect())
    }

    pub fn is_repeatable(&self) -> bool {
        matches!(self, ProfileValue::Many(_))
    }

    /// The n-th assignable scalar. Singular values only have index 0.
    pub fn get(&self, index: usize) -> Option<&Scalar> {
        match self {
            ProfileValue::One(s) if index == 0 => Some(s),
            ProfileValue::One(_) => None,
            ProfileValue::Many(items) => items.get(index),
        }
    }

    /// Number of fields this value can fill.
    pub fn capacity(&self) -> usize {
        match self {
            ProfileValue::One(_) => 1,
            ProfileValue::Many(items) => items.len(),
        }
    }
}

impl From<Scalar> for ProfileValue {
    fn from(value: Scalar) -> Self {
        ProfileValue::One(value)
    }
}

impl From<&str> for ProfileValue {
    fn from(value: &str) -> Self {
        ProfileValue::One(value.into())
    }
}

impl From<String> for ProfileValue {
    fn from(value: String) -> Self {
        ProfileValue::One(value.into())
    }
}

impl From<bool> for ProfileValue {
    fn from(value: bool) -> Self {
        ProfileValue::One(value.into())
    }
}

impl From<f64> for ProfileValue {
    fn from(value: f64) -> Self {
        ProfileValue::One(value.into())
    }
}

impl From<i64> for ProfileValue {
    fn from(value: i64) -> Self {
        ProfileValue::One(value.into())
    }
}

/// Immutable applicant profile snapshot.
///
/// Key declaration order is preserved; it breaks ties during fuzzy matching.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    entries: Vec<(String, ProfileValue)>,
    derived_full_name: bool,
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a profile from ordered entries. A repeated key keeps its first
    /// position and its last value.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ProfileValue>,
    {
        let mut profile = Self::new();
        for (key, value) in entries {
            profile.upsert(key.into(), value.into());
        }
        profile.derive_full_name();
        profile
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ProfileValue>) -> Self {
        self.upsert(key.into(), value.into());
        self.derive_full_name();
        self
    }

    fn upsert(&mut self, key: String, value: ProfileValue) {
        if self.derived_full_name && key == FULL_NAME_KEY {
            self.derived_full_name = false;
        }
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Compose `fullName` from first and last name when it is not provided.
    fn derive_full_name(&mut self) {
        if self.derived_full_name {
            self.entries.retain(|(k, _)| k != FULL_NAME_KEY);
            self.derived_full_name = false;
        }
        if self.get(FULL_NAME_KEY).is_some() {
            return;
        }
        let first = self.get(FIRST_NAME_KEY).and_then(|v| match v {
            ProfileValue::One(s) => Some(s.to_string()),
            ProfileValue::Many(_) => None,
        });
        let last = self.get(LAST_NAME_KEY).and_then(|v| match v {
            ProfileValue::One(s) => Some(s.to_string()),
            ProfileValue::Many(_) => None,
        });
        if let (Some(first), Some(last)) = (first, last) {
            self.entries.push((
                FULL_NAME_KEY.to_string(),
                ProfileValue::One(Scalar::Text(format!("{} {}", first, last))),
            ));
            self.derived_full_name = true;
        }
    }

    pub fn get(&self, key: &str) -> Option<&ProfileValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Declaration position of a key.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProfileValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Profile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let stored: Vec<_> = self
            .entries
            .iter()
            .filter(|(k, _)| !(self.derived_full_name && k == FULL_NAME_KEY))
            .collect();
        let mut map = serializer.serialize_map(Some(stored.len()))?;
        for (key, value) in stored {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Profile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ProfileVisitor;

        impl<'de> Visitor<'de> for ProfileVisitor {
            type Value = Profile;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of profile keys to scalar or array values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Profile, A::Error> {
                let mut entries: Vec<(String, ProfileValue)> = Vec::new();
                while let Some((key, value)) = access.next_entry::<String, ProfileValue>()? {
                    entries.push((key, value));
                }
                Ok(Profile::from_entries(entries))
            }
        }

        deserializer.deserialize_map(ProfileVisitor)
    }
}

/// Supplies the applicant profile, once per page instance.
pub trait ProfileProvider: Send + Sync {
    fn get_profile(&self) -> Profile;
}

/// Provider returning a fixed snapshot.
#[derive(Debug, Clone)]
pub struct StaticProfile {
    profile: Profile,
}

impl StaticProfile {
    pub fn new(profile: Profile) -> Self {
        Self { profile }
    }
}

impl ProfileProvider for StaticProfile {
    fn get_profile(&self) -> Profile {
        self.profile.clone()
    }
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
