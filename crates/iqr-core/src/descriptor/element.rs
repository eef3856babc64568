use std::fmt;
use std::hash::{Hash, Hasher};

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Stable key of a descriptor.
///
/// Serialized as a string. Integer keys are accepted on input and kept in
/// their decimal form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DescriptorUid(String);

impl DescriptorUid {
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DescriptorUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DescriptorUid {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DescriptorUid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl<'de> Deserialize<'de> for DescriptorUid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct UidVisitor;

        impl Visitor<'_> for UidVisitor {
            type Value = DescriptorUid;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or integer descriptor uid")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(DescriptorUid::from(v))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(DescriptorUid(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(DescriptorUid(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(DescriptorUid(v.to_string()))
            }
        }

        deserializer.deserialize_any(UidVisitor)
    }
}

/// An identified numeric feature vector representing one item.
///
/// Equality and hashing go by `uid` only: two elements with the same key are
/// the same descriptor regardless of vector state.
#[derive(Debug, Clone)]
pub struct DescriptorElement {
    uid: DescriptorUid,
    vector: Option<Vec<f64>>,
}

impl DescriptorElement {
    /// A descriptor with no vector assigned yet.
    pub fn new(uid: impl Into<DescriptorUid>) -> Self {
        Self {
            uid: uid.into(),
            vector: None,
        }
    }

    pub fn with_vector(uid: impl Into<DescriptorUid>, vector: Vec<f64>) -> Self {
        Self {
            uid: uid.into(),
            vector: Some(vector),
        }
    }

    pub fn uid(&self) -> &DescriptorUid {
        &self.uid
    }

    pub fn vector(&self) -> Option<&[f64]> {
        self.vector.as_deref()
    }

    pub fn has_vector(&self) -> bool {
        self.vector.is_some()
    }

    pub fn set_vector(&mut self, vector: Vec<f64>) {
        self.vector = Some(vector);
    }
}

impl PartialEq for DescriptorElement {
    fn eq(&self, other: &Self) -> bool {
        self.uid == other.uid
    }
}

impl Eq for DescriptorElement {}

impl Hash for DescriptorElement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uid.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_vector() {
        let a = DescriptorElement::with_vector("a", vec![1.0, 2.0]);
        let b = DescriptorElement::new("a");
        assert_eq!(a, b);
        assert_ne!(a, DescriptorElement::new("b"));
    }

    #[test]
    fn set_vector_fills_empty_element() {
        let mut e = DescriptorElement::new("x");
        assert!(!e.has_vector());
        e.set_vector(vec![0.5]);
        assert_eq!(e.vector(), Some(&[0.5][..]));
    }

    #[test]
    fn uid_serializes_as_plain_string() {
        let json = serde_json::to_string(&DescriptorUid::from("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
    }

    #[test]
    fn integer_uids_deserialize_as_decimal_strings() {
        let uids: Vec<DescriptorUid> = serde_json::from_str(r#"[42, -7, "x"]"#).unwrap();
        assert_eq!(
            uids,
            vec![
                DescriptorUid::from("42"),
                DescriptorUid::from("-7"),
                DescriptorUid::from("x")
            ]
        );
    }

    #[test]
    fn non_scalar_uid_rejected() {
        assert!(serde_json::from_str::<DescriptorUid>("[1]").is_err());
        assert!(serde_json::from_str::<DescriptorUid>("1.5").is_err());
    }
}
