//! Schema versions: `major.minor.patch`, ordered per component

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::VersionError;

/// Three-component schema version
///
/// Ordering compares components numerically, so `0.0.10` sorts after
/// `0.0.9`. Parsing accepts an optional leading `v` and surrounding
/// whitespace; [`Display`] writes the normalized form.
///
/// # Examples
/// ```
/// use docmig_chain::Version;
///
/// let a: Version = "0.0.9".parse().unwrap();
/// let b: Version = "v0.0.10".parse().unwrap();
/// assert!(a < b);
/// assert_eq!(b.to_string(), "0.0.10");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    #[inline]
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let body = trimmed.strip_prefix('v').unwrap_or(trimmed);
        if body.is_empty() {
            return Err(VersionError::Empty);
        }

        let parts: Vec<&str> = body.split('.').collect();
        let &[major, minor, patch] = parts.as_slice() else {
            return Err(VersionError::Arity(s.to_string()));
        };

        let component = |part: &str| {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(VersionError::Component {
                    input: s.to_string(),
                    component: part.to_string(),
                });
            }
            part.parse::<u64>().map_err(|_| VersionError::Component {
                input: s.to_string(),
                component: part.to_string(),
            })
        };

        Ok(Self::new(
            component(major)?,
            component(minor)?,
            component(patch)?,
        ))
    }
}

impl serde::Serialize for Version {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Version {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn parse_and_display() {
        assert_eq!(v("1.2.3"), Version::new(1, 2, 3));
        assert_eq!(v(" v0.0.7 ").to_string(), "0.0.7");
        assert_eq!(v("0.0.01"), v("0.0.1"));
    }

    #[test]
    fn parse_rejects_malformed() {
        assert_eq!("".parse::<Version>(), Err(VersionError::Empty));
        assert_eq!("v".parse::<Version>(), Err(VersionError::Empty));
        assert!(matches!("1.2".parse::<Version>(), Err(VersionError::Arity(_))));
        assert!(matches!("1.2.3.4".parse::<Version>(), Err(VersionError::Arity(_))));
        assert!(matches!(
            "1.-2.3".parse::<Version>(),
            Err(VersionError::Component { ref component, .. }) if component == "-2"
        ));
        assert!(matches!("1..3".parse::<Version>(), Err(VersionError::Component { .. })));
        assert!(matches!("1.2.x".parse::<Version>(), Err(VersionError::Component { .. })));
        assert!(matches!(
            "1.2.99999999999999999999".parse::<Version>(),
            Err(VersionError::Component { .. })
        ));
    }

    #[test]
    fn ordering_is_numeric_per_component() {
        assert!(v("0.0.10") > v("0.0.9"));
        assert!(v("0.10.0") > v("0.9.99"));
        assert!(v("1.0.0") > v("0.99.99"));
    }

    #[test]
    fn serde_uses_the_string_form() {
        let json = serde_json::to_string(&v("0.0.4")).unwrap();
        assert_eq!(json, "\"0.0.4\"");
        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v("0.0.4"));
        assert!(serde_json::from_str::<Version>("\"0.4\"").is_err());
    }
}
