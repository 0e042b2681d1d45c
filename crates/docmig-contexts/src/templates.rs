//! Default context documents, one per schema version

use docmig_chain::Version;

/// Schema family name of context files
pub const CONTEXT_FAMILY: &str = "context";

pub const V0_0_1: Version = Version::new(0, 0, 1);
pub const V0_0_2: Version = Version::new(0, 0, 2);
pub const V0_0_3: Version = Version::new(0, 0, 3);
pub const V0_0_4: Version = Version::new(0, 0, 4);

pub(crate) const CONTEXT_V0_0_1: &str = include_str!("../templates/context/v0.0.1.yaml");
pub(crate) const CONTEXT_V0_0_2: &str = include_str!("../templates/context/v0.0.2.yaml");
pub(crate) const CONTEXT_V0_0_3: &str = include_str!("../templates/context/v0.0.3.yaml");
pub(crate) const CONTEXT_V0_0_4: &str = include_str!("../templates/context/v0.0.4.yaml");

/// Default documents, oldest first
pub const TEMPLATES: [(Version, &str); 4] = [
    (V0_0_1, CONTEXT_V0_0_1),
    (V0_0_2, CONTEXT_V0_0_2),
    (V0_0_3, CONTEXT_V0_0_3),
    (V0_0_4, CONTEXT_V0_0_4),
];

/// Default document for `version`
#[must_use]
pub fn template(version: Version) -> Option<&'static str> {
    TEMPLATES
        .iter()
        .find(|(v, _)| *v == version)
        .map(|(_, text)| *text)
}

/// Newest schema version
#[must_use]
pub fn latest_version() -> Version {
    V0_0_4
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmig_tree::Document;
    use pretty_assertions::assert_eq;

    #[test]
    fn templates_parse_round_trip_and_declare_their_version() {
        for (version, text) in TEMPLATES {
            let doc = Document::parse(text).unwrap();
            assert_eq!(doc.version(), Some(version.to_string().as_str()));
            assert_eq!(doc.to_yaml(), text, "template {version} is not in canonical form");
        }
    }

    #[test]
    fn templates_are_ascending_and_end_at_latest() {
        assert!(TEMPLATES.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(TEMPLATES.last().map(|(v, _)| *v), Some(latest_version()));
        assert!(template(Version::new(9, 9, 9)).is_none());
    }
}
