//! The manual-page topic supplied by the user.

use crate::error::FetchmanError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-empty manual-page identifier, e.g. `ls` or `printf`.
///
/// The string is handed to the renderer verbatim. [`ManTopic::file_stem`]
/// derives the name used for cache files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ManTopic(String);

impl ManTopic {
    /// Validate and wrap a topic. Empty or all-whitespace input is rejected.
    pub fn new(topic: impl Into<String>) -> Result<Self, FetchmanError> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(FetchmanError::EmptyTopic);
        }
        Ok(Self(topic))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File stem for `<stem>.html` / `<stem>.md` in the cache directory.
    ///
    /// `%`, path separators and NUL are percent-escaped, as is a leading
    /// `.`. The file always lands directly inside the cache directory, is
    /// never hidden, and distinct topics never share a stem.
    pub fn file_stem(&self) -> String {
        let mut stem = String::with_capacity(self.0.len());
        for (i, c) in self.0.chars().enumerate() {
            match c {
                '%' => stem.push_str("%25"),
                '/' => stem.push_str("%2F"),
                '\\' => stem.push_str("%5C"),
                '\0' => stem.push_str("%00"),
                '.' if i == 0 => stem.push_str("%2E"),
                c => stem.push(c),
            }
        }
        stem
    }
}

impl TryFrom<String> for ManTopic {
    type Error = FetchmanError;

    fn try_from(topic: String) -> Result<Self, Self::Error> {
        Self::new(topic)
    }
}

impl From<ManTopic> for String {
    fn from(topic: ManTopic) -> Self {
        topic.0
    }
}

impl fmt::Display for ManTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_topic_rejected() {
        assert!(matches!(ManTopic::new(""), Err(FetchmanError::EmptyTopic)));
        assert!(matches!(ManTopic::new("  \t"), Err(FetchmanError::EmptyTopic)));
    }

    #[test]
    fn topic_kept_verbatim() {
        let t = ManTopic::new("git-commit").unwrap();
        assert_eq!(t.as_str(), "git-commit");
        assert_eq!(t.to_string(), "git-commit");
        assert_eq!(t.file_stem(), "git-commit");
    }

    #[test]
    fn file_stem_cannot_escape_directory() {
        let stem = |t: &str| ManTopic::new(t).unwrap().file_stem();
        assert_eq!(stem("../../etc/passwd"), "%2E.%2F..%2Fetc%2Fpasswd");
        assert_eq!(stem("/usr/share/man/man1/ls.1"), "%2Fusr%2Fshare%2Fman%2Fman1%2Fls.1");
        assert_eq!(stem(".."), "%2E.");
        assert_eq!(stem(".hidden"), "%2Ehidden");
        assert_eq!(stem("a\\b"), "a%5Cb");
        assert_eq!(stem("a\0b"), "a%00b");
        assert_eq!(stem("100%"), "100%25");
    }

    #[test]
    fn distinct_topics_get_distinct_stems() {
        let pairs = [
            ("grep", "egrep"),
            ("a/b", "a_b"),
            ("a/b", "a%2Fb"),
            (".x", "%2Ex"),
            ("a\\b", "a/b"),
            ("..", "_."),
        ];
        for (a, b) in pairs {
            let sa = ManTopic::new(a).unwrap().file_stem();
            let sb = ManTopic::new(b).unwrap().file_stem();
            assert_ne!(sa, sb, "{a:?} and {b:?} collide");
        }
    }

    #[test]
    fn deserialize_validates() {
        let t: ManTopic = serde_json::from_str("\"ls\"").unwrap();
        assert_eq!(t.as_str(), "ls");
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"ls\"");

        assert!(serde_json::from_str::<ManTopic>("\"\"").is_err());
        assert!(serde_json::from_str::<ManTopic>("\"   \"").is_err());
    }
}
