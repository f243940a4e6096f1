// include-walker - core/normalize.rs
//
// Header-name normalisation policy.
// Core layer: pure logic. The policy is chosen once at startup and injected
// into the forest, so both behaviours are testable on any host.

use serde::Serialize;

/// How header paths are canonicalised before equality and substring checks.
///
/// Normalisation never changes byte length: only ASCII letters are folded and
/// `/` is mapped to `\`, so byte offsets computed on a normalised name are
/// valid on the display name it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NameNormalizer {
    /// Case-sensitive filesystems: the name is compared as written.
    Identity,

    /// Case-insensitive filesystems (Windows): ASCII case and slash
    /// direction are folded.
    CaseInsensitive,
}

impl NameNormalizer {
    /// The policy matching the filesystem conventions of the host.
    pub fn for_host() -> Self {
        if cfg!(windows) {
            Self::CaseInsensitive
        } else {
            Self::Identity
        }
    }

    /// Policy from an explicit "paths are case-insensitive" setting.
    pub fn from_case_insensitive(case_insensitive: bool) -> Self {
        if case_insensitive {
            Self::CaseInsensitive
        } else {
            Self::Identity
        }
    }

    /// Normalise a single character.
    pub fn normalize_char(self, c: char) -> char {
        match self {
            Self::Identity => c,
            Self::CaseInsensitive => match c {
                '/' => '\\',
                c => c.to_ascii_lowercase(),
            },
        }
    }

    /// Normalise a whole name.
    pub fn normalize(self, name: &str) -> String {
        match self {
            Self::Identity => name.to_owned(),
            Self::CaseInsensitive => name.chars().map(|c| self.normalize_char(c)).collect(),
        }
    }
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self::for_host()
    }
}
