//! String matchers used by device selectors.

/// A predicate over strings.
///
/// Case-insensitive variants lowercase both sides one character at a time, so
/// `EqualFold("ΟΔΟΣ")` matches `"οδοσ"`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StringMatcher {
    /// Matches every string.
    #[default]
    Always,
    Equal(String),
    EqualFold(String),
    Contains(String),
    ContainsFold(String),
    /// Matches when every matcher does. An empty list matches.
    All(Vec<StringMatcher>),
    /// Matches when at least one matcher does. An empty list does not match.
    Any(Vec<StringMatcher>),
}

impl StringMatcher {
    pub fn equal(value: impl Into<String>) -> Self {
        StringMatcher::Equal(value.into())
    }

    pub fn equal_fold(value: impl AsRef<str>) -> Self {
        StringMatcher::EqualFold(value.as_ref().to_string())
    }

    pub fn contains(value: impl Into<String>) -> Self {
        StringMatcher::Contains(value.into())
    }

    pub fn contains_fold(value: impl AsRef<str>) -> Self {
        StringMatcher::ContainsFold(value.as_ref().to_string())
    }

    pub fn all(matchers: impl IntoIterator<Item = StringMatcher>) -> Self {
        StringMatcher::All(matchers.into_iter().collect())
    }

    pub fn any(matchers: impl IntoIterator<Item = StringMatcher>) -> Self {
        StringMatcher::Any(matchers.into_iter().collect())
    }

    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            StringMatcher::Always => true,
            StringMatcher::Equal(value) => candidate == value,
            StringMatcher::EqualFold(value) => fold(candidate).eq(fold(value)),
            StringMatcher::Contains(value) => candidate.contains(value.as_str()),
            StringMatcher::ContainsFold(value) => {
                fold(candidate).collect::<String>().contains(&fold(value).collect::<String>())
            }
            StringMatcher::All(matchers) => matchers.iter().all(|m| m.matches(candidate)),
            StringMatcher::Any(matchers) => matchers.iter().any(|m| m.matches(candidate)),
        }
    }
}

/// Simple per-character lowercasing, without the final sigma rule of `str::to_lowercase`.
fn fold(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().flat_map(char::to_lowercase)
}
