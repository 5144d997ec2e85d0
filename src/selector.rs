//! Device selectors, predicates deciding whether a device belongs to a query result.

use crate::strmatch::StringMatcher;
use crate::{Device, DeviceResult};

/// A predicate over a [`Device`].
///
/// Field selectors read one property and hand it to a [`StringMatcher`]. When the
/// device has no value for the property, the matcher is applied to an empty string.
/// Any other failure to read the property is returned from [`Selector::select`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Matches the setup class name.
    Class(StringMatcher),
    /// Matches when any of the hardware IDs matches.
    Id(StringMatcher),
    Description(StringMatcher),
    FriendlyName(StringMatcher),
    /// Matches when every selector does. An empty list matches.
    All(Vec<Selector>),
    /// Matches when at least one selector does. An empty list does not match.
    Any(Vec<Selector>),
}

/// Treat a missing property as an empty one.
fn or_empty<T: Default>(result: DeviceResult<T>) -> DeviceResult<T> {
    match result {
        Err(e) if e.is_absent() => Ok(T::default()),
        other => other,
    }
}

impl Selector {
    pub fn class(matcher: StringMatcher) -> Self {
        Selector::Class(matcher)
    }

    pub fn id(matcher: StringMatcher) -> Self {
        Selector::Id(matcher)
    }

    pub fn description(matcher: StringMatcher) -> Self {
        Selector::Description(matcher)
    }

    pub fn friendly_name(matcher: StringMatcher) -> Self {
        Selector::FriendlyName(matcher)
    }

    pub fn all(selectors: impl IntoIterator<Item = Selector>) -> Self {
        Selector::All(selectors.into_iter().collect())
    }

    pub fn any(selectors: impl IntoIterator<Item = Selector>) -> Self {
        Selector::Any(selectors.into_iter().collect())
    }

    pub fn select(&self, device: Device<'_>) -> DeviceResult<bool> {
        match self {
            Selector::Class(matcher) => Ok(matcher.matches(&or_empty(device.class())?)),
            Selector::Description(matcher) => {
                Ok(matcher.matches(&or_empty(device.description())?))
            }
            Selector::FriendlyName(matcher) => {
                Ok(matcher.matches(&or_empty(device.friendly_name())?))
            }
            Selector::Id(matcher) => {
                let ids = or_empty(device.hardware_id())?;
                if ids.is_empty() {
                    return Ok(matcher.matches(""));
                }
                Ok(ids.iter().any(|id| matcher.matches(id)))
            }
            Selector::All(selectors) => {
                for selector in selectors {
                    if !selector.select(device)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Selector::Any(selectors) => {
                for selector in selectors {
                    if selector.select(device)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}
