//! The set of authorizations a caller holds.

use std::{collections::HashSet, fmt};

use crate::{
    error::{Error, Result},
    escape::EMPTY_AUTHORIZATION,
};

/// An immutable, deduplicated set of logical authorization values.
///
/// # Examples
/// ```
/// use accessexpr::Authorizations;
///
/// let auths = Authorizations::of(["B", "A", "B"])?;
/// assert_eq!(auths.len(), 2);
/// assert!(auths.contains("A"));
/// assert_eq!(auths.to_string(), "A,B");
/// # Ok::<(), accessexpr::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Authorizations {
    set: HashSet<String>,
}

impl Authorizations {
    /// Collect `authorizations`, rejecting the empty string.
    pub fn of<I, S>(authorizations: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set = authorizations
            .into_iter()
            .map(|auth| {
                let auth = auth.into();
                if auth.is_empty() {
                    Err(Error::invalid_argument(EMPTY_AUTHORIZATION))
                } else {
                    Ok(auth)
                }
            })
            .collect::<Result<HashSet<_>>>()?;
        Ok(Self { set })
    }

    /// The set holding nothing. Only the empty expression is accessible.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap values already known to be non-empty.
    pub(crate) fn from_set(set: HashSet<String>) -> Self {
        Self { set }
    }

    pub fn contains(&self, authorization: &str) -> bool {
        self.set.contains(authorization)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Members in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.set.iter().map(String::as_str)
    }

    pub fn as_set(&self) -> &HashSet<String> {
        &self.set
    }
}

impl<'a> IntoIterator for &'a Authorizations {
    type Item = &'a String;
    type IntoIter = std::collections::hash_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.set.iter()
    }
}

impl fmt::Display for Authorizations {
    /// Members sorted and joined by `,`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sorted: Vec<&str> = self.iter().collect();
        sorted.sort_unstable();
        f.write_str(&sorted.join(","))
    }
}
