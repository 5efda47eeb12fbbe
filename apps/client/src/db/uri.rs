//! Content URIs: `content://<authority>/<path>[/<row id>]`.

use std::fmt;

use super::contract::{Resource, CONTENT_SCHEME};
use super::error::DbError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentUri {
    authority: String,
    resource: Resource,
    id: Option<i64>,
}

impl ContentUri {
    /// URI addressing every row of a resource.
    pub fn collection(authority: impl Into<String>, resource: Resource) -> Self {
        Self {
            authority: authority.into(),
            resource,
            id: None,
        }
    }

    /// URI addressing one row by its local id.
    pub fn item(authority: impl Into<String>, resource: Resource, id: i64) -> Self {
        Self {
            authority: authority.into(),
            resource,
            id: Some(id),
        }
    }

    /// The item URI for `id` under this URI's collection.
    pub fn with_id(&self, id: i64) -> Self {
        Self::item(self.authority.clone(), self.resource, id)
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn is_item(&self) -> bool {
        self.id.is_some()
    }

    /// True if a change to `self` concerns an observer of `observed`.
    ///
    /// Observers of a collection see changes to every row in it; observers of
    /// a row see only that row and whole-collection changes.
    pub fn is_within(&self, observed: &ContentUri) -> bool {
        self.authority == observed.authority
            && self.resource == observed.resource
            && match (observed.id, self.id) {
                (None, _) => true,
                (Some(_), None) => true,
                (Some(a), Some(b)) => a == b,
            }
    }

    /// Parse a URI string. Unknown path segments are unsupported, not invalid.
    pub fn parse(s: &str) -> Result<Self, DbError> {
        let rest = s
            .strip_prefix(CONTENT_SCHEME)
            .ok_or_else(|| DbError::InvalidUri(s.to_string()))?;

        let mut segments = rest.split('/');
        let authority = match segments.next() {
            Some(a) if !a.is_empty() => a,
            _ => return Err(DbError::InvalidUri(s.to_string())),
        };
        let path = segments
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| DbError::InvalidUri(s.to_string()))?;
        let resource =
            Resource::from_path(path).ok_or_else(|| DbError::unsupported("match", s))?;

        let id = match segments.next() {
            None => None,
            Some(raw) => Some(
                raw.parse::<i64>()
                    .map_err(|_| DbError::InvalidUri(s.to_string()))?,
            ),
        };
        if segments.next().is_some() {
            return Err(DbError::unsupported("match", s));
        }

        Ok(Self {
            authority: authority.to_string(),
            resource,
            id,
        })
    }
}

impl fmt::Display for ContentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}/{}",
            CONTENT_SCHEME,
            self.authority,
            self.resource.path()
        )?;
        if let Some(id) = self.id {
            write!(f, "/{}", id)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for ContentUri {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
