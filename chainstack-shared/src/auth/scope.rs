/// Capability sets carried by access tokens
///
/// A scope is a set of capability names. Two capabilities exist:
///
/// - [`RESOURCES`]: manage one's own resources (granted to every user)
/// - [`USERS`]: administer users (granted to admins only)
///
/// Scopes are persisted space-separated and rendered comma-separated in token
/// responses. Membership is an exact set lookup, never a substring match.

use std::collections::BTreeSet;
use std::fmt;

/// Capability to manage one's own resources
pub const RESOURCES: &str = "resources";

/// Capability to administer users
pub const USERS: &str = "users";

/// Set of capability names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope(BTreeSet<String>);

impl Scope {
    /// Scope granted at issuance for a user with the given role
    pub fn for_role(is_admin: bool) -> Self {
        let mut caps = BTreeSet::new();
        caps.insert(RESOURCES.to_string());
        if is_admin {
            caps.insert(USERS.to_string());
        }
        Scope(caps)
    }

    /// Parses the stored space-separated form
    ///
    /// Empty segments are ignored, so an empty string yields an empty scope.
    pub fn parse(stored: &str) -> Self {
        Scope(stored.split_whitespace().map(str::to_string).collect())
    }

    /// Whether `capability` is a member of this scope
    pub fn contains(&self, capability: &str) -> bool {
        self.0.contains(capability)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Storage form: space-separated
    pub fn to_stored(&self) -> String {
        self.iter().collect::<Vec<_>>().join(" ")
    }

    /// Response form: comma-separated
    pub fn to_display_list(&self) -> String {
        self.iter().collect::<Vec<_>>().join(",")
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_list())
    }
}

impl<S: Into<String>> FromIterator<S> for Scope {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Scope(iter.into_iter().map(Into::into).collect())
    }
}
