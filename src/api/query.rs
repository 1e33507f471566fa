//! List query building
//!
//! Turns a [`FilterSet`] into an ordered, multi-valued [`Query`]. Repeated
//! values of one key are OR'ed by the registry, different keys are AND'ed.

use url::form_urlencoded;

use crate::identity::ID;

pub const ORG_ID_KEY: &str = "org_id";
pub const PROJECT_ID_KEY: &str = "project_id";
pub const NAME_KEY: &str = "name";

/// Ordered multi-value query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one value under `key`, after everything already present
    pub fn append(&mut self, key: &str, value: impl Into<String>) {
        self.pairs.push((key.to_string(), value.into()));
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// All values for `key`, in insertion order
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Form-encoded string, stable for a given insertion order
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.pairs {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}

/// Optional filters for list operations
///
/// `None` and an empty list both leave a dimension unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub org_ids: Option<Vec<ID>>,
    pub project_ids: Option<Vec<ID>>,
    pub names: Option<Vec<String>>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn org_ids(mut self, ids: impl IntoIterator<Item = ID>) -> Self {
        self.org_ids = Some(ids.into_iter().collect());
        self
    }

    pub fn project_ids(mut self, ids: impl IntoIterator<Item = ID>) -> Self {
        self.project_ids = Some(ids.into_iter().collect());
        self
    }

    pub fn names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn to_query(&self) -> Query {
        build(
            self.org_ids.as_deref(),
            self.project_ids.as_deref(),
            self.names.as_deref(),
        )
    }
}

/// Build a list query: one entry per value, keys in `org_id`,
/// `project_id`, `name` order. Never fails.
pub fn build(
    org_ids: Option<&[ID]>,
    project_ids: Option<&[ID]>,
    names: Option<&[String]>,
) -> Query {
    let mut query = Query::new();

    for id in org_ids.unwrap_or_default() {
        query.append(ORG_ID_KEY, id.to_string());
    }
    for id in project_ids.unwrap_or_default() {
        query.append(PROJECT_ID_KEY, id.to_string());
    }
    for name in names.unwrap_or_default() {
        query.append(NAME_KEY, name.as_str());
    }

    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::new_mutable;
    use crate::primitive::Org;

    fn org_id(name: &str) -> ID {
        new_mutable(&Org { name: name.into() }).unwrap()
    }

    #[test]
    fn test_empty_filters_build_empty_query() {
        assert!(FilterSet::new().to_query().is_empty());
        assert_eq!(FilterSet::new().to_query().encode(), "");
    }

    #[test]
    fn test_empty_dimension_is_omitted() {
        let query = FilterSet::new()
            .org_ids(Vec::new())
            .names(["web"])
            .to_query();
        assert!(!query.contains_key(ORG_ID_KEY));
        assert!(!query.contains_key(PROJECT_ID_KEY));
        assert_eq!(query.encode(), "name=web");
    }

    #[test]
    fn test_order_and_multiplicity_preserved() {
        let a = org_id("a");
        let b = org_id("b");
        let query = FilterSet::new()
            .names(["web", "api", "web"])
            .org_ids([b, a])
            .to_query();

        assert_eq!(
            query.encode(),
            format!("org_id={}&org_id={}&name=web&name=api&name=web", b, a)
        );
        assert_eq!(query.get_all(NAME_KEY).collect::<Vec<_>>(), ["web", "api", "web"]);
    }

    #[test]
    fn test_values_are_form_encoded() {
        let query = FilterSet::new().names(["my service&co"]).to_query();
        assert_eq!(query.encode(), "name=my+service%26co");
    }
}
