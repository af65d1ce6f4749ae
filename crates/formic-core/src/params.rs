use derive_more::Deref;
use std::collections::BTreeMap;

///
/// ParamMap
///
/// Raw request parameters handed over by the routing layer. Keys are
/// case-sensitive; a missing key means the parameter was absent from the
/// submission. Keys that match no allow-list entry are ignored.
///

#[derive(Clone, Debug, Default, Deref)]
pub struct ParamMap(BTreeMap<String, String>);

impl ParamMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style `set`, convenient in tests and call sites.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParamMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
