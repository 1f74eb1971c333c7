//! Ordered OpenStreetMap tag lists.
//!
//! OSM elements carry free-form key/value pairs whose order is preserved on
//! output. Lookups return the first pair with a matching key.

/// Ordered sequence of key/value tag pairs.
///
/// # Examples
/// ```
/// use waymark_core::TagList;
///
/// let mut tags = TagList::from_iter([("highway", "turning_circle")]);
/// tags.push("fzk_turning", "service");
///
/// assert_eq!(tags.get("highway"), Some("turning_circle"));
/// assert_eq!(tags.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagList {
    pairs: Vec<(String, String)>,
}

impl TagList {
    /// Create an empty tag list.
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Return the value of the first tag with `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value.as_str())
    }

    /// Return true when a tag with `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Return true when `key` is present with exactly `value`.
    #[must_use]
    pub fn has(&self, key: &str, value: &str) -> bool {
        self.get(key) == Some(value)
    }

    /// Append a tag at the end of the list.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Iterate over the tags in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of tags in the list.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Return true when the list holds no tags.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for TagList
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
