/// Order-preserving header mapping with case-insensitive name matching.
///
/// Values for a repeated field name are concatenated in arrival order into one
/// string under the first-seen key. This mirrors how the streaming parser
/// reassembles a logical header from value fragments, and it is part of the
/// engine's contract: `X: a` followed by `X: b` observes `headers["X"] == "ab"`,
/// not a list and not a comma join.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value under `name`. If the name is already present (ignoring
    /// ASCII case) the value is concatenated onto the existing one.
    pub fn append(&mut self, name: &str, value: &str) {
        match self.entry_mut(name) {
            Some(existing) => existing.push_str(value),
            None => self.entries.push((name.to_string(), value.to_string())),
        }
    }

    /// Sets `name` to `value`, replacing any existing value.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        match self.entry_mut(name) {
            Some(existing) => *existing = value.into(),
            None => self.entries.push((name.to_string(), value.into())),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry_mut(&mut self, name: &str) -> Option<&mut String> {
        self.entries.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)).map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_ascii_case() {
        let mut headers = Headers::new();
        headers.append("Content-Type", "text/plain");
        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/plain"));
        assert!(headers.contains("content-TYPE"));
    }

    #[test]
    fn repeated_names_concatenate_in_arrival_order() {
        let mut headers = Headers::new();
        headers.append("X", "a");
        headers.append("x", "b");
        assert_eq!(headers.get("X"), Some("ab"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn set_replaces_instead_of_appending() {
        let mut headers = Headers::new();
        headers.append("Content-Length", "11");
        headers.set("content-length", "5");
        assert_eq!(headers.get("Content-Length"), Some("5"));
        assert_eq!(headers.len(), 1);
    }
}
