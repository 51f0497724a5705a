//! HTTP methods as seen by the dispatcher.

use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// A request method, case-normalized on parse.
///
/// Only the five methods the dispatcher can map onto a capability get their
/// own variant; anything else is kept verbatim (upper-cased) in
/// [`Method::Other`] so it can be reported in a 405 response.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Method {
    Delete,
    Get,
    Head,
    Post,
    Put,
    Other(String),
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Method::Delete => "DELETE",
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Other(m) => m,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsing never fails: unknown methods become [`Method::Other`].
impl FromStr for Method {
    type Err = Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Ok(match upper.as_str() {
            "DELETE" => Method::Delete,
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            _ => Method::Other(upper),
        })
    }
}

impl From<&str> for Method {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(m) => m,
            Err(never) => match never {},
        }
    }
}

/// An ordered set of methods; iterates and displays alphabetically, which
/// keeps `Allow` headers stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodSet(BTreeSet<Method>);

impl MethodSet {
    /// The methods every resource supports: `GET` and `HEAD`.
    pub fn readable() -> Self {
        let mut set = Self::default();
        set.insert(Method::Get);
        set.insert(Method::Head);
        set
    }

    pub fn insert(&mut self, method: Method) {
        self.0.insert(method);
    }

    pub fn contains(&self, method: &Method) -> bool {
        self.0.contains(method)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Method> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Method names in order, e.g. for a discovery document.
    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|m| m.to_string()).collect()
    }
}

/// Comma-separated, suitable for an `Allow` header.
impl fmt::Display for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for m in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            f.write_str(m.as_str())?;
        }
        Ok(())
    }
}

impl FromIterator<Method> for MethodSet {
    fn from_iter<I: IntoIterator<Item = Method>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Method::from("get"), Method::Get);
        assert_eq!(Method::from("Delete"), Method::Delete);
        assert_eq!(Method::from("patch"), Method::Other("PATCH".into()));
    }

    #[test]
    fn allow_header_is_sorted() {
        let mut set = MethodSet::readable();
        set.insert(Method::Put);
        set.insert(Method::Delete);
        assert_eq!(set.to_string(), "DELETE, GET, HEAD, PUT");
        assert_eq!(set.names(), vec!["DELETE", "GET", "HEAD", "PUT"]);
    }
}
