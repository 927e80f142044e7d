//! Expanded names, lexical qualified names and namespace scopes.
//!
//! An [`EName`] is the universal identifier throughout the engine: elements,
//! attributes, types and concepts are all addressed by `(namespace, local)`
//! pairs with value equality. A [`QName`] is only a lexical form; it means
//! nothing until resolved against a [`Scope`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Expanded name: optional namespace URI plus local name.
///
/// The string wire form is `{namespace}local`, or the bare local name when no
/// namespace is present (James Clark notation).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EName {
    namespace: Option<String>,
    local: String,
}

impl EName {
    pub fn new(namespace: Option<String>, local: impl Into<String>) -> Self {
        Self { namespace, local: local.into() }
    }

    /// Name in a namespace.
    pub fn of(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self { namespace: Some(namespace.into()), local: local.into() }
    }

    /// Name without a namespace.
    pub fn no_ns(local: impl Into<String>) -> Self {
        Self { namespace: None, local: local.into() }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn local(&self) -> &str {
        &self.local
    }
}

impl fmt::Display for EName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local),
            None => f.write_str(&self.local),
        }
    }
}

impl fmt::Debug for EName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EName({self})")
    }
}

/// Error for unparseable [`EName`]/[`QName`] string forms.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid name syntax: {text:?}")]
pub struct InvalidNameError {
    pub text: String,
}

impl FromStr for EName {
    type Err = InvalidNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix('{') {
            let (ns, local) = rest.split_once('}').ok_or_else(|| InvalidNameError { text: s.to_string() })?;
            if local.is_empty() || local.contains(['{', '}']) {
                return Err(InvalidNameError { text: s.to_string() });
            }
            // `{}}local` means "empty namespace", which is the same as no namespace.
            let namespace = if ns.is_empty() { None } else { Some(ns.to_string()) };
            Ok(EName::new(namespace, local))
        } else if s.is_empty() || s.contains(['{', '}']) {
            Err(InvalidNameError { text: s.to_string() })
        } else {
            Ok(EName::no_ns(s))
        }
    }
}

/// Lexical qualified name: optional prefix plus local name.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct QName {
    prefix: Option<String>,
    local: String,
}

impl QName {
    pub fn new(prefix: Option<String>, local: impl Into<String>) -> Self {
        Self { prefix, local: local.into() }
    }

    pub fn prefixed(prefix: impl Into<String>, local: impl Into<String>) -> Self {
        Self { prefix: Some(prefix.into()), local: local.into() }
    }

    pub fn unprefixed(local: impl Into<String>) -> Self {
        Self { prefix: None, local: local.into() }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn local(&self) -> &str {
        &self.local
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(p) => write!(f, "{}:{}", p, self.local),
            None => f.write_str(&self.local),
        }
    }
}

impl fmt::Debug for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QName({self})")
    }
}

impl FromStr for QName {
    type Err = InvalidNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((prefix, local)) => {
                if prefix.is_empty() || local.is_empty() || local.contains(':') {
                    Err(InvalidNameError { text: s.to_string() })
                } else {
                    Ok(QName::prefixed(prefix, local))
                }
            }
            None if s.is_empty() => Err(InvalidNameError { text: s.to_string() }),
            None => Ok(QName::unprefixed(s)),
        }
    }
}

/// In-scope namespace bindings: prefix to namespace URI, plus an optional
/// default namespace.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scope {
    default_namespace: Option<String>,
    prefixes: BTreeMap<String, String>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_namespace(mut self, uri: impl Into<String>) -> Self {
        self.default_namespace = Some(uri.into());
        self
    }

    pub fn with_binding(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.prefixes.insert(prefix.into(), uri.into());
        self
    }

    pub fn default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Replace the default namespace; `None` undeclares it (`xmlns=""`).
    pub fn set_default_namespace(&mut self, uri: Option<String>) {
        self.default_namespace = uri;
    }

    pub fn bind(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.prefixes.insert(prefix.into(), uri.into());
    }

    pub fn namespace_for_prefix(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    pub fn bindings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.default_namespace.is_none() && self.prefixes.is_empty()
    }

    /// Right-biased composition: bindings of `other` win over `self`.
    #[must_use]
    pub fn append(&self, other: &Scope) -> Scope {
        let mut out = self.clone();
        if let Some(d) = &other.default_namespace {
            out.default_namespace = Some(d.clone());
        }
        for (p, u) in &other.prefixes {
            out.prefixes.insert(p.clone(), u.clone());
        }
        out
    }

    /// The same scope with the default namespace discarded.
    #[must_use]
    pub fn without_default_namespace(&self) -> Scope {
        Scope { default_namespace: None, prefixes: self.prefixes.clone() }
    }

    /// Resolve a lexical name to an expanded name.
    ///
    /// `use_default` says whether an unprefixed name picks up the default
    /// namespace (true for element names and QName-valued attribute content,
    /// false for attribute names). Returns `None` for an unbound prefix.
    pub fn resolve(&self, qname: &QName, use_default: bool) -> Option<EName> {
        match qname.prefix() {
            Some(p) => {
                let uri = self.namespace_for_prefix(p)?;
                Some(EName::of(uri, qname.local()))
            }
            None => {
                let ns = if use_default { self.default_namespace.clone() } else { None };
                Some(EName::new(ns, qname.local()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ename_wire_form_round_trips() {
        let e: EName = "{http://www.xbrl.org/2003/instance}item".parse().unwrap();
        assert_eq!(e.namespace(), Some("http://www.xbrl.org/2003/instance"));
        assert_eq!(e.local(), "item");
        assert_eq!(e.to_string().parse::<EName>().unwrap(), e);

        let bare: EName = "item".parse().unwrap();
        assert_eq!(bare, EName::no_ns("item"));
        assert_eq!(bare.to_string(), "item");
    }

    #[test]
    fn ename_empty_namespace_is_no_namespace() {
        let e: EName = "{}local".parse().unwrap();
        assert_eq!(e, EName::no_ns("local"));
    }

    #[test]
    fn ename_rejects_malformed_forms() {
        assert!("".parse::<EName>().is_err());
        assert!("{unclosed".parse::<EName>().is_err());
        assert!("{ns}".parse::<EName>().is_err());
    }

    #[test]
    fn qname_parse_and_display() {
        let q: QName = "xbrli:item".parse().unwrap();
        assert_eq!(q.prefix(), Some("xbrli"));
        assert_eq!(q.local(), "item");
        assert_eq!(q.to_string(), "xbrli:item");
        assert!(":item".parse::<QName>().is_err());
        assert!("a:b:c".parse::<QName>().is_err());
    }

    #[test]
    fn scope_append_is_right_biased() {
        let left = Scope::new().with_binding("p", "urn:left").with_default_namespace("urn:dl");
        let right = Scope::new().with_binding("p", "urn:right");
        let merged = left.append(&right);
        assert_eq!(merged.namespace_for_prefix("p"), Some("urn:right"));
        assert_eq!(merged.default_namespace(), Some("urn:dl"));
    }

    #[test]
    fn scope_resolution_honors_default_namespace_flag() {
        let scope = Scope::new().with_default_namespace("urn:d").with_binding("p", "urn:p");
        let unprefixed = QName::unprefixed("n");
        assert_eq!(scope.resolve(&unprefixed, true), Some(EName::of("urn:d", "n")));
        assert_eq!(scope.resolve(&unprefixed, false), Some(EName::no_ns("n")));
        let prefixed = QName::prefixed("p", "n");
        assert_eq!(scope.resolve(&prefixed, false), Some(EName::of("urn:p", "n")));
        assert_eq!(scope.resolve(&QName::prefixed("q", "n"), true), None);
    }
}
