//! Aggregated, indexed view over all parsed taxonomy documents.
//!
//! All indices are built eagerly at construction and never change afterwards;
//! queries never trigger reparsing. `filtering_document_uris` returns a new
//! instance over the surviving documents.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use taxoquery_core::{EName, Scope, XmlDocument, XmlElem};
use tracing::debug;
use url::Url;

use crate::element::{
    GlobalAttributeDeclaration, GlobalElementDeclaration, NamedTypeDefinition, TaxonomyDocument,
    TaxonomyElem,
};
use crate::error::MissingElementError;

/// Child-to-parent substitution group edges.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubstitutionGroupMap {
    mappings: HashMap<EName, EName>,
}

impl SubstitutionGroupMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (EName, EName)>) -> Self {
        Self { mappings: pairs.into_iter().collect() }
    }

    pub fn insert(&mut self, child: EName, parent: EName) {
        self.mappings.insert(child, parent);
    }

    pub fn get(&self, child: &EName) -> Option<&EName> {
        self.mappings.get(child)
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EName, &EName)> {
        self.mappings.iter()
    }

    /// Union with `extras`; extras win on conflict.
    #[must_use]
    pub fn extended_with(&self, extras: &SubstitutionGroupMap) -> SubstitutionGroupMap {
        let mut mappings = self.mappings.clone();
        for (child, parent) in &extras.mappings {
            mappings.insert(child.clone(), parent.clone());
        }
        SubstitutionGroupMap { mappings }
    }

    /// Whether the chain starting at `start` reaches `root`.
    ///
    /// `start` itself counts. Cycles are treated as non-reaching rather than
    /// looping or erroring; real-world taxonomies are noisy.
    pub fn chain_reaches(&self, start: &EName, root: &EName) -> bool {
        let mut visited: HashSet<&EName> = HashSet::new();
        let mut current = Some(start);
        while let Some(name) = current {
            if name == root {
                return true;
            }
            if !visited.insert(name) {
                return false;
            }
            current = self.mappings.get(name);
        }
        false
    }
}

/// Indexed aggregation of an ordered list of taxonomy documents.
#[derive(Clone, Debug)]
pub struct TaxonomyBase {
    documents: Vec<TaxonomyDocument>,
    document_index_by_uri: HashMap<Url, usize>,
    global_element_declarations: Vec<GlobalElementDeclaration>,
    global_element_declarations_by_ename: HashMap<EName, GlobalElementDeclaration>,
    global_attribute_declarations_by_ename: HashMap<EName, GlobalAttributeDeclaration>,
    named_type_definitions_by_ename: HashMap<EName, NamedTypeDefinition>,
    extra_substitution_group_map: SubstitutionGroupMap,
    derived_substitution_group_map: SubstitutionGroupMap,
    net_substitution_group_map: SubstitutionGroupMap,
}

impl TaxonomyBase {
    pub fn from_documents(documents: Vec<TaxonomyDocument>) -> Self {
        Self::from_documents_with_extras(documents, SubstitutionGroupMap::new())
    }

    /// Build with caller-supplied extra substitution-group edges, which take
    /// precedence over document-derived ones. Extras keep concept
    /// classification faithful when the declaring documents are not part of
    /// this base.
    pub fn from_documents_with_extras(
        documents: Vec<TaxonomyDocument>,
        extras: SubstitutionGroupMap,
    ) -> Self {
        let mut document_index_by_uri = HashMap::new();
        let mut global_element_declarations = Vec::new();
        let mut elems_by_ename: HashMap<EName, GlobalElementDeclaration> = HashMap::new();
        let mut attrs_by_ename: HashMap<EName, GlobalAttributeDeclaration> = HashMap::new();
        let mut types_by_ename: HashMap<EName, NamedTypeDefinition> = HashMap::new();
        let mut derived = SubstitutionGroupMap::new();

        for (index, document) in documents.iter().enumerate() {
            document_index_by_uri.entry(document.uri().clone()).or_insert(index);
            let TaxonomyElem::XsdSchema(schema) = document.root() else { continue };
            for decl in schema.global_element_declarations() {
                let target = decl.target_ename().clone();
                if let Some(parent) = decl.substitution_group() {
                    // First occurrence wins here too, consistent with the
                    // element index.
                    if derived.get(&target).is_none() {
                        derived.insert(target.clone(), parent);
                    }
                }
                if elems_by_ename.contains_key(&target) {
                    debug!(ename = %target, uri = %document.uri(), "duplicate global element declaration ignored");
                } else {
                    elems_by_ename.insert(target, decl.clone());
                }
                global_element_declarations.push(decl);
            }
            for decl in schema.global_attribute_declarations() {
                attrs_by_ename.entry(decl.target_ename().clone()).or_insert(decl);
            }
            for ty in schema.named_type_definitions() {
                types_by_ename.entry(ty.target_ename().clone()).or_insert(ty);
            }
        }

        let net = derived.extended_with(&extras);
        Self {
            documents,
            document_index_by_uri,
            global_element_declarations,
            global_element_declarations_by_ename: elems_by_ename,
            global_attribute_declarations_by_ename: attrs_by_ename,
            named_type_definitions_by_ename: types_by_ename,
            extra_substitution_group_map: extras,
            derived_substitution_group_map: derived,
            net_substitution_group_map: net,
        }
    }

    pub fn documents(&self) -> &[TaxonomyDocument] {
        &self.documents
    }

    pub fn document_by_uri(&self, uri: &Url) -> Option<&TaxonomyDocument> {
        self.document_index_by_uri.get(uri).map(|i| &self.documents[*i])
    }

    /// Root taxonomy element of the document at `uri`.
    pub fn root_elem(&self, uri: &Url) -> Option<&TaxonomyElem> {
        self.document_by_uri(uri).map(TaxonomyDocument::root)
    }

    /// All global element declarations, in document discovery order then
    /// document order.
    pub fn global_element_declarations(&self) -> &[GlobalElementDeclaration] {
        &self.global_element_declarations
    }

    pub fn find_global_element_declaration(&self, ename: &EName) -> Option<&GlobalElementDeclaration> {
        self.global_element_declarations_by_ename.get(ename)
    }

    /// Asserted-present variant of [`Self::find_global_element_declaration`].
    pub fn get_global_element_declaration(
        &self,
        ename: &EName,
    ) -> Result<&GlobalElementDeclaration, MissingElementError> {
        self.find_global_element_declaration(ename)
            .ok_or_else(|| MissingElementError { what: format!("global element declaration {ename}") })
    }

    pub fn find_global_attribute_declaration(&self, ename: &EName) -> Option<&GlobalAttributeDeclaration> {
        self.global_attribute_declarations_by_ename.get(ename)
    }

    pub fn find_named_type_definition(&self, ename: &EName) -> Option<&NamedTypeDefinition> {
        self.named_type_definitions_by_ename.get(ename)
    }

    pub fn derived_substitution_group_map(&self) -> &SubstitutionGroupMap {
        &self.derived_substitution_group_map
    }

    pub fn extra_substitution_group_map(&self) -> &SubstitutionGroupMap {
        &self.extra_substitution_group_map
    }

    /// Derived edges plus extras, extras winning.
    pub fn net_substitution_group_map(&self) -> &SubstitutionGroupMap {
        &self.net_substitution_group_map
    }

    /// Resolve a URI with an optional fragment to an element.
    ///
    /// The shorthand form `#id` matches `@id`; the XPointer element scheme
    /// (`element(id)`, `element(/1/2)`, `element(id/2/3)`) is supported for
    /// cross-document references. Without a fragment the root element wins.
    pub fn elem_by_uri_with_fragment(&self, uri: &Url) -> Option<XmlElem> {
        let fragment = uri.fragment().map(str::to_string);
        let mut doc_uri = uri.clone();
        doc_uri.set_fragment(None);
        let document = self.document_by_uri(&doc_uri)?;
        match fragment.as_deref() {
            None | Some("") => Some(document.root().backing_elem().clone()),
            Some(fragment) => resolve_fragment(document.xml(), fragment),
        }
    }

    /// One step up the `@base` chain of a named type (simple content only).
    pub fn base_type_chain(&self, type_ename: &EName) -> Option<EName> {
        self.find_named_type_definition(type_ename)?.base_type()
    }

    /// First type in the base-type-or-self chain satisfying `p`, or `None`
    /// when the chain ends (or loops) without a match.
    pub fn find_base_type_or_self_until(
        &self,
        type_ename: &EName,
        p: impl Fn(&EName) -> bool,
    ) -> Option<EName> {
        let mut visited: HashSet<EName> = HashSet::new();
        let mut current = type_ename.clone();
        loop {
            if p(&current) {
                return Some(current);
            }
            if !visited.insert(current.clone()) {
                return None;
            }
            current = self.base_type_chain(&current)?;
        }
    }

    /// Union of the root-element scopes with the default namespace
    /// discarded. On conflicting prefixes the first document wins.
    pub fn guessed_scope(&self) -> Scope {
        let mut out = Scope::new();
        for document in &self.documents {
            let scope = document.root().backing_elem().scope().without_default_namespace();
            for (prefix, uri) in scope.bindings() {
                if out.namespace_for_prefix(prefix).is_none() {
                    out.bind(prefix, uri);
                }
            }
        }
        out
    }

    /// A new base containing only the documents in `keep`.
    ///
    /// Indices are rebuilt from scratch; pass the extra substitution-group
    /// edges needed to classify concepts whose substitution-group ancestors
    /// live in excluded documents.
    #[must_use]
    pub fn filtering_document_uris(
        &self,
        keep: &HashSet<Url>,
        extras: SubstitutionGroupMap,
    ) -> TaxonomyBase {
        let surviving = self
            .documents
            .iter()
            .filter(|d| keep.contains(d.uri()))
            .cloned()
            .collect();
        TaxonomyBase::from_documents_with_extras(surviving, extras)
    }
}

/// Resolve a fragment against one document: `@id` shorthand or the XPointer
/// element scheme.
fn resolve_fragment(doc: &Arc<XmlDocument>, fragment: &str) -> Option<XmlElem> {
    let Some(pointer) = fragment.strip_prefix("element(").and_then(|r| r.strip_suffix(')')) else {
        return doc.elem_by_id(fragment);
    };

    let mut parts = pointer.split('/');
    let first = parts.next()?;
    let mut current: Option<XmlElem> = if first.is_empty() {
        // element(/1/...): the leading number picks among document roots.
        None
    } else {
        Some(doc.elem_by_id(first)?)
    };
    for part in parts {
        let index: usize = part.parse().ok()?;
        if index == 0 {
            return None;
        }
        current = Some(match current {
            None if index == 1 => doc.root_elem(),
            None => return None,
            Some(elem) => elem.child_elems().into_iter().nth(index - 1)?,
        });
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxoquery_core::parse_document;

    fn base_with(text: &str) -> (TaxonomyBase, Url) {
        // A hierarchical URI, so fragment joins below stay valid.
        let uri = Url::parse("http://test/doc.xml").unwrap();
        let xml = parse_document(uri.clone(), text).unwrap();
        let document = TaxonomyDocument::from_xml(xml);
        (TaxonomyBase::from_documents(vec![document]), uri)
    }

    #[test]
    fn substitution_chain_cycles_are_non_reaching() {
        let a = EName::of("urn:x", "a");
        let b = EName::of("urn:x", "b");
        let root = EName::of("urn:x", "root");
        let map = SubstitutionGroupMap::from_pairs([
            (a.clone(), b.clone()),
            (b.clone(), a.clone()),
        ]);
        assert!(!map.chain_reaches(&a, &root));
        assert!(map.chain_reaches(&a, &b));
    }

    #[test]
    fn extras_win_over_derived_edges() {
        let child = EName::of("urn:x", "child");
        let derived = SubstitutionGroupMap::from_pairs([(child.clone(), EName::of("urn:x", "p1"))]);
        let extras = SubstitutionGroupMap::from_pairs([(child.clone(), EName::of("urn:x", "p2"))]);
        let net = derived.extended_with(&extras);
        assert_eq!(net.get(&child), Some(&EName::of("urn:x", "p2")));
    }

    #[test]
    fn xpointer_element_scheme_resolves_child_sequences() {
        let (base, uri) = base_with(r#"<r><a/><b id="x"><c/><d/></b></r>"#);

        let by_id = base.elem_by_uri_with_fragment(&uri.join("#element(x)").unwrap()).unwrap();
        assert_eq!(by_id.name().local(), "b");

        let by_path = base.elem_by_uri_with_fragment(&uri.join("#element(/1/2/2)").unwrap()).unwrap();
        assert_eq!(by_path.name().local(), "d");

        let mixed = base.elem_by_uri_with_fragment(&uri.join("#element(x/1)").unwrap()).unwrap();
        assert_eq!(mixed.name().local(), "c");

        assert!(base.elem_by_uri_with_fragment(&uri.join("#element(/1/9)").unwrap()).is_none());
    }

    #[test]
    fn shorthand_fragment_resolves_ids() {
        let (base, uri) = base_with(r#"<r><a id="target"/></r>"#);
        let found = base.elem_by_uri_with_fragment(&uri.join("#target").unwrap()).unwrap();
        assert_eq!(found.name().local(), "a");
        assert!(base.elem_by_uri_with_fragment(&uri.join("#nope").unwrap()).is_none());
    }
}
