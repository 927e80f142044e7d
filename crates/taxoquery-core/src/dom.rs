//! Arena-backed XML document model.
//!
//! Each document owns a flat node arena addressed by [`NodeId`]; handles are
//! `(Arc<XmlDocument>, NodeId)` pairs, so upward navigation needs no parent
//! back-references at the value level and no ownership cycles can form.
//! [`NodeId`] order within one document is document order.
//!
//! Element identity across the engine is the [`XmlFragmentKey`]: the document
//! URI plus the path of `(element name, index among same-named siblings)`
//! steps from the root. The key is stable across rebuilds of the same
//! document text.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;
use url::Url;

use crate::name::{EName, QName, Scope};

/// Index of a node in its document's arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// One attribute of an element, with both its resolved and lexical name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmlAttribute {
    pub name: EName,
    pub qname: QName,
    pub value: String,
}

#[derive(Debug)]
pub(crate) struct ElementData {
    pub(crate) name: EName,
    pub(crate) qname: QName,
    pub(crate) attributes: Vec<XmlAttribute>,
    pub(crate) scope: Scope,
    pub(crate) base_uri: Url,
    pub(crate) children: Vec<NodeId>,
}

#[derive(Debug)]
pub(crate) enum XmlNodeKind {
    Element(ElementData),
    Text(String),
    Comment(String),
    ProcessingInstruction { target: String, data: String },
}

#[derive(Debug)]
pub(crate) struct XmlNode {
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: XmlNodeKind,
}

/// A parsed XML document with its URI and backing node arena.
#[derive(Debug)]
pub struct XmlDocument {
    pub(crate) uri: Url,
    pub(crate) nodes: Vec<XmlNode>,
    pub(crate) root: NodeId,
    pub(crate) ids: HashMap<String, NodeId>,
}

impl XmlDocument {
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// The root element handle.
    pub fn root_elem(self: &Arc<Self>) -> XmlElem {
        XmlElem { doc: Arc::clone(self), id: self.root }
    }

    /// Element bearing the given `@id` value, if any.
    pub fn elem_by_id(self: &Arc<Self>, id: &str) -> Option<XmlElem> {
        self.ids.get(id).map(|node| XmlElem { doc: Arc::clone(self), id: *node })
    }

    pub(crate) fn element_data(&self, id: NodeId) -> &ElementData {
        match &self.nodes[id.0 as usize].kind {
            XmlNodeKind::Element(data) => data,
            _ => unreachable!("element node ids always point at element payloads"),
        }
    }
}

/// Stable cross-rebuild identity of one element: document URI plus the path
/// of `(name, index among same-named element siblings)` steps from the root.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct XmlFragmentKey {
    pub doc_uri: Url,
    pub path: SmallVec<[(EName, u32); 6]>,
}

impl fmt::Debug for XmlFragmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#", self.doc_uri)?;
        for (name, idx) in &self.path {
            write!(f, "/{name}[{idx}]")?;
        }
        Ok(())
    }
}

/// Cheap-to-clone handle on one element of an [`XmlDocument`].
#[derive(Clone)]
pub struct XmlElem {
    pub(crate) doc: Arc<XmlDocument>,
    pub(crate) id: NodeId,
}

impl PartialEq for XmlElem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && (Arc::ptr_eq(&self.doc, &other.doc) || self.doc.uri == other.doc.uri)
    }
}

impl Eq for XmlElem {}

impl fmt::Debug for XmlElem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "XmlElem({} in {})", self.name(), self.doc.uri)
    }
}

impl XmlElem {
    fn data(&self) -> &ElementData {
        self.doc.element_data(self.id)
    }

    pub fn node_id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &Arc<XmlDocument> {
        &self.doc
    }

    pub fn doc_uri(&self) -> &Url {
        &self.doc.uri
    }

    /// Resolved element name.
    pub fn name(&self) -> &EName {
        &self.data().name
    }

    /// Lexical element name as written in the document.
    pub fn qname(&self) -> &QName {
        &self.data().qname
    }

    /// In-scope namespace bindings at this element.
    pub fn scope(&self) -> &Scope {
        &self.data().scope
    }

    /// Base URI after `xml:base` resolution against the document URI.
    pub fn base_uri(&self) -> &Url {
        &self.data().base_uri
    }

    pub fn attributes(&self) -> &[XmlAttribute] {
        &self.data().attributes
    }

    /// Attribute value by expanded name.
    pub fn attribute(&self, name: &EName) -> Option<&str> {
        self.data().attributes.iter().find(|a| &a.name == name).map(|a| a.value.as_str())
    }

    /// Attribute value by local name; matches no-namespace attributes only.
    pub fn attribute_local(&self, local: &str) -> Option<&str> {
        self.data()
            .attributes
            .iter()
            .find(|a| a.name.namespace().is_none() && a.name.local() == local)
            .map(|a| a.value.as_str())
    }

    pub fn parent(&self) -> Option<XmlElem> {
        let parent = self.doc.nodes[self.id.0 as usize].parent?;
        Some(XmlElem { doc: Arc::clone(&self.doc), id: parent })
    }

    /// Child elements in document order.
    pub fn child_elems(&self) -> Vec<XmlElem> {
        self.data()
            .children
            .iter()
            .filter(|id| matches!(self.doc.nodes[id.0 as usize].kind, XmlNodeKind::Element(_)))
            .map(|id| XmlElem { doc: Arc::clone(&self.doc), id: *id })
            .collect()
    }

    /// Child elements with the given resolved name.
    pub fn child_elems_named(&self, name: &EName) -> Vec<XmlElem> {
        self.child_elems().into_iter().filter(|e| e.name() == name).collect()
    }

    pub fn first_child_elem_named(&self, name: &EName) -> Option<XmlElem> {
        self.child_elems().into_iter().find(|e| e.name() == name)
    }

    /// All descendant elements, self excluded, in document order.
    pub fn descendant_elems(&self) -> Vec<XmlElem> {
        let mut out = Vec::new();
        collect_descendants(self, &mut out);
        out
    }

    /// Self plus all descendant elements in document order.
    pub fn descendant_or_self_elems(&self) -> Vec<XmlElem> {
        let mut out = vec![self.clone()];
        collect_descendants(self, &mut out);
        out
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.doc, self.id, &mut out);
        out
    }

    /// Nearest `xml:lang` on this element or an ancestor.
    pub fn language(&self) -> Option<String> {
        let xml_lang = EName::of(XML_NAMESPACE, "lang");
        let mut current = Some(self.clone());
        while let Some(e) = current {
            if let Some(lang) = e.attribute(&xml_lang) {
                return Some(lang.to_string());
            }
            current = e.parent();
        }
        None
    }

    /// The fragment key identifying this element across rebuilds.
    pub fn fragment_key(&self) -> XmlFragmentKey {
        let mut path: SmallVec<[(EName, u32); 6]> = SmallVec::new();
        let mut current = self.clone();
        loop {
            let index = match current.parent() {
                Some(parent) => parent
                    .child_elems_named(current.name())
                    .iter()
                    .position(|sib| sib.id == current.id)
                    .unwrap_or(0) as u32,
                None => 0,
            };
            path.push((current.name().clone(), index));
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        path.reverse();
        XmlFragmentKey { doc_uri: self.doc.uri.clone(), path }
    }
}

fn collect_descendants(elem: &XmlElem, out: &mut Vec<XmlElem>) {
    for child in elem.child_elems() {
        out.push(child.clone());
        collect_descendants(&child, out);
    }
}

fn collect_text(doc: &Arc<XmlDocument>, id: NodeId, out: &mut String) {
    if let XmlNodeKind::Element(data) = &doc.nodes[id.0 as usize].kind {
        for child in &data.children {
            match &doc.nodes[child.0 as usize].kind {
                XmlNodeKind::Text(t) => out.push_str(t),
                XmlNodeKind::Element(_) => collect_text(doc, *child, out),
                _ => {}
            }
        }
    }
}

/// Namespace URI reserved for `xml:` attributes.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
