//! Namespace-aware XML parsing into the arena document model.
//!
//! Built on the `quick-xml` event reader. The parser keeps the full prefix
//! scope at every element, resolves `xml:base` inheritance against the
//! document URI, records `@id` attributes for fragment lookup and preserves
//! document order. It does not validate against any schema.

use std::collections::HashMap;
use std::sync::Arc;

use quick_xml::Reader;
use quick_xml::events::Event;
use url::Url;

use crate::dom::{ElementData, NodeId, XML_NAMESPACE, XmlAttribute, XmlDocument, XmlNode, XmlNodeKind};
use crate::name::{EName, QName, Scope};

/// XML parse failure with the byte position in the input.
#[derive(Debug, Clone, thiserror::Error)]
#[error("xml parse error in {uri} at byte {position}: {message}")]
pub struct DocumentParseError {
    pub uri: Url,
    pub position: u64,
    pub message: String,
    #[source]
    pub source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl DocumentParseError {
    fn new(uri: &Url, position: u64, message: impl Into<String>) -> Self {
        Self { uri: uri.clone(), position, message: message.into(), source: None }
    }

    fn with_source(
        uri: &Url,
        position: u64,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            uri: uri.clone(),
            position,
            message: message.into(),
            source: Some(Arc::new(source)),
        }
    }
}

/// Parse one XML document into an arena tree rooted at its document element.
pub fn parse_document(uri: Url, text: &str) -> Result<Arc<XmlDocument>, DocumentParseError> {
    let mut reader = Reader::from_str(text);
    let mut nodes: Vec<XmlNode> = Vec::new();
    let mut ids: HashMap<String, NodeId> = HashMap::new();
    // (node id, scope, base uri) per open element
    let mut stack: Vec<(NodeId, Scope, Url)> = Vec::new();
    let mut root: Option<NodeId> = None;

    loop {
        let position = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let id = open_element(&uri, &mut nodes, &mut ids, &mut stack, root.is_some(), position, &start)?;
                if root.is_none() {
                    root = Some(id);
                }
            }
            Ok(Event::Empty(start)) => {
                let id = open_element(&uri, &mut nodes, &mut ids, &mut stack, root.is_some(), position, &start)?;
                if root.is_none() {
                    root = Some(id);
                }
                stack.pop();
            }
            Ok(Event::End(_)) => {
                if stack.pop().is_none() {
                    return Err(DocumentParseError::new(&uri, position, "unbalanced end tag"));
                }
            }
            Ok(Event::Text(t)) => {
                let value = t
                    .decode()
                    .map_err(|e| DocumentParseError::with_source(&uri, position, "invalid character data", e))?;
                append_child(&mut nodes, &stack, XmlNodeKind::Text(value.into_owned()));
            }
            Ok(Event::CData(c)) => {
                let value = String::from_utf8_lossy(c.as_ref()).into_owned();
                append_child(&mut nodes, &stack, XmlNodeKind::Text(value));
            }
            Ok(Event::Comment(c)) => {
                let value = String::from_utf8_lossy(c.as_ref()).into_owned();
                append_child(&mut nodes, &stack, XmlNodeKind::Comment(value));
            }
            Ok(Event::PI(pi)) => {
                let target = String::from_utf8_lossy(pi.target()).into_owned();
                let data = String::from_utf8_lossy(pi.content()).into_owned();
                append_child(&mut nodes, &stack, XmlNodeKind::ProcessingInstruction { target, data });
            }
            Ok(Event::Decl(_) | Event::DocType(_)) => {}
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(DocumentParseError::with_source(&uri, position, "malformed xml", e));
            }
        }
    }

    let root = root.ok_or_else(|| DocumentParseError::new(&uri, 0, "no root element"))?;
    if !stack.is_empty() {
        return Err(DocumentParseError::new(&uri, reader.buffer_position(), "unclosed element at end of input"));
    }
    Ok(Arc::new(XmlDocument { uri, nodes, root, ids }))
}

fn append_child(nodes: &mut Vec<XmlNode>, stack: &[(NodeId, Scope, Url)], kind: XmlNodeKind) {
    // Character data outside the root element is insignificant.
    let Some((parent, _, _)) = stack.last() else { return };
    let id = NodeId(nodes.len() as u32);
    nodes.push(XmlNode { parent: Some(*parent), kind });
    match &mut nodes[parent.0 as usize].kind {
        XmlNodeKind::Element(data) => data.children.push(id),
        _ => unreachable!("open elements are element nodes"),
    }
}

fn open_element(
    uri: &Url,
    nodes: &mut Vec<XmlNode>,
    ids: &mut HashMap<String, NodeId>,
    stack: &mut Vec<(NodeId, Scope, Url)>,
    root_seen: bool,
    position: u64,
    start: &quick_xml::events::BytesStart<'_>,
) -> Result<NodeId, DocumentParseError> {
    if stack.is_empty() && root_seen {
        return Err(DocumentParseError::new(uri, position, "multiple root elements"));
    }

    let (parent, parent_scope, parent_base) = match stack.last() {
        Some((id, scope, base)) => (Some(*id), scope.clone(), base.clone()),
        None => (None, Scope::new(), uri.clone()),
    };

    // First pass: namespace declarations on this element.
    let mut scope = parent_scope;
    let mut raw_attrs: Vec<(String, String)> = Vec::new();
    for attr in start.attributes() {
        let attr = attr
            .map_err(|e| DocumentParseError::with_source(uri, position, "malformed attribute", e))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| DocumentParseError::with_source(uri, position, "invalid attribute value", e))?
            .into_owned();
        if key == "xmlns" {
            scope.set_default_namespace(if value.is_empty() { None } else { Some(value) });
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            scope.bind(prefix, value);
        } else {
            raw_attrs.push((key, value));
        }
    }

    let qname: QName = String::from_utf8_lossy(start.name().as_ref())
        .parse()
        .map_err(|e| DocumentParseError::with_source(uri, position, "invalid element name", e))?;
    let name = scope
        .resolve(&qname, true)
        .ok_or_else(|| DocumentParseError::new(uri, position, format!("unbound prefix in element name {qname}")))?;

    // Second pass: resolve attribute names (default namespace does not apply).
    let mut attributes = Vec::with_capacity(raw_attrs.len());
    for (key, value) in raw_attrs {
        let aq: QName = key
            .parse()
            .map_err(|e| DocumentParseError::with_source(uri, position, "invalid attribute name", e))?;
        let aname = match aq.prefix() {
            Some("xml") => EName::of(XML_NAMESPACE, aq.local()),
            _ => scope.resolve(&aq, false).ok_or_else(|| {
                DocumentParseError::new(uri, position, format!("unbound prefix in attribute name {aq}"))
            })?,
        };
        attributes.push(XmlAttribute { name: aname, qname: aq, value });
    }

    let base_uri = match attributes
        .iter()
        .find(|a| a.name.namespace() == Some(XML_NAMESPACE) && a.name.local() == "base")
    {
        Some(base) => parent_base
            .join(&base.value)
            .map_err(|e| DocumentParseError::with_source(uri, position, "invalid xml:base", e))?,
        None => parent_base,
    };

    let id = NodeId(nodes.len() as u32);
    if let Some(value) = attributes
        .iter()
        .find(|a| a.name.namespace().is_none() && a.name.local() == "id")
        .map(|a| a.value.clone())
    {
        ids.entry(value).or_insert(id);
    }

    nodes.push(XmlNode {
        parent,
        kind: XmlNodeKind::Element(ElementData {
            name,
            qname,
            attributes,
            scope: scope.clone(),
            base_uri: base_uri.clone(),
            children: Vec::new(),
        }),
    });
    if let Some(parent) = parent {
        match &mut nodes[parent.0 as usize].kind {
            XmlNodeKind::Element(data) => data.children.push(id),
            _ => unreachable!("open elements are element nodes"),
        }
    }
    stack.push((id, scope, base_uri));
    Ok(id)
}
