//! Typed wrappers over the parsed XML tree.
//!
//! [`TaxonomyElem`] is a closed sum over the element kinds the engine cares
//! about. Narrowing is a pattern match on the tag; every kind keeps its
//! backing [`XmlElem`] reachable, so generic attribute/child access is always
//! available next to the kind-specific accessors.

use std::str::FromStr;
use std::sync::Arc;

use taxoquery_core::{EName, QName, XmlDocument, XmlElem, XmlFragmentKey};
use url::Url;

use crate::ns;
use crate::ns::{
    LINK_ARCROLE_REF, LINK_ARCROLE_TYPE, LINK_DEFINITION, LINK_LABEL, LINK_LINKBASE,
    LINK_LINKBASE_REF, LINK_REFERENCE, LINK_ROLE_REF, LINK_ROLE_TYPE, LINK_USED_ON, XBRLDT_CLOSED,
    XBRLDT_CONTEXT_ELEMENT, XBRLDT_TARGET_ROLE, XBRLDT_TYPED_DOMAIN_REF, XBRLDT_USABLE,
    XBRLI_BALANCE, XBRLI_PERIOD_TYPE, XLINK_ARCROLE, XLINK_FROM, XLINK_HREF, XLINK_LABEL_ATTR,
    XLINK_ROLE, XLINK_TO, XLINK_TYPE, XS_ANNOTATION, XS_APPINFO, XS_ATTRIBUTE, XS_COMPLEX_CONTENT,
    XS_COMPLEX_TYPE, XS_ELEMENT, XS_EXTENSION, XS_IMPORT, XS_INCLUDE, XS_RESTRICTION, XS_SCHEMA,
    XS_SIMPLE_CONTENT, XS_SIMPLE_TYPE,
};

macro_rules! backing_elem_impls {
    ($($ty:ident),* $(,)?) => {
        $(
            impl $ty {
                /// The wrapped element.
                pub fn backing_elem(&self) -> &XmlElem {
                    &self.elem
                }

                /// Stable identity of the wrapped element.
                pub fn key(&self) -> XmlFragmentKey {
                    self.elem.fragment_key()
                }

                pub fn doc_uri(&self) -> &Url {
                    self.elem.doc_uri()
                }
            }
        )*
    };
}

/// An `xs:schema` root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XsdSchema {
    elem: XmlElem,
}

/// A `link:linkbase`, standalone or embedded in schema `appinfo`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Linkbase {
    elem: XmlElem,
}

/// A named top-level `xs:element`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalElementDeclaration {
    elem: XmlElem,
    target: EName,
}

/// A named top-level `xs:attribute`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalAttributeDeclaration {
    elem: XmlElem,
    target: EName,
}

/// A named top-level `xs:complexType` or `xs:simpleType`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedTypeDefinition {
    elem: XmlElem,
    target: EName,
}

/// An element with `xlink:type="extended"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedLink {
    elem: XmlElem,
}

/// An element with `xlink:type="arc"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XLinkArc {
    elem: XmlElem,
}

/// An element with `xlink:type="locator"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XLinkLocator {
    elem: XmlElem,
}

/// A standard resource: `link:label` or `link:reference`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XLinkResource {
    elem: XmlElem,
}

/// A resource-typed element outside the standard label/reference vocabulary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NonStandardResource {
    elem: XmlElem,
}

/// `link:roleRef`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleRef {
    elem: XmlElem,
}

/// `link:arcroleRef`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArcroleRef {
    elem: XmlElem,
}

/// `link:roleType`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleType {
    elem: XmlElem,
}

/// `link:arcroleType`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArcroleType {
    elem: XmlElem,
}

backing_elem_impls!(
    XsdSchema,
    Linkbase,
    GlobalElementDeclaration,
    GlobalAttributeDeclaration,
    NamedTypeDefinition,
    ExtendedLink,
    XLinkArc,
    XLinkLocator,
    XLinkResource,
    NonStandardResource,
    RoleRef,
    ArcroleRef,
    RoleType,
    ArcroleType,
);

/// Polymorphic taxonomy element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaxonomyElem {
    XsdSchema(XsdSchema),
    Linkbase(Linkbase),
    GlobalElementDeclaration(GlobalElementDeclaration),
    GlobalAttributeDeclaration(GlobalAttributeDeclaration),
    NamedTypeDefinition(NamedTypeDefinition),
    ExtendedLink(ExtendedLink),
    XLinkArc(XLinkArc),
    XLinkLocator(XLinkLocator),
    XLinkResource(XLinkResource),
    NonStandardResource(NonStandardResource),
    RoleRef(RoleRef),
    ArcroleRef(ArcroleRef),
    RoleType(RoleType),
    ArcroleType(ArcroleType),
    Other(XmlElem),
}

impl TaxonomyElem {
    /// Classify one element. Never fails; anything unrecognized is `Other`.
    pub fn classify(elem: XmlElem) -> TaxonomyElem {
        let name = elem.name().clone();
        if name == *XS_SCHEMA {
            return TaxonomyElem::XsdSchema(XsdSchema { elem });
        }
        if name == *LINK_LINKBASE {
            return TaxonomyElem::Linkbase(Linkbase { elem });
        }

        let parent_is_schema = elem.parent().is_some_and(|p| p.name() == &*XS_SCHEMA);
        if parent_is_schema {
            if let Some(target) = schema_scoped_target(&elem) {
                if name == *XS_ELEMENT {
                    return TaxonomyElem::GlobalElementDeclaration(GlobalElementDeclaration { elem, target });
                }
                if name == *XS_ATTRIBUTE {
                    return TaxonomyElem::GlobalAttributeDeclaration(GlobalAttributeDeclaration { elem, target });
                }
                if name == *XS_COMPLEX_TYPE || name == *XS_SIMPLE_TYPE {
                    return TaxonomyElem::NamedTypeDefinition(NamedTypeDefinition { elem, target });
                }
            }
        }

        if name == *LINK_ROLE_REF {
            return TaxonomyElem::RoleRef(RoleRef { elem });
        }
        if name == *LINK_ARCROLE_REF {
            return TaxonomyElem::ArcroleRef(ArcroleRef { elem });
        }
        if name == *LINK_ROLE_TYPE {
            return TaxonomyElem::RoleType(RoleType { elem });
        }
        if name == *LINK_ARCROLE_TYPE {
            return TaxonomyElem::ArcroleType(ArcroleType { elem });
        }

        let xlink_type = elem.attribute(&XLINK_TYPE).map(str::to_string);
        match xlink_type.as_deref() {
            Some("extended") => TaxonomyElem::ExtendedLink(ExtendedLink { elem }),
            Some("arc") => TaxonomyElem::XLinkArc(XLinkArc { elem }),
            Some("locator") => TaxonomyElem::XLinkLocator(XLinkLocator { elem }),
            Some("resource") => {
                if name == *LINK_LABEL || name == *LINK_REFERENCE {
                    TaxonomyElem::XLinkResource(XLinkResource { elem })
                } else {
                    TaxonomyElem::NonStandardResource(NonStandardResource { elem })
                }
            }
            _ => TaxonomyElem::Other(elem),
        }
    }

    pub fn backing_elem(&self) -> &XmlElem {
        match self {
            TaxonomyElem::XsdSchema(e) => e.backing_elem(),
            TaxonomyElem::Linkbase(e) => e.backing_elem(),
            TaxonomyElem::GlobalElementDeclaration(e) => e.backing_elem(),
            TaxonomyElem::GlobalAttributeDeclaration(e) => e.backing_elem(),
            TaxonomyElem::NamedTypeDefinition(e) => e.backing_elem(),
            TaxonomyElem::ExtendedLink(e) => e.backing_elem(),
            TaxonomyElem::XLinkArc(e) => e.backing_elem(),
            TaxonomyElem::XLinkLocator(e) => e.backing_elem(),
            TaxonomyElem::XLinkResource(e) => e.backing_elem(),
            TaxonomyElem::NonStandardResource(e) => e.backing_elem(),
            TaxonomyElem::RoleRef(e) => e.backing_elem(),
            TaxonomyElem::ArcroleRef(e) => e.backing_elem(),
            TaxonomyElem::RoleType(e) => e.backing_elem(),
            TaxonomyElem::ArcroleType(e) => e.backing_elem(),
            TaxonomyElem::Other(e) => e,
        }
    }

    pub fn key(&self) -> XmlFragmentKey {
        self.backing_elem().fragment_key()
    }

    pub fn name(&self) -> &EName {
        self.backing_elem().name()
    }

    pub fn as_xsd_schema(&self) -> Option<&XsdSchema> {
        match self {
            TaxonomyElem::XsdSchema(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_linkbase(&self) -> Option<&Linkbase> {
        match self {
            TaxonomyElem::Linkbase(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_global_element_declaration(&self) -> Option<&GlobalElementDeclaration> {
        match self {
            TaxonomyElem::GlobalElementDeclaration(e) => Some(e),
            _ => None,
        }
    }
}

/// Target EName of a named top-level schema component.
fn schema_scoped_target(elem: &XmlElem) -> Option<EName> {
    let name = elem.attribute_local("name")?;
    let tns = elem
        .parent()
        .and_then(|schema| schema.attribute_local("targetNamespace").map(str::to_string));
    Some(EName::new(tns, name))
}

/// Resolve a QName-valued attribute against the element's scope.
/// The default namespace applies, per XML Schema QName resolution.
fn qname_attribute(elem: &XmlElem, attr: &str) -> Option<EName> {
    let value = elem.attribute_local(attr)?;
    let qname = QName::from_str(value.trim()).ok()?;
    elem.scope().resolve(&qname, true)
}

impl XsdSchema {
    pub fn target_namespace(&self) -> Option<&str> {
        self.elem.attribute_local("targetNamespace")
    }

    pub fn global_element_declarations(&self) -> Vec<GlobalElementDeclaration> {
        self.named_components(&XS_ELEMENT)
            .map(|(elem, target)| GlobalElementDeclaration { elem, target })
            .collect()
    }

    pub fn global_attribute_declarations(&self) -> Vec<GlobalAttributeDeclaration> {
        self.named_components(&XS_ATTRIBUTE)
            .map(|(elem, target)| GlobalAttributeDeclaration { elem, target })
            .collect()
    }

    pub fn named_type_definitions(&self) -> Vec<NamedTypeDefinition> {
        let complex = self.named_components(&XS_COMPLEX_TYPE);
        let simple = self.named_components(&XS_SIMPLE_TYPE);
        complex
            .chain(simple)
            .map(|(elem, target)| NamedTypeDefinition { elem, target })
            .collect()
    }

    fn named_components<'a>(&'a self, kind: &'a EName) -> impl Iterator<Item = (XmlElem, EName)> + 'a {
        self.elem
            .child_elems_named(kind)
            .into_iter()
            .filter_map(|elem| schema_scoped_target(&elem).map(|target| (elem, target)))
    }

    pub fn imports(&self) -> Vec<XmlElem> {
        self.elem.child_elems_named(&XS_IMPORT)
    }

    pub fn includes(&self) -> Vec<XmlElem> {
        self.elem.child_elems_named(&XS_INCLUDE)
    }

    /// `link:linkbaseRef` elements anywhere below the schema root (they live
    /// inside `annotation/appinfo`).
    pub fn linkbase_refs(&self) -> Vec<XmlElem> {
        self.elem
            .descendant_elems()
            .into_iter()
            .filter(|e| e.name() == &*LINK_LINKBASE_REF)
            .collect()
    }

    /// Linkbases embedded under `annotation/appinfo`.
    pub fn embedded_linkbases(&self) -> Vec<Linkbase> {
        let mut out = Vec::new();
        for annotation in self.elem.child_elems_named(&XS_ANNOTATION) {
            for appinfo in annotation.child_elems_named(&XS_APPINFO) {
                for lb in appinfo.child_elems_named(&LINK_LINKBASE) {
                    out.push(Linkbase { elem: lb });
                }
            }
        }
        out
    }
}

impl Linkbase {
    pub fn extended_links(&self) -> Vec<ExtendedLink> {
        self.elem
            .child_elems()
            .into_iter()
            .filter(|e| e.attribute(&XLINK_TYPE) == Some("extended"))
            .map(|elem| ExtendedLink { elem })
            .collect()
    }

    pub fn role_refs(&self) -> Vec<RoleRef> {
        self.elem
            .child_elems_named(&LINK_ROLE_REF)
            .into_iter()
            .map(|elem| RoleRef { elem })
            .collect()
    }

    pub fn arcrole_refs(&self) -> Vec<ArcroleRef> {
        self.elem
            .child_elems_named(&LINK_ARCROLE_REF)
            .into_iter()
            .map(|elem| ArcroleRef { elem })
            .collect()
    }
}

impl GlobalElementDeclaration {
    pub fn target_ename(&self) -> &EName {
        &self.target
    }

    /// Resolved `@substitutionGroup`, if present and resolvable.
    pub fn substitution_group(&self) -> Option<EName> {
        qname_attribute(&self.elem, "substitutionGroup")
    }

    pub fn type_ename(&self) -> Option<EName> {
        qname_attribute(&self.elem, "type")
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self.elem.attribute_local("abstract"), Some("true" | "1"))
    }

    pub fn is_nillable(&self) -> bool {
        matches!(self.elem.attribute_local("nillable"), Some("true" | "1"))
    }

    pub fn period_type(&self) -> Option<&str> {
        self.elem.attribute(&XBRLI_PERIOD_TYPE)
    }

    pub fn balance(&self) -> Option<&str> {
        self.elem.attribute(&XBRLI_BALANCE)
    }

    /// Raw `xbrldt:typedDomainRef` value.
    pub fn typed_domain_ref(&self) -> Option<&str> {
        self.elem.attribute(&XBRLDT_TYPED_DOMAIN_REF)
    }

    /// `xbrldt:typedDomainRef` resolved against the element's base URI.
    pub fn typed_domain_ref_uri(&self) -> Option<Url> {
        let raw = self.typed_domain_ref()?;
        self.elem.base_uri().join(raw).ok()
    }
}

impl GlobalAttributeDeclaration {
    pub fn target_ename(&self) -> &EName {
        &self.target
    }

    pub fn type_ename(&self) -> Option<EName> {
        qname_attribute(&self.elem, "type")
    }
}

impl NamedTypeDefinition {
    pub fn target_ename(&self) -> &EName {
        &self.target
    }

    /// One step up the `@base` chain, for simple content only.
    pub fn base_type(&self) -> Option<EName> {
        if self.elem.name() == &*XS_SIMPLE_TYPE {
            let restriction = self
                .elem
                .first_child_elem_named(&XS_RESTRICTION)
                .or_else(|| self.elem.first_child_elem_named(&XS_EXTENSION))?;
            return qname_attribute(&restriction, "base");
        }
        // complexType: only simpleContent restriction/extension carries a
        // simple base type chain.
        let simple_content = self.elem.first_child_elem_named(&XS_SIMPLE_CONTENT)?;
        let derivation = simple_content
            .first_child_elem_named(&XS_RESTRICTION)
            .or_else(|| simple_content.first_child_elem_named(&XS_EXTENSION))?;
        qname_attribute(&derivation, "base")
    }

    pub fn has_complex_content(&self) -> bool {
        self.elem.name() == &*XS_COMPLEX_TYPE
            && self.elem.first_child_elem_named(&XS_COMPLEX_CONTENT).is_some()
    }
}

impl ExtendedLink {
    /// The extended link role; the XBRL standard link role when absent.
    pub fn elr(&self) -> &str {
        self.elem.attribute(&XLINK_ROLE).unwrap_or(ns::STANDARD_LINK_ROLE)
    }

    pub fn child_locators(&self) -> Vec<XLinkLocator> {
        self.elem
            .child_elems()
            .into_iter()
            .filter(|e| e.attribute(&XLINK_TYPE) == Some("locator"))
            .map(|elem| XLinkLocator { elem })
            .collect()
    }

    /// Resource-typed children, standard or not.
    pub fn child_resources(&self) -> Vec<XmlElem> {
        self.elem
            .child_elems()
            .into_iter()
            .filter(|e| e.attribute(&XLINK_TYPE) == Some("resource"))
            .collect()
    }

    pub fn child_arcs(&self) -> Vec<XLinkArc> {
        self.elem
            .child_elems()
            .into_iter()
            .filter(|e| e.attribute(&XLINK_TYPE) == Some("arc"))
            .map(|elem| XLinkArc { elem })
            .collect()
    }
}

/// `@use` on an arc.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArcUse {
    Optional,
    Prohibited,
}

impl XLinkArc {
    pub fn from_label(&self) -> Option<&str> {
        self.elem.attribute(&XLINK_FROM)
    }

    pub fn to_label(&self) -> Option<&str> {
        self.elem.attribute(&XLINK_TO)
    }

    pub fn arcrole(&self) -> Option<&str> {
        self.elem.attribute(&XLINK_ARCROLE)
    }

    pub fn order(&self) -> f64 {
        self.elem
            .attribute_local("order")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(1.0)
    }

    pub fn priority_raw(&self) -> Option<&str> {
        self.elem.attribute_local("priority")
    }

    /// Arc priority; 0 when absent. Unparseable values are `Err`.
    pub fn priority(&self) -> Result<i32, String> {
        match self.priority_raw() {
            None => Ok(0),
            Some(v) => v.trim().parse().map_err(|_| v.to_string()),
        }
    }

    pub fn use_raw(&self) -> Option<&str> {
        self.elem.attribute_local("use")
    }

    /// `@use`; `optional` when absent. Unrecognized values are `Err`.
    pub fn arc_use(&self) -> Result<ArcUse, String> {
        match self.use_raw() {
            None | Some("optional") => Ok(ArcUse::Optional),
            Some("prohibited") => Ok(ArcUse::Prohibited),
            Some(other) => Err(other.to_string()),
        }
    }

    pub fn preferred_label(&self) -> Option<&str> {
        self.elem.attribute_local("preferredLabel")
    }

    /// `xbrldt:targetRole`, if present.
    pub fn target_role(&self) -> Option<&str> {
        self.elem.attribute(&XBRLDT_TARGET_ROLE)
    }

    /// `xbrldt:usable`; defaults to true when absent or unparseable.
    pub fn usable(&self) -> bool {
        !matches!(self.elem.attribute(&XBRLDT_USABLE), Some("false" | "0"))
    }

    pub fn closed(&self) -> Option<bool> {
        match self.elem.attribute(&XBRLDT_CLOSED) {
            Some("true" | "1") => Some(true),
            Some("false" | "0") => Some(false),
            _ => None,
        }
    }

    pub fn context_element(&self) -> Option<&str> {
        self.elem.attribute(&XBRLDT_CONTEXT_ELEMENT)
    }

    /// Attributes relevant for arc equivalence: everything except the XLink
    /// attributes and `use`/`priority`. Sorted for stable comparison.
    pub fn nonexempt_attributes(&self) -> Vec<(EName, String)> {
        let mut out: Vec<(EName, String)> = self
            .elem
            .attributes()
            .iter()
            .filter(|a| {
                a.name.namespace() != Some(ns::XLINK_NS)
                    && !(a.name.namespace().is_none()
                        && matches!(a.name.local(), "use" | "priority"))
            })
            .map(|a| (a.name.clone(), a.value.clone()))
            .collect();
        out.sort();
        out
    }
}

impl XLinkLocator {
    pub fn label(&self) -> Option<&str> {
        self.elem.attribute(&XLINK_LABEL_ATTR)
    }

    pub fn raw_href(&self) -> Option<&str> {
        self.elem.attribute(&XLINK_HREF)
    }

    /// `xlink:href` resolved against the locator's base URI.
    pub fn resolved_href(&self) -> Option<Url> {
        let raw = self.raw_href()?;
        self.elem.base_uri().join(raw).ok()
    }
}

impl XLinkResource {
    pub fn label(&self) -> Option<&str> {
        self.elem.attribute(&XLINK_LABEL_ATTR)
    }

    pub fn role(&self) -> Option<&str> {
        self.elem.attribute(&XLINK_ROLE)
    }

    pub fn language(&self) -> Option<String> {
        self.elem.language()
    }

    pub fn text(&self) -> String {
        self.elem.text()
    }
}

impl NonStandardResource {
    pub fn label(&self) -> Option<&str> {
        self.elem.attribute(&XLINK_LABEL_ATTR)
    }

    pub fn role(&self) -> Option<&str> {
        self.elem.attribute(&XLINK_ROLE)
    }

    pub fn text(&self) -> String {
        self.elem.text()
    }
}

impl RoleRef {
    pub fn role_uri(&self) -> Option<&str> {
        self.elem.attribute_local("roleURI")
    }

    pub fn resolved_href(&self) -> Option<Url> {
        let raw = self.elem.attribute(&XLINK_HREF)?;
        self.elem.base_uri().join(raw).ok()
    }
}

impl ArcroleRef {
    pub fn arcrole_uri(&self) -> Option<&str> {
        self.elem.attribute_local("arcroleURI")
    }

    pub fn resolved_href(&self) -> Option<Url> {
        let raw = self.elem.attribute(&XLINK_HREF)?;
        self.elem.base_uri().join(raw).ok()
    }
}

impl RoleType {
    pub fn role_uri(&self) -> Option<&str> {
        self.elem.attribute_local("roleURI")
    }

    pub fn definition(&self) -> Option<String> {
        self.elem.first_child_elem_named(&LINK_DEFINITION).map(|d| d.text())
    }

    /// Element names this role may appear on, per `link:usedOn` children.
    pub fn used_on(&self) -> Vec<EName> {
        self.elem
            .child_elems_named(&LINK_USED_ON)
            .into_iter()
            .filter_map(|u| {
                let text = u.text();
                let qname = QName::from_str(text.trim()).ok()?;
                u.scope().resolve(&qname, true)
            })
            .collect()
    }
}

impl ArcroleType {
    pub fn arcrole_uri(&self) -> Option<&str> {
        self.elem.attribute_local("arcroleURI")
    }

    pub fn cycles_allowed(&self) -> Option<&str> {
        self.elem.attribute_local("cyclesAllowed")
    }

    pub fn definition(&self) -> Option<String> {
        self.elem.first_child_elem_named(&LINK_DEFINITION).map(|d| d.text())
    }
}

/// A parsed document rooted at a schema or linkbase (or anything else, which
/// simply contributes nothing to discovery or relationship extraction).
#[derive(Clone, Debug)]
pub struct TaxonomyDocument {
    xml: Arc<XmlDocument>,
    root: TaxonomyElem,
}

impl TaxonomyDocument {
    pub fn from_xml(xml: Arc<XmlDocument>) -> Self {
        let root = TaxonomyElem::classify(xml.root_elem());
        Self { xml, root }
    }

    pub fn uri(&self) -> &Url {
        self.xml.uri()
    }

    pub fn xml(&self) -> &Arc<XmlDocument> {
        &self.xml
    }

    pub fn root(&self) -> &TaxonomyElem {
        &self.root
    }

    /// The linkbases this document contributes: itself for a linkbase
    /// document, the embedded ones for a schema document.
    pub fn linkbases(&self) -> Vec<Linkbase> {
        match &self.root {
            TaxonomyElem::Linkbase(lb) => vec![lb.clone()],
            TaxonomyElem::XsdSchema(schema) => schema.embedded_linkbases(),
            _ => Vec::new(),
        }
    }
}
