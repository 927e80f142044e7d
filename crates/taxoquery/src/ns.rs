//! Namespace URIs, arcroles and well-known expanded names from the XBRL
//! family of specifications.

use std::sync::LazyLock;

use taxoquery_core::EName;

pub const XS_NS: &str = "http://www.w3.org/2001/XMLSchema";
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
pub const LINK_NS: &str = "http://www.xbrl.org/2003/linkbase";
pub const XBRLI_NS: &str = "http://www.xbrl.org/2003/instance";
pub const XBRLDT_NS: &str = "http://xbrl.org/2005/xbrldt";
pub const GEN_NS: &str = "http://xbrl.org/2008/generic";

/// Standard arcroles (XBRL 2.1).
pub mod arcrole {
    pub const PARENT_CHILD: &str = "http://www.xbrl.org/2003/arcrole/parent-child";
    pub const SUMMATION_ITEM: &str = "http://www.xbrl.org/2003/arcrole/summation-item";
    pub const CONCEPT_LABEL: &str = "http://www.xbrl.org/2003/arcrole/concept-label";
    pub const CONCEPT_REFERENCE: &str = "http://www.xbrl.org/2003/arcrole/concept-reference";
    pub const GENERAL_SPECIAL: &str = "http://www.xbrl.org/2003/arcrole/general-special";
    pub const ESSENCE_ALIAS: &str = "http://www.xbrl.org/2003/arcrole/essence-alias";
    pub const SIMILAR_TUPLES: &str = "http://www.xbrl.org/2003/arcrole/similar-tuples";
    pub const REQUIRES_ELEMENT: &str = "http://www.xbrl.org/2003/arcrole/requires-element";

    /// Dimensional arcroles (XBRL Dimensions 1.0).
    pub const ALL: &str = "http://xbrl.org/int/dim/arcrole/all";
    pub const NOT_ALL: &str = "http://xbrl.org/int/dim/arcrole/notAll";
    pub const HYPERCUBE_DIMENSION: &str = "http://xbrl.org/int/dim/arcrole/hypercube-dimension";
    pub const DIMENSION_DOMAIN: &str = "http://xbrl.org/int/dim/arcrole/dimension-domain";
    pub const DOMAIN_MEMBER: &str = "http://xbrl.org/int/dim/arcrole/domain-member";
    pub const DIMENSION_DEFAULT: &str = "http://xbrl.org/int/dim/arcrole/dimension-default";
}

/// The standard extended-link role.
pub const STANDARD_LINK_ROLE: &str = "http://www.xbrl.org/2003/role/link";

macro_rules! ename_statics {
    ($($(#[$meta:meta])* $name:ident = ($ns:expr, $local:expr);)*) => {
        $(
            $(#[$meta])*
            pub static $name: LazyLock<EName> = LazyLock::new(|| EName::of($ns, $local));
        )*
    };
}

ename_statics! {
    // XML Schema vocabulary
    XS_SCHEMA = (XS_NS, "schema");
    XS_ELEMENT = (XS_NS, "element");
    XS_ATTRIBUTE = (XS_NS, "attribute");
    XS_COMPLEX_TYPE = (XS_NS, "complexType");
    XS_SIMPLE_TYPE = (XS_NS, "simpleType");
    XS_IMPORT = (XS_NS, "import");
    XS_INCLUDE = (XS_NS, "include");
    XS_ANNOTATION = (XS_NS, "annotation");
    XS_APPINFO = (XS_NS, "appinfo");
    XS_RESTRICTION = (XS_NS, "restriction");
    XS_EXTENSION = (XS_NS, "extension");
    XS_SIMPLE_CONTENT = (XS_NS, "simpleContent");
    XS_COMPLEX_CONTENT = (XS_NS, "complexContent");

    // Linkbase vocabulary
    LINK_LINKBASE = (LINK_NS, "linkbase");
    LINK_LINKBASE_REF = (LINK_NS, "linkbaseRef");
    LINK_ROLE_REF = (LINK_NS, "roleRef");
    LINK_ARCROLE_REF = (LINK_NS, "arcroleRef");
    LINK_ROLE_TYPE = (LINK_NS, "roleType");
    LINK_ARCROLE_TYPE = (LINK_NS, "arcroleType");
    LINK_DEFINITION = (LINK_NS, "definition");
    LINK_USED_ON = (LINK_NS, "usedOn");
    LINK_LOC = (LINK_NS, "loc");
    LINK_LABEL = (LINK_NS, "label");
    LINK_REFERENCE = (LINK_NS, "reference");
    LINK_PRESENTATION_LINK = (LINK_NS, "presentationLink");
    LINK_DEFINITION_LINK = (LINK_NS, "definitionLink");
    LINK_CALCULATION_LINK = (LINK_NS, "calculationLink");
    LINK_LABEL_LINK = (LINK_NS, "labelLink");
    LINK_REFERENCE_LINK = (LINK_NS, "referenceLink");
    LINK_FOOTNOTE_LINK = (LINK_NS, "footnoteLink");
    LINK_PRESENTATION_ARC = (LINK_NS, "presentationArc");
    LINK_DEFINITION_ARC = (LINK_NS, "definitionArc");
    LINK_CALCULATION_ARC = (LINK_NS, "calculationArc");
    LINK_LABEL_ARC = (LINK_NS, "labelArc");
    LINK_REFERENCE_ARC = (LINK_NS, "referenceArc");

    // XLink attributes
    XLINK_TYPE = (XLINK_NS, "type");
    XLINK_HREF = (XLINK_NS, "href");
    XLINK_ROLE = (XLINK_NS, "role");
    XLINK_ARCROLE = (XLINK_NS, "arcrole");
    XLINK_LABEL_ATTR = (XLINK_NS, "label");
    XLINK_FROM = (XLINK_NS, "from");
    XLINK_TO = (XLINK_NS, "to");
    XLINK_TITLE = (XLINK_NS, "title");

    // XBRL instance vocabulary
    XBRLI_ITEM = (XBRLI_NS, "item");
    XBRLI_TUPLE = (XBRLI_NS, "tuple");
    XBRLI_PERIOD_TYPE = (XBRLI_NS, "periodType");
    XBRLI_BALANCE = (XBRLI_NS, "balance");

    // XBRL Dimensions vocabulary
    XBRLDT_HYPERCUBE_ITEM = (XBRLDT_NS, "hypercubeItem");
    XBRLDT_DIMENSION_ITEM = (XBRLDT_NS, "dimensionItem");
    XBRLDT_TYPED_DOMAIN_REF = (XBRLDT_NS, "typedDomainRef");
    XBRLDT_TARGET_ROLE = (XBRLDT_NS, "targetRole");
    XBRLDT_USABLE = (XBRLDT_NS, "usable");
    XBRLDT_CLOSED = (XBRLDT_NS, "closed");
    XBRLDT_CONTEXT_ELEMENT = (XBRLDT_NS, "contextElement");
}

/// The standard extended-link elements of XBRL 2.1.
pub fn is_standard_extended_link(name: &EName) -> bool {
    name == &*LINK_PRESENTATION_LINK
        || name == &*LINK_DEFINITION_LINK
        || name == &*LINK_CALCULATION_LINK
        || name == &*LINK_LABEL_LINK
        || name == &*LINK_REFERENCE_LINK
        || name == &*LINK_FOOTNOTE_LINK
}
