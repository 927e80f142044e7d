//! Shared fixtures: a miniature XBRL core (xbrli/xbrldt), a dimensional
//! taxonomy with target-role chaining, and helpers to assemble taxonomies
//! from in-memory documents.

#![allow(dead_code)]

use std::sync::Arc;

use taxoquery::{BasicTaxonomy, TaxonomyBuilder};
use taxoquery_core::MappedDocumentBuilder;
use url::Url;

pub fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

pub const XBRLI_XSD_URI: &str = "http://test/xbrli.xsd";
pub const XBRLDT_XSD_URI: &str = "http://test/xbrldt.xsd";
pub const HC_XSD_URI: &str = "http://test/hypercube.xsd";
pub const HC_DEF_URI: &str = "http://test/hypercube-def.xml";
pub const HC_LAB_URI: &str = "http://test/hypercube-lab.xml";
pub const CUSTOM_LB_URI: &str = "http://test/custom-lb.xml";

pub const HC_NS: &str = "http://test/hc";

pub const ELR_CUBE: &str = "http://test/role/cube";
pub const ELR_DIMS: &str = "http://test/role/dims";
pub const ELR_DOM: &str = "http://test/role/dom";

pub const XBRLI_XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
    targetNamespace="http://www.xbrl.org/2003/instance"
    elementFormDefault="qualified">
  <xs:element name="item" abstract="true" type="xs:anyType"/>
  <xs:element name="tuple" abstract="true" type="xs:anyType"/>
</xs:schema>
"#;

pub const XBRLDT_XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
    xmlns:xbrli="http://www.xbrl.org/2003/instance"
    targetNamespace="http://xbrl.org/2005/xbrldt"
    elementFormDefault="qualified">
  <xs:import namespace="http://www.xbrl.org/2003/instance" schemaLocation="xbrli.xsd"/>
  <xs:element name="hypercubeItem" substitutionGroup="xbrli:item" abstract="true" type="xs:anyType"/>
  <xs:element name="dimensionItem" substitutionGroup="xbrli:item" abstract="true" type="xs:anyType"/>
</xs:schema>
"#;

/// Schema of the dimensional scenario: one hypercube, two explicit
/// dimensions, one typed dimension, primary items and domain members.
pub const HC_XSD: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
    xmlns:xbrli="http://www.xbrl.org/2003/instance"
    xmlns:xbrldt="http://xbrl.org/2005/xbrldt"
    xmlns:link="http://www.xbrl.org/2003/linkbase"
    xmlns:xlink="http://www.w3.org/1999/xlink"
    targetNamespace="http://test/hc"
    elementFormDefault="qualified">
  <xs:import namespace="http://www.xbrl.org/2003/instance" schemaLocation="xbrli.xsd"/>
  <xs:import namespace="http://xbrl.org/2005/xbrldt" schemaLocation="xbrldt.xsd"/>
  <xs:annotation>
    <xs:appinfo>
      <link:linkbaseRef xlink:type="simple" xlink:href="hypercube-def.xml"/>
      <link:linkbaseRef xlink:type="simple" xlink:href="hypercube-lab.xml"/>
    </xs:appinfo>
  </xs:annotation>
  <xs:element name="MyHypercube" id="hc_MyHypercube" substitutionGroup="xbrldt:hypercubeItem"
      abstract="true" type="xs:anyType" xbrli:periodType="duration"/>
  <xs:element name="ProdDim" id="hc_ProdDim" substitutionGroup="xbrldt:dimensionItem"
      abstract="true" type="xs:anyType"/>
  <xs:element name="RegionDim" id="hc_RegionDim" substitutionGroup="xbrldt:dimensionItem"
      abstract="true" type="xs:anyType"/>
  <xs:element name="TypedDim" id="hc_TypedDim" substitutionGroup="xbrldt:dimensionItem"
      abstract="true" type="xs:anyType" xbrldt:typedDomainRef="#hc_TypedDomain"/>
  <xs:element name="TypedDomain" id="hc_TypedDomain" type="xs:string"/>
  <xs:element name="Sales" id="hc_Sales" substitutionGroup="xbrli:item" type="xs:string"/>
  <xs:element name="SalesEU" id="hc_SalesEU" substitutionGroup="xbrli:item" type="xs:string"/>
  <xs:element name="SalesDE" id="hc_SalesDE" substitutionGroup="xbrli:item" type="xs:string"/>
  <xs:element name="AllProducts" id="hc_AllProducts" substitutionGroup="xbrli:item"
      abstract="true" type="xs:string"/>
  <xs:element name="Wine" id="hc_Wine" substitutionGroup="xbrli:item" type="xs:string"/>
  <xs:element name="Beer" id="hc_Beer" substitutionGroup="xbrli:item" type="xs:string"/>
  <xs:element name="CraftBeer" id="hc_CraftBeer" substitutionGroup="xbrli:item" type="xs:string"/>
  <xs:element name="MyTuple" id="hc_MyTuple" substitutionGroup="xbrli:tuple" type="xs:anyType"/>
</xs:schema>
"##;

/// Definition linkbase: has-hypercube in one ELR, target-role chained into a
/// hypercube-dimension ELR and further into a domain ELR; one domain-member
/// arc marked unusable; one domain-member arc making SalesEU inherit the
/// hypercube of Sales.
pub const HC_DEF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<link:linkbase xmlns:link="http://www.xbrl.org/2003/linkbase"
    xmlns:xlink="http://www.w3.org/1999/xlink"
    xmlns:xbrldt="http://xbrl.org/2005/xbrldt">
  <link:definitionLink xlink:type="extended" xlink:role="http://test/role/cube">
    <link:loc xlink:type="locator" xlink:href="hypercube.xsd#hc_Sales" xlink:label="sales"/>
    <link:loc xlink:type="locator" xlink:href="hypercube.xsd#hc_SalesEU" xlink:label="salesEU"/>
    <link:loc xlink:type="locator" xlink:href="hypercube.xsd#hc_SalesDE" xlink:label="salesDE"/>
    <link:loc xlink:type="locator" xlink:href="hypercube.xsd#hc_MyHypercube" xlink:label="cube"/>
    <link:definitionArc xlink:type="arc" xlink:arcrole="http://xbrl.org/int/dim/arcrole/all"
        xlink:from="sales" xlink:to="cube" xbrldt:contextElement="segment"
        xbrldt:targetRole="http://test/role/dims"/>
    <link:definitionArc xlink:type="arc" xlink:arcrole="http://xbrl.org/int/dim/arcrole/domain-member"
        xlink:from="sales" xlink:to="salesEU"/>
    <link:definitionArc xlink:type="arc" xlink:arcrole="http://xbrl.org/int/dim/arcrole/domain-member"
        xlink:from="salesEU" xlink:to="salesDE"/>
  </link:definitionLink>
  <link:definitionLink xlink:type="extended" xlink:role="http://test/role/dims">
    <link:loc xlink:type="locator" xlink:href="hypercube.xsd#hc_MyHypercube" xlink:label="cube"/>
    <link:loc xlink:type="locator" xlink:href="hypercube.xsd#hc_ProdDim" xlink:label="prodDim"/>
    <link:loc xlink:type="locator" xlink:href="hypercube.xsd#hc_RegionDim" xlink:label="regionDim"/>
    <link:definitionArc xlink:type="arc" xlink:arcrole="http://xbrl.org/int/dim/arcrole/hypercube-dimension"
        xlink:from="cube" xlink:to="prodDim" xbrldt:targetRole="http://test/role/dom"/>
    <link:definitionArc xlink:type="arc" xlink:arcrole="http://xbrl.org/int/dim/arcrole/hypercube-dimension"
        xlink:from="cube" xlink:to="regionDim"/>
  </link:definitionLink>
  <link:definitionLink xlink:type="extended" xlink:role="http://test/role/dom">
    <link:loc xlink:type="locator" xlink:href="hypercube.xsd#hc_ProdDim" xlink:label="prodDim"/>
    <link:loc xlink:type="locator" xlink:href="hypercube.xsd#hc_AllProducts" xlink:label="allProducts"/>
    <link:loc xlink:type="locator" xlink:href="hypercube.xsd#hc_Wine" xlink:label="wine"/>
    <link:loc xlink:type="locator" xlink:href="hypercube.xsd#hc_Beer" xlink:label="beer"/>
    <link:loc xlink:type="locator" xlink:href="hypercube.xsd#hc_CraftBeer" xlink:label="craftBeer"/>
    <link:definitionArc xlink:type="arc" xlink:arcrole="http://xbrl.org/int/dim/arcrole/dimension-domain"
        xlink:from="prodDim" xlink:to="allProducts"/>
    <link:definitionArc xlink:type="arc" xlink:arcrole="http://xbrl.org/int/dim/arcrole/domain-member"
        xlink:from="allProducts" xlink:to="wine"/>
    <link:definitionArc xlink:type="arc" xlink:arcrole="http://xbrl.org/int/dim/arcrole/domain-member"
        xlink:from="allProducts" xlink:to="beer" xbrldt:usable="false"/>
    <link:definitionArc xlink:type="arc" xlink:arcrole="http://xbrl.org/int/dim/arcrole/domain-member"
        xlink:from="beer" xlink:to="craftBeer"/>
    <link:definitionArc xlink:type="arc" xlink:arcrole="http://xbrl.org/int/dim/arcrole/dimension-default"
        xlink:from="prodDim" xlink:to="allProducts"/>
  </link:definitionLink>
</link:linkbase>
"#;

pub const HC_LAB: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<link:linkbase xmlns:link="http://www.xbrl.org/2003/linkbase"
    xmlns:xlink="http://www.w3.org/1999/xlink">
  <link:labelLink xlink:type="extended" xlink:role="http://www.xbrl.org/2003/role/link">
    <link:loc xlink:type="locator" xlink:href="hypercube.xsd#hc_Sales" xlink:label="salesLoc"/>
    <link:label xlink:type="resource" xlink:label="salesLabel"
        xlink:role="http://www.xbrl.org/2003/role/label" xml:lang="en">Sales</link:label>
    <link:label xlink:type="resource" xlink:label="salesLabel"
        xlink:role="http://www.xbrl.org/2003/role/label" xml:lang="de">Umsatz</link:label>
    <link:labelArc xlink:type="arc" xlink:arcrole="http://www.xbrl.org/2003/arcrole/concept-label"
        xlink:from="salesLoc" xlink:to="salesLabel"/>
  </link:labelLink>
</link:linkbase>
"#;

/// A custom (non-standard) extended link with a resource and an arc.
pub const CUSTOM_LB: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<link:linkbase xmlns:link="http://www.xbrl.org/2003/linkbase"
    xmlns:xlink="http://www.w3.org/1999/xlink"
    xmlns:my="http://test/custom">
  <my:customLink xlink:type="extended" xlink:role="http://test/role/custom">
    <link:loc xlink:type="locator" xlink:href="hypercube.xsd#hc_Sales" xlink:label="s"/>
    <my:note xlink:type="resource" xlink:label="n" xlink:role="http://test/role/note">a note</my:note>
    <my:customArc xlink:type="arc" xlink:arcrole="http://test/arcrole/note"
        xlink:from="s" xlink:to="n"/>
  </my:customLink>
</link:linkbase>
"#;

/// The full dimensional fixture set.
pub fn dimensional_documents() -> Vec<(&'static str, &'static str)> {
    vec![
        (XBRLI_XSD_URI, XBRLI_XSD),
        (XBRLDT_XSD_URI, XBRLDT_XSD),
        (HC_XSD_URI, HC_XSD),
        (HC_DEF_URI, HC_DEF),
        (HC_LAB_URI, HC_LAB),
    ]
}

pub fn mapped_builder(documents: &[(&str, &str)]) -> MappedDocumentBuilder {
    let mut builder = MappedDocumentBuilder::new();
    for (uri, text) in documents {
        builder.insert(url(uri), *text);
    }
    builder
}

/// Build a strict taxonomy by discovery from the given entry points.
pub fn build_taxonomy(documents: &[(&str, &str)], entry_points: &[&str]) -> BasicTaxonomy {
    let entries: Vec<Url> = entry_points.iter().map(|u| url(u)).collect();
    TaxonomyBuilder::new(Arc::new(mapped_builder(documents)))
        .build(&entries)
        .expect("taxonomy build failed")
}

/// The dimensional fixture, built strictly from its schema entry point.
pub fn dimensional_taxonomy() -> BasicTaxonomy {
    build_taxonomy(&dimensional_documents(), &[HC_XSD_URI])
}

pub fn hc(local: &str) -> taxoquery_core::EName {
    taxoquery_core::EName::of(HC_NS, local)
}
