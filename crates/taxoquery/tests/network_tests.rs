mod support;

use std::collections::HashSet;

use support::*;
use taxoquery::{DefaultNetworkResolver, InterConceptKind, Relationship};
use url::Url;

const PRES_LB_URI: &str = "http://test/pres.xml";
const PROHIBIT_LB_URI: &str = "http://test/prohibit.xml";

const PRES_LB: &str = r#"<?xml version="1.0"?>
<link:linkbase xmlns:link="http://www.xbrl.org/2003/linkbase"
    xmlns:xlink="http://www.w3.org/1999/xlink">
  <link:presentationLink xlink:type="extended" xlink:role="http://test/role/pres">
    <link:loc xlink:type="locator" xlink:href="hypercube.xsd#hc_Sales" xlink:label="sales"/>
    <link:loc xlink:type="locator" xlink:href="hypercube.xsd#hc_SalesEU" xlink:label="salesEU"/>
    <link:loc xlink:type="locator" xlink:href="hypercube.xsd#hc_SalesDE" xlink:label="salesDE"/>
    <link:presentationArc xlink:type="arc"
        xlink:arcrole="http://www.xbrl.org/2003/arcrole/parent-child"
        xlink:from="sales" xlink:to="salesEU"/>
    <link:presentationArc xlink:type="arc"
        xlink:arcrole="http://www.xbrl.org/2003/arcrole/parent-child"
        xlink:from="sales" xlink:to="salesDE"/>
    <link:presentationArc xlink:type="arc"
        xlink:arcrole="http://www.xbrl.org/2003/arcrole/parent-child"
        xlink:from="sales" xlink:to="salesDE" priority="2"/>
  </link:presentationLink>
</link:linkbase>
"#;

/// Prohibits the Sales -> SalesEU arc at priority 1.
const PROHIBIT_LB: &str = r#"<?xml version="1.0"?>
<link:linkbase xmlns:link="http://www.xbrl.org/2003/linkbase"
    xmlns:xlink="http://www.w3.org/1999/xlink">
  <link:presentationLink xlink:type="extended" xlink:role="http://test/role/pres">
    <link:loc xlink:type="locator" xlink:href="hypercube.xsd#hc_Sales" xlink:label="sales"/>
    <link:loc xlink:type="locator" xlink:href="hypercube.xsd#hc_SalesEU" xlink:label="salesEU"/>
    <link:presentationArc xlink:type="arc"
        xlink:arcrole="http://www.xbrl.org/2003/arcrole/parent-child"
        xlink:from="sales" xlink:to="salesEU" priority="1" use="prohibited"/>
  </link:presentationLink>
</link:linkbase>
"#;

fn presentation_documents() -> Vec<(&'static str, &'static str)> {
    let mut documents = dimensional_documents();
    documents.push((PRES_LB_URI, PRES_LB));
    documents.push((PROHIBIT_LB_URI, PROHIBIT_LB));
    documents
}

#[test]
fn prohibition_removes_the_equivalence_class() {
    let taxonomy = build_taxonomy(&presentation_documents(), &[HC_XSD_URI, PRES_LB_URI, PROHIBIT_LB_URI]);
    // Three base arcs plus the prohibiting arc itself.
    assert_eq!(taxonomy.find_all_parent_child_relationships().len(), 4);

    let resolved = taxonomy.resolve_prohibition_and_overriding(&DefaultNetworkResolver).unwrap();
    let surviving = resolved.find_all_parent_child_relationships();

    // Sales -> SalesEU is prohibited; Sales -> SalesDE survives once, at its
    // winning priority.
    assert_eq!(surviving.len(), 1);
    assert_eq!(surviving[0].target_ename(), &hc("SalesDE"));
    assert_eq!(surviving[0].arc().priority().unwrap(), 2);

    // The prohibiting arc itself never appears as a relationship either.
    assert!(
        resolved
            .relationships()
            .iter()
            .all(|r| r.doc_uri().as_str() != PROHIBIT_LB_URI || r.arcrole() != "http://www.xbrl.org/2003/arcrole/parent-child")
    );
}

#[test]
fn higher_priority_overrides_lower() {
    // Without the prohibiting linkbase, the duplicate Sales -> SalesDE arcs
    // resolve to the priority-2 one.
    let mut documents = dimensional_documents();
    documents.push((PRES_LB_URI, PRES_LB));
    let taxonomy = build_taxonomy(&documents, &[HC_XSD_URI, PRES_LB_URI]);

    let resolved = taxonomy.resolve_prohibition_and_overriding(&DefaultNetworkResolver).unwrap();
    let surviving = resolved.find_all_parent_child_relationships();
    let to_de: Vec<_> = surviving.iter().filter(|r| r.target_ename() == &hc("SalesDE")).collect();
    assert_eq!(to_de.len(), 1);
    assert_eq!(to_de[0].arc().priority().unwrap(), 2);

    // The un-prohibited Sales -> SalesEU arc is untouched.
    assert!(surviving.iter().any(|r| r.target_ename() == &hc("SalesEU")));
}

#[test]
fn network_resolution_is_idempotent() {
    let taxonomy = build_taxonomy(&presentation_documents(), &[HC_XSD_URI, PRES_LB_URI, PROHIBIT_LB_URI]);
    let once = taxonomy.resolve_prohibition_and_overriding(&DefaultNetworkResolver).unwrap();
    let twice = once.resolve_prohibition_and_overriding(&DefaultNetworkResolver).unwrap();

    assert_eq!(once.relationships().len(), twice.relationships().len());
    for (a, b) in once.relationships().iter().zip(twice.relationships()) {
        assert_eq!(a.source_id(), b.source_id());
        assert_eq!(a.target_id(), b.target_id());
        assert_eq!(a.elr(), b.elr());
    }
}

#[test]
fn prohibition_does_not_touch_other_base_sets() {
    let taxonomy = build_taxonomy(&presentation_documents(), &[HC_XSD_URI, PRES_LB_URI, PROHIBIT_LB_URI]);
    let resolved = taxonomy.resolve_prohibition_and_overriding(&DefaultNetworkResolver).unwrap();

    // Dimensional definition networks are untouched.
    assert_eq!(
        taxonomy.find_all_has_hypercube_relationships().len(),
        resolved.find_all_has_hypercube_relationships().len()
    );
    assert_eq!(
        taxonomy.find_all_domain_member_relationships().len(),
        resolved.find_all_domain_member_relationships().len()
    );
}

#[test]
fn filtering_document_uris_composes_like_intersection() {
    let taxonomy = build_taxonomy(&presentation_documents(), &[HC_XSD_URI, PRES_LB_URI, PROHIBIT_LB_URI]);

    let a: HashSet<Url> = [url(HC_XSD_URI), url(XBRLI_XSD_URI), url(XBRLDT_XSD_URI), url(HC_DEF_URI), url(PRES_LB_URI)]
        .into_iter()
        .collect();
    let b: HashSet<Url> = [url(HC_XSD_URI), url(XBRLI_XSD_URI), url(XBRLDT_XSD_URI), url(PRES_LB_URI), url(PROHIBIT_LB_URI)]
        .into_iter()
        .collect();
    let intersection: HashSet<Url> = a.intersection(&b).cloned().collect();

    let sequential = taxonomy.filtering_document_uris(&a).filtering_document_uris(&b);
    let direct = taxonomy.filtering_document_uris(&intersection);

    let doc_uris = |t: &taxoquery::BasicTaxonomy| -> Vec<String> {
        t.base().documents().iter().map(|d| d.uri().to_string()).collect()
    };
    assert_eq!(doc_uris(&sequential), doc_uris(&direct));
    assert_eq!(sequential.relationships().len(), direct.relationships().len());
    for (a, b) in sequential.relationships().iter().zip(direct.relationships()) {
        assert_eq!(a.source_id(), b.source_id());
        assert_eq!(a.target_id(), b.target_id());
    }
    // The definition linkbase is outside both keeps' intersection only when
    // excluded from either; here it dropped out via b.
    assert!(direct.find_all_has_hypercube_relationships().is_empty());
    assert!(!direct.find_all_parent_child_relationships().is_empty());
}

#[test]
fn filtering_relationships_keeps_the_dom() {
    let taxonomy = dimensional_taxonomy();
    let only_dimensional = taxonomy.filtering_relationships(|r| {
        r.as_inter_concept().is_some_and(|ic| ic.kind().is_dimensional())
    });

    assert!(only_dimensional.find_all_concept_resource_relationships().is_empty());
    assert!(!only_dimensional.find_all_has_hypercube_relationships().is_empty());
    // DOM content survives: documents and concept declarations are intact.
    assert_eq!(only_dimensional.base().documents().len(), taxonomy.base().documents().len());
    assert_eq!(only_dimensional.concept_declarations().len(), taxonomy.concept_declarations().len());
}

#[test]
fn invalid_use_value_is_a_network_error() {
    let bad_lb = r#"<?xml version="1.0"?>
<link:linkbase xmlns:link="http://www.xbrl.org/2003/linkbase"
    xmlns:xlink="http://www.w3.org/1999/xlink">
  <link:presentationLink xlink:type="extended" xlink:role="http://test/role/pres">
    <link:loc xlink:type="locator" xlink:href="hypercube.xsd#hc_Sales" xlink:label="sales"/>
    <link:loc xlink:type="locator" xlink:href="hypercube.xsd#hc_SalesEU" xlink:label="salesEU"/>
    <link:presentationArc xlink:type="arc"
        xlink:arcrole="http://www.xbrl.org/2003/arcrole/parent-child"
        xlink:from="sales" xlink:to="salesEU" use="sometimes"/>
  </link:presentationLink>
</link:linkbase>
"#;
    let mut documents = dimensional_documents();
    documents.push(("http://test/bad-use.xml", bad_lb));
    let taxonomy = build_taxonomy(&documents, &[HC_XSD_URI, "http://test/bad-use.xml"]);

    let error = taxonomy.resolve_prohibition_and_overriding(&DefaultNetworkResolver).unwrap_err();
    assert!(error.to_string().contains("sometimes"), "{error}");
}

#[test]
fn relationship_filter_and_resolution_commute_here() {
    // Filtering to presentation relationships before or after resolution
    // gives the same surviving set on this fixture.
    let taxonomy = build_taxonomy(&presentation_documents(), &[HC_XSD_URI, PRES_LB_URI, PROHIBIT_LB_URI]);
    let is_parent_child = |r: &Relationship| {
        r.as_inter_concept().is_some_and(|ic| ic.kind() == InterConceptKind::ParentChild)
    };

    let filtered_then_resolved = taxonomy
        .filtering_relationships(is_parent_child)
        .resolve_prohibition_and_overriding(&DefaultNetworkResolver)
        .unwrap();
    let resolved_then_filtered = taxonomy
        .resolve_prohibition_and_overriding(&DefaultNetworkResolver)
        .unwrap()
        .filtering_relationships(is_parent_child);

    assert_eq!(
        filtered_then_resolved.relationships().len(),
        resolved_then_filtered.relationships().len()
    );
}
