mod support;

use std::sync::Arc;

use support::*;
use taxoquery::{CancelToken, CollectingDiagnostics, DtsCollector, DtsDiscoveryError};

#[test]
fn discovery_reaches_imports_and_linkbase_refs() {
    let collector = DtsCollector::discovering(mapped_builder(&dimensional_documents()));
    let documents = collector.collect(&[url(HC_XSD_URI)]).unwrap();

    let uris: Vec<&str> = documents.iter().map(|d| d.uri().as_str()).collect();
    // Entry point first, then first-seen order.
    assert_eq!(uris[0], HC_XSD_URI);
    assert!(uris.contains(&XBRLI_XSD_URI), "import via xbrldt");
    assert!(uris.contains(&XBRLDT_XSD_URI), "direct import");
    assert!(uris.contains(&HC_DEF_URI), "linkbaseRef");
    assert!(uris.contains(&HC_LAB_URI), "linkbaseRef");
    assert_eq!(uris.len(), 5, "every document exactly once");
}

#[test]
fn discovery_follows_locator_hrefs_into_new_documents() {
    // The custom linkbase references hypercube.xsd only through its locator.
    let mut documents = dimensional_documents();
    documents.push((CUSTOM_LB_URI, CUSTOM_LB));
    let collector = DtsCollector::discovering(mapped_builder(&documents));
    let found = collector.collect(&[url(CUSTOM_LB_URI)]).unwrap();

    let uris: Vec<&str> = found.iter().map(|d| d.uri().as_str()).collect();
    assert_eq!(uris[0], CUSTOM_LB_URI);
    assert!(uris.contains(&HC_XSD_URI));
    // And transitively everything the schema references.
    assert_eq!(uris.len(), 6);
}

#[test]
fn trivial_strategy_fetches_exactly_the_given_uris() {
    let collector = DtsCollector::trivial(mapped_builder(&dimensional_documents()));
    let documents = collector.collect(&[url(HC_XSD_URI), url(HC_DEF_URI)]).unwrap();
    let uris: Vec<&str> = documents.iter().map(|d| d.uri().as_str()).collect();
    assert_eq!(uris, vec![HC_XSD_URI, HC_DEF_URI]);
}

#[test]
fn strict_discovery_fails_on_missing_documents() {
    // Drop xbrldt.xsd from the mapped set.
    let documents: Vec<_> = dimensional_documents()
        .into_iter()
        .filter(|(uri, _)| *uri != XBRLDT_XSD_URI)
        .collect();
    let collector = DtsCollector::discovering(mapped_builder(&documents));
    let error = collector.collect(&[url(HC_XSD_URI)]).unwrap_err();
    match error {
        DtsDiscoveryError::Document { uri, .. } => assert_eq!(uri.as_str(), XBRLDT_XSD_URI),
        DtsDiscoveryError::Cancelled => panic!("unexpected cancellation"),
    }
}

#[test]
fn lenient_discovery_skips_missing_documents_with_a_warning() {
    let documents: Vec<_> = dimensional_documents()
        .into_iter()
        .filter(|(uri, _)| *uri != XBRLDT_XSD_URI)
        .collect();
    let diagnostics = CollectingDiagnostics::new();
    let collector = DtsCollector::discovering(mapped_builder(&documents))
        .lenient(true)
        .with_diagnostics(diagnostics.clone());
    let found = collector.collect(&[url(HC_XSD_URI)]).unwrap();

    assert_eq!(found.len(), 4);
    let warnings = diagnostics.messages();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains(XBRLDT_XSD_URI), "{}", warnings[0]);
}

#[test]
fn cancellation_discards_partial_state() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let collector =
        DtsCollector::discovering(mapped_builder(&dimensional_documents())).with_cancel_token(cancel);
    let error = collector.collect(&[url(HC_XSD_URI)]).unwrap_err();
    assert!(matches!(error, DtsDiscoveryError::Cancelled));
}

#[test]
fn fragments_are_stripped_before_deduplication() {
    let collector = DtsCollector::trivial(mapped_builder(&dimensional_documents()));
    let with_fragment = url(&format!("{HC_XSD_URI}#hc_Sales"));
    let documents = collector.collect(&[with_fragment, url(HC_XSD_URI)]).unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].uri().as_str(), HC_XSD_URI);
}

#[test]
fn diagnostics_sink_is_shared_across_arcs_and_documents() {
    // A locator to a missing fragment surfaces as a warning in lenient mode
    // when the factory runs; here we just make sure the Arc sink plumbs
    // through the collector untouched.
    let diagnostics = CollectingDiagnostics::new();
    let collector = DtsCollector::discovering(mapped_builder(&dimensional_documents()))
        .lenient(true)
        .with_diagnostics(Arc::clone(&diagnostics) as Arc<dyn taxoquery::Diagnostics>);
    collector.collect(&[url(HC_XSD_URI)]).unwrap();
    assert!(diagnostics.messages().is_empty());
}
