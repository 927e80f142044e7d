use rstest::rstest;
use taxoquery_core::{EName, QName, parse_document};
use url::Url;

fn uri(s: &str) -> Url {
    Url::parse(s).unwrap()
}

const DOC: &str = r#"<?xml version="1.0"?>
<root xmlns="urn:default" xmlns:a="urn:a" xml:base="sub/">
  <a:child id="first" a:kind="x">hello</a:child>
  <a:child id="second" xmlns:a="urn:a2" xml:base="deeper/">
    <grand xmlns="">text</grand>
  </a:child>
  <a:child>world</a:child>
</root>
"#;

#[test]
fn element_names_resolve_against_nested_scopes() {
    let doc = parse_document(uri("http://example.com/doc.xml"), DOC).unwrap();
    let root = doc.root_elem();
    assert_eq!(root.name(), &EName::of("urn:default", "root"));

    let children = root.child_elems();
    assert_eq!(children.len(), 3);
    assert_eq!(children[0].name(), &EName::of("urn:a", "child"));
    // The second child rebinds the prefix locally.
    assert_eq!(children[1].name(), &EName::of("urn:a2", "child"));

    // xmlns="" undeclares the default namespace.
    let grand = children[1].child_elems()[0].clone();
    assert_eq!(grand.name(), &EName::no_ns("grand"));
    assert_eq!(grand.scope().default_namespace(), None);
    assert_eq!(grand.scope().namespace_for_prefix("a"), Some("urn:a2"));
}

#[test]
fn attribute_names_ignore_default_namespace() {
    let doc = parse_document(uri("http://example.com/doc.xml"), DOC).unwrap();
    let first = doc.root_elem().child_elems()[0].clone();
    assert_eq!(first.attribute(&EName::of("urn:a", "kind")), Some("x"));
    assert_eq!(first.attribute_local("id"), Some("first"));
    assert_eq!(first.qname(), &QName::prefixed("a", "child"));
}

#[test]
fn xml_base_inherits_and_composes() {
    let doc = parse_document(uri("http://example.com/dir/doc.xml"), DOC).unwrap();
    let root = doc.root_elem();
    assert_eq!(root.base_uri().as_str(), "http://example.com/dir/sub/");
    let children = root.child_elems();
    assert_eq!(children[0].base_uri().as_str(), "http://example.com/dir/sub/");
    assert_eq!(children[1].base_uri().as_str(), "http://example.com/dir/sub/deeper/");
    // Children inherit the composed base.
    let grand = children[1].child_elems()[0].clone();
    assert_eq!(grand.base_uri().as_str(), "http://example.com/dir/sub/deeper/");
}

#[test]
fn fragment_keys_count_same_named_siblings() {
    let doc = parse_document(uri("http://example.com/doc.xml"), DOC).unwrap();
    let children = doc.root_elem().child_elems();

    let key0 = children[0].fragment_key();
    let key2 = children[2].fragment_key();
    assert_eq!(key0.path.last().unwrap(), &(EName::of("urn:a", "child"), 0));
    // The middle sibling is bound to urn:a2, so the third child is the
    // second element named {urn:a}child.
    assert_eq!(key2.path.last().unwrap(), &(EName::of("urn:a", "child"), 1));
    assert_ne!(key0, key2);

    // Rebuilding the same document text yields identical keys.
    let rebuilt = parse_document(uri("http://example.com/doc.xml"), DOC).unwrap();
    assert_eq!(rebuilt.root_elem().child_elems()[0].fragment_key(), key0);
}

#[test]
fn id_index_keeps_first_occurrence() {
    let text = r#"<r><a id="dup">one</a><b id="dup">two</b></r>"#;
    let doc = parse_document(uri("urn:ids"), text).unwrap();
    let found = doc.elem_by_id("dup").unwrap();
    assert_eq!(found.name(), &EName::no_ns("a"));
    assert!(doc.elem_by_id("missing").is_none());
}

#[test]
fn text_concatenates_descendants_in_document_order() {
    let text = r"<r>one <b>two</b> three</r>";
    let doc = parse_document(uri("urn:text"), text).unwrap();
    assert_eq!(doc.root_elem().text(), "one two three");
}

#[test]
fn document_order_follows_node_ids() {
    let doc = parse_document(uri("http://example.com/doc.xml"), DOC).unwrap();
    let all = doc.root_elem().descendant_or_self_elems();
    let mut ids: Vec<_> = all.iter().map(|e| e.node_id()).collect();
    let sorted = {
        let mut s = ids.clone();
        s.sort();
        s
    };
    assert_eq!(ids, sorted);
    ids.dedup();
    assert_eq!(ids.len(), all.len());
}

#[test]
fn unbound_prefix_is_a_parse_error() {
    let err = parse_document(uri("urn:bad"), "<x:r/>").unwrap_err();
    assert!(err.message.contains("unbound prefix"), "{}", err.message);
    assert_eq!(err.uri.as_str(), "urn:bad");
}

#[rstest]
#[case::unbound_prefix("<x:r/>")]
#[case::mismatched_end("<r><unclosed></r>")]
#[case::empty_input("")]
#[case::text_only("just text")]
#[case::two_roots("<a/><b/>")]
fn malformed_documents_are_rejected(#[case] text: &str) {
    assert!(parse_document(uri("urn:bad"), text).is_err());
}

#[test]
fn malformed_xml_reports_position() {
    let err = parse_document(uri("urn:bad"), "<r><unclosed></r>").unwrap_err();
    assert!(err.position > 0);
}

#[test]
fn xml_lang_is_inherited() {
    let text = r#"<r xml:lang="en"><child><deep/></child><other xml:lang="de"/></r>"#;
    let doc = parse_document(uri("urn:lang"), text).unwrap();
    let root = doc.root_elem();
    let deep = root.child_elems()[0].child_elems()[0].clone();
    assert_eq!(deep.language().as_deref(), Some("en"));
    assert_eq!(root.child_elems()[1].language().as_deref(), Some("de"));
}
