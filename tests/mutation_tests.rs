//! Integration tests for in-place rewriting of documents

use pretty_assertions::assert_eq;
use xdoc::{Error, XDoc};

fn abc() -> XDoc {
    let mut doc = XDoc::new("test").unwrap();
    doc.elem_value("aaa", "1")
        .unwrap()
        .elem_value("bbb", "2")
        .unwrap()
        .elem_value("ccc", "3")
        .unwrap();
    doc
}

fn with_attr(mut doc: XDoc) -> XDoc {
    doc.attr("attr", 1).unwrap();
    doc
}

fn fragment(tag: &str, inner: &str) -> XDoc {
    let mut doc = XDoc::new(tag).unwrap();
    doc.attr("attr", 2)
        .unwrap()
        .value("start")
        .unwrap()
        .elem_value(inner, "inner")
        .unwrap()
        .value("end")
        .unwrap();
    doc
}

fn element(tag: &str, value: &str) -> XDoc {
    let mut doc = XDoc::new(tag).unwrap();
    doc.value(value).unwrap();
    doc
}

// ============================================================================
// Replacement
// ============================================================================

#[test]
fn test_replace_value() {
    let doc = abc();
    doc.at("bbb").replace_value("0").unwrap();
    assert_eq!(doc.at("bbb").contents(), "0");
}

#[test]
fn test_replace_with_text() {
    let doc = abc();
    doc.at("bbb").replace("empty").unwrap();
    assert_eq!(doc.to_string(), "<test><aaa>1</aaa>empty<ccc>3</ccc></test>");
}

#[test]
fn test_replace_with_document() {
    let doc = abc();
    doc.at("bbb").replace_with(&element("ddd", "0")).unwrap();
    assert_eq!(doc.to_string(), "<test><aaa>1</aaa><ddd>0</ddd><ccc>3</ccc></test>");
}

#[test]
fn test_replace_leaves_source_untouched() {
    let doc = abc();
    let source = element("ddd", "0");
    doc.at("bbb").replace_with(&source).unwrap();
    doc.at("ddd").value("1").unwrap();
    assert_eq!(source.to_string(), "<ddd>0</ddd>");
    assert_eq!(doc.at("ddd").contents(), "01");
}

#[test]
fn test_replace_root_element() {
    let mut doc = abc();
    doc.replace_with(&element("ddd", "0")).unwrap();
    assert_eq!(doc.to_string(), "<ddd>0</ddd>");
    assert_eq!(doc.name().unwrap(), "ddd");
}

#[test]
fn test_replace_with_empty_removes() {
    let doc = abc();
    doc.at("bbb").replace_with(&XDoc::EMPTY).unwrap();
    assert_eq!(doc.to_string(), "<test><aaa>1</aaa><ccc>3</ccc></test>");
}

#[test]
fn test_replace_with_nodes_returns_last() {
    let doc = abc();
    let last = doc.at("bbb").replace_with_nodes(&fragment("zzz", "xxx")).unwrap();
    assert_eq!(
        doc.to_string(),
        "<test><aaa>1</aaa>start<xxx>inner</xxx>end<ccc>3</ccc></test>"
    );
    assert_eq!(last.contents(), "end");
}

// ============================================================================
// Renaming
// ============================================================================

#[test]
fn test_rename_child() {
    let doc = with_attr(XDoc::new("test").unwrap());
    let mut builder = doc.copy();
    builder
        .elem_value("aaa", "1")
        .unwrap()
        .start("bbb")
        .unwrap()
        .attr("attr", 2)
        .unwrap()
        .value("2")
        .unwrap()
        .end()
        .unwrap()
        .elem_value("ccc", "3")
        .unwrap();

    doc.at("bbb").rename("foo").unwrap();
    assert_eq!(
        doc.to_string(),
        r#"<test attr="1"><aaa>1</aaa><foo attr="2">2</foo><ccc>3</ccc></test>"#
    );
}

#[test]
fn test_rename_root() {
    let mut doc = with_attr(abc());
    doc.rename("foo").unwrap();
    assert_eq!(
        doc.to_string(),
        r#"<foo attr="1"><aaa>1</aaa><bbb>2</bbb><ccc>3</ccc></foo>"#
    );
}

#[test]
fn test_rename_text_fails() {
    let doc = abc();
    let mut text = doc.at("aaa").at_index(0);
    assert_eq!(
        text.rename("x").unwrap_err(),
        Error::InvalidState("xdoc is not an element".to_string())
    );
}

// ============================================================================
// Relative insertion
// ============================================================================

#[test]
fn test_add_before_and_after() {
    let build = || {
        let mut doc = XDoc::new("root").unwrap();
        doc.elem("first").unwrap().elem("second").unwrap().elem("third").unwrap();
        doc
    };

    let doc = build();
    doc.at("second").add_before(&XDoc::new("node").unwrap()).unwrap();
    assert_eq!(doc.to_string(), "<root><first/><node/><second/><third/></root>");

    let doc = build();
    doc.at("second").add_after(&XDoc::new("node").unwrap()).unwrap();
    assert_eq!(doc.to_string(), "<root><first/><second/><node/><third/></root>");
}

#[test]
fn test_add_nodes_in_front() {
    let mut doc = with_attr(XDoc::new("test").unwrap());
    doc.elem_value("aaa", "1").unwrap();
    doc.add_nodes_in_front(&fragment("bbb", "ccc")).unwrap();
    assert_eq!(
        doc.to_string(),
        r#"<test attr="1">start<ccc>inner</ccc>end<aaa>1</aaa></test>"#
    );
}

#[test]
fn test_add_nodes() {
    let mut doc = with_attr(XDoc::new("test").unwrap());
    doc.elem_value("aaa", "1").unwrap();
    doc.add_nodes(&fragment("bbb", "ccc")).unwrap();
    assert_eq!(
        doc.to_string(),
        r#"<test attr="1"><aaa>1</aaa>start<ccc>inner</ccc>end</test>"#
    );
}

#[test]
fn test_add_nodes_after() {
    let doc = with_attr(abc());
    doc.at("bbb").add_nodes_after(&fragment("zzz", "xxx")).unwrap();
    assert_eq!(
        doc.to_string(),
        r#"<test attr="1"><aaa>1</aaa><bbb>2</bbb>start<xxx>inner</xxx>end<ccc>3</ccc></test>"#
    );
}

#[test]
fn test_add_nodes_before() {
    let doc = with_attr(abc());
    doc.at("bbb").add_nodes_before(&fragment("bbb", "xxx")).unwrap();
    assert_eq!(
        doc.to_string(),
        r#"<test attr="1"><aaa>1</aaa>start<xxx>inner</xxx>end<bbb>2</bbb><ccc>3</ccc></test>"#
    );
}

#[test]
fn test_add_text_after_and_before() {
    let doc = with_attr(abc());
    doc.at("bbb").add_value_after("zzz").unwrap();
    assert_eq!(
        doc.to_string(),
        r#"<test attr="1"><aaa>1</aaa><bbb>2</bbb>zzz<ccc>3</ccc></test>"#
    );

    let doc = with_attr(abc());
    doc.at("bbb").add_value_before("zzz").unwrap();
    assert_eq!(
        doc.to_string(),
        r#"<test attr="1"><aaa>1</aaa>zzz<bbb>2</bbb><ccc>3</ccc></test>"#
    );
}

#[test]
fn test_siblings_of_root_element_are_refused() {
    let mut doc = abc();
    let err = doc.add_after(&XDoc::new("node").unwrap()).unwrap_err();
    assert_eq!(err, Error::InvalidState("xdoc is top node".to_string()));
}

#[test]
fn test_add_all_keeps_selection_order() {
    let source = XDoc::load("<list><a/><b/><c/></list>");
    let doc = abc();
    doc.at("bbb").add_all_after(&source.elements()).unwrap();
    assert_eq!(
        doc.to_string(),
        "<test><aaa>1</aaa><bbb>2</bbb><a/><b/><c/><ccc>3</ccc></test>"
    );
}

// ============================================================================
// Removal
// ============================================================================

#[test]
fn test_remove_all_attributes_by_query() {
    let mut actual = XDoc::new("test").unwrap();
    actual
        .attr("attr", 1)
        .unwrap()
        .start("a")
        .unwrap()
        .attr("attr", 2)
        .unwrap()
        .start("aa")
        .unwrap()
        .attr("attr", 3)
        .unwrap()
        .attr("other", 4)
        .unwrap()
        .value("test")
        .unwrap()
        .end()
        .unwrap()
        .end()
        .unwrap();

    let mut expected = XDoc::new("test").unwrap();
    expected
        .start("a")
        .unwrap()
        .start("aa")
        .unwrap()
        .attr("other", 4)
        .unwrap()
        .value("test")
        .unwrap()
        .end()
        .unwrap()
        .end()
        .unwrap();

    actual.at("//@attr").remove_all().unwrap();
    assert_eq!(actual.to_string(), expected.to_string());
    assert_eq!(actual, expected);
}

#[test]
fn test_remove_leaves_cursor_empty() {
    let doc = abc();
    let mut bbb = doc.at("bbb");
    let result = bbb.remove().unwrap();
    assert!(result.is_empty());
    assert!(bbb.is_empty());
    assert_eq!(doc.to_string(), "<test><aaa>1</aaa><ccc>3</ccc></test>");
    assert!(matches!(bbb.remove(), Err(Error::Empty)));
}

#[test]
fn test_mutation_through_empty_cursor_fails() {
    let mut missing = abc().at("missing");
    assert!(matches!(missing.replace("x"), Err(Error::Empty)));
    assert!(matches!(missing.rename("x"), Err(Error::Empty)));
    assert!(matches!(missing.remove_all(), Err(Error::Empty)));
    assert!(matches!(missing.start("x"), Err(Error::Empty)));
}
