//! Location path evaluation
//!
//! Each step walks its axis from every context node, applies the node test and
//! then the predicates (positions are proximity positions on the axis). The
//! nodes of a step are de-duplicated and put in document order before the next
//! step runs.

use std::collections::{HashMap, HashSet};

use super::selectors::{parse_expression, Axis, LocationPath, NodeTest, PathStep};
use crate::dom::node::{Node, NodeId, NodeKind};
use crate::error::Result;
use crate::namespaces::XMLNS_NAMESPACE;

/// Evaluate an expression against a context node
///
/// The result is de-duplicated and in document order.
pub fn evaluate(context: &Node, expr: &str) -> Result<Vec<Node>> {
    let paths = parse_expression(expr)?;
    let evaluator = Evaluator::new(context);

    let mut seen = HashSet::new();
    let mut results = Vec::new();
    for path in &paths {
        for node in evaluator.evaluate_path(context, path) {
            add_node(node, &mut seen, &mut results);
        }
    }
    evaluator.sort(&mut results);
    Ok(results)
}

struct Evaluator {
    /// Document position of every attached node of the context tree
    order: HashMap<NodeId, usize>,
}

impl Evaluator {
    fn new(context: &Node) -> Self {
        Self {
            order: context.tree().with(|t| t.document_order()),
        }
    }

    fn evaluate_path(&self, context: &Node, path: &LocationPath) -> Vec<Node> {
        let mut current = if path.absolute {
            vec![context.tree().document()]
        } else {
            vec![context.clone()]
        };

        for step in &path.steps {
            let mut seen = HashSet::new();
            let mut next = Vec::new();
            for node in &current {
                for found in self.evaluate_step(node, step) {
                    add_node(found, &mut seen, &mut next);
                }
            }
            self.sort(&mut next);
            current = next;
        }
        current
    }

    fn evaluate_step(&self, node: &Node, step: &PathStep) -> Vec<Node> {
        let mut candidates: Vec<Node> = collect_axis(node, step.axis)
            .into_iter()
            .filter(|candidate| matches_test(candidate, step.axis, &step.test))
            .collect();

        for predicate in &step.predicates {
            let size = candidates.len();
            candidates = candidates
                .into_iter()
                .enumerate()
                .filter(|(i, candidate)| predicate.matches(candidate, i + 1, size))
                .map(|(_, candidate)| candidate)
                .collect();
        }
        candidates
    }

    /// Stable sort into document order; detached nodes keep their relative order at the end
    fn sort(&self, nodes: &mut [Node]) {
        nodes.sort_by_key(|node| self.order.get(&node.id()).copied().unwrap_or(usize::MAX));
    }
}

fn add_node(node: Node, seen: &mut HashSet<Node>, results: &mut Vec<Node>) {
    if seen.insert(node.clone()) {
        results.push(node);
    }
}

/// Nodes on `axis` from `node`, in proximity order
fn collect_axis(node: &Node, axis: Axis) -> Vec<Node> {
    match axis {
        Axis::Child => node.children(),
        Axis::Attribute => collect_attributes(node),
        Axis::Self_ => vec![node.clone()],
        Axis::Parent => node.parent().into_iter().collect(),
        Axis::Descendant => collect_descendants(node),
        Axis::DescendantOrSelf => {
            let mut results = vec![node.clone()];
            results.extend(collect_descendants(node));
            results
        }
        Axis::Ancestor => collect_ancestors(node),
        Axis::AncestorOrSelf => {
            let mut results = vec![node.clone()];
            results.extend(collect_ancestors(node));
            results
        }
        Axis::FollowingSibling => collect_siblings(node, true),
        Axis::PrecedingSibling => collect_siblings(node, false),
    }
}

fn collect_attributes(node: &Node) -> Vec<Node> {
    node.attributes()
        .into_iter()
        .filter(|attr| attr.namespace_uri().as_deref() != Some(XMLNS_NAMESPACE))
        .collect()
}

fn collect_descendants(node: &Node) -> Vec<Node> {
    let mut results = Vec::new();
    let mut stack: Vec<Node> = node.children().into_iter().rev().collect();
    while let Some(current) = stack.pop() {
        stack.extend(current.children().into_iter().rev());
        results.push(current);
    }
    results
}

fn collect_ancestors(node: &Node) -> Vec<Node> {
    let mut results = Vec::new();
    let mut current = node.parent();
    while let Some(parent) = current {
        current = parent.parent();
        results.push(parent);
    }
    results
}

fn collect_siblings(node: &Node, following: bool) -> Vec<Node> {
    if node.kind() == NodeKind::Attribute {
        return Vec::new();
    }
    let Some(parent) = node.parent() else {
        return Vec::new();
    };
    let siblings = parent.children();
    let Some(index) = siblings.iter().position(|s| s == node) else {
        return Vec::new();
    };
    if following {
        siblings[index + 1..].to_vec()
    } else {
        siblings[..index].iter().rev().cloned().collect()
    }
}

fn matches_test(node: &Node, axis: Axis, test: &NodeTest) -> bool {
    let principal = if axis == Axis::Attribute {
        NodeKind::Attribute
    } else {
        NodeKind::Element
    };
    match test {
        NodeTest::Node => true,
        NodeTest::Text => matches!(node.kind(), NodeKind::Text | NodeKind::CData),
        NodeTest::Comment => node.kind() == NodeKind::Comment,
        NodeTest::AnyName => node.kind() == principal,
        NodeTest::Name(name) => {
            node.kind() == principal && node.name().as_deref() == Some(name.as_str())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parser::parse;
    use crate::dom::tree::Tree;

    const DOC: &str = r#"<doc source="s">Hello <bold style="blinking">World</bold>!<br/><bold>Cool</bold><struct><name>John</name><last>Doe</last></struct></doc>"#;

    fn root() -> Node {
        parse(DOC).unwrap().document_element().unwrap()
    }

    fn names(nodes: &[Node]) -> Vec<String> {
        nodes
            .iter()
            .map(|n| n.name().or_else(|| n.value()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_child_and_position() {
        let root = root();
        assert_eq!(names(&evaluate(&root, "bold").unwrap()), vec!["bold", "bold"]);
        let second = evaluate(&root, "bold[2]").unwrap();
        assert_eq!(second[0].text_content(), "Cool");
        let last = evaluate(&root, "bold[last()]").unwrap();
        assert_eq!(last, second);
        assert!(evaluate(&root, "bold[3]").unwrap().is_empty());
    }

    #[test]
    fn test_wildcards_and_attributes() {
        let root = root();
        assert_eq!(
            names(&evaluate(&root, "*").unwrap()),
            vec!["bold", "br", "bold", "struct"]
        );
        assert_eq!(names(&evaluate(&root, "@source").unwrap()), vec!["source"]);
        assert_eq!(
            names(&evaluate(&root, "//@*").unwrap()),
            vec!["source", "style"]
        );
    }

    #[test]
    fn test_absolute_and_descendant() {
        let root = root();
        let struct_node = evaluate(&root, "struct").unwrap().remove(0);
        // Absolute paths ignore the context node
        assert_eq!(names(&evaluate(&struct_node, "/doc/bold").unwrap()), vec!["bold", "bold"]);
        assert_eq!(names(&evaluate(&root, "//name").unwrap()), vec!["name"]);
        assert_eq!(names(&evaluate(&root, "struct/*").unwrap()), vec!["name", "last"]);
        assert_eq!(names(&evaluate(&struct_node, "..").unwrap()), vec!["doc"]);
        assert_eq!(evaluate(&root, "/").unwrap(), vec![root.tree().document()]);
    }

    #[test]
    fn test_text_nodes() {
        let root = root();
        assert_eq!(names(&evaluate(&root, "text()").unwrap()), vec!["Hello ", "!"]);
        assert_eq!(
            names(&evaluate(&root, "bold/text()").unwrap()),
            vec!["World", "Cool"]
        );
    }

    #[test]
    fn test_predicates_on_content() {
        let root = root();
        let styled = evaluate(&root, "bold[@style='blinking']").unwrap();
        assert_eq!(styled.len(), 1);
        assert_eq!(styled[0].text_content(), "World");
        assert_eq!(evaluate(&root, "bold[@style]").unwrap(), styled);
        assert_eq!(evaluate(&root, "bold[.='Cool']").unwrap().len(), 1);
        assert_eq!(names(&evaluate(&root, "*[name='John']").unwrap()), vec!["struct"]);
        assert_eq!(evaluate(&root, "*[position() > 2]").unwrap().len(), 2);
    }

    #[test]
    fn test_reverse_axes_use_proximity_positions() {
        let root = root();
        let last = evaluate(&root, "struct/last").unwrap().remove(0);
        assert_eq!(names(&evaluate(&last, "preceding-sibling::*[1]").unwrap()), vec!["name"]);
        assert_eq!(names(&evaluate(&last, "ancestor::*").unwrap()), vec!["doc", "struct"]);
        assert_eq!(names(&evaluate(&last, "ancestor::*[1]").unwrap()), vec!["struct"]);
    }

    #[test]
    fn test_union_in_document_order() {
        let root = root();
        assert_eq!(
            names(&evaluate(&root, "struct | bold").unwrap()),
            vec!["bold", "bold", "struct"]
        );
    }

    #[test]
    fn test_namespace_declarations_are_not_attributes() {
        let tree = parse(r#"<r xmlns:x="urn:x" x:a="1"/>"#).unwrap();
        let root = tree.document_element().unwrap();
        assert_eq!(names(&evaluate(&root, "@*").unwrap()), vec!["x:a"]);
    }

    #[test]
    fn test_detached_context() {
        let tree = Tree::new();
        let elem = tree.create_element("e", None);
        let child = tree.create_element("c", None);
        tree.append_child(&elem, &child).unwrap();
        assert_eq!(evaluate(&elem, "c").unwrap(), vec![child]);
    }

    #[test]
    fn test_invalid_expressions() {
        let root = root();
        assert!(evaluate(&root, "").is_err());
        assert!(evaluate(&root, "bold[").is_err());
        assert!(evaluate(&root, "count(bold)").is_err());
    }
}
