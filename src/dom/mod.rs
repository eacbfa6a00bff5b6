//! Parsed markup: a small DOM arena with CSS selector queries.

mod html;
mod selector;

use std::fmt;

use indexmap::IndexMap;

use crate::Result;

pub(crate) use html::is_void_tag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: IndexMap<String, String>,
}

impl Element {
    pub(crate) fn has_class(&self, class_name: &str) -> bool {
        self.attrs
            .get("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class_name))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Dom {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
}

impl Dom {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                node_type: NodeType::Document,
            }],
            root: NodeId(0),
        }
    }

    fn create_node(&mut self, parent: NodeId, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            node_type,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub(crate) fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: String,
        attrs: IndexMap<String, String>,
    ) -> NodeId {
        self.create_node(parent, NodeType::Element(Element { tag_name, attrs }))
    }

    pub(crate) fn create_text(&mut self, parent: NodeId, text: String) -> NodeId {
        // Adjacent text merges, as in a browser-built tree.
        if let Some(last) = self.nodes[parent.0].children.last().copied() {
            if let NodeType::Text(existing) = &mut self.nodes[last.0].node_type {
                existing.push_str(&text);
                return last;
            }
        }
        self.create_node(parent, NodeType::Text(text))
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub(crate) fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes[node_id.0].parent
    }

    pub(crate) fn collect_elements_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        if matches!(self.nodes[node_id.0].node_type, NodeType::Element(_)) {
            out.push(node_id);
        }
        for child in &self.nodes[node_id.0].children {
            self.collect_elements_dfs(*child, out);
        }
    }

    pub(crate) fn collect_elements_descendants_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        for child in &self.nodes[node_id.0].children {
            self.collect_elements_dfs(*child, out);
        }
    }

    pub(crate) fn text_content(&self, node_id: NodeId) -> String {
        match &self.nodes[node_id.0].node_type {
            NodeType::Document | NodeType::Element(_) => {
                let mut out = String::new();
                for child in &self.nodes[node_id.0].children {
                    out.push_str(&self.text_content(*child));
                }
                out
            }
            NodeType::Text(text) => text.clone(),
        }
    }

    /// Serializes `node_id` back to markup. Attributes keep source order.
    pub(crate) fn dump_node(&self, node_id: NodeId) -> String {
        let mut out = String::new();
        self.dump_into(node_id, &mut out);
        out
    }

    fn dump_into(&self, node_id: NodeId, out: &mut String) {
        match &self.nodes[node_id.0].node_type {
            NodeType::Document => {
                for child in &self.nodes[node_id.0].children {
                    self.dump_into(*child, out);
                }
            }
            NodeType::Text(text) => out.push_str(&escape_html_text(text)),
            NodeType::Element(element) => {
                out.push('<');
                out.push_str(&element.tag_name);
                for (name, value) in &element.attrs {
                    out.push(' ');
                    out.push_str(name);
                    if !value.is_empty() {
                        out.push_str("=\"");
                        out.push_str(&escape_html_attr(value));
                        out.push('"');
                    }
                }
                out.push('>');
                if is_void_tag(&element.tag_name) {
                    return;
                }
                let raw_text_container = element.tag_name.eq_ignore_ascii_case("script")
                    || element.tag_name.eq_ignore_ascii_case("style");
                for child in &self.nodes[node_id.0].children {
                    match &self.nodes[child.0].node_type {
                        NodeType::Text(text) if raw_text_container => out.push_str(text),
                        _ => self.dump_into(*child, out),
                    }
                }
                out.push_str("</");
                out.push_str(&element.tag_name);
                out.push('>');
            }
        }
    }
}

pub(crate) fn escape_html_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

pub(crate) fn escape_html_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Markup parsed into a navigable tree. The top-level nodes of the markup
/// hang off an implicit document node.
#[derive(Clone)]
pub struct NodeList {
    dom: Dom,
}

impl NodeList {
    pub fn parse(markup: &str) -> Result<Self> {
        Ok(Self {
            dom: html::parse_html(markup)?,
        })
    }

    /// Number of top-level nodes.
    pub fn len(&self) -> usize {
        self.dom.nodes[self.dom.root.0].children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'_>> {
        self.dom.nodes[self.dom.root.0]
            .children
            .iter()
            .map(|id| NodeRef::new(self, *id))
    }

    pub(crate) fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef::new(self, id)
    }

    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeRef<'_>>> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    /// Every element matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeRef<'_>>> {
        Ok(self
            .dom
            .query_selector_all_from(self.dom.root, selector)?
            .into_iter()
            .map(|id| NodeRef::new(self, id))
            .collect())
    }

    pub fn text_content(&self) -> String {
        self.dom.text_content(self.dom.root)
    }

    pub fn to_markup(&self) -> String {
        self.dom.dump_node(self.dom.root)
    }
}

impl fmt::Debug for NodeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeList").field(&self.to_markup()).finish()
    }
}

/// A node inside a [`NodeList`].
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    list: &'a NodeList,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    fn new(list: &'a NodeList, id: NodeId) -> Self {
        Self { list, id }
    }

    pub(crate) fn id(&self) -> NodeId {
        self.id
    }

    fn dom(&self) -> &'a Dom {
        &self.list.dom
    }

    pub fn is_element(&self) -> bool {
        self.dom().element(self.id).is_some()
    }

    /// Lower-cased tag name, `None` for text nodes.
    pub fn tag_name(&self) -> Option<&'a str> {
        self.dom().tag_name(self.id)
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.dom()
            .element(self.id)
            .and_then(|element| element.attrs.get(&name.to_ascii_lowercase()))
            .map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.dom()
            .element(self.id)
            .into_iter()
            .flat_map(|element| element.attrs.iter())
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn has_class(&self, class_name: &str) -> bool {
        self.dom()
            .element(self.id)
            .is_some_and(|element| element.has_class(class_name))
    }

    pub fn text_content(&self) -> String {
        self.dom().text_content(self.id)
    }

    pub fn outer_html(&self) -> String {
        self.dom().dump_node(self.id)
    }

    pub fn inner_html(&self) -> String {
        self.children().map(|child| child.outer_html()).collect()
    }

    /// Parent element; `None` at the top level.
    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.dom()
            .parent(self.id)
            .filter(|parent| *parent != self.dom().root)
            .map(|parent| NodeRef::new(self.list, parent))
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let list = self.list;
        list.dom.nodes[self.id.0]
            .children
            .iter()
            .map(move |child| NodeRef::new(list, *child))
    }

    pub fn matches(&self, selector: &str) -> Result<bool> {
        self.dom().matches_selector(self.id, selector)
    }

    pub fn closest(&self, selector: &str) -> Result<Option<NodeRef<'a>>> {
        Ok(self
            .dom()
            .closest(self.id, selector)?
            .map(|id| NodeRef::new(self.list, id)))
    }

    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeRef<'a>>> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeRef<'a>>> {
        let list = self.list;
        Ok(self
            .dom()
            .query_selector_all_from(self.id, selector)?
            .into_iter()
            .map(|id| NodeRef::new(list, id))
            .collect())
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.outer_html())
    }
}
