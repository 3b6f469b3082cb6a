//! A small retained scene graph: elements with attributes, inline styles,
//! text, an optional bound datum, and HTML serialization.

use crate::model::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Pointer entered or moved over an element, in page coordinates.
    Move { x: f64, y: f64 },
    Leave,
}

#[derive(Debug, Clone, PartialEq)]
enum Content {
    None,
    Text(String),
    /// Trusted markup, written as-is.
    Html(String),
}

#[derive(Debug, Clone)]
pub struct Element {
    pub tag: String,
    attrs: Vec<(String, String)>,
    styles: Vec<(String, String)>,
    content: Content,
    datum: Option<NodeId>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            styles: Vec::new(),
            content: Content::None,
            datum: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn style(&self, name: &str) -> Option<&str> {
        self.styles
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Content::Text(t) | Content::Html(t) => Some(t),
            Content::None => None,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }
}

fn upsert(list: &mut Vec<(String, String)>, name: &str, value: String) {
    match list.iter_mut().find(|(k, _)| k == name) {
        Some(slot) => slot.1 = value,
        None => list.push((name.to_string(), value)),
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Element>,
    body: ElementId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            elements: vec![Element::new("body")],
            body: ElementId(0),
        }
    }

    pub fn body(&self) -> ElementId {
        self.body
    }

    pub fn create(&mut self, tag: &str) -> ElementId {
        self.elements.push(Element::new(tag));
        ElementId(self.elements.len() - 1)
    }

    pub fn append(&mut self, parent: ElementId, child: ElementId) {
        self.elements[child.0].parent = Some(parent);
        self.elements[parent.0].children.push(child);
    }

    /// Create an element and append it to `parent` in one step.
    pub fn append_new(&mut self, parent: ElementId, tag: &str) -> ElementId {
        let id = self.create(tag);
        self.append(parent, id);
        id
    }

    pub fn get(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    pub fn set_attr(&mut self, id: ElementId, name: &str, value: impl ToString) -> &mut Self {
        upsert(&mut self.elements[id.0].attrs, name, value.to_string());
        self
    }

    pub fn set_style(&mut self, id: ElementId, name: &str, value: impl ToString) -> &mut Self {
        upsert(&mut self.elements[id.0].styles, name, value.to_string());
        self
    }

    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) -> &mut Self {
        self.elements[id.0].content = Content::Text(text.into());
        self
    }

    pub fn set_html(&mut self, id: ElementId, html: impl Into<String>) -> &mut Self {
        self.elements[id.0].content = Content::Html(html.into());
        self
    }

    pub fn bind(&mut self, id: ElementId, datum: NodeId) {
        self.elements[id.0].datum = Some(datum);
    }

    pub fn datum(&self, id: ElementId) -> Option<NodeId> {
        self.elements[id.0].datum
    }

    /// Element attached to the tree with the given `id` attribute.
    pub fn by_id(&self, id: &str) -> Option<ElementId> {
        self.descendants(self.body)
            .into_iter()
            .find(|e| self.get(*e).attr("id") == Some(id))
    }

    /// Attached elements carrying `class`, in document order.
    pub fn select_class(&self, class: &str) -> Vec<ElementId> {
        self.descendants(self.body)
            .into_iter()
            .filter(|e| self.get(*e).has_class(class))
            .collect()
    }

    pub fn select_tag(&self, root: ElementId, tag: &str) -> Vec<ElementId> {
        self.descendants(root)
            .into_iter()
            .filter(|e| self.get(*e).tag == tag)
            .collect()
    }

    /// Everything below `root`, in document order.
    pub fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.get(root).children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.get(id).children.iter().rev().copied());
        }
        out
    }

    /// Serialize the body's children.
    pub fn to_html(&self) -> String {
        let mut out = String::with_capacity(4096);
        for child in &self.get(self.body).children {
            self.write_element(*child, 0, &mut out);
        }
        out
    }

    fn write_element(&self, id: ElementId, indent: usize, out: &mut String) {
        let el = self.get(id);
        let pad = "  ".repeat(indent);
        out.push_str(&pad);
        out.push('<');
        out.push_str(&el.tag);
        for (k, v) in &el.attrs {
            out.push_str(&format!(" {}=\"{}\"", k, escape_xml(v)));
        }
        if !el.styles.is_empty() {
            let style = el
                .styles
                .iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect::<Vec<_>>()
                .join("; ");
            out.push_str(&format!(" style=\"{}\"", escape_xml(&style)));
        }
        out.push('>');
        match &el.content {
            Content::Text(t) => out.push_str(&escape_xml(t)),
            Content::Html(h) => out.push_str(h),
            Content::None => {}
        }
        if !el.children.is_empty() {
            out.push('\n');
            for child in &el.children {
                self.write_element(*child, indent + 1, out);
            }
            out.push_str(&pad);
        }
        out.push_str(&format!("</{}>\n", el.tag));
    }
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
