//! Arena-backed implementation of the host document protocol.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::debug;

use jobfill_protocols::{
    Document, DomError, ElementRef, ElementSnapshot, EventKind, NodeSnapshot, PageId,
    PageInstance, SelectOption, SyntheticEvent,
};

use crate::snapshot::{ElementSpec, NodeSpec, PageSnapshot};

/// Page ids are unique across all documents of the process, so a handle from
/// one document is never accepted by another.
static NEXT_PAGE_ID: AtomicU64 = AtomicU64::new(1);

fn next_page_id() -> PageId {
    PageId(NEXT_PAGE_ID.fetch_add(1, Ordering::Relaxed))
}

/// One event observed by a listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredEvent {
    /// Node the listener is bound on.
    pub listener: ElementRef,
    /// Node the event was dispatched on.
    pub target: ElementRef,
    pub kind: EventKind,
}

#[derive(Debug)]
struct ElementData {
    tag: String,
    attrs: BTreeMap<String, String>,
    value: String,
    checked: bool,
    selected: Option<usize>,
    controlled: bool,
    /// Root node of the embedded document, for accessible frames.
    frame_root: Option<usize>,
}

#[derive(Debug)]
enum NodeData {
    Element(ElementData),
    Text(String),
}

#[derive(Debug)]
struct Node {
    data: NodeData,
    parent: Option<usize>,
    children: Vec<usize>,
    /// Frame element owning this node, set on frame document roots only.
    frame_owner: Option<usize>,
}

#[derive(Debug)]
struct Tree {
    page: PageInstance,
    nodes: Vec<Node>,
    root: usize,
    listeners: HashMap<usize, Vec<EventKind>>,
    delivered: Vec<DeliveredEvent>,
    dispatched: Vec<(ElementRef, EventKind)>,
    clicks: Vec<ElementRef>,
    click_navigations: HashMap<usize, PageSnapshot>,
}

impl Tree {
    fn build(snapshot: &PageSnapshot) -> Self {
        let mut tree = Tree {
            page: PageInstance {
                id: next_page_id(),
                url: snapshot.url.clone(),
            },
            nodes: Vec::new(),
            root: 0,
            listeners: HashMap::new(),
            delivered: Vec::new(),
            dispatched: Vec::new(),
            clicks: Vec::new(),
            click_navigations: HashMap::new(),
        };
        tree.root = tree.insert(&snapshot.root, None);
        tree
    }

    fn handle(&self, node: usize) -> ElementRef {
        ElementRef::new(self.page.id, node)
    }

    /// Resolve a handle against the current page.
    fn resolve(&self, node: ElementRef) -> Option<usize> {
        (node.page() == self.page.id && node.node() < self.nodes.len()).then_some(node.node())
    }

    fn insert(&mut self, spec: &NodeSpec, parent: Option<usize>) -> usize {
        let id = self.nodes.len();
        match spec {
            NodeSpec::Text(text) => {
                self.nodes.push(Node {
                    data: NodeData::Text(text.clone()),
                    parent,
                    children: Vec::new(),
                    frame_owner: None,
                });
            }
            NodeSpec::Element(element) => {
                self.nodes.push(Node {
                    data: NodeData::Element(ElementData {
                        tag: element.tag.to_lowercase(),
                        attrs: element.attrs.clone(),
                        value: String::new(),
                        checked: element.attrs.contains_key("checked"),
                        selected: None,
                        controlled: element.controlled,
                        frame_root: None,
                    }),
                    parent,
                    children: Vec::new(),
                    frame_owner: None,
                });
                for child in &element.children {
                    let child_id = self.insert(child, Some(id));
                    self.nodes[id].children.push(child_id);
                }
                self.attach_frame(id, element);
                self.init_form_state(id);
            }
        }
        id
    }

    fn attach_frame(&mut self, id: usize, element: &ElementSpec) {
        let Some(frame) = &element.frame else {
            return;
        };
        if !frame.same_origin {
            return;
        }
        let frame_root = self.insert(&frame.document, None);
        self.nodes[frame_root].frame_owner = Some(id);
        if let NodeData::Element(data) = &mut self.nodes[id].data {
            data.frame_root = Some(frame_root);
        }
    }

    /// Initial value properties, the way a browser derives them from markup.
    fn init_form_state(&mut self, id: usize) {
        let (tag, initial_value) = match &self.nodes[id].data {
            NodeData::Element(data) => (data.tag.clone(), data.attrs.get("value").cloned()),
            NodeData::Text(_) => return,
        };
        match tag.as_str() {
            "textarea" => {
                let text = self.text_content(id);
                self.set_value_raw(id, text);
            }
            "select" => {
                let options = self.options(id);
                let selected = self
                    .option_nodes(id)
                    .iter()
                    .position(|&n| self.attr(n, "selected").is_some())
                    .or(if options.is_empty() { None } else { Some(0) });
                if let NodeData::Element(data) = &mut self.nodes[id].data {
                    data.selected = selected;
                    data.value = selected
                        .and_then(|i| options.get(i))
                        .map(|o| o.value.clone())
                        .unwrap_or_default();
                }
            }
            _ => {
                if let Some(value) = initial_value {
                    self.set_value_raw(id, value);
                }
            }
        }
    }

    fn set_value_raw(&mut self, id: usize, value: String) {
        if let NodeData::Element(data) = &mut self.nodes[id].data {
            data.value = value;
        }
    }

    fn element(&self, id: usize) -> Option<&ElementData> {
        match &self.nodes[id].data {
            NodeData::Element(data) => Some(data),
            NodeData::Text(_) => None,
        }
    }

    fn element_mut(&mut self, id: usize) -> Result<&mut ElementData, DomError> {
        match &mut self.nodes[id].data {
            NodeData::Element(data) => Ok(data),
            NodeData::Text(_) => Err(DomError::NotAnElement),
        }
    }

    fn attr(&self, id: usize, name: &str) -> Option<&str> {
        self.element(id)
            .and_then(|e| e.attrs.get(name))
            .map(String::as_str)
    }

    fn text_content(&self, id: usize) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out.trim().to_string()
    }

    fn collect_text(&self, id: usize, out: &mut String) {
        match &self.nodes[id].data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element(_) => {
                for &child in &self.nodes[id].children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// `<option>` descendants of a select, including those in `<optgroup>`.
    fn option_nodes(&self, id: usize) -> Vec<usize> {
        let mut out = Vec::new();
        for &child in &self.nodes[id].children {
            match self.element(child).map(|e| e.tag.as_str()) {
                Some("option") => out.push(child),
                Some("optgroup") => out.extend(
                    self.nodes[child]
                        .children
                        .iter()
                        .copied()
                        .filter(|&n| self.element(n).is_some_and(|e| e.tag == "option")),
                ),
                _ => {}
            }
        }
        out
    }

    fn options(&self, id: usize) -> Vec<SelectOption> {
        self.option_nodes(id)
            .into_iter()
            .map(|n| {
                let text = self.text_content(n);
                SelectOption {
                    value: self
                        .attr(n, "value")
                        .map(str::to_string)
                        .unwrap_or_else(|| text.clone()),
                    text,
                    disabled: self.attr(n, "disabled").is_some(),
                }
            })
            .collect()
    }

    fn is_attached(&self, mut id: usize) -> bool {
        loop {
            if id == self.root {
                return true;
            }
            let node = &self.nodes[id];
            match (node.parent, node.frame_owner) {
                (Some(parent), _) => id = parent,
                (None, Some(owner)) => id = owner,
                (None, None) => return false,
            }
        }
    }

    fn attached(&self, node: ElementRef) -> Result<usize, DomError> {
        self.resolve(node)
            .filter(|&id| self.is_attached(id))
            .ok_or(DomError::Detached)
    }

    /// Bubble path: target, then ancestors up to the owning document root.
    fn propagation_path(&self, id: usize, bubbles: bool) -> Vec<usize> {
        let mut path = vec![id];
        if bubbles {
            let mut current = self.nodes[id].parent;
            while let Some(parent) = current {
                path.push(parent);
                current = self.nodes[parent].parent;
            }
        }
        path
    }

    fn deliver(&mut self, id: usize, event: SyntheticEvent) {
        let target = self.handle(id);
        self.dispatched.push((target, event.kind));
        for node in self.propagation_path(id, event.bubbles) {
            let listening = self
                .listeners
                .get(&node)
                .is_some_and(|kinds| kinds.contains(&event.kind));
            if listening {
                self.delivered.push(DeliveredEvent {
                    listener: self.handle(node),
                    target,
                    kind: event.kind,
                });
            }
        }
    }
}

/// In-memory [`Document`].
///
/// All reads and writes go through one lock. The mutation counter is bumped
/// on structural and attribute changes and on navigation; value writes are
/// property changes and do not count as mutations.
pub struct MemoryDocument {
    tree: RwLock<Tree>,
    mutations: watch::Sender<u64>,
}

impl MemoryDocument {
    pub fn new(snapshot: &PageSnapshot) -> Self {
        let (mutations, _) = watch::channel(0);
        let doc = Self {
            tree: RwLock::new(Tree::build(snapshot)),
            mutations,
        };
        debug!(page = %doc.page().id, url = %snapshot.url, "Loaded document");
        doc
    }

    fn bump(&self) {
        self.mutations.send_modify(|count| *count += 1);
    }

    /// Replace the whole document, as a full navigation does.
    pub fn navigate(&self, snapshot: &PageSnapshot) {
        let page = {
            let mut tree = self.tree.write();
            *tree = Tree::build(snapshot);
            tree.page.id
        };
        debug!(page = %page, url = %snapshot.url, "Navigated");
        self.bump();
    }

    /// Load `snapshot` when `node` is clicked.
    pub fn navigate_on_click(&self, node: ElementRef, snapshot: PageSnapshot) {
        let mut tree = self.tree.write();
        if let Some(id) = tree.resolve(node) {
            tree.click_navigations.insert(id, snapshot);
        }
    }

    /// Append a subtree under `parent`.
    pub fn append(
        &self,
        parent: ElementRef,
        spec: impl Into<NodeSpec>,
    ) -> Result<ElementRef, DomError> {
        let spec = spec.into();
        let handle = {
            let mut tree = self.tree.write();
            let parent = tree.attached(parent)?;
            tree.element(parent).ok_or(DomError::NotAnElement)?;
            let id = tree.insert(&spec, Some(parent));
            tree.nodes[parent].children.push(id);
            tree.handle(id)
        };
        self.bump();
        Ok(handle)
    }

    /// Remove a node from its parent. Handles into the subtree become stale.
    pub fn detach(&self, node: ElementRef) -> Result<(), DomError> {
        {
            let mut tree = self.tree.write();
            let id = tree.attached(node)?;
            if let Some(parent) = tree.nodes[id].parent.take() {
                tree.nodes[parent].children.retain(|&c| c != id);
            } else if id == tree.root {
                return Err(DomError::Unsupported("cannot detach the document root".into()));
            }
        }
        self.bump();
        Ok(())
    }

    pub fn set_attribute(&self, node: ElementRef, name: &str, value: &str) -> Result<(), DomError> {
        {
            let mut tree = self.tree.write();
            let id = tree.attached(node)?;
            tree.element_mut(id)?
                .attrs
                .insert(name.to_lowercase(), value.to_string());
        }
        self.bump();
        Ok(())
    }

    pub fn remove_attribute(&self, node: ElementRef, name: &str) -> Result<(), DomError> {
        {
            let mut tree = self.tree.write();
            let id = tree.attached(node)?;
            tree.element_mut(id)?.attrs.remove(&name.to_lowercase());
        }
        self.bump();
        Ok(())
    }

    /// Bind a listener for `kind` on `node`.
    pub fn listen(&self, node: ElementRef, kind: EventKind) {
        let mut tree = self.tree.write();
        if let Some(id) = tree.resolve(node) {
            tree.listeners.entry(id).or_default().push(kind);
        }
    }

    /// Events observed by listeners, in delivery order.
    pub fn delivered_events(&self) -> Vec<DeliveredEvent> {
        self.tree.read().delivered.clone()
    }

    /// Every event dispatched on the current page, by target.
    pub fn dispatched_events(&self) -> Vec<(ElementRef, EventKind)> {
        self.tree.read().dispatched.clone()
    }

    /// Elements clicked on the current page. A click that navigates starts a
    /// fresh page, so it is not listed here.
    pub fn clicks(&self) -> Vec<ElementRef> {
        self.tree.read().clicks.clone()
    }

    /// First element, in document order, whose `id` attribute equals `id`.
    /// Searches same-origin frames too.
    pub fn find_by_id(&self, id: &str) -> Option<ElementRef> {
        self.find(|data| data.attrs.get("id").is_some_and(|v| v == id))
    }

    /// First element, in document order, whose text content contains `text`.
    pub fn find_by_text(&self, tag: &str, text: &str) -> Option<ElementRef> {
        let tree = self.tree.read();
        let mut stack = vec![tree.root];
        while let Some(id) = stack.pop() {
            if tree.element(id).is_some_and(|e| e.tag == tag) && tree.text_content(id).contains(text)
            {
                return Some(tree.handle(id));
            }
            push_children(&tree, id, &mut stack);
        }
        None
    }

    fn find(&self, predicate: impl Fn(&ElementData) -> bool) -> Option<ElementRef> {
        let tree = self.tree.read();
        let mut stack = vec![tree.root];
        while let Some(id) = stack.pop() {
            if tree.element(id).is_some_and(&predicate) {
                return Some(tree.handle(id));
            }
            push_children(&tree, id, &mut stack);
        }
        None
    }
}

/// Push children (and an accessible frame root) in reverse so the stack pops
/// in document order.
fn push_children(tree: &Tree, id: usize, stack: &mut Vec<usize>) {
    if let Some(frame_root) = tree.element(id).and_then(|e| e.frame_root) {
        stack.push(frame_root);
    }
    stack.extend(tree.nodes[id].children.iter().rev());
}

/// Hidden by the element's own attribute or inline style.
fn own_style_hidden(attrs: &BTreeMap<String, String>) -> bool {
    if attrs.contains_key("hidden") {
        return true;
    }
    let Some(style) = attrs.get("style") else {
        return false;
    };
    let style: String = style
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    style
        .split(';')
        .any(|decl| decl == "display:none" || decl == "visibility:hidden")
}

impl Document for MemoryDocument {
    fn page(&self) -> PageInstance {
        self.tree.read().page.clone()
    }

    fn root(&self) -> ElementRef {
        let tree = self.tree.read();
        tree.handle(tree.root)
    }

    fn node(&self, node: ElementRef) -> Option<NodeSnapshot> {
        let tree = self.tree.read();
        let id = tree.resolve(node)?;
        Some(match &tree.nodes[id].data {
            NodeData::Text(text) => NodeSnapshot::Text(text.clone()),
            NodeData::Element(data) => NodeSnapshot::Element(ElementSnapshot {
                tag: data.tag.clone(),
                attributes: data.attrs.clone(),
                value: data.value.clone(),
                checked: data.checked,
                options: if data.tag == "select" {
                    tree.options(id)
                } else {
                    Vec::new()
                },
                selected_index: data.selected,
                hidden: own_style_hidden(&data.attrs),
            }),
        })
    }

    fn children(&self, node: ElementRef) -> Vec<ElementRef> {
        let tree = self.tree.read();
        tree.resolve(node)
            .map(|id| tree.nodes[id].children.iter().map(|&c| tree.handle(c)).collect())
            .unwrap_or_default()
    }

    fn frame_root(&self, frame: ElementRef) -> Option<ElementRef> {
        let tree = self.tree.read();
        let id = tree.resolve(frame)?;
        tree.element(id)?.frame_root.map(|root| tree.handle(root))
    }

    fn is_attached(&self, node: ElementRef) -> bool {
        let tree = self.tree.read();
        tree.resolve(node).is_some_and(|id| tree.is_attached(id))
    }

    fn set_value(&self, node: ElementRef, value: &str) -> Result<(), DomError> {
        let mut tree = self.tree.write();
        let id = tree.attached(node)?;
        let data = tree.element_mut(id)?;
        match data.tag.as_str() {
            "input" | "textarea" => {}
            other => return Err(DomError::Unsupported(format!("set value on <{other}>"))),
        }
        if data.controlled {
            debug!(node = id, "Controlled input ignored programmatic value");
            return Ok(());
        }
        data.value = value.to_string();
        Ok(())
    }

    fn set_checked(&self, node: ElementRef, checked: bool) -> Result<(), DomError> {
        let mut tree = self.tree.write();
        let id = tree.attached(node)?;
        let data = tree.element_mut(id)?;
        if data.controlled {
            return Ok(());
        }
        data.checked = checked;
        let radio_group = (data.tag == "input"
            && data
                .attrs
                .get("type")
                .is_some_and(|t| t.eq_ignore_ascii_case("radio"))
            && checked)
            .then(|| data.attrs.get("name").cloned())
            .flatten();

        // Checking a radio unchecks the rest of its named group.
        if let Some(name) = radio_group {
            let root = {
                let mut current = id;
                while let Some(parent) = tree.nodes[current].parent {
                    current = parent;
                }
                current
            };
            let mut stack = vec![root];
            while let Some(n) = stack.pop() {
                if n != id {
                    if let NodeData::Element(other) = &mut tree.nodes[n].data {
                        let same_group = other.attrs.get("name") == Some(&name)
                            && other
                                .attrs
                                .get("type")
                                .is_some_and(|t| t.eq_ignore_ascii_case("radio"));
                        if same_group {
                            other.checked = false;
                        }
                    }
                }
                stack.extend(tree.nodes[n].children.iter().copied());
            }
        }
        Ok(())
    }

    fn select_index(&self, node: ElementRef, index: usize) -> Result<(), DomError> {
        let mut tree = self.tree.write();
        let id = tree.attached(node)?;
        let options = tree.options(id);
        let data = tree.element_mut(id)?;
        if data.tag != "select" {
            return Err(DomError::Unsupported(format!("select option on <{}>", data.tag)));
        }
        let option = options.get(index).ok_or(DomError::OptionOutOfRange {
            index,
            len: options.len(),
        })?;
        if data.controlled {
            return Ok(());
        }
        data.selected = Some(index);
        data.value = option.value.clone();
        Ok(())
    }

    fn dispatch(&self, node: ElementRef, event: SyntheticEvent) -> Result<(), DomError> {
        let mut tree = self.tree.write();
        let id = tree.attached(node)?;
        tree.deliver(id, event);
        Ok(())
    }

    fn click(&self, node: ElementRef) -> Result<(), DomError> {
        let navigated = {
            let mut tree = self.tree.write();
            let id = tree.attached(node)?;
            let handle = tree.handle(id);
            tree.clicks.push(handle);
            tree.deliver(id, SyntheticEvent::bubbling(EventKind::Click));
            match tree.click_navigations.remove(&id) {
                Some(snapshot) => {
                    *tree = Tree::build(&snapshot);
                    Some(tree.page.clone())
                }
                None => None,
            }
        };
        if let Some(page) = navigated {
            debug!(page = %page.id, url = %page.url, "Click navigated");
            self.bump();
        }
        Ok(())
    }

    fn mutations(&self) -> watch::Receiver<u64> {
        self.mutations.subscribe()
    }
}
