//! Boundary to the externally owned host tree.

use std::fmt;

use indexmap::IndexMap;

use crate::collections::ListenerTable;
use crate::element::{Listener, PropValue, NODE_VALUE};
use crate::error::FiberError;

/// Node creation and mutation primitives the commit phase drives.
///
/// Implementations own the host tree; the engine only holds node handles.
pub trait Host {
    type Node: Clone + PartialEq + fmt::Debug + 'static;

    fn create_element(&mut self, tag: &str) -> Result<Self::Node, FiberError>;
    fn create_text(&mut self) -> Result<Self::Node, FiberError>;
    fn set_property(
        &mut self,
        node: &Self::Node,
        name: &str,
        value: &PropValue,
    ) -> Result<(), FiberError>;
    fn remove_property(&mut self, node: &Self::Node, name: &str) -> Result<(), FiberError>;
    fn add_listener(
        &mut self,
        node: &Self::Node,
        event: &str,
        listener: &Listener,
    ) -> Result<(), FiberError>;
    fn remove_listener(
        &mut self,
        node: &Self::Node,
        event: &str,
        listener: &Listener,
    ) -> Result<(), FiberError>;
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), FiberError>;
    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), FiberError>;
}

pub type HostNodeId = usize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostNodeKind {
    Element(String),
    Text,
}

/// A mutation applied to a [`MemoryHost`], recorded in application order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostOp {
    CreateElement { id: HostNodeId, tag: String },
    CreateText { id: HostNodeId },
    SetProperty { id: HostNodeId, name: String },
    RemoveProperty { id: HostNodeId, name: String },
    AddListener { id: HostNodeId, event: String },
    RemoveListener { id: HostNodeId, event: String },
    AppendChild { parent: HostNodeId, child: HostNodeId },
    RemoveChild { parent: HostNodeId, child: HostNodeId },
}

struct HostNode {
    kind: HostNodeKind,
    properties: IndexMap<String, PropValue>,
    listeners: ListenerTable,
    children: Vec<HostNodeId>,
    parent: Option<HostNodeId>,
}

impl HostNode {
    fn new(kind: HostNodeKind) -> Self {
        Self {
            kind,
            properties: IndexMap::new(),
            listeners: ListenerTable::new(),
            children: Vec::new(),
            parent: None,
        }
    }
}

/// In-memory host tree with a mutation log.
///
/// Released node ids are never reused and the log grows until
/// [`MemoryHost::take_ops`] drains it, so long-running drivers should drain
/// it periodically.
#[derive(Default)]
pub struct MemoryHost {
    nodes: Vec<Option<HostNode>>, // FUTURE(no_std): migrate to arena-backed node storage.
    ops: Vec<HostOp>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pre-existing container node; not recorded as a mutation.
    pub fn create_container(&mut self, tag: &str) -> HostNodeId {
        self.insert(HostNode::new(HostNodeKind::Element(tag.to_owned())))
    }

    fn insert(&mut self, node: HostNode) -> HostNodeId {
        let id = self.nodes.len();
        self.nodes.push(Some(node));
        id
    }

    fn node(&self, id: HostNodeId) -> Result<&HostNode, FiberError> {
        self.nodes
            .get(id)
            .and_then(Option::as_ref)
            .ok_or(FiberError::MissingNode { id })
    }

    fn node_mut(&mut self, id: HostNodeId) -> Result<&mut HostNode, FiberError> {
        self.nodes
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or(FiberError::MissingNode { id })
    }

    pub fn contains(&self, id: HostNodeId) -> bool {
        self.node(id).is_ok()
    }

    pub fn kind(&self, id: HostNodeId) -> Option<&HostNodeKind> {
        self.node(id).ok().map(|node| &node.kind)
    }

    pub fn tag(&self, id: HostNodeId) -> Option<&str> {
        match self.kind(id)? {
            HostNodeKind::Element(tag) => Some(tag),
            HostNodeKind::Text => None,
        }
    }

    pub fn property(&self, id: HostNodeId, name: &str) -> Option<&PropValue> {
        self.node(id).ok()?.properties.get(name)
    }

    pub fn children(&self, id: HostNodeId) -> &[HostNodeId] {
        self.node(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, id: HostNodeId) -> Option<HostNodeId> {
        self.node(id).ok()?.parent
    }

    pub fn listener_count(&self, id: HostNodeId, event: &str) -> usize {
        self.node(id)
            .ok()
            .and_then(|node| node.listeners.get(event))
            .map_or(0, Vec::len)
    }

    /// Invokes every listener registered for `event` on `id`, returning how
    /// many ran.
    pub fn dispatch(&self, id: HostNodeId, event: &str) -> Result<usize, FiberError> {
        let listeners = self
            .node(id)?
            .listeners
            .get(event)
            .cloned()
            .unwrap_or_default();
        for listener in &listeners {
            listener.call();
        }
        Ok(listeners.len())
    }

    /// Concatenated text of every text node below `id`, in document order.
    pub fn text_content(&self, id: HostNodeId) -> String {
        let mut text = String::new();
        for node_id in self.preorder(id) {
            if let Ok(node) = self.node(node_id) {
                if node.kind == HostNodeKind::Text {
                    if let Some(value) = node.properties.get(NODE_VALUE) {
                        text.push_str(&value.to_string());
                    }
                }
            }
        }
        text
    }

    /// Tags of every node strictly below `id` in preorder; text nodes are
    /// reported as `#text`.
    pub fn tag_preorder(&self, id: HostNodeId) -> Vec<String> {
        self.preorder(id)
            .into_iter()
            .skip(1)
            .filter_map(|node_id| match self.kind(node_id)? {
                HostNodeKind::Element(tag) => Some(tag.clone()),
                HostNodeKind::Text => Some("#text".to_owned()),
            })
            .collect()
    }

    /// Ids of all element nodes below `id` carrying `tag`, in preorder.
    pub fn find_all(&self, id: HostNodeId, tag: &str) -> Vec<HostNodeId> {
        self.preorder(id)
            .into_iter()
            .skip(1)
            .filter(|node_id| self.tag(*node_id) == Some(tag))
            .collect()
    }

    fn preorder(&self, id: HostNodeId) -> Vec<HostNodeId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(node_id) = stack.pop() {
            order.push(node_id);
            stack.extend(self.children(node_id).iter().rev().copied());
        }
        order
    }

    /// Number of live nodes, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<HostOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn dump_tree(&self, root: HostNodeId) -> String {
        let mut output = String::new();
        let mut stack = vec![(root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let indent = "  ".repeat(depth);
            match self.node(id) {
                Ok(node) => {
                    match &node.kind {
                        HostNodeKind::Element(tag) => {
                            output.push_str(&format!("{indent}[{id}] <{tag}>"));
                            for (name, value) in &node.properties {
                                output.push_str(&format!(" {name}={value}"));
                            }
                        }
                        HostNodeKind::Text => {
                            let value = node
                                .properties
                                .get(NODE_VALUE)
                                .map(ToString::to_string)
                                .unwrap_or_default();
                            output.push_str(&format!("{indent}[{id}] {value:?}"));
                        }
                    }
                    output.push('\n');
                    for child in node.children.iter().rev() {
                        stack.push((*child, depth + 1));
                    }
                }
                Err(_) => output.push_str(&format!("{indent}[{id}] (missing)\n")),
            }
        }
        output
    }

    fn detach(&mut self, child: HostNodeId) -> Result<(), FiberError> {
        if let Some(parent) = self.node(child)?.parent {
            self.node_mut(parent)?.children.retain(|id| *id != child);
            self.node_mut(child)?.parent = None;
        }
        Ok(())
    }

    fn release(&mut self, id: HostNodeId) {
        let mut stack = vec![id];
        while let Some(node_id) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(node_id).and_then(Option::take) {
                stack.extend(node.children);
            }
        }
    }
}

fn is_supported_tag(tag: &str) -> bool {
    !tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

impl Host for MemoryHost {
    type Node = HostNodeId;

    fn create_element(&mut self, tag: &str) -> Result<HostNodeId, FiberError> {
        if !is_supported_tag(tag) {
            return Err(FiberError::UnsupportedElementType {
                tag: tag.to_owned(),
            });
        }
        let id = self.insert(HostNode::new(HostNodeKind::Element(tag.to_owned())));
        self.ops.push(HostOp::CreateElement {
            id,
            tag: tag.to_owned(),
        });
        Ok(id)
    }

    fn create_text(&mut self) -> Result<HostNodeId, FiberError> {
        let id = self.insert(HostNode::new(HostNodeKind::Text));
        self.ops.push(HostOp::CreateText { id });
        Ok(id)
    }

    fn set_property(
        &mut self,
        node: &HostNodeId,
        name: &str,
        value: &PropValue,
    ) -> Result<(), FiberError> {
        self.node_mut(*node)?
            .properties
            .insert(name.to_owned(), value.clone());
        self.ops.push(HostOp::SetProperty {
            id: *node,
            name: name.to_owned(),
        });
        Ok(())
    }

    fn remove_property(&mut self, node: &HostNodeId, name: &str) -> Result<(), FiberError> {
        self.node_mut(*node)?.properties.shift_remove(name);
        self.ops.push(HostOp::RemoveProperty {
            id: *node,
            name: name.to_owned(),
        });
        Ok(())
    }

    fn add_listener(
        &mut self,
        node: &HostNodeId,
        event: &str,
        listener: &Listener,
    ) -> Result<(), FiberError> {
        self.node_mut(*node)?
            .listeners
            .entry(event.to_owned())
            .or_default()
            .push(listener.clone());
        self.ops.push(HostOp::AddListener {
            id: *node,
            event: event.to_owned(),
        });
        Ok(())
    }

    fn remove_listener(
        &mut self,
        node: &HostNodeId,
        event: &str,
        listener: &Listener,
    ) -> Result<(), FiberError> {
        if let Some(listeners) = self.node_mut(*node)?.listeners.get_mut(event) {
            listeners.retain(|registered| registered != listener);
        }
        self.ops.push(HostOp::RemoveListener {
            id: *node,
            event: event.to_owned(),
        });
        Ok(())
    }

    fn append_child(&mut self, parent: &HostNodeId, child: &HostNodeId) -> Result<(), FiberError> {
        self.node(*parent)?;
        self.detach(*child)?;
        self.node_mut(*parent)?.children.push(*child);
        self.node_mut(*child)?.parent = Some(*parent);
        self.ops.push(HostOp::AppendChild {
            parent: *parent,
            child: *child,
        });
        Ok(())
    }

    fn remove_child(&mut self, parent: &HostNodeId, child: &HostNodeId) -> Result<(), FiberError> {
        let node = self.node_mut(*parent)?;
        let before = node.children.len();
        node.children.retain(|id| id != child);
        if node.children.len() == before {
            return Err(FiberError::MissingNode { id: *child });
        }
        self.release(*child);
        self.ops.push(HostOp::RemoveChild {
            parent: *parent,
            child: *child,
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/host_tests.rs"]
mod tests;
