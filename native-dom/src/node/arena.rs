use super::types::{Node, NodeId, NodeType};
use crate::error::{DomError, Result};
use smallvec::SmallVec;

pub type ChildList = SmallVec<[NodeId; 4]>;

/// Arena-based storage for the logical tree.
///
/// Parents own their ordered child lists; each node keeps a back-reference
/// to its parent as a plain id. Operations here are purely structural and
/// never touch native objects.
pub struct NodeArena {
    nodes: Vec<Option<Node>>,
    parents: Vec<Option<NodeId>>,
    children: Vec<ChildList>,
    generations: Vec<u32>,
    free_list: Vec<u32>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            parents: Vec::new(),
            children: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
        }
    }

    pub fn create(&mut self, node: Node) -> NodeId {
        let index = if let Some(idx) = self.free_list.pop() {
            idx as usize
        } else {
            self.nodes.len()
        };

        if index >= self.nodes.len() {
            self.nodes.push(Some(node));
            self.parents.push(None);
            self.children.push(ChildList::new());
            self.generations.push(0);
        } else {
            self.nodes[index] = Some(node);
            self.parents[index] = None;
            self.children[index].clear();
        }

        NodeId::new(index as u32, self.generations[index])
    }

    fn is_live(&self, id: NodeId) -> bool {
        self.generations.get(id.index()) == Some(&id.generation())
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if !self.is_live(id) {
            return None;
        }
        self.nodes.get(id.index())?.as_ref()
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if !self.is_live(id) {
            return None;
        }
        self.nodes.get_mut(id.index())?.as_mut()
    }

    /// Mutable access to two distinct nodes at once
    pub fn get_pair_mut(&mut self, a: NodeId, b: NodeId) -> Option<(&mut Node, &mut Node)> {
        let (ia, ib) = (a.index(), b.index());
        if ia == ib || !self.is_live(a) || !self.is_live(b) {
            return None;
        }

        if ia < ib {
            let (left, right) = self.nodes.split_at_mut(ib);
            Some((left[ia].as_mut()?, right[0].as_mut()?))
        } else {
            let (left, right) = self.nodes.split_at_mut(ia);
            Some((right[0].as_mut()?, left[ib].as_mut()?))
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    fn require(&self, id: NodeId) -> Result<&Node> {
        self.get(id).ok_or(DomError::NodeNotFound(id))
    }

    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        self.get(id).map(Node::node_type)
    }

    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(Node::node_name)
    }

    pub fn parent_node(&self, id: NodeId) -> Option<NodeId> {
        if !self.contains(id) {
            return None;
        }
        *self.parents.get(id.index())?
    }

    /// Ordered children; empty for unknown ids
    pub fn child_nodes(&self, id: NodeId) -> &[NodeId] {
        if !self.contains(id) {
            return &[];
        }
        self.children
            .get(id.index())
            .map(|c| c.as_slice())
            .unwrap_or(&[])
    }

    pub fn item(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.child_nodes(parent).get(index).copied()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.child_nodes(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.child_nodes(id).last().copied()
    }

    pub fn index_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.child_nodes(parent).iter().position(|c| *c == child)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent_node(id)?;
        let index = self.index_of(parent, id)?;
        self.item(parent, index + 1)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent_node(id)?;
        let index = self.index_of(parent, id)?;
        self.item(parent, index.checked_sub(1)?)
    }

    /// True if `ancestor` is `node` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent_node(id);
        }
        false
    }

    /// Validate an insertion and resolve the effective reference node.
    ///
    /// Inserting a node before itself resolves to its next sibling.
    pub fn check_insert(
        &self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<Option<NodeId>> {
        if let Node::Text(_) = self.require(parent)? {
            return Err(DomError::LeafNode(parent));
        }
        self.require(child)?;
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }

        let Some(reference) = reference else {
            return Ok(None);
        };
        if self.parent_node(reference) != Some(parent) {
            return Err(DomError::NotAChild {
                parent,
                child: reference,
            });
        }
        if reference == child {
            return Ok(self.next_sibling(child));
        }
        Ok(Some(reference))
    }

    /// Insert `child` before `reference` (or last), detaching it from any
    /// prior parent first. Returns the child's new index.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<usize> {
        let reference = self.check_insert(parent, child, reference)?;

        if let Some(old_parent) = self.parent_node(child) {
            self.detach(old_parent, child);
        }

        let siblings = &mut self.children[parent.index()];
        let index = reference
            .and_then(|r| siblings.iter().position(|c| *c == r))
            .unwrap_or(siblings.len());
        siblings.insert(index, child);
        self.parents[child.index()] = Some(parent);

        Ok(index)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<usize> {
        self.insert_before(parent, child, None)
    }

    /// Remove `child` from `parent`, returning the index it occupied
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<usize> {
        self.require(parent)?;
        self.require(child)?;
        if self.parent_node(child) != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        self.detach(parent, child)
            .ok_or(DomError::NotAChild { parent, child })
    }

    fn detach(&mut self, parent: NodeId, child: NodeId) -> Option<usize> {
        let siblings = &mut self.children[parent.index()];
        let index = siblings.iter().position(|c| *c == child)?;
        siblings.remove(index);
        self.parents[child.index()] = None;
        Some(index)
    }

    /// Free a parentless node and its whole subtree, returning the removed
    /// nodes so their native objects are dropped by the caller
    pub fn dispose(&mut self, id: NodeId) -> Result<Vec<Node>> {
        self.require(id)?;
        if self.parent_node(id).is_some() {
            return Err(DomError::StillAttached(id));
        }

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let idx = current.index();
            stack.extend(self.children[idx].drain(..));
            self.parents[idx] = None;
            if let Some(node) = self.nodes[idx].take() {
                removed.push(node);
                self.generations[idx] = self.generations[idx].wrapping_add(1);
                self.free_list.push(idx as u32);
            }
        }
        Ok(removed)
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}
