//! Function: a node in the protected-resource tree.
//!
//! Functions form a forest. Each node is addressed by its stable id and
//! points at its parent by id, so the tree is an arena rather than a graph of
//! owned pointers. Cycles are prevented at write time with [`check_parent`].

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result, ValidationError};
use crate::types::FunctionId;
use crate::validation::{validate_code, validate_text, MAX_NAME_LEN, MAX_URL_LEN};

/// A protected resource node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    /// Stable, unique code.
    pub id: FunctionId,
    /// Display name.
    pub name: String,
    /// Admin UI route for the resource.
    pub url: String,
    /// Position among siblings, ascending.
    pub sort_order: i32,
    /// Parent node; `None` for a root.
    pub parent_id: Option<FunctionId>,
}

impl Function {
    /// Create a root function.
    pub fn new(
        id: impl Into<FunctionId>,
        name: impl Into<String>,
        url: impl Into<String>,
        sort_order: i32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            sort_order,
            parent_id: None,
        }
    }

    /// Attach this function under `parent`.
    pub fn with_parent(mut self, parent: impl Into<FunctionId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    /// Whether this function is a root category.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Validate the fields of this function in isolation.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        validate_code("function id", self.id.as_str())?;
        validate_text("name", &self.name, MAX_NAME_LEN)?;
        validate_text("url", &self.url, MAX_URL_LEN)?;
        if self.sort_order < 0 {
            return Err(ValidationError::NegativeSortOrder(self.sort_order));
        }
        if let Some(parent) = &self.parent_id {
            validate_code("parent id", parent.as_str())?;
        }
        Ok(())
    }
}

/// Check that `child` may be placed under `parent`.
///
/// `parent_of` resolves the current parent of any stored function. The walk
/// starts at `parent` and fails if it reaches `child`. A chain that is
/// already looping in storage is reported as a cycle as well.
pub fn check_parent<F>(child: &FunctionId, parent: Option<&FunctionId>, parent_of: F) -> Result<()>
where
    F: Fn(&FunctionId) -> Option<FunctionId>,
{
    let Some(parent) = parent else {
        return Ok(());
    };
    if parent == child {
        return Err(CoreError::SelfParent(child.clone()));
    }

    let mut seen = HashSet::new();
    let mut cursor = Some(parent.clone());
    while let Some(current) = cursor {
        if &current == child || !seen.insert(current.clone()) {
            return Err(CoreError::Cycle {
                child: child.clone(),
                parent: parent.clone(),
            });
        }
        cursor = parent_of(&current);
    }
    Ok(())
}

/// A function with its ordered children, for tree views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionNode {
    pub function: Function,
    pub children: Vec<FunctionNode>,
}

/// Arena of functions indexed by id, with a child index.
#[derive(Debug, Default, Clone)]
pub struct FunctionForest {
    nodes: HashMap<FunctionId, Function>,
    children: BTreeMap<FunctionId, Vec<FunctionId>>,
}

impl FunctionForest {
    /// Build the arena from a flat list.
    pub fn from_functions(functions: impl IntoIterator<Item = Function>) -> Self {
        let nodes: HashMap<FunctionId, Function> = functions
            .into_iter()
            .map(|f| (f.id.clone(), f))
            .collect();

        let mut children: BTreeMap<FunctionId, Vec<FunctionId>> = BTreeMap::new();
        for function in nodes.values() {
            if let Some(parent) = &function.parent_id {
                children
                    .entry(parent.clone())
                    .or_default()
                    .push(function.id.clone());
            }
        }
        for ids in children.values_mut() {
            ids.sort_by(|a, b| sibling_order(&nodes[a], &nodes[b]));
        }

        Self { nodes, children }
    }

    /// Number of functions in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a function.
    pub fn get(&self, id: &FunctionId) -> Option<&Function> {
        self.nodes.get(id)
    }

    /// Current parent of `id`.
    pub fn parent_of(&self, id: &FunctionId) -> Option<FunctionId> {
        self.nodes.get(id).and_then(|f| f.parent_id.clone())
    }

    /// Direct children of `id`, in sibling order.
    pub fn children(&self, id: &FunctionId) -> &[FunctionId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether any function names `id` as its parent.
    pub fn has_children(&self, id: &FunctionId) -> bool {
        !self.children(id).is_empty()
    }

    /// Roots in sibling order. A function whose parent is missing from the
    /// arena is treated as a root so that it stays visible.
    pub fn roots(&self) -> Vec<&Function> {
        let mut roots: Vec<&Function> = self
            .nodes
            .values()
            .filter(|f| match &f.parent_id {
                None => true,
                Some(parent) => !self.nodes.contains_key(parent),
            })
            .collect();
        roots.sort_by(|a, b| sibling_order(a, b));
        roots
    }

    /// `id` and all of its descendants, deepest first.
    ///
    /// Deleting in this order never leaves a child pointing at a removed
    /// parent.
    pub fn subtree_post_order(&self, id: &FunctionId) -> Vec<FunctionId> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        self.collect_post_order(id, &mut seen, &mut out);
        out
    }

    fn collect_post_order(
        &self,
        id: &FunctionId,
        seen: &mut HashSet<FunctionId>,
        out: &mut Vec<FunctionId>,
    ) {
        if !seen.insert(id.clone()) {
            return;
        }
        for child in self.children(id) {
            self.collect_post_order(child, seen, out);
        }
        out.push(id.clone());
    }

    /// Check a prospective parent assignment against this arena.
    pub fn check_parent(&self, child: &FunctionId, parent: Option<&FunctionId>) -> Result<()> {
        check_parent(child, parent, |id| self.parent_of(id))
    }

    /// Assemble the ordered tree.
    pub fn to_tree(&self) -> Vec<FunctionNode> {
        let mut seen = HashSet::new();
        self.roots()
            .into_iter()
            .map(|root| self.build_node(root, &mut seen))
            .collect()
    }

    fn build_node(&self, function: &Function, seen: &mut HashSet<FunctionId>) -> FunctionNode {
        seen.insert(function.id.clone());
        let pending: Vec<&Function> = self
            .children(&function.id)
            .iter()
            .filter(|id| !seen.contains(*id))
            .filter_map(|id| self.nodes.get(id))
            .collect();
        let children = pending
            .into_iter()
            .map(|child| self.build_node(child, seen))
            .collect();
        FunctionNode {
            function: function.clone(),
            children,
        }
    }
}

fn sibling_order(a: &Function, b: &Function) -> std::cmp::Ordering {
    a.sort_order
        .cmp(&b.sort_order)
        .then_with(|| a.id.cmp(&b.id))
}
