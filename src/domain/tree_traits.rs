use std::collections::HashMap;

use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::{DomNode, DomTree};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

fn label(node: &DomNode) -> String {
    if node.has_content() {
        format!("<{}> {:?}", node.tag, node.content)
    } else {
        format!("<{}>", node.tag)
    }
}

impl TreeNodeConvert for DomTree {
    /// Builds the outline bottom-up: nodes are visited in reverse pre-order, so
    /// every child's subtree is complete before its parent collects it.
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        let order: Vec<Index> = self.iter().map(|(idx, _)| idx).collect();
        let mut built: HashMap<Index, Tree<String>> = HashMap::with_capacity(order.len());

        for &idx in order.iter().rev() {
            let Some(node) = self.get(idx) else {
                continue;
            };
            let leaves: Vec<Tree<String>> = self
                .children(idx)
                .filter_map(|child| built.remove(&child))
                .collect();
            built.insert(idx, Tree::new(label(node)).with_leaves(leaves));
        }

        built
            .remove(&self.root())
            .unwrap_or_else(|| Tree::new(String::new()))
    }
}
