//! Tag-addressed editing service
//!
//! Resolves tag names to nodes (first pre-order match) and applies the tree
//! operations. Every failure is returned to the caller; the tree is never left
//! half-modified.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use generational_arena::Index;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{render_string, render_to, DomNode, DomTree, DomainError, TreeNodeConvert};
use crate::infrastructure::traits::FileSystem;

/// Service owning one markup tree for the lifetime of a session.
pub struct DomService {
    tree: DomTree,
    fs: Arc<dyn FileSystem>,
}

impl DomService {
    /// Create a service with a fresh tree rooted at `root_tag`.
    pub fn new(root_tag: &str, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            tree: DomTree::new(root_tag),
            fs,
        }
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    fn resolve(&self, tag: &str) -> ApplicationResult<Index> {
        self.tree
            .find_by_tag(tag)
            .ok_or_else(|| DomainError::NotFound(tag.to_string()).into())
    }

    /// Add a new element `tag` as the last child of the first `parent_tag` element.
    #[instrument(level = "debug", skip(self))]
    pub fn add(&mut self, parent_tag: &str, tag: &str, content: &str) -> ApplicationResult<Index> {
        let parent = self.resolve(parent_tag)?;
        let idx = self.tree.insert_child(parent, DomNode::new(tag, content))?;
        info!("added <{}> under <{}>", tag, parent_tag);
        Ok(idx)
    }

    /// Remove the first `tag` element with its subtree. Returns the number of removed nodes.
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&mut self, tag: &str) -> ApplicationResult<usize> {
        let idx = self.resolve(tag)?;
        let removed = self.tree.remove_subtree(idx)?;
        info!("removed <{}> ({} nodes)", tag, removed);
        Ok(removed)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn view(&self, tag: &str) -> ApplicationResult<&str> {
        let idx = self.resolve(tag)?;
        let node = self
            .tree
            .get(idx)
            .ok_or_else(|| DomainError::NotFound(tag.to_string()))?;
        Ok(node.content.as_str())
    }

    /// Replace the content of the first `tag` element.
    #[instrument(level = "debug", skip(self, content))]
    pub fn edit(&mut self, tag: &str, content: &str) -> ApplicationResult<()> {
        let idx = self.resolve(tag)?;
        self.tree.set_content(idx, content)?;
        info!("updated content of <{}>", tag);
        Ok(())
    }

    /// Move the first `tag` element, with its subtree, under the first `new_parent_tag` element.
    #[instrument(level = "debug", skip(self))]
    pub fn move_node(&mut self, tag: &str, new_parent_tag: &str) -> ApplicationResult<()> {
        let idx = self.resolve(tag)?;
        let new_parent = self.resolve(new_parent_tag)?;
        self.tree.move_subtree(idx, new_parent)?;
        info!("moved <{}> under <{}>", tag, new_parent_tag);
        Ok(())
    }

    /// Render the whole tree into `out`.
    pub fn display<W: Write + ?Sized>(&self, out: &mut W) -> ApplicationResult<()> {
        render_to(&self.tree, self.tree.root(), out).with_context("write tree to output")?;
        out.flush().with_context("flush output")
    }

    /// Render the whole tree as a `termtree` outline into `out`.
    pub fn display_outline<W: Write + ?Sized>(&self, out: &mut W) -> ApplicationResult<()> {
        write!(out, "{}", self.tree.to_tree_string()).with_context("write tree to output")?;
        out.flush().with_context("flush output")
    }

    /// Write the rendered tree to `path`, creating missing parent directories.
    #[instrument(level = "debug", skip(self))]
    pub fn save(&self, path: &Path) -> ApplicationResult<PathBuf> {
        let text = render_string(&self.tree, self.tree.root());
        self.fs
            .ensure_parent(path)
            .with_path_context("create directory for", path)?;
        self.fs
            .write(path, &text)
            .with_path_context("write snapshot", path)?;
        debug!("wrote {} bytes", text.len());
        info!("saved tree to {}", path.display());
        Ok(path.to_path_buf())
    }

    pub fn count(&self) -> usize {
        self.tree.count_nodes()
    }
}
