//! Indented text dump of a markup tree.
//!
//! Each element becomes an opening tag line, an optional content line one level
//! deeper, its children, and a closing tag line. Nothing is escaped.

use std::fmt;
use std::io::{self, Write};

use generational_arena::Index;

use crate::domain::arena::DomTree;

/// Spaces per nesting level.
pub const INDENT_WIDTH: usize = 2;

enum Step {
    Open(Index, usize),
    Content(Index, usize),
    Close(Index, usize),
}

/// Lazy line producer for a subtree. Borrowing the tree immutably keeps
/// rendering free of side effects, so rendering twice yields identical output.
pub struct RenderLines<'a> {
    tree: &'a DomTree,
    start: Index,
    stack: Vec<Step>,
}

impl<'a> RenderLines<'a> {
    fn new(tree: &'a DomTree, start: Index) -> Self {
        Self {
            tree,
            start,
            stack: vec![Step::Open(start, 0)],
        }
    }
}

fn indent(depth: usize) -> String {
    " ".repeat(depth * INDENT_WIDTH)
}

impl Iterator for RenderLines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(step) = self.stack.pop() {
            match step {
                Step::Open(idx, depth) => {
                    let Some(node) = self.tree.get(idx) else {
                        continue;
                    };
                    if idx != self.start {
                        if let Some(sibling) = node.next_sibling() {
                            self.stack.push(Step::Open(sibling, depth));
                        }
                    }
                    self.stack.push(Step::Close(idx, depth));
                    if let Some(child) = node.first_child() {
                        self.stack.push(Step::Open(child, depth + 1));
                    }
                    if node.has_content() {
                        self.stack.push(Step::Content(idx, depth + 1));
                    }
                    return Some(format!("{}<{}>", indent(depth), node.tag));
                }
                Step::Content(idx, depth) => {
                    if let Some(node) = self.tree.get(idx) {
                        return Some(format!("{}{}", indent(depth), node.content));
                    }
                }
                Step::Close(idx, depth) => {
                    if let Some(node) = self.tree.get(idx) {
                        return Some(format!("{}</{}>", indent(depth), node.tag));
                    }
                }
            }
        }
        None
    }
}

/// Lines of the subtree rooted at `start`. A stale `start` yields nothing.
pub fn render_lines(tree: &DomTree, start: Index) -> RenderLines<'_> {
    RenderLines::new(tree, start)
}

/// Writes the subtree rooted at `start` to `out`, one line per element part.
pub fn render_to<W: Write + ?Sized>(tree: &DomTree, start: Index, out: &mut W) -> io::Result<()> {
    for line in render_lines(tree, start) {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

pub fn render_string(tree: &DomTree, start: Index) -> String {
    let mut out = String::new();
    for line in render_lines(tree, start) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

impl fmt::Display for DomTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in render_lines(self, self.root()) {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
