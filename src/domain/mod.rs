//! Domain layer: the markup tree and its operations
//!
//! This layer is independent of external concerns (no files, no CLI, no config loading).

pub mod arena;
pub mod error;
pub mod render;
pub mod tree_traits;

pub use arena::{Children, DomNode, DomTree, PreOrder, DEFAULT_ROOT_TAG};
pub use error::{DomainError, DomainResult};
pub use render::{render_lines, render_string, render_to, RenderLines, INDENT_WIDTH};
pub use tree_traits::TreeNodeConvert;
