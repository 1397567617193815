mod confirm_view;
mod global_footer;
mod select_list;
mod session_output;
mod sidebar;
mod status_header;
pub mod theme;
mod tree_view;

pub use confirm_view::{ConfirmView, ErrorView};
pub use global_footer::GlobalFooter;
pub use select_list::{ListEntry, SelectColumn, SelectList};
pub use session_output::SessionOutput;
pub use sidebar::Sidebar;
pub use status_header::{truncate_to_width, StatusHeader};
pub use tree_view::{FlatNode, NodeKind, NodePayload, ProjectTree, TreeNode, TreeView};
