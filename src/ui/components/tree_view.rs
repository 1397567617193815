//! Project tree: project → workspace → agent
//!
//! The tree is the source of truth; [`ProjectTree::flat`] is a depth-annotated
//! projection of the visible nodes, rebuilt after every structural change. The
//! cursor moves over the projection only.

use std::path::{Path, PathBuf};

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::agent::{AgentStatus, RunningAgent};
use crate::git::WorkspaceInfo;

use super::theme::{
    ACCENT_ERROR, ACCENT_SUCCESS, ACCENT_WARNING, SELECTED_BG, SELECTED_BG_DIM, TEXT_MUTED,
    TEXT_PRIMARY,
};

/// Type of node in the tree view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Repository root (children: workspaces)
    Project,
    /// Working copy (children: agents)
    Workspace,
    /// Launched session (always a leaf)
    Agent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodePayload {
    None,
    Workspace(WorkspaceInfo),
    Agent { agent_id: String, status: AgentStatus },
}

/// A node in the project tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: String,
    pub name: String,
    pub path: PathBuf,
    pub kind: NodeKind,
    pub expanded: bool,
    pub running: bool,
    pub children: Vec<TreeNode>,
    pub payload: NodePayload,
}

impl TreeNode {
    /// Repositories start expanded so their workspaces are visible
    pub fn project(root: &Path) -> Self {
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| root.to_string_lossy().to_string());
        Self {
            id: format!("project:{}", root.display()),
            name,
            path: root.to_path_buf(),
            kind: NodeKind::Project,
            expanded: true,
            running: false,
            children: Vec::new(),
            payload: NodePayload::None,
        }
    }

    pub fn workspace(info: &WorkspaceInfo) -> Self {
        Self {
            id: format!("workspace:{}", info.path.display()),
            name: info.name(),
            path: info.path.clone(),
            kind: NodeKind::Workspace,
            expanded: true,
            running: false,
            children: Vec::new(),
            payload: NodePayload::Workspace(info.clone()),
        }
    }

    pub fn agent(agent: &RunningAgent) -> Self {
        Self {
            id: agent.id.clone(),
            name: agent.display_name.clone(),
            path: agent.workspace.clone(),
            kind: NodeKind::Agent,
            expanded: false,
            running: agent.status.is_running(),
            children: Vec::new(),
            payload: NodePayload::Agent {
                agent_id: agent.id.clone(),
                status: agent.status,
            },
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Toggle expanded state; leaves are unaffected
    pub fn toggle_expanded(&mut self) -> bool {
        if self.has_children() {
            self.expanded = !self.expanded;
            true
        } else {
            false
        }
    }

    fn flatten_into(&self, depth: usize, out: &mut Vec<FlatNode>) {
        out.push(FlatNode {
            id: self.id.clone(),
            name: self.name.clone(),
            path: self.path.clone(),
            kind: self.kind,
            depth,
            expanded: self.expanded,
            has_children: self.has_children(),
            running: self.running,
            suffix: self.suffix(),
        });
        if self.expanded {
            for child in &self.children {
                child.flatten_into(depth + 1, out);
            }
        }
    }

    fn suffix(&self) -> Option<String> {
        match &self.payload {
            NodePayload::Workspace(info) => {
                let dirty = if info.dirty { " *" } else { "" };
                Some(format!("{}{}", info.branch, dirty))
            }
            NodePayload::Agent { status, .. } if !status.is_running() => {
                Some(status.label().to_string())
            }
            _ => None,
        }
    }
}

/// One visible row of the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatNode {
    pub id: String,
    pub name: String,
    pub path: PathBuf,
    pub kind: NodeKind,
    pub depth: usize,
    pub expanded: bool,
    pub has_children: bool,
    pub running: bool,
    pub suffix: Option<String>,
}

/// Hierarchy of projects, their workspaces, and the sessions running in them
#[derive(Debug, Clone, Default)]
pub struct ProjectTree {
    roots: Vec<TreeNode>,
    flat: Vec<FlatNode>,
    cursor: usize,
    rebuilds: u64,
}

impl ProjectTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a project with its workspaces.
    ///
    /// Agent nodes already attached to a workspace path that survives are carried over.
    pub fn set_project(&mut self, root: &Path, workspaces: &[WorkspaceInfo]) {
        let mut project = TreeNode::project(root);
        let previous = self.roots.iter().position(|p| p.path == root);

        for info in workspaces {
            let mut node = TreeNode::workspace(info);
            if let Some(old) = previous
                .and_then(|i| self.roots[i].children.iter().find(|w| w.path == info.path))
            {
                node.children = old.children.clone();
                node.expanded = old.expanded;
                node.running = old.running;
            }
            project.children.push(node);
        }

        match previous {
            Some(i) => {
                project.expanded = self.roots[i].expanded;
                self.roots[i] = project;
            }
            None => self.roots.push(project),
        }
        self.rebuild();
    }

    /// Attach a session under the workspace matching its recorded path.
    ///
    /// Returns false (and leaves the tree untouched) when no workspace matches.
    pub fn attach_agent(&mut self, agent: &RunningAgent) -> bool {
        let Some(workspace) = self.workspace_mut(&agent.workspace) else {
            tracing::debug!(agent_id = %agent.id, workspace = %agent.workspace.display(), "No workspace node for agent");
            return false;
        };
        workspace.children.retain(|c| c.id != agent.id);
        workspace.children.push(TreeNode::agent(agent));
        workspace.running = workspace.children.iter().any(|c| c.running);
        self.rebuild();
        true
    }

    /// Refresh the status shown for an attached session
    pub fn update_agent(&mut self, agent_id: &str, status: AgentStatus) {
        let mut changed = false;
        for workspace in self.roots.iter_mut().flat_map(|p| p.children.iter_mut()) {
            if let Some(node) = workspace.children.iter_mut().find(|c| c.id == agent_id) {
                node.running = status.is_running();
                node.payload = NodePayload::Agent {
                    agent_id: agent_id.to_string(),
                    status,
                };
                workspace.running = workspace.children.iter().any(|c| c.running);
                changed = true;
            }
        }
        if changed {
            self.rebuild();
        }
    }

    /// Remove the leaves for `agent_ids` with a single rebuild; returns how many were removed
    pub fn remove_agents(&mut self, agent_ids: &[String]) -> usize {
        let mut removed = 0;
        for workspace in self.roots.iter_mut().flat_map(|p| p.children.iter_mut()) {
            let before = workspace.children.len();
            workspace
                .children
                .retain(|c| !agent_ids.iter().any(|id| *id == c.id));
            removed += before - workspace.children.len();
            workspace.running = workspace.children.iter().any(|c| c.running);
        }
        if removed > 0 {
            self.rebuild();
        }
        removed
    }

    /// Find a project or workspace node by path
    pub fn find_by_path(&self, path: &Path) -> Option<&TreeNode> {
        self.roots.iter().find_map(|project| {
            if project.path == path {
                Some(project)
            } else {
                project.children.iter().find(|w| w.path == path)
            }
        })
    }

    fn workspace_mut(&mut self, path: &Path) -> Option<&mut TreeNode> {
        self.roots
            .iter_mut()
            .flat_map(|p| p.children.iter_mut())
            .find(|w| w.path == path)
    }

    /// Primary workspace of the first project, else its first workspace
    pub fn first_workspace(&self) -> Option<&WorkspaceInfo> {
        let workspaces = || {
            self.roots
                .iter()
                .flat_map(|p| p.children.iter())
                .filter_map(|w| match &w.payload {
                    NodePayload::Workspace(info) => Some(info),
                    _ => None,
                })
        };
        workspaces()
            .find(|info| info.is_primary)
            .or_else(|| workspaces().next())
    }

    /// Toggle the node at a flat index; returns whether anything changed
    pub fn toggle_at(&mut self, index: usize) -> bool {
        let Some(id) = self.flat.get(index).map(|n| n.id.clone()) else {
            return false;
        };
        let toggled = self.node_mut(&id).is_some_and(TreeNode::toggle_expanded);
        if toggled {
            self.rebuild();
        }
        toggled
    }

    /// Expand the selected node if it is collapsed
    pub fn expand_selected(&mut self) -> bool {
        let collapsed = self
            .selected()
            .is_some_and(|node| node.has_children && !node.expanded);
        collapsed && self.toggle_at(self.cursor)
    }

    /// Collapse the selected node if it is expanded
    pub fn collapse_selected(&mut self) -> bool {
        let expanded = self
            .selected()
            .is_some_and(|node| node.has_children && node.expanded);
        expanded && self.toggle_at(self.cursor)
    }

    fn node_mut(&mut self, id: &str) -> Option<&mut TreeNode> {
        fn find<'a>(nodes: &'a mut [TreeNode], id: &str) -> Option<&'a mut TreeNode> {
            for node in nodes {
                if node.id == id {
                    return Some(node);
                }
                if let Some(found) = find(&mut node.children, id) {
                    return Some(found);
                }
            }
            None
        }
        find(&mut self.roots, id)
    }

    /// Recompute the flat projection, keeping the cursor on the same node when possible
    fn rebuild(&mut self) {
        let selected_id = self.flat.get(self.cursor).map(|n| n.id.clone());

        let mut flat = Vec::new();
        for root in &self.roots {
            root.flatten_into(0, &mut flat);
        }
        self.flat = flat;
        self.rebuilds += 1;

        self.cursor = selected_id
            .and_then(|id| self.flat.iter().position(|n| n.id == id))
            .unwrap_or(self.cursor)
            .min(self.flat.len().saturating_sub(1));
    }

    pub fn flat(&self) -> &[FlatNode] {
        &self.flat
    }

    /// Number of projection rebuilds so far
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> Option<&FlatNode> {
        self.flat.get(self.cursor)
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.flat.len() {
            self.cursor += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Put the cursor on the node with `id` if it is visible
    pub fn select_id(&mut self, id: &str) -> bool {
        match self.flat.iter().position(|n| n.id == id) {
            Some(index) => {
                self.cursor = index;
                true
            }
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Tree view widget
pub struct TreeView<'a> {
    tree: &'a ProjectTree,
    focused: bool,
    active_workspace: Option<&'a Path>,
    pulse: &'a str,
}

impl<'a> TreeView<'a> {
    pub fn new(tree: &'a ProjectTree) -> Self {
        Self {
            tree,
            focused: false,
            active_workspace: None,
            pulse: "●",
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn active_workspace(mut self, path: Option<&'a Path>) -> Self {
        self.active_workspace = path;
        self
    }

    /// Marker drawn in front of running sessions
    pub fn pulse(mut self, glyph: &'a str) -> Self {
        self.pulse = glyph;
        self
    }

    fn line_for(&self, node: &FlatNode) -> Line<'a> {
        let indent = "  ".repeat(node.depth);
        let marker = match (node.kind, node.has_children, node.expanded) {
            (NodeKind::Agent, _, _) if node.running => format!("{} ", self.pulse),
            (NodeKind::Agent, _, _) => "  ".to_string(),
            (_, false, _) => "  ".to_string(),
            (_, true, true) => "▼ ".to_string(),
            (_, true, false) => "▶ ".to_string(),
        };

        let active = node.kind == NodeKind::Workspace
            && self.active_workspace.is_some_and(|p| p == node.path.as_path());
        let mut label_style = Style::default().fg(TEXT_PRIMARY);
        if node.kind == NodeKind::Project || active {
            label_style = label_style.add_modifier(Modifier::BOLD);
        }

        let marker_style = match node.kind {
            NodeKind::Agent if node.running => Style::default().fg(ACCENT_SUCCESS),
            _ => Style::default().fg(ACCENT_WARNING),
        };

        let mut spans = vec![
            Span::raw(indent),
            Span::styled(marker, marker_style),
            Span::styled(node.name.clone(), label_style),
        ];
        if let Some(suffix) = &node.suffix {
            let suffix_style = if suffix == AgentStatus::Failed.label() {
                Style::default().fg(ACCENT_ERROR)
            } else {
                Style::default().fg(TEXT_MUTED)
            };
            spans.push(Span::styled(format!(" ({})", suffix), suffix_style));
        }
        Line::from(spans)
    }
}

impl Widget for TreeView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 || area.height < 1 {
            return;
        }

        let flat = self.tree.flat();
        let height = area.height as usize;
        let cursor = self.tree.cursor();
        let offset = cursor.saturating_sub(height.saturating_sub(1));
        let selected_bg = if self.focused {
            SELECTED_BG
        } else {
            SELECTED_BG_DIM
        };

        for (row, (index, node)) in flat.iter().enumerate().skip(offset).take(height).enumerate() {
            let y = area.y + row as u16;
            let line_area = Rect::new(area.x, y, area.width, 1);
            if index == cursor {
                buf.set_style(line_area, Style::default().bg(selected_bg));
            }
            self.line_for(node).render(line_area, buf);
        }
    }
}
