//! 变换树
//!
//! 节点按插入顺序存储，句柄在树的生命周期内保持稳定（节点不会被删除，只能被挂到别处）。
//! 任何局部变换或父子关系的修改都会立即刷新受影响子树的全局矩阵，
//! 因此 `world_position` 总是反映当前状态。

use std::collections::HashMap;

use glam::{Mat4, Vec3};

use crate::{MapError, Result};
use super::{Hierarchy, NodeTransform};

/// 节点句柄
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// 变换树节点
#[derive(Clone, Debug)]
pub struct TransformNode {
    pub name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local: NodeTransform,
    global: Mat4,
}

impl TransformNode {
    fn new(name: String, parent: Option<NodeId>, local: NodeTransform) -> Self {
        Self {
            name,
            parent,
            children: Vec::new(),
            local,
            global: Mat4::IDENTITY,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// 变换树
#[derive(Clone, Debug, Default)]
pub struct TransformTree {
    nodes: Vec<TransformNode>,
    name_to_index: HashMap<String, usize>,
}

impl TransformTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加节点；`parent` 为 `None` 时作为根节点
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        parent: Option<NodeId>,
        local: NodeTransform,
    ) -> Result<NodeId> {
        if let Some(parent) = parent {
            self.check(parent)?;
        }

        let name = name.into();
        let id = NodeId(self.nodes.len());
        self.name_to_index.insert(name.clone(), id.0);
        self.nodes.push(TransformNode::new(name, parent, local));

        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        self.update_global_transforms(id);
        Ok(id)
    }

    /// 通过名称查找节点（重名时返回最后添加的）
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.name_to_index.get(name).map(|&i| NodeId(i))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&TransformNode> {
        self.nodes.get(id.0)
    }

    /// 所有根节点
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.parent.is_none())
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    /// 设置局部变换并刷新子树
    pub fn set_local_transform(&mut self, id: NodeId, local: NodeTransform) -> Result<()> {
        self.check(id)?;
        self.nodes[id.0].local = local;
        self.update_global_transforms(id);
        Ok(())
    }

    /// 只修改局部平移
    pub fn set_local_translation(&mut self, id: NodeId, translation: Vec3) -> Result<()> {
        self.check(id)?;
        self.nodes[id.0].local.translation = translation;
        self.update_global_transforms(id);
        Ok(())
    }

    /// 修改父节点，节点追加到新父节点子列表末尾
    ///
    /// 拒绝把节点挂到自己或自己的后代下面。
    pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<()> {
        self.check(id)?;
        if let Some(parent) = parent {
            self.check(parent)?;
            if self.is_ancestor_or_self(id, parent) {
                return Err(MapError::CyclicHierarchy(format!(
                    "{} cannot be parented under {}",
                    self.nodes[id.0].name, self.nodes[parent.0].name
                )));
            }
        }

        if let Some(old) = self.nodes[id.0].parent {
            self.nodes[old.0].children.retain(|&c| c != id);
        }
        self.nodes[id.0].parent = parent;
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        self.update_global_transforms(id);
        Ok(())
    }

    /// 全局变换矩阵
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        self.nodes.get(id.0).map(|n| n.global).unwrap_or(Mat4::IDENTITY)
    }

    fn check(&self, id: NodeId) -> Result<()> {
        if id.0 < self.node_count() {
            Ok(())
        } else {
            Err(MapError::UnknownNode(format!("{:?}", id)))
        }
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes[node.0].parent {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    /// 先序刷新子树的全局变换：global = parent_global * local
    ///
    /// 使用显式栈，深链不会耗尽调用栈。
    fn update_global_transforms(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            let local = self.nodes[node.0].local.to_matrix();
            self.nodes[node.0].global = match self.nodes[node.0].parent {
                Some(parent) => self.nodes[parent.0].global * local,
                None => local,
            };

            let child_count = self.nodes[node.0].children.len();
            for i in (0..child_count).rev() {
                stack.push(self.nodes[node.0].children[i]);
            }
        }
    }
}

impl Hierarchy for TransformTree {
    type Node = NodeId;

    fn contains(&self, node: NodeId) -> bool {
        node.0 < self.node_count()
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes.get(node.0).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    fn world_position(&self, node: NodeId) -> Vec3 {
        self.world_matrix(node).col(3).truncate()
    }
}
