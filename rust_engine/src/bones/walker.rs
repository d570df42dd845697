//! 层级遍历
//!
//! 先序展开：对每个直接子节点先输出 (父, 子) 骨骼，再展开该子节点的子树，
//! 然后才处理下一个兄弟节点。`maximum_depth = 0` 只输出根节点的直接子节点，
//! 一般情况下会覆盖根节点以下 `maximum_depth + 1` 层的边。
//!
//! 遍历使用显式栈，并受两道预算约束：访问集合（同一节点出现两次即报错）
//! 和骨骼数量上限。

use std::collections::HashSet;

use crate::config::{BinderConfig, MAX_TEXTURE_WIDTH};
use crate::hierarchy::Hierarchy;
use crate::{MapError, Result};
use super::{Bone, BoneList};

/// 遍历器
#[derive(Clone, Debug)]
pub struct HierarchyWalker {
    pub default_radius: f32,
    pub maximum_depth: u32,
    pub max_bones: u32,
}

impl Default for HierarchyWalker {
    fn default() -> Self {
        Self {
            default_radius: 0.1,
            maximum_depth: 3,
            max_bones: MAX_TEXTURE_WIDTH,
        }
    }
}

/// 栈帧：当前节点、剩余深度、下一个待处理的子节点下标
struct Frame<N> {
    node: N,
    depth: u32,
    next_child: usize,
}

impl HierarchyWalker {
    pub fn from_config(config: &BinderConfig) -> Self {
        Self {
            default_radius: config.default_radius,
            maximum_depth: config.maximum_depth,
            max_bones: config.max_bones,
        }
    }

    /// 从根节点展开骨骼列表
    pub fn walk<H: Hierarchy>(&self, hierarchy: &H, root: H::Node) -> Result<BoneList<H::Node>> {
        if !hierarchy.contains(root) {
            return Err(MapError::UnknownNode(format!("{:?}", root)));
        }

        let mut bones = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(root);

        let mut stack = vec![Frame {
            node: root,
            depth: self.maximum_depth,
            next_child: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(&child) = hierarchy.children(frame.node).get(frame.next_child) else {
                stack.pop();
                continue;
            };
            frame.next_child += 1;
            let (source, depth) = (frame.node, frame.depth);

            if !visited.insert(child) {
                return Err(MapError::CyclicHierarchy(format!("{:?}", child)));
            }
            if bones.len() >= self.max_bones as usize {
                return Err(MapError::BoneBudgetExceeded { limit: self.max_bones });
            }

            bones.push(Bone::new(source, child, self.default_radius));

            if depth > 0 {
                stack.push(Frame {
                    node: child,
                    depth: depth - 1,
                    next_child: 0,
                });
            }
        }

        Ok(BoneList::new(bones))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use glam::Vec3;

    use crate::hierarchy::{NodeId, NodeTransform, TransformTree};

    /// 邻接表形式的层级，允许构造共享子节点和环
    struct Graph {
        edges: HashMap<u32, Vec<u32>>,
    }

    impl Graph {
        fn new(edges: &[(u32, &[u32])]) -> Self {
            Self {
                edges: edges.iter().map(|(n, c)| (*n, c.to_vec())).collect(),
            }
        }
    }

    impl Hierarchy for Graph {
        type Node = u32;

        fn contains(&self, node: u32) -> bool {
            self.edges.contains_key(&node)
        }

        fn children(&self, node: u32) -> &[u32] {
            self.edges.get(&node).map(|c| c.as_slice()).unwrap_or(&[])
        }

        fn world_position(&self, node: u32) -> Vec3 {
            Vec3::splat(node as f32)
        }
    }

    fn walker(maximum_depth: u32) -> HierarchyWalker {
        HierarchyWalker {
            maximum_depth,
            ..HierarchyWalker::default()
        }
    }

    fn pairs<N: Copy>(bones: &BoneList<N>) -> Vec<(N, N)> {
        bones.iter().map(|b| (b.source, b.target)).collect()
    }

    /// 深度为 3 的满二叉树（15 个节点）
    fn binary_tree() -> (TransformTree, NodeId) {
        let mut tree = TransformTree::new();
        let root = tree.add_node("n0", None, NodeTransform::default()).unwrap();
        let mut level = vec![root];
        for depth in 1..=3 {
            let mut next = Vec::new();
            for (i, &parent) in level.iter().enumerate() {
                for side in 0..2 {
                    let name = format!("n{}_{}_{}", depth, i, side);
                    next.push(tree.add_node(name, Some(parent), NodeTransform::default()).unwrap());
                }
            }
            level = next;
        }
        (tree, root)
    }

    #[test]
    fn test_depth_zero_emits_direct_children() {
        let graph = Graph::new(&[(0, &[1, 2, 3]), (1, &[4]), (2, &[]), (3, &[]), (4, &[])]);
        let bones = walker(0).walk(&graph, 0).unwrap();
        assert_eq!(pairs(&bones), vec![(0, 1), (0, 2), (0, 3)]);
        assert!(bones.iter().all(|b| b.source == 0));
    }

    #[test]
    fn test_own_bone_before_descendants_after_elder_subtree() {
        let mut tree = TransformTree::new();
        let r = tree.add_node("R", None, NodeTransform::default()).unwrap();
        let a = tree.add_node("A", Some(r), NodeTransform::default()).unwrap();
        let b = tree.add_node("B", Some(r), NodeTransform::default()).unwrap();
        let a1 = tree.add_node("A1", Some(a), NodeTransform::default()).unwrap();

        let bones = walker(1).walk(&tree, r).unwrap();
        assert_eq!(pairs(&bones), vec![(r, a), (a, a1), (r, b)]);
    }

    #[test]
    fn test_edge_count_per_depth() {
        let (tree, root) = binary_tree();
        let expected = [2, 6, 14, 14, 14];
        for (depth, &count) in expected.iter().enumerate() {
            let bones = walker(depth as u32).walk(&tree, root).unwrap();
            assert_eq!(bones.len(), count, "maximum_depth = {}", depth);
        }
    }

    #[test]
    fn test_walk_is_deterministic() {
        let (tree, root) = binary_tree();
        let first = walker(3).walk(&tree, root).unwrap();
        for _ in 0..4 {
            assert_eq!(walker(3).walk(&tree, root).unwrap(), first);
        }
    }

    #[test]
    fn test_radius_uses_default() {
        let graph = Graph::new(&[(0, &[1]), (1, &[])]);
        let walker = HierarchyWalker {
            default_radius: 0.25,
            ..HierarchyWalker::default()
        };
        let bones = walker.walk(&graph, 0).unwrap();
        let bone = bones.get(0).unwrap();
        assert_eq!(bone.source_radius, 0.25);
        assert_eq!(bone.target_radius, 0.25);
    }

    #[test]
    fn test_leaf_root_yields_empty_list() {
        let graph = Graph::new(&[(0, &[])]);
        assert!(walker(3).walk(&graph, 0).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_root() {
        let graph = Graph::new(&[(0, &[])]);
        assert!(matches!(walker(0).walk(&graph, 9), Err(MapError::UnknownNode(_))));
    }

    #[test]
    fn test_cycle_is_reported() {
        let graph = Graph::new(&[(0, &[1]), (1, &[0])]);
        assert!(matches!(walker(u32::MAX).walk(&graph, 0), Err(MapError::CyclicHierarchy(_))));
    }

    #[test]
    fn test_shared_child_is_reported() {
        let graph = Graph::new(&[(0, &[1, 2]), (1, &[3]), (2, &[3]), (3, &[])]);
        assert!(matches!(walker(1).walk(&graph, 0), Err(MapError::CyclicHierarchy(_))));
    }

    #[test]
    fn test_bone_budget() {
        let graph = Graph::new(&[(0, &[1, 2, 3]), (1, &[]), (2, &[]), (3, &[])]);
        let mut walker = walker(0);
        walker.max_bones = 3;
        assert_eq!(walker.walk(&graph, 0).unwrap().len(), 3);

        walker.max_bones = 2;
        assert!(matches!(walker.walk(&graph, 0), Err(MapError::BoneBudgetExceeded { limit: 2 })));
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let mut tree = TransformTree::new();
        let root = tree.add_node("root", None, NodeTransform::default()).unwrap();
        let mut parent = root;
        for i in 0..5000 {
            parent = tree.add_node(format!("link{}", i), Some(parent), NodeTransform::default()).unwrap();
        }
        let bones = walker(u32::MAX).walk(&tree, root).unwrap();
        assert_eq!(bones.len(), 5000);
    }
}
