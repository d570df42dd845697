//! 骨骼列表和层级遍历

mod walker;

pub use walker::HierarchyWalker;

/// 骨骼：一对有向的源节点 -> 目标节点
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bone<N> {
    pub source: N,
    pub target: N,
    pub source_radius: f32,
    pub target_radius: f32,
}

impl<N> Bone<N> {
    /// 两端半径都取同一个默认值
    pub fn new(source: N, target: N, radius: f32) -> Self {
        Self {
            source,
            target,
            source_radius: radius,
            target_radius: radius,
        }
    }
}

/// 骨骼列表
///
/// 顺序即贴图中的像素下标。
#[derive(Clone, Debug, PartialEq)]
pub struct BoneList<N> {
    bones: Vec<Bone<N>>,
}

impl<N> BoneList<N> {
    pub fn new(bones: Vec<Bone<N>>) -> Self {
        Self { bones }
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Bone<N>> {
        self.bones.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bone<N>> {
        self.bones.iter()
    }
}

impl<N> Default for BoneList<N> {
    fn default() -> Self {
        Self { bones: Vec::new() }
    }
}

impl<'a, N> IntoIterator for &'a BoneList<N> {
    type Item = &'a Bone<N>;
    type IntoIter = std::slice::Iter<'a, Bone<N>>;

    fn into_iter(self) -> Self::IntoIter {
        self.bones.iter()
    }
}
