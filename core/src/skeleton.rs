//! Skeleton assembly
//!
//! Turns a flat, parent-indexed node list into a bone arena with exactly one
//! root. When the model carries skinned meshes (or the hierarchy has several
//! natural roots) a synthetic `_ROOT` bone is placed above everything, with
//! one `_MESH{i}` bone per skinned mesh next to the original roots.

use glam::{Mat4, Quat, Vec3};
use hashbrown::{HashMap, HashSet};

use crate::error::IntegrityError;
use crate::skin::Skin;

/// Name of the synthesized root bone
pub const SYNTHETIC_ROOT: &str = "_ROOT";

/// Scale / rotation / translation decomposition of a local transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SrtTransform {
    pub scale: Vec3,
    pub rotation: Quat,
    pub translation: Vec3,
}

impl SrtTransform {
    pub const IDENTITY: Self = Self {
        scale: Vec3::ONE,
        rotation: Quat::IDENTITY,
        translation: Vec3::ZERO,
    };

    pub fn from_matrix(m: &Mat4) -> Self {
        let (scale, rotation, translation) = m.to_scale_rotation_translation();
        Self {
            scale,
            rotation,
            translation,
        }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for SrtTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Source node, already converted to renderer space
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonNode {
    pub name: String,
    pub transform: SrtTransform,
    pub parent: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    pub index: usize,
    pub default_pose: SrtTransform,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Index into the owning model's mesh table
    pub mesh: Option<usize>,
}

/// Bone arena with a single root
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    pub bones: Vec<Bone>,
    pub root: usize,
    /// Bones `0..node_count` mirror the source nodes; synthetic bones follow
    pub node_count: usize,
}

impl Skeleton {
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&Bone> {
        self.bones.iter().find(|b| b.name == name)
    }

    /// Model-space rest transform of every bone, indexed like `bones`
    pub fn absolute_transforms(&self) -> Vec<Mat4> {
        let mut out = vec![Mat4::IDENTITY; self.bones.len()];
        let mut stack = vec![(self.root, Mat4::IDENTITY)];
        while let Some((bone, parent)) = stack.pop() {
            let world = parent * self.bones[bone].default_pose.to_matrix();
            out[bone] = world;
            stack.extend(self.bones[bone].children.iter().map(|&c| (c, world)));
        }
        out
    }

    /// Number of parent hops from `bone` to the root, `None` if the walk never arrives
    pub fn depth(&self, bone: usize) -> Option<usize> {
        let mut current = bone;
        for steps in 0..=self.bones.len() {
            if current == self.root {
                return Some(steps);
            }
            current = self.bones.get(current)?.parent?;
        }
        None
    }
}

/// Output of [`SkeletonBuilder::build`]
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltSkeleton {
    pub skeleton: Skeleton,
    /// One skin per skinned mesh, in registration order
    pub skins: Vec<Skin>,
}

struct SkinnedBinding {
    mesh: usize,
    joint_bones: Vec<usize>,
}

/// Collects nodes and mesh bindings, then validates and links them
pub struct SkeletonBuilder<'a> {
    nodes: &'a [SkeletonNode],
    attachments: Vec<(String, usize)>,
    skinned: Vec<SkinnedBinding>,
}

impl<'a> SkeletonBuilder<'a> {
    pub fn new(nodes: &'a [SkeletonNode]) -> Self {
        Self {
            nodes,
            attachments: Vec::new(),
            skinned: Vec::new(),
        }
    }

    /// Hang a static mesh off the node called `node_name`
    pub fn attach_mesh(&mut self, node_name: impl Into<String>, mesh: usize) -> &mut Self {
        self.attachments.push((node_name.into(), mesh));
        self
    }

    /// Register a skinned mesh and the skeleton nodes its joints map to
    pub fn add_skinned_mesh(&mut self, mesh: usize, joint_bones: &[usize]) -> &mut Self {
        self.skinned.push(SkinnedBinding {
            mesh,
            joint_bones: joint_bones.to_vec(),
        });
        self
    }

    pub fn build(&self) -> Result<BuiltSkeleton, IntegrityError> {
        validate_nodes(self.nodes)?;
        let count = self.nodes.len();

        let mut bones: Vec<Bone> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| Bone {
                name: node.name.clone(),
                index,
                default_pose: node.transform,
                parent: node.parent,
                children: Vec::new(),
                mesh: None,
            })
            .collect();

        let by_name: HashMap<&str, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.name.as_str(), i))
            .collect();
        for (name, mesh) in &self.attachments {
            match by_name.get(name.as_str()) {
                Some(&bone) => bones[bone].mesh = Some(*mesh),
                None => tracing::warn!("Mesh attachment '{}' matches no bone, skipping", name),
            }
        }

        // Parents are validated, so pushing in index order keeps children in source order.
        let mut natural_roots = Vec::new();
        for (i, node) in self.nodes.iter().enumerate() {
            match node.parent {
                Some(parent) => bones[parent].children.push(i),
                None => natural_roots.push(i),
            }
        }

        for binding in &self.skinned {
            if let Some(&bad) = binding.joint_bones.iter().find(|&&b| b >= count) {
                return Err(IntegrityError::IndexOutOfRange {
                    what: "skin joint",
                    index: bad,
                    len: count,
                });
            }
        }

        let root = if self.skinned.is_empty() && natural_roots.len() == 1 {
            natural_roots[0]
        } else {
            let root = bones.len();
            bones.push(Bone {
                name: SYNTHETIC_ROOT.to_string(),
                index: root,
                default_pose: SrtTransform::IDENTITY,
                parent: None,
                children: Vec::new(),
                mesh: None,
            });

            let mut children = Vec::with_capacity(self.skinned.len() + natural_roots.len());
            for (i, binding) in self.skinned.iter().enumerate() {
                let index = bones.len();
                bones.push(Bone {
                    name: format!("_MESH{}", i),
                    index,
                    default_pose: SrtTransform::IDENTITY,
                    parent: Some(root),
                    children: Vec::new(),
                    mesh: Some(binding.mesh),
                });
                children.push(index);
            }
            for &natural in &natural_roots {
                bones[natural].parent = Some(root);
                children.push(natural);
            }
            bones[root].children = children;
            root
        };

        let skins = self
            .skinned
            .iter()
            .map(|b| Skin::with_identity_offsets(&b.joint_bones))
            .collect();

        Ok(BuiltSkeleton {
            skeleton: Skeleton {
                bones,
                root,
                node_count: count,
            },
            skins,
        })
    }
}

fn validate_nodes(nodes: &[SkeletonNode]) -> Result<(), IntegrityError> {
    let count = nodes.len();
    if count == 0 {
        return Err(IntegrityError::EmptySkeleton);
    }

    let mut names = HashSet::with_capacity(count);
    for node in nodes {
        if !names.insert(node.name.as_str()) {
            return Err(IntegrityError::DuplicateBoneName {
                name: node.name.clone(),
            });
        }
    }

    for (i, node) in nodes.iter().enumerate() {
        if let Some(parent) = node.parent {
            if parent >= count {
                return Err(IntegrityError::ParentOutOfRange {
                    node: i,
                    parent,
                    count,
                });
            }
        }
    }

    // A walk longer than the node count must have revisited a node.
    for start in 0..count {
        let mut current = nodes[start].parent;
        let mut steps = 0;
        while let Some(p) = current {
            if p == start || steps >= count {
                return Err(IntegrityError::CyclicHierarchy { node: start });
            }
            current = nodes[p].parent;
            steps += 1;
        }
    }

    Ok(())
}
