//! Skin bindings: dense joint tables and per-vertex blend attributes
//!
//! A skinned mesh binds to a subset of skeleton nodes. Vertices address
//! joints by a dense local index (stored as `u8`), so each mesh carries a
//! table mapping local joints back to skeleton bones.

use glam::{Mat4, Vec3};
use hashbrown::HashMap;

use crate::error::IntegrityError;

/// Maximum joints per skin (u8 blend indices)
pub const MAX_JOINTS: usize = 256;

/// Maximum influences per vertex
pub const MAX_INFLUENCES: usize = 4;

/// One bone influence on a vertex, already in renderer space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkinWeight {
    /// Skeleton node index
    pub node: usize,
    pub weight: f32,
    /// Vertex position in the influencing node's local space
    pub position: Vec3,
}

/// Packed per-vertex skinning data
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlendAttributes {
    pub joints: [u8; 4],
    /// Normalized to sum to 1
    pub weights: [f32; 4],
    pub positions: [[f32; 3]; 4],
}

/// Joint of a finished skin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkinJoint {
    /// Skeleton bone driving this joint
    pub bone: usize,
    /// Bind offset applied before the bone's world transform
    pub offset: Mat4,
}

/// Joint table of one skinned mesh
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Skin {
    pub joints: Vec<SkinJoint>,
}

impl Skin {
    /// Skin whose joints need no bind correction
    ///
    /// Soft-skinned vertices store their positions per influence in joint
    /// space, so the joint's world transform alone places them.
    pub fn with_identity_offsets(joint_bones: &[usize]) -> Self {
        Self {
            joints: joint_bones
                .iter()
                .map(|&bone| SkinJoint {
                    bone,
                    offset: Mat4::IDENTITY,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }
}

/// Dense node-to-joint map for one skinned mesh
#[derive(Debug, Clone)]
pub struct SkinBuilder {
    local: HashMap<usize, u8>,
    joint_bones: Vec<usize>,
}

impl SkinBuilder {
    /// Assign local joints in first-seen order
    pub fn new(node_indices: &[usize]) -> Result<Self, IntegrityError> {
        let mut local = HashMap::new();
        let mut joint_bones = Vec::new();
        for &node in node_indices {
            if local.contains_key(&node) {
                continue;
            }
            if joint_bones.len() == MAX_JOINTS {
                let unique = joint_bones.len()
                    + node_indices
                        .iter()
                        .filter(|n| !local.contains_key(*n))
                        .collect::<hashbrown::HashSet<_>>()
                        .len();
                return Err(IntegrityError::TooManyJoints {
                    count: unique,
                    max: MAX_JOINTS,
                });
            }
            local.insert(node, joint_bones.len() as u8);
            joint_bones.push(node);
        }
        Ok(Self { local, joint_bones })
    }

    /// Skeleton bone per local joint, in joint order
    pub fn joint_bones(&self) -> &[usize] {
        &self.joint_bones
    }

    pub fn joint_count(&self) -> usize {
        self.joint_bones.len()
    }

    /// Pack up to four influences into blend attributes
    ///
    /// Influences past the fourth are ignored; the kept weights are
    /// renormalized. Unused slots are joint 0 with weight 0.
    pub fn blend_attributes(&self, influences: &[SkinWeight]) -> Result<BlendAttributes, IntegrityError> {
        let mut attributes = BlendAttributes::default();
        for (slot, influence) in influences.iter().take(MAX_INFLUENCES).enumerate() {
            let joint = *self
                .local
                .get(&influence.node)
                .ok_or(IntegrityError::UnknownSkinNode {
                    node: influence.node,
                })?;
            attributes.joints[slot] = joint;
            attributes.weights[slot] = influence.weight;
            attributes.positions[slot] = influence.position.to_array();
        }

        let sum: f32 = attributes.weights.iter().sum();
        if !sum.is_finite() || sum <= 0.0 {
            return Err(IntegrityError::ZeroWeightSum);
        }
        for weight in &mut attributes.weights {
            *weight /= sum;
        }
        Ok(attributes)
    }

    pub fn build(&self) -> Skin {
        Skin::with_identity_offsets(&self.joint_bones)
    }
}
