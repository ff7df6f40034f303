//! Keyframe clip construction
//!
//! Samples arrive frame-major: for `n` animated nodes, frame `j` of node `k`
//! lives at `k + j * n`. Every sample becomes one keyframe; the first key
//! sits one step after zero and the last one lands exactly on the duration.

use hashbrown::{HashMap, HashSet};
use zenview_shared::AnimationSample;

use crate::coords::{convert_position_array, convert_rotation_array};
use crate::error::IntegrityError;
use crate::skeleton::{Skeleton, SrtTransform};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    /// Seconds from clip start
    pub time: f32,
    pub transform: SrtTransform,
}

/// Keyframes for one bone
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationChannel {
    pub bone: usize,
    pub keyframes: Vec<Keyframe>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    /// Seconds
    pub duration: f32,
    pub channels: Vec<AnimationChannel>,
}

/// Clips by name; inserting an existing name replaces the earlier clip
pub type ClipTable = HashMap<String, AnimationClip>;

/// Build one clip from raw samples
pub fn build_clip(
    name: &str,
    frame_rate: f32,
    frame_count: usize,
    node_indices: &[usize],
    samples: &[AnimationSample],
    skeleton: &Skeleton,
) -> Result<AnimationClip, IntegrityError> {
    if !frame_rate.is_finite() || frame_rate <= 0.0 {
        return Err(IntegrityError::InvalidFrameRate { fps: frame_rate });
    }

    let node_count = node_indices.len();
    let expected = frame_count * node_count;
    if samples.len() != expected {
        return Err(IntegrityError::SampleCountMismatch {
            expected,
            found: samples.len(),
        });
    }

    let mut seen = HashSet::with_capacity(node_count);
    if let Some(&node) = node_indices.iter().find(|&&node| !seen.insert(node)) {
        return Err(IntegrityError::DuplicateAnimationNode { node });
    }

    let step = 1.0 / frame_rate;
    let mut channels = Vec::with_capacity(node_count);
    for (k, &node) in node_indices.iter().enumerate() {
        let bone = skeleton
            .bones
            .get(node)
            .filter(|_| node < skeleton.node_count)
            .ok_or(IntegrityError::AnimationNodeOutOfRange {
                node,
                bones: skeleton.node_count,
            })?;
        let scale = bone.default_pose.scale;

        let keyframes = (0..frame_count)
            .map(|j| {
                let sample = &samples[k + j * node_count];
                Keyframe {
                    time: (j + 1) as f32 * step,
                    transform: SrtTransform {
                        scale,
                        rotation: convert_rotation_array(sample.rotation),
                        translation: convert_position_array(sample.position),
                    },
                }
            })
            .collect();

        channels.push(AnimationChannel { bone: node, keyframes });
    }

    Ok(AnimationClip {
        name: name.to_string(),
        duration: frame_count as f32 * step,
        channels,
    })
}
