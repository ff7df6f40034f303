//! Math types for source records
//!
//! Provides POD (Plain Old Data) math types that are serializable and
//! can be shared across crates without requiring glam as a dependency.
//! Conversion into the renderer's coordinate system lives in `zenview-core`.

use bitcode::{Decode, Encode};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 4x4 transform as stored by the source engine (row-major, row-vector convention)
///
/// Points are transformed as `p' = p * M`, so the translation lives in the
/// fourth row. Memory layout (64 bytes):
/// - row0: X basis + 0
/// - row1: Y basis + 0
/// - row2: Z basis + 0
/// - row3: translation + 1
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Encode, Decode, Pod, Zeroable)]
#[repr(C)]
pub struct SourceMatrix {
    /// Rows of the matrix, `rows[r][c]`
    pub rows: [[f32; 4]; 4],
}

impl Default for SourceMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl SourceMatrix {
    /// Identity matrix (no transformation)
    pub const IDENTITY: Self = Self {
        rows: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Create from row arrays
    pub const fn from_rows(row0: [f32; 4], row1: [f32; 4], row2: [f32; 4], row3: [f32; 4]) -> Self {
        Self {
            rows: [row0, row1, row2, row3],
        }
    }

    /// Pure translation in source space
    pub const fn from_translation(t: [f32; 3]) -> Self {
        Self::from_rows(
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [t[0], t[1], t[2], 1.0],
        )
    }

    /// Translation part (fourth row)
    pub fn translation(&self) -> [f32; 3] {
        [self.rows[3][0], self.rows[3][1], self.rows[3][2]]
    }

    /// Flatten to a row-major f32 array
    pub fn to_array(&self) -> [f32; 16] {
        let mut out = [0.0; 16];
        for (r, row) in self.rows.iter().enumerate() {
            out[r * 4..r * 4 + 4].copy_from_slice(row);
        }
        out
    }

    /// Create from a flat row-major f32 array
    pub fn from_array(arr: [f32; 16]) -> Self {
        Self::from_rows(
            [arr[0], arr[1], arr[2], arr[3]],
            [arr[4], arr[5], arr[6], arr[7]],
            [arr[8], arr[9], arr[10], arr[11]],
            [arr[12], arr[13], arr[14], arr[15]],
        )
    }
}
