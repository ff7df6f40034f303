//! World partitioning
//!
//! The static world arrives as one large polygon soup. It is split into an
//! N x N grid over the XZ footprint so the renderer can cull whole cells.
//! Each polygon lands in exactly one cell: the first cell (row-major, x outer)
//! whose box touches the polygon's box. Polygons straddling a border are not
//! clipped, so a cell's drawn geometry may poke slightly past its bounds.
//!
//! Inside a cell, polygons are batched by material. Materials sampling the
//! same texture share one batch.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use hashbrown::HashMap;
use zenview_shared::WorldMesh;

use crate::bounds::Aabb;
use crate::coords::convert_position_array;
use crate::error::{AssetError, IntegrityError, Result};
use crate::material::{Material, MaterialResolver};
use crate::mesh::{MeshBuilder, MeshPart};
use crate::vertex::StaticVertex;

/// Largest supported cells per grid side
pub const MAX_GRID_SIZE: usize = 256;

/// One drawable unit of a cell
#[derive(Debug, Clone)]
pub struct RenderBatch {
    pub part: MeshPart,
    pub material: Arc<Material>,
}

#[derive(Debug, Clone)]
pub struct Cell {
    pub bounds: Aabb,
    pub batches: Vec<RenderBatch>,
    /// Source polygons assigned to this cell, including untextured ones
    pub polygon_count: usize,
}

/// Uniform XZ split of a world box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub size: usize,
    pub bounds: Aabb,
}

impl GridLayout {
    /// `size` is clamped to `1..=MAX_GRID_SIZE`
    pub fn new(size: usize, bounds: Aabb) -> Self {
        Self {
            size: size.clamp(1, MAX_GRID_SIZE),
            bounds,
        }
    }

    pub fn cell_count(&self) -> usize {
        self.size * self.size
    }

    /// Row-major cell index
    pub fn cell_index(&self, x: usize, z: usize) -> usize {
        x * self.size + z
    }

    /// Box of cell `(x, z)`, spanning the full world height
    ///
    /// The last row and column end exactly on the world max.
    pub fn cell_bounds(&self, x: usize, z: usize) -> Aabb {
        let n = self.size as f32;
        let extent = self.bounds.size();
        let lo = self.bounds.min;
        let hi = self.bounds.max;

        let axis = |i: usize, min: f32, max: f32, len: f32| {
            let start = min + len * i as f32 / n;
            let end = if i + 1 == self.size {
                max
            } else {
                min + len * (i + 1) as f32 / n
            };
            (start, end)
        };
        let (x0, x1) = axis(x, lo.x, hi.x, extent.x);
        let (z0, z1) = axis(z, lo.z, hi.z, extent.z);

        Aabb::new(Vec3::new(x0, lo.y, z0), Vec3::new(x1, hi.y, z1))
    }

    /// First cell in row-major order touching `bounds`
    pub fn first_intersecting(&self, bounds: &Aabb) -> Option<usize> {
        for x in 0..self.size {
            for z in 0..self.size {
                if self.cell_bounds(x, z).intersects(bounds) {
                    return Some(self.cell_index(x, z));
                }
            }
        }
        None
    }

    /// Cells whose XZ footprint lies within `radius` of `center`
    pub fn cells_in_range(&self, center: Vec3, radius: f32) -> Vec<usize> {
        let c = Vec2::new(center.x, center.z);
        let mut out = Vec::new();
        for x in 0..self.size {
            for z in 0..self.size {
                let b = self.cell_bounds(x, z);
                let nearest = c.clamp(Vec2::new(b.min.x, b.min.z), Vec2::new(b.max.x, b.max.z));
                if nearest.distance(c) <= radius {
                    out.push(self.cell_index(x, z));
                }
            }
        }
        out
    }
}

/// Partitioned world
#[derive(Debug, Clone)]
pub struct WorldGrid {
    pub size: usize,
    pub bounds: Aabb,
    /// Row-major, `x * size + z`
    pub cells: Vec<Cell>,
}

impl WorldGrid {
    pub fn layout(&self) -> GridLayout {
        GridLayout::new(self.size, self.bounds)
    }

    pub fn cell(&self, x: usize, z: usize) -> Option<&Cell> {
        if x >= self.size || z >= self.size {
            return None;
        }
        self.cells.get(x * self.size + z)
    }

    pub fn cell_bounds(&self, x: usize, z: usize) -> Aabb {
        self.layout().cell_bounds(x, z)
    }

    pub fn cells_in_range(&self, center: Vec3, radius: f32) -> Vec<usize> {
        self.layout().cells_in_range(center, radius)
    }

    pub fn polygon_count(&self) -> usize {
        self.cells.iter().map(|c| c.polygon_count).sum()
    }

    pub fn batch_count(&self) -> usize {
        self.cells.iter().map(|c| c.batches.len()).sum()
    }
}

/// Splits a world mesh into an N x N grid of batched cells
#[derive(Debug, Clone)]
pub struct WorldPartitioner {
    grid_size: usize,
    flip: bool,
    label: String,
}

impl WorldPartitioner {
    /// `grid_size` is clamped to `1..=MAX_GRID_SIZE`
    pub fn new(grid_size: usize, flip: bool) -> Self {
        if grid_size > MAX_GRID_SIZE {
            tracing::warn!("Grid size {} clamped to {}", grid_size, MAX_GRID_SIZE);
        }
        Self {
            grid_size: grid_size.clamp(1, MAX_GRID_SIZE),
            flip,
            label: "world".to_string(),
        }
    }

    /// Name reported in integrity errors
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Check polygon corner lists and indices against the mesh pools
    pub fn validate(mesh: &WorldMesh) -> std::result::Result<(), IntegrityError> {
        for (i, polygon) in mesh.polygons.iter().enumerate() {
            let corners = polygon.position_indices.len();
            if polygon.feature_indices.len() != corners {
                return Err(IntegrityError::PolygonIndexMismatch {
                    polygon: i,
                    features: polygon.feature_indices.len(),
                    positions: corners,
                });
            }
            if corners < 3 {
                return Err(IntegrityError::DegeneratePolygon { polygon: i, corners });
            }
            check_index("material", polygon.material_index, mesh.materials.len())?;
            for &p in &polygon.position_indices {
                check_index("position", p, mesh.positions.len())?;
            }
            for &f in &polygon.feature_indices {
                check_index("feature", f, mesh.features.len())?;
            }
        }
        Ok(())
    }

    /// Grid layout over the referenced positions and the cell of every polygon
    pub fn assign_cells(
        &self,
        mesh: &WorldMesh,
    ) -> std::result::Result<(GridLayout, Vec<usize>), IntegrityError> {
        Self::validate(mesh)?;
        let positions: Vec<Vec3> = mesh.positions.iter().map(|&p| convert_position_array(p)).collect();
        self.assign_converted(mesh, &positions)
    }

    fn assign_converted(
        &self,
        mesh: &WorldMesh,
        positions: &[Vec3],
    ) -> std::result::Result<(GridLayout, Vec<usize>), IntegrityError> {
        let polygon_bounds: Vec<Aabb> = mesh
            .polygons
            .iter()
            .map(|p| Aabb::from_points(p.position_indices.iter().map(|&i| positions[i as usize])))
            .collect();

        let world_bounds = if polygon_bounds.is_empty() {
            Aabb::new(Vec3::ZERO, Vec3::ZERO)
        } else {
            polygon_bounds.iter().fold(Aabb::EMPTY, |acc, b| acc.union(b))
        };
        let layout = GridLayout::new(self.grid_size, world_bounds);

        let assignment = polygon_bounds
            .iter()
            .enumerate()
            .map(|(i, b)| {
                layout
                    .first_intersecting(b)
                    .ok_or(IntegrityError::UnassignedPolygon { polygon: i })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok((layout, assignment))
    }

    /// Build the batched grid
    pub fn partition<M: MaterialResolver + ?Sized>(
        &self,
        mesh: &WorldMesh,
        materials: &mut M,
    ) -> Result<WorldGrid> {
        let integrity = |e| AssetError::integrity(self.label.clone(), e);

        Self::validate(mesh).map_err(integrity)?;
        let positions: Vec<Vec3> = mesh.positions.iter().map(|&p| convert_position_array(p)).collect();
        let normals: Vec<Vec3> = mesh
            .features
            .iter()
            .map(|f| convert_position_array(f.normal))
            .collect();
        let (layout, assignment) = self.assign_converted(mesh, &positions).map_err(integrity)?;

        let mut per_cell: Vec<Vec<usize>> = vec![Vec::new(); layout.cell_count()];
        for (polygon, &cell) in assignment.iter().enumerate() {
            per_cell[cell].push(polygon);
        }

        let mut cells = Vec::with_capacity(layout.cell_count());
        for x in 0..layout.size {
            for z in 0..layout.size {
                let polygons = &per_cell[layout.cell_index(x, z)];
                let batches = self.build_batches(mesh, &positions, &normals, polygons, materials)?;
                cells.push(Cell {
                    bounds: layout.cell_bounds(x, z),
                    batches,
                    polygon_count: polygons.len(),
                });
            }
        }

        let grid = WorldGrid {
            size: layout.size,
            bounds: layout.bounds,
            cells,
        };
        tracing::info!(
            "Partitioned '{}': {} cells, {} polygons, {} batches",
            self.label,
            grid.cells.len(),
            grid.polygon_count(),
            grid.batch_count()
        );
        Ok(grid)
    }

    fn build_batches<M: MaterialResolver + ?Sized>(
        &self,
        mesh: &WorldMesh,
        positions: &[Vec3],
        normals: &[Vec3],
        polygons: &[usize],
        materials: &mut M,
    ) -> Result<Vec<RenderBatch>> {
        // Group by source material, first-seen order
        let mut by_material: Vec<(u32, Vec<usize>)> = Vec::new();
        let mut material_slot: HashMap<u32, usize> = HashMap::new();
        for &p in polygons {
            let material = mesh.polygons[p].material_index;
            let slot = *material_slot.entry(material).or_insert_with(|| {
                by_material.push((material, Vec::new()));
                by_material.len() - 1
            });
            by_material[slot].1.push(p);
        }

        // Merge source materials that resolve to the same texture
        let mut groups: Vec<(Arc<Material>, Vec<usize>)> = Vec::new();
        let mut texture_slot: HashMap<String, usize> = HashMap::new();
        for (material_index, polys) in by_material {
            let Some(material) = materials.resolve(&mesh.materials[material_index as usize])? else {
                continue;
            };
            match texture_slot.get(&material.texture_name) {
                Some(&slot) => groups[slot].1.extend(polys),
                None => {
                    texture_slot.insert(material.texture_name.clone(), groups.len());
                    groups.push((material, polys));
                }
            }
        }

        let mut batches = Vec::with_capacity(groups.len());
        for (material, polys) in groups {
            let mut builder: MeshBuilder<StaticVertex, (u32, u32)> = MeshBuilder::new();
            let mut corners = Vec::new();
            for p in polys {
                let polygon = &mesh.polygons[p];
                corners.clear();
                for (&f, &v) in polygon.feature_indices.iter().zip(&polygon.position_indices) {
                    let index = builder.add_keyed_vertex((f, v), || {
                        let feature = &mesh.features[f as usize];
                        StaticVertex::new(
                            positions[v as usize],
                            normals[f as usize],
                            Vec2::from_array(feature.uv),
                        )
                    });
                    corners.push(index);
                }
                builder.add_polygon_fan(&corners);
            }
            let part = builder.finish(self.flip).with_material(Some(material.clone()));
            batches.push(RenderBatch { part, material });
        }
        Ok(batches)
    }
}

fn check_index(what: &'static str, index: u32, len: usize) -> std::result::Result<(), IntegrityError> {
    if index as usize >= len {
        return Err(IntegrityError::IndexOutOfRange {
            what,
            index: index as usize,
            len,
        });
    }
    Ok(())
}
