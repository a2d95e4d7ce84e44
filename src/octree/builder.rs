//! Octree construction from a posed model

use std::time::Instant;

use log::{info, warn};
use rayon::prelude::*;

use super::config::BuildConfig;
use crate::core::types::{Mat4, Result, Vec3};
use crate::math::{Aabb, octant_sign};
use crate::model::Model;
use super::cell::Cell;
use super::layout::{DepthFirst, Visit};
use super::primitive::Primitive;
use super::split::{CellSplit, PreparedPrimitive, SplitContext, split_cell};
use super::{Octree, PrimitiveIndex};

/// Smallest root half-size, used for empty or flat models
pub const MIN_HALF_SIZE: f32 = 1e-3;

/// Builds an octree from a model according to a `BuildConfig`
#[derive(Clone, Debug, Default)]
pub struct OctreeBuilder {
    config: BuildConfig,
}

impl OctreeBuilder {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build with an identity world matrix
    pub fn build(&self, model: &Model) -> Result<Octree> {
        self.build_with_world(model, Mat4::IDENTITY)
    }

    /// Build with every node transform premultiplied by `world`
    pub fn build_with_world(&self, model: &Model, world: Mat4) -> Result<Octree> {
        self.config.validate()?;
        let start = Instant::now();

        let prepared = prepare_primitives(model, &world);
        let (center, half) = root_cube(&prepared, self.config.root_padding);

        let mut octree = Octree::with_root(
            center,
            Vec3::splat(half),
            self.config.max_level,
            world,
            model.nodes.clone(),
        );
        octree.options = self.config.options;
        create_cells(&mut octree);

        let (transparent, opaque): (Vec<u32>, Vec<u32>) = prepared
            .iter()
            .flatten()
            .map(|p| p.source as u32)
            .partition(|&i| prepared[i as usize].as_ref().is_some_and(PreparedPrimitive::is_transparent));
        for cell in &mut octree.cells {
            cell_dispatch_primitives(cell, &prepared, &opaque, &transparent);
        }

        self.split_cells(&mut octree, model, &prepared)?;
        octree.check_invariants()?;

        let root = octree.root().map(|c| c.triangle_count).unwrap_or(0);
        info!(
            "Built octree: {} cells, {} primitives, {} root triangles, max level {} in {:.2?}",
            octree.cells.len(),
            octree.primitives.len(),
            root,
            octree.max_level,
            start.elapsed()
        );
        Ok(octree)
    }

    fn split_cells(&self, octree: &mut Octree, model: &Model, prepared: &[Option<PreparedPrimitive>]) -> Result<()> {
        let ctx = SplitContext {
            model,
            prepared,
            collisions: self.config.options.collisions(),
        };

        let splits: Vec<CellSplit> = if self.config.parallel {
            octree
                .cells
                .par_iter()
                .map(|cell| split_cell(cell, &ctx))
                .collect::<Result<_>>()?
        } else {
            octree
                .cells
                .iter()
                .map(|cell| split_cell(cell, &ctx))
                .collect::<Result<_>>()?
        };

        for (cell, split) in octree.cells.iter_mut().zip(splits) {
            merge_split(cell, split, &mut octree.primitives);
        }
        Ok(())
    }
}

/// Validate and resolve every source primitive; malformed ones are skipped
fn prepare_primitives(model: &Model, world: &Mat4) -> Vec<Option<PreparedPrimitive>> {
    (0..model.primitives.len())
        .map(|i| match PreparedPrimitive::prepare(model, world, i) {
            Ok(prepared) => Some(prepared),
            Err(e) => {
                warn!("Skipping primitive {}: {}", i, e);
                None
            }
        })
        .collect()
}

/// Cube around the world bounds of all usable primitives
fn root_cube(prepared: &[Option<PreparedPrimitive>], padding: f32) -> (Vec3, f32) {
    let bounds = prepared
        .iter()
        .flatten()
        .map(|p| p.bounds)
        .filter(Aabb::is_valid)
        .fold(Aabb::EMPTY, |acc, b| acc.merged(&b));
    if !bounds.is_valid() {
        return (Vec3::ZERO, MIN_HALF_SIZE.max(padding));
    }
    let half = (bounds.half_extent().max_element() + padding).max(MIN_HALF_SIZE);
    (bounds.center(), half)
}

/// Fill the flat cell array depth first; children sit at `center + octant * size / 2`
pub(crate) fn create_cells(octree: &mut Octree) {
    let layout = &octree.layout;
    let (root_center, root_size) = (octree.center, octree.size);
    let mut cells = vec![Cell::default(); layout.cell_count()];

    DepthFirst::new(layout).walk(|index, level, parent| {
        let (center, size) = match parent {
            None => (root_center, root_size),
            Some((p, octant)) => {
                let parent = &cells[p.index()];
                let half = parent.size * 0.5;
                (parent.center + octant_sign(octant) * half, half)
            }
        };
        let mut cell = Cell::new(index, level, center, size);
        cell.children = layout.children(index);
        cells[index.index()] = cell;
        Visit::Descend
    });

    octree.cells = cells;
}

/// Keep the candidates whose world bounds overlap the cell
pub fn cell_dispatch_primitives(
    cell: &mut Cell,
    prepared: &[Option<PreparedPrimitive>],
    opaque: &[u32],
    transparent: &[u32],
) {
    let bounds = cell.aabb();
    let overlaps = |i: u32| {
        prepared
            .get(i as usize)
            .and_then(Option::as_ref)
            .is_some_and(|p| p.bounds.intersects(&bounds))
    };
    cell.opaque_primitives = opaque.iter().copied().filter(|&i| overlaps(i)).collect();
    cell.transparent_primitives = transparent.iter().copied().filter(|&i| overlaps(i)).collect();
}

fn merge_split(cell: &mut Cell, split: CellSplit, primitives: &mut Vec<Primitive>) {
    cell.opaque_triangle_count = split.opaque.triangle_count;
    cell.transparent_triangle_count = split.transparent.triangle_count;
    cell.triangle_count = split.opaque.triangle_count + split.transparent.triangle_count;
    cell.opaques = merge_primitives(split.opaque.primitives, primitives);
    cell.transparents = merge_primitives(split.transparent.primitives, primitives);
    for [a, b, c] in split.triangles {
        cell.push_collision_triangle(a, b, c);
    }
}

/// Move non-empty cell-local primitives into the master array
fn merge_primitives(locals: Vec<Primitive>, primitives: &mut Vec<Primitive>) -> Vec<Option<PrimitiveIndex>> {
    locals
        .into_iter()
        .map(|p| {
            if p.is_empty() {
                return None;
            }
            primitives.push(p);
            Some(PrimitiveIndex((primitives.len() - 1) as u32))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::octree::config::OctreeOptions;
    use crate::geometry::IndexBuffer;
    use crate::model::{AlphaMode, AttributeSemantic, ChannelFormat, Material, SourcePrimitive, VertexLayout};
    use crate::octree::layout::cell_count;

    fn add_triangle(model: &mut Model, points: [[f32; 3]; 3], material: usize) {
        let layout = VertexLayout::packed(&[(AttributeSemantic::Position, ChannelFormat::F32, 3)]);
        let bytes = bytemuck::cast_slice(&points).to_vec();
        model.add_primitive(SourcePrimitive::new(0, material, layout, bytes, IndexBuffer::from_u16(&[0, 1, 2])));
    }

    fn single_triangle_model() -> Model {
        let mut model = Model::new();
        model.add_node(Mat4::IDENTITY);
        model.add_material(Material::default());
        add_triangle(&mut model, [[-0.5, -0.5, -0.5], [0.5, -0.5, 0.5], [0.0, 0.5, 0.0]], 0);
        model
    }

    #[test]
    fn test_single_triangle_level_one() {
        let model = single_triangle_model();
        let octree = OctreeBuilder::new(BuildConfig::with_max_level(1)).build(&model).expect("build");

        assert_eq!(octree.cells().len(), 9);
        assert_eq!(octree.center, Vec3::ZERO);
        assert_eq!(octree.size, Vec3::splat(0.5));

        let root = octree.root().expect("root");
        assert_eq!(root.triangle_count, 1);
        let children = root.children.expect("root has children");

        let mut assigned = 0;
        let mut with_geometry = 0;
        let mut total = 0;
        for child in children {
            let cell = octree.cell(child).expect("child");
            assert!(cell.is_leaf());
            if !cell.opaque_primitives.is_empty() {
                assigned += 1;
            }
            if cell.opaques.iter().any(Option::is_some) {
                with_geometry += 1;
            }
            total += cell.triangle_count;
        }
        assert!((1..=8).contains(&assigned));
        assert!((1..=assigned).contains(&with_geometry));
        assert!(total >= 1);
    }

    #[test]
    fn test_clipped_away_primitive_recorded_as_none() {
        // The plane x + y + z = 1.2 crosses many cell boxes its triangle misses
        let mut model = Model::new();
        model.add_node(Mat4::IDENTITY);
        model.add_material(Material::default());
        add_triangle(&mut model, [[1.2, 0.0, 0.0], [0.0, 1.2, 0.0], [0.0, 0.0, 1.2]], 0);
        let octree = OctreeBuilder::new(BuildConfig::with_max_level(2)).build(&model).expect("build");

        let empty_refs = |octree: &Octree| -> usize {
            octree.cells().iter().map(|c| c.opaques.iter().filter(|r| r.is_none()).count()).sum()
        };
        let empty = empty_refs(&octree);
        assert!(empty > 0);
        for cell in octree.cells() {
            if cell.opaques.iter().any(Option::is_none) {
                assert!(!cell.opaque_primitives.is_empty());
            }
        }

        let mut bytes = Vec::new();
        octree.write_to(&mut bytes, OctreeOptions::GRAPHICS).expect("write");
        let loaded = Octree::read_from(&mut bytes.as_slice()).expect("read");
        assert_eq!(empty_refs(&loaded), empty);
        assert_eq!(loaded.cells(), octree.cells());
    }

    #[test]
    fn test_cell_count_per_level() {
        let model = single_triangle_model();
        for level in 0..=3 {
            let octree = OctreeBuilder::new(BuildConfig::with_max_level(level)).build(&model).expect("build");
            assert_eq!(octree.cells().len(), cell_count(level));
            assert!(octree.check_invariants().is_ok());
        }
    }

    #[test]
    fn test_children_subdivide_parent() {
        let model = single_triangle_model();
        let octree = OctreeBuilder::new(BuildConfig::with_max_level(2)).build(&model).expect("build");
        for cell in octree.cells() {
            let Some(children) = cell.children else { continue };
            for (k, child) in children.iter().enumerate() {
                let child = octree.cell(*child).expect("child");
                assert_eq!(child.level, cell.level + 1);
                assert_eq!(child.size, cell.size * 0.5);
                assert_eq!(child.center, cell.center + octant_sign(k as u8) * cell.size * 0.5);
            }
        }
    }

    #[test]
    fn test_malformed_primitive_skipped() {
        let mut model = single_triangle_model();
        add_triangle(&mut model, [[0.0; 3], [0.1, 0.0, 0.0], [0.0, 0.1, 0.0]], 9);
        let octree = OctreeBuilder::new(BuildConfig::with_max_level(1)).build(&model).expect("build");
        let root = octree.root().expect("root");
        assert_eq!(root.opaque_primitives, vec![0]);
        assert_eq!(root.triangle_count, 1);
    }

    #[test]
    fn test_transparent_pass_separated() {
        let mut model = single_triangle_model();
        let blend = model.add_material(Material {
            alpha_mode: AlphaMode::Blend,
            ..Default::default()
        });
        add_triangle(&mut model, [[-0.2, -0.2, 0.0], [0.2, -0.2, 0.0], [0.0, 0.2, 0.0]], blend);
        let octree = OctreeBuilder::new(BuildConfig::with_max_level(1)).build(&model).expect("build");
        let root = octree.root().expect("root");
        assert_eq!(root.opaque_primitives, vec![0]);
        assert_eq!(root.transparent_primitives, vec![1]);
        assert_eq!(root.opaque_triangle_count, 1);
        assert_eq!(root.transparent_triangle_count, 1);
        assert_eq!(root.triangle_count, 2);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut model = single_triangle_model();
        add_triangle(&mut model, [[-0.4, 0.3, -0.2], [0.3, 0.4, 0.1], [0.1, -0.4, 0.4]], 0);
        let config = BuildConfig::with_max_level(2).options(OctreeOptions::ALL);
        let sequential = OctreeBuilder::new(config.clone()).build(&model).expect("build");
        let parallel = OctreeBuilder::new(config.parallel(true)).build(&model).expect("build");
        assert_eq!(sequential.cells(), parallel.cells());
        assert_eq!(sequential.primitives(), parallel.primitives());
    }

    #[test]
    fn test_collisions_only_when_requested() {
        let model = single_triangle_model();
        let plain = OctreeBuilder::new(BuildConfig::with_max_level(1)).build(&model).expect("build");
        assert!(plain.cells().iter().all(|c| c.positions.is_empty()));

        let config = BuildConfig::with_max_level(1).options(OctreeOptions::ALL);
        let octree = OctreeBuilder::new(config).build(&model).expect("build");
        for cell in octree.cells() {
            assert_eq!(cell.positions.len(), cell.triangle_count as usize * 9);
        }
    }

    #[test]
    fn test_empty_model_builds_minimal_root() {
        let octree = OctreeBuilder::default().build(&Model::new()).expect("build");
        assert_eq!(octree.center, Vec3::ZERO);
        assert_eq!(octree.size, Vec3::splat(MIN_HALF_SIZE));
        assert!(octree.primitives().is_empty());
    }

    #[test]
    fn test_root_padding() {
        let model = single_triangle_model();
        let config = BuildConfig {
            root_padding: 0.25,
            ..BuildConfig::with_max_level(0)
        };
        let octree = OctreeBuilder::new(config).build(&model).expect("build");
        assert_eq!(octree.size, Vec3::splat(0.75));
    }
}
