//! Per-frame grouping of visible primitives by material key

use crate::model::{Material, MaterialKey};
use super::cell::Cell;
use super::primitive::Primitive;
use super::{CellIndex, PrimitiveIndex, RenderPass};

/// Visible primitives sharing one material key
#[derive(Clone, Debug, PartialEq)]
pub struct PrimitiveBucket {
    pub key: MaterialKey,
    /// Shading state of the primitive that created the bucket
    pub material: Material,
    pub primitives: Vec<PrimitiveIndex>,
}

impl PrimitiveBucket {
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

/// Buckets kept across frames; members are rebuilt on every sort
#[derive(Clone, Debug, Default)]
pub struct BucketList {
    buckets: Vec<PrimitiveBucket>,
}

impl BucketList {
    /// Regroup the `pass` primitives of `visibles` in visiting order.
    ///
    /// Existing buckets keep their position; a bucket with no visible member
    /// this frame stays in the list with an empty member list.
    pub fn sort(
        &mut self,
        cells: &[Cell],
        primitives: &[Primitive],
        visibles: &[CellIndex],
        pass: RenderPass,
    ) -> &[PrimitiveBucket] {
        for bucket in &mut self.buckets {
            bucket.primitives.clear();
        }

        for cell in visibles.iter().filter_map(|v| cells.get(v.index())) {
            for &index in cell.primitives(pass).iter().flatten() {
                let Some(primitive) = primitives.get(index.index()) else {
                    continue;
                };
                match self.buckets.iter_mut().find(|b| b.key == primitive.material_key) {
                    Some(bucket) => bucket.primitives.push(index),
                    None => self.buckets.push(PrimitiveBucket {
                        key: primitive.material_key,
                        material: primitive.material,
                        primitives: vec![index],
                    }),
                }
            }
        }

        &self.buckets
    }

    pub fn buckets(&self) -> &[PrimitiveBucket] {
        &self.buckets
    }

    /// Buckets with at least one member
    pub fn non_empty(&self) -> impl Iterator<Item = &PrimitiveBucket> {
        self.buckets.iter().filter(|b| !b.is_empty())
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Drop every bucket
    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}
