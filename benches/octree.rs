use criterion::{criterion_group, criterion_main, Criterion, black_box};

use octcull::octree::config::BuildConfig;
use octcull::math::{DepthRange, Frustum};
use octcull::model::{create_test_sphere, Material};
use octcull::octree::{OctreeBuilder, RenderPass};

use glam::{Mat4, Vec3};

fn camera(eye: Vec3) -> Frustum {
    let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
    let proj = Mat4::perspective_rh_gl(60f32.to_radians(), 16.0 / 9.0, 0.1, 200.0);
    Frustum::from_view_projection(&(proj * view), DepthRange::NegOneToOne)
}

fn bench_build_level_2(c: &mut Criterion) {
    let model = create_test_sphere(32, 10.0, Material::default());

    c.bench_function("octree_build_sphere32_level2", |b| {
        b.iter(|| {
            let builder = OctreeBuilder::new(BuildConfig::with_max_level(2));
            builder.build(black_box(&model))
        });
    });
}

fn bench_build_level_3_parallel(c: &mut Criterion) {
    let model = create_test_sphere(32, 10.0, Material::default());

    c.bench_function("octree_build_sphere32_level3_parallel", |b| {
        b.iter(|| {
            let builder = OctreeBuilder::new(BuildConfig::with_max_level(3).parallel(true));
            builder.build(black_box(&model))
        });
    });
}

fn bench_visibility(c: &mut Criterion) {
    let model = create_test_sphere(32, 10.0, Material::default());
    let Ok(mut octree) = OctreeBuilder::new(BuildConfig::with_max_level(4)).build(&model) else {
        return;
    };

    c.bench_function("visibility_orbit_level4", |b| {
        let mut frame = 0u32;
        b.iter(|| {
            frame += 1;
            let angle = frame as f32 * 0.05;
            let frustum = camera(Vec3::new(angle.sin() * 8.0, 2.0, angle.cos() * 8.0));
            octree.update_visibility(black_box(&frustum), 4).len()
        });
    });
}

fn bench_visibility_and_buckets(c: &mut Criterion) {
    let model = create_test_sphere(32, 10.0, Material::default());
    let Ok(mut octree) = OctreeBuilder::new(BuildConfig::with_max_level(3)).build(&model) else {
        return;
    };
    let frustum = camera(Vec3::new(0.0, 5.0, 30.0));

    c.bench_function("visibility_and_buckets_level3", |b| {
        b.iter(|| {
            octree.update_visibility(black_box(&frustum), 3);
            octree.sort_buckets(RenderPass::Opaque).non_empty().count()
        });
    });
}

criterion_group!(
    benches,
    bench_build_level_2,
    bench_build_level_3_parallel,
    bench_visibility,
    bench_visibility_and_buckets,
);
criterion_main!(benches);
