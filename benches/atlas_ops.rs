//! Benchmarks for lightmap packing.

use criterion::{criterion_group, criterion_main, Criterion};
use quilt::atlas::analyze::analyze;
use quilt::atlas::consolidate::consolidate;
use quilt::atlas::orient::normalize_orientation;
use quilt::atlas::quantize::quantize;
use quilt::prelude::*;
use nalgebra::Point3;

/// An `n` by `n` grid where every other cell is split into two triangles.
fn create_grid_mesh(n: usize) -> PolyMesh {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces: Vec<Vec<usize>> = Vec::with_capacity(n * n * 2);

    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            if (i + j) % 2 == 0 {
                faces.push(vec![v00, v10, v11, v01]);
            } else {
                faces.push(vec![v00, v10, v11]);
                faces.push(vec![v00, v11, v01]);
            }
        }
    }

    build_from_polygons(&vertices, &faces).unwrap()
}

fn bench_pack(c: &mut Criterion) {
    let mesh = create_grid_mesh(50);

    c.bench_function("pack_grid_50x50", |b| {
        let options = LightmapOptions::default();
        b.iter(|| {
            let mut uvs = LoopUvs::for_mesh(&mesh);
            pack_mesh_lightmap(&mesh, &options, &ShelfPacker, &mut uvs).unwrap()
        });
    });

    c.bench_function("pack_grid_50x50_sequential", |b| {
        let options = LightmapOptions::default().sequential();
        b.iter(|| {
            let mut uvs = LoopUvs::for_mesh(&mesh);
            pack_mesh_lightmap(&mesh, &options, &ShelfPacker, &mut uvs).unwrap()
        });
    });
}

fn bench_consolidate(c: &mut Criterion) {
    let mesh = create_grid_mesh(100);
    let faces: Vec<FaceId> = mesh.face_ids().collect();
    let options = LightmapOptions::default();

    c.bench_function("consolidate_grid_100x100", |b| {
        b.iter(|| {
            let analysis = analyze(&mesh, &faces, options.min_face_area).unwrap();
            let (mut arena, leaves, _) =
                quantize(analysis.leaves, options.margin_divisor()).unwrap();
            normalize_orientation(&mut arena, &leaves);
            consolidate(&mut arena, leaves, options.consolidation_divisor).roots.len()
        });
    });
}

criterion_group!(benches, bench_pack, bench_consolidate);
criterion_main!(benches);
