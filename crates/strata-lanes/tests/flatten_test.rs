// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::Result;
use strata_core::math::{Vec2, Vec3};
use strata_data::model::{Model, MAX_MESH_VERTICES};
use strata_lanes::asset_lane::{
    AttributeStreams, Corner, FlattenError, FlattenInput, FlattenSettings, GeometryFlattenerLane,
    Polygon, PrimitiveGroup, SourceGeometry,
};

/// A `size` x `size` grid of quads on the XY plane, with UVs shared per grid point.
fn grid(size: u32) -> SourceGeometry {
    let row = size + 1;
    let mut streams = AttributeStreams::default();
    for y in 0..row {
        for x in 0..row {
            streams.positions.push(Vec3::new(x as f32, y as f32, (x * y) as f32 * 0.1));
            streams
                .uvs
                .push(Vec2::new(x as f32 / size as f32, y as f32 / size as f32));
        }
    }
    streams.normals.push(Vec3::Z);

    let corner = |i: u32| Corner::new(i).with_uv(i).with_normal(0);
    let mut polygons = Vec::new();
    for y in 0..size {
        for x in 0..size {
            let i = y * row + x;
            polygons.push(Polygon::new(vec![
                corner(i),
                corner(i + 1),
                corner(i + row + 1),
                corner(i + row),
            ]));
        }
    }
    SourceGeometry::new("grid", streams, vec![PrimitiveGroup::new("", polygons)])
}

fn flatten(geometry: &SourceGeometry, optimize: bool, z_up: bool) -> Result<Model, FlattenError> {
    GeometryFlattenerLane::new(FlattenSettings {
        optimize,
        z_up,
        weld_epsilon: 0.0,
    })
    .flatten(&FlattenInput::new(geometry))
}

#[test]
fn test_unoptimized_emits_one_vertex_per_corner() -> Result<()> {
    let geometry = grid(6);
    let model = flatten(&geometry, false, false)?;
    let mesh = &model.meshes()[0];

    assert_eq!(mesh.vertex_count(), geometry.groups[0].corner_count());
    assert_eq!(mesh.triangle_count(), 6 * 6 * 2);
    Ok(())
}

#[test]
fn test_optimized_mesh_is_smaller_and_fully_referenced() -> Result<()> {
    let geometry = grid(6);
    let raw = flatten(&geometry, false, false)?;
    let welded = flatten(&geometry, true, false)?;
    let mesh = &welded.meshes()[0];

    assert!(mesh.vertex_count() <= raw.meshes()[0].vertex_count());
    assert_eq!(mesh.vertex_count(), 7 * 7);
    assert_eq!(mesh.indices().len(), raw.meshes()[0].indices().len());

    let mut referenced = vec![false; mesh.vertex_count()];
    for &i in mesh.indices() {
        referenced[i as usize] = true;
    }
    assert!(referenced.into_iter().all(|r| r));

    for (slot, vertex) in mesh.vertices().iter().enumerate() {
        assert_eq!(vertex.vertex_index as usize, slot);
    }
    Ok(())
}

#[test]
fn test_every_vertex_lies_inside_the_bounds() -> Result<()> {
    for z_up in [false, true] {
        let model = flatten(&grid(5), true, z_up)?;
        let mesh = &model.meshes()[0];
        let bounds = mesh.bounding_box();

        assert!(bounds.is_valid());
        assert!(bounds.min.all_le(bounds.max));
        assert!(mesh.vertices().iter().all(|v| bounds.contains(v.position)));
        assert_eq!(mesh.positions().len(), mesh.vertex_count() * 3);
    }
    Ok(())
}

#[test]
fn test_z_up_maps_y_to_negative_z() -> Result<()> {
    let streams = AttributeStreams {
        positions: vec![Vec3::new(0.0, 1.0, 2.0), Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0)],
        normals: vec![Vec3::Y],
        ..Default::default()
    };
    let corners = (0..3).map(|i| Corner::new(i).with_normal(0)).collect();
    let geometry = SourceGeometry::new(
        "tri",
        streams,
        vec![PrimitiveGroup::new("", vec![Polygon::new(corners)])],
    );

    let model = flatten(&geometry, false, true)?;
    let vertices = model.meshes()[0].vertices();
    assert_eq!(vertices[0].position, Vec3::new(0.0, 2.0, -1.0));
    assert_eq!(vertices[2].position, Vec3::new(0.0, 1.0, 0.0));
    assert_eq!(vertices[0].normal, Vec3::new(0.0, 0.0, -1.0));
    Ok(())
}

/// Triangles over `unique` distinct positions; corners past the end wrap back
/// onto the first positions, which welding merges.
fn strip_of_unique_vertices(name: &str, unique: u32) -> SourceGeometry {
    let streams = AttributeStreams {
        positions: (0..unique).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect(),
        ..Default::default()
    };
    let polygons = (0..unique.div_ceil(3))
        .map(|t| {
            let corner = |k: u32| (t * 3 + k) % unique;
            Polygon::from_positions(&[corner(0), corner(1), corner(2)])
        })
        .collect();
    SourceGeometry::new(name, streams, vec![PrimitiveGroup::new("", polygons)])
}

#[test]
fn test_vertex_ceiling_is_inclusive() -> Result<()> {
    let geometry = strip_of_unique_vertices("full", MAX_MESH_VERTICES as u32);

    let model = flatten(&geometry, true, false)?;
    let mesh = &model.meshes()[0];
    assert_eq!(mesh.vertex_count(), MAX_MESH_VERTICES);
    assert_eq!(mesh.vertices().last().map(|v| v.vertex_index), Some(65535));
    assert_eq!(mesh.indices().iter().max(), Some(&65535));
    Ok(())
}

#[test]
fn test_vertex_ceiling_is_an_error() {
    let geometry = strip_of_unique_vertices("huge", MAX_MESH_VERTICES as u32 + 1);

    let err = flatten(&geometry, true, false).unwrap_err();
    assert_eq!(
        err,
        FlattenError::VertexLimitExceeded {
            geometry: "huge".into(),
            group: 0,
            limit: MAX_MESH_VERTICES,
        }
    );
}

#[test]
fn test_each_primitive_group_becomes_a_mesh() -> Result<()> {
    let mut geometry = grid(2);
    let second = PrimitiveGroup::new("trim", vec![Polygon::from_positions(&[0, 1, 4])]);
    geometry.groups.push(second);

    let model = flatten(&geometry, true, false)?;
    assert_eq!(model.meshes().len(), 2);
    assert_eq!(model.meshes()[1].vertex_count(), 3);
    assert!(model.bounds().contains(Vec3::new(2.0, 2.0, 0.0)));
    Ok(())
}
