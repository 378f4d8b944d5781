use std::io::{BufReader, Cursor};

use anyhow::Context as _;
use wgpu::util::DeviceExt;

use crate::{
    pipelines::mesh::material_layout,
    scene::{
        GroupNode, MeshNode, SceneNode,
        model::{self, Material, ModelVertex},
        texture::Texture,
        transform::Transform,
    },
};

/**
 * This module contains all logic for getting the model from the gateway into the scene.
 */
pub mod fetch;

/// Fetch the glTF asset behind `cid` from the gateway and decode it into a
/// scene subtree.
pub async fn load_model_from_gateway(
    cid: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Box<dyn SceneNode>> {
    let url = fetch::gateway_url(cid);
    let bytes = fetch::fetch_binary(&url)
        .await
        .with_context(|| format!("fetching {url}"))?;
    load_model_gltf(&bytes, device, queue).with_context(|| format!("decoding model {cid}"))
}

/// Decode binary glTF into a scene subtree.
///
/// Supports the self-contained form the gateway serves: embedded buffers,
/// textures referenced through buffer views, plain base-color factors when a
/// material carries no texture. Animations are ignored.
pub fn load_model_gltf(
    bytes: &[u8],
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Box<dyn SceneNode>> {
    let gltf_cursor = Cursor::new(bytes);
    let gltf_reader = BufReader::new(gltf_cursor);
    let gltf = gltf::Gltf::from_reader(gltf_reader)?;

    // Load buffers
    let mut buffer_data: Vec<Vec<u8>> = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                if let Some(blob) = gltf.blob.as_deref() {
                    buffer_data.push(blob.into());
                }
            }
            gltf::buffer::Source::Uri(uri) => {
                anyhow::bail!("model references an external buffer ({uri}), expected binary glTF")
            }
        }
    }

    // Load materials
    let layout = material_layout(device);
    let mut materials = Vec::new();
    for material in gltf.materials() {
        let name = material.name().unwrap_or("unnamed material");
        let pbr = material.pbr_metallic_roughness();
        let diffuse_texture = match pbr
            .base_color_texture()
            .map(|info| info.texture().source().source())
        {
            Some(gltf::image::Source::View { view, mime_type }) => {
                let buffer = buffer_data
                    .get(view.buffer().index())
                    .with_context(|| format!("texture of {name} references a missing buffer"))?;
                let image_bytes = buffer
                    .get(view.offset()..view.offset() + view.length())
                    .with_context(|| format!("texture of {name} is out of buffer bounds"))?;
                Texture::from_bytes(
                    device,
                    queue,
                    image_bytes,
                    name,
                    mime_type.split('/').next_back(),
                )?
            }
            Some(gltf::image::Source::Uri { uri, .. }) => {
                anyhow::bail!("model references an external image ({uri}), expected binary glTF")
            }
            None => {
                let factor = pbr.base_color_factor();
                let rgba = factor.map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8);
                Texture::from_color(device, queue, rgba)
            }
        };
        materials.push(Material::new(device, name, diffuse_texture, &layout));
    }
    if materials.is_empty() {
        // Meshes index material 0 unconditionally, so keep one around.
        let diffuse_texture = Texture::from_color(device, queue, [255, 255, 255, 255]);
        materials.push(Material::new(device, "default", diffuse_texture, &layout));
    }

    let mut roots = Vec::new();
    for scene in gltf.scenes() {
        for node in scene.nodes() {
            roots.push(to_scene_node(node, &buffer_data, device, &materials)?);
        }
    }

    let root = match roots.len() {
        1 => roots.remove(0),
        _ => {
            let mut root = GroupNode::new();
            for node in roots {
                root.add_child(node);
            }
            Box::new(root)
        }
    };

    Ok(root)
}

fn to_scene_node(
    node: gltf::scene::Node,
    buffer_data: &[Vec<u8>],
    device: &wgpu::Device,
    materials: &[Material],
) -> anyhow::Result<Box<dyn SceneNode>> {
    let mut scene_node: Box<dyn SceneNode> = match node.mesh() {
        Some(mesh) => {
            let mut meshes = Vec::new();
            for primitive in mesh.primitives() {
                let reader =
                    primitive.reader(|buffer| buffer_data.get(buffer.index()).map(Vec::as_slice));

                let mut vertices = Vec::new();
                if let Some(positions) = reader.read_positions() {
                    for position in positions {
                        vertices.push(ModelVertex {
                            position,
                            tex_coords: Default::default(),
                            normal: Default::default(),
                        });
                    }
                }
                if let Some(normals) = reader.read_normals() {
                    for (vertex, normal) in vertices.iter_mut().zip(normals) {
                        vertex.normal = normal;
                    }
                }
                if let Some(tex_coords) = reader.read_tex_coords(0).map(|coords| coords.into_f32())
                {
                    for (vertex, tex_coord) in vertices.iter_mut().zip(tex_coords) {
                        vertex.tex_coords = tex_coord;
                    }
                }

                let indices = match reader.read_indices() {
                    Some(indices) => indices.into_u32().collect::<Vec<u32>>(),
                    // Non-indexed geometry draws the vertices in order.
                    None => (0..vertices.len() as u32).collect(),
                };

                let vertex_buffer =
                    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("{:?} Vertex Buffer", mesh.name())),
                        contents: bytemuck::cast_slice(&vertices),
                        usage: wgpu::BufferUsages::VERTEX,
                    });
                let index_buffer =
                    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("{:?} Index Buffer", mesh.name())),
                        contents: bytemuck::cast_slice(&indices),
                        usage: wgpu::BufferUsages::INDEX,
                    });

                let material = primitive
                    .material()
                    .index()
                    .filter(|idx| *idx < materials.len())
                    .unwrap_or(0);

                meshes.push(model::Mesh {
                    name: mesh.name().unwrap_or("unknown_mesh").to_string(),
                    vertex_buffer,
                    index_buffer,
                    num_elements: indices.len() as u32,
                    material,
                });
            }
            let model = model::Model {
                meshes,
                materials: materials.to_vec(),
            };
            Box::new(MeshNode::new(device, model))
        }
        None => Box::new(GroupNode::new()) as Box<dyn SceneNode>,
    };

    let (position, rotation, scale) = node.transform().decomposed();
    scene_node.set_local_transform(Transform {
        position: position.into(),
        rotation: rotation.into(),
        scale: scale.into(),
    });
    for child in node.children() {
        let child_node = to_scene_node(child, buffer_data, device, materials)?;
        scene_node.add_child(child_node);
    }

    Ok(scene_node)
}
