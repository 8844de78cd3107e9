use glam::{Vec2, Vec3};
use kura_asset::{Address, Asset, Library, LoadError, LoadResult, Loader};
use serde::Deserialize;

use crate::document::load_yaml;

/// Vertex data shared by one or more index lists (submeshes)
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Mesh {
    vertices: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
    indices: Vec<Vec<u32>>,
}

impl Mesh {
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }
    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }
    pub fn indices_submesh_count(&self) -> usize {
        self.indices.len()
    }
    pub fn indices(&self, submesh: usize) -> &[u32] {
        self.indices.get(submesh).map(Vec::as_slice).unwrap_or_default()
    }
    fn validate(&self) -> Result<(), String> {
        let vertex_count = self.vertices.len();
        if !self.normals.is_empty() && self.normals.len() != vertex_count {
            return Err(format!("expected {} normals, found {}", vertex_count, self.normals.len()));
        }
        if !self.uvs.is_empty() && self.uvs.len() != vertex_count {
            return Err(format!("expected {} uvs, found {}", vertex_count, self.uvs.len()));
        }
        for (submesh, indices) in self.indices.iter().enumerate() {
            if let Some(index) = indices.iter().find(|&&index| index as usize >= vertex_count) {
                return Err(format!(
                    "submesh {} references vertex {} of {}",
                    submesh, index, vertex_count
                ));
            }
        }

        Ok(())
    }
}

impl Asset for Mesh {
    const NAME: &'static str = "Mesh";
}

pub struct MeshLoader;

impl Loader<Mesh> for MeshLoader {
    fn load_async(&self, library: &Library, address: &Address) -> LoadResult<Mesh> {
        load_yaml(library, address, |_, address, mesh: Mesh| {
            mesh.validate()
                .map(|()| mesh)
                .map_err(|reason| LoadError::decode::<Mesh>(address, reason))
        })
    }
}
