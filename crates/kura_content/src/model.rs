use kura_asset::{join_all, Address, Asset, Handle, Library, LoadError, LoadResult, Loader};
use serde::Deserialize;

use crate::{document::load_yaml, Material, Mesh};

/// A mesh with one material per submesh
#[derive(Clone, Debug)]
pub struct Model {
    mesh: Handle<Mesh>,
    materials: Vec<Handle<Material>>,
}

impl Model {
    pub fn mesh(&self) -> &Handle<Mesh> {
        &self.mesh
    }
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }
    pub fn material(&self, index: usize) -> Option<&Handle<Material>> {
        self.materials.get(index)
    }
    pub fn materials(&self) -> &[Handle<Material>] {
        &self.materials
    }
}

impl Asset for Model {
    const NAME: &'static str = "Model";
}

#[derive(Deserialize)]
struct ModelDocument {
    mesh: String,
    #[serde(default)]
    materials: Vec<String>,
}

pub struct ModelLoader;

impl Loader<Model> for ModelLoader {
    fn load_async(&self, library: &Library, address: &Address) -> LoadResult<Model> {
        load_yaml(library, address, |library, address, document: ModelDocument| {
            let mesh = library.load_dependency::<Mesh>(address, &document.mesh);
            let materials = join_all(
                document
                    .materials
                    .iter()
                    .map(|material| library.load_dependency::<Material>(address, material)),
            );

            mesh.zip(&materials, library.worker())
                .then(library.worker(), |(mesh, materials)| {
                    Ok::<_, LoadError>(Model { mesh, materials })
                })
        })
    }
}
