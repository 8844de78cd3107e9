use fxhash::FxHashMap;
use glam::{Vec2, Vec3, Vec4};
use kura_asset::{join_all, Address, Asset, Handle, Library, LoadError, LoadResult, Loader};
use serde::Deserialize;

use crate::{document::load_yaml, Texture};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplerWrap {
    Clamp,
    #[default]
    Repeat,
    Mirror,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplerMinFilter {
    Nearest,
    #[default]
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplerMagFilter {
    Nearest,
    #[default]
    Linear,
}

#[derive(Clone, Debug)]
pub struct Sampler {
    pub texture: Handle<Texture>,
    pub s_wrap: SamplerWrap,
    pub t_wrap: SamplerWrap,
    pub r_wrap: SamplerWrap,
    pub min_filter: SamplerMinFilter,
    pub mag_filter: SamplerMagFilter,
}

/// Uniform value. Integers stay integers, vectors are written as 2 to 4
/// element lists.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Property {
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
}

#[derive(Clone, Debug, Default)]
pub struct PropertyBlock {
    samplers: FxHashMap<String, Sampler>,
    properties: FxHashMap<String, Property>,
}

impl PropertyBlock {
    pub fn sampler(&self, name: &str) -> Option<&Sampler> {
        self.samplers.get(name)
    }
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }
    pub fn sampler_count(&self) -> usize {
        self.samplers.len()
    }
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }
}

/// Shared properties plus the properties of each render pass
#[derive(Clone, Debug)]
pub struct Material {
    properties: PropertyBlock,
    passes: Vec<PropertyBlock>,
}

impl Material {
    pub fn properties(&self) -> &PropertyBlock {
        &self.properties
    }
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }
    pub fn pass(&self, index: usize) -> Option<&PropertyBlock> {
        self.passes.get(index)
    }
    /// Every texture referenced by the material or one of its passes
    pub fn textures(&self) -> impl Iterator<Item = &Handle<Texture>> {
        std::iter::once(&self.properties)
            .chain(&self.passes)
            .flat_map(|block| block.samplers.values())
            .map(|sampler| &sampler.texture)
    }
}

impl Asset for Material {
    const NAME: &'static str = "Material";
}

#[derive(Deserialize)]
struct SamplerDocument {
    texture: String,
    #[serde(default)]
    s_wrap: SamplerWrap,
    #[serde(default)]
    t_wrap: SamplerWrap,
    #[serde(default)]
    r_wrap: SamplerWrap,
    #[serde(default)]
    min_filter: SamplerMinFilter,
    #[serde(default)]
    mag_filter: SamplerMagFilter,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct BlockDocument {
    samplers: FxHashMap<String, SamplerDocument>,
    properties: FxHashMap<String, Property>,
}

#[derive(Deserialize)]
struct MaterialDocument {
    #[serde(flatten)]
    shared: BlockDocument,
    #[serde(default)]
    passes: Vec<BlockDocument>,
}

fn load_block(library: &Library, address: &Address, block: BlockDocument) -> LoadResult<PropertyBlock> {
    let samplers: Vec<(String, SamplerDocument)> = block.samplers.into_iter().collect();
    let textures = join_all(
        samplers
            .iter()
            .map(|(_, sampler)| library.load_dependency::<Texture>(address, &sampler.texture)),
    );
    let properties = block.properties;

    textures.then(library.worker(), move |textures| {
        let samplers = samplers
            .into_iter()
            .zip(textures)
            .map(|((name, sampler), texture)| {
                let sampler = Sampler {
                    texture,
                    s_wrap: sampler.s_wrap,
                    t_wrap: sampler.t_wrap,
                    r_wrap: sampler.r_wrap,
                    min_filter: sampler.min_filter,
                    mag_filter: sampler.mag_filter,
                };
                (name, sampler)
            })
            .collect();

        Ok::<_, LoadError>(PropertyBlock {
            samplers,
            properties,
        })
    })
}

pub struct MaterialLoader;

impl Loader<Material> for MaterialLoader {
    fn load_async(&self, library: &Library, address: &Address) -> LoadResult<Material> {
        load_yaml(library, address, |library, address, document: MaterialDocument| {
            let blocks = std::iter::once(document.shared)
                .chain(document.passes)
                .map(|block| load_block(library, address, block))
                .collect::<Vec<_>>();

            join_all(blocks).then(library.worker(), |mut blocks| {
                let properties = blocks.remove(0);
                Ok::<_, LoadError>(Material {
                    properties,
                    passes: blocks,
                })
            })
        })
    }
}
