use std::{path::PathBuf, sync::Arc, time::Duration};

use glam::{Vec2, Vec3, Vec4};
use kura_asset::{Library, LoadError, PhysicalIO, Settings, Worker};
use kura_content::*;

fn assets_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/assets")
}

fn library() -> Library {
    let _ = simple_logger::SimpleLogger::new().init();
    let worker = Worker::new(4, "library-test").unwrap();
    default_library(worker, Arc::new(PhysicalIO::new(assets_dir())))
}

// Lets continuations that still hold clones of published handles finish
fn settle(library: &Library) {
    library.worker().wait_all();
    std::thread::sleep(Duration::from_millis(10));
}

#[test]
fn text_is_cached_until_swept() {
    let library = library();
    let text_cache = library.cache::<Text>().unwrap();

    let text = library.load_asset_blocking::<Text>("text_asset.txt").unwrap();
    assert_eq!(text.content(), "hello");

    let text_from_cache = library.load_asset_blocking::<Text>("text_asset.txt").unwrap();
    assert_eq!(text_from_cache, text);

    settle(&library);
    assert_eq!(text_cache.unload_self_unused_assets(), 0);
    assert_eq!(text_cache.asset_count(), 1);

    drop(text);
    drop(text_from_cache);

    settle(&library);
    assert_eq!(text_cache.unload_self_unused_assets(), 1);
    assert_eq!(text_cache.asset_count(), 0);
}

#[test]
fn library_sweep_counts_every_cache() {
    let library = library();

    let text = library.load_asset_blocking::<Text>("text_asset.txt").unwrap();
    assert_eq!(text.content(), "hello");
    let binary = library.load_asset_blocking::<Binary>("binary_asset.bin").unwrap();
    assert_eq!(binary.content().data(), b"world");

    settle(&library);
    assert_eq!(library.unload_unused_assets(), 0);

    drop(text);
    drop(binary);

    settle(&library);
    assert_eq!(library.unload_unused_assets(), 2);
    assert_eq!(library.asset_count(), 0);
}

#[test]
fn missing_content_fails() {
    let library = library();

    assert!(library.load_asset_blocking::<Binary>("empty_asset").is_none());
    let err = library.load_asset::<Binary>("empty_asset").wait().unwrap_err();
    assert!(err.is_not_found());

    settle(&library);
    assert_eq!(library.asset_count(), 0);
}

#[test]
fn image_releases_its_binary() {
    let library = library();
    let image_cache = library.cache::<Image>().unwrap();
    let binary_cache = library.cache::<Binary>().unwrap();

    let image = library.load_asset_blocking::<Image>("image.png").unwrap();
    assert!(!image.content().is_empty());
    assert_eq!((image.content().width(), image.content().height()), (4, 4));

    assert!(image_cache.find(&"image.png".into()).is_some());
    assert!(binary_cache.find(&"image.png".into()).is_some());

    settle(&library);
    binary_cache.unload_self_unused_assets();
    assert!(image_cache.find(&"image.png".into()).is_some());
    assert!(binary_cache.find(&"image.png".into()).is_none());

    drop(image);
    settle(&library);
    image_cache.unload_self_unused_assets();
    assert!(image_cache.find(&"image.png".into()).is_none());
    assert!(binary_cache.find(&"image.png".into()).is_none());
}

#[test]
fn sprite_and_model() {
    let library = library();

    let texture = library.load_asset_blocking::<Texture>("image.png").unwrap();
    assert_eq!(texture.content().size(), (4, 4));

    let sprite = library.load_asset_blocking::<Sprite>("sprite.yaml").unwrap();
    let content = sprite.content();
    assert_eq!(content.size(), Vec2::new(10.0, 20.0));
    assert_eq!(content.pivot(), Vec2::new(0.5, 0.7));
    assert_eq!(content.texrect(), Rect::new(Vec2::ZERO, Vec2::new(0.5, 1.0)));
    assert_eq!(content.texture(), &texture);

    let model = library.load_asset_blocking::<Model>("model.yaml").unwrap();
    let model = model.content();
    assert_eq!(model.material_count(), 1);
    assert_eq!(model.material(0), Some(content.material()));

    let mesh = model.mesh().content();
    assert!(!mesh.vertices().is_empty());
    assert_eq!(mesh.indices_submesh_count(), 1);
    assert!(!mesh.indices(0).is_empty());
}

#[test]
fn material_properties() {
    let library = library();

    let material = library.load_asset_blocking::<Material>("material.yaml").unwrap();
    let texture = library.load_asset_blocking::<Texture>("image.png").unwrap();
    let material = material.content();

    let sampler = material.properties().sampler("s").unwrap();
    assert_eq!(sampler.s_wrap, SamplerWrap::Clamp);
    assert_eq!(sampler.t_wrap, SamplerWrap::Repeat);
    assert_eq!(sampler.r_wrap, SamplerWrap::Mirror);
    assert_eq!(sampler.min_filter, SamplerMinFilter::LinearMipmapLinear);
    assert_eq!(sampler.mag_filter, SamplerMagFilter::Linear);
    assert_eq!(sampler.texture, texture);

    assert_eq!(material.properties().property("i"), Some(&Property::Int(42)));

    assert_eq!(material.pass_count(), 1);
    let pass = material.pass(0).unwrap();
    assert_eq!(pass.property("f"), Some(&Property::Float(4.2)));
    assert_eq!(pass.property("v1"), Some(&Property::Vec2(Vec2::new(1.0, 2.0))));
    assert_eq!(pass.property("v2"), Some(&Property::Vec3(Vec3::splat(3.0))));
    assert_eq!(pass.property("v3"), Some(&Property::Vec4(Vec4::new(1.0, 2.0, 3.0, 4.0))));
    assert!(pass.property("missing").is_none());
}

#[test]
fn one_sweep_releases_composites_and_dependencies() {
    let library = library();

    let sprite = library.load_asset_blocking::<Sprite>("sprite.yaml").unwrap();
    let model = library.load_asset_blocking::<Model>("model.yaml").unwrap();

    settle(&library);
    // Binary of image.png is not held by anything once the image is decoded
    assert_eq!(library.unload_unused_assets(), 1);
    assert!(library.asset_count() > 0);

    drop(sprite);
    drop(model);

    settle(&library);
    let loaded = library.asset_count();
    assert_eq!(library.unload_unused_assets(), loaded);
    assert_eq!(library.asset_count(), 0);
}

#[test]
fn concurrent_requests_share_an_instance() {
    let library = library();

    let threads: Vec<_> = (0..8)
        .map(|_| {
            let library = library.clone();
            std::thread::spawn(move || library.load_asset_blocking::<Model>("model.yaml"))
        })
        .collect();
    let models: Vec<_> = threads
        .into_iter()
        .map(|thread| thread.join().unwrap().unwrap())
        .collect();

    assert!(models.iter().all(|model| model == &models[0]));
    assert_eq!(library.cache::<Model>().unwrap().asset_count(), 1);
    assert_eq!(library.cache::<Material>().unwrap().asset_count(), 1);
    assert_eq!(library.cache::<Texture>().unwrap().asset_count(), 1);
}

#[test]
fn failed_dependency_is_reported() {
    let library = library();

    let err = library.load_asset::<Model>("mesh.yaml").wait().unwrap_err();
    assert!(matches!(err, LoadError::Decode { asset: "Model", .. }));

    let err = library.load_asset::<Texture>("text_asset.txt").wait().unwrap_err();
    assert!(matches!(&err, LoadError::Dependency { address, .. } if address.as_str() == "text_asset.txt"));
    assert!(matches!(err.root_cause(), LoadError::Decode { asset: "Image", .. }));
}

#[test]
fn open_from_settings() -> Result<(), Box<dyn std::error::Error>> {
    let _ = simple_logger::SimpleLogger::new().init();
    let settings = Settings::load(assets_dir().join("kura.yaml"))?;
    let library = library_from_settings(&settings)?;

    assert_eq!(library.worker().thread_count(), 2);
    let text = library
        .load_asset_blocking::<Text>("text_asset.txt")
        .ok_or("text_asset.txt did not load")?;
    assert_eq!(text.content(), "hello");

    Ok(())
}
