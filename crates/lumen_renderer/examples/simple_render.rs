//! Simple path tracer example.
//!
//! Renders a scene with every primitive and material kind and saves it in
//! PPM format.
//!
//! Usage: `simple_render [texture.png] [config.json]`

use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;

use lumen_renderer::{
    gen_f32, render, seeded_rng, BvhNode, Camera, CameraConfig, CheckerTexture, Color, Dielectric,
    Ellipse, HittableList, ImageBuffer, ImageTexture, Lambertian, Material, Metal, Planar, Quad,
    Sphere, Texture, Triangle, Vec3,
};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let texture_path = args.next();
    let config_path = args.next();

    let config = match config_path {
        Some(path) => serde_json::from_reader(File::open(&path)?)?,
        None => CameraConfig::default()
            .with_resolution(400, 16.0 / 9.0)
            .with_quality(50, 10)
            .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
            .with_lens(20.0, 0.6, 10.0)
            .with_seed(7),
    };
    let camera = Camera::new(config)?;

    // Build the scene
    let start = std::time::Instant::now();
    let world = build_scene(texture_path.as_deref())?;
    log::info!("Scene built in {:?}", start.elapsed());

    let image = render(&camera, &world);

    let filename = "output.ppm";
    save_ppm(&image, filename)?;
    log::info!("Saved to {}", filename);

    Ok(())
}

fn build_scene(texture_path: Option<&str>) -> Result<BvhNode, Box<dyn Error>> {
    let mut world = HittableList::new();

    // Ground
    let checker = Arc::new(CheckerTexture::from_colors(
        0.32,
        Color::new(0.2, 0.3, 0.1),
        Color::new(0.9, 0.9, 0.9),
    ));
    world.add(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Lambertian::textured(checker)),
    ));

    // Three main spheres
    world.add(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, Arc::new(Dielectric::new(1.5))));
    world.add(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        Arc::new(Lambertian::textured(surface_texture(texture_path))),
    ));
    world.add(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
    ));

    // Flat shapes behind the spheres
    let backdrop: Arc<dyn Material> = Arc::new(Metal::new(Color::new(0.8, 0.85, 0.88), 0.05));
    world.add(Quad::quad(
        Vec3::new(-6.0, 0.0, -3.0),
        Vec3::new(12.0, 0.0, 0.0),
        Vec3::new(0.0, 4.0, 0.0),
        backdrop,
    )?);
    world.add(Planar::<Triangle>::triangle(
        Vec3::new(-2.5, 0.0, 2.5),
        Vec3::new(1.5, 0.0, 0.0),
        Vec3::new(0.75, 1.5, 0.0),
        Arc::new(Lambertian::new(Color::new(0.8, 0.2, 0.2))),
    )?);
    world.add(Planar::<Ellipse>::disk(
        Vec3::new(2.0, 0.01, 2.5),
        Vec3::Y,
        0.6,
        Arc::new(Lambertian::new(Color::new(0.2, 0.4, 0.8))),
    )?);

    // Small random spheres; diffuse ones bounce during the shutter
    let mut rng = seeded_rng(42, 0);
    let glass: Arc<dyn Material> = Arc::new(Dielectric::new(1.5));

    for a in -5..5 {
        for b in -5..5 {
            let center = Vec3::new(
                a as f32 + 0.9 * gen_f32(&mut rng),
                0.2,
                b as f32 + 0.9 * gen_f32(&mut rng),
            );

            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let choose_mat = gen_f32(&mut rng);
            if choose_mat < 0.8 {
                // Diffuse
                let albedo = Color::new(
                    gen_f32(&mut rng) * gen_f32(&mut rng),
                    gen_f32(&mut rng) * gen_f32(&mut rng),
                    gen_f32(&mut rng) * gen_f32(&mut rng),
                );
                let center1 = center + Vec3::new(0.0, 0.5 * gen_f32(&mut rng), 0.0);
                world.add(Sphere::moving(center, center1, 0.2, Arc::new(Lambertian::new(albedo))));
            } else if choose_mat < 0.95 {
                // Metal
                let albedo = Color::new(
                    0.5 + 0.5 * gen_f32(&mut rng),
                    0.5 + 0.5 * gen_f32(&mut rng),
                    0.5 + 0.5 * gen_f32(&mut rng),
                );
                let fuzz = 0.5 * gen_f32(&mut rng);
                world.add(Sphere::new(center, 0.2, Arc::new(Metal::new(albedo, fuzz))));
            } else {
                // Glass
                world.add(Sphere::new(center, 0.2, glass.clone()));
            }
        }
    }

    log::info!("Created {} objects", world.len());
    Ok(world.into_bvh())
}

/// Image texture if one was given and loads, otherwise a fine checker.
fn surface_texture(path: Option<&str>) -> Arc<dyn Texture> {
    let fallback = || -> Arc<dyn Texture> {
        Arc::new(CheckerTexture::from_colors(
            0.1,
            Color::new(0.4, 0.2, 0.1),
            Color::new(0.9, 0.8, 0.6),
        ))
    };

    let Some(path) = path else {
        return fallback();
    };

    match ImageTexture::load(path) {
        Ok(texture) => Arc::new(texture),
        Err(e) => {
            log::warn!("{}; using a checker texture instead", e);
            fallback()
        }
    }
}

fn save_ppm(image: &ImageBuffer, filename: &str) -> std::io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", image.width, image.height)?;
    writeln!(writer, "255")?;

    for rgb in image.to_rgb8().chunks_exact(3) {
        writeln!(writer, "{} {} {}", rgb[0], rgb[1], rgb[2])?;
    }

    writer.flush()
}
