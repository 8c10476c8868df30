//! Full training runs against a temporary output directory

use std::path::Path;

use aviary::headless::{CHAMPION_FILE, GIF_DIR, REPORT_FILE, TrainingReport};
use aviary::{AppConfig, SpriteSheet, TrainingEnv};
use image::{Rgba, RgbaImage};

fn small_run(output: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.evolution.population_size = 8;
    config.evolution.fitness_threshold = None;
    config.training.generations = 3;
    config.training.max_ticks = 300;
    config.training.seed = Some(42);
    config.training.output_dir = output.to_path_buf();
    config.training.gif_interval = 2;
    config.training.gif_frame_stride = 4;
    config.training.gif_max_frames = 20;
    config.training.gif_downscale = 4;
    config
}

#[test]
fn test_training_writes_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let report = TrainingEnv::new(small_run(dir.path())).run().unwrap();

    assert!(dir.path().join(CHAMPION_FILE).exists());
    let text = std::fs::read_to_string(dir.path().join(REPORT_FILE)).unwrap();
    let saved: TrainingReport = ron::from_str(&text).unwrap();
    assert_eq!(saved.summary, report.summary);
    assert_eq!(saved.history.len(), report.summary.generations);

    // Generation 1 is always recorded
    let first = dir.path().join(GIF_DIR).join("generation_0001.gif");
    assert!(report.gifs.contains(&first));
    assert!(first.exists());
}

#[test]
fn test_same_seed_same_report() {
    let run = || {
        let dir = tempfile::tempdir().unwrap();
        let mut config = small_run(dir.path());
        config.training.gif_interval = 0;
        TrainingEnv::new(config).run().unwrap()
    };
    let (a, b) = (run(), run());
    assert_eq!(a.summary, b.summary);
    assert_eq!(a.history, b.history);
    assert_eq!(a.champion, b.champion);
}

fn write_sprite(dir: &Path, name: &str, width: u32, height: u32, solid: impl Fn(u32, u32) -> bool) {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        if solid(x, y) {
            Rgba([200, 120, 40, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    image.save(dir.join(name)).unwrap();
}

#[test]
fn test_sprites_load_from_png_directory() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["bird1.png", "bird2.png", "bird3.png"] {
        write_sprite(dir.path(), name, 34, 24, |x, y| (4..30).contains(&x) && (4..20).contains(&y));
    }
    write_sprite(dir.path(), "pipe.png", 52, 320, |_, _| true);
    write_sprite(dir.path(), "base.png", 336, 112, |_, _| true);

    let sheet = SpriteSheet::load(dir.path(), true).unwrap();
    assert!(sheet.background.is_none());
    assert_eq!(sheet.birds[0].dimensions(), (68, 48));
    assert_eq!(sheet.pipe_top.dimensions(), (104, 640));

    let masks = sheet.masks().unwrap();
    assert_eq!(masks.bird_width(), 68);
    assert_eq!(masks.ground_width(), 672);
    // 26x16 solid block doubled in both directions
    let bird = masks.bird(0);
    let solid = (0..bird.width())
        .flat_map(|x| (0..bird.height()).map(move |y| (x, y)))
        .filter(|&(x, y)| bird.get(x, y))
        .count();
    assert_eq!(solid, 52 * 32);
    assert!(!masks.bird(0).get(7, 7));
    assert!(masks.bird(0).get(8, 8));

    let unscaled = SpriteSheet::load(dir.path(), false).unwrap();
    assert_eq!(unscaled.birds[0].dimensions(), (34, 24));
}

#[test]
fn test_training_with_loaded_sprites() {
    let sprites = tempfile::tempdir().unwrap();
    for name in ["bird1.png", "bird2.png", "bird3.png"] {
        write_sprite(sprites.path(), name, 34, 24, |_, _| true);
    }
    write_sprite(sprites.path(), "pipe.png", 52, 320, |_, _| true);
    write_sprite(sprites.path(), "base.png", 336, 112, |_, _| true);

    let output = tempfile::tempdir().unwrap();
    let mut config = small_run(output.path());
    config.training.generations = 1;
    config.assets.sprite_dir = Some(sprites.path().to_path_buf());

    let report = TrainingEnv::new(config).run().unwrap();
    assert_eq!(report.summary.generations, 1);
    assert_eq!(report.gifs.len(), 1);
}
