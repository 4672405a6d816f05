// Tests for augmentor: operations, pipeline composition, sampling

use std::path::{Path, PathBuf};

use augmentor::codec::MemoryCodec;
use augmentor::geometry::center_crop;
use augmentor::{
    Augmentor, Crop, Error, FlipAxis, ImageCodec, ImageFolder, Invert, Kernel, Operation,
    PipelineConfig, PixelBuffer, Pipeline, RandomErase, Resize, SamplerConfig, Size,
};

// Synthetic images for testing

fn gradient(w: usize, h: usize) -> PixelBuffer {
    PixelBuffer::from_fn(w, h, 3, |x, y, c| match c {
        0 => (x * 255 / w.max(1)) as u8,
        1 => (y * 255 / h.max(1)) as u8,
        _ => ((x + y) % 256) as u8,
    })
    .unwrap()
}

fn solid(w: usize, h: usize, v: u8) -> PixelBuffer {
    PixelBuffer::from_fn(w, h, 3, |_, _, _| v).unwrap()
}

// Probability gate

#[test]
fn test_zero_probability_never_runs() {
    let img = gradient(32, 24);
    let mut pipeline = Pipeline::seeded(5)
        .invert(0.0)
        .unwrap()
        .rotate(30.0, 60.0, 0.0)
        .unwrap()
        .resize_to(Size::new(8, 8), 0.0)
        .unwrap()
        .random_erase_fixed(Size::new(4, 4), 0.0)
        .unwrap();
    for _ in 0..50 {
        assert_eq!(pipeline.run(img.clone()).unwrap(), img);
    }
}

#[test]
fn test_unit_probability_deterministic_with_seed() {
    let build = || {
        Pipeline::new().push(
            Operation::new(RandomErase::new(Size::new(3, 3), Size::new(9, 9)).unwrap())
                .with_probability(1.0)
                .unwrap()
                .with_seed(1234),
        )
    };
    let img = gradient(32, 32);
    let a = build().run(img.clone()).unwrap();
    let b = build().run(img.clone()).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, img);
}

// Operation properties

#[test]
fn test_resize_dimensions() {
    let mut p = Pipeline::new().resize_to(Size::new(37, 53), 1.0).unwrap();
    let out = p.run(gradient(100, 80)).unwrap();
    assert_eq!((out.height(), out.width()), (37, 53));
}

#[test]
fn test_invert_involution() {
    let img = gradient(17, 9);
    let mut p = Pipeline::new().invert(1.0).unwrap().invert(1.0).unwrap();
    assert_eq!(p.run(img.clone()).unwrap(), img);
}

#[test]
fn test_double_flip_identity() {
    for axis in [FlipAxis::Horizontal, FlipAxis::Vertical] {
        let img = gradient(13, 7);
        let mut p = Pipeline::new().flip(axis, 1.0).unwrap().flip(axis, 1.0).unwrap();
        assert_eq!(p.run(img.clone()).unwrap(), img);
    }
}

#[test]
fn test_flip_axis_from_string() {
    assert_eq!("Horizontal".parse::<FlipAxis>().unwrap(), FlipAxis::Horizontal);
    assert_eq!("Vertical".parse::<FlipAxis>().unwrap(), FlipAxis::Vertical);
    assert!(matches!("Sideways".parse::<FlipAxis>(), Err(Error::Config(_))));
}

#[test]
fn test_center_crop_provenance() {
    let img = gradient(64, 48);
    let (h, w) = (20, 30);
    let mut p = Pipeline::new().crop(Size::new(h, w), true, 1.0).unwrap();
    let out = p.run(img.clone()).unwrap();
    assert_eq!((out.height(), out.width()), (h, w));
    let (cx, cy) = (64 / 2, 48 / 2);
    assert_eq!(
        out.pixel(0, 0).unwrap(),
        img.pixel(cx - w / 2, cy - h / 2).unwrap()
    );
}

#[test]
fn test_crop_outside_bounds_is_error() {
    let mut p = Pipeline::new().push(Operation::new(Crop::center(Size::new(50, 50)).unwrap()));
    assert!(matches!(
        p.run(gradient(20, 20)),
        Err(Error::OutOfBounds { .. })
    ));
}

#[test]
fn test_kernel_symmetric_unit_sum() {
    let k = Kernel::gaussian(1.0, 5).unwrap();
    assert_eq!(k[0], k[4]);
    assert_eq!(k[1], k[3]);
    let sum: f64 = (0..k.len()).map(|i| k[i]).sum();
    assert!((sum - 1.0).abs() < 1e-12);
    assert!(Kernel::gaussian(1.0, 6).is_err());
    assert!(Kernel::gaussian(-2.0, 5).is_err());
}

#[test]
fn test_huge_sigma_is_config_error() {
    assert!(matches!(Pipeline::new().blur(1e19, 1.0), Err(Error::Config(_))));
    assert!(matches!(Pipeline::new().rapid_blur(1e19, 3, 1.0), Err(Error::Config(_))));
    assert!(matches!(
        Pipeline::new().blur_with_kernel(1.0, usize::MAX, 1.0),
        Err(Error::Config(_))
    ));
}

#[test]
fn test_random_erase_region() {
    let img = gradient(200, 160);
    for seed in [1u64, 2, 3, 99] {
        let mut p = Pipeline::new().push(
            Operation::new(RandomErase::fixed(Size::new(50, 50)).unwrap()).with_seed(seed),
        );
        let out = p.run(img.clone()).unwrap();

        let mut diff = Vec::new();
        for y in 0..160 {
            for x in 0..200 {
                if out.pixel(x, y).unwrap() != img.pixel(x, y).unwrap() {
                    diff.push((x, y));
                }
            }
        }
        let min_x = diff.iter().map(|d| d.0).min().unwrap();
        let max_x = diff.iter().map(|d| d.0).max().unwrap();
        let min_y = diff.iter().map(|d| d.1).min().unwrap();
        let max_y = diff.iter().map(|d| d.1).max().unwrap();
        // Differences confined to one 50x50 window and fill most of it.
        assert!(max_x - min_x <= 49 && max_y - min_y <= 49);
        assert!(diff.len() > 2450, "only {} pixels changed", diff.len());
    }
}

#[test]
fn test_blur_uniform_image_unchanged() {
    let img = solid(20, 20, 123);
    let mut p = Pipeline::new()
        .blur_with_kernel(2.0, 7, 1.0)
        .unwrap()
        .rapid_blur(3.0, 3, 1.0)
        .unwrap();
    assert_eq!(p.run(img.clone()).unwrap(), img);
}

#[test]
fn test_zoom_keeps_size() {
    let img = gradient(40, 30);
    let mut p = Pipeline::seeded(4).zoom(1.0, 3.0, 1.0).unwrap();
    for _ in 0..10 {
        let out = p.run(img.clone()).unwrap();
        assert_eq!(out.size(), img.size());
    }
}

#[test]
fn test_rotate_keeps_size() {
    let img = gradient(41, 29);
    let mut p = Pipeline::seeded(4).rotate(45.0, 90.0, 1.0).unwrap();
    let out = p.run(img.clone()).unwrap();
    assert_eq!(out.size(), img.size());
}

// End-to-end composition

#[test]
fn test_resize_then_zero_rotation_matches_resize() {
    let img = gradient(400, 400);
    let mut both = Pipeline::seeded(10)
        .resize(Size::new(100, 100), Size::new(100, 100), 1.0)
        .unwrap()
        .rotate(0.0, 0.0, 1.0)
        .unwrap();
    let mut resize_only = Pipeline::new().push(Operation::new(
        Resize::new(Size::new(100, 100), Size::new(100, 100)).unwrap(),
    ));
    let a = both.run(img.clone()).unwrap();
    let b = resize_only.run(img).unwrap();
    assert_eq!((a.height(), a.width()), (100, 100));
    assert_eq!(a, b);
}

#[test]
fn test_sample_five_from_two_sources() {
    let codec = MemoryCodec::new();
    codec.insert("in/cat.jpg", solid(30, 30, 10)).unwrap();
    codec.insert("in/dog.jpg", solid(30, 30, 200)).unwrap();
    let folder = ImageFolder::from_paths(["in/cat.jpg", "in/dog.jpg"]).unwrap();
    let pipeline = Pipeline::seeded(1).invert(1.0).unwrap();
    let config = SamplerConfig::default()
        .output_dir("out")
        .create_output_dir(false)
        .seed(8);

    let mut aug = Augmentor::new(folder, pipeline, codec, config);
    let records = aug.sample(5).unwrap();
    assert_eq!(records.len(), 5);

    for (i, rec) in records.iter().enumerate() {
        assert_eq!(rec.index, i);
        assert_eq!(rec.output, PathBuf::from("out").join(format!("output_{i}.jpg")));
        let out = aug.codec().get(&rec.output).unwrap();
        // Inverted solid image tells us which source it came from.
        let expected = if rec.source == Path::new("in/cat.jpg") {
            245
        } else {
            assert_eq!(rec.source, Path::new("in/dog.jpg"));
            55
        };
        assert!(out.as_raw().iter().all(|&v| v == expected));
    }
    // 2 sources + 5 outputs.
    assert_eq!(aug.codec().paths().len(), 7);
}

#[test]
fn test_sample_aborts_on_bounds_error() {
    let codec = MemoryCodec::new();
    codec.insert("small.jpg", solid(10, 10, 1)).unwrap();
    let folder = ImageFolder::from_paths(["small.jpg"]).unwrap();
    let pipeline = Pipeline::new().zoom(0.5, 0.5, 1.0).unwrap();
    let config = SamplerConfig::default().create_output_dir(false);
    let mut aug = Augmentor::new(folder, pipeline, codec, config);
    assert!(matches!(aug.sample(3), Err(Error::OutOfBounds { .. })));
    // Nothing was written.
    assert_eq!(aug.codec().paths().len(), 1);
}

#[test]
fn test_pipeline_from_json_runs() {
    let cfg = PipelineConfig::from_json_str(
        r#"{
            "seed": 3,
            "steps": [
                { "op": "resize", "lower": [64, 64], "upper": [64, 64] },
                { "op": "crop", "size": [32, 32] },
                { "op": "flip", "axis": "Horizontal", "probability": 0.5 },
                { "op": "random_erase", "lower": [4, 4], "upper": [8, 8] }
            ]
        }"#,
    )
    .unwrap();
    let mut pipeline = cfg.build().unwrap();
    let out = pipeline.run(gradient(100, 100)).unwrap();
    assert_eq!(out.size(), Size::new(32, 32));
}

#[test]
fn test_center_crop_helper_matches_operation() {
    let img = gradient(50, 40);
    let direct = center_crop(&img, Size::new(10, 12)).unwrap();
    let mut p = Pipeline::new().push(Operation::new(Crop::center(Size::new(10, 12)).unwrap()));
    assert_eq!(p.run(img).unwrap(), direct);
}

#[test]
fn test_invert_operation_direct() {
    let img = solid(3, 3, 0);
    let mut op = Operation::new(Invert);
    assert!(op.perform(img).unwrap().as_raw().iter().all(|&v| v == 255));
}

// File-backed sampling

#[cfg(feature = "file-codec")]
#[test]
fn test_sample_files_end_to_end() {
    use augmentor::FileCodec;

    let root = std::env::temp_dir().join(format!("augmentor-e2e-{}", std::process::id()));
    let input = root.join("in");
    let output = root.join("out");
    let _ = std::fs::remove_dir_all(&root);
    std::fs::create_dir_all(&input).unwrap();

    FileCodec.save(&gradient(64, 48), &input.join("a.jpg"), 90).unwrap();
    FileCodec.save(&gradient(48, 64), &input.join("b.jpg"), 90).unwrap();

    let pipeline = Pipeline::seeded(2)
        .resize_to(Size::new(32, 32), 1.0)
        .unwrap()
        .flip(FlipAxis::Vertical, 0.5)
        .unwrap();
    let mut aug = Augmentor::from_dirs(&input, &output, pipeline).unwrap();
    let records = aug.sample(4).unwrap();

    assert_eq!(records.len(), 4);
    for rec in &records {
        let img = FileCodec.load(&rec.output).unwrap();
        assert_eq!(img.size(), Size::new(32, 32));
        assert!(rec.output.starts_with(&output));
    }
    std::fs::remove_dir_all(&root).ok();
}
