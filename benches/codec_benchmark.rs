//! Benchmarks for spritepng encoding and decoding.
//!
//! Encode is compared across the option presets; decode is compared against
//! the `image` crate on the same files.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use spritepng::png::{self, EncodeOptions};
use spritepng::{CodecContext, PixelBuffer, PixelFormat, Sprite, SpriteContext};

/// Gradient with a diagonal alpha ramp.
fn generate_test_image(width: u32, height: u32) -> PixelBuffer {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let r = ((x * 255) / width) as u8;
            let g = ((y * 255) / height) as u8;
            let b = (((x + y) * 127) / (width + height)) as u8;
            pixels.extend_from_slice(&[r, g, b, 255 - b]);
        }
    }
    PixelBuffer::from_raw(PixelFormat::TrueColor, width, height, pixels).unwrap()
}

/// Palette image with noisy indices (harder to compress).
fn generate_noisy_indexed(width: u32, height: u32) -> PixelBuffer {
    let mut seed = 12345u32;
    let pixels = (0..width * height)
        .map(|_| {
            seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
            (seed >> 16) as u8
        })
        .collect();
    PixelBuffer::from_raw(PixelFormat::Indexed, width, height, pixels).unwrap()
}

fn presets() -> [(&'static str, EncodeOptions); 3] {
    [
        ("fast", EncodeOptions::fast()),
        ("balanced", EncodeOptions::balanced()),
        ("max", EncodeOptions::max_compression()),
    ]
}

fn encode_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("PNG Encoding");

    for size in [64u32, 256, 512] {
        let image = generate_test_image(size, size);
        let sprite = Sprite::new(PixelFormat::TrueColor, size, size);
        group.throughput(Throughput::Bytes(image.as_bytes().len() as u64));

        for (name, options) in presets() {
            let mut out = Vec::new();
            group.bench_with_input(
                BenchmarkId::new(name, format!("{size}x{size}")),
                &image,
                |b, image| {
                    b.iter(|| {
                        out.clear();
                        png::encode_with_options(
                            &mut out,
                            black_box(image),
                            &sprite,
                            &mut CodecContext::new(),
                            &options,
                        )
                        .unwrap();
                    });
                },
            );
        }
    }

    group.finish();
}

fn decode_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("PNG Decoding");

    for size in [64u32, 256, 512] {
        let mut sprite = Sprite::new(PixelFormat::Indexed, size, size);
        sprite.set_transparent_color(0);
        let mut bytes = Vec::new();
        png::encode(
            &mut bytes,
            &generate_noisy_indexed(size, size),
            &sprite,
            &mut CodecContext::new(),
        )
        .unwrap();
        group.throughput(Throughput::Bytes(u64::from(size * size)));

        group.bench_with_input(
            BenchmarkId::new("spritepng", format!("{size}x{size}")),
            &bytes,
            |b, bytes| {
                b.iter(|| {
                    png::decode(black_box(&bytes[..]), &mut sprite, &mut CodecContext::new())
                        .unwrap()
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("image_crate", format!("{size}x{size}")),
            &bytes,
            |b, bytes| b.iter(|| image::load_from_memory(black_box(bytes)).unwrap()),
        );
    }

    group.finish();
}

/// Print encoded sizes per preset, then time the noisy indexed case.
fn compression_ratio_benchmark(c: &mut Criterion) {
    let image = generate_test_image(256, 256);
    let sprite = Sprite::new(PixelFormat::TrueColor, 256, 256);
    let raw = image.as_bytes().len();

    println!("\n=== Compression Ratio (256x256 RGBA, {raw} bytes raw) ===");
    for (name, options) in presets() {
        let mut out = Vec::new();
        png::encode_with_options(&mut out, &image, &sprite, &mut CodecContext::new(), &options)
            .unwrap();
        println!(
            "{name:>10}: {} bytes ({:.1}%)",
            out.len(),
            out.len() as f64 * 100.0 / raw as f64
        );
    }

    let noisy = generate_noisy_indexed(256, 256);
    let mut indexed = Sprite::new(PixelFormat::Indexed, 256, 256);
    indexed.set_transparent_color(0);
    let mut group = c.benchmark_group("Compression Ratio");
    let mut out = Vec::new();
    group.bench_function("indexed noisy (balanced)", |b| {
        b.iter(|| {
            out.clear();
            png::encode_with_options(
                &mut out,
                black_box(&noisy),
                &indexed,
                &mut CodecContext::new(),
                &EncodeOptions::balanced(),
            )
            .unwrap();
            out.len()
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    encode_benchmark,
    decode_benchmark,
    compression_ratio_benchmark
);
criterion_main!(benches);
