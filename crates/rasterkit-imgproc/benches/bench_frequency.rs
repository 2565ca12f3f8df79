use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use rasterkit_image::Image;
use rasterkit_imgproc::frequency::{apply_frequency_filter, forward_transform, FrequencyFilter};

fn bench_frequency(c: &mut Criterion) {
    let mut group = c.benchmark_group("Frequency Filters");

    for (width, height) in [(256, 256), (512, 448), (1024, 896)].iter() {
        let parameter_string = format!("{}x{}", width, height);
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let image_size = [*width, *height].into();
        let gray_data = (0..width * height).map(|i| (i % 256) as f32).collect();
        let gray = Image::<f32, 1>::new(image_size, gray_data).unwrap();

        group.bench_with_input(
            BenchmarkId::new("forward_transform", &parameter_string),
            &gray,
            |b, i| b.iter(|| black_box(forward_transform(i))),
        );

        let rgb_data = (0..width * height * 3).map(|i| (i % 253) as u8).collect();
        let rgb = Image::<u8, 3>::new(image_size, rgb_data).unwrap();
        let output = Image::<u8, 3>::from_size_val(image_size, 0).unwrap();

        for (name, filter) in [
            ("ideal_low_pass", FrequencyFilter::IDEAL_LOW_PASS),
            ("butterworth", FrequencyFilter::BUTTERWORTH),
            ("homomorphic", FrequencyFilter::HOMOMORPHIC),
        ] {
            group.bench_with_input(
                BenchmarkId::new(name, &parameter_string),
                &(&rgb, &output),
                |b, i| {
                    let (src, mut dst) = (i.0, i.1.clone());
                    b.iter(|| black_box(apply_frequency_filter(src, &mut dst, &filter)))
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_frequency);
criterion_main!(benches);
