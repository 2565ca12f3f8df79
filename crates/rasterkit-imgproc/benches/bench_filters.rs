use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use rasterkit_image::Image;
use rasterkit_imgproc::{
    filter::{gaussian_filter, mean_filter, median_filter},
    morphology::erode,
};

fn bench_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("Spatial Filters");

    for (width, height) in [(256, 224), (512, 448), (1024, 896)].iter() {
        for kernel_size in [3, 5, 7].iter() {
            group.throughput(criterion::Throughput::Elements(
                (*width * *height * *kernel_size) as u64,
            ));

            let parameter_string = format!("{}x{}x{}", width, height, kernel_size);

            // input image
            let image_size = [*width, *height].into();
            let image_data = (0..width * height * 3).map(|i| (i % 251) as u8).collect();
            let image = Image::<u8, 3>::new(image_size, image_data).unwrap();

            // output image
            let output = Image::<u8, 3>::from_size_val(image_size, 0).unwrap();

            group.bench_with_input(
                BenchmarkId::new("mean_filter", &parameter_string),
                &(&image, &output),
                |b, i| {
                    let (src, mut dst) = (i.0, i.1.clone());
                    b.iter(|| black_box(mean_filter(src, &mut dst, *kernel_size)))
                },
            );

            group.bench_with_input(
                BenchmarkId::new("gaussian_filter", &parameter_string),
                &(&image, &output),
                |b, i| {
                    let (src, mut dst) = (i.0, i.1.clone());
                    b.iter(|| black_box(gaussian_filter(src, &mut dst, *kernel_size)))
                },
            );

            group.bench_with_input(
                BenchmarkId::new("median_filter", &parameter_string),
                &(&image, &output),
                |b, i| {
                    let (src, mut dst) = (i.0, i.1.clone());
                    b.iter(|| black_box(median_filter(src, &mut dst, *kernel_size)))
                },
            );
        }

        let image_size = [*width, *height].into();
        let image = Image::<u8, 3>::from_size_val(image_size, 128).unwrap();
        let output = Image::<u8, 3>::from_size_val(image_size, 0).unwrap();
        group.bench_with_input(
            BenchmarkId::new("erode", format!("{}x{}", width, height)),
            &(&image, &output),
            |b, i| {
                let (src, mut dst) = (i.0, i.1.clone());
                b.iter(|| black_box(erode(src, &mut dst)))
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_filters);
criterion_main!(benches);
