use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use circlecv_image::Image;
use circlecv_imgproc::filter::gaussian_blur;
use circlecv_imgproc::hough::{hough_circles, AccumulatorStrategy, HoughCirclesConfig};
use circlecv_imgproc::parallel::ExecutionStrategy;

fn disks(width: usize, height: usize) -> Image<f32, 1> {
    let mut field = Image::<f32, 1>::from_size_val([width, height].into(), 0.0).unwrap();
    let step = 80;
    for cy in (step / 2..height).step_by(step) {
        for cx in (step / 2..width).step_by(step) {
            let radius = 12.0 + ((cx + cy) % 20) as f32;
            for y in cy.saturating_sub(40)..(cy + 40).min(height) {
                for x in cx.saturating_sub(40)..(cx + 40).min(width) {
                    if (x as f32 - cx as f32).hypot(y as f32 - cy as f32) <= radius {
                        field.set_pixel(x, y, 0, 255.0).unwrap();
                    }
                }
            }
        }
    }

    let mut blurred = field.clone();
    gaussian_blur(&field, &mut blurred, (7, 7), (2.0, 2.0)).unwrap();
    blurred
}

fn bench_hough(c: &mut Criterion) {
    let mut group = c.benchmark_group("Hough Circles");
    group.sample_size(10);

    for (width, height) in [(320, 240), (640, 480)].iter() {
        let field = disks(*width, *height);
        let parameter_string = format!("{width}x{height}");

        for (accumulator, execution) in [
            (AccumulatorStrategy::Dense, ExecutionStrategy::Serial),
            (AccumulatorStrategy::Dense, ExecutionStrategy::Parallel),
            (AccumulatorStrategy::Sparse, ExecutionStrategy::Serial),
            (AccumulatorStrategy::Sparse, ExecutionStrategy::Parallel),
        ] {
            let config = HoughCirclesConfig::new(1.0, 20.0, 50.0, 40.0, 10, 35)
                .with_accumulator(accumulator)
                .with_execution(execution);

            group.bench_with_input(
                BenchmarkId::new(format!("{accumulator:?}_{execution:?}"), &parameter_string),
                &field,
                |b, field| b.iter(|| black_box(hough_circles(field, &config))),
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_hough);
criterion_main!(benches);
