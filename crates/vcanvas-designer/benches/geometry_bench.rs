use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vcanvas_designer::{Canvas, Path, PointF, RectangleF, RotatedRectangleF, VObject};

fn bench_intersection(c: &mut Criterion) {
    let rects: Vec<RotatedRectangleF> = (0..256)
        .map(|i| {
            let f = i as f64;
            RotatedRectangleF::new(f * 3.0, (f * 7.0) % 400.0, 40.0, 25.0, f * 11.0)
        })
        .collect();
    c.bench_function("rotated_intersection_256x256", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for a in &rects {
                for other in &rects {
                    if a.intersects_with(other) {
                        hits += 1;
                    }
                }
            }
            black_box(hits)
        })
    });
}

fn bench_path_round_trip(c: &mut Criterion) {
    let path = Path::ellipse(&RectangleF::new(0.0, 0.0, 120.0, 80.0));
    let text = path.to_string();
    c.bench_function("path_parse_ellipse", |b| {
        b.iter(|| black_box(text.parse::<Path>()))
    });
}

fn bench_hit_test(c: &mut Criterion) {
    let mut canvas = Canvas::new(2000.0, 2000.0);
    for i in 0..1000 {
        let x = (i % 40) as f64 * 50.0;
        let y = (i / 40) as f64 * 50.0;
        let _ = canvas.add_object(VObject::ellipse(RectangleF::new(x, y, 40.0, 40.0)));
    }
    c.bench_function("hit_test_1000_objects", |b| {
        b.iter(|| black_box(canvas.layers().hit_test_objects(PointF::new(1012.0, 612.0), 2.0)))
    });
}

criterion_group!(benches, bench_intersection, bench_path_round_trip, bench_hit_test);
criterion_main!(benches);
