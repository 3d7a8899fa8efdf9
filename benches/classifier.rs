//! 设备分类与 URL 校验性能基准测试

use criterion::{Criterion, criterion_group, criterion_main};
use scanlinker::services::{DeviceCategory, classify};
use scanlinker::utils::normalize_url;
use std::hint::black_box;

const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
const IPAD_UA: &str = "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/604.1";
const DESKTOP_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

// ============== classify 基准测试 ==============

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("device/classify");

    group.bench_function("mobile", |b| {
        b.iter(|| {
            assert_eq!(classify(black_box(Some(IPHONE_UA))), DeviceCategory::Mobile);
        });
    });

    group.bench_function("tablet", |b| {
        b.iter(|| {
            assert_eq!(classify(black_box(Some(IPAD_UA))), DeviceCategory::Tablet);
        });
    });

    group.bench_function("desktop", |b| {
        b.iter(|| {
            assert_eq!(classify(black_box(Some(DESKTOP_UA))), DeviceCategory::Desktop);
        });
    });

    group.bench_function("missing", |b| {
        b.iter(|| {
            assert_eq!(classify(black_box(None)), DeviceCategory::Unknown);
        });
    });

    // 超长 UA
    let long_ua = DESKTOP_UA.repeat(32);
    group.bench_function("desktop_long", |b| {
        b.iter(|| classify(black_box(Some(long_ua.as_str()))));
    });

    group.finish();
}

// ============== normalize_url 基准测试 ==============

fn bench_normalize_url(c: &mut Criterion) {
    let mut group = c.benchmark_group("utils/normalize_url");

    group.bench_function("valid", |b| {
        b.iter(|| normalize_url(black_box("https://example.com/landing?src=qr")).is_ok());
    });

    group.bench_function("dangerous", |b| {
        b.iter(|| normalize_url(black_box("javascript:alert(1)")).is_err());
    });

    group.finish();
}

criterion_group!(benches, bench_classify, bench_normalize_url);
criterion_main!(benches);
