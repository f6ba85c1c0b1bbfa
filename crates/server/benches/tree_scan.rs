//! Performance benchmarks for document scanning.
//!
//! These benchmarks measure the hot paths behind the HTTP API:
//! - Recursive tree scan
//! - Single-level folder listing
//! - Path resolution

use std::fs;
use std::path::Path;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use server::files::{PathResolver, RootDirectory, TreeScanner};
use tempfile::TempDir;

/// Build a tree `depth` levels deep with `fanout` folders and files per level.
fn build_tree(dir: &Path, depth: usize, fanout: usize) -> u64 {
    let mut files = 0;
    for i in 0..fanout {
        fs::write(dir.join(format!("note_{i}.md")), "# note\n").unwrap();
        files += 1;
    }
    if depth > 0 {
        for i in 0..fanout {
            let sub = dir.join(format!("folder_{i}"));
            fs::create_dir(&sub).unwrap();
            files += build_tree(&sub, depth - 1, fanout);
        }
    }
    files
}

fn fixture(depth: usize, fanout: usize) -> (TempDir, PathResolver, u64) {
    let temp_dir = TempDir::new().unwrap();
    let files = build_tree(temp_dir.path(), depth, fanout);
    let resolver = PathResolver::new(RootDirectory::new(temp_dir.path()).unwrap());
    (temp_dir, resolver, files)
}

/// Benchmark the recursive scan at a few tree sizes.
fn bench_scan_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_tree");

    for (depth, fanout) in [(2, 4), (3, 5)] {
        let (_temp_dir, resolver, files) = fixture(depth, fanout);
        let root = resolver.resolve("").unwrap();

        group.throughput(Throughput::Elements(files));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{files}_files")),
            &root,
            |b, root| {
                b.iter(|| TreeScanner::new(&resolver).scan_tree(black_box(root)));
            },
        );
    }

    group.finish();
}

/// Benchmark listing a wide folder.
fn bench_list_folder(c: &mut Criterion) {
    let (_temp_dir, resolver, _) = fixture(1, 200);
    let root = resolver.resolve("").unwrap();

    c.bench_function("list_folder_400_entries", |b| {
        b.iter(|| TreeScanner::new(&resolver).list_folder(black_box(&root)).unwrap());
    });
}

/// Benchmark resolving accepted and rejected paths.
fn bench_resolve(c: &mut Criterion) {
    let (_temp_dir, resolver, _) = fixture(2, 3);
    let mut group = c.benchmark_group("resolve");

    group.bench_function("nested_file", |b| {
        b.iter(|| resolver.resolve(black_box("folder_1/folder_2/note_0.md")).unwrap());
    });

    group.bench_function("missing_file", |b| {
        b.iter(|| resolver.resolve(black_box("folder_1/absent/new.md")).unwrap());
    });

    group.bench_function("traversal", |b| {
        b.iter(|| resolver.resolve(black_box("folder_1/../../etc/passwd")).is_err());
    });

    group.finish();
}

criterion_group!(benches, bench_scan_tree, bench_list_folder, bench_resolve);
criterion_main!(benches);
