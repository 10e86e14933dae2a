//! Benchmark tests for hot paths
//!
//! Run with: cargo test --release -- --ignored --nocapture bench

use std::time::Instant;
use tempfile::NamedTempFile;

use serde_json::json;
use storefront::database::{init_db, read_clicks, record_click};
use storefront::filter::{FacetKind, FilterState};
use storefront::model::Product;
use storefront::render::render_cards;

/// Benchmark helper to measure execution time
fn benchmark<F>(name: &str, iterations: usize, mut f: F)
where
    F: FnMut(),
{
    let start = Instant::now();

    for _ in 0..iterations {
        f();
    }

    let duration = start.elapsed();
    let avg_ms = duration.as_millis() as f64 / iterations as f64;
    let ops_per_sec = (iterations as f64 / duration.as_secs_f64()) as u64;

    println!("  {} ({} iterations)", name, iterations);
    println!("    Total time: {:?}", duration);
    println!("    Avg time: {:.3}ms", avg_ms);
    println!("    Throughput: {} ops/sec\n", ops_per_sec);
}

fn catalog(size: usize) -> Vec<Product> {
    let categories = ["bedspread", "curtain", "pillows", "blankets"];
    let fabrics = ["cotton", "velvet", "linen", "silk"];
    let colors = ["white", "grey", "blue", "red"];
    (0..size)
        .map(|i| {
            serde_json::from_value(json!({
                "id": format!("p{i}"),
                "name": format!("Queen {} item {i}", fabrics[i % 4]),
                "description": format!("Soft {} finish", colors[i % 4]),
                "category": categories[i % 4],
                "price": (i % 500) as f64,
            }))
            .unwrap()
        })
        .collect()
}

#[test]
#[ignore] // Run explicitly with: cargo test bench --release -- --ignored --nocapture
fn bench_filter_catalog() {
    println!("\n=== Benchmark: Filter catalog ===\n");

    let products = catalog(10_000);

    let all = FilterState::default();
    benchmark("No predicates (10k products)", 100, || {
        assert_eq!(all.apply(&products).len(), 10_000);
    });

    let mut narrow = FilterState::default();
    narrow.set_category("curtains");
    narrow.set_query("queen");
    narrow.set_price_range(Some(10.0), Some(400.0));
    narrow.toggle(FacetKind::Color, "gray", true);
    narrow.toggle(FacetKind::Fabric, "velvet", true);
    benchmark("All predicates (10k products)", 100, || {
        let _ = narrow.apply(&products);
    });

    let first_page: Vec<&Product> = products.iter().take(200).collect();
    benchmark("Render 200 cards", 100, || {
        let _ = render_cards(&first_page);
    });
}

#[test]
#[ignore] // Run explicitly with: cargo test bench --release -- --ignored --nocapture
fn bench_record_clicks() {
    println!("\n=== Benchmark: Record clicks ===\n");

    let temp_db = NamedTempFile::new().unwrap();
    let db = init_db(temp_db.path().to_str().unwrap()).unwrap();

    let mut i = 0;
    benchmark("Record click", 1000, || {
        record_click(&db, &format!("p{}", i % 50), Some("Bench product")).unwrap();
        i += 1;
    });

    benchmark("Read all counters", 100, || {
        assert_eq!(read_clicks(&db).unwrap().len(), 50);
    });
}
