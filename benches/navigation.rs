use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use xdoc::XDoc;

fn generate_items_xml(count: usize) -> String {
    let mut xml = String::from("<items>");
    for i in 0..count {
        xml.push_str(&format!(r#"<item id="{}">Item {}</item><other/>"#, i, i));
    }
    xml.push_str("</items>");
    xml
}

fn benchmark_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");

    for count in [10, 100, 1000] {
        let doc = XDoc::load(&generate_items_xml(count));

        group.bench_with_input(BenchmarkId::new("simple", count), &doc, |b, doc| {
            b.iter(|| doc.at(black_box("item")).len())
        });
        group.bench_with_input(BenchmarkId::new("query", count), &doc, |b, doc| {
            b.iter(|| doc.at_path(black_box("item")).len())
        });
        group.bench_with_input(BenchmarkId::new("indexed_query", count), &doc, |b, doc| {
            b.iter(|| doc.at(black_box("item[last()]")).contents())
        });
    }

    group.finish();
}

fn benchmark_build(c: &mut Criterion) {
    c.bench_function("insert_value_at", |b| {
        b.iter(|| {
            let mut doc = XDoc::new("test").unwrap();
            for i in 1..=20 {
                doc.insert_value_at(&format!("row[{}]/@n", i), i).unwrap();
            }
            doc
        })
    });
}

criterion_group!(benches, benchmark_lookup, benchmark_build);
criterion_main!(benches);
