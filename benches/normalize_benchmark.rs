// Benchmarks for request compilation and result normalization
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use docsearch_core::{QueryParams, SchemaRegistry};
use docsearch_search::backend::{DocumentStore, HistogramBucket, RawHit, RawSearchResponse, SearchBackend};
use docsearch_search::backend::{BackendError, RawFacet};
use docsearch_search::{FacetSizes, ResultNormalizer, SearchOrchestrator, SearchRequest};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Map, Value};
use std::sync::Arc;

fn random_histogram(rng: &mut StdRng, buckets: usize) -> RawFacet {
    RawFacet::DateHistogram {
        entries: (0..buckets)
            .map(|_| HistogramBucket {
                time: rng.random_range(-2_000_000_000_000i64..2_000_000_000_000),
                count: rng.random_range(0..10_000),
            })
            .collect(),
    }
}

fn random_hits(rng: &mut StdRng, count: usize) -> Vec<RawHit> {
    (0..count)
        .map(|i| {
            let mut source = Map::new();
            source.insert("id".to_string(), json!(format!("doc{}", i)));
            source.insert("_type".to_string(), json!("item"));
            source.insert("title".to_string(), json!(format!("document number {}", i)));
            RawHit {
                id: format!("private{}", i),
                score: Some(rng.random_range(0.0..10.0)),
                source: Some(source),
                fields: None,
            }
        })
        .collect()
}

fn benchmark_format_facets(c: &mut Criterion) {
    let mut group = c.benchmark_group("format_facets");
    let sizes = FacetSizes::from_params(&QueryParams::from_pairs([("facet_size", "50")])).unwrap();

    for buckets in [100, 1000, 10000].iter() {
        let mut rng = StdRng::seed_from_u64(42);
        let facets = vec![
            ("created.year".to_string(), random_histogram(&mut rng, *buckets)),
            ("temporal.start".to_string(), random_histogram(&mut rng, *buckets)),
        ];

        group.bench_with_input(BenchmarkId::new("histogram", buckets), &facets, |b, facets| {
            b.iter(|| ResultNormalizer::format_facets(black_box(facets.clone()), &sizes));
        });
    }

    group.finish();
}

fn benchmark_format_results(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let hits = random_hits(&mut rng, 100);

    c.bench_function("format_results_100", |b| {
        b.iter(|| ResultNormalizer::format_results(black_box(hits.clone())));
    });
}

struct NullBackend;

impl SearchBackend for NullBackend {
    fn execute(&self, _request: &SearchRequest) -> Result<RawSearchResponse, BackendError> {
        Ok(RawSearchResponse::default())
    }
}

impl DocumentStore for NullBackend {
    fn fetch(&self, ids: &[String]) -> Result<Vec<Option<Value>>, BackendError> {
        Ok(vec![None; ids.len()])
    }
}

fn benchmark_compile(c: &mut Criterion) {
    let backend = Arc::new(NullBackend);
    let search = SearchOrchestrator::new(Arc::new(SchemaRegistry::standard()), backend.clone(), backend);
    let params = QueryParams::from_pairs([
        ("q", "maps"),
        ("spatial.coordinates", "42.3,-71.1"),
        ("created.after", "1900"),
        ("facets", "language,isPartOf,created.decade,spatial.coordinates:42:-71"),
        ("sort_by", "created"),
        ("page", "3"),
    ]);

    c.bench_function("compile", |b| {
        b.iter(|| search.compile("item", black_box(&params)).unwrap());
    });
}

criterion_group!(benches, benchmark_format_facets, benchmark_format_results, benchmark_compile);
criterion_main!(benches);
