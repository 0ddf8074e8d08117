use std::sync::Arc;

use bson::{Document, doc};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use netabase_migrate::prelude::*;

#[derive(Default)]
struct Article {
    title: String,
    body: String,
    author_id: i64,
    extras: Document,
}

fn class_maps() -> Arc<ClassMapRegistry> {
    let registry = ClassMapRegistry::new();
    registry
        .register(
            ClassMap::builder::<Article>()
                .versioned()
                .field("title", "title", |a: &mut Article, v: String| a.title = v)
                .field("body", "body", |a: &mut Article, v: String| a.body = v)
                .field("author_id", "author_id", |a: &mut Article, v: i64| a.author_id = v)
                .extra_elements("extras", |a: &mut Article, extras| a.extras = extras)
                .build()
                .unwrap(),
        )
        .unwrap();
    Arc::new(registry)
}

fn versioned_hook() -> VersionedMigrationHook {
    VersionedMigrationHook::new().policy(
        TypePolicy::for_type::<Article>(1..=2)
            .rule(
                FieldRule::new("headline", 1..=1)
                    .decode_with(ValueDecoder::<String>::shared())
                    .assign_to(|a: &mut Article, v: String| a.title = v),
            )
            .capture_extra_elements(),
    )
}

fn documents(size: usize) -> Vec<Document> {
    (0..size)
        .map(|i| {
            doc! {
                "_v": 1,
                "headline": format!("Article {}", i),
                "body": format!("Content {}", i),
                "author_id": (i % 10) as i64,
                "legacy_flags": i as i32,
            }
        })
        .collect()
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for size in [100, 1000].iter() {
        let docs = documents(*size);

        let default_decoder = ObjectDecoder::with_class_maps(class_maps());
        group.bench_with_input(BenchmarkId::new("default_hook", size), &docs, |b, docs| {
            b.iter(|| {
                for document in docs {
                    let article: Article = default_decoder.decode(document).unwrap();
                    black_box(article.author_id);
                }
            });
        });

        let hooks = Arc::new(HookRegistry::with_hook(Arc::new(versioned_hook())));
        let versioned_decoder = ObjectDecoder::new(DecoderConfig::default(), class_maps(), hooks);
        group.bench_with_input(BenchmarkId::new("versioned_hook", size), &docs, |b, docs| {
            b.iter(|| {
                for document in docs {
                    let article: Article = versioned_decoder.decode(document).unwrap();
                    black_box((article.title.len(), article.body.len(), article.extras.len()));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
