use criterion::{Criterion, criterion_group, criterion_main};
use proeval::paths::FixFlags;
use proeval::{
    CacheConfig, CollectingSink, EvaluatorConfig, FileInfoCacheKey, FixStringCacheKey, LoadFlags,
    Project, parse,
};
use std::hint::black_box;
use std::sync::Arc;

/// A project with many assignments, conditionals, a loop and user functions
fn synthetic_project(modules: usize) -> String {
    let mut source = String::from(
        "TEMPLATE = app\n\
         CONFIG += warn_on release\n\
         defineReplace(objects) {\n\
         \x20   for(f, 1) {\n\
         \x20       OBJS += $$replace(f, \\.cpp, .o)\n\
         \x20   }\n\
         \x20   return($$OBJS)\n\
         }\n\
         defineTest(isCore) {\n\
         \x20   contains(1, core_.*): return(true)\n\
         \x20   return(false)\n\
         }\n",
    );
    for i in 0..modules {
        source.push_str(&format!(
            "MODULE_{i} = core_{i}\n\
             SOURCES += src/module_{i}.cpp src/module_{i}_impl.cpp\n\
             HEADERS *= include/module_{i}.h\n\
             isCore($$MODULE_{i}) {{\n\
             \x20   DEFINES += HAVE_MODULE_{i}\n\
             }} else {{\n\
             \x20   DEFINES -= HAVE_MODULE_{i}\n\
             }}\n"
        ));
    }
    source.push_str("OBJECTS = $$objects($$SOURCES)\nCOUNT = $$size(SOURCES)\n");
    source
}

fn benchmark_parse(c: &mut Criterion) {
    let source = synthetic_project(200);

    c.bench_function("parse_project_200_modules", |b| {
        b.iter(|| black_box(parse(black_box(&source), "bench.pro")))
    });
}

fn benchmark_evaluate(c: &mut Criterion) {
    let dir = tempfile::TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("bench.pro");
    std::fs::write(&path, synthetic_project(200)).expect("failed to write project");
    let path = path.to_string_lossy().into_owned();
    let pwd = dir.path().to_string_lossy().into_owned();

    for (name, cache) in [
        ("evaluate_project_cached", CacheConfig::default()),
        ("evaluate_project_uncached", CacheConfig::disabled()),
    ] {
        c.bench_function(name, |b| {
            b.iter(|| {
                let config = EvaluatorConfig::with_pwd(pwd.as_str()).with_cache(cache.clone());
                let mut project = Project::with_sink(config, Arc::new(CollectingSink::new()));
                black_box(project.read(black_box(&path), LoadFlags::ALL))
            })
        });
    }
}

fn benchmark_cache_keys(c: &mut Criterion) {
    c.bench_function("fix_string_key_hash", |b| {
        b.iter(|| {
            let key = FixStringCacheKey::new(
                black_box("../src/module/file.cpp"),
                FixFlags::CANONICALIZE,
                black_box("/home/user/project/build"),
            );
            black_box(key.hash_code())
        })
    });

    c.bench_function("file_info_key_eq", |b| {
        let a = FileInfoCacheKey::new("/usr/share/qt/mkspecs/features/qt.prf", "/one");
        let other = FileInfoCacheKey::new("/usr/share/qt/mkspecs/features/qt.prf", "/two");
        b.iter(|| black_box(black_box(&a) == black_box(&other)))
    });
}

criterion_group!(benches, benchmark_parse, benchmark_evaluate, benchmark_cache_keys);
criterion_main!(benches);
