use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use fencetag_core::{CodeBlock, ContextWindow, Converter, LanguageClassifier, WeightConfig, convert, reattach, scan};

const SAMPLES: &[(&str, &str)] = &[
    ("go", "package main\n\nimport \"fmt\"\n\nfunc main() {\n    fmt.Println(\"hi\")\n}\n"),
    ("rust", "use std::io;\n\nfn main() {\n    let mut line = String::new();\n    println!(\"{line}\");\n}\n"),
    ("python", "import os\n\ndef main():\n    print(os.getcwd())\n\nif __name__ == \"__main__\":\n    main()\n"),
    ("none", "lorem ipsum dolor sit amet\nconsectetur adipiscing elit\n"),
];

/// An article with `n` code blocks, every other one untagged.
fn synthetic_markdown(n: usize) -> String {
    let mut md = String::from("# Benchmark\n\n");
    for i in 0..n {
        let (_, body) = SAMPLES[i % SAMPLES.len()];
        md.push_str(&format!("Step {} of the walkthrough.\n\n```\n{}```\n\n", i, body));
    }
    md
}

fn bench_scan(c: &mut Criterion) {
    let html = std::fs::read_to_string("../../tests/fixtures/mixed_code.html").unwrap();

    c.bench_function("scan", |b| b.iter(|| scan(black_box(&html))));
}

fn bench_classify(c: &mut Criterion) {
    let classifier = LanguageClassifier::with_default_detector(WeightConfig::default());
    let mut group = c.benchmark_group("classify");

    for (name, body) in SAMPLES {
        let block = CodeBlock::new(*body).with_context(ContextWindow::new("Save it and run it.", ""));
        group.bench_with_input(BenchmarkId::new("sample", name), &block, |b, block| {
            b.iter(|| classifier.classify(black_box(block)))
        });
    }

    group.finish();
}

fn bench_attribution(c: &mut Criterion) {
    let converter = Converter::default();
    let mut group = c.benchmark_group("tag_markdown");

    for blocks in [4, 40, 400] {
        let md = synthetic_markdown(blocks);
        group.bench_with_input(BenchmarkId::new("blocks", blocks), &md, |b, md| {
            b.iter(|| converter.tag_markdown(black_box(md)))
        });
    }

    group.finish();
}

fn bench_reattach(c: &mut Criterion) {
    let md = synthetic_markdown(400);
    let languages: Vec<&str> = (0..400).map(|i| SAMPLES[i % SAMPLES.len()].0).collect();

    c.bench_function("reattach_400", |b| b.iter(|| reattach(black_box(&md), black_box(&languages))));
}

fn bench_convert(c: &mut Criterion) {
    let html = std::fs::read_to_string("../../tests/fixtures/mixed_code.html").unwrap();

    c.bench_function("convert", |b| b.iter(|| convert(black_box(&html))));
}

criterion_group!(
    benches,
    bench_scan,
    bench_classify,
    bench_attribution,
    bench_reattach,
    bench_convert
);
criterion_main!(benches);
