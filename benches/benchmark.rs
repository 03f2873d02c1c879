//! Performance benchmarks for landing-parse.
//!
//! Run with: `cargo bench`
//!
//! Benchmarks include:
//! - A small publisher page with citation metas and a PDF anchor
//! - A repository page with numbered link noise, to exercise the deny-lists
//! - Stored landing pages from a local sample directory, when present

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use landing_parse::{classify, Namespace, Options};
use std::fs;

const PUBLISHER_HTML: &str = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Sample Article</title>
    <meta property="og:url" content="https://www.tandfonline.com/doi/full/10.1080/00000000.2024.1">
    <meta name="citation_author" content="Joseph Alulu">
    <meta name="citation_author_institution" content="University of Nairobi">
    <meta name="citation_pdf_url" content="https://www.tandfonline.com/doi/pdf/10.1080/00000000.2024.1">
    <meta name="dc.publisher" content="Taylor &amp; Francis">
</head>
<body>
    <div class="publicationContentAuthors">
        <div class="entryAuthor"><a href="/author/Alulu">Joseph Alulu</a>
            <span class="overlay">a University of Nairobi, Nairobi, Kenya<span class="heading">Correspondence</span></span>
        </div>
    </div>
    <div class="abstractInFull"><p>Abstract text for benchmarking.</p></div>
    <a href="/doi/pdf/10.1080/00000000.2024.1">Download PDF</a>
    <a href="https://creativecommons.org/licenses/by/4.0/">CC BY 4.0</a>
</body>
</html>
"#;

fn repository_html() -> String {
    let mut html = String::from(
        r#"<html><head><meta name="generator" content="DSpace 7.6">
        <meta name="citation_author" content="Jansen, Pieter">
        <meta name="citation_author_institution" content="Utrecht University">
        </head><body><h2>References</h2><ol>"#,
    );
    for i in 0..200 {
        html.push_str(&format!(r#"<li><a href="/cited/{i}.pdf">PDF {i}</a></li>"#));
    }
    html.push_str(r#"</ol><a href="/bitstream/handle/1874/1/thesis.pdf">Download</a></body></html>"#);
    html
}

fn bench_publisher_page(c: &mut Criterion) {
    let options = Options::default();
    c.bench_function("classify_publisher", |b| {
        b.iter(|| {
            classify(
                black_box(PUBLISHER_HTML),
                Some(Namespace::Doi),
                Some("https://www.tandfonline.com/doi/full/10.1080/00000000.2024.1"),
                black_box(&options),
            )
        });
    });
}

fn bench_repository_page(c: &mut Criterion) {
    let options = Options::default();
    let html = repository_html();
    c.bench_function("classify_repository", |b| {
        b.iter(|| {
            classify(
                black_box(&html),
                Some(Namespace::Pmh),
                Some("https://dspace.library.uu.nl/handle/1874/1"),
                black_box(&options),
            )
        });
    });
}

/// Stored landing pages of varying sizes
fn bench_stored_pages(c: &mut Criterion) {
    let html_dir = "../data/landing_pages";
    let sample_files = ["0001.html", "0010.html", "0100.html"];
    let options = Options::default();

    let mut group = c.benchmark_group("stored_pages");

    for filename in &sample_files {
        let path = format!("{html_dir}/{filename}");
        if let Ok(html) = fs::read(&path) {
            let size_kb = html.len() / 1024;
            group.throughput(Throughput::Bytes(html.len() as u64));
            group.bench_with_input(
                BenchmarkId::new("classify", format!("{filename} ({size_kb}KB)")),
                &html,
                |b, html| {
                    b.iter(|| classify(black_box(html), Some(Namespace::Doi), None, &options));
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_publisher_page, bench_repository_page, bench_stored_pages);
criterion_main!(benches);
