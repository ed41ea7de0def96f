//! Listing page extraction benchmark
//!
//! Measures entry location and field extraction over a synthetic listing
//! page, with and without the structured payload fast path.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use company_scout_lib::infrastructure::parsing::{CompanyListParser, ContextualParser, ParseContext};
use scraper::Html;

fn listing_page(entries: usize, with_payload: bool) -> String {
    let mut cards = String::new();
    let mut payload = Vec::new();

    for i in 0..entries {
        let org = format!("55{:04}-{:04}", i, 1000 + i);
        cards.push_str(&format!(
            r#"<article>
                 <h2><a href="/foretag/bolag-{i}-ab/umea/-/ID{i}">Bolag {i} AB</a></h2>
                 <div><span>Org.nr</span> <span>{org}</span></div>
                 <p>903 29 Umeå</p>
                 <div><span>Omsättning 2023</span><span>{} 000</span></div>
                 <div><span>Anställda</span><span>{}</span></div>
                 <a href="/bransch/data-it/10241590">Data, IT</a>
               </article>"#,
            i + 1,
            i % 50
        ));
        payload.push(format!(r#"{{"name":"Bolag {i} AB","orgnr":"{}"}}"#, org.replace('-', "")));
    }

    let script = if with_payload {
        format!(
            r#"<script id="__NEXT_DATA__" type="application/json">{{"props":{{"pageProps":{{"companies":[{}]}}}}}}</script>"#,
            payload.join(",")
        )
    } else {
        String::new()
    };

    format!("<html><body>{script}<h1>13 170 företag</h1><section>{cards}</section></body></html>")
}

fn benchmark_listing_parse(c: &mut Criterion) {
    let parser = CompanyListParser::new().expect("default parser");
    let context = ParseContext::for_page("https://www.allabolag.se/segmentering");

    let mut group = c.benchmark_group("listing_parse");
    for entries in [10, 50] {
        for with_payload in [false, true] {
            let html = listing_page(entries, with_payload);
            let label = if with_payload { "payload" } else { "dom" };
            group.bench_with_input(BenchmarkId::new(label, entries), &html, |b, html| {
                b.iter(|| {
                    let document = Html::parse_document(black_box(html));
                    parser.parse_with_context(&document, &context).expect("listing parses")
                })
            });
        }
    }
    group.finish();
}

criterion_group!(benches, benchmark_listing_parse);
criterion_main!(benches);
