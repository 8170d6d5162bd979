use pubstore_pubmed::extract_papers;

const SAMPLE_SET: &str = include_str!("../tests/data/sample_set.xml");

/// Sample articles repeated `copies` times inside one article set.
fn build_document(copies: usize) -> String {
    let start = SAMPLE_SET.find("<PubmedArticle>").unwrap();
    let end = SAMPLE_SET.rfind("</PubmedArticleSet>").unwrap();
    let articles = &SAMPLE_SET[start..end];

    let mut doc = String::from("<PubmedArticleSet>\n");
    for _ in 0..copies {
        doc.push_str(articles);
    }
    doc.push_str("</PubmedArticleSet>\n");
    doc
}

#[divan::bench(args = [1, 100, 1000])]
fn extract_papers_bench(bencher: divan::Bencher, copies: usize) {
    let doc = build_document(copies);
    bencher.bench(|| extract_papers(&doc).filter(Result::is_ok).count());
}

/// Baseline: walk the document without building papers.
#[divan::bench(args = [1000])]
fn raw_event_walk(bencher: divan::Bencher, copies: usize) {
    let doc = build_document(copies);
    bencher.bench(|| {
        let mut reader = quick_xml::Reader::from_str(&doc);
        let mut buf = Vec::new();
        let mut events = 0usize;
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Eof) | Err(_) => break,
                Ok(_) => events += 1,
            }
            buf.clear();
        }
        events
    });
}

fn main() {
    divan::main();
}
