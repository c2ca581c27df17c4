//! Wires the standard processor pipeline into a real `Extractor` and runs
//! it against a mocked page, exercising the two literal scenarios
//! (spec.md §8 S1, S6) that only show up once the whole pipeline runs
//! together: a YouTube iframe embed and bare tables.

use std::sync::Arc;

use readeck_archiver::ArchiveFlags;
use readeck_config::ExtractorConfig;
use readeck_engine::Extractor;
use readeck_fetch::SafeClient;
use readeck_siteconfig::SiteConfigRegistry;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn video_embed_and_table_wrapping_survive_the_full_pipeline() {
    let server = MockServer::start().await;
    let body = r#"
        <html>
        <head><title>A long article</title></head>
        <body>
            <article>
                <p>This article has a video and some tabular data, with enough text to let the readability pass prefer this block, commas included, for good measure.</p>
                <iframe src="https://www.youtube.com/embed/haAimDKxo40?si=XZY"></iframe>
                <table><tr><td>1</td><td>2</td></tr></table>
            </article>
        </body>
        </html>
    "#;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body).insert_header("content-type", "text/html"))
        .mount(&server)
        .await;

    let registry = Arc::new(SiteConfigRegistry::load(&[]).unwrap());
    let (processors, sink) = readeck_processors::standard_processors(registry, Vec::new(), ArchiveFlags::NONE);

    let client = Arc::new(SafeClient::new(Arc::new(ExtractorConfig::default())).unwrap());
    let mut extractor = Extractor::new(Url::parse(&server.uri()).unwrap(), client);
    extractor.add_processors(processors);
    extractor.run().await;

    assert!(extractor.errors().is_empty(), "errors: {:?}", extractor.errors());
    assert_eq!(extractor.main_drop().unwrap().title, "A long article");

    let output = sink.take().expect("archive output recorded");
    assert!(output.html.contains(r#"href="https://www.youtube.com/watch?v=haAimDKxo40""#));
    assert!(output.html.contains(r#"src="https://i.ytimg.com/vi/haAimDKxo40/hqdefault.jpg""#));
    assert!(!output.html.contains("<iframe"));
    assert!(output.html.contains("<figure><table>"));
}
