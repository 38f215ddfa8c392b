//! MangaDex catalog client tests against canned API responses.

mod common;

use common::*;
use mangaka::Error;
use mangaka::prelude::*;
use mangaka::sources::MangaDexSource;
use serde_json::json;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_search_maps_results_and_pagination() {
        let server = FixtureServer::start(vec![(
            "/manga",
            Route::json(json!({
                "result": "ok",
                "data": [
                    {"id": "m1", "type": "manga", "attributes": {
                        "title": {"en": "The Summer You Were There"},
                        "description": {"en": "A summer story."},
                        "status": "completed", "year": 2020}},
                    {"id": "m2", "type": "manga", "attributes": {
                        "title": {"ja-ro": "Kimi ga Ita Natsu"},
                        "description": [],
                        "status": "ongoing", "year": null}}
                ],
                "limit": 10, "offset": 0, "total": 12
            })),
        )])
        .await;
        let source = MangaDexSource::with_api_base(server.base_url());

        let page = source.search("summer you were there".into()).await.unwrap();
        assert_eq!(page.manga.len(), 2);
        assert_eq!(page.manga[0].title, "The Summer You Were There");
        assert_eq!(page.manga[0].description.as_deref(), Some("A summer story."));
        assert_eq!(page.manga[0].year, Some(2020));
        assert_eq!(page.manga[1].title, "Kimi ga Ita Natsu");
        assert_eq!(page.manga[1].description, None);
        assert!(page.has_next());
        assert_eq!(page.next_offset(), 10);

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].contains("title=summer%20you%20were%20there"));
        assert!(requests[0].contains("limit=10"));
        assert!(requests[0].contains("offset=0"));
    }

    #[tokio::test]
    async fn test_chapter_feed_mapping() {
        let server = FixtureServer::start(vec![(
            "/manga/m1/feed",
            Route::json(json!({
                "data": [
                    {"id": "c6", "type": "chapter", "attributes": {
                        "title": "Arrival", "chapter": "6", "pages": 21,
                        "externalUrl": null}},
                    {"id": "c5", "type": "chapter", "attributes": {
                        "title": "", "chapter": "5", "pages": 19}},
                    {"id": "c4", "type": "chapter", "attributes": {
                        "title": null, "chapter": "4", "pages": 0,
                        "externalUrl": "https://external.example/c4"}}
                ],
                "limit": 96, "offset": 0, "total": 3
            })),
        )])
        .await;
        let source = MangaDexSource::with_api_base(server.base_url());

        let chapters = source.get_chapters("m1").await.unwrap();
        let titles: Vec<_> = chapters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Ch. 6 - Arrival", "Ch. 5", "Ch. 4"]);
        assert_eq!(chapters[0].pages, 21);
        assert!(!chapters[1].is_external());
        assert_eq!(
            chapters[2].external_url.as_deref(),
            Some("https://external.example/c4")
        );

        let request = &server.requests()[0];
        assert!(request.contains("translatedLanguage[]=en"));
        assert!(request.contains("limit=96"));
        assert!(request.contains("order[chapter]=desc"));
    }

    #[tokio::test]
    async fn test_pages_are_composed_from_base_hash_and_filename() {
        let server = FixtureServer::start(vec![(
            "/at-home/server/c5",
            Route::json(json!({
                "result": "ok",
                "baseUrl": "https://uploads.example",
                "chapter": {"hash": "abc123", "data": ["1-x.png", "2-y.jpg"], "dataSaver": []}
            })),
        )])
        .await;
        let source = MangaDexSource::with_api_base(server.base_url());

        let pages = source.get_pages("c5").await.unwrap();
        assert_eq!(
            pages,
            vec![
                "https://uploads.example/data/abc123/1-x.png",
                "https://uploads.example/data/abc123/2-y.jpg",
            ]
        );
    }

    #[tokio::test]
    async fn test_status_and_decode_errors() {
        let server = FixtureServer::start(vec![
            ("/at-home/server/broken", Route::status(503)),
            ("/manga/bad/feed", Route::ok("<html>not json</html>")),
        ])
        .await;
        let source = MangaDexSource::with_api_base(server.base_url());

        assert!(matches!(
            source.get_pages("missing").await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            source.get_pages("broken").await,
            Err(Error::Request { status: 503, .. })
        ));
        assert!(matches!(
            source.get_chapters("bad").await,
            Err(Error::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_page_list_is_returned_as_is() {
        let server = FixtureServer::start(vec![(
            "/at-home/server/c0",
            Route::json(json!({
                "baseUrl": "https://uploads.example",
                "chapter": {"hash": "h", "data": []}
            })),
        )])
        .await;
        let source = MangaDexSource::with_api_base(server.base_url());
        assert!(source.get_pages("c0").await.unwrap().is_empty());
    }
}
