//! Integration tests for the refresh path
//!
//! A stub log source stands in for the game API so the whole
//! fetch → aggregate → sanitize → merge → project flow runs against a real
//! SQLite store.
//!
//! Key integration points tested:
//! - Fetch failures surface as NoData and leave stored seasons untouched
//! - Malformed logs fail before any write
//! - First refresh inserts, later refreshes replace in place
//! - Projected rankings reflect the merged documents

#[cfg(test)]
mod refresh_integration_tests {
    use async_trait::async_trait;
    use clanstats::{
        ClanTag, DocumentStore, FetchError, MergeOutcome, Metric, QueryError, QueryProjector,
        RefreshError, RefreshOutcome, RefreshService, RemoteLogSource, SqliteDocumentStore,
    };
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    /// Serves queued responses in order, then fails with 503
    struct StubSource {
        responses: Mutex<Vec<Result<Value, FetchError>>>,
    }

    impl StubSource {
        fn new(responses: Vec<Result<Value, FetchError>>) -> Arc<Self> {
            let mut responses = responses;
            responses.reverse();
            Arc::new(Self {
                responses: Mutex::new(responses),
            })
        }
    }

    #[async_trait]
    impl RemoteLogSource for StubSource {
        async fn fetch_river_race_log(&self, _clan: &ClanTag) -> Result<Value, FetchError> {
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(FetchError::Status {
                    status: 503,
                    body: "exhausted".to_string(),
                }))
        }
    }

    fn forbidden() -> FetchError {
        FetchError::Status {
            status: 403,
            body: r#"{"reason":"accessDenied"}"#.to_string(),
        }
    }

    fn clan() -> ClanTag {
        "#2PP".parse().unwrap()
    }

    fn river_log(items: Vec<(u32, u32, Value)>) -> Value {
        let items: Vec<Value> = items
            .into_iter()
            .map(|(season, section, participants)| {
                json!({
                    "seasonId": season,
                    "sectionIndex": section,
                    "standings": [
                        { "clan": { "tag": "#2PP", "participants": participants } }
                    ]
                })
            })
            .collect();
        json!({ "items": items })
    }

    fn setup(responses: Vec<Result<Value, FetchError>>) -> (Arc<SqliteDocumentStore>, RefreshService) {
        let store = Arc::new(SqliteDocumentStore::open_in_memory().unwrap());
        let service = RefreshService::new(StubSource::new(responses), store.clone());
        (store, service)
    }

    #[tokio::test]
    async fn test_fetch_failure_reports_no_data_and_keeps_store() {
        let first = river_log(vec![(
            90,
            0,
            json!([{ "tag": "#A", "name": "alpha", "fame": 100, "decksUsed": 4 }]),
        )]);
        let (store, service) = setup(vec![Ok(first), Err(forbidden())]);

        service.refresh(&clan()).await.unwrap();
        let before = store.find_one("#2PP", 90).unwrap().unwrap();

        let outcome = service.refresh(&clan()).await.unwrap();
        match outcome {
            RefreshOutcome::NoData { reason } => assert!(reason.contains("403")),
            other => panic!("expected NoData, got {:?}", other),
        }

        let after = store.find_one("#2PP", 90).unwrap().unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_malformed_log_writes_nothing() {
        let (store, service) = setup(vec![Ok(json!({ "items": "not a list" }))]);

        let result = service.refresh(&clan()).await;
        assert!(matches!(result, Err(RefreshError::Aggregate(_))));
        assert!(store.list_collection_names().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_participants_writes_nothing() {
        let raw = json!({ "items": [
            { "seasonId": 90, "sectionIndex": 0, "standings": [
                { "clan": { "tag": "#2PP", "participants": [
                    { "tag": "#A", "name": "alpha", "fame": 1, "decksUsed": 1 }
                ] } }
            ] },
            { "seasonId": 91, "sectionIndex": 0, "standings": [
                { "clan": { "tag": "#2PP" } }
            ] }
        ]});
        let (store, service) = setup(vec![Ok(raw)]);

        let result = service.refresh(&clan()).await;
        assert!(matches!(result, Err(RefreshError::Aggregate(_))));
        assert!(store.find_all("#2PP").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_then_replace_keeps_identity() {
        let first = river_log(vec![(
            90,
            0,
            json!([{ "tag": "#A", "name": "alpha", "fame": 100, "decksUsed": 4 }]),
        )]);
        let second = river_log(vec![
            (90, 1, json!([{ "tag": "#A", "name": "alpha", "fame": 40, "decksUsed": 2 }])),
            (91, 0, json!([{ "tag": "#B", "name": "beta", "fame": 10, "decksUsed": 1 }])),
        ]);
        let (store, service) = setup(vec![Ok(first), Ok(second)]);

        let outcome = service.refresh(&clan()).await.unwrap();
        assert_eq!(
            outcome,
            RefreshOutcome::Updated {
                seasons: vec![(90, MergeOutcome::Inserted)],
                players: 1,
            }
        );
        let id = store.find_one("#2PP", 90).unwrap().unwrap().id;

        let outcome = service.refresh(&clan()).await.unwrap();
        assert_eq!(
            outcome,
            RefreshOutcome::Updated {
                seasons: vec![(90, MergeOutcome::Replaced), (91, MergeOutcome::Inserted)],
                players: 2,
            }
        );

        let doc = store.find_one("#2PP", 90).unwrap().unwrap();
        assert_eq!(doc.id, id);
        let alpha = &doc.body.players["#A"];
        // Section 0 is no longer in the log but survives from the stored copy
        assert_eq!(alpha.sections[&0].fame, 100);
        assert_eq!(alpha.sections[&1].fame, 40);
    }

    #[tokio::test]
    async fn test_rankings_after_refresh() {
        let raw = river_log(vec![
            (
                90,
                0,
                json!([
                    { "tag": "#A", "name": "al<pha>", "fame": 10, "decksUsed": 4 },
                    { "tag": "#B", "name": "beta", "fame": 30, "decksUsed": 1 }
                ]),
            ),
            (90, 1, json!([{ "tag": "#A", "name": "al<pha>", "fame": 40, "decksUsed": 4 }])),
        ]);
        let (store, service) = setup(vec![Ok(raw)]);
        let projector = QueryProjector::new(store.clone());

        assert!(matches!(
            projector.project(&clan()),
            Err(QueryError::NoData(_))
        ));

        service.refresh(&clan()).await.unwrap();

        let seasons = projector.project(&clan()).unwrap();
        let view = &seasons[&90];

        let fame = view.table(Metric::Fame);
        let order: Vec<&str> = fame.rows.iter().map(|r| r.tag.as_str()).collect();
        assert_eq!(order, vec!["#A", "#B"]);
        assert_eq!(fame.rows[0].total, 50);
        assert_eq!(fame.rows[0].name, "alpha");
        assert_eq!(fame.rows[1].values, vec![Some(30), None]);

        let decks = view.table(Metric::DecksUsed);
        assert_eq!(decks.rows[0].tag, "#A");
        assert_eq!(decks.rows[0].total, 8);

        assert_eq!(projector.list_clans().unwrap(), vec!["#2PP".to_string()]);
    }
}
