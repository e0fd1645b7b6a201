#[cfg(test)]
mod tests {
    use {
        crate::{
            riverlog::{aggregate, ClanTag, SeasonMap},
            sanitizer::sanitize_seasons,
            store::{DocumentStore, MergeStore, SqliteDocumentStore},
        },
        serde_json::{json, Value},
        std::sync::Arc,
    };

    fn clan() -> ClanTag {
        "#CLAN1".parse().unwrap()
    }

    fn setup() -> (Arc<SqliteDocumentStore>, MergeStore) {
        let store = Arc::new(SqliteDocumentStore::open_in_memory().unwrap());
        let merge = MergeStore::new(store.clone());
        (store, merge)
    }

    fn log_item(season: u32, section: u32, participants: Value) -> Value {
        json!({
            "seasonId": season,
            "sectionIndex": section,
            "standings": [
                { "clan": { "tag": "#CLAN1", "participants": participants } },
                { "clan": { "tag": "#OTHER", "participants": [
                    { "tag": "#X", "name": "outsider", "fame": 9999, "decksUsed": 16 }
                ] } }
            ]
        })
    }

    fn player(tag: &str, name: &str, fame: u64, decks: u64) -> Value {
        json!({ "tag": tag, "name": name, "fame": fame, "decksUsed": decks })
    }

    /// Aggregate, sanitize and merge one raw log, the same steps a refresh runs
    fn run_pipeline(merge: &MergeStore, raw: &Value) {
        let seasons: SeasonMap = sanitize_seasons(aggregate(raw, &clan()).unwrap()).unwrap();
        merge.merge_all(&clan(), seasons).unwrap();
    }

    fn stored(store: &SqliteDocumentStore, season: u32) -> Value {
        let doc = store.find_one("#CLAN1", season).unwrap().unwrap();
        serde_json::to_value(&doc.body).unwrap()
    }

    /// Test that repeating a refresh with the same log leaves the store unchanged
    #[test]
    fn test_refresh_is_idempotent() {
        let raw = json!({ "items": [
            log_item(100, 0, json!([player("#P1", "alice", 100, 4), player("#P2", "bob", 50, 2)])),
            log_item(100, 0, json!([player("#P1", "alice", 20, 1)])),
            log_item(100, 1, json!([player("#P2", "bob", 75, 3)])),
        ]});

        let (store, merge) = setup();
        run_pipeline(&merge, &raw);
        let first = stored(&store, 100);

        run_pipeline(&merge, &raw);
        let second = stored(&store, 100);

        assert_eq!(first, second);
        assert_eq!(
            first,
            json!({ "players": {
                "#P1": { "name": "alice", "0_fame": 120, "0_decks_used": 5 },
                "#P2": { "name": "bob", "0_fame": 50, "0_decks_used": 2, "1_fame": 75, "1_decks_used": 3 }
            }})
        );
        assert_eq!(store.find_all("#CLAN1").unwrap().len(), 1);
    }

    /// Test that a section rolled off the log survives from the stored document
    #[test]
    fn test_older_sections_are_backfilled() {
        let (store, merge) = setup();

        run_pipeline(
            &merge,
            &json!({ "items": [
                log_item(100, 0, json!([player("#P1", "alice", 100, 4)])),
                log_item(100, 1, json!([player("#P1", "alice", 200, 4)])),
            ]}),
        );
        run_pipeline(
            &merge,
            &json!({ "items": [
                log_item(100, 1, json!([player("#P1", "alice", 210, 4)])),
                log_item(100, 2, json!([player("#P1", "alice", 50, 1)])),
            ]}),
        );

        assert_eq!(
            stored(&store, 100),
            json!({ "players": {
                "#P1": {
                    "name": "alice",
                    "0_fame": 100, "0_decks_used": 4,
                    "1_fame": 210, "1_decks_used": 4,
                    "2_fame": 50, "2_decks_used": 1
                }
            }})
        );
    }

    /// Test that totals never go down across refreshes of a growing log
    #[test]
    fn test_totals_are_monotonic_for_growing_logs() {
        let (store, merge) = setup();
        let early = vec![log_item(100, 0, json!([player("#P1", "alice", 100, 4)]))];
        let mut later = early.clone();
        later.push(log_item(100, 0, json!([player("#P1", "alice", 30, 2)])));
        later.push(log_item(100, 1, json!([player("#P1", "alice", 10, 1)])));

        run_pipeline(&merge, &json!({ "items": early }));
        let before = store.find_one("#CLAN1", 100).unwrap().unwrap().body;
        run_pipeline(&merge, &json!({ "items": later }));
        let after = store.find_one("#CLAN1", 100).unwrap().unwrap().body;

        let before_p1 = &before.players["#P1"];
        let after_p1 = &after.players["#P1"];
        for (section, totals) in &before_p1.sections {
            let now = after_p1.sections[section];
            assert!(now.fame >= totals.fame);
            assert!(now.decks_used >= totals.decks_used);
        }
        assert_eq!(after_p1.total(|t| t.fame), 140);
    }

    /// Test that display names are cleaned before they reach the store
    #[test]
    fn test_names_are_sanitized_before_storage() {
        let (store, merge) = setup();
        run_pipeline(
            &merge,
            &json!({ "items": [
                log_item(7, 0, json!([player("#P1", "Pl@yer_1!! <3", 10, 1)])),
            ]}),
        );

        let doc = store.find_one("#CLAN1", 7).unwrap().unwrap();
        assert_eq!(doc.body.players["#P1"].name, "Player1!! 3");
    }

    /// Test that each season lands in its own document
    #[test]
    fn test_seasons_are_stored_separately() {
        let (store, merge) = setup();
        run_pipeline(
            &merge,
            &json!({ "items": [
                log_item(101, 0, json!([player("#P1", "alice", 5, 1)])),
                log_item(100, 3, json!([player("#P2", "bob", 8, 2)])),
            ]}),
        );

        let docs = store.find_all("#CLAN1").unwrap();
        let seasons: Vec<u32> = docs.iter().map(|d| d.season_id).collect();
        assert_eq!(seasons, vec![100, 101]);
        assert!(docs[0].body.players.contains_key("#P2"));
        assert!(!docs[0].body.players.contains_key("#P1"));
        assert!(!docs[0].body.players.contains_key("#X"));
    }
}
