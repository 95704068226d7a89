use cases_user_actions::{
    models::{
        find::{FindTypeFilter, SortOrder},
        user_action::{
            NewUserAction, TitlePayload, User, UserActionAction, UserActionAttributes,
            UserActionPayload, UserActionReference, UserActionType,
        },
    },
    repositories::{PgUserActionStore, UserActionQuery, UserActionStore},
};
use chrono::{Duration, Utc};

#[path = "support/mod.rs"]
mod support;

fn title_action(case_id: &str, title: &str, minutes_ago: i64) -> NewUserAction {
    NewUserAction::new(
        UserActionAttributes {
            action: UserActionAction::Update,
            created_at: Utc::now() - Duration::minutes(minutes_ago),
            created_by: User::new("elastic", "Elastic User", "elastic@elastic.co"),
            owner: "securitySolution".into(),
            payload: UserActionPayload::Title(TitlePayload {
                title: title.into(),
            }),
        },
        vec![UserActionReference::case(case_id)],
    )
}

#[tokio::test]
async fn bulk_create_preserves_order_and_assigns_ids() {
    let store = PgUserActionStore::new(support::test_pool().await);
    let case_id = support::unique_case_id();

    let created = store
        .bulk_create(vec![
            title_action(&case_id, "first", 2),
            title_action(&case_id, "second", 1),
        ])
        .await
        .expect("bulk create");

    assert_eq!(created.len(), 2);
    assert_ne!(created[0].id, created[1].id);
    assert_eq!(created[0].payload.0["title"], "first");
    assert_eq!(created[1].payload.0["title"], "second");
    assert_eq!(created[0].case_id, case_id);
    assert_eq!(created[0].kind, "title");

    let listed = store
        .find_for_case(
            &case_id,
            &UserActionQuery {
                sort: SortOrder::Desc,
                ..UserActionQuery::all_ascending()
            },
        )
        .await
        .expect("find");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, created[1].id);
}

#[tokio::test]
async fn records_sharing_a_timestamp_keep_insertion_order() {
    let store = PgUserActionStore::new(support::test_pool().await);
    let case_id = support::unique_case_id();
    let created_at = Utc::now();

    let titles: Vec<String> = (0..8).map(|i| format!("title {}", i)).collect();
    let actions = titles
        .iter()
        .map(|title| {
            let mut action = title_action(&case_id, title, 0);
            action.attributes.created_at = created_at;
            action
        })
        .collect();
    store.bulk_create(actions).await.expect("bulk create");

    let ascending = store
        .find_for_case(&case_id, &UserActionQuery::all_ascending())
        .await
        .expect("find ascending");
    let read_back: Vec<String> = ascending
        .iter()
        .map(|record| record.payload.0["title"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(read_back, titles);

    let latest = store
        .latest_for_case(&case_id, Vec::new(), false)
        .await
        .expect("latest")
        .expect("some record");
    assert_eq!(latest.payload.0["title"], "title 7");
}

#[tokio::test]
async fn find_and_count_apply_type_filters() {
    let store = PgUserActionStore::new(support::test_pool().await);
    let case_id = support::unique_case_id();
    store
        .bulk_create(vec![
            title_action(&case_id, "first", 3),
            title_action(&case_id, "second", 2),
            title_action(&case_id, "third", 1),
        ])
        .await
        .expect("bulk create");

    let query = UserActionQuery {
        filters: vec![FindTypeFilter::Kind(UserActionType::Title)],
        sort: SortOrder::Asc,
        limit: Some(2),
        offset: 1,
    };
    let page = store.find_for_case(&case_id, &query).await.expect("find");
    let total = store.count_for_case(&case_id, &query).await.expect("count");

    assert_eq!(total, 3);
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].payload.0["title"], "second");

    let comments = UserActionQuery {
        filters: vec![FindTypeFilter::User],
        ..Default::default()
    };
    assert_eq!(
        store.count_for_case(&case_id, &comments).await.expect("count"),
        0
    );
}

#[tokio::test]
async fn delete_for_cases_only_touches_listed_cases() {
    let store = PgUserActionStore::new(support::test_pool().await);
    let deleted_case = support::unique_case_id();
    let kept_case = support::unique_case_id();
    store
        .bulk_create(vec![
            title_action(&deleted_case, "a", 2),
            title_action(&deleted_case, "b", 1),
            title_action(&kept_case, "c", 1),
        ])
        .await
        .expect("bulk create");

    let removed = store
        .delete_for_cases(vec![deleted_case.clone()])
        .await
        .expect("delete");
    assert_eq!(removed, 2);

    let stats = store.stats_for_case(&kept_case).await.expect("stats");
    assert_eq!(stats.total, 1);
    assert_eq!(stats.total_other, 1);
    assert_eq!(
        store.stats_for_case(&deleted_case).await.expect("stats").total,
        0
    );
    assert_eq!(store.delete_for_cases(Vec::new()).await.expect("noop"), 0);
}

#[tokio::test]
async fn latest_for_case_is_none_without_records() {
    let store = PgUserActionStore::new(support::test_pool().await);

    let latest = store
        .latest_for_case(&support::unique_case_id(), Vec::new(), false)
        .await
        .expect("latest");

    assert!(latest.is_none());
}
