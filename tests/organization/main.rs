use reminders::{
    page_title, Collection, Organization, OrganizationDirectory, OrganizationOverview, Reminder,
    ReminderStore,
};

fn organization(id: &str, name: &str) -> Organization {
    Organization {
        id: id.into(),
        name: name.into(),
    }
}

fn collection(id: &str, name: &str, org_id: &str, reminders: Vec<Reminder>) -> Collection {
    Collection {
        id: id.into(),
        name: name.into(),
        organization_id: org_id.into(),
        reminders,
    }
}

fn seeded() -> ReminderStore {
    let store = ReminderStore::new();
    store.add_organization(organization("acme", "Acme Corp")).unwrap();
    store.add_organization(organization("fresh", "Fresh Start")).unwrap();
    store
        .add_collection(collection(
            "chores",
            "Chores",
            "acme",
            vec![
                Reminder::new("r1", "Water plants").owned_by("u1"),
                Reminder::new("r2", "Take out bins").owned_by("u1"),
            ],
        ))
        .unwrap();
    store
        .add_collection(collection(
            "work",
            "Work",
            "acme",
            vec![Reminder::new("r3", "Send invoice").owned_by("u2")],
        ))
        .unwrap();
    store
}

// ============================================================================
// Overview
// ============================================================================

#[tokio::test]
async fn overview_uses_organization_name_as_title() {
    let store = seeded();
    let overview = OrganizationOverview::load(&store, "acme").await.unwrap().unwrap();

    assert_eq!(overview.title(), "Acme Corp");
    assert_eq!(overview.organization_id(), "acme");
    assert!(!overview.is_empty());
}

#[tokio::test]
async fn overview_lists_collections_with_their_reminders() {
    let store = seeded();
    let overview = OrganizationOverview::load(&store, "acme").await.unwrap().unwrap();

    let names: Vec<&str> = overview.collections().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Chores", "Work"]);
    assert_eq!(overview.collections()[0].reminders.len(), 2);
    assert_eq!(
        overview.collections()[1].reminders[0].collection_id.as_deref(),
        Some("work")
    );
}

#[tokio::test]
async fn all_reminders_follow_collection_order() {
    let store = seeded();
    let overview = OrganizationOverview::load(&store, "acme").await.unwrap().unwrap();

    let ids: Vec<&str> = overview.all_reminders().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["r1", "r2", "r3"]);
}

#[tokio::test]
async fn organization_without_collections_is_empty() {
    let store = seeded();
    let overview = OrganizationOverview::load(&store, "fresh").await.unwrap().unwrap();

    assert!(overview.is_empty());
    assert_eq!(overview.all_reminders().count(), 0);
    assert_eq!(overview.title(), "Fresh Start");
}

#[tokio::test]
async fn unknown_organization_resolves_to_none() {
    let store = seeded();
    assert!(OrganizationOverview::load(&store, "nobody").await.unwrap().is_none());
    assert!(store.organization_info("nobody").await.unwrap().is_none());
}

// ============================================================================
// Page title
// ============================================================================

#[tokio::test]
async fn page_title_is_organization_name() {
    let store = seeded();
    assert_eq!(
        page_title(&store, "acme").await.unwrap(),
        Some("Acme Corp".to_string())
    );
    assert_eq!(page_title(&store, "nobody").await.unwrap(), None);
}

#[tokio::test]
async fn works_through_a_trait_object() {
    let store = seeded();
    let directory: &dyn OrganizationDirectory = &store;
    assert_eq!(
        page_title(directory, "fresh").await.unwrap(),
        Some("Fresh Start".to_string())
    );
}

// ============================================================================
// Store behaviour seen through the overview
// ============================================================================

#[tokio::test]
async fn status_changes_show_up_in_the_overview() {
    use reminders::{PersistenceEndpoint, UpdateStatusRequest};

    let store = seeded();
    store
        .update_status(UpdateStatusRequest {
            id: "r2".into(),
            created_by: "u1".into(),
            is_completed: true,
        })
        .await
        .unwrap();

    let overview = OrganizationOverview::load(&store, "acme").await.unwrap().unwrap();
    let done: Vec<&str> = overview
        .all_reminders()
        .filter(|r| r.is_completed)
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(done, vec!["r2"]);
}

#[tokio::test]
async fn re_adding_a_collection_replaces_it() {
    let store = seeded();
    store
        .add_collection(collection("work", "Office", "acme", vec![]))
        .unwrap();

    let overview = OrganizationOverview::load(&store, "acme").await.unwrap().unwrap();
    let names: Vec<&str> = overview.collections().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Chores", "Office"]);
    // reminders already filed under the collection stay with it
    assert_eq!(overview.collections()[1].reminders.len(), 1);
}
