mod common;

use mongodb::bson::oid::ObjectId;

use common::{new_destination, TestApp};
use travel_bucket_api::client::api::ClientError;
use travel_bucket_api::client::mirror::MirrorStore;
use travel_bucket_api::models::destination::{DestinationPatch, TravelStatus};
use travel_bucket_api::models::user::{ProfileUpdate, RegisterRequest, UserRole};

fn register_request(email: &str, role: UserRole) -> RegisterRequest {
    RegisterRequest {
        name: "Mirror User".to_string(),
        email: email.to_string(),
        password: "password123".to_string(),
        role,
    }
}

#[actix_rt::test]
async fn test_mutations_require_a_session() {
    let test_app = TestApp::new();
    let store = MirrorStore::new(test_app.local_api());

    let err = store
        .add_destination(new_destination("Lima", "Peru", false))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotLoggedIn));
    assert!(store.fetch_destinations().await.unwrap().is_empty());
    assert!(!store.is_loading());
}

#[actix_rt::test]
async fn test_register_logs_in_and_add_prepends() {
    let test_app = TestApp::new();
    let store = MirrorStore::new(test_app.local_api());

    let me = store
        .register(register_request("ana@example.com", UserRole::User))
        .await
        .unwrap();
    assert_eq!(store.session().map(|u| u.id), Some(me.id));

    let lima = store
        .add_destination(new_destination("Lima", "Peru", false))
        .await
        .unwrap();
    let cusco = store
        .add_destination(new_destination("Cusco", "Peru", false))
        .await
        .unwrap();

    let local: Vec<ObjectId> = store.destinations().iter().map(|d| d.id).collect();
    assert_eq!(local, vec![cusco.id, lima.id]);
    assert!(!store.is_loading());
}

#[actix_rt::test]
async fn test_failed_mutation_leaves_state_unchanged() {
    let test_app = TestApp::new();
    let owner = test_app.register("ana@example.com", UserRole::User).await;
    let lima = test_app.seed_destination(&owner, "Lima", "Peru", false).await;
    test_app.register("bob@example.com", UserRole::User).await;

    let store = MirrorStore::new(test_app.local_api());
    store.login("bob@example.com", "password123").await.unwrap();
    store.set_status("all");
    let before = store.destinations();

    let err = store.delete_destination(&lima.id).await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(store.destinations(), before);

    let err = store.toggle_featured(&lima.id).await.unwrap_err();
    assert_eq!(err.status(), Some(403));
}

#[actix_rt::test]
async fn test_update_rejects_malformed_id_locally() {
    let test_app = TestApp::new();
    let store = MirrorStore::new(test_app.local_api());
    store
        .register(register_request("ana@example.com", UserRole::User))
        .await
        .unwrap();

    let err = store
        .update_destination("not-an-id", DestinationPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidId));
    assert_eq!(err.to_string(), "Invalid ID format");
}

#[actix_rt::test]
async fn test_update_and_delete_patch_local_copy() {
    let test_app = TestApp::new();
    let store = MirrorStore::new(test_app.local_api());
    store
        .register(register_request("ana@example.com", UserRole::User))
        .await
        .unwrap();
    let lima = store
        .add_destination(new_destination("Lima", "Peru", false))
        .await
        .unwrap();

    store
        .update_destination(
            &lima.id.to_hex(),
            DestinationPatch {
                status: Some(TravelStatus::Visited),
                rating: Some(4),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let local = store.destinations();
    assert_eq!(local[0].status, TravelStatus::Visited);
    assert_eq!(local[0].rating, Some(4));

    store.delete_destination(&lima.id).await.unwrap();
    assert!(store.destinations().is_empty());
}

#[actix_rt::test]
async fn test_fetch_scopes_by_role() {
    let test_app = TestApp::new();
    let admin = test_app.register("root@example.com", UserRole::Admin).await;
    let ana = test_app.register("ana@example.com", UserRole::User).await;
    test_app.seed_destination(&admin, "Petra", "Jordan", true).await;
    test_app.seed_destination(&ana, "Lima", "Peru", false).await;

    let store = MirrorStore::new(test_app.local_api());
    store.login("ana@example.com", "password123").await.unwrap();
    let mine = store.fetch_destinations().await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].title, "Lima");

    store.logout();
    assert!(store.destinations().is_empty());

    store.login("root@example.com", "password123").await.unwrap();
    assert_eq!(store.fetch_destinations().await.unwrap().len(), 2);
}

#[actix_rt::test]
async fn test_filtered_view_matches_server() {
    let test_app = TestApp::new();
    let admin = test_app.register("root@example.com", UserRole::Admin).await;
    let ana = test_app.register("ana@example.com", UserRole::User).await;
    let bob = test_app.register("bob@example.com", UserRole::User).await;
    test_app.seed_destination(&admin, "Petra", "Jordan", true).await;
    test_app.seed_destination(&ana, "Lima", "Peru", false).await;
    test_app.seed_destination(&ana, "arequipa", "Peru", false).await;
    test_app.seed_destination(&bob, "Quito", "Ecuador", false).await;

    let store = MirrorStore::new(test_app.local_api());
    store.login("root@example.com", "password123").await.unwrap();
    store.fetch_destinations().await.unwrap();

    store.set_country("Peru");
    store.set_sort("alphabetical");
    let local: Vec<String> = store
        .filtered_destinations(None)
        .into_iter()
        .map(|d| d.title)
        .collect();
    let remote: Vec<String> = test_app
        .state
        .destinations
        .list(&store.filter())
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.title)
        .collect();
    assert_eq!(local, vec!["arequipa", "Lima"]);
    assert_eq!(local, remote);

    store.set_country("");
    store.set_search("");
    let for_ana: Vec<String> = store
        .filtered_destinations(Some(&ana.id))
        .into_iter()
        .map(|d| d.title)
        .collect();
    assert_eq!(for_ana.len(), 3);
    assert!(for_ana.contains(&"Petra".to_string()));
    assert!(!for_ana.contains(&"Quito".to_string()));
}

#[actix_rt::test]
async fn test_admin_actions_wait_for_confirmation() {
    let test_app = TestApp::new();
    test_app.register("root@example.com", UserRole::Admin).await;
    let ana = test_app.register("ana@example.com", UserRole::User).await;
    let lima = test_app.seed_destination(&ana, "Lima", "Peru", false).await;

    let store = MirrorStore::new(test_app.local_api());
    store.login("root@example.com", "password123").await.unwrap();
    store.fetch_destinations().await.unwrap();

    let toggled = store.toggle_featured(&lima.id).await.unwrap();
    assert!(toggled.featured);
    assert!(store.destinations()[0].featured);

    store.delete_destination_by_admin(&lima.id).await.unwrap();
    assert!(store.destinations().is_empty());

    let err = store.delete_destination_by_admin(&lima.id).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[actix_rt::test]
async fn test_copy_and_board_for_user() {
    let test_app = TestApp::new();
    let admin = test_app.register("root@example.com", UserRole::Admin).await;
    let petra = test_app.seed_destination(&admin, "Petra", "Jordan", true).await;
    let giza = test_app.seed_destination(&admin, "Giza", "Egypt", true).await;

    let store = MirrorStore::new(test_app.local_api());
    let me = store
        .register(register_request("ana@example.com", UserRole::User))
        .await
        .unwrap();
    let own = store
        .add_destination(new_destination("Lima", "Peru", false))
        .await
        .unwrap();
    let copy = store.copy_admin_destination(&petra.id).await.unwrap();
    assert_eq!(copy.parent_destination_id, Some(petra.id));

    // The board reads the local list; pull the shared destinations in.
    store.login("root@example.com", "password123").await.unwrap();
    store.fetch_destinations().await.unwrap();

    let board: Vec<ObjectId> = store
        .destinations_for_user(&me.id)
        .iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(board.len(), 3);
    assert_eq!(board[0], copy.id);
    assert!(board.contains(&giza.id));
    assert!(!board.contains(&petra.id));
    assert_eq!(board[2], own.id);
}

#[actix_rt::test]
async fn test_users_profile_and_account_deletion() {
    let test_app = TestApp::new();
    test_app.register("bob@example.com", UserRole::User).await;

    let store = MirrorStore::new(test_app.local_api());
    store
        .register(register_request("ana@example.com", UserRole::User))
        .await
        .unwrap();
    assert_eq!(store.fetch_users().await.unwrap().len(), 2);

    let updated = store
        .update_profile(ProfileUpdate {
            name: Some("Ana Maria".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(store.session().unwrap().name, "Ana Maria");
    assert!(store.users().iter().any(|u| u.id == updated.id && u.name == "Ana Maria"));

    let stats = store.user_stats(&updated.id).await.unwrap();
    assert_eq!(stats.total, 0);

    store.delete_account().await.unwrap();
    assert!(store.session().is_none());
    assert_eq!(store.users().len(), 1);
    assert!(store.login("ana@example.com", "password123").await.is_err());
}
