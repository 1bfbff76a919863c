mod common;

use actix_web::{web, App, HttpServer};

use common::{new_destination, TestApp};
use travel_bucket_api::client::api::{HttpApi, TravelApi};
use travel_bucket_api::client::mirror::MirrorStore;
use travel_bucket_api::models::user::{LoginRequest, RegisterRequest, UserRole};
use travel_bucket_api::routes;

/// Serves the route table on an ephemeral port and returns its base URL.
fn spawn_server(test_app: &TestApp) -> String {
    let state = web::Data::new(test_app.state.clone());
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("bind test server");
    let addr = server.addrs()[0];
    actix_rt::spawn(server.run());
    format!("http://{}", addr)
}

#[actix_rt::test]
async fn test_http_api_round_trip() {
    let test_app = TestApp::new();
    let api = HttpApi::new(&spawn_server(&test_app)).unwrap();

    let me = api
        .register(&RegisterRequest {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "password123".to_string(),
            role: UserRole::User,
        })
        .await
        .unwrap();

    let err = api
        .login(&LoginRequest {
            email: "ana@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.to_string(), "Invalid credentials");

    let created = api
        .create_destination(&me.id, &new_destination("Lima", "Peru", false))
        .await
        .unwrap();
    assert_eq!(created.user_id, Some(me.id));

    let stats = api.user_stats(&me.id).await.unwrap();
    assert_eq!(stats.total, 1);

    api.delete_destination(&me.id, &created.id).await.unwrap();
    let err = api
        .delete_destination(&me.id, &created.id)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));

    api.delete_user(&me.id, &me.id).await.unwrap();
    assert!(api.list_users().await.unwrap().is_empty());
}

#[actix_rt::test]
async fn test_mirror_over_http() {
    let test_app = TestApp::new();
    let ana = test_app.register("ana@example.com", UserRole::User).await;
    test_app.seed_destination(&ana, "Lima", "Peru", false).await;
    test_app.seed_destination(&ana, "Quito", "Ecuador", false).await;

    let store = MirrorStore::new(HttpApi::new(&spawn_server(&test_app)).unwrap());
    store.login("ana@example.com", "password123").await.unwrap();
    store.set_country("Ecuador");

    let fetched = store.fetch_destinations().await.unwrap();
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].title, "Quito");
    assert_eq!(store.filtered_destinations(Some(&ana.id)).len(), 1);
}
