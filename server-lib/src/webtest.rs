use crate::config::Config;
use crate::interfaces;
use crate::sqldata;
use crate::state::State;
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use orgauth::data::{LoginData, UserProfile};
use serde_json::json;
use spprotocol::content::{LearningPlan, Notification, ReactionCounts, UnreadCount};
use spprotocol::MessageReply;
use std::fs;
use std::path::PathBuf;

fn test_config(dbname: &str) -> Config {
  let db = PathBuf::from(dbname);
  match fs::remove_file(&db) {
    Ok(_) => (),
    Err(e) => println!("error removing {}: {}", dbname, e),
  }
  let mut config = crate::defcon();
  config.orgauth_config.db = db;
  config
}

fn bearer(ld: &LoginData) -> (header::HeaderName, String) {
  (header::AUTHORIZATION, format!("Bearer {}", ld.token))
}

macro_rules! test_app {
  ($config:expr) => {{
    let config: Config = $config;
    sqldata::dbinit(config.orgauth_config.db.as_path(), None).unwrap();
    test::init_service(
      App::new()
        .app_data(web::Data::new(State { config }))
        .configure(interfaces::configure),
    )
    .await
  }};
}

macro_rules! login {
  ($app:expr, $email:expr, $first:expr, $last:expr) => {{
    let req = test::TestRequest::post()
      .uri("/api/auth/signup")
      .set_json(json!({
        "email": $email,
        "password": "secret",
        "firstName": $first,
        "lastName": $last,
      }))
      .to_request();
    let profile: UserProfile = test::call_and_read_body_json(&$app, req).await;
    assert_eq!(profile.email, $email);

    let req = test::TestRequest::post()
      .uri("/api/auth/signin")
      .set_json(json!({ "email": $email, "password": "secret" }))
      .to_request();
    let ld: LoginData = test::call_and_read_body_json(&$app, req).await;
    ld
  }};
}

#[actix_web::test]
async fn test_auth_routes() {
  let app = test_app!(test_config("web-auth-test.db"));
  let alice = login!(app, "alice@example.com", "Alice", "Able");

  // duplicate signup.
  let req = test::TestRequest::post()
    .uri("/api/auth/signup")
    .set_json(json!({
      "email": "alice@example.com",
      "password": "other",
      "firstName": "A",
      "lastName": "B",
    }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let mr: MessageReply = test::read_body_json(resp).await;
  assert_eq!(mr.message, "Email already exists");

  // bad password.
  let req = test::TestRequest::post()
    .uri("/api/auth/signin")
    .set_json(json!({ "email": "alice@example.com", "password": "nope" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  // no token.
  let req = test::TestRequest::get().uri("/api/auth/profile").to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

  let req = test::TestRequest::get()
    .uri("/api/auth/profile")
    .insert_header(bearer(&alice))
    .to_request();
  let profile: UserProfile = test::call_and_read_body_json(&app, req).await;
  assert_eq!(profile.first_name, "Alice");

  // the email param has to agree with the token.
  let req = test::TestRequest::get()
    .uri("/api/auth/profile?email=bob@example.com")
    .insert_header(bearer(&alice))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);

  let req = test::TestRequest::put()
    .uri("/api/auth/profile")
    .insert_header(bearer(&alice))
    .set_json(json!({ "phone": "555-1234" }))
    .to_request();
  let profile: UserProfile = test::call_and_read_body_json(&app, req).await;
  assert_eq!(profile.phone, Some("555-1234".to_string()));

  let req = test::TestRequest::post()
    .uri("/api/auth/logout")
    .insert_header(bearer(&alice))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let req = test::TestRequest::get()
    .uri("/api/auth/profile")
    .insert_header(bearer(&alice))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_plan_routes() {
  let app = test_app!(test_config("web-plan-test.db"));
  let alice = login!(app, "alice@example.com", "Alice", "Able");
  let bob = login!(app, "bob@example.com", "Bob", "Baker");

  let req = test::TestRequest::post()
    .uri("/api/learning-plan")
    .insert_header(bearer(&alice))
    .set_json(json!({
      "title": "Rust",
      "description": "ownership and borrowing",
      "startDate": "2024-01-01",
      "endDate": "2024-03-01",
      "topics": [{"title": "one"}, {"title": "two"}, {"title": "three"}, {"title": "four"}],
      "shared": true,
    }))
    .to_request();
  let plan: LearningPlan = test::call_and_read_body_json(&app, req).await;
  assert_eq!(plan.user_email, "alice@example.com");

  let req = test::TestRequest::put()
    .uri("/api/learning-plan/progress/topic")
    .insert_header(bearer(&alice))
    .set_json(json!({ "planId": plan.id, "topicIndex": 0, "completed": true }))
    .to_request();
  let p: LearningPlan = test::call_and_read_body_json(&app, req).await;
  assert_eq!(p.progress, 25);

  // bad dates.
  let req = test::TestRequest::post()
    .uri("/api/learning-plan")
    .insert_header(bearer(&alice))
    .set_json(json!({
      "title": "Backwards",
      "startDate": "2024-05-01",
      "endDate": "2024-01-01",
    }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  // malformed body.
  let req = test::TestRequest::post()
    .uri("/api/learning-plan")
    .insert_header(bearer(&alice))
    .insert_header((header::CONTENT_TYPE, "application/json"))
    .set_payload("{not json")
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let req = test::TestRequest::get()
    .uri("/api/learning-plan/no-such-plan")
    .insert_header(bearer(&alice))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  let req = test::TestRequest::delete()
    .uri(format!("/api/learning-plan/{}", plan.id).as_str())
    .insert_header(bearer(&bob))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);

  // bob enrolls, twice.
  for _ in 0..2 {
    let req = test::TestRequest::post()
      .uri("/api/learning-plan/start")
      .insert_header(bearer(&bob))
      .set_json(json!({ "planId": plan.id }))
      .to_request();
    let copy: LearningPlan = test::call_and_read_body_json(&app, req).await;
    assert_eq!(copy.source_plan_id, Some(plan.id.clone()));
    assert_eq!(copy.progress, 0);
  }

  let req = test::TestRequest::get()
    .uri("/api/learning-plan/shared")
    .insert_header(bearer(&bob))
    .to_request();
  let shared: Vec<LearningPlan> = test::call_and_read_body_json(&app, req).await;
  assert_eq!(shared.len(), 1);
  assert_eq!(shared[0].enrolled_users, vec!["bob@example.com".to_string()]);

  let req = test::TestRequest::get()
    .uri("/api/notifications/user/unread/count")
    .insert_header(bearer(&alice))
    .to_request();
  let uc: UnreadCount = test::call_and_read_body_json(&app, req).await;
  assert_eq!(uc.count, 1);
}

#[actix_web::test]
async fn test_reaction_routes() {
  let app = test_app!(test_config("web-reaction-test.db"));
  let alice = login!(app, "alice@example.com", "Alice", "Able");
  let bob = login!(app, "bob@example.com", "Bob", "Baker");

  let req = test::TestRequest::post()
    .uri("/api/posts")
    .insert_header(bearer(&bob))
    .set_json(json!({ "title": "hello", "content": "world" }))
    .to_request();
  let post: spprotocol::content::Post = test::call_and_read_body_json(&app, req).await;

  let uri = format!("/api/reactions/POST/{}?reactionType=LIKE", post.id);
  let req = test::TestRequest::post()
    .uri(uri.as_str())
    .insert_header(bearer(&alice))
    .to_request();
  let counts: ReactionCounts = test::call_and_read_body_json(&app, req).await;
  assert_eq!(counts.likes, 1);

  let req = test::TestRequest::get()
    .uri("/api/notifications/user")
    .insert_header(bearer(&bob))
    .to_request();
  let ns: Vec<Notification> = test::call_and_read_body_json(&app, req).await;
  assert_eq!(ns.len(), 1);

  let req = test::TestRequest::post()
    .uri(uri.as_str())
    .insert_header(bearer(&alice))
    .to_request();
  let counts: ReactionCounts = test::call_and_read_body_json(&app, req).await;
  assert_eq!(counts.likes, 0);

  let req = test::TestRequest::get()
    .uri(format!("/api/reactions/user/POST/{}", post.id).as_str())
    .insert_header(bearer(&alice))
    .to_request();
  let ur: serde_json::Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(ur, json!({ "reactionType": null }));

  // unknown content type and reaction type are validation errors.
  let req = test::TestRequest::post()
    .uri(format!("/api/reactions/VIDEO/{}?reactionType=LIKE", post.id).as_str())
    .insert_header(bearer(&alice))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let req = test::TestRequest::post()
    .uri(format!("/api/reactions/POST/{}?reactionType=LOVE", post.id).as_str())
    .insert_header(bearer(&alice))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let req = test::TestRequest::put()
    .uri("/api/notifications/user/read-all")
    .insert_header(bearer(&bob))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
}
