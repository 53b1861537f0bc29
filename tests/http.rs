use chrono::{Duration, TimeZone, Utc};
use rocket::http::{ContentType, Status};
use rocket::local::blocking::Client;

use targetview::bootstrap::setup::seed_demo;
use targetview::common::VIEW_TARGET_PERMISSION;
use targetview::config::AppConfig;
use targetview::database::ops::store::TargetStore;
use targetview::database::schema::grant::user_principal;
use targetview::models::target::NewTarget;
use targetview::{AppState, build_rocket};

fn client(store: TargetStore, config: AppConfig) -> Client {
    let state = AppState::new(config, store).expect("valid state");
    Client::tracked(build_rocket(state)).expect("valid rocket instance")
}

fn config() -> AppConfig {
    AppConfig {
        auth_key: Some("test-key".to_string()),
        ..Default::default()
    }
}

fn login(client: &Client, username: &str, password: &str) -> Status {
    client
        .post("/login")
        .header(ContentType::Form)
        .body(format!(
            "username={}&password={}&next=/targets/",
            username, password
        ))
        .dispatch()
        .status()
}

fn get_page(client: &Client, uri: &str) -> (Status, String) {
    let response = client.get(uri).dispatch();
    let status = response.status();
    (status, response.into_string().unwrap_or_default())
}

fn cell(name: &str) -> String {
    format!("<td>{}</td>", name)
}

/// Thirty targets, `T00` oldest through `T29` newest.
fn store_with_thirty() -> TargetStore {
    let store = TargetStore::in_memory().unwrap();
    let base = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    for i in 0..30 {
        store
            .insert_target(
                NewTarget::sidereal(format!("T{:02}", i), i as f64, 0.0)
                    .created(base + Duration::minutes(i)),
            )
            .unwrap();
    }
    store
        .upsert_user("admin", "pw", true, &[], &[])
        .unwrap();
    store
}

#[test]
fn anonymous_requests_redirect_to_login() {
    let client = client(store_with_thirty(), config());
    let response = client.get("/targets/?page=2").dispatch();
    assert_eq!(response.status(), Status::SeeOther);
    let location = response.headers().get_one("Location").unwrap();
    assert!(location.starts_with("/login?next="));

    let response = client.get("/").dispatch();
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(response.headers().get_one("Location"), Some("/targets/"));
}

#[test]
fn login_sets_session_and_logout_clears_it() {
    let client = client(store_with_thirty(), config());
    assert_eq!(login(&client, "admin", "wrong"), Status::Unauthorized);
    assert_eq!(login(&client, "nobody", "pw"), Status::Unauthorized);

    let response = client
        .post("/login")
        .header(ContentType::Form)
        .body("username=admin&password=pw&next=/targets/?page=2")
        .dispatch();
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(response.headers().get_one("Location"), Some("/targets/?page=2"));
    assert!(response.cookies().get("jwt").is_some());

    let (status, _) = get_page(&client, "/targets/");
    assert_eq!(status, Status::Ok);

    client.post("/logout").dispatch();
    assert_eq!(client.get("/targets/").dispatch().status(), Status::SeeOther);
}

#[test]
fn off_site_next_is_ignored() {
    let client = client(store_with_thirty(), config());
    let response = client
        .post("/login")
        .header(ContentType::Form)
        .body("username=admin&password=pw&next=https://evil.example/")
        .dispatch();
    assert_eq!(response.headers().get_one("Location"), Some("/targets/"));
}

#[test]
fn missing_permission_is_forbidden_without_data() {
    let store = store_with_thirty();
    store.upsert_user("guest", "pw", false, &[], &[]).unwrap();
    for id in 1..=30 {
        store.grant(&user_principal("guest"), id).unwrap();
    }
    let client = client(store, config());
    assert_eq!(login(&client, "guest", "pw"), Status::SeeOther);

    let (status, body) = get_page(&client, "/targets/");
    assert_eq!(status, Status::Forbidden);
    assert!(!body.contains("T29"));
}

#[test]
fn pages_hold_twenty_five_newest_first() {
    let client = client(store_with_thirty(), config());
    login(&client, "admin", "pw");

    let (status, first) = get_page(&client, "/targets/");
    assert_eq!(status, Status::Ok);
    assert!(first.contains("30 targets"));
    assert!(first.contains("Page 1 of 2"));
    assert_eq!(first.matches("<tr><td>T").count(), 25);
    let newest = first.find(&cell("T29")).unwrap();
    let older = first.find(&cell("T28")).unwrap();
    assert!(newest < older);
    assert!(first.contains(&cell("T05")));
    assert!(!first.contains(&cell("T04")));

    let (_, second) = get_page(&client, "/targets/?page=2");
    assert!(second.contains("Page 2 of 2"));
    assert_eq!(second.matches("<tr><td>T").count(), 5);
    assert!(second.contains(&cell("T00")));
    assert!(!second.contains(&cell("T05")));
}

#[test]
fn out_of_range_pages_are_clamped() {
    let client = client(store_with_thirty(), config());
    login(&client, "admin", "pw");

    let (_, beyond) = get_page(&client, "/targets/?page=99");
    assert!(beyond.contains("Page 2 of 2"));
    let (_, last) = get_page(&client, "/targets/?page=last");
    assert!(last.contains("Page 2 of 2"));
    let (_, garbage) = get_page(&client, "/targets/?page=abc");
    assert!(garbage.contains("Page 1 of 2"));
    let (_, negative) = get_page(&client, "/targets/?page=-3");
    assert!(negative.contains("Page 1 of 2"));
}

#[test]
fn invalid_filters_are_ignored() {
    let client = client(store_with_thirty(), config());
    login(&client, "admin", "pw");

    let (status, body) = get_page(&client, "/targets/?type=comet&targetlist__name=xyz");
    assert_eq!(status, Status::Ok);
    assert!(body.contains("30 targets"));
}

#[test]
fn filters_narrow_the_listing() {
    let store = TargetStore::in_memory().unwrap();
    seed_demo(&store).unwrap();
    store.upsert_user("admin", "pw", true, &[], &[]).unwrap();
    let client = client(store, config());
    login(&client, "admin", "pw");

    let (_, body) = get_page(&client, "/targets/?name=m4");
    assert!(body.contains("1 targets"));
    assert!(body.contains(&cell("M42")));

    let (_, body) = get_page(&client, "/targets/?type=NON_SIDEREAL");
    assert!(body.contains("2 targets"));
    assert!(body.contains(&cell("C/2020 F3")));
    assert!(body.contains(&cell("1P/Halley")));

    let (_, body) = get_page(&client, "/targets/?targetlist__name=1");
    assert!(body.contains("2 targets"));
    assert!(body.contains(&cell("Vega")));
    assert!(body.contains(&cell("Betelgeuse")));
    assert!(body.contains(r#"<option value="1" selected>Bright stars</option>"#));

    let (_, body) = get_page(&client, "/targets/?key=vmag&value=0.5");
    assert!(body.contains("1 targets"));
    assert!(body.contains(&cell("Betelgeuse")));
}

#[test]
fn group_grants_decide_visibility() {
    let store = TargetStore::in_memory().unwrap();
    seed_demo(&store).unwrap();
    let private = store
        .insert_target(NewTarget::sidereal("Private", 1.0, 1.0))
        .unwrap();
    store
        .upsert_user("olga", "pw", false, &[VIEW_TARGET_PERMISSION], &["observers"])
        .unwrap();
    store
        .upsert_user("pat", "pw", false, &[VIEW_TARGET_PERMISSION], &[])
        .unwrap();
    store.grant(&user_principal("pat"), private).unwrap();
    let client = client(store, config());

    login(&client, "olga", "pw");
    let (_, body) = get_page(&client, "/targets/");
    assert!(body.contains("8 targets"));
    assert!(!body.contains(&cell("Private")));

    login(&client, "pat", "pw");
    let (_, body) = get_page(&client, "/targets/");
    assert!(body.contains("1 targets"));
    assert!(body.contains(&cell("Private")));
}

#[test]
fn empty_store_renders_first_page() {
    let store = TargetStore::in_memory().unwrap();
    store.upsert_user("admin", "pw", true, &[], &[]).unwrap();
    let client = client(store, config());
    login(&client, "admin", "pw");

    let (status, body) = get_page(&client, "/targets/?page=7");
    assert_eq!(status, Status::Ok);
    assert!(body.contains("No targets yet."));
    assert!(body.contains("Page 1 of 1"));
    assert_eq!(body.matches("data-root-id=").count(), 1);
}

#[test]
fn configured_dashboard_app_is_embedded() {
    let config = AppConfig {
        dashboard_app: "AutoMpg".to_string(),
        ..config()
    };
    let client = client(store_with_thirty(), config);
    login(&client, "admin", "pw");

    let (_, body) = get_page(&client, "/targets/");
    assert_eq!(body.matches("data-root-id=").count(), 2);
    assert!(body.contains("window.TargetView.embed"));
    let divs = body.find("data-root-id=").unwrap();
    let script = body.find("<script type=\"application/json\"").unwrap();
    assert!(divs < script);
}

#[test]
fn unknown_dashboard_app_is_rejected_at_start_up() {
    let config = AppConfig {
        dashboard_app: "Dash".to_string(),
        ..config()
    };
    assert!(AppState::new(config, TargetStore::in_memory().unwrap()).is_err());
}

#[test]
fn unknown_grid_column_is_rejected_at_start_up() {
    let config = AppConfig {
        targetlist_columns: "name:text,raa:numeric".to_string(),
        ..config()
    };
    assert!(AppState::new(config, TargetStore::in_memory().unwrap()).is_err());
}

#[test]
fn extra_grid_columns_render() {
    let store = TargetStore::in_memory().unwrap();
    seed_demo(&store).unwrap();
    store.upsert_user("admin", "pw", true, &[], &[]).unwrap();
    let config = AppConfig {
        targetlist_columns: "name:text,extra.vmag:numeric".to_string(),
        ..config()
    };
    let client = client(store, config);
    login(&client, "admin", "pw");

    let (status, body) = get_page(&client, "/targets/");
    assert_eq!(status, Status::Ok);
    assert!(body.contains("extra.vmag"));
}

#[test]
fn pagination_links_carry_only_filter_parameters() {
    let client = client(store_with_thirty(), config());
    login(&client, "admin", "pw");

    let (status, body) = get_page(&client, "/targets/?name=T&foo=bar&page=1");
    assert_eq!(status, Status::Ok);
    assert!(body.contains(r#"href="?name=T&page=2""#));
    assert!(!body.contains("foo=bar"));
}
