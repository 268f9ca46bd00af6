
use serde_json::{json, Value};
use test_startup::*;

#[actix_rt::test]
#[ignore = "requires a running Postgres instance"]
async fn non_admins_are_forbidden() {
    let app = spawn_app().await;
    let (_, token) = app.create_user("viewer@example.com", "user").await;

    let res = reqwest::Client::new()
        .get(app.url("/admin/movies"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 403);
}

#[actix_rt::test]
#[ignore = "requires a running Postgres instance"]
async fn admin_manages_genres_and_movies() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, token) = app.create_user("admin@example.com", "admin").await;

    let res = client
        .post(app.url("/admin/genres"))
        .bearer_auth(&token)
        .json(&json!({ "name_english": "Drama", "name_arabic": "دراما" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 201);
    let genre: Value = res.json().await.unwrap();
    let genre_id = genre["data"]["id"].as_str().unwrap().to_string();

    let movie = |status: &str, title: &str| {
        json!({
            "title_english": title,
            "title_arabic": "فيلم",
            "plot_english": "plot",
            "plot_arabic": "حبكة",
            "year": 2020,
            "genres": [genre_id],
            "status": status,
            "videos": [
                { "title": "Trailer", "url": "https://cdn.example.com/t.mp4", "is_trailer": true },
                { "title": "Full", "url": "https://cdn.example.com/f.mp4" }
            ]
        })
    };

    let res = client
        .post(app.url("/admin/movies"))
        .bearer_auth(&token)
        .json(&movie("published", "Visible"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 201);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["data"]["genres"][0]["name_english"], "Drama");
    let visible_id = created["data"]["id"].as_str().unwrap().to_string();

    let res = client
        .post(app.url("/admin/movies"))
        .bearer_auth(&token)
        .json(&movie("draft", "Hidden"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 201);

    let public: Value = client
        .get(app.url(&format!("/movies?genre={}", genre_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(public["total"], 1);
    assert_eq!(public["data"][0]["videos"].as_array().unwrap().len(), 1);

    let admin: Value = client
        .get(app.url("/admin/movies?status=draft"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(admin["total"], 1);
    assert_eq!(admin["data"][0]["title_english"], "Hidden");

    let res = client
        .put(app.url(&format!("/admin/movies/{}", visible_id)))
        .bearer_auth(&token)
        .json(&movie("published", "Renamed"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["data"]["title_english"], "Renamed");

    let res = client
        .delete(app.url(&format!("/admin/movies/{}", visible_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let res = client
        .get(app.url(&format!("/movies/{}", visible_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);

    let genres: Value = client
        .get(app.url("/genres"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(genres["data"][0]["name_english"], "Drama");
}

#[actix_rt::test]
#[ignore = "requires a running Postgres instance"]
async fn unknown_genres_are_rejected() {
    let app = spawn_app().await;
    let (_, token) = app.create_user("admin@example.com", "admin").await;

    let res = reqwest::Client::new()
        .post(app.url("/admin/movies"))
        .bearer_auth(token)
        .json(&json!({
            "title_english": "Orphan",
            "title_arabic": "يتيم",
            "plot_english": "plot",
            "plot_arabic": "حبكة",
            "year": 2020,
            "genres": [uuid::Uuid::new_v4()]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
}
