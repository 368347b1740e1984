// tests/api.rs
//
// Sobe o router completo sobre o serviço de dados em memória e um relógio fixo.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use prospect_crm::{
    common::clock::FixedClock,
    config::{AppState, Settings},
    db::MemoryDataService,
};

struct TestApp {
    base: String,
    client: reqwest::Client,
    clock: Arc<FixedClock>,
    data: Arc<MemoryDataService>,
}

impl TestApp {
    async fn spawn() -> Self {
        let settings = Settings::from_lookup(|key| match key {
            "DATA_BACKEND" => Some("memory".to_string()),
            _ => None,
        })
        .unwrap();

        // 12:00 em São Paulo
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 10, 18, 15, 0, 0).unwrap()));
        let data = Arc::new(MemoryDataService::new());

        let app_state = AppState::build(settings, data.clone(), clock.clone());
        app_state.load().await;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, prospect_crm::router(app_state)).await.unwrap();
        });

        Self {
            base: format!("http://{addr}"),
            client: reqwest::Client::new(),
            clock,
            data,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.client.post(self.url(path)).json(&body).send().await.unwrap()
    }

    async fn create_lead(&self, name: &str) -> Value {
        let response = self
            .post(
                "/api/leads",
                json!({
                    "name": name,
                    "whatsapp": "+55 11 90000-0000",
                    "projectType": "site",
                    "budget": 1200.0,
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        response.json().await.unwrap()
    }
}

#[tokio::test]
async fn health_and_openapi_are_served() {
    let app = TestApp::spawn().await;

    let health = app.get("/api/health").await;
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(health.text().await.unwrap(), "OK");

    let doc: Value = app.get("/api-docs/openapi.json").await.json().await.unwrap();
    assert!(doc["paths"]["/api/stats/daily"].is_object());
    assert!(doc["paths"]["/api/kanban/leads/{id}/status"].is_object());
}

#[tokio::test]
async fn lead_lifecycle_over_http() {
    let app = TestApp::spawn().await;

    let lead = app.create_lead("Padaria do João").await;
    assert_eq!(lead["status"], "not_contacted");
    assert_eq!(lead["lastContact"], "2026-10-18");
    let id = lead["id"].as_str().unwrap().to_string();

    let updated: Value = app
        .client
        .patch(app.url(&format!("/api/leads/{id}")))
        .json(&json!({ "notes": "Ligar segunda", "tags": ["hot"] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["notes"], "Ligar segunda");
    assert_eq!(updated["tags"], json!(["hot"]));
    assert_eq!(updated["name"], "Padaria do João");

    let listed: Vec<Value> = app.get("/api/leads?refresh=true").await.json().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["notes"], "Ligar segunda");

    let deleted = app
        .client
        .delete(app.url(&format!("/api/leads/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let missing = app
        .client
        .delete(app.url(&format!("/api/leads/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_lead_is_rejected_with_translated_details() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/api/leads"))
        .header("Accept-Language", "en-US,en;q=0.9")
        .json(&json!({ "name": "", "whatsapp": "1", "projectType": "site", "budget": -5 }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "validation_failed");
    assert_eq!(body["message"], "One or more fields are invalid.");
    assert!(body["details"]["name"].is_array());
    assert!(body["details"]["budget"].is_array());
    assert!(app.data.rows(prospect_crm::db::Table::Leads).await.is_empty());
}

#[tokio::test]
async fn kanban_moves_cards_and_hides_lost_by_default() {
    let app = TestApp::spawn().await;
    let lead = app.create_lead("Academia Forte").await;
    let id = lead["id"].as_str().unwrap();

    let moved: Value = app
        .client
        .put(app.url(&format!("/api/kanban/leads/{id}/status")))
        .json(&json!({ "status": "negotiating" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(moved["moved"], true);
    assert_eq!(moved["lead"]["status"], "negotiating");

    let board: Vec<Value> = app.get("/api/kanban").await.json().await.unwrap();
    assert_eq!(board.len(), 5);
    let negotiating = board.iter().find(|c| c["status"] == "negotiating").unwrap();
    assert_eq!(negotiating["count"], 1);
    assert_eq!(negotiating["label"], "Em Negociação");

    let lost = app
        .post(&format!("/api/kanban/leads/{id}/lost"), json!({}))
        .await;
    assert_eq!(lost.status(), StatusCode::OK);

    let board: Vec<Value> = app.get("/api/kanban?showLost=true").await.json().await.unwrap();
    assert_eq!(board.len(), 6);
    assert_eq!(board[5]["status"], "lost");
    assert_eq!(board[5]["count"], 1);
}

#[tokio::test]
async fn dashboard_summarises_the_cache() {
    let app = TestApp::spawn().await;
    let first = app.create_lead("Loja A").await;
    app.create_lead("Loja B").await;

    let id = first["id"].as_str().unwrap();
    app.client
        .put(app.url(&format!("/api/kanban/leads/{id}/status")))
        .json(&json!({ "status": "closed" }))
        .send()
        .await
        .unwrap();

    let summary: Value = app.get("/api/dashboard/summary").await.json().await.unwrap();
    assert_eq!(summary["totalLeads"], 2);
    assert_eq!(summary["closedLeads"], 1);
    assert_eq!(summary["activeLeads"], 1);

    let chart: Vec<Value> = app.get("/api/dashboard/status-chart").await.json().await.unwrap();
    let closed = chart.iter().find(|e| e["status"] == "closed").unwrap();
    assert_eq!(closed["percentage"], "50.0%");

    let monthly: Vec<Value> = app.get("/api/dashboard/monthly-chart").await.json().await.unwrap();
    assert_eq!(monthly.len(), 1);
    assert_eq!(monthly[0]["month"], "2026-10");
    assert_eq!(monthly[0]["leads"], 2);
    assert_eq!(monthly[0]["converted"], 1);
}

#[tokio::test]
async fn time_tracking_start_stop_and_history() {
    let app = TestApp::spawn().await;

    let idle_stop = app.post("/api/time-tracking/stop", json!({})).await;
    assert_eq!(idle_stop.status(), StatusCode::CONFLICT);
    let body: Value = idle_stop.json().await.unwrap();
    assert_eq!(body["error"], "no_active_activity");

    let started = app
        .post("/api/time-tracking/start", json!({ "activityType": "prospecting" }))
        .await;
    assert_eq!(started.status(), StatusCode::CREATED);

    let again = app
        .post("/api/time-tracking/start", json!({ "activityType": "meeting" }))
        .await;
    assert_eq!(again.status(), StatusCode::CONFLICT);

    app.clock.advance(Duration::seconds(95));
    let current: Value = app.get("/api/time-tracking/current").await.json().await.unwrap();
    assert_eq!(current["elapsedSeconds"], 95);
    assert_eq!(current["elapsedLabel"], "1m 35s");

    let stopped: Value = app
        .post("/api/time-tracking/stop", json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(stopped["duration"], 95);

    let current: Value = app.get("/api/time-tracking/current").await.json().await.unwrap();
    assert!(current.is_null());

    let history: Vec<Value> = app
        .get("/api/time-tracking/history?dateFilter=today&activity=prospecting")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["activityLabel"], "Prospecção");
    assert_eq!(history[0]["durationLabel"], "1m 35s");

    let only_meetings: Vec<Value> = app
        .get("/api/time-tracking/history?activity=meeting")
        .await
        .json()
        .await
        .unwrap();
    assert!(only_meetings.is_empty());

    let id = history[0]["entry"]["id"].as_str().unwrap();
    let deleted = app
        .client
        .delete(app.url(&format!("/api/time-tracking/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn daily_stats_reflect_leads_and_prospecting_time() {
    let app = TestApp::spawn().await;

    app.create_lead("Cliente 1").await;
    app.create_lead("Cliente 2").await;

    app.post("/api/time-tracking/start", json!({ "activityType": "prospecting" })).await;
    app.clock.advance(Duration::minutes(30));
    app.post("/api/time-tracking/stop", json!({})).await;

    let stats: Value = app.get("/api/stats/daily").await.json().await.unwrap();
    assert_eq!(stats["prospeccoesHoje"], 2);
    assert_eq!(stats["tempoTotalHoje"], 30);
    assert_eq!(stats["tempoFormatado"], "30m");
    assert_eq!(stats["metaDiaria"], 10);
    assert_eq!(stats["progresso"], 20);
    assert_eq!(stats["produtividade"].as_f64(), Some(4.0));
    assert_eq!(stats["metaAtingida"], false);
    assert_eq!(stats["streak"], 0);

    let weekly: Value = app.get("/api/stats/daily?filter=last7days").await.json().await.unwrap();
    assert_eq!(weekly["prospeccoesHoje"], 2);
    assert!(weekly.get("streak").is_none());
}

#[tokio::test]
async fn export_then_import_restores_deleted_leads() {
    let app = TestApp::spawn().await;
    let kept = app.create_lead("Fica").await;
    let removed = app.create_lead("Volta do backup").await;

    let export = app.get("/api/leads/export").await;
    assert_eq!(export.status(), StatusCode::OK);
    assert_eq!(
        export.headers()["content-disposition"],
        "attachment; filename=\"leads-backup-2026-10-18.json\""
    );
    let file = export.bytes().await.unwrap();

    let id = removed["id"].as_str().unwrap();
    app.client
        .delete(app.url(&format!("/api/leads/{id}")))
        .send()
        .await
        .unwrap();

    let report: Value = app
        .client
        .post(app.url("/api/leads/import"))
        .body(file)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(report, json!({ "created": 1, "updated": 0, "skipped": 1, "failed": 0 }));

    let listed: Vec<Value> = app.get("/api/leads").await.json().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().any(|l| l["id"] == removed["id"]));
    assert!(listed.iter().any(|l| l["id"] == kept["id"]));

    let broken = app
        .client
        .post(app.url("/api/leads/import"))
        .body("{ nao é json")
        .send()
        .await
        .unwrap();
    assert_eq!(broken.status(), StatusCode::BAD_REQUEST);
}
