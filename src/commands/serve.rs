//! Web front end: a date-picker page, the fetch endpoint and a health probe.
//!
//! The handlers are one-way consumers of the collector. Errors are rendered
//! as `{"error": <message>}` with status 200, which the page's script shows
//! in the error banner; nothing here is fatal to the server.

use crate::args::ServeArgs;
use crate::commands::Out;
use crate::model::QueryWindow;
use crate::{Collector, Config, Result};
use anyhow::Context;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Json};
use axum::routing::{get, post};
use axum::{Form, Router};
use chrono::{Days, Local};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// How many days back the date dropdown reaches.
const DATE_OPTION_DAYS: u64 = 30;

struct AppState {
    config: Config,
}

/// Runs the web front end until the process is stopped.
pub async fn serve(config: Config, args: &ServeArgs) -> Result<Out<()>> {
    let port = args.port().unwrap_or(config.port());
    let state = Arc::new(AppState { config });

    let app = router(state);
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind web front end to {addr}"))?;
    info!("Web front end listening on {addr}");

    axum::serve(listener, app).await.context("Server exited")?;
    Ok("Server stopped".into())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/fetch-data", post(fetch_data))
        .route("/health", get(health))
        .with_state(state)
}

async fn index() -> Html<String> {
    info!("Rendering index page");
    Html(render_index(Local::now().date_naive()))
}

#[derive(Debug, Deserialize)]
struct FetchForm {
    date: Option<String>,
}

async fn fetch_data(
    State(state): State<Arc<AppState>>,
    Form(form): Form<FetchForm>,
) -> impl IntoResponse {
    let Some(date) = form.date.filter(|d| !d.trim().is_empty()) else {
        warn!("No date provided in request");
        return Json(json!({"error": "Date is required"})).into_response();
    };
    let window = match date.parse::<QueryWindow>() {
        Ok(window) => window,
        Err(e) => return Json(json!({"error": e.to_string()})).into_response(),
    };

    let collector = Collector::new(state.config.clone());
    match collector.fetch_and_group(&window).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => Json(json!({"error": e.to_string()})).into_response(),
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "healthy"}))
}

/// Fills the date dropdown with `today` and the preceding 29 days.
fn render_index(today: chrono::NaiveDate) -> String {
    let mut options = String::new();
    for i in 0..DATE_OPTION_DAYS {
        if let Some(date) = today.checked_sub_days(Days::new(i)) {
            let value = date.format(crate::model::DATE_FORMAT);
            options.push_str(&format!("<option value=\"{value}\">{value}</option>\n"));
        }
    }
    INDEX_TEMPLATE.replace("{{date_options}}", &options)
}

const INDEX_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Daily Collection Report</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
        body { font-family: Arial, sans-serif; max-width: 1200px; margin: 0 auto; padding: 20px; background-color: #f5f5f5; }
        .container { background-color: white; border-radius: 8px; padding: 20px; box-shadow: 0 0 10px rgba(0,0,0,0.1); }
        h1 { color: #2c3e50; text-align: center; }
        .form-group { margin-bottom: 20px; }
        label { display: block; margin-bottom: 5px; font-weight: bold; }
        select { width: 100%; padding: 10px; border: 1px solid #ddd; border-radius: 4px; font-size: 16px; }
        button { background-color: #3498db; color: white; border: none; padding: 10px 20px; border-radius: 4px; cursor: pointer; font-size: 16px; }
        button:hover { background-color: #2980b9; }
        table { width: 100%; border-collapse: collapse; margin-top: 20px; }
        th, td { text-align: left; padding: 12px; border-bottom: 1px solid #ddd; }
        th { background-color: #f2f2f2; }
        tr:hover { background-color: #f5f5f5; }
        .loading { text-align: center; padding: 20px; display: none; }
        .error { color: red; padding: 10px; background-color: #ffebee; border-radius: 4px; margin-top: 10px; display: none; }
        .results-container { margin-top: 30px; }
        .owner-cell { max-height: 200px; overflow-y: auto; }
    </style>
</head>
<body>
    <div class="container">
        <h1>Daily Collection Report</h1>
        <div class="form-group">
            <label for="date-select">Select Date:</label>
            <select id="date-select">
                <option value="">-- Select a date --</option>
                {{date_options}}
            </select>
        </div>
        <button id="fetch-btn">Fetch Report</button>
        <div id="loading" class="loading">Loading data... This may take a few moments.</div>
        <div id="error" class="error"></div>
        <div id="results" class="results-container"></div>
    </div>

    <script>
        document.getElementById('fetch-btn').addEventListener('click', function() {
            const selectedDate = document.getElementById('date-select').value;
            if (!selectedDate) {
                showError('Please select a date');
                return;
            }

            document.getElementById('loading').style.display = 'block';
            document.getElementById('error').style.display = 'none';
            document.getElementById('results').innerHTML = '';

            fetch('/fetch-data', {
                method: 'POST',
                headers: { 'Content-Type': 'application/x-www-form-urlencoded' },
                body: new URLSearchParams({ date: selectedDate })
            })
            .then(response => {
                if (!response.ok) {
                    throw new Error('Network response was not ok: ' + response.status);
                }
                return response.json();
            })
            .then(data => {
                document.getElementById('loading').style.display = 'none';
                if (data.error) {
                    showError(data.error);
                    return;
                }
                displayResults(data, selectedDate);
            })
            .catch(error => {
                document.getElementById('loading').style.display = 'none';
                showError('An error occurred: ' + error.message);
            });
        });

        function showError(message) {
            const errorDiv = document.getElementById('error');
            errorDiv.textContent = message;
            errorDiv.style.display = 'block';
        }

        function displayResults(data, date) {
            const resultsDiv = document.getElementById('results');
            let html = `<h2>Collection Report for ${date}</h2>`;

            if (Object.keys(data).length === 0) {
                html += '<p>No data found for this date.</p>';
                resultsDiv.innerHTML = html;
                return;
            }

            html += `
                <table>
                    <thead>
                        <tr>
                            <th>Secretariat Ward</th>
                            <th>Number of Bills</th>
                            <th>Total Amount</th>
                            <th>Owner Details</th>
                        </tr>
                    </thead>
                    <tbody>
            `;

            for (const ward in data) {
                const details = data[ward];
                html += `
                    <tr>
                        <td>${ward || 'Unknown'}</td>
                        <td>${details.count}</td>
                        <td>&#8377;${details.totalAmount.toFixed(2)}</td>
                        <td class="owner-cell">${details.owners.join('<br>')}</td>
                    </tr>
                `;
            }

            html += `
                    </tbody>
                </table>
            `;

            resultsDiv.innerHTML = html;
        }
    </script>
</body>
</html>
"#;
