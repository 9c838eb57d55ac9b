//! Web server for the interactive dashboard
//!
//! Serves the rendered dashboard page plus the raw results snapshot for
//! anyone who wants the underlying numbers.

use crate::render::dashboard_html;
use crate::results::ResultsDoc;
use anyhow::Result;
use log::{info, warn};
use tiny_http::{Header, Response, Server};

/// Start the dashboard server and block serving requests.
///
/// `raw_json` is the loaded (gunzipped) snapshot as read from disk;
/// serving it verbatim keeps fields the parsed model does not know about.
pub fn start_server(doc: &ResultsDoc, raw_json: &[u8], port: u16, open_browser: bool) -> Result<()> {
    let html = dashboard_html(doc);
    let json = raw_json.to_vec();

    let addr = format!("0.0.0.0:{}", port);
    let server =
        Server::http(&addr).map_err(|e| anyhow::anyhow!("Failed to start server: {}", e))?;

    let url = format!("http://localhost:{}", port);
    info!("Dashboard running at {}", url);
    info!("Press Ctrl+C to stop");

    if open_browser && webbrowser::open(&url).is_err() {
        warn!("Could not open browser automatically. Please visit: {}", url);
    }

    for request in server.incoming_requests() {
        let response = match request.url() {
            "/" | "/index.html" => Response::from_string(html.clone()).with_header(
                Header::from_bytes("Content-Type", "text/html; charset=utf-8").unwrap(),
            ),
            "/scores.json" => Response::from_data(json.clone())
                .with_header(Header::from_bytes("Content-Type", "application/json").unwrap()),
            _ => Response::from_string("Not found").with_status_code(404),
        };
        let _ = request.respond(response);
    }

    Ok(())
}
