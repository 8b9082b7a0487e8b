//! Linkshelf RPC Server: JSON messages over stdin/stdout for a browser front-end.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"folder.rename", "params":{"tag":"work","name":"job"}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//!
//! Logs go to stderr so they never interleave with responses.

use std::io::{self, Write};

use log::{error, info};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};

use linkshelf::app::App;
use linkshelf::platform;
use linkshelf::rpc_handler::handle_method;

fn reply(value: &Value) {
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", value);
    let _ = stdout.flush();
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let db_path = std::env::var("LINKSHELF_DB")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| platform::default_cache_db_path());
    let mut app = match App::new(&db_path.to_string_lossy(), None) {
        Ok(app) => app,
        Err(e) => {
            error!("failed to initialize: {}", e);
            reply(&json!({"event":"error","error":e.to_string()}));
            std::process::exit(1);
        }
    };

    let url = std::env::var("LINKSHELF_URL").ok();
    let token = std::env::var("LINKSHELF_TOKEN").ok();
    let config = match app.connection_config(url.as_deref(), token.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            reply(&json!({"event":"error","error":e.to_string()}));
            std::process::exit(1);
        }
    };
    let mut manager = app.bookmark_manager(&config);

    info!("serving {}", config.base_url);
    reply(&json!({"event":"ready","version":env!("CARGO_PKG_VERSION")}));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                reply(&json!({"id":null,"error":format!("parse error: {}", e)}));
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);
        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        let response = match handle_method(&mut manager, &mut app.settings_engine, method, &params)
            .await
        {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => json!({"id": id, "error": err}),
        };
        reply(&response);
    }
    info!("stdin closed, shutting down");
}
