// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Logging setup and helpers for keeping user input out of log lines.

use tracing_subscriber::EnvFilter;

/// Longest stretch of user query text written to logs
const MAX_LOGGED_QUERY_CHARS: usize = 64;

/// Install the global subscriber. `RUST_LOG` overrides `default_directive`.
pub fn init(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // A subscriber may already be installed (tests, embedding applications)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Shorten query text for logging: "a very long query…(120 chars)"
pub fn truncate_for_log(text: &str) -> String {
    let length = text.chars().count();
    if length <= MAX_LOGGED_QUERY_CHARS {
        return text.to_string();
    }
    let head: String = text.chars().take(MAX_LOGGED_QUERY_CHARS).collect();
    format!("{}…({} chars)", head, length)
}
