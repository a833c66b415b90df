//! # Caviar
//!
//! Admin and reader tooling for a network of media brands (Sauce Caviar,
//! Trap Glow, Sauce Wire, Trap Frequency) that share one admin API.
//!
//! ## Architecture
//!
//! ```text
//! Fetcher → Parser → FeedTester        (RSS source checks)
//! ApiClient → MagazineEditor            (issue and page editing)
//! ApiClient → MagazineReader → Store    (terminal reader, saved positions)
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! # Check every enabled RSS source and record the results
//! caviar feeds test --report
//!
//! # Trigger an AI pipeline run for one brand
//! caviar pipeline run --brand trapglow --engine gemini --source both
//!
//! # Read an issue in the terminal
//! caviar read <issue-id>
//! ```

/// Application context and error handling.
///
/// [`AppContext`](app::AppContext) wires the store, API client, fetcher and
/// feed tester together from a [`Config`](config::Config).
pub mod app;

/// Admin REST client.
///
/// - [`ApiClient`](api::ApiClient): every admin endpoint over reqwest
/// - [`MagazineApi`](api::MagazineApi): issue and page operations, mockable
pub mod api;

/// Command-line interface using clap.
pub mod cli;

/// Configuration from `~/.config/caviar/config.toml`: API endpoint, feed
/// limits, poll interval, swipe thresholds, colors and keybindings.
pub mod config;

/// Core domain models: brands, RSS feeds, articles, magazine issues and
/// pages, submissions, pipeline runs and notifications.
pub mod domain;

/// Magazine editing: page CRUD, reordering, template-checked forms.
pub mod editor;

/// Feed fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): async trait for fetching feed bodies
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
/// - [`FeedTester`](fetcher::parallel::FeedTester): concurrent feed tests bounded by a semaphore
pub mod fetcher;

/// Regex extraction of candidate entries from RSS and Atom documents.
pub mod parser;

/// Notification watcher.
pub mod poller;

/// Magazine reader state: page navigation, cover reveal, fullscreen,
/// swipe gestures and saved reading positions.
pub mod reader;

/// SQLite persistence for local key/value state.
///
/// - [`Store`](store::Store): trait defining storage operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;

/// Terminal magazine reader built with ratatui.
pub mod tui;
