//! # Counter Core
//!
//! Core library for the joke counter: a shared count that only advances when
//! independent witnesses agree on its value, rolled up into time-bucketed
//! reports around the clock.
//!
//! This crate provides the foundational components for:
//!
//! - **[`counter`]**: Quorum-gated counter state machine plus the async,
//!   mutex-serialized service wrapper the HTTP layer talks to.
//!
//! - **[`rates`]**: Hourly and daily rate estimates over the current counting
//!   epoch.
//!
//! - **[`reports`]**: Scheduled 3-hour snapshots folded into 6-hour, 12-hour,
//!   and daily rollups, persisted as JSON lines in per-day files.
//!
//! - **[`config`]**: Layered TOML + environment configuration.
//!
//! - **[`metrics`]**: Prometheus metrics collection for monitoring.
//!
//! ## Data Flow
//!
//! ```text
//! Client vote / reset
//!       │
//!       ▼
//! ┌─────────────┐     ┌───────────┐
//! │ JokeCounter │ ──► │ JokeRate  │ ──► Response
//! │  (quorum)   │     │ (derived) │
//! └──────┬──────┘     └───────────┘
//!        │ snapshot + epoch roll (every 3h)
//!        ▼
//! ┌──────────────────┐     ┌────────────────┐
//! │ ReportAggregator │ ──► │   ReportSink   │
//! │ (6h/12h/daily)   │     │ (daily JSONL)  │
//! └──────────────────┘     └────────────────┘
//! ```

pub mod config;
pub mod counter;
pub mod metrics;
pub mod rates;
pub mod reports;
