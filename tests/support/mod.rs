//! Shared utilities for integration tests: a scripted stand-in for yt-dlp and
//! a reply sink that records everything it is handed.

#![allow(dead_code)]

#[cfg(unix)]
pub mod fake_fetcher;
pub mod recording_sink;
