//! Integration tests against a real SQLite catalog.

mod catalog;
mod update_engine;
