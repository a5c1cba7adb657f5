//! Payment callback reconciliation service for the legislative-news portal.
//!
//! Ingests Netopia's asynchronous redirect/webhook, maps the provider's
//! status vocabulary onto the canonical order-state model, keeps an
//! append-only audit trail, composes the cache-busted result-page redirect,
//! and closes the settlement eventual-consistency gap with a bounded
//! order-status polling loop.

pub mod api;
pub mod config;
pub mod database;
pub mod health;
pub mod logging;
pub mod orders;
pub mod poller;
pub mod services;
