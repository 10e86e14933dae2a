//! Library exports for the storefront server
//!
//! The binary only wires configuration and the listener; everything else
//! lives here so the integration tests can build the router directly.

pub mod admin;
pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod facets;
pub mod filter;
pub mod handler;
pub mod memory;
pub mod middleware;
pub mod model;
pub mod prefs;
pub mod remote;
pub mod render;
pub mod route;
pub mod supabase;
pub mod tracking;
pub mod view;
pub mod whatsapp;
