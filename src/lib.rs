//! Server-driven data tables: a query layer that applies search, sort and
//! pagination from URL parameters, and a table view that keeps that state in the URL.

pub mod api;
pub mod cli;
pub mod collate;
pub mod config;
pub mod db;
pub mod error;
pub mod inertia;
pub mod logging;
pub mod query;
pub mod server;
pub mod templates;
pub mod table;
pub mod users;
