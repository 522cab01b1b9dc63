//! RepoTrack server library.
//!
//! Core functionality for the repossession tracking server: database
//! operations, tenant partitioning, authentication and API services.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
