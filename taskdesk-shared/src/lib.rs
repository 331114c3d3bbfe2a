//! # TaskDesk Shared Library
//!
//! This crate contains the domain types, storage backends, and business logic
//! behind the TaskDesk API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `store`: Credential and task store traits with PostgreSQL and in-memory backends
//! - `service`: Account and task services (signup/login/withdraw, task CRUD)
//! - `auth`: Password hashing and JWT utilities
//! - `db`: Connection pool and migrations
//! - `error`: Store and service error types

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
