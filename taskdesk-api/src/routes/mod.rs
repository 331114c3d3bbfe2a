/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `users`: Signup, login, token refresh, withdrawal
/// - `todos`: Owner-scoped task endpoints

pub mod health;
pub mod todos;
pub mod users;
