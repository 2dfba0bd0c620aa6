/// API route handlers
///
/// - `health`: Health check endpoint
/// - `token`: Access token issuance
/// - `resources`: Per-user resource management
/// - `users`: User administration

pub mod health;
pub mod resources;
pub mod token;
pub mod users;
