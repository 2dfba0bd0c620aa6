/// Domain models for Chainstack
///
/// # Models
///
/// - `user`: User accounts, their public identity and registration input
/// - `token`: Opaque bearer access tokens with expiry and scope
/// - `resource`: Per-user resources guarded by quota
///
/// Persistence lives behind the traits in [`crate::store`]; these types carry
/// no database handles.

pub mod resource;
pub mod token;
pub mod user;

pub use resource::Resource;
pub use token::AccessToken;
pub use user::{CreateUser, NewUser, User, UserId, UserIdentity};
