pub mod claims;
pub mod guard;
pub mod middleware;
pub mod password;
pub mod token;

pub use claims::SessionClaims;
pub use guard::{authorize_mutation, require_owner, Decision};
pub use middleware::{resolve_session, session_cookie, AuthenticatedUser, SessionMiddleware};
pub use token::TokenCodec;
