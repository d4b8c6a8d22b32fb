//! Account session handling: an explicit session store plus the REST client
//! that fills it on login and signup.

pub mod client;
pub mod session;

pub use client::{AuthClient, SignupRequest};
pub use session::{Session, SessionStore, User};
