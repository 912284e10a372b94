//! Bearer-token verification.
//!
//! Tokens are issued by the account service; this server only checks them.

pub mod jwt;
