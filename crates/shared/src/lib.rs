//! Wire and domain types shared by the inbox client and the capture feed server.

pub mod domain;
pub mod error;
pub mod protocol;
