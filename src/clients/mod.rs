//! Client modules for external API interactions

pub mod ns1_client;

pub use ns1_client::{Ns1Client, UsersApi};
