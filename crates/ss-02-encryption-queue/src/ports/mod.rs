//! Ports module for the encryption queue

pub mod inbound;
pub mod outbound;

pub use inbound::EncryptionQueueApi;
pub use outbound::CryptoProvider;
