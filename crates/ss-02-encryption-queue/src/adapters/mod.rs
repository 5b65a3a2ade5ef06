//! Adapters for the encryption queue's outbound ports

pub mod sealed_box;

pub use sealed_box::SealedBoxProvider;
