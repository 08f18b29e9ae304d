//! Domain services

mod pushover_client;

pub use pushover_client::{
    NotificationClient, ProviderError, PushoverClient, SendReceipt, PUSHOVER_API_URL,
};
