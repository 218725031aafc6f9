pub mod redpanda;

pub use redpanda::{OrderStatusChangedIntegrationEvent, RedpandaClient, RedpandaConfig};
