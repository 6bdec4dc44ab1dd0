//! Neural network definitions (Burn modules).

mod q_network;

pub use q_network::{QNetwork, QNetworkConfig};
