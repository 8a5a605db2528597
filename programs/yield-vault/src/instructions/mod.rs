pub mod configure_protocol;
pub mod direct_transfer;
pub mod initialize;
pub mod initialize_config;
pub mod manage_keepers;
pub mod open_position_b;
pub mod protocol_a;
pub mod protocol_b;
pub mod settlement;

pub use configure_protocol::*;
pub use direct_transfer::*;
pub use initialize::*;
pub use initialize_config::*;
pub use manage_keepers::*;
pub use open_position_b::*;
pub use protocol_a::*;
pub use protocol_b::*;
