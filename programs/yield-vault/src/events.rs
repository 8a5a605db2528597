use anchor_lang::prelude::*;

use crate::state::AllocatedProtocol;

/// Event emitted when the program configuration is created
#[event]
pub struct ConfigInitialized {
    pub config: Pubkey,
    pub admin: Pubkey,
    pub keepers: Vec<Pubkey>,
    pub timestamp: i64,
}

#[event]
pub struct KeeperAdded {
    pub config: Pubkey,
    pub keeper: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct KeeperRemoved {
    pub config: Pubkey,
    pub keeper: Pubkey,
    pub timestamp: i64,
}

/// Event emitted when a protocol's address set is replaced
#[event]
pub struct ProtocolConfigured {
    pub config: Pubkey,
    pub protocol: AllocatedProtocol,
    pub program: Pubkey,
    pub timestamp: i64,
}

/// Event emitted when a new vault is initialized
#[event]
pub struct VaultInitialized {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub usdc_mint: Pubkey,
    pub custody_ledger: Pubkey,
    pub timestamp: i64,
}

/// Event emitted when a margin account is linked to a vault
#[event]
pub struct PositionOpened {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub margin_account: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct DirectDeposited {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub accounted_balance: u64,
    pub timestamp: i64,
}

#[event]
pub struct DirectWithdrawn {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub accounted_balance: u64,
    pub timestamp: i64,
}

/// Event emitted when ledger funds are moved into an external protocol
#[event]
pub struct ProtocolDeployed {
    pub vault: Pubkey,
    pub authority: Pubkey,
    pub protocol: AllocatedProtocol,
    pub amount: u64,
    pub receipts: u64,
    pub deployed_amount: u64,
    pub accounted_balance: u64,
    pub timestamp: i64,
}

/// Event emitted when an external position is unwound into the ledger
#[event]
pub struct ProtocolRedeemed {
    pub vault: Pubkey,
    pub authority: Pubkey,
    pub protocol: AllocatedProtocol,
    pub redeemed: u64,
    pub accounted_balance: u64,
    pub timestamp: i64,
}
