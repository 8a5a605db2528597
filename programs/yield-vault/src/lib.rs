// Yield Vault - per-owner stablecoin vault on Solana
// Funds sit in a custody ledger owned by the vault PDA and can be routed into
// one external lending protocol at a time.
// Roles: owner (direct moves, margin pool), keeper (lending market), admin (config)

use anchor_lang::prelude::*;

pub mod adapters;
pub mod constants;
pub mod derivation;
pub mod errors;
pub mod events;
pub mod gate;
pub mod instructions;
pub mod state;

use instructions::*;
use state::{LendingMarketConfig, MarginPoolConfig};

declare_id!("5urWt3YZS2aXYPhr7LbkQxTHB9o9FDPevV8N1PEeYkYu");

#[program]
pub mod yield_vault {
    use super::*;

    /// Create the singleton program configuration
    ///
    /// Security considerations:
    /// - Signer becomes admin; `init` makes this a one-time call
    /// - Keeper list bounded by MAX_KEEPERS
    pub fn initialize_config(ctx: Context<InitializeConfig>, keepers: Vec<Pubkey>) -> Result<()> {
        instructions::initialize_config::handler(ctx, keepers)
    }

    /// Add a keeper to the allow-list
    ///
    /// Security considerations:
    /// - Admin-only function
    /// - Rejects duplicates and a full list
    pub fn add_keeper(ctx: Context<ManageKeepers>, keeper: Pubkey) -> Result<()> {
        instructions::manage_keepers::add_handler(ctx, keeper)
    }

    /// Remove a keeper from the allow-list
    ///
    /// Security considerations:
    /// - Admin-only function
    /// - Removal takes effect for the next keeper instruction
    pub fn remove_keeper(ctx: Context<ManageKeepers>, keeper: Pubkey) -> Result<()> {
        instructions::manage_keepers::remove_handler(ctx, keeper)
    }

    /// Set the account addresses of the shared-reserve lending market
    ///
    /// Security considerations:
    /// - Admin-only function
    /// - Every Protocol A account is later checked against these addresses
    pub fn set_protocol_a(ctx: Context<ConfigureProtocol>, market: LendingMarketConfig) -> Result<()> {
        instructions::configure_protocol::set_protocol_a_handler(ctx, market)
    }

    /// Set the account addresses of the margin pool
    ///
    /// Security considerations:
    /// - Admin-only function
    /// - Every Protocol B account is later checked against these addresses
    pub fn set_protocol_b(ctx: Context<ConfigureProtocol>, pool: MarginPoolConfig) -> Result<()> {
        instructions::configure_protocol::set_protocol_b_handler(ctx, pool)
    }

    /// Create the signer's vault and its custody ledger
    ///
    /// Security considerations:
    /// - Vault PDA derived from the signer, so only the owner can create it
    /// - Second call fails with AlreadyInitialized
    /// - Optional collateral account is checked against config and derivation
    pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
        instructions::initialize::handler(ctx)
    }

    /// Open the vault's margin account on the margin pool
    ///
    /// Security considerations:
    /// - Owner-only function
    /// - Program and group checked against config
    /// - At most one margin account per vault
    pub fn open_position_b(ctx: Context<OpenPositionB>) -> Result<()> {
        instructions::open_position_b::handler(ctx)
    }

    /// Move stablecoin from the owner's wallet into the custody ledger
    ///
    /// Security considerations:
    /// - Owner-only function
    /// - Source account checked for mint and owner
    /// - Follows checks-effects-interactions pattern
    /// - Emits event for tracking
    pub fn deposit_direct(ctx: Context<DirectTransfer>, amount: u64) -> Result<()> {
        instructions::direct_transfer::deposit_handler(ctx, amount)
    }

    /// Move stablecoin from the custody ledger back to the owner's wallet
    ///
    /// Security considerations:
    /// - Owner-only function
    /// - Transfer signed by the vault PDA with seeds rebuilt from state
    /// - Rejected while a position is active
    pub fn withdraw_direct(ctx: Context<DirectTransfer>, amount: u64) -> Result<()> {
        instructions::direct_transfer::withdraw_handler(ctx, amount)
    }

    /// Deploy ledger funds into the shared-reserve lending market
    ///
    /// Security considerations:
    /// - Keeper-only function; the owner cannot call it
    /// - All market accounts checked against config
    /// - Bookkeeping uses measured balance changes, not the requested amount
    pub fn deploy_protocol_a(ctx: Context<ProtocolATransfer>, amount: u64) -> Result<()> {
        instructions::protocol_a::deploy_handler(ctx, amount)
    }

    /// Redeem the vault's whole collateral position back into the ledger
    ///
    /// Security considerations:
    /// - Keeper-only function
    /// - Yield or loss flows into the accounted balance
    pub fn redeem_protocol_a(ctx: Context<ProtocolATransfer>) -> Result<()> {
        instructions::protocol_a::redeem_handler(ctx)
    }

    /// Deposit ledger funds into the vault's margin account
    ///
    /// Security considerations:
    /// - Owner-only function
    /// - Margin account must be the one linked by open_position_b
    /// - Bank accounts checked against config
    pub fn deposit_protocol_b(ctx: Context<ProtocolBTransfer>, amount: u64) -> Result<()> {
        instructions::protocol_b::deposit_handler(ctx, amount)
    }

    /// Withdraw the whole margin account balance back into the ledger
    ///
    /// Security considerations:
    /// - Owner-only function
    /// - Remaining accounts are passed to the pool for its health check
    pub fn withdraw_protocol_b<'info>(
        ctx: Context<'_, '_, 'info, 'info, ProtocolBTransfer<'info>>,
    ) -> Result<()> {
        instructions::protocol_b::withdraw_handler(ctx)
    }
}
