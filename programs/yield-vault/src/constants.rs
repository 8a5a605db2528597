// Constants for the Yield Vault program

/// Seed for the per-owner vault PDA (`["vault", owner]`)
pub const VAULT_SEED: &[u8] = b"vault";

/// Seed for the program-wide configuration PDA
pub const CONFIG_SEED: &[u8] = b"config";

/// Maximum number of keepers in the allow-list
pub const MAX_KEEPERS: usize = 5;

/// Space for VaultAccount (8 discriminator + 32 owner + 1 bump + 32 usdc_mint +
/// 33 external_position_handle + 1 allocated_protocol + 8 accounted_balance +
/// 8 deployed_amount + 8 position_shares + 1 is_initialized + 64 padding)
pub const VAULT_ACCOUNT_SIZE: usize = 8 + 32 + 1 + 32 + 33 + 1 + 8 + 8 + 8 + 1 + 64;

/// Space for VaultConfig (8 discriminator + 32 admin + 4 vec len +
/// MAX_KEEPERS * 32 keepers + 6 * 32 protocol_a + 5 * 32 protocol_b + 1 bump +
/// 64 padding)
pub const VAULT_CONFIG_SIZE: usize =
    8 + 32 + 4 + (MAX_KEEPERS * 32) + (6 * 32) + (5 * 32) + 1 + 64;

/// Anchor instruction names on the shared-reserve lending market
pub const DEPOSIT_RESERVE_LIQUIDITY: &str = "deposit_reserve_liquidity";
pub const REDEEM_RESERVE_COLLATERAL: &str = "redeem_reserve_collateral";

/// Anchor instruction names on the margin pool
pub const MARGIN_ACCOUNT_INITIALIZE: &str = "marginfi_account_initialize";
pub const MARGIN_ACCOUNT_DEPOSIT: &str = "lending_account_deposit";
pub const MARGIN_ACCOUNT_WITHDRAW: &str = "lending_account_withdraw";
