use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Create the program-wide configuration; the signer becomes admin
#[derive(Accounts)]
pub struct InitializeConfig<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    /// Singleton configuration PDA
    /// Security: `init` fails if it already exists, so admin is set once
    #[account(
        init,
        payer = admin,
        space = VAULT_CONFIG_SIZE,
        seeds = [CONFIG_SEED],
        bump
    )]
    pub config: Account<'info, VaultConfig>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<InitializeConfig>, keepers: Vec<Pubkey>) -> Result<()> {
    // CHECKS
    require!(keepers.len() <= MAX_KEEPERS, YieldVaultError::KeeperListFull);

    // EFFECTS
    let config = &mut ctx.accounts.config;
    config.admin = ctx.accounts.admin.key();
    config.keepers = Vec::with_capacity(keepers.len());
    for keeper in keepers {
        config.add_keeper(keeper)?;
    }
    config.protocol_a = LendingMarketConfig::default();
    config.protocol_b = MarginPoolConfig::default();
    config.bump = ctx.bumps.config;
    config._reserved = [0; 64];

    msg!(
        "Config initialized by {} with {} keeper(s)",
        config.admin,
        config.keepers.len()
    );

    emit!(ConfigInitialized {
        config: config.key(),
        admin: config.admin,
        keepers: config.keepers.clone(),
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
