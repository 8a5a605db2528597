use anchor_lang::prelude::*;

use crate::{
    constants::*,
    events::*,
    gate::{self, InstructionKind, Principals},
    state::*,
};

/// Add or remove a keeper from the allow-list
#[derive(Accounts)]
pub struct ManageKeepers<'info> {
    /// Admin - checked against config.admin by the gate
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, VaultConfig>,
}

impl ManageKeepers<'_> {
    fn authorize(&self) -> Result<()> {
        gate::authorize(
            InstructionKind::ManageKeepers,
            &self.admin.key(),
            Principals {
                config: Some(&*self.config),
                ..Default::default()
            },
        )
    }
}

pub fn add_handler(ctx: Context<ManageKeepers>, keeper: Pubkey) -> Result<()> {
    ctx.accounts.authorize()?;

    let config = &mut ctx.accounts.config;
    config.add_keeper(keeper)?;
    msg!("Keeper {} added", keeper);

    emit!(KeeperAdded {
        config: config.key(),
        keeper,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

pub fn remove_handler(ctx: Context<ManageKeepers>, keeper: Pubkey) -> Result<()> {
    ctx.accounts.authorize()?;

    let config = &mut ctx.accounts.config;
    config.remove_keeper(&keeper)?;
    msg!("Keeper {} removed", keeper);

    emit!(KeeperRemoved {
        config: config.key(),
        keeper,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
