use anchor_lang::prelude::*;

use crate::{
    adapters::{initialize_account_ix, invoke_external},
    constants::*,
    derivation,
    errors::*,
    events::*,
    gate::{self, InstructionKind, Principals},
    state::*,
};

/// Open a margin account on the margin pool with the vault PDA as authority
#[derive(Accounts)]
pub struct OpenPositionB<'info> {
    /// Vault owner, also pays for the margin account
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        mut,
        constraint = derivation::verify_vault_address(&vault.key(), &vault.owner, vault.bump)
            @ YieldVaultError::AccountMismatch,
    )]
    pub vault: Account<'info, VaultAccount>,

    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, VaultConfig>,

    /// CHECK: margin pool program, address fixed by config
    #[account(
        executable,
        address = config.protocol_b.program @ YieldVaultError::AccountMismatch,
    )]
    pub margin_program: UncheckedAccount<'info>,

    /// CHECK: margin group, address fixed by config
    #[account(address = config.protocol_b.group @ YieldVaultError::AccountMismatch)]
    pub margin_group: UncheckedAccount<'info>,

    /// Fresh keypair for the new margin account
    #[account(mut)]
    pub margin_account: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<OpenPositionB>) -> Result<()> {
    // CHECKS
    gate::authorize(
        InstructionKind::OpenPositionB,
        &ctx.accounts.owner.key(),
        Principals {
            vault: Some(&*ctx.accounts.vault),
            config: Some(&*ctx.accounts.config),
        },
    )?;
    require!(
        ctx.accounts.config.protocol_b.is_configured(),
        YieldVaultError::ProtocolNotConfigured
    );
    require!(
        ctx.accounts.vault.external_position_handle.is_none(),
        YieldVaultError::PositionAlreadyOpened
    );

    // INTERACTIONS
    let accounts = &ctx.accounts;
    let ix = initialize_account_ix(
        accounts.margin_program.key(),
        accounts.margin_group.key(),
        accounts.margin_account.key(),
        accounts.vault.key(),
        accounts.owner.key(),
        accounts.system_program.key(),
    );

    let owner_key = accounts.vault.owner;
    let bump = [accounts.vault.bump];
    let vault_seeds: &[&[u8]] = &[VAULT_SEED, owner_key.as_ref(), &bump];

    invoke_external(
        &ix,
        &[
            accounts.margin_group.to_account_info(),
            accounts.margin_account.to_account_info(),
            accounts.vault.to_account_info(),
            accounts.owner.to_account_info(),
            accounts.system_program.to_account_info(),
            accounts.margin_program.to_account_info(),
        ],
        &[vault_seeds],
    )?;

    // EFFECTS
    let margin_account = ctx.accounts.margin_account.key();
    let vault = &mut ctx.accounts.vault;
    vault.external_position_handle = Some(margin_account);

    msg!("Margin account {} opened for vault {}", margin_account, vault.key());

    emit!(PositionOpened {
        vault: vault.key(),
        owner: vault.owner,
        margin_account,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
