use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::{self, AssociatedToken, Create},
    token::{Mint, Token, TokenAccount},
};

use crate::{constants::*, derivation, errors::*, events::*, state::*};

/// Initialize the vault and custody ledger of the signing owner
#[derive(Accounts)]
pub struct Initialize<'info> {
    /// Vault owner
    /// Security: Must be signer; the vault address is derived from this key
    #[account(mut)]
    pub owner: Signer<'info>,

    /// Stablecoin mint the vault will custody
    pub usdc_mint: Account<'info, Mint>,

    /// Vault PDA
    /// Security: `init_if_needed` so a second call reaches the handler and
    /// fails with AlreadyInitialized instead of a system program error
    #[account(
        init_if_needed,
        payer = owner,
        space = VAULT_ACCOUNT_SIZE,
        seeds = [VAULT_SEED, owner.key().as_ref()],
        bump
    )]
    pub vault: Account<'info, VaultAccount>,

    /// Custody ledger: associated token account owned by the vault PDA
    #[account(
        init_if_needed,
        payer = owner,
        associated_token::mint = usdc_mint,
        associated_token::authority = vault,
    )]
    pub custody_ledger: Account<'info, TokenAccount>,

    /// Program configuration, required when a collateral mint is supplied
    pub config: Option<Account<'info, VaultConfig>>,

    /// Collateral mint of the shared-reserve market
    pub protocol_collateral_mint: Option<Account<'info, Mint>>,

    /// CHECK: address checked against the derived collateral account, then
    /// created through the associated token program
    #[account(mut)]
    pub protocol_collateral_vault: Option<UncheckedAccount<'info>>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

impl<'info> Initialize<'info> {
    /// Create the vault's collateral receipt account for the configured
    /// shared-reserve market
    fn create_collateral_vault(
        &self,
        collateral_mint: &Account<'info, Mint>,
        collateral_vault: &UncheckedAccount<'info>,
    ) -> Result<()> {
        let config = self
            .config
            .as_ref()
            .ok_or(error!(YieldVaultError::ProtocolNotConfigured))?;
        require_keys_eq!(
            config.key(),
            derivation::find_config_address().0,
            YieldVaultError::AccountMismatch
        );
        require!(
            config.protocol_a.is_configured(),
            YieldVaultError::ProtocolNotConfigured
        );
        require_keys_eq!(
            collateral_mint.key(),
            config.protocol_a.collateral_mint,
            YieldVaultError::AccountMismatch
        );
        require_keys_eq!(
            collateral_vault.key(),
            derivation::collateral_vault_address(&self.vault.key(), &collateral_mint.key()),
            YieldVaultError::AccountMismatch
        );

        associated_token::create_idempotent(CpiContext::new(
            self.associated_token_program.to_account_info(),
            Create {
                payer: self.owner.to_account_info(),
                associated_token: collateral_vault.to_account_info(),
                authority: self.vault.to_account_info(),
                mint: collateral_mint.to_account_info(),
                system_program: self.system_program.to_account_info(),
                token_program: self.token_program.to_account_info(),
            },
        ))
    }
}

pub fn handler(ctx: Context<Initialize>) -> Result<()> {
    // CHECKS + EFFECTS: a second initialize would reset live bookkeeping
    let owner = ctx.accounts.owner.key();
    let usdc_mint = ctx.accounts.usdc_mint.key();
    let ledger_balance = ctx.accounts.custody_ledger.amount;
    ctx.accounts
        .vault
        .initialize(owner, ctx.bumps.vault, usdc_mint, ledger_balance)?;

    // INTERACTIONS: optional collateral account for Protocol A
    match (
        &ctx.accounts.protocol_collateral_mint,
        &ctx.accounts.protocol_collateral_vault,
    ) {
        (Some(mint), Some(collateral_vault)) => {
            ctx.accounts.create_collateral_vault(mint, collateral_vault)?;
        }
        (None, None) => {}
        _ => return err!(YieldVaultError::AccountMismatch),
    }

    let vault = &ctx.accounts.vault;
    msg!("Vault initialized for owner: {}", vault.owner);

    emit!(VaultInitialized {
        vault: vault.key(),
        owner: vault.owner,
        usdc_mint: vault.usdc_mint,
        custody_ledger: ctx.accounts.custody_ledger.key(),
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
