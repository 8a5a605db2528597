use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};

use crate::{
    constants::*,
    derivation,
    errors::*,
    events::*,
    gate::{self, InstructionKind, Principals},
    state::*,
};

/// Move stablecoin between the owner's wallet and the custody ledger
#[derive(Accounts)]
pub struct DirectTransfer<'info> {
    /// Vault owner - checked against vault.owner by the gate
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        mut,
        constraint = derivation::verify_vault_address(&vault.key(), &vault.owner, vault.bump)
            @ YieldVaultError::AccountMismatch,
    )]
    pub vault: Account<'info, VaultAccount>,

    #[account(address = vault.usdc_mint @ YieldVaultError::AccountMismatch)]
    pub usdc_mint: Account<'info, Mint>,

    /// Custody ledger
    /// Security: address recomputed from the vault and mint
    #[account(
        mut,
        constraint = custody_ledger.key()
            == derivation::custody_ledger_address(&vault.key(), &usdc_mint.key())
            @ YieldVaultError::AccountMismatch,
    )]
    pub custody_ledger: Account<'info, TokenAccount>,

    /// Owner's stablecoin account
    #[account(
        mut,
        constraint = owner_token_account.mint == usdc_mint.key() @ YieldVaultError::AccountMismatch,
        constraint = owner_token_account.owner == owner.key() @ YieldVaultError::AccountMismatch,
    )]
    pub owner_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

impl DirectTransfer<'_> {
    fn authorize(&self, kind: InstructionKind) -> Result<()> {
        gate::authorize(
            kind,
            &self.owner.key(),
            Principals {
                vault: Some(&*self.vault),
                ..Default::default()
            },
        )
    }
}

pub fn deposit_handler(ctx: Context<DirectTransfer>, amount: u64) -> Result<()> {
    // CHECKS
    ctx.accounts.authorize(InstructionKind::DepositDirect)?;
    require!(amount > 0, YieldVaultError::ZeroAmount);
    require!(
        ctx.accounts.owner_token_account.amount >= amount,
        YieldVaultError::InsufficientFunds
    );

    // EFFECTS
    let vault = &mut ctx.accounts.vault;
    vault.absorb_surplus(ctx.accounts.custody_ledger.amount)?;
    vault.record_direct_deposit(amount)?;

    // INTERACTIONS
    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.owner_token_account.to_account_info(),
                to: ctx.accounts.custody_ledger.to_account_info(),
                authority: ctx.accounts.owner.to_account_info(),
            },
        ),
        amount,
    )?;

    ctx.accounts.custody_ledger.reload()?;
    let vault = &ctx.accounts.vault;
    vault.check_invariant(ctx.accounts.custody_ledger.amount)?;

    msg!(
        "Deposited {} into vault {} of owner {}",
        amount,
        vault.key(),
        vault.owner
    );

    emit!(DirectDeposited {
        vault: vault.key(),
        owner: vault.owner,
        amount,
        accounted_balance: vault.accounted_balance,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

pub fn withdraw_handler(ctx: Context<DirectTransfer>, amount: u64) -> Result<()> {
    // CHECKS
    ctx.accounts.authorize(InstructionKind::WithdrawDirect)?;
    require!(amount > 0, YieldVaultError::ZeroAmount);
    require!(
        amount <= ctx.accounts.custody_ledger.amount,
        YieldVaultError::InsufficientLedgerBalance
    );

    // EFFECTS
    let vault = &mut ctx.accounts.vault;
    vault.absorb_surplus(ctx.accounts.custody_ledger.amount)?;
    vault.record_direct_withdraw(amount)?;

    // INTERACTIONS: signed by the vault PDA, seeds rebuilt from stored state
    let owner_key = vault.owner;
    let bump = [vault.bump];
    let vault_seeds: &[&[u8]] = &[VAULT_SEED, owner_key.as_ref(), &bump];
    let signer_seeds = &[vault_seeds];

    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.custody_ledger.to_account_info(),
                to: ctx.accounts.owner_token_account.to_account_info(),
                authority: ctx.accounts.vault.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
    )?;

    ctx.accounts.custody_ledger.reload()?;
    let vault = &ctx.accounts.vault;
    vault.check_invariant(ctx.accounts.custody_ledger.amount)?;

    msg!(
        "Withdrew {} from vault {} of owner {}",
        amount,
        vault.key(),
        vault.owner
    );

    emit!(DirectWithdrawn {
        vault: vault.key(),
        owner: vault.owner,
        amount,
        accounted_balance: vault.accounted_balance,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
