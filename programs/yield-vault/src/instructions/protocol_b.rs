use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use super::settlement::{self, Snapshot};
use crate::{
    adapters::MarginPoolAdapter,
    constants::*,
    derivation,
    errors::*,
    events::*,
    gate::{self, InstructionKind, Principals},
    state::*,
};

/// Owner-driven moves between the custody ledger and the vault's margin
/// account in the pooled bank
#[derive(Accounts)]
pub struct ProtocolBTransfer<'info> {
    /// Vault owner - checked against vault.owner by the gate
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, VaultConfig>>,

    #[account(
        mut,
        constraint = derivation::verify_vault_address(&vault.key(), &vault.owner, vault.bump)
            @ YieldVaultError::AccountMismatch,
    )]
    pub vault: Box<Account<'info, VaultAccount>>,

    #[account(address = vault.usdc_mint @ YieldVaultError::AccountMismatch)]
    pub usdc_mint: Box<Account<'info, Mint>>,

    #[account(
        mut,
        constraint = custody_ledger.key()
            == derivation::custody_ledger_address(&vault.key(), &usdc_mint.key())
            @ YieldVaultError::AccountMismatch,
    )]
    pub custody_ledger: Box<Account<'info, TokenAccount>>,

    /// CHECK: margin pool program, address fixed by config
    #[account(
        executable,
        address = config.protocol_b.program @ YieldVaultError::AccountMismatch,
    )]
    pub margin_program: UncheckedAccount<'info>,

    /// CHECK: address fixed by config
    #[account(address = config.protocol_b.group @ YieldVaultError::AccountMismatch)]
    pub margin_group: UncheckedAccount<'info>,

    /// CHECK: compared with vault.external_position_handle in the handler
    #[account(mut)]
    pub margin_account: UncheckedAccount<'info>,

    /// CHECK: address fixed by config
    #[account(
        mut,
        address = config.protocol_b.bank @ YieldVaultError::AccountMismatch,
    )]
    pub bank: UncheckedAccount<'info>,

    /// CHECK: address fixed by config
    #[account(
        mut,
        address = config.protocol_b.liquidity_vault @ YieldVaultError::AccountMismatch,
    )]
    pub bank_liquidity_vault: UncheckedAccount<'info>,

    /// CHECK: address fixed by config
    #[account(
        mut,
        address = config.protocol_b.liquidity_vault_authority @ YieldVaultError::AccountMismatch,
    )]
    pub bank_liquidity_vault_authority: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
}

impl<'info> ProtocolBTransfer<'info> {
    /// Gate, configuration and the linked margin account, in that order
    fn authorize(&self, kind: InstructionKind) -> Result<()> {
        gate::authorize(
            kind,
            &self.owner.key(),
            Principals {
                vault: Some(&**self.vault),
                config: Some(&**self.config),
            },
        )?;
        require!(
            self.config.protocol_b.is_configured(),
            YieldVaultError::ProtocolNotConfigured
        );
        require_keys_eq!(
            self.vault.position_handle()?,
            self.margin_account.key(),
            YieldVaultError::AccountMismatch
        );
        Ok(())
    }

    fn adapter(&self, observation_accounts: &[AccountInfo<'info>]) -> MarginPoolAdapter<'info> {
        MarginPoolAdapter {
            program: self.margin_program.to_account_info(),
            group: self.margin_group.to_account_info(),
            margin_account: self.margin_account.to_account_info(),
            authority: self.vault.to_account_info(),
            bank: self.bank.to_account_info(),
            token_account: self.custody_ledger.to_account_info(),
            liquidity_vault: self.bank_liquidity_vault.to_account_info(),
            liquidity_vault_authority: self.bank_liquidity_vault_authority.to_account_info(),
            token_program: self.token_program.to_account_info(),
            observation_accounts: observation_accounts.to_vec(),
        }
    }
}

pub fn deposit_handler(ctx: Context<ProtocolBTransfer>, amount: u64) -> Result<()> {
    ctx.accounts.authorize(InstructionKind::DepositProtocolB)?;

    let accounts = &mut *ctx.accounts;
    let adapter = accounts.adapter(&[]);
    let ledger = &mut accounts.custody_ledger;

    let movement = settlement::deploy(&adapter, &mut accounts.vault, amount, || {
        ledger.reload()?;
        Ok(Snapshot {
            ledger: ledger.amount,
            receipts: None,
        })
    })?;

    let vault = &accounts.vault;
    msg!(
        "Deposited {} from vault {} into margin account {}, ledger now {}",
        movement.amount,
        vault.key(),
        accounts.margin_account.key(),
        movement.ledger_after
    );

    emit!(ProtocolDeployed {
        vault: vault.key(),
        authority: accounts.owner.key(),
        protocol: AllocatedProtocol::ProtocolB,
        amount: movement.amount,
        receipts: movement.receipts,
        deployed_amount: vault.deployed_amount,
        accounted_balance: vault.accounted_balance,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

/// Remaining accounts are forwarded to the pool for its health check
pub fn withdraw_handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, ProtocolBTransfer<'info>>,
) -> Result<()> {
    ctx.accounts.authorize(InstructionKind::WithdrawProtocolB)?;

    let adapter = ctx.accounts.adapter(ctx.remaining_accounts);
    let accounts = &mut *ctx.accounts;
    let ledger = &mut accounts.custody_ledger;

    let movement = settlement::redeem(&adapter, &mut accounts.vault, || {
        ledger.reload()?;
        Ok(Snapshot {
            ledger: ledger.amount,
            receipts: None,
        })
    })?;

    let vault = &accounts.vault;
    msg!(
        "Withdrew {} from margin account {} into vault {}, ledger now {}, accounted balance now {}",
        movement.amount,
        accounts.margin_account.key(),
        vault.key(),
        movement.ledger_after,
        vault.accounted_balance
    );

    emit!(ProtocolRedeemed {
        vault: vault.key(),
        authority: accounts.owner.key(),
        protocol: AllocatedProtocol::ProtocolB,
        redeemed: movement.amount,
        accounted_balance: vault.accounted_balance,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
