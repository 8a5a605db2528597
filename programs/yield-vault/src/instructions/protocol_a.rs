use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar::instructions as sysvar_instructions;
use anchor_spl::{
    associated_token::{self, AssociatedToken, Create},
    token::{Mint, Token, TokenAccount},
};

use super::settlement::{self, Snapshot};
use crate::{
    adapters::LendingMarketAdapter,
    constants::*,
    derivation,
    errors::*,
    events::*,
    gate::{self, InstructionKind, Principals},
    state::*,
};

/// Keeper-driven moves between the custody ledger and the shared-reserve
/// lending market
///
/// Every external account is checked against the addresses in `config`;
/// nothing supplied by the keeper is trusted by itself. Market accounts are
/// untyped, so an unconfigured market fails the `config` constraint with
/// `ProtocolNotConfigured` before anything is read from them.
#[derive(Accounts)]
pub struct ProtocolATransfer<'info> {
    /// Keeper - checked against config.keepers by the gate; pays for the
    /// collateral account if it does not exist yet
    #[account(mut)]
    pub keeper: Signer<'info>,

    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump,
        constraint = config.protocol_a.is_configured() @ YieldVaultError::ProtocolNotConfigured,
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

    /// CHECK: reserve collateral mint, address fixed by config
    #[account(
        mut,
        address = config.protocol_a.collateral_mint @ YieldVaultError::AccountMismatch,
    )]
    pub collateral_mint: UncheckedAccount<'info>,

    /// CHECK: vault's collateral receipt account, address re-derived;
    /// created idempotently by the handler
    #[account(
        mut,
        address = derivation::collateral_vault_address(&vault.key(), &config.protocol_a.collateral_mint)
            @ YieldVaultError::AccountMismatch,
    )]
    pub collateral_vault: UncheckedAccount<'info>,

    /// CHECK: lending program, address fixed by config
    #[account(
        executable,
        address = config.protocol_a.program @ YieldVaultError::AccountMismatch,
    )]
    pub lending_program: UncheckedAccount<'info>,

    /// CHECK: address fixed by config
    #[account(address = config.protocol_a.lending_market @ YieldVaultError::AccountMismatch)]
    pub lending_market: UncheckedAccount<'info>,

    /// CHECK: address fixed by config
    #[account(
        address = config.protocol_a.lending_market_authority @ YieldVaultError::AccountMismatch,
    )]
    pub lending_market_authority: UncheckedAccount<'info>,

    /// CHECK: address fixed by config
    #[account(
        mut,
        address = config.protocol_a.reserve @ YieldVaultError::AccountMismatch,
    )]
    pub reserve: UncheckedAccount<'info>,

    /// CHECK: address fixed by config
    #[account(
        mut,
        address = config.protocol_a.reserve_liquidity_supply @ YieldVaultError::AccountMismatch,
    )]
    pub reserve_liquidity_supply: UncheckedAccount<'info>,

    /// CHECK: instructions sysvar, read by the lending program
    #[account(address = sysvar_instructions::ID)]
    pub instruction_sysvar: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

impl<'info> ProtocolATransfer<'info> {
    fn authorize(&self, kind: InstructionKind) -> Result<()> {
        gate::authorize(
            kind,
            &self.keeper.key(),
            Principals {
                config: Some(&**self.config),
                ..Default::default()
            },
        )
    }

    /// Keeper pays for the collateral account the first time it is needed
    fn ensure_collateral_vault(&self) -> Result<()> {
        associated_token::create_idempotent(CpiContext::new(
            self.associated_token_program.to_account_info(),
            Create {
                payer: self.keeper.to_account_info(),
                associated_token: self.collateral_vault.to_account_info(),
                authority: self.vault.to_account_info(),
                mint: self.collateral_mint.to_account_info(),
                system_program: self.system_program.to_account_info(),
                token_program: self.token_program.to_account_info(),
            },
        ))
    }

    fn adapter(&self, collateral_amount: u64) -> LendingMarketAdapter<'info> {
        LendingMarketAdapter {
            program: self.lending_program.to_account_info(),
            owner: self.vault.to_account_info(),
            lending_market: self.lending_market.to_account_info(),
            lending_market_authority: self.lending_market_authority.to_account_info(),
            reserve: self.reserve.to_account_info(),
            reserve_liquidity_mint: self.usdc_mint.to_account_info(),
            reserve_liquidity_supply: self.reserve_liquidity_supply.to_account_info(),
            reserve_collateral_mint: self.collateral_mint.to_account_info(),
            liquidity_account: self.custody_ledger.to_account_info(),
            collateral_account: self.collateral_vault.to_account_info(),
            token_program: self.token_program.to_account_info(),
            instruction_sysvar: self.instruction_sysvar.to_account_info(),
            collateral_amount,
        }
    }
}

/// Balance of a token account that is not part of the typed account struct
fn token_amount(info: &AccountInfo, token_program: &Pubkey) -> Result<u64> {
    require_keys_eq!(*info.owner, *token_program, YieldVaultError::AccountMismatch);
    let data = info.try_borrow_data()?;
    Ok(TokenAccount::try_deserialize(&mut &data[..])?.amount)
}

pub fn deploy_handler(ctx: Context<ProtocolATransfer>, amount: u64) -> Result<()> {
    ctx.accounts.authorize(InstructionKind::DeployProtocolA)?;

    ctx.accounts.ensure_collateral_vault()?;

    let accounts = &mut *ctx.accounts;
    let token_program = accounts.token_program.key();
    let collateral = accounts.collateral_vault.to_account_info();
    let adapter = accounts.adapter(token_amount(&collateral, &token_program)?);
    let ledger = &mut accounts.custody_ledger;

    let movement = settlement::deploy(&adapter, &mut accounts.vault, amount, || {
        ledger.reload()?;
        Ok(Snapshot {
            ledger: ledger.amount,
            receipts: Some(token_amount(&collateral, &token_program)?),
        })
    })?;

    let vault = &accounts.vault;
    msg!(
        "Deployed {} from vault {} into reserve {}, {} collateral received, ledger now {}",
        movement.amount,
        vault.key(),
        accounts.reserve.key(),
        movement.receipts,
        movement.ledger_after
    );

    emit!(ProtocolDeployed {
        vault: vault.key(),
        authority: accounts.keeper.key(),
        protocol: AllocatedProtocol::ProtocolA,
        amount: movement.amount,
        receipts: movement.receipts,
        deployed_amount: vault.deployed_amount,
        accounted_balance: vault.accounted_balance,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

pub fn redeem_handler(ctx: Context<ProtocolATransfer>) -> Result<()> {
    ctx.accounts.authorize(InstructionKind::RedeemProtocolA)?;

    ctx.accounts.ensure_collateral_vault()?;

    let accounts = &mut *ctx.accounts;
    let token_program = accounts.token_program.key();
    let collateral = accounts.collateral_vault.to_account_info();
    let adapter = accounts.adapter(token_amount(&collateral, &token_program)?);
    let ledger = &mut accounts.custody_ledger;

    let movement = settlement::redeem(&adapter, &mut accounts.vault, || {
        ledger.reload()?;
        Ok(Snapshot {
            ledger: ledger.amount,
            receipts: Some(token_amount(&collateral, &token_program)?),
        })
    })?;

    let vault = &accounts.vault;
    msg!(
        "Redeemed {} into vault {}, ledger now {}, accounted balance now {}",
        movement.amount,
        vault.key(),
        movement.ledger_after,
        vault.accounted_balance
    );

    emit!(ProtocolRedeemed {
        vault: vault.key(),
        authority: accounts.keeper.key(),
        protocol: AllocatedProtocol::ProtocolA,
        redeemed: movement.amount,
        accounted_balance: vault.accounted_balance,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
