use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};

use super::{invoke_external, sighash, LendingAdapter};
use crate::{constants::*, errors::YieldVaultError, state::AllocatedProtocol};

/// Addresses taking part in a shared-reserve deposit or redeem
#[derive(Clone, Copy, Debug)]
pub struct LendingMarketKeys {
    pub program: Pubkey,
    /// Vault PDA, signs as the liquidity/collateral owner
    pub owner: Pubkey,
    pub lending_market: Pubkey,
    pub lending_market_authority: Pubkey,
    pub reserve: Pubkey,
    pub reserve_liquidity_mint: Pubkey,
    pub reserve_liquidity_supply: Pubkey,
    pub reserve_collateral_mint: Pubkey,
    /// Custody ledger
    pub liquidity_account: Pubkey,
    /// Vault's collateral receipt account
    pub collateral_account: Pubkey,
    pub token_program: Pubkey,
    pub instruction_sysvar: Pubkey,
}

fn encode(name: &str, amount: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(16);
    data.extend_from_slice(&sighash(name));
    data.extend_from_slice(&amount.to_le_bytes());
    data
}

/// `deposit_reserve_liquidity(liquidity_amount)`
pub fn deposit_reserve_liquidity_ix(keys: &LendingMarketKeys, liquidity_amount: u64) -> Instruction {
    Instruction {
        program_id: keys.program,
        accounts: vec![
            AccountMeta::new_readonly(keys.owner, true),
            AccountMeta::new(keys.reserve, false),
            AccountMeta::new_readonly(keys.lending_market, false),
            AccountMeta::new_readonly(keys.lending_market_authority, false),
            AccountMeta::new_readonly(keys.reserve_liquidity_mint, false),
            AccountMeta::new(keys.reserve_liquidity_supply, false),
            AccountMeta::new(keys.reserve_collateral_mint, false),
            AccountMeta::new(keys.liquidity_account, false),
            AccountMeta::new(keys.collateral_account, false),
            AccountMeta::new_readonly(keys.token_program, false),
            AccountMeta::new_readonly(keys.token_program, false),
            AccountMeta::new_readonly(keys.instruction_sysvar, false),
        ],
        data: encode(DEPOSIT_RESERVE_LIQUIDITY, liquidity_amount),
    }
}

/// `redeem_reserve_collateral(collateral_amount)`
pub fn redeem_reserve_collateral_ix(keys: &LendingMarketKeys, collateral_amount: u64) -> Instruction {
    Instruction {
        program_id: keys.program,
        accounts: vec![
            AccountMeta::new_readonly(keys.owner, true),
            AccountMeta::new_readonly(keys.lending_market, false),
            AccountMeta::new(keys.reserve, false),
            AccountMeta::new_readonly(keys.lending_market_authority, false),
            AccountMeta::new_readonly(keys.reserve_liquidity_mint, false),
            AccountMeta::new(keys.reserve_collateral_mint, false),
            AccountMeta::new(keys.reserve_liquidity_supply, false),
            AccountMeta::new(keys.collateral_account, false),
            AccountMeta::new(keys.liquidity_account, false),
            AccountMeta::new_readonly(keys.token_program, false),
            AccountMeta::new_readonly(keys.token_program, false),
            AccountMeta::new_readonly(keys.instruction_sysvar, false),
        ],
        data: encode(REDEEM_RESERVE_COLLATERAL, collateral_amount),
    }
}

/// Protocol A: liquidity goes into a shared reserve, collateral receipts
/// come back to the vault
pub struct LendingMarketAdapter<'info> {
    pub program: AccountInfo<'info>,
    pub owner: AccountInfo<'info>,
    pub lending_market: AccountInfo<'info>,
    pub lending_market_authority: AccountInfo<'info>,
    pub reserve: AccountInfo<'info>,
    pub reserve_liquidity_mint: AccountInfo<'info>,
    pub reserve_liquidity_supply: AccountInfo<'info>,
    pub reserve_collateral_mint: AccountInfo<'info>,
    pub liquidity_account: AccountInfo<'info>,
    pub collateral_account: AccountInfo<'info>,
    pub token_program: AccountInfo<'info>,
    pub instruction_sysvar: AccountInfo<'info>,
    /// Collateral receipts currently held by the vault
    pub collateral_amount: u64,
}

impl<'info> LendingMarketAdapter<'info> {
    pub fn keys(&self) -> LendingMarketKeys {
        LendingMarketKeys {
            program: self.program.key(),
            owner: self.owner.key(),
            lending_market: self.lending_market.key(),
            lending_market_authority: self.lending_market_authority.key(),
            reserve: self.reserve.key(),
            reserve_liquidity_mint: self.reserve_liquidity_mint.key(),
            reserve_liquidity_supply: self.reserve_liquidity_supply.key(),
            reserve_collateral_mint: self.reserve_collateral_mint.key(),
            liquidity_account: self.liquidity_account.key(),
            collateral_account: self.collateral_account.key(),
            token_program: self.token_program.key(),
            instruction_sysvar: self.instruction_sysvar.key(),
        }
    }

    fn account_infos(&self) -> Vec<AccountInfo<'info>> {
        vec![
            self.owner.clone(),
            self.lending_market.clone(),
            self.reserve.clone(),
            self.lending_market_authority.clone(),
            self.reserve_liquidity_mint.clone(),
            self.reserve_collateral_mint.clone(),
            self.reserve_liquidity_supply.clone(),
            self.liquidity_account.clone(),
            self.collateral_account.clone(),
            self.token_program.clone(),
            self.instruction_sysvar.clone(),
            self.program.clone(),
        ]
    }
}

impl LendingAdapter for LendingMarketAdapter<'_> {
    fn protocol(&self) -> AllocatedProtocol {
        AllocatedProtocol::ProtocolA
    }

    fn deposit(&self, amount: u64, signer_seeds: &[&[&[u8]]]) -> Result<()> {
        let ix = deposit_reserve_liquidity_ix(&self.keys(), amount);
        invoke_external(&ix, &self.account_infos(), signer_seeds)
    }

    fn withdraw_all(&self, signer_seeds: &[&[&[u8]]]) -> Result<()> {
        require!(self.collateral_amount > 0, YieldVaultError::NothingToRedeem);
        let ix = redeem_reserve_collateral_ix(&self.keys(), self.collateral_amount);
        invoke_external(&ix, &self.account_infos(), signer_seeds)
    }
}
