use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};

use super::{invoke_external, sighash, LendingAdapter};
use crate::{constants::*, state::AllocatedProtocol};

/// Addresses taking part in a margin-pool deposit or withdrawal
#[derive(Clone, Copy, Debug)]
pub struct MarginPoolKeys {
    pub program: Pubkey,
    pub group: Pubkey,
    pub margin_account: Pubkey,
    /// Vault PDA, the margin account's authority
    pub authority: Pubkey,
    pub bank: Pubkey,
    /// Custody ledger, source on deposit and destination on withdraw
    pub token_account: Pubkey,
    pub liquidity_vault: Pubkey,
    pub liquidity_vault_authority: Pubkey,
    pub token_program: Pubkey,
}

/// `marginfi_account_initialize()` with the vault as authority
pub fn initialize_account_ix(
    program: Pubkey,
    group: Pubkey,
    margin_account: Pubkey,
    authority: Pubkey,
    fee_payer: Pubkey,
    system_program: Pubkey,
) -> Instruction {
    Instruction {
        program_id: program,
        accounts: vec![
            AccountMeta::new_readonly(group, false),
            AccountMeta::new(margin_account, true),
            AccountMeta::new_readonly(authority, true),
            AccountMeta::new(fee_payer, true),
            AccountMeta::new_readonly(system_program, false),
        ],
        data: sighash(MARGIN_ACCOUNT_INITIALIZE).to_vec(),
    }
}

/// `lending_account_deposit(amount, deposit_up_to_limit = None)`
pub fn lending_account_deposit_ix(keys: &MarginPoolKeys, amount: u64) -> Instruction {
    let mut data = Vec::with_capacity(17);
    data.extend_from_slice(&sighash(MARGIN_ACCOUNT_DEPOSIT));
    data.extend_from_slice(&amount.to_le_bytes());
    data.push(0);

    Instruction {
        program_id: keys.program,
        accounts: vec![
            AccountMeta::new_readonly(keys.group, false),
            AccountMeta::new(keys.margin_account, false),
            AccountMeta::new_readonly(keys.authority, true),
            AccountMeta::new(keys.bank, false),
            AccountMeta::new(keys.token_account, false),
            AccountMeta::new(keys.liquidity_vault, false),
            AccountMeta::new_readonly(keys.token_program, false),
        ],
        data,
    }
}

/// `lending_account_withdraw(0, withdraw_all = Some(true))`
///
/// `observation` carries the bank/oracle accounts the pool needs for its
/// health check, passed through unchanged.
pub fn lending_account_withdraw_all_ix(
    keys: &MarginPoolKeys,
    observation: &[AccountMeta],
) -> Instruction {
    let mut data = Vec::with_capacity(18);
    data.extend_from_slice(&sighash(MARGIN_ACCOUNT_WITHDRAW));
    data.extend_from_slice(&0u64.to_le_bytes());
    data.extend_from_slice(&[1, 1]);

    let mut accounts = vec![
        AccountMeta::new_readonly(keys.group, false),
        AccountMeta::new(keys.margin_account, false),
        AccountMeta::new_readonly(keys.authority, true),
        AccountMeta::new(keys.bank, false),
        AccountMeta::new(keys.token_account, false),
        AccountMeta::new(keys.liquidity_vault_authority, false),
        AccountMeta::new(keys.liquidity_vault, false),
        AccountMeta::new_readonly(keys.token_program, false),
    ];
    accounts.extend_from_slice(observation);

    Instruction {
        program_id: keys.program,
        accounts,
        data,
    }
}

/// Protocol B: the vault's share lives in its own margin account inside a
/// pooled bank
pub struct MarginPoolAdapter<'info> {
    pub program: AccountInfo<'info>,
    pub group: AccountInfo<'info>,
    pub margin_account: AccountInfo<'info>,
    pub authority: AccountInfo<'info>,
    pub bank: AccountInfo<'info>,
    pub token_account: AccountInfo<'info>,
    pub liquidity_vault: AccountInfo<'info>,
    pub liquidity_vault_authority: AccountInfo<'info>,
    pub token_program: AccountInfo<'info>,
    pub observation_accounts: Vec<AccountInfo<'info>>,
}

impl<'info> MarginPoolAdapter<'info> {
    pub fn keys(&self) -> MarginPoolKeys {
        MarginPoolKeys {
            program: self.program.key(),
            group: self.group.key(),
            margin_account: self.margin_account.key(),
            authority: self.authority.key(),
            bank: self.bank.key(),
            token_account: self.token_account.key(),
            liquidity_vault: self.liquidity_vault.key(),
            liquidity_vault_authority: self.liquidity_vault_authority.key(),
            token_program: self.token_program.key(),
        }
    }

    fn account_infos(&self) -> Vec<AccountInfo<'info>> {
        let mut infos = vec![
            self.group.clone(),
            self.margin_account.clone(),
            self.authority.clone(),
            self.bank.clone(),
            self.token_account.clone(),
            self.liquidity_vault_authority.clone(),
            self.liquidity_vault.clone(),
            self.token_program.clone(),
            self.program.clone(),
        ];
        infos.extend(self.observation_accounts.iter().cloned());
        infos
    }

    fn observation_metas(&self) -> Vec<AccountMeta> {
        self.observation_accounts
            .iter()
            .map(|info| {
                if info.is_writable {
                    AccountMeta::new(info.key(), false)
                } else {
                    AccountMeta::new_readonly(info.key(), false)
                }
            })
            .collect()
    }
}

impl LendingAdapter for MarginPoolAdapter<'_> {
    fn protocol(&self) -> AllocatedProtocol {
        AllocatedProtocol::ProtocolB
    }

    fn deposit(&self, amount: u64, signer_seeds: &[&[&[u8]]]) -> Result<()> {
        let ix = lending_account_deposit_ix(&self.keys(), amount);
        invoke_external(&ix, &self.account_infos(), signer_seeds)
    }

    fn withdraw_all(&self, signer_seeds: &[&[&[u8]]]) -> Result<()> {
        let ix = lending_account_withdraw_all_ix(&self.keys(), &self.observation_metas());
        invoke_external(&ix, &self.account_infos(), signer_seeds)
    }
}
