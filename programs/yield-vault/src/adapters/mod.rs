//! Bounded interfaces to the external lending protocols
//!
//! Each adapter owns a typed bundle of the account infos its protocol needs
//! and exposes deposit/withdraw-shaped calls only. Bookkeeping stays in the
//! instruction handlers, which measure balances around the nested call.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::{
    instruction::Instruction,
    program::invoke_signed,
};
use solana_sha256_hasher::hash;

use crate::{errors::YieldVaultError, state::AllocatedProtocol};

pub mod lending_market;
pub mod margin_pool;

pub use lending_market::*;
pub use margin_pool::*;

pub trait LendingAdapter {
    /// Allocation tag a successful deposit moves the vault into
    fn protocol(&self) -> AllocatedProtocol;

    /// Move `amount` of stablecoin from the custody ledger into the protocol
    fn deposit(&self, amount: u64, signer_seeds: &[&[&[u8]]]) -> Result<()>;

    /// Return the vault's whole position to the custody ledger
    fn withdraw_all(&self, signer_seeds: &[&[&[u8]]]) -> Result<()>;
}

/// Anchor's 8-byte instruction discriminator for `name`
pub fn sighash(name: &str) -> [u8; 8] {
    let preimage = format!("global:{}", name);
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&hash(preimage.as_bytes()).to_bytes()[..8]);
    discriminator
}

/// Nested call signed by the vault PDA; any failure surfaces as
/// `ExternalProtocolFailure`
pub(crate) fn invoke_external(
    ix: &Instruction,
    account_infos: &[AccountInfo],
    signer_seeds: &[&[&[u8]]],
) -> Result<()> {
    invoke_signed(ix, account_infos, signer_seeds).map_err(|e| {
        msg!("Nested call into {} failed: {}", ix.program_id, e);
        error!(YieldVaultError::ExternalProtocolFailure)
    })
}
