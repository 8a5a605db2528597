use anchor_lang::prelude::*;
use anchor_spl::associated_token::get_associated_token_address;

use crate::constants::*;

/// Vault PDA and canonical bump for `owner`
pub fn find_vault_address(owner: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_SEED, owner.as_ref()], &crate::ID)
}

pub fn find_config_address() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[CONFIG_SEED], &crate::ID)
}

/// Re-derives the vault PDA from the stored owner and compares address and
/// bump; a non-canonical bump is rejected even if it hashes off-curve.
pub fn verify_vault_address(vault: &Pubkey, owner: &Pubkey, bump: u8) -> bool {
    let (expected, canonical_bump) = find_vault_address(owner);
    expected == *vault && canonical_bump == bump
}

/// Custody ledger: associated token account of the vault for `mint`
pub fn custody_ledger_address(vault: &Pubkey, mint: &Pubkey) -> Pubkey {
    get_associated_token_address(vault, mint)
}

/// Collateral receipt account of the vault on the shared-reserve market
pub fn collateral_vault_address(vault: &Pubkey, collateral_mint: &Pubkey) -> Pubkey {
    get_associated_token_address(vault, collateral_mint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_is_idempotent() {
        let owner = Pubkey::new_unique();
        assert_eq!(find_vault_address(&owner), find_vault_address(&owner));
    }

    #[test]
    fn test_stored_bump_recreates_vault_address() {
        let owner = Pubkey::new_unique();
        let (vault, bump) = find_vault_address(&owner);
        let recreated =
            Pubkey::create_program_address(&[VAULT_SEED, owner.as_ref(), &[bump]], &crate::ID)
                .unwrap();
        assert_eq!(recreated, vault);
    }

    #[test]
    fn test_ledger_differs_per_mint() {
        let (vault, _) = find_vault_address(&Pubkey::new_unique());
        let usdc = Pubkey::new_unique();
        assert_eq!(
            custody_ledger_address(&vault, &usdc),
            custody_ledger_address(&vault, &usdc)
        );
        assert_ne!(
            custody_ledger_address(&vault, &usdc),
            custody_ledger_address(&vault, &Pubkey::new_unique())
        );
    }

    #[test]
    fn test_verify_rejects_wrong_bump() {
        let owner = Pubkey::new_unique();
        let (vault, bump) = find_vault_address(&owner);
        assert!(verify_vault_address(&vault, &owner, bump));
        assert!(!verify_vault_address(&vault, &owner, bump.wrapping_sub(1)));
        assert!(!verify_vault_address(&vault, &Pubkey::new_unique(), bump));
    }
}
