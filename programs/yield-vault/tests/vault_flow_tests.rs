use anchor_lang::prelude::*;
use yield_vault::{
    errors::YieldVaultError,
    gate::{authorize, InstructionKind, Principals, Role},
    instructions::settlement::{deploy_delta, redeem_delta, Snapshot},
    state::{AllocatedProtocol, LendingMarketConfig, MarginPoolConfig, VaultAccount, VaultConfig},
};

fn new_vault(owner: Pubkey) -> VaultAccount {
    VaultAccount {
        owner,
        bump: 255,
        usdc_mint: Pubkey::new_unique(),
        external_position_handle: None,
        allocated_protocol: AllocatedProtocol::Idle,
        accounted_balance: 0,
        deployed_amount: 0,
        position_shares: 0,
        is_initialized: true,
        _reserved: [0; 64],
    }
}

fn new_config(admin: Pubkey, keepers: &[Pubkey]) -> VaultConfig {
    let mut config = VaultConfig {
        admin,
        keepers: vec![],
        protocol_a: LendingMarketConfig::default(),
        protocol_b: MarginPoolConfig::default(),
        bump: 255,
        _reserved: [0; 64],
    };
    for keeper in keepers {
        config.add_keeper(*keeper).unwrap();
    }
    config
}

fn ledger(amount: u64) -> Snapshot {
    Snapshot {
        ledger: amount,
        receipts: None,
    }
}

fn is_error(result: Result<impl std::fmt::Debug>, expected: YieldVaultError) -> bool {
    match result {
        Err(Error::AnchorError(e)) => {
            let expected: Error = expected.into();
            matches!(expected, Error::AnchorError(x) if x.error_code_number == e.error_code_number)
        }
        _ => false,
    }
}

// ============================================================================
// Authorization gate
// ============================================================================

#[test]
fn test_roles_per_instruction() {
    assert_eq!(InstructionKind::DepositDirect.required_role(), Role::Owner);
    assert_eq!(InstructionKind::WithdrawProtocolB.required_role(), Role::Owner);
    assert_eq!(InstructionKind::DeployProtocolA.required_role(), Role::Keeper);
    assert_eq!(InstructionKind::RedeemProtocolA.required_role(), Role::Keeper);
    assert_eq!(InstructionKind::ManageKeepers.required_role(), Role::Admin);
}

#[test]
fn test_owner_instructions_reject_strangers() {
    let owner = Pubkey::new_unique();
    let vault = new_vault(owner);
    let principals = Principals {
        vault: Some(&vault),
        ..Default::default()
    };

    assert!(authorize(InstructionKind::DepositDirect, &owner, principals).is_ok());
    assert!(is_error(
        authorize(InstructionKind::WithdrawDirect, &Pubkey::new_unique(), principals),
        YieldVaultError::Unauthorized
    ));
}

#[test]
fn test_owner_cannot_drive_lending_market() {
    let owner = Pubkey::new_unique();
    let keeper = Pubkey::new_unique();
    let vault = new_vault(owner);
    let config = new_config(Pubkey::new_unique(), &[keeper]);
    let principals = Principals {
        vault: Some(&vault),
        config: Some(&config),
    };

    assert!(authorize(InstructionKind::DeployProtocolA, &keeper, principals).is_ok());
    assert!(is_error(
        authorize(InstructionKind::DeployProtocolA, &owner, principals),
        YieldVaultError::Unauthorized
    ));
    // The keeper is not the owner
    assert!(is_error(
        authorize(InstructionKind::WithdrawDirect, &keeper, principals),
        YieldVaultError::Unauthorized
    ));
}

#[test]
fn test_removed_keeper_loses_access() {
    let keeper = Pubkey::new_unique();
    let mut config = new_config(Pubkey::new_unique(), &[keeper]);
    config.remove_keeper(&keeper).unwrap();
    let principals = Principals {
        config: Some(&config),
        ..Default::default()
    };
    assert!(is_error(
        authorize(InstructionKind::RedeemProtocolA, &keeper, principals),
        YieldVaultError::Unauthorized
    ));
}

#[test]
fn test_keeper_list_is_bounded() {
    let keepers: Vec<Pubkey> = (0..yield_vault::constants::MAX_KEEPERS)
        .map(|_| Pubkey::new_unique())
        .collect();
    let mut config = new_config(Pubkey::new_unique(), &keepers);
    assert!(is_error(
        config.add_keeper(Pubkey::new_unique()),
        YieldVaultError::KeeperListFull
    ));
}

#[test]
fn test_missing_principal_is_unauthorized() {
    assert!(is_error(
        authorize(
            InstructionKind::ConfigureProtocol,
            &Pubkey::new_unique(),
            Principals::default()
        ),
        YieldVaultError::Unauthorized
    ));
}

// ============================================================================
// Bookkeeping flows
// ============================================================================

#[test]
fn test_direct_deposit_then_withdraw() {
    // 1000 USDC with 6 decimals in and back out
    let mut vault = new_vault(Pubkey::new_unique());

    vault.record_direct_deposit(1_000_000_000).unwrap();
    vault.check_invariant(1_000_000_000).unwrap();
    assert_eq!(vault.accounted_balance, 1_000_000_000);

    vault.record_direct_withdraw(1_000_000_000).unwrap();
    vault.check_invariant(0).unwrap();
    assert_eq!(vault.accounted_balance, 0);
}

#[test]
fn test_overdrawn_withdraw_fails() {
    let mut vault = new_vault(Pubkey::new_unique());
    vault.record_direct_deposit(500).unwrap();
    assert!(is_error(
        vault.record_direct_withdraw(501),
        YieldVaultError::InsufficientLedgerBalance
    ));
    assert_eq!(vault.accounted_balance, 500);
}

#[test]
fn test_margin_pool_partial_deposit_and_full_withdraw() {
    // 100 USDC in the ledger, 45 deposited into the pool
    let mut vault = new_vault(Pubkey::new_unique());
    vault.external_position_handle = Some(Pubkey::new_unique());
    vault.record_direct_deposit(100_000_000).unwrap();

    let (spent, receipts) = deploy_delta(ledger(100_000_000), ledger(55_000_000)).unwrap();
    vault
        .record_deploy(AllocatedProtocol::ProtocolB, spent, receipts)
        .unwrap();
    vault.check_invariant(55_000_000).unwrap();
    assert_eq!(vault.accounted_balance, 100_000_000);

    // Direct moves wait for the position to be closed
    assert!(is_error(
        vault.record_direct_withdraw(1),
        YieldVaultError::PositionActive
    ));

    let redeemed = redeem_delta(ledger(55_000_000), ledger(100_000_000)).unwrap();
    vault
        .record_redeem(AllocatedProtocol::ProtocolB, redeemed)
        .unwrap();
    vault.check_invariant(100_000_000).unwrap();
    assert_eq!(vault.allocated_protocol, AllocatedProtocol::Idle);
    assert_eq!(vault.accounted_balance, 100_000_000);
}

#[test]
fn test_deposit_all_into_margin_pool_and_back() {
    // Owner deposits 45 USDC, all of it goes to the pool and comes back
    let mut owner_wallet: u64 = 50_000_000;
    let mut ledger_balance: u64 = 0;
    let mut vault = new_vault(Pubkey::new_unique());
    vault.external_position_handle = Some(Pubkey::new_unique());

    vault.record_direct_deposit(45_000_000).unwrap();
    owner_wallet -= 45_000_000;
    ledger_balance += 45_000_000;
    vault.check_invariant(ledger_balance).unwrap();
    let wallet_before_deploy = owner_wallet;

    let (spent, receipts) = deploy_delta(ledger(ledger_balance), ledger(0)).unwrap();
    assert_eq!(spent, 45_000_000);
    vault
        .record_deploy(AllocatedProtocol::ProtocolB, spent, receipts)
        .unwrap();
    ledger_balance = 0;
    vault.check_invariant(ledger_balance).unwrap();
    assert_eq!(vault.accounted_balance, 45_000_000);

    let redeemed = redeem_delta(ledger(ledger_balance), ledger(45_000_000)).unwrap();
    vault
        .record_redeem(AllocatedProtocol::ProtocolB, redeemed)
        .unwrap();
    ledger_balance += redeemed;
    vault.check_invariant(ledger_balance).unwrap();

    assert!(ledger_balance >= 45_000_000);
    assert_eq!(owner_wallet, wallet_before_deploy);
    assert_eq!(vault.allocated_protocol, AllocatedProtocol::Idle);
}

#[test]
fn test_lending_market_redeem_with_nothing_back() {
    assert!(is_error(
        redeem_delta(ledger(0), ledger(0)),
        YieldVaultError::NothingToRedeem
    ));
}

#[test]
fn test_invariant_detects_drift() {
    let mut vault = new_vault(Pubkey::new_unique());
    vault.record_direct_deposit(10).unwrap();
    assert!(is_error(
        vault.check_invariant(9),
        YieldVaultError::InvariantViolation
    ));
}
