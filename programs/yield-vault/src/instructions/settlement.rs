use anchor_lang::prelude::*;

use crate::{
    adapters::LendingAdapter,
    constants::*,
    errors::YieldVaultError,
    state::VaultAccount,
};

/// Balances observed around a nested protocol call
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Custody ledger balance
    pub ledger: u64,
    /// Receipt token balance, when the protocol issues receipts to the vault
    pub receipts: Option<u64>,
}

/// Measured effect of a settled deploy or redeem
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Movement {
    /// Stablecoin that left (deploy) or entered (redeem) the ledger
    pub amount: u64,
    /// Position units gained on deploy
    pub receipts: u64,
    pub ledger_after: u64,
}

/// Ledger decrease and receipt increase between two snapshots. Protocols
/// without receipt tokens count the spent amount as the position size.
pub fn deploy_delta(before: Snapshot, after: Snapshot) -> Result<(u64, u64)> {
    let spent = before
        .ledger
        .checked_sub(after.ledger)
        .ok_or(error!(YieldVaultError::MathOverflow))?;
    let receipts = match (before.receipts, after.receipts) {
        (Some(b), Some(a)) => a
            .checked_sub(b)
            .ok_or(error!(YieldVaultError::MathOverflow))?,
        _ => spent,
    };
    Ok((spent, receipts))
}

/// Ledger increase between two snapshots
///
/// Zero is a valid outcome when receipts were held and all of them were
/// burned: the position decayed to nothing and the vault still has to
/// return to Idle. Without receipts to prove the position closed, zero is
/// `NothingToRedeem`.
pub fn redeem_delta(before: Snapshot, after: Snapshot) -> Result<u64> {
    let redeemed = after
        .ledger
        .checked_sub(before.ledger)
        .ok_or(error!(YieldVaultError::MathOverflow))?;
    let receipts_consumed = matches!(
        (before.receipts, after.receipts),
        (Some(held), Some(0)) if held > 0
    );
    require!(
        redeemed > 0 || receipts_consumed,
        YieldVaultError::NothingToRedeem
    );
    Ok(redeemed)
}

/// Moves `amount` from the ledger into the adapter's protocol and records
/// what was actually measured. `measure` must reload the accounts it reads.
pub(crate) fn deploy<A: LendingAdapter>(
    adapter: &A,
    vault: &mut VaultAccount,
    amount: u64,
    mut measure: impl FnMut() -> Result<Snapshot>,
) -> Result<Movement> {
    require!(amount > 0, YieldVaultError::ZeroAmount);
    vault.ensure_can_deploy(adapter.protocol())?;

    let before = measure()?;
    vault.absorb_surplus(before.ledger)?;
    require!(
        amount <= before.ledger,
        YieldVaultError::InsufficientLedgerBalance
    );

    let owner = vault.owner;
    let bump = [vault.bump];
    let vault_seeds: &[&[u8]] = &[VAULT_SEED, owner.as_ref(), &bump];
    adapter.deposit(amount, &[vault_seeds])?;

    let after = measure()?;
    let (spent, receipts) = deploy_delta(before, after)?;
    vault.record_deploy(adapter.protocol(), spent, receipts)?;
    vault.check_invariant(after.ledger)?;

    Ok(Movement {
        amount: spent,
        receipts,
        ledger_after: after.ledger,
    })
}

/// Unwinds the adapter's whole position into the ledger; `accounted_balance`
/// is recomputed from what arrived.
pub(crate) fn redeem<A: LendingAdapter>(
    adapter: &A,
    vault: &mut VaultAccount,
    mut measure: impl FnMut() -> Result<Snapshot>,
) -> Result<Movement> {
    require!(
        vault.allocated_protocol == adapter.protocol(),
        YieldVaultError::WrongProtocol
    );

    let before = measure()?;
    vault.absorb_surplus(before.ledger)?;

    let owner = vault.owner;
    let bump = [vault.bump];
    let vault_seeds: &[&[u8]] = &[VAULT_SEED, owner.as_ref(), &bump];
    adapter.withdraw_all(&[vault_seeds])?;

    let after = measure()?;
    let redeemed = redeem_delta(before, after)?;
    vault.record_redeem(adapter.protocol(), redeemed)?;
    vault.check_invariant(after.ledger)?;

    Ok(Movement {
        amount: redeemed,
        receipts: 0,
        ledger_after: after.ledger,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AllocatedProtocol;
    use std::cell::RefCell;

    /// Records calls; balances are scripted through the `measure` closure
    struct MockAdapter {
        protocol: AllocatedProtocol,
        calls: RefCell<Vec<&'static str>>,
        fail: bool,
    }

    impl MockAdapter {
        fn new(protocol: AllocatedProtocol) -> Self {
            Self {
                protocol,
                calls: RefCell::new(vec![]),
                fail: false,
            }
        }
    }

    impl LendingAdapter for MockAdapter {
        fn protocol(&self) -> AllocatedProtocol {
            self.protocol
        }

        fn deposit(&self, _amount: u64, signer_seeds: &[&[&[u8]]]) -> Result<()> {
            assert_eq!(signer_seeds[0][0], VAULT_SEED);
            self.calls.borrow_mut().push("deposit");
            if self.fail {
                return err!(YieldVaultError::ExternalProtocolFailure);
            }
            Ok(())
        }

        fn withdraw_all(&self, _signer_seeds: &[&[&[u8]]]) -> Result<()> {
            self.calls.borrow_mut().push("withdraw_all");
            if self.fail {
                return err!(YieldVaultError::ExternalProtocolFailure);
            }
            Ok(())
        }
    }

    fn mock_vault(accounted_balance: u64) -> VaultAccount {
        VaultAccount {
            owner: Pubkey::new_unique(),
            bump: 254,
            usdc_mint: Pubkey::new_unique(),
            external_position_handle: None,
            allocated_protocol: AllocatedProtocol::Idle,
            accounted_balance,
            deployed_amount: 0,
            position_shares: 0,
            is_initialized: true,
            _reserved: [0; 64],
        }
    }

    /// Hands out `snapshots` in order, one per call
    fn scripted(snapshots: Vec<Snapshot>) -> impl FnMut() -> Result<Snapshot> {
        let mut iter = snapshots.into_iter();
        move || Ok(iter.next().expect("measured more often than scripted"))
    }

    fn ledger(amount: u64) -> Snapshot {
        Snapshot {
            ledger: amount,
            receipts: None,
        }
    }

    fn code(err: Error) -> u32 {
        match err {
            Error::AnchorError(e) => e.error_code_number,
            Error::ProgramError(e) => panic!("unexpected program error {e:?}"),
        }
    }

    #[test]
    fn test_margin_pool_round_trip_without_yield() {
        let adapter = MockAdapter::new(AllocatedProtocol::ProtocolB);
        let mut vault = mock_vault(100_000_000);

        let deployed = deploy(
            &adapter,
            &mut vault,
            45_000_000,
            scripted(vec![ledger(100_000_000), ledger(55_000_000)]),
        )
        .unwrap();
        assert_eq!(deployed.amount, 45_000_000);
        assert_eq!(deployed.receipts, 45_000_000);
        assert_eq!(vault.accounted_balance, 100_000_000);
        assert_eq!(vault.deployed_amount, 45_000_000);
        assert_eq!(vault.allocated_protocol, AllocatedProtocol::ProtocolB);

        let redeemed = redeem(
            &adapter,
            &mut vault,
            scripted(vec![ledger(55_000_000), ledger(100_000_000)]),
        )
        .unwrap();
        assert_eq!(redeemed.amount, 45_000_000);
        assert_eq!(redeemed.ledger_after, 100_000_000);
        assert_eq!(vault.accounted_balance, 100_000_000);
        assert_eq!(vault.allocated_protocol, AllocatedProtocol::Idle);
        assert_eq!(*adapter.calls.borrow(), vec!["deposit", "withdraw_all"]);
    }

    #[test]
    fn test_lending_market_yield_flows_into_accounted_balance() {
        let adapter = MockAdapter::new(AllocatedProtocol::ProtocolA);
        let mut vault = mock_vault(1_000_000);

        deploy(
            &adapter,
            &mut vault,
            1_000_000,
            scripted(vec![
                Snapshot { ledger: 1_000_000, receipts: Some(0) },
                Snapshot { ledger: 0, receipts: Some(980_000) },
            ]),
        )
        .unwrap();
        assert_eq!(vault.position_shares, 980_000);

        redeem(
            &adapter,
            &mut vault,
            scripted(vec![
                Snapshot { ledger: 0, receipts: Some(980_000) },
                Snapshot { ledger: 1_004_500, receipts: Some(0) },
            ]),
        )
        .unwrap();
        assert_eq!(vault.accounted_balance, 1_004_500);
        assert_eq!(vault.position_shares, 0);
    }

    #[test]
    fn test_deploy_rejects_zero_amount() {
        let adapter = MockAdapter::new(AllocatedProtocol::ProtocolA);
        let mut vault = mock_vault(10);
        let err = deploy(&adapter, &mut vault, 0, scripted(vec![])).unwrap_err();
        assert_eq!(code(err), code(YieldVaultError::ZeroAmount.into()));
        assert!(adapter.calls.borrow().is_empty());
    }

    #[test]
    fn test_deploy_rejects_more_than_ledger() {
        let adapter = MockAdapter::new(AllocatedProtocol::ProtocolB);
        let mut vault = mock_vault(10);
        let err = deploy(&adapter, &mut vault, 11, scripted(vec![ledger(10)])).unwrap_err();
        assert_eq!(
            code(err),
            code(YieldVaultError::InsufficientLedgerBalance.into())
        );
        assert!(adapter.calls.borrow().is_empty());
    }

    #[test]
    fn test_deploy_rejects_second_protocol() {
        let adapter = MockAdapter::new(AllocatedProtocol::ProtocolA);
        let mut vault = mock_vault(10);
        vault
            .record_deploy(AllocatedProtocol::ProtocolB, 5, 5)
            .unwrap();
        let err = deploy(&adapter, &mut vault, 5, scripted(vec![])).unwrap_err();
        assert_eq!(code(err), code(YieldVaultError::WrongProtocol.into()));
    }

    #[test]
    fn test_redeem_requires_active_position() {
        let adapter = MockAdapter::new(AllocatedProtocol::ProtocolA);
        let mut vault = mock_vault(10);
        let err = redeem(&adapter, &mut vault, scripted(vec![])).unwrap_err();
        assert_eq!(code(err), code(YieldVaultError::WrongProtocol.into()));
    }

    #[test]
    fn test_failed_nested_call_leaves_state() {
        let mut adapter = MockAdapter::new(AllocatedProtocol::ProtocolB);
        adapter.fail = true;
        let mut vault = mock_vault(50);
        let err = deploy(&adapter, &mut vault, 20, scripted(vec![ledger(50)])).unwrap_err();
        assert_eq!(
            code(err),
            code(YieldVaultError::ExternalProtocolFailure.into())
        );
        assert_eq!(vault.deployed_amount, 0);
        assert_eq!(vault.allocated_protocol, AllocatedProtocol::Idle);
    }

    #[test]
    fn test_donation_absorbed_before_deploy() {
        let adapter = MockAdapter::new(AllocatedProtocol::ProtocolB);
        let mut vault = mock_vault(100);
        deploy(
            &adapter,
            &mut vault,
            100,
            scripted(vec![ledger(130), ledger(30)]),
        )
        .unwrap();
        assert_eq!(vault.accounted_balance, 130);
        assert_eq!(vault.deployed_amount, 100);
    }

    #[test]
    fn test_deltas() {
        assert_eq!(deploy_delta(ledger(10), ledger(4)).unwrap(), (6, 6));
        assert!(deploy_delta(ledger(4), ledger(10)).is_err());
        assert_eq!(redeem_delta(ledger(4), ledger(10)).unwrap(), 6);
        assert!(redeem_delta(ledger(4), ledger(4)).is_err());
        // receipts that were never held prove nothing
        assert!(redeem_delta(
            Snapshot { ledger: 4, receipts: Some(0) },
            Snapshot { ledger: 4, receipts: Some(0) },
        )
        .is_err());
    }

    #[test]
    fn test_lending_market_round_trip_without_yield() {
        let adapter = MockAdapter::new(AllocatedProtocol::ProtocolA);
        let mut vault = mock_vault(2_500_000);

        deploy(
            &adapter,
            &mut vault,
            2_500_000,
            scripted(vec![
                Snapshot { ledger: 2_500_000, receipts: Some(0) },
                Snapshot { ledger: 0, receipts: Some(2_430_000) },
            ]),
        )
        .unwrap();

        let redeemed = redeem(
            &adapter,
            &mut vault,
            scripted(vec![
                Snapshot { ledger: 0, receipts: Some(2_430_000) },
                Snapshot { ledger: 2_500_000, receipts: Some(0) },
            ]),
        )
        .unwrap();
        assert_eq!(redeemed.amount, 2_500_000);
        assert_eq!(redeemed.ledger_after, 2_500_000, "ledger back where it started");
        assert_eq!(vault.accounted_balance, 2_500_000);
        assert_eq!(vault.allocated_protocol, AllocatedProtocol::Idle);
        assert!(vault.check_invariant(2_500_000).is_ok());
    }

    #[test]
    fn test_total_loss_redeem_returns_vault_to_idle() {
        let adapter = MockAdapter::new(AllocatedProtocol::ProtocolA);
        let mut vault = mock_vault(1_000);

        deploy(
            &adapter,
            &mut vault,
            600,
            scripted(vec![
                Snapshot { ledger: 1_000, receipts: Some(0) },
                Snapshot { ledger: 400, receipts: Some(600) },
            ]),
        )
        .unwrap();

        // reserve decayed to zero: collateral burned, nothing paid out
        let redeemed = redeem(
            &adapter,
            &mut vault,
            scripted(vec![
                Snapshot { ledger: 400, receipts: Some(600) },
                Snapshot { ledger: 400, receipts: Some(0) },
            ]),
        )
        .unwrap();
        assert_eq!(redeemed.amount, 0);
        assert_eq!(vault.allocated_protocol, AllocatedProtocol::Idle);
        assert_eq!(vault.accounted_balance, 400);
        assert_eq!(vault.deployed_amount, 0);
        assert!(vault.check_invariant(400).is_ok());

        // idle ledger funds are reachable again
        vault.record_direct_withdraw(400).unwrap();
        assert_eq!(vault.accounted_balance, 0);
    }
}
