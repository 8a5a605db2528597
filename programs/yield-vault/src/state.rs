use anchor_lang::prelude::*;

use crate::{constants::*, errors::YieldVaultError};

/// Where a vault's deployed funds currently live
///
/// A vault is never split across two external protocols: funds are either
/// all in the custody ledger (`Idle`) or partly/fully deployed to exactly one
/// protocol.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AllocatedProtocol {
    #[default]
    Idle,
    /// Shared-reserve lending market (collateral receipts)
    ProtocolA,
    /// Per-account margin pool
    ProtocolB,
}

impl AllocatedProtocol {
    /// A deployment to `target` is allowed from Idle or when already in `target`
    pub fn can_deploy_to(self, target: AllocatedProtocol) -> bool {
        target != AllocatedProtocol::Idle
            && (self == AllocatedProtocol::Idle || self == target)
    }
}

/// Per-owner vault record, addressed by `["vault", owner]`
///
/// The custody ledger (associated token account of this PDA for `usdc_mint`)
/// is not stored: it is recomputed on every access.
#[account]
#[derive(Debug)]
pub struct VaultAccount {
    /// Controlling owner, immutable after `initialize`
    pub owner: Pubkey,              // 32 bytes

    /// Canonical bump of the vault PDA
    pub bump: u8,                   // 1 byte

    /// Stablecoin mint held by the custody ledger
    pub usdc_mint: Pubkey,          // 32 bytes

    /// Margin account opened on the margin pool with this vault as authority
    pub external_position_handle: Option<Pubkey>, // 33 bytes

    /// Current deployment target
    pub allocated_protocol: AllocatedProtocol, // 1 byte

    /// Total principal under management, in stablecoin base units
    pub accounted_balance: u64,     // 8 bytes

    /// Part of `accounted_balance` held by the active external position
    pub deployed_amount: u64,       // 8 bytes

    /// Receipt units held in the active external position
    pub position_shares: u64,       // 8 bytes

    pub is_initialized: bool,       // 1 byte

    // Padding for future upgrades
    pub _reserved: [u8; 64],        // 64 bytes
}

impl VaultAccount {
    /// First-time setup. A vault that already holds initialized data is left
    /// untouched and the call fails with `AlreadyInitialized`. Tokens already
    /// sitting at the ledger address are credited to the owner.
    pub fn initialize(
        &mut self,
        owner: Pubkey,
        bump: u8,
        usdc_mint: Pubkey,
        ledger_balance: u64,
    ) -> Result<()> {
        require!(!self.is_initialized, YieldVaultError::AlreadyInitialized);

        self.owner = owner;
        self.bump = bump;
        self.usdc_mint = usdc_mint;
        self.external_position_handle = None;
        self.allocated_protocol = AllocatedProtocol::Idle;
        self.accounted_balance = 0;
        self.deployed_amount = 0;
        self.position_shares = 0;
        self.is_initialized = true;
        self._reserved = [0; 64];

        self.absorb_surplus(ledger_balance)?;
        self.check_invariant(ledger_balance)
    }

    /// Folds tokens that reached the ledger outside this program (donations,
    /// stray transfers) into `accounted_balance`. A shortfall can only mean
    /// broken bookkeeping and is rejected. Returns the absorbed surplus.
    pub fn absorb_surplus(&mut self, ledger_balance: u64) -> Result<u64> {
        let held = ledger_balance
            .checked_add(self.deployed_amount)
            .ok_or(error!(YieldVaultError::MathOverflow))?;
        require!(
            held >= self.accounted_balance,
            YieldVaultError::InvariantViolation
        );
        let surplus = held - self.accounted_balance;
        self.accounted_balance = held;
        Ok(surplus)
    }

    /// Margin account linked by `open_position_b`
    pub fn position_handle(&self) -> Result<Pubkey> {
        self.external_position_handle
            .ok_or(error!(YieldVaultError::NoPositionOpened))
    }

    /// Direct deposit into the custody ledger
    pub fn record_direct_deposit(&mut self, amount: u64) -> Result<()> {
        require!(
            self.allocated_protocol == AllocatedProtocol::Idle,
            YieldVaultError::PositionActive
        );
        self.accounted_balance = self
            .accounted_balance
            .checked_add(amount)
            .ok_or(error!(YieldVaultError::MathOverflow))?;
        Ok(())
    }

    /// Direct withdrawal out of the custody ledger
    pub fn record_direct_withdraw(&mut self, amount: u64) -> Result<()> {
        require!(
            self.allocated_protocol == AllocatedProtocol::Idle,
            YieldVaultError::PositionActive
        );
        self.accounted_balance = self
            .accounted_balance
            .checked_sub(amount)
            .ok_or(error!(YieldVaultError::InsufficientLedgerBalance))?;
        Ok(())
    }

    pub fn ensure_can_deploy(&self, target: AllocatedProtocol) -> Result<()> {
        require!(
            self.allocated_protocol.can_deploy_to(target),
            YieldVaultError::WrongProtocol
        );
        Ok(())
    }

    /// Principal moved from the ledger into `target`
    ///
    /// `spent` is the measured ledger decrease, `receipts` the measured
    /// increase of position units. `accounted_balance` is not touched: the
    /// principal is reclassified, not altered.
    pub fn record_deploy(
        &mut self,
        target: AllocatedProtocol,
        spent: u64,
        receipts: u64,
    ) -> Result<()> {
        self.ensure_can_deploy(target)?;
        self.deployed_amount = self
            .deployed_amount
            .checked_add(spent)
            .ok_or(error!(YieldVaultError::MathOverflow))?;
        self.position_shares = self
            .position_shares
            .checked_add(receipts)
            .ok_or(error!(YieldVaultError::MathOverflow))?;
        self.allocated_protocol = target;
        Ok(())
    }

    /// Full position from `from` returned to the ledger
    ///
    /// `redeemed` is what actually arrived in the ledger; any yield or loss
    /// relative to `deployed_amount` flows into `accounted_balance`.
    /// Returns the new accounted balance.
    pub fn record_redeem(&mut self, from: AllocatedProtocol, redeemed: u64) -> Result<u64> {
        require!(
            from != AllocatedProtocol::Idle && self.allocated_protocol == from,
            YieldVaultError::WrongProtocol
        );
        self.accounted_balance = self
            .accounted_balance
            .checked_sub(self.deployed_amount)
            .ok_or(error!(YieldVaultError::MathOverflow))?
            .checked_add(redeemed)
            .ok_or(error!(YieldVaultError::MathOverflow))?;
        self.deployed_amount = 0;
        self.position_shares = 0;
        self.allocated_protocol = AllocatedProtocol::Idle;
        Ok(self.accounted_balance)
    }

    /// `accounted_balance == ledger_balance + deployed_amount`, and an idle
    /// vault holds no position
    pub fn check_invariant(&self, ledger_balance: u64) -> Result<()> {
        let expected = ledger_balance
            .checked_add(self.deployed_amount)
            .ok_or(error!(YieldVaultError::MathOverflow))?;
        require!(
            self.accounted_balance == expected,
            YieldVaultError::InvariantViolation
        );
        if self.allocated_protocol == AllocatedProtocol::Idle {
            require!(
                self.deployed_amount == 0 && self.position_shares == 0,
                YieldVaultError::InvariantViolation
            );
        }
        Ok(())
    }
}

/// Accounts of the shared-reserve lending market (Protocol A)
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LendingMarketConfig {
    pub program: Pubkey,
    pub lending_market: Pubkey,
    pub lending_market_authority: Pubkey,
    pub reserve: Pubkey,
    pub reserve_liquidity_supply: Pubkey,
    pub collateral_mint: Pubkey,
}

impl LendingMarketConfig {
    pub fn is_configured(&self) -> bool {
        self.program != Pubkey::default()
    }
}

/// Accounts of the per-account margin pool (Protocol B)
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MarginPoolConfig {
    pub program: Pubkey,
    pub group: Pubkey,
    pub bank: Pubkey,
    pub liquidity_vault: Pubkey,
    pub liquidity_vault_authority: Pubkey,
}

impl MarginPoolConfig {
    pub fn is_configured(&self) -> bool {
        self.program != Pubkey::default()
    }
}

/// Program-wide configuration, addressed by `["config"]`
///
/// Holds the keeper allow-list and the fixed addresses of each external
/// protocol so adapter accounts are validated by address.
#[account]
#[derive(Debug)]
pub struct VaultConfig {
    /// Manages keepers and protocol addresses
    pub admin: Pubkey,                      // 32 bytes

    /// Keepers allowed to rebalance Protocol A, at most MAX_KEEPERS
    pub keepers: Vec<Pubkey>,               // 4 + (n * 32) bytes

    pub protocol_a: LendingMarketConfig,    // 192 bytes

    pub protocol_b: MarginPoolConfig,       // 160 bytes

    pub bump: u8,                           // 1 byte

    pub _reserved: [u8; 64],                // 64 bytes
}

impl VaultConfig {
    pub fn is_keeper(&self, key: &Pubkey) -> bool {
        self.keepers.iter().any(|k| k == key)
    }

    pub fn add_keeper(&mut self, keeper: Pubkey) -> Result<()> {
        require!(!self.is_keeper(&keeper), YieldVaultError::KeeperAlreadyExists);
        require!(
            self.keepers.len() < MAX_KEEPERS,
            YieldVaultError::KeeperListFull
        );
        self.keepers.push(keeper);
        Ok(())
    }

    pub fn remove_keeper(&mut self, keeper: &Pubkey) -> Result<()> {
        let index = self
            .keepers
            .iter()
            .position(|k| k == keeper)
            .ok_or(error!(YieldVaultError::KeeperNotFound))?;
        self.keepers.remove(index);
        Ok(())
    }
}
