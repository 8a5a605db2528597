use anchor_lang::prelude::*;

/// Custom error codes for the Yield Vault program
///
/// Every variant aborts the whole instruction; nothing is committed.
#[error_code]
pub enum YieldVaultError {
    #[msg("Unauthorized - signer does not hold the role this instruction requires")]
    Unauthorized,

    #[msg("Supplied account does not match the derived or configured address")]
    AccountMismatch,

    #[msg("Vault is already initialized for this owner")]
    AlreadyInitialized,

    #[msg("Owner token account balance is below the requested amount")]
    InsufficientFunds,

    #[msg("Custody ledger balance is below the requested amount")]
    InsufficientLedgerBalance,

    #[msg("No external margin position has been opened for this vault")]
    NoPositionOpened,

    #[msg("Nested call into the external lending protocol failed")]
    ExternalProtocolFailure,

    #[msg("Amount must be greater than zero")]
    ZeroAmount,

    #[msg("Funds are deployed to an external protocol - redeem them first")]
    PositionActive,

    #[msg("Vault funds are allocated to a different protocol")]
    WrongProtocol,

    #[msg("Nothing was redeemed from the external position")]
    NothingToRedeem,

    #[msg("An external margin position is already linked to this vault")]
    PositionAlreadyOpened,

    #[msg("External protocol addresses have not been configured")]
    ProtocolNotConfigured,

    #[msg("Keeper is already in the allow-list")]
    KeeperAlreadyExists,

    #[msg("Keeper not found in the allow-list")]
    KeeperNotFound,

    #[msg("Keeper allow-list is full")]
    KeeperListFull,

    #[msg("Math overflow occurred during calculation")]
    MathOverflow,

    #[msg("Accounted balance disagrees with custody ledger and deployed amount")]
    InvariantViolation,
}
