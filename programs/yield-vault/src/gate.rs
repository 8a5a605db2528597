use anchor_lang::prelude::*;

use crate::{
    errors::YieldVaultError,
    state::{VaultAccount, VaultConfig},
};

/// Role an instruction requires from its signer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Owner,
    Keeper,
    Admin,
}

/// Instruction classes checked by the gate
///
/// `initialize` is absent: the vault address is derived from its signer, so
/// only the owner can create it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstructionKind {
    OpenPositionB,
    DepositDirect,
    WithdrawDirect,
    DepositProtocolB,
    WithdrawProtocolB,
    DeployProtocolA,
    RedeemProtocolA,
    ManageKeepers,
    ConfigureProtocol,
}

impl InstructionKind {
    pub fn required_role(self) -> Role {
        match self {
            InstructionKind::OpenPositionB
            | InstructionKind::DepositDirect
            | InstructionKind::WithdrawDirect
            | InstructionKind::DepositProtocolB
            | InstructionKind::WithdrawProtocolB => Role::Owner,
            InstructionKind::DeployProtocolA | InstructionKind::RedeemProtocolA => Role::Keeper,
            InstructionKind::ManageKeepers | InstructionKind::ConfigureProtocol => Role::Admin,
        }
    }
}

/// Whoever the signer can be checked against
#[derive(Clone, Copy, Default)]
pub struct Principals<'a> {
    pub vault: Option<&'a VaultAccount>,
    pub config: Option<&'a VaultConfig>,
}

/// Fails with `Unauthorized` unless `signer` holds the role `kind` requires
pub fn authorize(kind: InstructionKind, signer: &Pubkey, principals: Principals) -> Result<()> {
    let allowed = match kind.required_role() {
        Role::Owner => principals.vault.is_some_and(|v| v.owner == *signer),
        Role::Keeper => principals.config.is_some_and(|c| c.is_keeper(signer)),
        Role::Admin => principals.config.is_some_and(|c| c.admin == *signer),
    };
    if !allowed {
        msg!("{:?} rejected for signer {}", kind, signer);
        return err!(YieldVaultError::Unauthorized);
    }
    Ok(())
}
