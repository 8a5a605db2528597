use anchor_lang::prelude::*;

use crate::{
    constants::*,
    events::*,
    gate::{self, InstructionKind, Principals},
    state::*,
};

/// Replace the address set of one external protocol
#[derive(Accounts)]
pub struct ConfigureProtocol<'info> {
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, VaultConfig>,
}

impl ConfigureProtocol<'_> {
    fn authorize(&self) -> Result<()> {
        gate::authorize(
            InstructionKind::ConfigureProtocol,
            &self.admin.key(),
            Principals {
                config: Some(&*self.config),
                ..Default::default()
            },
        )
    }
}

pub fn set_protocol_a_handler(
    ctx: Context<ConfigureProtocol>,
    market: LendingMarketConfig,
) -> Result<()> {
    ctx.accounts.authorize()?;

    let config = &mut ctx.accounts.config;
    config.protocol_a = market;

    msg!("Protocol A set to program {}", market.program);
    emit!(ProtocolConfigured {
        config: config.key(),
        protocol: AllocatedProtocol::ProtocolA,
        program: market.program,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

pub fn set_protocol_b_handler(
    ctx: Context<ConfigureProtocol>,
    pool: MarginPoolConfig,
) -> Result<()> {
    ctx.accounts.authorize()?;

    let config = &mut ctx.accounts.config;
    config.protocol_b = pool;

    msg!("Protocol B set to program {}", pool.program);
    emit!(ProtocolConfigured {
        config: config.key(),
        protocol: AllocatedProtocol::ProtocolB,
        program: pool.program,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
