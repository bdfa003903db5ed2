#![no_std]

mod error;
mod events;
mod storage;

use error::Error;
use events::{EligibilitySetEvent, FreezeSetEvent};
use storage::{
    DataKey, REASON_ALLOWED, REASON_RECEIVER_FROZEN, REASON_RECEIVER_NOT_ELIGIBLE,
    REASON_SENDER_FROZEN, REASON_SENDER_NOT_ELIGIBLE,
};

use soroban_sdk::{contract, contractimpl, Address, Env, Symbol};

#[contract]
pub struct ComplianceRegistry;

#[contractimpl]
impl ComplianceRegistry {
    // ============================================
    // INITIALIZATION & ADMIN
    // ============================================

    /// Initialize the registry
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    pub fn initialize(env: Env, admin: Address) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Admin, &admin);

        Ok(())
    }

    /// Mark an account eligible (or not) to hold a deal's tranches
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not admin
    pub fn set_eligibility(
        env: Env,
        deal_id: u32,
        account: Address,
        eligible: bool,
    ) -> Result<(), Error> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();

        let key = DataKey::Eligible(deal_id, account.clone());
        if eligible {
            env.storage().persistent().set(&key, &true);
        } else {
            env.storage().persistent().remove(&key);
        }

        env.events().publish(
            (Symbol::new(&env, "eligibility_set"), deal_id),
            EligibilitySetEvent {
                deal_id,
                account,
                eligible,
            },
        );

        Ok(())
    }

    /// Freeze or unfreeze an account across all deals
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not admin
    pub fn set_frozen(env: Env, account: Address, frozen: bool) -> Result<(), Error> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();

        let key = DataKey::Frozen(account.clone());
        if frozen {
            env.storage().persistent().set(&key, &true);
        } else {
            env.storage().persistent().remove(&key);
        }

        env.events().publish(
            (Symbol::new(&env, "freeze_set"), account.clone()),
            FreezeSetEvent { account, frozen },
        );

        Ok(())
    }

    // ============================================
    // TRANSFER VALIDATION
    // ============================================

    /// Validate a holder-to-holder transfer for a deal.
    ///
    /// Returns a reason code: 0 = allowed, otherwise the first failing rule.
    /// Freezes are checked before eligibility. The amount is not part of any
    /// rule in this registry but stays in the interface for rule engines
    /// that gate on size.
    pub fn validate_transfer(
        env: Env,
        deal_id: u32,
        from: Address,
        to: Address,
        _amount: i128,
    ) -> u32 {
        if Self::is_frozen(env.clone(), from.clone()) {
            return REASON_SENDER_FROZEN;
        }
        if Self::is_frozen(env.clone(), to.clone()) {
            return REASON_RECEIVER_FROZEN;
        }
        if !Self::is_eligible(env.clone(), deal_id, from) {
            return REASON_SENDER_NOT_ELIGIBLE;
        }
        if !Self::is_eligible(env, deal_id, to) {
            return REASON_RECEIVER_NOT_ELIGIBLE;
        }
        REASON_ALLOWED
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    /// Check if an account is eligible for a deal
    pub fn is_eligible(env: Env, deal_id: u32, account: Address) -> bool {
        env.storage()
            .persistent()
            .get::<DataKey, bool>(&DataKey::Eligible(deal_id, account))
            .unwrap_or(false)
    }

    /// Check if an account is frozen
    pub fn is_frozen(env: Env, account: Address) -> bool {
        env.storage()
            .persistent()
            .get::<DataKey, bool>(&DataKey::Frozen(account))
            .unwrap_or(false)
    }
}
