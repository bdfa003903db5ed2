#![no_std]

mod error;
mod events;
mod storage;
mod yield_math;

use error::Error;
use events::{
    AdminRedeemedEvent, DistributorSetEvent, FactorUpdatedEvent, IssuedEvent, IssuerSetEvent,
    RedeemedEvent, TrancheCreatedEvent, TransferEvent, YieldClaimedEvent, YieldDistributedEvent,
};
use storage::{DataKey, Snapshot, Tranche, FACTOR_ONE, MAX_CLAIM_PERIODS, MAX_HOLDERS};
use yield_math::{current_face, pro_rata_share};

use soroban_sdk::{contract, contractimpl, token, vec, Address, Env, IntoVal, Map, Symbol, Vec};

#[contract]
pub struct TrancheToken;

#[contractimpl]
impl TrancheToken {
    // ============================================
    // INITIALIZATION & CAPABILITIES
    // ============================================

    /// Initialize the ledger
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    pub fn initialize(
        env: Env,
        admin: Address,
        payment_token: Address,
        compliance_registry: Address,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage()
            .instance()
            .set(&DataKey::PaymentToken, &payment_token);
        env.storage()
            .instance()
            .set(&DataKey::ComplianceRegistry, &compliance_registry);

        Ok(())
    }

    /// Grant the issuance capability (transfer agent)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not admin
    pub fn add_issuer(env: Env, issuer: Address) -> Result<(), Error> {
        Self::require_admin(&env)?;
        env.storage()
            .persistent()
            .set(&DataKey::Issuers(issuer.clone()), &true);
        env.events().publish(
            (Symbol::new(&env, "issuer_set"), issuer.clone()),
            IssuerSetEvent {
                account: issuer,
                granted: true,
            },
        );
        Ok(())
    }

    /// Revoke the issuance capability
    pub fn remove_issuer(env: Env, issuer: Address) -> Result<(), Error> {
        Self::require_admin(&env)?;
        env.storage()
            .persistent()
            .remove(&DataKey::Issuers(issuer.clone()));
        env.events().publish(
            (Symbol::new(&env, "issuer_set"), issuer.clone()),
            IssuerSetEvent {
                account: issuer,
                granted: false,
            },
        );
        Ok(())
    }

    /// Grant the distribution capability (the waterfall engine)
    pub fn add_distributor(env: Env, distributor: Address) -> Result<(), Error> {
        Self::require_admin(&env)?;
        env.storage()
            .persistent()
            .set(&DataKey::Distributors(distributor.clone()), &true);
        env.events().publish(
            (Symbol::new(&env, "distributor_set"), distributor.clone()),
            DistributorSetEvent {
                account: distributor,
                granted: true,
            },
        );
        Ok(())
    }

    /// Revoke the distribution capability
    pub fn remove_distributor(env: Env, distributor: Address) -> Result<(), Error> {
        Self::require_admin(&env)?;
        env.storage()
            .persistent()
            .remove(&DataKey::Distributors(distributor.clone()));
        env.events().publish(
            (Symbol::new(&env, "distributor_set"), distributor.clone()),
            DistributorSetEvent {
                account: distributor,
                granted: false,
            },
        );
        Ok(())
    }

    // ============================================
    // TRANCHE LIFECYCLE
    // ============================================

    /// Create a tranche for a deal
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `NotIssuer`: Caller lacks the issuance capability
    /// - `InvalidAmount`: original_face must be positive
    /// - `TrancheAlreadyExists`: Tranche ID already used
    pub fn create_tranche(
        env: Env,
        issuer: Address,
        tranche_id: u32,
        deal_id: u32,
        original_face: i128,
    ) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        Self::require_issuer(&env, &issuer)?;
        issuer.require_auth();

        if original_face <= 0 {
            return Err(Error::InvalidAmount);
        }
        if env
            .storage()
            .persistent()
            .has(&DataKey::Tranche(tranche_id))
        {
            return Err(Error::TrancheAlreadyExists);
        }

        let tranche = Tranche {
            deal_id,
            original_face,
            factor: FACTOR_ONE,
            current_period: 1,
            total_supply: 0,
        };
        env.storage()
            .persistent()
            .set(&DataKey::Tranche(tranche_id), &tranche);

        env.events().publish(
            (Symbol::new(&env, "tranche_created"), tranche_id),
            TrancheCreatedEvent {
                tranche_id,
                deal_id,
                original_face,
            },
        );

        Ok(())
    }

    /// Mint face-value units to a holder
    ///
    /// Issuance bypasses the compliance gateway by design; eligibility is
    /// enforced at subscription time, before this is called.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `NotIssuer`: Caller lacks the issuance capability
    /// - `InvalidAmount`: Amount <= 0
    /// - `TrancheNotFound`: Tranche doesn't exist
    /// - `ExceedsOriginalFace`: Supply would exceed the original face value
    /// - `HolderLimitReached`: Holder registry is full
    pub fn issue(
        env: Env,
        issuer: Address,
        tranche_id: u32,
        holder: Address,
        amount: i128,
    ) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        Self::require_issuer(&env, &issuer)?;
        issuer.require_auth();

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let mut tranche = Self::read_tranche(&env, tranche_id)?;
        let new_supply = tranche
            .total_supply
            .checked_add(amount)
            .ok_or(Error::InvalidAmount)?;
        if new_supply > tranche.original_face {
            return Err(Error::ExceedsOriginalFace);
        }

        let current = Self::read_balance(&env, tranche_id, &holder);
        if current == 0 {
            Self::add_holder(&env, tranche_id, &holder)?;
        }
        Self::write_balance(&env, tranche_id, &holder, current + amount);

        tranche.total_supply = new_supply;
        env.storage()
            .persistent()
            .set(&DataKey::Tranche(tranche_id), &tranche);

        env.events().publish(
            (Symbol::new(&env, "issued"), tranche_id),
            IssuedEvent {
                tranche_id,
                to: holder,
                amount,
            },
        );

        Ok(())
    }

    /// Transfer units between holders, gated by the compliance registry
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: Amount <= 0
    /// - `SelfTransfer`: Sender and receiver are the same account
    /// - `TrancheNotFound`: Tranche doesn't exist
    /// - `InsufficientBalance`: Not enough units
    /// - `SenderNotEligible` / `ReceiverNotEligible` / `SenderFrozen` /
    ///   `ReceiverFrozen` / `ComplianceRejected`: Gateway denied the transfer
    /// - `HolderLimitReached`: Holder registry is full
    pub fn transfer(
        env: Env,
        tranche_id: u32,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), Error> {
        Self::require_initialized(&env)?;

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        if from == to {
            return Err(Error::SelfTransfer);
        }

        from.require_auth();

        let tranche = Self::read_tranche(&env, tranche_id)?;

        let from_balance = Self::read_balance(&env, tranche_id, &from);
        if from_balance < amount {
            return Err(Error::InsufficientBalance);
        }

        // The gateway is consulted before any balance mutation; a rejection
        // leaves the ledger untouched.
        Self::check_compliance(&env, tranche.deal_id, &from, &to, amount)?;

        let to_balance = Self::read_balance(&env, tranche_id, &to);
        let new_to_balance = to_balance.checked_add(amount).ok_or(Error::InvalidAmount)?;
        let new_from_balance = from_balance - amount;

        if new_from_balance == 0 {
            Self::remove_holder(&env, tranche_id, &from);
        }
        if to_balance == 0 {
            Self::add_holder(&env, tranche_id, &to)?;
        }
        Self::write_balance(&env, tranche_id, &from, new_from_balance);
        Self::write_balance(&env, tranche_id, &to, new_to_balance);

        env.events().publish(
            (Symbol::new(&env, "transfer"), tranche_id),
            TransferEvent {
                tranche_id,
                from,
                to,
                amount,
            },
        );

        Ok(())
    }

    /// Voluntary burn by the holder
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: Amount <= 0
    /// - `TrancheNotFound`: Tranche doesn't exist
    /// - `InsufficientBalance`: Not enough units
    pub fn redeem(env: Env, tranche_id: u32, from: Address, amount: i128) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        from.require_auth();

        Self::burn(&env, tranche_id, &from, amount)?;

        env.events().publish(
            (Symbol::new(&env, "redeemed"), tranche_id),
            RedeemedEvent {
                tranche_id,
                from,
                amount,
            },
        );

        Ok(())
    }

    /// Administrative burn (regulatory or court-ordered action), logged
    /// distinctly from voluntary redemption
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not admin
    /// - `InvalidAmount`: Amount <= 0
    /// - `TrancheNotFound`: Tranche doesn't exist
    /// - `InsufficientBalance`: Not enough units
    pub fn redeem_from(
        env: Env,
        tranche_id: u32,
        holder: Address,
        amount: i128,
    ) -> Result<(), Error> {
        Self::require_admin(&env)?;

        Self::burn(&env, tranche_id, &holder, amount)?;

        env.events().publish(
            (Symbol::new(&env, "admin_redeemed"), tranche_id),
            AdminRedeemedEvent {
                tranche_id,
                holder,
                amount,
            },
        );

        Ok(())
    }

    // ============================================
    // DISTRIBUTION SURFACE (waterfall engine)
    // ============================================

    /// Set a tranche's amortization factor and advance its period
    ///
    /// The factor is a one-way ratchet: equal is allowed (a period with no
    /// principal), larger always fails.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `NotDistributor`: Caller lacks the distribution capability
    /// - `TrancheNotFound`: Tranche doesn't exist
    /// - `InvalidFactor`: Factor outside [0, FACTOR_ONE]
    /// - `FactorIncrease`: Factor larger than the current one
    pub fn update_factor(
        env: Env,
        operator: Address,
        tranche_id: u32,
        new_factor: i128,
    ) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        Self::require_distributor(&env, &operator)?;
        operator.require_auth();

        let mut tranche = Self::read_tranche(&env, tranche_id)?;

        if new_factor < 0 || new_factor > FACTOR_ONE {
            return Err(Error::InvalidFactor);
        }
        if new_factor > tranche.factor {
            return Err(Error::FactorIncrease);
        }

        let old_factor = tranche.factor;
        let period = tranche.current_period;
        tranche.factor = new_factor;
        tranche.current_period += 1;
        env.storage()
            .persistent()
            .set(&DataKey::Tranche(tranche_id), &tranche);

        env.events().publish(
            (Symbol::new(&env, "factor_updated"), tranche_id),
            FactorUpdatedEvent {
                tranche_id,
                old_factor,
                new_factor,
                period,
            },
        );

        Ok(())
    }

    /// Escrow a yield pool and snapshot every holder balance for the
    /// tranche's current period.
    ///
    /// The escrow pull and the snapshot write happen in this one invocation,
    /// so no transfer can land between them: balances moved after this call
    /// have no effect on the period's entitlements.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `NotDistributor`: Caller lacks the distribution capability
    /// - `InvalidAmount`: Amount <= 0
    /// - `TrancheNotFound`: Tranche doesn't exist
    /// - `SnapshotAlreadyTaken`: This period already has a distribution
    pub fn distribute_yield(
        env: Env,
        operator: Address,
        tranche_id: u32,
        amount: i128,
    ) -> Result<(), Error> {
        Self::require_initialized(&env)?;
        Self::require_distributor(&env, &operator)?;
        operator.require_auth();

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let tranche = Self::read_tranche(&env, tranche_id)?;
        let period = tranche.current_period;
        if env
            .storage()
            .persistent()
            .has(&DataKey::Snapshot(tranche_id, period))
        {
            return Err(Error::SnapshotAlreadyTaken);
        }

        let payment_token: Address = env
            .storage()
            .instance()
            .get(&DataKey::PaymentToken)
            .ok_or(Error::NotInitialized)?;
        let payment_client = token::Client::new(&env, &payment_token);
        payment_client.transfer(&operator, &env.current_contract_address(), &amount);

        let holders = Self::read_holders(&env, tranche_id);
        let mut balances: Map<Address, i128> = Map::new(&env);
        for holder in holders.iter() {
            let balance = Self::read_balance(&env, tranche_id, &holder);
            balances.set(holder, balance);
        }

        let snapshot = Snapshot {
            balances,
            total_supply: tranche.total_supply,
            yield_amount: amount,
        };
        env.storage()
            .persistent()
            .set(&DataKey::Snapshot(tranche_id, period), &snapshot);

        env.events().publish(
            (Symbol::new(&env, "yield_distributed"), tranche_id),
            YieldDistributedEvent {
                tranche_id,
                period,
                amount,
                total_supply: tranche.total_supply,
            },
        );

        Ok(())
    }

    // ============================================
    // YIELD CLAIMS
    // ============================================

    /// Claim all accumulated yield up to the latest distributed period
    ///
    /// Rejects (does not truncate) when the unclaimed span exceeds
    /// MAX_CLAIM_PERIODS; catch up with claim_yield_up_to instead.
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `TrancheNotFound`: Tranche doesn't exist
    /// - `NothingToClaim`: No unclaimed periods
    /// - `ClaimBatchTooLarge`: Unclaimed span exceeds the batch cap
    pub fn claim_yield(env: Env, tranche_id: u32, holder: Address) -> Result<i128, Error> {
        Self::require_initialized(&env)?;
        holder.require_auth();

        let tranche = Self::read_tranche(&env, tranche_id)?;
        let target = tranche.current_period - 1;
        Self::settle_claims(&env, tranche_id, &holder, target)
    }

    /// Claim accumulated yield up to (and including) a specific period
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `TrancheNotFound`: Tranche doesn't exist
    /// - `InvalidClaimPeriod`: Period not yet claimable
    /// - `NothingToClaim`: Period at or below the claim cursor
    /// - `ClaimBatchTooLarge`: Requested span exceeds the batch cap
    pub fn claim_yield_up_to(
        env: Env,
        tranche_id: u32,
        holder: Address,
        period: u32,
    ) -> Result<i128, Error> {
        Self::require_initialized(&env)?;
        holder.require_auth();

        let tranche = Self::read_tranche(&env, tranche_id)?;
        if period > tranche.current_period - 1 {
            return Err(Error::InvalidClaimPeriod);
        }
        Self::settle_claims(&env, tranche_id, &holder, period)
    }

    /// Yield a holder could claim right now, across all unclaimed periods
    pub fn claimable_yield(env: Env, tranche_id: u32, holder: Address) -> Result<i128, Error> {
        let tranche = Self::read_tranche(&env, tranche_id)?;
        let cursor = Self::read_cursor(&env, tranche_id, &holder);
        let target = tranche.current_period - 1;

        let mut total: i128 = 0;
        let mut period = cursor + 1;
        while period <= target {
            total = total
                .checked_add(Self::period_share(&env, tranche_id, &holder, period)?)
                .ok_or(Error::InvalidAmount)?;
            period += 1;
        }
        Ok(total)
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    /// Get balance for a holder in a tranche (face-value units)
    pub fn balance_of(env: Env, tranche_id: u32, holder: Address) -> i128 {
        Self::read_balance(&env, tranche_id, &holder)
    }

    /// Outstanding value of a holder's position: balance × factor
    pub fn current_face_value(env: Env, tranche_id: u32, holder: Address) -> Result<i128, Error> {
        let tranche = Self::read_tranche(&env, tranche_id)?;
        let balance = Self::read_balance(&env, tranche_id, &holder);
        current_face(balance, tranche.factor).ok_or(Error::InvalidAmount)
    }

    /// Outstanding value of the whole tranche: original_face × factor
    pub fn total_current_face_value(env: Env, tranche_id: u32) -> Result<i128, Error> {
        let tranche = Self::read_tranche(&env, tranche_id)?;
        current_face(tranche.original_face, tranche.factor).ok_or(Error::InvalidAmount)
    }

    /// Current amortization factor, FACTOR_ONE-scaled
    pub fn current_factor(env: Env, tranche_id: u32) -> Result<i128, Error> {
        Ok(Self::read_tranche(&env, tranche_id)?.factor)
    }

    /// Face value fixed at tranche creation
    pub fn original_face(env: Env, tranche_id: u32) -> Result<i128, Error> {
        Ok(Self::read_tranche(&env, tranche_id)?.original_face)
    }

    /// Deal a tranche belongs to
    pub fn tranche_deal(env: Env, tranche_id: u32) -> Result<u32, Error> {
        Ok(Self::read_tranche(&env, tranche_id)?.deal_id)
    }

    /// Check whether a tranche exists
    pub fn has_tranche(env: Env, tranche_id: u32) -> bool {
        env.storage()
            .persistent()
            .has(&DataKey::Tranche(tranche_id))
    }

    /// Get the full tranche record
    pub fn get_tranche(env: Env, tranche_id: u32) -> Result<Tranche, Error> {
        Self::read_tranche(&env, tranche_id)
    }

    /// Number of accounts currently holding this tranche, exposed for the
    /// compliance layer's holder-count rules
    pub fn holder_count(env: Env, tranche_id: u32) -> u32 {
        Self::read_holders(&env, tranche_id).len()
    }

    /// Get the immutable snapshot for a period
    pub fn get_snapshot(env: Env, tranche_id: u32, period: u32) -> Result<Snapshot, Error> {
        env.storage()
            .persistent()
            .get(&DataKey::Snapshot(tranche_id, period))
            .ok_or(Error::SnapshotNotFound)
    }

    /// Last period a holder has claimed (0 = nothing claimed yet)
    pub fn claim_cursor(env: Env, tranche_id: u32, holder: Address) -> u32 {
        Self::read_cursor(&env, tranche_id, &holder)
    }

    /// Check if address holds the issuance capability
    pub fn is_issuer(env: Env, account: Address) -> bool {
        env.storage()
            .persistent()
            .get::<DataKey, bool>(&DataKey::Issuers(account))
            .unwrap_or(false)
    }

    /// Check if address holds the distribution capability
    pub fn is_distributor(env: Env, account: Address) -> bool {
        env.storage()
            .persistent()
            .get::<DataKey, bool>(&DataKey::Distributors(account))
            .unwrap_or(false)
    }

    // ============================================
    // INTERNAL HELPERS
    // ============================================

    fn require_initialized(env: &Env) -> Result<(), Error> {
        if !env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::NotInitialized);
        }
        Ok(())
    }

    fn require_admin(env: &Env) -> Result<(), Error> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();
        Ok(())
    }

    fn require_issuer(env: &Env, account: &Address) -> Result<(), Error> {
        let granted = env
            .storage()
            .persistent()
            .get::<DataKey, bool>(&DataKey::Issuers(account.clone()))
            .unwrap_or(false);
        if !granted {
            return Err(Error::NotIssuer);
        }
        Ok(())
    }

    fn require_distributor(env: &Env, account: &Address) -> Result<(), Error> {
        let granted = env
            .storage()
            .persistent()
            .get::<DataKey, bool>(&DataKey::Distributors(account.clone()))
            .unwrap_or(false);
        if !granted {
            return Err(Error::NotDistributor);
        }
        Ok(())
    }

    fn read_tranche(env: &Env, tranche_id: u32) -> Result<Tranche, Error> {
        env.storage()
            .persistent()
            .get(&DataKey::Tranche(tranche_id))
            .ok_or(Error::TrancheNotFound)
    }

    fn read_balance(env: &Env, tranche_id: u32, holder: &Address) -> i128 {
        env.storage()
            .persistent()
            .get(&DataKey::Balance(tranche_id, holder.clone()))
            .unwrap_or(0)
    }

    fn write_balance(env: &Env, tranche_id: u32, holder: &Address, balance: i128) {
        let key = DataKey::Balance(tranche_id, holder.clone());
        if balance == 0 {
            env.storage().persistent().remove(&key);
        } else {
            env.storage().persistent().set(&key, &balance);
        }
    }

    fn read_holders(env: &Env, tranche_id: u32) -> Vec<Address> {
        env.storage()
            .persistent()
            .get(&DataKey::Holders(tranche_id))
            .unwrap_or(Vec::new(env))
    }

    fn add_holder(env: &Env, tranche_id: u32, holder: &Address) -> Result<(), Error> {
        let mut holders = Self::read_holders(env, tranche_id);
        if holders.len() >= MAX_HOLDERS {
            return Err(Error::HolderLimitReached);
        }
        holders.push_back(holder.clone());
        env.storage()
            .persistent()
            .set(&DataKey::Holders(tranche_id), &holders);
        Ok(())
    }

    fn remove_holder(env: &Env, tranche_id: u32, holder: &Address) {
        let mut holders = Self::read_holders(env, tranche_id);
        let mut found: Option<u32> = None;
        for i in 0..holders.len() {
            if holders.get_unchecked(i) == *holder {
                found = Some(i);
                break;
            }
        }
        if let Some(i) = found {
            holders.remove_unchecked(i);
            env.storage()
                .persistent()
                .set(&DataKey::Holders(tranche_id), &holders);
        }
    }

    fn read_cursor(env: &Env, tranche_id: u32, holder: &Address) -> u32 {
        env.storage()
            .persistent()
            .get(&DataKey::Cursor(tranche_id, holder.clone()))
            .unwrap_or(0)
    }

    fn check_compliance(
        env: &Env,
        deal_id: u32,
        from: &Address,
        to: &Address,
        amount: i128,
    ) -> Result<(), Error> {
        let registry: Address = env
            .storage()
            .instance()
            .get(&DataKey::ComplianceRegistry)
            .ok_or(Error::NotInitialized)?;

        let reason: u32 = env.invoke_contract(
            &registry,
            &Symbol::new(env, "validate_transfer"),
            vec![
                env,
                deal_id.into_val(env),
                from.to_val(),
                to.to_val(),
                amount.into_val(env),
            ],
        );

        match reason {
            0 => Ok(()),
            1 => Err(Error::SenderNotEligible),
            2 => Err(Error::ReceiverNotEligible),
            3 => Err(Error::SenderFrozen),
            4 => Err(Error::ReceiverFrozen),
            _ => Err(Error::ComplianceRejected),
        }
    }

    fn burn(env: &Env, tranche_id: u32, holder: &Address, amount: i128) -> Result<(), Error> {
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let mut tranche = Self::read_tranche(env, tranche_id)?;
        let balance = Self::read_balance(env, tranche_id, holder);
        if balance < amount {
            return Err(Error::InsufficientBalance);
        }

        let new_balance = balance - amount;
        if new_balance == 0 {
            Self::remove_holder(env, tranche_id, holder);
        }
        Self::write_balance(env, tranche_id, holder, new_balance);

        tranche.total_supply -= amount;
        env.storage()
            .persistent()
            .set(&DataKey::Tranche(tranche_id), &tranche);

        Ok(())
    }

    /// One period's entitlement for a holder. A period without a snapshot
    /// (no yield distributed) contributes zero.
    fn period_share(
        env: &Env,
        tranche_id: u32,
        holder: &Address,
        period: u32,
    ) -> Result<i128, Error> {
        let snapshot: Option<Snapshot> = env
            .storage()
            .persistent()
            .get(&DataKey::Snapshot(tranche_id, period));
        match snapshot {
            Some(snap) => {
                let balance = snap.balances.get(holder.clone()).unwrap_or(0);
                pro_rata_share(balance, snap.yield_amount, snap.total_supply)
                    .ok_or(Error::InvalidAmount)
            }
            None => Ok(0),
        }
    }

    /// Sum entitlements from the cursor to `target`, advance the cursor, and
    /// pay out. The cursor moves past every settled period, so replaying a
    /// period is impossible.
    fn settle_claims(
        env: &Env,
        tranche_id: u32,
        holder: &Address,
        target: u32,
    ) -> Result<i128, Error> {
        let cursor = Self::read_cursor(env, tranche_id, holder);
        if target <= cursor {
            return Err(Error::NothingToClaim);
        }
        if target - cursor > MAX_CLAIM_PERIODS {
            return Err(Error::ClaimBatchTooLarge);
        }

        let mut total: i128 = 0;
        let mut period = cursor + 1;
        while period <= target {
            total = total
                .checked_add(Self::period_share(env, tranche_id, holder, period)?)
                .ok_or(Error::InvalidAmount)?;
            period += 1;
        }

        env.storage()
            .persistent()
            .set(&DataKey::Cursor(tranche_id, holder.clone()), &target);

        if total > 0 {
            let payment_token: Address = env
                .storage()
                .instance()
                .get(&DataKey::PaymentToken)
                .ok_or(Error::NotInitialized)?;
            let payment_client = token::Client::new(env, &payment_token);
            payment_client.transfer(&env.current_contract_address(), holder, &total);
        }

        env.events().publish(
            (Symbol::new(env, "yield_claimed"), tranche_id, holder.clone()),
            YieldClaimedEvent {
                tranche_id,
                holder: holder.clone(),
                from_period: cursor + 1,
                to_period: target,
                amount: total,
            },
        );

        Ok(total)
    }
}
