use soroban_sdk::{contracttype, Address, Map};

// Constants
pub const SCALE: i128 = 10_000_000; // 7 decimals
pub const FACTOR_ONE: i128 = 1 * SCALE; // 1.0000000, a fully outstanding tranche

/// Maximum unclaimed periods a single claim call may settle. A holder further
/// behind must catch up with claim_yield_up_to in batches.
pub const MAX_CLAIM_PERIODS: u32 = 100;

/// Maximum holders per tranche. Keeps the balance snapshot taken by
/// distribute_yield bounded.
pub const MAX_HOLDERS: u32 = 100;

#[contracttype]
#[derive(Clone, Debug)]
pub struct Tranche {
    /// Deal this tranche belongs to
    pub deal_id: u32,
    /// Face value at issuance, fixed for the life of the tranche
    pub original_face: i128,
    /// Outstanding fraction of original_face, FACTOR_ONE-scaled.
    /// Never increases.
    pub factor: i128,
    /// Next period to receive a distribution. Starts at 1; advanced by
    /// update_factor.
    pub current_period: u32,
    /// Sum of all holder balances (face-value-equivalent units)
    pub total_supply: i128,
}

/// Balances locked in at the instant a period's yield was distributed.
/// Written once, never mutated, retained forever for late claimers.
#[contracttype]
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub balances: Map<Address, i128>,
    pub total_supply: i128,
    pub yield_amount: i128,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    PaymentToken,
    ComplianceRegistry,
    Initialized,
    Issuers(Address),
    Distributors(Address),
    Tranche(u32),
    Balance(u32, Address), // (tranche_id, holder)
    Holders(u32),          // all holders with balance > 0
    Snapshot(u32, u32),    // (tranche_id, period)
    Cursor(u32, Address),  // (tranche_id, holder) -> last period claimed
}
