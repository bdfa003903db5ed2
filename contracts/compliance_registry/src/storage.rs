use soroban_sdk::{contracttype, Address};

// Reason codes returned by validate_transfer. Zero means the transfer is
// allowed; any other value names the failing party and rule.
pub const REASON_ALLOWED: u32 = 0;
pub const REASON_SENDER_NOT_ELIGIBLE: u32 = 1;
pub const REASON_RECEIVER_NOT_ELIGIBLE: u32 = 2;
pub const REASON_SENDER_FROZEN: u32 = 3;
pub const REASON_RECEIVER_FROZEN: u32 = 4;

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Initialized,
    Eligible(u32, Address), // (deal_id, account)
    Frozen(Address),
}
