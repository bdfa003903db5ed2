use soroban_sdk::{contracttype, Address};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EligibilitySetEvent {
    pub deal_id: u32,
    pub account: Address,
    pub eligible: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FreezeSetEvent {
    pub account: Address,
    pub frozen: bool,
}
