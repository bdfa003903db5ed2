use soroban_sdk::{contracttype, Address};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrancheCreatedEvent {
    pub tranche_id: u32,
    pub deal_id: u32,
    pub original_face: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IssuedEvent {
    pub tranche_id: u32,
    pub to: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransferEvent {
    pub tranche_id: u32,
    pub from: Address,
    pub to: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RedeemedEvent {
    pub tranche_id: u32,
    pub from: Address,
    pub amount: i128,
}

/// Administrative burn, distinct from voluntary redemption
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminRedeemedEvent {
    pub tranche_id: u32,
    pub holder: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FactorUpdatedEvent {
    pub tranche_id: u32,
    pub old_factor: i128,
    pub new_factor: i128,
    pub period: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct YieldDistributedEvent {
    pub tranche_id: u32,
    pub period: u32,
    pub amount: i128,
    pub total_supply: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct YieldClaimedEvent {
    pub tranche_id: u32,
    pub holder: Address,
    pub from_period: u32,
    pub to_period: u32,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IssuerSetEvent {
    pub account: Address,
    pub granted: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DistributorSetEvent {
    pub account: Address,
    pub granted: bool,
}
