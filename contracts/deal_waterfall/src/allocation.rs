use soroban_sdk::{Env, Vec};

use crate::storage::{BASIS_POINTS, FACTOR_ONE, MONTHS_PER_YEAR};

/// Fee taken off the top of an available pool
///
/// Formula: fee = available × fee_bps / 10,000
pub fn fee_amount(available: i128, fee_bps: u32) -> Option<i128> {
    available
        .checked_mul(fee_bps as i128)?
        .checked_div(BASIS_POINTS)
}

/// Interest due on a tranche for one period, including carried shortfall
///
/// Formula: due = face × coupon_bps × months / (10,000 × 12) + deferred
///
/// Example:
/// - face: 70,000,000, coupon: 4% (400 bps), monthly
/// - accrued: 70,000,000 × 0.04 / 12 = 233,333.33
pub fn interest_due(
    current_face: i128,
    coupon_rate_bps: u32,
    frequency_months: u32,
    deferred: i128,
) -> Option<i128> {
    let accrued = current_face
        .checked_mul(coupon_rate_bps as i128)?
        .checked_mul(frequency_months as i128)?
        .checked_div(BASIS_POINTS.checked_mul(MONTHS_PER_YEAR)?)?;
    accrued.checked_add(deferred)
}

/// Sequential principal: retire each face in seniority order until the pool
/// runs dry. A junior tranche sees nothing until every senior face is zero
/// or the pool is exhausted.
pub fn allocate_sequential(env: &Env, faces: &Vec<i128>, pool: i128) -> Vec<i128> {
    let mut remaining = if pool > 0 { pool } else { 0 };
    let mut allocations = Vec::new(env);
    for face in faces.iter() {
        let capacity = if face > 0 { face } else { 0 };
        let pay = if remaining <= capacity {
            remaining
        } else {
            capacity
        };
        remaining -= pay;
        allocations.push_back(pay);
    }
    allocations
}

/// Pro-rata principal: pool × face_i / Σ faces, capped at face_i.
///
/// Truncating division leaves the rounding dust in the pool; it flows to the
/// residual rather than being forced onto a tranche.
pub fn allocate_pro_rata(env: &Env, faces: &Vec<i128>, pool: i128) -> Option<Vec<i128>> {
    let mut total_face: i128 = 0;
    for face in faces.iter() {
        total_face = total_face.checked_add(face)?;
    }

    let mut allocations = Vec::new(env);
    if total_face <= 0 || pool <= 0 {
        for _ in faces.iter() {
            allocations.push_back(0);
        }
        return Some(allocations);
    }

    for face in faces.iter() {
        let share = pool.checked_mul(face)?.checked_div(total_face)?;
        let alloc = if share < face { share } else { face };
        allocations.push_back(alloc);
    }
    Some(allocations)
}

/// Factor after a principal payment, truncating
///
/// Formula: new_factor = (face − paid) × FACTOR_ONE / original_face
pub fn factor_after_payment(
    current_face: i128,
    principal_paid: i128,
    original_face: i128,
) -> Option<i128> {
    if original_face <= 0 {
        return None;
    }
    current_face
        .checked_sub(principal_paid)?
        .checked_mul(FACTOR_ONE)?
        .checked_div(original_face)
}
