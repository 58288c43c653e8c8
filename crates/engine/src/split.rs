//! Expense-split calculator.
//!
//! A pure module: no I/O, no store access. Given a total amount and a split
//! policy it produces one share per participant whose amounts sum to the
//! total **exactly** (integer cents, no remainder lost or gained).
//!
//! Rounding remainder policy: largest-remainder method. Each share is
//! floored to whole cents first, then the leftover cents are handed out one
//! each to the shares with the largest fractional remainders, ties broken by
//! participant order.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Cents, EngineError, ResultEngine};

/// How a shared expense is divided across household members.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitPolicy {
    #[default]
    Equal,
    Ratio,
    Custom,
}

impl SplitPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Ratio => "ratio",
            Self::Custom => "custom",
        }
    }
}

impl TryFrom<&str> for SplitPolicy {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "equal" => Ok(Self::Equal),
            "ratio" => Ok(Self::Ratio),
            "custom" => Ok(Self::Custom),
            other => Err(EngineError::Validation(format!(
                "invalid split policy: {other}"
            ))),
        }
    }
}

/// A member taking part in a split, with their ratio weight (0..=1).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Participant {
    pub member_id: Uuid,
    pub ratio: f64,
}

/// A caller-supplied share for the custom policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomSplit {
    pub member_id: Uuid,
    pub amount_cents: i64,
}

/// One computed share of an expense.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitShare {
    pub member_id: Uuid,
    pub amount: Cents,
    /// True only for the payer's own share.
    pub paid: bool,
}

/// Ratios are scaled to integer weights with this precision before the
/// largest-remainder pass, keeping the whole computation deterministic.
const RATIO_SCALE: f64 = 1_000_000.0;

/// Computes per-member shares of `amount` under `policy`.
///
/// - `Equal` divides evenly; leftover cents go to the first participants.
/// - `Ratio` weights each share by the participant's ratio over the ratio
///   sum; remainders are distributed largest-first.
/// - `Custom` uses `custom_splits` verbatim and fails with
///   [`EngineError::SplitMismatch`] unless they sum to `amount` exactly.
///
/// The returned shares preserve participant order and carry `paid = true`
/// only on the payer's entry.
pub fn compute_splits(
    amount: Cents,
    policy: SplitPolicy,
    participants: &[Participant],
    custom_splits: Option<&[CustomSplit]>,
    paid_by: Uuid,
) -> ResultEngine<Vec<SplitShare>> {
    if !amount.is_positive() {
        return Err(EngineError::Validation(
            "split amount must be > 0".to_string(),
        ));
    }

    match policy {
        SplitPolicy::Custom => {
            let custom = custom_splits.ok_or_else(|| {
                EngineError::Validation("custom policy requires custom splits".to_string())
            })?;
            if custom.is_empty() {
                return Err(EngineError::Validation(
                    "custom splits must not be empty".to_string(),
                ));
            }
            let total: i64 = custom.iter().map(|s| s.amount_cents).sum();
            if total != amount.cents() {
                return Err(EngineError::SplitMismatch(format!(
                    "custom splits sum to {} but expense amount is {}",
                    Cents::new(total),
                    amount
                )));
            }
            Ok(custom
                .iter()
                .map(|s| SplitShare {
                    member_id: s.member_id,
                    amount: Cents::new(s.amount_cents),
                    paid: s.member_id == paid_by,
                })
                .collect())
        }
        SplitPolicy::Equal => {
            let weights = vec![1i64; participants.len()];
            proportional_shares(amount, participants, &weights, paid_by)
        }
        SplitPolicy::Ratio => {
            let weights: Vec<i64> = participants
                .iter()
                .map(|p| {
                    if !(0.0..=1.0).contains(&p.ratio) {
                        return Err(EngineError::Validation(format!(
                            "split ratio out of range for member {}: {}",
                            p.member_id, p.ratio
                        )));
                    }
                    Ok((p.ratio * RATIO_SCALE).round() as i64)
                })
                .collect::<ResultEngine<_>>()?;
            proportional_shares(amount, participants, &weights, paid_by)
        }
    }
}

/// Largest-remainder allocation of `amount` over integer `weights`.
fn proportional_shares(
    amount: Cents,
    participants: &[Participant],
    weights: &[i64],
    paid_by: Uuid,
) -> ResultEngine<Vec<SplitShare>> {
    if participants.is_empty() {
        return Err(EngineError::Validation(
            "no active household members to split between".to_string(),
        ));
    }
    let weight_sum: i128 = weights.iter().map(|w| i128::from(*w)).sum();
    if weight_sum <= 0 {
        return Err(EngineError::Validation(
            "split ratios must sum to more than zero".to_string(),
        ));
    }

    let total = i128::from(amount.cents());
    let mut floors: Vec<i64> = Vec::with_capacity(participants.len());
    // (remainder, original index); sorted descending, index ascending on ties.
    let mut remainders: Vec<(i128, usize)> = Vec::with_capacity(participants.len());
    let mut allocated: i128 = 0;

    for (index, weight) in weights.iter().enumerate() {
        let numerator = total * i128::from(*weight);
        let floor = numerator / weight_sum;
        floors.push(floor as i64);
        remainders.push((numerator % weight_sum, index));
        allocated += floor;
    }

    let mut leftover = (total - allocated) as i64;
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    for (_, index) in remainders {
        if leftover == 0 {
            break;
        }
        floors[index] += 1;
        leftover -= 1;
    }

    Ok(participants
        .iter()
        .zip(floors)
        .map(|(participant, cents)| SplitShare {
            member_id: participant.member_id,
            amount: Cents::new(cents),
            paid: participant.member_id == paid_by,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(n: usize) -> Vec<Participant> {
        (0..n)
            .map(|_| Participant {
                member_id: Uuid::new_v4(),
                ratio: 0.5,
            })
            .collect()
    }

    fn sum(shares: &[SplitShare]) -> i64 {
        shares.iter().map(|s| s.amount.cents()).sum()
    }

    #[test]
    fn equal_split_is_exact_with_remainder() {
        let participants = members(3);
        let shares = compute_splits(
            Cents::new(100),
            SplitPolicy::Equal,
            &participants,
            None,
            participants[0].member_id,
        )
        .unwrap();

        assert_eq!(sum(&shares), 100);
        // 100 / 3 floors to 33; the leftover cent goes to the first member.
        assert_eq!(shares[0].amount.cents(), 34);
        assert_eq!(shares[1].amount.cents(), 33);
        assert_eq!(shares[2].amount.cents(), 33);
        assert!(shares[0].paid);
        assert!(!shares[1].paid);
    }

    #[test]
    fn equal_split_over_many_members_never_drifts() {
        for n in 1..=11 {
            let participants = members(n);
            let shares = compute_splits(
                Cents::new(9999),
                SplitPolicy::Equal,
                &participants,
                None,
                participants[0].member_id,
            )
            .unwrap();
            assert_eq!(sum(&shares), 9999, "drift with {n} members");
        }
    }

    #[test]
    fn ratio_split_is_proportional_and_exact() {
        let mut participants = members(2);
        participants[0].ratio = 0.7;
        participants[1].ratio = 0.3;

        let shares = compute_splits(
            Cents::new(10_000),
            SplitPolicy::Ratio,
            &participants,
            None,
            participants[1].member_id,
        )
        .unwrap();

        assert_eq!(sum(&shares), 10_000);
        assert_eq!(shares[0].amount.cents(), 7_000);
        assert_eq!(shares[1].amount.cents(), 3_000);
        assert!(shares[1].paid);
    }

    #[test]
    fn ratio_split_distributes_remainder_to_largest() {
        let mut participants = members(3);
        participants[0].ratio = 0.5;
        participants[1].ratio = 0.25;
        participants[2].ratio = 0.25;

        let shares = compute_splits(
            Cents::new(101),
            SplitPolicy::Ratio,
            &participants,
            None,
            participants[0].member_id,
        )
        .unwrap();

        assert_eq!(sum(&shares), 101);
        // 50.5 / 25.25 / 25.25 → floors 50/25/25, extra cent to the largest
        // remainder (index 0).
        assert_eq!(shares[0].amount.cents(), 51);
    }

    #[test]
    fn ratio_split_stays_exact_with_skewed_ratios() {
        let ratio_sets: &[&[f64]] = &[
            &[0.999_999, 0.000_001],
            &[0.333_333, 0.333_333, 0.333_334],
            &[0.1, 0.2, 0.3, 0.4],
            &[0.000_001, 0.000_001, 0.000_001],
            &[1.0, 0.000_001, 0.5],
        ];
        for ratios in ratio_sets {
            let mut participants = members(ratios.len());
            for (participant, ratio) in participants.iter_mut().zip(ratios.iter()) {
                participant.ratio = *ratio;
            }
            for amount in [1, 3, 101, 9_999, 1_000_003] {
                let shares = compute_splits(
                    Cents::new(amount),
                    SplitPolicy::Ratio,
                    &participants,
                    None,
                    participants[0].member_id,
                )
                .unwrap();
                assert_eq!(sum(&shares), amount, "drift with ratios {ratios:?}");
                assert!(
                    shares.iter().all(|s| s.amount.cents() >= 0),
                    "negative share with ratios {ratios:?}"
                );
            }
        }
    }

    #[test]
    fn zero_ratios_rejected() {
        let mut participants = members(2);
        participants[0].ratio = 0.0;
        participants[1].ratio = 0.0;

        let err = compute_splits(
            Cents::new(100),
            SplitPolicy::Ratio,
            &participants,
            None,
            participants[0].member_id,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn custom_split_mismatch_fails() {
        let participants = members(2);
        let custom = vec![
            CustomSplit {
                member_id: participants[0].member_id,
                amount_cents: 60_00,
            },
            CustomSplit {
                member_id: participants[1].member_id,
                amount_cents: 30_00,
            },
        ];

        let err = compute_splits(
            Cents::new(100_00),
            SplitPolicy::Custom,
            &participants,
            Some(&custom),
            participants[0].member_id,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::SplitMismatch(_)));
    }

    #[test]
    fn custom_split_exact_passes_verbatim() {
        let participants = members(2);
        let custom = vec![
            CustomSplit {
                member_id: participants[0].member_id,
                amount_cents: 75_00,
            },
            CustomSplit {
                member_id: participants[1].member_id,
                amount_cents: 25_00,
            },
        ];

        let shares = compute_splits(
            Cents::new(100_00),
            SplitPolicy::Custom,
            &participants,
            Some(&custom),
            participants[1].member_id,
        )
        .unwrap();

        assert_eq!(shares[0].amount.cents(), 75_00);
        assert!(!shares[0].paid);
        assert!(shares[1].paid);
    }

    #[test]
    fn empty_participants_rejected() {
        let err = compute_splits(Cents::new(100), SplitPolicy::Equal, &[], None, Uuid::new_v4())
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }
}
