//! ABO/Rh blood types and the transfusion compatibility table.
//!
//! Compatibility is expressed as one explicit table keyed by the donor
//! type rather than ad-hoc checks at call sites, so every legal
//! donor→recipient pair is visible in a single place and the compiler
//! keeps the table total.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The eight ABO/Rh combinations.
///
/// This enum is deliberately *closed*: a unit or request can never carry a
/// blood type outside this set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BloodType {
    ONegative,
    OPositive,
    ANegative,
    APositive,
    BNegative,
    BPositive,
    AbNegative,
    AbPositive,
}

use BloodType::*;

impl BloodType {
    /// All blood types, in antigen order.
    pub const ALL: [BloodType; 8] = [
        ONegative, OPositive, ANegative, APositive, BNegative, BPositive, AbNegative, AbPositive,
    ];

    /// Recipient types a unit of this donor type may be transfused into.
    ///
    /// O− is the universal donor; AB+ the universal recipient. Rh-negative
    /// recipients only ever appear under Rh-negative donors.
    pub fn recipients(self) -> &'static [BloodType] {
        match self {
            ONegative => &[
                ONegative, OPositive, ANegative, APositive, BNegative, BPositive, AbNegative,
                AbPositive,
            ],
            OPositive => &[OPositive, APositive, BPositive, AbPositive],
            ANegative => &[ANegative, APositive, AbNegative, AbPositive],
            APositive => &[APositive, AbPositive],
            BNegative => &[BNegative, BPositive, AbNegative, AbPositive],
            BPositive => &[BPositive, AbPositive],
            AbNegative => &[AbNegative, AbPositive],
            AbPositive => &[AbPositive],
        }
    }

    /// Whether a unit of this type may be given to `recipient`.
    pub fn can_donate_to(self, recipient: BloodType) -> bool {
        self.recipients().contains(&recipient)
    }

    /// Donor types acceptable for a recipient of this type, exact match
    /// included.
    pub fn compatible_donors(self) -> Vec<BloodType> {
        Self::ALL
            .into_iter()
            .filter(|donor| donor.can_donate_to(self))
            .collect()
    }

    /// Whether the RhD antigen is present.
    pub fn is_rh_positive(self) -> bool {
        matches!(self, OPositive | APositive | BPositive | AbPositive)
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ONegative => "O-",
            OPositive => "O+",
            ANegative => "A-",
            APositive => "A+",
            BNegative => "B-",
            BPositive => "B+",
            AbNegative => "AB-",
            AbPositive => "AB+",
        };
        write!(f, "{label}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Independent statement of the immunology: the recipient must carry
    /// every ABO antigen the donor carries, and an Rh-negative recipient
    /// cannot take Rh-positive blood.
    fn compatible_by_rule(donor: BloodType, recipient: BloodType) -> bool {
        fn antigens(bt: BloodType) -> (bool, bool) {
            match bt {
                ONegative | OPositive => (false, false),
                ANegative | APositive => (true, false),
                BNegative | BPositive => (false, true),
                AbNegative | AbPositive => (true, true),
            }
        }

        let (donor_a, donor_b) = antigens(donor);
        let (recip_a, recip_b) = antigens(recipient);

        let abo_ok = (!donor_a || recip_a) && (!donor_b || recip_b);
        let rh_ok = !donor.is_rh_positive() || recipient.is_rh_positive();
        abo_ok && rh_ok
    }

    #[test]
    fn table_matches_immunology_for_all_64_pairs() {
        for donor in BloodType::ALL {
            for recipient in BloodType::ALL {
                assert_eq!(
                    donor.can_donate_to(recipient),
                    compatible_by_rule(donor, recipient),
                    "mismatch for {donor} -> {recipient}"
                );
            }
        }
    }

    #[test]
    fn o_negative_is_universal_donor() {
        assert_eq!(ONegative.recipients().len(), 8);
    }

    #[test]
    fn ab_positive_is_universal_recipient() {
        assert_eq!(AbPositive.compatible_donors().len(), 8);
    }

    #[test]
    fn every_type_is_self_compatible() {
        for bt in BloodType::ALL {
            assert!(bt.can_donate_to(bt), "{bt} should accept itself");
        }
    }

    #[test]
    fn ab_negative_accepts_the_four_negative_types() {
        let donors = AbNegative.compatible_donors();
        assert_eq!(donors, vec![ONegative, ANegative, BNegative, AbNegative]);
    }

    #[test]
    fn wire_names_use_screaming_snake_case() {
        let json = serde_json::to_string(&AbNegative).expect("serialize");
        assert_eq!(json, "\"AB_NEGATIVE\"");
        let back: BloodType = serde_json::from_str("\"O_POSITIVE\"").expect("deserialize");
        assert_eq!(back, OPositive);
    }
}
