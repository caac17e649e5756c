use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Risk tolerance label, ordered from most to least conservative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskBucket {
    #[serde(rename = "Risk Averse")]
    RiskAverse,
    #[serde(rename = "Average")]
    Average,
    #[serde(rename = "Above Average")]
    AboveAverage,
    #[serde(rename = "High Risk Appetite")]
    HighRiskAppetite,
}

impl RiskBucket {
    pub const ORDER: [RiskBucket; 4] = [
        RiskBucket::RiskAverse,
        RiskBucket::Average,
        RiskBucket::AboveAverage,
        RiskBucket::HighRiskAppetite,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RiskBucket::RiskAverse => "Risk Averse",
            RiskBucket::Average => "Average",
            RiskBucket::AboveAverage => "Above Average",
            RiskBucket::HighRiskAppetite => "High Risk Appetite",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ORDER
            .into_iter()
            .find(|bucket| bucket.label() == label)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// One step more conservative; `None` when already the lowest bucket.
    pub fn step_down(self) -> Option<Self> {
        self.index()
            .checked_sub(1)
            .map(|index| Self::ORDER[index])
    }

    pub fn allocation(self) -> Allocation {
        let (equity, debt, alternatives) = match self {
            RiskBucket::RiskAverse => ((10, 30), (60, 80), (5, 10)),
            RiskBucket::Average => ((35, 55), (35, 55), (5, 10)),
            RiskBucket::AboveAverage => ((60, 75), (20, 35), (5, 10)),
            RiskBucket::HighRiskAppetite => ((80, 95), (5, 15), (0, 5)),
        };

        Allocation {
            equity: PercentRange::new(equity.0, equity.1),
            debt: PercentRange::new(debt.0, debt.1),
            alternatives: PercentRange::new(alternatives.0, alternatives.1),
        }
    }
}

impl fmt::Display for RiskBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Allocation for a bucket label, falling back to `Average` for labels outside the known set.
pub fn asset_allocation_for(label: &str) -> Allocation {
    RiskBucket::from_label(label)
        .unwrap_or(RiskBucket::Average)
        .allocation()
}

/// Inclusive percentage band rendered as `"{low}-{high}%"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PercentRange {
    pub low: u8,
    pub high: u8,
}

impl PercentRange {
    pub const fn new(low: u8, high: u8) -> Self {
        Self { low, high }
    }
}

impl fmt::Display for PercentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}%", self.low, self.high)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a percentage range like 10-30%")]
pub struct RangeParseError(pub String);

impl FromStr for PercentRange {
    type Err = RangeParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || RangeParseError(raw.to_string());
        let body = raw.trim().strip_suffix('%').ok_or_else(invalid)?;
        let (low, high) = body.split_once('-').ok_or_else(invalid)?;
        let low = low.trim().parse::<u8>().map_err(|_| invalid())?;
        let high = high.trim().parse::<u8>().map_err(|_| invalid())?;
        if low > high || high > 100 {
            return Err(invalid());
        }
        Ok(Self { low, high })
    }
}

impl From<PercentRange> for String {
    fn from(range: PercentRange) -> Self {
        range.to_string()
    }
}

impl TryFrom<String> for PercentRange {
    type Error = RangeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Suggested split across asset classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub equity: PercentRange,
    pub debt: PercentRange,
    pub alternatives: PercentRange,
}

impl Allocation {
    /// Rewrites equity to `10-{max}%` when its upper bound exceeds `max`.
    pub fn cap_equity(mut self, max: u8) -> Self {
        if self.equity.high > max {
            self.equity = PercentRange::new(EQUITY_CAP_FLOOR, max);
        }
        self
    }
}

const EQUITY_CAP_FLOOR: u8 = 10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_label_falls_back_to_average() {
        assert_eq!(
            asset_allocation_for("Reckless"),
            RiskBucket::Average.allocation()
        );
        assert_eq!(asset_allocation_for(""), RiskBucket::Average.allocation());
        assert_eq!(
            asset_allocation_for("Above Average"),
            RiskBucket::AboveAverage.allocation()
        );
    }

    #[test]
    fn buckets_render_published_ranges() {
        let rendered: Vec<String> = RiskBucket::ORDER
            .into_iter()
            .map(|bucket| {
                let allocation = bucket.allocation();
                format!(
                    "{} / {} / {}",
                    allocation.equity, allocation.debt, allocation.alternatives
                )
            })
            .collect();

        assert_eq!(
            rendered,
            vec![
                "10-30% / 60-80% / 5-10%",
                "35-55% / 35-55% / 5-10%",
                "60-75% / 20-35% / 5-10%",
                "80-95% / 5-15% / 0-5%",
            ]
        );
    }

    #[test]
    fn step_down_stops_at_risk_averse() {
        assert_eq!(
            RiskBucket::HighRiskAppetite.step_down(),
            Some(RiskBucket::AboveAverage)
        );
        assert_eq!(RiskBucket::Average.step_down(), Some(RiskBucket::RiskAverse));
        assert_eq!(RiskBucket::RiskAverse.step_down(), None);
    }

    #[test]
    fn equity_cap_uses_fixed_floor() {
        let capped = RiskBucket::AboveAverage.allocation().cap_equity(40);
        assert_eq!(capped.equity.to_string(), "10-40%");

        let untouched = RiskBucket::RiskAverse.allocation().cap_equity(40);
        assert_eq!(untouched.equity.to_string(), "10-30%");
    }

    #[test]
    fn rendered_allocations_parse_back_unchanged() {
        for bucket in RiskBucket::ORDER {
            let allocation = bucket.allocation();
            let json = serde_json::to_string(&allocation).expect("serializes");
            let parsed: Allocation = serde_json::from_str(&json).expect("parses");
            assert_eq!(parsed, allocation);
            assert_eq!(serde_json::to_string(&parsed).expect("serializes"), json);
        }
    }

    #[test]
    fn malformed_ranges_are_rejected() {
        assert!("10-30".parse::<PercentRange>().is_err());
        assert!("30-10%".parse::<PercentRange>().is_err());
        assert!("ten-30%".parse::<PercentRange>().is_err());
        assert_eq!(
            "5-15%".parse::<PercentRange>(),
            Ok(PercentRange::new(5, 15))
        );
    }
}
