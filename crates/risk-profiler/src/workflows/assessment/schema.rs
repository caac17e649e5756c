//! Questionnaire editions and their static scoring tables.
//!
//! Both editions read from the same tables; the 25-question edition adds the financial
//! information and investment experience sections on top of the original twelve.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Questionnaire edition identifier carried on every request and result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaVersion {
    #[default]
    #[serde(rename = "v1-12q")]
    V1,
    #[serde(rename = "v2-25q")]
    V2,
}

impl SchemaVersion {
    pub fn id(self) -> &'static str {
        match self {
            SchemaVersion::V1 => "v1-12q",
            SchemaVersion::V2 => "v2-25q",
        }
    }

    /// Questions in the order the form presents them.
    pub fn questions(self) -> &'static [Question] {
        match self {
            SchemaVersion::V1 => &V1_QUESTIONS,
            SchemaVersion::V2 => &V2_QUESTIONS,
        }
    }

    pub fn includes(self, question: Question) -> bool {
        self.questions().contains(&question)
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Raised when a schema identifier is not one of the known editions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown questionnaire schema '{0}'")]
pub struct UnknownSchema(pub String);

impl FromStr for SchemaVersion {
    type Err = UnknownSchema;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "v1-12q" | "v1" => Ok(SchemaVersion::V1),
            "v2-25q" | "v2" => Ok(SchemaVersion::V2),
            _ => Err(UnknownSchema(value.to_string())),
        }
    }
}

/// Grouping used by the engine when averaging sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSection {
    RiskCapacity,
    RiskBehaviour,
    FinancialInformation,
    InvestmentExperience,
}

impl QuestionSection {
    pub fn label(self) -> &'static str {
        match self {
            QuestionSection::RiskCapacity => "Risk Capacity",
            QuestionSection::RiskBehaviour => "Risk Behaviour",
            QuestionSection::FinancialInformation => "Financial Information",
            QuestionSection::InvestmentExperience => "Investment Experience",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Question {
    IncomeStability,
    SavingsRate,
    EmergencyFund,
    Dependents,
    EmiIncomeRatio,
    JobReplaceability,
    InvestmentDuration,
    GoalFlexibility,
    BudgetTracking,
    InvestmentConsistency,
    MarketReaction,
    PortfolioMonitoring,
    AnnualIncome,
    MonthlyExpenses,
    NumDependents,
    DependentsAgeGroup,
    NetWorth,
    LiquidAssetsRatio,
    InvestmentRatio,
    RealEstateRatio,
    DebtToNetWorth,
    FinancialStability,
    InvestmentExperienceYears,
    InvestmentTypes,
    KnowledgeLevel,
}

const V1_QUESTIONS: [Question; 12] = [
    Question::IncomeStability,
    Question::SavingsRate,
    Question::EmergencyFund,
    Question::Dependents,
    Question::EmiIncomeRatio,
    Question::JobReplaceability,
    Question::InvestmentDuration,
    Question::GoalFlexibility,
    Question::BudgetTracking,
    Question::InvestmentConsistency,
    Question::MarketReaction,
    Question::PortfolioMonitoring,
];

const V2_QUESTIONS: [Question; 25] = [
    Question::AnnualIncome,
    Question::MonthlyExpenses,
    Question::NumDependents,
    Question::DependentsAgeGroup,
    Question::NetWorth,
    Question::LiquidAssetsRatio,
    Question::InvestmentRatio,
    Question::RealEstateRatio,
    Question::DebtToNetWorth,
    Question::FinancialStability,
    Question::IncomeStability,
    Question::SavingsRate,
    Question::EmergencyFund,
    Question::Dependents,
    Question::EmiIncomeRatio,
    Question::JobReplaceability,
    Question::InvestmentDuration,
    Question::GoalFlexibility,
    Question::BudgetTracking,
    Question::InvestmentConsistency,
    Question::MarketReaction,
    Question::PortfolioMonitoring,
    Question::InvestmentExperienceYears,
    Question::InvestmentTypes,
    Question::KnowledgeLevel,
];

type ScoringTable = &'static [(&'static str, u8)];

const INCOME_STABILITY: ScoringTable = &[
    ("government_psu", 10),
    ("large_mnc", 8),
    ("stable_sme", 6),
    ("startup_unstable", 4),
    ("variable_freelance", 2),
];
const SAVINGS_RATE: ScoringTable = &[("less_10", 2), ("10_20", 5), ("20_35", 8), ("more_35", 10)];
const EMERGENCY_FUND: ScoringTable = &[("less_3", 2), ("3_6", 5), ("6_12", 8), ("more_12", 10)];
const DEPENDENTS: ScoringTable = &[("0", 10), ("1", 8), ("2", 6), ("3_plus", 3)];
const EMI_INCOME_RATIO: ScoringTable =
    &[("less_10", 10), ("10_25", 7), ("25_40", 4), ("more_40", 2)];
const JOB_REPLACEABILITY: ScoringTable = &[
    ("less_2_months", 10),
    ("3_4_months", 7),
    ("6_plus_months", 3),
];
const INVESTMENT_DURATION: ScoringTable =
    &[("less_3", 2), ("3_5", 5), ("5_10", 8), ("more_10", 10)];
const GOAL_FLEXIBILITY: ScoringTable =
    &[("fixed", 3), ("semi_flexible", 6), ("fully_flexible", 10)];
const BUDGET_TRACKING: ScoringTable = &[("none", 2), ("occasional", 5), ("strict", 10)];
const INVESTMENT_CONSISTENCY: ScoringTable =
    &[("irregular", 3), ("sometimes", 6), ("consistent", 10)];
const MARKET_REACTION: ScoringTable = &[("sold", 2), ("held", 6), ("added", 10)];
const PORTFOLIO_MONITORING: ScoringTable = &[("daily", 3), ("monthly", 7), ("periodic", 10)];

const ANNUAL_INCOME: ScoringTable = &[
    ("below_5l", 2),
    ("5l_10l", 4),
    ("10l_25l", 6),
    ("25l_50l", 8),
    ("above_50l", 10),
];
const MONTHLY_EXPENSES: ScoringTable =
    &[("above_75", 2), ("50_75", 4), ("30_50", 7), ("below_30", 10)];
const DEPENDENTS_AGE_GROUP: ScoringTable = &[
    ("none", 10),
    ("adults_earning", 8),
    ("adults_non_earning", 6),
    ("children", 5),
    ("elderly", 4),
    ("mixed", 3),
];
const NET_WORTH: ScoringTable = &[
    ("below_10l", 2),
    ("10l_50l", 4),
    ("50l_1cr", 6),
    ("1cr_5cr", 8),
    ("above_5cr", 10),
];
const HOLDING_RATIO: ScoringTable = &[("less_10", 2), ("10_25", 5), ("25_50", 8), ("more_50", 10)];
const REAL_ESTATE_RATIO: ScoringTable =
    &[("more_75", 2), ("50_75", 4), ("25_50", 7), ("less_25", 10)];
const DEBT_TO_NET_WORTH: ScoringTable =
    &[("more_50", 2), ("25_50", 4), ("10_25", 7), ("less_10", 10)];
const FINANCIAL_STABILITY: ScoringTable = &[
    ("very_unstable", 2),
    ("somewhat_unstable", 4),
    ("stable", 7),
    ("very_stable", 10),
];
const EXPERIENCE_YEARS: ScoringTable = &[
    ("none", 1),
    ("less_2", 3),
    ("2_5", 6),
    ("5_10", 8),
    ("more_10", 10),
];
const INVESTMENT_TYPES: ScoringTable = &[
    ("fixed_deposits", 2),
    ("mutual_funds", 5),
    ("direct_equity", 7),
    ("derivatives", 9),
    ("alternatives", 10),
];
const KNOWLEDGE_LEVEL: ScoringTable =
    &[("beginner", 2), ("basic", 4), ("intermediate", 7), ("advanced", 10)];

impl Question {
    /// Form field name, also the key used in answer payloads.
    pub fn key(self) -> &'static str {
        match self {
            Question::IncomeStability => "incomeStability",
            Question::SavingsRate => "savingsRate",
            Question::EmergencyFund => "emergencyFund",
            Question::Dependents => "dependents",
            Question::EmiIncomeRatio => "emiIncomeRatio",
            Question::JobReplaceability => "jobReplaceability",
            Question::InvestmentDuration => "investmentDuration",
            Question::GoalFlexibility => "goalFlexibility",
            Question::BudgetTracking => "budgetTracking",
            Question::InvestmentConsistency => "investmentConsistency",
            Question::MarketReaction => "marketReaction",
            Question::PortfolioMonitoring => "portfolioMonitoring",
            Question::AnnualIncome => "annualIncome",
            Question::MonthlyExpenses => "monthlyExpenses",
            Question::NumDependents => "numDependents",
            Question::DependentsAgeGroup => "dependentsAgeGroup",
            Question::NetWorth => "netWorth",
            Question::LiquidAssetsRatio => "liquidAssetsRatio",
            Question::InvestmentRatio => "investmentRatio",
            Question::RealEstateRatio => "realEstateRatio",
            Question::DebtToNetWorth => "debtToNetWorth",
            Question::FinancialStability => "financialStability",
            Question::InvestmentExperienceYears => "investmentExperienceYears",
            Question::InvestmentTypes => "investmentTypes",
            Question::KnowledgeLevel => "knowledgeLevel",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        V2_QUESTIONS
            .iter()
            .copied()
            .find(|question| question.key() == key)
    }

    pub fn prompt(self) -> &'static str {
        match self {
            Question::IncomeStability => "How stable is your primary source of income?",
            Question::SavingsRate => "What share of your monthly income do you save?",
            Question::EmergencyFund => "How many months of expenses does your emergency fund cover?",
            Question::Dependents => "How many people depend on your income?",
            Question::EmiIncomeRatio => "What share of your income goes to loan EMIs?",
            Question::JobReplaceability => "How long would it take to replace your current income?",
            Question::InvestmentDuration => "How long do you plan to stay invested?",
            Question::GoalFlexibility => "How flexible are the goals this money is meant for?",
            Question::BudgetTracking => "How closely do you track your budget?",
            Question::InvestmentConsistency => "How consistently do you invest?",
            Question::MarketReaction => "What did you do during the last major market fall?",
            Question::PortfolioMonitoring => "How often do you check your portfolio?",
            Question::AnnualIncome => "What is your annual household income?",
            Question::MonthlyExpenses => "What share of your income do monthly expenses take?",
            Question::NumDependents => "How many financial dependents do you have?",
            Question::DependentsAgeGroup => "Which age group best describes your dependents?",
            Question::NetWorth => "What is your approximate net worth?",
            Question::LiquidAssetsRatio => "What share of your net worth is held in liquid assets?",
            Question::InvestmentRatio => "What share of your net worth is invested in markets?",
            Question::RealEstateRatio => "What share of your net worth is held in real estate?",
            Question::DebtToNetWorth => "How large are your debts relative to your net worth?",
            Question::FinancialStability => "How would you describe your overall financial stability?",
            Question::InvestmentExperienceYears => "How many years have you been investing?",
            Question::InvestmentTypes => "Which investment products have you held?",
            Question::KnowledgeLevel => "How would you rate your investment knowledge?",
        }
    }

    pub fn section(self) -> QuestionSection {
        match self {
            Question::IncomeStability
            | Question::SavingsRate
            | Question::EmergencyFund
            | Question::Dependents
            | Question::EmiIncomeRatio
            | Question::JobReplaceability
            | Question::InvestmentDuration
            | Question::GoalFlexibility => QuestionSection::RiskCapacity,
            Question::BudgetTracking
            | Question::InvestmentConsistency
            | Question::MarketReaction
            | Question::PortfolioMonitoring => QuestionSection::RiskBehaviour,
            Question::AnnualIncome
            | Question::MonthlyExpenses
            | Question::NumDependents
            | Question::DependentsAgeGroup
            | Question::NetWorth
            | Question::LiquidAssetsRatio
            | Question::InvestmentRatio
            | Question::RealEstateRatio
            | Question::DebtToNetWorth
            | Question::FinancialStability => QuestionSection::FinancialInformation,
            Question::InvestmentExperienceYears
            | Question::InvestmentTypes
            | Question::KnowledgeLevel => QuestionSection::InvestmentExperience,
        }
    }

    /// Whether the form renders this question as a checkbox group.
    pub fn is_multi_select(self) -> bool {
        matches!(self, Question::InvestmentTypes)
    }

    /// Option keys with their scores, in presentation order.
    pub fn table(self) -> &'static [(&'static str, u8)] {
        match self {
            Question::IncomeStability => INCOME_STABILITY,
            Question::SavingsRate => SAVINGS_RATE,
            Question::EmergencyFund => EMERGENCY_FUND,
            Question::Dependents | Question::NumDependents => DEPENDENTS,
            Question::EmiIncomeRatio => EMI_INCOME_RATIO,
            Question::JobReplaceability => JOB_REPLACEABILITY,
            Question::InvestmentDuration => INVESTMENT_DURATION,
            Question::GoalFlexibility => GOAL_FLEXIBILITY,
            Question::BudgetTracking => BUDGET_TRACKING,
            Question::InvestmentConsistency => INVESTMENT_CONSISTENCY,
            Question::MarketReaction => MARKET_REACTION,
            Question::PortfolioMonitoring => PORTFOLIO_MONITORING,
            Question::AnnualIncome => ANNUAL_INCOME,
            Question::MonthlyExpenses => MONTHLY_EXPENSES,
            Question::DependentsAgeGroup => DEPENDENTS_AGE_GROUP,
            Question::NetWorth => NET_WORTH,
            Question::LiquidAssetsRatio | Question::InvestmentRatio => HOLDING_RATIO,
            Question::RealEstateRatio => REAL_ESTATE_RATIO,
            Question::DebtToNetWorth => DEBT_TO_NET_WORTH,
            Question::FinancialStability => FINANCIAL_STABILITY,
            Question::InvestmentExperienceYears => EXPERIENCE_YEARS,
            Question::InvestmentTypes => INVESTMENT_TYPES,
            Question::KnowledgeLevel => KNOWLEDGE_LEVEL,
        }
    }

    /// Exact-match lookup; `None` for option keys the table does not know.
    pub fn score(self, option: &str) -> Option<u8> {
        self.table()
            .iter()
            .find(|(key, _)| *key == option)
            .map(|(_, score)| *score)
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
