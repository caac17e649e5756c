use super::super::answers::AnswerSet;
use super::super::schema::Question;

/// Two-decimal rounding, half away from zero; scores are never negative.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Table score for the selected option, 0 when the answer is absent or unknown.
pub(crate) fn sub_score(answers: &AnswerSet, question: Question) -> u8 {
    answers
        .selected(question)
        .and_then(|option| question.score(&option))
        .unwrap_or(0)
}

pub(crate) fn mean_of(answers: &AnswerSet, questions: &[Question]) -> f64 {
    if questions.is_empty() {
        return 0.0;
    }
    let total: u32 = questions
        .iter()
        .map(|question| u32::from(sub_score(answers, *question)))
        .sum();
    f64::from(total) / questions.len() as f64
}

const INCOME_WEIGHT: f64 = 0.40;
const LIABILITY_WEIGHT: f64 = 0.30;
const HORIZON_WEIGHT: f64 = 0.30;

const INCOME_QUESTIONS: [Question; 3] = [
    Question::IncomeStability,
    Question::SavingsRate,
    Question::EmergencyFund,
];
const LIABILITY_QUESTIONS: [Question; 3] = [
    Question::Dependents,
    Question::EmiIncomeRatio,
    Question::JobReplaceability,
];
const HORIZON_QUESTIONS: [Question; 2] = [Question::InvestmentDuration, Question::GoalFlexibility];

const BEHAVIOUR_QUESTIONS: [Question; 4] = [
    Question::BudgetTracking,
    Question::InvestmentConsistency,
    Question::MarketReaction,
    Question::PortfolioMonitoring,
];

const FINANCIAL_INFO_QUESTIONS: [Question; 10] = [
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
];

const EXPERIENCE_QUESTIONS: [Question; 3] = [
    Question::InvestmentExperienceYears,
    Question::InvestmentTypes,
    Question::KnowledgeLevel,
];

/// Risk capacity together with the components and raw sub-scores the overrides inspect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityBreakdown {
    pub risk_capacity: f64,
    pub income_score: f64,
    pub liability_score: f64,
    pub horizon_score: f64,
    pub emergency_fund_score: u8,
    pub investment_duration_score: u8,
    pub emi_ratio_score: u8,
}

pub(crate) fn risk_capacity(answers: &AnswerSet) -> CapacityBreakdown {
    let income = mean_of(answers, &INCOME_QUESTIONS);
    let liability = mean_of(answers, &LIABILITY_QUESTIONS);
    let horizon = mean_of(answers, &HORIZON_QUESTIONS);

    // Weighted on unrounded components; only the reported figures are rounded.
    let capacity = INCOME_WEIGHT * income + LIABILITY_WEIGHT * liability + HORIZON_WEIGHT * horizon;

    CapacityBreakdown {
        risk_capacity: round2(capacity),
        income_score: round2(income),
        liability_score: round2(liability),
        horizon_score: round2(horizon),
        emergency_fund_score: sub_score(answers, Question::EmergencyFund),
        investment_duration_score: sub_score(answers, Question::InvestmentDuration),
        emi_ratio_score: sub_score(answers, Question::EmiIncomeRatio),
    }
}

pub(crate) fn risk_behaviour(answers: &AnswerSet) -> f64 {
    round2(mean_of(answers, &BEHAVIOUR_QUESTIONS))
}

pub(crate) fn financial_info(answers: &AnswerSet) -> f64 {
    round2(mean_of(answers, &FINANCIAL_INFO_QUESTIONS))
}

pub(crate) fn investment_experience(answers: &AnswerSet) -> f64 {
    round2(mean_of(answers, &EXPERIENCE_QUESTIONS))
}
