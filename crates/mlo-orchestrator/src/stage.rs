//! # Processing Stages
//!
//! The explicit stage sequence and its classification. Stages must be
//! executed in order; each has exactly one successor.

use serde::{Deserialize, Serialize};

/// The eleven stages of a loan processing run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStage {
    /// Validate the application's required fields and borrower.
    Validate,
    /// Collect required documents (non-gating: proceeds with what is
    /// available).
    CollectDocuments,
    /// Pull credit through a bureau integration.
    CreditCheck,
    /// Verify income and debt-to-income ratio.
    VerifyIncome,
    /// Order the property appraisal (non-gating: ordering failure is
    /// retried out of band).
    OrderAppraisal,
    /// Run the full compliance battery (non-gating: violations are
    /// surfaced, not fatal here).
    ComplianceCheck,
    /// Underwriting review.
    Underwriting,
    /// Final approval decision.
    FinalApproval,
    /// Prepare closing documents.
    PrepareClosing,
    /// Conduct the closing.
    ProcessClosing,
    /// Disburse funds.
    Fund,
}

impl ProcessingStage {
    /// The first stage of every run.
    pub fn first() -> Self {
        Self::Validate
    }

    /// The next stage in the sequence, if any.
    pub fn next(&self) -> Option<ProcessingStage> {
        match self {
            Self::Validate => Some(Self::CollectDocuments),
            Self::CollectDocuments => Some(Self::CreditCheck),
            Self::CreditCheck => Some(Self::VerifyIncome),
            Self::VerifyIncome => Some(Self::OrderAppraisal),
            Self::OrderAppraisal => Some(Self::ComplianceCheck),
            Self::ComplianceCheck => Some(Self::Underwriting),
            Self::Underwriting => Some(Self::FinalApproval),
            Self::FinalApproval => Some(Self::PrepareClosing),
            Self::PrepareClosing => Some(Self::ProcessClosing),
            Self::ProcessClosing => Some(Self::Fund),
            Self::Fund => None,
        }
    }

    /// Whether a failed report at this stage terminates the run with a
    /// denial. Closing failure is terminal too, but maps to `closed` —
    /// see the pipeline.
    pub fn is_gating(&self) -> bool {
        matches!(
            self,
            Self::Validate
                | Self::CreditCheck
                | Self::VerifyIncome
                | Self::Underwriting
                | Self::FinalApproval
        )
    }

    /// Return the string value for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::CollectDocuments => "collect_documents",
            Self::CreditCheck => "credit_check",
            Self::VerifyIncome => "verify_income",
            Self::OrderAppraisal => "order_appraisal",
            Self::ComplianceCheck => "compliance_check",
            Self::Underwriting => "underwriting",
            Self::FinalApproval => "final_approval",
            Self::PrepareClosing => "prepare_closing",
            Self::ProcessClosing => "process_closing",
            Self::Fund => "fund",
        }
    }
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a completed run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// A gating stage failed or an activity errored.
    Denied,
    /// Closing completed (or failed terminally) without funding.
    Closed,
    /// Funds disbursed.
    Funded,
}

impl RunOutcome {
    /// Return the string value for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Denied => "denied",
            Self::Closed => "closed",
            Self::Funded => "funded",
        }
    }
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_walks_all_eleven_stages() {
        let mut count = 1;
        let mut stage = ProcessingStage::first();
        while let Some(next) = stage.next() {
            stage = next;
            count += 1;
        }
        assert_eq!(count, 11);
        assert_eq!(stage, ProcessingStage::Fund);
    }

    #[test]
    fn gating_classification() {
        assert!(ProcessingStage::Validate.is_gating());
        assert!(ProcessingStage::CreditCheck.is_gating());
        assert!(ProcessingStage::VerifyIncome.is_gating());
        assert!(ProcessingStage::Underwriting.is_gating());
        assert!(ProcessingStage::FinalApproval.is_gating());

        assert!(!ProcessingStage::CollectDocuments.is_gating());
        assert!(!ProcessingStage::OrderAppraisal.is_gating());
        assert!(!ProcessingStage::ComplianceCheck.is_gating());
        assert!(!ProcessingStage::PrepareClosing.is_gating());
        assert!(!ProcessingStage::ProcessClosing.is_gating());
        assert!(!ProcessingStage::Fund.is_gating());
    }

    #[test]
    fn display_names() {
        assert_eq!(ProcessingStage::Validate.to_string(), "validate");
        assert_eq!(ProcessingStage::Fund.to_string(), "fund");
        assert_eq!(RunOutcome::Funded.to_string(), "funded");
    }
}
