//! # Provider Registry
//!
//! The static catalog of known vendors: what they do, where they live,
//! what a request must carry, and which regulations govern the exchange.
//! Tenants activate a subset of these and supply credentials per vendor.

use serde::{Deserialize, Serialize};

use mlo_core::RegulationCode;

/// The service category a provider fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderType {
    CreditBureau,
    Appraisal,
    TitleInsurance,
    FloodInsurance,
    MortgageInsurance,
    EmploymentVerification,
    DocumentManagement,
    LoanOrigination,
    Compliance,
}

/// Static configuration for one known vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderConfig {
    /// Stable registry key ("experian", "clear_capital").
    pub key: &'static str,
    /// Display name.
    pub name: &'static str,
    pub provider_type: ProviderType,
    /// API base URL.
    pub endpoint: &'static str,
    /// Fields a request to this vendor must carry.
    pub required_fields: &'static [&'static str],
    /// Regulations governing data exchanged with this vendor.
    pub regulations: &'static [RegulationCode],
}

/// Every vendor the platform knows how to talk to.
pub fn available_providers() -> &'static [ProviderConfig] {
    use ProviderType::*;
    use RegulationCode::*;
    const PROVIDERS: &[ProviderConfig] = &[
        ProviderConfig {
            key: "experian",
            name: "Experian",
            provider_type: CreditBureau,
            endpoint: "https://api.experian.com",
            required_fields: &["ssn", "name", "address"],
            regulations: &[Fcra],
        },
        ProviderConfig {
            key: "equifax",
            name: "Equifax",
            provider_type: CreditBureau,
            endpoint: "https://api.equifax.com",
            required_fields: &["ssn", "name", "address"],
            regulations: &[Fcra],
        },
        ProviderConfig {
            key: "transunion",
            name: "TransUnion",
            provider_type: CreditBureau,
            endpoint: "https://api.transunion.com",
            required_fields: &["ssn", "name", "address"],
            regulations: &[Fcra],
        },
        ProviderConfig {
            key: "clear_capital",
            name: "Clear Capital",
            provider_type: Appraisal,
            endpoint: "https://api.clearcapital.com",
            required_fields: &["property_address", "loan_amount"],
            regulations: &[Respa],
        },
        ProviderConfig {
            key: "appraisal_port",
            name: "AppraisalPort",
            provider_type: Appraisal,
            endpoint: "https://api.appraisalport.com",
            required_fields: &["property_address", "loan_amount"],
            regulations: &[Respa],
        },
        ProviderConfig {
            key: "first_american",
            name: "First American",
            provider_type: TitleInsurance,
            endpoint: "https://api.firstam.com",
            required_fields: &["property_address", "borrower_name"],
            regulations: &[Respa],
        },
        ProviderConfig {
            key: "fidelity",
            name: "Fidelity National Title",
            provider_type: TitleInsurance,
            endpoint: "https://api.fnti.com",
            required_fields: &["property_address", "borrower_name"],
            regulations: &[Respa],
        },
        ProviderConfig {
            key: "fema",
            name: "FEMA Flood Zone",
            provider_type: FloodInsurance,
            endpoint: "https://api.fema.gov",
            required_fields: &["property_address"],
            regulations: &[Respa],
        },
        ProviderConfig {
            key: "genworth",
            name: "Genworth Mortgage Insurance",
            provider_type: MortgageInsurance,
            endpoint: "https://api.genworth.com",
            required_fields: &["loan_amount", "ltv_ratio"],
            regulations: &[Respa],
        },
        ProviderConfig {
            key: "mgic",
            name: "MGIC",
            provider_type: MortgageInsurance,
            endpoint: "https://api.mgic.com",
            required_fields: &["loan_amount", "ltv_ratio"],
            regulations: &[Respa],
        },
        ProviderConfig {
            key: "the_work_number",
            name: "The Work Number",
            provider_type: EmploymentVerification,
            endpoint: "https://api.theworknumber.com",
            required_fields: &["employer_name", "employee_id"],
            regulations: &[Ecoa],
        },
        ProviderConfig {
            key: "equifax_workforce",
            name: "Equifax Workforce Solutions",
            provider_type: EmploymentVerification,
            endpoint: "https://api.equifaxworkforce.com",
            required_fields: &["employer_name", "employee_id"],
            regulations: &[Ecoa],
        },
        ProviderConfig {
            key: "docu_sign",
            name: "DocuSign",
            provider_type: DocumentManagement,
            endpoint: "https://api.docusign.net",
            required_fields: &["document_id", "recipient_email"],
            regulations: &[Trid, Ecoa],
        },
        ProviderConfig {
            key: "adobe_sign",
            name: "Adobe Sign",
            provider_type: DocumentManagement,
            endpoint: "https://api.adobesign.com",
            required_fields: &["document_id", "recipient_email"],
            regulations: &[Trid, Ecoa],
        },
        ProviderConfig {
            key: "encompass",
            name: "Encompass",
            provider_type: LoanOrigination,
            endpoint: "https://api.encompass.com",
            required_fields: &["loan_data"],
            regulations: &[Trid, Ecoa, Respa],
        },
        ProviderConfig {
            key: "calyx_point",
            name: "Calyx Point",
            provider_type: LoanOrigination,
            endpoint: "https://api.calyxpoint.com",
            required_fields: &["loan_data"],
            regulations: &[Trid, Ecoa, Respa],
        },
        ProviderConfig {
            key: "compliance_alpha",
            name: "ComplianceAlpha",
            provider_type: Compliance,
            endpoint: "https://api.compliancealpha.com",
            required_fields: &["loan_data"],
            regulations: &[Trid, Ecoa, Respa, Glba, Fcra],
        },
        ProviderConfig {
            key: "mortgage_compliance",
            name: "Mortgage Compliance Advisors",
            provider_type: Compliance,
            endpoint: "https://api.mortgagecompliance.com",
            required_fields: &["loan_data"],
            regulations: &[Trid, Ecoa, Respa, Glba, Fcra],
        },
    ];
    PROVIDERS
}

/// Providers of one service category.
pub fn providers_by_type(provider_type: ProviderType) -> Vec<&'static ProviderConfig> {
    available_providers()
        .iter()
        .filter(|p| p.provider_type == provider_type)
        .collect()
}

/// Look up a provider by registry key.
pub fn provider_config(key: &str) -> Option<&'static ProviderConfig> {
    available_providers().iter().find(|p| p.key == key)
}
