//! Canonical field vocabulary shared by every document template.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical fields of a transaction negotiation authority, independent of
/// how any one form labels them.
///
/// Declaration order is the order fields are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    UserName,
    UserId,
    BureauName,
    SponsorBank,
    ProcessingBank,
    AmtLimitInFigures,
    AmtLimitInWords,
    LimitFrequency,
    PeriodCommencing,
    PeriodEnding,
    DrawingAccountName,
    Bsb,
    AccountNumber,
    TemporaryProcessingLimitOverride,
}

impl CanonicalField {
    /// Every canonical field, in reporting order.
    pub const ALL: [CanonicalField; 14] = [
        Self::UserName,
        Self::UserId,
        Self::BureauName,
        Self::SponsorBank,
        Self::ProcessingBank,
        Self::AmtLimitInFigures,
        Self::AmtLimitInWords,
        Self::LimitFrequency,
        Self::PeriodCommencing,
        Self::PeriodEnding,
        Self::DrawingAccountName,
        Self::Bsb,
        Self::AccountNumber,
        Self::TemporaryProcessingLimitOverride,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserName => "user_name",
            Self::UserId => "user_id",
            Self::BureauName => "bureau_name",
            Self::SponsorBank => "sponsor_bank",
            Self::ProcessingBank => "processing_bank",
            Self::AmtLimitInFigures => "amt_limit_in_figures",
            Self::AmtLimitInWords => "amt_limit_in_words",
            Self::LimitFrequency => "limit_frequency",
            Self::PeriodCommencing => "period_commencing",
            Self::PeriodEnding => "period_ending",
            Self::DrawingAccountName => "drawing_account_name",
            Self::Bsb => "bsb",
            Self::AccountNumber => "account_number",
            Self::TemporaryProcessingLimitOverride => "temporary_processing_limit_override",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields as the oracle returned them for one document: form label → value.
///
/// `None` means the oracle emitted the label without a usable value.
pub type RawFieldMap = BTreeMap<String, Option<String>>;

/// Fields of one document keyed by canonical identifier. Absent fields are
/// not keys.
pub type CanonicalFieldMap = BTreeMap<CanonicalField, String>;
