//! STR document model, builders and validation.
mod builder;
pub mod validate;
pub mod xml;

pub use builder::{
    DetailBuilder, DocumentBuilder, FinalizedDocument, RequiredReportFields, SuspicionBuilder,
    TransactionFields,
};

use crate::codes::CodeTable;
use bitflags::bitflags;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

type Result<T> = std::result::Result<T, DocumentError>;

/// Fail-fast error raised while assembling a document.
///
/// The builder stops at the first structural problem of the entity currently
/// being assembled; the exhaustive counterpart is [`validate::validate`],
/// which reports every violated rule as a [`Diagnostic`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("missing required field: {field}")]
    MissingRequiredField { field: &'static str },
    #[error("duplicate single-valued field: {field}")]
    DuplicateField { field: &'static str },
    #[error("cardinality violation in {entity}: {rule}")]
    CardinalityViolation {
        entity: &'static str,
        rule: &'static str,
    },
    #[error("unknown code {value:?} in table {table}")]
    InvalidCode { table: &'static str, value: String },
    #[error("invalid format for {field}: {value:?}")]
    InvalidFormat { field: &'static str, value: String },
    #[error("{field} must be empty while Suspicion is present")]
    MutualExclusivityViolation { field: &'static str },
    #[error("{field} {value:?} does not resolve to a detail entity")]
    ReferentialMismatch { field: &'static str, value: String },
    #[error("user field set does not match the {expected} variant for RealNumber code {code}")]
    VariantFieldMismatch { code: String, expected: &'static str },
    #[error("declared {field} = {declared} disagrees with computed {computed}")]
    AggregationMismatch {
        field: &'static str,
        declared: u64,
        computed: u64,
    },
}

/// Classification of a validation finding.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleKind {
    MissingRequiredField,
    DuplicateField,
    CardinalityViolation,
    InvalidCode,
    InvalidFormat,
    MutualExclusivityViolation,
    ReferentialMismatch,
    VariantFieldMismatch,
    AggregationMismatch,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::MissingRequiredField => "MissingRequiredField",
            RuleKind::DuplicateField => "DuplicateField",
            RuleKind::CardinalityViolation => "CardinalityViolation",
            RuleKind::InvalidCode => "InvalidCode",
            RuleKind::InvalidFormat => "InvalidFormat",
            RuleKind::MutualExclusivityViolation => "MutualExclusivityViolation",
            RuleKind::ReferentialMismatch => "ReferentialMismatch",
            RuleKind::VariantFieldMismatch => "VariantFieldMismatch",
            RuleKind::AggregationMismatch => "AggregationMismatch",
        }
    }
}

/// Single path-qualified validation finding.
///
/// # Examples
/// ```rust
/// use strdoc_core::document::{Diagnostic, RuleKind};
///
/// let d = Diagnostic::new(
///     "Detail/Transaction[3]/Seq",
///     RuleKind::InvalidFormat,
///     "expected Seq 3, found 4",
/// );
/// assert_eq!(d.to_string(), "Detail/Transaction[3]/Seq: InvalidFormat: expected Seq 3, found 4");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub path: String,
    pub kind: RuleKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(path: impl Into<String>, kind: RuleKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.path, self.kind.as_str(), self.message)
    }
}

/// The 17-character report identifier: OrgCode (6) + YYYYMM (6) + sequence (5).
///
/// # Examples
/// ```rust
/// use strdoc_core::document::FiuDocNum;
///
/// let num = FiuDocNum::parse("AB000120240100001")?;
/// assert_eq!(num.org_code(), "AB0001");
/// assert_eq!(num.period(), "202401");
/// assert_eq!(num.sequence(), "00001");
/// # Ok::<(), strdoc_core::document::DocumentError>(())
/// ```
///
/// # Errors
/// [`DocumentError::InvalidFormat`] if the input is not 17 characters or the
/// period/sequence parts are not numeric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiuDocNum(String);

impl FiuDocNum {
    pub fn parse<S: Into<String>>(s: S) -> Result<Self> {
        let s = s.into();
        let invalid = |value: &str| DocumentError::InvalidFormat {
            field: "FiuDocNum",
            value: value.to_string(),
        };
        if s.chars().count() != 17 || !s.is_ascii() {
            return Err(invalid(&s));
        }
        let period = &s[6..12];
        let sequence = &s[12..17];
        if !period.bytes().all(|b| b.is_ascii_digit())
            || !sequence.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid(&s));
        }
        let month: u32 = period[4..6].parse().map_err(|_| invalid(&s))?;
        if !(1..=12).contains(&month) {
            return Err(invalid(&s));
        }
        Ok(FiuDocNum(s))
    }

    pub fn org_code(&self) -> &str {
        &self.0[..6]
    }

    pub fn period(&self) -> &str {
        &self.0[6..12]
    }

    pub fn sequence(&self) -> &str {
        &self.0[12..17]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FiuDocNum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A code attribute together with its human-readable label text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRef {
    pub code: String,
    pub text: String,
}

impl CodeRef {
    pub fn new(code: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            text: text.into(),
        }
    }
}

/// Zip-coded address line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub zip_code: String,
    pub text: String,
}

impl Address {
    pub fn new(zip_code: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            zip_code: zip_code.into(),
            text: text.into(),
        }
    }
}

/// Branch of the handling institution (zip code + branch code + name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchOffice {
    pub zip_code: String,
    pub code: String,
    pub text: String,
}

/// Phone number with optional mobile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone {
    pub number: String,
    pub hand_phone: Option<String>,
}

/// Report author (`MainAuthor` element: userid attribute + display name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainAuthor {
    pub userid: String,
    pub name: String,
}

/// The reporting institution. Exactly one per document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub org_name: CodeRef,
    pub main_author: MainAuthor,
    pub manager: String,
    pub phone: String,
    pub address: Address,
    pub email: Option<String>,
}

/// Master-level declared counts and sums, partitioned inner/outer.
///
/// A transaction is *inner* when its `OrgName@Code` equals the reporting
/// organization's code, *outer* otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MasterTotals {
    pub inner_count: u64,
    pub outer_count: u64,
    pub inner_krw_amount: u64,
    pub outer_krw_amount: u64,
    pub inner_usd_amount: u64,
    pub outer_usd_amount: u64,
    pub count: u64,
    pub krw_amount: u64,
    pub usd_amount: u64,
}

impl MasterTotals {
    /// Recompute all nine totals from the detail transactions.
    ///
    /// Amount sums saturate at `u64::MAX` instead of overflowing: an
    /// externally sourced document may carry arbitrary amounts, and a
    /// saturated sum surfaces as an [`AggregationMismatch`] against the
    /// declared totals rather than aborting the traversal.
    ///
    /// [`AggregationMismatch`]: DocumentError::AggregationMismatch
    pub fn recompute(transactions: &[Transaction], reporting_org_code: &str) -> Self {
        let mut totals = MasterTotals::default();
        for tx in transactions {
            let inner = tx.org_name.code == reporting_org_code;
            if inner {
                // counts are bounded by the transaction list length
                totals.inner_count += 1;
                totals.inner_krw_amount = totals.inner_krw_amount.saturating_add(tx.krw_amount);
                totals.inner_usd_amount = totals.inner_usd_amount.saturating_add(tx.usd_amount);
            } else {
                totals.outer_count += 1;
                totals.outer_krw_amount = totals.outer_krw_amount.saturating_add(tx.krw_amount);
                totals.outer_usd_amount = totals.outer_usd_amount.saturating_add(tx.usd_amount);
            }
        }
        totals.count = totals.inner_count + totals.outer_count;
        totals.krw_amount = totals.inner_krw_amount.saturating_add(totals.outer_krw_amount);
        totals.usd_amount = totals.inner_usd_amount.saturating_add(totals.outer_usd_amount);
        totals
    }

    /// Fields of `self` (the declared totals) that disagree with `computed`,
    /// as `(field, declared, computed)` triples in document order.
    pub fn diff(&self, computed: &MasterTotals) -> Vec<(&'static str, u64, u64)> {
        let pairs = [
            ("InnerCount", self.inner_count, computed.inner_count),
            ("OuterCount", self.outer_count, computed.outer_count),
            (
                "InnerKRWAmount",
                self.inner_krw_amount,
                computed.inner_krw_amount,
            ),
            (
                "OuterKRWAmount",
                self.outer_krw_amount,
                computed.outer_krw_amount,
            ),
            (
                "InnerUSDAmount",
                self.inner_usd_amount,
                computed.inner_usd_amount,
            ),
            (
                "OuterUSDAmount",
                self.outer_usd_amount,
                computed.outer_usd_amount,
            ),
            ("Count", self.count, computed.count),
            ("KRWAmount", self.krw_amount, computed.krw_amount),
            ("USDAmount", self.usd_amount, computed.usd_amount),
        ];
        pairs
            .into_iter()
            .filter(|(_, declared, computed)| declared != computed)
            .collect()
    }
}

/// Report header: identifier, period, declared totals, escalation content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Master {
    pub fiu_doc_num: String,
    pub former_fiu_doc_num: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub totals: MasterTotals,
    pub message_type_code: String,
    pub doc_send_date: String,
    pub suspicion: Option<Suspicion>,
    pub suspicion_report: SuspicionReport,
}

/// Coded suspicion checklist; one of the two escalation paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suspicion {
    pub question_titles: Vec<QuestionTitle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionTitle {
    pub code: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub code: String,
    pub text: String,
}

/// Narrative report. `Why` and `SyntheticOpinion` are mandatory, the
/// 5W1H fields are free-text and optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspicionReport {
    pub who: Option<String>,
    pub when: Option<String>,
    pub r#where: Option<String>,
    pub what: Option<String>,
    pub how: Option<String>,
    pub why: String,
    pub synthetic_opinion: String,
    pub branch_office_score: u8,
    pub org_score: u8,
    pub relation_fiu_doc_num: Option<String>,
    pub etc_pecularity_type: Option<String>,
}

/// Transaction detail block: ordered transactions, the single reported
/// user, and the related accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detail {
    pub transactions: Vec<Transaction>,
    pub user: User,
    pub accounts: Vec<Account>,
}

/// One reported transaction. `seq` is 1-based document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub seq: u64,
    pub date: String,
    pub time: String,
    pub channel: CodeRef,
    pub mean: CodeRef,
    pub method: CodeRef,
    pub goods: CodeRef,
    pub money_type: CodeRef,
    pub krw_amount: u64,
    pub foreign_amount: u64,
    pub usd_amount: u64,
    pub org_name: CodeRef,
    pub branch_office: Option<BranchOffice>,
    pub user_relations: Vec<UserRelation>,
    pub account_relations: Vec<AccountRelation>,
}

/// Value-keyed identifier of a person or entity: RealNumberType code plus
/// the identifying number itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealNumber {
    pub code: String,
    pub value: String,
}

impl RealNumber {
    pub fn new(code: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            value: value.into(),
        }
    }
}

/// Link from a transaction to the detail user, carried by value
/// (the user's RealNumber), not by object reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRelation {
    pub relation_role: CodeRef,
    pub real_number: RealNumber,
    pub insu_rel_desc: Option<String>,
}

/// Link from a transaction to an account, carried by account number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRelation {
    pub org_name: CodeRef,
    pub account_number: String,
    pub account_role: CodeRef,
}

bitflags! {
    /// Corporate yes/no attributes packed into a bitset.
    ///
    /// # Examples
    /// ```rust
    /// use strdoc_core::document::CorporateFlags;
    ///
    /// let flags = CorporateFlags::STOCK_LIST | CorporateFlags::BANKING_ORGAN;
    /// assert!(flags.contains(CorporateFlags::STOCK_LIST));
    /// assert!(!flags.contains(CorporateFlags::NON_PROFIT_CORP));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CorporateFlags: u8 {
        const BANKING_ORGAN = 0b0001;
        const NON_PROFIT_CORP = 0b0010;
        const NATIONAL_PUBLIC_GROUP = 0b0100;
        const STOCK_LIST = 0b1000;
    }
}

/// Corporate-only user fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorporateProfile {
    pub ceo_name: String,
    pub ksic: CodeRef,
    pub biz_address: Address,
    pub biz_tel_no: String,
    pub homepage_url: Option<String>,
    pub biz_scale: CodeRef,
    pub flags: CorporateFlags,
}

/// Individual/Corporate shape of the user, keyed by the RealNumberType
/// category rather than by ad hoc field presence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserKind {
    Individual {
        gender: Option<CodeRef>,
        occupation_type: Option<CodeRef>,
    },
    Corporate(CorporateProfile),
}

/// The single person or entity the report is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub real_number: RealNumber,
    pub real_number_type_name: Option<String>,
    pub name: String,
    pub nationality: Option<CodeRef>,
    pub phone: Option<Phone>,
    pub address: Option<Address>,
    pub birth_day: Option<String>,
    pub kind: UserKind,
}

/// Account held at an institution, referenced by transactions by number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub org_name: CodeRef,
    pub branch_office: Option<BranchOffice>,
    pub account_number: String,
    pub reg_date: Option<String>,
    pub account_user: RealNumber,
    /// `Y`/`N` on the wire; `None` when the element is absent or empty,
    /// which the validator reports as a missing required field.
    pub agent_flag: Option<bool>,
}

/// Opaque attachment entry; carried through untouched, no structural rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttach {
    pub file_name: String,
}

/// A complete STR document tree.
///
/// Immutable once produced by [`DocumentBuilder::build`] or parsed from XML;
/// the builder is the only mutator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrDocument {
    /// Schema version attribute on the root (`5.0` for this release).
    pub version: String,
    /// Reporting institution kind (`ReportKind` table).
    pub report_code: String,
    pub organization: Organization,
    pub master: Master,
    pub detail: Detail,
    pub file_attach: Vec<FileAttach>,
}

pub(crate) const SCHEMA_VERSION: &str = "5.0";

pub(crate) fn is_valid_date(s: &str) -> bool {
    s.len() == 8 && NaiveDate::parse_from_str(s, "%Y%m%d").is_ok()
}

pub(crate) fn is_valid_time(s: &str) -> bool {
    s.len() == 6 && NaiveTime::parse_from_str(s, "%H%M%S").is_ok()
}

pub(crate) fn code_error(table: CodeTable, value: &str) -> DocumentError {
    DocumentError::InvalidCode {
        table: table.as_str(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fiu_doc_num_decodes_into_parts() {
        let num = FiuDocNum::parse("AB000120240100001").expect("valid doc num");
        assert_eq!(num.org_code(), "AB0001");
        assert_eq!(num.period(), "202401");
        assert_eq!(num.sequence(), "00001");
        assert_eq!(num.as_str(), "AB000120240100001");
    }

    #[test]
    fn fiu_doc_num_rejects_wrong_length_and_shape() {
        assert!(matches!(
            FiuDocNum::parse("AB00012024010001"),
            Err(DocumentError::InvalidFormat { field: "FiuDocNum", .. })
        ));
        assert!(FiuDocNum::parse("AB000120240100001X").is_err());
        // non-numeric period
        assert!(FiuDocNum::parse("AB0001ABCDEF00001").is_err());
        // month 13
        assert!(FiuDocNum::parse("AB000120241300001").is_err());
    }

    #[test]
    fn date_and_time_format_checks() {
        assert!(is_valid_date("20240131"));
        assert!(!is_valid_date("20240231")); // Feb 31
        assert!(!is_valid_date("2024-01-01"));
        assert!(is_valid_time("143000"));
        assert!(!is_valid_time("246100"));
    }

    #[test]
    fn totals_recompute_partitions_inner_and_outer() {
        let tx = |org: &str, krw: u64| Transaction {
            seq: 1,
            date: "20240105".into(),
            time: "093000".into(),
            channel: CodeRef::new("01", "창구"),
            mean: CodeRef::new("01", "현금"),
            method: CodeRef::new("01", "입금"),
            goods: CodeRef::new("01", "수시입출금 예금"),
            money_type: CodeRef::new("KRW", "한국 원"),
            krw_amount: krw,
            foreign_amount: 0,
            usd_amount: 0,
            org_name: CodeRef::new(org, ""),
            branch_office: None,
            user_relations: Vec::new(),
            account_relations: Vec::new(),
        };
        let txs = vec![
            tx("AB0001", 100),
            tx("CD0002", 40),
            tx("AB0001", 60),
        ];
        let totals = MasterTotals::recompute(&txs, "AB0001");
        assert_eq!(totals.inner_count, 2);
        assert_eq!(totals.outer_count, 1);
        assert_eq!(totals.count, 3);
        assert_eq!(totals.inner_krw_amount, 160);
        assert_eq!(totals.outer_krw_amount, 40);
        assert_eq!(totals.krw_amount, 200);

        let mut declared = totals;
        declared.count = 5;
        let diff = declared.diff(&totals);
        assert_eq!(diff, vec![("Count", 5, 3)]);

        // amount sums saturate rather than overflow
        let huge = vec![tx("AB0001", u64::MAX), tx("AB0001", u64::MAX), tx("CD0002", u64::MAX)];
        let totals = MasterTotals::recompute(&huge, "AB0001");
        assert_eq!(totals.inner_krw_amount, u64::MAX);
        assert_eq!(totals.krw_amount, u64::MAX);
        assert_eq!(totals.count, 3);
    }
}
