//! STR code tables: closed enumerations with label lookup and membership checks.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier of a code table in the current schema release.
///
/// Table names are part of the library's compile-time surface rather than
/// runtime strings, so a request against an unknown table cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CodeTable {
    /// Root `Code` attribute: reporting institution kind (`BA`, `CA`).
    ReportKind,
    /// Reporting organization codes (`OrgName@Code`).
    Org,
    MessageType,
    /// Suspicion question groups (`QuestionTitle@Code`).
    QuestionTitle,
    Channel,
    Mean,
    Method,
    Goods,
    MoneyType,
    RelationRole,
    RealNumberType,
    AccountRole,
    Nationality,
    Gender,
    OccupationType,
    Ksic,
    BizScale,
}

impl CodeTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodeTable::ReportKind => "ReportKind",
            CodeTable::Org => "Org",
            CodeTable::MessageType => "MessageType",
            CodeTable::QuestionTitle => "QuestionTitle",
            CodeTable::Channel => "Channel",
            CodeTable::Mean => "Mean",
            CodeTable::Method => "Method",
            CodeTable::Goods => "Goods",
            CodeTable::MoneyType => "MoneyType",
            CodeTable::RelationRole => "RelationRole",
            CodeTable::RealNumberType => "RealNumberType",
            CodeTable::AccountRole => "AccountRole",
            CodeTable::Nationality => "Nationality",
            CodeTable::Gender => "Gender",
            CodeTable::OccupationType => "OccupationType",
            CodeTable::Ksic => "Ksic",
            CodeTable::BizScale => "BizScale",
        }
    }
}

/// Shape of the `User` entity implied by a RealNumberType code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RealNumberCategory {
    Individual,
    Corporate,
}

/// RealNumberType codes that identify a corporate entity.
const CORPORATE_REAL_NUMBER_CODES: &[&str] = &["03", "05", "08", "09", "12"];

const REPORT_KIND: &[(&str, &str)] = &[("BA", "일반금융기관"), ("CA", "카지노")];

const ORG: &[(&str, &str)] = &[
    ("AB0001", "샘플금융기관"),
    ("CD0002", "미래은행"),
    ("EF0003", "한국증권"),
];

const MESSAGE_TYPE: &[(&str, &str)] = &[
    ("01", "신규보고"),
    ("04", "정정보고"),
    ("96", "반송보고"),
    ("99", "기타"),
];

const QUESTION_TITLE: &[(&str, &str)] = &[
    ("100", "고객 관련 의심유형"),
    ("200", "거래패턴 관련 의심유형"),
    ("300", "자금출처 관련 의심유형"),
    ("400", "기타 의심유형"),
];

const QUESTION_100: &[(&str, &str)] = &[
    ("101", "실명노출 기피 또는 거래에 대한 비밀요구"),
    ("102", "직원에게 과도한 친절 또는 사례 제공"),
    ("103", "업력이나 업체규모, 개인능력에 비해 과다한 거래실적"),
];

const QUESTION_200: &[(&str, &str)] = &[
    ("201", "갑작스러운 거래패턴의 변화"),
    ("207", "거액 입금 후 당일 또는 익일 중 인출"),
    ("215", "빈번한 입출금(입출고)"),
];

const QUESTION_300: &[(&str, &str)] = &[
    ("301", "자금의 출처가 불분명한 거래"),
    ("302", "자금출처 소명 거부"),
];

const QUESTION_400: &[(&str, &str)] = &[("401", "기타 합리적 의심이 드는 거래")];

const CHANNEL: &[(&str, &str)] = &[
    ("01", "창구"),
    ("02", "ATM/CD"),
    ("03", "텔레뱅킹"),
    ("04", "인터넷뱅킹"),
    ("05", "모바일뱅킹"),
    ("99", "기타"),
];

const MEAN: &[(&str, &str)] = &[
    ("01", "현금"),
    ("02", "수표"),
    ("03", "외화"),
    ("06", "대체"),
    ("99", "기타"),
];

const METHOD: &[(&str, &str)] = &[
    ("01", "입금"),
    ("02", "출금"),
    ("03", "환전"),
    ("99", "기타"),
];

const GOODS: &[(&str, &str)] = &[
    ("01", "수시입출금 예금"),
    ("02", "거치식 예금"),
    ("03", "적립식 예금"),
    ("99", "기타"),
];

const MONEY_TYPE: &[(&str, &str)] = &[
    ("KRW", "한국 원"),
    ("USD", "미국 달러"),
    ("JPY", "일본 엔"),
    ("EUR", "유로"),
];

const RELATION_ROLE: &[(&str, &str)] = &[
    ("01", "의심거래자"),
    ("02", "대리인"),
    ("03", "수취인"),
    ("99", "기타"),
];

const REAL_NUMBER_TYPE: &[(&str, &str)] = &[
    ("01", "주민등록번호(개인)"),
    ("02", "주민등록번호(기타단체)"),
    ("03", "사업자등록번호"),
    ("04", "여권번호"),
    ("05", "법인등록번호"),
    ("06", "외국인등록번호"),
    ("07", "국내거소신고번호"),
    ("08", "투자등록번호/LEI"),
    ("09", "고유번호/납세번호"),
    ("11", "BIC코드(SWIFT)"),
    ("12", "해당국가법인번호"),
    ("14", "CI번호"),
    ("99", "기타"),
];

const ACCOUNT_ROLE: &[(&str, &str)] = &[("01", "관련계좌"), ("02", "상대계좌")];

const NATIONALITY: &[(&str, &str)] = &[
    ("KR", "대한민국"),
    ("US", "미국"),
    ("JP", "일본"),
    ("CN", "중국"),
];

const GENDER: &[(&str, &str)] = &[("1", "남"), ("2", "여")];

const OCCUPATION_TYPE: &[(&str, &str)] = &[
    ("01", "직장인"),
    ("02", "자영업"),
    ("03", "전문직"),
    ("99", "기타"),
];

const KSIC: &[(&str, &str)] = &[
    ("46499", "기타 상품 도매업"),
    ("64110", "은행업"),
    ("70113", "경영컨설팅업"),
];

const BIZ_SCALE: &[(&str, &str)] = &[("01", "대기업"), ("02", "중소기업"), ("03", "기타")];

/// Immutable code-table store for one schema release.
///
/// Built once at startup and injected into the builder and the validator;
/// lookups are pure and safe for unsynchronized concurrent reads.
///
/// # Examples
/// ```rust
/// use strdoc_core::codes::{CodeRegistry, CodeTable};
///
/// let codes = CodeRegistry::bundled();
/// assert_eq!(codes.lookup(CodeTable::MoneyType, "KRW"), Some("한국 원"));
/// assert!(!codes.contains(CodeTable::Channel, "42"));
/// ```
#[derive(Debug, Clone)]
pub struct CodeRegistry {
    tables: BTreeMap<CodeTable, &'static [(&'static str, &'static str)]>,
    questions: BTreeMap<&'static str, &'static [(&'static str, &'static str)]>,
}

impl CodeRegistry {
    /// Registry for the bundled schema release (STR 5.0).
    pub fn bundled() -> Self {
        let mut tables = BTreeMap::new();
        tables.insert(CodeTable::ReportKind, REPORT_KIND);
        tables.insert(CodeTable::Org, ORG);
        tables.insert(CodeTable::MessageType, MESSAGE_TYPE);
        tables.insert(CodeTable::QuestionTitle, QUESTION_TITLE);
        tables.insert(CodeTable::Channel, CHANNEL);
        tables.insert(CodeTable::Mean, MEAN);
        tables.insert(CodeTable::Method, METHOD);
        tables.insert(CodeTable::Goods, GOODS);
        tables.insert(CodeTable::MoneyType, MONEY_TYPE);
        tables.insert(CodeTable::RelationRole, RELATION_ROLE);
        tables.insert(CodeTable::RealNumberType, REAL_NUMBER_TYPE);
        tables.insert(CodeTable::AccountRole, ACCOUNT_ROLE);
        tables.insert(CodeTable::Nationality, NATIONALITY);
        tables.insert(CodeTable::Gender, GENDER);
        tables.insert(CodeTable::OccupationType, OCCUPATION_TYPE);
        tables.insert(CodeTable::Ksic, KSIC);
        tables.insert(CodeTable::BizScale, BIZ_SCALE);

        let mut questions = BTreeMap::new();
        questions.insert("100", QUESTION_100);
        questions.insert("200", QUESTION_200);
        questions.insert("300", QUESTION_300);
        questions.insert("400", QUESTION_400);

        Self { tables, questions }
    }

    /// Label bound to `code` in `table`, or `None` if the code is not a member.
    pub fn lookup(&self, table: CodeTable, code: &str) -> Option<&'static str> {
        let entries = self
            .tables
            .get(&table)
            .unwrap_or_else(|| unreachable!("table {} missing from registry", table.as_str()));
        entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, label)| *label)
    }

    pub fn contains(&self, table: CodeTable, code: &str) -> bool {
        self.lookup(table, code).is_some()
    }

    /// Label of a question code, scoped to its owning QuestionTitle code.
    pub fn question_label(&self, title_code: &str, code: &str) -> Option<&'static str> {
        self.questions
            .get(title_code)?
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, label)| *label)
    }

    /// Whether `code` is a valid question under the given QuestionTitle.
    pub fn question_in_title(&self, title_code: &str, code: &str) -> bool {
        self.question_label(title_code, code).is_some()
    }

    /// Individual/Corporate shape implied by a RealNumberType code.
    ///
    /// Returns `None` for codes outside the RealNumberType table.
    pub fn real_number_category(&self, code: &str) -> Option<RealNumberCategory> {
        if !self.contains(CodeTable::RealNumberType, code) {
            return None;
        }
        if CORPORATE_REAL_NUMBER_CODES.contains(&code) {
            Some(RealNumberCategory::Corporate)
        } else {
            Some(RealNumberCategory::Individual)
        }
    }
}

impl Default for CodeRegistry {
    fn default() -> Self {
        CodeRegistry::bundled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_returns_label_for_member_codes() {
        let codes = CodeRegistry::bundled();
        assert_eq!(codes.lookup(CodeTable::Org, "AB0001"), Some("샘플금융기관"));
        assert_eq!(codes.lookup(CodeTable::Channel, "04"), Some("인터넷뱅킹"));
        assert_eq!(
            codes.lookup(CodeTable::RealNumberType, "03"),
            Some("사업자등록번호")
        );
        assert_eq!(codes.lookup(CodeTable::Gender, "9"), None);
    }

    #[test]
    fn question_codes_are_scoped_to_their_title() {
        let codes = CodeRegistry::bundled();
        assert!(codes.question_in_title("100", "101"));
        assert!(codes.question_in_title("200", "207"));
        // 207 belongs to title 200, not 100
        assert!(!codes.question_in_title("100", "207"));
        assert!(!codes.question_in_title("500", "101"));
    }

    #[test]
    fn real_number_category_split() {
        let codes = CodeRegistry::bundled();
        assert_eq!(
            codes.real_number_category("01"),
            Some(RealNumberCategory::Individual)
        );
        assert_eq!(
            codes.real_number_category("03"),
            Some(RealNumberCategory::Corporate)
        );
        assert_eq!(
            codes.real_number_category("12"),
            Some(RealNumberCategory::Corporate)
        );
        assert_eq!(codes.real_number_category("77"), None);
    }

    #[test]
    fn message_types_match_schema_release() {
        let codes = CodeRegistry::bundled();
        for mt in ["01", "04", "96", "99"] {
            assert!(codes.contains(CodeTable::MessageType, mt));
        }
        assert!(!codes.contains(CodeTable::MessageType, "02"));
    }
}
