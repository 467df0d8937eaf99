//! XML serialization for STR documents.
//!
//! The wire layout is the KOFIU STR 5.0 document: a `str:STR` root with
//! `Version`/`Code` attributes, code-qualified leaf elements, and EUC-KR as
//! the canonical on-the-wire encoding. [`to_xml`] produces the document text;
//! [`to_euc_kr`] converts it to wire bytes.
pub mod parse;

pub use parse::{parse_document, parse_document_euc_kr, ParseError};

use super::{
    Account, AccountRelation, BranchOffice, Detail, Master, Organization, StrDocument, Suspicion,
    SuspicionReport, Transaction, User, UserKind, UserRelation,
};
use crate::document::CorporateFlags;
use quick_xml::se::{SeError, Serializer as QuickXmlSerializer};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use thiserror::Error;

pub(crate) const STR_NS: &str = "http://www.kofiu.go.kr/str";
pub(crate) const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"EUC-KR\"?>\n";

/// XML serialization error.
#[derive(Debug, Error)]
pub enum XmlWriteError {
    #[error("failed to serialize document to XML: {source}")]
    Serialize {
        #[from]
        source: SeError,
    },
}

/// Serialize a document to its XML text (tab-indented, declaration included).
///
/// # Examples
/// ```rust,no_run
/// use strdoc_core::document::{xml, StrDocument};
///
/// # let doc: StrDocument = unimplemented!();
/// let text = xml::to_xml(&doc)?;
/// assert!(text.starts_with("<?xml"));
/// # Ok::<(), strdoc_core::document::xml::XmlWriteError>(())
/// ```
pub fn to_xml(doc: &StrDocument) -> Result<String, XmlWriteError> {
    let mut body = String::new();
    let mut ser = QuickXmlSerializer::with_root(&mut body, Some("str:STR"))?;
    ser.indent('\t', 1);
    StrXml(doc).serialize(ser)?;
    Ok(format!("{XML_DECL}{body}"))
}

/// Serialize a document to canonical wire bytes (EUC-KR).
pub fn to_euc_kr(doc: &StrDocument) -> Result<Vec<u8>, XmlWriteError> {
    let text = to_xml(doc)?;
    let (bytes, _, _) = encoding_rs::EUC_KR.encode(&text);
    Ok(bytes.into_owned())
}

struct StrXml<'a>(&'a StrDocument);

impl Serialize for StrXml<'_> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let doc = self.0;
        let mut st = s.serialize_struct("str:STR", 9)?;
        st.serialize_field("@xmlns:str", STR_NS)?;
        st.serialize_field("@xmlns:xsi", XSI_NS)?;
        st.serialize_field("@xsi:schemaLocation", STR_NS)?;
        st.serialize_field("@Version", &doc.version)?;
        st.serialize_field("@Code", &doc.report_code)?;
        st.serialize_field("Organization", &OrganizationXml(&doc.organization))?;
        st.serialize_field("Master", &MasterXml(&doc.master))?;
        st.serialize_field("Detail", &DetailXml(&doc.detail))?;
        st.serialize_field("FileAttach", &FileAttachXml(doc))?;
        st.end()
    }
}

struct OrganizationXml<'a>(&'a Organization);

impl Serialize for OrganizationXml<'_> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let org = self.0;
        let mut st = s.serialize_struct("Organization", 6)?;
        st.serialize_field(
            "OrgName",
            &coded_text(&org.org_name.code, &org.org_name.text),
        )?;
        st.serialize_field(
            "MainAuthor",
            &attr_text("@Userid", &org.main_author.userid, &org.main_author.name),
        )?;
        st.serialize_field("Manager", &org.manager)?;
        st.serialize_field("Phone", &org.phone)?;
        st.serialize_field(
            "Address",
            &attr_text("@ZipCode", &org.address.zip_code, &org.address.text),
        )?;
        if let Some(email) = &org.email {
            st.serialize_field("Email", email)?;
        }
        st.end()
    }
}

struct MasterXml<'a>(&'a Master);

impl Serialize for MasterXml<'_> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let master = self.0;
        let totals = &master.totals;
        let mut st = s.serialize_struct("Master", 17)?;
        st.serialize_field("FiuDocNum", &master.fiu_doc_num)?;
        st.serialize_field(
            "FormerFiuDocNum",
            master.former_fiu_doc_num.as_deref().unwrap_or(""),
        )?;
        st.serialize_field("StartDate", &master.start_date)?;
        st.serialize_field("EndDate", &master.end_date)?;
        st.serialize_field("InnerCount", &totals.inner_count)?;
        st.serialize_field("OuterCount", &totals.outer_count)?;
        st.serialize_field("InnerKRWAmount", &totals.inner_krw_amount)?;
        st.serialize_field("OuterKRWAmount", &totals.outer_krw_amount)?;
        st.serialize_field("InnerUSDAmount", &totals.inner_usd_amount)?;
        st.serialize_field("OuterUSDAmount", &totals.outer_usd_amount)?;
        st.serialize_field("Count", &totals.count)?;
        st.serialize_field("KRWAmount", &totals.krw_amount)?;
        st.serialize_field("USDAmount", &totals.usd_amount)?;
        st.serialize_field("MessageTypeCode", &master.message_type_code)?;
        st.serialize_field("DocSendDate", &master.doc_send_date)?;
        if let Some(suspicion) = &master.suspicion {
            st.serialize_field("Suspicion", &SuspicionXml(suspicion))?;
        }
        st.serialize_field(
            "SuspicionReport",
            &SuspicionReportXml(&master.suspicion_report),
        )?;
        st.end()
    }
}

struct SuspicionXml<'a>(&'a Suspicion);

impl Serialize for SuspicionXml<'_> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        struct TitleXml<'a>(&'a super::QuestionTitle);
        impl Serialize for TitleXml<'_> {
            fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                let mut st = s.serialize_struct("QuestionTitle", 2)?;
                st.serialize_field("@Code", &self.0.code)?;
                let questions: Vec<_> = self
                    .0
                    .questions
                    .iter()
                    .map(|q| coded_text_owned(q.code.clone(), q.text.clone()))
                    .collect();
                st.serialize_field("Question", &questions)?;
                st.end()
            }
        }

        let titles: Vec<_> = self.0.question_titles.iter().map(TitleXml).collect();
        let mut st = s.serialize_struct("Suspicion", 1)?;
        st.serialize_field("QuestionTitle", &titles)?;
        st.end()
    }
}

struct SuspicionReportXml<'a>(&'a SuspicionReport);

impl Serialize for SuspicionReportXml<'_> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let report = self.0;
        let mut st = s.serialize_struct("SuspicionReport", 12)?;
        for (tag, value) in [
            ("Who", &report.who),
            ("When", &report.when),
            ("Where", &report.r#where),
            ("What", &report.what),
            ("How", &report.how),
        ] {
            if let Some(value) = value {
                st.serialize_field(tag, value)?;
            }
        }
        st.serialize_field("Why", &report.why)?;
        st.serialize_field("SyntheticOpinion", &report.synthetic_opinion)?;
        st.serialize_field("BranchOfficeScore", &report.branch_office_score)?;
        st.serialize_field("OrgScore", &report.org_score)?;
        st.serialize_field(
            "RelationFiuDocNum",
            report.relation_fiu_doc_num.as_deref().unwrap_or(""),
        )?;
        st.serialize_field(
            "EtcPecularityType",
            report.etc_pecularity_type.as_deref().unwrap_or(""),
        )?;
        st.end()
    }
}

struct DetailXml<'a>(&'a Detail);

impl Serialize for DetailXml<'_> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let detail = self.0;
        let transactions: Vec<_> = detail.transactions.iter().map(TransactionXml).collect();
        let accounts: Vec<_> = detail.accounts.iter().map(AccountXml).collect();
        let mut st = s.serialize_struct("Detail", 3)?;
        st.serialize_field("Transaction", &transactions)?;
        st.serialize_field("User", &UserXml(&detail.user))?;
        if !accounts.is_empty() {
            st.serialize_field("Account", &accounts)?;
        }
        st.end()
    }
}

struct TransactionXml<'a>(&'a Transaction);

impl Serialize for TransactionXml<'_> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let tx = self.0;
        let mut st = s.serialize_struct("Transaction", 16)?;
        st.serialize_field("Seq", &tx.seq)?;
        st.serialize_field("Date", &tx.date)?;
        st.serialize_field("Time", &tx.time)?;
        st.serialize_field("Channel", &coded_text(&tx.channel.code, &tx.channel.text))?;
        st.serialize_field("Mean", &coded_text(&tx.mean.code, &tx.mean.text))?;
        st.serialize_field("Method", &coded_text(&tx.method.code, &tx.method.text))?;
        st.serialize_field("Goods", &coded_text(&tx.goods.code, &tx.goods.text))?;
        st.serialize_field(
            "MoneyType",
            &coded_text(&tx.money_type.code, &tx.money_type.text),
        )?;
        st.serialize_field("KRWAmount", &tx.krw_amount)?;
        st.serialize_field("ForeignAmount", &tx.foreign_amount)?;
        st.serialize_field("USDAmount", &tx.usd_amount)?;
        st.serialize_field("OrgName", &coded_text(&tx.org_name.code, &tx.org_name.text))?;
        if let Some(branch) = &tx.branch_office {
            st.serialize_field("BranchOffice", &BranchOfficeXml(branch))?;
        }
        let user_relations: Vec<_> = tx.user_relations.iter().map(UserRelationXml).collect();
        st.serialize_field("UserRelation", &user_relations)?;
        if !tx.account_relations.is_empty() {
            let account_relations: Vec<_> =
                tx.account_relations.iter().map(AccountRelationXml).collect();
            st.serialize_field("AccountRelation", &account_relations)?;
        }
        st.end()
    }
}

struct UserRelationXml<'a>(&'a UserRelation);

impl Serialize for UserRelationXml<'_> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let rel = self.0;
        let mut st = s.serialize_struct("UserRelation", 3)?;
        st.serialize_field(
            "RelationRole",
            &coded_text(&rel.relation_role.code, &rel.relation_role.text),
        )?;
        st.serialize_field(
            "RealNumber",
            &coded_text(&rel.real_number.code, &rel.real_number.value),
        )?;
        st.serialize_field("InsuRelDesc", rel.insu_rel_desc.as_deref().unwrap_or(""))?;
        st.end()
    }
}

struct AccountRelationXml<'a>(&'a AccountRelation);

impl Serialize for AccountRelationXml<'_> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let rel = self.0;
        let mut st = s.serialize_struct("AccountRelation", 3)?;
        st.serialize_field("OrgName", &coded_text(&rel.org_name.code, &rel.org_name.text))?;
        st.serialize_field("AccountNumber", &rel.account_number)?;
        st.serialize_field(
            "AccountRole",
            &coded_text(&rel.account_role.code, &rel.account_role.text),
        )?;
        st.end()
    }
}

struct UserXml<'a>(&'a User);

impl Serialize for UserXml<'_> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let user = self.0;
        let mut st = s.serialize_struct("User", 18)?;
        st.serialize_field(
            "RealNumber",
            &coded_text(&user.real_number.code, &user.real_number.value),
        )?;
        if let Some(name) = &user.real_number_type_name {
            st.serialize_field("RealNumberTypeName", name)?;
        }
        st.serialize_field("Name", &user.name)?;
        if let Some(nationality) = &user.nationality {
            st.serialize_field(
                "Nationality",
                &coded_text(&nationality.code, &nationality.text),
            )?;
        }
        if let Some(phone) = &user.phone {
            st.serialize_field(
                "Phone",
                &attr_text(
                    "@HandPhone",
                    phone.hand_phone.as_deref().unwrap_or(""),
                    &phone.number,
                ),
            )?;
        }
        if let Some(address) = &user.address {
            st.serialize_field(
                "Address",
                &attr_text("@ZipCode", &address.zip_code, &address.text),
            )?;
        }
        if let Some(birth_day) = &user.birth_day {
            st.serialize_field("BirthDay", birth_day)?;
        }
        match &user.kind {
            UserKind::Individual {
                gender,
                occupation_type,
            } => {
                if let Some(gender) = gender {
                    st.serialize_field("Gender", &coded_text(&gender.code, &gender.text))?;
                }
                if let Some(occupation) = occupation_type {
                    st.serialize_field(
                        "OccupationType",
                        &coded_text(&occupation.code, &occupation.text),
                    )?;
                }
            }
            UserKind::Corporate(profile) => {
                st.serialize_field("CeoName", &profile.ceo_name)?;
                st.serialize_field(
                    "KSIC",
                    &coded_text(&profile.ksic.code, &profile.ksic.text),
                )?;
                st.serialize_field(
                    "BizAddress",
                    &attr_text(
                        "@ZipCode",
                        &profile.biz_address.zip_code,
                        &profile.biz_address.text,
                    ),
                )?;
                st.serialize_field("BizTelNo", &profile.biz_tel_no)?;
                if let Some(url) = &profile.homepage_url {
                    st.serialize_field("HomepageURL", url)?;
                }
                st.serialize_field(
                    "BizScale",
                    &coded_text(&profile.biz_scale.code, &profile.biz_scale.text),
                )?;
                st.serialize_field(
                    "IsBankingOrgan",
                    yn(profile.flags.contains(CorporateFlags::BANKING_ORGAN)),
                )?;
                st.serialize_field(
                    "IsNonProfitCorp",
                    yn(profile.flags.contains(CorporateFlags::NON_PROFIT_CORP)),
                )?;
                st.serialize_field(
                    "IsNationalPublicGroup",
                    yn(profile.flags.contains(CorporateFlags::NATIONAL_PUBLIC_GROUP)),
                )?;
                st.serialize_field(
                    "IsStockList",
                    yn(profile.flags.contains(CorporateFlags::STOCK_LIST)),
                )?;
            }
        }
        st.end()
    }
}

struct AccountXml<'a>(&'a Account);

impl Serialize for AccountXml<'_> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let account = self.0;
        let mut st = s.serialize_struct("Account", 6)?;
        st.serialize_field(
            "OrgName",
            &coded_text(&account.org_name.code, &account.org_name.text),
        )?;
        if let Some(branch) = &account.branch_office {
            st.serialize_field("BranchOffice", &BranchOfficeXml(branch))?;
        }
        st.serialize_field("AccountNumber", &account.account_number)?;
        if let Some(reg_date) = &account.reg_date {
            st.serialize_field("RegDate", reg_date)?;
        }
        st.serialize_field(
            "AccountUser",
            &coded_text(&account.account_user.code, &account.account_user.value),
        )?;
        st.serialize_field("AgentFlag", account.agent_flag.map(yn).unwrap_or(""))?;
        st.end()
    }
}

struct BranchOfficeXml<'a>(&'a BranchOffice);

impl Serialize for BranchOfficeXml<'_> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let branch = self.0;
        let mut st = s.serialize_struct("BranchOffice", 3)?;
        st.serialize_field("@ZipCode", &branch.zip_code)?;
        st.serialize_field("@Code", &branch.code)?;
        st.serialize_field("$text", &branch.text)?;
        st.end()
    }
}

struct FileAttachXml<'a>(&'a StrDocument);

impl Serialize for FileAttachXml<'_> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let files = &self.0.file_attach;
        if files.is_empty() {
            return s.serialize_str("");
        }
        let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
        let mut st = s.serialize_struct("FileAttach", 1)?;
        st.serialize_field("File", &names)?;
        st.end()
    }
}

fn coded_text<'a>(code: &'a str, text: &'a str) -> impl Serialize + 'a {
    AttrText {
        attr: "@Code",
        attr_value: code,
        text,
    }
}

fn coded_text_owned(code: String, text: String) -> impl Serialize {
    OwnedAttrText {
        attr: "@Code",
        attr_value: code,
        text,
    }
}

fn attr_text<'a>(attr: &'static str, attr_value: &'a str, text: &'a str) -> impl Serialize + 'a {
    AttrText {
        attr,
        attr_value,
        text,
    }
}

fn yn(value: bool) -> &'static str {
    if value {
        "Y"
    } else {
        "N"
    }
}

struct AttrText<'a> {
    attr: &'static str,
    attr_value: &'a str,
    text: &'a str,
}

impl Serialize for AttrText<'_> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut st = s.serialize_struct("AttrText", 2)?;
        st.serialize_field(self.attr, self.attr_value)?;
        st.serialize_field("$text", self.text)?;
        st.end()
    }
}

struct OwnedAttrText {
    attr: &'static str,
    attr_value: String,
    text: String,
}

impl Serialize for OwnedAttrText {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut st = s.serialize_struct("AttrText", 2)?;
        st.serialize_field(self.attr, &self.attr_value)?;
        st.serialize_field("$text", &self.text)?;
        st.end()
    }
}
