//! XML parsing for STR documents.
//!
//! Parsing is deliberately lenient about rule-level content: it errors only on
//! unreadable XML and missing structural anchors, and maps everything else
//! into the typed tree as-is so [`crate::document::validate::validate`] can
//! report the complete diagnostic list for an externally sourced file.
use crate::document::{
    Account, AccountRelation, Address, BranchOffice, CodeRef, CorporateFlags, CorporateProfile,
    Detail, FileAttach, MainAuthor, Master, MasterTotals, Organization, Phone, Question,
    QuestionTitle, RealNumber, StrDocument, Suspicion, SuspicionReport, Transaction, User,
    UserKind, UserRelation,
};
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

/// Errors emitted while parsing XML documents.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("XML parse error: {0}")]
    XmlParse(String),
    #[error("input is not valid EUC-KR")]
    Encoding,
    #[error("missing required element: {0}")]
    MissingElement(&'static str),
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

/// Parse a document from XML text.
///
/// # Examples
/// ```rust,no_run
/// use strdoc_core::document::xml::parse_document;
///
/// let xml = std::fs::read_to_string("report.xml")?;
/// let doc = parse_document(&xml)?;
/// # let _ = doc;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_document(xml: &str) -> Result<StrDocument, ParseError> {
    let root = read_tree(xml)?;
    if root.local_name() != "STR" {
        return Err(ParseError::InvalidValue {
            field: "root element",
            value: root.name.clone(),
        });
    }
    parse_str_root(&root)
}

/// Parse a document from canonical wire bytes (EUC-KR).
pub fn parse_document_euc_kr(bytes: &[u8]) -> Result<StrDocument, ParseError> {
    let (text, _, had_errors) = encoding_rs::EUC_KR.decode(bytes);
    if had_errors {
        return Err(ParseError::Encoding);
    }
    parse_document(&text)
}

// A minimal in-memory element: enough structure to map the STR layout
// without dragging in a DOM library.
#[derive(Debug, Default)]
struct Elem {
    name: String,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<Elem>,
}

impl Elem {
    fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn child(&self, name: &str) -> Option<&Elem> {
        self.children.iter().find(|c| c.local_name() == name)
    }

    fn children_named<'e>(&'e self, name: &'e str) -> impl Iterator<Item = &'e Elem> {
        self.children.iter().filter(move |c| c.local_name() == name)
    }

    fn text_of(&self, name: &str) -> String {
        self.child(name).map(|c| c.text.clone()).unwrap_or_default()
    }

    fn opt_text_of(&self, name: &str) -> Option<String> {
        let text = self.text_of(name);
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn coded(&self, name: &str) -> CodeRef {
        match self.child(name) {
            Some(child) => CodeRef::new(child.attr("Code").unwrap_or(""), child.text.as_str()),
            None => CodeRef::new("", ""),
        }
    }
}

fn read_tree(xml: &str) -> Result<Elem, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let xml_err = |e: quick_xml::Error| ParseError::XmlParse(format!("{e:?}"));
    let mut stack: Vec<Elem> = Vec::new();

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(start) => {
                stack.push(elem_from_start(&start)?);
            }
            Event::Empty(start) => {
                let elem = elem_from_start(&start)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(elem),
                    None => return Ok(elem),
                }
            }
            Event::Text(text) => {
                let value = text
                    .unescape()
                    .map_err(|e| ParseError::XmlParse(format!("{e:?}")))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&value);
                }
            }
            Event::End(_) => {
                let elem = stack
                    .pop()
                    .ok_or_else(|| ParseError::XmlParse("unbalanced end tag".into()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(elem),
                    None => return Ok(elem),
                }
            }
            Event::Eof => {
                return Err(ParseError::XmlParse("no root element".into()));
            }
            // declaration, comments, PIs, CDATA markers
            _ => {}
        }
    }
}

fn elem_from_start(start: &quick_xml::events::BytesStart<'_>) -> Result<Elem, ParseError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| ParseError::XmlParse(format!("{e:?}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| ParseError::XmlParse(format!("{e:?}")))?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(Elem {
        name,
        attrs,
        text: String::new(),
        children: Vec::new(),
    })
}

fn parse_str_root(root: &Elem) -> Result<StrDocument, ParseError> {
    let organization = root
        .child("Organization")
        .ok_or(ParseError::MissingElement("Organization"))?;
    let master = root
        .child("Master")
        .ok_or(ParseError::MissingElement("Master"))?;
    let detail = root
        .child("Detail")
        .ok_or(ParseError::MissingElement("Detail"))?;

    let file_attach = match root.child("FileAttach") {
        Some(attach) => attach
            .children_named("File")
            .map(|f| FileAttach {
                file_name: f.text.clone(),
            })
            .collect(),
        None => Vec::new(),
    };

    Ok(StrDocument {
        version: root.attr("Version").unwrap_or_default().to_string(),
        report_code: root.attr("Code").unwrap_or_default().to_string(),
        organization: parse_organization(organization),
        master: parse_master(master)?,
        detail: parse_detail(detail)?,
        file_attach,
    })
}

fn parse_organization(elem: &Elem) -> Organization {
    let main_author = match elem.child("MainAuthor") {
        Some(author) => MainAuthor {
            userid: author.attr("Userid").unwrap_or_default().to_string(),
            name: author.text.clone(),
        },
        None => MainAuthor {
            userid: String::new(),
            name: String::new(),
        },
    };
    Organization {
        org_name: elem.coded("OrgName"),
        main_author,
        manager: elem.text_of("Manager"),
        phone: elem.text_of("Phone"),
        address: parse_address(elem.child("Address")),
        email: elem.opt_text_of("Email"),
    }
}

fn parse_address(elem: Option<&Elem>) -> Address {
    match elem {
        Some(elem) => Address::new(elem.attr("ZipCode").unwrap_or_default(), elem.text.as_str()),
        None => Address::new("", ""),
    }
}

fn parse_master(elem: &Elem) -> Result<Master, ParseError> {
    let suspicion = elem.child("Suspicion").map(parse_suspicion);
    let report = elem
        .child("SuspicionReport")
        .ok_or(ParseError::MissingElement("Master/SuspicionReport"))?;

    Ok(Master {
        fiu_doc_num: elem.text_of("FiuDocNum"),
        former_fiu_doc_num: elem.opt_text_of("FormerFiuDocNum"),
        start_date: elem.text_of("StartDate"),
        end_date: elem.text_of("EndDate"),
        totals: MasterTotals {
            inner_count: parse_amount(elem, "InnerCount")?,
            outer_count: parse_amount(elem, "OuterCount")?,
            inner_krw_amount: parse_amount(elem, "InnerKRWAmount")?,
            outer_krw_amount: parse_amount(elem, "OuterKRWAmount")?,
            inner_usd_amount: parse_amount(elem, "InnerUSDAmount")?,
            outer_usd_amount: parse_amount(elem, "OuterUSDAmount")?,
            count: parse_amount(elem, "Count")?,
            krw_amount: parse_amount(elem, "KRWAmount")?,
            usd_amount: parse_amount(elem, "USDAmount")?,
        },
        message_type_code: elem.text_of("MessageTypeCode"),
        doc_send_date: elem.text_of("DocSendDate"),
        suspicion,
        suspicion_report: parse_suspicion_report(report),
    })
}

fn parse_suspicion(elem: &Elem) -> Suspicion {
    Suspicion {
        question_titles: elem
            .children_named("QuestionTitle")
            .map(|title| QuestionTitle {
                code: title.attr("Code").unwrap_or_default().to_string(),
                questions: title
                    .children_named("Question")
                    .map(|q| Question {
                        code: q.attr("Code").unwrap_or_default().to_string(),
                        text: q.text.clone(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn parse_suspicion_report(elem: &Elem) -> SuspicionReport {
    SuspicionReport {
        who: elem.opt_text_of("Who"),
        when: elem.opt_text_of("When"),
        r#where: elem.opt_text_of("Where"),
        what: elem.opt_text_of("What"),
        how: elem.opt_text_of("How"),
        why: elem.text_of("Why"),
        synthetic_opinion: elem.text_of("SyntheticOpinion"),
        branch_office_score: elem.text_of("BranchOfficeScore").trim().parse().unwrap_or(0),
        org_score: elem.text_of("OrgScore").trim().parse().unwrap_or(0),
        relation_fiu_doc_num: elem.opt_text_of("RelationFiuDocNum"),
        etc_pecularity_type: elem.opt_text_of("EtcPecularityType"),
    }
}

fn parse_detail(elem: &Elem) -> Result<Detail, ParseError> {
    let user = elem
        .child("User")
        .ok_or(ParseError::MissingElement("Detail/User"))?;
    let transactions = elem
        .children_named("Transaction")
        .map(parse_transaction)
        .collect::<Result<Vec<_>, _>>()?;
    let accounts = elem
        .children_named("Account")
        .map(parse_account)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Detail {
        transactions,
        user: parse_user(user),
        accounts,
    })
}

fn parse_transaction(elem: &Elem) -> Result<Transaction, ParseError> {
    let seq = elem
        .text_of("Seq")
        .trim()
        .parse()
        .map_err(|_| ParseError::InvalidValue {
            field: "Transaction/Seq",
            value: elem.text_of("Seq"),
        })?;

    Ok(Transaction {
        seq,
        date: elem.text_of("Date"),
        time: elem.text_of("Time"),
        channel: elem.coded("Channel"),
        mean: elem.coded("Mean"),
        method: elem.coded("Method"),
        goods: elem.coded("Goods"),
        money_type: elem.coded("MoneyType"),
        krw_amount: parse_amount(elem, "KRWAmount")?,
        foreign_amount: parse_amount(elem, "ForeignAmount")?,
        usd_amount: parse_amount(elem, "USDAmount")?,
        org_name: elem.coded("OrgName"),
        branch_office: elem.child("BranchOffice").map(parse_branch_office),
        user_relations: elem
            .children_named("UserRelation")
            .map(parse_user_relation)
            .collect(),
        account_relations: elem
            .children_named("AccountRelation")
            .map(parse_account_relation)
            .collect(),
    })
}

fn parse_branch_office(elem: &Elem) -> BranchOffice {
    BranchOffice {
        zip_code: elem.attr("ZipCode").unwrap_or_default().to_string(),
        code: elem.attr("Code").unwrap_or_default().to_string(),
        text: elem.text.clone(),
    }
}

fn parse_user_relation(elem: &Elem) -> UserRelation {
    let real_number = match elem.child("RealNumber") {
        Some(num) => RealNumber::new(num.attr("Code").unwrap_or(""), num.text.as_str()),
        None => RealNumber::new("", ""),
    };
    UserRelation {
        relation_role: elem.coded("RelationRole"),
        real_number,
        insu_rel_desc: elem.opt_text_of("InsuRelDesc"),
    }
}

fn parse_account_relation(elem: &Elem) -> AccountRelation {
    AccountRelation {
        org_name: elem.coded("OrgName"),
        account_number: elem.text_of("AccountNumber"),
        account_role: elem.coded("AccountRole"),
    }
}

const CORPORATE_MARKERS: &[&str] = &[
    "CeoName",
    "KSIC",
    "BizAddress",
    "BizTelNo",
    "HomepageURL",
    "BizScale",
    "IsBankingOrgan",
    "IsNonProfitCorp",
    "IsNationalPublicGroup",
    "IsStockList",
];

fn parse_user(elem: &Elem) -> User {
    let real_number = match elem.child("RealNumber") {
        Some(num) => RealNumber::new(num.attr("Code").unwrap_or(""), num.text.as_str()),
        None => RealNumber::new("", ""),
    };
    let phone = elem.child("Phone").map(|p| Phone {
        number: p.text.clone(),
        hand_phone: p
            .attr("HandPhone")
            .filter(|v| !v.trim().is_empty())
            .map(str::to_string),
    });

    // The variant is keyed by which field set the document actually carries;
    // the validator compares it against the RealNumber code's category.
    let corporate = CORPORATE_MARKERS
        .iter()
        .any(|marker| elem.child(marker).is_some());
    let kind = if corporate {
        let mut flags = CorporateFlags::empty();
        for (marker, flag) in [
            ("IsBankingOrgan", CorporateFlags::BANKING_ORGAN),
            ("IsNonProfitCorp", CorporateFlags::NON_PROFIT_CORP),
            ("IsNationalPublicGroup", CorporateFlags::NATIONAL_PUBLIC_GROUP),
            ("IsStockList", CorporateFlags::STOCK_LIST),
        ] {
            if elem.text_of(marker).trim() == "Y" {
                flags |= flag;
            }
        }
        UserKind::Corporate(CorporateProfile {
            ceo_name: elem.text_of("CeoName"),
            ksic: elem.coded("KSIC"),
            biz_address: parse_address(elem.child("BizAddress")),
            biz_tel_no: elem.text_of("BizTelNo"),
            homepage_url: elem.opt_text_of("HomepageURL"),
            biz_scale: elem.coded("BizScale"),
            flags,
        })
    } else {
        UserKind::Individual {
            gender: elem.child("Gender").map(|_| elem.coded("Gender")),
            occupation_type: elem
                .child("OccupationType")
                .map(|_| elem.coded("OccupationType")),
        }
    };

    User {
        real_number,
        real_number_type_name: elem.opt_text_of("RealNumberTypeName"),
        name: elem.text_of("Name"),
        nationality: elem.child("Nationality").map(|_| elem.coded("Nationality")),
        phone,
        address: elem.child("Address").map(|a| parse_address(Some(a))),
        birth_day: elem.opt_text_of("BirthDay"),
        kind,
    }
}

fn parse_account(elem: &Elem) -> Result<Account, ParseError> {
    let account_user = match elem.child("AccountUser") {
        Some(user) => RealNumber::new(user.attr("Code").unwrap_or(""), user.text.as_str()),
        None => RealNumber::new("", ""),
    };
    // absent or empty stays None so the validator can report it missing
    let agent_flag = match elem.text_of("AgentFlag").trim() {
        "Y" => Some(true),
        "N" => Some(false),
        "" => None,
        other => {
            return Err(ParseError::InvalidValue {
                field: "Account/AgentFlag",
                value: other.to_string(),
            })
        }
    };
    Ok(Account {
        org_name: elem.coded("OrgName"),
        branch_office: elem.child("BranchOffice").map(parse_branch_office),
        account_number: elem.text_of("AccountNumber"),
        reg_date: elem.opt_text_of("RegDate"),
        account_user,
        agent_flag,
    })
}

fn parse_amount(elem: &Elem, name: &'static str) -> Result<u64, ParseError> {
    let text = elem.text_of(name);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed.parse().map_err(|_| ParseError::InvalidValue {
        field: name,
        value: text,
    })
}
