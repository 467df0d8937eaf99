//! The three canonical example reports (personal, corporate, corporate with
//! multiple transactions), assembled through the builder so they always
//! satisfy the current rule set.
use crate::codes::{CodeRegistry, CodeTable};
use crate::document::{
    Account, AccountRelation, Address, BranchOffice, CodeRef, CorporateFlags, CorporateProfile,
    DetailBuilder, DocumentBuilder, DocumentError, FinalizedDocument, MainAuthor, MasterTotals,
    Organization, Phone, Question, QuestionTitle, RealNumber, RequiredReportFields,
    SuspicionBuilder, SuspicionReport, TransactionFields, User, UserKind, UserRelation,
};

type Result<T> = std::result::Result<T, DocumentError>;

fn coded(codes: &CodeRegistry, table: CodeTable, code: &str) -> CodeRef {
    CodeRef::new(code, codes.lookup(table, code).unwrap_or_default())
}

fn question(codes: &CodeRegistry, title_code: &str, code: &str) -> Question {
    Question {
        code: code.to_string(),
        text: codes
            .question_label(title_code, code)
            .unwrap_or_default()
            .to_string(),
    }
}

fn sample_organization(codes: &CodeRegistry) -> Organization {
    Organization {
        org_name: coded(codes, CodeTable::Org, "AB0001"),
        main_author: MainAuthor {
            userid: "sample01".into(),
            name: "보고담당자".into(),
        },
        manager: "보고책임자".into(),
        phone: "02-1234-5678".into(),
        address: Address::new("12345", "서울특별시 중구 샘플로 100"),
        email: Some("sample@sample.co.kr".into()),
    }
}

fn head_office() -> BranchOffice {
    BranchOffice {
        zip_code: "12345".into(),
        code: "0000001".into(),
        text: "본점".into(),
    }
}

fn corporate_user(codes: &CodeRegistry) -> User {
    User {
        real_number: RealNumber::new("03", "1234567890"),
        real_number_type_name: Some("사업자등록번호".into()),
        name: "샘플주식회사".into(),
        nationality: Some(coded(codes, CodeTable::Nationality, "KR")),
        phone: Some(Phone {
            number: "02-9876-5432".into(),
            hand_phone: None,
        }),
        address: Some(Address::new("06234", "서울특별시 강남구 테헤란로 123")),
        birth_day: Some("20100315".into()),
        kind: UserKind::Corporate(CorporateProfile {
            ceo_name: "김대표".into(),
            ksic: coded(codes, CodeTable::Ksic, "46499"),
            biz_address: Address::new("06234", "서울특별시 강남구 테헤란로 123"),
            biz_tel_no: "02-9876-5432".into(),
            homepage_url: Some("http://www.samplecorp.co.kr".into()),
            biz_scale: coded(codes, CodeTable::BizScale, "02"),
            flags: CorporateFlags::empty(),
        }),
    }
}

fn corporate_account(codes: &CodeRegistry) -> Account {
    Account {
        org_name: coded(codes, CodeTable::Org, "AB0001"),
        branch_office: Some(head_office()),
        account_number: "9876543210123".into(),
        reg_date: Some("20200601".into()),
        account_user: RealNumber::new("03", "1234567890"),
        agent_flag: Some(false),
    }
}

fn transaction(
    codes: &CodeRegistry,
    date: &str,
    time: &str,
    channel: &str,
    mean: &str,
    method: &str,
    krw_amount: u64,
    org_code: &str,
    branch_office: Option<BranchOffice>,
    real_number: RealNumber,
    account_number: &str,
) -> TransactionFields {
    TransactionFields {
        date: date.into(),
        time: time.into(),
        channel: coded(codes, CodeTable::Channel, channel),
        mean: coded(codes, CodeTable::Mean, mean),
        method: coded(codes, CodeTable::Method, method),
        goods: coded(codes, CodeTable::Goods, "01"),
        money_type: coded(codes, CodeTable::MoneyType, "KRW"),
        krw_amount,
        foreign_amount: 0,
        usd_amount: 0,
        org_name: coded(codes, CodeTable::Org, org_code),
        branch_office,
        user_relations: vec![UserRelation {
            relation_role: coded(codes, CodeTable::RelationRole, "01"),
            real_number,
            insu_rel_desc: None,
        }],
        account_relations: vec![AccountRelation {
            org_name: coded(codes, CodeTable::Org, org_code),
            account_number: account_number.into(),
            account_role: coded(codes, CodeTable::AccountRole, "01"),
        }],
    }
}

/// Report about an individual customer, one teller-desk cash deposit.
pub fn personal(codes: &CodeRegistry) -> Result<FinalizedDocument> {
    let suspicion = SuspicionBuilder::new(codes)
        .add_question_title(QuestionTitle {
            code: "100".into(),
            questions: vec![question(codes, "100", "101")],
        })?
        .add_question_title(QuestionTitle {
            code: "200".into(),
            questions: vec![question(codes, "200", "207")],
        })?
        .finish()?;

    let user = User {
        real_number: RealNumber::new("01", "9001011234567"),
        real_number_type_name: Some("주민등록번호(개인)".into()),
        name: "홍길동".into(),
        nationality: Some(coded(codes, CodeTable::Nationality, "KR")),
        phone: Some(Phone {
            number: "02-1234-5678".into(),
            hand_phone: Some("010-1234-5678".into()),
        }),
        address: Some(Address::new("12345", "서울특별시 강남구 샘플로 200")),
        birth_day: Some("19900101".into()),
        kind: UserKind::Individual {
            gender: Some(coded(codes, CodeTable::Gender, "1")),
            occupation_type: Some(coded(codes, CodeTable::OccupationType, "01")),
        },
    };

    let detail = DetailBuilder::new(codes)
        .add_transaction(transaction(
            codes,
            "20240115",
            "143000",
            "01",
            "01",
            "01",
            1_000_000,
            "AB0001",
            Some(head_office()),
            RealNumber::new("01", "9001011234567"),
            "1234567890123",
        ))?
        .user(user)?
        .add_account(Account {
            org_name: coded(codes, CodeTable::Org, "AB0001"),
            branch_office: Some(head_office()),
            account_number: "1234567890123".into(),
            reg_date: Some("20230101".into()),
            account_user: RealNumber::new("01", "9001011234567"),
            agent_flag: Some(false),
        })?
        .finish()?;

    DocumentBuilder::new(
        codes,
        RequiredReportFields {
            report_code: "BA".into(),
            organization: sample_organization(codes),
            fiu_doc_num: "AB000120240100001".into(),
            start_date: "20240101".into(),
            end_date: "20240131".into(),
            message_type_code: "01".into(),
            doc_send_date: "20240201".into(),
            suspicion_report: SuspicionReport {
                who: Some("의심거래자 정보".into()),
                when: Some("2024년 1월 15일".into()),
                r#where: Some("샘플금융기관 본점".into()),
                what: Some("현금 입금".into()),
                how: Some("창구 거래".into()),
                why: "거래 패턴이 일반적이지 않아 의심됨".into(),
                synthetic_opinion:
                    "고객의 거래 패턴이 일반적인 금융거래 양식과 상이하여 의심거래로 판단됨".into(),
                branch_office_score: 3,
                org_score: 3,
                relation_fiu_doc_num: None,
                etc_pecularity_type: None,
            },
        },
    )?
    .suspicion(suspicion)?
    .detail(detail)?
    .build()
}

/// Report about a corporate customer, single large cash deposit.
pub fn corporate(codes: &CodeRegistry) -> Result<FinalizedDocument> {
    let suspicion = SuspicionBuilder::new(codes)
        .add_question_title(QuestionTitle {
            code: "100".into(),
            questions: vec![question(codes, "100", "103")],
        })?
        .add_question_title(QuestionTitle {
            code: "200".into(),
            questions: vec![question(codes, "200", "201")],
        })?
        .finish()?;

    let detail = DetailBuilder::new(codes)
        .add_transaction(transaction(
            codes,
            "20240120",
            "103000",
            "01",
            "01",
            "01",
            50_000_000,
            "AB0001",
            Some(head_office()),
            RealNumber::new("03", "1234567890"),
            "9876543210123",
        ))?
        .user(corporate_user(codes))?
        .add_account(corporate_account(codes))?
        .finish()?;

    DocumentBuilder::new(
        codes,
        RequiredReportFields {
            report_code: "BA".into(),
            organization: sample_organization(codes),
            fiu_doc_num: "AB000120240100002".into(),
            start_date: "20240101".into(),
            end_date: "20240131".into(),
            message_type_code: "01".into(),
            doc_send_date: "20240201".into(),
            suspicion_report: SuspicionReport {
                who: Some("법인 의심거래자 정보".into()),
                when: Some("2024년 1월 20일".into()),
                r#where: Some("샘플금융기관 본점".into()),
                what: Some("법인 계좌 입금".into()),
                how: Some("창구 거래".into()),
                why: "법인 규모 대비 과다한 거래금액으로 의심됨".into(),
                synthetic_opinion:
                    "법인의 업력 및 규모 대비 과다한 거래금액이 발생하여 의심거래로 판단됨".into(),
                branch_office_score: 4,
                org_score: 4,
                relation_fiu_doc_num: None,
                etc_pecularity_type: None,
            },
        },
    )?
    .suspicion(suspicion)?
    .detail(detail)?
    .build()
}

/// Corporate report with five transactions, three at the reporting
/// institution and two at an outside one (inner 3 / outer 2 split).
pub fn corporate_multi_tx(codes: &CodeRegistry) -> Result<FinalizedDocument> {
    let suspicion = SuspicionBuilder::new(codes)
        .add_question_title(QuestionTitle {
            code: "100".into(),
            questions: vec![question(codes, "100", "103")],
        })?
        .add_question_title(QuestionTitle {
            code: "200".into(),
            questions: vec![
                question(codes, "200", "207"),
                question(codes, "200", "215"),
            ],
        })?
        .finish()?;

    let corp_id = || RealNumber::new("03", "1234567890");
    let detail = DetailBuilder::new(codes)
        .add_transaction(transaction(
            codes,
            "20240105",
            "093000",
            "01",
            "01",
            "01",
            50_000_000,
            "AB0001",
            Some(head_office()),
            corp_id(),
            "9876543210123",
        ))?
        .add_transaction(transaction(
            codes,
            "20240105",
            "153000",
            "01",
            "01",
            "02",
            30_000_000,
            "CD0002",
            None,
            corp_id(),
            "9876543210123",
        ))?
        .add_transaction(transaction(
            codes,
            "20240115",
            "101500",
            "04",
            "06",
            "01",
            70_000_000,
            "AB0001",
            None,
            corp_id(),
            "9876543210123",
        ))?
        .add_transaction(transaction(
            codes,
            "20240116",
            "140000",
            "01",
            "01",
            "02",
            50_000_000,
            "CD0002",
            None,
            corp_id(),
            "9876543210123",
        ))?
        .add_transaction(transaction(
            codes,
            "20240125",
            "111500",
            "01",
            "01",
            "01",
            30_000_000,
            "AB0001",
            Some(head_office()),
            corp_id(),
            "9876543210123",
        ))?
        .user(corporate_user(codes))?
        .add_account(corporate_account(codes))?
        .finish()?;

    DocumentBuilder::new(
        codes,
        RequiredReportFields {
            report_code: "BA".into(),
            organization: sample_organization(codes),
            fiu_doc_num: "AB000120240100003".into(),
            start_date: "20240101".into(),
            end_date: "20240131".into(),
            message_type_code: "01".into(),
            doc_send_date: "20240201".into(),
            suspicion_report: SuspicionReport {
                who: Some("법인 의심거래자 정보".into()),
                when: Some("2024년 1월".into()),
                r#where: Some("샘플금융기관 본점 및 강남지점".into()),
                what: Some("법인 계좌 다수 입출금".into()),
                how: Some("창구 및 인터넷뱅킹 거래".into()),
                why: "법인 규모 대비 과다한 거래금액 및 빈번한 입출금으로 의심됨".into(),
                synthetic_opinion:
                    "법인의 업력 및 규모 대비 과다한 거래금액이 다수 발생하고 입금 후 단기간 내 출금이 반복되어 의심거래로 판단됨"
                        .into(),
                branch_office_score: 4,
                org_score: 5,
                relation_fiu_doc_num: None,
                etc_pecularity_type: None,
            },
        },
    )?
    .suspicion(suspicion)?
    .declared_totals(MasterTotals {
        inner_count: 3,
        outer_count: 2,
        inner_krw_amount: 150_000_000,
        outer_krw_amount: 80_000_000,
        inner_usd_amount: 0,
        outer_usd_amount: 0,
        count: 5,
        krw_amount: 230_000_000,
        usd_amount: 0,
    })?
    .detail(detail)?
    .build()
}
