use strdoc_core::codes::{CodeRegistry, CodeTable};
use strdoc_core::document::{
    Account, AccountRelation, Address, CodeRef, DetailBuilder, DocumentBuilder, FinalizedDocument,
    MainAuthor, Organization, Phone, Question, QuestionTitle, RealNumber, RequiredReportFields,
    SuspicionBuilder, SuspicionReport, TransactionFields, User, UserKind, UserRelation,
};

pub const FIU_DOC_NUM: &str = "AB000120240100001";

#[allow(dead_code)]
pub fn coded(codes: &CodeRegistry, table: CodeTable, code: &str) -> CodeRef {
    CodeRef::new(code, codes.lookup(table, code).unwrap_or_default())
}

pub fn dummy_organization(codes: &CodeRegistry) -> Organization {
    Organization {
        org_name: coded(codes, CodeTable::Org, "AB0001"),
        main_author: MainAuthor {
            userid: "tester01".into(),
            name: "보고담당자".into(),
        },
        manager: "보고책임자".into(),
        phone: "02-1234-5678".into(),
        address: Address::new("12345", "서울특별시 중구 테스트로 1"),
        email: None,
    }
}

pub fn dummy_suspicion_report() -> SuspicionReport {
    SuspicionReport {
        who: None,
        when: None,
        r#where: None,
        what: None,
        how: None,
        why: "거래 패턴이 일반적이지 않음".into(),
        synthetic_opinion: "의심거래로 판단됨".into(),
        branch_office_score: 3,
        org_score: 3,
        relation_fiu_doc_num: None,
        etc_pecularity_type: None,
    }
}

pub fn dummy_report_fields(codes: &CodeRegistry) -> RequiredReportFields {
    RequiredReportFields {
        report_code: "BA".into(),
        organization: dummy_organization(codes),
        fiu_doc_num: FIU_DOC_NUM.into(),
        start_date: "20240101".into(),
        end_date: "20240131".into(),
        message_type_code: "01".into(),
        doc_send_date: "20240201".into(),
        suspicion_report: dummy_suspicion_report(),
    }
}

pub fn dummy_individual_user(codes: &CodeRegistry) -> User {
    User {
        real_number: RealNumber::new("01", "9001011234567"),
        real_number_type_name: None,
        name: "홍길동".into(),
        nationality: Some(coded(codes, CodeTable::Nationality, "KR")),
        phone: Some(Phone {
            number: "02-1234-5678".into(),
            hand_phone: None,
        }),
        address: None,
        birth_day: Some("19900101".into()),
        kind: UserKind::Individual {
            gender: Some(coded(codes, CodeTable::Gender, "1")),
            occupation_type: None,
        },
    }
}

/// One teller-desk KRW deposit at the given institution, citing the
/// individual dummy user.
pub fn dummy_transaction(codes: &CodeRegistry, org_code: &str, krw_amount: u64) -> TransactionFields {
    TransactionFields {
        date: "20240115".into(),
        time: "143000".into(),
        channel: coded(codes, CodeTable::Channel, "01"),
        mean: coded(codes, CodeTable::Mean, "01"),
        method: coded(codes, CodeTable::Method, "01"),
        goods: coded(codes, CodeTable::Goods, "01"),
        money_type: coded(codes, CodeTable::MoneyType, "KRW"),
        krw_amount,
        foreign_amount: 0,
        usd_amount: 0,
        org_name: coded(codes, CodeTable::Org, org_code),
        branch_office: None,
        user_relations: vec![UserRelation {
            relation_role: coded(codes, CodeTable::RelationRole, "01"),
            real_number: RealNumber::new("01", "9001011234567"),
            insu_rel_desc: None,
        }],
        account_relations: vec![AccountRelation {
            org_name: coded(codes, CodeTable::Org, org_code),
            account_number: "1234567890123".into(),
            account_role: coded(codes, CodeTable::AccountRole, "01"),
        }],
    }
}

#[allow(dead_code)]
pub fn dummy_account(codes: &CodeRegistry) -> Account {
    Account {
        org_name: coded(codes, CodeTable::Org, "AB0001"),
        branch_office: None,
        account_number: "1234567890123".into(),
        reg_date: Some("20230101".into()),
        account_user: RealNumber::new("01", "9001011234567"),
        agent_flag: Some(false),
    }
}

#[allow(dead_code)]
pub fn dummy_suspicion(codes: &CodeRegistry) -> strdoc_core::document::Suspicion {
    SuspicionBuilder::new(codes)
        .add_question_title(QuestionTitle {
            code: "200".into(),
            questions: vec![Question {
                code: "207".into(),
                text: "거액 입금 후 당일 또는 익일 중 인출".into(),
            }],
        })
        .expect("valid title")
        .finish()
        .expect("valid suspicion")
}

/// Minimal valid document: one inner transaction, individual user, one account.
#[allow(dead_code)]
pub fn dummy_finalized_document(codes: &CodeRegistry) -> FinalizedDocument {
    let detail = DetailBuilder::new(codes)
        .add_transaction(dummy_transaction(codes, "AB0001", 1_000_000))
        .expect("valid transaction")
        .user(dummy_individual_user(codes))
        .expect("valid user")
        .add_account(dummy_account(codes))
        .expect("valid account")
        .finish()
        .expect("valid detail");

    DocumentBuilder::new(codes, dummy_report_fields(codes))
        .expect("valid report fields")
        .suspicion(dummy_suspicion(codes))
        .expect("suspicion accepted")
        .detail(detail)
        .expect("detail accepted")
        .build()
        .expect("build dummy document")
}
