mod common;

use strdoc_core::codes::{CodeRegistry, CodeTable};
use strdoc_core::document::{
    DetailBuilder, DocumentBuilder, DocumentError, MasterTotals, Question, QuestionTitle,
    RealNumber, SuspicionBuilder,
};

#[test]
fn new_rejects_unknown_report_code() {
    let codes = CodeRegistry::bundled();
    let mut fields = common::dummy_report_fields(&codes);
    fields.report_code = "ZZ".into();

    let err = DocumentBuilder::new(&codes, fields).expect_err("unknown report kind");
    assert_eq!(
        err,
        DocumentError::InvalidCode {
            table: "ReportKind",
            value: "ZZ".into(),
        }
    );
}

#[test]
fn new_rejects_malformed_fiu_doc_num() {
    let codes = CodeRegistry::bundled();
    let mut fields = common::dummy_report_fields(&codes);
    // 13th month in the period part
    fields.fiu_doc_num = "AB000120241300001".into();

    let err = DocumentBuilder::new(&codes, fields).expect_err("bad period");
    assert!(matches!(
        err,
        DocumentError::InvalidFormat {
            field: "FiuDocNum",
            ..
        }
    ));
}

#[test]
fn new_rejects_inverted_reporting_period() {
    let codes = CodeRegistry::bundled();
    let mut fields = common::dummy_report_fields(&codes);
    fields.start_date = "20240201".into();
    fields.end_date = "20240101".into();

    let err = DocumentBuilder::new(&codes, fields).expect_err("start after end");
    assert!(matches!(
        err,
        DocumentError::InvalidFormat {
            field: "Master/StartDate",
            ..
        }
    ));
}

#[test]
fn new_rejects_out_of_range_scores() {
    let codes = CodeRegistry::bundled();
    for score in [0u8, 6] {
        let mut fields = common::dummy_report_fields(&codes);
        fields.suspicion_report.org_score = score;

        let err = DocumentBuilder::new(&codes, fields).expect_err("score out of range");
        assert!(matches!(
            err,
            DocumentError::InvalidFormat {
                field: "Master/SuspicionReport/OrgScore",
                ..
            }
        ));
    }
}

#[test]
fn detail_can_only_be_set_once() {
    let codes = CodeRegistry::bundled();
    let detail = || {
        DetailBuilder::new(&codes)
            .add_transaction(common::dummy_transaction(&codes, "AB0001", 1_000_000))
            .unwrap()
            .user(common::dummy_individual_user(&codes))
            .unwrap()
            .finish()
            .unwrap()
    };

    let err = DocumentBuilder::new(&codes, common::dummy_report_fields(&codes))
        .unwrap()
        .detail(detail())
        .unwrap()
        .detail(detail())
        .expect_err("second detail");
    assert_eq!(err, DocumentError::DuplicateField { field: "Detail" });
}

#[test]
fn suspicion_requires_at_least_one_title_with_questions() {
    let codes = CodeRegistry::bundled();

    let err = SuspicionBuilder::new(&codes).finish().expect_err("no titles");
    assert_eq!(
        err,
        DocumentError::CardinalityViolation {
            entity: "Suspicion",
            rule: "at least one QuestionTitle",
        }
    );

    let err = SuspicionBuilder::new(&codes)
        .add_question_title(QuestionTitle {
            code: "100".into(),
            questions: Vec::new(),
        })
        .expect_err("empty title");
    assert_eq!(
        err,
        DocumentError::CardinalityViolation {
            entity: "QuestionTitle",
            rule: "at least one Question",
        }
    );
}

#[test]
fn question_codes_are_scoped_to_their_title() {
    let codes = CodeRegistry::bundled();
    // 207 is a question of title 200, not of title 100
    let err = SuspicionBuilder::new(&codes)
        .add_question_title(QuestionTitle {
            code: "100".into(),
            questions: vec![Question {
                code: "207".into(),
                text: String::new(),
            }],
        })
        .expect_err("question outside its title");
    assert_eq!(
        err,
        DocumentError::InvalidCode {
            table: "Question",
            value: "207".into(),
        }
    );
}

#[test]
fn detail_requires_transaction_and_user() {
    let codes = CodeRegistry::bundled();

    let err = DetailBuilder::new(&codes).finish().expect_err("empty detail");
    assert_eq!(
        err,
        DocumentError::CardinalityViolation {
            entity: "Detail",
            rule: "at least one Transaction",
        }
    );

    let err = DetailBuilder::new(&codes)
        .add_transaction(common::dummy_transaction(&codes, "AB0001", 1_000_000))
        .unwrap()
        .finish()
        .expect_err("no user");
    assert_eq!(
        err,
        DocumentError::MissingRequiredField {
            field: "Detail/User",
        }
    );
}

#[test]
fn transaction_requires_a_user_relation() {
    let codes = CodeRegistry::bundled();
    let mut fields = common::dummy_transaction(&codes, "AB0001", 1_000_000);
    fields.user_relations.clear();

    let err = DetailBuilder::new(&codes)
        .add_transaction(fields)
        .expect_err("no user relation");
    assert_eq!(
        err,
        DocumentError::CardinalityViolation {
            entity: "Transaction",
            rule: "at least one UserRelation",
        }
    );
}

#[test]
fn transaction_seq_is_assigned_in_insertion_order() {
    let codes = CodeRegistry::bundled();
    let detail = DetailBuilder::new(&codes)
        .add_transaction(common::dummy_transaction(&codes, "AB0001", 1_000_000))
        .unwrap()
        .add_transaction(common::dummy_transaction(&codes, "CD0002", 2_000_000))
        .unwrap()
        .add_transaction(common::dummy_transaction(&codes, "AB0001", 3_000_000))
        .unwrap()
        .user(common::dummy_individual_user(&codes))
        .unwrap()
        .finish()
        .unwrap();

    let seqs: Vec<_> = detail.transactions.iter().map(|tx| tx.seq).collect();
    assert_eq!(seqs, vec![1, 2, 3]);
}

#[test]
fn build_rejects_suspicion_alongside_etc_pecularity_type() {
    let codes = CodeRegistry::bundled();
    let mut fields = common::dummy_report_fields(&codes);
    fields.suspicion_report.etc_pecularity_type = Some("기타 특이사항".into());

    let detail = DetailBuilder::new(&codes)
        .add_transaction(common::dummy_transaction(&codes, "AB0001", 1_000_000))
        .unwrap()
        .user(common::dummy_individual_user(&codes))
        .unwrap()
        .finish()
        .unwrap();

    let err = DocumentBuilder::new(&codes, fields)
        .unwrap()
        .suspicion(common::dummy_suspicion(&codes))
        .unwrap()
        .detail(detail)
        .unwrap()
        .build()
        .expect_err("both escalation paths");
    assert_eq!(
        err,
        DocumentError::MutualExclusivityViolation {
            field: "Master/SuspicionReport/EtcPecularityType",
        }
    );
}

#[test]
fn etc_pecularity_type_alone_is_legal() {
    let codes = CodeRegistry::bundled();
    let mut fields = common::dummy_report_fields(&codes);
    fields.suspicion_report.etc_pecularity_type = Some("기타 특이사항".into());

    let detail = DetailBuilder::new(&codes)
        .add_transaction(common::dummy_transaction(&codes, "AB0001", 1_000_000))
        .unwrap()
        .user(common::dummy_individual_user(&codes))
        .unwrap()
        .finish()
        .unwrap();

    DocumentBuilder::new(&codes, fields)
        .unwrap()
        .detail(detail)
        .unwrap()
        .build()
        .expect("no suspicion block, free-text reason only");
}

#[test]
fn build_rejects_user_relation_citing_someone_else() {
    let codes = CodeRegistry::bundled();
    let mut tx = common::dummy_transaction(&codes, "AB0001", 1_000_000);
    tx.user_relations[0].real_number = RealNumber::new("01", "7705052345678");

    let detail = DetailBuilder::new(&codes)
        .add_transaction(tx)
        .unwrap()
        .user(common::dummy_individual_user(&codes))
        .unwrap()
        .finish()
        .unwrap();

    let err = DocumentBuilder::new(&codes, common::dummy_report_fields(&codes))
        .unwrap()
        .detail(detail)
        .unwrap()
        .build()
        .expect_err("relation cites a stranger");
    assert_eq!(
        err,
        DocumentError::ReferentialMismatch {
            field: "UserRelation/RealNumber",
            value: "7705052345678".into(),
        }
    );
}

#[test]
fn build_reconciles_declared_totals() {
    let codes = CodeRegistry::bundled();
    let detail = DetailBuilder::new(&codes)
        .add_transaction(common::dummy_transaction(&codes, "AB0001", 1_000_000))
        .unwrap()
        .add_transaction(common::dummy_transaction(&codes, "CD0002", 2_000_000))
        .unwrap()
        .user(common::dummy_individual_user(&codes))
        .unwrap()
        .finish()
        .unwrap();

    // InnerCount claims both transactions were at the reporting institution
    let err = DocumentBuilder::new(&codes, common::dummy_report_fields(&codes))
        .unwrap()
        .declared_totals(MasterTotals {
            inner_count: 2,
            outer_count: 0,
            inner_krw_amount: 3_000_000,
            outer_krw_amount: 0,
            inner_usd_amount: 0,
            outer_usd_amount: 0,
            count: 2,
            krw_amount: 3_000_000,
            usd_amount: 0,
        })
        .unwrap()
        .detail(detail)
        .unwrap()
        .build()
        .expect_err("declared totals disagree");
    assert_eq!(
        err,
        DocumentError::AggregationMismatch {
            field: "InnerCount",
            declared: 2,
            computed: 1,
        }
    );
}

#[test]
fn build_fills_totals_when_none_declared() {
    let codes = CodeRegistry::bundled();
    let detail = DetailBuilder::new(&codes)
        .add_transaction(common::dummy_transaction(&codes, "AB0001", 1_000_000))
        .unwrap()
        .add_transaction(common::dummy_transaction(&codes, "CD0002", 2_000_000))
        .unwrap()
        .user(common::dummy_individual_user(&codes))
        .unwrap()
        .finish()
        .unwrap();

    let doc = DocumentBuilder::new(&codes, common::dummy_report_fields(&codes))
        .unwrap()
        .detail(detail)
        .unwrap()
        .build()
        .expect("build without declared totals")
        .into_inner();

    let totals = &doc.master.totals;
    assert_eq!(totals.inner_count, 1);
    assert_eq!(totals.outer_count, 1);
    assert_eq!(totals.inner_krw_amount, 1_000_000);
    assert_eq!(totals.outer_krw_amount, 2_000_000);
    assert_eq!(totals.count, 2);
    assert_eq!(totals.krw_amount, 3_000_000);
}

#[test]
fn user_variant_must_match_real_number_category() {
    let codes = CodeRegistry::bundled();
    let mut user = common::dummy_individual_user(&codes);
    // 03 (사업자등록번호) implies a corporate user
    user.real_number = RealNumber::new("03", "1234567890");

    let err = DetailBuilder::new(&codes)
        .add_transaction(common::dummy_transaction(&codes, "AB0001", 1_000_000))
        .unwrap()
        .user(user)
        .expect_err("corporate code on an individual field set");
    assert_eq!(
        err,
        DocumentError::VariantFieldMismatch {
            code: "03".into(),
            expected: "Corporate",
        }
    );
}

#[test]
fn real_number_type_name_must_match_the_code_label() {
    let codes = CodeRegistry::bundled();
    let mut user = common::dummy_individual_user(&codes);
    user.real_number_type_name = Some("여권번호".into());

    let err = DetailBuilder::new(&codes)
        .add_transaction(common::dummy_transaction(&codes, "AB0001", 1_000_000))
        .unwrap()
        .user(user)
        .expect_err("label of a different code");
    assert_eq!(
        err,
        DocumentError::InvalidCode {
            table: "RealNumberType",
            value: "여권번호".into(),
        }
    );
}

#[test]
fn user_can_only_be_set_once() {
    let codes = CodeRegistry::bundled();
    let err = DetailBuilder::new(&codes)
        .add_transaction(common::dummy_transaction(&codes, "AB0001", 1_000_000))
        .unwrap()
        .user(common::dummy_individual_user(&codes))
        .unwrap()
        .user(common::dummy_individual_user(&codes))
        .expect_err("second user");
    assert_eq!(
        err,
        DocumentError::DuplicateField {
            field: "Detail/User",
        }
    );
}

#[test]
fn new_rejects_blank_organization_address() {
    let codes = CodeRegistry::bundled();
    let mut fields = common::dummy_report_fields(&codes);
    fields.organization.address.text = "   ".into();

    let err = DocumentBuilder::new(&codes, fields).expect_err("blank address");
    assert_eq!(
        err,
        DocumentError::MissingRequiredField {
            field: "Organization/Address",
        }
    );
}

#[test]
fn add_account_rejects_blank_account_number() {
    let codes = CodeRegistry::bundled();
    let mut account = common::dummy_account(&codes);
    account.account_number = String::new();

    let err = DetailBuilder::new(&codes)
        .add_account(account)
        .expect_err("blank account number");
    assert_eq!(
        err,
        DocumentError::MissingRequiredField {
            field: "Account/AccountNumber",
        }
    );
}

#[test]
fn add_account_requires_agent_flag() {
    let codes = CodeRegistry::bundled();
    let mut account = common::dummy_account(&codes);
    account.agent_flag = None;

    let err = DetailBuilder::new(&codes)
        .add_account(account)
        .expect_err("agent flag not stated");
    assert_eq!(
        err,
        DocumentError::MissingRequiredField {
            field: "Account/AgentFlag",
        }
    );
}

#[test]
fn build_rejects_account_relation_citing_an_unlisted_account() {
    let codes = CodeRegistry::bundled();
    let mut tx = common::dummy_transaction(&codes, "AB0001", 1_000_000);
    tx.account_relations[0].account_number = "0000000000000".into();

    let detail = DetailBuilder::new(&codes)
        .add_transaction(tx)
        .unwrap()
        .user(common::dummy_individual_user(&codes))
        .unwrap()
        .add_account(common::dummy_account(&codes))
        .unwrap()
        .finish()
        .unwrap();

    let err = DocumentBuilder::new(&codes, common::dummy_report_fields(&codes))
        .unwrap()
        .detail(detail)
        .unwrap()
        .build()
        .expect_err("relation resolves to no listed account");
    assert_eq!(
        err,
        DocumentError::ReferentialMismatch {
            field: "AccountRelation/AccountNumber",
            value: "0000000000000".into(),
        }
    );
}

#[test]
fn build_rejects_user_relation_under_a_different_real_number_code() {
    let codes = CodeRegistry::bundled();
    let mut tx = common::dummy_transaction(&codes, "AB0001", 1_000_000);
    // same digits, cited as a passport number instead of a resident number
    tx.user_relations[0].real_number = RealNumber::new("04", "9001011234567");

    let detail = DetailBuilder::new(&codes)
        .add_transaction(tx)
        .unwrap()
        .user(common::dummy_individual_user(&codes))
        .unwrap()
        .finish()
        .unwrap();

    let err = DocumentBuilder::new(&codes, common::dummy_report_fields(&codes))
        .unwrap()
        .detail(detail)
        .unwrap()
        .build()
        .expect_err("relation cites the number under the wrong type");
    assert_eq!(
        err,
        DocumentError::ReferentialMismatch {
            field: "UserRelation/RealNumber",
            value: "9001011234567".into(),
        }
    );
}

#[test]
fn add_question_title_rejects_a_repeated_title_code() {
    let codes = CodeRegistry::bundled();
    let title = || QuestionTitle {
        code: "200".into(),
        questions: vec![Question {
            code: "207".into(),
            text: String::new(),
        }],
    };

    let err = SuspicionBuilder::new(&codes)
        .add_question_title(title())
        .unwrap()
        .add_question_title(title())
        .expect_err("same title code twice");
    assert_eq!(
        err,
        DocumentError::DuplicateField {
            field: "Suspicion/QuestionTitle",
        }
    );
}

#[test]
fn add_transaction_rejects_unknown_channel() {
    let codes = CodeRegistry::bundled();
    let mut fields = common::dummy_transaction(&codes, "AB0001", 1_000_000);
    fields.channel = common::coded(&codes, CodeTable::Channel, "42");

    let err = DetailBuilder::new(&codes)
        .add_transaction(fields)
        .expect_err("channel outside the table");
    assert_eq!(
        err,
        DocumentError::InvalidCode {
            table: "Channel",
            value: "42".into(),
        }
    );
}
