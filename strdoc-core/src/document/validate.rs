//! Exhaustive consistency validation over a constructed or parsed document.
//!
//! Unlike the fail-fast builder, the validator never stops at the first
//! problem: it walks the whole tree in document order and returns every
//! violated rule as a path-qualified [`Diagnostic`]. An empty list means the
//! document is valid.
use super::{
    is_valid_date, is_valid_time, Account, CodeRef, Detail, Diagnostic, FiuDocNum, Master,
    MasterTotals, Organization, RuleKind, StrDocument, Suspicion, SuspicionReport, Transaction,
    User, UserKind, SCHEMA_VERSION,
};
use crate::codes::{CodeRegistry, CodeTable, RealNumberCategory};

/// Validate `doc` against the STR rule set.
///
/// # Examples
/// ```rust,no_run
/// use strdoc_core::codes::CodeRegistry;
/// use strdoc_core::document::{validate, StrDocument};
///
/// # let doc: StrDocument = unimplemented!();
/// let codes = CodeRegistry::bundled();
/// let diagnostics = validate::validate(&doc, &codes);
/// assert!(diagnostics.is_empty());
/// ```
pub fn validate(doc: &StrDocument, codes: &CodeRegistry) -> Vec<Diagnostic> {
    let mut v = Validator {
        codes,
        diags: Vec::new(),
    };
    v.document(doc);
    v.diags
}

struct Validator<'a> {
    codes: &'a CodeRegistry,
    diags: Vec<Diagnostic>,
}

impl<'a> Validator<'a> {
    fn push(&mut self, path: impl Into<String>, kind: RuleKind, message: impl Into<String>) {
        self.diags.push(Diagnostic::new(path, kind, message));
    }

    fn code(&mut self, path: impl Into<String>, table: CodeTable, code: &str) {
        if !self.codes.contains(table, code) {
            self.push(
                path,
                RuleKind::InvalidCode,
                format!("unknown code {:?} in table {}", code, table.as_str()),
            );
        }
    }

    fn date(&mut self, path: impl Into<String>, value: &str) {
        if !is_valid_date(value) {
            self.push(
                path,
                RuleKind::InvalidFormat,
                format!("expected YYYYMMDD calendar date, found {value:?}"),
            );
        }
    }

    fn required(&mut self, path: impl Into<String>, value: &str) {
        if value.trim().is_empty() {
            self.push(path, RuleKind::MissingRequiredField, "must not be empty");
        }
    }

    fn document(&mut self, doc: &StrDocument) {
        if doc.version != SCHEMA_VERSION {
            self.push(
                "Version",
                RuleKind::InvalidFormat,
                format!("expected schema version {SCHEMA_VERSION}, found {:?}", doc.version),
            );
        }
        self.code("Code", CodeTable::ReportKind, &doc.report_code);
        self.organization(&doc.organization);
        self.master(&doc.master, &doc.detail, &doc.organization.org_name.code);
        self.detail(&doc.detail);
    }

    fn organization(&mut self, org: &Organization) {
        self.code("Organization/OrgName", CodeTable::Org, &org.org_name.code);
        self.required("Organization/MainAuthor", &org.main_author.name);
        self.required("Organization/Manager", &org.manager);
        self.required("Organization/Phone", &org.phone);
        self.required("Organization/Address", &org.address.text);
    }

    fn master(&mut self, master: &Master, detail: &Detail, reporting_org: &str) {
        if FiuDocNum::parse(master.fiu_doc_num.as_str()).is_err() {
            self.push(
                "Master/FiuDocNum",
                RuleKind::InvalidFormat,
                format!(
                    "expected 17-character OrgCode+YYYYMM+sequence, found {:?}",
                    master.fiu_doc_num
                ),
            );
        }
        if let Some(former) = &master.former_fiu_doc_num {
            if FiuDocNum::parse(former.as_str()).is_err() {
                self.push(
                    "Master/FormerFiuDocNum",
                    RuleKind::InvalidFormat,
                    format!("not a valid FiuDocNum: {former:?}"),
                );
            }
        }
        self.date("Master/StartDate", &master.start_date);
        self.date("Master/EndDate", &master.end_date);
        if is_valid_date(&master.start_date)
            && is_valid_date(&master.end_date)
            && master.start_date > master.end_date
        {
            self.push(
                "Master/StartDate",
                RuleKind::InvalidFormat,
                format!(
                    "StartDate {} must not be after EndDate {}",
                    master.start_date, master.end_date
                ),
            );
        }
        self.code(
            "Master/MessageTypeCode",
            CodeTable::MessageType,
            &master.message_type_code,
        );
        self.date("Master/DocSendDate", &master.doc_send_date);

        self.reconcile_totals(&master.totals, detail, reporting_org);

        if let Some(suspicion) = &master.suspicion {
            self.suspicion(suspicion);
        }
        self.suspicion_report(&master.suspicion_report, master.suspicion.is_some());
    }

    /// Aggregation reconciler: recompute the nine Master totals from the
    /// transactions and report every declared value that disagrees.
    fn reconcile_totals(&mut self, declared: &MasterTotals, detail: &Detail, reporting_org: &str) {
        let computed = MasterTotals::recompute(&detail.transactions, reporting_org);
        for (field, declared, computed) in declared.diff(&computed) {
            self.push(
                format!("Master/{field}"),
                RuleKind::AggregationMismatch,
                format!("declared {declared}, computed {computed}"),
            );
        }
    }

    fn suspicion(&mut self, suspicion: &Suspicion) {
        if suspicion.question_titles.is_empty() {
            self.push(
                "Master/Suspicion",
                RuleKind::CardinalityViolation,
                "requires at least one QuestionTitle",
            );
        }
        for (i, title) in suspicion.question_titles.iter().enumerate() {
            let path = format!("Master/Suspicion/QuestionTitle[{}]", i + 1);
            self.code(&path, CodeTable::QuestionTitle, &title.code);
            if suspicion.question_titles[..i]
                .iter()
                .any(|t| t.code == title.code)
            {
                self.push(
                    &path,
                    RuleKind::DuplicateField,
                    format!("title code {:?} already used by an earlier QuestionTitle", title.code),
                );
            }
            if title.questions.is_empty() {
                self.push(
                    &path,
                    RuleKind::CardinalityViolation,
                    "requires at least one Question",
                );
            }
            for (j, question) in title.questions.iter().enumerate() {
                if !self.codes.question_in_title(&title.code, &question.code) {
                    self.push(
                        format!("{path}/Question[{}]", j + 1),
                        RuleKind::InvalidCode,
                        format!(
                            "code {:?} is not a question of title {:?}",
                            question.code, title.code
                        ),
                    );
                }
            }
        }
    }

    fn suspicion_report(&mut self, report: &SuspicionReport, suspicion_present: bool) {
        self.required("Master/SuspicionReport/Why", &report.why);
        self.required(
            "Master/SuspicionReport/SyntheticOpinion",
            &report.synthetic_opinion,
        );
        for (path, score) in [
            (
                "Master/SuspicionReport/BranchOfficeScore",
                report.branch_office_score,
            ),
            ("Master/SuspicionReport/OrgScore", report.org_score),
        ] {
            if !(1..=5).contains(&score) {
                self.push(
                    path,
                    RuleKind::InvalidFormat,
                    format!("score must be in [1,5], found {score}"),
                );
            }
        }
        if let Some(num) = &report.relation_fiu_doc_num {
            if FiuDocNum::parse(num.as_str()).is_err() {
                self.push(
                    "Master/SuspicionReport/RelationFiuDocNum",
                    RuleKind::InvalidFormat,
                    format!("not a valid FiuDocNum: {num:?}"),
                );
            }
        }
        // Suspicion and EtcPecularityType are mutually exclusive escalation
        // paths. The converse (EtcPecularityType alone) is explicitly legal.
        let etc = report.etc_pecularity_type.as_deref().unwrap_or("");
        if suspicion_present && !etc.trim().is_empty() {
            self.push(
                "Master/SuspicionReport/EtcPecularityType",
                RuleKind::MutualExclusivityViolation,
                "must be empty while Master/Suspicion is present",
            );
        }
    }

    fn detail(&mut self, detail: &Detail) {
        if detail.transactions.is_empty() {
            self.push(
                "Detail",
                RuleKind::CardinalityViolation,
                "requires at least one Transaction",
            );
        }
        for (i, tx) in detail.transactions.iter().enumerate() {
            self.transaction(tx, i + 1, detail);
        }
        self.user(&detail.user);
        for (i, account) in detail.accounts.iter().enumerate() {
            self.account(account, i + 1);
        }
    }

    fn transaction(&mut self, tx: &Transaction, index: usize, detail: &Detail) {
        let base = format!("Detail/Transaction[{index}]");
        if tx.seq != index as u64 {
            self.push(
                format!("{base}/Seq"),
                RuleKind::InvalidFormat,
                format!("expected Seq {index}, found {}", tx.seq),
            );
        }
        self.date(format!("{base}/Date"), &tx.date);
        if !is_valid_time(&tx.time) {
            self.push(
                format!("{base}/Time"),
                RuleKind::InvalidFormat,
                format!("expected HHMMSS time, found {:?}", tx.time),
            );
        }
        self.coded(format!("{base}/Channel"), CodeTable::Channel, &tx.channel);
        self.coded(format!("{base}/Mean"), CodeTable::Mean, &tx.mean);
        self.coded(format!("{base}/Method"), CodeTable::Method, &tx.method);
        self.coded(format!("{base}/Goods"), CodeTable::Goods, &tx.goods);
        self.coded(
            format!("{base}/MoneyType"),
            CodeTable::MoneyType,
            &tx.money_type,
        );
        self.coded(format!("{base}/OrgName"), CodeTable::Org, &tx.org_name);

        if tx.user_relations.is_empty() {
            self.push(
                &base,
                RuleKind::CardinalityViolation,
                "requires at least one UserRelation",
            );
        }
        for (j, rel) in tx.user_relations.iter().enumerate() {
            let rel_base = format!("{base}/UserRelation[{}]", j + 1);
            self.coded(
                format!("{rel_base}/RelationRole"),
                CodeTable::RelationRole,
                &rel.relation_role,
            );
            self.code(
                format!("{rel_base}/RealNumber"),
                CodeTable::RealNumberType,
                &rel.real_number.code,
            );
            // Single-user-per-report model: every cited RealNumber must be
            // the detail user's, code and value both.
            if rel.real_number != detail.user.real_number {
                self.push(
                    format!("{rel_base}/RealNumber"),
                    RuleKind::ReferentialMismatch,
                    format!(
                        "cites {}:{:?}, but the detail user is {}:{:?}",
                        rel.real_number.code,
                        rel.real_number.value,
                        detail.user.real_number.code,
                        detail.user.real_number.value
                    ),
                );
            }
        }
        for (j, rel) in tx.account_relations.iter().enumerate() {
            let rel_base = format!("{base}/AccountRelation[{}]", j + 1);
            self.coded(format!("{rel_base}/OrgName"), CodeTable::Org, &rel.org_name);
            self.coded(
                format!("{rel_base}/AccountRole"),
                CodeTable::AccountRole,
                &rel.account_role,
            );
            // Soft rule: skipped when the report carries no Account list.
            if !detail.accounts.is_empty()
                && !detail
                    .accounts
                    .iter()
                    .any(|a| a.account_number == rel.account_number)
            {
                self.push(
                    format!("{rel_base}/AccountNumber"),
                    RuleKind::ReferentialMismatch,
                    format!("{:?} is not among the detail accounts", rel.account_number),
                );
            }
        }
    }

    fn user(&mut self, user: &User) {
        self.code(
            "Detail/User/RealNumber",
            CodeTable::RealNumberType,
            &user.real_number.code,
        );
        self.required("Detail/User/Name", &user.name);

        match self.codes.real_number_category(&user.real_number.code) {
            Some(RealNumberCategory::Individual) => {
                if matches!(user.kind, UserKind::Corporate(_)) {
                    self.push(
                        "Detail/User",
                        RuleKind::VariantFieldMismatch,
                        format!(
                            "RealNumber code {:?} is individual-shaped, but corporate fields are present",
                            user.real_number.code
                        ),
                    );
                }
            }
            Some(RealNumberCategory::Corporate) => {
                if !matches!(user.kind, UserKind::Corporate(_)) {
                    self.push(
                        "Detail/User",
                        RuleKind::VariantFieldMismatch,
                        format!(
                            "RealNumber code {:?} is corporate-shaped, but CeoName/KSIC/BizScale are absent",
                            user.real_number.code
                        ),
                    );
                }
            }
            // unknown code already reported above; variant cannot be judged
            None => {}
        }

        if let Some(name) = &user.real_number_type_name {
            let label = self
                .codes
                .lookup(CodeTable::RealNumberType, &user.real_number.code);
            if let Some(label) = label {
                if name != label {
                    self.push(
                        "Detail/User/RealNumberTypeName",
                        RuleKind::InvalidCode,
                        format!("{name:?} is not the label bound to code {:?} ({label:?})", user.real_number.code),
                    );
                }
            }
        }

        if let Some(nationality) = &user.nationality {
            self.coded(
                "Detail/User/Nationality",
                CodeTable::Nationality,
                nationality,
            );
        }
        if let Some(birth_day) = &user.birth_day {
            self.date("Detail/User/BirthDay", birth_day);
        }

        match &user.kind {
            UserKind::Individual {
                gender,
                occupation_type,
            } => {
                if let Some(gender) = gender {
                    self.coded("Detail/User/Gender", CodeTable::Gender, gender);
                }
                if let Some(occupation) = occupation_type {
                    self.coded(
                        "Detail/User/OccupationType",
                        CodeTable::OccupationType,
                        occupation,
                    );
                }
            }
            UserKind::Corporate(profile) => {
                if profile.ceo_name.trim().is_empty() {
                    self.push(
                        "Detail/User/CeoName",
                        RuleKind::VariantFieldMismatch,
                        "corporate variant requires CeoName",
                    );
                }
                if profile.ksic.code.trim().is_empty() {
                    self.push(
                        "Detail/User/KSIC",
                        RuleKind::VariantFieldMismatch,
                        "corporate variant requires KSIC",
                    );
                } else {
                    self.coded("Detail/User/KSIC", CodeTable::Ksic, &profile.ksic);
                }
                if profile.biz_scale.code.trim().is_empty() {
                    self.push(
                        "Detail/User/BizScale",
                        RuleKind::VariantFieldMismatch,
                        "corporate variant requires BizScale",
                    );
                } else {
                    self.coded("Detail/User/BizScale", CodeTable::BizScale, &profile.biz_scale);
                }
                if profile.biz_tel_no.trim().is_empty() {
                    self.push(
                        "Detail/User/BizTelNo",
                        RuleKind::VariantFieldMismatch,
                        "corporate variant requires BizTelNo",
                    );
                }
            }
        }
    }

    fn account(&mut self, account: &Account, index: usize) {
        let base = format!("Detail/Account[{index}]");
        self.coded(format!("{base}/OrgName"), CodeTable::Org, &account.org_name);
        self.required(format!("{base}/AccountNumber"), &account.account_number);
        if let Some(reg_date) = &account.reg_date {
            self.date(format!("{base}/RegDate"), reg_date);
        }
        self.code(
            format!("{base}/AccountUser"),
            CodeTable::RealNumberType,
            &account.account_user.code,
        );
        if account.agent_flag.is_none() {
            self.push(
                format!("{base}/AgentFlag"),
                RuleKind::MissingRequiredField,
                "must be Y or N",
            );
        }
    }

    fn coded(&mut self, path: impl Into<String>, table: CodeTable, code_ref: &CodeRef) {
        self.code(path, table, &code_ref.code);
    }
}
