use super::{
    code_error, is_valid_date, is_valid_time, Account, Detail, DocumentError, FiuDocNum, Master,
    MasterTotals, Organization, QuestionTitle, Result, StrDocument, Suspicion, SuspicionReport,
    Transaction, User, UserKind, SCHEMA_VERSION,
};
use crate::codes::{CodeRegistry, CodeTable, RealNumberCategory};
use crate::document::{AccountRelation, BranchOffice, CodeRef, FileAttach, UserRelation};

/// A document that passed every build-time check. Immutable from here on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedDocument {
    data: StrDocument,
}

impl FinalizedDocument {
    pub fn data(&self) -> &StrDocument {
        &self.data
    }

    pub fn into_inner(self) -> StrDocument {
        self.data
    }
}

/// Required constructor arguments for [`DocumentBuilder`].
#[derive(Debug, Clone)]
pub struct RequiredReportFields {
    pub report_code: String,
    pub organization: Organization,
    pub fiu_doc_num: String,
    pub start_date: String,
    pub end_date: String,
    pub message_type_code: String,
    pub doc_send_date: String,
    pub suspicion_report: SuspicionReport,
}

/// Stepwise document assembly with fail-fast structural checks.
///
/// Enumerated codes are checked against the registry the moment they are
/// supplied; single-valued slots reject a second assignment; `build()` runs
/// the aggregation reconciler against the declared Master totals (or fills
/// them in when none were declared).
///
/// # Examples
/// ```rust,no_run
/// use strdoc_core::codes::CodeRegistry;
/// use strdoc_core::document::{DocumentBuilder, RequiredReportFields};
///
/// let codes = CodeRegistry::bundled();
/// # let fields: RequiredReportFields = unimplemented!();
/// let document = DocumentBuilder::new(&codes, fields)?
///     .build()?;
/// # let _ = document;
/// # Ok::<(), strdoc_core::document::DocumentError>(())
/// ```
#[derive(Debug)]
pub struct DocumentBuilder<'a> {
    codes: &'a CodeRegistry,
    report_code: String,
    organization: Organization,
    fiu_doc_num: String,
    former_fiu_doc_num: Option<String>,
    start_date: String,
    end_date: String,
    message_type_code: String,
    doc_send_date: String,
    suspicion: Option<Suspicion>,
    suspicion_report: SuspicionReport,
    declared_totals: Option<MasterTotals>,
    detail: Option<Detail>,
    file_attach: Vec<FileAttach>,
}

impl<'a> DocumentBuilder<'a> {
    pub fn new(codes: &'a CodeRegistry, fields: RequiredReportFields) -> Result<Self> {
        if !codes.contains(CodeTable::ReportKind, &fields.report_code) {
            return Err(code_error(CodeTable::ReportKind, &fields.report_code));
        }
        check_organization(codes, &fields.organization)?;
        FiuDocNum::parse(fields.fiu_doc_num.as_str())?;
        check_date("Master/StartDate", &fields.start_date)?;
        check_date("Master/EndDate", &fields.end_date)?;
        if fields.start_date > fields.end_date {
            return Err(DocumentError::InvalidFormat {
                field: "Master/StartDate",
                value: format!("{} > {}", fields.start_date, fields.end_date),
            });
        }
        if !codes.contains(CodeTable::MessageType, &fields.message_type_code) {
            return Err(code_error(CodeTable::MessageType, &fields.message_type_code));
        }
        check_date("Master/DocSendDate", &fields.doc_send_date)?;
        check_suspicion_report(&fields.suspicion_report)?;

        Ok(Self {
            codes,
            report_code: fields.report_code,
            organization: fields.organization,
            fiu_doc_num: fields.fiu_doc_num,
            former_fiu_doc_num: None,
            start_date: fields.start_date,
            end_date: fields.end_date,
            message_type_code: fields.message_type_code,
            doc_send_date: fields.doc_send_date,
            suspicion: None,
            suspicion_report: fields.suspicion_report,
            declared_totals: None,
            detail: None,
            file_attach: Vec::new(),
        })
    }

    pub fn former_fiu_doc_num(mut self, num: impl Into<String>) -> Result<Self> {
        if self.former_fiu_doc_num.is_some() {
            return Err(DocumentError::DuplicateField {
                field: "Master/FormerFiuDocNum",
            });
        }
        let num = num.into();
        FiuDocNum::parse(num.as_str())?;
        self.former_fiu_doc_num = Some(num);
        Ok(self)
    }

    /// Declare the Master totals explicitly; `build()` fails with
    /// [`DocumentError::AggregationMismatch`] if they disagree with the sums
    /// recomputed from the transactions.
    pub fn declared_totals(mut self, totals: MasterTotals) -> Result<Self> {
        if self.declared_totals.is_some() {
            return Err(DocumentError::DuplicateField {
                field: "Master/Totals",
            });
        }
        self.declared_totals = Some(totals);
        Ok(self)
    }

    pub fn suspicion(mut self, suspicion: Suspicion) -> Result<Self> {
        if self.suspicion.is_some() {
            return Err(DocumentError::DuplicateField {
                field: "Master/Suspicion",
            });
        }
        self.suspicion = Some(suspicion);
        Ok(self)
    }

    pub fn detail(mut self, detail: Detail) -> Result<Self> {
        if self.detail.is_some() {
            return Err(DocumentError::DuplicateField { field: "Detail" });
        }
        self.detail = Some(detail);
        Ok(self)
    }

    pub fn attach(mut self, file: FileAttach) -> Self {
        self.file_attach.push(file);
        self
    }

    /// Finalize the document.
    ///
    /// # Errors
    /// Fails on a missing `Detail`, on the Suspicion/EtcPecularityType
    /// exclusivity rule, on a user relation that does not cite the detail
    /// user, and on declared totals that disagree with the recomputation.
    pub fn build(self) -> Result<FinalizedDocument> {
        let detail = self.detail.ok_or(DocumentError::MissingRequiredField {
            field: "Detail",
        })?;

        if self.suspicion.is_some() {
            let etc = self
                .suspicion_report
                .etc_pecularity_type
                .as_deref()
                .unwrap_or("");
            if !etc.trim().is_empty() {
                return Err(DocumentError::MutualExclusivityViolation {
                    field: "Master/SuspicionReport/EtcPecularityType",
                });
            }
        }

        let resolve_accounts = !detail.accounts.is_empty();
        for tx in &detail.transactions {
            for rel in &tx.user_relations {
                // full identity: the code is part of the key, so citing the
                // right number under the wrong RealNumberType is a mismatch
                if rel.real_number != detail.user.real_number {
                    return Err(DocumentError::ReferentialMismatch {
                        field: "UserRelation/RealNumber",
                        value: rel.real_number.value.clone(),
                    });
                }
            }
            for rel in &tx.account_relations {
                if resolve_accounts
                    && !detail
                        .accounts
                        .iter()
                        .any(|a| a.account_number == rel.account_number)
                {
                    return Err(DocumentError::ReferentialMismatch {
                        field: "AccountRelation/AccountNumber",
                        value: rel.account_number.clone(),
                    });
                }
            }
        }

        let computed =
            MasterTotals::recompute(&detail.transactions, &self.organization.org_name.code);
        let totals = match self.declared_totals {
            Some(declared) => {
                if let Some((field, declared, computed)) =
                    declared.diff(&computed).into_iter().next()
                {
                    return Err(DocumentError::AggregationMismatch {
                        field,
                        declared,
                        computed,
                    });
                }
                declared
            }
            None => computed,
        };

        Ok(FinalizedDocument {
            data: StrDocument {
                version: SCHEMA_VERSION.to_string(),
                report_code: self.report_code,
                organization: self.organization,
                master: Master {
                    fiu_doc_num: self.fiu_doc_num,
                    former_fiu_doc_num: self.former_fiu_doc_num,
                    start_date: self.start_date,
                    end_date: self.end_date,
                    totals,
                    message_type_code: self.message_type_code,
                    doc_send_date: self.doc_send_date,
                    suspicion: self.suspicion,
                    suspicion_report: self.suspicion_report,
                },
                detail,
                file_attach: self.file_attach,
            },
        })
    }
}

/// Assembles the optional `Suspicion` block.
///
/// Closing with zero question titles, or adding a title with zero questions,
/// is a [`DocumentError::CardinalityViolation`].
#[derive(Debug)]
pub struct SuspicionBuilder<'a> {
    codes: &'a CodeRegistry,
    question_titles: Vec<QuestionTitle>,
}

impl<'a> SuspicionBuilder<'a> {
    pub fn new(codes: &'a CodeRegistry) -> Self {
        Self {
            codes,
            question_titles: Vec::new(),
        }
    }

    pub fn add_question_title(mut self, title: QuestionTitle) -> Result<Self> {
        if !self.codes.contains(CodeTable::QuestionTitle, &title.code) {
            return Err(code_error(CodeTable::QuestionTitle, &title.code));
        }
        if self.question_titles.iter().any(|t| t.code == title.code) {
            return Err(DocumentError::DuplicateField {
                field: "Suspicion/QuestionTitle",
            });
        }
        if title.questions.is_empty() {
            return Err(DocumentError::CardinalityViolation {
                entity: "QuestionTitle",
                rule: "at least one Question",
            });
        }
        for question in &title.questions {
            if !self.codes.question_in_title(&title.code, &question.code) {
                return Err(DocumentError::InvalidCode {
                    table: "Question",
                    value: question.code.clone(),
                });
            }
        }
        self.question_titles.push(title);
        Ok(self)
    }

    pub fn finish(self) -> Result<Suspicion> {
        if self.question_titles.is_empty() {
            return Err(DocumentError::CardinalityViolation {
                entity: "Suspicion",
                rule: "at least one QuestionTitle",
            });
        }
        Ok(Suspicion {
            question_titles: self.question_titles,
        })
    }
}

/// Transaction value object minus `Seq`, which the detail builder assigns
/// as 1-based insertion order.
#[derive(Debug, Clone)]
pub struct TransactionFields {
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

/// Assembles the `Detail` block: ordered transactions, exactly one user,
/// zero or more accounts.
#[derive(Debug)]
pub struct DetailBuilder<'a> {
    codes: &'a CodeRegistry,
    transactions: Vec<Transaction>,
    user: Option<User>,
    accounts: Vec<Account>,
}

impl<'a> DetailBuilder<'a> {
    pub fn new(codes: &'a CodeRegistry) -> Self {
        Self {
            codes,
            transactions: Vec::new(),
            user: None,
            accounts: Vec::new(),
        }
    }

    pub fn add_transaction(mut self, fields: TransactionFields) -> Result<Self> {
        check_date("Transaction/Date", &fields.date)?;
        if !is_valid_time(&fields.time) {
            return Err(DocumentError::InvalidFormat {
                field: "Transaction/Time",
                value: fields.time,
            });
        }
        check_code(self.codes, CodeTable::Channel, &fields.channel)?;
        check_code(self.codes, CodeTable::Mean, &fields.mean)?;
        check_code(self.codes, CodeTable::Method, &fields.method)?;
        check_code(self.codes, CodeTable::Goods, &fields.goods)?;
        check_code(self.codes, CodeTable::MoneyType, &fields.money_type)?;
        check_code(self.codes, CodeTable::Org, &fields.org_name)?;
        if fields.user_relations.is_empty() {
            return Err(DocumentError::CardinalityViolation {
                entity: "Transaction",
                rule: "at least one UserRelation",
            });
        }
        for rel in &fields.user_relations {
            check_code(self.codes, CodeTable::RelationRole, &rel.relation_role)?;
            if !self
                .codes
                .contains(CodeTable::RealNumberType, &rel.real_number.code)
            {
                return Err(code_error(CodeTable::RealNumberType, &rel.real_number.code));
            }
        }
        for rel in &fields.account_relations {
            check_code(self.codes, CodeTable::Org, &rel.org_name)?;
            check_code(self.codes, CodeTable::AccountRole, &rel.account_role)?;
        }

        let seq = self.transactions.len() as u64 + 1;
        self.transactions.push(Transaction {
            seq,
            date: fields.date,
            time: fields.time,
            channel: fields.channel,
            mean: fields.mean,
            method: fields.method,
            goods: fields.goods,
            money_type: fields.money_type,
            krw_amount: fields.krw_amount,
            foreign_amount: fields.foreign_amount,
            usd_amount: fields.usd_amount,
            org_name: fields.org_name,
            branch_office: fields.branch_office,
            user_relations: fields.user_relations,
            account_relations: fields.account_relations,
        });
        Ok(self)
    }

    pub fn user(mut self, user: User) -> Result<Self> {
        if self.user.is_some() {
            return Err(DocumentError::DuplicateField {
                field: "Detail/User",
            });
        }
        check_user(self.codes, &user)?;
        self.user = Some(user);
        Ok(self)
    }

    pub fn add_account(mut self, account: Account) -> Result<Self> {
        check_code(self.codes, CodeTable::Org, &account.org_name)?;
        if account.account_number.trim().is_empty() {
            return Err(DocumentError::MissingRequiredField {
                field: "Account/AccountNumber",
            });
        }
        if !self
            .codes
            .contains(CodeTable::RealNumberType, &account.account_user.code)
        {
            return Err(code_error(
                CodeTable::RealNumberType,
                &account.account_user.code,
            ));
        }
        if let Some(reg_date) = &account.reg_date {
            check_date("Account/RegDate", reg_date)?;
        }
        if account.agent_flag.is_none() {
            return Err(DocumentError::MissingRequiredField {
                field: "Account/AgentFlag",
            });
        }
        self.accounts.push(account);
        Ok(self)
    }

    pub fn finish(self) -> Result<Detail> {
        if self.transactions.is_empty() {
            return Err(DocumentError::CardinalityViolation {
                entity: "Detail",
                rule: "at least one Transaction",
            });
        }
        let user = self.user.ok_or(DocumentError::MissingRequiredField {
            field: "Detail/User",
        })?;
        Ok(Detail {
            transactions: self.transactions,
            user,
            accounts: self.accounts,
        })
    }
}

fn check_code(codes: &CodeRegistry, table: CodeTable, code_ref: &CodeRef) -> Result<()> {
    if !codes.contains(table, &code_ref.code) {
        return Err(code_error(table, &code_ref.code));
    }
    Ok(())
}

fn check_date(field: &'static str, value: &str) -> Result<()> {
    if !is_valid_date(value) {
        return Err(DocumentError::InvalidFormat {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn check_organization(codes: &CodeRegistry, org: &Organization) -> Result<()> {
    check_code(codes, CodeTable::Org, &org.org_name)?;
    for (field, value) in [
        ("Organization/MainAuthor", org.main_author.name.as_str()),
        ("Organization/Manager", org.manager.as_str()),
        ("Organization/Phone", org.phone.as_str()),
        ("Organization/Address", org.address.text.as_str()),
    ] {
        if value.trim().is_empty() {
            return Err(DocumentError::MissingRequiredField { field });
        }
    }
    Ok(())
}

fn check_suspicion_report(report: &SuspicionReport) -> Result<()> {
    if report.why.trim().is_empty() {
        return Err(DocumentError::MissingRequiredField {
            field: "Master/SuspicionReport/Why",
        });
    }
    if report.synthetic_opinion.trim().is_empty() {
        return Err(DocumentError::MissingRequiredField {
            field: "Master/SuspicionReport/SyntheticOpinion",
        });
    }
    for (field, score) in [
        (
            "Master/SuspicionReport/BranchOfficeScore",
            report.branch_office_score,
        ),
        ("Master/SuspicionReport/OrgScore", report.org_score),
    ] {
        if !(1..=5).contains(&score) {
            return Err(DocumentError::InvalidFormat {
                field,
                value: score.to_string(),
            });
        }
    }
    if let Some(num) = &report.relation_fiu_doc_num {
        FiuDocNum::parse(num.as_str())?;
    }
    Ok(())
}

fn check_user(codes: &CodeRegistry, user: &User) -> Result<()> {
    let category = codes
        .real_number_category(&user.real_number.code)
        .ok_or_else(|| code_error(CodeTable::RealNumberType, &user.real_number.code))?;
    let expected = match category {
        RealNumberCategory::Individual => {
            if !matches!(user.kind, UserKind::Individual { .. }) {
                Some("Individual")
            } else {
                None
            }
        }
        RealNumberCategory::Corporate => {
            if !matches!(user.kind, UserKind::Corporate(_)) {
                Some("Corporate")
            } else {
                None
            }
        }
    };
    if let Some(expected) = expected {
        return Err(DocumentError::VariantFieldMismatch {
            code: user.real_number.code.clone(),
            expected,
        });
    }
    if let Some(name) = &user.real_number_type_name {
        let label = codes
            .lookup(CodeTable::RealNumberType, &user.real_number.code)
            .unwrap_or_default();
        if name != label {
            return Err(DocumentError::InvalidCode {
                table: "RealNumberType",
                value: name.clone(),
            });
        }
    }
    if user.name.trim().is_empty() {
        return Err(DocumentError::MissingRequiredField {
            field: "Detail/User/Name",
        });
    }
    if let Some(nationality) = &user.nationality {
        check_code(codes, CodeTable::Nationality, nationality)?;
    }
    if let Some(birth_day) = &user.birth_day {
        check_date("Detail/User/BirthDay", birth_day)?;
    }
    match &user.kind {
        UserKind::Individual {
            gender,
            occupation_type,
        } => {
            if let Some(gender) = gender {
                check_code(codes, CodeTable::Gender, gender)?;
            }
            if let Some(occupation) = occupation_type {
                check_code(codes, CodeTable::OccupationType, occupation)?;
            }
        }
        UserKind::Corporate(profile) => {
            if profile.ceo_name.trim().is_empty() {
                return Err(DocumentError::MissingRequiredField {
                    field: "Detail/User/CeoName",
                });
            }
            check_code(codes, CodeTable::Ksic, &profile.ksic)?;
            check_code(codes, CodeTable::BizScale, &profile.biz_scale)?;
            if profile.biz_tel_no.trim().is_empty() {
                return Err(DocumentError::MissingRequiredField {
                    field: "Detail/User/BizTelNo",
                });
            }
        }
    }
    Ok(())
}
