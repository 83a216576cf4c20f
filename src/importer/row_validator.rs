// ==========================================
// 对账单登记控制台 - 行校验器实现
// ==========================================
// 阶段 2: 标准行 → 实体草稿 / 校验错误
// 规则顺序固定:
//   1. 规范化（大小写 / 空白 / 电话号码）
//   2. 必填检查（按字段表顺序，规范化后为空即缺失，每个缺失字段一条信息）
//   3. 现状检查（唯一性 / 引用存在），只针对通过必填检查的字段
// 同一行的全部错误一次性返回，不在第一条处截断
// ==========================================

use crate::config::ImportSettings;
use crate::domain::{
    BranchDraft, CanonicalRow, EntityDraft, EntityType, IssuerDraft, RegistrationDraft,
    ValidationError,
};
use crate::importer::bulk_importer_trait::RowValidator;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::field_mapper::fields;
use crate::importer::state_snapshot::{normalize_key, StateSnapshot};

/// 行级错误信息（面向操作员，原样写入导入报告）
pub mod messages {
    pub const BRANCH_CODE_REQUIRED: &str = "Branch code is required";
    pub const BRANCH_NAME_REQUIRED: &str = "Branch name is required";
    pub const BRANCH_CODE_EXISTS: &str = "Branch code already exists";

    pub const ISSUER_NAME_REQUIRED: &str = "Issuer name is required";
    pub const ISSUER_EXISTS: &str = "Issuer already exists";
    pub const BRANCH_NOT_FOUND: &str = "Branch not found";

    pub const ACCOUNT_NUMBER_REQUIRED: &str = "Account number is required";
    pub const CUSTOMER_NAME_REQUIRED: &str = "Customer name is required";
    pub const PHONE_NUMBER_REQUIRED: &str = "Phone number is required";
    pub const ACCOUNT_NUMBER_EXISTS: &str = "Account number already exists";
}

// ==========================================
// ValidationContext - 单次运行的只读上下文
// ==========================================
pub struct ValidationContext<'a> {
    pub snapshot: &'a StateSnapshot,
    pub settings: &'a ImportSettings,
}

impl<'a> ValidationContext<'a> {
    pub fn new(snapshot: &'a StateSnapshot, settings: &'a ImportSettings) -> Self {
        Self { snapshot, settings }
    }
}

/// 必填检查（作用于规范化后的值）：为空时记录信息，返回是否通过
fn require(value: &str, message: &str, errors: &mut Vec<String>) -> bool {
    if value.is_empty() {
        errors.push(message.to_string());
        false
    } else {
        true
    }
}

// ==========================================
// RuleSetValidator - 按实体类型分派的规则集
// ==========================================
pub struct RuleSetValidator;

impl RuleSetValidator {
    fn validate_branch(
        &self,
        row: &CanonicalRow,
        ctx: &ValidationContext<'_>,
    ) -> Result<BranchDraft, Vec<String>> {
        let mut errors = Vec::new();

        // 规则 1: 规范化
        let code = normalize_key(EntityType::Branch, row.get(fields::BRANCH_CODE));
        let name = DataCleaner.collapse_whitespace(row.get(fields::BRANCH_NAME));

        // 规则 2: 必填
        let code_present = require(&code, messages::BRANCH_CODE_REQUIRED, &mut errors);
        require(&name, messages::BRANCH_NAME_REQUIRED, &mut errors);

        // 规则 3: 唯一性
        if code_present && ctx.snapshot.contains(EntityType::Branch, &code) {
            errors.push(messages::BRANCH_CODE_EXISTS.to_string());
        }

        if errors.is_empty() {
            Ok(BranchDraft { code, name })
        } else {
            Err(errors)
        }
    }

    fn validate_issuer(
        &self,
        row: &CanonicalRow,
        ctx: &ValidationContext<'_>,
    ) -> Result<IssuerDraft, Vec<String>> {
        let mut errors = Vec::new();

        // 规则 1: 规范化
        let name = normalize_key(EntityType::Issuer, row.get(fields::ISSUER_NAME));
        let branch_code = normalize_key(EntityType::Branch, row.get(fields::ISSUER_BRANCH_CODE));

        // 规则 2: 必填
        let name_present = require(&name, messages::ISSUER_NAME_REQUIRED, &mut errors);
        let branch_present = require(&branch_code, messages::BRANCH_CODE_REQUIRED, &mut errors);

        // 规则 3: 唯一性 + 所属网点存在
        if name_present && ctx.snapshot.contains(EntityType::Issuer, &name) {
            errors.push(messages::ISSUER_EXISTS.to_string());
        }
        if branch_present && !ctx.snapshot.contains(EntityType::Branch, &branch_code) {
            errors.push(messages::BRANCH_NOT_FOUND.to_string());
        }

        if errors.is_empty() {
            Ok(IssuerDraft { name, branch_code })
        } else {
            Err(errors)
        }
    }

    fn validate_registration(
        &self,
        row: &CanonicalRow,
        ctx: &ValidationContext<'_>,
    ) -> Result<RegistrationDraft, Vec<String>> {
        let mut errors = Vec::new();

        // 规则 1: 规范化
        let account_number = normalize_key(EntityType::Registration, row.get(fields::ACCOUNT_NUMBER));
        let customer_name = DataCleaner.collapse_whitespace(row.get(fields::CUSTOMER_NAME));
        let phone_number = DataCleaner.clean_phone_number(row.get(fields::PHONE_NUMBER));
        let email = DataCleaner.normalize_null(DataCleaner.clean_lowercase(row.get(fields::EMAIL)));
        let id_number = DataCleaner.normalize_null(DataCleaner.strip_whitespace(row.get(fields::ID_NUMBER)));

        // 规则 2: 必填（电话号码只含分隔符时清洗后为空，同样视为缺失）
        let account_present = require(&account_number, messages::ACCOUNT_NUMBER_REQUIRED, &mut errors);
        require(&customer_name, messages::CUSTOMER_NAME_REQUIRED, &mut errors);
        require(&phone_number, messages::PHONE_NUMBER_REQUIRED, &mut errors);

        // 规则 3: 唯一性
        if account_present && ctx.snapshot.contains(EntityType::Registration, &account_number) {
            errors.push(messages::ACCOUNT_NUMBER_EXISTS.to_string());
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(RegistrationDraft {
            account_number,
            customer_name,
            phone_number,
            email,
            id_number,
            branch: ctx.settings.registration_branch.clone(),
            issued_by: ctx.settings.registration_issued_by.clone(),
        })
    }
}

impl RowValidator for RuleSetValidator {
    fn validate(
        &self,
        row: &CanonicalRow,
        ctx: &ValidationContext<'_>,
        row_index: usize,
    ) -> Result<EntityDraft, ValidationError> {
        let outcome = match row.entity_type() {
            EntityType::Branch => self.validate_branch(row, ctx).map(EntityDraft::Branch),
            EntityType::Issuer => self.validate_issuer(row, ctx).map(EntityDraft::Issuer),
            EntityType::Registration => self
                .validate_registration(row, ctx)
                .map(EntityDraft::Registration),
        };

        outcome.map_err(|messages| ValidationError {
            row_index,
            messages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(entity_type: EntityType, values: &[(&'static str, &str)]) -> CanonicalRow {
        let mut row = CanonicalRow::new(entity_type);
        for (field, value) in values {
            row.set(*field, *value);
        }
        row
    }

    fn validate(row: &CanonicalRow, snapshot: &StateSnapshot) -> Result<EntityDraft, ValidationError> {
        let settings = ImportSettings::default();
        let ctx = ValidationContext::new(snapshot, &settings);
        RuleSetValidator.validate(row, &ctx, 1)
    }

    #[test]
    fn test_branch_valid_row_normalized() {
        let row = row(
            EntityType::Branch,
            &[(fields::BRANCH_CODE, " kgl "), (fields::BRANCH_NAME, "Kigali   Main Branch")],
        );

        let draft = validate(&row, &StateSnapshot::new()).unwrap();

        assert_eq!(
            draft,
            EntityDraft::Branch(BranchDraft {
                code: "KGL".to_string(),
                name: "Kigali Main Branch".to_string(),
            })
        );
    }

    #[test]
    fn test_branch_missing_fields_reported_in_order() {
        let row = row(EntityType::Branch, &[(fields::BRANCH_CODE, ""), (fields::BRANCH_NAME, "  ")]);

        let err = validate(&row, &StateSnapshot::new()).unwrap_err();

        assert_eq!(err.row_index, 1);
        assert_eq!(
            err.messages,
            vec!["Branch code is required", "Branch name is required"]
        );
    }

    #[test]
    fn test_branch_duplicate_code_case_insensitive() {
        let snapshot = StateSnapshot::new().with_keys(EntityType::Branch, ["KGL"]);
        let row = row(
            EntityType::Branch,
            &[(fields::BRANCH_CODE, "kgl"), (fields::BRANCH_NAME, "Kigali")],
        );

        let err = validate(&row, &snapshot).unwrap_err();

        assert_eq!(err.messages, vec!["Branch code already exists"]);
        assert_eq!(err.to_string(), "Row 1: Branch code already exists");
    }

    #[test]
    fn test_branch_missing_name_and_duplicate_code_both_reported() {
        let snapshot = StateSnapshot::new().with_keys(EntityType::Branch, ["KGL"]);
        let row = row(EntityType::Branch, &[(fields::BRANCH_CODE, "KGL")]);

        let err = validate(&row, &snapshot).unwrap_err();

        assert_eq!(
            err.messages,
            vec!["Branch name is required", "Branch code already exists"]
        );
    }

    #[test]
    fn test_issuer_requires_existing_branch() {
        let snapshot = StateSnapshot::new().with_keys(EntityType::Branch, ["KGL"]);

        let ok = row(
            EntityType::Issuer,
            &[(fields::ISSUER_NAME, "JDoe"), (fields::ISSUER_BRANCH_CODE, "kgl")],
        );
        assert_eq!(
            validate(&ok, &snapshot).unwrap(),
            EntityDraft::Issuer(IssuerDraft {
                name: "jdoe".to_string(),
                branch_code: "KGL".to_string(),
            })
        );

        let unknown = row(
            EntityType::Issuer,
            &[(fields::ISSUER_NAME, "asmith"), (fields::ISSUER_BRANCH_CODE, "HYE")],
        );
        assert_eq!(
            validate(&unknown, &snapshot).unwrap_err().messages,
            vec!["Branch not found"]
        );
    }

    #[test]
    fn test_issuer_duplicate_and_missing_branch() {
        let snapshot = StateSnapshot::new().with_keys(EntityType::Issuer, ["jdoe"]);
        let row = row(EntityType::Issuer, &[(fields::ISSUER_NAME, "jdoe")]);

        let err = validate(&row, &snapshot).unwrap_err();

        // 缺失字段不做引用检查
        assert_eq!(
            err.messages,
            vec!["Branch code is required", "Issuer already exists"]
        );
    }

    #[test]
    fn test_registration_valid_row_carries_settings() {
        let row = row(
            EntityType::Registration,
            &[
                (fields::ACCOUNT_NUMBER, "4001 234 567"),
                (fields::CUSTOMER_NAME, " John  Doe "),
                (fields::PHONE_NUMBER, "078-812 (34) 56"),
                (fields::EMAIL, " John.Doe@Example.com "),
                (fields::ID_NUMBER, ""),
            ],
        );
        let settings = ImportSettings {
            registration_branch: "KGL".to_string(),
            registration_issued_by: "jdoe".to_string(),
            ..ImportSettings::default()
        };
        let snapshot = StateSnapshot::new();
        let ctx = ValidationContext::new(&snapshot, &settings);

        let draft = RuleSetValidator.validate(&row, &ctx, 3).unwrap();

        assert_eq!(
            draft,
            EntityDraft::Registration(RegistrationDraft {
                account_number: "4001234567".to_string(),
                customer_name: "John Doe".to_string(),
                phone_number: "0788123456".to_string(),
                email: Some("john.doe@example.com".to_string()),
                id_number: None,
                branch: "KGL".to_string(),
                issued_by: "jdoe".to_string(),
            })
        );
    }

    #[test]
    fn test_registration_all_required_missing() {
        let row = row(EntityType::Registration, &[]);

        let err = validate(&row, &StateSnapshot::new()).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Row 1: Account number is required, Customer name is required, Phone number is required"
        );
    }

    #[test]
    fn test_registration_duplicate_account() {
        let snapshot = StateSnapshot::new().with_keys(EntityType::Registration, ["4001234567"]);
        let row = row(
            EntityType::Registration,
            &[
                (fields::ACCOUNT_NUMBER, "4001234567"),
                (fields::CUSTOMER_NAME, "Jane"),
                (fields::PHONE_NUMBER, "0788000000"),
            ],
        );

        let err = validate(&row, &snapshot).unwrap_err();

        assert_eq!(err.messages, vec!["Account number already exists"]);
    }

    #[test]
    fn test_registration_phone_of_only_separators_is_missing() {
        for phone in ["--", "()", " - . "] {
            let row = row(
                EntityType::Registration,
                &[
                    (fields::ACCOUNT_NUMBER, "4001"),
                    (fields::CUSTOMER_NAME, "Jane"),
                    (fields::PHONE_NUMBER, phone),
                ],
            );

            let err = validate(&row, &StateSnapshot::new()).unwrap_err();

            assert_eq!(err.messages, vec!["Phone number is required"], "phone {:?}", phone);
        }
    }
}
