// ==========================================
// 对账单登记控制台 - 字段解析器实现
// ==========================================
// 职责: 源列名 → 标准字段映射（按实体类型的别名表）
// 别名表带版本号；表中第一个别名为主列名，模板按主列名输出
// ==========================================

use crate::domain::{CanonicalRow, EntityType, RawRow};
use crate::importer::bulk_importer_trait::FieldResolver;

/// 别名表版本，调整别名或字段顺序时递增
pub const FIELD_SCHEMA_VERSION: u32 = 1;

/// 标准字段名
pub mod fields {
    // 网点
    pub const BRANCH_CODE: &str = "code";
    pub const BRANCH_NAME: &str = "name";

    // 签发人
    pub const ISSUER_NAME: &str = "name";
    pub const ISSUER_BRANCH_CODE: &str = "branchCode";

    // 账户登记
    pub const ACCOUNT_NUMBER: &str = "accountNumber";
    pub const CUSTOMER_NAME: &str = "customerName";
    pub const PHONE_NUMBER: &str = "phoneNumber";
    pub const EMAIL: &str = "email";
    pub const ID_NUMBER: &str = "idNumber";
}

// ==========================================
// FieldSpec / FieldSchema
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub canonical: &'static str,
    pub aliases: &'static [&'static str], // 第一个为主列名
}

impl FieldSpec {
    pub fn primary_label(&self) -> &'static str {
        self.aliases.first().copied().unwrap_or(self.canonical)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSchema {
    pub entity_type: EntityType,
    pub version: u32,
    pub fields: &'static [FieldSpec], // 固定顺序，亦即模板列顺序
}

impl FieldSchema {
    /// 模板表头（主列名，按固定顺序）
    pub fn header_labels(&self) -> Vec<&'static str> {
        self.fields.iter().map(FieldSpec::primary_label).collect()
    }
}

const BRANCH_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        canonical: fields::BRANCH_CODE,
        aliases: &["code", "Code", "Branch Code", "branchCode"],
    },
    FieldSpec {
        canonical: fields::BRANCH_NAME,
        aliases: &["name", "Name", "Branch Name", "branchName"],
    },
];

const ISSUER_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        canonical: fields::ISSUER_NAME,
        aliases: &["name", "Name", "Issuer Name", "username", "Username"],
    },
    FieldSpec {
        canonical: fields::ISSUER_BRANCH_CODE,
        aliases: &["branchCode", "Branch Code", "branch", "Branch"],
    },
];

const REGISTRATION_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        canonical: fields::ACCOUNT_NUMBER,
        aliases: &["accountNumber", "Account Number"],
    },
    FieldSpec {
        canonical: fields::CUSTOMER_NAME,
        aliases: &["customerName", "Customer Name", "fullName", "Full Name"],
    },
    FieldSpec {
        canonical: fields::PHONE_NUMBER,
        aliases: &["phoneNumber", "Phone Number"],
    },
    FieldSpec {
        canonical: fields::EMAIL,
        aliases: &["email", "Email"],
    },
    FieldSpec {
        canonical: fields::ID_NUMBER,
        aliases: &["idNumber", "ID Number"],
    },
];

static BRANCH_SCHEMA: FieldSchema = FieldSchema {
    entity_type: EntityType::Branch,
    version: FIELD_SCHEMA_VERSION,
    fields: BRANCH_FIELDS,
};

static ISSUER_SCHEMA: FieldSchema = FieldSchema {
    entity_type: EntityType::Issuer,
    version: FIELD_SCHEMA_VERSION,
    fields: ISSUER_FIELDS,
};

static REGISTRATION_SCHEMA: FieldSchema = FieldSchema {
    entity_type: EntityType::Registration,
    version: FIELD_SCHEMA_VERSION,
    fields: REGISTRATION_FIELDS,
};

/// 按实体类型取字段表
pub fn schema_for(entity_type: EntityType) -> &'static FieldSchema {
    match entity_type {
        EntityType::Branch => &BRANCH_SCHEMA,
        EntityType::Issuer => &ISSUER_SCHEMA,
        EntityType::Registration => &REGISTRATION_SCHEMA,
    }
}

// ==========================================
// AliasFieldResolver
// ==========================================
pub struct AliasFieldResolver;

impl AliasFieldResolver {
    /// 先按别名顺序精确匹配，再大小写不敏感匹配；取第一个非空值
    fn lookup<'r>(&self, row: &'r RawRow, spec: &FieldSpec) -> Option<&'r str> {
        let exact = spec
            .aliases
            .iter()
            .filter_map(|alias| row.get(alias))
            .find(|v| !v.trim().is_empty());

        exact.or_else(|| {
            spec.aliases
                .iter()
                .filter_map(|alias| row.get_ignore_case(alias))
                .find(|v| !v.trim().is_empty())
        })
    }
}

impl FieldResolver for AliasFieldResolver {
    fn resolve(&self, row: &RawRow, entity_type: EntityType) -> CanonicalRow {
        let schema = schema_for(entity_type);
        let mut canonical = CanonicalRow::new(entity_type);

        for spec in schema.fields {
            let value = self.lookup(row, spec).unwrap_or("");
            canonical.set(spec.canonical, value);
        }

        canonical
    }
}
