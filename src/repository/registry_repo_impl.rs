// ==========================================
// 对账单登记控制台 - 登记数据 Repository 实现
// ==========================================
// 职责: 实现登记数据访问（使用 rusqlite）
// 表: branches / issuers / registrations（见 db::init_registry_schema）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::{configure_sqlite_connection, init_registry_schema, open_sqlite_connection};
use crate::domain::{
    BranchDraft, CreatedEntity, EntityDraft, EntityType, IssuerDraft, RegistrationDraft,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::registry_repo::{
    BranchRecord, IssuerRecord, RegistrationRecord, RegistryGateway,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

// ==========================================
// SqliteRegistryRepository
// ==========================================
pub struct SqliteRegistryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRegistryRepository {
    /// 打开数据库文件并确保表结构存在
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_registry_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例（与 ConfigManager 共享连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
            init_registry_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn insert_branch(&self, draft: &BranchDraft) -> RepositoryResult<CreatedEntity> {
        let conn = self.get_conn()?;
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now();

        conn.execute(
            "INSERT INTO branches (id, code, name, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![id, draft.code, draft.name, created_at],
        )?;

        Ok(CreatedEntity {
            id,
            entity_type: EntityType::Branch,
            key: draft.code.clone(),
            created_at,
        })
    }

    fn insert_issuer(&self, draft: &IssuerDraft) -> RepositoryResult<CreatedEntity> {
        let conn = self.get_conn()?;

        // 网点代码 → 网点 ID
        let branch_id: Option<String> = conn
            .query_row(
                "SELECT id FROM branches WHERE code = ?1",
                params![draft.branch_code],
                |row| row.get(0),
            )
            .optional()?;
        let branch_id = branch_id.ok_or_else(|| RepositoryError::NotFound {
            entity: "branch".to_string(),
            key: draft.branch_code.clone(),
        })?;

        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now();

        conn.execute(
            "INSERT INTO issuers (id, name, branch_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![id, draft.name, branch_id, created_at],
        )?;

        Ok(CreatedEntity {
            id,
            entity_type: EntityType::Issuer,
            key: draft.name.clone(),
            created_at,
        })
    }

    fn insert_registration(&self, draft: &RegistrationDraft) -> RepositoryResult<CreatedEntity> {
        let conn = self.get_conn()?;
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now();

        conn.execute(
            r#"
            INSERT INTO registrations (
                id, account_number, customer_name, phone_number,
                email, id_number, branch, issued_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                id,
                draft.account_number,
                draft.customer_name,
                draft.phone_number,
                draft.email,
                draft.id_number,
                draft.branch,
                draft.issued_by,
                created_at,
            ],
        )?;

        Ok(CreatedEntity {
            id,
            entity_type: EntityType::Registration,
            key: draft.account_number.clone(),
            created_at,
        })
    }

    fn load_keys(&self, entity_type: EntityType) -> RepositoryResult<BTreeSet<String>> {
        let conn = self.get_conn()?;
        let sql = match entity_type {
            EntityType::Branch => "SELECT code FROM branches",
            EntityType::Issuer => "SELECT name FROM issuers",
            EntityType::Registration => "SELECT account_number FROM registrations",
        };

        let mut stmt = conn.prepare(sql)?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(keys)
    }

    // ===== 查询 =====

    pub fn list_branches(&self) -> RepositoryResult<Vec<BranchRecord>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT id, code, name, created_at FROM branches ORDER BY code")?;

        let records = stmt
            .query_map([], |row| {
                Ok(BranchRecord {
                    id: row.get(0)?,
                    code: row.get(1)?,
                    name: row.get(2)?,
                    created_at: row.get::<_, DateTime<Utc>>(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    pub fn list_issuers(&self) -> RepositoryResult<Vec<IssuerRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT i.id, i.name, i.branch_id, b.code, i.created_at
            FROM issuers i
            JOIN branches b ON b.id = i.branch_id
            ORDER BY i.name
            "#,
        )?;

        let records = stmt
            .query_map([], |row| {
                Ok(IssuerRecord {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    branch_id: row.get(2)?,
                    branch_code: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    pub fn list_registrations(&self) -> RepositoryResult<Vec<RegistrationRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, account_number, customer_name, phone_number,
                   email, id_number, branch, issued_by, created_at
            FROM registrations
            ORDER BY account_number
            "#,
        )?;

        let records = stmt
            .query_map([], |row| {
                Ok(RegistrationRecord {
                    id: row.get(0)?,
                    account_number: row.get(1)?,
                    customer_name: row.get(2)?,
                    phone_number: row.get(3)?,
                    email: row.get(4)?,
                    id_number: row.get(5)?,
                    branch: row.get(6)?,
                    issued_by: row.get(7)?,
                    created_at: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}

// ==========================================
// RegistryGateway Trait 实现
// ==========================================
#[async_trait]
impl RegistryGateway for SqliteRegistryRepository {
    async fn create(&self, draft: &EntityDraft) -> RepositoryResult<CreatedEntity> {
        let created = match draft {
            EntityDraft::Branch(d) => self.insert_branch(d)?,
            EntityDraft::Issuer(d) => self.insert_issuer(d)?,
            EntityDraft::Registration(d) => self.insert_registration(d)?,
        };

        debug!(
            entity_type = %created.entity_type,
            key = %created.key,
            id = %created.id,
            "实体已创建"
        );
        Ok(created)
    }

    async fn current_state(&self, entity_type: EntityType) -> RepositoryResult<BTreeSet<String>> {
        self.load_keys(entity_type)
    }
}
