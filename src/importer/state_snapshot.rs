// ==========================================
// 对账单登记控制台 - 系统现状快照
// ==========================================
// 职责: 唯一性 / 引用检查所需的已存在标识键
// 生命周期: 每次导入运行开始时加载一次，之后每成功提交一行增量登记
// 红线: 不是全局共享状态，只属于单次运行
// ==========================================

use crate::domain::{CreatedEntity, EntityType};
use crate::importer::data_cleaner::DataCleaner;
use std::collections::{HashMap, HashSet};

/// 标识键规范化（与行校验使用同一规则）
///
/// - 网点代码: TRIM + UPPER
/// - 签发人用户名: TRIM + LOWER
/// - 账号: 去除全部空白
pub fn normalize_key(entity_type: EntityType, raw: &str) -> String {
    match entity_type {
        EntityType::Branch => DataCleaner.clean_text(raw, true),
        EntityType::Issuer => DataCleaner.clean_lowercase(raw),
        EntityType::Registration => DataCleaner.strip_whitespace(raw),
    }
}

#[derive(Debug, Clone, Default)]
pub struct StateSnapshot {
    keys: HashMap<EntityType, HashSet<String>>,
}

impl StateSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// 载入某实体类型的已存在标识键
    pub fn load<I, S>(&mut self, entity_type: EntityType, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = self.keys.entry(entity_type).or_default();
        for key in keys {
            let normalized = normalize_key(entity_type, key.as_ref());
            if !normalized.is_empty() {
                set.insert(normalized);
            }
        }
    }

    pub fn with_keys<I, S>(mut self, entity_type: EntityType, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.load(entity_type, keys);
        self
    }

    /// 调用方传入已规范化的键
    pub fn contains(&self, entity_type: EntityType, key: &str) -> bool {
        self.keys
            .get(&entity_type)
            .map(|set| set.contains(key))
            .unwrap_or(false)
    }

    /// 增量登记：同批次后续行可见本行的提交结果
    pub fn register(&mut self, created: &CreatedEntity) {
        let normalized = normalize_key(created.entity_type, &created.key);
        self.keys
            .entry(created.entity_type)
            .or_default()
            .insert(normalized);
    }

    pub fn count(&self, entity_type: EntityType) -> usize {
        self.keys.get(&entity_type).map(HashSet::len).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_load_normalizes_keys() {
        let snapshot = StateSnapshot::new()
            .with_keys(EntityType::Branch, ["kgl", " hye "])
            .with_keys(EntityType::Issuer, ["JDoe"]);

        assert!(snapshot.contains(EntityType::Branch, "KGL"));
        assert!(snapshot.contains(EntityType::Branch, "HYE"));
        assert!(snapshot.contains(EntityType::Issuer, "jdoe"));
        assert!(!snapshot.contains(EntityType::Registration, "KGL"));
        assert_eq!(snapshot.count(EntityType::Branch), 2);
    }

    #[test]
    fn test_register_makes_key_visible() {
        let mut snapshot = StateSnapshot::new();
        assert!(!snapshot.contains(EntityType::Registration, "4001234567"));

        snapshot.register(&CreatedEntity {
            id: "r-1".to_string(),
            entity_type: EntityType::Registration,
            key: "4001 234 567".to_string(),
            created_at: Utc::now(),
        });

        assert!(snapshot.contains(EntityType::Registration, "4001234567"));
    }

    #[test]
    fn test_entity_types_are_isolated() {
        let snapshot = StateSnapshot::new().with_keys(EntityType::Branch, ["KGL"]);
        assert!(!snapshot.contains(EntityType::Issuer, "KGL"));
    }
}
