// ==========================================
// 推广员佣金结算引擎 - 推广员目录
// ==========================================
// 职责: 推广员身份 + 上下级关系（仅用于层级汇总）
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promoter {
    pub promoter_id: String,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

// ==========================================
// PromoterDirectory - 上级关系查找表
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct PromoterDirectory {
    parents: HashMap<String, String>,
}

impl PromoterDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_promoters<'a, I>(promoters: I) -> Self
    where
        I: IntoIterator<Item = &'a Promoter>,
    {
        let mut directory = Self::new();
        for p in promoters {
            if let Some(parent) = &p.parent_id {
                directory.set_parent(&p.promoter_id, parent);
            }
        }
        directory
    }

    /// 设置上级；空字符串视为无上级
    pub fn set_parent(&mut self, promoter_id: &str, parent_id: &str) {
        let parent = parent_id.trim();
        if parent.is_empty() {
            self.parents.remove(promoter_id);
        } else {
            self.parents
                .insert(promoter_id.to_string(), parent.to_string());
        }
    }

    pub fn parent_of(&self, promoter_id: &str) -> Option<&str> {
        self.parents.get(promoter_id).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}
