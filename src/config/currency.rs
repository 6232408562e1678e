// ==========================================
// 推广员佣金结算引擎 - 币种精度表
// ==========================================
// 职责: 币种最小单位位数（ISO-4217），支持配置覆写
// 示例: IDR 官方 2 位，实际结算常按 0 位，可通过
//       config_kv: currency.minor_units/IDR = 0 覆写
// ==========================================

use std::collections::HashMap;

/// 未登记币种的默认小数位
pub const DEFAULT_MINOR_UNITS: u32 = 2;

const ZERO_DECIMAL: &[&str] = &[
    "BIF", "CLP", "DJF", "GNF", "ISK", "JPY", "KMF", "KRW", "PYG", "RWF", "UGX", "UYI", "VND",
    "VUV", "XAF", "XOF", "XPF",
];

const THREE_DECIMAL: &[&str] = &["BHD", "IQD", "JOD", "KWD", "LYD", "OMR", "TND"];

// ==========================================
// MinorUnitTable - 币种精度表
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct MinorUnitTable {
    overrides: HashMap<String, u32>,
}

impl MinorUnitTable {
    /// 仅使用内置 ISO 表
    pub fn iso() -> Self {
        Self::default()
    }

    pub fn with_overrides(overrides: HashMap<String, u32>) -> Self {
        let overrides = overrides
            .into_iter()
            .map(|(code, digits)| (code.trim().to_uppercase(), digits))
            .collect();
        Self { overrides }
    }

    pub fn set_override(&mut self, currency: &str, digits: u32) {
        self.overrides
            .insert(currency.trim().to_uppercase(), digits);
    }

    /// 查询币种小数位（覆写优先）
    pub fn minor_units(&self, currency: &str) -> u32 {
        let code = currency.trim().to_uppercase();
        if let Some(digits) = self.overrides.get(&code) {
            return *digits;
        }
        if ZERO_DECIMAL.contains(&code.as_str()) {
            0
        } else if THREE_DECIMAL.contains(&code.as_str()) {
            3
        } else {
            DEFAULT_MINOR_UNITS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_table() {
        let table = MinorUnitTable::iso();
        assert_eq!(table.minor_units("JPY"), 0);
        assert_eq!(table.minor_units("vnd"), 0);
        assert_eq!(table.minor_units("KWD"), 3);
        assert_eq!(table.minor_units("USD"), 2);
        assert_eq!(table.minor_units("IDR"), 2);
    }

    #[test]
    fn test_overrides_win() {
        let mut overrides = HashMap::new();
        overrides.insert("idr".to_string(), 0);
        let mut table = MinorUnitTable::with_overrides(overrides);
        assert_eq!(table.minor_units("IDR"), 0);

        table.set_override("JPY", 2);
        assert_eq!(table.minor_units("JPY"), 2);
    }
}
