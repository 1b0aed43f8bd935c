// ==========================================
// 工厂运营驾驶舱 - 人员姓名匹配
// ==========================================
// 规则: 去首尾空白 + 合并内部空白 + 忽略大小写
// 说明: 外部规划服务只返回姓名时使用；同名人员无法区分，优先用人员ID
// ==========================================

use std::collections::HashSet;

/// 规范化姓名
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// 姓名匹配器（一组目标姓名的规范化集合）
#[derive(Debug, Clone, Default)]
pub struct NameMatcher {
    targets: HashSet<String>,
}

impl NameMatcher {
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            targets: names
                .iter()
                .map(|n| normalize_name(n.as_ref()))
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.targets.contains(&normalize_name(candidate))
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
