//! 角色过滤模块
//!
//! 角色是具名的字段可见性谓词，可作为字段名集合参与并/差运算，
//! 导出循环用它决定哪些字段被排除

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::{Add, Sub};

/// 谓词种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleKind {
    /// 从不排除任何字段
    Wholelist,
    /// 仅保留集合内的字段，空集合不排除任何字段
    Whitelist,
    /// 排除集合内的字段，空集合不排除任何字段
    Blacklist,
}

/// 字段可见性角色
///
/// 不可变：并/差运算返回同谓词种类的新实例，原角色不受影响
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    kind: RoleKind,
    fields: BTreeSet<String>,
}

impl Role {
    /// 创建全保留角色
    pub fn wholelist() -> Self {
        Self {
            kind: RoleKind::Wholelist,
            fields: BTreeSet::new(),
        }
    }

    /// 创建白名单角色
    pub fn whitelist<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: RoleKind::Whitelist,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// 创建黑名单角色
    pub fn blacklist<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: RoleKind::Blacklist,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// 谓词种类
    pub fn kind(&self) -> RoleKind {
        self.kind
    }

    /// 角色关注的字段数量
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// 集合是否为空
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 是否包含指定字段名
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains(name)
    }

    /// 判断字段是否应被排除
    pub fn rejects(&self, name: &str) -> bool {
        match self.kind {
            RoleKind::Wholelist => false,
            RoleKind::Whitelist => {
                if self.fields.is_empty() {
                    false
                } else {
                    !self.fields.contains(name)
                }
            }
            RoleKind::Blacklist => {
                if self.fields.is_empty() {
                    false
                } else {
                    self.fields.contains(name)
                }
            }
        }
    }

    /// 并运算：加入一批字段名，返回新角色
    pub fn union<I, S>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields = self.fields.clone();
        fields.extend(names.into_iter().map(Into::into));
        Self {
            kind: self.kind,
            fields,
        }
    }

    /// 差运算：移除一批字段名，返回新角色
    pub fn difference<I, S>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fields = self.fields.clone();
        for name in names {
            fields.remove(name.as_ref());
        }
        Self {
            kind: self.kind,
            fields,
        }
    }
}

impl Add<&str> for Role {
    type Output = Role;

    fn add(self, name: &str) -> Role {
        self.union([name])
    }
}

impl Sub<&str> for Role {
    type Output = Role;

    fn sub(self, name: &str) -> Role {
        self.difference([name])
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            RoleKind::Wholelist => "wholelist",
            RoleKind::Whitelist => "whitelist",
            RoleKind::Blacklist => "blacklist",
        };
        let fields: Vec<String> = self.fields.iter().map(|name| format!("'{}'", name)).collect();
        write!(f, "{}({})", kind, fields.join(", "))
    }
}
