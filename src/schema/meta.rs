//! 模式定义模块
//!
//! 模式是转换引擎的驱动数据：有序的字段定义、计算字段访问器、
//! 角色定义和输出排序，由外部模型层构建后只读消费

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::{SchemaError, SchemaResult};
use crate::schema::field_types::FieldDefinition;
use crate::schema::registry;
use crate::transform::role::Role;
use crate::types::{DataMap, DataValue};

/// 计算字段的取值访问器
pub type SerializableAccessor = Arc<dyn Fn(&DataMap) -> DataValue + Send + Sync>;

/// 多态认领钩子：判断一份输入映射是否属于本模式
pub type PolymorphicClaimHook = Arc<dyn Fn(&DataMap) -> bool + Send + Sync>;

/// 计算字段（serializable）
///
/// 值不存储在数据中，导出时通过访问器即时求值
#[derive(Clone)]
pub struct Serializable {
    /// 输出键名、导出级别等策略沿用字段定义
    pub field: FieldDefinition,
    accessor: SerializableAccessor,
}

impl Serializable {
    /// 创建计算字段
    pub fn new(
        field: FieldDefinition,
        accessor: impl Fn(&DataMap) -> DataValue + Send + Sync + 'static,
    ) -> Self {
        Self {
            field,
            accessor: Arc::new(accessor),
        }
    }

    /// 对可信数据求值
    pub fn resolve(&self, data: &DataMap) -> DataValue {
        (self.accessor)(data)
    }
}

impl std::fmt::Debug for Serializable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Serializable")
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}

/// 模式定义
///
/// 字段按声明顺序保存；字段名在声明字段和计算字段之间全局唯一
pub struct Schema {
    /// 模式名，注册表中的唯一标识
    pub name: String,
    /// 有序的字段定义
    pub fields: Vec<(String, FieldDefinition)>,
    /// 有序的计算字段
    pub serializables: Vec<(String, Serializable)>,
    /// 角色定义，"default"角色在未指定角色时生效
    pub roles: HashMap<String, Role>,
    /// 输出字段排序，未列出的键排在最前且保持相对顺序
    pub field_order: Option<Vec<String>>,
    /// 多态认领钩子
    pub claim: Option<PolymorphicClaimHook>,
    /// 模式描述
    pub description: Option<String>,
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("roles", &self.roles)
            .field("field_order", &self.field_order)
            .finish_non_exhaustive()
    }
}

impl Schema {
    /// 创建模式构建器
    pub fn builder(name: &str) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    /// 按名称查找声明字段
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields
            .iter()
            .find(|(field_name, _)| field_name == name)
            .map(|(_, field)| field)
    }

    /// 按名称查找角色
    pub fn role(&self, name: &str) -> Option<&Role> {
        self.roles.get(name)
    }

    /// 是否定义了多态认领钩子
    pub fn has_claim(&self) -> bool {
        self.claim.is_some()
    }

    /// 执行多态认领钩子，未定义钩子时返回None
    pub fn run_claim(&self, data: &DataMap) -> Option<bool> {
        self.claim.as_ref().map(|hook| hook(data))
    }
}

/// 模式构建器
///
/// 两阶段构造的第一阶段：先收集原始描述符，注册时再统一解析模型引用
pub struct SchemaBuilder {
    name: String,
    fields: Vec<(String, FieldDefinition)>,
    serializables: Vec<(String, Serializable)>,
    roles: HashMap<String, Role>,
    field_order: Option<Vec<String>>,
    claim: Option<PolymorphicClaimHook>,
    description: Option<String>,
}

impl SchemaBuilder {
    /// 创建构建器
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: Vec::new(),
            serializables: Vec::new(),
            roles: HashMap::new(),
            field_order: None,
            claim: None,
            description: None,
        }
    }

    /// 添加声明字段
    pub fn field(mut self, name: &str, field: FieldDefinition) -> Self {
        self.fields.push((name.to_string(), field));
        self
    }

    /// 添加计算字段
    pub fn serializable(
        mut self,
        name: &str,
        field: FieldDefinition,
        accessor: impl Fn(&DataMap) -> DataValue + Send + Sync + 'static,
    ) -> Self {
        self.serializables
            .push((name.to_string(), Serializable::new(field, accessor)));
        self
    }

    /// 添加角色定义
    pub fn role(mut self, name: &str, role: Role) -> Self {
        self.roles.insert(name.to_string(), role);
        self
    }

    /// 设置输出字段排序
    pub fn field_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field_order = Some(order.into_iter().map(Into::into).collect());
        self
    }

    /// 设置多态认领钩子
    pub fn claim(mut self, hook: impl Fn(&DataMap) -> bool + Send + Sync + 'static) -> Self {
        self.claim = Some(Arc::new(hook));
        self
    }

    /// 设置模式描述
    pub fn description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// 构建模式，检查字段名唯一性
    pub fn build(self) -> SchemaResult<Schema> {
        let mut seen: HashSet<&str> = HashSet::new();
        for (name, _) in &self.fields {
            if !seen.insert(name.as_str()) {
                return Err(SchemaError::SchemaDefinitionError {
                    schema: self.name.clone(),
                    message: format!("字段名重复: {}", name),
                });
            }
        }
        for (name, _) in &self.serializables {
            if !seen.insert(name.as_str()) {
                return Err(SchemaError::SchemaDefinitionError {
                    schema: self.name.clone(),
                    message: format!("计算字段与声明字段重名: {}", name),
                });
            }
        }

        Ok(Schema {
            name: self.name,
            fields: self.fields,
            serializables: self.serializables,
            roles: self.roles,
            field_order: self.field_order,
            claim: self.claim,
            description: self.description,
        })
    }

    /// 构建并注册到全局注册表
    ///
    /// 注册时执行引用解析：所有模型引用必须指向自身或已注册的模式
    pub fn register(self) -> SchemaResult<Arc<Schema>> {
        registry::register_schema(self.build()?)
    }

    /// 构建并以指定父模式注册（多态子类关系）
    pub fn register_with_parent(self, parent: &str) -> SchemaResult<Arc<Schema>> {
        registry::register_schema_with_parent(self.build()?, parent)
    }
}
