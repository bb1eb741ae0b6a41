//! 模式注册表模块
//!
//! 全局注册表保存已注册的模式，记录父子关系供多态解析展开子模式，
//! 并在注册时对模型引用执行快速失败的解析检查

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rat_logger::debug;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::error::{SchemaError, SchemaResult};
use crate::schema::field_types::{FieldDefinition, FieldType};
use crate::schema::meta::Schema;

/// 全局模式注册表
static GLOBAL_SCHEMA_REGISTRY: Lazy<SchemaRegistry> = Lazy::new(SchemaRegistry::new);

struct SchemaRegistry {
    schemas: RwLock<HashMap<String, Arc<Schema>>>,
    /// 父模式名 -> 直接子模式名（按注册顺序）
    children: RwLock<HashMap<String, Vec<String>>>,
}

impl SchemaRegistry {
    fn new() -> Self {
        Self {
            schemas: RwLock::new(HashMap::new()),
            children: RwLock::new(HashMap::new()),
        }
    }
}

/// 注册模式
///
/// 注册前解析所有模型引用，引用未注册且非自身的名称时快速失败
pub fn register_schema(schema: Schema) -> SchemaResult<Arc<Schema>> {
    resolve_references(&schema)?;

    let name = schema.name.clone();
    let schema = Arc::new(schema);
    let mut schemas = GLOBAL_SCHEMA_REGISTRY.schemas.write();
    if schemas.contains_key(&name) {
        debug!("模式已存在，将更新定义: {}", name);
    }
    schemas.insert(name.clone(), schema.clone());
    debug!("注册模式: {}, 字段数量={}", name, schema.fields.len());

    Ok(schema)
}

/// 以指定父模式注册子模式
///
/// 父模式必须已注册；子关系供多态字段在允许子模式匹配时展开候选
pub fn register_schema_with_parent(schema: Schema, parent: &str) -> SchemaResult<Arc<Schema>> {
    if get_schema(parent).is_none() {
        return Err(SchemaError::ModelResolutionError {
            name: parent.to_string(),
        });
    }

    let name = schema.name.clone();
    let registered = register_schema(schema)?;

    let mut children = GLOBAL_SCHEMA_REGISTRY.children.write();
    let entry = children.entry(parent.to_string()).or_default();
    if !entry.contains(&name) {
        entry.push(name);
    }

    Ok(registered)
}

/// 按名称查找已注册的模式
pub fn get_schema(name: &str) -> Option<Arc<Schema>> {
    GLOBAL_SCHEMA_REGISTRY.schemas.read().get(name).cloned()
}

/// 获取指定模式的全部后代模式（含间接后代，按注册顺序）
pub fn subclasses_of(name: &str) -> Vec<Arc<Schema>> {
    let children = GLOBAL_SCHEMA_REGISTRY.children.read();
    let schemas = GLOBAL_SCHEMA_REGISTRY.schemas.read();

    // 广度优先、从队首出队，保证同级模式按注册顺序产出
    let mut result = Vec::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    if let Some(direct) = children.get(name) {
        queue.extend(direct.iter().map(String::as_str));
    }
    while let Some(child) = queue.pop_front() {
        if let Some(schema) = schemas.get(child) {
            result.push(schema.clone());
        }
        if let Some(grandchildren) = children.get(child) {
            queue.extend(grandchildren.iter().map(String::as_str));
        }
    }
    result
}

/// 判断name是否为ancestor自身或其后代
pub fn is_subclass(name: &str, ancestor: &str) -> bool {
    if name == ancestor {
        return true;
    }
    subclasses_of(ancestor)
        .iter()
        .any(|schema| schema.name == name)
}

/// 引用解析检查
///
/// 递归遍历字段类型，模型引用必须指向所属模式自身或已注册的模式
fn resolve_references(schema: &Schema) -> SchemaResult<()> {
    for (_, field) in &schema.fields {
        resolve_field(field, &schema.name)?;
    }
    for (_, serializable) in &schema.serializables {
        resolve_field(&serializable.field, &schema.name)?;
    }
    Ok(())
}

fn resolve_field(field: &FieldDefinition, owner_name: &str) -> SchemaResult<()> {
    match &field.field_type {
        FieldType::List { field, .. } | FieldType::Dict { field } => {
            resolve_field(field, owner_name)
        }
        FieldType::Model { schema } => resolve_name(schema, owner_name),
        FieldType::Poly { schemas, .. } => {
            for name in schemas {
                resolve_name(name, owner_name)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn resolve_name(name: &str, owner_name: &str) -> SchemaResult<()> {
    if name == owner_name || get_schema(name).is_some() {
        Ok(())
    } else {
        Err(SchemaError::ModelResolutionError {
            name: name.to_string(),
        })
    }
}

/// 解析模型引用为模式实例
///
/// 优先匹配所属模式自身（自引用），否则查注册表
pub(crate) fn resolve_schema(name: &str, owner: &Arc<Schema>) -> SchemaResult<Arc<Schema>> {
    if name == owner.name {
        return Ok(owner.clone());
    }
    get_schema(name).ok_or_else(|| SchemaError::ModelResolutionError {
        name: name.to_string(),
    })
}
