//! 扁平化模块
//!
//! 在嵌套结构和单层点路径映射之间双向转换；空列表与空字典
//! 用保留哨兵串占位，保证与"缺失"区分并能往返还原

use std::sync::Arc;

use crate::error::SchemaResult;
use crate::schema::field_types::ExportLevel;
use crate::schema::meta::Schema;
use crate::transform::context::ExportOptions;
use crate::types::{DataMap, DataValue};

/// 空列表哨兵
pub const EMPTY_LIST: &str = "[]";
/// 空字典哨兵
pub const EMPTY_DICT: &str = "{}";

/// 导出为单层点路径映射
///
/// 导出级别固定为Default（未设值的字段不出现），null值被忽略
pub fn flatten(
    schema: &Arc<Schema>,
    instance: &DataValue,
    options: ExportOptions,
    prefix: Option<&str>,
) -> SchemaResult<DataMap> {
    let options = ExportOptions {
        export_level: Some(ExportLevel::Default),
        ..options
    };
    let data = crate::transform::to_primitive(schema, instance, options)?;
    Ok(flatten_to_dict(&DataValue::Object(data), prefix, true))
}

/// 把嵌套结构压成点路径映射
///
/// 列表下标字符串化后作为路径段，空列表/空字典写入哨兵串
pub fn flatten_to_dict(value: &DataValue, prefix: Option<&str>, ignore_none: bool) -> DataMap {
    let mut flat = DataMap::new();
    match value {
        DataValue::Object(map) | DataValue::Model { data: map, .. } => {
            for (key, item) in map.iter() {
                flatten_entry(&mut flat, join_key(prefix, key), item, ignore_none);
            }
        }
        DataValue::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_entry(&mut flat, join_key(prefix, &index.to_string()), item, ignore_none);
            }
        }
        other => {
            if let Some(prefix) = prefix {
                flat.insert(prefix.to_string(), other.clone());
            }
        }
    }
    flat
}

fn join_key(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}.{}", prefix, key),
        None => key.to_string(),
    }
}

fn flatten_entry(flat: &mut DataMap, key: String, value: &DataValue, ignore_none: bool) {
    match value {
        DataValue::Array(items) if items.is_empty() => {
            flat.insert(key, DataValue::String(EMPTY_LIST.to_string()));
        }
        DataValue::Object(map) if map.is_empty() => {
            flat.insert(key, DataValue::String(EMPTY_DICT.to_string()));
        }
        DataValue::Model { data, .. } if data.is_empty() => {
            flat.insert(key, DataValue::String(EMPTY_DICT.to_string()));
        }
        DataValue::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_entry(flat, format!("{}.{}", key, index), item, ignore_none);
            }
        }
        DataValue::Object(map) | DataValue::Model { data: map, .. } => {
            for (child_key, item) in map.iter() {
                flatten_entry(flat, format!("{}.{}", key, child_key), item, ignore_none);
            }
        }
        DataValue::Null | DataValue::Undefined => {
            if !ignore_none {
                flat.insert(key, DataValue::Null);
            }
        }
        other => {
            flat.insert(key, other.clone());
        }
    }
}

/// 把点路径映射还原为嵌套结构
///
/// 列表在还原后以字符串下标的映射形式出现，这是点路径表示的固有损失
pub fn expand(flat: &DataMap) -> DataMap {
    let mut expanded = DataMap::new();
    for (key, value) in flat.iter() {
        expand_into(&mut expanded, key, value.clone());
    }
    expanded
}

fn expand_into(out: &mut DataMap, key: &str, value: DataValue) {
    match key.split_once('.') {
        None => {
            let restored = match &value {
                DataValue::String(s) if s == EMPTY_LIST => Some(DataValue::Array(Vec::new())),
                DataValue::String(s) if s == EMPTY_DICT => Some(DataValue::Object(DataMap::new())),
                _ => None,
            };
            match restored {
                // 哨兵只还原缺失的键，不覆盖已展开的子树
                Some(empty) => {
                    if !out.contains_key(key) {
                        out.insert(key.to_string(), empty);
                    }
                }
                None => {
                    out.insert(key.to_string(), value);
                }
            }
        }
        Some((head, rest)) => {
            // 路径段之前持有标量或列表时提升为映射，后出现的结构胜出
            if !matches!(out.get(head), Some(DataValue::Object(_))) {
                out.insert(head.to_string(), DataValue::Object(DataMap::new()));
            }
            if let Some(DataValue::Object(inner)) = out.get_mut(head) {
                expand_into(inner, rest, value);
            }
        }
    }
}
