//! 通用类型定义
//!
//! 定义引擎使用的数据值类型和有序映射

pub mod data_value;
pub mod ordered_map;

// 重新导出所有公共类型
pub use data_value::{json_value_to_data_value, DataMap, DataValue};
pub use ordered_map::OrderedMap;
