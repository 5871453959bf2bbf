//! 输出 schema 与校验边界
//!
//! 模型返回的文本只有通过 [`OutputSchema::validate`] 才能进入业务代码。

use serde_json::{json, Map, Value};

use crate::error::SchemaViolation;

/// 字段类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    /// 闭区间 `[min, max]` 内的整数
    Integer { min: i64, max: i64 },
}

/// 单个字段的约束
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    /// 必填字段必须存在且不为 null；可选字段可以缺失或为 null
    pub required: bool,
    pub description: String,
}

impl FieldSpec {
    pub fn integer(name: &str, min: i64, max: i64) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Integer { min, max },
            required: true,
            description: String::new(),
        }
    }

    pub fn string(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::String,
            required: true,
            description: String::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    fn check(&self, value: &Value) -> Result<(), SchemaViolation> {
        match self.kind {
            FieldKind::String => {
                if value.is_string() {
                    Ok(())
                } else {
                    Err(SchemaViolation::WrongType {
                        field: self.name.clone(),
                        expected: "string",
                    })
                }
            }
            FieldKind::Integer { min, max } => {
                let n = value.as_i64().ok_or_else(|| SchemaViolation::WrongType {
                    field: self.name.clone(),
                    expected: "integer",
                })?;
                if n < min || n > max {
                    return Err(SchemaViolation::OutOfRange {
                        field: self.name.clone(),
                        value: n,
                        min,
                        max,
                    });
                }
                Ok(())
            }
        }
    }
}

/// 严格的结构约定：一个扁平 JSON 对象及其字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSchema {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

impl OutputSchema {
    pub fn new(name: &str, fields: Vec<FieldSpec>) -> Self {
        Self {
            name: name.to_string(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// 逐字段校验
    ///
    /// 返回只包含已声明字段的对象，缺失的可选字段补为 null，未声明的字段被丢弃。
    pub fn validate(&self, value: &Value) -> Result<Map<String, Value>, SchemaViolation> {
        let object = value.as_object().ok_or(SchemaViolation::NotAnObject)?;
        let mut validated = Map::with_capacity(self.fields.len());

        for field in &self.fields {
            match object.get(&field.name) {
                None | Some(Value::Null) if field.required => {
                    return Err(SchemaViolation::MissingField {
                        field: field.name.clone(),
                    });
                }
                None | Some(Value::Null) => {
                    validated.insert(field.name.clone(), Value::Null);
                }
                Some(v) => {
                    field.check(v)?;
                    validated.insert(field.name.clone(), v.clone());
                }
            }
        }

        Ok(validated)
    }

    /// 转换为 JSON Schema，写入 prompt 供模型参考
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in &self.fields {
            let mut prop = match field.kind {
                FieldKind::String => json!({ "type": "string" }),
                FieldKind::Integer { min, max } => {
                    json!({ "type": "integer", "minimum": min, "maximum": max })
                }
            };
            if !field.required {
                prop["type"] = json!([prop["type"].clone(), "null"]);
            }
            if !field.description.is_empty() {
                prop["description"] = json!(field.description);
            }
            if field.required {
                required.push(json!(field.name));
            }
            properties.insert(field.name.clone(), prop);
        }

        json!({
            "title": self.name,
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }
}
