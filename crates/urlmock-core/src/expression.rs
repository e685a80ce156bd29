//! JMESPath expressions used by fixture `when` conditions.

use jmespath::Variable;
use serde_json::Value;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Inner expression of a `${expr}` string, trimmed.
pub fn strip_expression(s: &str) -> Option<&str> {
    s.trim()
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
        .map(str::trim)
}

fn value_to_variable(value: &Value) -> Rc<Variable> {
    match value {
        Value::Null => Rc::new(Variable::Null),
        Value::Bool(b) => Rc::new(Variable::Bool(*b)),
        Value::Number(n) => Rc::new(Variable::Number(n.clone())),
        Value::String(s) => Rc::new(Variable::String(s.clone())),
        Value::Array(arr) => Rc::new(Variable::Array(arr.iter().map(value_to_variable).collect())),
        Value::Object(obj) => {
            let map: BTreeMap<String, Rc<Variable>> = obj
                .iter()
                .map(|(k, v)| (k.clone(), value_to_variable(v)))
                .collect();
            Rc::new(Variable::Object(map))
        }
    }
}

/// `None` for expression references, which have no JSON form.
fn variable_to_value(var: &Variable) -> Option<Value> {
    match var {
        Variable::Null => Some(Value::Null),
        Variable::Bool(b) => Some(Value::Bool(*b)),
        Variable::Number(n) => Some(Value::Number(n.clone())),
        Variable::String(s) => Some(Value::String(s.clone())),
        Variable::Array(arr) => arr
            .iter()
            .map(|v| variable_to_value(v))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        Variable::Object(obj) => obj
            .iter()
            .map(|(k, v)| variable_to_value(v).map(|val| (k.clone(), val)))
            .collect::<Option<serde_json::Map<_, _>>>()
            .map(Value::Object),
        Variable::Expref(_) => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Evaluate `expression` over `data`. Invalid expressions and failed searches give `None`.
pub fn evaluate_jmespath(expression: &str, data: &Value) -> Option<Value> {
    let expr = jmespath::compile(expression).ok()?;
    let data = value_to_variable(data);
    let result = expr.search(&data).ok()?;
    variable_to_value(&result)
}

/// Whether `expression` evaluates to a truthy value over `data`.
pub fn match_with_jmespath(expression: &str, data: &Value) -> bool {
    evaluate_jmespath(expression, data).is_some_and(|value| is_truthy(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("${params.id == '1'}", Some("params.id == '1'"))]
    #[case("  ${ json.name }  ", Some("json.name"))]
    #[case("params.id", None)]
    #[case("${unterminated", None)]
    fn test_strip_expression(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(strip_expression(input), expected);
    }

    #[rstest]
    #[case(Value::Bool(true), true)]
    #[case(Value::Bool(false), false)]
    #[case(Value::Null, false)]
    #[case(json!(0), false)]
    #[case(json!(-1), true)]
    #[case(json!(""), false)]
    #[case(json!("x"), true)]
    #[case(json!([]), false)]
    #[case(json!([1]), true)]
    #[case(json!({}), false)]
    #[case(json!({"k": "v"}), true)]
    fn test_is_truthy(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(is_truthy(&value), expected);
    }

    #[rstest]
    #[case("params.id == '42'", true)]
    #[case("params.id == '7'", false)]
    #[case("query.page", true)]
    #[case("query.missing", false)]
    #[case("json.count > `3`", true)]
    #[case("[invalid", false)]
    fn test_match_with_jmespath(#[case] expression: &str, #[case] expected: bool) {
        let data = json!({
            "params": {"id": "42"},
            "query": {"page": "2"},
            "json": {"count": 5}
        });
        assert_eq!(match_with_jmespath(expression, &data), expected);
    }

    #[rstest]
    #[case("items[*].id", Some(json!([1, 2])))]
    #[case("items[0]", Some(json!({"id": 1})))]
    #[case("missing", Some(json!(null)))]
    #[case("[invalid", None)]
    fn test_evaluate_jmespath(#[case] expression: &str, #[case] expected: Option<Value>) {
        let data = json!({"items": [{"id": 1}, {"id": 2}]});
        assert_eq!(evaluate_jmespath(expression, &data), expected);
    }
}
