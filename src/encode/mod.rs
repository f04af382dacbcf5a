pub mod writer;

use serde_json::Value;

use crate::error::Error;
use crate::Result;
use writer::Writer;

/// Encode a JSON value as a single SISL document. The top level must be an
/// object.
pub fn to_string(value: &Value) -> Result<String> {
    let object = value
        .as_object()
        .ok_or_else(|| Error::codec("Top-level SISL value must be an object"))?;
    let mut writer = Writer::new();
    writer.write_document(object)?;
    Ok(writer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn test_nested_document() {
        let value = json!({"a": true, "b": null, "c": [1, 2]});
        assert_eq!(
            to_string(&value).unwrap(),
            "{a: !bool \"true\", b: !null \"\", c: !list {_0: !int \"1\", _1: !int \"2\"}}"
        );
    }

    #[rstest]
    #[case(json!(null))]
    #[case(json!(true))]
    #[case(json!(1))]
    #[case(json!("x"))]
    #[case(json!([1, 2]))]
    fn test_non_object_top_level_rejected(#[case] value: Value) {
        let err = to_string(&value).unwrap_err();
        assert!(err.to_string().contains("must be an object"));
    }
}
