use rstest::rstest;
use serde_json::{json, Value};

#[rstest]
#[case(json!({}))]
#[case(json!({"a": 1}))]
#[case(json!({"a": "text", "b": true, "c": null}))]
#[case(json!({"xs": [1, 2.5, "three"], "o": {"inner": [null]}}))]
#[case(json!({"empty_list": [], "empty_obj": {}}))]
fn typed_xml_round_trip(#[case] value: Value) {
    let xml = sisl::value_to_xml(&value).unwrap();
    assert_eq!(sisl::xml_to_value(&xml).unwrap(), value);
}

#[rstest]
fn typed_xml_matches_sisl_type_tags() {
    let value = json!({"n": 5, "f": 1.5, "s": "x", "b": false, "z": null, "l": [1], "o": {}});
    let xml = sisl::value_to_xml(&value).unwrap();
    for needle in [
        "<n type=\"int\">5</n>",
        "<f type=\"float\">1.5</f>",
        "<s type=\"str\">x</s>",
        "<b type=\"bool\">false</b>",
        "<z type=\"null\"/>",
        "<l type=\"list\">",
        "<item type=\"int\">1</item>",
        "<o type=\"obj\"/>",
    ] {
        assert!(xml.contains(needle), "missing {needle} in:\n{xml}");
    }
}

#[rstest]
fn typed_xml_float_text_matches_sisl_canonical_form() {
    let xml = sisl::value_to_xml(&json!({"whole": 3.0})).unwrap();
    assert!(xml.contains("<whole type=\"float\">3.0</whole>"));
}

#[rstest]
fn xml_and_sisl_agree_on_values() {
    let value = json!({"cfg": {"ports": [80, 443], "tls": true}});
    let via_xml = sisl::xml_to_value(&sisl::value_to_xml(&value).unwrap()).unwrap();
    let via_sisl = sisl::decode(&sisl::encode(&value).unwrap()).unwrap();
    assert_eq!(via_xml, via_sisl);
}

#[rstest]
fn generic_xml_preserves_structure() {
    let input = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
                 <catalog xmlns=\"urn:books\">\n\
                 \t<book id=\"bk101\">\n\
                 \t\t<title>XML Basics</title>\n\
                 \t</book>\n\
                 </catalog>\n";

    let value = sisl::xml_to_value(input).unwrap();
    assert_eq!(value["_decl"], json!({"version": "1.0", "encoding": "UTF-8"}));
    assert_eq!(value["_root"]["_tag"], json!("catalog"));
    assert_eq!(
        value["_root"]["_children"][0]["_attrs"],
        json!({"id": "bk101"})
    );
    assert_eq!(
        value["_root"]["_children"][0]["_children"][0]["_text"],
        json!("XML Basics")
    );
}

#[rstest]
fn generic_value_round_trips_through_xml() {
    let value = json!({
        "_decl": {"version": "1.0"},
        "_root": {
            "_tag": "note",
            "_attrs": {"lang": "en"},
            "_children": [
                {"_tag": "to", "_text": "Alice"},
                {"_tag": "from", "_text": "Bob"},
                {"_tag": "sealed"}
            ]
        }
    });
    let xml = sisl::value_to_xml(&value).unwrap();
    assert_eq!(sisl::xml_to_value(&xml).unwrap(), value);
}

#[rstest]
fn generic_mode_xml_escaping() {
    let value = json!({
        "_root": {"_tag": "m", "_attrs": {"q": "a\"b<c"}, "_text": "1 < 2 & 3 > 2"}
    });
    let xml = sisl::value_to_xml(&value).unwrap();
    assert!(xml.contains("q=\"a&quot;b&lt;c\""));
    assert!(xml.contains("1 &lt; 2 &amp; 3 &gt; 2"));
    assert_eq!(sisl::xml_to_value(&xml).unwrap(), value);
}

#[rstest]
fn generic_values_can_travel_inside_sisl() {
    // The generic representation is plain JSON, so it can be encoded to
    // SISL, shipped, decoded, and rendered back to XML unchanged.
    let value = sisl::xml_to_value("<a><b>hi</b></a>").unwrap();
    let sisl_doc = sisl::encode(&value).unwrap();
    let restored = sisl::decode(&sisl_doc).unwrap();
    assert_eq!(
        sisl::value_to_xml(&restored).unwrap(),
        "<a>\n\t<b>hi</b>\n</a>\n"
    );
}

#[rstest]
fn doctype_is_rejected() {
    let err = sisl::xml_to_value(
        "<!DOCTYPE root [<!ENTITY x \"y\">]><root><a type=\"int\">1</a></root>",
    )
    .unwrap_err();
    assert_eq!(err.kind(), sisl::ErrorKind::Xml);
}

#[rstest]
fn type_attribute_is_required_in_typed_mode() {
    let err = sisl::xml_to_value("<root><a type=\"int\">1</a><b>x</b></root>").unwrap_err();
    assert!(err.to_string().contains("Missing type attribute"));
}
