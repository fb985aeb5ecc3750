use assert_matches::assert_matches;

use c20c_grab::domain::{Label, VariableList, VariableName};
use c20c_grab::error::GrabError;

#[test]
fn parse_variable_list_keeps_order() {
    let list: VariableList = "va, ua,hus".parse().unwrap();
    let names = list.iter().map(|name| name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["va", "ua", "hus"]);
}

#[test]
fn parse_variable_list_duplicate() {
    let err = "hus,ua,hus".parse::<VariableList>().unwrap_err();
    assert_matches!(err, GrabError::DuplicateVariable(name) if name == "hus");
}

#[test]
fn parse_variable_list_empty_entry() {
    let err = "hus,,va".parse::<VariableList>().unwrap_err();
    assert_matches!(err, GrabError::InvalidVariable(_));
}

#[test]
fn empty_list_is_rejected() {
    let err = VariableList::new(Vec::new()).unwrap_err();
    assert_matches!(err, GrabError::EmptyVariableList);
}

#[test]
fn variable_name_rejects_path_characters() {
    let err = "hus/../etc".parse::<VariableName>().unwrap_err();
    assert_matches!(err, GrabError::InvalidVariable(_));
}

#[test]
fn label_keeps_value_verbatim() {
    let label = Label::parse("run", "run001").unwrap();
    assert_eq!(label.as_str(), "run001");
}

#[test]
fn label_rejects_surrounding_whitespace() {
    let err = Label::parse("run", " run001 ").unwrap_err();
    assert_matches!(err, GrabError::InvalidLabel { field: "run", .. });
}

#[test]
fn label_rejects_empty() {
    let err = Label::parse("model", "  ").unwrap_err();
    assert_matches!(err, GrabError::InvalidLabel { field: "model", .. });
}
