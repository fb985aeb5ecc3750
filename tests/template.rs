use assert_matches::assert_matches;

use c20c_grab::domain::{Label, VariableList, VariableName};
use c20c_grab::error::GrabError;
use c20c_grab::template::{DEFAULT_PATH_TEMPLATE, PathTemplate, TemplateValues};

fn lbnl_values() -> TemplateValues {
    TemplateValues {
        institution: Label::parse("institution", "LBNL").unwrap(),
        model: Label::parse("model", "CAM5-1-1degree").unwrap(),
        experiment: Label::parse("experiment", "All-Hist").unwrap(),
        run: Label::parse("run", "run001").unwrap(),
        estimate: Label::parse("estimate", "est1").unwrap(),
        version: Label::parse("version", "v2-0").unwrap(),
    }
}

#[test]
fn default_template_resolves_hus() {
    let template = PathTemplate::parse(DEFAULT_PATH_TEMPLATE).unwrap();
    let hus: VariableName = "hus".parse().unwrap();

    let path = template.resolve(&lbnl_values(), &hus);
    assert_eq!(
        path,
        "/nersc/s/stoned/C20C/LBNL/CAM5-1-1degree/All-Hist/est1/v2-0/3hr/atmos/hus/run001/hus_A3hr_CAM5-1-1degree_All-Hist_est1_v2-0_run001.tar"
    );
}

#[test]
fn one_distinct_path_per_variable() {
    let template = PathTemplate::parse(DEFAULT_PATH_TEMPLATE).unwrap();
    let variables = VariableList::default();

    let resolved = template.resolve_all(&lbnl_values(), &variables);
    assert_eq!(resolved.len(), 3);
    let names = resolved
        .iter()
        .map(|item| item.variable.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["hus", "ua", "va"]);
    assert_ne!(resolved[0].path, resolved[1].path);
    assert_ne!(resolved[1].path, resolved[2].path);
    assert!(resolved[1].path.ends_with("/ua/run001/ua_A3hr_CAM5-1-1degree_All-Hist_est1_v2-0_run001.tar"));
}

#[test]
fn estimate_and_version_are_optional() {
    let template =
        PathTemplate::parse("/arc/{institution}/{model}/{experiment}/{run}/{variable}.tar").unwrap();
    let ua: VariableName = "ua".parse().unwrap();
    assert_eq!(
        template.resolve(&lbnl_values(), &ua),
        "/arc/LBNL/CAM5-1-1degree/All-Hist/run001/ua.tar"
    );
}

#[test]
fn unknown_placeholder_is_rejected() {
    let err = PathTemplate::parse(
        "/arc/{institution}/{model}/{experiment}/{run}/{variable}/{frequency}.tar",
    )
    .unwrap_err();
    assert_matches!(err, GrabError::UnknownPlaceholder(name) if name == "frequency");
}

#[test]
fn missing_placeholder_is_rejected() {
    let err = PathTemplate::parse("/arc/{institution}/{model}/{experiment}/{variable}.tar")
        .unwrap_err();
    assert_matches!(err, GrabError::MissingPlaceholder(name) if name == "run");
}

#[test]
fn stray_brace_is_rejected() {
    let err = PathTemplate::parse("/arc/{institution/{model}/{experiment}/{run}/{variable}")
        .unwrap_err();
    assert_matches!(err, GrabError::TemplateSyntax(_));

    let err = PathTemplate::parse("/arc/{institution}}/{model}/{experiment}/{run}/{variable")
        .unwrap_err();
    assert_matches!(err, GrabError::TemplateSyntax(_));
}

#[test]
fn empty_placeholder_is_rejected() {
    let err = PathTemplate::parse("/arc/{}/{institution}/{model}/{experiment}/{run}/{variable}")
        .unwrap_err();
    assert_matches!(err, GrabError::TemplateSyntax(_));
}

#[test]
fn doubled_braces_stay_literal() {
    let template = PathTemplate::parse(
        "/arc/{{raw}}/{institution}/{model}/{experiment}/{run}/{variable}.tar",
    )
    .unwrap();
    let va: VariableName = "va".parse().unwrap();
    assert_eq!(
        template.resolve(&lbnl_values(), &va),
        "/arc/{raw}/LBNL/CAM5-1-1degree/All-Hist/run001/va.tar"
    );
}
