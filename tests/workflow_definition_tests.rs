use std::collections::BTreeSet;

use repo_keeper::keeper::checks::collect_required_checks;
use repo_keeper::workflow::WorkflowDefinition;

fn parse(content: &str) -> WorkflowDefinition {
    WorkflowDefinition::parse(content).unwrap()
}

fn job_names(content: &str) -> BTreeSet<String> {
    parse(content).job_names().unwrap()
}

#[test]
fn test_workflow_with_list_trigger_syntax() {
    let definition = parse(
        r#"
name: CI Build
on:
  - push
jobs:
  build:
    runs-on: ubuntu-latest
"#,
    );
    assert_eq!(definition.name(), "CI Build");
    assert!(definition.trigger().on_push_to_any_branch);
    assert!(definition.trigger().triggers_on_push_or_pull_request());
    assert_eq!(definition.job_names().unwrap(), names(&["build"]));
}

#[test]
fn test_workflow_with_map_trigger_syntax() {
    let definition = parse(
        r#"
name: CI Build
on:
  push:
jobs:
  build:
    runs-on: ubuntu-latest
"#,
    );
    assert!(definition.trigger().on_push_to_any_branch);
    assert_eq!(definition.job_names().unwrap(), names(&["build"]));
}

#[test]
fn test_workflow_with_branch_filter() {
    let definition = parse(
        r#"
name: CI Build
on:
  push:
    branches: [main, develop]
jobs:
  build:
    runs-on: ubuntu-latest
"#,
    );
    assert!(!definition.trigger().on_push_to_any_branch);
    assert_eq!(
        definition.trigger().on_push_to_branches,
        names(&["develop", "main"])
    );
    assert!(definition.trigger().triggers_on_push_or_pull_request());
}

#[test]
fn test_workflow_with_explicit_job_name() {
    let expanded = job_names(
        r#"
name: CI Build
on:
  push:
jobs:
  build:
    name: My-Job
    runs-on: ubuntu-latest
"#,
    );
    assert_eq!(expanded, names(&["My-Job"]));
}

#[test]
fn test_matrix_build_with_template_name() {
    let expanded = job_names(
        r#"
name: CI Build
on:
  push:
jobs:
  build:
    strategy:
      matrix:
        a: [ "1", "2"]
        b: [ "3", "4" ]
    name: Build with A ${{ matrix.a }} and B ${{ matrix.b }}
    runs-on: ubuntu-latest
"#,
    );
    assert_eq!(
        expanded,
        names(&[
            "Build with A 1 and B 3",
            "Build with A 1 and B 4",
            "Build with A 2 and B 3",
            "Build with A 2 and B 4",
        ])
    );
}

#[test]
fn test_matrix_build_with_object_rows_and_scalar_dimension() {
    let expanded = job_names(
        r#"
name: CI Build
on:
  push:
jobs:
  build:
    strategy:
      matrix:
        a:
         - id: 1
           num: 10
         - id: 2
           num: 20
        b: [ "3" ]
    name: Build with id ${{ matrix.id }}, num ${{matrix.num}} and B ${{ matrix.b }}
    runs-on: ubuntu-latest
"#,
    );
    assert_eq!(
        expanded,
        names(&[
            "Build with id 1, num 10 and B 3",
            "Build with id 2, num 20 and B 3",
        ])
    );
}

#[test]
fn test_matrix_build_with_config_row_syntax() {
    let expanded = job_names(
        r#"
name: CI Build
on:
  push:
jobs:
  build:
    strategy:
      matrix:
        config:
          - {a: 10, b: 3}
          - {a: 20, b: 3}
    name: Build with A ${{ matrix.a }} and B ${{ matrix.b }}
    runs-on: ubuntu-latest
"#,
    );
    assert_eq!(
        expanded,
        names(&["Build with A 10 and B 3", "Build with A 20 and B 3"])
    );
}

#[test]
fn test_matrix_build_with_include_rows_and_unused_variables() {
    let expanded = job_names(
        r#"
on:
  push:
  pull_request:
  workflow_dispatch:

jobs:
  examples:
    strategy:
      fail-fast: false
      matrix:
        include:
          - python-version: "3.9"
            db-tag: latest-7.1
            db-port: 8563

          - python-version: "3.9"
            db-tag: latest-7.0
            db-port: 8563

          - python-version: "3.6"
            db-tag: latest-6.2
            db-port: 8888
    name: "Build with Python ${{ matrix.python-version }} and DB ${{ matrix.db-tag }}"
"#,
    );
    assert_eq!(
        expanded,
        names(&[
            "Build with Python 3.9 and DB latest-7.1",
            "Build with Python 3.9 and DB latest-7.0",
            "Build with Python 3.6 and DB latest-6.2",
        ])
    );
}

#[test]
fn test_matrix_build_with_single_include_row_and_float_value() {
    let expanded = job_names(
        r#"
on:
  push:
  pull_request:

jobs:
  ssl_cert:
    strategy:
      fail-fast: false
      matrix:
        include:
          - python-version: 3.9
            db-tag: 7.1.6
    name: "Build SSL-Cert with Python ${{ matrix.python-version }} and DB ${{ matrix.db-tag }}"
"#,
    );
    assert_eq!(
        expanded,
        names(&["Build SSL-Cert with Python 3.9 and DB 7.1.6"])
    );
}

#[test]
fn test_multi_dimensional_matrix_without_name_fails_validation() {
    let definition = parse(
        r#"
name: CI Build
on:
  push:
jobs:
  build:
    strategy:
      matrix:
        a: [1, 2]
        b: [ "3" ]
    runs-on: ubuntu-latest
"#,
    );
    let error = definition.job_names().unwrap_err();
    assert!(error.is_validation());
    let message = error.to_string();
    assert!(message.contains("multi dimensional"));
    assert!(message.contains("Please add a name field"));
}

#[test]
fn test_object_parameters_without_name_fails_validation() {
    let definition = parse(
        r#"
name: CI Build
on:
  push:
jobs:
  build:
    strategy:
      matrix:
        a:
         - id: 1
           num: 10
         - id: 2
           num: 20
    runs-on: ubuntu-latest
"#,
    );
    let error = definition.job_names().unwrap_err();
    assert!(error.is_validation());
    assert!(error.to_string().contains("object parameters"));
}

#[test]
fn test_ambiguous_matrix_is_ignored_for_other_triggers() {
    // Parsing must succeed; the caller never expands job names for
    // workflows that do not trigger on push or pull_request.
    let definition = parse(
        r#"
name: CI Build
on:
  other:
jobs:
  build:
    strategy:
      matrix:
        a:
         - id: 1
           num: 10
    runs-on: ubuntu-latest
"#,
    );
    assert!(!definition.trigger().triggers_on_push_or_pull_request());
}

#[test]
fn test_single_dimension_matrix_without_name() {
    let expanded = job_names(
        r#"
name: CI Build
on:
  push:
jobs:
  build:
    strategy:
      matrix:
        a: [1,2]
    runs-on: ubuntu-latest
"#,
    );
    assert_eq!(expanded, names(&["build (1)", "build (2)"]));
}

#[test]
fn test_single_dimension_matrix_with_float_values() {
    let expanded = job_names(
        r#"
name: CI Build
on:
  push:
jobs:
  build:
    strategy:
      matrix:
        a: [1.2,2.1]
    runs-on: ubuntu-latest
"#,
    );
    assert_eq!(expanded, names(&["build (1.2)", "build (2.1)"]));
}

#[test]
fn test_single_dimension_matrix_with_bool_and_int_values() {
    let expanded = job_names(
        r#"
name: CI Build
on:
  push:
jobs:
  build:
    strategy:
      matrix:
        a: [true, 3]
    runs-on: ubuntu-latest
"#,
    );
    assert_eq!(expanded, names(&["build (3)", "build (true)"]));
}

#[test]
fn test_dynamic_matrix_expression_is_a_soft_failure() {
    let definition = parse(
        r#"
name: CI Build
on:
  push:
jobs:
  build:
    strategy:
      matrix:
        test-path: ${{fromJson(needs.prep-testbed.outputs.matrix)}}
    runs-on: ubuntu-latest
"#,
    );
    let error = definition.job_names().unwrap_err();
    assert!(!error.is_validation());
}

#[test]
fn test_required_checks_span_all_jobs() {
    let expanded = job_names(
        r#"
name: CI Build
on:
  push:
jobs:
  lint:
    runs-on: ubuntu-latest
  build:
    strategy:
      matrix:
        go: ["1.21", "1.22"]
    name: Build with Go ${{ matrix.go }}
    runs-on: ubuntu-latest
"#,
    );
    assert_eq!(
        expanded,
        names(&["Build with Go 1.21", "Build with Go 1.22", "lint"])
    );
}

#[test]
fn test_parsing_is_idempotent() {
    let content = r#"
name: CI Build
on:
  push:
    branches: [main]
  pull_request:
jobs:
  build:
    strategy:
      matrix:
        a: [1, 2]
"#;
    let first = WorkflowDefinition::parse(content).unwrap();
    let second = WorkflowDefinition::parse(content).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.job_names().unwrap(), second.job_names().unwrap());
}

#[test]
fn test_collection_skips_unsupported_files_but_aborts_on_validation_errors() {
    let push_workflow = r#"
name: CI Build
on: [push]
jobs:
  build:
    runs-on: ubuntu-latest
"#;
    let dynamic_workflow = r#"
name: Dynamic
on: [push]
jobs:
  test:
    strategy:
      matrix:
        path: ${{fromJson(needs.prep.outputs.matrix)}}
"#;
    let collected = collect_required_checks([
        ("dynamic.yaml".to_string(), dynamic_workflow.to_string()),
        ("ci.yaml".to_string(), push_workflow.to_string()),
    ])
    .unwrap();
    assert_eq!(collected.checks, names(&["build"]));
    assert_eq!(collected.skipped.len(), 1);

    let unnamed_matrix_workflow = r#"
name: Broken
on: [push]
jobs:
  build:
    strategy:
      matrix:
        a: [1, 2]
        b: [3]
"#;
    let error = collect_required_checks([(
        "broken.yaml".to_string(),
        unnamed_matrix_workflow.to_string(),
    )])
    .unwrap_err();
    assert!(error.is_validation());
}

fn names(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}
