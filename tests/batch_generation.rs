//! Integration tests for generating a whole project

use frame_wizard::geometry::{ComponentClass, DocumentId};
use frame_wizard::template::ResolveErrorKind;
use frame_wizard::{generate_with_config, GenerateConfig, GenerateError, Project};
use pretty_assertions::assert_eq;

const PROJECT: &str = r#"{
    "profiles": [
        {
            "name": "hinge-std",
            "type": "hinge",
            "template": "(hinge {$index})\nG0 X{$machine_x_offset} Y{$y_offset}\nG0 Z5\nG1 X{$position} Z-{L1} F{feed:600}\nG0 Z5",
            "variables": [
                {"kind": "lvar", "identifier": "L1", "default": 3}
            ]
        },
        {
            "name": "hinge-heavy",
            "type": "hinge",
            "template": "G1 X{$position} Z-{L1} F{plunge}",
            "variables": [
                {"kind": "lvar", "identifier": "L1", "default": 4.5}
            ]
        },
        {
            "name": "lock-std",
            "type": "lock",
            "template": "G1 X{$position - L1/2}\nG1 X{$position + L1/2}",
            "variables": [
                {"kind": "lvar", "identifier": "L1", "default": 200}
            ]
        }
    ],
    "frame": {
        "height": 2100,
        "width": 60,
        "doorWidth": 40,
        "orientation": "right",
        "machineOffset": {"x": 12},
        "hinges": {"mode": "manual", "positions": [250, 1850], "profile": ["hinge-std", "hinge-heavy"]},
        "lock": {"mode": "auto", "profile": "lock-std"}
    },
    "overrides": {
        "hinge-std": {"L1": 2.5}
    }
}"#;

fn generate(project: &Project) -> Result<frame_wizard::BatchResult, GenerateError> {
    generate_with_config(project, &GenerateConfig::new())
}

#[test]
fn test_one_failure_among_three() {
    let project = Project::from_json(PROJECT).expect("Should parse");
    let result = generate(&project).unwrap();

    assert_eq!(result.succeeded(), 2);
    assert_eq!(result.failed(), 1);
    assert!(!result.is_success());

    let failure = &result.failures[0];
    assert_eq!(failure.id, DocumentId::new(ComponentClass::Hinge, 2));
    assert_eq!(failure.profile, "hinge-heavy");
    assert_eq!(
        failure.errors[0].kind,
        ResolveErrorKind::UnresolvedReference {
            identifier: "plunge".to_string()
        }
    );
    assert_eq!((failure.errors[0].line, failure.errors[0].column), (1, 26));
}

#[test]
fn test_resolved_documents() {
    let project = Project::from_json(PROJECT).expect("Should parse");
    let result = generate(&project).unwrap();

    let ids: Vec<String> = result.documents.iter().map(|d| d.file_name()).collect();
    assert_eq!(ids, vec!["hinge1.gcode", "lock1.gcode"]);

    insta::assert_snapshot!(result.documents[0].text, @r"
    (hinge 1)
    G0 X12 Y40
    G0 Z5
    G1 X250 Z-2.5 F600
    G0 Z5
    ");
    assert_eq!(result.documents[1].text, "G1 X950\nG1 X1150");
}

#[test]
fn test_override_fixes_failure() {
    let mut project = Project::from_json(PROJECT).expect("Should parse");
    project = project.with_override("hinge-heavy", "plunge", 300.0);
    let result = generate(&project).unwrap();
    assert!(result.is_success());
    assert_eq!(
        result
            .document(DocumentId::new(ComponentClass::Hinge, 2))
            .map(|d| d.text.as_str()),
        Some("G1 X1850 Z-4.5 F300")
    );
}

#[test]
fn test_left_door_positions_from_reference_edge() {
    let json = PROJECT.replace(r#""orientation": "right""#, r#""orientation": "left""#);
    let project = Project::from_json(&json).expect("Should parse");
    let result = generate(&project).unwrap();

    // Manual positions are measured from the reference edge
    assert!(result.documents[0].text.contains("G1 X250 "));
    assert_eq!(result.documents[1].text, "G1 X950\nG1 X1150");
    assert_eq!(result.layout.instances[0].position, 1850.0);
}

#[test]
fn test_invalid_profile_aborts() {
    let json = PROJECT.replace(
        r#"{"kind": "lvar", "identifier": "L1", "default": 200}"#,
        r#"{"kind": "custom", "identifier": "frame_height"}"#,
    );
    let project = Project::from_json(&json).expect("Should parse");
    assert!(matches!(generate(&project), Err(GenerateError::Profile(_))));
}

#[test]
fn test_collision_aborts() {
    let json = PROJECT.replace("[250, 1850]", "[250, 300]");
    let project = Project::from_json(&json).expect("Should parse");
    assert!(matches!(
        generate(&project),
        Err(GenerateError::Geometry(_))
    ));
}

#[test]
fn test_frame_program_and_machining_order() {
    let json = PROJECT
        .replace(
            r#""profiles": ["#,
            r#""profiles": [
        {
            "name": "frame-right",
            "type": "frame",
            "template": "(frame {$frame_height})\n(order lock={$lock_order} h1={$hinge1_order} h2={$hinge2_order})"
        },
        {
            "name": "frame-left",
            "type": "frame",
            "template": "(left frame)"
        },"#,
        )
        .replace(
            r#""lock": {"mode": "auto", "profile": "lock-std"}"#,
            r#""lock": {"mode": "auto", "profile": "lock-std"},
        "programs": {"right": "frame-right", "left": "frame-left"},
        "order": ["lock", "hinge1"]"#,
        );
    let project = Project::from_json(&json).expect("Should parse");
    let result = generate(&project).unwrap();

    let ids: Vec<String> = result.documents.iter().map(|d| d.file_name()).collect();
    assert_eq!(ids, vec!["frame1.gcode", "hinge1.gcode", "lock1.gcode"]);
    assert_eq!(
        result.documents[0].text,
        "(frame 2100)\n(order lock=1 h1=2 h2=0)"
    );

    let left = json.replace(r#""orientation": "right""#, r#""orientation": "left""#);
    let project = Project::from_json(&left).expect("Should parse");
    let result = generate(&project).unwrap();
    assert_eq!(
        result.document(DocumentId::FRAME).map(|d| d.text.as_str()),
        Some("(left frame)")
    );
}

#[test]
fn test_hinge_over_auto_lock_collides() {
    let json = PROJECT.replace("[250, 1850]", "[250, 1000]");
    let project = Project::from_json(&json).expect("Should parse");
    assert!(matches!(
        generate(&project),
        Err(GenerateError::Geometry(
            frame_wizard::GeometryError::CollisionDetected { .. }
        ))
    ));
}
