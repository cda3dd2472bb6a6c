mod support;

use draftdeck_core::api::Method;
use draftdeck_core::{
    ClientError, DocType, DraftSectionSpec, ProjectDraft, Screen, ValidationError,
};
use serde_json::json;
use support::{
    harness, json_response, logged_in, logged_in_with_projects, project_json, section_json,
    text_response,
};

#[tokio::test]
async fn create_renumbers_sections_then_generates_and_opens_editor() {
    let h = harness();
    logged_in(&h).await;

    let mut draft = ProjectDraft::with_sections(
        "Q3 Report",
        "quarterly sales",
        DocType::Docx,
        ["Intro", "Results"],
    );
    draft.sections[0].order = 7;
    draft.sections[1].order = 2;

    h.transport.respond_json(
        Method::Post,
        "/projects",
        project_json(
            3,
            "Q3 Report",
            "docx",
            vec![
                section_json(10, "Intro", 1, None),
                section_json(11, "Results", 2, None),
            ],
        ),
    );
    h.transport.respond_json(
        Method::Post,
        "/projects/3/generate",
        project_json(
            3,
            "Q3 Report",
            "docx",
            vec![
                section_json(10, "Intro", 1, Some("Sales grew.")),
                section_json(11, "Results", 2, Some("Revenue up 12%.")),
            ],
        ),
    );

    let project = h.workbench.create_project(&draft).await.unwrap();

    let create = &h.transport.requests_to("/projects")[1];
    assert_eq!(create.method, Method::Post);
    assert_eq!(
        create.json_body().unwrap(),
        &json!({
            "title": "Q3 Report",
            "topic": "quarterly sales",
            "doc_type": "docx",
            "sections": [
                { "title": "Intro", "order": 1 },
                { "title": "Results", "order": 2 },
            ],
        })
    );

    assert!(project.is_fully_generated());
    assert_eq!(h.workbench.screen(), Screen::Editor { project_id: 3 });
    assert_eq!(h.workbench.document().project(), Some(project));
    assert!(h.workbench.catalog().contains(3));
    assert!(!h.workbench.is_loading());
}

#[tokio::test]
async fn failed_generation_keeps_created_project_open() {
    let h = harness();
    logged_in(&h).await;
    h.transport.respond_json(
        Method::Post,
        "/projects",
        project_json(3, "Q3 Report", "pptx", vec![section_json(10, "Intro", 1, None)]),
    );
    h.transport.respond(
        Method::Post,
        "/projects/3/generate",
        text_response(502, "model unavailable"),
    );
    let draft = ProjectDraft::with_sections("Q3 Report", "", DocType::Pptx, ["Intro"]);

    let err = h.workbench.create_project(&draft).await.unwrap_err();

    assert_eq!(err.to_string(), "model unavailable");
    assert_eq!(h.workbench.screen(), Screen::Editor { project_id: 3 });
    let open = h.workbench.document().project().unwrap();
    assert_eq!(open.sections[0].content, None);
}

#[tokio::test]
async fn invalid_drafts_make_no_request() {
    let h = harness();
    logged_in(&h).await;
    let before = h.transport.request_count();

    let untitled = ProjectDraft::with_sections("   ", "topic", DocType::Docx, ["Intro"]);
    let err = h.workbench.create_project(&untitled).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Validation(ValidationError::EmptyField("title"))
    ));

    let mut empty = ProjectDraft::new();
    empty.title = "Q3 Report".to_string();
    empty.sections.clear();
    let err = h.workbench.create_project(&empty).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Validation(ValidationError::NoSections)
    ));

    assert_eq!(h.transport.request_count(), before);
    assert_eq!(h.workbench.screen(), Screen::Dashboard);
    assert!(h.workbench.catalog().projects().is_empty());
}

#[test]
fn draft_form_rows_keep_at_least_one_section() {
    let mut draft = ProjectDraft::new();
    assert_eq!(
        draft.sections,
        vec![DraftSectionSpec {
            title: "Introduction".to_string(),
            order: 1
        }]
    );
    assert!(!draft.remove_section(0));

    draft.add_section();
    assert_eq!(draft.sections[1].title, "Section 2");
    assert!(draft.update_section_title(1, "Outlook"));
    assert!(draft.remove_section(0));
    assert_eq!(draft.sections.len(), 1);
    assert_eq!(draft.sections[0].title, "Outlook");
}

#[tokio::test]
async fn deleting_the_open_project_returns_to_dashboard() {
    let h = harness();
    logged_in_with_projects(
        &h,
        vec![
            project_json(3, "Q3 Report", "docx", vec![]),
            project_json(4, "Board Deck", "pptx", vec![]),
        ],
    )
    .await;
    h.transport.respond_json(
        Method::Get,
        "/projects/3",
        project_json(3, "Q3 Report", "docx", vec![section_json(10, "Intro", 1, Some("x"))]),
    );
    h.workbench.open_project(3).await.unwrap();
    h.transport
        .respond(Method::Delete, "/projects/3", json_response(200, json!({ "ok": true })));

    h.workbench.delete_project(3).await.unwrap();

    assert_eq!(h.workbench.screen(), Screen::Dashboard);
    assert!(h.workbench.document().project().is_none());
    let ids: Vec<_> = h
        .workbench
        .catalog()
        .projects()
        .iter()
        .map(|project| project.id)
        .collect();
    assert_eq!(ids, vec![4]);
}

#[tokio::test]
async fn deleting_another_project_leaves_editor_alone() {
    let h = harness();
    logged_in_with_projects(
        &h,
        vec![
            project_json(3, "Q3 Report", "docx", vec![]),
            project_json(4, "Board Deck", "pptx", vec![]),
        ],
    )
    .await;
    h.transport.respond_json(
        Method::Get,
        "/projects/3",
        project_json(3, "Q3 Report", "docx", vec![section_json(10, "Intro", 1, Some("x"))]),
    );
    let opened = h.workbench.open_project(3).await.unwrap();
    h.transport
        .respond(Method::Delete, "/projects/4", json_response(200, json!({ "ok": true })));

    h.workbench.delete_project(4).await.unwrap();

    assert_eq!(h.workbench.screen(), Screen::Editor { project_id: 3 });
    assert_eq!(h.workbench.document().project(), Some(opened));
    assert!(!h.workbench.catalog().contains(4));
    assert!(h.workbench.catalog().contains(3));
}

#[tokio::test]
async fn deleting_an_unknown_project_surfaces_server_error() {
    let h = harness();
    logged_in_with_projects(&h, vec![project_json(3, "Q3 Report", "docx", vec![])]).await;
    h.transport.respond(
        Method::Delete,
        "/projects/99",
        json_response(404, json!({ "detail": "Project not found" })),
    );

    let err = h.workbench.delete_project(99).await.unwrap_err();

    assert!(matches!(err, ClientError::Remote { status: 404, .. }));
    assert!(err.to_string().contains("Project not found"));
    assert_eq!(h.workbench.catalog().projects().len(), 1);
    assert_eq!(h.workbench.screen(), Screen::Dashboard);
}

#[tokio::test]
async fn failed_refresh_keeps_previous_list() {
    let h = harness();
    logged_in_with_projects(&h, vec![project_json(3, "Q3 Report", "docx", vec![])]).await;
    h.transport
        .fail_network(Method::Get, "/projects", "connection refused");

    let err = h.workbench.refresh_projects().await.unwrap_err();

    assert!(err.is_remote_failure());
    assert_eq!(err.to_string(), "connection refused");
    assert_eq!(h.workbench.catalog().projects().len(), 1);
    assert_eq!(h.workbench.screen(), Screen::Dashboard);
    assert!(h.workbench.session().is_authenticated());
}

#[tokio::test]
async fn list_failure_after_login_still_reaches_dashboard() {
    let h = harness();
    h.transport.respond_json(
        Method::Post,
        "/auth/login",
        json!({ "access_token": "tok-1" }),
    );
    h.transport
        .respond_json(Method::Get, "/auth/me", support::identity_json());
    h.transport
        .respond(Method::Get, "/projects", text_response(500, "database is down"));

    let err = h.workbench.login("ana@example.com", "secret").await.unwrap_err();

    assert_eq!(err.to_string(), "database is down");
    assert_eq!(h.workbench.screen(), Screen::Dashboard);
    assert!(h.workbench.session().is_authenticated());
    assert!(h.workbench.catalog().projects().is_empty());
}

#[tokio::test]
async fn list_response_arriving_after_logout_is_dropped() {
    let h = harness();
    logged_in(&h).await;
    let gate = h.transport.gate(Method::Get, "/projects");

    let (listed, _) = tokio::join!(h.workbench.catalog().list(), async {
        while h.transport.requests_to("/projects").len() < 2 {
            tokio::task::yield_now().await;
        }
        h.workbench.logout();
        gate.send(json_response(
            200,
            json!([project_json(3, "Q3 Report", "docx", vec![])]),
        ))
        .unwrap();
    });

    assert_eq!(listed.unwrap().len(), 1);
    assert!(h.workbench.catalog().projects().is_empty());
    assert_eq!(h.workbench.screen(), Screen::Auth);
}

#[tokio::test]
async fn project_opened_after_logout_is_not_loaded() {
    let h = harness();
    logged_in_with_projects(&h, vec![project_json(3, "Q3 Report", "docx", vec![])]).await;
    let gate = h.transport.gate(Method::Get, "/projects/3");

    let (opened, _) = tokio::join!(h.workbench.open_project(3), async {
        while h.transport.requests_to("/projects/3").is_empty() {
            tokio::task::yield_now().await;
        }
        h.workbench.logout();
        gate.send(json_response(
            200,
            project_json(3, "Q3 Report", "docx", vec![section_json(10, "Intro", 1, Some("x"))]),
        ))
        .unwrap();
    });

    assert_eq!(opened.unwrap().id, 3);
    assert!(h.workbench.document().project().is_none());
    assert_eq!(h.workbench.screen(), Screen::Auth);
}

#[tokio::test]
async fn project_created_after_logout_is_neither_opened_nor_generated() {
    let h = harness();
    logged_in(&h).await;
    let gate = h.transport.gate(Method::Post, "/projects");
    let draft = ProjectDraft::with_sections("Q3 Report", "", DocType::Docx, ["Intro"]);

    let (created, _) = tokio::join!(h.workbench.create_project(&draft), async {
        while h.transport.requests_to("/projects").len() < 2 {
            tokio::task::yield_now().await;
        }
        h.workbench.logout();
        gate.send(json_response(
            200,
            project_json(3, "Q3 Report", "docx", vec![section_json(10, "Intro", 1, None)]),
        ))
        .unwrap();
    });

    assert_eq!(created.unwrap().id, 3);
    assert!(h.transport.requests_to("/projects/3/generate").is_empty());
    assert!(h.workbench.document().project().is_none());
    assert!(h.workbench.catalog().projects().is_empty());
    assert_eq!(h.workbench.screen(), Screen::Auth);
}
