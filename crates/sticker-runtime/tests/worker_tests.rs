use std::collections::HashSet;
use std::sync::Arc;
use sticker_editor::{MemoryDesignStore, Role, SceneObject};
use sticker_runtime::*;
use tempfile::TempDir;
use tokio::sync::mpsc;

fn snapshot(objects: Vec<SceneObject>) -> SceneSnapshot {
    SceneSnapshot {
        objects,
        canvas_width: Some(450.0),
        canvas_height: Some(450.0),
        ..SceneSnapshot::default()
    }
}

/// Send every command, close the channel and run the worker to completion
async fn run(store: Arc<MemoryDesignStore>, commands: Vec<PrepressCommand>) -> Vec<PrepressUpdate> {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, mut update_rx) = mpsc::unbounded_channel();
    for cmd in commands {
        command_tx.send(cmd).unwrap();
    }
    drop(command_tx);

    worker_task(store, command_rx, update_tx).await;

    let mut updates = Vec::new();
    while let Ok(update) = update_rx.try_recv() {
        updates.push(update);
    }
    updates
}

#[tokio::test]
async fn test_exports_run_to_completion_after_channel_closes() {
    let dir = TempDir::new().unwrap();
    let commands = (0..3)
        .map(|i| PrepressCommand::Export {
            job: JobId(i),
            pages: vec![ExportPage::new(
                PrintSpecification::default(),
                snapshot(vec![SceneObject::rect(10.0, 10.0, 100.0, 100.0)]),
            )],
            options: ExportOptions::default(),
            output_path: dir.path().join(format!("design-{i}.pdf")),
        })
        .collect();

    let updates = run(Arc::new(MemoryDesignStore::new()), commands).await;

    let completed: HashSet<u64> = updates
        .iter()
        .filter_map(|u| match u {
            PrepressUpdate::ExportComplete { job, layouts, .. } => {
                assert_eq!(layouts.len(), 1);
                Some(job.0)
            }
            _ => None,
        })
        .collect();
    assert_eq!(completed, HashSet::from([0, 1, 2]));

    for i in 0..3 {
        let doc = lopdf::Document::load(dir.path().join(format!("design-{i}.pdf"))).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }
}

#[tokio::test]
async fn test_stored_design_exports_without_guides() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(MemoryDesignStore::new());
    let mut design = Design::new("d-1", "p-1");
    design.canvas_json = snapshot(vec![
        SceneObject::rect(0.0, 0.0, 450.0, 450.0).with_role(Role::BleedGuide),
        SceneObject::text(20.0, 20.0, "Hi", 30.0),
    ]);
    store.insert(design).unwrap();

    let output_path = dir.path().join("stored.pdf");
    let updates = run(
        store,
        vec![PrepressCommand::ExportStored {
            job: JobId(7),
            design_id: "d-1".to_string(),
            spec: PrintSpecification::default(),
            options: ExportOptions::default(),
            output_path: output_path.clone(),
        }],
    )
    .await;

    assert!(matches!(updates[0], PrepressUpdate::Started { job: JobId(7) }));
    match &updates[1] {
        PrepressUpdate::ExportComplete { path, layouts, .. } => {
            assert_eq!(path, &output_path);
            assert_eq!(layouts[0].width_pt, 270.0);
        }
        other => panic!("Expected ExportComplete, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_design_reports_error() {
    let dir = TempDir::new().unwrap();
    let updates = run(
        Arc::new(MemoryDesignStore::new()),
        vec![PrepressCommand::ExportStored {
            job: JobId(1),
            design_id: "missing".to_string(),
            spec: PrintSpecification::default(),
            options: ExportOptions::default(),
            output_path: dir.path().join("never.pdf"),
        }],
    )
    .await;

    assert_eq!(updates.len(), 1);
    match &updates[0] {
        PrepressUpdate::Error { job, message } => {
            assert_eq!(*job, Some(JobId(1)));
            assert!(message.contains("missing"));
        }
        other => panic!("Expected Error, got {other:?}"),
    }
    assert!(!dir.path().join("never.pdf").exists());
}

#[tokio::test]
async fn test_empty_export_reports_error() {
    let dir = TempDir::new().unwrap();
    let updates = run(
        Arc::new(MemoryDesignStore::new()),
        vec![PrepressCommand::Export {
            job: JobId(3),
            pages: vec![],
            options: ExportOptions::default(),
            output_path: dir.path().join("empty.pdf"),
        }],
    )
    .await;

    assert!(matches!(
        updates.last(),
        Some(PrepressUpdate::Error {
            job: Some(JobId(3)),
            ..
        })
    ));
}

#[tokio::test]
async fn test_load_options() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("options.json");
    let options = ExportOptions {
        title: Some("Run 12".to_string()),
        ..ExportOptions::default()
    };
    options.save(&good).await.unwrap();

    let updates = run(
        Arc::new(MemoryDesignStore::new()),
        vec![
            PrepressCommand::LoadOptions { path: good },
            PrepressCommand::LoadOptions {
                path: dir.path().join("absent.json"),
            },
        ],
    )
    .await;

    match &updates[0] {
        PrepressUpdate::OptionsLoaded { options: loaded } => assert_eq!(loaded, &options),
        other => panic!("Expected OptionsLoaded, got {other:?}"),
    }
    assert!(matches!(updates[1], PrepressUpdate::Error { job: None, .. }));
}
