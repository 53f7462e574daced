/*!
 * Tests for edits on a loaded transcript and export to disk
 */

use anyhow::Result;
use serde_json::json;
use elantime::document::{AnnotationId, DocumentTree, MarkerId, ResolvedInterval};
use elantime::errors::EditError;
use elantime::file_utils::FileManager;
use elantime::transcript::Transcript;
use crate::common;

/// Test that an unedited export reloads to an identical document
#[test]
fn test_export_withoutEdits_shouldReloadIdentically() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::write_document(temp_dir.path(), "talk.json", &common::layered_document())?;

    let transcript = Transcript::load(FileManager::load_document(&source)?)?;
    let output = FileManager::generate_copy_path(&source, " (copy)");
    FileManager::save_document(&output, &transcript.to_tree(), true)?;

    assert!(output.ends_with("talk (copy).json"));
    assert_eq!(FileManager::load_document(&output)?, common::layered_document());
    Ok(())
}

/// Test that attributes the engine does not use survive an export
#[test]
fn test_export_withUnknownAttributes_shouldPreserveThem() -> Result<()> {
    let raw = json!({
        "header": { "media_file": "talk.wav", "time_units": "milliseconds" },
        "time_markers": [
            { "id": "ts1", "value": 0 },
            { "id": "ts2", "value": 800 }
        ],
        "tiers": [
            {
                "id": "utterance",
                "participant": "Speaker A",
                "annotations": [
                    { "id": "a1", "value": "hello", "alignable": { "start": "ts1", "end": "ts2" }, "confidence": 0.9 }
                ]
            }
        ]
    });
    let tree: DocumentTree = serde_json::from_value(raw.clone())?;

    let transcript = Transcript::load(tree)?;
    transcript.update_annotation_text(&"a1".into(), "hello there")?;
    let exported = serde_json::to_value(transcript.to_tree())?;

    assert_eq!(exported["header"], raw["header"]);
    assert_eq!(exported["tiers"][0]["participant"], "Speaker A");
    assert_eq!(exported["tiers"][0]["annotations"][0]["confidence"], 0.9);
    assert_eq!(exported["tiers"][0]["annotations"][0]["value"], "hello there");
    Ok(())
}

/// Test that text edits reach the exported file and nothing else changes
#[test]
fn test_export_afterTextEdit_shouldOnlyChangeThatText() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let transcript = Transcript::load(common::utterance_document())?;

    transcript.update_annotation_text(&"a3".into(), "dog")?;
    let path = temp_dir.path().join("edited.json");
    FileManager::save_document(&path, &transcript.to_tree(), false)?;

    let reloaded = Transcript::load(FileManager::load_document(&path)?)?;
    assert_eq!(reloaded.annotation(&"a3".into()).map(|a| a.payload_text), Some("dog".to_string()));
    assert_eq!(reloaded.annotation(&"a2".into()).map(|a| a.payload_text), Some("the".to_string()));
    assert_eq!(reloaded.resolved_time(&"a3".into())?, ResolvedInterval::new(2000, 3000));
    Ok(())
}

/// Test that a marker edit is visible to the next resolution
#[test]
fn test_setMarkerValue_afterResolve_shouldRecomputeDependents() -> Result<()> {
    let transcript = Transcript::load(common::layered_document())?;
    assert!(transcript.resolved_time(&"s3".into()).is_err());

    transcript.set_marker_value(&MarkerId::from("ts4"), Some(4000))?;

    assert_eq!(transcript.resolved_time(&"s3".into())?, ResolvedInterval::new(2500, 4000));
    assert_eq!(transcript.max_time(), 4000);
    Ok(())
}

/// Test that edits on unknown ids are refused without side effects
#[test]
fn test_edits_withUnknownIds_shouldFail() -> Result<()> {
    let transcript = Transcript::load(common::utterance_document())?;
    let before = transcript.to_tree();

    assert_eq!(
        transcript.update_annotation_text(&"ghost".into(), "x"),
        Err(EditError::UnknownAnnotation(AnnotationId::from("ghost")))
    );
    assert!(transcript.set_marker_value(&"ghost".into(), Some(1)).is_err());
    assert!(transcript.set_order_predecessor(&"a1".into(), None).is_err());

    assert_eq!(transcript.to_tree(), before);
    Ok(())
}

/// Test that readers on several threads see the same intervals
#[test]
fn test_transcript_sharedAcrossThreads_shouldResolveConsistently() -> Result<()> {
    let transcript = Transcript::load(common::layered_document())?;

    let results: Vec<Option<ResolvedInterval>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| transcript.resolved_time(&"m3".into()).ok()))
            .collect();
        handles.into_iter().map(|h| h.join().ok().flatten()).collect()
    });

    for result in results {
        assert_eq!(result, Some(ResolvedInterval::new(667, 1001)));
    }
    Ok(())
}
